#![deny(warnings)]

use anyhow::{bail, Context};
use persistence::{default_save_path, load, save, SaveFormat, SAVE_VERSION};
use std::path::PathBuf;

/// Rewrite a save of any supported version in the current format.
///
/// Usage: migrate [INPUT] [OUTPUT] [--format json|bincode]
fn main() -> anyhow::Result<()> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let mut format: Option<SaveFormat> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--format" => {
                let value = it.next().context("--format needs a value")?;
                format = Some(value.parse()?);
            }
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            _ => paths.push(PathBuf::from(arg)),
        }
    }
    let input = paths
        .first()
        .cloned()
        .unwrap_or_else(|| PathBuf::from(default_save_path()));
    let output = paths.get(1).cloned().unwrap_or_else(|| input.clone());

    let state = load(&input, SaveFormat::from_path(&input))?;
    let out_format = format.unwrap_or_else(|| SaveFormat::from_path(&output));
    save(&output, &state, out_format)?;
    println!(
        "Save migrated to {} (version {}, season {}, {} games)",
        output.display(),
        SAVE_VERSION,
        state.season_year(),
        state.schedule.len()
    );
    Ok(())
}
