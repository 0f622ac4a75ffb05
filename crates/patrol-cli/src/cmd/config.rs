use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use patrol_core::config::Config;
use patrol_core::types::SelectionMode;
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,
    /// Set the subject-selection mode (single | two-step)
    SetMode { mode: String },
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::SetMode { mode } => set_mode(root, &mode),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    if json {
        print_json(&config)?;
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
    }
    Ok(())
}

fn set_mode(root: &Path, mode: &str) -> anyhow::Result<()> {
    let mode = SelectionMode::from_str(mode)
        .with_context(|| format!("invalid selection mode '{mode}' (single | two-step)"))?;
    let mut config = Config::load(root).context("failed to load config")?;
    config.selection.mode = mode;
    config.save(root).context("failed to save config")?;
    println!("Selection mode: {mode}");
    Ok(())
}
