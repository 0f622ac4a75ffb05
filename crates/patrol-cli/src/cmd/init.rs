use anyhow::Context;
use patrol_core::{config::Config, io, paths, roster::Roster, store::CounterStore};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing patrol in: {}", root.display());

    let dir = paths::patrol_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    let counters_path = paths::counters_path(root);
    let data = serde_json::to_vec_pretty(&CounterStore::default())?;
    if io::write_if_missing(&counters_path, &data).context("failed to write counters.json")? {
        println!("  created: {}", paths::COUNTERS_FILE);
    } else {
        println!("  exists:  {}", paths::COUNTERS_FILE);
    }

    let roster_path = paths::roster_path(root);
    if !roster_path.exists() {
        Roster::default()
            .save(root)
            .context("failed to write roster.yaml")?;
        println!("  created: {}", paths::ROSTER_FILE);
    } else {
        println!("  exists:  {}", paths::ROSTER_FILE);
    }

    Ok(())
}
