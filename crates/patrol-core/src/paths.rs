use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const PATROL_DIR: &str = ".patrol";

pub const CONFIG_FILE: &str = ".patrol/config.yaml";
pub const COUNTERS_FILE: &str = ".patrol/counters.json";
pub const ROSTER_FILE: &str = ".patrol/roster.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn patrol_dir(root: &Path) -> PathBuf {
    root.join(PATROL_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn counters_path(root: &Path) -> PathBuf {
    root.join(COUNTERS_FILE)
}

pub fn roster_path(root: &Path) -> PathBuf {
    root.join(ROSTER_FILE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
