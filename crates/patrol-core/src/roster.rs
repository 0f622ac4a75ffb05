use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// One entry of the caller's visible peer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub display_name: String,
    /// Automated accounts are never offered as inspection subjects.
    #[serde(default)]
    pub bot: bool,
}

impl Member {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            bot: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Local stand-in for the platform directory lookup: the set of members
/// visible to callers, persisted at `.patrol/roster.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Roster {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::roster_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let roster: Roster = serde_yaml::from_str(&data)?;
        Ok(roster)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::roster_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())?;
        Ok(())
    }

    /// Add or replace a member, keyed by id.
    pub fn upsert(&mut self, member: Member) {
        self.members.retain(|m| m.id != member.id);
        self.members.push(member);
    }

    /// Remove a member by id. Returns true if one was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.id != id);
        self.members.len() < before
    }

    pub fn find(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Candidate subjects for a selection menu: non-automated members,
    /// truncated to `max` in roster order. Truncation is silent.
    pub fn candidates(&self, max: usize) -> Vec<Member> {
        self.members
            .iter()
            .filter(|m| !m.bot)
            .take(max)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
