use crate::store::CounterStore;
use serde::{Deserialize, Serialize};

/// Placeholder shown instead of an empty leaderboard.
pub const NO_DATA: &str = "no data yet";

// ---------------------------------------------------------------------------
// SummaryView
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user: String,
    pub count: u64,
}

/// Ranked rollup of the counter store, ready for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryView {
    pub today: u64,
    pub total: u64,
    pub last_name: String,
    pub last_by: String,
    /// Count descending; ties keep the store's iteration order.
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl SummaryView {
    pub fn from_store(store: &CounterStore) -> Self {
        let leaderboard = store
            .ranked_users()
            .into_iter()
            .map(|(user, count)| LeaderboardEntry { user, count })
            .collect();
        Self {
            today: store.today,
            total: store.total,
            last_name: store.last_name.clone(),
            last_by: store.last_by.clone(),
            leaderboard,
        }
    }

    /// One `- <submitter> → <count>x` line per entry, or the fixed
    /// placeholder when there is no data.
    pub fn leaderboard_lines(&self) -> Vec<String> {
        if self.leaderboard.is_empty() {
            return vec![NO_DATA.to_string()];
        }
        self.leaderboard
            .iter()
            .map(|e| format!("- {} → {}x", e.user, e.count))
            .collect()
    }
}

impl std::fmt::Display for SummaryView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Today:           {}", self.today)?;
        writeln!(f, "Total:           {}", self.total)?;
        writeln!(f, "Last subject:    {}", self.last_name)?;
        writeln!(f, "Last inspection: {}", self.last_by)?;
        for line in self.leaderboard_lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_renders_placeholder() {
        let view = SummaryView::from_store(&CounterStore::default());
        assert_eq!(view.leaderboard_lines(), vec![NO_DATA.to_string()]);
        assert_eq!(view.last_name, "-");
        assert_eq!(view.last_by, "-");
        // Never an empty string.
        assert!(!view.to_string().trim().is_empty());
    }

    #[test]
    fn leaderboard_sorted_and_stable() {
        let mut store = CounterStore::default();
        store.users.insert("a".into(), 3);
        store.users.insert("b".into(), 5);
        store.users.insert("c".into(), 3);

        let view = SummaryView::from_store(&store);
        assert_eq!(view.leaderboard[0].user, "b");
        // Tied entries keep their original relative order.
        assert_eq!(view.leaderboard[1].user, "a");
        assert_eq!(view.leaderboard[2].user, "c");
    }

    #[test]
    fn line_format() {
        let mut store = CounterStore::default();
        store.record("Max", "alice");
        let view = SummaryView::from_store(&store);
        assert_eq!(view.leaderboard_lines(), vec!["- alice → 1x".to_string()]);
    }

    #[test]
    fn scalars_passed_through_verbatim() {
        let mut store = CounterStore::default();
        store.record("Max", "alice");
        store.record("Erika", "bob");

        let view = SummaryView::from_store(&store);
        assert_eq!(view.today, 2);
        assert_eq!(view.total, 2);
        assert_eq!(view.last_name, "Erika");
        assert_eq!(view.last_by, "bob");
    }
}
