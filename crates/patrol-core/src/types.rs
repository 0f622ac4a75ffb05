use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Subject
// ---------------------------------------------------------------------------

/// The person an inspection record is about: either a member picked from the
/// roster (identifier-backed) or a free-text name from manual entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    Member { id: String, display_name: String },
    Named { name: String },
}

impl Subject {
    /// Display value used in confirmation views and `lastName`.
    pub fn display(&self) -> &str {
        match self {
            Subject::Member { display_name, .. } => display_name,
            Subject::Named { name } => name,
        }
    }

    /// Roster identifier, if this subject is backed by one.
    pub fn member_id(&self) -> Option<&str> {
        match self {
            Subject::Member { id, .. } => Some(id),
            Subject::Named { .. } => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Per-session workflow phase. Transitions are forward-only; `Aborted` is
/// reachable from any non-terminal phase. No phase is revisited once left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    SubjectSelecting,
    CompanionSelecting,
    SubjectResolved,
    FormShown,
    RecordCommitted,
    Aborted,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::RecordCommitted | SessionPhase::Aborted)
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_advance(self, to: SessionPhase) -> bool {
        use SessionPhase::*;
        if to == Aborted {
            return !self.is_terminal();
        }
        matches!(
            (self, to),
            (SubjectSelecting, CompanionSelecting)
                | (SubjectSelecting, SubjectResolved)
                | (CompanionSelecting, SubjectResolved)
                | (SubjectResolved, FormShown)
                | (FormShown, RecordCommitted)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::SubjectSelecting => "subject_selecting",
            SessionPhase::CompanionSelecting => "companion_selecting",
            SessionPhase::SubjectResolved => "subject_resolved",
            SessionPhase::FormShown => "form_shown",
            SessionPhase::RecordCommitted => "record_committed",
            SessionPhase::Aborted => "aborted",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SelectionMode
// ---------------------------------------------------------------------------

/// Shape of the subject-selection step. `Single` resolves the subject and
/// proceeds straight to the form; `TwoStep` asks for the subject first and
/// then for companions (0..N picks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Single,
    TwoStep,
}

impl SelectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionMode::Single => "single",
            SelectionMode::TwoStep => "two_step",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SelectionMode {
    type Err = crate::error::PatrolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(SelectionMode::Single),
            "two_step" | "two-step" => Ok(SelectionMode::TwoStep),
            _ => Err(crate::error::PatrolError::UnknownOption(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_display_and_id() {
        let member = Subject::Member {
            id: "1001".into(),
            display_name: "max".into(),
        };
        assert_eq!(member.display(), "max");
        assert_eq!(member.member_id(), Some("1001"));

        let named = Subject::Named { name: "Max M.".into() };
        assert_eq!(named.display(), "Max M.");
        assert_eq!(named.member_id(), None);
    }

    #[test]
    fn forward_only_transitions() {
        use SessionPhase::*;
        assert!(SubjectSelecting.can_advance(SubjectResolved));
        assert!(SubjectSelecting.can_advance(CompanionSelecting));
        assert!(CompanionSelecting.can_advance(SubjectResolved));
        assert!(SubjectResolved.can_advance(FormShown));
        assert!(FormShown.can_advance(RecordCommitted));

        // No phase is revisited once left.
        assert!(!SubjectResolved.can_advance(SubjectSelecting));
        assert!(!FormShown.can_advance(SubjectResolved));
        assert!(!SubjectSelecting.can_advance(FormShown));
    }

    #[test]
    fn aborted_reachable_from_non_terminal_only() {
        use SessionPhase::*;
        for phase in [SubjectSelecting, CompanionSelecting, SubjectResolved, FormShown] {
            assert!(phase.can_advance(Aborted), "{phase} should abort");
        }
        assert!(!RecordCommitted.can_advance(Aborted));
        assert!(!Aborted.can_advance(Aborted));
    }

    #[test]
    fn selection_mode_roundtrip() {
        use std::str::FromStr;
        for mode in [SelectionMode::Single, SelectionMode::TwoStep] {
            let parsed = SelectionMode::from_str(mode.as_str()).unwrap();
            assert_eq!(mode, parsed);
        }
        assert!(SelectionMode::from_str("three_step").is_err());
    }
}
