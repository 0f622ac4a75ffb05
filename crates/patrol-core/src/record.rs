use crate::error::{PatrolError, Result};
use crate::types::Subject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback literal shown when no companions were given.
pub const UNSPECIFIED: &str = "not specified";

// ---------------------------------------------------------------------------
// FormFields
// ---------------------------------------------------------------------------

/// The structured fields collected by the detail form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormFields {
    pub location: String,
    pub status: String,
    pub time: String,
}

// ---------------------------------------------------------------------------
// InspectionRecord
// ---------------------------------------------------------------------------

/// One completed inspection. Ephemeral: only the aggregate counters are
/// persisted, the record itself exists for the confirmation view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub subject: Subject,
    pub location: String,
    pub status: String,
    pub time: String,
    pub companions: Vec<Subject>,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
}

impl InspectionRecord {
    /// Required fields must be non-empty after trimming. Companions are
    /// optional and substituted with [`UNSPECIFIED`] at render time.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("subject", self.subject.display()),
            ("location", self.location.as_str()),
            ("status", self.status.as_str()),
            ("time", self.time.as_str()),
            ("submitted_by", self.submitted_by.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(PatrolError::Validation(field.to_string()));
            }
        }
        Ok(())
    }

    pub fn companions_display(&self) -> String {
        if self.companions.is_empty() {
            return UNSPECIFIED.to_string();
        }
        self.companions
            .iter()
            .map(|c| c.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn confirmation(&self) -> ConfirmationView {
        ConfirmationView {
            title: "Inspection recorded".to_string(),
            name: self.subject.display().to_string(),
            time: self.time.clone(),
            location: self.location.clone(),
            status: self.status.clone(),
            companions: self.companions_display(),
            footer: format!(
                "by {} • {}",
                self.submitted_by,
                self.submitted_at.format("%Y-%m-%d")
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfirmationView
// ---------------------------------------------------------------------------

/// Formatted view of a committed record, handed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationView {
    pub title: String,
    pub name: String,
    pub time: String,
    pub location: String,
    pub status: String,
    pub companions: String,
    pub footer: String,
}

impl ConfirmationView {
    pub fn lines(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            format!("Name:       {}", self.name),
            format!("Time:       {}", self.time),
            format!("Location:   {}", self.location),
            format!("Status:     {}", self.status),
            format!("Companions: {}", self.companions),
            self.footer.clone(),
        ]
    }
}

impl std::fmt::Display for ConfirmationView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
