use crate::error::{PatrolError, Result};
use crate::roster::Member;
use crate::types::{SelectionMode, SessionPhase, Subject};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SubjectChoice
// ---------------------------------------------------------------------------

/// The caller's answer to the subject prompt: a pick from the presented
/// options, or free text via the manual-entry escape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubjectChoice {
    Member { id: String },
    Manual { name: String },
}

// ---------------------------------------------------------------------------
// FormSpec
// ---------------------------------------------------------------------------

/// Presentation hints for the detail form.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub multiline: bool,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormSpec {
    pub fields: Vec<FieldSpec>,
}

impl FormSpec {
    fn detail_form() -> Self {
        Self {
            fields: vec![
                FieldSpec {
                    key: "location",
                    label: "Location",
                    multiline: false,
                    required: true,
                },
                FieldSpec {
                    key: "status",
                    label: "Status",
                    multiline: true,
                    required: true,
                },
                FieldSpec {
                    key: "time",
                    label: "Time",
                    multiline: false,
                    required: true,
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Server-side state of one in-progress submission, keyed by a generated id.
/// Sessions never share mutable fields; a suspended session holds no lock on
/// the counter store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    /// Acting user; becomes `submitted_by` on commit.
    pub caller: String,
    pub phase: SessionPhase,
    pub mode: SelectionMode,
    /// Candidate subjects presented to the caller (already truncated).
    pub options: Vec<Member>,
    pub subject: Option<Subject>,
    pub companions: Vec<Subject>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        caller: impl Into<String>,
        mode: SelectionMode,
        options: Vec<Member>,
        ttl_minutes: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            caller: caller.into(),
            phase: SessionPhase::SubjectSelecting,
            mode,
            options,
            subject: None,
            companions: Vec::new(),
            created_at: now,
            expires_at: now + Duration::minutes(i64::from(ttl_minutes)),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    fn advance(&mut self, to: SessionPhase) -> Result<()> {
        if !self.phase.can_advance(to) {
            return Err(PatrolError::InvalidTransition {
                from: self.phase.to_string(),
                to: to.to_string(),
                reason: "transitions are forward-only".to_string(),
            });
        }
        debug!(session = %self.id, from = %self.phase, to = %to, "session transition");
        self.phase = to;
        Ok(())
    }

    fn option(&self, id: &str) -> Result<&Member> {
        self.options
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| PatrolError::UnknownOption(id.to_string()))
    }

    /// Resolve the inspected subject. A member pick yields the member's
    /// identifier, never free text; manual entry accepts arbitrary text.
    pub fn resolve_subject(&mut self, choice: SubjectChoice) -> Result<()> {
        if self.phase != SessionPhase::SubjectSelecting {
            return Err(PatrolError::InvalidTransition {
                from: self.phase.to_string(),
                to: SessionPhase::SubjectResolved.to_string(),
                reason: "subject already resolved".to_string(),
            });
        }

        let subject = match choice {
            SubjectChoice::Member { id } => {
                let member = self.option(&id)?;
                Subject::Member {
                    id: member.id.clone(),
                    display_name: member.display_name.clone(),
                }
            }
            SubjectChoice::Manual { name } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(PatrolError::Validation("subject".to_string()));
                }
                Subject::Named { name }
            }
        };

        self.subject = Some(subject);
        match self.mode {
            SelectionMode::Single => self.advance(SessionPhase::SubjectResolved),
            SelectionMode::TwoStep => self.advance(SessionPhase::CompanionSelecting),
        }
    }

    /// Resolve the companions step (two-step mode only). Zero picks is valid;
    /// picks beyond `max` are dropped silently in pick order.
    pub fn resolve_companions(&mut self, picks: &[String], max: usize) -> Result<()> {
        if self.phase != SessionPhase::CompanionSelecting {
            return Err(PatrolError::InvalidTransition {
                from: self.phase.to_string(),
                to: SessionPhase::SubjectResolved.to_string(),
                reason: "no companions step pending".to_string(),
            });
        }

        let mut companions = Vec::new();
        for id in picks.iter().take(max) {
            let member = self.option(id)?;
            companions.push(Subject::Member {
                id: member.id.clone(),
                display_name: member.display_name.clone(),
            });
        }

        self.companions = companions;
        self.advance(SessionPhase::SubjectResolved)
    }

    /// Move to the form step and return what to present.
    pub fn open_form(&mut self) -> Result<FormSpec> {
        self.advance(SessionPhase::FormShown)?;
        Ok(FormSpec::detail_form())
    }

    pub fn mark_committed(&mut self) -> Result<()> {
        self.advance(SessionPhase::RecordCommitted)
    }

    /// Abandon the session. Never mutates the counter store.
    pub fn abort(&mut self) -> Result<()> {
        self.advance(SessionPhase::Aborted)
    }
}

// ---------------------------------------------------------------------------
// SessionTable
// ---------------------------------------------------------------------------

/// In-memory table of live sessions. Expiry is enforced on access; stale
/// sessions are discarded and the caller must re-invoke the flow.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<Uuid, Session>,
}

impl SessionTable {
    pub fn insert(&mut self, session: Session) {
        self.sessions.insert(session.id, session);
    }

    pub fn get_mut(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<&mut Session> {
        let expired = match self.sessions.get(&id) {
            Some(s) => s.is_expired(now),
            None => return Err(PatrolError::SessionExpired(id.to_string())),
        };
        if expired {
            self.sessions.remove(&id);
            return Err(PatrolError::SessionExpired(id.to_string()));
        }
        Ok(self.sessions.get_mut(&id).unwrap())
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Session> {
        self.sessions.remove(&id)
    }

    /// Drop all expired sessions. Returns how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired(now));
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
