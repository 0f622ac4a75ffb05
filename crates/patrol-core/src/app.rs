use crate::config::Config;
use crate::error::{PatrolError, Result};
use crate::record::{ConfirmationView, FormFields, InspectionRecord};
use crate::roster::Member;
use crate::session::{FormSpec, Session, SessionTable, SubjectChoice};
use crate::store::CounterStore;
use crate::summary::SummaryView;
use crate::types::{SessionPhase, Subject};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SelectionContext
// ---------------------------------------------------------------------------

/// What the activation event carries: the acting user and the peer list
/// visible to them (directory lookup result, bots included as delivered).
#[derive(Debug, Clone)]
pub struct SelectionContext {
    pub caller: String,
    pub members: Vec<Member>,
}

// ---------------------------------------------------------------------------
// SubmissionResult
// ---------------------------------------------------------------------------

/// Outcome of a committed submission: the formatted confirmation and the
/// counters as written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub confirmation: ConfirmationView,
    pub store: CounterStore,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Application context passed into every flow operation: configuration, the
/// live session table, and the store commit lock. There are no ambient
/// singletons.
#[derive(Debug)]
pub struct App {
    root: PathBuf,
    config: Config,
    sessions: Mutex<SessionTable>,
    /// Serializes the load-modify-store commit so two concurrent
    /// submissions never read the same pre-increment counters.
    store_lock: Mutex<()>,
}

impl App {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = Config::load(&root)?;
        Ok(Self {
            root,
            config,
            sessions: Mutex::new(SessionTable::default()),
            store_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ---------------------------------------------------------------------------
    // Subject selection flow
    // ---------------------------------------------------------------------------

    /// Start a submission session. The returned snapshot carries the
    /// candidate options to present (bots excluded, truncated silently to
    /// the configured menu cap) alongside the session id that threads all
    /// later steps.
    pub fn begin_subject_selection(&self, ctx: SelectionContext) -> Session {
        let options: Vec<Member> = ctx
            .members
            .into_iter()
            .filter(|m| !m.bot)
            .take(self.config.selection.max_options)
            .collect();

        let session = Session::new(
            ctx.caller,
            self.config.selection.mode,
            options,
            self.config.session.ttl_minutes,
        );
        debug!(session = %session.id, options = session.options.len(), "selection started");

        let mut table = self.sessions.lock().expect("session table lock poisoned");
        table.purge_expired(Utc::now());
        table.insert(session.clone());
        session
    }

    /// Record the subject choice for a live session.
    pub fn choose_subject(&self, id: Uuid, choice: SubjectChoice) -> Result<Session> {
        let mut table = self.sessions.lock().expect("session table lock poisoned");
        let session = table.get_mut(id, Utc::now())?;
        session.resolve_subject(choice)?;
        Ok(session.clone())
    }

    /// Record the companions choice (two-step mode).
    pub fn choose_companions(&self, id: Uuid, picks: &[String]) -> Result<Session> {
        let mut table = self.sessions.lock().expect("session table lock poisoned");
        let session = table.get_mut(id, Utc::now())?;
        session.resolve_companions(picks, self.config.selection.companions_max)?;
        Ok(session.clone())
    }

    /// Advance a resolved session to the form step.
    pub fn open_form(&self, id: Uuid) -> Result<FormSpec> {
        let mut table = self.sessions.lock().expect("session table lock poisoned");
        let session = table.get_mut(id, Utc::now())?;
        session.open_form()
    }

    /// Abandon a session. The counter store is left untouched.
    pub fn cancel_session(&self, id: Uuid) -> Result<()> {
        let mut table = self.sessions.lock().expect("session table lock poisoned");
        let session = table.get_mut(id, Utc::now())?;
        session.abort()?;
        table.remove(id);
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Record submission flow
    // ---------------------------------------------------------------------------

    /// Commit the record for a session whose form was shown. On success the
    /// session is finished and dropped from the table; on any error the
    /// store is not advanced and no success view is produced.
    pub fn submit_record(&self, id: Uuid, fields: FormFields) -> Result<SubmissionResult> {
        let mut table = self.sessions.lock().expect("session table lock poisoned");
        let session = table.get_mut(id, Utc::now())?;

        // Reject out-of-order submits before touching the store.
        if session.phase != SessionPhase::FormShown {
            return Err(PatrolError::InvalidTransition {
                from: session.phase.to_string(),
                to: SessionPhase::RecordCommitted.to_string(),
                reason: "form was not shown".to_string(),
            });
        }

        let record = InspectionRecord {
            subject: session.subject.clone().unwrap_or(Subject::Named {
                name: String::new(),
            }),
            location: fields.location,
            status: fields.status,
            time: fields.time,
            companions: session.companions.clone(),
            submitted_by: session.caller.clone(),
            submitted_at: Utc::now(),
        };

        let result = self.commit(&record)?;
        session.mark_committed()?;
        table.remove(id);
        Ok(result)
    }

    /// Commit a record without a selection session. The subject is taken
    /// as given (free text or a known member).
    pub fn submit_direct(&self, record: InspectionRecord) -> Result<SubmissionResult> {
        self.commit(&record)
    }

    /// The critical section: load, fold in one submission, persist whole.
    fn commit(&self, record: &InspectionRecord) -> Result<SubmissionResult> {
        record.validate()?;

        let _guard = self.store_lock.lock().expect("store lock poisoned");
        let mut store = CounterStore::load_or_default(&self.root);
        store.record(record.subject.display(), &record.submitted_by);
        if let Err(e) = store.save(&self.root) {
            error!(error = %e, "submission not committed");
            return Err(e);
        }

        debug!(total = store.total, by = %record.submitted_by, "submission committed");
        Ok(SubmissionResult {
            confirmation: record.confirmation(),
            store,
        })
    }

    // ---------------------------------------------------------------------------
    // Summary
    // ---------------------------------------------------------------------------

    /// Ranked rollup of the current counters. Read-only; a missing or
    /// unreadable store renders as empty.
    pub fn render_summary(&self) -> SummaryView {
        SummaryView::from_store(&CounterStore::load_or_default(&self.root))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatrolError;
    use crate::types::{SelectionMode, SessionPhase};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn fields() -> FormFields {
        FormFields {
            location: "Gate 1".into(),
            status: "OK".into(),
            time: "10:00".into(),
        }
    }

    fn members() -> Vec<Member> {
        vec![
            Member::new("1001", "max"),
            Member::new("1002", "erika"),
            Member {
                id: "2001".into(),
                display_name: "statsbot".into(),
                bot: true,
            },
        ]
    }

    fn direct_record(subject: &str, by: &str) -> InspectionRecord {
        InspectionRecord {
            subject: Subject::Named {
                name: subject.into(),
            },
            location: "Gate 1".into(),
            status: "OK".into(),
            time: "10:00".into(),
            companions: Vec::new(),
            submitted_by: by.into(),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn full_two_step_flow() {
        let dir = TempDir::new().unwrap();
        let app = App::open(dir.path()).unwrap();
        assert_eq!(app.config().selection.mode, SelectionMode::TwoStep);

        let session = app.begin_subject_selection(SelectionContext {
            caller: "alice".into(),
            members: members(),
        });
        // Bot excluded from the presented options.
        assert_eq!(session.options.len(), 2);

        let session = app
            .choose_subject(session.id, SubjectChoice::Member { id: "1001".into() })
            .unwrap();
        assert_eq!(session.phase, SessionPhase::CompanionSelecting);

        let session = app
            .choose_companions(session.id, &["1002".into()])
            .unwrap();
        assert_eq!(session.phase, SessionPhase::SubjectResolved);

        app.open_form(session.id).unwrap();
        let result = app.submit_record(session.id, fields()).unwrap();

        assert_eq!(result.store.today, 1);
        assert_eq!(result.store.total, 1);
        assert_eq!(result.store.last_name, "max");
        assert_eq!(result.store.last_by, "alice");
        assert_eq!(result.confirmation.companions, "erika");

        // The session is finished; a second submit must be rejected.
        let err = app.submit_record(session.id, fields()).unwrap_err();
        assert!(matches!(err, PatrolError::SessionExpired(_)));
    }

    #[test]
    fn empty_store_scenario() {
        let dir = TempDir::new().unwrap();
        let app = App::open(dir.path()).unwrap();

        app.submit_direct(direct_record("Max", "alice")).unwrap();

        let store = CounterStore::load_or_default(dir.path());
        assert_eq!(store.today, 1);
        assert_eq!(store.total, 1);
        assert_eq!(store.last_name, "Max");
        assert_eq!(store.last_by, "alice");
        assert_eq!(store.users.get("alice"), Some(&1));
        assert_eq!(store.users.len(), 1);
    }

    #[test]
    fn concurrent_submissions_lose_no_updates() {
        let dir = TempDir::new().unwrap();
        let app = Arc::new(App::open(dir.path()).unwrap());

        let threads: u64 = 8;
        let per_thread: u64 = 5;
        std::thread::scope(|scope| {
            for t in 0..threads {
                let app = Arc::clone(&app);
                scope.spawn(move || {
                    let by = format!("user-{t}");
                    for _ in 0..per_thread {
                        app.submit_direct(direct_record("Max", &by)).unwrap();
                    }
                });
            }
        });

        let store = CounterStore::load_or_default(dir.path());
        let expected = threads * per_thread;
        assert_eq!(store.total, expected);
        assert_eq!(store.users.values().sum::<u64>(), expected);
        assert!(store.today <= store.total);
    }

    #[test]
    fn write_failure_is_not_committed() {
        let dir = TempDir::new().unwrap();
        // Persisting must fail: the target path is occupied by a directory.
        std::fs::create_dir_all(dir.path().join(".patrol/counters.json")).unwrap();

        let app = App::open(dir.path()).unwrap();
        let err = app.submit_direct(direct_record("Max", "alice")).unwrap_err();
        assert!(matches!(err, PatrolError::StoreWrite { .. }));

        // Nothing observable was committed.
        let view = app.render_summary();
        assert_eq!(view.total, 0);
    }

    #[test]
    fn validation_failure_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let app = App::open(dir.path()).unwrap();

        let mut record = direct_record("Max", "alice");
        record.status = "  ".into();
        let err = app.submit_direct(record).unwrap_err();
        assert!(matches!(err, PatrolError::Validation(_)));
        assert!(!dir.path().join(".patrol/counters.json").exists());
    }

    #[test]
    fn cancel_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let app = App::open(dir.path()).unwrap();

        let session = app.begin_subject_selection(SelectionContext {
            caller: "alice".into(),
            members: members(),
        });
        app.cancel_session(session.id).unwrap();

        assert!(!dir.path().join(".patrol/counters.json").exists());
        let err = app
            .choose_subject(session.id, SubjectChoice::Manual { name: "Max".into() })
            .unwrap_err();
        assert!(matches!(err, PatrolError::SessionExpired(_)));
    }

    #[test]
    fn zero_ttl_sessions_expire_immediately() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.session.ttl_minutes = 0;
        config.save(dir.path()).unwrap();

        let app = App::open(dir.path()).unwrap();
        let session = app.begin_subject_selection(SelectionContext {
            caller: "alice".into(),
            members: members(),
        });

        let err = app
            .choose_subject(session.id, SubjectChoice::Manual { name: "Max".into() })
            .unwrap_err();
        assert!(matches!(err, PatrolError::SessionExpired(_)));
    }

    #[test]
    fn menu_cap_truncates_candidates() {
        let dir = TempDir::new().unwrap();
        let app = App::open(dir.path()).unwrap();

        let many: Vec<Member> = (0..40)
            .map(|i| Member::new(format!("id-{i}"), format!("member {i}")))
            .collect();
        let session = app.begin_subject_selection(SelectionContext {
            caller: "alice".into(),
            members: many,
        });
        assert_eq!(session.options.len(), 25);
        assert_eq!(session.options[0].id, "id-0");
    }
}
