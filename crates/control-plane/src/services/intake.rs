// Intake service: guided intake sessions held in memory
//
// Each session sits behind its own async mutex. Actions take the lock with
// try_lock, so a second request while a completion write is running is
// rejected as busy instead of queueing a duplicate submit. Actions run in a
// spawned task so a dropped HTTP request cannot cancel a write halfway.
//
// Sessions leave the map once their requirement is stored, and sessions left
// idle past the TTL are pruned whenever a new one is created.

use gatherly_core::traits::RequirementStore;
use gatherly_core::{
    ChatMessage, Error, FieldId, IntakeForm, IntakeSession, SubmitState, Toast, ToastBuffer,
    TracingNotifier,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Intake session {0} not found")]
    NotFound(Uuid),

    #[error("Intake session is busy, try again")]
    Busy,

    #[error("Intake action was interrupted")]
    Interrupted,
}

/// One user action against a session
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum IntakeAction {
    Answer { step_index: usize, value: String },
    Toggle { option: String },
    Confirm,
    Skip,
    Submit,
}

/// Active step as shown to the client
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StepView {
    pub index: usize,
    pub prompt: String,
    pub field: FieldId,
    /// single_choice, free_text, date, numeric or multi_choice
    pub kind: String,
    pub options: Vec<String>,
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IntakeView {
    pub id: Uuid,
    pub pointer: usize,
    pub total_steps: usize,
    pub complete: bool,
    pub current_step: Option<StepView>,
    /// Options toggled on for the active multi-choice step
    pub selection: Vec<String>,
    pub form: IntakeForm,
    pub transcript: Vec<ChatMessage>,
    pub submit_state: SubmitState,
}

impl IntakeView {
    pub fn of(session: &IntakeSession) -> Self {
        let flow = session.flow();
        Self {
            id: session.id(),
            pointer: flow.pointer(),
            total_steps: flow.steps().len(),
            complete: flow.is_complete(),
            current_step: flow.current_step().map(|step| StepView {
                index: flow.pointer(),
                prompt: step.prompt.to_string(),
                field: step.field,
                kind: step.kind.name().to_string(),
                options: step.kind.options().iter().map(|o| o.to_string()).collect(),
                optional: step.optional,
            }),
            selection: flow.selection(),
            form: flow.form().clone(),
            transcript: flow.transcript().to_vec(),
            submit_state: session.state().clone(),
        }
    }
}

/// Result of one action. `error` is set when the action was rejected or the
/// write failed; the view and toasts are still meaningful in that case.
#[derive(Debug)]
pub struct ActionOutcome {
    pub session: IntakeView,
    pub toasts: Vec<Toast>,
    /// For toggles, whether the option is selected afterwards
    pub selected: Option<bool>,
    pub error: Option<Error>,
}

/// Sessions untouched for this long are dropped
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

type SharedSession = Arc<Mutex<IntakeSession>>;

struct SessionEntry {
    session: SharedSession,
    last_touched: parking_lot::Mutex<Instant>,
}

impl SessionEntry {
    fn idle_for(&self) -> Duration {
        self.last_touched.lock().elapsed()
    }
}

pub struct IntakeService {
    store: Arc<dyn RequirementStore>,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    idle_ttl: Duration,
}

impl IntakeService {
    pub fn new(store: Arc<dyn RequirementStore>) -> Self {
        Self::with_idle_ttl(store, DEFAULT_IDLE_TTL)
    }

    pub fn with_idle_ttl(store: Arc<dyn RequirementStore>, idle_ttl: Duration) -> Self {
        Self {
            store,
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    pub fn create(&self) -> IntakeView {
        let session = IntakeSession::new(self.store.clone(), Arc::new(TracingNotifier));
        let view = IntakeView::of(&session);

        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.idle_for() < self.idle_ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "dropped idle intake sessions");
        }
        sessions.insert(
            view.id,
            SessionEntry {
                session: Arc::new(Mutex::new(session)),
                last_touched: parking_lot::Mutex::new(Instant::now()),
            },
        );
        drop(sessions);

        tracing::info!(session_id = %view.id, "intake session started");
        view
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    fn lookup(&self, id: Uuid) -> Result<SharedSession, IntakeError> {
        let sessions = self.sessions.read();
        let entry = sessions.get(&id).ok_or(IntakeError::NotFound(id))?;
        *entry.last_touched.lock() = Instant::now();
        Ok(entry.session.clone())
    }

    fn evict(&self, id: Uuid) {
        if self.sessions.write().remove(&id).is_some() {
            tracing::debug!(session_id = %id, "intake session closed");
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<IntakeView, IntakeError> {
        let session = self.lookup(id)?;
        let guard = session.lock().await;
        Ok(IntakeView::of(&guard))
    }

    pub async fn act(&self, id: Uuid, action: IntakeAction) -> Result<ActionOutcome, IntakeError> {
        let session = self.lookup(id)?;
        let mut guard = session.try_lock_owned().map_err(|_| IntakeError::Busy)?;

        let task = tokio::spawn(async move {
            let toasts = ToastBuffer::new();
            guard.set_notifier(Arc::new(toasts.clone()));

            let mut selected = None;
            let result = match action {
                IntakeAction::Answer { step_index, value } => {
                    guard.answer(step_index, &value).await.map(|_| ())
                }
                IntakeAction::Toggle { option } => guard.toggle(&option).map(|on| {
                    selected = Some(on);
                }),
                IntakeAction::Confirm => guard.confirm().await.map(|_| ()),
                IntakeAction::Skip => guard.skip().await.map(|_| ()),
                IntakeAction::Submit => guard.submit().await.map(|_| ()),
            };

            // An automatic completion write records failure in the state only
            let error = match (result, guard.state()) {
                (Err(e), _) => Some(e),
                (Ok(()), SubmitState::Failed { message }) if guard.flow().is_complete() => {
                    Some(Error::collaborator(message.clone()))
                }
                (Ok(()), _) => None,
            };

            guard.set_notifier(Arc::new(TracingNotifier));
            ActionOutcome {
                session: IntakeView::of(&guard),
                toasts: toasts.drain(),
                selected,
                error,
            }
        });

        let outcome = task.await.map_err(|e| {
            tracing::error!(session_id = %id, error = %e, "intake action task failed");
            IntakeError::Interrupted
        })?;

        if matches!(outcome.session.submit_state, SubmitState::Submitted { .. }) {
            self.evict(id);
        }
        Ok(outcome)
    }
}
