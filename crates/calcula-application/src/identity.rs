//! SessionIdentityService - which session this device is working on.
//!
//! Holds the current session identifier, hydrates it once from durable
//! storage, creates a session on demand (at most once across concurrent
//! callers) and mirrors every change to storage and to subscribers.

use calcula_core::error::Result;
use calcula_core::session::{SessionApi, SessionId, SessionIdRepository};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{OnceCell, watch};

/// Lifecycle of the identity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityPhase {
    Uninitialized,
    Hydrating,
    Idle,
    Creating,
    Error,
}

/// Point-in-time view of the identity store.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentitySnapshot {
    pub session_id: Option<SessionId>,
    pub phase: IdentityPhase,
    pub error: Option<String>,
    /// True while hydrating or creating.
    pub loading: bool,
    /// True while a photo upload is in flight.
    pub uploading: bool,
}

#[derive(Debug)]
struct IdentityState {
    session_id: Option<SessionId>,
    phase: IdentityPhase,
    error: Option<String>,
    uploading: bool,
    /// Bumped by explicit join/reset so background work can tell it was overtaken.
    revision: u64,
}

pub struct SessionIdentityService {
    api: Arc<dyn SessionApi>,
    repository: Arc<dyn SessionIdRepository>,
    state: Mutex<IdentityState>,
    hydration: OnceCell<()>,
    create_lock: tokio::sync::Mutex<()>,
    /// Serializes writes of the durable record.
    persist_lock: tokio::sync::Mutex<()>,
    session_tx: watch::Sender<Option<SessionId>>,
}

impl SessionIdentityService {
    pub fn new(api: Arc<dyn SessionApi>, repository: Arc<dyn SessionIdRepository>) -> Self {
        let (session_tx, _) = watch::channel(None);
        Self {
            api,
            repository,
            state: Mutex::new(IdentityState {
                session_id: None,
                phase: IdentityPhase::Uninitialized,
                error: None,
                uploading: false,
                revision: 0,
            }),
            hydration: OnceCell::new(),
            create_lock: tokio::sync::Mutex::new(()),
            persist_lock: tokio::sync::Mutex::new(()),
            session_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, IdentityState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the stored identifier. Runs once; later callers await the same
    /// hydration and return immediately afterwards.
    ///
    /// Read failures are logged and treated as "no session". An identifier
    /// joined or reset while the read was in flight is kept.
    pub async fn hydrate(&self) {
        self.hydration
            .get_or_init(|| async {
                let revision = {
                    let mut state = self.lock();
                    state.phase = IdentityPhase::Hydrating;
                    state.revision
                };

                let stored = match self.repository.load().await {
                    Ok(stored) => stored,
                    Err(e) => {
                        tracing::warn!("[SessionIdentity] Failed to read stored session: {}", e);
                        None
                    }
                };

                let current = {
                    let mut state = self.lock();
                    if state.revision == revision {
                        state.session_id = stored;
                    } else {
                        tracing::debug!(
                            "[SessionIdentity] Session changed during hydration, keeping it"
                        );
                    }
                    if state.phase == IdentityPhase::Hydrating {
                        state.phase = IdentityPhase::Idle;
                    }
                    state.session_id.clone()
                };

                if let Some(id) = &current {
                    tracing::info!("[SessionIdentity] Hydrated session {}", id);
                }
                self.publish(current);
            })
            .await;
    }

    /// Returns the current session, creating one if there is none.
    ///
    /// Concurrent callers share a single creation request.
    pub async fn ensure_session(&self) -> Result<SessionId> {
        self.hydrate().await;
        if let Some(id) = self.session_id() {
            return Ok(id);
        }

        let _guard = self.create_lock.lock().await;
        // another caller may have finished creating while we waited
        if let Some(id) = self.session_id() {
            return Ok(id);
        }

        let revision = {
            let mut state = self.lock();
            state.phase = IdentityPhase::Creating;
            state.error = None;
            state.revision
        };

        match self.api.create_session().await {
            Ok(created) => {
                let current = {
                    let mut state = self.lock();
                    state.phase = IdentityPhase::Idle;
                    if state.revision == revision || state.session_id.is_none() {
                        state.session_id = Some(created.clone());
                    }
                    state.session_id.clone()
                };
                tracing::info!("[SessionIdentity] Created session {}", created);
                self.persist().await;
                self.publish(current.clone());
                Ok(current.unwrap_or(created))
            }
            Err(e) => {
                tracing::error!("[SessionIdentity] Failed to create session: {}", e);
                let mut state = self.lock();
                state.phase = IdentityPhase::Error;
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Forgets the current session. The next `ensure_session` creates a new one.
    pub async fn reset_session(&self) {
        {
            let mut state = self.lock();
            state.session_id = None;
            state.error = None;
            state.uploading = false;
            state.phase = IdentityPhase::Idle;
            state.revision += 1;
        }
        tracing::info!("[SessionIdentity] Session reset");
        self.persist().await;
        self.publish(None);
    }

    /// Switches to a session shared by a peer (QR code or typed in).
    pub async fn join_session(&self, input: &str) -> Result<SessionId> {
        let id = SessionId::from_peer(input)?;
        {
            let mut state = self.lock();
            state.session_id = Some(id.clone());
            state.error = None;
            state.uploading = false;
            state.phase = IdentityPhase::Idle;
            state.revision += 1;
        }
        tracing::info!("[SessionIdentity] Joined session {}", id);
        self.persist().await;
        self.publish(Some(id.clone()));
        Ok(id)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.lock().session_id.clone()
    }

    /// Receives the current identifier and every later change.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionId>> {
        self.session_tx.subscribe()
    }

    pub fn set_uploading(&self, uploading: bool) {
        self.lock().uploading = uploading;
    }

    pub fn is_uploading(&self) -> bool {
        self.lock().uploading
    }

    pub fn clear_error(&self) {
        let mut state = self.lock();
        state.error = None;
        if state.phase == IdentityPhase::Error {
            state.phase = IdentityPhase::Idle;
        }
    }

    pub fn snapshot(&self) -> IdentitySnapshot {
        let state = self.lock();
        IdentitySnapshot {
            session_id: state.session_id.clone(),
            phase: state.phase,
            error: state.error.clone(),
            loading: matches!(
                state.phase,
                IdentityPhase::Hydrating | IdentityPhase::Creating
            ),
            uploading: state.uploading,
        }
    }

    fn publish(&self, session_id: Option<SessionId>) {
        self.session_tx.send_if_modified(|current| {
            if *current == session_id {
                false
            } else {
                *current = session_id;
                true
            }
        });
    }

    /// Writes the identifier current at the time the write lock is taken,
    /// so overlapping changes reach the disk in order and the last one wins.
    async fn persist(&self) {
        let _guard = self.persist_lock.lock().await;
        let session_id = self.session_id();
        let result = match &session_id {
            Some(id) => self.repository.save(id).await,
            None => self.repository.clear().await,
        };
        if let Err(e) = result {
            tracing::warn!("[SessionIdentity] Failed to persist session id: {}", e);
        }
    }
}
