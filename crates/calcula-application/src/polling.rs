//! SessionPoller - keeps a session snapshot fresh by polling the server.
//!
//! The poller is bound to at most one session at a time. Binding starts a
//! repeating task (one loading fetch, then silent fetches on an interval);
//! rebinding or dropping the poller cancels it.
//!
//! Every fetch carries the generation it was issued under and a sequence
//! number. A response is applied only if its generation is still current and
//! nothing newer (another fetch or an optimistic patch) has been applied
//! since, so a slow response can never roll the snapshot back.

use calcula_core::config::DEFAULT_POLL_INTERVAL_MS;
use calcula_core::error::Result;
use calcula_core::session::{SessionApi, SessionId, SessionSnapshot};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// What the poller currently knows about its session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollState {
    /// Last snapshot applied. Kept when a later fetch fails.
    pub data: Option<SessionSnapshot>,
    /// Message of the most recent failed fetch, cleared by the next success.
    pub error: Option<String>,
    /// True while at least one loading (non-background) fetch is outstanding.
    pub loading: bool,
}

#[derive(Debug, Default)]
struct Control {
    session_id: Option<SessionId>,
    generation: u64,
    next_seq: u64,
    applied_seq: u64,
    pending_loads: usize,
    binding: Option<CancellationToken>,
}

struct FetchTicket {
    session_id: SessionId,
    generation: u64,
    seq: u64,
    loading: bool,
}

struct PollerInner {
    api: Arc<dyn SessionApi>,
    interval: Duration,
    control: Mutex<Control>,
    state: watch::Sender<PollState>,
    shutdown: CancellationToken,
}

pub struct SessionPoller {
    inner: Arc<PollerInner>,
}

impl SessionPoller {
    /// Creates an unbound poller with the given interval.
    pub fn new(api: Arc<dyn SessionApi>, interval: Duration) -> Self {
        let (state, _) = watch::channel(PollState::default());
        Self {
            inner: Arc::new(PollerInner {
                api,
                interval,
                control: Mutex::new(Control::default()),
                state,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Creates an unbound poller with the default 3 second interval.
    pub fn with_default_interval(api: Arc<dyn SessionApi>) -> Self {
        Self::new(api, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))
    }

    /// Binds the poller to a session, or unbinds it with `None`.
    ///
    /// Cancels the previous binding and clears all state. Must be called
    /// from within a tokio runtime when binding to a session.
    pub fn bind(&self, session_id: Option<SessionId>) {
        self.inner.bind(session_id);
    }

    /// Rebinds the poller whenever the watched identifier changes.
    ///
    /// Binds to the current value immediately. The returned task ends when
    /// the sender is dropped or the poller is dropped.
    pub fn follow(&self, mut session: watch::Receiver<Option<SessionId>>) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let shutdown = inner.shutdown.clone();
        inner.bind_if_changed(session.borrow_and_update().clone());

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    changed = session.changed() => {
                        if changed.is_err() {
                            tracing::debug!("[SessionPoller] Identity channel closed");
                            break;
                        }
                        let next = session.borrow_and_update().clone();
                        inner.bind_if_changed(next);
                    }
                }
            }
        })
    }

    /// Fetches now, with the loading indicator, and waits for the result.
    pub async fn refresh(&self) {
        if let Some(ticket) = self.inner.begin_fetch(true) {
            self.inner.complete_fetch(ticket).await;
        }
    }

    /// Cancels polling and clears everything.
    pub fn reset(&self) {
        self.inner.bind(None);
    }

    pub fn clear_error(&self) {
        self.inner.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Replaces the snapshot directly. Fetches issued before this call are
    /// discarded when they land.
    pub fn set_data(&self, data: Option<SessionSnapshot>) {
        let mut control = self.inner.lock();
        control.applied_seq = control.next_seq;
        self.inner.state.send_modify(|state| state.data = data);
    }

    /// Patches the current snapshot in place. Returns `false` when there is
    /// no snapshot to patch.
    pub fn update_data<F>(&self, patch: F) -> bool
    where
        F: FnOnce(&mut SessionSnapshot),
    {
        let mut control = self.inner.lock();
        let patched = self.inner.state.send_if_modified(|state| match state.data.as_mut() {
            Some(data) => {
                patch(data);
                true
            }
            None => false,
        });
        if patched {
            control.applied_seq = control.next_seq;
        }
        patched
    }

    /// The session currently bound, if any.
    pub fn session_id(&self) -> Option<SessionId> {
        self.inner.lock().session_id.clone()
    }

    pub fn state(&self) -> PollState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.inner.state.subscribe()
    }
}

impl Drop for SessionPoller {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

impl PollerInner {
    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bind_if_changed(self: &Arc<Self>, session_id: Option<SessionId>) {
        let unchanged = {
            let control = self.lock();
            control.session_id == session_id && (session_id.is_none() || control.binding.is_some())
        };
        if !unchanged {
            self.bind(session_id);
        }
    }

    fn bind(self: &Arc<Self>, session_id: Option<SessionId>) {
        let token = {
            let mut control = self.lock();
            if let Some(previous) = control.binding.take() {
                previous.cancel();
            }
            control.generation += 1;
            control.applied_seq = control.next_seq;
            control.pending_loads = 0;
            control.session_id = session_id.clone();
            self.state.send_replace(PollState::default());

            session_id.as_ref().map(|_| {
                let token = self.shutdown.child_token();
                control.binding = Some(token.clone());
                token
            })
        };

        let Some(token) = token else {
            tracing::debug!("[SessionPoller] Unbound");
            return;
        };
        let Some(first) = self.begin_fetch(true) else {
            return;
        };

        tracing::debug!(
            "[SessionPoller] Bound to session {} (every {:?})",
            first.session_id,
            self.interval
        );
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            inner.run(first, token).await;
        });
    }

    async fn run(self: Arc<Self>, first: FetchTicket, token: CancellationToken) {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = self.complete_fetch(first) => {}
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let Some(ticket) = self.begin_fetch(false) else {
                break;
            };
            tokio::select! {
                _ = token.cancelled() => break,
                _ = self.complete_fetch(ticket) => {}
            }
        }
        tracing::debug!("[SessionPoller] Polling task stopped");
    }

    fn begin_fetch(&self, loading: bool) -> Option<FetchTicket> {
        let mut control = self.lock();
        let session_id = control.session_id.clone()?;
        control.next_seq += 1;
        if loading {
            control.pending_loads += 1;
            self.state.send_if_modified(|state| !std::mem::replace(&mut state.loading, true));
        }
        Some(FetchTicket {
            session_id,
            generation: control.generation,
            seq: control.next_seq,
            loading,
        })
    }

    async fn complete_fetch(&self, ticket: FetchTicket) {
        let result = self.api.get_session(&ticket.session_id).await;
        self.apply(ticket, result);
    }

    fn apply(&self, ticket: FetchTicket, result: Result<SessionSnapshot>) {
        let mut control = self.lock();
        let same_generation = ticket.generation == control.generation;
        if ticket.loading && same_generation {
            control.pending_loads = control.pending_loads.saturating_sub(1);
        }
        let loading = control.pending_loads > 0;

        let current = same_generation && ticket.seq > control.applied_seq;
        if current {
            control.applied_seq = ticket.seq;
        } else {
            tracing::debug!(
                "[SessionPoller] Discarding stale response for {} (seq {})",
                ticket.session_id,
                ticket.seq
            );
        }
        if !same_generation {
            return;
        }

        self.state.send_modify(|state| {
            state.loading = loading;
            if !current {
                return;
            }
            match result {
                Ok(snapshot) => {
                    state.data = Some(snapshot);
                    state.error = None;
                }
                Err(e) => {
                    tracing::warn!(
                        "[SessionPoller] Fetching session {} failed: {}",
                        ticket.session_id,
                        e
                    );
                    state.error = Some(e.user_message());
                }
            }
        });
    }
}
