//! Application layer for Calcula.
//!
//! Coordinates the session identity, the polling engine, price mutations and
//! photo viewing on top of the `calcula-core` traits. Infrastructure is
//! injected as `Arc<dyn SessionApi>` / `Arc<dyn SessionIdRepository>`.

pub mod identity;
pub mod mutation;
pub mod photo;
pub mod polling;

#[cfg(test)]
mod test_support;

pub use identity::{IdentityPhase, IdentitySnapshot, SessionIdentityService};
pub use mutation::PriceMutationService;
pub use photo::{NO_PHOTO_NOTICE, PhotoLoad, PhotoViewState, PricePhotoService};
pub use polling::{PollState, SessionPoller};

use calcula_core::session::{SessionApi, SessionIdRepository};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// All client services, wired to one API and one identity record.
pub struct AppContext {
    pub identity: Arc<SessionIdentityService>,
    pub poller: Arc<SessionPoller>,
    pub mutations: Arc<PriceMutationService>,
    pub photos: Arc<PricePhotoService>,
}

impl AppContext {
    pub fn new(
        api: Arc<dyn SessionApi>,
        repository: Arc<dyn SessionIdRepository>,
        poll_interval: Duration,
    ) -> Self {
        let identity = Arc::new(SessionIdentityService::new(api.clone(), repository));
        let poller = Arc::new(SessionPoller::new(api.clone(), poll_interval));
        let mutations = Arc::new(PriceMutationService::new(
            api.clone(),
            poller.clone(),
            identity.clone(),
        ));
        let photos = Arc::new(PricePhotoService::new(api));
        Self {
            identity,
            poller,
            mutations,
            photos,
        }
    }

    /// Hydrates the identity and keeps the poller bound to it.
    pub async fn start(&self) -> JoinHandle<()> {
        self.identity.hydrate().await;
        self.poller.follow(self.identity.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemorySessionIdRepository, MockSessionApi, price, snapshot};
    use calcula_core::session::SessionId;

    #[tokio::test(start_paused = true)]
    async fn test_start_binds_poller_to_hydrated_session() {
        let api = Arc::new(MockSessionApi::new(snapshot(
            "abc123",
            vec![price("p1", "Rice", 10.0)],
        )));
        let repo = Arc::new(MemorySessionIdRepository::with_stored("abc123"));
        let ctx = AppContext::new(api.clone(), repo, Duration::from_secs(3));

        let _follow = ctx.start().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(ctx.poller.session_id(), Some(SessionId::new("abc123")));
        assert_eq!(ctx.poller.state().data.unwrap().total, 10.0);

        ctx.identity.join_session("other").await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(ctx.poller.session_id(), Some(SessionId::new("other")));
    }
}
