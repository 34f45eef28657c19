//! PricePhotoService - shows the stored photo of a price.
//!
//! Only the most recent `open` may change what is displayed: each call takes
//! a new request token, and a response whose token is no longer current is
//! reported as superseded and ignored.

use calcula_core::error::Result;
use calcula_core::price::{PriceItem, PricePhoto};
use calcula_core::session::{SessionApi, SessionId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Notice shown when an item has no photo.
pub const NO_PHOTO_NOTICE: &str = "No photo available for this item.";

/// Outcome of an `open` call.
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoLoad {
    Shown(PricePhoto),
    /// The item has no photo; see [`NO_PHOTO_NOTICE`].
    Missing,
    /// A later `open` or a `close` happened first.
    Superseded,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoViewState {
    pub selected_price_id: Option<String>,
    pub loading: bool,
    pub photo: Option<PricePhoto>,
    pub notice: Option<String>,
}

#[derive(Default)]
struct Viewer {
    token: u64,
    view: PhotoViewState,
}

pub struct PricePhotoService {
    api: Arc<dyn SessionApi>,
    viewer: Mutex<Viewer>,
}

impl PricePhotoService {
    pub fn new(api: Arc<dyn SessionApi>) -> Self {
        Self {
            api,
            viewer: Mutex::new(Viewer::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Viewer> {
        self.viewer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Requests the photo of `price` and displays it if this is still the
    /// latest request when the answer arrives.
    pub async fn open(&self, session_id: &SessionId, price: &PriceItem) -> Result<PhotoLoad> {
        let token = {
            let mut viewer = self.lock();
            viewer.token += 1;
            viewer.view = PhotoViewState {
                selected_price_id: Some(price.id.clone()),
                loading: true,
                photo: None,
                notice: None,
            };
            viewer.token
        };

        let result = self.api.get_price_photo(session_id, &price.id).await;

        let mut viewer = self.lock();
        if viewer.token != token {
            tracing::debug!(
                "[PricePhoto] Dropping photo of {} (request {} superseded)",
                price.id,
                token
            );
            return Ok(PhotoLoad::Superseded);
        }

        viewer.view.loading = false;
        match result {
            Ok(Some(photo)) => {
                viewer.view.photo = Some(photo.clone());
                Ok(PhotoLoad::Shown(photo))
            }
            Ok(None) => {
                viewer.view.selected_price_id = None;
                viewer.view.notice = Some(NO_PHOTO_NOTICE.to_string());
                Ok(PhotoLoad::Missing)
            }
            Err(e) => {
                tracing::warn!("[PricePhoto] Failed to load photo of {}: {}", price.id, e);
                viewer.view.selected_price_id = None;
                Err(e)
            }
        }
    }

    /// Hides the photo. Answers still in flight are ignored.
    pub fn close(&self) {
        let mut viewer = self.lock();
        viewer.token += 1;
        viewer.view = PhotoViewState::default();
    }

    pub fn state(&self) -> PhotoViewState {
        self.lock().view.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockSessionApi, price, snapshot};
    use calcula_core::error::CalculaError;
    use std::time::Duration;

    fn photo(tag: &str) -> PricePhoto {
        PricePhoto {
            uri: format!("data:image/jpeg;base64,{}", tag),
            content_type: "image/jpeg".into(),
        }
    }

    fn setup() -> (Arc<MockSessionApi>, Arc<PricePhotoService>, SessionId) {
        let api = Arc::new(MockSessionApi::new(snapshot("s1", vec![])));
        let service = Arc::new(PricePhotoService::new(api.clone()));
        (api, service, SessionId::new("s1"))
    }

    #[tokio::test]
    async fn test_open_shows_photo() {
        let (api, service, session) = setup();
        api.set_photo("p1", Duration::ZERO, Ok(Some(photo("AAA"))));

        let load = service.open(&session, &price("p1", "Rice", 1.0)).await.unwrap();
        assert_eq!(load, PhotoLoad::Shown(photo("AAA")));
        let state = service.state();
        assert_eq!(state.selected_price_id.as_deref(), Some("p1"));
        assert_eq!(state.photo, Some(photo("AAA")));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_missing_photo_is_a_notice_not_an_error() {
        let (_api, service, session) = setup();
        let load = service.open(&session, &price("p9", "Oil", 1.0)).await.unwrap();
        assert_eq!(load, PhotoLoad::Missing);
        let state = service.state();
        assert_eq!(state.notice.as_deref(), Some(NO_PHOTO_NOTICE));
        assert_eq!(state.selected_price_id, None);
        assert_eq!(state.photo, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_request_wins() {
        let (api, service, session) = setup();
        api.set_photo("slow", Duration::from_millis(300), Ok(Some(photo("SLOW"))));
        api.set_photo("fast", Duration::from_millis(10), Ok(Some(photo("FAST"))));

        let slow = {
            let service = service.clone();
            let session = session.clone();
            tokio::spawn(async move { service.open(&session, &price("slow", "A", 1.0)).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;
        let fast = service.open(&session, &price("fast", "B", 1.0)).await.unwrap();
        assert_eq!(fast, PhotoLoad::Shown(photo("FAST")));

        assert_eq!(slow.await.unwrap().unwrap(), PhotoLoad::Superseded);
        let state = service.state();
        assert_eq!(state.selected_price_id.as_deref(), Some("fast"));
        assert_eq!(state.photo, Some(photo("FAST")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_discards_in_flight_answer() {
        let (api, service, session) = setup();
        api.set_photo("p1", Duration::from_millis(100), Ok(Some(photo("AAA"))));

        let pending = {
            let service = service.clone();
            let session = session.clone();
            tokio::spawn(async move { service.open(&session, &price("p1", "A", 1.0)).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(service.state().loading);
        service.close();

        assert_eq!(pending.await.unwrap().unwrap(), PhotoLoad::Superseded);
        assert_eq!(service.state(), PhotoViewState::default());
    }

    #[tokio::test]
    async fn test_error_of_current_request_is_returned() {
        let (api, service, session) = setup();
        api.set_photo("p1", Duration::ZERO, Err(CalculaError::api(500, "boom")));
        let err = service.open(&session, &price("p1", "A", 1.0)).await.unwrap_err();
        assert!(err.is_api_status(500));
        assert!(!service.state().loading);
    }
}
