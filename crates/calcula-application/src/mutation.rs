//! PriceMutationService - create, edit, delete and upload prices.
//!
//! Creates, edits and uploads wait for the server and then replace the
//! poller's snapshot with the one it returned. Deletes are optimistic: the
//! item disappears from the snapshot at once and a refresh afterwards
//! reconciles with the server, whether or not the delete succeeded.

use crate::identity::SessionIdentityService;
use crate::polling::SessionPoller;
use calcula_core::error::{CalculaError, Result};
use calcula_core::price::{PhotoUpload, PriceForm, PriceUpdate};
use calcula_core::session::{SessionApi, SessionId, SessionSnapshot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

pub struct PriceMutationService {
    api: Arc<dyn SessionApi>,
    poller: Arc<SessionPoller>,
    identity: Arc<SessionIdentityService>,
    submitting: AtomicBool,
    deleting: Mutex<Option<String>>,
}

/// Clears the submitting flag when the submit finishes, however it finishes.
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct DeleteGuard<'a>(&'a Mutex<Option<String>>);

impl Drop for DeleteGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

struct UploadGuard<'a>(&'a SessionIdentityService);

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        self.0.set_uploading(false);
    }
}

impl PriceMutationService {
    pub fn new(
        api: Arc<dyn SessionApi>,
        poller: Arc<SessionPoller>,
        identity: Arc<SessionIdentityService>,
    ) -> Self {
        Self {
            api,
            poller,
            identity,
            submitting: AtomicBool::new(false),
            deleting: Mutex::new(None),
        }
    }

    /// Adds a manually entered price.
    ///
    /// The form is validated first; invalid input never reaches the server.
    pub async fn create_price(
        &self,
        session_id: &SessionId,
        form: &PriceForm,
    ) -> Result<SessionSnapshot> {
        let price = form.validate()?;
        let _guard = self.begin_submit()?;

        let snapshot = self
            .api
            .create_price(session_id, &price)
            .await
            .inspect_err(|e| tracing::warn!("[PriceMutation] Create failed: {}", e))?;
        tracing::info!(
            "[PriceMutation] Added '{}' to session {}",
            price.name,
            session_id
        );
        self.apply_snapshot(session_id, &snapshot);
        Ok(snapshot)
    }

    /// Edits an existing price with the values from the form.
    pub async fn update_price(
        &self,
        session_id: &SessionId,
        price_id: &str,
        form: &PriceForm,
    ) -> Result<SessionSnapshot> {
        let update = PriceUpdate {
            price_id: price_id.to_string(),
            price: form.validate()?,
        };
        let _guard = self.begin_submit()?;

        let snapshot = self
            .api
            .update_price(session_id, &update)
            .await
            .inspect_err(|e| tracing::warn!("[PriceMutation] Update of {} failed: {}", price_id, e))?;
        tracing::info!("[PriceMutation] Updated price {}", price_id);
        self.apply_snapshot(session_id, &snapshot);
        Ok(snapshot)
    }

    /// Deletes a price optimistically.
    ///
    /// The snapshot is refreshed after the request in every case. A failed
    /// delete is returned once the refresh has restored the server's view.
    pub async fn delete_price(&self, session_id: &SessionId, price_id: &str) -> Result<()> {
        let _guard = self.begin_delete(price_id)?;

        if self.is_bound_to(session_id) {
            self.poller.update_data(|snapshot| {
                snapshot.remove_price(price_id);
            });
        }

        let result = self.api.delete_price(session_id, price_id).await;
        match &result {
            Ok(()) => tracing::info!("[PriceMutation] Deleted price {}", price_id),
            Err(e) => tracing::warn!("[PriceMutation] Delete of {} failed: {}", price_id, e),
        }

        if self.is_bound_to(session_id) {
            self.poller.refresh().await;
        }
        result
    }

    /// Uploads a photo to be turned into a price. The identity store's
    /// uploading flag is raised for the duration.
    pub async fn upload_photo(
        &self,
        session_id: &SessionId,
        upload: PhotoUpload,
    ) -> Result<SessionSnapshot> {
        self.identity.set_uploading(true);
        let _guard = UploadGuard(&self.identity);

        let snapshot = self
            .api
            .upload_price_image(session_id, &upload)
            .await
            .inspect_err(|e| tracing::warn!("[PriceMutation] Upload failed: {}", e))?;
        tracing::info!(
            "[PriceMutation] Uploaded {} ({} bytes)",
            upload.filename,
            upload.bytes.len()
        );
        self.apply_snapshot(session_id, &snapshot);
        Ok(snapshot)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Id of the price whose delete is in flight.
    pub fn deleting_id(&self) -> Option<String> {
        self.deleting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn begin_submit(&self) -> Result<SubmitGuard<'_>> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(CalculaError::busy("a price is already being saved"));
        }
        Ok(SubmitGuard(&self.submitting))
    }

    fn begin_delete(&self, price_id: &str) -> Result<DeleteGuard<'_>> {
        let mut deleting = self.deleting.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = deleting.as_ref() {
            return Err(CalculaError::busy(format!(
                "price {} is already being deleted",
                current
            )));
        }
        *deleting = Some(price_id.to_string());
        Ok(DeleteGuard(&self.deleting))
    }

    fn is_bound_to(&self, session_id: &SessionId) -> bool {
        self.poller.session_id().as_ref() == Some(session_id)
    }

    fn apply_snapshot(&self, session_id: &SessionId, snapshot: &SessionSnapshot) {
        if self.is_bound_to(session_id) {
            self.poller.set_data(Some(snapshot.clone()));
        }
    }
}
