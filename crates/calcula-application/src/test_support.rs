//! Hand-written doubles for the core traits, shared by the service tests.

use async_trait::async_trait;
use calcula_core::error::{CalculaError, Result};
use calcula_core::price::{NewPrice, PhotoUpload, PricePhoto, PriceItem, PriceStatus, PriceUpdate};
use calcula_core::session::{SessionApi, SessionId, SessionIdRepository, SessionSnapshot};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn price(id: &str, name: &str, value: f64) -> PriceItem {
    PriceItem {
        id: id.to_string(),
        name: Some(name.to_string()),
        value: Some(value),
        quantity: 1,
        status: PriceStatus::Ready,
    }
}

pub fn snapshot(session: &str, prices: Vec<PriceItem>) -> SessionSnapshot {
    let total = prices.iter().filter_map(|p| p.value).sum();
    SessionSnapshot {
        id: SessionId::new(session),
        total,
        prices,
    }
}

/// A scripted `get_session` answer, returned after `delay`.
pub struct Scripted {
    pub delay: Duration,
    pub result: Result<SessionSnapshot>,
}

impl Scripted {
    pub fn ok(snapshot: SessionSnapshot) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(snapshot),
        }
    }

    pub fn err(err: CalculaError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(err),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Mock SessionApi.
///
/// `get_session` pops scripted answers first and falls back to the current
/// server snapshot once the script runs out.
pub struct MockSessionApi {
    pub create_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub mutation_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub photo_calls: AtomicUsize,
    create_delay: Mutex<Duration>,
    create_result: Mutex<Result<SessionId>>,
    script: Mutex<VecDeque<Scripted>>,
    server: Mutex<Result<SessionSnapshot>>,
    mutation_result: Mutex<Option<Result<SessionSnapshot>>>,
    mutation_delay: Mutex<Duration>,
    delete_result: Mutex<Result<()>>,
    delete_delay: Mutex<Duration>,
    photos: Mutex<HashMap<String, (Duration, Result<Option<PricePhoto>>)>>,
    pub last_new_price: Mutex<Option<NewPrice>>,
    pub last_update: Mutex<Option<PriceUpdate>>,
}

impl MockSessionApi {
    pub fn new(server: SessionSnapshot) -> Self {
        Self {
            create_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            mutation_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            photo_calls: AtomicUsize::new(0),
            create_delay: Mutex::new(Duration::ZERO),
            create_result: Mutex::new(Ok(SessionId::new("created-1"))),
            script: Mutex::new(VecDeque::new()),
            server: Mutex::new(Ok(server)),
            mutation_result: Mutex::new(None),
            mutation_delay: Mutex::new(Duration::ZERO),
            delete_result: Mutex::new(Ok(())),
            delete_delay: Mutex::new(Duration::ZERO),
            photos: Mutex::new(HashMap::new()),
            last_new_price: Mutex::new(None),
            last_update: Mutex::new(None),
        }
    }

    pub fn with_create(self, delay: Duration, result: Result<SessionId>) -> Self {
        *self.create_delay.lock().unwrap() = delay;
        *self.create_result.lock().unwrap() = result;
        self
    }

    pub fn push(&self, scripted: Scripted) {
        self.script.lock().unwrap().push_back(scripted);
    }

    pub fn set_server(&self, result: Result<SessionSnapshot>) {
        *self.server.lock().unwrap() = result;
    }

    pub fn set_mutation_result(&self, result: Result<SessionSnapshot>) {
        *self.mutation_result.lock().unwrap() = Some(result);
    }

    pub fn set_mutation_delay(&self, delay: Duration) {
        *self.mutation_delay.lock().unwrap() = delay;
    }

    pub fn set_delete(&self, delay: Duration, result: Result<()>) {
        *self.delete_delay.lock().unwrap() = delay;
        *self.delete_result.lock().unwrap() = result;
    }

    pub fn set_photo(&self, price_id: &str, delay: Duration, result: Result<Option<PricePhoto>>) {
        self.photos
            .lock()
            .unwrap()
            .insert(price_id.to_string(), (delay, result));
    }

    pub fn gets(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    async fn mutate(&self) -> Result<SessionSnapshot> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.mutation_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.mutation_result.lock().unwrap().clone();
        match scripted {
            Some(result) => result,
            None => self.server.lock().unwrap().clone(),
        }
    }
}

#[async_trait]
impl SessionApi for MockSessionApi {
    async fn create_session(&self) -> Result<SessionId> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.create_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.create_result.lock().unwrap().clone()
    }

    async fn get_session(&self, _session_id: &SessionId) -> Result<SessionSnapshot> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(scripted) => {
                if !scripted.delay.is_zero() {
                    tokio::time::sleep(scripted.delay).await;
                }
                scripted.result
            }
            None => self.server.lock().unwrap().clone(),
        }
    }

    async fn create_price(
        &self,
        _session_id: &SessionId,
        price: &NewPrice,
    ) -> Result<SessionSnapshot> {
        *self.last_new_price.lock().unwrap() = Some(price.clone());
        self.mutate().await
    }

    async fn update_price(
        &self,
        _session_id: &SessionId,
        update: &PriceUpdate,
    ) -> Result<SessionSnapshot> {
        *self.last_update.lock().unwrap() = Some(update.clone());
        self.mutate().await
    }

    async fn upload_price_image(
        &self,
        _session_id: &SessionId,
        _upload: &PhotoUpload,
    ) -> Result<SessionSnapshot> {
        self.mutate().await
    }

    async fn delete_price(&self, _session_id: &SessionId, _price_id: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delete_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.delete_result.lock().unwrap().clone()
    }

    async fn get_price_photo(
        &self,
        _session_id: &SessionId,
        price_id: &str,
    ) -> Result<Option<PricePhoto>> {
        self.photo_calls.fetch_add(1, Ordering::SeqCst);
        let entry = self.photos.lock().unwrap().get(price_id).cloned();
        let Some((delay, result)) = entry else {
            return Ok(None);
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

/// In-memory SessionIdRepository with switchable failures.
#[derive(Default)]
pub struct MemorySessionIdRepository {
    stored: Mutex<Option<SessionId>>,
    fail_reads: Mutex<bool>,
    fail_writes: Mutex<bool>,
    load_delay: Mutex<Duration>,
    save_delay: Mutex<Duration>,
    pub load_calls: AtomicUsize,
}

impl MemorySessionIdRepository {
    pub fn with_stored(id: &str) -> Self {
        let repo = Self::default();
        *repo.stored.lock().unwrap() = Some(SessionId::new(id));
        repo
    }

    pub fn failing_reads(self) -> Self {
        *self.fail_reads.lock().unwrap() = true;
        self
    }

    pub fn failing_writes(self) -> Self {
        *self.fail_writes.lock().unwrap() = true;
        self
    }

    pub fn slow_load(self, delay: Duration) -> Self {
        *self.load_delay.lock().unwrap() = delay;
        self
    }

    pub fn slow_save(self, delay: Duration) -> Self {
        *self.save_delay.lock().unwrap() = delay;
        self
    }

    pub fn stored(&self) -> Option<SessionId> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionIdRepository for MemorySessionIdRepository {
    async fn load(&self) -> Result<Option<SessionId>> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.load_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_reads.lock().unwrap() {
            return Err(CalculaError::storage("disk unavailable"));
        }
        Ok(self.stored())
    }

    async fn save(&self, session_id: &SessionId) -> Result<()> {
        let delay = *self.save_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_writes.lock().unwrap() {
            return Err(CalculaError::storage("read-only"));
        }
        *self.stored.lock().unwrap() = Some(session_id.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(CalculaError::storage("read-only"));
        }
        *self.stored.lock().unwrap() = None;
        Ok(())
    }
}
