pub mod photo;
pub mod price;
pub mod render;
pub mod session;

use anyhow::{Context, Result, bail};
use calcula_application::AppContext;
use calcula_core::session::{SessionId, SessionSnapshot};
use calcula_infrastructure::{CalculaPaths, ConfigService, HttpSessionApi, TomlSessionIdRepository};
use std::sync::Arc;

/// Services wired for one command run.
pub struct Client {
    pub ctx: AppContext,
}

impl Client {
    /// Loads configuration, applies command-line overrides and wires the
    /// HTTP API and the session file into the application services.
    pub fn connect(
        paths: &CalculaPaths,
        api_url: Option<&str>,
        poll_interval_ms: Option<u64>,
    ) -> Result<Self> {
        let mut config = ConfigService::new(paths.clone()).get_config();
        if let Some(url) = api_url {
            config.api_url = Some(url.to_string());
        }
        if let Some(ms) = poll_interval_ms {
            config.poll_interval_ms = ms;
        }

        let api = HttpSessionApi::from_config(&config)
            .context("No usable API URL; pass --api-url or set CALCULA_API_URL")?;
        let repository = TomlSessionIdRepository::new(paths)?;
        tracing::debug!("[Client] Using API at {}", api.base_url());

        Ok(Self {
            ctx: AppContext::new(Arc::new(api), Arc::new(repository), config.poll_interval()),
        })
    }

    /// The current session, created on first use.
    pub async fn session(&self) -> Result<SessionId> {
        Ok(self.ctx.identity.ensure_session().await?)
    }

    /// Binds the poller to `session_id` and waits for its first fetch.
    pub async fn load(&self, session_id: &SessionId) -> Result<SessionSnapshot> {
        let mut state = self.ctx.poller.subscribe();
        self.ctx.poller.bind(Some(session_id.clone()));
        let state = state
            .wait_for(|s| !s.loading)
            .await
            .context("Poller stopped before the session loaded")?
            .clone();

        match (state.data, state.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => bail!(error),
            (None, None) => bail!("Session {} could not be loaded", session_id),
        }
    }

    /// The snapshot currently held by the poller.
    pub fn current(&self) -> Option<SessionSnapshot> {
        self.ctx.poller.state().data
    }
}
