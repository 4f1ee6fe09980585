use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::AppConfig;
use crate::core::error::{AppError, AppResult};
use crate::core::models::FormInput;
use crate::render::encoder::SymbolEncoder;
use crate::render::scheduler::RedrawScheduler;
use crate::render::session::Session;

/// A live session plus the debouncer feeding it.
pub struct SessionHandle {
    pub session: Arc<Session>,
    scheduler: RedrawScheduler<FormInput>,
}

impl SessionHandle {
    fn new(session: Arc<Session>, quiet_period: Duration) -> Self {
        let target = Arc::clone(&session);
        let scheduler = RedrawScheduler::spawn(quiet_period, move |form: FormInput| {
            let session = Arc::clone(&target);
            async move {
                // Failures already land in the session status line.
                let _ = session.redraw(&form).await;
            }
        });
        Self { session, scheduler }
    }

    /// Record the form and queue a debounced redraw.
    pub async fn schedule(&self, form: FormInput) -> bool {
        self.session.remember_form(&form).await;
        self.scheduler.schedule(form)
    }
}

/// Shared state of the web server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    encoder: Arc<dyn SymbolEncoder>,
    sessions: Arc<RwLock<HashMap<Uuid, Arc<SessionHandle>>>>,
}

impl AppState {
    pub fn new(config: AppConfig, encoder: Arc<dyn SymbolEncoder>) -> Self {
        Self {
            config: Arc::new(config),
            encoder,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Must be called inside a tokio runtime: the session's scheduler task is spawned here.
    pub async fn create_session(&self) -> Arc<SessionHandle> {
        let session = Arc::new(Session::new(self.config.render.clone(), Arc::clone(&self.encoder)));
        let quiet_period = Duration::from_millis(self.config.render.debounce_ms);
        let handle = Arc::new(SessionHandle::new(Arc::clone(&session), quiet_period));

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.config.server.max_sessions.max(1) {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, h)| h.session.created_at())
                .map(|(id, _)| *id);
            if let Some(id) = oldest {
                sessions.remove(&id);
                debug!(session = %id, "Evicted oldest session");
            }
        }
        sessions.insert(session.id(), Arc::clone(&handle));

        info!(session = %session.id(), active = sessions.len(), "Session created");
        handle
    }

    pub async fn session(&self, id: Uuid) -> AppResult<Arc<SessionHandle>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::SessionNotFound(id))
    }

    pub async fn remove_session(&self, id: Uuid) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!(session = %id, "Session closed"))
            .ok_or(AppError::SessionNotFound(id))
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
