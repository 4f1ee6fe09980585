use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::RenderDefaults;
use crate::core::error::{AppError, AppResult};
use crate::core::models::{FormInput, Frame, LogoAsset, RenderParams, Status};
use crate::render::compositor::CompositeStyle;
use crate::render::encoder::SymbolEncoder;
use crate::render::exporter::{encode_png, file_name_for, Export};
use crate::render::logo::LogoLoader;
use crate::render::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawOutcome {
    /// The frame with this token is now the canvas.
    Committed(u64),
    /// A newer request was issued while this one was rendering; its result was dropped.
    Stale(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoOutcome {
    Applied { width: u32, height: u32 },
    /// A newer load or reset happened first.
    Superseded,
}

#[derive(Default)]
struct SessionState {
    logo: Option<Arc<LogoAsset>>,
    frame: Option<Arc<Frame>>,
    last_form: Option<FormInput>,
    status: Status,
}

/// One user's editing session: logo, canvas and status line.
///
/// Redraws are tagged with a monotonically increasing token before they
/// suspend; on completion a result is committed only if its token is still
/// the latest one issued, so out-of-order completions never clobber a newer
/// canvas. Logo loads use a separate generation counter the same way.
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    defaults: RenderDefaults,
    encoder: Arc<dyn SymbolEncoder>,
    loader: LogoLoader,
    latest: AtomicU64,
    logo_generation: AtomicU64,
    state: RwLock<SessionState>,
    committed: watch::Sender<u64>,
}

impl Session {
    pub fn new(defaults: RenderDefaults, encoder: Arc<dyn SymbolEncoder>) -> Self {
        let (committed, _) = watch::channel(0);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            loader: LogoLoader::new(defaults.max_logo_bytes),
            defaults,
            encoder,
            latest: AtomicU64::new(0),
            logo_generation: AtomicU64::new(0),
            state: RwLock::new(SessionState::default()),
            committed,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn defaults(&self) -> &RenderDefaults {
        &self.defaults
    }

    /// Token of the most recently issued redraw request.
    pub fn latest_token(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> Status {
        self.state.read().await.status.clone()
    }

    pub async fn frame(&self) -> Option<Arc<Frame>> {
        self.state.read().await.frame.clone()
    }

    pub async fn has_logo(&self) -> bool {
        self.state.read().await.logo.is_some()
    }

    /// Remember the latest form without drawing; the debounced path calls
    /// this before the scheduler fires so a logo change can redraw with it.
    pub async fn remember_form(&self, form: &FormInput) {
        self.state.write().await.last_form = Some(form.clone());
    }

    /// Validate, render and commit immediately.
    pub async fn redraw(&self, form: &FormInput) -> AppResult<RedrawOutcome> {
        self.draw(form).await.map(|(outcome, _)| outcome)
    }

    /// Render `form` and try to commit it. The rendered frame is returned
    /// even when a newer request made the commit stale.
    async fn draw(&self, form: &FormInput) -> AppResult<(RedrawOutcome, Arc<Frame>)> {
        let token = self.begin_redraw();
        self.remember_form(form).await;

        let params = match RenderParams::from_form(form, &self.defaults) {
            Ok(params) => params,
            Err(e) => {
                self.report(token, &e).await;
                return Err(e);
            }
        };

        let logo = self.state.read().await.logo.clone();
        let encoder = Arc::clone(&self.encoder);
        let style = CompositeStyle::from(&self.defaults);

        debug!(session = %self.id, token, size = params.size, has_logo = logo.is_some(), "Redraw started");

        let rendered = tokio::task::spawn_blocking(move || {
            render(encoder.as_ref(), &params, logo.as_deref(), style).map(|image| (params, image))
        })
        .await
        .map_err(|e| AppError::Encoder(format!("render task failed: {}", e)));

        match rendered.and_then(|r| r) {
            Ok((params, image)) => {
                let frame = Arc::new(Frame { token, params, image });
                Ok((self.commit(Arc::clone(&frame)).await, frame))
            }
            Err(e) => {
                self.report(token, &e).await;
                Err(e)
            }
        }
    }

    /// Redraw with the last submitted form, if any.
    pub async fn redraw_last(&self) -> Option<AppResult<RedrawOutcome>> {
        let form = self.state.read().await.last_form.clone()?;
        if form.text.trim().is_empty() {
            return None;
        }
        Some(self.redraw(&form).await)
    }

    /// Wait until a frame newer than `after` is committed, up to `timeout`.
    pub async fn wait_for_frame(&self, after: u64, timeout: Duration) -> Option<Arc<Frame>> {
        let mut rx = self.committed.subscribe();
        let newer = tokio::time::timeout(timeout, rx.wait_for(|token| *token > after))
            .await
            .map(|seen| seen.is_ok())
            .unwrap_or(false);
        if newer {
            self.frame().await
        } else {
            None
        }
    }

    pub async fn load_logo(&self, bytes: Vec<u8>, mime: Option<&str>) -> AppResult<LogoOutcome> {
        let generation = self.logo_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.loader.load_bytes(bytes, mime).await;
        self.apply_logo(generation, result).await
    }

    pub async fn load_logo_path(&self, path: &Path) -> AppResult<LogoOutcome> {
        let generation = self.logo_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.loader.load_path(path).await;
        self.apply_logo(generation, result).await
    }

    /// Record a logo upload that failed before its bytes reached the loader.
    /// Same outcome as a failed load: no logo, error status.
    pub async fn reject_logo(&self, err: &AppError) {
        self.logo_generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        state.logo = None;
        state.status = Status::Error(err.to_string());
        warn!(session = %self.id, "Logo upload rejected: {}", err);
    }

    pub async fn reset_logo(&self) {
        self.logo_generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        state.logo = None;
        state.status = Status::Ready;
        info!(session = %self.id, "Logo reset");
    }

    /// Redraw with `form` and serialize exactly that render, whether or not
    /// a newer redraw has since taken over the canvas.
    pub async fn export(&self, form: &FormInput) -> AppResult<Export> {
        let (outcome, frame) = self.draw(form).await?;
        if let RedrawOutcome::Stale(token) = outcome {
            debug!(session = %self.id, token, "Exporting a render newer redraws superseded");
        }

        let file_name = file_name_for(&frame.params.text, self.defaults.slug_max_len);
        let bytes = tokio::task::spawn_blocking(move || encode_png(&frame.image))
            .await
            .map_err(|e| AppError::Export(format!("encoder task failed: {}", e)))??;

        info!(session = %self.id, file_name = %file_name, bytes = bytes.len(), "Export ready");
        Ok(Export { file_name, bytes })
    }

    fn begin_redraw(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn commit(&self, frame: Arc<Frame>) -> RedrawOutcome {
        let token = frame.token;
        let mut state = self.state.write().await;
        let latest = self.latest.load(Ordering::SeqCst);
        if token != latest {
            debug!(session = %self.id, token, latest, "Dropping stale redraw");
            return RedrawOutcome::Stale(token);
        }

        state.frame = Some(frame);
        state.status = Status::Rendered;
        drop(state);

        self.committed.send_replace(token);
        debug!(session = %self.id, token, "Frame committed");
        RedrawOutcome::Committed(token)
    }

    /// Set the status line for a failed redraw unless a newer request owns it.
    async fn report(&self, token: u64, err: &AppError) {
        let mut state = self.state.write().await;
        if token == self.latest.load(Ordering::SeqCst) {
            state.status = Status::Error(err.to_string());
        }
        match err {
            AppError::EmptyInput => debug!(session = %self.id, "Redraw skipped: empty text"),
            other => warn!(session = %self.id, "Redraw failed: {}", other),
        }
    }

    async fn apply_logo(&self, generation: u64, result: AppResult<LogoAsset>) -> AppResult<LogoOutcome> {
        let mut state = self.state.write().await;
        if generation != self.logo_generation.load(Ordering::SeqCst) {
            debug!(session = %self.id, generation, "Dropping superseded logo load");
            return Ok(LogoOutcome::Superseded);
        }

        match result {
            Ok(asset) => {
                let (width, height) = (asset.width, asset.height);
                state.logo = Some(Arc::new(asset));
                state.status = Status::Ready;
                info!(session = %self.id, width, height, "Logo loaded");
                Ok(LogoOutcome::Applied { width, height })
            }
            Err(e) => {
                // A failed load never leaves the previous logo in place.
                state.logo = None;
                state.status = Status::Error(e.to_string());
                warn!(session = %self.id, "Logo load failed: {}", e);
                Err(e)
            }
        }
    }
}
