//! Doorbell push-notification subsystem.
//!
//! Grounded in `examples/original_source/receiver/push.go`'s `Server`: a
//! ring immediately fans a push out to every registered device, then arms a
//! debounce timer. A second ring before the timer elapses just restarts the
//! timer (the original's `startCancel`); if the timer elapses untouched, a
//! retraction push is sent. The core pipeline's only contract with this
//! subsystem is [`PushHandle::notify_doorbell`] — everything else here is a
//! private implementation detail of the worker task.

mod store;

pub use store::{StoredToken, TokenStore};

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

#[derive(Debug)]
enum PushCommand {
    Ring,
}

/// Cheap, cloneable front for the push worker task. The dispatcher holds
/// one of these; sending never blocks on FCM delivery.
#[derive(Clone)]
pub struct PushHandle {
    tx: mpsc::Sender<PushCommand>,
}

impl PushHandle {
    /// Notify the push worker of a doorbell event. `pressed` mirrors the
    /// core pipeline's single boolean contract (spec.md §9); only `true`
    /// currently triggers anything, but the worker, not this handle, owns
    /// that decision.
    pub async fn notify_doorbell(&self, pressed: bool) {
        if !pressed {
            return;
        }
        if self.tx.send(PushCommand::Ring).await.is_err() {
            tracing::warn!("push worker channel closed, dropping doorbell notification");
        }
    }
}

#[derive(Serialize)]
struct FcmPayload<'a> {
    ring: &'a str,
    delete: &'a str,
}

pub struct PushWorker {
    store: TokenStore,
    client: reqwest::Client,
    fcm_token: String,
    debounce: Duration,
}

impl PushWorker {
    pub fn new(config_dir: &Path, fcm_token: String, debounce_seconds: u64) -> Self {
        Self {
            store: TokenStore::new(config_dir),
            client: reqwest::Client::new(),
            fcm_token,
            debounce: Duration::from_secs(debounce_seconds),
        }
    }

    /// Spawn the channel pair this worker listens on; returns the handle
    /// side for the dispatcher and consumes `self` into the background
    /// task.
    pub fn spawn(self, shutdown: CancellationToken) -> PushHandle {
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(self.run(rx, shutdown));
        PushHandle { tx }
    }

    async fn run(self, mut rx: mpsc::Receiver<PushCommand>, shutdown: CancellationToken) {
        let mut deadline: Option<Instant> = None;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("push worker shutting down");
                    return;
                }
                cmd = rx.recv() => {
                    match cmd {
                        Some(PushCommand::Ring) => {
                            self.send_to_all(false).await;
                            deadline = Some(Instant::now() + self.debounce);
                        }
                        None => {
                            tracing::info!("push command channel closed, worker exiting");
                            return;
                        }
                    }
                }
                _ = sleep_until_opt(deadline) => {
                    self.send_to_all(true).await;
                    deadline = None;
                }
            }
        }
    }

    async fn send_to_all(&self, delete: bool) {
        let tokens = match self.store.load_all() {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::error!(error = %e, "failed to load push token store");
                return;
            }
        };

        let payload = FcmPayload {
            ring: "yes",
            delete: if delete { "yes" } else { "no" },
        };

        for stored in tokens {
            if let Err(e) = self.send_one(&stored.token, &payload).await {
                tracing::warn!(error = %e, token_id = %stored.id, "push delivery failed, evicting token");
                if let Err(e) = self.store.remove(stored.id) {
                    tracing::error!(error = %e, "failed to evict token after delivery failure");
                }
            }
        }
    }

    async fn send_one(&self, token: &str, payload: &FcmPayload<'_>) -> anyhow::Result<()> {
        let body = serde_json::json!({
            "message": {
                "token": token,
                "data": payload,
            }
        });

        let response = self
            .client
            .post("https://fcm.googleapis.com/v1/projects/-/messages:send")
            .bearer_auth(&self.fcm_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("FCM returned status {}", response.status());
        }
        Ok(())
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(instant) => tokio::time::sleep_until(instant).await,
        None => std::future::pending().await,
    }
}

#[derive(Clone)]
struct RegisterState {
    store: Arc<TokenStore>,
}

#[derive(serde::Deserialize)]
struct RegisterRequest {
    token: String,
}

async fn register(State(state): State<RegisterState>, Json(req): Json<RegisterRequest>) -> axum::http::StatusCode {
    match state.store.add(&req.token) {
        Ok(_) => axum::http::StatusCode::OK,
        Err(e) => {
            tracing::error!(error = %e, "failed to store push token");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Build the `POST /register` router, per SPEC_FULL.md §6.4.
pub fn router(config_dir: &Path) -> Router {
    let state = RegisterState {
        store: Arc::new(TokenStore::new(config_dir)),
    };
    Router::new()
        .route("/register", post(register))
        .with_state(state)
}
