use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    http::HeaderName,
    routing::{get, post},
};
use latchkey_auth::{AuthState, OAuthProvider, Storages};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    config::AppConfig,
    handlers,
    subject::{HeaderSubjectResolver, SubjectResolver},
};

/// Shared state of every handler.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<OAuthProvider>,
    pub auth: AuthState,
    pub subjects: Arc<dyn SubjectResolver>,
}

impl AppState {
    pub fn new(provider: Arc<OAuthProvider>, subjects: Arc<dyn SubjectResolver>) -> Self {
        let auth = AuthState::new(provider.guard().clone());
        Self {
            provider,
            auth,
            subjects,
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/clients", post(handlers::register_client))
        .route("/clients/{client_id}", get(handlers::get_client))
        .route("/authorize", get(handlers::authorize))
        .route("/token", post(handlers::token))
        .route("/userinfo", get(handlers::userinfo))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|req: &axum::http::Request<_>| {
                            use tracing::field::Empty;
                            // The query string carries codes and challenges; log the path only
                            tracing::info_span!(
                                "http.request",
                                http.method = %req.method(),
                                http.target = %req.uri().path(),
                                http.status_code = Empty,
                            )
                        })
                        .on_response(
                            |res: &axum::http::Response<_>,
                             latency: Duration,
                             span: &tracing::Span| {
                                span.record(
                                    "http.status_code",
                                    tracing::field::display(res.status().as_u16()),
                                );
                                tracing::info!(
                                    http.status = %res.status().as_u16(),
                                    elapsed_ms = %latency.as_millis(),
                                    "request handled"
                                );
                            },
                        ),
                )
                .layer(DefaultBodyLimit::max(cfg.server.body_limit_bytes)),
        )
        .with_state(state)
}

pub struct LatchkeyServer {
    addr: SocketAddr,
    app: Router,
    provider: Arc<OAuthProvider>,
    cleanup_interval: Duration,
}

pub struct ServerBuilder {
    config: AppConfig,
    storages: Option<Storages>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            storages: None,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Uses the given stores instead of fresh in-memory ones.
    pub fn with_storages(mut self, storages: Storages) -> Self {
        self.storages = Some(storages);
        self
    }

    pub fn build(self) -> anyhow::Result<LatchkeyServer> {
        let storages = self.storages.unwrap_or_else(Storages::in_memory);
        let provider = Arc::new(
            OAuthProvider::new(&self.config.auth, storages)
                .context("failed to initialize the authorization server")?,
        );

        let header = HeaderName::from_bytes(self.config.session.subject_header.as_bytes())
            .context("invalid session.subject_header")?;
        let subjects: Arc<dyn SubjectResolver> = Arc::new(HeaderSubjectResolver::new(header));

        let state = AppState::new(provider.clone(), subjects);
        let app = build_app(&self.config, state);

        Ok(LatchkeyServer {
            addr: self.config.addr(),
            app,
            provider,
            cleanup_interval: self.config.maintenance.cleanup_interval,
        })
    }
}

impl LatchkeyServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let cleanup = spawn_cleanup(self.provider.clone(), self.cleanup_interval);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        let result = axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        cleanup.abort();
        result?;
        Ok(())
    }
}

/// Periodically purges used and expired grants.
pub fn spawn_cleanup(provider: Arc<OAuthProvider>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match provider.cleanup_expired().await {
                Ok(report) => tracing::debug!(
                    codes = report.codes,
                    refresh_tokens = report.refresh_tokens,
                    "grant cleanup"
                ),
                Err(e) => tracing::warn!(error = %e, "grant cleanup failed"),
            }
        }
    })
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
