use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{get, post},
};
use sessionward_auth::{
    AuthState, BundleStore, InMemoryBundleStore, InMemoryUserStore, SessionService, UserStore,
};
use sessionward_auth_postgres::PostgresAuthStorage;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::{AppConfig, StorageBackend},
    handlers, metrics, middleware as app_middleware,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionService,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        AuthState::new(state.sessions.clone())
    }
}

/// Connects the configured storage backend and builds the session service.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let (users, bundles): (Arc<dyn UserStore>, Arc<dyn BundleStore>) = match cfg.storage.backend
    {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; sessions are lost on restart");
            (
                Arc::new(InMemoryUserStore::new()),
                Arc::new(InMemoryBundleStore::new()),
            )
        }
        StorageBackend::Postgres => {
            let pg = cfg
                .storage
                .postgres
                .as_ref()
                .context("storage.postgres is not configured")?;
            let storage = PostgresAuthStorage::connect(&pg.pool_config())
                .await
                .context("connecting to PostgreSQL")?;
            if cfg.storage.run_migrations {
                storage.migrate().await.context("running migrations")?;
            }
            (storage.user_store(), storage.bundle_store())
        }
    };

    Ok(AppState {
        sessions: SessionService::new(users, bundles, cfg.auth.clone()),
    })
}

pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    let mut router = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/logout", post(handlers::logout))
        .route(
            "/protected",
            get(handlers::protected).post(handlers::protected),
        );

    if cfg.metrics.enabled {
        router = router
            .route("/metrics", get(handlers::metrics_handler))
            .layer(middleware::from_fn(app_middleware::track_metrics));
    }

    // Outermost first: request id -> trace -> cors/compression -> body limit
    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(app_middleware::request_id))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|req: &axum::http::Request<_>| {
                        use tracing::field::Empty;
                        let req_id = req
                            .extensions()
                            .get::<axum::http::HeaderValue>()
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("")
                            .to_string();
                        tracing::info_span!(
                            "http.request",
                            http.method = %req.method(),
                            http.target = %req.uri().path(),
                            http.status_code = Empty,
                            request_id = %req_id
                        )
                    })
                    .on_response(
                        |res: &axum::http::Response<_>, latency: Duration, span: &tracing::Span| {
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
            .layer(CorsLayer::permissive())
            .layer(CompressionLayer::new())
            .layer(DefaultBodyLimit::max(cfg.server.body_limit_bytes)),
    )
}

pub struct SessionwardServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<SessionwardServer> {
        if self.config.metrics.enabled {
            metrics::init_metrics();
        }
        let state = build_state(&self.config).await?;
        let app = build_app(&self.config, state);

        Ok(SessionwardServer {
            addr: self.addr,
            app,
        })
    }
}

impl SessionwardServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("binding {}", self.addr))?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
