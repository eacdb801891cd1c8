//! Per-tool save servers.
//!
//! Each worksheet tool gets one router: a handful of POST endpoints under
//! `/api` plus the static-file fallback. Handlers perform plain whole-file
//! writes; concurrent saves race with last-write-wins and no failure is
//! fatal to the process.

pub mod error;
pub mod routes;
pub mod statics;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::application::services::{
    indicators::JOURNAL_FILE, AchStore, CircleboardStore, HypothesisStore, IndicatorJournal,
};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::{Settings, ToolKind};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Shared handler state: the effective settings plus which tool this router
/// serves. Stores are constructed per request; they are plain path bundles.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<StateInner>,
}

struct StateInner {
    fs: Arc<dyn FileSystem>,
    settings: Settings,
    tool: ToolKind,
}

impl AppState {
    pub fn new(settings: Settings, tool: ToolKind) -> Self {
        Self::with_fs(Arc::new(RealFileSystem), settings, tool)
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>, settings: Settings, tool: ToolKind) -> Self {
        Self {
            inner: Arc::new(StateInner { fs, settings, tool }),
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.inner.tool
    }

    pub fn tool_root(&self) -> PathBuf {
        self.inner.settings.tool_root(self.inner.tool)
    }

    pub fn hypothesis_store(&self) -> HypothesisStore {
        HypothesisStore::new(
            self.inner.fs.clone(),
            self.inner.settings.tool_root(ToolKind::Hypothesis),
        )
    }

    pub fn ach_store(&self) -> AchStore {
        AchStore::new(
            self.inner.fs.clone(),
            self.inner.settings.tool_root(ToolKind::Ach),
        )
    }

    pub fn circleboard_store(&self) -> CircleboardStore {
        CircleboardStore::new(
            self.inner.fs.clone(),
            self.inner.settings.tool_root(ToolKind::Circleboard),
        )
    }

    /// The shared keyword journal lives under the circleboard tool root.
    pub fn indicator_journal(&self) -> IndicatorJournal {
        IndicatorJournal::new(
            self.inner.fs.clone(),
            self.inner
                .settings
                .tool_root(ToolKind::Circleboard)
                .join(JOURNAL_FILE),
        )
    }
}

/// Build the router for one tool.
pub fn router(state: AppState) -> Router {
    let api = match state.tool() {
        ToolKind::Hypothesis => routes::hypothesis::routes(),
        ToolKind::Circleboard => routes::circleboard::routes(),
        ToolKind::Ach => routes::ach::routes(),
        ToolKind::Timeline | ToolKind::CausalMap => routes::indicators::routes(),
    };

    Router::new()
        .nest("/api", api)
        .fallback(get(statics::serve_static))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve one tool until shutdown. `port` overrides the configured port.
pub async fn serve(settings: Settings, tool: ToolKind, port: Option<u16>) -> ApplicationResult<()> {
    let root = settings.tool_root(tool);
    std::fs::create_dir_all(&root)
        .map_err(|e| ApplicationError::io(format!("create {}", root.display()), e))?;

    let port = port.unwrap_or_else(|| settings.ports.port(tool));
    let addr = format!("{}:{}", settings.bind, port);
    let app = router(AppState::new(settings, tool));

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ApplicationError::io(format!("bind {addr}"), e))?;

    info!("{} worksheet: http://{}", tool, addr);
    info!("{} root: {}", tool, root.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApplicationError::io(format!("serve {tool}"), e))?;

    info!("{} worksheet stopped", tool);
    Ok(())
}

/// Serve every tool on its configured port until the first failure or
/// shutdown.
pub async fn serve_all(settings: Settings) -> ApplicationResult<()> {
    let mut set = tokio::task::JoinSet::new();
    for tool in ToolKind::ALL {
        set.spawn(serve(settings.clone(), tool, None));
    }
    while let Some(joined) = set.join_next().await {
        joined.map_err(|e| ApplicationError::OperationFailed {
            context: "server task".to_string(),
            source: Box::new(e),
        })??;
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received terminate, shutting down"),
    }
}
