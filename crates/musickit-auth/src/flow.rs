//! Authorization flow orchestration
//!
//! Runs one interactive authorization attempt: starts the loopback
//! callback server on a background task, opens the user's browser at the
//! consent page, and polls the token store until the page delivers a
//! token or the deadline passes. The server holds a shutdown handle and
//! is torn down on both the success and the timeout path, so a failed
//! attempt does not leave the port bound for the process lifetime.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::credentials::DeveloperCredentials;
use crate::error::{Error, Result};
use crate::server::{ConsentPage, build_router};
use crate::store::TokenStore;

/// Default loopback port for the callback server.
pub const DEFAULT_CALLBACK_PORT: u16 = 8000;
/// Default overall deadline for one authorization attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
/// Default delay between token store polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Tunables for one authorization attempt.
#[derive(Debug, Clone)]
pub struct AuthFlowOptions {
    pub listen_addr: SocketAddr,
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Disabled in tests to keep the flow headless.
    pub open_browser: bool,
}

impl Default for AuthFlowOptions {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_CALLBACK_PORT)),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            open_browser: true,
        }
    }
}

/// Handle to the background callback server for one attempt.
pub struct CallbackServer {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl CallbackServer {
    /// Bind the loopback listener and serve the router on a background
    /// task. A bind failure (typically another attempt holding the
    /// port) surfaces as `ServerStart`.
    pub async fn start(router: Router, addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::ServerStart(format!("{addr}: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| Error::ServerStart(e.to_string()))?;

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(addr = %local_addr, "callback server listening");
        Ok(Self {
            local_addr,
            shutdown,
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URL of the consent page on this listener.
    pub fn login_url(&self) -> String {
        format!("http://{}/login", self.local_addr)
    }

    /// Stop accepting connections and wait for the server task to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(Ok(())) => debug!("callback server stopped"),
            Ok(Err(e)) => warn!(error = %e, "callback server exited with error"),
            Err(e) => warn!(error = %e, "callback server task failed"),
        }
    }
}

/// Run one interactive authorization attempt and return the acquired
/// Music user token.
///
/// The caller is expected to have checked the store for an existing
/// token; this always starts a fresh attempt.
pub async fn obtain_user_token(
    credentials: Arc<DeveloperCredentials>,
    store: Arc<TokenStore>,
    page: ConsentPage,
    options: AuthFlowOptions,
) -> Result<String> {
    let router = build_router(credentials, store.clone(), page);
    let server = CallbackServer::start(router, options.listen_addr).await?;
    let login_url = server.login_url();

    if options.open_browser {
        if let Err(e) = webbrowser::open(&login_url) {
            warn!(error = %e, "could not open browser");
            println!("Open this URL to authorize: {login_url}");
        }
    } else {
        debug!(url = %login_url, "browser launch disabled");
    }

    let outcome = wait_for_token(&store, options.timeout, options.poll_interval).await;
    server.shutdown().await;
    outcome
}

/// Poll the token store until it holds a token or the deadline passes.
///
/// A transient read error counts as "absent" for that tick and is
/// retried on the next one.
pub async fn wait_for_token(
    store: &TokenStore,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<String> {
    let deadline = Instant::now() + timeout;
    loop {
        match store.read().await {
            Ok(Some(token)) => {
                info!("user token acquired");
                return Ok(token);
            }
            Ok(None) => {}
            Err(e) => debug!(error = %e, "token store unreadable, retrying"),
        }
        if Instant::now() >= deadline {
            return Err(Error::Timeout(timeout));
        }
        tokio::time::sleep(poll_interval).await;
    }
}
