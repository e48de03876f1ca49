use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use axum::{Router, routing::get};
use tokio::net::TcpListener as TokioTcpListener;
use tokio::sync::oneshot;

use crate::{FlowState, OAuthClient, OAuthError, TokenResponse};

mod http;
mod target;

pub use target::RedirectTarget;

use http::{CallbackState, callback_handler, fallback_handler, send_outcome};

/// Single-shot callback listener.
///
/// Serves exactly one route and waits for exactly one redirect. The wait is
/// unbounded: the operator may take arbitrarily long to complete the
/// provider's consent step.
#[derive(Debug, Clone)]
pub struct CallbackServer {
    host: String,
    port: u16,
    path: String,
    code_param: String,
    verbose: bool,
}

impl CallbackServer {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        path: impl Into<String>,
        code_param: impl Into<String>,
        verbose: bool,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
            code_param: code_param.into(),
            verbose,
        }
    }

    pub fn bind(&self) -> Result<TcpListener, OAuthError> {
        TcpListener::bind((self.host.as_str(), self.port)).map_err(OAuthError::from)
    }

    /// Runs the listener until the one expected callback has been fully
    /// handled, then shuts down gracefully and returns the flow outcome.
    pub async fn serve_once(
        &self,
        listener: TcpListener,
        client: OAuthClient,
        flow: FlowState,
    ) -> Result<TokenResponse, OAuthError> {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let outcome_tx = Arc::new(Mutex::new(Some(outcome_tx)));

        let state = CallbackState {
            client,
            flow,
            code_param: self.code_param.clone(),
            verbose: self.verbose,
            outcome_tx: outcome_tx.clone(),
        };

        let app = Router::new()
            .route(&self.path, get(callback_handler))
            .fallback(fallback_handler)
            .with_state(state);

        listener.set_nonblocking(true)?;
        let listener = TokioTcpListener::from_std(listener)?;

        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });

        let outcome_tx_for_server = outcome_tx.clone();
        let server_handle = tokio::spawn(async move {
            if let Err(err) = server.await {
                send_outcome(&outcome_tx_for_server, Err(OAuthError::Serve(err.to_string())));
            }
        });

        let outcome = outcome_rx
            .await
            .map_err(|_| OAuthError::Serve("flow outcome channel closed".to_string()))?;

        let _ = shutdown_tx.send(());
        let _ = server_handle.await;

        outcome
    }

    /// Binds and serves in one step.
    pub async fn run(
        &self,
        client: OAuthClient,
        flow: FlowState,
    ) -> Result<TokenResponse, OAuthError> {
        let listener = self.bind()?;
        self.serve_once(listener, client, flow).await
    }
}
