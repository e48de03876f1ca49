use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tokio::sync::oneshot;

use crate::{FlowState, OAuthClient, OAuthError, TokenResponse, verify_nonce};

pub(super) type FlowOutcome = Result<TokenResponse, OAuthError>;
type OutcomeSender = oneshot::Sender<FlowOutcome>;
pub(super) type SharedOutcomeSender = Arc<Mutex<Option<OutcomeSender>>>;

#[derive(Clone)]
pub(super) struct CallbackState {
    pub(super) client: OAuthClient,
    pub(super) flow: FlowState,
    pub(super) code_param: String,
    pub(super) verbose: bool,
    pub(super) outcome_tx: SharedOutcomeSender,
}

/// Single-fire: only the first completion wins, later calls are no-ops.
pub(super) fn send_outcome(outcome_tx: &SharedOutcomeSender, outcome: FlowOutcome) {
    if let Ok(mut guard) = outcome_tx.lock() {
        if let Some(sender) = guard.take() {
            let _ = sender.send(outcome);
        }
    }
}

/// Handles the one expected provider redirect: validates state, exchanges the
/// code, optionally verifies the OIDC nonce, and reports the outcome to the
/// waiting flow. Every exit path releases the wait.
pub(super) async fn callback_handler(
    State(state): State<CallbackState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if state.verbose {
        log::debug!("callback request: {method} {uri}");
        for (name, value) in &headers {
            log::debug!("  {}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
    }

    let received = params.get("state").map(String::as_str).unwrap_or_default();
    if received != state.flow.state {
        let body = format!("Invalid state: {received}");
        send_outcome(
            &state.outcome_tx,
            Err(OAuthError::StateMismatch {
                expected: state.flow.state.clone(),
                received: received.to_string(),
            }),
        );
        return (StatusCode::UNAUTHORIZED, body).into_response();
    }

    let code = match params.get(&state.code_param) {
        Some(code) if !code.is_empty() => code.clone(),
        _ => {
            let body = format!("Missing authorization code parameter: {}", state.code_param);
            send_outcome(&state.outcome_tx, Err(OAuthError::MissingAuthorizationCode));
            return (StatusCode::UNAUTHORIZED, body).into_response();
        }
    };

    let token = match state.client.exchange_code(&code).await {
        Ok(token) => token,
        Err(error) => {
            let body = format!("Exchange error: {error}");
            send_outcome(&state.outcome_tx, Err(error));
            return (StatusCode::SERVICE_UNAVAILABLE, body).into_response();
        }
    };

    if let Some(nonce) = &state.flow.nonce {
        if let Err(error) = verify_nonce(nonce, &token) {
            let body = format!("OIDC nonce error: {error}");
            send_outcome(&state.outcome_tx, Err(error));
            return (StatusCode::UNAUTHORIZED, body).into_response();
        }
    }

    let token_json = match serde_json::to_string_pretty(&token) {
        Ok(json) => json,
        Err(err) => {
            let body = format!("Token serialize error: {err}");
            send_outcome(
                &state.outcome_tx,
                Err(OAuthError::InvalidResponse {
                    message: err.to_string(),
                    body: String::new(),
                }),
            );
            return (StatusCode::SERVICE_UNAVAILABLE, body).into_response();
        }
    };

    log::info!("token result:\n{token_json}");
    send_outcome(&state.outcome_tx, Ok(token));
    (
        StatusCode::OK,
        [("content-type", "application/json")],
        token_json,
    )
        .into_response()
}

pub(super) async fn fallback_handler() -> Response {
    (StatusCode::NOT_FOUND, "not found").into_response()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, Method, StatusCode, Uri};
    use tokio::sync::oneshot;

    use super::{CallbackState, callback_handler, send_outcome};
    use crate::{FlowState, OAuthClient, OAuthClientConfig, OAuthError};

    fn test_state() -> (CallbackState, oneshot::Receiver<super::FlowOutcome>) {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let client = OAuthClient::new(OAuthClientConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            auth_url: "https://provider.test/authorize".to_string(),
            token_url: "https://provider.test/token".to_string(),
            redirect_uri: "http://127.0.0.1:8081/oauth/callback".to_string(),
            scopes: Vec::new(),
            verbose: false,
        })
        .unwrap();
        let state = CallbackState {
            client,
            flow: FlowState {
                state: "expected-state".to_string(),
                nonce: None,
            },
            code_param: "code".to_string(),
            verbose: false,
            outcome_tx: Arc::new(Mutex::new(Some(outcome_tx))),
        };
        (state, outcome_rx)
    }

    async fn invoke(state: CallbackState, params: HashMap<String, String>) -> StatusCode {
        callback_handler(
            State(state),
            Method::GET,
            Uri::from_static("/oauth/callback"),
            HeaderMap::new(),
            Query(params),
        )
        .await
        .status()
    }

    #[tokio::test]
    async fn mismatched_state_is_rejected_without_exchange() {
        let (state, outcome_rx) = test_state();
        let params =
            HashMap::from([("state".to_string(), "wrong".to_string())]);

        let status = invoke(state, params).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let outcome = outcome_rx.await.unwrap();
        assert!(matches!(outcome, Err(OAuthError::StateMismatch { .. })));
    }

    #[tokio::test]
    async fn missing_code_is_rejected() {
        let (state, outcome_rx) = test_state();
        let params =
            HashMap::from([("state".to_string(), "expected-state".to_string())]);

        let status = invoke(state, params).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let outcome = outcome_rx.await.unwrap();
        assert!(matches!(outcome, Err(OAuthError::MissingAuthorizationCode)));
    }

    #[tokio::test]
    async fn only_the_first_outcome_is_recorded() {
        let (state, outcome_rx) = test_state();
        let outcome_tx = state.outcome_tx.clone();

        send_outcome(&outcome_tx, Err(OAuthError::MissingAuthorizationCode));
        send_outcome(
            &outcome_tx,
            Err(OAuthError::StateMismatch {
                expected: "a".to_string(),
                received: "b".to_string(),
            }),
        );

        let outcome = outcome_rx.await.unwrap();
        assert!(matches!(outcome, Err(OAuthError::MissingAuthorizationCode)));
    }
}
