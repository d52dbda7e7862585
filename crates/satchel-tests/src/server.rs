//! Mock ledger HTTP server for exercising `HttpLedgerClient`.
//!
//! Runs an axum router on a background thread with its own tokio runtime,
//! so blocking client calls from the test thread never touch the server's
//! runtime.

use std::sync::Arc;
use std::thread::JoinHandle;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::{Mutex, oneshot};

use satchel_core::constants::{SPENDABLE_UTXOS_PATH, TRANSACTION_PATH, UTXOS_PATH};
use satchel_core::types::{Hash256, PubKeyHash, Transaction};

use crate::helpers::UtxoBook;

/// What the server answers with.
#[derive(Debug, Clone, Default)]
pub enum Behavior {
    /// Serve the book and apply valid submissions.
    #[default]
    Normal,
    /// Answer every request with this status and body.
    Fail(u16, String),
    /// Answer every request with 200 and a body that is not JSON.
    Garbage,
}

#[derive(Default)]
struct LedgerState {
    book: UtxoBook,
    submitted: Vec<serde_json::Value>,
    behavior: Behavior,
}

type SharedState = Arc<Mutex<LedgerState>>;

/// A running mock ledger. Signalled to stop on drop; the server thread is
/// not joined because pooled client connections may outlive the test.
pub struct MockLedgerServer {
    url: String,
    state: SharedState,
    shutdown: Option<oneshot::Sender<()>>,
    _thread: JoinHandle<()>,
}

impl MockLedgerServer {
    /// Bind to an ephemeral localhost port and start serving.
    pub fn spawn() -> Self {
        let state = SharedState::default();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind mock ledger");
        listener.set_nonblocking(true).expect("nonblocking listener");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));

        let app = router(state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("mock ledger runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("mock ledger serve");
            });
        });

        Self {
            url,
            state,
            shutdown: Some(shutdown_tx),
            _thread: thread,
        }
    }

    /// Base URL, e.g. `http://127.0.0.1:43121`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Add an unspent output.
    pub fn fund(&self, txid: Hash256, index: u64, value: u64, owner: PubKeyHash) {
        self.state.blocking_lock().book.fund(txid, index, value, owner);
    }

    /// Change how the server answers.
    pub fn set_behavior(&self, behavior: Behavior) {
        self.state.blocking_lock().behavior = behavior;
    }

    /// Raw JSON bodies of accepted submissions.
    pub fn submitted(&self) -> Vec<serde_json::Value> {
        self.state.blocking_lock().submitted.clone()
    }
}

impl Drop for MockLedgerServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn router(state: SharedState) -> Router {
    Router::new()
        .route(UTXOS_PATH, get(utxos))
        .route(SPENDABLE_UTXOS_PATH, get(spendable_utxos))
        .route(TRANSACTION_PATH, post(transaction))
        .with_state(state)
}

#[derive(Deserialize)]
struct LedgerQuery {
    #[serde(rename = "pubKeyHash")]
    pubkey_hash: String,
    amount: Option<u64>,
}

fn parse_pkh(hex_str: &str) -> Result<PubKeyHash, Response> {
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(hex_str, &mut bytes)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("bad pubKeyHash: {e}")).into_response())?;
    Ok(PubKeyHash(bytes))
}

/// Canned answer for non-normal behaviors.
fn override_response(behavior: &Behavior) -> Option<Response> {
    match behavior {
        Behavior::Normal => None,
        Behavior::Fail(status, body) => Some(
            (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                body.clone(),
            )
                .into_response(),
        ),
        Behavior::Garbage => Some((StatusCode::OK, "<html>not json</html>").into_response()),
    }
}

/// `GET /utxos?pubKeyHash=<hex>`
async fn utxos(State(state): State<SharedState>, Query(q): Query<LedgerQuery>) -> Response {
    let state = state.lock().await;
    if let Some(resp) = override_response(&state.behavior) {
        return resp;
    }
    match parse_pkh(&q.pubkey_hash) {
        Ok(pkh) => Json(state.book.utxos(&pkh)).into_response(),
        Err(resp) => resp,
    }
}

/// `GET /spendable_utxos?pubKeyHash=<hex>&amount=<n>`
async fn spendable_utxos(
    State(state): State<SharedState>,
    Query(q): Query<LedgerQuery>,
) -> Response {
    let state = state.lock().await;
    if let Some(resp) = override_response(&state.behavior) {
        return resp;
    }
    let Some(amount) = q.amount else {
        return (StatusCode::BAD_REQUEST, "missing amount").into_response();
    };
    match parse_pkh(&q.pubkey_hash) {
        Ok(pkh) => Json(state.book.spendable(&pkh, amount)).into_response(),
        Err(resp) => resp,
    }
}

/// `POST /transaction`
async fn transaction(State(state): State<SharedState>, Json(body): Json<serde_json::Value>) -> Response {
    let mut state = state.lock().await;
    if let Some(resp) = override_response(&state.behavior) {
        return resp;
    }
    let tx: Transaction = match serde_json::from_value(body.clone()) {
        Ok(tx) => tx,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("bad transaction: {e}")).into_response(),
    };
    match state.book.apply(&tx) {
        Ok(()) => {
            state.submitted.push(body);
            (StatusCode::CREATED, "Transaction added successfully").into_response()
        }
        Err(message) => (StatusCode::BAD_REQUEST, message).into_response(),
    }
}
