//! # Backend Client
//!
//! Shared HTTP plumbing for every endpoint: base URL, the `apikey` header,
//! the bearer token, and status-code mapping.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  client.customers().list()                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BackendClient::request(GET, "rest/v1/customers")                      │
//! │       │  apikey: <key>                                                  │
//! │       │  Authorization: Bearer <session token | key>                    │
//! │       ▼                                                                 │
//! │  reqwest ──────────────► data service                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  handle_response                                                       │
//! │       ├── 2xx          → JSON body                                      │
//! │       ├── 401 / 403    → SyncError::Unauthorized                        │
//! │       ├── 404 / 406    → SyncError::NotFound                            │
//! │       └── other        → SyncError::Rejected { status, body }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use crate::auth::RemoteAuth;
use crate::cashbox::CashboxEndpoint;
use crate::config::RemoteConfig;
use crate::error::{SyncError, SyncResult};
use crate::table::TableEndpoint;
use crate::types::{AuthEvent, NewRemoteOrder, OrderHeaderPatch, RemoteOrder, Session};
use souk_core::{
    Customer, CustomerPatch, Expense, ExpensePatch, NewCustomer, NewExpense, NewProduct, Product,
    ProductPatch,
};

/// Accept header asking PostgREST for a single JSON object instead of an
/// array.
pub(crate) const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Capacity of the auth event channel.
const AUTH_EVENT_CAPACITY: usize = 16;

/// Handle to the remote data service. Cheap to clone; clones share the
/// HTTP pool and the signed-in session.
#[derive(Debug, Clone)]
pub struct BackendClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    config: RemoteConfig,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl BackendClient {
    pub fn new(config: RemoteConfig) -> SyncResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);

        Ok(BackendClient {
            inner: Arc::new(Inner {
                http,
                config,
                session: RwLock::new(None),
                events,
            }),
        })
    }

    /// [`RemoteConfig::from_env`] + [`new`](Self::new).
    pub fn from_env() -> SyncResult<Self> {
        Self::new(RemoteConfig::from_env()?)
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.inner.config
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    pub fn customers(&self) -> TableEndpoint<'_, Customer, NewCustomer, CustomerPatch> {
        TableEndpoint::new(self, "customers", "*")
    }

    pub fn products(&self) -> TableEndpoint<'_, Product, NewProduct, ProductPatch> {
        TableEndpoint::new(self, "products", "*")
    }

    /// Orders come back with their `order_items` embedded.
    pub fn orders(&self) -> TableEndpoint<'_, RemoteOrder, NewRemoteOrder, OrderHeaderPatch> {
        TableEndpoint::new(
            self,
            "orders",
            "*,order_items(id,order_id,product_id,product_name,quantity,price,total)",
        )
    }

    pub fn expenses(&self) -> TableEndpoint<'_, Expense, NewExpense, ExpensePatch> {
        TableEndpoint::new(self, "expenses", "*")
    }

    pub fn cashbox(&self) -> CashboxEndpoint<'_> {
        CashboxEndpoint::new(self)
    }

    pub fn auth(&self) -> RemoteAuth {
        RemoteAuth::new(self.clone())
    }

    // =========================================================================
    // Session State
    // =========================================================================

    pub(crate) async fn current_session(&self) -> Option<Session> {
        self.inner.session.read().await.clone()
    }

    pub(crate) async fn set_session(&self, session: Option<Session>) {
        *self.inner.session.write().await = session;
    }

    pub(crate) fn publish(&self, event: AuthEvent) {
        // no receivers is fine
        let _ = self.inner.events.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Builds a request to `path` carrying the key and the best bearer token
    /// available (the session's, else the key itself).
    pub(crate) async fn request(&self, method: Method, path: &str) -> SyncResult<RequestBuilder> {
        let token = match self.current_session().await {
            Some(session) => session.access_token,
            None => self.inner.config.api_key.clone(),
        };
        self.request_with_token(method, path, &token)
    }

    pub(crate) fn request_with_token(
        &self,
        method: Method,
        path: &str,
        token: &str,
    ) -> SyncResult<RequestBuilder> {
        let url = self.inner.config.endpoint(path)?;
        debug!(method = %method, url = %url, "Remote request");

        Ok(self
            .inner
            .http
            .request(method, url)
            .header("apikey", &self.inner.config.api_key)
            .bearer_auth(token))
    }

    /// Sends `request` and decodes a JSON body.
    pub(crate) async fn send<T: DeserializeOwned>(request: RequestBuilder) -> SyncResult<T> {
        let response = Self::handle_response(request.send().await?).await?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body).map_err(|e| SyncError::InvalidResponse(e.to_string()))
    }

    /// Sends `request` and ignores any body.
    pub(crate) async fn send_empty(request: RequestBuilder) -> SyncResult<()> {
        Self::handle_response(request.send().await?).await?;
        Ok(())
    }

    async fn handle_response(response: Response) -> SyncResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text);
        warn!(status = status.as_u16(), message = %message, "Remote request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Unauthorized(message),
            StatusCode::NOT_FOUND | StatusCode::NOT_ACCEPTABLE => SyncError::NotFound(message),
            _ => SyncError::Rejected {
                status: status.as_u16(),
                body: message,
            },
        })
    }
}

/// The service's own error text: `message`, `msg`, `error_description` or
/// `error` from a JSON body, else the raw body.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}
