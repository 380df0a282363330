//! In-process stub of the data service for tests.

use axum::http::HeaderMap;
use axum::Router;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use crate::client::BackendClient;
use crate::config::RemoteConfig;

pub const KEY: &str = "test-key";

/// Binds `router` on an ephemeral port and returns a client pointed at it.
pub async fn serve(router: Router) -> BackendClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let config = RemoteConfig::new(&format!("http://{}", addr), KEY).unwrap();
    BackendClient::new(config).unwrap()
}

#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub query: String,
    pub accept: Option<String>,
    pub prefer: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

/// Requests seen by a stub handler.
#[derive(Debug, Clone, Default)]
pub struct Recorded(Arc<Mutex<Vec<Call>>>);

impl Recorded {
    pub fn push(&self, method: &str, query: String, headers: &HeaderMap, body: &str) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        self.0.lock().unwrap().push(Call {
            method: method.to_string(),
            query,
            accept: header("accept"),
            prefer: header("prefer"),
            authorization: header("authorization"),
            body: body.to_string(),
        });
    }

    pub fn last(&self) -> Call {
        self.0.lock().unwrap().last().cloned().unwrap()
    }

    pub fn all(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }
}

pub fn sample_customer(id: u64) -> Value {
    json!({
        "id": id,
        "name": "أحمد محمد",
        "phone": "+201001234567",
        "email": null,
        "type": "in_shop",
        "address": null,
        "credit_limit": 500000,
        "current_balance": 0,
        "is_active": true,
        "created_at": "2024-01-15T00:00:00Z"
    })
}

pub fn sample_product(id: u64, stock: i64, min_stock: i64) -> Value {
    json!({
        "id": id,
        "name": "قفازات عمل",
        "category": "safety_equipment",
        "sku": "GLOVE-001",
        "price": 2500,
        "cost": 1500,
        "stock": stock,
        "min_stock": min_stock,
        "supplier": null,
        "description": null,
        "is_active": true,
        "created_at": "2024-01-01T00:00:00Z"
    })
}

pub fn sample_user() -> Value {
    json!({
        "id": "6f1c2a4e-8b1d-4c3e-9a57-2d0e5b7f1a90",
        "email": "owner@shop.eg",
        "user_metadata": { "name": "صاحب المحل" }
    })
}

pub fn sample_session() -> Value {
    json!({
        "access_token": "user-token",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-token",
        "user": sample_user()
    })
}
