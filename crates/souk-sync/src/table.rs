//! # Table Endpoints
//!
//! Collection operations over one REST table.
//!
//! ```text
//! list()            GET    /rest/v1/{table}?select=..&order=created_at.desc
//! get(id)           GET    /rest/v1/{table}?select=..&id=eq.{id}        (single object)
//! insert(draft)     POST   /rest/v1/{table}?select=..                    (return=representation)
//! update(id, patch) PATCH  /rest/v1/{table}?select=..&id=eq.{id}        (return=representation)
//! delete(id)        DELETE /rest/v1/{table}?id=eq.{id}
//! ```
//!
//! `R` is the row type read back, `D` the insert body and `P` the patch body.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use crate::client::{BackendClient, SINGLE_OBJECT};
use crate::error::SyncResult;
use souk_core::{NewProduct, Product, ProductPatch};

const PREFER_REPRESENTATION: &str = "return=representation";

pub struct TableEndpoint<'a, R, D, P> {
    pub(crate) client: &'a BackendClient,
    pub(crate) table: &'static str,
    pub(crate) select: &'static str,
    _rows: PhantomData<fn() -> (R, D, P)>,
}

impl<'a, R, D, P> TableEndpoint<'a, R, D, P>
where
    R: DeserializeOwned,
    D: Serialize + Sync,
    P: Serialize + Sync,
{
    pub(crate) fn new(client: &'a BackendClient, table: &'static str, select: &'static str) -> Self {
        TableEndpoint {
            client,
            table,
            select,
            _rows: PhantomData,
        }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub(crate) fn path(&self) -> String {
        format!("rest/v1/{}", self.table)
    }

    /// Every row, newest first.
    pub async fn list(&self) -> SyncResult<Vec<R>> {
        let request = self
            .client
            .request(Method::GET, &self.path())
            .await?
            .query(&[("select", self.select), ("order", "created_at.desc")]);

        BackendClient::send(request).await
    }

    /// The row with `id`. A missing row is [`SyncError::NotFound`](crate::SyncError::NotFound).
    pub async fn get(&self, id: impl Into<u64>) -> SyncResult<R> {
        let request = self
            .client
            .request(Method::GET, &self.path())
            .await?
            .query(&[("select", self.select.to_string()), ("id", eq(id))])
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT);

        BackendClient::send(request).await
    }

    /// Inserts `draft`; the service assigns id and `created_at`.
    pub async fn insert(&self, draft: &D) -> SyncResult<R> {
        let request = self
            .client
            .request(Method::POST, &self.path())
            .await?
            .query(&[("select", self.select)])
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(draft);

        BackendClient::send(request).await
    }

    /// Merges `patch` into the row with `id` and returns the updated row.
    pub async fn update(&self, id: impl Into<u64>, patch: &P) -> SyncResult<R> {
        let request = self
            .client
            .request(Method::PATCH, &self.path())
            .await?
            .query(&[("select", self.select.to_string()), ("id", eq(id))])
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(patch);

        BackendClient::send(request).await
    }

    /// Deletes the row with `id`. Deleting a missing id is not an error on
    /// the service side.
    pub async fn delete(&self, id: impl Into<u64>) -> SyncResult<()> {
        let request = self
            .client
            .request(Method::DELETE, &self.path())
            .await?
            .query(&[("id", eq(id))]);

        BackendClient::send_empty(request).await
    }
}

impl TableEndpoint<'_, Product, NewProduct, ProductPatch> {
    /// Products at or below their minimum stock, computed by the service
    /// (`get_low_stock_products`).
    pub async fn low_stock(&self) -> SyncResult<Vec<Product>> {
        let request = self
            .client
            .request(Method::POST, "rest/v1/rpc/get_low_stock_products")
            .await?
            .json(&serde_json::json!({}));

        BackendClient::send(request).await
    }
}

/// PostgREST equality filter value.
pub(crate) fn eq(id: impl Into<u64>) -> String {
    format!("eq.{}", id.into())
}
