//! # Cashbox Endpoint
//!
//! Server-side daily figures and the cash drawer's transaction log.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::json;

use crate::client::{BackendClient, SINGLE_OBJECT};
use crate::error::SyncResult;
use crate::types::{CashboxTransaction, DailySummary, NewCashboxTransaction};

const TRANSACTIONS: &str = "rest/v1/cashbox_transactions";

pub struct CashboxEndpoint<'a> {
    client: &'a BackendClient,
}

impl<'a> CashboxEndpoint<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        CashboxEndpoint { client }
    }

    /// Sales, order and customer counts for `date`
    /// (`get_daily_sales_summary`). All zeros when the service has no row.
    pub async fn daily_summary(&self, date: NaiveDate) -> SyncResult<DailySummary> {
        let request = self
            .client
            .request(Method::POST, "rest/v1/rpc/get_daily_sales_summary")
            .await?
            .json(&json!({ "target_date": date.format("%Y-%m-%d").to_string() }));

        let rows: Vec<DailySummary> = BackendClient::send(request).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    /// Transactions created on `date` (UTC), newest first.
    pub async fn transactions(&self, date: NaiveDate) -> SyncResult<Vec<CashboxTransaction>> {
        let (start, end) = day_bounds(date);

        let request = self
            .client
            .request(Method::GET, TRANSACTIONS)
            .await?
            .query(&[
                ("select", "*".to_string()),
                ("created_at", format!("gte.{}", timestamp(start))),
                ("created_at", format!("lte.{}", timestamp(end))),
                ("order", "created_at.desc".to_string()),
            ]);

        BackendClient::send(request).await
    }

    /// Appends to the log. Transactions are never updated or deleted.
    pub async fn add_transaction(
        &self,
        transaction: &NewCashboxTransaction,
    ) -> SyncResult<CashboxTransaction> {
        let request = self
            .client
            .request(Method::POST, TRANSACTIONS)
            .await?
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .header("Prefer", "return=representation")
            .json(transaction);

        BackendClient::send(request).await
    }
}

/// `[00:00:00.000, 23:59:59.999]` of `date`.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = start + chrono::Duration::days(1) - chrono::Duration::milliseconds(1);
    (start, end)
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
