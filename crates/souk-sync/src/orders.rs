//! # Order Creation
//!
//! An order lives in two tables, so creating one takes two inserts:
//!
//! ```text
//! create(header, items)
//!     │
//!     ├── 1. POST /rest/v1/orders            → header row (id assigned)
//!     │
//!     └── 2. POST /rest/v1/order_items       → items, each tagged order_id
//!              │
//!              └── failure: header stays behind without items; the item
//!                  error is returned as-is
//! ```

use reqwest::Method;
use serde::Serialize;
use tracing::{info, warn};

use crate::client::BackendClient;
use crate::error::SyncResult;
use crate::table::TableEndpoint;
use crate::types::{NewRemoteOrder, NewRemoteOrderItem, OrderHeaderPatch, RemoteOrder, RemoteOrderItem};
use souk_core::OrderId;

/// An item body with the parent order id attached.
#[derive(Serialize)]
struct TaggedItem<'a> {
    order_id: OrderId,
    #[serde(flatten)]
    item: &'a NewRemoteOrderItem,
}

impl TableEndpoint<'_, RemoteOrder, NewRemoteOrder, OrderHeaderPatch> {
    /// Inserts the header, then its items. Returns the header with the
    /// inserted items attached.
    ///
    /// Not atomic: if the item insert fails the header row remains on the
    /// service.
    pub async fn create(
        &self,
        header: &NewRemoteOrder,
        items: &[NewRemoteOrderItem],
    ) -> SyncResult<RemoteOrder> {
        let mut order = self.insert(header).await?;

        if items.is_empty() {
            return Ok(order);
        }

        let tagged: Vec<TaggedItem<'_>> = items
            .iter()
            .map(|item| TaggedItem {
                order_id: order.id,
                item,
            })
            .collect();

        let request = self
            .client
            .request(Method::POST, "rest/v1/order_items")
            .await?
            .header("Prefer", "return=representation")
            .json(&tagged);

        match BackendClient::send::<Vec<RemoteOrderItem>>(request).await {
            Ok(inserted) => {
                info!(order_id = %order.id, items = inserted.len(), "Remote order created");
                order.order_items = inserted;
                Ok(order)
            }
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Order items rejected; header left without items");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::testing::{self, Recorded};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use souk_core::{CustomerId, Money, OrderStatus, PaymentMethod, ProductId};

    fn header() -> NewRemoteOrder {
        NewRemoteOrder {
            customer_id: CustomerId(1),
            customer_name: "أحمد محمد".into(),
            subtotal: Money::from_major(300),
            tax: Money::from_major(45),
            discount: Money::zero(),
            total: Money::from_major(345),
            payment_method: PaymentMethod::Cash,
            status: OrderStatus::Completed,
            notes: None,
        }
    }

    fn items() -> Vec<NewRemoteOrderItem> {
        vec![NewRemoteOrderItem {
            product_id: ProductId(1),
            product_name: "خوذة أمان".into(),
            quantity: 2,
            price: Money::from_major(150),
            total: Money::from_major(300),
        }]
    }

    fn order_row(id: u64) -> Value {
        json!({
            "id": id,
            "customer_id": 1,
            "customer_name": "أحمد محمد",
            "subtotal": 30000,
            "tax": 4500,
            "discount": 0,
            "total": 34500,
            "payment_method": "cash",
            "status": "completed",
            "notes": null,
            "created_at": "2024-01-20T10:00:00Z",
            "order_items": []
        })
    }

    fn router(recorded: Recorded, items_status: StatusCode) -> Router {
        let orders = recorded.clone();
        Router::new()
            .route(
                "/rest/v1/orders",
                post(move |headers: HeaderMap, body: String| {
                    let orders = orders.clone();
                    async move {
                        orders.push("POST orders", String::new(), &headers, &body);
                        Json(order_row(42))
                    }
                }),
            )
            .route(
                "/rest/v1/order_items",
                post(move |headers: HeaderMap, body: String| {
                    let recorded = recorded.clone();
                    async move {
                        recorded.push("POST order_items", String::new(), &headers, &body);
                        if items_status.is_success() {
                            (
                                items_status,
                                Json(json!([{
                                    "id": 1, "order_id": 42, "product_id": 1,
                                    "product_name": "خوذة أمان", "quantity": 2,
                                    "price": 15000, "total": 30000
                                }])),
                            )
                        } else {
                            (items_status, Json(json!({ "message": "insert violates foreign key" })))
                        }
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_create_tags_items_with_new_order_id() {
        let recorded = Recorded::default();
        let client = testing::serve(router(recorded.clone(), StatusCode::CREATED)).await;

        let order = client.orders().create(&header(), &items()).await.unwrap();
        assert_eq!(order.id, OrderId(42));
        assert_eq!(order.order_items.len(), 1);
        assert_eq!(order.total, Money::from_major(345));

        let calls = recorded.all();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method, "POST orders");
        let items: Value = serde_json::from_str(&calls[1].body).unwrap();
        assert_eq!(items[0]["order_id"], 42);
        assert_eq!(items[0]["product_name"], "خوذة أمان");
    }

    #[tokio::test]
    async fn test_item_failure_is_returned_unchanged() {
        let recorded = Recorded::default();
        let client = testing::serve(router(recorded.clone(), StatusCode::CONFLICT)).await;

        let err = client.orders().create(&header(), &items()).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Rejected { status: 409, ref body } if body == "insert violates foreign key"
        ));
        // header went through
        assert_eq!(recorded.all().len(), 2);
    }

    #[tokio::test]
    async fn test_create_without_items_skips_second_insert() {
        let recorded = Recorded::default();
        let client = testing::serve(router(recorded.clone(), StatusCode::CREATED)).await;

        let order = client.orders().create(&header(), &[]).await.unwrap();
        assert!(order.order_items.is_empty());
        assert_eq!(recorded.all().len(), 1);
    }
}
