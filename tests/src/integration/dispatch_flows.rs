//! # Dispatch Flows
//!
//! Full command/query/event round trips: discovery populates the registry,
//! the mediator routes through it, and the orders domain state changes are
//! observable through subsequent queries.

#[cfg(test)]
use crate::support::init_tracing;
#[cfg(test)]
use crate::support::orders::{
    call_log, orders_catalog, CancelOrder, GetOrder, ListOrders, OrderPlaced, OrderReceipt,
    OrderStore, OrderView, PlaceOrder,
};
#[cfg(test)]
use courier_core::{DiscoveryEngine, Mediator};
#[cfg(test)]
use courier_types::{DiscoveryConfig, OperationStatus};

#[cfg(test)]
fn mediator_over_orders() -> (Mediator, crate::support::orders::CallLog) {
    let store = OrderStore::new();
    let log = call_log();
    let catalog = orders_catalog(&store, &log);
    let config = DiscoveryConfig::new([
        "orders.commands",
        "orders.queries.broken",
        "orders.events",
    ]);
    let (registry, _) = DiscoveryEngine::new(&catalog)
        .discover(&config)
        .expect("discovery must succeed");
    (Mediator::builder(registry).build(), log)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_place_then_get_order() {
        init_tracing();
        let (mediator, _log) = mediator_over_orders();

        let placed = mediator
            .execute(PlaceOrder {
                sku: "gear-7".into(),
                quantity: 3,
            })
            .await;
        assert_eq!(placed.status(), OperationStatus::Created);
        let receipt: OrderReceipt = placed.payload_as().unwrap();

        let fetched = mediator
            .query(GetOrder {
                order_id: receipt.order_id,
            })
            .await;
        let view: OrderView = fetched.payload_as().unwrap();
        assert_eq!(view.sku, "gear-7");
        assert_eq!(view.quantity, 3);
        assert!(!view.cancelled);
    }

    #[tokio::test]
    async fn test_business_failure_is_an_envelope() {
        let (mediator, _log) = mediator_over_orders();

        let result = mediator.query(GetOrder { order_id: 404 }).await;
        assert_eq!(result.status(), OperationStatus::NotFound);
        assert!(result.message().unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_validation_failure_is_bad_request() {
        let (mediator, _log) = mediator_over_orders();

        let result = mediator
            .execute(PlaceOrder {
                sku: "gear-7".into(),
                quantity: 0,
            })
            .await;
        assert_eq!(result.status(), OperationStatus::BadRequest);
    }

    #[tokio::test]
    async fn test_cancel_conflict_on_second_attempt() {
        let (mediator, _log) = mediator_over_orders();

        let receipt: OrderReceipt = mediator
            .execute(PlaceOrder {
                sku: "gear-7".into(),
                quantity: 1,
            })
            .await
            .payload_as()
            .unwrap();

        let first = mediator
            .execute(CancelOrder {
                order_id: receipt.order_id,
            })
            .await;
        assert_eq!(first.status(), OperationStatus::NoContent);

        let second = mediator
            .execute(CancelOrder {
                order_id: receipt.order_id,
            })
            .await;
        assert_eq!(second.status(), OperationStatus::Conflict);
    }

    #[tokio::test]
    async fn test_list_orders_from_fallback_subunit() {
        // ListOrdersHandler only exists because Stage 2 salvaged it from
        // the broken queries package.
        let (mediator, _log) = mediator_over_orders();

        mediator
            .execute(PlaceOrder {
                sku: "a".into(),
                quantity: 1,
            })
            .await;
        mediator
            .execute(PlaceOrder {
                sku: "b".into(),
                quantity: 2,
            })
            .await;

        let result = mediator.query(ListOrders).await;
        let views: Vec<OrderView> = result.payload_as().unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].sku, "a");
    }

    #[tokio::test]
    async fn test_publish_fans_out_in_registration_order() {
        let (mediator, log) = mediator_over_orders();

        mediator.publish(OrderPlaced { order_id: 7 }).await;

        assert_eq!(
            *log.lock(),
            vec!["inventory:7", "email:7", "analytics:7"]
        );
    }

    #[tokio::test]
    async fn test_publish_twice_keeps_sequential_ordering() {
        let (mediator, log) = mediator_over_orders();

        mediator.publish(OrderPlaced { order_id: 1 }).await;
        mediator.publish(OrderPlaced { order_id: 2 }).await;

        let calls = log.lock().clone();
        assert_eq!(calls.len(), 6);
        // All of event 1's handlers complete before event 2 starts.
        assert!(calls[..3].iter().all(|call| call.ends_with(":1")));
        assert!(calls[3..].iter().all(|call| call.ends_with(":2")));
    }

    #[tokio::test]
    async fn test_mediator_is_cheap_to_share_across_tasks() {
        let (mediator, _log) = mediator_over_orders();

        let mut handles = Vec::new();
        for i in 0..8u32 {
            let mediator = mediator.clone();
            handles.push(tokio::spawn(async move {
                mediator
                    .execute(PlaceOrder {
                        sku: format!("sku-{i}"),
                        quantity: 1,
                    })
                    .await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert_eq!(result.status(), OperationStatus::Created);
        }

        let listed = mediator.query(ListOrders).await;
        let views: Vec<OrderView> = listed.payload_as().unwrap();
        assert_eq!(views.len(), 8);
    }
}
