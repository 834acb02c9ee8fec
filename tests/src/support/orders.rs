//! A small orders domain exercised by the integration scenarios: two
//! commands, two queries, one event with three subscribers, and an
//! in-memory store shared by the handlers.

use async_trait::async_trait;
use courier_core::{HandlerCandidate, HandlerSource, ModuleCatalog};
use courier_types::{
    Command, CommandHandler, Event, EventHandler, OperationResult, Query, QueryHandler,
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared call trace subscribers append to, for asserting fan-out order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Create an empty call log.
pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

// =============================================================================
// DOMAIN TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderView {
    pub order_id: u64,
    pub sku: String,
    pub quantity: u32,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: u64,
}

pub struct PlaceOrder {
    pub sku: String,
    pub quantity: u32,
}

impl Command for PlaceOrder {
    type Output = OrderReceipt;
}

pub struct CancelOrder {
    pub order_id: u64,
}

impl Command for CancelOrder {
    type Output = ();
}

pub struct GetOrder {
    pub order_id: u64,
}

impl Query for GetOrder {
    type Output = OrderView;
}

pub struct ListOrders;

impl Query for ListOrders {
    type Output = Vec<OrderView>;
}

pub struct OrderPlaced {
    pub order_id: u64,
}

impl Event for OrderPlaced {}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// In-memory order repository shared by the handlers.
#[derive(Default)]
pub struct OrderStore {
    next_id: AtomicU64,
    orders: RwLock<HashMap<u64, OrderView>>,
}

impl OrderStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            orders: RwLock::new(HashMap::new()),
        })
    }

    pub fn insert(&self, sku: &str, quantity: u32) -> u64 {
        let order_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.orders.write().insert(
            order_id,
            OrderView {
                order_id,
                sku: sku.to_string(),
                quantity,
                cancelled: false,
            },
        );
        order_id
    }

    pub fn get(&self, order_id: u64) -> Option<OrderView> {
        self.orders.read().get(&order_id).cloned()
    }

    pub fn all(&self) -> Vec<OrderView> {
        let mut orders: Vec<_> = self.orders.read().values().cloned().collect();
        orders.sort_by_key(|order| order.order_id);
        orders
    }

    /// Mark an order cancelled. `None` when the order does not exist,
    /// `Some(false)` when it was already cancelled.
    pub fn cancel(&self, order_id: u64) -> Option<bool> {
        let mut orders = self.orders.write();
        let order = orders.get_mut(&order_id)?;
        if order.cancelled {
            return Some(false);
        }
        order.cancelled = true;
        Some(true)
    }
}

// =============================================================================
// COMMAND / QUERY HANDLERS
// =============================================================================

pub struct PlaceOrderHandler {
    pub store: Arc<OrderStore>,
}

#[async_trait]
impl CommandHandler for PlaceOrderHandler {
    type Command = PlaceOrder;

    async fn handle(&self, command: &PlaceOrder) -> OperationResult {
        if command.quantity == 0 {
            return OperationResult::bad_request("quantity must be positive");
        }
        let order_id = self.store.insert(&command.sku, command.quantity);
        OperationResult::created(&OrderReceipt { order_id })
    }
}

pub struct CancelOrderHandler {
    pub store: Arc<OrderStore>,
}

#[async_trait]
impl CommandHandler for CancelOrderHandler {
    type Command = CancelOrder;

    async fn handle(&self, command: &CancelOrder) -> OperationResult {
        match self.store.cancel(command.order_id) {
            Some(true) => OperationResult::no_content(),
            Some(false) => OperationResult::conflict(format!(
                "order {} is already cancelled",
                command.order_id
            )),
            None => {
                OperationResult::not_found(format!("order {} does not exist", command.order_id))
            }
        }
    }
}

pub struct GetOrderHandler {
    pub store: Arc<OrderStore>,
}

#[async_trait]
impl QueryHandler for GetOrderHandler {
    type Query = GetOrder;

    async fn handle(&self, query: &GetOrder) -> OperationResult {
        match self.store.get(query.order_id) {
            Some(order) => OperationResult::ok(&order),
            None => OperationResult::not_found(format!("order {} does not exist", query.order_id)),
        }
    }
}

pub struct ListOrdersHandler {
    pub store: Arc<OrderStore>,
}

#[async_trait]
impl QueryHandler for ListOrdersHandler {
    type Query = ListOrders;

    async fn handle(&self, _query: &ListOrders) -> OperationResult {
        OperationResult::ok(&self.store.all())
    }
}

// =============================================================================
// EVENT SUBSCRIBERS
// =============================================================================

pub struct InventorySubscriber {
    pub log: CallLog,
}

#[async_trait]
impl EventHandler for InventorySubscriber {
    type Event = OrderPlaced;

    async fn handle(&self, event: &OrderPlaced) -> anyhow::Result<()> {
        self.log.lock().push(format!("inventory:{}", event.order_id));
        Ok(())
    }
}

pub struct ReceiptEmailSubscriber {
    pub log: CallLog,
    pub fail: bool,
}

#[async_trait]
impl EventHandler for ReceiptEmailSubscriber {
    type Event = OrderPlaced;

    async fn handle(&self, event: &OrderPlaced) -> anyhow::Result<()> {
        self.log.lock().push(format!("email:{}", event.order_id));
        if self.fail {
            anyhow::bail!("smtp relay unavailable");
        }
        Ok(())
    }
}

pub struct AnalyticsSubscriber {
    pub log: CallLog,
}

#[async_trait]
impl EventHandler for AnalyticsSubscriber {
    type Event = OrderPlaced;

    async fn handle(&self, event: &OrderPlaced) -> anyhow::Result<()> {
        self.log.lock().push(format!("analytics:{}", event.order_id));
        Ok(())
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Build the catalog the discovery scenarios scan.
///
/// `orders.commands` and `orders.events` import whole. The
/// `orders.queries.broken` package fails its whole-unit import because of
/// an unrelated dependency problem, but two of its three sub-units import
/// cleanly on their own.
pub fn orders_catalog(store: &Arc<OrderStore>, log: &CallLog) -> ModuleCatalog {
    let mut catalog = ModuleCatalog::new();
    let root = catalog.root("app");

    let commands_store = Arc::clone(store);
    root.module("orders.commands", move || {
        Ok(vec![
            HandlerCandidate::command(HandlerSource::instance(PlaceOrderHandler {
                store: Arc::clone(&commands_store),
            })),
            HandlerCandidate::command(HandlerSource::instance(CancelOrderHandler {
                store: Arc::clone(&commands_store),
            })),
        ])
    });

    root.broken(
        "orders.queries.broken",
        "package import pulled in a missing native dependency",
    );

    let get_store = Arc::clone(store);
    root.module("orders.queries.broken.get_order", move || {
        Ok(vec![HandlerCandidate::query(HandlerSource::instance(
            GetOrderHandler {
                store: Arc::clone(&get_store),
            },
        ))])
    });

    let list_store = Arc::clone(store);
    root.module("orders.queries.broken.list_orders", move || {
        Ok(vec![HandlerCandidate::query(HandlerSource::instance(
            ListOrdersHandler {
                store: Arc::clone(&list_store),
            },
        ))])
    });

    root.broken(
        "orders.queries.broken.search",
        "file fails to import on its own",
    );

    let events_log = Arc::clone(log);
    root.module("orders.events", move || {
        Ok(vec![
            HandlerCandidate::event(HandlerSource::instance(InventorySubscriber {
                log: Arc::clone(&events_log),
            })),
            HandlerCandidate::event(HandlerSource::instance(ReceiptEmailSubscriber {
                log: Arc::clone(&events_log),
                fail: false,
            })),
            HandlerCandidate::event(HandlerSource::instance(AnalyticsSubscriber {
                log: Arc::clone(&events_log),
            })),
        ])
    });

    catalog
}
