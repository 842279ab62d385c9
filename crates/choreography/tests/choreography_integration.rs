//! Integration tests for the choreographed workflow.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use choreography::{
    ChoreographyConfig, CompletionCoordinator, DeliveryFailure, EventBus, EventHandler, EventKind,
    HandlerError, InventoryHandler, NotificationHandler, OrderIntake, OrderStore, PaymentHandler,
    ShippingHandler, WorkflowEvent,
};
use collaborators::{
    InMemoryInventoryService, InMemoryNotificationService, InMemoryPaymentService,
    InMemoryShippingService,
};
use common::CustomerId;
use domain::{Address, LineItem, Money, Order, OrderRequest, Priority};
use tokio::sync::mpsc::UnboundedReceiver;

/// Records every event it sees, in dispatch order.
struct Recorder {
    events: Arc<Mutex<Vec<WorkflowEvent>>>,
}

#[async_trait::async_trait]
impl EventHandler for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    async fn handle(&self, event: &WorkflowEvent, _: &EventBus) -> Result<(), HandlerError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

struct TestHarness {
    bus: EventBus,
    failures: UnboundedReceiver<DeliveryFailure>,
    intake: OrderIntake,
    inventory: InMemoryInventoryService,
    payment: InMemoryPaymentService,
    shipping: InMemoryShippingService,
    notification: InMemoryNotificationService,
    coordinator: Arc<CompletionCoordinator>,
    recorded: Arc<Mutex<Vec<WorkflowEvent>>>,
}

impl TestHarness {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let (bus, failures) = EventBus::new();
        let store = OrderStore::new();
        let config = ChoreographyConfig::default();

        let inventory = InMemoryInventoryService::new();
        let payment = InMemoryPaymentService::new();
        let shipping = InMemoryShippingService::new();
        let notification = InMemoryNotificationService::new();

        // The recorder subscribes first so it sees events in publish order.
        let recorded = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe_many(
            &EventKind::ALL,
            Arc::new(Recorder {
                events: recorded.clone(),
            }),
        );

        let inventory_handler = Arc::new(InventoryHandler::new(inventory.clone(), config));
        bus.subscribe(EventKind::OrderCreated, inventory_handler.clone());
        bus.subscribe(EventKind::PaymentProcessed, inventory_handler);

        bus.subscribe(
            EventKind::InventoryChecked,
            Arc::new(PaymentHandler::new(payment.clone(), config)),
        );
        bus.subscribe(
            EventKind::InventoryReserved,
            Arc::new(ShippingHandler::new(shipping.clone(), config)),
        );

        let coordinator = Arc::new(CompletionCoordinator::new());
        bus.subscribe_many(
            &[
                EventKind::PaymentProcessed,
                EventKind::InventoryReserved,
                EventKind::ShippingScheduled,
                EventKind::OrderFailed,
            ],
            coordinator.clone(),
        );

        let notification_handler = Arc::new(NotificationHandler::new(
            notification.clone(),
            store.clone(),
            config,
        ));
        bus.subscribe_many(
            &[EventKind::OrderCompleted, EventKind::OrderFailed],
            notification_handler,
        );

        let intake = OrderIntake::new(store, bus.clone());

        Self {
            bus,
            failures,
            intake,
            inventory,
            payment,
            shipping,
            notification,
            coordinator,
            recorded,
        }
    }

    fn two_item_request() -> OrderRequest {
        OrderRequest {
            customer_id: CustomerId::new(),
            items: vec![
                LineItem::new("SKU-001", "Widget", 2, Money::from_cents(1000)),
                LineItem::new("SKU-002", "Gadget", 1, Money::from_cents(2500)),
            ],
            shipping_address: Address::new("1 Main St", "Springfield", "12345"),
            priority: Priority::Standard,
            contact_email: "customer@example.com".to_string(),
        }
    }

    fn recorded_kinds(&self) -> Vec<EventKind> {
        self.recorded
            .lock()
            .unwrap()
            .iter()
            .map(WorkflowEvent::kind)
            .collect()
    }
}

#[tokio::test]
async fn test_happy_path_emits_the_full_event_chain() {
    let mut h = TestHarness::new();

    let order_id = h
        .intake
        .place_order(TestHarness::two_item_request())
        .await
        .unwrap();

    assert_eq!(
        h.recorded_kinds(),
        vec![
            EventKind::OrderCreated,
            EventKind::InventoryChecked,
            EventKind::PaymentProcessed,
            EventKind::InventoryReserved,
            EventKind::ShippingScheduled,
            EventKind::OrderCompleted,
        ]
    );

    // Success flags on the step events.
    let recorded = h.recorded.lock().unwrap();
    assert!(matches!(
        &recorded[1],
        WorkflowEvent::InventoryChecked(d) if d.available
    ));
    assert!(matches!(
        &recorded[2],
        WorkflowEvent::PaymentProcessed(d) if d.success && d.transaction_id.is_some()
    ));
    drop(recorded);

    // External effects and terminal state.
    assert_eq!(h.payment.transaction_count(), 1);
    assert_eq!(h.inventory.reservation_count(), 1);
    assert_eq!(h.shipping.shipment_count(), 1);
    assert_eq!(h.coordinator.tracked_count(), 0);
    assert_eq!(h.notification.sent_count(), 1);
    assert_eq!(h.notification.sent()[0].subject, "Order confirmed");
    assert!(h.failures.try_recv().is_err());

    let completed = h.recorded.lock().unwrap();
    assert_eq!(completed.last().unwrap().order_id(), order_id);
}

#[tokio::test]
async fn test_declined_payment_fails_the_order_without_reversal() {
    let mut h = TestHarness::new();
    h.payment.set_fail_on_charge(true);

    h.intake
        .place_order(TestHarness::two_item_request())
        .await
        .unwrap();

    assert_eq!(
        h.recorded_kinds(),
        vec![
            EventKind::OrderCreated,
            EventKind::InventoryChecked,
            EventKind::PaymentProcessed,
            EventKind::OrderFailed,
        ]
    );

    let recorded = h.recorded.lock().unwrap();
    assert!(matches!(
        &recorded[2],
        WorkflowEvent::PaymentProcessed(d) if !d.success && d.transaction_id.is_none()
    ));
    assert!(matches!(
        &recorded[3],
        WorkflowEvent::OrderFailed(d) if d.step == "payment"
    ));
    drop(recorded);

    // No reservation or shipment was ever attempted.
    assert_eq!(h.inventory.reservation_count(), 0);
    assert_eq!(h.shipping.shipment_count(), 0);
    assert_eq!(h.coordinator.tracked_count(), 0);

    // Failure notification went out.
    assert_eq!(h.notification.sent_count(), 1);
    assert_eq!(h.notification.sent()[0].subject, "Order failed");
    assert!(h.failures.try_recv().is_err());
}

#[tokio::test]
async fn test_unavailable_stock_fails_before_payment() {
    let h = TestHarness::new();
    h.inventory.set_stock("SKU-001", 1); // request wants 2

    h.intake
        .place_order(TestHarness::two_item_request())
        .await
        .unwrap();

    assert_eq!(
        h.recorded_kinds(),
        vec![
            EventKind::OrderCreated,
            EventKind::InventoryChecked,
            EventKind::OrderFailed,
        ]
    );
    let recorded = h.recorded.lock().unwrap();
    assert!(matches!(
        &recorded[1],
        WorkflowEvent::InventoryChecked(d) if !d.available
    ));
    drop(recorded);

    assert_eq!(h.payment.transaction_count(), 0);
}

#[tokio::test]
async fn test_shipping_failure_leaves_charge_and_hold_in_place() {
    let h = TestHarness::new();
    h.shipping.set_fail_on_schedule(true);

    h.intake
        .place_order(TestHarness::two_item_request())
        .await
        .unwrap();

    assert_eq!(
        h.recorded_kinds(),
        vec![
            EventKind::OrderCreated,
            EventKind::InventoryChecked,
            EventKind::PaymentProcessed,
            EventKind::InventoryReserved,
            EventKind::OrderFailed,
        ]
    );

    // No compensation on this path: the charge and the hold both remain.
    assert_eq!(h.payment.transaction_count(), 1);
    assert_eq!(h.inventory.reservation_count(), 1);
    assert_eq!(h.coordinator.tracked_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_payment_times_out_into_order_failed() {
    let h = TestHarness::new();
    h.payment.set_latency(Duration::from_secs(30));

    h.intake
        .place_order(TestHarness::two_item_request())
        .await
        .unwrap();

    let recorded = h.recorded.lock().unwrap();
    let failed = recorded
        .iter()
        .find_map(|e| match e {
            WorkflowEvent::OrderFailed(d) => Some(d),
            _ => None,
        })
        .expect("expected an OrderFailed event");
    assert_eq!(failed.step, "payment");
    assert!(failed.reason.contains("timed out"));
}

#[tokio::test]
async fn test_notification_failure_surfaces_on_the_side_channel() {
    let mut h = TestHarness::new();
    h.notification.set_unreachable(true);

    h.intake
        .place_order(TestHarness::two_item_request())
        .await
        .unwrap();

    // The workflow itself still completed.
    assert_eq!(*h.recorded_kinds().last().unwrap(), EventKind::OrderCompleted);

    let report = h.failures.try_recv().unwrap();
    assert_eq!(report.handler, "notification_handler");
    assert_eq!(report.kind, EventKind::OrderCompleted);
}

#[tokio::test]
async fn test_replayed_trigger_event_double_processes() {
    let h = TestHarness::new();

    h.intake
        .place_order(TestHarness::two_item_request())
        .await
        .unwrap();
    assert_eq!(h.payment.transaction_count(), 1);

    // Handlers do not deduplicate: replaying the payment prerequisite
    // charges the customer a second time.
    let order = {
        let recorded = h.recorded.lock().unwrap();
        match &recorded[1] {
            WorkflowEvent::InventoryChecked(d) => d.order.clone(),
            other => panic!("unexpected event: {other:?}"),
        }
    };
    h.bus
        .publish(WorkflowEvent::inventory_checked(order, true))
        .await;

    assert_eq!(h.payment.transaction_count(), 2);
}

fn coordinator_only_setup() -> (EventBus, Arc<CompletionCoordinator>, Arc<Mutex<Vec<WorkflowEvent>>>) {
    let (bus, _failures) = EventBus::new();
    let recorded = Arc::new(Mutex::new(Vec::new()));
    bus.subscribe_many(
        &EventKind::ALL,
        Arc::new(Recorder {
            events: recorded.clone(),
        }),
    );
    let coordinator = Arc::new(CompletionCoordinator::new());
    bus.subscribe_many(
        &[
            EventKind::PaymentProcessed,
            EventKind::InventoryReserved,
            EventKind::ShippingScheduled,
            EventKind::OrderFailed,
        ],
        coordinator.clone(),
    );
    (bus, coordinator, recorded)
}

fn snapshot() -> Order {
    Order::from_request(TestHarness::two_item_request()).unwrap()
}

#[tokio::test]
async fn test_completion_fires_exactly_once_for_every_permutation() {
    let order = snapshot();
    let order_id = order.id();

    let events = |order: &Order| {
        [
            WorkflowEvent::payment_processed(order.clone(), true, Some("PAY-1".into())),
            WorkflowEvent::inventory_reserved(order.clone(), "RES-1"),
            WorkflowEvent::shipping_scheduled(order_id, "TRK-1", chrono::Utc::now()),
        ]
    };

    // All 3! arrival orders must each derive exactly one OrderCompleted.
    let permutations: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    for permutation in permutations {
        let (bus, coordinator, recorded) = coordinator_only_setup();
        let events = events(&order);
        for &i in &permutation {
            bus.publish(events[i].clone()).await;
        }

        let completions = recorded
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind() == EventKind::OrderCompleted)
            .count();
        assert_eq!(completions, 1, "permutation {permutation:?}");
        assert_eq!(coordinator.tracked_count(), 0);
    }
}

#[tokio::test]
async fn test_order_failed_clears_partial_state_and_stale_events_do_not_complete() {
    let (bus, coordinator, recorded) = coordinator_only_setup();
    let order = snapshot();
    let order_id = order.id();

    bus.publish(WorkflowEvent::payment_processed(
        order.clone(),
        true,
        Some("PAY-1".into()),
    ))
    .await;
    assert_eq!(coordinator.tracked_count(), 1);

    bus.publish(WorkflowEvent::order_failed(
        order_id,
        "shipping_schedule",
        "no carrier capacity",
    ))
    .await;
    assert_eq!(coordinator.tracked_count(), 0);

    // Stale step events arriving after the failure must neither complete
    // the order nor leave tracking state behind.
    bus.publish(WorkflowEvent::inventory_reserved(order.clone(), "RES-1"))
        .await;
    bus.publish(WorkflowEvent::shipping_scheduled(
        order_id,
        "TRK-1",
        chrono::Utc::now(),
    ))
    .await;

    let completions = recorded
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.kind() == EventKind::OrderCompleted)
        .count();
    assert_eq!(completions, 0);
    assert_eq!(coordinator.tracked_count(), 0);
}

#[tokio::test]
async fn test_unsuccessful_payment_event_is_not_tracked() {
    let (bus, coordinator, recorded) = coordinator_only_setup();
    let order = snapshot();

    bus.publish(WorkflowEvent::payment_processed(order, false, None))
        .await;

    assert_eq!(coordinator.tracked_count(), 0);
    assert!(
        recorded
            .lock()
            .unwrap()
            .iter()
            .all(|e| e.kind() != EventKind::OrderCompleted)
    );
}

#[tokio::test]
async fn test_concurrent_orders_complete_independently() {
    let h = TestHarness::new();

    // Interleave two orders' workflows on the same bus.
    let first = h.intake.place_order(TestHarness::two_item_request());
    let second = h.intake.place_order(TestHarness::two_item_request());
    let (first, second) = tokio::join!(first, second);
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first, second);

    let recorded = h.recorded.lock().unwrap();
    for order_id in [first, second] {
        let completions = recorded
            .iter()
            .filter(|e| e.kind() == EventKind::OrderCompleted && e.order_id() == order_id)
            .count();
        assert_eq!(completions, 1);
    }
    drop(recorded);

    assert_eq!(h.payment.transaction_count(), 2);
    assert_eq!(h.shipping.shipment_count(), 2);
    assert_eq!(h.coordinator.tracked_count(), 0);
}
