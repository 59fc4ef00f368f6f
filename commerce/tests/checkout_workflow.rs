//! Cart to checkout to tasks, against in-memory storage and mock gateways.

#![allow(clippy::unwrap_used)]

use clientdesk_commerce::{
    CartService, CheckoutDependencies, CheckoutPaymentRequest, CheckoutRequest, CheckoutService,
    CheckoutSession, CommerceError, VoucherInput, VoucherService,
};
use clientdesk_core::catalog::Service;
use clientdesk_core::commerce::{Cart, CheckoutOrder, CheckoutStatus, DiscountType, Task, Voucher};
use clientdesk_core::environment::Clock;
use clientdesk_core::store::Collection;
use clientdesk_core::{Account, AccountKind, EffectOutcome, EffectReports, Money, Role};
use clientdesk_gateways::mocks::{MockNotificationGateway, MockPaymentGateway, SentNotification};
use clientdesk_testing::{InMemoryCollection, fixtures, test_clock};
use std::sync::Arc;

const CLIENT: &str = "client-1";

struct Harness {
    checkout: CheckoutService,
    carts: CartService,
    vouchers: VoucherService,
    orders: InMemoryCollection<CheckoutOrder>,
    tasks: InMemoryCollection<Task>,
    payments: MockPaymentGateway,
    notifier: MockNotificationGateway,
    gst: Service,
    audit: Service,
}

impl Harness {
    async fn new() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(test_clock());
        let services = InMemoryCollection::<Service>::new();
        let mut gst = fixtures::service("GST Filing", "₹1,500", clock.as_ref());
        gst.steps = vec!["Collect invoices".into(), "File return".into()];
        let audit = fixtures::service("Audit", "₹2,500.50", clock.as_ref());
        services.insert(&gst).await.unwrap();
        services.insert(&audit).await.unwrap();

        let accounts = InMemoryCollection::<Account>::new();
        let now = clock.now();
        accounts
            .insert(&Account {
                id: CLIENT.into(),
                kind: AccountKind::Client,
                role: Role::Client,
                name: "Asha Rao".into(),
                email: "asha@example.com".into(),
                phone: None,
                password_hash: "x".into(),
                active: true,
                reset_token_hash: None,
                reset_token_expires_at: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let orders = InMemoryCollection::new();
        let tasks = InMemoryCollection::new();
        let payments = MockPaymentGateway::new();
        let notifier = MockNotificationGateway::new();
        let carts = CartService::new(
            Arc::new(InMemoryCollection::<Cart>::new()),
            Arc::new(services.clone()),
            Arc::clone(&clock),
        );
        let vouchers = VoucherService::new(
            Arc::new(InMemoryCollection::<Voucher>::new()),
            Arc::clone(&clock),
        );
        let checkout = CheckoutService::new(
            CheckoutDependencies {
                orders: Arc::new(orders.clone()),
                tasks: Arc::new(tasks.clone()),
                services: Arc::new(services),
                accounts: Arc::new(accounts),
                payments: Arc::new(payments.clone()),
                notifier: Arc::new(notifier.clone()),
                clock,
            },
            carts.clone(),
            vouchers.clone(),
            "INR",
        );

        Self {
            checkout,
            carts,
            vouchers,
            orders,
            tasks,
            payments,
            notifier,
            gst,
            audit,
        }
    }

    async fn fill_cart(&self) {
        self.carts.add(CLIENT, &self.gst.id).await.unwrap();
        self.carts.add(CLIENT, &self.audit.id).await.unwrap();
    }

    fn proof(&self, session: &CheckoutSession, payment_id: &str) -> CheckoutPaymentRequest {
        CheckoutPaymentRequest {
            order_id: session.order.order_id.clone(),
            payment_id: payment_id.into(),
            signature: self
                .payments
                .sign_payment(&session.order.order_id, payment_id),
        }
    }
}

#[tokio::test]
async fn empty_cart_cannot_check_out() {
    let h = Harness::new().await;
    let err = h
        .checkout
        .checkout(CLIENT, &CheckoutRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err, CommerceError::Validation("cart is empty".into()));
    assert!(h.payments.orders().is_empty());
}

#[tokio::test]
async fn checkout_totals_parsed_prices() {
    let h = Harness::new().await;
    h.fill_cart().await;

    let session = h
        .checkout
        .checkout(CLIENT, &CheckoutRequest::default())
        .await
        .unwrap();
    assert_eq!(session.order.subtotal, Money::from_minor(400_050));
    assert_eq!(session.order.total, Money::from_minor(400_050));
    assert_eq!(session.order.status, CheckoutStatus::Created);
    assert_eq!(session.key_id, "rzp_test_mock");
    assert_eq!(h.payments.orders()[0].amount, Money::from_minor(400_050));
}

#[tokio::test]
async fn voucher_discount_is_applied_and_redeemed_on_payment() {
    let h = Harness::new().await;
    h.fill_cart().await;
    h.vouchers
        .create(VoucherInput {
            code: Some("welcome".into()),
            discount_type: Some(DiscountType::Fixed),
            discount_value: Some(50_000),
            ..VoucherInput::default()
        })
        .await
        .unwrap();

    let session = h
        .checkout
        .checkout(
            CLIENT,
            &CheckoutRequest {
                voucher_code: Some(" Welcome ".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(session.order.discount, Money::from_minor(50_000));
    assert_eq!(session.order.total, Money::from_minor(350_050));
    assert_eq!(session.order.voucher_code.as_deref(), Some("WELCOME"));

    let outcome = h
        .checkout
        .verify(CLIENT, &h.proof(&session, "pay_1"))
        .await
        .unwrap();
    assert!(outcome.effects.succeeded("redeem-voucher"));
    let list = h.vouchers.list().await.unwrap();
    assert_eq!(list[0].used_count, 1);
}

#[tokio::test]
async fn invalid_voucher_blocks_checkout() {
    let h = Harness::new().await;
    h.fill_cart().await;
    let err = h
        .checkout
        .checkout(
            CLIENT,
            &CheckoutRequest {
                voucher_code: Some("NOPE".into()),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, CommerceError::Validation("voucher not found".into()));
}

#[tokio::test]
async fn verified_payment_creates_tasks_and_clears_cart() {
    let h = Harness::new().await;
    h.fill_cart().await;
    let session = h
        .checkout
        .checkout(CLIENT, &CheckoutRequest::default())
        .await
        .unwrap();

    let outcome = h
        .checkout
        .verify(CLIENT, &h.proof(&session, "pay_1"))
        .await
        .unwrap();

    assert_eq!(outcome.order.status, CheckoutStatus::Paid);
    assert_eq!(outcome.order.payment_id.as_deref(), Some("pay_1"));
    assert_eq!(outcome.tasks.len(), 2);
    assert_eq!(h.tasks.len(), 2);
    assert!(!outcome.effects.any_failed());

    let gst_task = outcome
        .tasks
        .iter()
        .find(|t| t.service_id == h.gst.id)
        .unwrap();
    assert_eq!(gst_task.steps.len(), 2);
    let audit_task = outcome
        .tasks
        .iter()
        .find(|t| t.service_id == h.audit.id)
        .unwrap();
    assert_eq!(audit_task.steps.len(), 4);

    assert!(h.carts.get(CLIENT).await.unwrap().items.is_empty());
    assert!(h.notifier.sent().contains(&SentNotification::Purchase {
        to: "asha@example.com".into(),
        order_id: session.order.order_id.clone(),
    }));
    let voucher = outcome
        .effects
        .iter()
        .find(|e| e.effect == "redeem-voucher")
        .unwrap();
    assert_eq!(voucher.outcome, EffectOutcome::Skipped);
}

#[tokio::test]
async fn repeated_verification_fulfils_once() {
    let h = Harness::new().await;
    h.fill_cart().await;
    let session = h
        .checkout
        .checkout(CLIENT, &CheckoutRequest::default())
        .await
        .unwrap();
    let proof = h.proof(&session, "pay_1");

    let (first, second) = tokio::join!(
        h.checkout.verify(CLIENT, &proof),
        h.checkout.verify(CLIENT, &proof)
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(h.tasks.len(), 2);
    assert_eq!(
        [&first, &second]
            .iter()
            .filter(|o| !o.effects.is_empty())
            .count(),
        1
    );
    assert_eq!(first.order.status, CheckoutStatus::Paid);
    assert_eq!(second.order.status, CheckoutStatus::Paid);

    let again = h.checkout.verify(CLIENT, &proof).await.unwrap();
    assert!(again.effects.is_empty());
    assert_eq!(again.tasks.len(), 2);
}

#[tokio::test]
async fn bad_signature_marks_order_failed() {
    let h = Harness::new().await;
    h.fill_cart().await;
    let session = h
        .checkout
        .checkout(CLIENT, &CheckoutRequest::default())
        .await
        .unwrap();
    let mut proof = h.proof(&session, "pay_1");
    proof.signature = "forged".into();

    let err = h.checkout.verify(CLIENT, &proof).await.unwrap_err();
    assert!(matches!(err, CommerceError::PaymentVerification(_)));
    let stored = h.orders.get(&session.order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, CheckoutStatus::Failed);
    assert!(h.tasks.is_empty());
    assert_eq!(h.carts.get(CLIENT).await.unwrap().items.len(), 2);
}

#[tokio::test]
async fn another_account_cannot_verify() {
    let h = Harness::new().await;
    h.fill_cart().await;
    let session = h
        .checkout
        .checkout(CLIENT, &CheckoutRequest::default())
        .await
        .unwrap();
    let err = h
        .checkout
        .verify("client-2", &h.proof(&session, "pay_1"))
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::Forbidden(_)));
}

#[tokio::test]
async fn email_failure_does_not_undo_payment() {
    let h = Harness::new().await;
    h.fill_cart().await;
    let session = h
        .checkout
        .checkout(CLIENT, &CheckoutRequest::default())
        .await
        .unwrap();
    h.notifier.fail(true);

    let outcome = h
        .checkout
        .verify(CLIENT, &h.proof(&session, "pay_1"))
        .await
        .unwrap();
    assert_eq!(outcome.order.status, CheckoutStatus::Paid);
    assert!(outcome.effects.any_failed());
    assert!(!outcome.effects.succeeded("send-purchase-email"));
    assert!(outcome.effects.succeeded("clear-cart"));
}
