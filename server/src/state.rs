//! Application state for the ClientDesk HTTP server.
//!
//! Every workflow service is built once from injected stores and gateways and
//! shared (cheaply, via `Arc`) by all handlers.

use axum::extract::FromRef;
use clientdesk_auth::{
    Argon2Hasher, AuthConfig, AuthDependencies, AuthService, JwtIssuer,
};
use clientdesk_booking::{AppointmentService, BookingConfig, BookingDependencies};
use clientdesk_commerce::{
    CartService, CatalogService, CheckoutDependencies, CheckoutService, DocumentService,
    TaskService, VoucherService,
};
use clientdesk_core::catalog::{BlogPost, Professional, Service};
use clientdesk_core::commerce::{Cart, CheckoutOrder, StoredDocument, Task, Voucher};
use clientdesk_core::environment::Clock;
use clientdesk_core::store::Collection;
use clientdesk_core::{Account, Appointment, HourlyRate};
use clientdesk_gateways::{CalendarGateway, DocumentGateway, NotificationGateway, PaymentGateway};
use clientdesk_web::Readiness;
use std::sync::Arc;

/// One handle per document collection.
#[derive(Clone)]
pub struct Stores {
    /// Client and admin accounts
    pub accounts: Arc<dyn Collection<Account>>,
    /// Bookings
    pub appointments: Arc<dyn Collection<Appointment>>,
    /// Hourly rate history
    pub rates: Arc<dyn Collection<HourlyRate>>,
    /// Service catalog
    pub services: Arc<dyn Collection<Service>>,
    /// Blog posts
    pub blogs: Arc<dyn Collection<BlogPost>>,
    /// Team members
    pub people: Arc<dyn Collection<Professional>>,
    /// Discount codes
    pub vouchers: Arc<dyn Collection<Voucher>>,
    /// Carts, one per account
    pub carts: Arc<dyn Collection<Cart>>,
    /// Checkout orders
    pub orders: Arc<dyn Collection<CheckoutOrder>>,
    /// Fulfilment tasks
    pub tasks: Arc<dyn Collection<Task>>,
    /// Uploaded document metadata
    pub documents: Arc<dyn Collection<StoredDocument>>,
}

/// External services.
#[derive(Clone)]
pub struct Gateways {
    /// Payment orders, signatures and refunds
    pub payments: Arc<dyn PaymentGateway>,
    /// Availability and events
    pub calendar: Arc<dyn CalendarGateway>,
    /// Transactional email
    pub notifier: Arc<dyn NotificationGateway>,
    /// Uploaded file storage
    pub storage: Arc<dyn DocumentGateway>,
}

/// Workflow settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Tokens and reset links
    pub auth: AuthConfig,
    /// Booking currency, timezone and bypass
    pub booking: BookingConfig,
}

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Accounts and tokens
    pub auth: AuthService,
    /// Booking workflow (rates via [`AppointmentService::rates`])
    pub appointments: AppointmentService,
    /// Services, blogs and team
    pub catalog: CatalogService,
    /// Discount codes
    pub vouchers: VoucherService,
    /// Carts
    pub carts: CartService,
    /// Checkout and order fulfilment
    pub checkout: CheckoutService,
    /// Fulfilment tasks
    pub tasks: TaskService,
    /// Uploaded documents
    pub documents: DocumentService,
    /// Dependencies checked by `/ready`
    pub readiness: Readiness,
}

impl AppState {
    /// Wire every service.
    #[must_use]
    pub fn new(stores: Stores, gateways: Gateways, clock: Arc<dyn Clock>, settings: Settings) -> Self {
        let tokens = JwtIssuer::new(
            &settings.auth.jwt_secret,
            settings.auth.token_ttl,
            Arc::clone(&clock),
        );
        let auth = AuthService::new(
            AuthDependencies {
                accounts: Arc::clone(&stores.accounts),
                hasher: Arc::new(Argon2Hasher::new()),
                tokens: Arc::new(tokens),
                notifier: Arc::clone(&gateways.notifier),
                clock: Arc::clone(&clock),
            },
            settings.auth,
        );

        let currency = settings.booking.currency.clone();
        let appointments = AppointmentService::new(
            BookingDependencies {
                appointments: stores.appointments,
                rates: stores.rates,
                payments: Arc::clone(&gateways.payments),
                calendar: gateways.calendar,
                notifier: Arc::clone(&gateways.notifier),
                clock: Arc::clone(&clock),
            },
            settings.booking,
        );

        let catalog = CatalogService::new(
            Arc::clone(&stores.services),
            stores.blogs,
            stores.people,
            Arc::clone(&clock),
        );
        let vouchers = VoucherService::new(stores.vouchers, Arc::clone(&clock));
        let carts = CartService::new(
            stores.carts,
            Arc::clone(&stores.services),
            Arc::clone(&clock),
        );
        let checkout = CheckoutService::new(
            CheckoutDependencies {
                orders: stores.orders,
                tasks: Arc::clone(&stores.tasks),
                services: stores.services,
                accounts: stores.accounts,
                payments: gateways.payments,
                notifier: gateways.notifier,
                clock: Arc::clone(&clock),
            },
            carts.clone(),
            vouchers.clone(),
            currency,
        );
        let tasks = TaskService::new(stores.tasks, Arc::clone(&clock));
        let documents = DocumentService::new(stores.documents, gateways.storage, clock);

        Self {
            auth,
            appointments,
            catalog,
            vouchers,
            carts,
            checkout,
            tasks,
            documents,
            readiness: Readiness::new(),
        }
    }

    /// Set the readiness probes.
    #[must_use]
    pub fn with_readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = readiness;
        self
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for Readiness {
    fn from_ref(state: &AppState) -> Self {
        state.readiness.clone()
    }
}
