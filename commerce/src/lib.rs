//! # ClientDesk Commerce
//!
//! Everything around the catalog that is not appointment booking:
//!
//! - [`CatalogService`]: services, blog posts and professionals
//! - [`CartService`] and [`CheckoutService`]: cart to paid order to tasks
//! - [`VoucherService`]: discount codes
//! - [`TaskService`]: post-purchase fulfilment tracking
//! - [`DocumentService`]: client uploads
//!
//! Checkout verification shares the appointment workflow's approach: the
//! order is claimed with a conditional update, then fulfilment runs as
//! independent writes whose results come back as
//! [`clientdesk_core::EffectReport`]s.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod documents;
pub mod error;
pub mod tasks;
pub mod vouchers;

pub use cart::CartService;
pub use catalog::{BlogInput, CatalogService, ProfessionalInput, ServiceInput};
pub use checkout::{
    CheckoutDependencies, CheckoutOutcome, CheckoutPaymentRequest, CheckoutRequest, CheckoutService,
    CheckoutSession,
};
pub use documents::{DocumentService, Upload};
pub use error::{CommerceError, Result};
pub use tasks::{TaskService, TaskUpdate};
pub use vouchers::{ValidateVoucherRequest, VoucherInput, VoucherService};
