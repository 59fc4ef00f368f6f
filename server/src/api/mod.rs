//! HTTP handlers, one module per resource.

pub mod accounts;
pub mod appointments;
pub mod cart;
pub mod catalog;
pub mod documents;
pub mod rates;
pub mod tasks;
pub mod vouchers;
