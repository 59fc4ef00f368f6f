//! Per-account shopping cart.

use crate::error::{CommerceError, Result};
use clientdesk_core::catalog::Service;
use clientdesk_core::commerce::{Cart, CartItem};
use clientdesk_core::environment::Clock;
use clientdesk_core::store::Collection;
use std::sync::Arc;

/// Holds one cart per account. A missing cart reads as empty.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn Collection<Cart>>,
    services: Arc<dyn Collection<Service>>,
    clock: Arc<dyn Clock>,
}

impl CartService {
    /// Create a cart service.
    #[must_use]
    pub fn new(
        carts: Arc<dyn Collection<Cart>>,
        services: Arc<dyn Collection<Service>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            carts,
            services,
            clock,
        }
    }

    /// The account's cart.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Store`] on storage failures.
    pub async fn get(&self, account_id: &str) -> Result<Cart> {
        Ok(self
            .carts
            .get(account_id)
            .await?
            .unwrap_or_else(|| Cart::empty(account_id, self.clock.now())))
    }

    /// Add a service. Adding one already in the cart changes nothing.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::NotFound`] when the service does not exist
    /// - [`CommerceError::Validation`] when the service is inactive
    pub async fn add(&self, account_id: &str, service_id: &str) -> Result<Cart> {
        let service = self
            .services
            .get(service_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Service", service_id))?;
        if !service.active {
            return Err(CommerceError::validation("service is not available"));
        }

        let mut cart = self.get(account_id).await?;
        if cart.contains(service_id) {
            return Ok(cart);
        }
        cart.items.push(CartItem {
            service_id: service.id,
            title: service.title,
            price: service.price,
        });
        self.save(&mut cart).await?;
        tracing::debug!(account_id = %account_id, service_id = %service_id, "Added to cart");
        Ok(cart)
    }

    /// Remove a service if present.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Store`] on storage failures.
    pub async fn remove(&self, account_id: &str, service_id: &str) -> Result<Cart> {
        let mut cart = self.get(account_id).await?;
        let before = cart.items.len();
        cart.items.retain(|item| item.service_id != service_id);
        if cart.items.len() != before {
            self.save(&mut cart).await?;
        }
        Ok(cart)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Store`] on storage failures.
    pub async fn clear(&self, account_id: &str) -> Result<Cart> {
        let mut cart = self.get(account_id).await?;
        if !cart.items.is_empty() {
            cart.items.clear();
            self.save(&mut cart).await?;
        }
        Ok(cart)
    }

    async fn save(&self, cart: &mut Cart) -> Result<()> {
        cart.updated_at = self.clock.now();
        if self.carts.get(&cart.id).await?.is_some() {
            self.carts.replace(cart).await?;
        } else {
            self.carts.insert(cart).await?;
        }
        Ok(())
    }
}
