//! # ClientDesk Testing
//!
//! Testing utilities and helpers for ClientDesk crates.
//!
//! This crate provides:
//! - Deterministic clocks ([`FixedClock`], [`ManualClock`])
//! - [`InMemoryCollection`], a `HashMap`-backed document store
//! - Fixture builders for common documents
//!
//! ## Example
//!
//! ```
//! use clientdesk_testing::{InMemoryCollection, test_clock};
//! use clientdesk_testing::fixtures;
//! use clientdesk_core::store::Collection;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rates = InMemoryCollection::new();
//! rates.insert(&fixtures::hourly_rate(50_000, &test_clock())).await?;
//! assert_eq!(rates.len(), 1);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Duration, Utc};
use clientdesk_core::environment::Clock;

mod in_memory;

pub use in_memory::InMemoryCollection;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Duration, Utc};
    use std::sync::{Arc, Mutex};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use clientdesk_testing::mocks::FixedClock;
    /// use clientdesk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// A clock tests can move forward.
    ///
    /// Clones share the same underlying time.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Start at `time`.
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward.
        pub fn advance(&self, by: Duration) {
            if let Ok(mut time) = self.time.lock() {
                *time += by;
            }
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.time.lock().map_or_else(|e| *e.into_inner(), |t| *t)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

/// Fixture builders for documents used across test suites.
pub mod fixtures {
    use super::Clock;
    use clientdesk_core::catalog::Service;
    use clientdesk_core::{HourlyRate, Money};

    /// An open-ended rate effective from the clock's current time.
    #[must_use]
    pub fn hourly_rate(amount: i64, clock: &dyn Clock) -> HourlyRate {
        let now = clock.now();
        HourlyRate {
            id: clientdesk_core::store::new_id(),
            amount: Money::from_minor(amount),
            currency: "INR".to_string(),
            effective_from: now,
            effective_until: None,
            created_by: None,
            created_at: now,
        }
    }

    /// An active service with the given display price.
    #[must_use]
    pub fn service(title: &str, price: &str, clock: &dyn Clock) -> Service {
        let now = clock.now();
        Service {
            id: clientdesk_core::store::new_id(),
            title: title.to_string(),
            description: format!("{title} description"),
            price: price.to_string(),
            category: None,
            features: Vec::new(),
            steps: Vec::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Install a test subscriber that honours `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, ManualClock, test_clock};
