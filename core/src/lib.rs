//! # ClientDesk Core
//!
//! Domain model and core traits for the ClientDesk backend.
//!
//! The crate is deliberately free of I/O. It provides:
//!
//! - **Domain documents**: appointments, hourly rates, catalog entries, carts,
//!   vouchers, tasks, stored documents and accounts
//! - **Value types**: [`Money`] in minor currency units and [`TimeOfDay`] as
//!   minutes since midnight
//! - **Persistence seam**: the [`store::Collection`] trait over a document store
//! - **Reducer**: pure `(State, Action, Environment) → Effects` transitions
//! - **Environment**: the [`environment::Clock`] abstraction
//! - **Outcomes**: [`EffectReport`] envelopes for best-effort side effects
//!
//! ## Example
//!
//! ```
//! use clientdesk_core::{Money, TimeOfDay};
//!
//! let start: TimeOfDay = "10:00".parse().unwrap();
//! let end = start.checked_add_hours(2).unwrap();
//! assert_eq!(end.to_string(), "12:00");
//!
//! let total = Money::from_minor(50_000).checked_mul(2).unwrap();
//! assert_eq!(total.minor_units(), 100_000);
//! ```

pub use chrono::{DateTime, NaiveDate, Utc};
pub use serde::{Deserialize, Serialize};

pub mod account;
pub mod appointment;
pub mod catalog;
pub mod commerce;
pub mod money;
pub mod outcome;
pub mod rate;
pub mod store;
pub mod time;
pub mod validation;

pub use account::{Account, AccountKind, Actor, Role};
pub use appointment::{Appointment, AppointmentStatus, PaymentStatus};
pub use money::{Money, MoneyError};
pub use outcome::{EffectOutcome, EffectReport, EffectReports};
pub use rate::HourlyRate;
pub use time::{TimeError, TimeOfDay, TimeSlot};

/// Reducer module - pure state transitions
///
/// Reducers hold the business rules of a workflow. They mutate state in place
/// and return descriptions of the side effects the caller must run afterwards;
/// they never perform I/O themselves.
pub mod reducer {
    use smallvec::SmallVec;

    /// Effects returned from a single reduction.
    ///
    /// Most transitions produce at most a handful of effects, so they stay inline.
    pub type Effects<E> = SmallVec<[E; 4]>;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    /// - `Effect`: Post-transition side effect descriptions
    /// - `Error`: Rejection reason when an action is not valid for the state
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for AppointmentReducer {
    ///     type State = Appointment;
    ///     type Action = AppointmentAction;
    ///     type Environment = AppointmentEnvironment;
    ///     type Effect = PostEffect;
    ///     type Error = BookingError;
    ///
    ///     fn reduce(&self, state: &mut Appointment, action: AppointmentAction, env: &AppointmentEnvironment)
    ///         -> Result<Effects<PostEffect>, BookingError>
    ///     {
    ///         // Business logic here
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Side effect descriptions produced by a transition
        type Effect;

        /// Rejection reason for actions that do not apply to the state
        type Error;

        /// Reduce an action into state changes and effects
        ///
        /// On `Err` the state must be left untouched.
        ///
        /// # Errors
        ///
        /// Returns `Self::Error` when the action is not a valid transition
        /// from the current state.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Result<Effects<Self::Effect>, Self::Error>;
    }
}

/// Environment module - Dependency injection traits
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use clientdesk_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let _now = clock.now();
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time from the operating system.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
