//! Appointment state machine.
//!
//! Transitions are pure: the reducer mutates the appointment and returns the
//! side effects that must follow. The service commits the new state first and
//! then runs the effects best-effort.

use crate::error::BookingError;
use chrono::{DateTime, Utc};
use clientdesk_core::environment::Clock;
use clientdesk_core::reducer::{Effects, Reducer};
use clientdesk_core::{Appointment, AppointmentStatus, NaiveDate, PaymentStatus, TimeOfDay};
use clientdesk_gateways::providers::ScheduleChange;
use smallvec::smallvec;
use std::sync::Arc;

// ============================================================================
// Actions
// ============================================================================

/// Everything that can happen to an existing appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentAction {
    /// Client-submitted payment passed signature verification.
    PaymentVerified {
        /// Gateway payment id.
        payment_id: String,
        /// Verified signature.
        signature: String,
    },
    /// Gateway reported a captured payment.
    PaymentCaptured {
        /// Gateway payment id.
        payment_id: String,
    },
    /// Verification failed or the gateway reported a failure.
    PaymentFailed,
    /// The payment was refunded.
    RefundCreated,
    /// Admin cancellation.
    Cancel {
        /// Optional reason.
        reason: Option<String>,
    },
    /// Move to a new date and start; duration is kept.
    Reschedule {
        /// New date.
        date: NaiveDate,
        /// New start.
        start_time: TimeOfDay,
    },
    /// Session held.
    Complete,
    /// Customer did not attend.
    MarkNoShow,
}

impl AppointmentAction {
    /// Verb used in transition errors.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::PaymentVerified { .. } | Self::PaymentCaptured { .. } => "confirm payment for",
            Self::PaymentFailed => "fail payment for",
            Self::RefundCreated => "refund",
            Self::Cancel { .. } => "cancel",
            Self::Reschedule { .. } => "reschedule",
            Self::Complete => "complete",
            Self::MarkNoShow => "mark as no-show",
        }
    }
}

// ============================================================================
// Effects
// ============================================================================

/// Side effects that follow a committed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostEffect {
    /// Reserve the slot on the external calendar.
    CreateCalendarEvent,
    /// Move the calendar event; skipped when none exists.
    UpdateCalendarEvent {
        /// Existing event.
        event_id: Option<String>,
    },
    /// Remove the calendar event; skipped when none exists.
    DeleteCalendarEvent {
        /// Existing event.
        event_id: Option<String>,
    },
    /// Email the booking confirmation.
    SendConfirmation,
    /// Email the cancellation notice.
    SendCancellation,
    /// Email old and new times.
    SendReschedule(ScheduleChange),
}

impl PostEffect {
    /// Name reported in effect lists.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateCalendarEvent => "create-calendar-event",
            Self::UpdateCalendarEvent { .. } => "update-calendar-event",
            Self::DeleteCalendarEvent { .. } => "delete-calendar-event",
            Self::SendConfirmation => "send-confirmation-email",
            Self::SendCancellation => "send-cancellation-email",
            Self::SendReschedule(_) => "send-reschedule-email",
        }
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the appointment reducer
#[derive(Clone)]
pub struct AppointmentEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
}

impl AppointmentEnvironment {
    /// Creates a new `AppointmentEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for appointment lifecycle and payment sub-state.
#[derive(Clone, Copy, Debug, Default)]
pub struct AppointmentReducer;

impl AppointmentReducer {
    /// Creates a new `AppointmentReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Effects that follow any confirmation, including bypassed payments.
    #[must_use]
    pub fn confirmation_effects(state: &Appointment) -> Effects<PostEffect> {
        if state.calendar_event_id.is_some() {
            smallvec![PostEffect::SendConfirmation]
        } else {
            smallvec![PostEffect::CreateCalendarEvent, PostEffect::SendConfirmation]
        }
    }

    fn confirm(
        state: &mut Appointment,
        action: &AppointmentAction,
        payment_id: String,
        signature: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Effects<PostEffect>, BookingError> {
        if state.payment_status == PaymentStatus::Paid {
            return Ok(Effects::new());
        }
        if state.status.is_terminal() || state.payment_status == PaymentStatus::Refunded {
            return Err(invalid(state, action));
        }

        state.payment_id = Some(payment_id);
        if signature.is_some() {
            state.payment_signature = signature;
        }
        state.payment_status = PaymentStatus::Paid;
        state.status = AppointmentStatus::Confirmed;
        state.confirmed_at = Some(now);
        state.updated_at = now;
        Ok(Self::confirmation_effects(state))
    }
}

fn invalid(state: &Appointment, action: &AppointmentAction) -> BookingError {
    BookingError::InvalidTransition {
        from: state.status,
        action: action.verb(),
    }
}

impl Reducer for AppointmentReducer {
    type State = Appointment;
    type Action = AppointmentAction;
    type Environment = AppointmentEnvironment;
    type Effect = PostEffect;
    type Error = BookingError;

    fn reduce(
        &self,
        state: &mut Appointment,
        action: AppointmentAction,
        env: &AppointmentEnvironment,
    ) -> Result<Effects<PostEffect>, BookingError> {
        let now = env.clock.now();

        match action {
            AppointmentAction::PaymentVerified {
                ref payment_id,
                ref signature,
            } => Self::confirm(
                state,
                &action,
                payment_id.clone(),
                Some(signature.clone()),
                now,
            ),

            AppointmentAction::PaymentCaptured { ref payment_id } => {
                Self::confirm(state, &action, payment_id.clone(), None, now)
            }

            AppointmentAction::PaymentFailed => {
                // A later failure report never downgrades a settled payment.
                if matches!(
                    state.payment_status,
                    PaymentStatus::Paid | PaymentStatus::Refunded
                ) {
                    return Ok(Effects::new());
                }
                state.payment_status = PaymentStatus::Failed;
                state.updated_at = now;
                Ok(Effects::new())
            }

            AppointmentAction::RefundCreated => {
                if state.payment_status == PaymentStatus::Refunded {
                    return Ok(Effects::new());
                }
                state.payment_status = PaymentStatus::Refunded;
                state.updated_at = now;
                if state.status == AppointmentStatus::Cancelled {
                    return Ok(Effects::new());
                }
                state.status = AppointmentStatus::Cancelled;
                state.cancelled_at = Some(now);
                Ok(smallvec![PostEffect::DeleteCalendarEvent {
                    event_id: state.calendar_event_id.clone(),
                }])
            }

            AppointmentAction::Cancel { reason } => {
                match state.status {
                    AppointmentStatus::Cancelled => return Err(BookingError::AlreadyCancelled),
                    AppointmentStatus::Completed | AppointmentStatus::NoShow => {
                        return Err(BookingError::InvalidTransition {
                            from: state.status,
                            action: "cancel",
                        });
                    }
                    AppointmentStatus::Pending | AppointmentStatus::Confirmed => {}
                }
                state.status = AppointmentStatus::Cancelled;
                state.cancelled_at = Some(now);
                state.cancel_reason = reason
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty());
                state.updated_at = now;
                Ok(smallvec![
                    PostEffect::DeleteCalendarEvent {
                        event_id: state.calendar_event_id.clone(),
                    },
                    PostEffect::SendCancellation,
                ])
            }

            AppointmentAction::Reschedule { date, start_time } => {
                match state.status {
                    AppointmentStatus::Cancelled => return Err(BookingError::AlreadyCancelled),
                    AppointmentStatus::Completed | AppointmentStatus::NoShow => {
                        return Err(invalid(state, &action));
                    }
                    AppointmentStatus::Pending | AppointmentStatus::Confirmed => {}
                }
                let end_time = start_time
                    .checked_add_hours(state.duration_hours)
                    .map_err(|e| BookingError::Validation(e.to_string()))?;

                let change = ScheduleChange {
                    previous_date: state.date,
                    previous_start: state.start_time,
                    previous_end: state.end_time,
                };
                state.date = date;
                state.start_time = start_time;
                state.end_time = end_time;
                state.updated_at = now;
                Ok(smallvec![
                    PostEffect::UpdateCalendarEvent {
                        event_id: state.calendar_event_id.clone(),
                    },
                    PostEffect::SendReschedule(change),
                ])
            }

            AppointmentAction::Complete => {
                if state.status != AppointmentStatus::Confirmed {
                    return Err(invalid(state, &action));
                }
                state.status = AppointmentStatus::Completed;
                state.completed_at = Some(now);
                state.updated_at = now;
                Ok(Effects::new())
            }

            AppointmentAction::MarkNoShow => {
                if state.status != AppointmentStatus::Confirmed {
                    return Err(invalid(state, &action));
                }
                state.status = AppointmentStatus::NoShow;
                state.updated_at = now;
                Ok(Effects::new())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clientdesk_core::Money;
    use clientdesk_testing::test_clock;

    fn env() -> AppointmentEnvironment {
        AppointmentEnvironment::new(Arc::new(test_clock()))
    }

    fn pending() -> Appointment {
        let now = test_clock().now();
        Appointment {
            id: "appt-1".into(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: "123".into(),
            notes: None,
            account_id: None,
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            start_time: "10:00".parse().unwrap(),
            end_time: "12:00".parse().unwrap(),
            timezone: "Asia/Kolkata".into(),
            duration_hours: 2,
            hourly_rate: Money::from_minor(50_000),
            total_amount: Money::from_minor(100_000),
            currency: "INR".into(),
            order_id: Some("order_1".into()),
            payment_id: None,
            payment_signature: None,
            payment_status: PaymentStatus::Pending,
            status: AppointmentStatus::Pending,
            calendar_event_id: None,
            meet_link: None,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            cancelled_at: None,
            cancel_reason: None,
            completed_at: None,
        }
    }

    fn confirmed() -> Appointment {
        let mut appointment = pending();
        appointment.status = AppointmentStatus::Confirmed;
        appointment.payment_status = PaymentStatus::Paid;
        appointment.payment_id = Some("pay_1".into());
        appointment.calendar_event_id = Some("evt_1".into());
        appointment
    }

    fn reduce(state: &mut Appointment, action: AppointmentAction) -> Result<Effects<PostEffect>, BookingError> {
        AppointmentReducer::new().reduce(state, action, &env())
    }

    #[test]
    fn verified_payment_confirms_and_schedules_effects() {
        let mut state = pending();
        let effects = reduce(
            &mut state,
            AppointmentAction::PaymentVerified {
                payment_id: "pay_1".into(),
                signature: "sig".into(),
            },
        )
        .unwrap();

        assert_eq!(state.status, AppointmentStatus::Confirmed);
        assert_eq!(state.payment_status, PaymentStatus::Paid);
        assert_eq!(state.confirmed_at, Some(test_clock().now()));
        assert_eq!(state.payment_signature.as_deref(), Some("sig"));
        assert_eq!(
            effects.as_slice(),
            &[PostEffect::CreateCalendarEvent, PostEffect::SendConfirmation]
        );
    }

    #[test]
    fn capture_of_paid_record_is_a_no_op() {
        let mut state = confirmed();
        let before = state.clone();
        let effects = reduce(
            &mut state,
            AppointmentAction::PaymentCaptured {
                payment_id: "pay_2".into(),
            },
        )
        .unwrap();
        assert!(effects.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn failed_payment_recovers_on_later_success() {
        let mut state = pending();
        reduce(&mut state, AppointmentAction::PaymentFailed).unwrap();
        assert_eq!(state.payment_status, PaymentStatus::Failed);
        assert_eq!(state.status, AppointmentStatus::Pending);

        reduce(
            &mut state,
            AppointmentAction::PaymentCaptured {
                payment_id: "pay_1".into(),
            },
        )
        .unwrap();
        assert_eq!(state.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn failure_never_downgrades_paid() {
        let mut state = confirmed();
        reduce(&mut state, AppointmentAction::PaymentFailed).unwrap();
        assert_eq!(state.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn payment_for_cancelled_booking_is_rejected() {
        let mut state = pending();
        state.status = AppointmentStatus::Cancelled;
        let err = reduce(
            &mut state,
            AppointmentAction::PaymentCaptured {
                payment_id: "pay_1".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, BookingError::InvalidTransition { .. }));
    }

    #[test]
    fn refund_cancels_and_releases_event() {
        let mut state = confirmed();
        let effects = reduce(&mut state, AppointmentAction::RefundCreated).unwrap();
        assert_eq!(state.status, AppointmentStatus::Cancelled);
        assert_eq!(state.payment_status, PaymentStatus::Refunded);
        assert!(state.cancelled_at.is_some());
        assert_eq!(
            effects.as_slice(),
            &[PostEffect::DeleteCalendarEvent {
                event_id: Some("evt_1".into())
            }]
        );

        let again = reduce(&mut state, AppointmentAction::RefundCreated).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn cancel_twice_is_rejected() {
        let mut state = confirmed();
        let effects = reduce(
            &mut state,
            AppointmentAction::Cancel {
                reason: Some(" client request ".into()),
            },
        )
        .unwrap();
        assert_eq!(state.cancel_reason.as_deref(), Some("client request"));
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[1], PostEffect::SendCancellation);

        let err = reduce(&mut state, AppointmentAction::Cancel { reason: None }).unwrap_err();
        assert_eq!(err, BookingError::AlreadyCancelled);
    }

    #[test]
    fn completed_booking_cannot_be_cancelled() {
        let mut state = confirmed();
        reduce(&mut state, AppointmentAction::Complete).unwrap();
        assert!(state.completed_at.is_some());

        let err = reduce(&mut state, AppointmentAction::Cancel { reason: None }).unwrap_err();
        assert_eq!(
            err,
            BookingError::InvalidTransition {
                from: AppointmentStatus::Completed,
                action: "cancel",
            }
        );
    }

    #[test]
    fn reschedule_keeps_duration_and_status() {
        let mut state = pending();
        let effects = reduce(
            &mut state,
            AppointmentAction::Reschedule {
                date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
                start_time: "14:30".parse().unwrap(),
            },
        )
        .unwrap();

        assert_eq!(state.status, AppointmentStatus::Pending);
        assert_eq!(state.duration_hours, 2);
        assert_eq!(state.end_time.to_string(), "16:30");
        assert!(matches!(
            &effects[1],
            PostEffect::SendReschedule(change) if change.previous_start.to_string() == "10:00"
        ));
        assert_eq!(
            effects[0],
            PostEffect::UpdateCalendarEvent { event_id: None }
        );
    }

    #[test]
    fn reschedule_past_midnight_leaves_state_untouched() {
        let mut state = pending();
        let before = state.clone();
        let err = reduce(
            &mut state,
            AppointmentAction::Reschedule {
                date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
                start_time: "23:00".parse().unwrap(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn no_show_only_from_confirmed() {
        let mut state = pending();
        assert!(reduce(&mut state, AppointmentAction::MarkNoShow).is_err());

        let mut state = confirmed();
        reduce(&mut state, AppointmentAction::MarkNoShow).unwrap();
        assert_eq!(state.status, AppointmentStatus::NoShow);
        assert!(reduce(&mut state, AppointmentAction::Complete).is_err());
    }
}
