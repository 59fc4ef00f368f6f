//! Appointment workflow service.
//!
//! Each operation follows the same shape:
//! 1. Load and validate
//! 2. Run the reducer to get the new state and its effects
//! 3. Commit the new state (conditionally, for payment confirmations)
//! 4. Run the effects best-effort and report each outcome

use crate::config::BookingConfig;
use crate::error::{BookingError, Result};
use crate::rates::RateService;
use crate::reducer::{AppointmentAction, AppointmentEnvironment, AppointmentReducer, PostEffect};
use crate::requests::{CreateAppointmentRequest, PaymentProof};
use crate::webhook::WebhookEvent;
use clientdesk_core::environment::Clock;
use clientdesk_core::reducer::{Effects, Reducer};
use clientdesk_core::store::{Collection, Filter, StoreError, new_id};
use clientdesk_core::{
    Appointment, AppointmentStatus, EffectReport, HourlyRate, Money, NaiveDate, PaymentStatus,
    TimeOfDay, TimeSlot,
};
use clientdesk_gateways::providers::{
    AppointmentNotice, CalendarEvent, EventDetails, OrderRequest,
};
use clientdesk_gateways::{CalendarGateway, NotificationGateway, PaymentGateway, RefundReceipt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Collaborators of the booking workflow, built once at process start.
#[derive(Clone)]
pub struct BookingDependencies {
    /// Appointment documents.
    pub appointments: Arc<dyn Collection<Appointment>>,
    /// Hourly rate documents.
    pub rates: Arc<dyn Collection<HourlyRate>>,
    /// Payment gateway.
    pub payments: Arc<dyn PaymentGateway>,
    /// Calendar gateway.
    pub calendar: Arc<dyn CalendarGateway>,
    /// Email notifications.
    pub notifier: Arc<dyn NotificationGateway>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

/// Payment order details the client needs to open checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    /// Gateway order id.
    pub id: String,
    /// Amount in minor units.
    pub amount: Money,
    /// ISO currency code.
    pub currency: String,
    /// Public gateway key.
    pub key_id: String,
}

/// Result of creating an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAppointment {
    /// The persisted record.
    pub appointment: Appointment,
    /// Present unless payments are bypassed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSummary>,
    /// Effects run after a bypassed confirmation.
    pub effects: Vec<EffectReport>,
}

/// Result of a transition on an existing appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentOutcome {
    /// The record after the transition.
    pub appointment: Appointment,
    /// Effects run by this call; empty when another writer already applied it.
    pub effects: Vec<EffectReport>,
}

/// Result of an admin refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundOutcome {
    /// The record after the refund.
    pub appointment: Appointment,
    /// Gateway refund.
    pub refund: RefundReceipt,
    /// Effects run by this call.
    pub effects: Vec<EffectReport>,
}

/// Acknowledgement for a verified webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookReceipt {
    /// Event kind, or `malformed`.
    pub event: String,
    /// Matching appointment, when one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    /// Effects run by this delivery.
    pub effects: Vec<EffectReport>,
}

/// Orchestrates the appointment lifecycle.
#[derive(Clone)]
pub struct AppointmentService {
    appointments: Arc<dyn Collection<Appointment>>,
    rates: RateService,
    payments: Arc<dyn PaymentGateway>,
    calendar: Arc<dyn CalendarGateway>,
    notifier: Arc<dyn NotificationGateway>,
    clock: Arc<dyn Clock>,
    reducer: AppointmentReducer,
    env: AppointmentEnvironment,
    config: BookingConfig,
}

impl AppointmentService {
    /// Wire the service from its dependencies.
    #[must_use]
    pub fn new(deps: BookingDependencies, config: BookingConfig) -> Self {
        Self {
            rates: RateService::new(deps.rates, Arc::clone(&deps.clock), config.currency.clone()),
            appointments: deps.appointments,
            payments: deps.payments,
            calendar: deps.calendar,
            notifier: deps.notifier,
            env: AppointmentEnvironment::new(Arc::clone(&deps.clock)),
            clock: deps.clock,
            reducer: AppointmentReducer::new(),
            config,
        }
    }

    /// The hourly rate service sharing this workflow's store.
    #[must_use]
    pub const fn rates(&self) -> &RateService {
        &self.rates
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &BookingConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------------

    /// Book a slot.
    ///
    /// # Errors
    ///
    /// - `Validation` for missing or malformed fields, or an end past midnight
    /// - `Configuration` when no rate is active
    /// - `SlotUnavailable` when the calendar reports the slot taken
    /// - `Gateway`/`GatewayConfiguration` when the payment order fails
    pub async fn create(
        &self,
        request: &CreateAppointmentRequest,
        account_id: Option<String>,
    ) -> Result<CreatedAppointment> {
        let booking = request.validate(self.config.max_duration_hours)?;
        let rate = self.rates.current().await?;

        let end_time = booking
            .start_time
            .checked_add_hours(booking.duration_hours)
            .map_err(|e| BookingError::Validation(e.to_string()))?;
        let total_amount = rate
            .amount
            .checked_mul(booking.duration_hours)
            .ok_or_else(|| BookingError::Validation("total amount is too large".to_string()))?;
        let slot = TimeSlot::new(booking.start_time, end_time);

        if !self.calendar_allows(booking.date, slot, None).await {
            return Err(BookingError::SlotUnavailable {
                date: booking.date,
                start: slot.start,
                end: slot.end,
            });
        }

        let now = self.clock.now();
        let mut appointment = Appointment {
            id: new_id(),
            name: booking.name,
            email: booking.email,
            phone: booking.phone,
            notes: booking.notes,
            account_id,
            date: booking.date,
            start_time: slot.start,
            end_time: slot.end,
            timezone: self.config.timezone.clone(),
            duration_hours: booking.duration_hours,
            hourly_rate: rate.amount,
            total_amount,
            currency: rate.currency.clone(),
            order_id: None,
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
        };

        if self.config.bypass_payments {
            appointment.payment_status = PaymentStatus::Paid;
            appointment.status = AppointmentStatus::Confirmed;
            appointment.confirmed_at = Some(now);
            self.appointments.insert(&appointment).await?;
            tracing::info!(
                appointment_id = %appointment.id,
                date = %appointment.date,
                start = %appointment.start_time,
                "Appointment confirmed without payment (bypass enabled)"
            );

            let effects = AppointmentReducer::confirmation_effects(&appointment);
            let effects = self.run_effects(&mut appointment, effects).await;
            return Ok(CreatedAppointment {
                appointment,
                order: None,
                effects,
            });
        }

        let mut notes = BTreeMap::new();
        notes.insert("appointmentId".to_string(), appointment.id.clone());
        notes.insert("email".to_string(), appointment.email.clone());
        let order = self
            .payments
            .create_order(OrderRequest {
                amount: total_amount,
                currency: appointment.currency.clone(),
                receipt: appointment.id.clone(),
                notes,
            })
            .await?;

        appointment.order_id = Some(order.id.clone());
        self.appointments.insert(&appointment).await?;
        tracing::info!(
            appointment_id = %appointment.id,
            order_id = %order.id,
            amount = total_amount.minor_units(),
            "Appointment created, awaiting payment"
        );

        Ok(CreatedAppointment {
            appointment,
            order: Some(OrderSummary {
                id: order.id,
                amount: order.amount,
                currency: order.currency,
                key_id: self.payments.key_id().to_string(),
            }),
            effects: Vec::new(),
        })
    }

    // ------------------------------------------------------------------------
    // Payment confirmation
    // ------------------------------------------------------------------------

    /// Confirm a client-submitted payment.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown appointment
    /// - `PaymentVerification` when the order id or signature does not match
    pub async fn verify_payment(&self, proof: &PaymentProof) -> Result<AppointmentOutcome> {
        let appointment = self.load(&proof.appointment_id).await?;

        if appointment.order_id.as_deref() != Some(proof.order_id.as_str()) {
            return Err(BookingError::PaymentVerification(
                "order does not belong to this appointment".to_string(),
            ));
        }

        let valid = self.payments.verify_payment_signature(
            &proof.order_id,
            &proof.payment_id,
            &proof.signature,
        )?;

        if !valid {
            tracing::warn!(
                appointment_id = %appointment.id,
                order_id = %proof.order_id,
                "Payment signature mismatch"
            );
            self.claim(appointment, AppointmentAction::PaymentFailed).await?;
            return Err(BookingError::PaymentVerification(
                "signature mismatch".to_string(),
            ));
        }

        self.claim(
            appointment,
            AppointmentAction::PaymentVerified {
                payment_id: proof.payment_id.clone(),
                signature: proof.signature.clone(),
            },
        )
        .await
    }

    /// Ingest a gateway webhook.
    ///
    /// The body stays opaque until its signature verifies. Afterwards every
    /// delivery is acknowledged, matched or not.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` for a missing or wrong signature
    /// - `GatewayConfiguration` when no webhook secret is configured
    pub async fn handle_webhook(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookReceipt> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(BookingError::InvalidSignature)?;
        if !self.payments.verify_webhook_signature(raw_body, signature)? {
            tracing::warn!("Rejected webhook with invalid signature");
            return Err(BookingError::InvalidSignature);
        }

        let event = match WebhookEvent::parse(raw_body) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Acknowledging malformed webhook body");
                return Ok(WebhookReceipt {
                    event: "malformed".to_string(),
                    appointment_id: None,
                    effects: Vec::new(),
                });
            }
        };
        let kind = event.kind().to_string();
        tracing::info!(event = %kind, "Webhook received");

        let (found, action) = match event {
            WebhookEvent::PaymentCaptured {
                order_id,
                payment_id,
            } => (
                self.find_one("orderId", &order_id).await?,
                AppointmentAction::PaymentCaptured { payment_id },
            ),
            WebhookEvent::PaymentFailed { order_id } => (
                self.find_one("orderId", &order_id).await?,
                AppointmentAction::PaymentFailed,
            ),
            WebhookEvent::RefundCreated { payment_id } => (
                self.find_one("paymentId", &payment_id).await?,
                AppointmentAction::RefundCreated,
            ),
            WebhookEvent::Ignored(_) => {
                tracing::debug!(event = %kind, "Ignoring webhook event");
                return Ok(WebhookReceipt {
                    event: kind,
                    appointment_id: None,
                    effects: Vec::new(),
                });
            }
        };

        let Some(appointment) = found else {
            tracing::debug!(event = %kind, "No appointment matches webhook");
            return Ok(WebhookReceipt {
                event: kind,
                appointment_id: None,
                effects: Vec::new(),
            });
        };

        let appointment_id = appointment.id.clone();
        let effects = match self.claim(appointment, action).await {
            Ok(outcome) => outcome.effects,
            Err(e) => {
                tracing::warn!(appointment_id = %appointment_id, event = %kind, error = %e, "Webhook not applied");
                Vec::new()
            }
        };

        Ok(WebhookReceipt {
            event: kind,
            appointment_id: Some(appointment_id),
            effects,
        })
    }

    /// Refund a paid appointment through the gateway.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown appointment
    /// - `InvalidTransition` unless the appointment is paid
    /// - `Gateway` when the refund call fails
    pub async fn refund(&self, id: &str, amount: Option<Money>) -> Result<RefundOutcome> {
        let appointment = self.load(id).await?;
        let payment_id = match (&appointment.payment_status, &appointment.payment_id) {
            (PaymentStatus::Paid, Some(payment_id)) => payment_id.clone(),
            _ => {
                return Err(BookingError::InvalidTransition {
                    from: appointment.status,
                    action: "refund",
                });
            }
        };

        let refund = self.payments.refund(&payment_id, amount).await?;
        tracing::info!(appointment_id = %id, refund_id = %refund.id, "Refund issued");

        let outcome = self.claim(appointment, AppointmentAction::RefundCreated).await?;
        Ok(RefundOutcome {
            appointment: outcome.appointment,
            refund,
            effects: outcome.effects,
        })
    }

    // ------------------------------------------------------------------------
    // Admin transitions
    // ------------------------------------------------------------------------

    /// Cancel a pending or confirmed appointment.
    ///
    /// # Errors
    ///
    /// - `NotFound`, `AlreadyCancelled`, or `InvalidTransition`
    pub async fn cancel(&self, id: &str, reason: Option<String>) -> Result<AppointmentOutcome> {
        let appointment = self.load(id).await?;
        self.apply(appointment, AppointmentAction::Cancel { reason }).await
    }

    /// Move an appointment, keeping its duration and status.
    ///
    /// The new slot must be free on the calendar and among other local
    /// bookings; otherwise the record is left untouched.
    ///
    /// # Errors
    ///
    /// - `NotFound`, `AlreadyCancelled`, `InvalidTransition`
    /// - `Validation` when the new end passes midnight
    /// - `SlotUnavailable`
    pub async fn reschedule(
        &self,
        id: &str,
        date: NaiveDate,
        start_time: TimeOfDay,
    ) -> Result<AppointmentOutcome> {
        let current = self.load(id).await?;
        let mut moved = current.clone();
        let effects = self.reducer.reduce(
            &mut moved,
            AppointmentAction::Reschedule { date, start_time },
            &self.env,
        )?;

        let slot = moved.slot();
        let calendar_free = self
            .calendar_allows(date, slot, current.calendar_event_id.as_deref())
            .await;
        let local_free = !self
            .appointments
            .find(&Filter::new().eq("date", date.to_string()))
            .await?
            .iter()
            .any(|other| other.id != moved.id && other.blocks(date, &slot));
        if !calendar_free || !local_free {
            return Err(BookingError::SlotUnavailable {
                date,
                start: slot.start,
                end: slot.end,
            });
        }

        self.appointments.replace(&moved).await?;
        tracing::info!(
            appointment_id = %moved.id,
            from_date = %current.date,
            from_start = %current.start_time,
            to_date = %moved.date,
            to_start = %moved.start_time,
            "Appointment rescheduled"
        );
        let effects = self.run_effects(&mut moved, effects).await;
        Ok(AppointmentOutcome {
            appointment: moved,
            effects,
        })
    }

    /// Mark a confirmed appointment as held.
    ///
    /// # Errors
    ///
    /// - `NotFound` or `InvalidTransition`
    pub async fn complete(&self, id: &str) -> Result<AppointmentOutcome> {
        let appointment = self.load(id).await?;
        self.apply(appointment, AppointmentAction::Complete).await
    }

    /// Mark a confirmed appointment as missed.
    ///
    /// # Errors
    ///
    /// - `NotFound` or `InvalidTransition`
    pub async fn mark_no_show(&self, id: &str) -> Result<AppointmentOutcome> {
        let appointment = self.load(id).await?;
        self.apply(appointment, AppointmentAction::MarkNoShow).await
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Free slots on `date`.
    ///
    /// Calendar candidates minus slots overlapping an active local booking.
    /// A calendar failure yields no slots.
    ///
    /// # Errors
    ///
    /// Returns `Store` on storage failures.
    pub async fn availability(&self, date: NaiveDate) -> Result<Vec<TimeSlot>> {
        let candidates = match self.calendar.available_slots(date, &self.config.timezone).await {
            Ok(slots) => slots,
            Err(e) => {
                tracing::warn!(%date, error = %e, "Calendar slot query failed");
                return Ok(Vec::new());
            }
        };

        let booked = self
            .appointments
            .find(&Filter::new().eq("date", date.to_string()))
            .await?;
        Ok(candidates
            .into_iter()
            .filter(|slot| !booked.iter().any(|a| a.blocks(date, slot)))
            .collect())
    }

    /// Load one appointment.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown id
    pub async fn get(&self, id: &str) -> Result<Appointment> {
        self.load(id).await
    }

    /// All appointments, newest first, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns `Store` on storage failures.
    pub async fn list(
        &self,
        status: Option<AppointmentStatus>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>> {
        let mut filter = Filter::new();
        if let Some(status) = status {
            filter = filter.eq("status", status.as_str());
        }
        if let Some(date) = date {
            filter = filter.eq("date", date.to_string());
        }
        let mut appointments = self.appointments.find(&filter).await?;
        appointments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(appointments)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    async fn load(&self, id: &str) -> Result<Appointment> {
        self.appointments
            .get(id)
            .await?
            .ok_or_else(|| BookingError::appointment_not_found(id))
    }

    async fn find_one(&self, field: &str, value: &str) -> Result<Option<Appointment>> {
        let filter = Filter::new().eq(field, value);
        Ok(self.appointments.find(&filter).await?.into_iter().next())
    }

    /// Best-effort calendar check; gateway failures count as available.
    /// `own_event` is the booking's existing event, which never blocks it.
    async fn calendar_allows(
        &self,
        date: NaiveDate,
        slot: TimeSlot,
        own_event: Option<&str>,
    ) -> bool {
        match self
            .calendar
            .check_availability(date, slot, &self.config.timezone, own_event)
            .await
        {
            Ok(free) => free,
            Err(e) => {
                tracing::warn!(%date, start = %slot.start, error = %e, "Availability check failed, assuming free");
                true
            }
        }
    }

    /// Reduce, persist unconditionally, then run effects.
    async fn apply(
        &self,
        mut appointment: Appointment,
        action: AppointmentAction,
    ) -> Result<AppointmentOutcome> {
        let effects = self.reducer.reduce(&mut appointment, action, &self.env)?;
        self.appointments.replace(&appointment).await?;
        tracing::info!(appointment_id = %appointment.id, status = %appointment.status, "Appointment updated");
        let effects = self.run_effects(&mut appointment, effects).await;
        Ok(AppointmentOutcome {
            appointment,
            effects,
        })
    }

    /// Reduce and commit only if nobody changed the payment state since
    /// `loaded` was read. The loser returns the winner's record and runs no
    /// effects.
    async fn claim(
        &self,
        loaded: Appointment,
        action: AppointmentAction,
    ) -> Result<AppointmentOutcome> {
        let guard = Filter::new()
            .eq("status", loaded.status.as_str())
            .eq("paymentStatus", loaded.payment_status.as_str());

        let mut next = loaded.clone();
        let effects = self.reducer.reduce(&mut next, action, &self.env)?;
        if next == loaded {
            return Ok(AppointmentOutcome {
                appointment: next,
                effects: Vec::new(),
            });
        }

        if !self.appointments.replace_if(&next, &guard).await? {
            tracing::info!(
                appointment_id = %loaded.id,
                "Transition already applied by a concurrent writer"
            );
            return Ok(AppointmentOutcome {
                appointment: self.load(&loaded.id).await?,
                effects: Vec::new(),
            });
        }

        tracing::info!(
            appointment_id = %next.id,
            status = %next.status,
            payment_status = %next.payment_status,
            "Appointment payment state updated"
        );
        let effects = self.run_effects(&mut next, effects).await;
        Ok(AppointmentOutcome {
            appointment: next,
            effects,
        })
    }

    /// Run effects in order, never failing the caller.
    ///
    /// Once the record turns out to have moved on under a concurrent writer,
    /// the remaining effects are skipped and `appointment` becomes the stored
    /// record.
    async fn run_effects(
        &self,
        appointment: &mut Appointment,
        effects: Effects<PostEffect>,
    ) -> Vec<EffectReport> {
        let mut reports = Vec::with_capacity(effects.len());
        let mut superseded = false;
        for effect in effects {
            let name = effect.name();
            if superseded {
                reports.push(EffectReport::skipped(name));
                continue;
            }
            let report = match self.run_effect(appointment, &effect).await {
                Ok(EffectStep::Done) => EffectReport::succeeded(name),
                Ok(EffectStep::Nothing) => EffectReport::skipped(name),
                Ok(EffectStep::Superseded) => {
                    superseded = true;
                    EffectReport::skipped(name)
                }
                Err(e) => {
                    tracing::warn!(
                        appointment_id = %appointment.id,
                        effect = name,
                        error = %e,
                        "Post-transition effect failed"
                    );
                    EffectReport::failed(name, e)
                }
            };
            reports.push(report);
        }
        reports
    }

    async fn run_effect(
        &self,
        appointment: &mut Appointment,
        effect: &PostEffect,
    ) -> Result<EffectStep> {
        match effect {
            PostEffect::CreateCalendarEvent => {
                let event = self
                    .calendar
                    .create_event(&EventDetails::for_appointment(appointment))
                    .await?;
                return self.attach_calendar_event(appointment, event).await;
            }
            PostEffect::UpdateCalendarEvent { event_id } => {
                let Some(event_id) = event_id else {
                    return Ok(EffectStep::Nothing);
                };
                self.calendar
                    .update_event(event_id, &EventDetails::for_appointment(appointment))
                    .await?;
            }
            PostEffect::DeleteCalendarEvent { event_id } => {
                let Some(event_id) = event_id else {
                    return Ok(EffectStep::Nothing);
                };
                self.calendar.delete_event(event_id).await?;
            }
            PostEffect::SendConfirmation => {
                self.notifier
                    .send_confirmation(&AppointmentNotice::from(&*appointment))
                    .await?;
            }
            PostEffect::SendCancellation => {
                self.notifier
                    .send_cancellation(&AppointmentNotice::from(&*appointment))
                    .await?;
            }
            PostEffect::SendReschedule(change) => {
                self.notifier
                    .send_reschedule(&AppointmentNotice::from(&*appointment), change)
                    .await?;
            }
        }
        Ok(EffectStep::Done)
    }

    /// Store the event reference only while the stored booking is still the
    /// confirmed, paid version the event was made from. Otherwise the event
    /// is an orphan and is removed again.
    async fn attach_calendar_event(
        &self,
        appointment: &mut Appointment,
        event: CalendarEvent,
    ) -> Result<EffectStep> {
        if appointment.status == AppointmentStatus::Confirmed
            && appointment.payment_status == PaymentStatus::Paid
        {
            let made_from = serde_json::to_value(appointment.updated_at)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            let guard = Filter::new()
                .eq("status", AppointmentStatus::Confirmed.as_str())
                .eq("paymentStatus", PaymentStatus::Paid.as_str())
                .eq("updatedAt", made_from);

            let mut linked = appointment.clone();
            linked.calendar_event_id = Some(event.event_id.clone());
            linked.meet_link.clone_from(&event.meet_link);
            linked.updated_at = self.clock.now();
            if self.appointments.replace_if(&linked, &guard).await? {
                *appointment = linked;
                return Ok(EffectStep::Done);
            }
        }

        tracing::warn!(
            appointment_id = %appointment.id,
            event_id = %event.event_id,
            "Appointment changed while its calendar event was created, removing the event"
        );
        if let Err(e) = self.calendar.delete_event(&event.event_id).await {
            tracing::warn!(
                appointment_id = %appointment.id,
                event_id = %event.event_id,
                error = %e,
                "Orphaned calendar event could not be removed"
            );
        }
        *appointment = self.load(&appointment.id).await?;
        Ok(EffectStep::Superseded)
    }
}

/// What running one effect amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EffectStep {
    Done,
    /// Nothing to do.
    Nothing,
    /// The record moved on under a concurrent writer.
    Superseded,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clientdesk_gateways::mocks::{
        MockCalendarGateway, MockNotificationGateway, MockPaymentGateway,
    };
    use clientdesk_testing::{InMemoryCollection, fixtures, test_clock};

    async fn setup() -> (AppointmentService, InMemoryCollection<Appointment>, MockCalendarGateway) {
        let appointments = InMemoryCollection::new();
        let rates = InMemoryCollection::new();
        rates
            .insert(&fixtures::hourly_rate(50_000, &test_clock()))
            .await
            .unwrap();
        let calendar = MockCalendarGateway::new();
        let service = AppointmentService::new(
            BookingDependencies {
                appointments: Arc::new(appointments.clone()),
                rates: Arc::new(rates),
                payments: Arc::new(MockPaymentGateway::new()),
                calendar: Arc::new(calendar.clone()),
                notifier: Arc::new(MockNotificationGateway::new()),
                clock: Arc::new(test_clock()),
            },
            BookingConfig::default(),
        );
        (service, appointments, calendar)
    }

    fn request() -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            name: Some("Asha".into()),
            email: Some("asha@example.com".into()),
            phone: Some("123".into()),
            date: Some("2025-03-14".into()),
            start_time: Some("10:00".into()),
            duration: Some(1),
            notes: None,
        }
    }

    #[tokio::test]
    async fn stale_claim_loses_and_runs_no_effects() {
        let (service, appointments, calendar) = setup().await;
        let created = service.create(&request(), None).await.unwrap();
        let stale = created.appointment.clone();

        // Another writer confirms first.
        let winner = service
            .claim(
                stale.clone(),
                AppointmentAction::PaymentCaptured {
                    payment_id: "pay_w".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(winner.effects.len(), 2);

        let loser = service
            .claim(
                stale,
                AppointmentAction::PaymentVerified {
                    payment_id: "pay_l".into(),
                    signature: "sig".into(),
                },
            )
            .await
            .unwrap();

        assert!(loser.effects.is_empty());
        assert_eq!(loser.appointment.payment_id.as_deref(), Some("pay_w"));
        assert_eq!(calendar.created_count(), 1);
        let stored = appointments.get(&created.appointment.id).await.unwrap().unwrap();
        assert_eq!(stored, loser.appointment);
    }

    #[tokio::test]
    async fn event_reference_is_not_written_over_a_newer_record() {
        let (service, appointments, calendar) = setup().await;
        let created = service.create(&request(), None).await.unwrap();
        let mut read = created.appointment.clone();
        read.payment_status = PaymentStatus::Paid;
        read.status = AppointmentStatus::Confirmed;
        appointments.replace(&read).await.unwrap();

        // Rescheduled elsewhere after `read` was taken; still confirmed and paid.
        let mut newer = read.clone();
        newer.start_time = "15:00".parse().unwrap();
        newer.updated_at += chrono::Duration::minutes(5);
        appointments.replace(&newer).await.unwrap();

        let event = CalendarEvent {
            event_id: "evt_stale".into(),
            meet_link: None,
        };
        let step = service.attach_calendar_event(&mut read, event).await.unwrap();

        assert_eq!(step, EffectStep::Superseded);
        assert_eq!(read, newer);
        assert_eq!(appointments.get(&read.id).await.unwrap().unwrap(), newer);
        assert_eq!(calendar.deleted_count(), 1);
    }

    #[tokio::test]
    async fn no_op_transition_skips_the_write() {
        let (service, appointments, _) = setup().await;
        let created = service.create(&request(), None).await.unwrap();
        let mut paid = created.appointment.clone();
        paid.payment_status = PaymentStatus::Paid;
        paid.status = AppointmentStatus::Confirmed;
        appointments.replace(&paid).await.unwrap();

        let outcome = service
            .claim(paid.clone(), AppointmentAction::PaymentFailed)
            .await
            .unwrap();
        assert_eq!(outcome.appointment, paid);
        assert!(outcome.effects.is_empty());
    }
}
