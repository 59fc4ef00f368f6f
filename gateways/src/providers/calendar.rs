//! Calendar gateway contract.

use crate::error::Result;
use async_trait::async_trait;
use clientdesk_core::{Appointment, NaiveDate, TimeOfDay, TimeSlot};
use serde::{Deserialize, Serialize};

/// Everything needed to create or update a calendar event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    /// Event title.
    pub summary: String,
    /// Event body.
    pub description: String,
    /// Local date.
    pub date: NaiveDate,
    /// Local interval.
    pub slot: TimeSlot,
    /// IANA zone name.
    pub timezone: String,
    /// Invitee email.
    pub attendee_email: String,
    /// Invitee name.
    pub attendee_name: String,
}

impl EventDetails {
    /// Event payload for a booked consultation.
    #[must_use]
    pub fn for_appointment(appointment: &Appointment) -> Self {
        let mut description = format!(
            "Consultation with {} ({}, {}).",
            appointment.name, appointment.email, appointment.phone
        );
        if let Some(notes) = appointment.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            description.push_str("\n\nNotes: ");
            description.push_str(notes);
        }
        Self {
            summary: format!("Consultation: {}", appointment.name),
            description,
            date: appointment.date,
            slot: appointment.slot(),
            timezone: appointment.timezone.clone(),
            attendee_email: appointment.email.clone(),
            attendee_name: appointment.name.clone(),
        }
    }
}

/// A created calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// External event id.
    pub event_id: String,
    /// Video meeting link, if the calendar provisioned one.
    pub meet_link: Option<String>,
}

/// Bookable hours and slot granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficeHours {
    /// First bookable minute.
    pub open: TimeOfDay,
    /// End of the last bookable slot.
    pub close: TimeOfDay,
    /// Candidate slot length.
    pub slot_minutes: u16,
}

impl Default for OfficeHours {
    fn default() -> Self {
        Self {
            open: TimeOfDay::from_minutes(9 * 60).unwrap_or(TimeOfDay::MIDNIGHT),
            close: TimeOfDay::from_minutes(18 * 60).unwrap_or(TimeOfDay::MIDNIGHT),
            slot_minutes: 60,
        }
    }
}

impl OfficeHours {
    /// Consecutive slots from `open` to `close`.
    #[must_use]
    pub fn candidate_slots(&self) -> Vec<TimeSlot> {
        let mut slots = Vec::new();
        if self.slot_minutes == 0 {
            return slots;
        }
        let mut start = self.open;
        while let Some(end) = start.checked_add_minutes(self.slot_minutes) {
            if end > self.close {
                break;
            }
            slots.push(TimeSlot::new(start, end));
            start = end;
        }
        slots
    }

    /// Whether `slot` lies entirely within office hours.
    #[must_use]
    pub fn contains(&self, slot: &TimeSlot) -> bool {
        slot.start >= self.open && slot.end <= self.close
    }
}

/// Calendar gateway trait
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Whether `slot` on `date` is free. Time held by `exclude_event` does
    /// not count, so a booking moving within its own slot is not blocked by
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns a gateway error when the calendar cannot be queried.
    async fn check_availability(
        &self,
        date: NaiveDate,
        slot: TimeSlot,
        timezone: &str,
        exclude_event: Option<&str>,
    ) -> Result<bool>;

    /// Free candidate slots on `date`.
    ///
    /// # Errors
    ///
    /// Returns a gateway error when the calendar cannot be queried.
    async fn available_slots(&self, date: NaiveDate, timezone: &str) -> Result<Vec<TimeSlot>>;

    /// Create an event and return its reference.
    ///
    /// # Errors
    ///
    /// Returns a gateway error when the event cannot be created.
    async fn create_event(&self, details: &EventDetails) -> Result<CalendarEvent>;

    /// Move or rewrite an existing event.
    ///
    /// # Errors
    ///
    /// Returns a gateway error when the event cannot be updated.
    async fn update_event(&self, event_id: &str, details: &EventDetails) -> Result<()>;

    /// Remove an event.
    ///
    /// # Errors
    ///
    /// Returns a gateway error when the event cannot be deleted.
    async fn delete_event(&self, event_id: &str) -> Result<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_hours_yield_nine_hourly_slots() {
        let slots = OfficeHours::default().candidate_slots();
        assert_eq!(slots.len(), 9);
        assert_eq!(slots[0].start.to_string(), "09:00");
        assert_eq!(slots[8].end.to_string(), "18:00");
    }

    #[test]
    fn partial_trailing_slot_is_dropped() {
        let hours = OfficeHours {
            open: "09:00".parse().unwrap(),
            close: "10:30".parse().unwrap(),
            slot_minutes: 60,
        };
        assert_eq!(hours.candidate_slots().len(), 1);
    }

    #[test]
    fn contains_checks_both_ends() {
        let hours = OfficeHours::default();
        let inside = TimeSlot::new("10:00".parse().unwrap(), "12:00".parse().unwrap());
        let late = TimeSlot::new("17:00".parse().unwrap(), "19:00".parse().unwrap());
        assert!(hours.contains(&inside));
        assert!(!hours.contains(&late));
    }
}
