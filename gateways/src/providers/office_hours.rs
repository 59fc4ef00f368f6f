//! Calendar without an external backend.
//!
//! Treats every slot inside office hours as free and hands out synthetic event
//! ids. Used when no calendar credentials are configured; local bookings are
//! still filtered out by the booking workflow.

use crate::error::Result;
use crate::providers::calendar::{CalendarEvent, CalendarGateway, EventDetails, OfficeHours};
use async_trait::async_trait;
use clientdesk_core::{NaiveDate, TimeSlot};
use tracing::info;

/// Office-hours-only calendar.
#[derive(Debug, Clone, Default)]
pub struct OfficeHoursCalendar {
    hours: OfficeHours,
}

impl OfficeHoursCalendar {
    /// Create a calendar for the given hours.
    #[must_use]
    pub const fn new(hours: OfficeHours) -> Self {
        Self { hours }
    }
}

#[async_trait]
impl CalendarGateway for OfficeHoursCalendar {
    async fn check_availability(
        &self,
        _date: NaiveDate,
        slot: TimeSlot,
        _timezone: &str,
        _exclude_event: Option<&str>,
    ) -> Result<bool> {
        Ok(self.hours.contains(&slot))
    }

    async fn available_slots(&self, _date: NaiveDate, _timezone: &str) -> Result<Vec<TimeSlot>> {
        Ok(self.hours.candidate_slots())
    }

    async fn create_event(&self, details: &EventDetails) -> Result<CalendarEvent> {
        let event_id = format!("local-{}", uuid::Uuid::new_v4());
        info!(
            event_id = %event_id,
            date = %details.date,
            start = %details.slot.start,
            attendee = %details.attendee_email,
            "Calendar event recorded locally"
        );
        Ok(CalendarEvent {
            event_id,
            meet_link: None,
        })
    }

    async fn update_event(&self, event_id: &str, details: &EventDetails) -> Result<()> {
        info!(event_id = %event_id, date = %details.date, start = %details.slot.start, "Local calendar event moved");
        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        info!(event_id = %event_id, "Local calendar event removed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slots_outside_hours_are_unavailable() {
        let calendar = OfficeHoursCalendar::default();
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let evening = TimeSlot::new("19:00".parse().unwrap(), "20:00".parse().unwrap());
        let morning = TimeSlot::new("10:00".parse().unwrap(), "11:00".parse().unwrap());
        assert!(!calendar.check_availability(date, evening, "Asia/Kolkata", None).await.unwrap());
        assert!(calendar.check_availability(date, morning, "Asia/Kolkata", None).await.unwrap());
    }
}
