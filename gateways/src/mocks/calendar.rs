//! Mock calendar gateway.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for lock access

use crate::error::{GatewayError, Result};
use crate::providers::calendar::{CalendarEvent, CalendarGateway, EventDetails, OfficeHours};
use async_trait::async_trait;
use clientdesk_core::{NaiveDate, TimeSlot};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct BusyBlock {
    date: NaiveDate,
    slot: TimeSlot,
    event_id: Option<String>,
}

/// Mock calendar gateway.
///
/// Everything inside default office hours is free unless marked busy. Busy
/// time can belong to an event, in which case availability checks that
/// exclude that event ignore it.
/// Created events get sequential ids and a fake meeting link.
#[derive(Debug, Clone, Default)]
pub struct MockCalendarGateway {
    hours: OfficeHours,
    busy: Arc<Mutex<Vec<BusyBlock>>>,
    events: Arc<Mutex<HashMap<String, EventDetails>>>,
    created: Arc<AtomicU64>,
    updated: Arc<AtomicU64>,
    deleted: Arc<AtomicU64>,
    fail_queries: Arc<AtomicBool>,
    fail_events: Arc<AtomicBool>,
}

impl MockCalendarGateway {
    /// Create an empty calendar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block `slot` on `date`.
    pub fn mark_busy(&self, date: NaiveDate, slot: TimeSlot) {
        self.busy.lock().unwrap().push(BusyBlock {
            date,
            slot,
            event_id: None,
        });
    }

    /// Block `slot` on `date` with the event `event_id`.
    pub fn mark_event_busy(&self, event_id: &str, date: NaiveDate, slot: TimeSlot) {
        self.busy.lock().unwrap().push(BusyBlock {
            date,
            slot,
            event_id: Some(event_id.to_string()),
        });
    }

    /// Make availability queries fail.
    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Make event create/update/delete fail.
    pub fn fail_events(&self, fail: bool) {
        self.fail_events.store(fail, Ordering::SeqCst);
    }

    /// Successful `create_event` calls.
    #[must_use]
    pub fn created_count(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    /// Successful `update_event` calls.
    #[must_use]
    pub fn updated_count(&self) -> u64 {
        self.updated.load(Ordering::SeqCst)
    }

    /// Successful `delete_event` calls.
    #[must_use]
    pub fn deleted_count(&self) -> u64 {
        self.deleted.load(Ordering::SeqCst)
    }

    /// Current details of an event.
    #[must_use]
    pub fn event(&self, event_id: &str) -> Option<EventDetails> {
        self.events.lock().unwrap().get(event_id).cloned()
    }

    fn is_busy(&self, date: NaiveDate, slot: &TimeSlot, exclude_event: Option<&str>) -> bool {
        self.busy.lock().unwrap().iter().any(|block| {
            block.date == date
                && block.slot.overlaps(slot)
                && (exclude_event.is_none() || block.event_id.as_deref() != exclude_event)
        })
    }

    fn check_queries(&self) -> Result<()> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(GatewayError::Http("mock calendar unreachable".to_string()));
        }
        Ok(())
    }

    fn check_events(&self) -> Result<()> {
        if self.fail_events.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 503,
                message: "mock calendar event failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarGateway for MockCalendarGateway {
    async fn check_availability(
        &self,
        date: NaiveDate,
        slot: TimeSlot,
        _timezone: &str,
        exclude_event: Option<&str>,
    ) -> Result<bool> {
        self.check_queries()?;
        Ok(self.hours.contains(&slot) && !self.is_busy(date, &slot, exclude_event))
    }

    async fn available_slots(&self, date: NaiveDate, _timezone: &str) -> Result<Vec<TimeSlot>> {
        self.check_queries()?;
        Ok(self
            .hours
            .candidate_slots()
            .into_iter()
            .filter(|slot| !self.is_busy(date, slot, None))
            .collect())
    }

    async fn create_event(&self, details: &EventDetails) -> Result<CalendarEvent> {
        self.check_events()?;
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        let event_id = format!("evt_{n}");
        self.events
            .lock()
            .unwrap()
            .insert(event_id.clone(), details.clone());
        Ok(CalendarEvent {
            meet_link: Some(format!("https://meet.example.com/{event_id}")),
            event_id,
        })
    }

    async fn update_event(&self, event_id: &str, details: &EventDetails) -> Result<()> {
        self.check_events()?;
        self.updated.fetch_add(1, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .insert(event_id.to_string(), details.clone());
        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        self.check_events()?;
        self.deleted.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().remove(event_id);
        Ok(())
    }
}
