//! Google Calendar gateway (REST API v3).
//!
//! Availability comes from the `freeBusy` endpoint, or from the event list when
//! one event's own time must not count. Events are created with a Google Meet
//! conference request so the response carries a meeting link.
//! Wall-clock times are converted to instants with a fixed UTC offset.

use crate::error::{GatewayError, Result};
use crate::providers::calendar::{CalendarEvent, CalendarGateway, EventDetails, OfficeHours};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use clientdesk_core::{TimeOfDay, TimeSlot};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

/// Default REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar settings.
#[derive(Debug, Clone)]
pub struct GoogleCalendarConfig {
    /// Calendar to book into (`primary` or an address).
    pub calendar_id: String,
    /// OAuth bearer token with calendar scope.
    pub access_token: String,
    /// Offset of the business's local zone.
    pub utc_offset: FixedOffset,
    /// Bookable hours.
    pub hours: OfficeHours,
    /// REST endpoint.
    pub api_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GoogleCalendarConfig {
    /// Settings with default endpoint, hours and timeout.
    #[must_use]
    pub fn new(
        calendar_id: impl Into<String>,
        access_token: impl Into<String>,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            access_token: access_token.into(),
            utc_offset,
            hours: OfficeHours::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Override bookable hours.
    #[must_use]
    pub const fn with_hours(mut self, hours: OfficeHours) -> Self {
        self.hours = hours;
        self
    }

    /// Override the endpoint.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Google Calendar REST client.
#[derive(Debug, Clone)]
pub struct GoogleCalendarGateway {
    config: GoogleCalendarConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<BusyInterval>,
}

#[derive(Deserialize)]
struct BusyInterval {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

#[derive(Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<ListedEvent>,
}

#[derive(Deserialize)]
struct ListedEvent {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    transparency: Option<String>,
    start: ListedTime,
    end: ListedTime,
}

/// `dateTime` for timed events; all-day events only carry `date`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedTime {
    #[serde(default)]
    date_time: Option<DateTime<FixedOffset>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventResponse {
    id: String,
    hangout_link: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: String,
    time_zone: String,
}

impl GoogleCalendarGateway {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` without an access token, `Http` if the TLS
    /// client cannot be built.
    pub fn new(config: GoogleCalendarConfig) -> Result<Self> {
        if config.access_token.is_empty() {
            return Err(GatewayError::Configuration(
                "Google Calendar access token is not set".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    fn instant(&self, date: NaiveDate, time: TimeOfDay) -> Result<DateTime<FixedOffset>> {
        self.config
            .utc_offset
            .from_local_datetime(&date.and_time(time.to_naive_time()))
            .single()
            .ok_or_else(|| GatewayError::InvalidInput(format!("no local time {date} {time}")))
    }

    fn event_time(date: NaiveDate, time: TimeOfDay, timezone: &str) -> EventTime {
        EventTime {
            date_time: date.and_time(time.to_naive_time()).format("%Y-%m-%dT%H:%M:%S").to_string(),
            time_zone: timezone.to_string(),
        }
    }

    fn event_body(details: &EventDetails) -> serde_json::Value {
        json!({
            "summary": details.summary,
            "description": details.description,
            "start": Self::event_time(details.date, details.slot.start, &details.timezone),
            "end": Self::event_time(details.date, details.slot.end, &details.timezone),
            "attendees": [{ "email": details.attendee_email, "displayName": details.attendee_name }],
        })
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.config.api_base, self.config.calendar_id)
    }

    /// Busy intervals overlapping `[from, to)`, as local slots on `date`.
    async fn busy(&self, date: NaiveDate, from: TimeOfDay, to: TimeOfDay) -> Result<Vec<TimeSlot>> {
        let body = json!({
            "timeMin": self.instant(date, from)?.to_rfc3339(),
            "timeMax": self.instant(date, to)?.to_rfc3339(),
            "items": [{ "id": self.config.calendar_id }],
        });
        let response = self
            .http
            .post(format!("{}/freeBusy", self.config.api_base))
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let parsed: FreeBusyResponse = response.json().await?;

        let intervals = parsed
            .calendars
            .get(&self.config.calendar_id)
            .map(|c| c.busy.as_slice())
            .unwrap_or_default();
        let offset = self.config.utc_offset;
        Ok(intervals
            .iter()
            .map(|interval| local_slot(interval.start, interval.end, date, from, to, offset))
            .collect())
    }

    /// Busy intervals from the event list, leaving out `exclude_event`.
    async fn busy_except(
        &self,
        date: NaiveDate,
        from: TimeOfDay,
        to: TimeOfDay,
        exclude_event: &str,
    ) -> Result<Vec<TimeSlot>> {
        let time_min = self.instant(date, from)?.to_rfc3339();
        let time_max = self.instant(date, to)?.to_rfc3339();
        let response = self
            .http
            .get(self.events_url())
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
            ])
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;
        let listed: EventList = ensure_success(response).await?.json().await?;
        Ok(blocking_events(&listed.items, exclude_event, date, from, to, self.config.utc_offset))
    }
}

/// An instant interval as a local slot on `date`, clamped to `[from, to]`
/// where it spills onto a neighbouring day.
fn local_slot(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    date: NaiveDate,
    from: TimeOfDay,
    to: TimeOfDay,
    offset: FixedOffset,
) -> TimeSlot {
    let clamp = |t: DateTime<FixedOffset>, fallback: TimeOfDay| {
        let t = t.with_timezone(&offset);
        if t.date_naive() == date {
            TimeOfDay::from_naive_time(t.time())
        } else {
            fallback
        }
    };
    TimeSlot::new(clamp(start, from), clamp(end, to))
}

/// Slots held by listed events other than `exclude_event`. Cancelled and
/// transparent events hold nothing; all-day events hold the whole window.
fn blocking_events(
    items: &[ListedEvent],
    exclude_event: &str,
    date: NaiveDate,
    from: TimeOfDay,
    to: TimeOfDay,
    offset: FixedOffset,
) -> Vec<TimeSlot> {
    items
        .iter()
        .filter(|event| event.id != exclude_event)
        .filter(|event| event.status.as_deref() != Some("cancelled"))
        .filter(|event| event.transparency.as_deref() != Some("transparent"))
        .map(|event| match (event.start.date_time, event.end.date_time) {
            (Some(start), Some(end)) => local_slot(start, end, date, from, to, offset),
            _ => TimeSlot::new(from, to),
        })
        .collect()
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|e| format!("unreadable body: {e}"));
    Err(GatewayError::Rejected { status, message })
}

#[async_trait]
impl CalendarGateway for GoogleCalendarGateway {
    async fn check_availability(
        &self,
        date: NaiveDate,
        slot: TimeSlot,
        _timezone: &str,
        exclude_event: Option<&str>,
    ) -> Result<bool> {
        let busy = match exclude_event {
            Some(event_id) => self.busy_except(date, slot.start, slot.end, event_id).await?,
            None => self.busy(date, slot.start, slot.end).await?,
        };
        Ok(!busy.iter().any(|b| b.overlaps(&slot)))
    }

    async fn available_slots(&self, date: NaiveDate, _timezone: &str) -> Result<Vec<TimeSlot>> {
        let hours = self.config.hours;
        let busy = self.busy(date, hours.open, hours.close).await?;
        Ok(hours
            .candidate_slots()
            .into_iter()
            .filter(|slot| !busy.iter().any(|b| b.overlaps(slot)))
            .collect())
    }

    async fn create_event(&self, details: &EventDetails) -> Result<CalendarEvent> {
        let mut body = Self::event_body(details);
        body["conferenceData"] = json!({
            "createRequest": {
                "requestId": uuid::Uuid::new_v4().to_string(),
                "conferenceSolutionKey": { "type": "hangoutsMeet" },
            }
        });
        let response = self
            .http
            .post(self.events_url())
            .query(&[("conferenceDataVersion", "1"), ("sendUpdates", "all")])
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await?;
        let event: EventResponse = ensure_success(response).await?.json().await?;
        tracing::info!(event_id = %event.id, has_meet_link = event.hangout_link.is_some(), "Google Calendar event created");
        Ok(CalendarEvent {
            event_id: event.id,
            meet_link: event.hangout_link,
        })
    }

    async fn update_event(&self, event_id: &str, details: &EventDetails) -> Result<()> {
        let response = self
            .http
            .patch(format!("{}/{event_id}", self.events_url()))
            .query(&[("sendUpdates", "all")])
            .bearer_auth(&self.config.access_token)
            .json(&Self::event_body(details))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(format!("{}/{event_id}", self.events_url()))
            .query(&[("sendUpdates", "all")])
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    #[test]
    fn requires_access_token() {
        let err = GoogleCalendarGateway::new(GoogleCalendarConfig::new("primary", "", ist())).unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn local_times_carry_the_configured_offset() {
        let gw = GoogleCalendarGateway::new(GoogleCalendarConfig::new("primary", "token", ist())).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let instant = gw.instant(date, "10:00".parse().unwrap()).unwrap();
        assert_eq!(instant.to_rfc3339(), "2025-01-10T10:00:00+05:30");
    }

    fn listed(id: &str, start: &str, end: &str) -> ListedEvent {
        ListedEvent {
            id: id.into(),
            status: Some("confirmed".into()),
            transparency: None,
            start: ListedTime {
                date_time: Some(DateTime::parse_from_rfc3339(start).unwrap()),
            },
            end: ListedTime {
                date_time: Some(DateTime::parse_from_rfc3339(end).unwrap()),
            },
        }
    }

    #[test]
    fn own_event_does_not_block_its_reschedule() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let items = vec![
            listed("evt_own", "2025-01-10T10:00:00+05:30", "2025-01-10T11:00:00+05:30"),
            listed("evt_other", "2025-01-10T12:00:00+05:30", "2025-01-10T13:00:00+05:30"),
        ];
        let moved = TimeSlot::new("10:30".parse().unwrap(), "11:30".parse().unwrap());
        let clash = TimeSlot::new("11:30".parse().unwrap(), "12:30".parse().unwrap());

        let busy = blocking_events(
            &items,
            "evt_own",
            date,
            "09:00".parse().unwrap(),
            "18:00".parse().unwrap(),
            ist(),
        );

        assert_eq!(busy.len(), 1);
        assert!(!busy.iter().any(|b| b.overlaps(&moved)));
        assert!(busy.iter().any(|b| b.overlaps(&clash)));
    }

    #[test]
    fn cancelled_transparent_and_all_day_events() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let mut cancelled = listed("evt_c", "2025-01-10T10:00:00+05:30", "2025-01-10T11:00:00+05:30");
        cancelled.status = Some("cancelled".into());
        let mut free = listed("evt_t", "2025-01-10T10:00:00+05:30", "2025-01-10T11:00:00+05:30");
        free.transparency = Some("transparent".into());
        let all_day = ListedEvent {
            id: "evt_d".into(),
            status: None,
            transparency: None,
            start: ListedTime { date_time: None },
            end: ListedTime { date_time: None },
        };
        let from: TimeOfDay = "09:00".parse().unwrap();
        let to: TimeOfDay = "18:00".parse().unwrap();

        let busy = blocking_events(&[cancelled, free, all_day], "evt_own", date, from, to, ist());

        assert_eq!(busy, vec![TimeSlot::new(from, to)]);
    }

    #[test]
    fn event_list_parses_timed_and_all_day_items() {
        let raw = r#"{"items": [
            {"id": "a", "status": "confirmed",
             "start": {"dateTime": "2025-01-10T10:00:00+05:30"},
             "end": {"dateTime": "2025-01-10T11:00:00+05:30"}},
            {"id": "b", "start": {"date": "2025-01-10"}, "end": {"date": "2025-01-11"}}
        ]}"#;
        let list: EventList = serde_json::from_str(raw).unwrap();
        assert_eq!(list.items.len(), 2);
        assert!(list.items[0].start.date_time.is_some());
        assert!(list.items[1].start.date_time.is_none());
    }

    #[test]
    fn event_body_uses_wall_clock_with_zone() {
        let details = EventDetails {
            summary: "Consultation: Asha".into(),
            description: "d".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            slot: TimeSlot::new("10:00".parse().unwrap(), "12:00".parse().unwrap()),
            timezone: "Asia/Kolkata".into(),
            attendee_email: "asha@example.com".into(),
            attendee_name: "Asha".into(),
        };
        let body = GoogleCalendarGateway::event_body(&details);
        assert_eq!(body["start"]["dateTime"], "2025-01-10T10:00:00");
        assert_eq!(body["end"]["dateTime"], "2025-01-10T12:00:00");
        assert_eq!(body["start"]["timeZone"], "Asia/Kolkata");
    }
}
