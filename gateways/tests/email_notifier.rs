//! The email notifier renders templates and hands them to its transport.

#![allow(clippy::unwrap_used)]

use clientdesk_core::{Money, NaiveDate};
use clientdesk_gateways::mocks::MockEmailTransport;
use clientdesk_gateways::providers::{AccountNotice, AppointmentNotice, PasswordResetNotice};
use clientdesk_gateways::{EmailNotifier, NotificationGateway};
use std::sync::Arc;

fn notice() -> AppointmentNotice {
    AppointmentNotice {
        name: "Asha".into(),
        email: "asha@example.com".into(),
        date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        start_time: "10:00".parse().unwrap(),
        end_time: "11:00".parse().unwrap(),
        timezone: "Asia/Kolkata".into(),
        duration_hours: 1,
        total_amount: Money::from_minor(50_000),
        currency: "INR".into(),
        meet_link: None,
        reason: None,
    }
}

#[tokio::test]
async fn confirmation_is_rendered_and_delivered() {
    let transport = MockEmailTransport::new();
    let notifier = EmailNotifier::new(Arc::new(transport.clone()), "ClientDesk");

    let receipt = notifier.send_confirmation(&notice()).await.unwrap();
    assert_eq!(receipt.message_id, "mock-1");

    let messages = transport.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].to, "asha@example.com");
    assert!(messages[0].subject.starts_with("Appointment confirmed"));
    assert!(messages[0].html.contains("<!DOCTYPE html>"));
}

#[tokio::test]
async fn every_notice_kind_reaches_the_transport() {
    let transport = MockEmailTransport::new();
    let notifier = EmailNotifier::new(Arc::new(transport.clone()), "ClientDesk");

    notifier.send_cancellation(&notice()).await.unwrap();
    notifier
        .send_account_status(&AccountNotice {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            active: true,
        })
        .await
        .unwrap();
    notifier
        .send_password_reset(&PasswordResetNotice {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            reset_link: "https://app.example.com/reset?token=abc".into(),
            expires_in_minutes: 60,
        })
        .await
        .unwrap();

    let subjects: Vec<_> = transport.messages().into_iter().map(|m| m.subject).collect();
    assert_eq!(
        subjects,
        vec![
            "Appointment cancelled for Friday, March 14, 2025".to_string(),
            "Your account is active".to_string(),
            "Reset your password".to_string(),
        ]
    );
}
