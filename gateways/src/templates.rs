//! Email content generation.
//!
//! Every template produces both an HTML body and a plain-text alternative.
//! User-supplied values are HTML-escaped before interpolation.

use crate::providers::notification::{
    AccountNotice, AppointmentNotice, EmailMessage, PasswordResetNotice, PurchaseNotice,
    ScheduleChange,
};
use clientdesk_core::{Money, NaiveDate};
use std::fmt::Write as _;

/// Escape text for inclusion in HTML.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

fn amount(money: Money, currency: &str) -> String {
    format!("{currency} {money}")
}

fn layout(brand: &str, accent: &str, heading: &str, body: &str) -> String {
    let brand = escape(brand);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{heading}</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: {accent};">{heading}</h2>
{body}
        <p style="color: #666; font-size: 12px; margin-top: 40px;">{brand}</p>
    </div>
</body>
</html>
"#
    )
}

fn detail_rows(rows: &[(&str, String)]) -> String {
    let mut html = String::from("        <table style=\"border-collapse: collapse;\">\n");
    for (label, value) in rows {
        let _ = writeln!(
            html,
            "            <tr><td style=\"padding: 4px 12px 4px 0; color: #666;\">{label}</td><td>{}</td></tr>",
            escape(value)
        );
    }
    html.push_str("        </table>\n");
    html
}

fn detail_text(rows: &[(&str, String)]) -> String {
    rows.iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn appointment_rows(notice: &AppointmentNotice) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Date", long_date(notice.date)),
        (
            "Time",
            format!("{} - {} ({})", notice.start_time, notice.end_time, notice.timezone),
        ),
        ("Duration", format!("{} hour(s)", notice.duration_hours)),
    ];
    if let Some(link) = &notice.meet_link {
        rows.push(("Meeting link", link.clone()));
    }
    rows
}

/// Booking confirmed.
#[must_use]
pub fn appointment_confirmation(brand: &str, notice: &AppointmentNotice) -> EmailMessage {
    let mut rows = appointment_rows(notice);
    rows.push(("Amount paid", amount(notice.total_amount, &notice.currency)));
    let greeting = format!("Hi {},", notice.name);
    let intro = "Your consultation is confirmed. Here are the details:";

    let body = format!(
        "        <p>{}</p>\n        <p>{intro}</p>\n{}",
        escape(&greeting),
        detail_rows(&rows)
    );
    EmailMessage {
        to: notice.email.clone(),
        subject: format!("Appointment confirmed for {}", long_date(notice.date)),
        html: layout(brand, "#16a34a", "Your appointment is confirmed", &body),
        text: format!("{greeting}\n\n{intro}\n\n{}\n\n{brand}", detail_text(&rows)),
    }
}

/// Booking cancelled.
#[must_use]
pub fn appointment_cancellation(brand: &str, notice: &AppointmentNotice) -> EmailMessage {
    let mut rows = appointment_rows(notice);
    rows.retain(|(label, _)| *label != "Meeting link");
    if let Some(reason) = notice.reason.as_deref().filter(|r| !r.trim().is_empty()) {
        rows.push(("Reason", reason.to_string()));
    }
    let greeting = format!("Hi {},", notice.name);
    let intro = "Your consultation has been cancelled.";

    let body = format!(
        "        <p>{}</p>\n        <p>{intro}</p>\n{}",
        escape(&greeting),
        detail_rows(&rows)
    );
    EmailMessage {
        to: notice.email.clone(),
        subject: format!("Appointment cancelled for {}", long_date(notice.date)),
        html: layout(brand, "#dc2626", "Your appointment was cancelled", &body),
        text: format!("{greeting}\n\n{intro}\n\n{}\n\n{brand}", detail_text(&rows)),
    }
}

/// Booking moved.
#[must_use]
pub fn appointment_reschedule(
    brand: &str,
    notice: &AppointmentNotice,
    change: &ScheduleChange,
) -> EmailMessage {
    let previous = format!(
        "{}, {} - {}",
        long_date(change.previous_date),
        change.previous_start,
        change.previous_end
    );
    let mut rows = vec![("Previously", previous)];
    rows.extend(appointment_rows(notice));
    let greeting = format!("Hi {},", notice.name);
    let intro = "Your consultation has been rescheduled.";

    let body = format!(
        "        <p>{}</p>\n        <p>{intro}</p>\n{}",
        escape(&greeting),
        detail_rows(&rows)
    );
    EmailMessage {
        to: notice.email.clone(),
        subject: format!("Appointment rescheduled to {}", long_date(notice.date)),
        html: layout(brand, "#2563eb", "Your appointment was rescheduled", &body),
        text: format!("{greeting}\n\n{intro}\n\n{}\n\n{brand}", detail_text(&rows)),
    }
}

/// Account activated or deactivated.
#[must_use]
pub fn account_status(brand: &str, notice: &AccountNotice) -> EmailMessage {
    let (subject, heading, line, accent) = if notice.active {
        (
            "Your account is active",
            "Account activated",
            "Your account has been activated. You can now sign in.",
            "#16a34a",
        )
    } else {
        (
            "Your account has been deactivated",
            "Account deactivated",
            "Your account has been deactivated. Contact us if you think this is a mistake.",
            "#dc2626",
        )
    };
    let greeting = format!("Hi {},", notice.name);
    let body = format!("        <p>{}</p>\n        <p>{line}</p>\n", escape(&greeting));
    EmailMessage {
        to: notice.email.clone(),
        subject: subject.to_string(),
        html: layout(brand, accent, heading, &body),
        text: format!("{greeting}\n\n{line}\n\n{brand}"),
    }
}

/// Checkout paid.
#[must_use]
pub fn purchase_confirmation(brand: &str, notice: &PurchaseNotice) -> EmailMessage {
    let mut rows: Vec<(&str, String)> = notice
        .items
        .iter()
        .map(|(title, price)| ("Item", format!("{title} ({price})")))
        .collect();
    rows.push(("Subtotal", amount(notice.subtotal, &notice.currency)));
    if notice.discount.is_positive() {
        rows.push(("Discount", amount(notice.discount, &notice.currency)));
    }
    rows.push(("Total paid", amount(notice.total, &notice.currency)));
    rows.push(("Order", notice.order_id.clone()));
    let greeting = format!("Hi {},", notice.name);
    let intro = "Thank you for your purchase. We have started working on your order.";

    let body = format!(
        "        <p>{}</p>\n        <p>{intro}</p>\n{}",
        escape(&greeting),
        detail_rows(&rows)
    );
    EmailMessage {
        to: notice.email.clone(),
        subject: "Your purchase is confirmed".to_string(),
        html: layout(brand, "#16a34a", "Purchase confirmed", &body),
        text: format!("{greeting}\n\n{intro}\n\n{}\n\n{brand}", detail_text(&rows)),
    }
}

/// Password reset requested.
#[must_use]
pub fn password_reset(brand: &str, notice: &PasswordResetNotice) -> EmailMessage {
    let link = escape(&notice.reset_link);
    let minutes = notice.expires_in_minutes;
    let greeting = format!("Hi {},", notice.name);
    let body = format!(
        r#"        <p>{}</p>
        <p>Click the link below to reset your password. This link will expire in {minutes} minutes.</p>
        <p style="margin: 30px 0;">
            <a href="{link}"
               style="display: inline-block; background-color: #dc2626; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px;">
                Reset Password
            </a>
        </p>
        <p style="color: #666; font-size: 14px;">
            If you didn't request this password reset, please ignore this email. Your password will not be changed.
        </p>
"#,
        escape(&greeting)
    );
    EmailMessage {
        to: notice.email.clone(),
        subject: "Reset your password".to_string(),
        html: layout(brand, "#dc2626", "Reset your password", &body),
        text: format!(
            "{greeting}\n\nReset your password within {minutes} minutes:\n{}\n\nIf you didn't request this, ignore this email.\n\n{brand}",
            notice.reset_link
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn notice() -> AppointmentNotice {
        AppointmentNotice {
            name: "Asha <script>".into(),
            email: "asha@example.com".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            start_time: "10:00".parse().unwrap(),
            end_time: "12:00".parse().unwrap(),
            timezone: "Asia/Kolkata".into(),
            duration_hours: 2,
            total_amount: Money::from_minor(100_000),
            currency: "INR".into(),
            meet_link: Some("https://meet.google.com/abc".into()),
            reason: Some("Client request".into()),
        }
    }

    #[test]
    fn confirmation_contains_schedule_and_link() {
        let email = appointment_confirmation("ClientDesk", &notice());
        assert_eq!(email.to, "asha@example.com");
        assert_eq!(email.subject, "Appointment confirmed for Friday, January 10, 2025");
        assert!(email.text.contains("10:00 - 12:00 (Asia/Kolkata)"));
        assert!(email.text.contains("https://meet.google.com/abc"));
        assert!(email.text.contains("INR 1000.00"));
    }

    #[test]
    fn user_values_are_escaped_in_html() {
        let email = appointment_confirmation("ClientDesk", &notice());
        assert!(email.html.contains("Asha &lt;script&gt;"));
        assert!(!email.html.contains("<script>"));
    }

    #[test]
    fn cancellation_shows_reason_without_link() {
        let email = appointment_cancellation("ClientDesk", &notice());
        assert!(email.text.contains("Reason: Client request"));
        assert!(!email.text.contains("meet.google.com"));
    }

    #[test]
    fn reschedule_shows_old_and_new_times() {
        let change = ScheduleChange {
            previous_date: NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
            previous_start: "15:00".parse().unwrap(),
            previous_end: "17:00".parse().unwrap(),
        };
        let email = appointment_reschedule("ClientDesk", &notice(), &change);
        assert!(email.text.contains("Previously: Thursday, January 9, 2025, 15:00 - 17:00"));
        assert!(email.text.contains("Date: Friday, January 10, 2025"));
    }

    #[test]
    fn account_status_wording_follows_flag() {
        let mut n = AccountNotice { name: "Ravi".into(), email: "r@example.com".into(), active: true };
        assert_eq!(account_status("ClientDesk", &n).subject, "Your account is active");
        n.active = false;
        assert!(account_status("ClientDesk", &n).text.contains("deactivated"));
    }

    #[test]
    fn purchase_lists_items_and_discount() {
        let email = purchase_confirmation(
            "ClientDesk",
            &PurchaseNotice {
                name: "Ravi".into(),
                email: "r@example.com".into(),
                items: vec![("GST filing".into(), "₹1,500".into())],
                subtotal: Money::from_minor(150_000),
                discount: Money::from_minor(15_000),
                total: Money::from_minor(135_000),
                currency: "INR".into(),
                order_id: "order_1".into(),
            },
        );
        assert!(email.text.contains("Item: GST filing (₹1,500)"));
        assert!(email.text.contains("Discount: INR 150.00"));
        assert!(email.text.contains("Total paid: INR 1350.00"));
    }
}
