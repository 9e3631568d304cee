//! HTML bodies for outbound email

use chrono::NaiveDate;

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn wrap(heading: &str, inner: &str) -> String {
    format!(
        "<div style=\"font-family:Arial,sans-serif;max-width:560px;margin:auto\">\
         <h2 style=\"color:#1f3a5f\">{}</h2>{}\
         <p style=\"color:#888;font-size:12px\">This is an automated message from Casedesk.</p></div>",
        escape(heading),
        inner
    )
}

pub fn otp_email(name: &str, otp: &str) -> String {
    wrap(
        "Your verification code",
        &format!(
            "<p>Hello {},</p><p>Your one-time code is:</p>\
             <p style=\"font-size:28px;letter-spacing:6px\"><strong>{}</strong></p>\
             <p>If you did not request this code you can ignore this email.</p>",
            escape(name),
            escape(otp)
        ),
    )
}

pub fn broadcast_email(name: &str, title: &str, message: &str) -> String {
    wrap(
        title,
        &format!("<p>Hello {},</p><p>{}</p>", escape(name), escape(message)),
    )
}

pub fn court_reminder_email(name: &str, case_number: &str, court_date: NaiveDate) -> String {
    wrap(
        "Court Date Reminder",
        &format!(
            "<p>Hello {},</p><p>This is a reminder that your case <strong>{}</strong> \
             has a court date tomorrow, <strong>{}</strong>.</p>\
             <p>Please contact your lawyer if you have any questions.</p>",
            escape(name),
            escape(case_number),
            court_date.format("%B %-d, %Y")
        ),
    )
}
