//! Summary document rendering.
//!
//! One section per record, titled `"{full_name} ({n})"` with a one-based `n`.
//! Every field is listed; absent optional fields show an explicit "N/A" marker.

use std::fmt::Write;

use intake_core::constants::NOT_PROVIDED;
use intake_core::models::SubmissionRecord;

pub const SUMMARY_HEADING: &str = "New Passport Submission";
const FOOTER: &str =
    "This is an automated message from the passport intake service. Please do not reply.";

fn optional(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_PROVIDED,
    }
}

// Required fields are validated upstream, but records can also arrive through
// the notification endpoint.
fn required(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_PROVIDED
    } else {
        value
    }
}

fn fields(record: &SubmissionRecord) -> [(&'static str, &str); 8] {
    [
        ("Full name", required(&record.full_name)),
        ("Passport number", required(&record.passport_number)),
        ("Date of birth", required(&record.date_of_birth)),
        ("Expiry date", required(&record.expiry_date)),
        ("Country", optional(&record.country)),
        ("Email", optional(&record.email)),
        ("Address", optional(&record.address)),
        ("Phone number", optional(&record.phone_number)),
    ]
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the HTML body of the operator email.
pub fn render_html(records: &[SubmissionRecord]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<body style=\"font-family: Arial, sans-serif; color: #333;\">\n");
    let _ = writeln!(html, "<h1>{}</h1>", SUMMARY_HEADING);

    for (index, record) in records.iter().enumerate() {
        let name = escape_html(&record.full_name);
        html.push_str("<div style=\"border: 1px solid #ddd; padding: 16px; margin-bottom: 16px;\">\n");
        let _ = writeln!(html, "<h2>{} ({})</h2>", name, index + 1);
        html.push_str("<table>\n");
        for (label, value) in fields(record) {
            let _ = writeln!(
                html,
                "<tr><th align=\"left\">{}</th><td>{}</td></tr>",
                label,
                escape_html(value)
            );
        }
        html.push_str("</table>\n");
        let _ = writeln!(
            html,
            "<p><img src=\"{}\" alt=\"Passport photo of {}\" style=\"max-width: 300px;\"></p>",
            escape_html(&record.photo_url),
            name
        );
        html.push_str("</div>\n");
    }

    let _ = writeln!(html, "<p style=\"font-size: 12px; color: #888;\">{}</p>", FOOTER);
    html.push_str("</body>\n</html>\n");
    html
}

/// Render the plain-text alternative of the operator email.
pub fn render_text(records: &[SubmissionRecord]) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{}\n", SUMMARY_HEADING);

    for (index, record) in records.iter().enumerate() {
        let _ = writeln!(text, "{} ({})", record.full_name, index + 1);
        for (label, value) in fields(record) {
            let _ = writeln!(text, "  {}: {}", label, value);
        }
        let _ = writeln!(text, "  Photo: {}\n", record.photo_url);
    }

    text.push_str(FOOTER);
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> SubmissionRecord {
        SubmissionRecord {
            full_name: name.to_string(),
            passport_number: "X1".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            expiry_date: "2030-01-01".to_string(),
            country: Some("Belgium".to_string()),
            email: None,
            address: None,
            phone_number: None,
            photo_url: "http://localhost/passport-photos/1_Jane_Doe.jpg".to_string(),
        }
    }

    #[test]
    fn html_has_one_titled_section_per_record() {
        let html = render_html(&[record("Jane Doe"), record("John Roe")]);
        assert!(html.contains("<h1>New Passport Submission</h1>"));
        assert!(html.contains("<h2>Jane Doe (1)</h2>"));
        assert!(html.contains("<h2>John Roe (2)</h2>"));
        assert_eq!(html.matches("<img src=").count(), 2);
        assert!(html.contains("http://localhost/passport-photos/1_Jane_Doe.jpg"));
    }

    #[test]
    fn absent_optionals_render_marker() {
        let html = render_html(&[record("Jane Doe")]);
        assert!(html.contains("<th align=\"left\">Email</th><td>N/A</td>"));
        assert!(html.contains("<th align=\"left\">Country</th><td>Belgium</td>"));

        let text = render_text(&[record("Jane Doe")]);
        assert!(text.contains("  Phone number: N/A"));
        assert!(text.contains("Jane Doe (1)"));
    }

    #[test]
    fn markup_in_fields_is_escaped() {
        let mut rec = record("<script>alert('x')</script>");
        rec.address = Some("Main St & \"Co\"".to_string());
        let html = render_html(&[rec]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("Main St &amp; &quot;Co&quot;"));
    }
}
