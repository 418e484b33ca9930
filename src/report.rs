use crate::client::ApiReply;
use crate::cycle::{message_or, Outcome, Tier};
use crate::models::ReportView;
use crate::ui;
use chrono::NaiveDate;
use serde_json::Value;

const NO_RECORDS: &str = "No attendance records";

/// Turns a `/api/report/{enroll_no}` reply into what the report region shows.
pub fn interpret(reply: ApiReply) -> Outcome {
    if !reply.is_success() {
        return Outcome::application(message_or(&reply, "Failed to fetch report"));
    }

    if let Some(message) = reply.message().filter(|message| message.contains(NO_RECORDS)) {
        let student_name = reply
            .body
            .get("student_name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Outcome::info(ui::no_records(student_name, message));
    }

    match serde_json::from_value::<ReportView>(reply.body) {
        Ok(report) => Outcome::success(ui::report(&report)),
        Err(err) => Outcome::Failed {
            tier: Tier::Network,
            message: format!("malformed report: {err}"),
        },
    }
}

/// `2024-03-07` becomes `3/7/2024`; anything unparseable is shown as sent.
pub fn display_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%-m/%-d/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn ok(body: Value) -> ApiReply {
        ApiReply {
            status: StatusCode::OK,
            body,
        }
    }

    #[test]
    fn no_records_shows_only_name_and_message() {
        let outcome = interpret(ok(json!({
            "student_name": "Bob Johnson",
            "message": "No attendance records found yet."
        })));

        let Outcome::Info(html) = &outcome else {
            panic!("expected info outcome, got {outcome:?}");
        };
        assert!(html.contains("<strong>Bob Johnson</strong>"));
        assert!(html.contains("No attendance records found yet."));
        assert!(!html.contains("summary-card"));
        assert!(!html.contains("history-table"));
    }

    #[test]
    fn summary_values_land_in_fixed_positions() {
        let outcome = interpret(ok(json!({
            "student_name": "Alice Smith",
            "enroll_no": "S1001",
            "summary": {
                "total_classes": 10,
                "present_count": 8,
                "absent_count": 2,
                "percentage": "80%"
            },
            "detailed_history": [
                { "date": "2025-01-06", "course_id": "CS101", "status": "Present" },
                { "date": "2025-01-07", "course_id": "CS101", "status": "absent" }
            ]
        })));

        let Outcome::Success(html) = &outcome else {
            panic!("expected success outcome, got {outcome:?}");
        };
        let values: Vec<&str> = html
            .split("summary-value")
            .skip(1)
            .map(|chunk| {
                let start = chunk.find('>').unwrap() + 1;
                let end = chunk.find("</div>").unwrap();
                &chunk[start..end]
            })
            .collect();
        assert_eq!(values, ["10", "8", "2", "80%"]);
        assert!(html.contains("1/6/2025"));
        assert!(html.contains(r#"class="status-badge present""#));
        assert!(html.contains(r#"class="status-badge absent""#));
    }

    #[test]
    fn empty_history_gets_placeholder_row() {
        let outcome = interpret(ok(json!({
            "student_name": "Alice Smith",
            "enroll_no": "S1001",
            "summary": {
                "total_classes": 0,
                "present_count": 0,
                "absent_count": 0,
                "percentage": "0.00%"
            },
            "detailed_history": []
        })));
        let Outcome::Success(html) = &outcome else {
            panic!("expected success outcome");
        };
        assert!(html.contains("No attendance records yet"));
    }

    #[test]
    fn missing_student_is_application_error() {
        let outcome = interpret(ApiReply {
            status: StatusCode::NOT_FOUND,
            body: json!({ "message": "Error: Student S9999 not found." }),
        });
        assert_eq!(outcome, Outcome::application("Error: Student S9999 not found."));
    }

    #[test]
    fn unreadable_report_is_network_tier() {
        let outcome = interpret(ok(json!({ "student_name": "Alice Smith" })));
        assert_eq!(outcome.tier(), Some(Tier::Network));
    }

    #[test]
    fn dates_are_shown_month_first() {
        assert_eq!(display_date("2024-03-07"), "3/7/2024");
        assert_eq!(display_date("yesterday"), "yesterday");
    }
}
