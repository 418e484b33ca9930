use crate::client::ApiReply;
use crate::cycle::{self, Outcome, Tier};
use crate::errors::ClientError;
use crate::models::StudentList;
use crate::regions::Region;
use crate::state::AppState;
use crate::ui;
use crate::visitor::Visitor;
use maud::html;
use tracing::error;

/// Refreshes both student views after the student set may have changed. The
/// two refreshes are independent cycles and run side by side. Returns the
/// table outcome and the attendance form outcome, in that order.
pub async fn sync(
    state: &AppState,
    visitor: &Visitor,
    cookie: Option<&str>,
) -> (Outcome, Outcome) {
    tokio::join!(
        refresh_table(state, visitor, cookie),
        refresh_attendance_form(state, visitor, cookie)
    )
}

/// The regions `sync` fills, paired with its outcomes.
pub fn overrides((table, form): (Outcome, Outcome)) -> [(Region, Outcome); 2] {
    [(Region::RosterTable, table), (Region::AttendanceRoster, form)]
}

pub async fn refresh_table(state: &AppState, visitor: &Visitor, cookie: Option<&str>) -> Outcome {
    let (outcome, _) = cycle::run_recovering(
        &visitor.controls,
        &visitor.regions,
        None,
        Region::RosterTable,
        state.client.list_students(cookie),
        interpret_table,
        table_network_error,
    )
    .await;
    outcome
}

pub async fn refresh_attendance_form(
    state: &AppState,
    visitor: &Visitor,
    cookie: Option<&str>,
) -> Outcome {
    let (outcome, _) = cycle::run(
        &visitor.controls,
        &visitor.regions,
        None,
        Region::AttendanceRoster,
        state.client.list_students(cookie),
        interpret_attendance_form,
    )
    .await;
    if let Outcome::Failed { message, .. } = &outcome {
        error!("error refreshing attendance form: {message}");
    }
    outcome
}

/// The roster table reports an unreachable backend inside the table area
/// rather than as a result banner.
pub fn table_network_error(err: &ClientError) -> Outcome {
    Outcome::view(html! {
        div.result-message.error.show data-tier=(Tier::Network.as_str()) {
            "Error loading students: " (err.to_string())
        }
    })
}

pub fn interpret_table(reply: ApiReply) -> Outcome {
    match students(&reply) {
        Some(list) if list.students.is_empty() => {
            Outcome::info_text("No students found. Add a student to get started.")
        }
        Some(list) => Outcome::view(ui::roster_table(&list.students)),
        None => Outcome::application("Failed to load students"),
    }
}

pub fn interpret_attendance_form(reply: ApiReply) -> Outcome {
    match students(&reply) {
        Some(list) if list.students.is_empty() => {
            Outcome::info_text("No students enrolled yet.")
        }
        Some(list) => Outcome::view(ui::attendance_rows(&list.students)),
        None => Outcome::application(cycle::message_or(&reply, "Failed to load students")),
    }
}

fn students(reply: &ApiReply) -> Option<StudentList> {
    if !reply.is_success() {
        return None;
    }
    serde_json::from_value(reply.body.clone()).ok()
}
