use crate::cycle::{Control, Outcome, Tier};
use crate::models::{AttendanceStatus, ReportView, StudentRecord};
use crate::regions::Region;
use crate::report::display_date;
use crate::state::Session;
use crate::visitor::Visitor;
use maud::{html, Markup, PreEscaped};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Mark,
    Report,
    Manage,
}

impl Tab {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("report") => Self::Report,
            Some("manage") => Self::Manage,
            _ => Self::Mark,
        }
    }
}

/// Renders the whole page from one visitor's region board. `overrides` carry
/// the outcomes of the cycles this request ran, and win over the board.
pub fn render_page(
    session: &Session,
    visitor: &Visitor,
    tab: Tab,
    overrides: &[(Region, Outcome)],
) -> String {
    let region = |which: Region| {
        let outcome = overrides
            .iter()
            .find(|(candidate, _)| *candidate == which)
            .map(|(_, outcome)| outcome.clone())
            .or_else(|| visitor.regions.shown(which));
        render_region(which, outcome.as_ref()).into_string()
    };
    let button = |control: Control| {
        submit_button(control, visitor.controls.is_busy(control)).into_string()
    };
    let active = |candidate: Tab| if candidate == tab { " active" } else { "" };

    INDEX_HTML
        .replace("{{FACULTY_ID}}", &escape(&session.faculty_id))
        .replace("{{COURSE_ID}}", &escape(&session.course_id))
        .replace("{{MARK_ACTIVE}}", active(Tab::Mark))
        .replace("{{REPORT_ACTIVE}}", active(Tab::Report))
        .replace("{{MANAGE_ACTIVE}}", active(Tab::Manage))
        .replace("{{STUDENT_ROWS}}", &region(Region::AttendanceRoster))
        .replace("{{MARK_BUTTON}}", &button(Control::MarkAttendance))
        .replace("{{MARK_RESULT}}", &region(Region::MarkResult))
        .replace("{{REPORT_BUTTON}}", &button(Control::GetReport))
        .replace("{{REPORT_RESULT}}", &region(Region::ReportResult))
        .replace("{{ADD_BUTTON}}", &button(Control::AddStudent))
        .replace("{{ADD_RESULT}}", &region(Region::AddStudentResult))
        .replace("{{FIX_BUTTON}}", &button(Control::FixNames))
        .replace("{{FIX_RESULT}}", &region(Region::FixNamesResult))
        .replace("{{ROSTER}}", &region(Region::RosterTable))
}

fn escape(value: &str) -> String {
    html! { (value) }.into_string()
}

pub fn submit_button(control: Control, busy: bool) -> Markup {
    let label = if busy {
        control.busy_label()
    } else {
        control.idle_label()
    };
    html! {
        button.submit-btn type="submit" disabled[busy] { (label) }
    }
}

pub fn render_region(region: Region, outcome: Option<&Outcome>) -> Markup {
    let id = region.id();
    match outcome {
        None => html! { div.result-message id=(id) {} },
        Some(Outcome::View(body)) => html! { div id=(id) { (PreEscaped(body)) } },
        Some(Outcome::Success(body)) => html! {
            div.result-message.success.show id=(id) { (PreEscaped(body)) }
        },
        Some(Outcome::Info(body)) => html! {
            div.result-message.info.show id=(id) { (PreEscaped(body)) }
        },
        Some(Outcome::Failed { tier, message }) => html! {
            div.result-message.error.show id=(id) data-tier=(tier.as_str()) {
                (failure_text(*tier, message))
            }
        },
    }
}

pub fn failure_text(tier: Tier, message: &str) -> String {
    match tier {
        Tier::Validation => format!("❌ {message}"),
        Tier::Application => format!("❌ Error: {message}"),
        Tier::Network => format!("❌ Network Error: {message}"),
    }
}

/// `✅ message`, optionally followed by one line per extra entry.
pub fn success_message(message: &str, lines: &[(String, String)]) -> Markup {
    html! {
        "✅ " (message)
        @for (key, value) in lines {
            br;
            (key) ": " (value)
        }
    }
}

pub fn no_records(student_name: &str, message: &str) -> Markup {
    html! {
        strong { (student_name) }
        br;
        (message)
    }
}

pub fn report(report: &ReportView) -> Markup {
    let summary = &report.summary;
    html! {
        div.report-container {
            div.report-header {
                div {
                    div.report-student-name { (report.student_name) }
                    div.report-enroll-no { "Enrollment: " (report.enrollment_id) }
                }
            }
            div.report-summary {
                div.summary-card {
                    div.summary-label { "Total Classes" }
                    div.summary-value { (summary.total_classes) }
                }
                div.summary-card {
                    div.summary-label { "Present" }
                    div.summary-value.good { (summary.present_count) }
                }
                div.summary-card {
                    div.summary-label { "Absent" }
                    div.summary-value.bad { (summary.absent_count) }
                }
                div.summary-card {
                    div.summary-label { "Attendance %" }
                    div.summary-value { (summary.percentage.to_string()) }
                }
            }
            h3 { "Attendance History" }
            table.history-table {
                thead {
                    tr {
                        th { "Date" }
                        th { "Course" }
                        th { "Status" }
                    }
                }
                tbody {
                    @if report.history.is_empty() {
                        tr {
                            td.empty colspan="3" { "No attendance records yet" }
                        }
                    }
                    @for record in &report.history {
                        tr {
                            td { (display_date(&record.date)) }
                            td { (record.course_id) }
                            td {
                                span class={ "status-badge " (AttendanceStatus::badge_class(&record.status)) } {
                                    (record.status)
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn roster_table(students: &[StudentRecord]) -> Markup {
    html! {
        table.history-table {
            thead {
                tr {
                    th { "Enrollment Number" }
                    th { "Name" }
                }
            }
            tbody {
                @for student in students {
                    tr {
                        td { strong { (student.enrollment_id) } }
                        td { (student.display_name) }
                    }
                }
            }
        }
    }
}

pub fn attendance_rows(students: &[StudentRecord]) -> Markup {
    html! {
        @for student in students {
            div.student-row {
                span.student-name { (student.enrollment_id) " - " (student.display_name) }
                select.status-select name={ "status_" (student.enrollment_id) } {
                    @for status in AttendanceStatus::ALL {
                        option value=(status.as_str()) { (status.as_str()) }
                    }
                }
            }
        }
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Student Attendance</title>
  <style>
    :root {
      --bg: #eef1f7;
      --ink: #2b2a28;
      --accent: #4f5bd5;
      --good: #28a745;
      --bad: #dc3545;
      --info: #17a2b8;
      --card: #ffffff;
      --shadow: 0 18px 40px rgba(40, 48, 90, 0.14);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(900px, 100%);
      margin: 0 auto;
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    header h1 {
      margin: 0;
    }

    .faculty {
      margin: 6px 0 0;
      color: #666;
    }

    .tabs {
      display: flex;
      gap: 8px;
      border-bottom: 2px solid #e3e6ef;
    }

    .tab-button {
      padding: 10px 18px;
      color: #666;
      text-decoration: none;
      font-weight: 600;
      border-bottom: 3px solid transparent;
    }

    .tab-button.active {
      color: var(--accent);
      border-bottom-color: var(--accent);
    }

    .tab-content {
      display: none;
    }

    .tab-content.active {
      display: grid;
      gap: 16px;
    }

    form {
      display: grid;
      gap: 12px;
    }

    label {
      font-weight: 600;
      font-size: 0.9rem;
    }

    input,
    select {
      padding: 10px 12px;
      border: 1px solid #ccd2e0;
      border-radius: 8px;
      font-size: 1rem;
    }

    .submit-btn {
      padding: 12px 18px;
      border: none;
      border-radius: 8px;
      background: var(--accent);
      color: white;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
    }

    .submit-btn[disabled] {
      opacity: 0.6;
      cursor: progress;
    }

    .student-row {
      display: flex;
      justify-content: space-between;
      align-items: center;
      padding: 10px 12px;
      border: 1px solid #e3e6ef;
      border-radius: 8px;
    }

    .result-message {
      display: none;
      padding: 14px 16px;
      border-radius: 8px;
    }

    .result-message.show {
      display: block;
    }

    .result-message.success {
      background: #e9f7ee;
      color: #1e6b34;
    }

    .result-message.error {
      background: #fbeaec;
      color: #8a1f2b;
    }

    .result-message.info {
      display: block;
      background: #e8f6f9;
      color: #0f5f6c;
    }

    .report-student-name {
      font-size: 1.4rem;
      font-weight: 700;
    }

    .report-enroll-no {
      color: #666;
    }

    .report-summary {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 12px;
      margin: 16px 0;
    }

    .summary-card {
      background: white;
      border: 1px solid #e3e6ef;
      border-radius: 10px;
      padding: 14px;
    }

    .summary-label {
      font-size: 0.8rem;
      text-transform: uppercase;
      color: #888;
    }

    .summary-value {
      font-size: 1.6rem;
      font-weight: 700;
    }

    .summary-value.good {
      color: var(--good);
    }

    .summary-value.bad {
      color: var(--bad);
    }

    .history-table {
      width: 100%;
      border-collapse: collapse;
    }

    .history-table th,
    .history-table td {
      padding: 10px;
      border-bottom: 1px solid #e3e6ef;
      text-align: left;
    }

    .history-table td.empty {
      text-align: center;
      color: #666;
    }

    .status-badge {
      padding: 3px 10px;
      border-radius: 999px;
      font-size: 0.85rem;
      font-weight: 600;
    }

    .status-badge.present {
      background: #d4edda;
      color: var(--good);
    }

    .status-badge.absent {
      background: #f8d7da;
      color: var(--bad);
    }

    .status-badge.unknown {
      background: #e2e3e5;
      color: #555;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Student Attendance</h1>
      <p class="faculty">Faculty: <strong id="current-faculty">{{FACULTY_ID}}</strong></p>
    </header>

    <nav class="tabs">
      <a class="tab-button{{MARK_ACTIVE}}" href="/?tab=mark">Mark Attendance</a>
      <a class="tab-button{{REPORT_ACTIVE}}" href="/?tab=report">View Report</a>
      <a class="tab-button{{MANAGE_ACTIVE}}" href="/?tab=manage">Manage Students</a>
    </nav>

    <section id="mark-tab" class="tab-content{{MARK_ACTIVE}}">
      <form id="attendance-form" method="post" action="/attendance">
        <label for="faculty_id">Faculty ID</label>
        <input id="faculty_id" name="faculty_id" value="{{FACULTY_ID}}" readonly />
        <label for="course_id">Course ID</label>
        <input id="course_id" name="course_id" value="{{COURSE_ID}}" required />
        {{STUDENT_ROWS}}
        {{MARK_BUTTON}}
      </form>
      {{MARK_RESULT}}
    </section>

    <section id="report-tab" class="tab-content{{REPORT_ACTIVE}}">
      <form id="report-form" method="post" action="/report">
        <label for="enroll_no">Enrollment Number</label>
        <input id="enroll_no" name="enroll_no" placeholder="e.g. S1001" />
        {{REPORT_BUTTON}}
      </form>
      {{REPORT_RESULT}}
    </section>

    <section id="manage-tab" class="tab-content{{MANAGE_ACTIVE}}">
      <form id="add-student-form" method="post" action="/students">
        <label for="new_enroll_no">Enrollment Number</label>
        <input id="new_enroll_no" name="new_enroll_no" />
        <label for="new_student_name">Student Name</label>
        <input id="new_student_name" name="new_student_name" />
        {{ADD_BUTTON}}
      </form>
      {{ADD_RESULT}}
      <form id="fix-names-form" method="post" action="/students/fix-names">
        {{FIX_BUTTON}}
      </form>
      {{FIX_RESULT}}
      <h3>Enrolled Students</h3>
      {{ROSTER}}
    </section>
  </main>
</body>
</html>
"#;
