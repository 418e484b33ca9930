use crate::client::ApiReply;
use crate::cycle::{self, Control, Outcome, Tier};
use crate::errors::AppError;
use crate::models::{self, AddStudentForm, FixNamesReply, NewStudent, ReportForm, TabQuery};
use crate::regions::Region;
use crate::report;
use crate::roster;
use crate::state::AppState;
use crate::ui::{self, Tab};
use crate::visitor::{self, Visitor, VisitorKey};
use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{Html, IntoResponse, Response},
    Form,
};
use std::sync::Arc;
use tracing::info;

type FormResult<T> = Result<Form<T>, FormRejection>;

/// A rendered page, plus the visitor cookie when this browser is new.
pub struct Page {
    html: String,
    set_cookie: Option<String>,
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        match self.set_cookie {
            Some(cookie) => ([(SET_COOKIE, cookie)], Html(self.html)).into_response(),
            None => Html(self.html).into_response(),
        }
    }
}

/// The browser behind one request: its own controls and regions, and the
/// cookie to forward upstream.
struct Visit {
    key: VisitorKey,
    visitor: Arc<Visitor>,
    cookie: Option<String>,
}

impl Visit {
    async fn open(state: &AppState, headers: &HeaderMap) -> Self {
        let key = VisitorKey::from_headers(headers);
        let visitor = state.visitor(&key).await;
        let cookie = state.upstream_cookie(visitor::browser_cookies(headers).as_deref());
        Self {
            key,
            visitor,
            cookie,
        }
    }

    fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    fn page(&self, state: &AppState, tab: Tab, overrides: &[(Region, Outcome)]) -> Page {
        Page {
            html: ui::render_page(&state.session, &self.visitor, tab, overrides),
            set_cookie: self.key.set_cookie(),
        }
    }

    /// Publishes a locally detected problem; no request is made.
    fn reject(
        &self,
        state: &AppState,
        tab: Tab,
        region: Region,
        message: impl Into<String>,
    ) -> Page {
        let outcome = Outcome::validation(message);
        self.visitor.regions.publish(region, outcome.clone());
        self.page(state, tab, &[(region, outcome)])
    }
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<TabQuery>,
    headers: HeaderMap,
) -> Page {
    let visit = Visit::open(&state, &headers).await;
    let synced = roster::sync(&state, &visit.visitor, visit.cookie()).await;
    visit.page(
        &state,
        Tab::parse(query.tab.as_deref()),
        &roster::overrides(synced),
    )
}

pub async fn mark_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: FormResult<Vec<(String, String)>>,
) -> Result<Page, AppError> {
    let Form(fields) = form.map_err(|err| AppError::bad_request(err.body_text()))?;
    let visit = Visit::open(&state, &headers).await;
    let region = Region::MarkResult;

    let submission = match models::collect_submission(&fields) {
        Ok(submission) => submission,
        Err(message) => return Ok(visit.reject(&state, Tab::Mark, region, message)),
    };
    info!(
        "marking {} students for {} in {}",
        submission.entries.len(),
        submission.faculty_id,
        submission.course_id
    );

    let (outcome, _) = cycle::run(
        &visit.visitor.controls,
        &visit.visitor.regions,
        Some(Control::MarkAttendance),
        region,
        state.client.mark_attendance(&submission, visit.cookie()),
        interpret_mark,
    )
    .await;

    Ok(visit.page(&state, Tab::Mark, &[(region, outcome)]))
}

pub async fn view_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: FormResult<ReportForm>,
) -> Result<Page, AppError> {
    let Form(form) = form.map_err(|err| AppError::bad_request(err.body_text()))?;
    let visit = Visit::open(&state, &headers).await;
    let region = Region::ReportResult;

    let enroll_no = form.enroll_no.trim();
    if enroll_no.is_empty() {
        return Ok(visit.reject(
            &state,
            Tab::Report,
            region,
            "Please enter a student enrollment number",
        ));
    }

    let (outcome, _) = cycle::run(
        &visit.visitor.controls,
        &visit.visitor.regions,
        Some(Control::GetReport),
        region,
        state.client.report(enroll_no, visit.cookie()),
        report::interpret,
    )
    .await;

    Ok(visit.page(&state, Tab::Report, &[(region, outcome)]))
}

pub async fn add_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: FormResult<AddStudentForm>,
) -> Result<Page, AppError> {
    let Form(form) = form.map_err(|err| AppError::bad_request(err.body_text()))?;
    let visit = Visit::open(&state, &headers).await;
    let region = Region::AddStudentResult;

    let student = NewStudent {
        enroll_no: form.new_enroll_no.trim(),
        name: form.new_student_name.trim(),
    };
    if student.enroll_no.is_empty() || student.name.is_empty() {
        return Ok(visit.reject(&state, Tab::Manage, region, "Please fill in all fields"));
    }

    let (outcome, _) = cycle::run(
        &visit.visitor.controls,
        &visit.visitor.regions,
        Some(Control::AddStudent),
        region,
        state.client.add_student(&student, visit.cookie()),
        |reply| interpret_message(reply, "Student added", "Failed to add student"),
    )
    .await;

    let overrides = after_mutation(&state, &visit, region, outcome).await;
    Ok(visit.page(&state, Tab::Manage, &overrides))
}

pub async fn fix_student_names(State(state): State<AppState>, headers: HeaderMap) -> Page {
    let visit = Visit::open(&state, &headers).await;
    let region = Region::FixNamesResult;
    let (outcome, _) = cycle::run(
        &visit.visitor.controls,
        &visit.visitor.regions,
        Some(Control::FixNames),
        region,
        state.client.fix_student_names(visit.cookie()),
        interpret_fix_names,
    )
    .await;

    let overrides = after_mutation(&state, &visit, region, outcome).await;
    visit.page(&state, Tab::Manage, &overrides)
}

/// A successful change to the student set refreshes both roster views.
async fn after_mutation(
    state: &AppState,
    visit: &Visit,
    region: Region,
    outcome: Outcome,
) -> Vec<(Region, Outcome)> {
    let refresh = matches!(outcome, Outcome::Success(_));
    let mut overrides = vec![(region, outcome)];
    if refresh {
        let synced = roster::sync(state, &visit.visitor, visit.cookie()).await;
        overrides.extend(roster::overrides(synced));
    }
    overrides
}

fn interpret_mark(reply: ApiReply) -> Outcome {
    interpret_message(
        reply,
        "Attendance marked successfully!",
        "Failed to mark attendance",
    )
}

fn interpret_message(reply: ApiReply, success_fallback: &str, error_fallback: &str) -> Outcome {
    if reply.is_success() {
        let message = cycle::message_or(&reply, success_fallback);
        Outcome::success(ui::success_message(&message, &[]))
    } else {
        Outcome::application(cycle::message_or(&reply, error_fallback))
    }
}

fn interpret_fix_names(reply: ApiReply) -> Outcome {
    if !reply.is_success() {
        return Outcome::application(cycle::message_or(&reply, "Failed to fix names"));
    }
    let fixed: FixNamesReply = match serde_json::from_value(reply.body) {
        Ok(fixed) => fixed,
        Err(err) => {
            return Outcome::Failed {
                tier: Tier::Network,
                message: format!("malformed response: {err}"),
            };
        }
    };
    let lines: Vec<(String, String)> = fixed.updated.into_iter().collect();
    Outcome::success(ui::success_message(&fixed.message, &lines))
}
