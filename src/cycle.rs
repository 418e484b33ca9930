use crate::client::ApiReply;
use crate::errors::ClientError;
use crate::regions::{Region, RegionBoard};
use maud::{html, Markup};
use std::{
    collections::HashSet,
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{error, warn};

/// Where a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Rejected before any request was sent.
    Validation,
    /// The backend answered with a non-success status.
    Application,
    /// The request never completed, or its body could not be read.
    Network,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Application => "application",
            Self::Network => "network",
        }
    }
}

/// What a result region shows after one cycle. Markup variants hold
/// already-escaped HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    View(String),
    Success(String),
    Info(String),
    Failed { tier: Tier, message: String },
}

impl Outcome {
    pub fn view(markup: Markup) -> Self {
        Self::View(markup.into_string())
    }

    pub fn success(markup: Markup) -> Self {
        Self::Success(markup.into_string())
    }

    pub fn info(markup: Markup) -> Self {
        Self::Info(markup.into_string())
    }

    pub fn info_text(text: &str) -> Self {
        Self::info(html! { (text) })
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Failed {
            tier: Tier::Validation,
            message: message.into(),
        }
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::Failed {
            tier: Tier::Application,
            message: message.into(),
        }
    }

    pub fn network(err: &ClientError) -> Self {
        Self::Failed {
            tier: Tier::Network,
            message: err.to_string(),
        }
    }

    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::Failed { tier, .. } => Some(*tier),
            _ => None,
        }
    }
}

/// A button that starts a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    MarkAttendance,
    GetReport,
    AddStudent,
    FixNames,
}

impl Control {
    pub fn idle_label(self) -> &'static str {
        match self {
            Self::MarkAttendance => "Submit Attendance",
            Self::GetReport => "Get Report",
            Self::AddStudent => "Add Student",
            Self::FixNames => "Fix Student Names",
        }
    }

    pub fn busy_label(self) -> &'static str {
        match self {
            Self::MarkAttendance => "Submitting...",
            Self::GetReport => "Loading...",
            Self::AddStudent => "Adding...",
            Self::FixNames => "Fixing names...",
        }
    }
}

/// Tracks which controls have a request in flight.
#[derive(Default)]
pub struct ControlPanel {
    busy: Mutex<HashSet<Control>>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables the control until the returned guard drops, or returns `None`
    /// if it is already disabled.
    pub fn acquire(self: &Arc<Self>, control: Control) -> Option<BusyGuard> {
        if !self.lock().insert(control) {
            return None;
        }
        Some(BusyGuard {
            panel: Arc::clone(self),
            control,
        })
    }

    pub fn is_busy(&self, control: Control) -> bool {
        self.lock().contains(&control)
    }

    pub fn label(&self, control: Control) -> &'static str {
        if self.is_busy(control) {
            control.busy_label()
        } else {
            control.idle_label()
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Control>> {
        self.busy.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Re-enables its control on drop, whichever way the cycle ended.
pub struct BusyGuard {
    panel: Arc<ControlPanel>,
    control: Control,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.panel.lock().remove(&self.control);
    }
}

pub fn message_or(reply: &ApiReply, fallback: &str) -> String {
    reply.message().unwrap_or(fallback).to_string()
}

/// Runs dispatch, interpret and finalize for one action. The request future is
/// only polled once the control has been acquired, so a rejected submission
/// never reaches the network. Returns the outcome along with whether it was
/// published.
pub async fn run<F>(
    controls: &Arc<ControlPanel>,
    board: &RegionBoard,
    control: Option<Control>,
    region: Region,
    dispatch: F,
    interpret: impl FnOnce(ApiReply) -> Outcome,
) -> (Outcome, bool)
where
    F: Future<Output = Result<ApiReply, ClientError>>,
{
    run_recovering(controls, board, control, region, dispatch, interpret, Outcome::network).await
}

/// Like [`run`], with a region-specific rendering of transport failures.
pub async fn run_recovering<F>(
    controls: &Arc<ControlPanel>,
    board: &RegionBoard,
    control: Option<Control>,
    region: Region,
    dispatch: F,
    interpret: impl FnOnce(ApiReply) -> Outcome,
    recover: impl FnOnce(&ClientError) -> Outcome,
) -> (Outcome, bool)
where
    F: Future<Output = Result<ApiReply, ClientError>>,
{
    let _guard = match control {
        Some(control) => match controls.acquire(control) {
            Some(guard) => Some(guard),
            None => {
                warn!("{control:?} already in flight, rejecting resubmission");
                return (
                    Outcome::validation("This request is already in progress"),
                    false,
                );
            }
        },
        None => None,
    };

    let ticket = board.begin(region);
    let outcome = match dispatch.await {
        Ok(reply) => {
            if !reply.is_success() {
                warn!("{} failed with {}", region.id(), reply.status);
            }
            interpret(reply)
        }
        Err(err) => {
            error!("{} request failed: {err}", region.id());
            recover(&err)
        }
    };

    let published = board.commit(ticket, outcome.clone());
    (outcome, published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn reply(status: StatusCode, body: serde_json::Value) -> Result<ApiReply, ClientError> {
        Ok(ApiReply { status, body })
    }

    fn interpret_message(reply: ApiReply) -> Outcome {
        if reply.is_success() {
            Outcome::info_text(&message_or(&reply, "done"))
        } else {
            Outcome::application(message_or(&reply, "failed"))
        }
    }

    #[tokio::test]
    async fn success_is_published_and_control_released() {
        let controls = Arc::new(ControlPanel::new());
        let board = RegionBoard::new();

        let (outcome, published) = run(
            &controls,
            &board,
            Some(Control::MarkAttendance),
            Region::MarkResult,
            async { reply(StatusCode::OK, json!({ "message": "ok" })) },
            interpret_message,
        )
        .await;

        assert!(published);
        assert_eq!(outcome, Outcome::info_text("ok"));
        assert_eq!(board.shown(Region::MarkResult), Some(outcome));
        assert!(!controls.is_busy(Control::MarkAttendance));
    }

    #[tokio::test]
    async fn server_errors_use_payload_message_or_fallback() {
        let controls = Arc::new(ControlPanel::new());
        let board = RegionBoard::new();

        let (with_message, _) = run(
            &controls,
            &board,
            None,
            Region::ReportResult,
            async { reply(StatusCode::NOT_FOUND, json!({ "message": "Student missing" })) },
            interpret_message,
        )
        .await;
        assert_eq!(with_message, Outcome::application("Student missing"));

        let (fallback, _) = run(
            &controls,
            &board,
            None,
            Region::ReportResult,
            async { reply(StatusCode::INTERNAL_SERVER_ERROR, json!({})) },
            interpret_message,
        )
        .await;
        assert_eq!(fallback, Outcome::application("failed"));
    }

    #[tokio::test]
    async fn transport_failures_are_network_tier_and_release_control() {
        let controls = Arc::new(ControlPanel::new());
        let board = RegionBoard::new();

        let (outcome, _) = run(
            &controls,
            &board,
            Some(Control::GetReport),
            Region::ReportResult,
            async {
                Err(ClientError::Decode {
                    status: 200,
                    reason: "expected value".to_string(),
                })
            },
            interpret_message,
        )
        .await;

        assert_eq!(outcome.tier(), Some(Tier::Network));
        assert!(!controls.is_busy(Control::GetReport));
        assert_eq!(controls.label(Control::GetReport), "Get Report");
    }

    #[tokio::test]
    async fn busy_control_rejects_without_dispatching() {
        let controls = Arc::new(ControlPanel::new());
        let board = RegionBoard::new();
        let guard = controls.acquire(Control::AddStudent).unwrap();
        assert_eq!(controls.label(Control::AddStudent), "Adding...");

        let mut dispatched = false;
        let (outcome, published) = run(
            &controls,
            &board,
            Some(Control::AddStudent),
            Region::AddStudentResult,
            async {
                dispatched = true;
                reply(StatusCode::OK, json!({}))
            },
            interpret_message,
        )
        .await;

        assert!(!dispatched);
        assert!(!published);
        assert_eq!(outcome.tier(), Some(Tier::Validation));
        assert!(controls.is_busy(Control::AddStudent));

        drop(guard);
        assert!(!controls.is_busy(Control::AddStudent));
    }
}
