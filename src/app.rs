use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/attendance", post(handlers::mark_attendance))
        .route("/report", post(handlers::view_report))
        .route("/students", post(handlers::add_student))
        .route("/students/fix-names", post(handlers::fix_student_names))
        .with_state(state)
}
