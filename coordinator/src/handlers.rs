use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use common::{
    AssignTaskRequest, AssignTaskResponse, JobInfo, ReportStatusRequest, ReportStatusResponse,
};
use tower_http::trace::TraceLayer;

use crate::registry::ReportOutcome;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/tasks/assign", post(assign_task))
        .route("/api/v1/tasks/report", post(report_status))
        .route("/api/v1/job", get(get_job))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// AssignTask: siguiente tarea según la fase, o WAIT / EXIT
async fn assign_task(
    State(state): State<AppState>,
    Json(req): Json<AssignTaskRequest>,
) -> Json<AssignTaskResponse> {
    let assignment = state.assign_task(&req.worker_id);
    Json(AssignTaskResponse { assignment })
}

// ReportStatus: un duplicado responde 200 con accepted=false;
// un id que no existe es 404
async fn report_status(
    State(state): State<AppState>,
    Json(req): Json<ReportStatusRequest>,
) -> Result<Json<ReportStatusResponse>, StatusCode> {
    match state.report_status(&req) {
        ReportOutcome::Accepted => Ok(Json(ReportStatusResponse { accepted: true })),
        ReportOutcome::Ignored(_) => Ok(Json(ReportStatusResponse { accepted: false })),
        ReportOutcome::UnknownTask => Err(StatusCode::NOT_FOUND),
    }
}

async fn get_job(State(state): State<AppState>) -> Json<JobInfo> {
    Json(state.job_info())
}
