use common::{
    AssignTaskRequest, AssignTaskResponse, ReportStatusRequest, ReportStatusResponse,
    TaskAssignment,
};
use reqwest::{Client, StatusCode};
use std::future::Future;
use tracing::warn;

use crate::error::WorkerError;

/// Las dos llamadas que el worker le hace al coordinador.
/// El transporte HTTP es una implementación; los tests usan una en memoria.
pub trait CoordinatorApi {
    fn assign_task(
        &self,
        worker_id: &str,
    ) -> impl Future<Output = Result<TaskAssignment, WorkerError>> + Send;

    /// Devuelve si el coordinador aceptó el reporte (false = duplicado o tardío).
    fn report_status(
        &self,
        req: ReportStatusRequest,
    ) -> impl Future<Output = Result<bool, WorkerError>> + Send;
}

/// Cliente HTTP contra el router del coordinador.
#[derive(Clone)]
pub struct HttpCoordinator {
    client: Client,
    base_url: String,
}

impl HttpCoordinator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl CoordinatorApi for HttpCoordinator {
    async fn assign_task(&self, worker_id: &str) -> Result<TaskAssignment, WorkerError> {
        let url = format!("{}/api/v1/tasks/assign", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&AssignTaskRequest {
                worker_id: worker_id.to_string(),
            })
            .send()
            .await
            .map_err(|e| WorkerError::connection_lost("assign_task", e))?;

        if !resp.status().is_success() {
            return Err(WorkerError::Rejected {
                call: "assign_task",
                status: resp.status().as_u16(),
            });
        }

        let body: AssignTaskResponse = resp
            .json()
            .await
            .map_err(|e| WorkerError::connection_lost("assign_task", e))?;
        Ok(body.assignment)
    }

    async fn report_status(&self, req: ReportStatusRequest) -> Result<bool, WorkerError> {
        let url = format!("{}/api/v1/tasks/report", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| WorkerError::connection_lost("report_status", e))?;

        // el coordinador no conoce la tarea: no hay nada que hacer con eso
        if resp.status() == StatusCode::NOT_FOUND {
            warn!(
                "el coordinador no reconoce {} {}, reporte descartado",
                req.kind, req.task_id
            );
            return Ok(false);
        }
        if !resp.status().is_success() {
            return Err(WorkerError::Rejected {
                call: "report_status",
                status: resp.status().as_u16(),
            });
        }

        let body: ReportStatusResponse = resp
            .json()
            .await
            .map_err(|e| WorkerError::connection_lost("report_status", e))?;
        Ok(body.accepted)
    }
}
