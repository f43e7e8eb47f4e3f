use serde::{Deserialize, Serialize};

use crate::task::{TaskAssignment, TaskId, TaskKind};

pub type WorkerId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignTaskRequest {
    pub worker_id: WorkerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignTaskResponse {
    pub assignment: TaskAssignment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportStatusRequest {
    pub worker_id: WorkerId,
    pub task_id: TaskId,
    pub kind: TaskKind,
    /// false = el worker no pudo ejecutar la tarea (error de I/O, etc.)
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportStatusResponse {
    /// true si el reporte cambió el estado de la tarea.
    /// Un reporte duplicado o tardío devuelve false, no es un error.
    pub accepted: bool,
}
