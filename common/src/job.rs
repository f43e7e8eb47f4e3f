use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Map,
    Reduce,
    Done,
}

/// Foto consistente del estado del job, para consultas de solo lectura.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub phase: Phase,
    pub n_map: u32,
    pub n_reduce: u32,

    /// -------- Progreso --------
    pub map_completed: u32,
    pub reduce_completed: u32,
    pub in_progress: u32,
    /// true sii todas las tareas Map y Reduce están completas
    pub done: bool,

    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
