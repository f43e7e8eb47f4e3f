pub mod config;
pub mod handlers;
pub mod monitor;
pub mod registry;
pub mod scheduler;
pub mod state;

use std::time::Duration;

pub use registry::{JobConfigError, ReportOutcome, TaskRegistry};
pub use state::AppState;

/// Tiempo máximo que una tarea puede estar InProgress antes de reasignarla.
pub const TASK_TIMEOUT: Duration = Duration::from_secs(10);
/// Cada cuánto corre el monitor de stragglers (tiene que ser < TASK_TIMEOUT).
pub const MONITOR_INTERVAL: Duration = Duration::from_secs(1);
/// Tiempo que se sigue atendiendo después del fin del job, para que los
/// workers que están esperando reciban EXIT.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);
