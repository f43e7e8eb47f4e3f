pub mod api;
pub mod error;
pub mod worker;

pub use api::{CoordinatorApi, HttpCoordinator};
pub use error::WorkerError;
pub use worker::{run_worker, WorkerConfig, WorkerSummary, WAIT_INTERVAL};
