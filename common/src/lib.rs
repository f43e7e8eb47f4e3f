pub mod app;
pub mod engine;
pub mod indexer;
pub mod job;
pub mod shuffle;
pub mod task;
pub mod wordcount;
pub mod worker;

pub use app::{app_by_name, app_names, MapReduceApp};
pub use job::{JobInfo, Phase};
pub use shuffle::KeyValue;
pub use task::{TaskAssignment, TaskId, TaskKind, TaskStatus};
pub use worker::{
    AssignTaskRequest, AssignTaskResponse, ReportStatusRequest, ReportStatusResponse, WorkerId,
};
