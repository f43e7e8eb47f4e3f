use common::{JobInfo, ReportStatusRequest, TaskAssignment, TaskId, TaskKind};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

use crate::registry::{ReportOutcome, TaskRegistry};
use crate::scheduler;

#[derive(Clone)]
pub struct AppState {
    // único lock del coordinador: todo el estado del job vive acá
    registry: Arc<Mutex<TaskRegistry>>,
}

impl AppState {
    pub fn new(registry: TaskRegistry) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
        }
    }

    /// Un panic dentro de una sección crítica no deja el registro a medias
    /// (cada operación es atómica), así que se puede seguir usando.
    pub fn registry(&self) -> MutexGuard<'_, TaskRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn assign_task(&self, worker_id: &str) -> TaskAssignment {
        let assignment = scheduler::assign_task(&mut self.registry(), worker_id, Instant::now());

        match &assignment {
            TaskAssignment::Map { task_id, input_file, .. } => {
                info!("asignando map {} ({}) al worker {}", task_id, input_file, worker_id)
            }
            TaskAssignment::Reduce { task_id, .. } => {
                info!("asignando reduce {} al worker {}", task_id, worker_id)
            }
            TaskAssignment::Wait => debug!("worker {} pidió tarea, tiene que esperar", worker_id),
            TaskAssignment::Exit => debug!("worker {} pidió tarea, el job terminó", worker_id),
        }
        assignment
    }

    /// ReportStatus. Devuelve si el reporte cambió algo.
    pub fn report_status(&self, req: &ReportStatusRequest) -> ReportOutcome {
        let mut registry = self.registry();

        if !req.success {
            return if registry.fail_task(req.task_id, req.kind, &req.worker_id) {
                warn!(
                    "worker {} reportó fallo en {} {}, vuelve a Idle",
                    req.worker_id, req.kind, req.task_id
                );
                ReportOutcome::Accepted
            } else {
                match registry.task(req.kind, req.task_id) {
                    Some(task) => ReportOutcome::Ignored(task.status),
                    None => ReportOutcome::UnknownTask,
                }
            };
        }

        let outcome = registry.complete_task(req.task_id, req.kind);
        match outcome {
            ReportOutcome::Accepted => {
                let info = registry.snapshot();
                info!(
                    "{} {} completada por {} (map {}/{}, reduce {}/{}, fase {:?})",
                    req.kind,
                    req.task_id,
                    req.worker_id,
                    info.map_completed,
                    info.n_map,
                    info.reduce_completed,
                    info.n_reduce,
                    info.phase
                );
            }
            ReportOutcome::Ignored(status) => debug!(
                "reporte repetido de {} {} por {} (estado {:?}), se ignora",
                req.kind, req.task_id, req.worker_id, status
            ),
            ReportOutcome::UnknownTask => warn!(
                "worker {} reportó {} {} que no existe",
                req.worker_id, req.kind, req.task_id
            ),
        }
        outcome
    }

    /// Una pasada del monitor de stragglers.
    pub fn revert_stragglers(&self, now: Instant, timeout: Duration) -> Vec<(TaskKind, TaskId)> {
        let reverted = self.registry().revert_stragglers(now, timeout);
        for (kind, id) in &reverted {
            warn!("{} {} superó el timeout de {:?}, vuelve a Idle", kind, id, timeout);
        }
        reverted
    }

    pub fn is_done(&self) -> bool {
        self.registry().is_done()
    }

    pub fn job_info(&self) -> JobInfo {
        self.registry().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, thread};

    fn state(n_map: usize, n_reduce: u32) -> AppState {
        let files = (0..n_map).map(|i| format!("in-{i}.txt")).collect();
        AppState::new(TaskRegistry::new(files, n_reduce).unwrap())
    }

    fn report(worker: &str, task_id: TaskId, kind: TaskKind, success: bool) -> ReportStatusRequest {
        ReportStatusRequest {
            worker_id: worker.to_string(),
            task_id,
            kind,
            success,
        }
    }

    #[test]
    fn concurrent_requests_never_share_a_task() {
        let st = state(50, 1);

        let handles: Vec<_> = (0..8)
            .map(|w| {
                let st = st.clone();
                thread::spawn(move || {
                    let mut mine = Vec::new();
                    loop {
                        match st.assign_task(&format!("w{w}")) {
                            TaskAssignment::Map { task_id, .. } => mine.push(task_id),
                            _ => break,
                        }
                    }
                    mine
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id), "map {id} asignada dos veces");
            }
        }
        assert_eq!(seen.len(), 50);
    }

    #[test]
    fn success_report_is_idempotent() {
        let st = state(1, 1);
        st.assign_task("w1");

        assert_eq!(st.report_status(&report("w1", 0, TaskKind::Map, true)), ReportOutcome::Accepted);
        let before = st.job_info();
        assert_eq!(
            st.report_status(&report("w1", 0, TaskKind::Map, true)),
            ReportOutcome::Ignored(common::TaskStatus::Completed)
        );
        let after = st.job_info();

        assert_eq!(before.map_completed, after.map_completed);
        assert_eq!(before.reduce_completed, after.reduce_completed);
        assert_eq!(before.phase, after.phase);
    }

    #[test]
    fn failure_report_makes_task_assignable_again() {
        let st = state(1, 1);
        st.assign_task("w1");
        assert_eq!(st.assign_task("w2"), TaskAssignment::Wait);

        assert_eq!(st.report_status(&report("w1", 0, TaskKind::Map, false)), ReportOutcome::Accepted);
        assert!(matches!(st.assign_task("w2"), TaskAssignment::Map { task_id: 0, .. }));
    }

    #[test]
    fn done_only_when_every_task_completed() {
        let st = state(2, 2);
        let mut guard = 0;
        while !st.is_done() {
            guard += 1;
            assert!(guard < 20, "el job no termina");
            assert!(!st.job_info().done);
            match st.assign_task("w") {
                TaskAssignment::Map { task_id, .. } => {
                    st.report_status(&report("w", task_id, TaskKind::Map, true));
                }
                TaskAssignment::Reduce { task_id, .. } => {
                    st.report_status(&report("w", task_id, TaskKind::Reduce, true));
                }
                other => panic!("asignación inesperada: {other:?}"),
            }
        }
        assert!(st.job_info().done);
        assert_eq!(st.assign_task("w"), TaskAssignment::Exit);
    }
}
