use chrono::{DateTime, Utc};
use common::{JobInfo, Phase, TaskAssignment, TaskId, TaskKind, TaskStatus, WorkerId};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    /// Solo las tareas Map tienen archivo de entrada
    pub input_file: Option<String>,
    pub status: TaskStatus,
    /// Momento de la última asignación, para detectar stragglers
    pub assigned_at: Option<Instant>,
    /// Worker que tiene la tarea ahora mismo
    pub worker_id: Option<WorkerId>,
    pub attempts: u32,
}

impl Task {
    fn idle(id: TaskId, kind: TaskKind, input_file: Option<String>) -> Self {
        Self {
            id,
            kind,
            input_file,
            status: TaskStatus::Idle,
            assigned_at: None,
            worker_id: None,
            attempts: 0,
        }
    }

    fn reset_to_idle(&mut self) {
        self.status = TaskStatus::Idle;
        self.assigned_at = None;
        self.worker_id = None;
    }
}

/// Configuraciones de job que nunca podrían terminar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobConfigError {
    /// n_reduce = 0: la fase Reduce no podría completarse nunca
    NoReduceTasks,
    TooManyInputs(usize),
}

impl std::fmt::Display for JobConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobConfigError::NoReduceTasks => write!(f, "n_reduce debe ser >= 1"),
            JobConfigError::TooManyInputs(n) => {
                write!(f, "demasiados archivos de entrada ({n}) para ids de 32 bits")
            }
        }
    }
}

impl std::error::Error for JobConfigError {}

/// Qué pasó con un reporte de finalización.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// La tarea estaba InProgress y pasó a Completed
    Accepted,
    /// Duplicado o tardío: la tarea estaba en otro estado, no cambió nada
    Ignored(TaskStatus),
    /// No existe una tarea con ese (id, tipo)
    UnknownTask,
}

/// Dueño único del estado del job: tareas Map/Reduce, contadores y fase.
/// Todas las operaciones toman `&mut self`; la exclusión entre handlers y
/// monitor la pone el Mutex de `AppState`.
#[derive(Debug)]
pub struct TaskRegistry {
    n_map: u32,
    n_reduce: u32,
    map_tasks: Vec<Task>,
    reduce_tasks: Vec<Task>,
    phase: Phase,
    map_completed: u32,
    reduce_completed: u32,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl TaskRegistry {
    /// Crea el job con todas las tareas en Idle.
    /// Sin archivos de entrada la fase Map ya está terminada y se arranca en Reduce.
    pub fn new(files: Vec<String>, n_reduce: u32) -> Result<Self, JobConfigError> {
        if n_reduce == 0 {
            return Err(JobConfigError::NoReduceTasks);
        }
        let n_map =
            u32::try_from(files.len()).map_err(|_| JobConfigError::TooManyInputs(files.len()))?;

        let map_tasks = files
            .into_iter()
            .zip(0..n_map)
            .map(|(file, id)| Task::idle(id, TaskKind::Map, Some(file)))
            .collect();
        let reduce_tasks = (0..n_reduce)
            .map(|id| Task::idle(id, TaskKind::Reduce, None))
            .collect();

        let mut registry = Self {
            n_map,
            n_reduce,
            map_tasks,
            reduce_tasks,
            phase: Phase::Map,
            map_completed: 0,
            reduce_completed: 0,
            created_at: Utc::now(),
            finished_at: None,
        };
        registry.advance_phase();
        Ok(registry)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn n_map(&self) -> u32 {
        self.n_map
    }

    pub fn n_reduce(&self) -> u32 {
        self.n_reduce
    }

    pub fn tasks(&self, kind: TaskKind) -> &[Task] {
        match kind {
            TaskKind::Map => &self.map_tasks,
            TaskKind::Reduce => &self.reduce_tasks,
        }
    }

    fn tasks_mut(&mut self, kind: TaskKind) -> &mut [Task] {
        match kind {
            TaskKind::Map => &mut self.map_tasks,
            TaskKind::Reduce => &mut self.reduce_tasks,
        }
    }

    fn task_mut(&mut self, kind: TaskKind, id: TaskId) -> Option<&mut Task> {
        self.tasks_mut(kind).get_mut(id as usize)
    }

    pub fn task(&self, kind: TaskKind, id: TaskId) -> Option<&Task> {
        self.tasks(kind).get(id as usize)
    }

    /// Primera tarea Idle (id ascendente) del tipo pedido.
    pub fn next_idle_task(&self, kind: TaskKind) -> Option<TaskId> {
        self.tasks(kind)
            .iter()
            .find(|t| t.status == TaskStatus::Idle)
            .map(|t| t.id)
    }

    /// Idle -> InProgress. Devuelve false si la tarea no existe o ya no estaba Idle,
    /// así dos llamadas nunca reclaman la misma tarea.
    pub fn mark_in_progress(
        &mut self,
        kind: TaskKind,
        id: TaskId,
        worker_id: &str,
        now: Instant,
    ) -> bool {
        match self.task_mut(kind, id) {
            Some(task) if task.status == TaskStatus::Idle => {
                task.status = TaskStatus::InProgress;
                task.assigned_at = Some(now);
                task.worker_id = Some(worker_id.to_string());
                task.attempts += 1;
                true
            }
            _ => false,
        }
    }

    /// Solo se acepta si la tarea está InProgress. Se acepta por id,
    /// sin mirar qué intento (worker) la termina: el primero gana.
    pub fn complete_task(&mut self, id: TaskId, kind: TaskKind) -> ReportOutcome {
        let Some(task) = self.task_mut(kind, id) else {
            return ReportOutcome::UnknownTask;
        };
        if task.status != TaskStatus::InProgress {
            return ReportOutcome::Ignored(task.status);
        }
        task.status = TaskStatus::Completed;

        match kind {
            TaskKind::Map => self.map_completed += 1,
            TaskKind::Reduce => self.reduce_completed += 1,
        }
        self.advance_phase();
        ReportOutcome::Accepted
    }

    /// El worker que tiene la tarea avisa que falló: vuelve a Idle sin
    /// esperar al timeout. Un aviso de otro worker (intento viejo) se ignora.
    pub fn fail_task(&mut self, id: TaskId, kind: TaskKind, worker_id: &str) -> bool {
        match self.task_mut(kind, id) {
            Some(task)
                if task.status == TaskStatus::InProgress
                    && task.worker_id.as_deref() == Some(worker_id) =>
            {
                task.reset_to_idle();
                true
            }
            _ => false,
        }
    }

    /// Devuelve a Idle toda tarea InProgress asignada hace más de `timeout`.
    /// No toca contadores de completadas.
    pub fn revert_stragglers(&mut self, now: Instant, timeout: Duration) -> Vec<(TaskKind, TaskId)> {
        let mut reverted = Vec::new();
        for task in self.map_tasks.iter_mut().chain(self.reduce_tasks.iter_mut()) {
            if task.status != TaskStatus::InProgress {
                continue;
            }
            let expired = task
                .assigned_at
                .map(|at| now.saturating_duration_since(at) > timeout)
                .unwrap_or(true);
            if expired {
                task.reset_to_idle();
                reverted.push((task.kind, task.id));
            }
        }
        reverted
    }

    /// Predicado de fin de job: todas las tareas Map y Reduce completas.
    pub fn is_done(&self) -> bool {
        self.map_tasks
            .iter()
            .chain(self.reduce_tasks.iter())
            .all(|t| t.status == TaskStatus::Completed)
    }

    /// Arma la asignación que se le manda al worker para una tarea ya reclamada.
    pub fn assignment_for(&self, kind: TaskKind, id: TaskId) -> Option<TaskAssignment> {
        let task = self.task(kind, id)?;
        let assignment = match kind {
            TaskKind::Map => TaskAssignment::Map {
                task_id: id,
                input_file: task.input_file.clone()?,
                n_reduce: self.n_reduce,
            },
            TaskKind::Reduce => TaskAssignment::Reduce {
                task_id: id,
                n_map: self.n_map,
            },
        };
        Some(assignment)
    }

    pub fn snapshot(&self) -> JobInfo {
        let in_progress = self
            .map_tasks
            .iter()
            .chain(self.reduce_tasks.iter())
            .filter(|t| t.status == TaskStatus::InProgress)
            .count() as u32;

        JobInfo {
            phase: self.phase,
            n_map: self.n_map,
            n_reduce: self.n_reduce,
            map_completed: self.map_completed,
            reduce_completed: self.reduce_completed,
            in_progress,
            done: self.is_done(),
            created_at: self.created_at,
            finished_at: self.finished_at,
        }
    }

    // Un contador que llega a su total (incluido total = 0) avanza la fase.
    fn advance_phase(&mut self) {
        if self.phase == Phase::Map && self.map_completed == self.n_map {
            self.phase = Phase::Reduce;
        }
        if self.phase == Phase::Reduce && self.reduce_completed == self.n_reduce {
            self.phase = Phase::Done;
            self.finished_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("/data/input/pg-{i}.txt")).collect()
    }

    fn claim(reg: &mut TaskRegistry, kind: TaskKind, worker: &str) -> TaskId {
        let id = reg.next_idle_task(kind).expect("no hay tarea idle");
        assert!(reg.mark_in_progress(kind, id, worker, Instant::now()));
        id
    }

    #[test]
    fn new_job_starts_in_map_with_everything_idle() {
        let reg = TaskRegistry::new(files(3), 2).unwrap();

        assert_eq!(reg.phase(), Phase::Map);
        assert_eq!(reg.n_map(), 3);
        assert_eq!(reg.n_reduce(), 2);
        assert!(reg
            .tasks(TaskKind::Map)
            .iter()
            .chain(reg.tasks(TaskKind::Reduce))
            .all(|t| t.status == TaskStatus::Idle));
        let ids: Vec<TaskId> = reg.tasks(TaskKind::Map).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn zero_reducers_is_rejected() {
        let err = TaskRegistry::new(files(2), 0).unwrap_err();
        assert_eq!(err, JobConfigError::NoReduceTasks);
    }

    #[test]
    fn no_inputs_skips_map_phase_at_creation() {
        let reg = TaskRegistry::new(Vec::new(), 2).unwrap();
        assert_eq!(reg.phase(), Phase::Reduce);
        assert_eq!(reg.next_idle_task(TaskKind::Reduce), Some(0));
    }

    #[test]
    fn next_idle_scans_in_ascending_id_order() {
        let mut reg = TaskRegistry::new(files(3), 1).unwrap();
        assert_eq!(claim(&mut reg, TaskKind::Map, "w1"), 0);
        assert_eq!(claim(&mut reg, TaskKind::Map, "w2"), 1);
        assert_eq!(claim(&mut reg, TaskKind::Map, "w3"), 2);
        assert_eq!(reg.next_idle_task(TaskKind::Map), None);
    }

    #[test]
    fn a_task_cannot_be_claimed_twice() {
        let mut reg = TaskRegistry::new(files(1), 1).unwrap();
        let now = Instant::now();
        assert!(reg.mark_in_progress(TaskKind::Map, 0, "w1", now));
        assert!(!reg.mark_in_progress(TaskKind::Map, 0, "w2", now));
        assert_eq!(reg.task(TaskKind::Map, 0).unwrap().worker_id.as_deref(), Some("w1"));
    }

    #[test]
    fn completing_all_maps_then_all_reduces_walks_the_phases() {
        let mut reg = TaskRegistry::new(files(2), 2).unwrap();

        for _ in 0..2 {
            let id = claim(&mut reg, TaskKind::Map, "w");
            assert_eq!(reg.complete_task(id, TaskKind::Map), ReportOutcome::Accepted);
        }
        assert_eq!(reg.phase(), Phase::Reduce);
        assert!(!reg.is_done());

        let r0 = claim(&mut reg, TaskKind::Reduce, "w");
        reg.complete_task(r0, TaskKind::Reduce);
        assert_eq!(reg.phase(), Phase::Reduce);
        assert!(!reg.is_done());

        let r1 = claim(&mut reg, TaskKind::Reduce, "w");
        reg.complete_task(r1, TaskKind::Reduce);
        assert_eq!(reg.phase(), Phase::Done);
        assert!(reg.is_done());

        let info = reg.snapshot();
        assert!(info.done);
        assert!(info.finished_at.is_some());
        assert_eq!(info.map_completed, 2);
        assert_eq!(info.reduce_completed, 2);
    }

    #[test]
    fn duplicate_report_does_not_change_counters() {
        let mut reg = TaskRegistry::new(files(2), 1).unwrap();
        let id = claim(&mut reg, TaskKind::Map, "w1");

        assert_eq!(reg.complete_task(id, TaskKind::Map), ReportOutcome::Accepted);
        assert_eq!(
            reg.complete_task(id, TaskKind::Map),
            ReportOutcome::Ignored(TaskStatus::Completed)
        );

        let info = reg.snapshot();
        assert_eq!(info.map_completed, 1);
        assert_eq!(info.phase, Phase::Map);
    }

    #[test]
    fn report_for_idle_or_unknown_task_is_rejected() {
        let mut reg = TaskRegistry::new(files(1), 1).unwrap();

        assert_eq!(
            reg.complete_task(0, TaskKind::Map),
            ReportOutcome::Ignored(TaskStatus::Idle)
        );
        assert_eq!(reg.complete_task(7, TaskKind::Map), ReportOutcome::UnknownTask);
        assert_eq!(reg.complete_task(1, TaskKind::Reduce), ReportOutcome::UnknownTask);
        assert_eq!(reg.snapshot().map_completed, 0);
    }

    #[test]
    fn straggler_goes_back_to_idle_without_touching_counters() {
        let mut reg = TaskRegistry::new(files(2), 1).unwrap();
        let t0 = Instant::now();
        assert!(reg.mark_in_progress(TaskKind::Map, 0, "lento", t0));
        assert!(reg.mark_in_progress(TaskKind::Map, 1, "rapido", t0 + Duration::from_secs(8)));
        reg.complete_task(1, TaskKind::Map);

        let timeout = Duration::from_secs(10);
        assert!(reg.revert_stragglers(t0 + Duration::from_secs(5), timeout).is_empty());

        let reverted = reg.revert_stragglers(t0 + Duration::from_secs(11), timeout);
        assert_eq!(reverted, vec![(TaskKind::Map, 0)]);

        let task = reg.task(TaskKind::Map, 0).unwrap();
        assert_eq!(task.status, TaskStatus::Idle);
        assert_eq!(task.worker_id, None);
        assert_eq!(reg.task(TaskKind::Map, 1).unwrap().status, TaskStatus::Completed);
        assert_eq!(reg.snapshot().map_completed, 1);
        assert_eq!(reg.next_idle_task(TaskKind::Map), Some(0));
    }

    #[test]
    fn late_report_after_reassignment_is_accepted_once() {
        let mut reg = TaskRegistry::new(files(1), 1).unwrap();
        let t0 = Instant::now();
        reg.mark_in_progress(TaskKind::Map, 0, "w1", t0);
        reg.revert_stragglers(t0 + Duration::from_secs(11), Duration::from_secs(10));
        reg.mark_in_progress(TaskKind::Map, 0, "w2", t0 + Duration::from_secs(12));
        assert_eq!(reg.task(TaskKind::Map, 0).unwrap().attempts, 2);

        // llega primero el reporte viejo de w1: vale por id
        assert_eq!(reg.complete_task(0, TaskKind::Map), ReportOutcome::Accepted);
        // y después el de w2, que ya no tiene efecto
        assert_eq!(
            reg.complete_task(0, TaskKind::Map),
            ReportOutcome::Ignored(TaskStatus::Completed)
        );
        assert_eq!(reg.snapshot().map_completed, 1);
        assert_eq!(reg.phase(), Phase::Reduce);
    }

    #[test]
    fn failure_report_only_counts_from_current_holder() {
        let mut reg = TaskRegistry::new(files(1), 1).unwrap();
        reg.mark_in_progress(TaskKind::Map, 0, "w2", Instant::now());

        assert!(!reg.fail_task(0, TaskKind::Map, "w1"));
        assert_eq!(reg.task(TaskKind::Map, 0).unwrap().status, TaskStatus::InProgress);

        assert!(reg.fail_task(0, TaskKind::Map, "w2"));
        assert_eq!(reg.task(TaskKind::Map, 0).unwrap().status, TaskStatus::Idle);
        assert_eq!(reg.snapshot().map_completed, 0);
    }

    #[test]
    fn assignment_carries_inputs_and_counts() {
        let reg = TaskRegistry::new(files(2), 3).unwrap();
        assert_eq!(
            reg.assignment_for(TaskKind::Map, 1),
            Some(TaskAssignment::Map {
                task_id: 1,
                input_file: "/data/input/pg-1.txt".to_string(),
                n_reduce: 3,
            })
        );
        assert_eq!(
            reg.assignment_for(TaskKind::Reduce, 2),
            Some(TaskAssignment::Reduce { task_id: 2, n_map: 2 })
        );
        assert_eq!(reg.assignment_for(TaskKind::Reduce, 3), None);
    }
}
