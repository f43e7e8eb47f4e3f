use common::{Phase, TaskAssignment, TaskKind};
use std::time::Instant;

use crate::registry::TaskRegistry;

/// AssignTask: la fase decide qué tipo de tarea se reparte.
/// - Map / Reduce: primera tarea Idle de ese tipo, o Wait si quedan en vuelo.
/// - Done: Exit.
pub fn assign_task(registry: &mut TaskRegistry, worker_id: &str, now: Instant) -> TaskAssignment {
    let kind = match registry.phase() {
        Phase::Map => TaskKind::Map,
        Phase::Reduce => TaskKind::Reduce,
        Phase::Done => return TaskAssignment::Exit,
    };

    let Some(id) = registry.next_idle_task(kind) else {
        return TaskAssignment::Wait;
    };
    if !registry.mark_in_progress(kind, id, worker_id, now) {
        return TaskAssignment::Wait;
    }

    registry
        .assignment_for(kind, id)
        .unwrap_or(TaskAssignment::Wait)
}
