use serde::{Deserialize, Serialize};

/// Id de tarea. Único dentro de su tipo: los Map van de 0 a nMap,
/// los Reduce de 0 a nReduce.
pub type TaskId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    Map,
    Reduce,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Map => write!(f, "map"),
            TaskKind::Reduce => write!(f, "reduce"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Idle,
    InProgress,
    Completed,
}

/// Lo que el coordinador le contesta a un worker que pide trabajo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskAssignment {
    Map {
        task_id: TaskId,
        /// Ruta del archivo de entrada (en el filesystem compartido)
        input_file: String,
        n_reduce: u32,
    },
    Reduce {
        task_id: TaskId,
        n_map: u32,
    },
    /// No hay tarea libre en esta fase, pero la fase todavía no terminó.
    Wait,
    /// El job terminó.
    Exit,
}

impl TaskAssignment {
    /// (tipo, id) de la tarea asignada, si es que hay una.
    pub fn task_ref(&self) -> Option<(TaskKind, TaskId)> {
        match self {
            TaskAssignment::Map { task_id, .. } => Some((TaskKind::Map, *task_id)),
            TaskAssignment::Reduce { task_id, .. } => Some((TaskKind::Reduce, *task_id)),
            TaskAssignment::Wait | TaskAssignment::Exit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_json_uses_type_tag() {
        let a = TaskAssignment::Map {
            task_id: 3,
            input_file: "/data/input/pg-1.txt".to_string(),
            n_reduce: 10,
        };
        let v = serde_json::to_value(&a).unwrap();

        assert_eq!(v["type"], "MAP");
        assert_eq!(v["task_id"], 3);
        assert_eq!(v["n_reduce"], 10);

        let exit = serde_json::to_value(TaskAssignment::Exit).unwrap();
        assert_eq!(exit, serde_json::json!({"type": "EXIT"}));
    }

    #[test]
    fn task_ref_only_for_real_tasks() {
        assert_eq!(
            TaskAssignment::Reduce { task_id: 1, n_map: 4 }.task_ref(),
            Some((TaskKind::Reduce, 1))
        );
        assert_eq!(TaskAssignment::Wait.task_ref(), None);
        assert_eq!(TaskAssignment::Exit.task_ref(), None);
    }
}
