use common::{
    engine, MapReduceApp, ReportStatusRequest, TaskAssignment, TaskId, TaskKind, WorkerId,
};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::api::CoordinatorApi;
use crate::error::WorkerError;

/// Cuánto duerme el worker cuando el coordinador contesta WAIT.
pub const WAIT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub worker_id: WorkerId,
    /// Directorio compartido donde van intermedios y salidas
    pub work_dir: PathBuf,
    pub wait_interval: Duration,
}

/// Lo que hizo un worker hasta recibir EXIT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub maps_done: u32,
    pub reduces_done: u32,
    pub failed: u32,
}

/// Loop principal del worker.
/// - Pide una tarea al coordinador.
/// - Ejecuta Map o Reduce (en un hilo de bloqueo, es todo I/O de archivos).
/// - Reporta el resultado, éxito o fallo. Después de un fallo espera
///   `wait_interval` antes de pedir otra tarea.
/// - WAIT: duerme y vuelve a pedir. EXIT: termina.
///
/// Si una llamada al coordinador falla, devuelve el error sin reintentar.
pub async fn run_worker<C: CoordinatorApi>(
    api: &C,
    app: Arc<dyn MapReduceApp>,
    config: &WorkerConfig,
) -> Result<WorkerSummary, WorkerError> {
    let mut summary = WorkerSummary::default();

    loop {
        let assignment = api.assign_task(&config.worker_id).await?;

        let Some((kind, task_id)) = assignment.task_ref() else {
            match assignment {
                TaskAssignment::Exit => {
                    info!("worker {} recibió EXIT", config.worker_id);
                    return Ok(summary);
                }
                _ => {
                    debug!("sin tareas libres, esperando {:?}", config.wait_interval);
                    sleep(config.wait_interval).await;
                    continue;
                }
            }
        };

        info!("worker {} ejecutando {} {}", config.worker_id, kind, task_id);
        let success = match execute(assignment, app.clone(), config.work_dir.clone()).await {
            Ok(()) => {
                match kind {
                    TaskKind::Map => summary.maps_done += 1,
                    TaskKind::Reduce => summary.reduces_done += 1,
                }
                true
            }
            Err(e) => {
                warn!("error procesando {} {}: {:?}", kind, task_id, e);
                summary.failed += 1;
                false
            }
        };

        report(api, &config.worker_id, task_id, kind, success).await?;

        // la tarea vuelve a Idle y probablemente nos toque de nuevo:
        // no pedir otra hasta esperar wait_interval
        if !success {
            sleep(config.wait_interval).await;
        }
    }
}

async fn execute(
    assignment: TaskAssignment,
    app: Arc<dyn MapReduceApp>,
    work_dir: PathBuf,
) -> anyhow::Result<()> {
    let handle = tokio::task::spawn_blocking(move || match assignment {
        TaskAssignment::Map {
            task_id,
            input_file,
            n_reduce,
        } => engine::run_map_task(app.as_ref(), task_id, &input_file, n_reduce, &work_dir)
            .map(|_| ()),
        TaskAssignment::Reduce { task_id, n_map } => {
            engine::run_reduce_task(app.as_ref(), task_id, n_map, &work_dir).map(|_| ())
        }
        TaskAssignment::Wait | TaskAssignment::Exit => Ok(()),
    });

    handle.await?
}

async fn report<C: CoordinatorApi>(
    api: &C,
    worker_id: &str,
    task_id: TaskId,
    kind: TaskKind,
    success: bool,
) -> Result<(), WorkerError> {
    let accepted = api
        .report_status(ReportStatusRequest {
            worker_id: worker_id.to_string(),
            task_id,
            kind,
            success,
        })
        .await?;

    if !accepted {
        // otro intento ya la completó, o la tarea fue reasignada
        debug!("reporte de {} {} sin efecto en el coordinador", kind, task_id);
    }
    Ok(())
}
