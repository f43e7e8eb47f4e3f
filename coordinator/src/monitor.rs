use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::info;

use crate::state::AppState;
use crate::{MONITOR_INTERVAL, TASK_TIMEOUT};

/// Loop de tolerancia a fallos: cada MONITOR_INTERVAL devuelve a Idle las
/// tareas que llevan más de TASK_TIMEOUT en vuelo (worker caído o colgado).
/// Es el único mecanismo de recuperación; no hay heartbeats.
pub async fn run_straggler_monitor(state: AppState) {
    loop {
        sleep(MONITOR_INTERVAL).await;
        sweep_once(&state, Instant::now(), TASK_TIMEOUT);
        if state.is_done() {
            info!("job terminado, se detiene el monitor de stragglers");
            return;
        }
    }
}

/// Una pasada de chequeo. Devuelve cuántas tareas se reencolaron.
pub fn sweep_once(state: &AppState, now: Instant, timeout: Duration) -> usize {
    state.revert_stragglers(now, timeout).len()
}

/// Espera hasta que el predicado de fin de job sea verdadero.
pub async fn wait_until_done(state: AppState, poll: Duration) {
    while !state.is_done() {
        sleep(poll).await;
    }
}
