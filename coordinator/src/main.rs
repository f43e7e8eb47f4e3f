use anyhow::{Context, Result};
use clap::Parser;
use coordinator::{
    config::{expand_inputs, Args},
    handlers, monitor, AppState, TaskRegistry, MONITOR_INTERVAL, SHUTDOWN_GRACE,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coordinator=debug,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let files = expand_inputs(&args.inputs)?;

    let registry = TaskRegistry::new(files, args.n_reduce).context("configuración de job inválida")?;
    info!(
        "job creado: {} tareas map, {} tareas reduce",
        registry.n_map(),
        registry.n_reduce()
    );
    let state = AppState::new(registry);

    // router HTTP
    let app = handlers::build_router(state.clone());

    // monitor de stragglers en segundo plano
    tokio::spawn(monitor::run_straggler_monitor(state.clone()));

    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", args.listen))?;
    info!("coordinador escuchando en {}", listener.local_addr()?);

    let done_state = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            monitor::wait_until_done(done_state, MONITOR_INTERVAL).await;
            info!("job terminado, cerrando en {:?}", SHUTDOWN_GRACE);
            tokio::time::sleep(SHUTDOWN_GRACE).await;
        })
        .await?;

    let job = state.job_info();
    info!(
        "listo: map {}/{}, reduce {}/{}",
        job.map_completed, job.n_map, job.reduce_completed, job.n_reduce
    );
    Ok(())
}
