use anyhow::{anyhow, Result};
use clap::Parser;
use common::{app_by_name, app_names};
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use worker::{run_worker, HttpCoordinator, WorkerConfig, WAIT_INTERVAL};

#[derive(Parser)]
#[command(name = "worker")]
#[command(about = "Worker MapReduce: pide tareas al coordinador hasta que el job termina")]
struct Args {
    /// Aplicación a ejecutar (wc, indexer)
    #[arg(value_name = "APP")]
    app: String,

    /// URL base del coordinador
    /// - En Docker: COORDINATOR_URL=http://coordinator:8080
    /// - Local: http://localhost:8080
    #[arg(long, env = "COORDINATOR_URL", default_value = "http://localhost:8080")]
    coordinator_url: String,

    /// Directorio compartido para archivos intermedios y de salida
    #[arg(long, env = "MR_WORK_DIR", default_value = ".")]
    work_dir: PathBuf,
}

// hostname + uuid: varios workers en la misma máquina no chocan
fn worker_id() -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "worker".to_string());
    format!("{}-{}", host, uuid::Uuid::new_v4())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("worker=debug,common=debug,reqwest=info")),
        )
        .init();

    let args = Args::parse();
    let app = app_by_name(&args.app).ok_or_else(|| {
        anyhow!(
            "aplicación desconocida '{}', opciones: {}",
            args.app,
            app_names().join(", ")
        )
    })?;

    let config = WorkerConfig {
        worker_id: worker_id(),
        work_dir: args.work_dir,
        wait_interval: WAIT_INTERVAL,
    };
    info!(
        "worker {} ({}) contra {}",
        config.worker_id,
        app.name(),
        args.coordinator_url
    );

    let api = HttpCoordinator::new(args.coordinator_url);
    match run_worker(&api, Arc::from(app), &config).await {
        Ok(summary) => {
            info!(
                "job terminado: {} map, {} reduce, {} fallidas",
                summary.maps_done, summary.reduces_done, summary.failed
            );
            Ok(())
        }
        // el coordinador se fue (normalmente porque el job ya terminó): salida controlada
        Err(e) if e.is_connection_lost() => {
            warn!("{}, el worker termina", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
