use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use common::JobInfo;
use reqwest::Client;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "CLI simple para consultar al coordinador")]
struct Cli {
    /// - En Docker: COORDINATOR_URL=http://coordinator:8080
    /// - Local: default http://localhost:8080
    #[arg(long, env = "COORDINATOR_URL", default_value = "http://localhost:8080")]
    coordinator_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Muestra fase y progreso del job
    Status,
    /// Espera hasta que el job termine
    Wait {
        /// Segundos entre consultas
        #[arg(long, default_value_t = 1)]
        interval: u64,
    },
}

async fn fetch_job(client: &Client, base_url: &str) -> Result<JobInfo> {
    let url = format!("{}/api/v1/job", base_url.trim_end_matches('/'));
    let resp = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("no se pudo contactar al coordinador en {base_url}"))?;

    if !resp.status().is_success() {
        bail!("el coordinador devolvió status {}", resp.status());
    }
    Ok(resp.json().await?)
}

fn print_job(job: &JobInfo) {
    println!("Job:");
    println!("  fase: {:?}", job.phase);
    println!("  map: {}/{}", job.map_completed, job.n_map);
    println!("  reduce: {}/{}", job.reduce_completed, job.n_reduce);
    println!("  en vuelo: {}", job.in_progress);
    println!("  terminado: {}", job.done);
    println!("  creado: {}", job.created_at);
    if let Some(finished) = job.finished_at {
        println!("  finalizado: {}", finished);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Status => {
            let job = fetch_job(&client, &cli.coordinator_url).await?;
            print_job(&job);
        }
        Commands::Wait { interval } => loop {
            let job = fetch_job(&client, &cli.coordinator_url).await?;
            if job.done {
                print_job(&job);
                break;
            }
            println!(
                "fase {:?}: map {}/{}, reduce {}/{}",
                job.phase, job.map_completed, job.n_map, job.reduce_completed, job.n_reduce
            );
            tokio::time::sleep(Duration::from_secs(interval.max(1))).await;
        },
    }

    Ok(())
}
