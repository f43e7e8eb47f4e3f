use anyhow::{bail, Context, Result};
use clap::Parser;
use std::{collections::BTreeSet, net::SocketAddr, path::PathBuf};

#[derive(Parser, Debug)]
#[command(name = "coordinator")]
#[command(about = "Coordinador MapReduce: reparte tareas Map/Reduce a los workers")]
pub struct Args {
    /// Archivos de entrada o patrones glob, ej: "/data/input/pg-*.txt"
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<String>,

    /// Cantidad de tareas Reduce (buckets)
    #[arg(short = 'r', long, default_value_t = 10)]
    pub n_reduce: u32,

    /// Dirección donde escucha el servidor HTTP
    #[arg(long, env = "MR_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,
}

fn has_glob_metachars(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expande los patrones glob. Un argumento sin metacaracteres que no matchea
/// se toma tal cual (el worker reportará el error de lectura). Un patrón con
/// metacaracteres que no matchea ningún archivo es un error: el job no
/// podría terminar nunca.
/// El resultado sale ordenado y sin repetidos, así los ids de Map son estables.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<String>> {
    let mut files = BTreeSet::new();

    for pattern in patterns {
        let mut matched = false;
        if let Ok(paths) = glob::glob(pattern) {
            for entry in paths {
                let path: PathBuf =
                    entry.with_context(|| format!("error leyendo match de {pattern}"))?;
                if path.is_file() {
                    files.insert(path.to_string_lossy().to_string());
                    matched = true;
                }
            }
        }
        if !matched {
            if has_glob_metachars(pattern) {
                bail!("el patrón {pattern} no matchea ningún archivo");
            }
            files.insert(pattern.clone());
        }
    }

    Ok(files.into_iter().collect())
}
