use anyhow::{bail, Context, Result};
use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::app::MapReduceApp;
use crate::shuffle::{
    output_file_name, partition, publish_atomically, read_intermediate, write_intermediate,
};
use crate::task::TaskId;

/// Resultado de una tarea Map: qué buckets quedaron publicados.
#[derive(Debug, Clone)]
pub struct MapOutcome {
    pub records: usize,
    pub published: Vec<PathBuf>,
}

/// Ejecuta una tarea Map completa:
/// 1. Lee todo `input_file`.
/// 2. Llama a la función map de la app.
/// 3. Reparte por hash(key) % n_reduce.
/// 4. Publica cada bucket no vacío como `mr-<task>-<bucket>` en `work_dir`.
pub fn run_map_task(
    app: &dyn MapReduceApp,
    task_id: TaskId,
    input_file: &str,
    n_reduce: u32,
    work_dir: &Path,
) -> Result<MapOutcome> {
    if n_reduce == 0 {
        bail!("tarea map {task_id}: n_reduce debe ser >= 1");
    }

    let contents = fs::read_to_string(input_file)
        .with_context(|| format!("tarea map {task_id}: no se pudo leer {input_file}"))?;

    let records = app.map(input_file, &contents);
    let total = records.len();

    let mut published = Vec::new();
    for (bucket, kvs) in partition(records, n_reduce).into_iter().enumerate() {
        // Bucket vacío: no se escribe nada, el Reduce lo tolera.
        if kvs.is_empty() {
            continue;
        }
        let path = write_intermediate(work_dir, task_id, bucket as u32, &kvs)
            .with_context(|| format!("tarea map {task_id}: error publicando bucket {bucket}"))?;
        published.push(path);
    }

    debug!(
        "map {} terminó: {} registros en {} buckets",
        task_id,
        total,
        published.len()
    );

    Ok(MapOutcome {
        records: total,
        published,
    })
}

/// Ejecuta la tarea Reduce `task_id`:
/// lee `mr-<m>-<task_id>` para cada m en 0..n_map (los que falten se ignoran),
/// agrupa por clave, ordena y escribe `mr-out-<task_id>` con líneas "clave resultado".
pub fn run_reduce_task(
    app: &dyn MapReduceApp,
    task_id: TaskId,
    n_map: u32,
    work_dir: &Path,
) -> Result<PathBuf> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for map_task in 0..n_map {
        let kvs = read_intermediate(work_dir, map_task, task_id).with_context(|| {
            format!("tarea reduce {task_id}: no se pudo leer salida de map {map_task}")
        })?;
        for kv in kvs {
            groups.entry(kv.key).or_default().push(kv.value);
        }
    }

    let output_path = work_dir.join(output_file_name(task_id));
    publish_atomically(&output_path, |w| {
        // BTreeMap ya itera las claves en orden ascendente
        for (key, values) in &groups {
            let result = app.reduce(key, values);
            writeln!(w, "{} {}", key, result)?;
        }
        Ok(())
    })
    .with_context(|| format!("tarea reduce {task_id}: error escribiendo {}", output_path.display()))?;

    debug!("reduce {} terminó: {} claves", task_id, groups.len());
    Ok(output_path)
}
