use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::task::TaskId;

/// Par (clave, valor) que emite Map y consume Reduce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/* =========================
   Particionado
   ========================= */

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// FNV-1a de 32 bits sobre los bytes UTF-8 de la clave, enmascarado a 31 bits.
/// Tiene que dar lo mismo en cualquier implementación de worker, por eso no
/// se usa el hasher por defecto de std (ni la variante de 64 bits).
pub fn ihash(key: &str) -> u32 {
    let h = key
        .as_bytes()
        .iter()
        .fold(FNV32_OFFSET_BASIS, |h, b| (h ^ u32::from(*b)).wrapping_mul(FNV32_PRIME));
    h & 0x7fff_ffff
}

/// Bucket (= id de tarea Reduce) al que va una clave.
pub fn bucket_for(key: &str, n_reduce: u32) -> u32 {
    ihash(key) % n_reduce
}

/// Reparte registros en `n_reduce` buckets, conservando el orden de emisión.
pub fn partition(records: Vec<KeyValue>, n_reduce: u32) -> Vec<Vec<KeyValue>> {
    let mut buckets: Vec<Vec<KeyValue>> = vec![Vec::new(); n_reduce as usize];
    for kv in records {
        let b = bucket_for(&kv.key, n_reduce) as usize;
        buckets[b].push(kv);
    }
    buckets
}

/* =========================
   Nombres en disco
   ========================= */

pub fn intermediate_file_name(map_task: TaskId, bucket: u32) -> String {
    format!("mr-{}-{}", map_task, bucket)
}

pub fn output_file_name(reduce_task: TaskId) -> String {
    format!("mr-out-{}", reduce_task)
}

/* =========================
   Escritura atómica
   ========================= */

/// Escribe a un archivo temporal privado en el mismo directorio y lo publica
/// con rename solo después del flush. Si el proceso muere antes, no queda
/// nada visible bajo `final_path`.
pub fn publish_atomically<F>(final_path: &Path, write_body: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let dir = final_path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)?;
    }

    let file_name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp_path = dir.join(format!(".{}.tmp-{}", file_name, uuid::Uuid::new_v4()));

    let result = (|| {
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        write_body(&mut writer)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        fs::rename(&tmp_path, final_path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Publica un bucket intermedio como JSON Lines (un objeto {key,value} por línea).
pub fn write_intermediate(
    work_dir: &Path,
    map_task: TaskId,
    bucket: u32,
    records: &[KeyValue],
) -> io::Result<PathBuf> {
    let path = work_dir.join(intermediate_file_name(map_task, bucket));
    publish_atomically(&path, |w| {
        for kv in records {
            serde_json::to_writer(&mut *w, kv)?;
            w.write_all(b"\n")?;
        }
        Ok(())
    })?;
    Ok(path)
}

/// Lee el bucket `bucket` que dejó la tarea Map `map_task`.
/// Si el archivo no existe devuelve un vector vacío: esa tarea Map
/// no emitió ninguna clave para este bucket.
pub fn read_intermediate(
    work_dir: &Path,
    map_task: TaskId,
    bucket: u32,
) -> io::Result<Vec<KeyValue>> {
    let path = work_dir.join(intermediate_file_name(map_task, bucket));
    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut out = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let kv: KeyValue = serde_json::from_str(&line).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("registro intermedio inválido en {}: {e}", path.display()),
            )
        })?;
        out.push(kv);
    }
    Ok(out)
}
