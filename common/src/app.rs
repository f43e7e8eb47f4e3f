use crate::indexer::InvertedIndex;
use crate::shuffle::KeyValue;
use crate::wordcount::WordCount;

/// Funciones Map y Reduce de una aplicación.
/// El engine las invoca sin saber nada de su contenido.
pub trait MapReduceApp: Send + Sync {
    fn name(&self) -> &'static str;

    /// (nombre de entrada, contenido) -> registros intermedios
    fn map(&self, input_name: &str, contents: &str) -> Vec<KeyValue>;

    /// (clave, todos sus valores) -> resultado
    fn reduce(&self, key: &str, values: &[String]) -> String;
}

/// Aplicaciones que vienen con el framework, elegibles por nombre.
pub fn app_by_name(name: &str) -> Option<Box<dyn MapReduceApp>> {
    match name {
        "wc" | "wordcount" => Some(Box::new(WordCount)),
        "indexer" => Some(Box::new(InvertedIndex)),
        _ => None,
    }
}

pub fn app_names() -> &'static [&'static str] {
    &["wc", "indexer"]
}
