use crate::app::MapReduceApp;
use crate::shuffle::KeyValue;

/// Parte un texto en palabras: solo alfanumérico y '_', en minúscula.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// WordCount clásico: Map emite (palabra, "1"), Reduce cuenta.
pub struct WordCount;

impl MapReduceApp for WordCount {
    fn name(&self) -> &'static str {
        "wc"
    }

    fn map(&self, _input_name: &str, contents: &str) -> Vec<KeyValue> {
        tokenize(contents)
            .into_iter()
            .map(|w| KeyValue::new(w, "1"))
            .collect()
    }

    fn reduce(&self, _key: &str, values: &[String]) -> String {
        values.len().to_string()
    }
}
