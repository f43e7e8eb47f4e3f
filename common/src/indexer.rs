use std::collections::BTreeSet;

use crate::app::MapReduceApp;
use crate::shuffle::KeyValue;
use crate::wordcount::tokenize;

/// Índice invertido: para cada palabra, en qué documentos aparece.
pub struct InvertedIndex;

impl MapReduceApp for InvertedIndex {
    fn name(&self) -> &'static str {
        "indexer"
    }

    fn map(&self, input_name: &str, contents: &str) -> Vec<KeyValue> {
        let words: BTreeSet<String> = tokenize(contents).into_iter().collect();
        words
            .into_iter()
            .map(|w| KeyValue::new(w, input_name))
            .collect()
    }

    // "<n> doc1,doc2" con documentos ordenados y sin repetir
    fn reduce(&self, _key: &str, values: &[String]) -> String {
        let docs: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        let list: Vec<&str> = docs.into_iter().collect();
        format!("{} {}", list.len(), list.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_emits_each_word_once_per_document() {
        let kvs = InvertedIndex.map("doc-1", "b a b");
        assert_eq!(
            kvs,
            vec![KeyValue::new("a", "doc-1"), KeyValue::new("b", "doc-1")]
        );
    }

    #[test]
    fn reduce_sorts_and_dedups_documents() {
        let values = vec![
            "pg-zeta.txt".to_string(),
            "pg-alpha.txt".to_string(),
            "pg-zeta.txt".to_string(),
        ];
        assert_eq!(
            InvertedIndex.reduce("palabra", &values),
            "2 pg-alpha.txt,pg-zeta.txt"
        );
    }
}
