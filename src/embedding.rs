//! Precomputed entity embeddings.
//!
//! The embeddings file is a single JSON object mapping entity id to a vector of
//! floats. It is loaded wholesale and held read-only for the rest of the run.
//! All vectors must share one dimensionality.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{AspectLinkResult, DataError, ValidationError};

/// Cosine similarity of two vectors.
///
/// Returns 0.0 when either vector has zero norm or the result is not finite.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "embedding dimension mismatch");

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let xf = f64::from(x);
        let yf = f64::from(y);
        dot += xf * yf;
        norm_a += xf * xf;
        norm_b += yf * yf;
    }

    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }

    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    if sim.is_finite() {
        sim
    } else {
        0.0
    }
}

/// Entity id to embedding lookup table.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingTable {
    vectors: HashMap<String, Vec<f32>>,
    dim: Option<usize>,
}

impl EmbeddingTable {
    /// Builds a table, checking that every vector has the same dimension.
    pub fn from_map(vectors: HashMap<String, Vec<f32>>) -> Result<Self, ValidationError> {
        let mut ids: Vec<&String> = vectors.keys().collect();
        ids.sort();

        let mut dim = None;
        for id in ids {
            let actual = vectors[id].len();
            match dim {
                None => dim = Some(actual),
                Some(expected) if expected != actual => {
                    return Err(ValidationError::InvalidEmbeddingDimension {
                        entity_id: id.clone(),
                        actual,
                        expected,
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Self { vectors, dim })
    }

    /// Loads the JSON embeddings file at `path`.
    pub fn load(path: &Path) -> AspectLinkResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let vectors: HashMap<String, Vec<f32>> =
            serde_json::from_reader(reader).map_err(|source| DataError::MalformedEmbeddings {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_map(vectors)?)
    }

    /// Embedding for `entity_id`, if present.
    #[must_use]
    pub fn get(&self, entity_id: &str) -> Option<&[f32]> {
        self.vectors.get(entity_id).map(Vec::as_slice)
    }

    /// Returns true if `entity_id` has an embedding.
    #[must_use]
    pub fn contains(&self, entity_id: &str) -> bool {
        self.vectors.contains_key(entity_id)
    }

    /// Number of embedded entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Returns true if the table holds no embeddings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Shared dimensionality, `None` for an empty table.
    #[must_use]
    pub const fn dim(&self) -> Option<usize> {
        self.dim
    }
}

impl FromIterator<(String, Vec<f32>)> for EmbeddingTable {
    /// Collects without dimension validation; intended for tests and tooling
    /// that construct tables by hand.
    fn from_iter<I: IntoIterator<Item = (String, Vec<f32>)>>(iter: I) -> Self {
        let vectors: HashMap<String, Vec<f32>> = iter.into_iter().collect();
        let dim = vectors.values().next().map(Vec::len);
        Self { vectors, dim }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn cosine_of_parallel_and_orthogonal_vectors() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_with_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn from_map_rejects_mixed_dimensions() {
        let map = HashMap::from([
            ("a".to_string(), vec![1.0, 0.0]),
            ("b".to_string(), vec![1.0, 0.0, 0.0]),
        ]);
        let err = EmbeddingTable::from_map(map).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidEmbeddingDimension { ref entity_id, actual: 3, expected: 2 } if entity_id == "b"
        ));
    }

    #[test]
    fn load_reads_json_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("emb.json");
        std::fs::write(&path, r#"{"E1": [1.0, 0.0], "E2": [0.0, 1.0]}"#).unwrap();

        let table = EmbeddingTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.dim(), Some(2));
        assert_eq!(table.get("E2"), Some(&[0.0f32, 1.0][..]));
        assert!(!table.contains("E3"));
    }

    #[test]
    fn load_reports_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("emb.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = EmbeddingTable::load(&path).unwrap_err();
        assert!(err.is_data());
    }
}
