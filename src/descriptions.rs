//! Entity description store.
//!
//! Descriptions are keyed by query id and then by entity id. The store is
//! built once from the description corpus (JSONL), usually via its TSV
//! projection `query_id \t entity_id \t entity_desc`, and is read-only after
//! loading.

use std::collections::{BTreeMap, HashMap};
use std::fs::OpenOptions;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::{open_lines, JsonLines};
use crate::error::{AspectLinkResult, DataError};
use crate::text::single_line;

/// Read access to entity descriptions.
pub trait DescriptionLookup: Send + Sync {
    /// Returns true if any description exists for `query_id`.
    fn has_query(&self, query_id: &str) -> bool;

    /// Description of `entity_id` in the scope of `query_id`.
    fn describe(&self, query_id: &str, entity_id: &str) -> Option<&str>;
}

/// One line of the description corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionRecord {
    /// Context the descriptions belong to.
    pub context: DescriptionContext,
    /// Descriptions of the entities in that context.
    #[serde(default)]
    pub entities: Vec<EntityDescription>,
}

/// Context reference inside a [`DescriptionRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionContext {
    /// Query id.
    pub id: String,
}

/// Description of a single entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescription {
    /// Entity id.
    pub entity_id: String,
    /// Free-text description.
    #[serde(default)]
    pub entity_desc: String,
}

fn clean_description(desc: &str) -> String {
    single_line(desc.trim())
}

/// In-memory `query_id -> {entity_id -> description}` map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionStore {
    by_query: HashMap<String, HashMap<String, String>>,
}

impl DescriptionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a description. The text is trimmed and embedded tabs or line
    /// breaks become spaces so every entry fits on one TSV line.
    pub fn insert(
        &mut self,
        query_id: impl Into<String>,
        entity_id: impl Into<String>,
        description: &str,
    ) {
        self.by_query
            .entry(query_id.into())
            .or_default()
            .insert(entity_id.into(), clean_description(description));
    }

    /// Replaces every description of `record.context.id` with the record's entities.
    pub fn insert_record(&mut self, record: DescriptionRecord) {
        let entities = record
            .entities
            .into_iter()
            .map(|e| {
                let desc = clean_description(&e.entity_desc);
                (e.entity_id, desc)
            })
            .collect();
        self.by_query.insert(record.context.id, entities);
    }

    /// All descriptions for `query_id`.
    #[must_use]
    pub fn for_query(&self, query_id: &str) -> Option<&HashMap<String, String>> {
        self.by_query.get(query_id)
    }

    /// Number of queries with at least one entry.
    #[must_use]
    pub fn num_queries(&self) -> usize {
        self.by_query.len()
    }

    /// Total number of descriptions.
    #[must_use]
    pub fn num_descriptions(&self) -> usize {
        self.by_query.values().map(HashMap::len).sum()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_query.is_empty()
    }

    /// Builds a store from the JSONL description corpus.
    ///
    /// A later record for the same context id replaces the earlier one.
    pub fn from_jsonl(path: &Path) -> AspectLinkResult<Self> {
        let mut store = Self::new();
        for record in JsonLines::<DescriptionRecord>::open(path)? {
            store.insert_record(record?);
        }
        Ok(store)
    }

    /// Loads a TSV projection written by [`Self::append_tsv`].
    pub fn load_tsv(path: &Path) -> AspectLinkResult<Self> {
        let mut store = Self::new();
        for (idx, line) in open_lines(path)?.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.splitn(3, '\t').collect();
            let &[query_id, entity_id, desc] = fields.as_slice() else {
                return Err(DataError::DescriptionLineTooShort {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    found: fields.len(),
                }
                .into());
            };
            store.insert(query_id, entity_id, desc);
        }
        Ok(store)
    }

    /// TSV lines in ascending `(query_id, entity_id)` order, without newlines.
    #[must_use]
    pub fn tsv_lines(&self) -> Vec<String> {
        let sorted: BTreeMap<&String, BTreeMap<&String, &String>> = self
            .by_query
            .iter()
            .map(|(q, entities)| (q, entities.iter().collect()))
            .collect();

        sorted
            .into_iter()
            .flat_map(|(query_id, entities)| {
                entities
                    .into_iter()
                    .map(move |(entity_id, desc)| format!("{query_id}\t{entity_id}\t{desc}"))
            })
            .collect()
    }

    /// Appends the TSV projection to `path`, creating it if needed.
    pub fn append_tsv(&self, path: &Path) -> AspectLinkResult<usize> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        let lines = self.tsv_lines();
        for line in &lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(lines.len())
    }
}

impl DescriptionLookup for DescriptionStore {
    fn has_query(&self, query_id: &str) -> bool {
        self.by_query.contains_key(query_id)
    }

    fn describe(&self, query_id: &str, entity_id: &str) -> Option<&str> {
        self.by_query
            .get(query_id)?
            .get(entity_id)
            .map(String::as_str)
    }
}
