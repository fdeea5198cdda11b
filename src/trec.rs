//! TREC run, qrel and query files.
//!
//! # Formats
//! ```text
//! run:     <query_id> Q0 <doc_id> <rank> <score> <tag>
//! qrel:    <query_id> Q0 <entity_id> 1
//! queries: <query_id>\t<query text>
//! ```
//!
//! Writers always append; there is no header, footer or completion marker.
//! Run lines follow the canonical [`QueryScores`] order, so ranks are 1, 2, ...
//! by descending score with ties broken by ascending doc id.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use crate::corpus::open_lines;
use crate::error::{AspectLinkResult, DataError};
use crate::example::AspectLinkExample;
use crate::ranking::{QueryScores, Ranking};
use crate::text::single_line;

/// Run tag for entity rankings.
pub const ENTITY_RUN_TAG: &str = "Relatedness";

/// Run tag for aspect rankings.
pub const ASPECT_RUN_TAG: &str = "EntityRanking";

/// Formats a score as the shortest round-trip decimal, keeping `.0` on integral values.
#[must_use]
pub fn format_score(score: f64) -> String {
    format!("{score:?}")
}

/// Run-file lines for one query, without trailing newlines.
pub fn run_lines<'a>(
    query_id: &'a str,
    scores: &'a QueryScores,
    tag: &'a str,
) -> impl Iterator<Item = String> + 'a {
    scores.docs().iter().enumerate().map(move |(idx, doc)| {
        format!(
            "{query_id} Q0 {} {} {} {tag}",
            doc.doc_id,
            idx + 1,
            format_score(doc.score)
        )
    })
}

/// Qrel lines for the true aspect's entities of `example`, ascending by entity id.
#[must_use]
pub fn qrel_lines(example: &AspectLinkExample) -> Vec<String> {
    example
        .pos_neg_split()
        .pos
        .into_iter()
        .map(|entity_id| format!("{} Q0 {entity_id} 1", example.id))
        .collect()
}

/// Line-oriented writer for TREC-style files.
pub struct TrecWriter<W: Write> {
    writer: W,
    lines: usize,
}

impl TrecWriter<BufWriter<File>> {
    /// Opens `path` in append mode, creating it if needed.
    pub fn append(path: &Path) -> AspectLinkResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TrecWriter<W> {
    /// Wraps an arbitrary sink.
    pub const fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Number of lines written so far.
    #[must_use]
    pub const fn lines_written(&self) -> usize {
        self.lines
    }

    fn write_line(&mut self, line: &str) -> AspectLinkResult<()> {
        writeln!(self.writer, "{line}")?;
        self.lines += 1;
        Ok(())
    }

    /// Writes the run lines of one query.
    pub fn write_run(
        &mut self,
        query_id: &str,
        scores: &QueryScores,
        tag: &str,
    ) -> AspectLinkResult<()> {
        for line in run_lines(query_id, scores, tag) {
            self.write_line(&line)?;
        }
        Ok(())
    }

    /// Writes every query of `ranking` in its iteration order.
    pub fn write_ranking(&mut self, ranking: &Ranking, tag: &str) -> AspectLinkResult<()> {
        for (query_id, scores) in ranking.iter() {
            self.write_run(query_id, scores, tag)?;
        }
        Ok(())
    }

    /// Writes the qrel lines of one example.
    pub fn write_qrels(&mut self, example: &AspectLinkExample) -> AspectLinkResult<()> {
        for line in qrel_lines(example) {
            self.write_line(&line)?;
        }
        Ok(())
    }

    /// Writes one `query_id \t text` line.
    pub fn write_query(&mut self, query_id: &str, text: &str) -> AspectLinkResult<()> {
        self.write_line(&format!("{query_id}\t{}", single_line(text)))
    }

    /// Flushes and returns the underlying sink.
    pub fn finish(mut self) -> AspectLinkResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Loads a run file into a [`Ranking`].
///
/// Fields are read by position: query id (0), doc id (2), score (4). The rank
/// and tag columns are not interpreted; the tag may be missing. Blank lines are
/// skipped. A line with fewer than five fields, or a score that is not a finite
/// number (`nan`, `inf`), is fatal.
pub fn read_run(path: &Path) -> AspectLinkResult<Ranking> {
    let mut order: Vec<String> = Vec::new();
    let mut scores: HashMap<String, Vec<(String, f64)>> = HashMap::new();

    for (idx, line) in open_lines(path)?.lines().enumerate() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 5 {
            return Err(DataError::RunLineTooShort {
                path: path.to_path_buf(),
                line: idx + 1,
                found: fields.len(),
            }
            .into());
        }
        let score = fields[4]
            .parse::<f64>()
            .ok()
            .filter(|score| score.is_finite())
            .ok_or_else(|| DataError::InvalidScore {
                path: path.to_path_buf(),
                line: idx + 1,
                value: fields[4].to_string(),
            })?;

        let query_id = fields[0];
        let entry = scores.entry(query_id.to_string()).or_insert_with(|| {
            order.push(query_id.to_string());
            Vec::new()
        });
        entry.push((fields[2].to_string(), score));
    }

    let mut ranking = Ranking::new();
    for query_id in order {
        if let Some(docs) = scores.remove(&query_id) {
            ranking.insert(query_id, QueryScores::from_scores(docs));
        }
    }
    Ok(ranking)
}
