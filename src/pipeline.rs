//! Tool-level operations: one function per command-line tool.
//!
//! Each stage validates its configuration, then makes a single forward pass
//! over an [`ExampleSource`] and appends to its output file. Run and qrel
//! lines for one example are written before the next example is read, so a
//! failure leaves the output of every earlier example in place. Loading of the
//! shared tables (embeddings, entity run, descriptions) is left to the caller.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{
    AspectRankConfig, EntityRankConfig, EvalDataConfig, QueriesConfig, TrainDataConfig,
};
use crate::corpus::ExampleSource;
use crate::descriptions::{DescriptionLookup, DescriptionStore};
use crate::embedding::EmbeddingTable;
use crate::error::AspectLinkResult;
use crate::progress::ProgressConfig;
use crate::ranking::{EntityRanker, Ranking};
use crate::samples::{build_in_order, PoolConfig, SampleBuilder, TrainingRecord};
use crate::trec::{TrecWriter, ASPECT_RUN_TAG, ENTITY_RUN_TAG};

/// Counters reported by every stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSummary {
    /// Examples read from the corpus.
    pub examples: usize,
    /// Examples that produced no output.
    pub skipped: usize,
    /// Lines appended to the output file.
    pub lines: usize,
}

/// Ranks every example's candidate entities and appends an entity run file.
pub fn rank_entities<S>(
    source: &S,
    embeddings: &EmbeddingTable,
    output: &Path,
    config: &EntityRankConfig,
) -> AspectLinkResult<StageSummary>
where
    S: ExampleSource + ?Sized,
{
    config.validate()?;
    info!(
        output = %output.display(),
        context_type = %config.context_type,
        embeddings = embeddings.len(),
        "ranking entities"
    );

    let ranker = EntityRanker::new(embeddings);
    let progress = config.progress.start(source.length_hint(), "ranking entities");
    let mut writer = TrecWriter::append(output)?;
    let mut summary = StageSummary::default();

    for example in source.examples()? {
        let example = example?;
        let scores = ranker.rank_example(&example, config.context_type);
        if scores.is_empty() {
            debug!(query_id = %example.id, "no candidate scored above zero");
            summary.skipped += 1;
        }
        writer.write_run(&example.id, &scores, ENTITY_RUN_TAG)?;
        summary.examples += 1;
        progress.inc(1);
    }
    progress.finish_and_clear();

    summary.lines = writer.lines_written();
    writer.finish()?;
    info!(
        examples = summary.examples,
        skipped = summary.skipped,
        lines = summary.lines,
        "entity run written"
    );
    Ok(summary)
}

/// Ranks every example's candidate aspects from an entity run and appends an
/// aspect run file. Examples whose query is missing from `entity_ranking` are
/// skipped.
pub fn rank_aspects<S>(
    source: &S,
    entity_ranking: &Ranking,
    output: &Path,
    config: &AspectRankConfig,
) -> AspectLinkResult<StageSummary>
where
    S: ExampleSource + ?Sized,
{
    let ranker = config.ranker()?;
    info!(
        output = %output.display(),
        k = ranker.k(),
        queries = entity_ranking.len(),
        "ranking aspects"
    );

    let progress = config.progress.start(source.length_hint(), "ranking aspects");
    let mut writer = TrecWriter::append(output)?;
    let mut summary = StageSummary::default();

    for example in source.examples()? {
        let example = example?;
        summary.examples += 1;
        progress.inc(1);
        match ranker.rank_example(&example, entity_ranking) {
            Some(scores) => writer.write_run(&example.id, &scores, ASPECT_RUN_TAG)?,
            None => {
                debug!(query_id = %example.id, "query missing from entity run, skipping");
                summary.skipped += 1;
            }
        }
    }
    progress.finish_and_clear();

    summary.lines = writer.lines_written();
    writer.finish()?;
    info!(
        examples = summary.examples,
        skipped = summary.skipped,
        lines = summary.lines,
        "aspect run written"
    );
    Ok(summary)
}

/// Writes balanced training records to `<save_dir>/train.<mode>.jsonl`.
///
/// Returns the output path with the summary.
pub fn make_train_data<S>(
    source: &S,
    descriptions: Arc<dyn DescriptionLookup>,
    save_dir: &Path,
    config: &TrainDataConfig,
) -> AspectLinkResult<(PathBuf, StageSummary)>
where
    S: ExampleSource + ?Sized,
{
    config.validate()?;
    fs::create_dir_all(save_dir)?;
    let output = save_dir.join(config.output_file_name());
    info!(
        output = %output.display(),
        mode = %config.mode,
        context_type = %config.context_type,
        workers = config.pool.workers,
        "building training data"
    );

    let builder = SampleBuilder::training(config.mode, config.context_type);
    let summary = append_samples(
        source,
        builder,
        descriptions,
        Some(config.pool),
        &output,
        config.progress,
    )?;
    Ok((output, summary))
}

/// Writes unbalanced pointwise evaluation records carrying entity ids.
pub fn make_eval_data<S>(
    source: &S,
    descriptions: Arc<dyn DescriptionLookup>,
    output: &Path,
    config: &EvalDataConfig,
) -> AspectLinkResult<StageSummary>
where
    S: ExampleSource + ?Sized,
{
    config.validate()?;
    info!(
        output = %output.display(),
        context_type = %config.context_type,
        "building evaluation data"
    );
    let builder = SampleBuilder::evaluation(config.context_type);
    append_samples(source, builder, descriptions, None, output, config.progress)
}

fn append_samples<S>(
    source: &S,
    builder: SampleBuilder,
    descriptions: Arc<dyn DescriptionLookup>,
    pool: Option<PoolConfig>,
    output: &Path,
    progress: ProgressConfig,
) -> AspectLinkResult<StageSummary>
where
    S: ExampleSource + ?Sized,
{
    let file = OpenOptions::new().create(true).append(true).open(output)?;
    let mut writer = BufWriter::new(file);
    let bar = progress.start(source.length_hint(), "building samples");
    let mut summary = StageSummary::default();

    let mut sink = |records: Vec<TrainingRecord>| -> AspectLinkResult<()> {
        bar.inc(1);
        if records.is_empty() {
            summary.skipped += 1;
        }
        for record in &records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        summary.lines += records.len();
        Ok(())
    };

    let examples = match pool {
        Some(pool) if pool.workers > 1 => build_in_order(
            pool,
            Arc::new(builder),
            descriptions,
            source.examples()?,
            &mut sink,
        )?,
        _ => {
            let mut count = 0;
            for example in source.examples()? {
                sink(builder.build(&example?, descriptions.as_ref()))?;
                count += 1;
            }
            count
        }
    };
    writer.flush()?;
    bar.finish_and_clear();

    summary.examples = examples;
    info!(
        examples = summary.examples,
        skipped = summary.skipped,
        records = summary.lines,
        "samples written"
    );
    Ok(summary)
}

/// Appends qrel lines for the true aspect's entities of every example.
pub fn make_qrels<S>(
    source: &S,
    output: &Path,
    progress: ProgressConfig,
) -> AspectLinkResult<StageSummary>
where
    S: ExampleSource + ?Sized,
{
    info!(output = %output.display(), "writing qrels");
    let bar = progress.start(source.length_hint(), "writing qrels");
    let mut writer = TrecWriter::append(output)?;
    let mut summary = StageSummary::default();

    for example in source.examples()? {
        let example = example?;
        summary.examples += 1;
        bar.inc(1);
        let before = writer.lines_written();
        writer.write_qrels(&example)?;
        if writer.lines_written() == before {
            debug!(query_id = %example.id, "no true-aspect entities, no qrels");
            summary.skipped += 1;
        }
    }
    summary.lines = writer.lines_written();
    writer.finish()?;
    bar.finish_and_clear();

    info!(examples = summary.examples, lines = summary.lines, "qrels written");
    Ok(summary)
}

/// Appends `query_id \t text` for every query.
///
/// A query id seen more than once keeps its first position and its last text.
pub fn make_queries<S>(
    source: &S,
    output: &Path,
    config: &QueriesConfig,
) -> AspectLinkResult<StageSummary>
where
    S: ExampleSource + ?Sized,
{
    info!(
        output = %output.display(),
        context_type = %config.context_type,
        "writing queries"
    );
    let bar = config.progress.start(source.length_hint(), "collecting queries");
    let mut order: Vec<String> = Vec::new();
    let mut texts: HashMap<String, String> = HashMap::new();
    let mut summary = StageSummary::default();

    for example in source.examples()? {
        let example = example?;
        summary.examples += 1;
        bar.inc(1);
        let text = example.query_text(config.context_type).to_string();
        if texts.insert(example.id.clone(), text).is_some() {
            summary.skipped += 1;
        } else {
            order.push(example.id);
        }
    }
    bar.finish_and_clear();

    let mut writer = TrecWriter::append(output)?;
    for query_id in &order {
        if let Some(text) = texts.get(query_id) {
            writer.write_query(query_id, text)?;
        }
    }
    summary.lines = writer.lines_written();
    writer.finish()?;

    info!(queries = summary.lines, duplicates = summary.skipped, "queries written");
    Ok(summary)
}

/// Projects the JSONL description corpus at `input` to TSV at `output`.
///
/// Returns the number of TSV lines appended.
pub fn make_desc_file(input: &Path, output: &Path) -> AspectLinkResult<usize> {
    info!(input = %input.display(), output = %output.display(), "projecting descriptions");
    let store = DescriptionStore::from_jsonl(input)?;
    let lines = store.append_tsv(output)?;
    info!(
        queries = store.num_queries(),
        descriptions = lines,
        "description file written"
    );
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    use crate::example::{Aspect, AspectLinkExample, ContextType};
    use crate::samples::TrainingMode;

    fn corpus(n: usize) -> Vec<AspectLinkExample> {
        (0..n)
            .map(|i| AspectLinkExample {
                id: format!("q{i}"),
                candidate_aspects: vec![
                    Aspect::new("true", [format!("a{i}"), format!("b{i}")]),
                    Aspect::new("other", [format!("c{i}"), format!("d{i}")]),
                ],
                true_aspect: "true".to_string(),
                ..AspectLinkExample::default()
            })
            .collect()
    }

    fn descriptions(n: usize) -> Arc<dyn DescriptionLookup> {
        let mut store = DescriptionStore::new();
        for i in 0..n {
            for e in ["a", "b", "c", "d"] {
                store.insert(format!("q{i}"), format!("{e}{i}"), &format!("About {e}{i}."));
            }
        }
        Arc::new(store)
    }

    fn train_bytes(workers: usize) -> Vec<u8> {
        let dir = tempdir().unwrap();
        let config = TrainDataConfig {
            mode: TrainingMode::Pairwise,
            context_type: ContextType::Sentence,
            pool: PoolConfig {
                workers,
                queue_capacity: 8,
            },
            progress: ProgressConfig::hidden(),
        };
        let (path, summary) =
            make_train_data(&corpus(40), descriptions(40), dir.path(), &config).unwrap();
        assert_eq!(summary.examples, 40);
        assert_eq!(summary.lines, 40 * 4);
        fs::read(path).unwrap()
    }

    #[test]
    fn training_file_is_identical_for_any_worker_count() {
        let sequential = train_bytes(1);
        assert_eq!(train_bytes(3), sequential);
        assert_eq!(train_bytes(8), sequential);
    }

    #[test]
    fn zero_workers_fails_before_writing() {
        let dir = tempdir().unwrap();
        let mut config = TrainDataConfig::default();
        config.pool.workers = 0;
        config.progress = ProgressConfig::hidden();

        let err = make_train_data(&corpus(1), descriptions(1), dir.path(), &config).unwrap_err();
        assert!(err.is_validation());
        assert!(!dir.path().join("train.pairwise.jsonl").exists());
    }

    #[test]
    fn zero_k_fails_before_writing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("aspects.run");
        let config = AspectRankConfig {
            k: 0,
            progress: ProgressConfig::hidden(),
        };
        let err = rank_aspects(&corpus(1), &Ranking::new(), &output, &config).unwrap_err();
        assert!(err.is_validation());
        assert!(!output.exists());
    }

    #[test]
    fn queries_keep_first_position_and_last_text() {
        let mut examples = corpus(2);
        examples[0].context.sentence.content = "first".to_string();
        examples[1].context.sentence.content = "second".to_string();
        let mut repeated = examples[0].clone();
        repeated.context.sentence.content = "first, revised".to_string();
        examples.push(repeated);

        let dir = tempdir().unwrap();
        let output = dir.path().join("queries.tsv");
        let config = QueriesConfig {
            context_type: ContextType::Sentence,
            progress: ProgressConfig::hidden(),
        };
        let summary = make_queries(&examples, &output, &config).unwrap();
        assert_eq!(summary.lines, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "q0\tfirst, revised\nq1\tsecond\n"
        );
    }
}
