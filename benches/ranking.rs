use std::collections::BTreeSet;
use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use aspectlink::samples::build_in_order;
use aspectlink::{
    Aspect, AspectLinkExample, AspectRanker, ContextType, DescriptionLookup, DescriptionStore,
    EmbeddingTable, EntityRanker, PoolConfig, SampleBuilder, TrainingMode,
};

const DIM: usize = 300;

fn embeddings(n: usize) -> EmbeddingTable {
    (0..n)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let vector: Vec<f32> = (0..DIM).map(|d| ((i * 31 + d * 7) % 97) as f32 / 97.0 - 0.5).collect();
            (format!("E{i}"), vector)
        })
        .collect()
}

/// An example with `aspects` candidates of 20 entities each, drawn from `n` ids.
fn example(id: usize, aspects: usize, n: usize) -> AspectLinkExample {
    AspectLinkExample {
        id: format!("q{id}"),
        candidate_aspects: (0..aspects)
            .map(|a| Aspect::new(format!("A{a}"), (0..20).map(|e| format!("E{}", (id + a * 20 + e) % n))))
            .collect(),
        true_aspect: "A0".to_string(),
        ..AspectLinkExample::default()
    }
}

fn bench_entity_ranking(c: &mut Criterion) {
    let table = embeddings(2_000);
    let ranker = EntityRanker::new(&table);
    let context: Vec<String> = (0..15).map(|i| format!("E{}", i * 13)).collect();
    let candidates: Vec<String> = (0..400).map(|i| format!("E{}", i * 5)).collect();
    let context: BTreeSet<&str> = context.iter().map(String::as_str).collect();
    let candidates: BTreeSet<&str> = candidates.iter().map(String::as_str).collect();

    let mut group = c.benchmark_group("ranking");
    group.throughput(Throughput::Elements(candidates.len() as u64));
    group.bench_function("entity_scores_400x15", |b| {
        b.iter(|| black_box(ranker.score(&context, &candidates)));
    });

    let scores = ranker.score(&context, &candidates);
    let aspects = example(0, 20, 2_000).candidate_aspects;
    let aspect_ranker = AspectRanker::default();
    group.bench_function("aspect_overlap_top100", |b| {
        b.iter(|| black_box(aspect_ranker.score(&aspects, &scores)));
    });
    group.finish();
}

fn bench_sample_building(c: &mut Criterion) {
    let n = 2_000;
    let corpus: Vec<AspectLinkExample> = (0..256).map(|i| example(i, 10, n)).collect();
    let mut store = DescriptionStore::new();
    for ex in &corpus {
        for entity in ex.candidate_entity_ids() {
            store.insert(ex.id.clone(), entity, "An entity description, with Punctuation!");
        }
    }
    let descriptions: Arc<dyn DescriptionLookup> = Arc::new(store);
    let builder = Arc::new(SampleBuilder::training(TrainingMode::Pairwise, ContextType::Sentence));

    let mut group = c.benchmark_group("samples");
    group.throughput(Throughput::Elements(corpus.len() as u64));
    group.sample_size(20);

    group.bench_function("pairwise_sequential", |b| {
        b.iter(|| {
            corpus
                .iter()
                .map(|ex| builder.build(ex, descriptions.as_ref()).len())
                .sum::<usize>()
        });
    });

    group.bench_function("pairwise_pool_4", |b| {
        b.iter_batched(
            || corpus.clone(),
            |examples| {
                let mut records = 0usize;
                build_in_order(
                    PoolConfig::default(),
                    Arc::clone(&builder),
                    Arc::clone(&descriptions),
                    examples.into_iter().map(Ok),
                    |batch| {
                        records += batch.len();
                        Ok(())
                    },
                )
                .unwrap();
                records
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(ranking, bench_entity_ranking, bench_sample_building);
criterion_main!(ranking);
