//! Fixed-size worker pool for sample building.
//!
//! Examples are decoded on the calling thread and fed through a bounded job
//! queue to the workers. Results come back tagged with the example's input
//! index and are released to the sink strictly in input order, so the output
//! is identical for any worker count.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::debug;

use crate::descriptions::DescriptionLookup;
use crate::error::{AspectLinkError, AspectLinkResult, ValidationError};
use crate::example::AspectLinkExample;

use super::{SampleBuilder, TrainingRecord};

/// Default number of workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Default maximum number of queued examples.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Worker pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum queued examples awaiting a worker.
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl PoolConfig {
    /// Checks that the pool can make progress.
    pub const fn validate(&self) -> Result<(), ValidationError> {
        if self.workers == 0 {
            return Err(ValidationError::ZeroWorkers);
        }
        Ok(())
    }
}

struct Job {
    index: usize,
    example: AspectLinkExample,
}

struct Done {
    index: usize,
    records: Vec<TrainingRecord>,
}

struct WorkerPool {
    tx: Sender<Job>,
    rx: Receiver<Done>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    fn start(
        config: PoolConfig,
        builder: Arc<SampleBuilder>,
        descriptions: Arc<dyn DescriptionLookup>,
    ) -> AspectLinkResult<Self> {
        let (tx, job_rx) = bounded::<Job>(config.queue_capacity.max(1));
        let (done_tx, rx) = unbounded::<Done>();

        let mut handles = Vec::with_capacity(config.workers);
        for idx in 0..config.workers {
            let job_rx = job_rx.clone();
            let done_tx = done_tx.clone();
            let builder = Arc::clone(&builder);
            let descriptions = Arc::clone(&descriptions);
            let handle = thread::Builder::new()
                .name(format!("aspectlink-samples-{idx}"))
                .spawn(move || {
                    while let Ok(Job { index, example }) = job_rx.recv() {
                        let records = builder.build(&example, descriptions.as_ref());
                        if done_tx.send(Done { index, records }).is_err() {
                            break;
                        }
                    }
                })?;
            handles.push(handle);
        }

        Ok(Self {
            tx,
            rx,
            workers: handles,
        })
    }

    fn shutdown(self) {
        // Close the queue: workers drain what is left, then exit.
        drop(self.tx);
        drop(self.rx);
        for handle in self.workers {
            let _ = handle.join();
        }
    }
}

/// Releases results to the sink in input order.
struct Reorder<F> {
    next: usize,
    pending: BTreeMap<usize, Vec<TrainingRecord>>,
    sink: F,
}

impl<F> Reorder<F>
where
    F: FnMut(Vec<TrainingRecord>) -> AspectLinkResult<()>,
{
    fn accept(&mut self, done: Done) -> AspectLinkResult<()> {
        self.pending.insert(done.index, done.records);
        while let Some(records) = self.pending.remove(&self.next) {
            (self.sink)(records)?;
            self.next += 1;
        }
        Ok(())
    }
}

/// Builds records for every example on `config.workers` threads, handing each
/// example's records to `sink` in input order.
///
/// Returns the number of examples processed. The first decoding or sink error
/// stops submission and is returned once the workers have been joined.
pub fn build_in_order<I, F>(
    config: PoolConfig,
    builder: Arc<SampleBuilder>,
    descriptions: Arc<dyn DescriptionLookup>,
    examples: I,
    sink: F,
) -> AspectLinkResult<usize>
where
    I: IntoIterator<Item = AspectLinkResult<AspectLinkExample>>,
    F: FnMut(Vec<TrainingRecord>) -> AspectLinkResult<()>,
{
    config.validate()?;
    let pool = WorkerPool::start(config, builder, descriptions)?;
    let mut reorder = Reorder {
        next: 0,
        pending: BTreeMap::new(),
        sink,
    };

    let result = run(&pool, examples, &mut reorder);
    pool.shutdown();
    result
}

fn run<I, F>(pool: &WorkerPool, examples: I, reorder: &mut Reorder<F>) -> AspectLinkResult<usize>
where
    I: IntoIterator<Item = AspectLinkResult<AspectLinkExample>>,
    F: FnMut(Vec<TrainingRecord>) -> AspectLinkResult<()>,
{
    let mut submitted = 0usize;
    for example in examples {
        let job = Job {
            index: submitted,
            example: example?,
        };
        pool.tx
            .send(job)
            .map_err(|_| AspectLinkError::internal("sample workers disconnected"))?;
        submitted += 1;

        while let Ok(done) = pool.rx.try_recv() {
            reorder.accept(done)?;
        }
    }

    debug!(submitted, "all examples submitted, draining workers");
    while reorder.next < submitted {
        let done = pool
            .rx
            .recv()
            .map_err(|_| AspectLinkError::internal("sample worker exited before finishing"))?;
        reorder.accept(done)?;
    }
    Ok(submitted)
}
