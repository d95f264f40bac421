use crate::backend::BulkInsert;
use crate::domain::record::Batch;
use crate::error::SeederError;
use crate::progress::ProgressReporter;
use crate::source::RecordGenerator;
use futures_util::stream::{FuturesUnordered, StreamExt};
use opentelemetry::{global, KeyValue};
use std::cmp::min;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const MAX_BATCH_SIZE: u64 = 1000;

/// Batch and segment sizes derived once from the requested quantity.
///
/// `batch_size = clamp(floor(quantity_total / 100), 1, 1000)` and
/// `segment_size = max(1, floor(batch_size / 10))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    pub quantity_total: u64,
    /// records per bulk insert call
    pub batch_size: u64,
    /// bulk insert calls running concurrently
    pub segment_size: u64,
    /// records inserted by one full segment
    pub segment_step: u64,
}

impl BatchPlan {
    pub fn new(quantity_total: u64) -> Result<Self, SeederError> {
        if quantity_total == 0 || quantity_total % 10 != 0 {
            return Err(SeederError::invalid_argument(format!(
                "quantity total must be a positive multiple of 10, got {}",
                quantity_total
            )));
        }
        let batch_size = (quantity_total / 100).clamp(1, MAX_BATCH_SIZE);
        let segment_size = (batch_size / 10).max(1);
        Ok(BatchPlan {
            quantity_total,
            batch_size,
            segment_size,
            segment_step: segment_size * batch_size,
        })
    }

    /// Segments needed to reach `quantity_total`, counting a short final one.
    pub fn segments(&self) -> u64 {
        self.quantity_total.div_ceil(self.segment_step)
    }
}

/// Counters of one run, owned and mutated by the control loop only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    pub quantity_total: u64,
    pub total_inserts: u64,
    pub segments_completed: u64,
    pub batches_completed: u64,
}

impl RunState {
    fn new(quantity_total: u64) -> Self {
        RunState {
            quantity_total,
            total_inserts: 0,
            segments_completed: 0,
            batches_completed: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total_inserts >= self.quantity_total
    }

    pub fn remaining(&self) -> u64 {
        self.quantity_total - self.total_inserts
    }

    fn advance(&mut self, inserted: u64, batches: u64) {
        self.total_inserts += inserted;
        self.segments_completed += 1;
        self.batches_completed += batches;
    }
}

/// Outcome of a run where every segment settled successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub inserted: u64,
    pub segments: u64,
    pub batches: u64,
}

/// Drives `quantity_total` inserts through a [`BulkInsert`] backend.
///
/// Records are generated right before their batch is built. A segment of up to
/// `segment_size` batches is launched concurrently and joined completely before the
/// next one is built, which bounds the number of outstanding inserts.
pub struct BatchPipeline<G, B>
where
    G: RecordGenerator,
    B: BulkInsert,
{
    generator: G,
    backend: B,
    plan: BatchPlan,
}

impl<G, B> BatchPipeline<G, B>
where
    G: RecordGenerator,
    B: BulkInsert,
{
    /// Fails with `InvalidArgument` before anything is generated or inserted.
    pub fn new(generator: G, backend: B, quantity_total: u64) -> Result<Self, SeederError> {
        let plan = BatchPlan::new(quantity_total)?;
        Ok(BatchPipeline {
            generator,
            backend,
            plan,
        })
    }

    pub fn plan(&self) -> &BatchPlan {
        &self.plan
    }

    /// Runs segments until the quantity is reached or a segment fails. The returned
    /// result is the single completion signal of the run. On failure the counters stay
    /// at the last fully settled segment; rows already written by the failing segment
    /// are not rolled back.
    #[tracing::instrument(skip_all, fields(run_id = %Uuid::new_v4(), quantity_total = self.plan.quantity_total))]
    pub async fn run<R>(mut self, reporter: &mut R) -> Result<RunSummary, SeederError>
    where
        R: ProgressReporter,
    {
        let plan = self.plan;
        info!(
            "starting run: batch size {}, {} concurrent batches per segment, {} segments",
            plan.batch_size,
            plan.segment_size,
            plan.segments()
        );

        let mut state = RunState::new(plan.quantity_total);
        while !state.is_complete() {
            let segment = state.segments_completed + 1;
            let batches = match self.build_segment(state.remaining()) {
                Ok(batches) => batches,
                Err(source) => {
                    error!("reading records for segment {} failed: {:#}", segment, source);
                    return Err(SeederError::SourceFailure { segment, source });
                }
            };
            let batch_count = batches.len() as u64;
            let inserted: u64 = batches.iter().map(|b| b.len() as u64).sum();

            if let Err(source) = self.insert_segment(batches).await {
                error!("segment {} failed, aborting run: {:#}", segment, source);
                return Err(SeederError::InsertFailure { segment, source });
            }

            state.advance(inserted, batch_count);
            send_inserted_metrics(inserted);
            debug!(
                "segment {} settled: {}/{}",
                segment, state.total_inserts, state.quantity_total
            );
            reporter.report(state.total_inserts, state.quantity_total);
        }

        reporter.complete();
        info!(
            "run complete: {} records in {} segments",
            state.total_inserts, state.segments_completed
        );
        Ok(RunSummary {
            inserted: state.total_inserts,
            segments: state.segments_completed,
            batches: state.batches_completed,
        })
    }

    /// Builds up to `segment_size` batches holding at most `remaining` records in total.
    /// Nothing of the segment is launched when the generator reports an error.
    fn build_segment(&mut self, remaining: u64) -> anyhow::Result<Vec<Batch>> {
        let mut batches = Vec::with_capacity(self.plan.segment_size as usize);
        let mut left = remaining;
        while left > 0 && (batches.len() as u64) < self.plan.segment_size {
            let size = min(self.plan.batch_size, left);
            let batch: Batch = (0..size).map(|_| self.generator.next_record()).collect();
            batches.push(batch);
            left -= size;
        }
        match self.generator.take_error() {
            Some(e) => Err(e),
            None => Ok(batches),
        }
    }

    /// Spawns one task per batch and waits until every task settled.
    /// Returns the first error in completion order.
    async fn insert_segment(&self, batches: Vec<Batch>) -> anyhow::Result<()> {
        let mut in_flight: FuturesUnordered<_> = batches
            .into_iter()
            .map(|batch| {
                let backend = self.backend.clone();
                tokio::spawn(async move { backend.insert_batch(batch).await })
            })
            .collect();

        let mut first_error: Option<anyhow::Error> = None;
        while let Some(joined) = in_flight.next().await {
            let outcome = joined.map_err(anyhow::Error::from).and_then(|r| r);
            if let Err(e) = outcome {
                match first_error {
                    None => first_error = Some(e),
                    Some(_) => warn!("additional insert failure in segment: {:#}", e),
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Convenience wrapper: validate, plan and run in one call.
pub async fn run_batch_pipeline<G, B, R>(
    generator: G,
    backend: B,
    quantity_total: u64,
    reporter: &mut R,
) -> Result<RunSummary, SeederError>
where
    G: RecordGenerator,
    B: BulkInsert,
    R: ProgressReporter,
{
    BatchPipeline::new(generator, backend, quantity_total)?
        .run(reporter)
        .await
}

fn send_inserted_metrics(records: u64) {
    let meter = global::meter("pipeline");
    let counter = meter.u64_counter("records-inserted").init();
    counter.add(records, &[KeyValue::new("backend", "bulk-insert")]);
}

#[cfg(test)]
mod test {
    use crate::error::SeederError;
    use crate::pipeline::BatchPlan;

    #[test]
    fn test_plan_for_ten_thousand() {
        let plan = BatchPlan::new(10_000).unwrap();
        assert_eq!(plan.batch_size, 100);
        assert_eq!(plan.segment_size, 10);
        assert_eq!(plan.segment_step, 1000);
        assert_eq!(plan.segments(), 10);
    }

    #[test]
    fn test_plan_for_one_hundred() {
        let plan = BatchPlan::new(100).unwrap();
        assert_eq!(plan.batch_size, 1);
        assert_eq!(plan.segment_size, 1);
        assert_eq!(plan.segments(), 100);
    }

    #[test]
    fn test_plan_clamps_small_and_large_quantities() {
        let small = BatchPlan::new(10).unwrap();
        assert_eq!((small.batch_size, small.segment_size), (1, 1));

        let large = BatchPlan::new(50_000_000).unwrap();
        assert_eq!(large.batch_size, 1000);
        assert_eq!(large.segment_size, 100);
        assert_eq!(large.segment_step, 100_000);
    }

    #[test]
    fn test_plan_floors_fractional_batch_size() {
        let plan = BatchPlan::new(2510).unwrap();
        assert_eq!(plan.batch_size, 25);
        assert_eq!(plan.segment_size, 2);
        // 50 full segments of 50 records plus one short segment of 10
        assert_eq!(plan.segments(), 51);
    }

    #[test]
    fn test_plan_bounds_hold() {
        for quantity in (10..=200_000).step_by(990) {
            let plan = BatchPlan::new(quantity).unwrap();
            assert!((1..=1000).contains(&plan.batch_size));
            assert!(plan.segment_size >= 1);
        }
    }

    #[test]
    fn test_plan_rejects_non_multiples_of_ten() {
        for quantity in [0, 1, 15, 10_001] {
            assert!(matches!(
                BatchPlan::new(quantity),
                Err(SeederError::InvalidArgument(_))
            ));
        }
    }
}
