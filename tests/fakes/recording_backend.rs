#[cfg(test)]
pub mod test {
    use record_seeder::backend::BulkInsert;
    use record_seeder::domain::record::Batch;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing::trace;

    #[derive(Default)]
    pub struct Recording {
        pub calls: AtomicUsize,
        pub records: AtomicUsize,
        pub max_in_flight: AtomicUsize,
        pub batch_sizes: Mutex<Vec<usize>>,
        in_flight: AtomicUsize,
    }

    impl Recording {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn records(&self) -> usize {
            self.records.load(Ordering::SeqCst)
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    /// Counts calls and concurrency, optionally rejecting or panicking on one specific call.
    #[derive(Clone)]
    pub struct RecordingBackend {
        pub recording: Arc<Recording>,
        latency: Duration,
        fail_on_call: Option<usize>,
        panic_on_call: Option<usize>,
    }

    impl RecordingBackend {
        pub fn new(latency: Duration) -> Self {
            RecordingBackend {
                recording: Arc::new(Recording::default()),
                latency,
                fail_on_call: None,
                panic_on_call: None,
            }
        }

        /// the call with this 0-based index is rejected
        pub fn failing_on(mut self, call: usize) -> Self {
            self.fail_on_call = Some(call);
            self
        }

        /// the task running the call with this 0-based index panics
        pub fn panicking_on(mut self, call: usize) -> Self {
            self.panic_on_call = Some(call);
            self
        }
    }

    impl BulkInsert for RecordingBackend {
        async fn insert_batch(&self, batch: Batch) -> anyhow::Result<()> {
            let rec = &self.recording;
            let call = rec.calls.fetch_add(1, Ordering::SeqCst);
            let now = rec.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            rec.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.latency).await;
            rec.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.panic_on_call == Some(call) {
                panic!("insert call {} blew up", call);
            }
            if self.fail_on_call == Some(call) {
                anyhow::bail!("insert call {} rejected", call);
            }
            trace!("call {} stored {} records", call, batch.len());
            rec.records.fetch_add(batch.len(), Ordering::SeqCst);
            rec.batch_sizes.lock().unwrap().push(batch.len());
            Ok(())
        }
    }
}
