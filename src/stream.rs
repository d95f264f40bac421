use crate::domain::record::tsv_header;
use crate::error::SeederError;
use crate::progress::ProgressReporter;
use crate::sink::{LineSink, TsvFileSink, DEFAULT_HIGH_WATER_MARK};
use opentelemetry::{global, KeyValue};
use std::path::Path;
use tracing::{debug, info};

/// Lines written between two progress reports.
pub const LOGGING_STEP: u64 = 2500;

/// Outcome of one successful streaming run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub lines_written: u64,
    /// how often the writer had to wait for the sink to drain
    pub pauses: u64,
}

/// Pulls lines lazily from a producer and writes them to a [`LineSink`],
/// suspending whenever the sink reports saturation.
pub struct SinkWriter<S> {
    sink: S,
    header: Option<String>,
    logging_step: u64,
}

impl<S> SinkWriter<S>
where
    S: LineSink,
{
    pub fn new(sink: S) -> Self {
        SinkWriter {
            sink,
            header: None,
            logging_step: LOGGING_STEP,
        }
    }

    /// Column names written once as the first line.
    pub fn with_header(mut self, columns: &[&str]) -> Self {
        self.header = Some(tsv_header(columns));
        self
    }

    pub fn with_logging_step(mut self, logging_step: u64) -> Self {
        self.logging_step = logging_step;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Writes the header (if any) followed by exactly `total_count` lines from `produce_line`.
    /// Returns only after the sink has flushed the final line, so the result doubles as the
    /// completion signal. Sink errors end the run and are returned as `SinkWriteFailure`.
    #[tracing::instrument(skip_all, fields(total_count = total_count))]
    pub async fn stream_records<P, R>(
        &mut self,
        mut produce_line: P,
        total_count: u64,
        reporter: &mut R,
    ) -> Result<StreamSummary, SeederError>
    where
        P: FnMut() -> String,
        R: ProgressReporter,
    {
        if total_count == 0 {
            return Err(SeederError::invalid_argument(
                "total count must be a positive number",
            ));
        }
        if self.logging_step == 0 {
            return Err(SeederError::invalid_argument(
                "logging step must be a positive number",
            ));
        }

        let mut pauses = 0;
        if let Some(header) = &self.header {
            if !self.sink.write_line(header)? {
                self.sink.drained().await?;
                pauses += 1;
            }
        }

        let mut written: u64 = 0;
        let mut next_report = self.logging_step;
        while written < total_count {
            let mut accepting = true;
            while written < total_count && accepting {
                written += 1;
                if written == next_report {
                    reporter.report(next_report, total_count);
                    next_report += self.logging_step;
                }
                let line = produce_line();
                accepting = self.sink.write_line(&line)?;
            }

            // saturated but not done yet: resume from `written` once drained
            if written < total_count {
                debug!("sink saturated after {} lines, waiting for drain", written);
                self.sink.drained().await?;
                pauses += 1;
            }
        }

        self.sink.finish().await?;
        send_written_metrics(written);
        reporter.complete();
        info!("wrote {} lines ({} pauses)", written, pauses);

        Ok(StreamSummary {
            lines_written: written,
            pauses,
        })
    }
}

/// Settings for [`write_tsv_file`].
#[derive(Debug, Clone, Copy)]
pub struct TsvFileOptions<'a> {
    /// column names for the header line, `None` writes data lines only
    pub header: Option<&'a [&'a str]>,
    pub high_water_mark: usize,
    pub logging_step: u64,
}

impl Default for TsvFileOptions<'_> {
    fn default() -> Self {
        TsvFileOptions {
            header: None,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            logging_step: LOGGING_STEP,
        }
    }
}

/// Creates (or truncates) `path` and streams `total_count` generated lines into it.
/// Arguments are validated before the file is touched.
#[tracing::instrument(skip(options, produce_line, reporter))]
pub async fn write_tsv_file<P, R>(
    path: &Path,
    options: TsvFileOptions<'_>,
    produce_line: P,
    total_count: u64,
    reporter: &mut R,
) -> Result<StreamSummary, SeederError>
where
    P: FnMut() -> String,
    R: ProgressReporter,
{
    if path.as_os_str().is_empty() {
        return Err(SeederError::invalid_argument("no output path provided"));
    }
    if total_count == 0 {
        return Err(SeederError::invalid_argument(
            "total count must be a positive number",
        ));
    }

    info!("Writing {} lines to {}", total_count, path.display());
    let sink = TsvFileSink::create(path, options.high_water_mark).await?;
    let mut writer = SinkWriter::new(sink).with_logging_step(options.logging_step);
    if let Some(columns) = options.header {
        writer = writer.with_header(columns);
    }
    writer.stream_records(produce_line, total_count, reporter).await
}

fn send_written_metrics(lines: u64) {
    let meter = global::meter("writer");
    let counter = meter.u64_counter("records-written").init();
    counter.add(lines, &[KeyValue::new("sink", "lines")]);
}
