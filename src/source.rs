use crate::domain::fake_rows::{
    fake_document, fake_reservation, fake_restaurant, fake_user, ReservationLimits,
};
use crate::domain::record::Record;
use crate::domain::table::Table;
use anyhow::{anyhow, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::info;

/// Produces one record per call. Calls may draw randomness.
pub trait RecordGenerator: Send {
    fn next_record(&mut self) -> Record;

    /// Error hit while producing the records handed out since the last call.
    /// Sources that cannot fail keep the default.
    fn take_error(&mut self) -> Option<anyhow::Error> {
        None
    }
}

impl<F> RecordGenerator for F
where
    F: FnMut() -> Record + Send,
{
    fn next_record(&mut self) -> Record {
        self()
    }
}

/// Fake rows for one of the demo tables, driven by its own RNG.
pub struct TableGenerator {
    table: Table,
    limits: ReservationLimits,
    rng: StdRng,
}

impl TableGenerator {
    /// Without a seed the RNG is seeded from entropy.
    pub fn new(table: Table, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        TableGenerator {
            table,
            limits: ReservationLimits::default(),
            rng,
        }
    }

    pub fn with_limits(mut self, limits: ReservationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn table(&self) -> Table {
        self.table
    }

    /// Next row already framed as a TSV line.
    pub fn next_line(&mut self) -> String {
        self.next_record().to_tsv_line()
    }
}

impl RecordGenerator for TableGenerator {
    fn next_record(&mut self) -> Record {
        match self.table {
            Table::Users => fake_user(&mut self.rng),
            Table::Restaurants => fake_restaurant(&mut self.rng),
            Table::Reservations => fake_reservation(&mut self.rng, &self.limits),
            Table::Documents => fake_document(&mut self.rng, &self.limits),
        }
    }
}

/// Reads records back from a TSV file, one line per call.
///
/// The data lines are counted when the file is opened so the pipeline knows its
/// quantity up front; the records themselves are read lazily. Empty lines are skipped.
pub struct TsvRecordSource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    records: u64,
    expected_fields: Option<usize>,
    line_no: u64,
    error: Option<anyhow::Error>,
}

impl TsvRecordSource {
    /// With `skip_header` the first line is treated as column names and not returned.
    pub fn open(path: &Path, skip_header: bool) -> anyhow::Result<Self> {
        let records = count_data_lines(path, skip_header)?;
        let mut lines = open_lines(path)?;
        let mut line_no = 0;
        if skip_header {
            lines.next().transpose()?;
            line_no += 1;
        }
        info!("{} holds {} records", path.display(), records);
        Ok(TsvRecordSource {
            path: path.to_path_buf(),
            lines,
            records,
            expected_fields: None,
            line_no,
            error: None,
        })
    }

    /// Lines with a different number of cells are reported as errors.
    pub fn with_expected_fields(mut self, fields: usize) -> Self {
        self.expected_fields = Some(fields);
        self
    }

    /// Number of data lines in the file.
    pub fn records(&self) -> u64 {
        self.records
    }

    fn fail(&mut self, error: anyhow::Error) -> Record {
        // keep the first one, later calls are fallout of the same problem
        if self.error.is_none() {
            self.error = Some(error);
        }
        Record::default()
    }
}

impl RecordGenerator for TsvRecordSource {
    fn next_record(&mut self) -> Record {
        loop {
            self.line_no += 1;
            match self.lines.next() {
                Some(Ok(line)) if line.trim_end_matches('\r').is_empty() => continue,
                Some(Ok(line)) => {
                    let record = Record::from_tsv_line(&line);
                    if let Some(expected) = self.expected_fields {
                        if record.len() != expected {
                            let err = anyhow!(
                                "{}:{} has {} fields, expected {}",
                                self.path.display(),
                                self.line_no,
                                record.len(),
                                expected
                            );
                            return self.fail(err);
                        }
                    }
                    return record;
                }
                Some(Err(e)) => {
                    let err = anyhow::Error::new(e)
                        .context(format!("could not read {}", self.path.display()));
                    return self.fail(err);
                }
                None => {
                    let err = anyhow!("{} ended early", self.path.display());
                    return self.fail(err);
                }
            }
        }
    }

    fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }
}

fn open_lines(path: &Path) -> anyhow::Result<Lines<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    Ok(BufReader::new(file).lines())
}

fn count_data_lines(path: &Path, skip_header: bool) -> anyhow::Result<u64> {
    let mut lines = open_lines(path)?;
    if skip_header {
        lines.next().transpose()?;
    }
    let mut count = 0;
    for line in lines {
        if !line?.trim_end_matches('\r').is_empty() {
            count += 1;
        }
    }
    Ok(count)
}
