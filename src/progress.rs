use std::io::Write;
use tracing::info;

/// Receives (completed, total) counts from the writer and the batch pipeline.
/// Callers never pass `completed > total`.
pub trait ProgressReporter {
    fn report(&mut self, completed: u64, total: u64);

    /// called once when a run finished successfully
    fn complete(&mut self) {}
}

impl<F> ProgressReporter for F
where
    F: FnMut(u64, u64),
{
    fn report(&mut self, completed: u64, total: u64) {
        self(completed, total)
    }
}

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Rewrites a single terminal line with a spinner glyph and the percentage done.
pub struct ConsoleProgress<W: Write> {
    out: W,
    tick: usize,
}

impl ConsoleProgress<std::io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleProgress::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        ConsoleProgress { out, tick: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressReporter for ConsoleProgress<W> {
    fn report(&mut self, completed: u64, total: u64) {
        let glyph = SPINNER[self.tick % SPINNER.len()];
        self.tick += 1;
        let pct = if total == 0 {
            100.0
        } else {
            completed as f64 * 100.0 / total as f64
        };
        // purely cosmetic, a broken terminal must not fail the run
        let _ = write!(self.out, "\r{} {}/{} ({:.1}%)", glyph, completed, total, pct);
        let _ = self.out.flush();
    }

    fn complete(&mut self) {
        let _ = writeln!(self.out, "\ndone");
        let _ = self.out.flush();
    }
}

/// Emits every report as an info event.
#[derive(Clone, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&mut self, completed: u64, total: u64) {
        info!("progress: {}/{}", completed, total);
    }

    fn complete(&mut self) {
        info!("progress: complete");
    }
}

#[derive(Clone, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&mut self, _completed: u64, _total: u64) {}
}
