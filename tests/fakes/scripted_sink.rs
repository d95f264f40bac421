#[cfg(test)]
pub mod test {
    use record_seeder::sink::LineSink;
    use std::io::{Error, ErrorKind};

    /// When the scripted sink reports saturation.
    #[derive(Clone, Copy)]
    pub enum Accept {
        Always,
        Never,
        /// saturated after every n-th line
        Every(usize),
    }

    /// In-memory sink with scripted accept/drain behaviour.
    pub struct ScriptedSink {
        pub lines: Vec<String>,
        pub drains: u64,
        pub finished: bool,
        accept: Accept,
        fail_on_write: Option<usize>,
        fail_drain: bool,
        fail_finish: bool,
    }

    impl ScriptedSink {
        pub fn new(accept: Accept) -> Self {
            ScriptedSink {
                lines: Vec::new(),
                drains: 0,
                finished: false,
                accept,
                fail_on_write: None,
                fail_drain: false,
                fail_finish: false,
            }
        }

        /// the n-th write (1-based) returns an io error
        pub fn failing_on(mut self, n: usize) -> Self {
            self.fail_on_write = Some(n);
            self
        }

        pub fn failing_drain(mut self) -> Self {
            self.fail_drain = true;
            self
        }

        pub fn failing_finish(mut self) -> Self {
            self.fail_finish = true;
            self
        }
    }

    impl LineSink for ScriptedSink {
        fn write_line(&mut self, line: &str) -> std::io::Result<bool> {
            if self.fail_on_write == Some(self.lines.len() + 1) {
                return Err(Error::new(ErrorKind::BrokenPipe, "disk went away"));
            }
            self.lines.push(line.to_string());
            Ok(match self.accept {
                Accept::Always => true,
                Accept::Never => false,
                Accept::Every(n) => self.lines.len() % n != 0,
            })
        }

        async fn drained(&mut self) -> std::io::Result<()> {
            tokio::task::yield_now().await;
            if self.fail_drain {
                return Err(Error::new(ErrorKind::TimedOut, "drain never came"));
            }
            self.drains += 1;
            Ok(())
        }

        async fn finish(&mut self) -> std::io::Result<()> {
            if self.fail_finish {
                return Err(Error::new(ErrorKind::Other, "flush failed"));
            }
            self.finished = true;
            Ok(())
        }
    }
}
