//! Single consumer serializing finished records

use crate::sequencer::Sequencer;
use crate::sink::RecordSink;
use primeset_core::{Record, Result};
use primeset_telemetry::Telemetry;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Drains the output channel into every configured sink
///
/// Any sink error is fatal: the writer stops, drops the channel and returns
/// the error, which in turn stops the workers and the generator.
pub struct Writer {
    sinks: Vec<Box<dyn RecordSink>>,
    telemetry: Telemetry,
    sequencer: Option<Sequencer>,
    written: u64,
}

impl Writer {
    /// Create a writer emitting records in arrival order
    pub fn new(sinks: Vec<Box<dyn RecordSink>>, telemetry: Telemetry) -> Self {
        Self {
            sinks,
            telemetry,
            sequencer: None,
            written: 0,
        }
    }

    /// Emit records in increasing value order starting at `first`
    pub fn ordered(mut self, first: u64) -> Self {
        self.sequencer = Some(Sequencer::new(first));
        self
    }

    /// Consume the channel until it closes, returning the records written
    ///
    /// Must run on a blocking thread.
    pub fn run(mut self, mut records: mpsc::Receiver<Record>) -> Result<u64> {
        while let Some(record) = records.blocking_recv() {
            match self.sequencer.as_mut() {
                None => self.emit(&record)?,
                Some(sequencer) => {
                    sequencer.push(record);
                    let ready: Vec<Record> = std::iter::from_fn(|| sequencer.pop_ready()).collect();
                    for record in &ready {
                        self.emit(record)?;
                    }
                }
            }
        }

        if let Some(mut sequencer) = self.sequencer.take() {
            let leftover = sequencer.drain();
            if !leftover.is_empty() {
                warn!(
                    count = leftover.len(),
                    expected = sequencer.next_expected(),
                    "Sequence gap at shutdown, flushing remaining records"
                );
            }
            for record in &leftover {
                self.emit(record)?;
            }
            debug!(high_water = sequencer.high_water(), "Sequencer drained");
        }

        for sink in &mut self.sinks {
            sink.flush()?;
        }

        info!(written = self.written, "Writer finished");
        Ok(self.written)
    }

    fn emit(&mut self, record: &Record) -> Result<()> {
        self.telemetry.record_printed();
        for sink in &mut self.sinks {
            sink.write_record(record)?;
        }
        self.written += 1;
        Ok(())
    }
}
