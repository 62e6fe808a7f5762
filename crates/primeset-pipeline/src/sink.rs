//! Output sinks for finished records

use primeset_classifiers::TotientMode;
use primeset_core::{Record, Result, Totient, TupleDegree, PARTIAL_TOTIENT_BUCKETS, RESIDUE_MODULI};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Destination for serialized records
pub trait RecordSink: Send {
    /// Append one record
    fn write_record(&mut self, record: &Record) -> Result<()>;

    /// Push buffered output to the underlying writer
    fn flush(&mut self) -> Result<()>;

    /// Get the sink name
    fn name(&self) -> &str;
}

/// Open `path` for appending, creating it owner-readable only
fn open_append(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    Ok(options.open(path)?)
}

/// One compact JSON object per line
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Open a JSON-lines file in append mode
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = open_append(path)?;
        debug!(path = %path.display(), "Opened JSON sink");
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap an arbitrary writer
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the inner writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.out.flush()?)
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Column names for the CSV output, in row order
pub fn csv_header(mode: TotientMode) -> Vec<String> {
    let mut columns: Vec<String> = ["value", "prime", "odd", "factor_count"]
        .iter()
        .map(|c| c.to_string())
        .collect();

    match mode {
        TotientMode::Full => columns.push("totient".to_string()),
        TotientMode::Partial => {
            columns.extend((1..=PARTIAL_TOTIENT_BUCKETS).map(|i| format!("totient_{}", i)))
        }
    }

    columns.extend(TupleDegree::ALL.iter().map(|d| d.name().to_string()));
    columns.extend((0..10).map(|d| format!("digit_{}", d)));
    columns.extend(RESIDUE_MODULI.iter().map(|m| format!("mod_{}", m)));
    columns.extend(
        ["sin", "cos", "pi_index", "duration_ns"]
            .iter()
            .map(|c| c.to_string()),
    );

    columns
}

/// Flatten a record into CSV fields matching [`csv_header`]
///
/// Booleans are written as `0`/`1`, a missing π offset as an empty field,
/// and the factor list is left out (its length is `factor_count`).
fn csv_fields(record: &Record) -> Vec<String> {
    let mut fields = vec![
        record.value.to_string(),
        u8::from(record.prime).to_string(),
        u8::from(record.odd).to_string(),
        record.factor_count.to_string(),
    ];

    match &record.totient {
        Totient::Full(phi) => fields.push(phi.to_string()),
        Totient::Partial(buckets) => fields.extend(buckets.iter().map(u64::to_string)),
    }

    fields.extend(
        TupleDegree::ALL
            .iter()
            .map(|&d| u8::from(record.tuples.contains(d)).to_string()),
    );
    fields.extend(record.digits.as_array().iter().map(u8::to_string));
    fields.extend(record.residues.as_array().iter().map(u8::to_string));

    fields.push(record.sin.to_string());
    fields.push(record.cos.to_string());
    fields.push(record.pi_index.map(|i| i.to_string()).unwrap_or_default());
    fields.push(record.duration_ns.to_string());
    fields
}

/// Comma-separated rows under a single header
pub struct CsvSink<W: Write> {
    out: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Open a CSV file in append mode
    ///
    /// The header is only written when the file is empty, so repeated runs
    /// can append to the same corpus.
    pub fn open(path: impl AsRef<Path>, mode: TotientMode) -> Result<Self> {
        let path = path.as_ref();
        let file = open_append(path)?;
        let write_header = file.metadata()?.len() == 0;
        debug!(path = %path.display(), write_header, "Opened CSV sink");
        Self::new(file, mode, write_header)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap an arbitrary writer, optionally emitting the header first
    pub fn new(out: W, mode: TotientMode, write_header: bool) -> Result<Self> {
        let mut out = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);
        if write_header {
            out.write_record(csv_header(mode))?;
        }
        Ok(Self { out })
    }

    /// Flush and recover the inner writer
    pub fn into_inner(self) -> Result<W> {
        self.out.into_inner().map_err(|e| e.into_error().into())
    }
}

impl<W: Write + Send> RecordSink for CsvSink<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        self.out.write_record(csv_fields(record))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.out.flush()?)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
