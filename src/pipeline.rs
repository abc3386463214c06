use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::ExportError;
use crate::options::{ExportJob, ExportReport};
use crate::source::{Source, value_to_string};

/// Bytes copied from the spool to the sink per flush.
const FLUSH_CHUNK: usize = 1024;

/// Streams the job's rows as CSV into `out`.
///
/// Rows are first spooled to an anonymous temp file, then copied to `out` in
/// fixed-size chunks with a flush after each chunk. The spool is removed on
/// every exit path; a failed fetch therefore emits nothing to the sink.
///
/// # Errors
/// Returns an error if a fetch callback fails, CSV serialization fails, or
/// the spool/sink cannot be written.
pub fn stream<W: Write>(job: ExportJob, out: &mut W) -> Result<ExportReport, ExportError> {
    log::info!(
        "csv export: file={} mode={:?} page_size={}",
        job.file_name,
        job.mode,
        job.page_size
    );
    let spool = tempfile::tempfile()?;
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .quote(b'"')
        .quote_style(csv::QuoteStyle::NonNumeric)
        .flexible(true)
        .from_writer(spool);

    let mut report = ExportReport::default();

    if job.include_header {
        wtr.write_record(job.columns.iter().map(|c| c.label.as_str()))?;
    }

    match job.source {
        Source::Rows(rows) => {
            for row in rows {
                let record: Vec<String> = row.iter().map(value_to_string).collect();
                wtr.write_record(&record)?;
                report.rows_written += 1;
            }
        }
        Source::Paged(mut fetch) => {
            let mut cursor = job.cursor.unwrap_or_else(|| job.mode.initial_cursor());
            loop {
                log::debug!("fetch batch: cursor={cursor} limit={}", job.page_size);
                let batch = fetch(cursor, job.page_size)?;
                report.fetches += 1;
                let fetched = batch.len() as u64;
                for row in batch {
                    // Keys absent from the row are skipped, not padded.
                    let mut record: Vec<String> = Vec::with_capacity(job.columns.len());
                    for col in &job.columns {
                        if let Some(v) = row.get(&col.key) {
                            record.push(value_to_string(v));
                        }
                    }
                    wtr.write_record(&record)?;
                    report.rows_written += 1;
                }
                // A partial (or empty) batch is the final page.
                if fetched < job.page_size {
                    break;
                }
                cursor = job.mode.advance(cursor, job.page_size);
            }
        }
    }

    wtr.flush()?;
    let mut spool = wtr.into_inner().map_err(|e| io::Error::other(e.to_string()))?;
    spool.seek(SeekFrom::Start(0))?;
    let mut buf = [0u8; FLUSH_CHUNK];
    loop {
        let n = spool.read(&mut buf)?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
        out.flush()?;
    }

    log::info!("csv export done: rows={} fetches={}", report.rows_written, report.fetches);
    Ok(report)
}

/// Streams the job into a file at `path`, atomically via a temp file + persist.
///
/// # Errors
/// Returns an error if the export itself fails or the destination cannot be
/// created or replaced.
pub fn export_file(job: ExportJob, path: impl AsRef<Path>) -> Result<ExportReport, ExportError> {
    let dest = path.as_ref();
    log::info!("csv export to file: path={}", dest.display());
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    if !parent.exists() {
        std::fs::create_dir_all(parent)?;
    }
    // Temp file in the same directory so the final rename stays on one filesystem
    let mut tmp = NamedTempFile::new_in(parent)?;
    let report = stream(job, &mut tmp)?;
    // Persist with Windows-friendly retries
    let mut last_err: Option<io::Error> = None;
    for attempt in 0..5 {
        if dest.exists()
            && let Err(e) = std::fs::remove_file(dest)
        {
            last_err = Some(e);
            std::thread::sleep(std::time::Duration::from_millis(10 + attempt * 5));
            continue;
        }
        match tmp.persist(dest) {
            Ok(_f) => {
                return Ok(report);
            }
            Err(pe) => {
                last_err = Some(pe.error);
                tmp = pe.file; // recover temp file and retry
                std::thread::sleep(std::time::Duration::from_millis(10 + attempt * 5));
            }
        }
    }
    Err(ExportError::Io(
        last_err.unwrap_or_else(|| io::Error::other("failed to persist export file")),
    ))
}
