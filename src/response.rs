use std::io::Write;

use crate::errors::ExportError;
use crate::options::{ExportJob, ExportReport};
use crate::pipeline;

pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// A CSV download response: header values are fixed at construction, the body
/// is produced by [`CsvResponse::send`]. Sending consumes the response.
#[derive(Debug)]
pub struct CsvResponse {
    job: ExportJob,
    content_disposition: String,
}

impl CsvResponse {
    #[must_use]
    pub fn new(job: ExportJob) -> Self {
        let content_disposition = format!("attachment; filename=\"{}\"", job.file_name);
        Self { job, content_disposition }
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    #[must_use]
    pub fn content_disposition(&self) -> &str {
        &self.content_disposition
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.job.file_name
    }

    /// The response headers as (name, value) pairs.
    #[must_use]
    pub fn headers(&self) -> [(&'static str, String); 2] {
        [
            ("Content-Type", CONTENT_TYPE.to_string()),
            ("Content-Disposition", self.content_disposition.clone()),
        ]
    }

    /// Streams the CSV body into `out`.
    ///
    /// # Errors
    /// Returns an error if the underlying export fails; see [`pipeline::stream`].
    pub fn send<W: Write>(self, out: &mut W) -> Result<ExportReport, ExportError> {
        pipeline::stream(self.job, out)
    }
}
