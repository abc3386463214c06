pub mod errors;
pub mod logger;
pub mod options;
pub mod pipeline;
pub mod response;
pub mod source;

pub use crate::errors::ExportError;
pub use crate::options::{
    Column, DEFAULT_PAGE_SIZE, ExportJob, ExportJobBuilder, ExportReport, PaginationMode,
};
pub use crate::pipeline::{export_file, stream};
pub use crate::response::{CONTENT_TYPE, CsvResponse};
pub use crate::source::{FetchFn, Row, Source, value_to_string};

/// Initializes the library.
///
/// This function should be called before running exports.
/// It sets up the logger and other necessary components.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()?;
    Ok(())
}
