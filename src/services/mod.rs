//! Contracts for the two external collaborators: the spreadsheet source
//! and the LLM extraction service.

mod extractor;
mod sheet_source;

pub use extractor::{ExtractError, Extractor};
pub use sheet_source::SheetSource;
