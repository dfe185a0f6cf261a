use thiserror::Error;

use crate::model::ExtractedTable;

/// Failure of the extraction service. Rate limiting gets its own variant
/// so the user sees a distinct message suggesting to wait.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("extraction service rate limit reached; wait a moment and try again")]
    RateLimited,
    #[error("extraction service failed: {0}")]
    Service(String),
}

/// Abstraction over the LLM service that turns raw sheet text into a
/// normalized subjects + students table.
///
/// Implementations must map qualitative textual grades to the numeric
/// conventions (e.g., "Adquirido" → 3, "Muito Bom" → 5) and unknown, blank
/// or non-numeric cells to `0`.
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, raw_text: &str) -> Result<ExtractedTable, ExtractError>;
}
