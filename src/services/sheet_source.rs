use anyhow::Result;

use crate::model::SheetInfo;

/// Abstraction over a spreadsheet provider (e.g., Google Sheets).
///
/// A source is bound to one spreadsheet; failures reaching it are
/// connectivity/permission errors and surface as-is to the caller.
#[async_trait::async_trait]
pub trait SheetSource: Send + Sync {
    /// Returns the names and ids of every sheet tab in the spreadsheet.
    async fn list_sheets(&self) -> Result<Vec<SheetInfo>>;

    /// Returns the cell text of the named sheet, row by row. An empty
    /// result is valid (the sheet has no rows).
    async fn sheet_rows(&self, sheet_name: &str) -> Result<Vec<Vec<String>>>;
}
