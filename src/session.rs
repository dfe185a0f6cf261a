//! Snapshot lifecycle for a loaded sheet.
//!
//! The session holds at most one [`ClassSnapshot`], replaced wholesale on
//! every successful load. Overlapping loads are rejected outright rather
//! than coalesced or cancelled: a second trigger while a load is in flight
//! fails fast with [`LoadInProgress`]. Any failure leaves the previous
//! snapshot untouched.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::model::ClassSnapshot;
use crate::services::{Extractor, SheetSource};

/// Returned when a load is triggered while another one is still running.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("a sheet load is already in progress")]
pub struct LoadInProgress;

/// Result of a load attempt that did not fail.
#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The snapshot was replaced.
    Loaded,
    /// The sheet had no rows; the previous snapshot is untouched.
    EmptySheet,
}

#[derive(Default)]
pub struct Session {
    snapshot: RwLock<Option<ClassSnapshot>>,
    loading: AtomicBool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Option<ClassSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Fetches the named sheet, runs the extraction service over its raw
    /// text and replaces the snapshot on success.
    ///
    /// The snapshot is built fully before the write lock is taken, so
    /// readers never observe a half-updated state.
    pub async fn load_sheet<S: SheetSource, E: Extractor>(
        &self,
        source: &S,
        extractor: &E,
        sheet_name: &str,
    ) -> Result<LoadOutcome> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LoadInProgress.into());
        }

        let result = self.load_inner(source, extractor, sheet_name).await;
        self.loading.store(false, Ordering::Release);
        result
    }

    async fn load_inner<S: SheetSource, E: Extractor>(
        &self,
        source: &S,
        extractor: &E,
        sheet_name: &str,
    ) -> Result<LoadOutcome> {
        let rows = source.sheet_rows(sheet_name).await?;
        if rows.is_empty() {
            warn!(
                sheet = sheet_name,
                "Sheet has no rows, keeping previous snapshot"
            );
            return Ok(LoadOutcome::EmptySheet);
        }

        let raw_text = rows_to_text(&rows);
        let table = extractor.extract(&raw_text).await?;

        let snapshot = ClassSnapshot::from_extraction(sheet_name, table);
        info!(
            sheet = sheet_name,
            cycle = ?snapshot.cycle,
            students = snapshot.students.len(),
            subjects = snapshot.subjects.len(),
            "Snapshot replaced"
        );
        *self.snapshot.write().await = Some(snapshot);

        Ok(LoadOutcome::Loaded)
    }
}

/// Joins sheet cells into the raw text handed to the extraction service:
/// cells comma-joined, rows newline-joined.
pub fn rows_to_text(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|r| r.join(", "))
        .collect::<Vec<String>>()
        .join("\n")
}
