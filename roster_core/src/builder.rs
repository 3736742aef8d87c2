pub use crate::config::*;

use log::{debug, info, warn};
use std::collections::HashSet;

use crate::mapper::{map_columns, ColumnMapping};
use crate::normalizer::RowNormalizer;
use crate::store::VoterStore;
use crate::*;

/// A builder for importing rows one at a time.
///
/// The headers are mapped when the builder is created, so a sheet without a
/// voter id column is refused before any row is read.
///
/// ```
/// use roster_core::builder::ImportBuilder;
/// use roster_core::store::{MemoryStore, VoterStore};
/// use roster_core::{Cell, ImportRules};
/// # use roster_core::RosterError;
///
/// let headers = vec!["Voter ID".to_string(), "Full Name".to_string()];
/// let mut builder = ImportBuilder::new(&ImportRules::default(), &headers)?;
///
/// builder.add_row(&[Cell::from("MH001"), Cell::from("Asha Patil")])?;
/// builder.add_row(&[Cell::from("MH001"), Cell::from("Asha Patil")])?;
///
/// let mut store = MemoryStore::default();
/// let summary = builder.commit(&mut store)?;
/// assert_eq!(summary.added, 1);
/// assert_eq!(summary.skipped_duplicates, vec!["MH001".to_string()]);
///
/// # Ok::<(), RosterError>(())
/// ```
pub struct ImportBuilder {
    pub(crate) _rules: ImportRules,
    pub(crate) _normalizer: RowNormalizer,
    pub(crate) _records: Vec<VoterRecord>,
    pub(crate) _rejected: Vec<RowRejection>,
    pub(crate) _rows: usize,
    pub(crate) _last_row: usize,
}

impl ImportBuilder {
    pub fn new(rules: &ImportRules, headers: &[String]) -> RosterResult<ImportBuilder> {
        let mapping = map_columns(headers)?;
        Ok(ImportBuilder {
            _rules: rules.clone(),
            _normalizer: RowNormalizer::new(&mapping, rules),
            _records: Vec::new(),
            _rejected: Vec::new(),
            _rows: 0,
            _last_row: 0,
        })
    }

    pub fn mapping(&self) -> &ColumnMapping {
        self._normalizer.mapping()
    }

    /// Normalizes the row following the last one added.
    ///
    /// A row without a voter id is rejected and reported under the skip
    /// policy; under the abort policy the error is returned and the builder
    /// should be dropped.
    pub fn add_row(&mut self, cells: &[Cell]) -> RosterResult<()> {
        self.add_row_at(self._last_row + 1, cells)
    }

    /// Normalizes one row, reported as `row` in rejections and errors.
    ///
    /// Readers that leave out blank lines pass the position of the row in
    /// the source file here.
    pub fn add_row_at(&mut self, row: usize, cells: &[Cell]) -> RosterResult<()> {
        self._rows += 1;
        self._last_row = row;
        match self._normalizer.normalize(row, cells) {
            Ok(record) => {
                self._records.push(record);
                Ok(())
            }
            Err(e) => match self._rules.row_failure_policy {
                RowFailurePolicy::Abort => Err(e),
                RowFailurePolicy::Skip => {
                    warn!("add_row_at: rejecting row {}: {}", row, e);
                    self._rejected.push(RowRejection {
                        row,
                        reason: e.to_string(),
                    });
                    Ok(())
                }
            },
        }
    }

    /// Adds a row made of text cells.
    pub fn add_row_simple(&mut self, cells: &[&str]) -> RosterResult<()> {
        let cs: Vec<Cell> = cells.iter().map(|s| Cell::from(*s)).collect();
        self.add_row(&cs)
    }

    /// The records normalized so far.
    pub fn records(&self) -> &[VoterRecord] {
        &self._records
    }

    /// Skips the records whose voter id is already known, then inserts the
    /// rest as one batch.
    pub fn commit<S: VoterStore>(self, store: &mut S) -> RosterResult<ImportSummary> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut fresh: Vec<VoterRecord> = Vec::new();
        let mut skipped: Vec<String> = Vec::new();
        for record in self._records {
            if seen.contains(&record.voter_id) || store.find_voter(&record.voter_id)?.is_some() {
                debug!("commit: skipping duplicate voter {}", record.voter_id);
                skipped.push(record.voter_id);
            } else {
                seen.insert(record.voter_id.clone());
                fresh.push(record);
            }
        }
        let added = store.insert_batch(fresh)?;
        info!(
            "commit: {} rows: added {}, skipped {} duplicates, rejected {}",
            self._rows,
            added,
            skipped.len(),
            self._rejected.len()
        );
        Ok(ImportSummary {
            total_rows: self._rows,
            added,
            skipped_duplicates: skipped,
            rejected: self._rejected,
            mapping: self._normalizer.mapping().pairs(),
        })
    }
}
