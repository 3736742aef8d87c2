/*!

Import, search and star-rating of a voter roster.

Spreadsheets written by hand rarely agree on their headers. The import
pipeline first maps each header to a field of the catalog
([`catalog::FIELD_CATALOG`]) by keyword matching, then turns every row into a
[`VoterRecord`], dropping values that cannot be read and name-like values
that look like booth or area labels. Records whose voter id is already known
are skipped.

```
use roster_core::store::{MemoryStore, VoterStore};
use roster_core::{run_import, Cell, ImportRules};
# use roster_core::RosterError;

let headers: Vec<String> = ["SrNo", "Booth No.", "EnglishName", "middle", "last name", "Mobile No."]
    .iter()
    .map(|s| s.to_string())
    .collect();
let rows = vec![vec![
    Cell::Int(101),
    Cell::Int(5),
    Cell::from("RAM SHARMA"),
    Cell::from("KUMAR"),
    Cell::from("SHARMA"),
    Cell::from("9876543210"),
]];

let mut store = MemoryStore::default();
let summary = run_import(&headers, &rows, &ImportRules::default(), &mut store)?;
assert_eq!(summary.added, 1);

let voter = store.find_voter("101")?.unwrap();
assert_eq!(voter.booth_no, Some(5));
assert_eq!(voter.full_name.as_deref(), Some("RAM SHARMA KUMAR SHARMA"));
# Ok::<(), RosterError>(())
```
*/

mod config;
use log::{debug, info};
use snafu::prelude::*;

pub use crate::config::*;

pub mod builder;
pub mod catalog;
pub mod mapper;
pub mod names;
pub mod normalizer;
pub mod rating;
pub mod search;
pub mod store;
pub mod users;

use crate::builder::ImportBuilder;
use crate::store::VoterStore;

/// Errors that prevent an operation from completing.
#[derive(Debug, Snafu)]
pub enum RosterError {
    #[snafu(display(
        "No voter id column found among the headers {headers:?}. Include a column with voter identification (e.g. voter_id, srno, voting card no)"
    ))]
    MissingIdentifierColumn { headers: Vec<String> },

    #[snafu(display("Voter id is missing in row {row}"))]
    MissingIdentifier { row: usize },

    #[snafu(display("Rating must be between 1 and 5, got {rating}"))]
    RatingOutOfRange { rating: u8 },

    #[snafu(display("Voter {voter_id} already exists"))]
    DuplicateVoter { voter_id: String },

    #[snafu(display("Unknown voter {voter_id}"))]
    UnknownVoter { voter_id: String },

    #[snafu(display("Unknown user {username}"))]
    UnknownUser { username: String },

    #[snafu(display("User {username} is not active"))]
    InactiveUser { username: String },

    #[snafu(display("User {username} already exists"))]
    DuplicateUser { username: String },

    #[snafu(display("Username may not be empty"))]
    EmptyUsername {},

    #[snafu(display("User {username} is not allowed to do this: main user required"))]
    PermissionDenied { username: String },

    #[snafu(display("Cannot change user {username}: {reason}"))]
    MainUserChange { username: String, reason: String },
}

pub type RosterResult<T> = Result<T, RosterError>;

/// Imports a whole sheet into the store.
///
/// Arguments:
/// * `headers` the first row of the sheet
/// * `rows` the data rows, cells in header order
/// * `rules` the row failure policy and the filters to apply
/// * `store` where new records are inserted
///
/// Rows are reported by their position in `rows`, starting at 1. Fails
/// without touching the store if no header can hold the voter id, or if a
/// row has no voter id under the abort policy.
pub fn run_import<S: VoterStore>(
    headers: &[String],
    rows: &[Vec<Cell>],
    rules: &ImportRules,
    store: &mut S,
) -> RosterResult<ImportSummary> {
    import_rows(
        headers,
        rows.iter().enumerate().map(|(idx, row)| (idx + 1, row.as_slice())),
        rows.len(),
        rules,
        store,
    )
}

/// Same as [`run_import`], for rows that carry their own row number.
///
/// Readers that skip blank lines use this so that rejections point at the
/// row of the source file.
pub fn run_import_numbered<S: VoterStore>(
    headers: &[String],
    rows: &[(usize, Vec<Cell>)],
    rules: &ImportRules,
    store: &mut S,
) -> RosterResult<ImportSummary> {
    import_rows(
        headers,
        rows.iter().map(|(row, cells)| (*row, cells.as_slice())),
        rows.len(),
        rules,
        store,
    )
}

fn import_rows<'a, S: VoterStore>(
    headers: &[String],
    rows: impl Iterator<Item = (usize, &'a [Cell])>,
    num_rows: usize,
    rules: &ImportRules,
    store: &mut S,
) -> RosterResult<ImportSummary> {
    info!(
        "Processing {:?} rows, headers: {:?}, policy: {:?}",
        num_rows, headers, rules.row_failure_policy
    );
    let mut builder = ImportBuilder::new(rules, headers)?;
    for (field, col) in builder
        .mapping()
        .assigned()
        .iter()
        .map(|mc| (mc.field, &mc.header))
    {
        debug!("run_import: {} <- {:?}", field, col);
    }
    for (row, cells) in rows {
        builder.add_row_at(row, cells)?;
    }
    builder.commit(store)
}
