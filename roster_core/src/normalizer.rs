use log::debug;
use snafu::prelude::*;

use crate::config::{Cell, FieldId, ImportRules, VoterRecord};
use crate::mapper::ColumnMapping;
use crate::names::NameFilter;
use crate::*;

/// Turns the rows of a mapped sheet into voter records.
#[derive(Debug, Clone)]
pub struct RowNormalizer {
    mapping: ColumnMapping,
    filter: NameFilter,
    placeholders: Vec<String>,
}

impl RowNormalizer {
    pub fn new(mapping: &ColumnMapping, rules: &ImportRules) -> RowNormalizer {
        RowNormalizer {
            mapping: mapping.clone(),
            filter: NameFilter::from_rules(rules),
            placeholders: rules.placeholders.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn filter(&self) -> &NameFilter {
        &self.filter
    }

    /// Builds the record for one row.
    ///
    /// `row` is the 1-based position of the row among the data rows, used to
    /// report a missing voter id.
    pub fn normalize(&self, row: usize, cells: &[Cell]) -> RosterResult<VoterRecord> {
        let voter_id = self
            .text_value(FieldId::VoterId, cells)
            .context(MissingIdentifierSnafu { row })?;

        let mut record = VoterRecord::new(&voter_id);
        record.booth_no = self.int_value(FieldId::BoothNo, cells);
        record.age = self.int_value(FieldId::Age, cells);

        for field in FieldId::ALL.iter() {
            if field.is_numeric() || *field == FieldId::VoterId {
                continue;
            }
            let value = if field.is_name_like() {
                self.name_value(*field, cells)
            } else {
                self.text_value(*field, cells)
            };
            if let Some(slot) = record.text_slot_mut(*field) {
                *slot = value;
            }
        }

        if record.full_name.is_none() {
            record.full_name = self.filter.derive_full_name(&[
                record.first_name.as_deref(),
                record.father_name.as_deref(),
                record.surname.as_deref(),
            ]);
        }

        debug!("normalize: row: {:?} record: {:?}", row, record);
        Ok(record)
    }

    fn text_value(&self, field: FieldId, cells: &[Cell]) -> Option<String> {
        self.mapping
            .candidate_columns(field)
            .iter()
            .find_map(|idx| cells.get(*idx).and_then(|c| self.cell_text(c)))
    }

    fn name_value(&self, field: FieldId, cells: &[Cell]) -> Option<String> {
        self.mapping
            .candidate_columns(field)
            .iter()
            .find_map(|idx| {
                let text = cells.get(*idx).and_then(|c| self.cell_text(c));
                self.filter.accept(text)
            })
    }

    fn int_value(&self, field: FieldId, cells: &[Cell]) -> Option<u32> {
        self.mapping.candidate_columns(field).iter().find_map(|idx| {
            let cell = cells.get(*idx)?;
            let res = cell_int(cell);
            if res.is_none() && self.cell_text(cell).is_some() {
                debug!("int_value: {}: ignoring non-numeric {:?}", field, cell);
            }
            res
        })
    }

    /// The trimmed text of a cell, or None when empty or a placeholder.
    pub fn cell_text(&self, cell: &Cell) -> Option<String> {
        let s = match cell {
            Cell::Empty => return None,
            Cell::Text(s) => s.trim().to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => float_text(*f)?,
            Cell::Bool(b) => b.to_string(),
        };
        if s.is_empty() || self.placeholders.contains(&s.to_lowercase()) {
            None
        } else {
            Some(s)
        }
    }
}

/// Integral floats are written without a fractional part: spreadsheets
/// store most numbers as floats, and ids or phone numbers must come out as
/// plain digits.
fn float_text(f: f64) -> Option<String> {
    if !f.is_finite() {
        return None;
    }
    if f.fract() == 0.0 && f.abs() < 1e15 {
        Some(format!("{}", f as i64))
    } else {
        Some(f.to_string())
    }
}

/// Reads a non-negative integer. Anything else is dropped.
pub fn cell_int(cell: &Cell) -> Option<u32> {
    match cell {
        Cell::Int(i) => u32::try_from(*i).ok(),
        Cell::Float(f) if f.is_finite() && f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64 => {
            Some(*f as u32)
        }
        Cell::Text(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}
