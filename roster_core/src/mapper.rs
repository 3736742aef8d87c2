use log::debug;
use snafu::prelude::*;
use std::collections::HashMap;

use crate::catalog::{header_is_keyword, header_matches, keywords, normalize_header, FIELD_CATALOG};
use crate::config::FieldId;
use crate::*;

/// A column of the input associated to a field.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MappedColumn {
    pub index: usize,
    pub header: String,
    pub field: FieldId,
}

/// The association between the headers of a sheet and the field catalog.
///
/// Each field is assigned at most one column and each column at most one
/// field. Columns that were not claimed but carry the exact name of a field
/// are kept as fallbacks: they are read when the assigned column of that
/// field is empty for a given row.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ColumnMapping {
    assigned: Vec<MappedColumn>,
    fallbacks: Vec<MappedColumn>,
}

impl ColumnMapping {
    /// The assignments, in catalog order.
    pub fn assigned(&self) -> &[MappedColumn] {
        &self.assigned
    }

    pub fn fallbacks(&self) -> &[MappedColumn] {
        &self.fallbacks
    }

    /// The column index assigned to a field.
    pub fn column(&self, field: FieldId) -> Option<usize> {
        self.assigned
            .iter()
            .find(|mc| mc.field == field)
            .map(|mc| mc.index)
    }

    /// The assigned column first, then the fallbacks in header order.
    pub fn candidate_columns(&self, field: FieldId) -> Vec<usize> {
        self.assigned
            .iter()
            .chain(self.fallbacks.iter())
            .filter(|mc| mc.field == field)
            .map(|mc| mc.index)
            .collect()
    }

    /// The field a header was mapped to.
    pub fn field_for(&self, header: &str) -> Option<FieldId> {
        self.assigned
            .iter()
            .find(|mc| mc.header == header)
            .map(|mc| mc.field)
    }

    pub fn has_identifier(&self) -> bool {
        self.column(FieldId::VoterId).is_some()
    }

    /// header -> field view of the assignments.
    pub fn to_map(&self) -> HashMap<String, FieldId> {
        self.assigned
            .iter()
            .map(|mc| (mc.header.clone(), mc.field))
            .collect()
    }

    /// (header, field) pairs ordered by column position.
    pub fn pairs(&self) -> Vec<(String, FieldId)> {
        let mut by_column: Vec<&MappedColumn> = self.assigned.iter().collect();
        by_column.sort_by_key(|mc| mc.index);
        by_column
            .iter()
            .map(|mc| (mc.header.clone(), mc.field))
            .collect()
    }
}

/// Maps the headers, failing if no column can hold the voter id.
pub fn map_columns(headers: &[String]) -> RosterResult<ColumnMapping> {
    let mapping = infer_columns(headers);
    ensure!(
        mapping.has_identifier(),
        MissingIdentifierColumnSnafu {
            headers: headers.to_vec()
        }
    );
    Ok(mapping)
}

/// Maps the headers without requiring any particular field.
pub fn infer_columns(headers: &[String]) -> ColumnMapping {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut claimed: Vec<bool> = vec![false; headers.len()];
    let mut assigned: Vec<MappedColumn> = Vec::new();

    for (field, kws) in FIELD_CATALOG.iter() {
        let hit = normalized
            .iter()
            .enumerate()
            .find(|(idx, h)| !claimed[*idx] && !h.is_empty() && header_matches(h, kws));
        if let Some((idx, _)) = hit {
            claimed[idx] = true;
            assigned.push(MappedColumn {
                index: idx,
                header: headers[idx].clone(),
                field: *field,
            });
        }
    }

    let mut fallbacks: Vec<MappedColumn> = Vec::new();
    for (idx, h) in normalized.iter().enumerate() {
        if claimed[idx] || h.is_empty() {
            continue;
        }
        for field in FieldId::ALL.iter().skip(1) {
            let kws = keywords(*field);
            let hit = if *field == FieldId::BoothNo {
                header_matches(h, kws)
            } else {
                header_is_keyword(h, kws)
            };
            if hit {
                fallbacks.push(MappedColumn {
                    index: idx,
                    header: headers[idx].clone(),
                    field: *field,
                });
                break;
            }
        }
    }

    debug!(
        "infer_columns: headers: {:?} assigned: {:?} fallbacks: {:?}",
        headers, assigned, fallbacks
    );
    ColumnMapping {
        assigned,
        fallbacks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn maps_reference_headers() {
        let headers = hs(&[
            "SrNo",
            "Booth No.",
            "EnglishName",
            "middle",
            "last name",
            "Mobile No.",
        ]);
        let mapping = map_columns(&headers).unwrap();
        let m = mapping.to_map();
        assert_eq!(m.len(), 6);
        assert_eq!(m["SrNo"], FieldId::VoterId);
        assert_eq!(m["Booth No."], FieldId::BoothNo);
        assert_eq!(m["EnglishName"], FieldId::FirstName);
        assert_eq!(m["middle"], FieldId::FatherName);
        assert_eq!(m["last name"], FieldId::Surname);
        assert_eq!(m["Mobile No."], FieldId::MobileNo);
        assert!(mapping.fallbacks().is_empty());
    }

    #[test]
    fn missing_identifier_column() {
        let res = map_columns(&hs(&["Name", "Booth No."]));
        assert!(matches!(
            res,
            Err(RosterError::MissingIdentifierColumn { .. })
        ));
        let res = map_columns(&hs(&[]));
        assert!(res.is_err());
    }

    #[test]
    fn unmatched_headers_stay_unmapped() {
        let mapping = map_columns(&hs(&["Voter ID", "Name", "Remarks"])).unwrap();
        assert_eq!(mapping.field_for("Voter ID"), Some(FieldId::VoterId));
        assert_eq!(mapping.field_for("Name"), None);
        assert_eq!(mapping.field_for("Remarks"), None);
        assert_eq!(mapping.column(FieldId::FullName), None);
    }

    #[test]
    fn catalog_order_breaks_ties() {
        // "voter srno" is a keyword of both the voter id and the serial number.
        let mapping = map_columns(&hs(&["Voter SrNo", "Serial No"])).unwrap();
        assert_eq!(mapping.field_for("Voter SrNo"), Some(FieldId::VoterId));
        assert_eq!(mapping.field_for("Serial No"), Some(FieldId::VoterSrno));
    }

    #[test]
    fn claimed_columns_are_not_reassigned() {
        // "yadibhag" claims the name column for the number first.
        let mapping = map_columns(&hs(&["Voter Id", "Yadibhag Name"])).unwrap();
        assert_eq!(mapping.field_for("Yadibhag Name"), Some(FieldId::YadibhagNo));
        assert_eq!(mapping.column(FieldId::YadibhagName), None);
    }

    #[test]
    fn extra_exact_columns_become_fallbacks() {
        let mapping = map_columns(&hs(&["voter_id", "First Name", "first", "Booth", "Booth Code"]))
            .unwrap();
        assert_eq!(mapping.column(FieldId::FirstName), Some(1));
        assert_eq!(mapping.candidate_columns(FieldId::FirstName), vec![1, 2]);
        assert_eq!(mapping.candidate_columns(FieldId::BoothNo), vec![3, 4]);
    }

    #[test]
    fn mapping_is_deterministic() {
        let headers = hs(&["Voter Id", "Full Name", "Age", "Gender", "Phone", "Karyakarta"]);
        let first = map_columns(&headers).unwrap();
        for _ in 0..5 {
            assert_eq!(map_columns(&headers).unwrap(), first);
        }
        assert_eq!(
            first.pairs(),
            vec![
                ("Voter Id".to_string(), FieldId::VoterId),
                ("Full Name".to_string(), FieldId::FullName),
                ("Age".to_string(), FieldId::Age),
                ("Gender".to_string(), FieldId::Gender),
                ("Phone".to_string(), FieldId::MobileNo),
                ("Karyakarta".to_string(), FieldId::Karyakarta),
            ]
        );
    }
}
