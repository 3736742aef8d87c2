use calamine::{open_workbook_auto, DataType, Range, Reader};
use log::debug;

use crate::roster::*;

/// The header and the data rows of one worksheet.
#[derive(PartialEq, Debug, Clone)]
pub struct Sheet {
    pub headers: Vec<String>,
    /// Data rows with their row number in the worksheet (the header being
    /// on the first row of the used range). Entirely empty rows are left out.
    pub rows: Vec<(usize, Vec<Cell>)>,
}

pub fn read_sheet(path: &str, worksheet_name: Option<&str>) -> AppResult<Sheet> {
    debug!(
        "read_sheet: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;

    let wrange = match worksheet_name {
        // A worksheet name was provided, use it.
        Some(name) => {
            let available = workbook.sheet_names().to_vec();
            workbook
                .worksheet_range(name)
                .context(MissingWorksheetSnafu {
                    path,
                    name,
                    available,
                })?
                .context(OpeningExcelSnafu { path })?
        }
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };
    read_range(&wrange).context(EmptyExcelSnafu { path })
}

/// Splits a range into the header row and the non-empty data rows.
pub fn read_range(wrange: &Range<DataType>) -> Option<Sheet> {
    let mut iter = wrange.rows();
    let header = iter.next()?;
    debug!("read_range: header: {:?}", header);
    let headers: Vec<String> = header.iter().map(header_text).collect();
    // Worksheet rows are numbered from 1, the used range may start lower.
    let header_row = wrange.start().map_or(1, |(r, _)| r as usize + 1);

    let mut rows: Vec<(usize, Vec<Cell>)> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let row_num = header_row + idx + 1;
        if is_blank_row(row) {
            debug!("read_range: skipping empty row {}", row_num);
            continue;
        }
        rows.push((row_num, row.iter().map(to_cell).collect()));
    }
    Some(Sheet { headers, rows })
}

pub fn to_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Int(i) => Cell::Int(*i),
        DataType::Float(f) => Cell::Float(*f),
        DataType::Bool(b) => Cell::Bool(*b),
        // Dates are kept as their serial number.
        DataType::DateTime(f) => Cell::Float(*f),
        _ => Cell::Empty,
    }
}

fn header_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn is_blank_row(row: &[DataType]) -> bool {
    row.iter().all(|c| match c {
        DataType::Empty => true,
        DataType::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::run_import_numbered;
    use roster_core::store::MemoryStore;

    fn range(rows: &[&[DataType]]) -> Range<DataType> {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
        let mut r = Range::new((0, 0), (rows.len() as u32 - 1, width - 1));
        for (i, row) in rows.iter().enumerate() {
            for (j, c) in row.iter().enumerate() {
                r.set_value((i as u32, j as u32), c.clone());
            }
        }
        r
    }

    fn s(x: &str) -> DataType {
        DataType::String(x.to_string())
    }

    #[test]
    fn header_and_rows() {
        let r = range(&[
            &[s("SrNo"), s("Booth No."), s("EnglishName")],
            &[DataType::Int(101), DataType::Float(5.0), s("RAM SHARMA")],
            &[DataType::Empty, s("  "), DataType::Empty],
            &[DataType::Int(102), DataType::Empty, s("ASHA")],
        ]);
        let sheet = read_range(&r).unwrap();
        assert_eq!(sheet.headers, vec!["SrNo", "Booth No.", "EnglishName"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(
            sheet.rows[0],
            (
                2,
                vec![Cell::Int(101), Cell::Float(5.0), Cell::from("RAM SHARMA")]
            )
        );
        assert_eq!(sheet.rows[1].0, 4);
        assert_eq!(sheet.rows[1].1[1], Cell::Empty);
    }

    #[test]
    fn rejected_rows_point_at_the_worksheet() {
        let r = range(&[
            &[s("Voter ID"), s("Full Name")],
            &[DataType::Empty, DataType::Empty],
            &[s("A1"), s("Asha")],
            &[DataType::Empty, s("Ravi")],
        ]);
        let sheet = read_range(&r).unwrap();
        let rows: Vec<usize> = sheet.rows.iter().map(|(row, _)| *row).collect();
        assert_eq!(rows, vec![3, 4]);

        let mut store = MemoryStore::default();
        let summary =
            run_import_numbered(&sheet.headers, &sheet.rows, &ImportRules::default(), &mut store)
                .unwrap();
        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.added, 1);
        assert_eq!(summary.rejected[0].row, 4);
        assert_eq!(summary.rejected[0].reason, "Voter id is missing in row 4");
    }

    #[test]
    fn used_range_offset() {
        let mut r = Range::new((2, 0), (4, 1));
        r.set_value((2, 0), s("Voter ID"));
        r.set_value((2, 1), s("Full Name"));
        r.set_value((4, 0), s("A1"));
        r.set_value((4, 1), s("Asha"));
        let sheet = read_range(&r).unwrap();
        assert_eq!(sheet.headers, vec!["Voter ID", "Full Name"]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].0, 5);
    }

    #[test]
    fn numeric_headers_are_text() {
        let r = range(&[&[DataType::Float(2024.0), DataType::Empty, s("Age")]]);
        let sheet = read_range(&r).unwrap();
        assert_eq!(sheet.headers, vec!["2024", "", "Age"]);
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn cells() {
        assert_eq!(to_cell(&DataType::Bool(true)), Cell::Bool(true));
        assert_eq!(to_cell(&DataType::Empty), Cell::Empty);
        assert_eq!(to_cell(&s(" x ")), Cell::from(" x "));
    }

    #[test]
    fn empty_range() {
        let r: Range<DataType> = Range::empty();
        assert!(read_range(&r).is_none());
    }

    #[test]
    fn missing_file() {
        let res = read_sheet("/nonexistent/roster.xlsx", None);
        assert!(matches!(res, Err(AppError::OpeningExcel { .. })));
    }
}
