use std::collections::HashMap;

use tracing::debug;

use crate::coerce::{BIRTHDAY_FORMAT, coerce_birthday, normalize_phone};
use crate::config::ConsolidateOptions;
use crate::model::{Cell, RawSheet, SheetTable};

/// Promotes the header row, drops blank rows, and removes at most one
/// stray index column. Returns `None` for sheets too short to hold a
/// header.
pub fn normalize_sheet(sheet: &RawSheet, options: &ConsolidateOptions) -> Option<SheetTable> {
    if sheet.rows.len() <= options.header_row {
        debug!(sheet = %sheet.name, rows = sheet.rows.len(), "sheet too short for a header");
        return None;
    }

    let columns = header_labels(&sheet.rows[options.header_row]);
    let width = columns.len();
    let rows: Vec<Vec<Cell>> = sheet
        .rows
        .iter()
        .skip(options.header_row + 1)
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .map(|row| {
            let mut cells = row.clone();
            cells.resize(width, Cell::Empty);
            cells
        })
        .collect();

    let mut table = SheetTable {
        sheet_name: sheet.name.clone(),
        columns,
        rows,
    };

    if let Some(index) = table
        .columns
        .iter()
        .position(|label| options.is_index_label(label))
    {
        debug!(sheet = %table.sheet_name, column = %table.columns[index], "dropping index column");
        table.columns.remove(index);
        for row in &mut table.rows {
            row.remove(index);
        }
    }

    Some(table)
}

/// Header cells become labels verbatim; surrounding whitespace is kept.
fn header_labels(row: &[Cell]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    row.iter()
        .enumerate()
        .map(|(index, cell)| {
            let label = match cell {
                Cell::Empty => format!("Unnamed: {index}"),
                other => other.to_text(),
            };
            let count = seen.entry(label.clone()).or_insert(0);
            let unique = if *count == 0 {
                label
            } else {
                format!("{label}.{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}

/// Coerces the birthday column in place, returning the names of the rows
/// dropped because their birthday could not be read.
pub fn coerce_birthdays(table: &mut SheetTable, options: &ConsolidateOptions) -> Vec<String> {
    let marker = options.dob_marker.to_uppercase();
    let Some(dob) = table
        .columns
        .iter()
        .position(|label| label.to_uppercase().contains(&marker))
    else {
        debug!(sheet = %table.sheet_name, "no birthday column, skipping date coercion");
        return Vec::new();
    };
    let name = table.column_index(&options.name_column);

    let mut skipped = Vec::new();
    let mut kept = Vec::with_capacity(table.rows.len());
    for mut row in table.rows.drain(..) {
        match coerce_birthday(&row[dob]) {
            Some(date) => {
                row[dob] = Cell::Text(date.format(BIRTHDAY_FORMAT).to_string());
                kept.push(row);
            }
            None => {
                if let Some(name) = name {
                    let value = row[name].to_text();
                    if !value.trim().is_empty() {
                        skipped.push(value);
                    }
                }
            }
        }
    }
    table.rows = kept;
    skipped
}

/// Rewrites every configured phone column present in the sheet.
pub fn normalize_phones(table: &mut SheetTable, options: &ConsolidateOptions) {
    for column in &options.phone_columns {
        let Some(index) = table.column_index(column) else {
            continue;
        };
        for row in &mut table.rows {
            let normalized = normalize_phone(&row[index].to_text(), &options.country_code);
            row[index] = Cell::text(normalized);
        }
    }
}

/// Runs every per-sheet step that does not depend on other sheets.
pub fn prepare_sheet(
    sheet: &RawSheet,
    options: &ConsolidateOptions,
) -> Option<(SheetTable, Vec<String>)> {
    let mut table = normalize_sheet(sheet, options)?;
    let skipped = coerce_birthdays(&mut table, options);
    normalize_phones(&mut table, options);
    Some((table, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rows: &[&[&str]]) -> RawSheet {
        RawSheet {
            name: "Student Master".into(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|value| Cell::text(*value)).collect())
                .collect(),
        }
    }

    #[test]
    fn promotes_second_row_and_drops_title() {
        let sheet = raw(&[
            &["Class 5 Roster", "", ""],
            &["S.No", "Student Name", "DOB"],
            &["1", "Asha Rao", "05/03/2010"],
            &["", "", ""],
            &["2", "Ravi", "06/04/2010"],
        ]);

        let table = normalize_sheet(&sheet, &ConsolidateOptions::default()).unwrap();
        assert_eq!(table.columns, vec!["Student Name", "DOB"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.text_at(1, 0), "Ravi");
    }

    #[test]
    fn only_first_index_like_column_is_removed() {
        let sheet = raw(&[
            &["title"],
            &["Sl No", "", "Student Name"],
            &["1", "x", "Asha Rao"],
        ]);

        let table = normalize_sheet(&sheet, &ConsolidateOptions::default()).unwrap();
        assert_eq!(table.columns, vec!["Unnamed: 1", "Student Name"]);
        assert_eq!(table.rows[0], vec![Cell::text("x"), Cell::text("Asha Rao")]);
    }

    #[test]
    fn short_sheets_are_skipped() {
        let sheet = raw(&[&["Student Name"]]);
        assert!(normalize_sheet(&sheet, &ConsolidateOptions::default()).is_none());
    }

    #[test]
    fn header_row_offset_is_configurable() {
        let options = ConsolidateOptions {
            header_row: 0,
            ..ConsolidateOptions::default()
        };
        let sheet = raw(&[&["Student Name", "DOB"], &["Asha Rao", "05/03/2010"]]);

        let table = normalize_sheet(&sheet, &options).unwrap();
        assert_eq!(table.columns, vec!["Student Name", "DOB"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn duplicate_header_labels_are_disambiguated() {
        let sheet = raw(&[&["t"], &["Phone", "Phone"], &["1", "2"]]);
        let table = normalize_sheet(&sheet, &ConsolidateOptions::default()).unwrap();
        assert_eq!(table.columns, vec!["Phone", "Phone.1"]);
    }

    #[test]
    fn header_labels_are_kept_verbatim() {
        let sheet = raw(&[
            &["t"],
            &[" S.No ", "Student Name ", "Date of Birth (DOB)"],
            &["1", "Asha Rao", "05/03/2010"],
        ]);
        let table = normalize_sheet(&sheet, &ConsolidateOptions::default()).unwrap();
        assert_eq!(table.columns, vec!["Student Name ", "Date of Birth (DOB)"]);
    }

    #[test]
    fn unparseable_birthdays_are_dropped_and_named() {
        let sheet = raw(&[
            &["t"],
            &["Student Name", "Student DOB"],
            &["Asha Rao", "05/03/2010"],
            &["Ravi", "unknown"],
            &["", "bad"],
        ]);
        let options = ConsolidateOptions::default();
        let (table, skipped) = prepare_sheet(&sheet, &options).unwrap();

        assert_eq!(skipped, vec!["Ravi"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.text_at(0, 1), "05-03-2010");
    }

    #[test]
    fn sheets_without_birthday_column_pass_through() {
        let sheet = raw(&[&["t"], &["Student Name", "Class"], &["Asha Rao", "5A"]]);
        let (table, skipped) = prepare_sheet(&sheet, &ConsolidateOptions::default()).unwrap();
        assert!(skipped.is_empty());
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn phone_columns_are_normalised() {
        let mut sheet = raw(&[
            &["t"],
            &["Student Name", "Parent Whatsapp No.", "Student Whatsapp No."],
            &["Asha Rao", "09876543210", ""],
        ]);
        sheet.rows[2][2] = Cell::Number(9123456789.0);

        let (table, _) = prepare_sheet(&sheet, &ConsolidateOptions::default()).unwrap();
        assert_eq!(table.text_at(0, 1), "919876543210");
        assert_eq!(table.text_at(0, 2), "919123456789");
    }
}
