use std::path::Path;

use rust_xlsxwriter::{Table, Workbook};

use crate::error::Result;
use crate::model::BirthdayMatch;

/// Sheet holding exported lookup results.
pub const BIRTHDAYS_SHEET: &str = "Birthdays";
pub const EXPORT_COLUMNS: [&str; 5] = ["Name", "Birthday", "Student Email", "Parent Email", "Phone"];

/// Writes lookup results to a workbook with a filterable table.
pub fn write_matches(path: &Path, people: &[BirthdayMatch]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(BIRTHDAYS_SHEET)?;

    for (col_idx, header) in EXPORT_COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, *header)?;
    }

    for (row_idx, person) in people.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        let cells = [
            &person.name,
            &person.birthday,
            &person.email,
            &person.parent_email,
            &person.phone,
        ];
        for (col_idx, cell) in cells.iter().enumerate() {
            worksheet.write_string(row, col_idx as u16, cell.as_str())?;
        }
    }

    if !people.is_empty() {
        let col_end = (EXPORT_COLUMNS.len() as u16).saturating_sub(1);
        let row_end = people.len() as u32;
        worksheet.add_table(0, 0, row_end, col_end, &Table::new().set_autofilter(true))?;
    }
    worksheet.autofit();

    workbook.save(path)?;
    Ok(())
}
