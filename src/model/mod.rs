use std::path::PathBuf;

use serde::Serialize;

use crate::coerce::serial_to_datetime;

/// A single spreadsheet cell as read from a workbook, before any header has
/// been assigned.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Blank cell, or a text cell holding only whitespace.
    Empty,
    /// Text literal, kept verbatim.
    Text(String),
    /// Numeric literal.
    Number(f64),
    /// Boolean literal.
    Bool(bool),
    /// Spreadsheet serial date with a date number format applied.
    DateTime(f64),
}

impl Cell {
    /// Builds a text cell, collapsing blank strings to [`Cell::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Renders the cell the way it is persisted in the canonical table.
    ///
    /// Integral numbers are written without a fractional part so that phone
    /// numbers stored as numeric cells keep their digits. Date cells become
    /// ISO dates.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(value) => value.clone(),
            Cell::Number(value) => format_number(*value),
            Cell::DateTime(serial) => match serial_to_datetime(*serial) {
                Some(moment) if moment.time() == chrono::NaiveTime::MIN => {
                    moment.format("%Y-%m-%d").to_string()
                }
                Some(moment) => moment.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => format_number(*serial),
            },
            Cell::Bool(value) => value.to_string(),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// A sheet read with no header assumption: every row is plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

/// A sheet after its header row has been promoted.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    /// Index of the column whose label equals `label` exactly.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == label)
    }

    /// Text of the cell at `row`/`column`, empty when the row is short.
    pub fn text_at(&self, row: usize, column: usize) -> String {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(Cell::to_text)
            .unwrap_or_default()
    }
}

/// The consolidated, deduplicated student table persisted after a run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CanonicalTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a sheet, extending the header with any column the table has
    /// not seen yet. Cells for columns the sheet lacks are left empty.
    pub fn append(&mut self, sheet: &SheetTable) {
        let positions: Vec<usize> = sheet
            .columns
            .iter()
            .map(|label| match self.columns.iter().position(|known| known == label) {
                Some(index) => index,
                None => {
                    self.columns.push(label.clone());
                    self.columns.len() - 1
                }
            })
            .collect();

        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }

        for cells in &sheet.rows {
            let mut row = vec![String::new(); width];
            for (cell, &target) in cells.iter().zip(&positions) {
                row[target] = cell.to_text();
            }
            self.rows.push(row);
        }
    }
}

/// A workbook that did not contribute to the canonical table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedWorkbook {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a consolidation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidationSummary {
    /// [`Self::NO_VALID_DATA`] when nothing was written, otherwise
    /// [`Self::DATA_SAVED`].
    pub data_status: &'static str,
    /// Number of rows persisted, `None` when no sheet contributed data.
    pub rows_written: Option<usize>,
    /// [`Self::ALL_PROCESSED`] or [`Self::STUDENTS_SKIPPED`].
    pub student_status: &'static str,
    /// Names of students dropped for a missing or unparseable birthday.
    pub skipped_students: Vec<String>,
    pub skipped_workbooks: Vec<SkippedWorkbook>,
    /// Set when the intake directory could not be listed.
    pub intake_error: Option<String>,
    pub output: PathBuf,
}

impl ConsolidationSummary {
    pub const NO_VALID_DATA: &'static str = "No Valid Data";
    pub const DATA_SAVED: &'static str = "Data Saved";
    pub const ALL_PROCESSED: &'static str = "All Students Processed";
    pub const STUDENTS_SKIPPED: &'static str = "Students Skipped";

    pub fn new(
        rows_written: Option<usize>,
        skipped_students: Vec<String>,
        skipped_workbooks: Vec<SkippedWorkbook>,
        intake_error: Option<String>,
        output: PathBuf,
    ) -> Self {
        let data_status = match rows_written {
            Some(_) => Self::DATA_SAVED,
            None => Self::NO_VALID_DATA,
        };
        let student_status = if skipped_students.is_empty() {
            Self::ALL_PROCESSED
        } else {
            Self::STUDENTS_SKIPPED
        };
        Self {
            data_status,
            rows_written,
            student_status,
            skipped_students,
            skipped_workbooks,
            intake_error,
            output,
        }
    }

    pub fn all_processed(&self) -> bool {
        self.skipped_students.is_empty()
    }
}

impl std::fmt::Display for ConsolidationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.rows_written {
            Some(rows) => writeln!(f, "{rows} row(s) written to {}", self.output.display())?,
            None => writeln!(f, "{}", Self::NO_VALID_DATA)?,
        }
        if let Some(error) = &self.intake_error {
            writeln!(f, "intake unavailable: {error}")?;
        }
        for workbook in &self.skipped_workbooks {
            writeln!(f, "skipped {}: {}", workbook.path.display(), workbook.reason)?;
        }
        if self.all_processed() {
            write!(f, "{}", Self::ALL_PROCESSED)
        } else {
            write!(
                f,
                "skipped for missing birthday: {}",
                self.skipped_students.join(", ")
            )
        }
    }
}

/// A canonical row projected onto the logical contact fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BirthdayMatch {
    pub name: String,
    /// Birthday normalised to `YYYY-MM-DD`.
    pub birthday: String,
    pub email: String,
    pub parent_email: String,
    pub phone: String,
}

/// Answer to a birthday lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResponse {
    /// Human readable label of the queried date.
    pub date: String,
    /// Queried date reduced to `MM-DD`.
    pub month_day: String,
    /// False when the table has no column that maps to a birthday.
    pub matchable: bool,
    pub count: usize,
    pub people: Vec<BirthdayMatch>,
}

impl std::fmt::Display for LookupResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.matchable {
            return write!(f, "canonical table has no birthday column");
        }
        if self.people.is_empty() {
            return write!(f, "No birthdays found for {}", self.date);
        }
        write!(f, "{} birthday(s) on {}", self.count, self.date)?;
        for person in &self.people {
            write!(
                f,
                "\n  {} ({}) email={} parent_email={} phone={}",
                person.name, person.birthday, person.email, person.parent_email, person.phone
            )?;
        }
        Ok(())
    }
}
