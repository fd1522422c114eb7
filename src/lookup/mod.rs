//! Birthday lookups against the canonical table.
//!
//! The canonical header row is whatever the first contributing export used,
//! so logical fields are located through a synonym table at query time
//! rather than by fixed column names.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, instrument, warn};

use crate::coerce::parse_date;
use crate::error::{Result, ToolError};
use crate::io::table::read_canonical;
use crate::model::{BirthdayMatch, CanonicalTable, LookupResponse};

/// Fields every lookup result is projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    Name,
    Birthday,
    Email,
    ParentEmail,
    Phone,
}

/// Header words that only the parent email field may claim.
const PARENT_MARKERS: [&str; 2] = ["parent", "guardian"];

/// Ordered synonym table. Fields are resolved in the order listed and each
/// field tries its synonyms in the order listed.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSynonymMap {
    fields: Vec<(LogicalField, Vec<String>)>,
}

impl FieldSynonymMap {
    pub fn new(fields: Vec<(LogicalField, Vec<String>)>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[(LogicalField, Vec<String>)] {
        &self.fields
    }
}

impl Default for FieldSynonymMap {
    fn default() -> Self {
        Self::new(vec![
            (
                LogicalField::Name,
                owned(&["student name", "name", "full name", "student"]),
            ),
            (
                LogicalField::Birthday,
                owned(&["dob", "date of birth", "birthday", "birth date"]),
            ),
            (
                LogicalField::Email,
                owned(&["student email", "email", "email id", "mail"]),
            ),
            (
                LogicalField::ParentEmail,
                owned(&[
                    "parent email",
                    "guardian email",
                    "parent mail",
                    "father email",
                    "mother email",
                ]),
            ),
            (
                LogicalField::Phone,
                owned(&[
                    "student whatsapp",
                    "student phone",
                    "whatsapp",
                    "phone",
                    "mobile",
                    "contact",
                ]),
            ),
        ])
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Lower-cases a header and keeps only alphanumerics and spaces.
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_alphanumeric() || *ch == ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Logical field → column index resolved for one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMapping {
    columns: HashMap<LogicalField, usize>,
}

impl HeaderMapping {
    pub fn column(&self, field: LogicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }
}

/// Binds each logical field to the first header matching one of its
/// synonyms, by equality or substring on normalised text.
pub fn map_headers(headers: &[String], synonyms: &FieldSynonymMap) -> HeaderMapping {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut columns = HashMap::new();

    for (field, candidates) in synonyms.fields() {
        let hit = candidates
            .iter()
            .map(|synonym| normalize_header(synonym))
            .filter(|synonym| !synonym.is_empty())
            .find_map(|synonym| {
                normalized.iter().position(|header| {
                    if *field == LogicalField::Email
                        && PARENT_MARKERS.iter().any(|marker| header.contains(marker))
                    {
                        return false;
                    }
                    *header == synonym || header.contains(&synonym)
                })
            });
        if let Some(index) = hit {
            columns.insert(*field, index);
        }
    }

    HeaderMapping { columns }
}

/// A validated lookup date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthdayQuery {
    pub month: u32,
    pub day: u32,
    pub year: Option<i32>,
}

/// Leap year used to validate month-days given without a year.
const REFERENCE_YEAR: i32 = 2000;

impl BirthdayQuery {
    /// Parses `MM-DD` or `YYYY-MM-DD`.
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        let invalid = || ToolError::InvalidDate(input.to_string());
        let digits = |part: &str| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit());

        let parts: Vec<&str> = text.split('-').collect();
        let (year, month, day) = match parts.as_slice() {
            [month, day] if month.len() == 2 && day.len() == 2 => (None, *month, *day),
            [year, month, day] if year.len() == 4 && month.len() == 2 && day.len() == 2 => {
                (Some(*year), *month, *day)
            }
            _ => return Err(invalid()),
        };
        if ![month, day].into_iter().chain(year).all(digits) {
            return Err(invalid());
        }

        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;
        let year: Option<i32> = match year {
            Some(year) => Some(year.parse().map_err(|_| invalid())?),
            None => None,
        };
        NaiveDate::from_ymd_opt(year.unwrap_or(REFERENCE_YEAR), month, day).ok_or_else(invalid)?;

        Ok(Self { month, day, year })
    }

    pub fn month_day(&self) -> String {
        format!("{:02}-{:02}", self.month, self.day)
    }

    /// `05 March 2024` for full dates, `05 March` for month-days.
    pub fn label(&self) -> String {
        let year = self.year.unwrap_or(REFERENCE_YEAR);
        match NaiveDate::from_ymd_opt(year, self.month, self.day) {
            Some(date) if self.year.is_some() => date.format("%d %B %Y").to_string(),
            Some(date) => date.format("%d %B").to_string(),
            None => self.month_day(),
        }
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.day() == self.day
    }
}

/// Returns the rows of `table` whose birthday falls on the queried
/// month-day, in table order. Rows with unreadable birthdays never match.
pub fn match_birthdays(
    table: &CanonicalTable,
    query: &BirthdayQuery,
    synonyms: &FieldSynonymMap,
) -> LookupResponse {
    let mapping = map_headers(&table.columns, synonyms);
    debug!(?mapping, "resolved header mapping");

    let mut response = LookupResponse {
        date: query.label(),
        month_day: query.month_day(),
        matchable: false,
        count: 0,
        people: Vec::new(),
    };

    let Some(birthday) = mapping.column(LogicalField::Birthday) else {
        warn!(columns = ?table.columns, "no birthday column, table is unmatchable");
        return response;
    };
    response.matchable = true;

    let project = |row: &[String], field: LogicalField| -> String {
        mapping
            .column(field)
            .and_then(|index| row.get(index))
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    };

    for row in &table.rows {
        let row = row.as_slice();
        let Some(date) = row.get(birthday).and_then(|cell| parse_date(cell)) else {
            continue;
        };
        if !query.matches(date) {
            continue;
        }
        response.people.push(BirthdayMatch {
            name: project(row, LogicalField::Name),
            birthday: date.format("%Y-%m-%d").to_string(),
            email: project(row, LogicalField::Email),
            parent_email: project(row, LogicalField::ParentEmail),
            phone: project(row, LogicalField::Phone),
        });
    }
    response.count = response.people.len();
    response
}

/// Parses `date` and looks it up in the canonical table at `table_path`.
#[instrument(level = "info", skip_all, fields(table = %table_path.display(), %date))]
pub fn find_birthdays(
    table_path: &Path,
    date: &str,
    synonyms: &FieldSynonymMap,
) -> Result<LookupResponse> {
    let query = BirthdayQuery::parse(date)?;
    let table = read_canonical(table_path)?;
    let response = match_birthdays(&table, &query, synonyms);
    info!(
        month_day = %response.month_day,
        count = response.count,
        matchable = response.matchable,
        "birthday lookup complete"
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|label| label.to_string()).collect()
    }

    fn table(columns: &[&str], rows: &[&[&str]]) -> CanonicalTable {
        CanonicalTable {
            columns: headers(columns),
            rows: rows.iter().map(|row| headers(row)).collect(),
        }
    }

    #[test]
    fn headers_are_normalised() {
        assert_eq!(normalize_header(" Student Whatsapp No. "), "student whatsapp no");
        assert_eq!(normalize_header("D.O.B"), "dob");
        assert_eq!(normalize_header("E-mail ID"), "email id");
    }

    #[test]
    fn student_and_parent_email_are_not_cross_assigned() {
        let mapping = map_headers(
            &headers(&["Parent Email", "Student Name", "DOB", "Student Email"]),
            &FieldSynonymMap::default(),
        );
        assert_eq!(mapping.column(LogicalField::Email), Some(3));
        assert_eq!(mapping.column(LogicalField::ParentEmail), Some(0));
    }

    #[test]
    fn email_never_binds_to_guardian_column() {
        let mapping = map_headers(
            &headers(&["Name", "Guardian E-mail", "Date of Birth"]),
            &FieldSynonymMap::default(),
        );
        assert_eq!(mapping.column(LogicalField::Email), None);
        assert_eq!(mapping.column(LogicalField::ParentEmail), Some(1));
        assert_eq!(mapping.column(LogicalField::Birthday), Some(2));
        assert_eq!(mapping.column(LogicalField::Name), Some(0));
    }

    #[test]
    fn synonym_priority_beats_column_order() {
        let mapping = map_headers(
            &headers(&["Parent Whatsapp No.", "Student Whatsapp No."]),
            &FieldSynonymMap::default(),
        );
        assert_eq!(mapping.column(LogicalField::Phone), Some(1));
    }

    #[test]
    fn query_accepts_month_day_and_full_date() {
        let short = BirthdayQuery::parse("03-05").unwrap();
        assert_eq!((short.month, short.day, short.year), (3, 5, None));
        assert_eq!(short.label(), "05 March");

        let full = BirthdayQuery::parse("2024-03-05").unwrap();
        assert_eq!(full.month_day(), "03-05");
        assert_eq!(full.label(), "05 March 2024");

        assert!(BirthdayQuery::parse("02-29").is_ok());
    }

    #[test]
    fn query_rejects_malformed_dates() {
        for input in ["13-40", "2024/01/01", "3-5", "02-30", "2023-02-29", "", "ab-cd", "+1-05"] {
            assert!(
                matches!(BirthdayQuery::parse(input), Err(ToolError::InvalidDate(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn matches_across_date_layouts_in_table_order() {
        let table = table(
            &["Student Name", "DOB", "Student Email", "Parent Email"],
            &[
                &["Asha Rao", "2010-03-05", "asha@x.com", "parent@x.com"],
                &["Ravi", "05-03-2011", "ravi@x.com", ""],
                &["Meena", "not known", "", ""],
                &["Kiran", "06/03/2010", "", ""],
                &["Divya", "2012/03/05", "", ""],
            ],
        );
        let query = BirthdayQuery::parse("03-05").unwrap();
        let response = match_birthdays(&table, &query, &FieldSynonymMap::default());

        assert!(response.matchable);
        assert_eq!(response.count, 3);
        let names: Vec<&str> = response.people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Asha Rao", "Ravi", "Divya"]);
        assert_eq!(response.people[1].birthday, "2011-03-05");
        assert_eq!(response.people[0].email, "asha@x.com");
        assert_eq!(response.people[0].parent_email, "parent@x.com");
        assert_eq!(response.people[0].phone, "");
    }

    #[test]
    fn table_without_birthday_column_is_unmatchable() {
        let table = table(&["Student Name", "Class"], &[&["Asha Rao", "5A"]]);
        let query = BirthdayQuery::parse("03-05").unwrap();
        let response = match_birthdays(&table, &query, &FieldSynonymMap::default());

        assert!(!response.matchable);
        assert_eq!(response.count, 0);
        assert!(response.people.is_empty());
    }
}
