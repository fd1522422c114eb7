//! Layout conventions of the roster exports, kept as data so callers and
//! tests can describe other layouts without code changes.

use std::path::PathBuf;

/// Sheet-name substring selecting the sheets that take part in a run.
pub const DEFAULT_KEYWORD: &str = "Student Master";
/// Directory holding the uploaded workbooks.
pub const DEFAULT_INTAKE_DIR: &str = "xlsDump";
/// Location of the consolidated table.
pub const DEFAULT_TABLE_PATH: &str = "All_StudentMaster.csv";
/// Zero-based row holding the real header; rows above it are titles.
pub const DEFAULT_HEADER_ROW: usize = 1;
/// Header labels of auto-numbering columns, compared trimmed and lower-cased.
pub const DEFAULT_INDEX_LABELS: [&str; 4] = ["s.no", "sl no", "slno", "sno"];
/// Label prefix given to header cells that were left blank.
pub const UNNAMED_PREFIX: &str = "unnamed";
/// Column used as the student identity during deduplication.
pub const DEFAULT_NAME_COLUMN: &str = "Student Name";
/// Substring identifying the birthday column, compared case-insensitively.
pub const DEFAULT_DOB_MARKER: &str = "DOB";
/// Columns rewritten by the phone normaliser, matched by exact header text.
pub const DEFAULT_PHONE_COLUMNS: [&str; 2] = ["Parent Whatsapp No.", "Student Whatsapp No."];
/// Prefix added to every non-empty normalised phone number.
pub const DEFAULT_COUNTRY_CODE: &str = "91";

/// Settings for a consolidation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidateOptions {
    pub intake_dir: PathBuf,
    pub output: PathBuf,
    pub keyword: String,
    pub header_row: usize,
    pub index_labels: Vec<String>,
    pub unnamed_prefix: String,
    pub name_column: String,
    pub dob_marker: String,
    pub phone_columns: Vec<String>,
    pub country_code: String,
}

impl ConsolidateOptions {
    pub fn new(intake_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            intake_dir: intake_dir.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    /// True when `label` names an auto-numbering or unlabelled column.
    pub fn is_index_label(&self, label: &str) -> bool {
        let normalized = label.trim().to_lowercase();
        self.index_labels.iter().any(|known| *known == normalized)
            || normalized.starts_with(&self.unnamed_prefix)
    }
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            intake_dir: PathBuf::from(DEFAULT_INTAKE_DIR),
            output: PathBuf::from(DEFAULT_TABLE_PATH),
            keyword: DEFAULT_KEYWORD.to_string(),
            header_row: DEFAULT_HEADER_ROW,
            index_labels: DEFAULT_INDEX_LABELS.iter().map(|s| s.to_string()).collect(),
            unnamed_prefix: UNNAMED_PREFIX.to_string(),
            name_column: DEFAULT_NAME_COLUMN.to_string(),
            dob_marker: DEFAULT_DOB_MARKER.to_string(),
            phone_columns: DEFAULT_PHONE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}
