use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use crate::config::ConsolidateOptions;
use crate::error::Result;
use crate::io::{excel_read, intake, table};
use crate::model::{CanonicalTable, ConsolidationSummary, SheetTable, SkippedWorkbook};
use crate::normalize::prepare_sheet;

/// Student names already folded into the canonical table during a run.
///
/// Names compare by exact string equality. Empty names are never tracked.
#[derive(Debug, Default)]
pub struct SeenNames {
    names: HashSet<String>,
}

impl SeenNames {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Drops rows whose name was seen in an earlier sheet or earlier in this
    /// sheet, then records the names that were kept.
    pub fn filter_sheet(&mut self, sheet: &mut SheetTable, name_column: &str) -> usize {
        let Some(index) = sheet.column_index(name_column) else {
            return 0;
        };

        let before = sheet.rows.len();
        let mut kept_names: HashSet<String> = HashSet::new();
        sheet.rows.retain(|row| {
            let name = row.get(index).map(|cell| cell.to_text()).unwrap_or_default();
            if name.is_empty() {
                return true;
            }
            if self.names.contains(&name) || kept_names.contains(&name) {
                return false;
            }
            kept_names.insert(name);
            true
        });
        self.names.extend(kept_names);
        before - sheet.rows.len()
    }
}

/// Accumulates normalised sheets into the canonical table.
#[derive(Debug, Default)]
pub struct Consolidation {
    pub table: CanonicalTable,
    pub seen: SeenNames,
    pub skipped_students: Vec<String>,
    pub skipped_workbooks: Vec<SkippedWorkbook>,
}

impl Consolidation {
    /// Folds one prepared sheet in. Sheets must arrive in enumeration order.
    pub fn fold(&mut self, mut sheet: SheetTable, skipped: Vec<String>, name_column: &str) {
        self.skipped_students.extend(skipped);
        let duplicates = self.seen.filter_sheet(&mut sheet, name_column);
        debug!(
            sheet = %sheet.sheet_name,
            rows = sheet.rows.len(),
            duplicates,
            "folding sheet"
        );
        if !sheet.rows.is_empty() {
            self.table.append(&sheet);
        }
    }

    fn skip_workbook(&mut self, path: &std::path::Path, reason: String) {
        warn!(path = %path.display(), %reason, "skipping workbook");
        self.skipped_workbooks.push(SkippedWorkbook {
            path: path.to_path_buf(),
            reason,
        });
    }
}

/// Consolidates every workbook in the intake directory into the canonical
/// table and reports what was written and what was skipped.
///
/// Per-workbook problems and an unlistable intake directory are recorded in
/// the summary; only a failure to write the canonical table aborts the run.
#[instrument(
    level = "info",
    skip_all,
    fields(intake = %options.intake_dir.display(), output = %options.output.display())
)]
pub fn consolidate(options: &ConsolidateOptions) -> Result<ConsolidationSummary> {
    let intake_error = intake::intake_problem(&options.intake_dir);
    if let Some(problem) = &intake_error {
        warn!(%problem, "intake directory unavailable");
    }
    let files = intake::scan_intake(&options.intake_dir);
    info!(workbook_count = files.len(), "scanned intake");

    let mut run = Consolidation::default();
    for path in &files {
        let sheets = match excel_read::read_candidate_sheets(path, &options.keyword) {
            Ok(sheets) => sheets,
            Err(error) => {
                run.skip_workbook(path, error.to_string());
                continue;
            }
        };
        if sheets.is_empty() {
            run.skip_workbook(path, format!("no sheet with '{}' found", options.keyword));
            continue;
        }

        for sheet in &sheets {
            if let Some((prepared, skipped)) = prepare_sheet(sheet, options) {
                run.fold(prepared, skipped, &options.name_column);
            }
        }
    }

    let rows_written = if run.table.is_empty() {
        info!("no valid data to save");
        None
    } else {
        table::write_canonical(&options.output, &run.table)?;
        info!(
            rows = run.table.rows.len(),
            students = run.seen.len(),
            "canonical table written"
        );
        Some(run.table.rows.len())
    };

    Ok(ConsolidationSummary::new(
        rows_written,
        run.skipped_students,
        run.skipped_workbooks,
        intake_error,
        options.output.clone(),
    ))
}
