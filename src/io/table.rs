use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, ToolError};
use crate::model::CanonicalTable;

/// Replaces the canonical table at `path`.
///
/// The rows are written to a temporary file next to the target and renamed
/// over it, so readers never observe a partial table and a failed write
/// leaves the previous table in place.
pub fn write_canonical(path: &Path, table: &CanonicalTable) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staging = NamedTempFile::new_in(directory)?;

    {
        let mut writer = csv::WriterBuilder::new()
            .flexible(false)
            .from_writer(staging.as_file_mut());
        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
    }

    staging.persist(path).map_err(|error| error.error)?;
    Ok(())
}

/// Loads the canonical table written by [`write_canonical`].
pub fn read_canonical(path: &Path) -> Result<CanonicalTable> {
    if !path.is_file() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(columns.len().max(row.len()), String::new());
        rows.push(row);
    }

    Ok(CanonicalTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn table() -> CanonicalTable {
        CanonicalTable {
            columns: vec!["Student Name".into(), "DOB".into(), "Notes".into()],
            rows: vec![
                vec!["Rao, Asha".into(), "05-03-2010".into(), "said \"hi\"".into()],
                vec!["Ravi".into(), "06-04-2010".into(), String::new()],
            ],
        }
    }

    #[test]
    fn written_table_reads_back_with_quoting_intact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("All_StudentMaster.csv");

        write_canonical(&path, &table()).unwrap();
        assert_eq!(read_canonical(&path).unwrap(), table());
    }

    #[test]
    fn rewrite_replaces_previous_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");
        write_canonical(&path, &table()).unwrap();

        let smaller = CanonicalTable {
            columns: vec!["Student Name".into()],
            rows: vec![vec!["Ravi".into()]],
        };
        write_canonical(&path, &smaller).unwrap();
        assert_eq!(read_canonical(&path).unwrap(), smaller);
    }

    #[test]
    fn failed_write_keeps_previous_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("table.csv");
        assert!(write_canonical(&path, &table()).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn reading_a_missing_table_is_reported() {
        let dir = tempdir().unwrap();
        let result = read_canonical(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(ToolError::MissingInput(_))));
    }
}
