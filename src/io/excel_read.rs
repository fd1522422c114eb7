use std::path::Path;

use calamine::{DataType, Range, Reader, Sheets, open_workbook_auto};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::model::{Cell, RawSheet};

type Workbook = Sheets<std::io::BufReader<std::fs::File>>;

/// Opens a workbook in any supported format and returns, in workbook order,
/// every sheet whose name contains `keyword`. No header is assumed: each
/// sheet is returned as a plain grid.
pub fn read_candidate_sheets(path: &Path, keyword: &str) -> Result<Vec<RawSheet>> {
    let mut workbook = open_workbook_auto(path)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let mut sheets = Vec::new();
    for name in names.into_iter().filter(|name| name.contains(keyword)) {
        let range = read_required_sheet(&mut workbook, &name)?;
        debug!(sheet = %name, size = ?range.get_size(), "read candidate sheet");
        sheets.push(RawSheet {
            rows: range_to_grid(&range),
            name,
        });
    }
    Ok(sheets)
}

fn read_required_sheet(workbook: &mut Workbook, name: &str) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

/// Expands a range into a rectangular grid anchored at cell A1.
///
/// The reader trims leading blank rows and columns; they are padded back so
/// that row positions match what the operator sees in the sheet.
fn range_to_grid(range: &Range<DataType>) -> Vec<Vec<Cell>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let (_, width) = range.get_size();
    let full_width = start_col as usize + width;

    let mut grid: Vec<Vec<Cell>> = (0..start_row)
        .map(|_| vec![Cell::Empty; full_width])
        .collect();
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(cell_from_data));
        cells.resize(full_width, Cell::Empty);
        grid.push(cells);
    }
    grid
}

fn cell_from_data(cell: &DataType) -> Cell {
    match cell {
        DataType::String(value) => Cell::text(value.clone()),
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Number(*value as f64),
        DataType::Bool(value) => Cell::Bool(*value),
        DataType::DateTime(value) => Cell::DateTime(*value),
        DataType::Empty => Cell::Empty,
        other => Cell::text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_padded_back_to_a1() {
        let mut range: Range<DataType> = Range::new((1, 1), (2, 2));
        range.set_value((1, 1), DataType::String("title".into()));
        range.set_value((2, 2), DataType::Float(9876543210.0));

        let grid = range_to_grid(&range);
        assert_eq!(grid.len(), 3);
        assert!(grid[0].iter().all(Cell::is_empty));
        assert_eq!(grid[1], vec![Cell::Empty, Cell::text("title"), Cell::Empty]);
        assert_eq!(grid[2][2].to_text(), "9876543210");
    }
}
