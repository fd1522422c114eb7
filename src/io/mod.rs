//! File adapters: the intake directory, workbook reading, the canonical CSV
//! table, and workbook export.

pub mod excel_read;
pub mod excel_write;
pub mod intake;
pub mod table;
