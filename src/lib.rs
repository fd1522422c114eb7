//! Core library for the roster-tools command line application.
//!
//! The library consolidates "Student Master" workbook exports into a single
//! canonical table and answers birthday lookups against it. IO adapters live
//! under [`io`], data representations inside [`model`], header promotion and
//! field clean-up in [`normalize`] and [`coerce`], the run orchestration in
//! [`consolidate`], and query-time header mapping in [`lookup`].

pub mod coerce;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod io;
pub mod lookup;
pub mod model;
pub mod normalize;

pub use error::{Result, ToolError};
