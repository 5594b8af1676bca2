//! Core library for the results-export command line application.
//!
//! The library turns the sheets of the study results workbook into the CSV
//! files served by the web application. IO adapters live under [`io`], the
//! in-memory table in [`model`], the sheet → CSV mapping table in [`catalog`],
//! and the per-sheet pipeline in [`convert`].

pub mod catalog;
pub mod convert;
pub mod error;
pub mod io;
pub mod model;

pub use error::{Result, ToolError};
