//! Reporter module for output formatting

pub mod console;
pub mod csv;
pub mod document;
pub mod feedback;
pub mod json;

pub use console::ConsoleReporter;
pub use csv::CsvWriter;
pub use document::{DocumentWriter, TextDocumentWriter};
pub use json::JsonReporter;
