//! strandquiz-report: Strand report rendering and export.

pub mod exporter;
pub mod html;

pub use exporter::FileExporter;
