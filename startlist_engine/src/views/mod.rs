pub mod export;

pub use export::{ExportConfig, ExportError, StartlistExportRow, StartlistExportView};
