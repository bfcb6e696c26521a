pub mod export;

pub use export::{write_transactions_csv, ExportKind, Exporter};
