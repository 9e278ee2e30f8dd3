pub mod catalog_reader;
pub mod ledger_writer;

pub use catalog_reader::CatalogReader;
pub use ledger_writer::LedgerWriter;
