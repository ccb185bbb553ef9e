// File format handlers
pub mod csv;
pub mod rdmf;

pub use csv::{export_channels_csv, export_contacts_csv, import_contacts_csv, CsvError};
pub use rdmf::{load_rdmf, save_rdmf, RdmfError};
