//! Document plumbing: locate data files, detect their format, and read them
//! into the generic value tree the configuration registry consumes.

pub mod loader;

pub use loader::{
    DataLoadError, Format, deserialize_file, detect_format, find_data_file, load_document,
    parse_document, parse_str, require_data_file,
};
