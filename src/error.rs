//! Error types for documentation generation.

use thiserror::Error;

/// Errors that abort a documentation run.
///
/// Malformed tag lines never end up here; they are skipped where they
/// occur. These are the failures the caller asked for something that
/// cannot be produced.
#[derive(Error, Debug)]
pub enum Error {
    /// A requested class, interface or trait is not in the type registry.
    #[error("unknown class or interface: {name}")]
    UnknownType { name: String },

    /// The run retained no classes at all, so there is nothing to document.
    #[error("no classes found")]
    NoMatchingTypes,

    /// The `--table-generator` slug names no known generator.
    #[error("unknown table generator: {slug}. Use default or markdown")]
    InvalidTableGenerator { slug: String },
}

pub type Result<T> = std::result::Result<T, Error>;
