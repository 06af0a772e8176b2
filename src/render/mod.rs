//! Rendering layer — trait-based table generator dispatch.

pub mod markdown;

use crate::error::{Error, Result};
use crate::model::FunctionEntity;

/// Trait for turning a class's member list into a documentation table.
///
/// `open_table` resets the generator for one class; members are added in
/// declaration order and `table` hands back the finished block with any
/// accumulated example sections appended.
pub trait TableGenerator: std::fmt::Debug {
    fn open_table(&mut self, include_see: bool);
    /// Toggle the `abstract` prefix on member names. Turned off for
    /// interfaces, where every member is implicitly abstract.
    fn declare_abstraction(&mut self, on: bool);
    fn add_func(&mut self, func: &FunctionEntity);
    fn table(&self) -> String;
}

/// Create a table generator for the given slug.
pub fn create_generator(slug: &str) -> Result<Box<dyn TableGenerator>> {
    match slug {
        "default" | "markdown" => Ok(Box::new(markdown::MarkdownTable::default())),
        _ => Err(Error::InvalidTableGenerator {
            slug: slug.to_string(),
        }),
    }
}
