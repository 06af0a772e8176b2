//! Parsing layer: the PHP source scanner and the doc-comment tag grammar.

pub mod comment;
pub mod php;
