pub mod document;
pub mod parser;

pub use document::*;
pub use parser::*;
