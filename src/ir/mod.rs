pub mod builder;
pub mod graph;
pub mod node;
pub mod value;

pub use builder::*;
pub use graph::*;
pub use node::*;
pub use value::*;
