//! XML tree construction and serialization.

mod tree;

pub use tree::{escape, NodeId, ProcessingInstruction, XmlTree};
