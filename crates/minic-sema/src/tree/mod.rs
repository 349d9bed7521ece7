//! Parse tree representation and its textual dump format
//!
//! The analyzer consumes an already-built parse tree produced by an external
//! parser. Nodes live in an arena indexed by [`NodeId`]; labels are a closed
//! set of grammar productions and terminals so no pass ever dispatches on
//! label strings.

mod node;
mod sexpr;

pub use node::{NodeId, NodeLabel, ParseTree, Production, Terminal};
pub use sexpr::TreeReader;
