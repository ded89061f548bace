//! Intermediate Representation structures.
//!
//! This module defines the resolved application graph produced by
//! [`WiringSpec::build_ir`](crate::wiring::WiringSpec::build_ir). Nodes are
//! opaque to the core: plugins implement [`IrNode`] for whatever they build,
//! and downstream generators inspect the graph through that trait.
//!
//! # Examples
//!
//! ```
//! use std::fmt;
//! use std::sync::Arc;
//! use wirespec::ir::{IrNode, NodeKind, NodeRef};
//!
//! #[derive(Debug)]
//! struct Cache(String);
//!
//! impl fmt::Display for Cache {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "{} = Cache()", self.0)
//!     }
//! }
//!
//! impl IrNode for Cache {
//!     fn name(&self) -> &str {
//!         &self.0
//!     }
//!     fn kind(&self) -> NodeKind {
//!         NodeKind::Component
//!     }
//! }
//!
//! let node: NodeRef = Arc::new(Cache("c".into()));
//! assert_eq!(node.to_string(), "c = Cache()");
//! ```

mod dot;
mod graph;
mod node;
mod pretty;

pub use dot::to_dot;
pub use graph::{ApplicationGraph, Dependency, GraphSummary, NodeSummary};
pub use node::{AsAny, IrNode, NodeKind, NodeRef, ScopeContents, downcast};
pub use pretty::{indent, render_namespace};
