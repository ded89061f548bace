//! Reference plugins.
//!
//! Plugins only use the public registration surface of
//! [`WiringSpec`](crate::wiring::WiringSpec) and the [`Namespace`](crate::namespace::Namespace)
//! handed to their build functions. They double as examples of how a plugin
//! declares nodes, nests namespaces and reports bad declarations.

pub mod goproc;
pub mod linuxcontainer;
pub mod simple;
pub mod workflow;

use crate::builder::DefaultBuilders;

/// Register the default wrappers of every bundled deployment plugin.
pub fn register_default_builders(builders: &mut DefaultBuilders) {
    goproc::register_default_builders(builders);
    linuxcontainer::register_default_builders(builders);
}
