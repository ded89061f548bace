//! Wirespec core library.
//!
//! Plugins declare named build recipes, aliases and properties on a
//! [`wiring::WiringSpec`]. [`wiring::WiringSpec::build_ir`] then resolves the
//! requested roots through nested [`namespace::Namespace`] scopes into an
//! [`ir::ApplicationGraph`], building every node exactly once and reporting
//! cycles and missing definitions as structured errors.
//!
//! The [`manifest`] and [`cli`] modules provide a YAML `Wiringfile` front end
//! over the bundled [`plugins`].

pub mod ast;
pub mod builder;
pub mod cli;
pub mod ir;
pub mod manifest;
pub mod namespace;
pub mod plugins;
pub mod runner;
pub mod wiring;
