//! Test utilities shared by the integration tests.
//!
//! [`nodes`] provides a generic IR node and build functions that count their
//! invocations; [`binary`] runs the compiled binary against a temporary
//! `Wiringfile`.

pub mod binary;
pub mod nodes;

pub use binary::{WirespecRun, run_wirespec_in, workspace_with, write_wiringfile};
pub use nodes::{TestNode, define_counting, define_counting_kind, leaf_spec};
