//! Error types for wiring and resolution.

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use itertools::Itertools;
use miette::Diagnostic;
use thiserror::Error;

use crate::ir::NodeKind;

/// Error returned by a plugin's build function.
pub type BuildFunctionError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors raised while resolving names and building nodes.
///
/// Every variant is fatal to the [`build_ir`](crate::wiring::WiringSpec::build_ir)
/// call it occurs in; no partial graph is returned.
#[derive(Debug, Error, Diagnostic)]
pub enum WiringError {
    /// The requested name, or the name its alias chain ends at, has no
    /// buildable definition.
    #[error("no definition for `{requested}`{}", not_found_suffix(.requested, .resolved))]
    #[diagnostic(
        code(wirespec::wiring::not_found),
        help("define the name, or alias it to an existing definition")
    )]
    NotFound {
        /// The name that was asked for.
        requested: String,
        /// Where the alias chain ended.
        resolved: String,
    },

    /// Build functions requested each other in a loop.
    #[error("circular dependency detected: {}", .cycle.join(" -> "))]
    #[diagnostic(code(wirespec::namespace::cyclic_dependency))]
    CyclicDependency {
        /// Names forming the cycle; the first name is repeated at the end.
        cycle: Vec<String>,
    },

    /// An alias chain never reaches a non-alias name.
    #[error("alias cycle detected: {}", .chain.join(" -> "))]
    #[diagnostic(code(wirespec::wiring::cyclic_alias))]
    CyclicAlias {
        /// Aliases visited; the repeated name closes the chain.
        chain: Vec<String>,
    },

    /// A plugin's build function failed; its error is passed through as is.
    #[error(transparent)]
    #[diagnostic(code(wirespec::namespace::build))]
    Build(BuildFunctionError),

    /// A build function returned a node of a different category than the
    /// definition declared.
    #[error("`{name}` is declared as {declared} but its build function returned a {actual} node")]
    #[diagnostic(code(wirespec::namespace::node_kind_mismatch))]
    NodeKindMismatch {
        /// Definition name.
        name: String,
        /// Category from the definition.
        declared: NodeKind,
        /// Category of the returned node.
        actual: NodeKind,
    },

    /// A typed lookup found a node of another concrete type.
    #[error("`{name}` is not a `{expected}`")]
    #[diagnostic(code(wirespec::namespace::node_type_mismatch))]
    NodeTypeMismatch {
        /// Definition name.
        name: String,
        /// Requested Rust type.
        expected: &'static str,
    },

    /// The name failed to build earlier in this resolution and is not retried.
    #[error("`{name}` failed to build earlier in this resolution")]
    #[diagnostic(code(wirespec::namespace::previously_failed))]
    PreviouslyFailed {
        /// Definition name.
        name: String,
    },

    /// A node was put into a namespace that already holds that name.
    #[error("`{name}` already exists in namespace `{namespace}`")]
    #[diagnostic(code(wirespec::namespace::already_built))]
    AlreadyBuilt {
        /// Node name.
        name: String,
        /// Namespace name.
        namespace: String,
    },

    /// Nested resolution went deeper than the configured limit.
    #[error("resolving `{name}` exceeded the maximum resolution depth of {limit}")]
    #[diagnostic(
        code(wirespec::namespace::depth_exceeded),
        help("raise `max_depth` or look for namespaces that recursively create each other")
    )]
    DepthExceeded {
        /// Name being resolved when the limit was hit.
        name: String,
        /// Configured limit.
        limit: usize,
    },

    /// A stored property value could not be read as the requested type.
    #[error("property `{key}` of `{name}` has an unexpected type")]
    #[diagnostic(code(wirespec::wiring::property))]
    Property {
        /// Definition name.
        name: String,
        /// Property key.
        key: String,
        /// Deserialisation failure.
        #[source]
        source: serde_json::Error,
    },
}

fn not_found_suffix(requested: &str, resolved: &str) -> String {
    if requested == resolved {
        String::new()
    } else {
        format!(" (alias resolves to `{resolved}`)")
    }
}

impl WiringError {
    /// Wrap a plugin error so it propagates unchanged through resolution.
    ///
    /// # Examples
    ///
    /// ```
    /// use wirespec::wiring::WiringError;
    ///
    /// let err = WiringError::build("missing port");
    /// assert_eq!(err.to_string(), "missing port");
    /// ```
    #[must_use]
    pub fn build(err: impl Into<BuildFunctionError>) -> Self {
        Self::Build(err.into())
    }

    pub(crate) fn property(name: &str, key: &str, source: serde_json::Error) -> Self {
        Self::Property {
            name: name.to_owned(),
            key: key.to_owned(),
            source,
        }
    }
}

/// A problem a plugin noticed while the wiring spec was being declared.
#[derive(Clone, Debug)]
pub struct ConfigurationError {
    error: Arc<dyn StdError + Send + Sync + 'static>,
    callsite: String,
}

impl ConfigurationError {
    pub(crate) fn new(error: BuildFunctionError, callsite: String) -> Self {
        Self {
            error: Arc::from(error),
            callsite,
        }
    }

    /// Source location of the `add_error` call.
    #[must_use]
    pub fn callsite(&self) -> &str {
        &self.callsite
    }
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.error, f)
    }
}

impl StdError for ConfigurationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.error.source()
    }
}

/// Aggregate of every configuration error recorded on a wiring spec.
#[derive(Clone, Debug, Error, Diagnostic)]
#[error("{}", render_errors(.errors))]
#[diagnostic(code(wirespec::wiring::configuration))]
pub struct ConfigurationErrors {
    /// Errors in the order they were added.
    pub errors: Vec<ConfigurationError>,
}

fn render_errors(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(idx, err)| format!("Error {idx}: {err}"))
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_mentions_alias_target_only_when_different() {
        let direct = WiringError::NotFound {
            requested: "a".into(),
            resolved: "a".into(),
        };
        assert_eq!(direct.to_string(), "no definition for `a`");
        let aliased = WiringError::NotFound {
            requested: "a".into(),
            resolved: "b".into(),
        };
        assert_eq!(
            aliased.to_string(),
            "no definition for `a` (alias resolves to `b`)"
        );
    }

    #[test]
    fn build_errors_are_transparent() {
        let err = WiringError::build(std::io::Error::other("disk on fire"));
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn configuration_errors_are_numbered() {
        let errors = ConfigurationErrors {
            errors: vec![
                ConfigurationError::new("first".into(), "a.rs:1:1".into()),
                ConfigurationError::new("second".into(), "a.rs:2:1".into()),
            ],
        };
        assert_eq!(errors.to_string(), "Error 0: first\nError 1: second");
        assert_eq!(errors.errors[1].callsite(), "a.rs:2:1");
    }
}
