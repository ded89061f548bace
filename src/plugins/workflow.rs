//! Application services and their constructor arguments.
//!
//! A service `name` is declared as the definition `"{name}.handler"` with
//! `name` aliased to it, so wrappers can later re-point `name` at a client
//! or server stub without touching the handler.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use itertools::Itertools;

use crate::ir::{IrNode, NodeKind, NodeRef};
use crate::namespace::Namespace;
use crate::wiring::WiringSpec;

/// Property naming the service type of a handler.
pub const TYPE_KEY: &str = "type";
/// Property listing the constructor arguments of a handler.
pub const ARGS_KEY: &str = "args";

/// A service instance together with the nodes passed to its constructor.
#[derive(Debug)]
pub struct ServiceNode {
    name: String,
    type_name: String,
    args: Vec<NodeRef>,
}

impl ServiceNode {
    /// Service type, e.g. `LeafService`.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Constructor arguments in declaration order.
    #[must_use]
    pub fn args(&self) -> &[NodeRef] {
        &self.args
    }
}

impl Display for ServiceNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let args = self.args.iter().map(|arg| arg.name()).join(", ");
        write!(f, "{} = {}({args})", self.name, self.type_name)
    }
}

impl IrNode for ServiceNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Component
    }
}

/// Name of the definition backing the service `name`.
#[must_use]
pub fn handler_name(name: &str) -> String {
    format!("{name}.handler")
}

/// Declare the service `name` of type `type_name` built from `args`.
///
/// Each argument is resolved with [`Namespace::get`] when the service is
/// built. Returns the handler definition name.
///
/// # Examples
///
/// ```
/// use wirespec::plugins::{simple, workflow};
/// use wirespec::wiring::WiringSpec;
///
/// let mut spec = WiringSpec::new("app");
/// simple::cache(&mut spec, "cache");
/// workflow::service(&mut spec, "front", "FrontendService", &["cache"]);
/// assert_eq!(spec.get_alias("front"), Some("front.handler"));
///
/// let graph = spec.build_ir(&["front"]).expect("build");
/// assert_eq!(
///     graph.to_string(),
///     "app = Application() {\n  cache = SimpleCache()\n  front = FrontendService(cache)\n}"
/// );
/// ```
#[track_caller]
pub fn service<S: AsRef<str>>(spec: &mut WiringSpec, name: &str, type_name: &str, args: &[S]) -> String {
    let handler = handler_name(name);
    let args: Vec<String> = args.iter().map(|arg| arg.as_ref().to_owned()).collect();
    for duplicate in args.iter().duplicates() {
        spec.add_error(format!(
            "service `{name}` lists argument `{duplicate}` more than once"
        ));
    }

    spec.set_property(&handler, TYPE_KEY, type_name);
    for arg in &args {
        spec.add_property(&handler, ARGS_KEY, arg.as_str());
    }

    let node_name = name.to_owned();
    let type_name = type_name.to_owned();
    spec.define(&handler, NodeKind::Component, move |ns: &mut Namespace<'_, '_>| {
        let resolved = args
            .iter()
            .map(|arg| ns.get(arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::new(ServiceNode {
            name: node_name.clone(),
            type_name: type_name.clone(),
            args: resolved,
        }) as NodeRef)
    });
    spec.alias(name, &handler);
    handler
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::downcast;
    use crate::plugins::simple;

    #[test]
    fn service_resolves_arguments_in_order() {
        let mut spec = WiringSpec::new("app");
        simple::nosqldb(&mut spec, "db");
        simple::cache(&mut spec, "cache");
        service(&mut spec, "svc", "Svc", &["db", "cache"]);
        let graph = spec.build_ir(&["svc"]).expect("build");
        let node = graph.node("svc").cloned().expect("svc");
        let svc = downcast::<ServiceNode>(node).expect("service node");
        let names: Vec<_> = svc.args().iter().map(|arg| arg.name().to_owned()).collect();
        assert_eq!(names, vec!["db", "cache"]);
        assert_eq!(svc.type_name(), "Svc");
    }

    #[test]
    fn duplicate_arguments_are_reported() {
        let mut spec = WiringSpec::new("app");
        service(&mut spec, "svc", "Svc", &["db", "db"]);
        let errors = spec.err().expect_err("duplicate argument");
        assert_eq!(
            errors.to_string(),
            "Error 0: service `svc` lists argument `db` more than once"
        );
    }

    #[test]
    fn handler_records_type_and_arguments() {
        let mut spec = WiringSpec::new("app");
        service(&mut spec, "svc", "Svc", &["a", "b"]);
        let mut args: Vec<String> = Vec::new();
        spec.get_properties("svc", ARGS_KEY, &mut args).expect("read");
        assert_eq!(args, vec!["a", "b"]);
    }
}
