//! In-memory backends and configuration values.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use crate::ir::{IrNode, NodeKind, NodeRef};
use crate::namespace::Namespace;
use crate::wiring::{PropertyValue, WiringSpec, display_value};

/// Property holding the value of a [`config`] node.
pub const VALUE_KEY: &str = "value";

/// A leaf backend component with no dependencies.
#[derive(Debug)]
pub struct BackendNode {
    name: String,
    type_name: &'static str,
}

impl BackendNode {
    /// Backend flavour, e.g. `SimpleCache`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl Display for BackendNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}()", self.name, self.type_name)
    }
}

impl IrNode for BackendNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Component
    }
}

/// Declare an in-memory cache called `name`.
#[track_caller]
pub fn cache(spec: &mut WiringSpec, name: &str) {
    define_backend(spec, name, "SimpleCache");
}

/// Declare an in-memory document store called `name`.
#[track_caller]
pub fn nosqldb(spec: &mut WiringSpec, name: &str) {
    define_backend(spec, name, "SimpleNoSQLDB");
}

#[track_caller]
fn define_backend(spec: &mut WiringSpec, name: &str, type_name: &'static str) {
    let node_name = name.to_owned();
    spec.define(name, NodeKind::Component, move |_: &mut Namespace<'_, '_>| {
        Ok(Arc::new(BackendNode {
            name: node_name.clone(),
            type_name,
        }) as NodeRef)
    });
}

/// A configuration value such as an address or a port.
#[derive(Debug)]
pub struct ConfigNode {
    name: String,
    value: PropertyValue,
}

impl ConfigNode {
    /// The configured value.
    #[must_use]
    pub const fn value(&self) -> &PropertyValue {
        &self.value
    }
}

impl Display for ConfigNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = Config({})", self.name, display_value(&self.value))
    }
}

impl IrNode for ConfigNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Config
    }
}

/// Declare a configuration node whose value is the `value` property.
///
/// The property is read when the node is built, so later `set_property`
/// calls override `value`.
#[track_caller]
pub fn config(spec: &mut WiringSpec, name: &str, value: impl Into<PropertyValue>) {
    spec.set_property(name, VALUE_KEY, value);
    let node_name = name.to_owned();
    spec.define(name, NodeKind::Config, move |ns: &mut Namespace<'_, '_>| {
        let mut current = PropertyValue::Null;
        ns.property(&node_name, VALUE_KEY, &mut current)?;
        Ok(Arc::new(ConfigNode {
            name: node_name.clone(),
            value: current,
        }) as NodeRef)
    });
}
