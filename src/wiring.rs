//! The wiring spec: named definitions, aliases and their properties.
//!
//! Plugins write into a [`WiringSpec`] through `define`, `alias` and the
//! property setters, and report invalid combinations through `add_error`.
//! Nothing is built until [`WiringSpec::build_ir`] is called.
//!
//! A name lives in at most one of the two tables: defining a name drops any
//! alias of that name, and aliasing a name drops its definition.
//!
//! # Examples
//!
//! ```
//! use wirespec::wiring::WiringSpec;
//!
//! let mut spec = WiringSpec::new("app");
//! spec.set_property("db", "replicas", 1);
//! spec.add_property("db", "replicas", 2);
//!
//! let mut one = 0_u32;
//! spec.get_property("db", "replicas", &mut one).expect("read");
//! assert_eq!(one, 0, "two values are ambiguous for a single read");
//!
//! let mut all: Vec<u32> = Vec::new();
//! spec.get_properties("db", "replicas", &mut all).expect("read");
//! assert_eq!(all, vec![1, 2]);
//! ```

mod alias;
mod def;
mod error;
mod property;

use std::fmt::{self, Display, Formatter};
use std::panic::Location;
use std::sync::Arc;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use tracing::debug;

pub use def::{BuildFn, WiringDef, WiringOpts};
pub use error::{BuildFunctionError, ConfigurationError, ConfigurationErrors, WiringError};
pub use property::{CALLSITE_KEY, Properties, PropertyValue};
pub(crate) use property::display_value;

use crate::ir::{NodeKind, NodeRef, indent};
use crate::namespace::Namespace;

/// Registry of definitions and aliases describing an application.
#[derive(Debug, Default)]
pub struct WiringSpec {
    name: String,
    defs: IndexMap<String, WiringDef>,
    aliases: IndexMap<String, String>,
    errors: Vec<ConfigurationError>,
}

impl WiringSpec {
    /// Create an empty wiring spec for the application `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Application name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up `name` as a definition, creating an empty one if absent.
    fn def_mut(&mut self, name: &str) -> &mut WiringDef {
        if !self.defs.contains_key(name) && self.aliases.shift_remove(name).is_some() {
            debug!(name, "definition replaces alias");
        }
        self.defs
            .entry(name.to_owned())
            .or_insert_with(|| WiringDef::placeholder(name))
    }

    /// Define how to build the node `name`.
    ///
    /// `kind` names the category of node the build function returns. On
    /// redefinition the kind, build function and options are replaced while
    /// properties are kept. The caller's location is stored under the
    /// `callsite` property.
    #[track_caller]
    pub fn define<F>(&mut self, name: &str, kind: NodeKind, build: F)
    where
        F: Fn(&mut Namespace<'_, '_>) -> Result<NodeRef, WiringError> + Send + Sync + 'static,
    {
        self.define_with(name, kind, WiringOpts::default(), build);
    }

    /// Define `name` with explicit [`WiringOpts`].
    #[track_caller]
    pub fn define_with<F>(&mut self, name: &str, kind: NodeKind, options: WiringOpts, build: F)
    where
        F: Fn(&mut Namespace<'_, '_>) -> Result<NodeRef, WiringError> + Send + Sync + 'static,
    {
        let callsite = Location::caller().to_string();
        let def = self.def_mut(name);
        def.redefine(kind, Arc::new(build), options);
        def.properties.set(CALLSITE_KEY, PropertyValue::String(callsite));
        debug!(name, %kind, proxy = options.proxy, "defined node");
    }

    /// Resolve aliases and return the definition `name` ends at.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::CyclicAlias`] for a looping alias chain and
    /// [`WiringError::NotFound`] when the chain ends at an unknown name.
    pub fn get_def(&self, name: &str) -> Result<&WiringDef, WiringError> {
        let resolved = self.resolve_alias(name)?;
        self.defs.get(&resolved).ok_or_else(|| WiringError::NotFound {
            requested: name.to_owned(),
            resolved,
        })
    }

    /// Names of every definition (aliases excluded).
    ///
    /// Callers must not rely on the order.
    pub fn defs(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    /// Point `name` at `target`, dropping any definition of `name`.
    pub fn alias(&mut self, name: &str, target: &str) {
        if self.defs.shift_remove(name).is_some() {
            debug!(name, target, "alias replaces definition");
        }
        self.aliases.insert(name.to_owned(), target.to_owned());
    }

    /// The direct target of the alias `name`, if it is one.
    #[must_use]
    pub fn get_alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// Follow `name` through the alias table to the name it ends at.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::CyclicAlias`] when the chain loops.
    pub fn resolve_alias(&self, name: &str) -> Result<String, WiringError> {
        alias::resolve(&self.aliases, name)
    }

    /// Replace every value of `key` on `name` with `value`.
    pub fn set_property(&mut self, name: &str, key: &str, value: impl Into<PropertyValue>) {
        self.def_mut(name).properties.set(key, value.into());
    }

    /// Append `value` to the values of `key` on `name`.
    pub fn add_property(&mut self, name: &str, key: &str, value: impl Into<PropertyValue>) {
        self.def_mut(name).properties.add(key, value.into());
    }

    /// Read the single value of `key` on `name` into `dst`.
    ///
    /// Zero or several stored values reset `dst` to `T::default()`. An
    /// unknown `name` is registered as an empty definition, as with the
    /// setters; aliases are followed first so an alias is never replaced.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::Property`] when the value is not a `T` and
    /// [`WiringError::CyclicAlias`] when `name` is a looping alias.
    pub fn get_property<T>(&mut self, name: &str, key: &str, dst: &mut T) -> Result<(), WiringError>
    where
        T: DeserializeOwned + Default,
    {
        let resolved = self.resolve_alias(name)?;
        self.def_mut(&resolved)
            .properties
            .get(key, dst)
            .map_err(|source| WiringError::property(&resolved, key, source))
    }

    /// Read every value of `key` on `name` into `dst`.
    ///
    /// # Errors
    ///
    /// As for [`WiringSpec::get_property`].
    pub fn get_properties<T>(&mut self, name: &str, key: &str, dst: &mut Vec<T>) -> Result<(), WiringError>
    where
        T: DeserializeOwned,
    {
        let resolved = self.resolve_alias(name)?;
        self.def_mut(&resolved)
            .properties
            .get_all(key, dst)
            .map_err(|source| WiringError::property(&resolved, key, source))
    }

    /// Record a configuration problem without interrupting declaration.
    #[track_caller]
    pub fn add_error(&mut self, err: impl Into<BuildFunctionError>) {
        let callsite = Location::caller().to_string();
        self.errors.push(ConfigurationError::new(err.into(), callsite));
    }

    /// Configuration errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &[ConfigurationError] {
        &self.errors
    }

    /// Check for recorded configuration errors.
    ///
    /// # Errors
    ///
    /// Returns every recorded error as one [`ConfigurationErrors`].
    pub fn err(&self) -> Result<(), ConfigurationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationErrors {
                errors: self.errors.clone(),
            })
        }
    }

    pub(crate) fn definition(&self, name: &str) -> Option<&WiringDef> {
        self.defs.get(name)
    }
}

impl Display for WiringSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let body = self
            .defs
            .values()
            .map(ToString::to_string)
            .chain(
                self.aliases
                    .iter()
                    .map(|(alias, target)| format!("{alias} -> {target}")),
            )
            .join("\n");
        writeln!(f, "{} = WiringSpec {{", self.name)?;
        if !body.is_empty() {
            writeln!(f, "{}", indent(&body, 2))?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IrNode;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[derive(Debug)]
    struct Marker;

    impl Display for Marker {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str("marker = Marker()")
        }
    }

    impl IrNode for Marker {
        fn name(&self) -> &str {
            "marker"
        }

        fn kind(&self) -> NodeKind {
            NodeKind::Component
        }
    }

    fn marker(_: &mut Namespace<'_, '_>) -> Result<NodeRef, WiringError> {
        Ok(Arc::new(Marker))
    }

    #[fixture]
    fn spec() -> WiringSpec {
        WiringSpec::new("test")
    }

    #[rstest]
    fn define_stamps_callsite(mut spec: WiringSpec) {
        spec.define("a", NodeKind::Component, marker);
        let def = spec.get_def("a").expect("def");
        let callsite = def.properties.values(CALLSITE_KEY);
        assert_eq!(callsite.len(), 1);
        assert!(
            callsite
                .first()
                .and_then(PropertyValue::as_str)
                .is_some_and(|s| s.contains("wiring.rs")),
            "callsite should point at this file: {callsite:?}"
        );
    }

    #[rstest]
    fn redefinition_keeps_properties(mut spec: WiringSpec) {
        spec.set_property("s", "p", 1);
        spec.define("s", NodeKind::Component, marker);
        spec.define("s", NodeKind::Config, marker);
        let mut p = 0_i32;
        spec.get_property("s", "p", &mut p).expect("read");
        assert_eq!(p, 1);
        assert_eq!(spec.get_def("s").expect("def").node_kind(), Some(NodeKind::Config));
    }

    #[rstest]
    fn alias_removes_definition(mut spec: WiringSpec) {
        spec.define("a", NodeKind::Component, marker);
        spec.alias("a", "b");
        assert_eq!(spec.defs().count(), 0);
        assert_eq!(spec.get_alias("a"), Some("b"));
    }

    #[rstest]
    fn define_removes_alias(mut spec: WiringSpec) {
        spec.alias("a", "b");
        spec.define("a", NodeKind::Component, marker);
        assert_eq!(spec.get_alias("a"), None);
        assert_eq!(spec.defs().collect::<Vec<_>>(), vec!["a"]);
    }

    #[rstest]
    fn property_write_removes_alias(mut spec: WiringSpec) {
        spec.alias("a", "b");
        spec.set_property("a", "k", "v");
        assert_eq!(spec.get_alias("a"), None);
    }

    #[rstest]
    fn get_def_follows_aliases(mut spec: WiringSpec) {
        spec.alias("x", "y");
        spec.define("y", NodeKind::Component, marker);
        assert_eq!(spec.get_def("x").expect("def").name(), "y");
    }

    #[rstest]
    fn get_def_reports_terminal_alias(mut spec: WiringSpec) {
        spec.alias("x", "y");
        match spec.get_def("x").expect_err("missing") {
            WiringError::NotFound { requested, resolved } => {
                assert_eq!(requested, "x");
                assert_eq!(resolved, "y");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    fn property_getters_register_unknown_names(mut spec: WiringSpec) {
        let mut dst = String::new();
        spec.get_property("ghost", "k", &mut dst).expect("read");
        assert_eq!(spec.defs().collect::<Vec<_>>(), vec!["ghost"]);
        assert!(!spec.get_def("ghost").expect("def").is_defined());
    }

    #[rstest]
    fn property_getters_read_through_aliases(mut spec: WiringSpec) {
        spec.set_property("y", "k", "v");
        spec.alias("x", "y");
        let mut dst = String::new();
        spec.get_property("x", "k", &mut dst).expect("read");
        assert_eq!(dst, "v");
        assert_eq!(spec.get_alias("x"), Some("y"));
    }

    #[rstest]
    fn property_type_mismatch_is_reported(mut spec: WiringSpec) {
        spec.set_property("n", "k", json!({"nested": true}));
        let mut dst = 0_u8;
        assert!(matches!(
            spec.get_property("n", "k", &mut dst),
            Err(WiringError::Property { .. })
        ));
    }

    #[rstest]
    fn errors_accumulate_without_interrupting(mut spec: WiringSpec) {
        assert!(spec.err().is_ok());
        spec.add_error("first problem");
        spec.define("a", NodeKind::Component, marker);
        spec.add_error(format!("second problem with {}", "a"));
        let errors = spec.err().expect_err("errors");
        assert_eq!(errors.errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "Error 0: first problem\nError 1: second problem with a"
        );
        assert_eq!(spec.errors().len(), 2, "errors are never cleared");
    }

    #[rstest]
    fn display_lists_definitions_then_aliases(mut spec: WiringSpec) {
        spec.define("db", NodeKind::Component, marker);
        spec.set_property("db", "replicas", 2);
        spec.alias("database", "db");
        assert_eq!(
            spec.to_string(),
            "test = WiringSpec {\n  db = Component(replicas=2)\n  database -> db\n}"
        );
    }

    #[rstest]
    fn display_of_empty_spec(spec: WiringSpec) {
        assert_eq!(spec.to_string(), "test = WiringSpec {\n}");
    }
}
