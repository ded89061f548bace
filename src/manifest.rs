//! Manifest loading.
//!
//! A `Wiringfile` is parsed in two steps: `serde-saphyr` turns the YAML into
//! JSON values, which are then deserialised into [`WiringManifest`]. Syntax
//! errors carry the source location; schema errors name the manifest.
//!
//! [`apply`] replays the manifest onto a [`WiringSpec`] through the bundled
//! plugins. Invalid declarations are recorded with
//! [`WiringSpec::add_error`] rather than aborting, so one run reports every
//! problem in the file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use itertools::Itertools;
use tracing::debug;

use crate::ast::{NodeDecl, Plugin, PropertyMode, WiringManifest};
use crate::plugins::{goproc, linuxcontainer, simple, workflow};
use crate::wiring::WiringSpec;

mod diagnostics;

pub use diagnostics::ManifestError;
use diagnostics::{map_data_error, map_yaml_error};

/// Major manifest version this build understands.
pub const SUPPORTED_MAJOR: u64 = 1;

fn from_str_named(yaml: &str, name: &str) -> Result<WiringManifest, ManifestError> {
    let doc: serde_json::Value =
        serde_saphyr::from_str(yaml).map_err(|e| ManifestError::Parse {
            name: name.to_owned(),
            source: map_yaml_error(e, yaml, name),
        })?;
    let manifest: WiringManifest =
        serde_json::from_value(doc).map_err(|e| ManifestError::Parse {
            name: name.to_owned(),
            source: map_data_error(e, name),
        })?;
    if manifest.wiring_version.major != SUPPORTED_MAJOR {
        return Err(ManifestError::UnsupportedVersion {
            version: manifest.wiring_version,
        });
    }
    debug!(manifest = name, nodes = manifest.nodes.len(), "parsed manifest");
    Ok(manifest)
}

/// Parse a manifest from a YAML string.
///
/// # Errors
///
/// Returns [`ManifestError::Parse`] for malformed YAML or schema mismatches and
/// [`ManifestError::UnsupportedVersion`] for a non-1.x `wiring_version`.
///
/// # Examples
///
/// ```
/// let manifest = wirespec::manifest::from_str(
///     "wiring_version: 1.0.0\nname: app\nnodes:\n  - name: c\n    plugin: cache\n",
/// )
/// .expect("parse");
/// assert_eq!(manifest.name, "app");
/// ```
pub fn from_str(yaml: &str) -> Result<WiringManifest, ManifestError> {
    from_str_named(yaml, "Wiringfile")
}

/// Load a manifest from `path`.
///
/// # Errors
///
/// Returns [`ManifestError::Read`] if the file cannot be read, otherwise as
/// for [`from_str`].
pub fn from_path(path: impl AsRef<Path>) -> Result<WiringManifest, ManifestError> {
    let path_ref = path.as_ref();
    let data = fs::read_to_string(path_ref).map_err(|source| ManifestError::Read {
        path: path_ref.to_path_buf(),
        source,
    })?;
    from_str_named(&data, &path_ref.display().to_string())
}

/// Declare everything in `manifest` on `spec` and return the roots to build.
///
/// Nodes are declared first, then aliases, then properties, so a property
/// entry can override a plugin default.
pub fn apply(manifest: &WiringManifest, spec: &mut WiringSpec) -> Vec<String> {
    let mut declared: HashSet<&str> = HashSet::new();
    for node in &manifest.nodes {
        if declared.insert(node.name.as_str()) {
            declare(spec, node);
        } else {
            spec.add_error(format!("node `{}` is declared more than once", node.name));
        }
    }
    for (alias, target) in &manifest.aliases {
        spec.alias(alias, target);
    }
    for prop in &manifest.properties {
        match prop.mode {
            PropertyMode::Set => spec.set_property(&prop.name, &prop.key, prop.value.clone()),
            PropertyMode::Add => spec.add_property(&prop.name, &prop.key, prop.value.clone()),
        }
    }
    if manifest.instantiate.is_empty() {
        manifest
            .nodes
            .iter()
            .map(|node| node.name.clone())
            .unique()
            .collect()
    } else {
        manifest.instantiate.to_vec()
    }
}

/// Build a fresh wiring spec from `manifest`.
///
/// Returns the wiring and the roots to build.
#[must_use]
pub fn to_spec(manifest: &WiringManifest) -> (WiringSpec, Vec<String>) {
    let mut spec = WiringSpec::new(manifest.name.clone());
    let roots = apply(manifest, &mut spec);
    (spec, roots)
}

fn declare(spec: &mut WiringSpec, node: &NodeDecl) {
    let unused = unused_fields(node);
    if !unused.is_empty() {
        spec.add_error(format!(
            "{} node `{}` does not use {}",
            node.plugin,
            node.name,
            unused.join(", ")
        ));
    }
    let name = node.name.as_str();
    match node.plugin {
        Plugin::Cache => simple::cache(spec, name),
        Plugin::Nosqldb => simple::nosqldb(spec, name),
        Plugin::Config => match &node.value {
            Some(value) => simple::config(spec, name, value.clone()),
            None => spec.add_error(format!("config node `{name}` needs a `value`")),
        },
        Plugin::Service => match &node.type_name {
            Some(type_name) => {
                workflow::service(spec, name, type_name, &node.args.to_vec());
            }
            None => spec.add_error(format!("service node `{name}` needs a `type`")),
        },
        Plugin::Process => {
            goproc::create_process(spec, name, &node.contains.to_vec());
        }
        Plugin::Container => {
            linuxcontainer::create_container(spec, name, &node.contains.to_vec());
        }
    }
}

fn unused_fields(node: &NodeDecl) -> Vec<&'static str> {
    let accepts = |field: &str| match node.plugin {
        Plugin::Cache | Plugin::Nosqldb => false,
        Plugin::Config => field == "value",
        Plugin::Service => matches!(field, "type" | "args"),
        Plugin::Process | Plugin::Container => field == "contains",
    };
    [
        ("type", node.type_name.is_some()),
        ("args", !node.args.is_empty()),
        ("contains", !node.contains.is_empty()),
        ("value", node.value.is_some()),
    ]
    .into_iter()
    .filter(|(field, present)| *present && !accepts(field))
    .map(|(field, _)| field)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const LEAF: &str = "\
wiring_version: 1.0.0
name: leaf_app
nodes:
  - name: leaf_cache
    plugin: cache
  - name: leaf_db
    plugin: nosqldb
  - name: leaf
    plugin: service
    type: LeafService
    args: [leaf_cache, leaf_db]
";

    #[test]
    fn roots_default_to_every_node() {
        let manifest = from_str(LEAF).expect("parse");
        let (spec, roots) = to_spec(&manifest);
        assert_eq!(roots, vec!["leaf_cache", "leaf_db", "leaf"]);
        assert!(spec.err().is_ok());
    }

    #[rstest]
    #[case("wiring_version: 2.0.0\nname: app\n")]
    #[case("wiring_version: 0.9.0\nname: app\n")]
    fn other_major_versions_are_rejected(#[case] yaml: &str) {
        assert!(matches!(
            from_str(yaml),
            Err(ManifestError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn unknown_fields_are_parse_errors() {
        let err = from_str("wiring_version: 1.0.0\nname: app\nextra: true\n").expect_err("unknown");
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn misused_fields_are_configuration_errors() {
        let manifest = from_str(
            "wiring_version: 1.0.0\nname: app\nnodes:\n  - name: c\n    plugin: cache\n    args: x\n  - name: s\n    plugin: service\n",
        )
        .expect("parse");
        let (spec, _) = to_spec(&manifest);
        let errors = spec.err().expect_err("misuse");
        assert_eq!(
            errors.to_string(),
            "Error 0: cache node `c` does not use args\nError 1: service node `s` needs a `type`"
        );
    }

    #[test]
    fn duplicate_nodes_are_reported_once_declared() {
        let manifest = from_str(
            "wiring_version: 1.0.0\nname: app\nnodes:\n  - name: c\n    plugin: cache\n  - name: c\n    plugin: nosqldb\n",
        )
        .expect("parse");
        let (spec, roots) = to_spec(&manifest);
        assert_eq!(roots, vec!["c"]);
        assert_eq!(spec.errors().len(), 1);
    }
}
