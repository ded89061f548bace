//! Alias chain resolution.

use indexmap::{IndexMap, IndexSet};

use super::WiringError;

/// Follow `name` through `aliases` until a name with no alias is reached.
///
/// The terminal name is returned whether or not it has a definition;
/// callers distinguish "resolved but undefined" themselves.
///
/// # Errors
///
/// Returns [`WiringError::CyclicAlias`] when the chain revisits a name.
pub(crate) fn resolve(aliases: &IndexMap<String, String>, name: &str) -> Result<String, WiringError> {
    let mut visited: IndexSet<&str> = IndexSet::new();
    let mut current = name;
    visited.insert(current);
    while let Some(next) = aliases.get(current) {
        if !visited.insert(next.as_str()) {
            let mut chain: Vec<String> = visited.iter().map(|n| (*n).to_owned()).collect();
            chain.push(next.clone());
            return Err(WiringError::CyclicAlias { chain });
        }
        current = next;
    }
    Ok(current.to_owned())
}
