//! Per-definition key/value metadata with multi-value accumulation.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;

/// A single stored property value.
pub type PropertyValue = serde_json::Value;

/// Key under which `define` records where a definition was declared.
pub const CALLSITE_KEY: &str = "callsite";

/// Ordered multi-map of property key to values.
///
/// Keys keep their first insertion position so rendering is stable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Properties(IndexMap<String, Vec<PropertyValue>>);

impl Properties {
    /// Replace all values stored under `key` with `value`.
    pub fn set(&mut self, key: &str, value: PropertyValue) {
        self.0.insert(key.to_owned(), vec![value]);
    }

    /// Append `value` to the values stored under `key`.
    pub fn add(&mut self, key: &str, value: PropertyValue) {
        self.0.entry(key.to_owned()).or_default().push(value);
    }

    /// All values stored under `key`.
    #[must_use]
    pub fn values(&self, key: &str) -> &[PropertyValue] {
        self.0.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Read the single value stored under `key` into `dst`.
    ///
    /// `dst` receives `T::default()` when zero or several values are stored;
    /// ambiguity is treated as absence rather than as an error.
    ///
    /// # Errors
    ///
    /// Returns the deserialisation error if the single value is not a `T`.
    pub fn get<T>(&self, key: &str, dst: &mut T) -> Result<(), serde_json::Error>
    where
        T: DeserializeOwned + Default,
    {
        *dst = match self.values(key) {
            [value] => T::deserialize(value)?,
            _ => T::default(),
        };
        Ok(())
    }

    /// Read every value stored under `key` into `dst`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns the deserialisation error of the first value that is not a `T`;
    /// `dst` is left empty in that case.
    pub fn get_all<T>(&self, key: &str, dst: &mut Vec<T>) -> Result<(), serde_json::Error>
    where
        T: DeserializeOwned,
    {
        dst.clear();
        let values = self
            .values(key)
            .iter()
            .map(|value| T::deserialize(value))
            .collect::<Result<Vec<_>, _>>()?;
        dst.extend(values);
        Ok(())
    }

    /// Iterate keys and values, skipping the call-site bookkeeping entry.
    pub fn visible(&self) -> impl Iterator<Item = (&str, &[PropertyValue])> {
        self.0
            .iter()
            .filter(|(key, _)| key.as_str() != CALLSITE_KEY)
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }
}

/// Render a value the way it reads in a wiring listing: strings unquoted,
/// everything else as JSON.
pub(crate) fn display_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_replaces_and_add_accumulates() {
        let mut props = Properties::default();
        props.add("k", json!(1));
        props.add("k", json!(2));
        assert_eq!(props.values("k"), &[json!(1), json!(2)]);
        props.set("k", json!(3));
        assert_eq!(props.values("k"), &[json!(3)]);
    }

    #[test]
    fn get_reads_single_value() {
        let mut props = Properties::default();
        props.set("k", json!(1));
        let mut dst = 0_i64;
        props.get("k", &mut dst).expect("read");
        assert_eq!(dst, 1);
    }

    #[test]
    fn get_resets_on_ambiguity() {
        let mut props = Properties::default();
        props.add("k", json!(1));
        props.add("k", json!(2));
        let mut dst = 7_i64;
        props.get("k", &mut dst).expect("read");
        assert_eq!(dst, 0);
    }

    #[test]
    fn get_resets_when_absent() {
        let props = Properties::default();
        let mut dst = String::from("stale");
        props.get("missing", &mut dst).expect("read");
        assert!(dst.is_empty());
    }

    #[test]
    fn get_reports_type_mismatch() {
        let mut props = Properties::default();
        props.set("k", json!("text"));
        let mut dst = 0_u16;
        assert!(props.get("k", &mut dst).is_err());
    }

    #[test]
    fn get_all_copies_in_order() {
        let mut props = Properties::default();
        props.add("k", json!("a"));
        props.add("k", json!("b"));
        let mut dst = vec![String::from("old")];
        props.get_all("k", &mut dst).expect("read");
        assert_eq!(dst, vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn visible_hides_callsite() {
        let mut props = Properties::default();
        props.set(CALLSITE_KEY, json!("src/lib.rs:1:1"));
        props.set("port", json!(80));
        let keys: Vec<_> = props.visible().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["port"]);
    }

    #[test]
    fn display_value_leaves_strings_unquoted() {
        assert_eq!(display_value(&json!("x")), "x");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
    }
}
