//! Flat JSON string maps (`{"key": "value", ...}`).

use std::{collections::BTreeMap, path::Path};

use serde_json::Value;

use super::{Catalog, Codec, StringEntry};
use crate::error::{LayerError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn parse(&self, content: &str, path: &Path) -> Result<Catalog> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| LayerError::malformed(path, e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(LayerError::malformed(path, "root of JSON file must be an object"));
        };

        let mut catalog = Catalog::new((*self).into(), path);
        for (key, value) in map {
            match value {
                Value::String(s) => {
                    catalog.push(StringEntry::new(key, s));
                }
                other => {
                    return Err(LayerError::malformed(
                        path,
                        format!("value for key '{key}' is not a string: {other}"),
                    ));
                }
            }
        }
        Ok(catalog)
    }

    /// Keys sorted, 2-space indentation, trailing newline.
    fn render(&self, catalog: &Catalog) -> Result<String> {
        let sorted: BTreeMap<&str, &str> = catalog
            .entries()
            .map(|e| (e.key.as_str(), e.value.as_str()))
            .collect();
        let content = serde_json::to_string_pretty(&sorted)
            .map_err(|e| LayerError::malformed(catalog.path(), e.to_string()))?;
        Ok(format!("{content}\n"))
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(content: &str) -> Result<Catalog> {
        JsonCodec.parse(content, Path::new("messages/fr.json"))
    }

    #[test]
    fn test_parse_keeps_file_order() {
        let catalog = parse(r#"{"b": "2", "a": "1", "c": ""}"#).unwrap();
        let keys: Vec<&str> = catalog.entries().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(catalog.get("c").map(|e| e.value.as_str()), Some(""));
    }

    #[test]
    fn test_render_sorted_with_stable_indentation() {
        let catalog = parse(r#"{"zeta": "Zêta", "alpha": "Alpha \"quoted\""}"#).unwrap();
        insta::assert_snapshot!(catalog.render().unwrap(), @r#"
        {
          "alpha": "Alpha \"quoted\"",
          "zeta": "Zêta"
        }
        "#);
    }

    #[test]
    fn test_render_empty_map() {
        let catalog = parse("{}").unwrap();
        assert_eq!(catalog.render().unwrap(), "{}\n");
    }

    #[test]
    fn test_rejects_non_object_root() {
        let err = parse(r#"["a"]"#).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }

    #[test]
    fn test_rejects_nested_values() {
        let err = parse(r#"{"a": {"b": "c"}}"#).unwrap_err();
        assert!(matches!(err, LayerError::MalformedCatalog { .. }));
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_rejects_invalid_json() {
        assert!(parse(r#"{"a": "#).is_err());
    }
}
