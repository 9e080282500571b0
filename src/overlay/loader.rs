//! Overlay file loading
//!
//! Decodes a flat key/value configuration file into an [`OverlayMap`].
//! Format is keyed on the file extension: YAML, TOML, or JSON. A missing,
//! unreadable, or malformed file is fatal — there is no silent fallback to
//! compiled-in defaults.

use crate::error::{Error, Result};
use crate::flag::FlagValue;
use crate::overlay::OverlayMap;
use std::fs;
use std::path::Path;

/// Load an overlay mapping from `path`.
///
/// Only a flat mapping of scalars and homogeneous lists is accepted; nested
/// tables are an error. Entries with no typed representation (e.g. a list
/// mixing strings and numbers) are skipped with a warning.
pub fn load_overlay(path: &Path) -> Result<OverlayMap> {
    let content =
        fs::read_to_string(path).map_err(|e| source_error(path, e.to_string()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let map = match ext.as_str() {
        "yaml" | "yml" => decode_yaml(&content, path)?,
        "toml" => decode_toml(&content, path)?,
        "json" => decode_json(&content, path)?,
        other => {
            return Err(source_error(path, format!("unsupported overlay extension '.{other}'")))
        }
    };

    tracing::debug!(path = %path.display(), entries = map.len(), "loaded overlay");
    Ok(map)
}

fn source_error(path: &Path, reason: String) -> Error {
    Error::OverlaySource { path: path.to_path_buf(), reason }
}

fn decode_yaml(content: &str, path: &Path) -> Result<OverlayMap> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| source_error(path, format!("invalid YAML syntax: {e}")))?;

    let serde_yaml::Value::Mapping(mapping) = raw else {
        return Err(source_error(path, "overlay must be a flat key/value mapping".to_string()));
    };

    let mut map = OverlayMap::new();
    for (key, value) in mapping {
        let Some(name) = key.as_str().map(str::to_string) else {
            return Err(source_error(path, "overlay keys must be strings".to_string()));
        };
        if let Some(converted) = convert_yaml(&name, value, path)? {
            map.insert(name, converted);
        }
    }
    Ok(map)
}

fn convert_yaml(name: &str, value: serde_yaml::Value, path: &Path) -> Result<Option<FlagValue>> {
    match value {
        serde_yaml::Value::Bool(b) => Ok(Some(FlagValue::Bool(b))),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(FlagValue::Int(i)))
            } else {
                Ok(n.as_f64().map(FlagValue::Float))
            }
        }
        serde_yaml::Value::String(s) => Ok(Some(FlagValue::Str(s))),
        serde_yaml::Value::Sequence(items) => {
            let ints: Option<Vec<i64>> =
                items.iter().map(|v| v.as_i64()).collect();
            if let Some(ints) = ints {
                return Ok(Some(FlagValue::IntList(ints)));
            }
            let strings: Option<Vec<String>> =
                items.iter().map(|v| v.as_str().map(str::to_string)).collect();
            match strings {
                Some(strings) => Ok(Some(FlagValue::StringList(strings))),
                None => {
                    tracing::warn!(flag = name, "skipping overlay list with mixed element types");
                    Ok(None)
                }
            }
        }
        serde_yaml::Value::Mapping(_) => Err(source_error(
            path,
            format!("nested value for {name:?}: overlay keys must be flat"),
        )),
        _ => {
            tracing::warn!(flag = name, "skipping overlay entry with unsupported value");
            Ok(None)
        }
    }
}

fn decode_toml(content: &str, path: &Path) -> Result<OverlayMap> {
    let raw: toml::Value = toml::from_str(content)
        .map_err(|e| source_error(path, format!("invalid TOML syntax: {e}")))?;

    let toml::Value::Table(table) = raw else {
        return Err(source_error(path, "overlay must be a flat key/value table".to_string()));
    };

    let mut map = OverlayMap::new();
    for (name, value) in table {
        if let Some(converted) = convert_toml(&name, value, path)? {
            map.insert(name, converted);
        }
    }
    Ok(map)
}

fn convert_toml(name: &str, value: toml::Value, path: &Path) -> Result<Option<FlagValue>> {
    match value {
        toml::Value::Boolean(b) => Ok(Some(FlagValue::Bool(b))),
        toml::Value::Integer(i) => Ok(Some(FlagValue::Int(i))),
        toml::Value::Float(f) => Ok(Some(FlagValue::Float(f))),
        toml::Value::String(s) => Ok(Some(FlagValue::Str(s))),
        toml::Value::Array(items) => {
            let ints: Option<Vec<i64>> = items.iter().map(toml::Value::as_integer).collect();
            if let Some(ints) = ints {
                return Ok(Some(FlagValue::IntList(ints)));
            }
            let strings: Option<Vec<String>> =
                items.iter().map(|v| v.as_str().map(str::to_string)).collect();
            match strings {
                Some(strings) => Ok(Some(FlagValue::StringList(strings))),
                None => {
                    tracing::warn!(flag = name, "skipping overlay list with mixed element types");
                    Ok(None)
                }
            }
        }
        toml::Value::Table(_) => Err(source_error(
            path,
            format!("nested value for {name:?}: overlay keys must be flat"),
        )),
        toml::Value::Datetime(_) => {
            tracing::warn!(flag = name, "skipping overlay entry with unsupported value");
            Ok(None)
        }
    }
}

fn decode_json(content: &str, path: &Path) -> Result<OverlayMap> {
    let raw: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| source_error(path, format!("invalid JSON syntax: {e}")))?;

    let serde_json::Value::Object(object) = raw else {
        return Err(source_error(path, "overlay must be a flat key/value object".to_string()));
    };

    let mut map = OverlayMap::new();
    for (name, value) in object {
        if let Some(converted) = convert_json(&name, value, path)? {
            map.insert(name, converted);
        }
    }
    Ok(map)
}

fn convert_json(name: &str, value: serde_json::Value, path: &Path) -> Result<Option<FlagValue>> {
    match value {
        serde_json::Value::Bool(b) => Ok(Some(FlagValue::Bool(b))),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(FlagValue::Int(i)))
            } else {
                Ok(n.as_f64().map(FlagValue::Float))
            }
        }
        serde_json::Value::String(s) => Ok(Some(FlagValue::Str(s))),
        serde_json::Value::Array(items) => {
            let ints: Option<Vec<i64>> =
                items.iter().map(serde_json::Value::as_i64).collect();
            if let Some(ints) = ints {
                return Ok(Some(FlagValue::IntList(ints)));
            }
            let strings: Option<Vec<String>> =
                items.iter().map(|v| v.as_str().map(str::to_string)).collect();
            match strings {
                Some(strings) => Ok(Some(FlagValue::StringList(strings))),
                None => {
                    tracing::warn!(flag = name, "skipping overlay list with mixed element types");
                    Ok(None)
                }
            }
        }
        serde_json::Value::Object(_) => Err(source_error(
            path,
            format!("nested value for {name:?}: overlay keys must be flat"),
        )),
        serde_json::Value::Null => {
            tracing::warn!(flag = name, "skipping overlay entry with unsupported value");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::flag::FlagKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_yaml_scalars() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("overlay.yaml");
        fs::write(&path, "test: 15\nname: svc\nratio: 0.5\nverbose: true\n").expect("write");

        let map = load_overlay(&path).expect("load");
        assert_eq!(map.get("test"), Some(&FlagValue::Int(15)));
        assert_eq!(map.get("name"), Some(&FlagValue::Str("svc".into())));
        assert_eq!(map.get("ratio"), Some(&FlagValue::Float(0.5)));
        assert_eq!(map.get("verbose"), Some(&FlagValue::Bool(true)));
    }

    #[test]
    fn test_load_yaml_lists() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("overlay.yml");
        fs::write(&path, "ports: [1, 2, 3]\ntags: [a, b]\n").expect("write");

        let map = load_overlay(&path).expect("load");
        assert_eq!(map.get("ports"), Some(&FlagValue::IntList(vec![1, 2, 3])));
        assert_eq!(
            map.get("tags"),
            Some(&FlagValue::StringList(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_load_toml() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("overlay.toml");
        fs::write(&path, "test = 15\nname = \"svc\"\nports = [1, 2]\n").expect("write");

        let map = load_overlay(&path).expect("load");
        assert_eq!(map.get("test"), Some(&FlagValue::Int(15)));
        assert_eq!(map.get("name"), Some(&FlagValue::Str("svc".into())));
        assert_eq!(map.get("ports"), Some(&FlagValue::IntList(vec![1, 2])));
    }

    #[test]
    fn test_load_json() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("overlay.json");
        fs::write(&path, r#"{"test": 15, "verbose": false}"#).expect("write");

        let map = load_overlay(&path).expect("load");
        assert_eq!(map.get("test"), Some(&FlagValue::Int(15)));
        assert_eq!(map.get("verbose"), Some(&FlagValue::Bool(false)));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let tmp = TempDir::new().expect("tmp");
        let err = load_overlay(&tmp.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, Error::OverlaySource { .. }));
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("overlay.yaml");
        fs::write(&path, "test: [unclosed\n").expect("write");
        assert!(matches!(load_overlay(&path).unwrap_err(), Error::OverlaySource { .. }));
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("overlay.yaml");
        fs::write(&path, "server:\n  port: 80\n").expect("write");
        assert!(matches!(load_overlay(&path).unwrap_err(), Error::OverlaySource { .. }));
    }

    #[test]
    fn test_unsupported_extension_is_fatal() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("overlay.ini");
        fs::write(&path, "test=15\n").expect("write");
        assert!(matches!(load_overlay(&path).unwrap_err(), Error::OverlaySource { .. }));
    }

    #[test]
    fn test_mixed_list_is_skipped() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("overlay.yaml");
        fs::write(&path, "mixed: [a, 1]\ntest: 15\n").expect("write");

        let map = load_overlay(&path).expect("load");
        assert!(!map.contains("mixed"));
        assert_eq!(map.get_as("test", FlagKind::Int), Some(FlagValue::Int(15)));
    }
}
