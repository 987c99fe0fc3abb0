use std::{fs, path::Path};

use serde_json::{Map, Value};

use crate::append_desktop_log;

fn empty_state_object() -> Value {
    Value::Object(Map::new())
}

pub(crate) fn read_state_field(state_path: Option<&Path>, field: &str) -> Option<Value> {
    let raw = fs::read_to_string(state_path?).ok()?;
    let mut parsed: Value = serde_json::from_str(&raw).ok()?;
    parsed.as_object_mut()?.remove(field)
}

/// Sets or clears (`None`) a single top-level field, keeping every other field intact.
pub(crate) fn write_state_field(
    state_path: Option<&Path>,
    field: &str,
    value: Option<Value>,
) -> Result<(), String> {
    let Some(state_path) = state_path else {
        append_desktop_log(&format!(
            "desktop state path is unavailable; skipping persistence of '{field}'"
        ));
        return Ok(());
    };

    if let Some(parent_dir) = state_path.parent() {
        fs::create_dir_all(parent_dir).map_err(|error| {
            format!(
                "Failed to create desktop state directory {}: {}",
                parent_dir.display(),
                error
            )
        })?;
    }

    let mut parsed = match fs::read_to_string(state_path) {
        Ok(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(error) => {
                append_desktop_log(&format!(
                    "failed to parse desktop state {}: {}. resetting state file",
                    state_path.display(),
                    error
                ));
                empty_state_object()
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => empty_state_object(),
        Err(error) => {
            return Err(format!(
                "Failed to read desktop state {}: {}",
                state_path.display(),
                error
            ));
        }
    };

    if !parsed.is_object() {
        append_desktop_log(&format!(
            "desktop state {} has non-object root; resetting state file",
            state_path.display()
        ));
        parsed = empty_state_object();
    }

    if let Value::Object(object) = &mut parsed {
        match value {
            Some(value) => {
                object.insert(field.to_string(), value);
            }
            None => {
                object.remove(field);
            }
        }
    }

    let serialized = serde_json::to_string_pretty(&parsed)
        .map_err(|error| format!("Failed to serialize desktop state: {error}"))?;
    fs::write(state_path, serialized).map_err(|error| {
        format!(
            "Failed to write desktop state {}: {}",
            state_path.display(),
            error
        )
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn write_state_field_preserves_unrelated_fields() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("desktop_state.json");
        fs::write(&path, r#"{"window":{"x":10},"locale":"zh-CN"}"#).expect("seed state");

        write_state_field(Some(&path), "locale", Some(json!("en-US"))).expect("write locale");

        let saved: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read state")).expect("json");
        assert_eq!(saved["locale"], json!("en-US"));
        assert_eq!(saved["window"]["x"], json!(10));
    }

    #[test]
    fn write_state_field_resets_corrupt_file_and_creates_parent() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("desktop_state.json");
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, "[1, 2").expect("seed corrupt state");

        write_state_field(Some(&path), "autoUpdateCheck", Some(json!(false))).expect("write");

        assert_eq!(
            read_state_field(Some(&path), "autoUpdateCheck"),
            Some(json!(false))
        );
    }

    #[test]
    fn write_state_field_none_removes_field() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("desktop_state.json");
        write_state_field(Some(&path), "locale", Some(json!("en-US"))).expect("write");
        write_state_field(Some(&path), "locale", None).expect("clear");

        assert_eq!(read_state_field(Some(&path), "locale"), None);
    }

    #[test]
    fn missing_state_path_is_a_no_op() {
        assert!(write_state_field(None, "locale", None).is_ok());
        assert_eq!(read_state_field(None, "locale"), None);
    }
}
