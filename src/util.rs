use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Last path component of `path`, used as the article key.
pub fn filename_only(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Current wall-clock time in epoch seconds.
pub fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Regular files directly below `dir` and in its subdirectories, sorted.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current)
            .with_context(|| format!("Failed to read directory {}", current.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Serializes `value` as JSON indented by `indent` spaces.
///
/// # Arguments
/// * `value` - Anything `serde` can serialize.
/// * `indent` - Number of spaces per nesting level; 0 yields compact output.
pub fn to_json_pretty<T: Serialize>(value: &T, indent: usize) -> Result<String> {
    if indent == 0 {
        return serde_json::to_string(value).context("Failed to serialize JSON");
    }

    let spaces = " ".repeat(indent);
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(spaces.as_bytes());
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize JSON")?;
    String::from_utf8(buffer).context("Serialized JSON was not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_only() {
        assert_eq!(filename_only("/tmp/data/123.html"), "123.html");
        assert_eq!(filename_only("123.html"), "123.html");
        assert_eq!(filename_only("../x/../456.html"), "456.html");
    }

    #[test]
    fn test_json_indent_width() {
        let value = serde_json::json!({"articles": ["a.html"]});
        assert_eq!(
            to_json_pretty(&value, 2).unwrap(),
            "{\n  \"articles\": [\n    \"a.html\"\n  ]\n}"
        );
        assert_eq!(
            to_json_pretty(&value, 0).unwrap(),
            "{\"articles\":[\"a.html\"]}"
        );
    }

    #[test]
    fn test_list_files_recurses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.html"), "b").unwrap();
        std::fs::write(dir.path().join("nested").join("a.html"), "a").unwrap();

        let names: Vec<String> = list_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| filename_only(&p.to_string_lossy()))
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a.html".to_string()));
        assert!(names.contains(&"b.html".to_string()));
    }
}
