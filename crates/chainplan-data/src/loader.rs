//! Preset file access: format detection, file discovery, typed
//! deserialization and name lookups shared by the preset builder.
//!
//! A preset is a directory holding one file per entity kind. Each file may
//! be RON, JSON or TOML; the extension decides which.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors raised while reading a preset directory.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A file every preset must provide is absent.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The same base name exists under more than one extension.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A definition refers to a name no file in the preset defines.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Extensions in the order [`find_data_file`] probes them.
    pub const EXTENSIONS: [&'static str; 3] = ["ron", "toml", "json"];

    fn parse<T: DeserializeOwned>(self, content: &str, path: &Path) -> Result<T, DataLoadError> {
        let parsed = match self {
            Format::Ron => ron::from_str(content).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|detail| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail,
        })
    }
}

pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Find `{base_name}.ron`, `.toml` or `.json` in `dir`.
///
/// Returns `Ok(None)` when none exists and `ConflictingFormats` when more
/// than one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for ext in Format::EXTENSIONS {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read `path` and deserialize it in the format its extension names.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    format.parse(&content, path)
}

/// Deserialize a list of definitions.
///
/// RON and JSON files hold the list itself. TOML has no top-level arrays, so
/// the list is read from the array of tables under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    if format != Format::Toml {
        return format.parse(&content, path);
    }

    let mut table: toml::Table = format.parse(&content, path)?;
    let Some(array) = table.remove(toml_key) else {
        return Err(DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: format!("missing key '{toml_key}' in TOML file"),
        });
    };
    array.try_into().map_err(|e: toml::de::Error| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    })
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up `name`, failing with `UnresolvedRef` if the preset lacks it.
pub fn resolve_name<V: Copy>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<V, DataLoadError> {
    map.get(name).copied().ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Resolve every name of a list, stopping at the first unknown one.
pub fn resolve_names<V: Copy>(
    map: &HashMap<String, V>,
    names: &[String],
    file: &Path,
    expected_kind: &'static str,
) -> Result<Vec<V>, DataLoadError> {
    names
        .iter()
        .map(|name| resolve_name(map, name, file, expected_kind))
        .collect()
}

pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        return Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;

    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "chainplan_loader_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Entry {
        name: String,
        #[serde(default)]
        amount: f64,
    }

    // =======================================================================
    // Format detection
    // =======================================================================

    #[test]
    fn detects_formats_by_extension() {
        assert_eq!(detect_format(Path::new("items.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("items.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("items.json")).unwrap(), Format::Json);
    }

    #[test]
    fn rejects_unknown_extensions() {
        assert!(matches!(
            detect_format(Path::new("items.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("items")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    // =======================================================================
    // File discovery
    // =======================================================================

    #[test]
    fn finds_single_file() {
        let dir = make_test_dir("find_single");
        fs::write(dir.join("items.json"), "[]").unwrap();
        let found = find_data_file(&dir, "items").unwrap();
        assert_eq!(found, Some(dir.join("items.json")));
        assert_eq!(find_data_file(&dir, "recipes").unwrap(), None);
        cleanup(&dir);
    }

    #[test]
    fn conflicting_formats_are_rejected() {
        let dir = make_test_dir("conflict");
        fs::write(dir.join("items.ron"), "[]").unwrap();
        fs::write(dir.join("items.json"), "[]").unwrap();
        assert!(matches!(
            find_data_file(&dir, "items"),
            Err(DataLoadError::ConflictingFormats { .. })
        ));
        cleanup(&dir);
    }

    #[test]
    fn required_file_must_exist() {
        let dir = make_test_dir("required");
        let err = require_data_file(&dir, "qualities").unwrap_err();
        match err {
            DataLoadError::MissingRequired { file, .. } => assert_eq!(file, "qualities"),
            other => panic!("unexpected error: {other}"),
        }
        cleanup(&dir);
    }

    // =======================================================================
    // Deserialization
    // =======================================================================

    #[test]
    fn lists_parse_in_every_format() {
        let dir = make_test_dir("lists");
        fs::write(dir.join("a.ron"), r#"[(name: "coal", amount: 2.0)]"#).unwrap();
        fs::write(dir.join("b.json"), r#"[{"name": "coal", "amount": 2.0}]"#).unwrap();
        fs::write(
            dir.join("c.toml"),
            "[[items]]\nname = \"coal\"\namount = 2.0\n",
        )
        .unwrap();

        let expected = vec![Entry {
            name: "coal".to_string(),
            amount: 2.0,
        }];
        for file in ["a.ron", "b.json", "c.toml"] {
            let list: Vec<Entry> = deserialize_list(&dir.join(file), "items").unwrap();
            assert_eq!(list, expected, "{file}");
        }
        cleanup(&dir);
    }

    #[test]
    fn toml_list_needs_its_key() {
        let dir = make_test_dir("toml_key");
        fs::write(dir.join("items.toml"), "[[things]]\nname = \"coal\"\n").unwrap();
        let err = deserialize_list::<Entry>(&dir.join("items.toml"), "items").unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { detail, .. } if detail.contains("items")));
        cleanup(&dir);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = make_test_dir("parse_error");
        let path = dir.join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let err = deserialize_file::<Entry>(&path).unwrap_err();
        assert!(matches!(&err, DataLoadError::Parse { file, .. } if *file == path));
        cleanup(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = deserialize_file::<Entry>(Path::new("/nonexistent/chainplan/items.ron"))
            .unwrap_err();
        assert!(matches!(err, DataLoadError::Io(_)));
    }

    // =======================================================================
    // Name resolution
    // =======================================================================

    #[test]
    fn resolves_known_names() {
        let map = HashMap::from([("coal".to_string(), 3u32), ("ore".to_string(), 4)]);
        let file = Path::new("recipes.ron");
        assert_eq!(resolve_name(&map, "coal", file, "item").unwrap(), 3);
        let names = vec!["ore".to_string(), "coal".to_string()];
        assert_eq!(resolve_names(&map, &names, file, "item").unwrap(), vec![4, 3]);
    }

    #[test]
    fn unknown_name_reports_kind() {
        let map: HashMap<String, u32> = HashMap::new();
        let err = resolve_name(&map, "uranium", Path::new("recipes.ron"), "item").unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::UnresolvedRef { name, expected_kind: "item", .. } if name == "uranium"
        ));
    }

    #[test]
    fn duplicates_are_reported() {
        let map = HashMap::from([("coal".to_string(), 0u32)]);
        let file = Path::new("items.ron");
        assert!(check_duplicate(&map, "ore", file).is_ok());
        assert!(matches!(
            check_duplicate(&map, "coal", file),
            Err(DataLoadError::DuplicateName { .. })
        ));
    }
}
