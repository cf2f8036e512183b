use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use casemap_core::ValueSetDecl;

/// A value-set definition file with its path and content.
pub struct VsetFile {
    pub path: String,
    pub content: String,
}

/// Project configuration from casemap.config.yaml.
#[derive(Debug, Deserialize)]
pub struct CasemapConfig {
    pub sources: Option<Vec<String>>,
}

/// Read value-set definition files from a path. A file is taken as-is; a
/// directory is scanned for `*.vset.yaml` / `*.vset.json`, or for the glob
/// patterns its casemap.config.yaml lists under `sources`.
pub fn read_vset_files(input_path: &Path) -> Result<Vec<VsetFile>, String> {
    if input_path.is_file() {
        return Ok(vec![read_file(input_path)?]);
    }

    if input_path.is_dir() {
        let patterns = match load_config(input_path)? {
            Some(CasemapConfig {
                sources: Some(sources),
            }) if !sources.is_empty() => sources,
            _ => vec!["**/*.vset.yaml".to_string(), "**/*.vset.json".to_string()],
        };
        return collect_matches(input_path, &patterns);
    }

    Err(format!("Path does not exist: {}", input_path.display()))
}

/// Parse one definition file into a value-set declaration; the extension
/// picks the format.
pub fn parse_decl(file: &VsetFile) -> Result<ValueSetDecl, String> {
    if file.path.ends_with(".json") {
        serde_json::from_str(&file.content)
            .map_err(|e| format!("{}: invalid value-set declaration: {e}", file.path))
    } else {
        serde_yaml::from_str(&file.content)
            .map_err(|e| format!("{}: invalid value-set declaration: {e}", file.path))
    }
}

fn load_config(dir_path: &Path) -> Result<Option<CasemapConfig>, String> {
    let config_path = dir_path.join("casemap.config.yaml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)
        .map_err(|e| format!("Failed to read {}: {e}", config_path.display()))?;
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| format!("Invalid YAML config {}: {e}", config_path.display()))
}

/// Expand glob patterns relative to `base_dir` into a sorted, deduplicated
/// file list.
fn collect_matches(base_dir: &Path, patterns: &[String]) -> Result<Vec<VsetFile>, String> {
    let mut paths: BTreeSet<PathBuf> = BTreeSet::new();

    for pattern in patterns {
        let full_pattern = base_dir.join(pattern).to_string_lossy().replace('\\', "/");
        let entries = glob::glob(&full_pattern)
            .map_err(|e| format!("Invalid glob pattern '{pattern}': {e}"))?;
        for entry in entries {
            let path = entry.map_err(|e| format!("Glob error: {e}"))?;
            paths.insert(path);
        }
    }

    paths.iter().map(|path| read_file(path)).collect()
}

fn read_file(path: &Path) -> Result<VsetFile, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    Ok(VsetFile {
        path: path.to_string_lossy().to_string(),
        content,
    })
}
