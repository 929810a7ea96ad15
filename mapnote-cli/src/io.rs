//! File I/O for the terminal host: GeoJSON in, GeoJSON out.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use mapnote_core::{AnnotationSet, NAME_KEY};

/// GeoJSON feature collection as written to and read from disk.
#[derive(Debug, Serialize, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    geometry: Value,
    #[serde(default)]
    properties: Map<String, Value>,
}

/// One feature to place on the surface at startup.
///
/// File ids are dropped on load; the surface assigns fresh ones.
pub struct SeedFeature {
    pub geometry: Value,
    pub name: Option<String>,
}

/// Load seed features from a GeoJSON FeatureCollection file.
pub fn load_features(path: &str) -> Result<Vec<SeedFeature>> {
    let path = Path::new(path);
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    parse_features(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_features(raw: &str) -> Result<Vec<SeedFeature>> {
    let collection: FeatureCollection =
        serde_json::from_str(raw).context("not a GeoJSON feature collection")?;

    Ok(collection
        .features
        .into_iter()
        .map(|feature| {
            let name = feature
                .properties
                .get(NAME_KEY)
                .and_then(Value::as_str)
                .map(str::to_string);
            SeedFeature {
                geometry: feature.geometry,
                name,
            }
        })
        .collect())
}

/// Get the ~/.mapnote directory path, creating it if needed
pub fn mapnote_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    let dir = home.join(".mapnote");

    if !dir.exists() {
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    Ok(dir)
}

/// Export the published set to ~/.mapnote/drawings.json
pub fn export_set(set: &AnnotationSet) -> Result<PathBuf> {
    let export_path = mapnote_dir()?.join("drawings.json");

    let json = serde_json::to_string_pretty(&collection_for(set))
        .context("Failed to serialize drawings")?;
    fs::write(&export_path, json)
        .with_context(|| format!("Failed to write {}", export_path.display()))?;

    Ok(export_path)
}

fn collection_for(set: &AnnotationSet) -> FeatureCollection {
    FeatureCollection {
        kind: "FeatureCollection".to_string(),
        features: set
            .iter()
            .map(|ann| Feature {
                kind: "Feature".to_string(),
                id: Some(ann.id.as_str().to_string()),
                geometry: ann.geometry.clone(),
                properties: ann.properties.clone(),
            })
            .collect(),
    }
}
