use crate::error::{IndexError, Result};
use crate::types::Descriptor;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_SKILLS: &str = include_str!("../../../catalogs/skills.json");

/// On-disk catalog document: `{ "descriptors": [ ... ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub descriptors: Vec<Descriptor>,
}

pub fn load_catalog_json(raw: &str) -> Result<Vec<Descriptor>> {
    let catalog: Catalog = serde_json::from_str(raw)
        .map_err(|err| IndexError::catalog(format!("invalid JSON catalog: {err}")))?;
    Ok(catalog.descriptors)
}

pub fn load_catalog_toml(raw: &str) -> Result<Vec<Descriptor>> {
    let catalog: Catalog = toml::from_str(raw)
        .map_err(|err| IndexError::catalog(format!("invalid TOML catalog: {err}")))?;
    Ok(catalog.descriptors)
}

/// Read a catalog file. `.toml` files are parsed as TOML, anything else as JSON.
pub fn load_catalog_file(path: &Path) -> Result<Vec<Descriptor>> {
    let raw = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let descriptors = if is_toml {
        load_catalog_toml(&raw)
    } else {
        load_catalog_json(&raw)
    }
    .map_err(|err| IndexError::catalog(format!("{}: {err}", path.display())))?;

    log::debug!(
        "Read {} descriptors from {}",
        descriptors.len(),
        path.display()
    );
    Ok(descriptors)
}

/// The built-in seven-skill sample catalog
pub fn builtin_catalog() -> Result<Vec<Descriptor>> {
    load_catalog_json(BUILTIN_SKILLS)
}
