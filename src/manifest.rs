// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Gallery manifest and the static fallback data file
//!
//! The manifest maps each category to its filenames. On the wire it is a
//! plain JSON object; the fallback data file wraps the same object in a
//! script that assigns it to `window.galleryData`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Result, VitrineError};

/// Global the fallback script assigns the manifest to
pub const FALLBACK_GLOBAL: &str = "galleryData";

/// Category identifier to ordered filenames
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GalleryManifest {
    categories: IndexMap<String, Vec<String>>,
}

impl GalleryManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file list of a category, replacing any previous one
    pub fn insert(&mut self, category: impl Into<String>, files: Vec<String>) {
        self.categories.insert(category.into(), files);
    }

    /// Files of a category, if the category is present
    pub fn files(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Categories in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of files across categories
    pub fn file_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Content hash used to detect whether the fallback file is stale
    pub fn fingerprint(&self) -> Result<String> {
        let canonical = serde_json::to_vec(self)?;
        Ok(blake3::hash(&canonical).to_hex().to_string())
    }
}

impl FromIterator<(String, Vec<String>)> for GalleryManifest {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            categories: iter.into_iter().collect(),
        }
    }
}

/// Render the fallback data script for a manifest
pub fn render_fallback_script(manifest: &GalleryManifest) -> Result<String> {
    let json = serde_json::to_string_pretty(manifest)?;
    Ok(format!("window.{} = {};\n", FALLBACK_GLOBAL, json))
}

/// Parse a fallback data script back into a manifest.
///
/// Accepts `window.galleryData = {...};` or `galleryData = {...}` with
/// optional trailing semicolon.
pub fn parse_fallback_script(source: &str) -> Result<GalleryManifest> {
    let body = source.trim();
    let body = body.strip_prefix("window.").unwrap_or(body);
    let body = body
        .strip_prefix(FALLBACK_GLOBAL)
        .ok_or_else(|| {
            VitrineError::Fallback(format!("expected assignment to {}", FALLBACK_GLOBAL))
        })?;
    let body = body
        .trim_start()
        .strip_prefix('=')
        .ok_or_else(|| VitrineError::Fallback("missing '='".to_string()))?;
    let body = body.trim();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();

    if !body.starts_with('{') {
        return Err(VitrineError::Fallback("assigned value is not an object".to_string()));
    }

    serde_json::from_str(body).map_err(|e| VitrineError::Fallback(e.to_string()))
}

/// Write the fallback data file, creating parent directories
pub fn write_fallback_file(path: &Path, manifest: &GalleryManifest) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_fallback_script(manifest)?)?;
    tracing::info!(
        "Wrote fallback data ({} files in {} categories) to {:?}",
        manifest.file_count(),
        manifest.len(),
        path
    );
    Ok(())
}

/// Read and parse the fallback data file
pub fn read_fallback_file(path: &Path) -> Result<GalleryManifest> {
    let content = std::fs::read_to_string(path)?;
    parse_fallback_script(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> GalleryManifest {
        let mut m = GalleryManifest::new();
        m.insert("logos", vec!["acme.svg".to_string(), "globex.png".to_string()]);
        m.insert("conference", vec!["day1.jpg".to_string()]);
        m.insert("hospital", vec![]);
        m
    }

    #[test]
    fn serializes_as_plain_object_in_insertion_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"logos":["acme.svg","globex.png"],"conference":["day1.jpg"],"hospital":[]}"#
        );
    }

    #[test]
    fn fallback_script_shape() {
        let script = render_fallback_script(&sample()).unwrap();
        assert!(script.starts_with("window.galleryData = {"));
        assert!(script.trim_end().ends_with("};"));
        assert_eq!(parse_fallback_script(&script).unwrap(), sample());
    }

    #[test]
    fn parses_hand_written_variants() {
        let bare = r#"galleryData = {"logos": ["a.png"]}"#;
        let manifest = parse_fallback_script(bare).unwrap();
        assert_eq!(manifest.files("logos").unwrap(), ["a.png".to_string()]);

        let spaced = "\n  window.galleryData={\"hospital\":[]} ;  \n";
        assert_eq!(parse_fallback_script(spaced).unwrap().files("hospital"), Some(&[][..]));
    }

    #[test]
    fn rejects_malformed_scripts() {
        for bad in [
            "",
            "window.otherData = {};",
            "window.galleryData {};",
            "window.galleryData = [1, 2];",
            "window.galleryData = {\"logos\": [\"a.png\"",
            "window.galleryData = {\"logos\": 3};",
        ] {
            assert!(
                matches!(parse_fallback_script(bad), Err(VitrineError::Fallback(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        b.insert("hospital", vec!["ward.jpg".to_string()]);
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn writes_file_with_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("assets").join("js").join("gallery-data.js");
        write_fallback_file(&path, &sample()).unwrap();
        assert_eq!(read_fallback_file(&path).unwrap(), sample());
    }

    #[test]
    fn file_count_sums_categories() {
        assert_eq!(sample().file_count(), 3);
        assert_eq!(sample().len(), 3);
    }
}
