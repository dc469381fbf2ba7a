// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Directory scanner producing the gallery manifest

use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::config::AppConfig;
use crate::manifest::GalleryManifest;
use crate::natsort::natural_sort;
use crate::{Result, VitrineError};

/// Extensions listed in a gallery (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// Check whether a filename is listable: not hidden, recognized extension
pub fn is_gallery_image(name: &str) -> bool {
    if name.starts_with('.') {
        return false;
    }
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) => IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Scan every configured category.
///
/// Every category gets a key; a missing directory yields an empty list.
pub fn scan(config: &AppConfig) -> Result<GalleryManifest> {
    let mut manifest = GalleryManifest::new();

    for category in &config.categories {
        let dir = config.category_dir(category);
        let files = scan_directory(&dir)?;
        debug!("Category '{}': {} images in {:?}", category.id, files.len(), dir);
        manifest.insert(category.id.clone(), files);
    }

    Ok(manifest)
}

/// List the gallery images in one directory, naturally sorted.
///
/// A path that is absent or is not a directory lists nothing.
pub fn scan_directory(dir: &Path) -> Result<Vec<String>> {
    if let Ok(meta) = std::fs::metadata(dir) {
        if !meta.is_dir() {
            debug!("{:?} is not a directory, listing nothing", dir);
            return Ok(Vec::new());
        }
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Directory {:?} not found, listing nothing", dir);
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(VitrineError::Scan {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| VitrineError::Scan {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                debug!("Skipping non UTF-8 name {:?}", raw);
                continue;
            }
        };

        if !is_gallery_image(&name) {
            continue;
        }

        // Follows symlinks, so a linked image still counts as a file
        let is_file = std::fs::metadata(entry.path())
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        files.push(name);
    }

    natural_sort(&mut files);
    Ok(files)
}
