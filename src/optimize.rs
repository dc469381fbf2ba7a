// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Photo normalization: cap dimensions and store everything as RGB JPEG

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{AppConfig, OptimizeConfig};
use crate::Result;

/// Inputs the normalizer will decode
pub const NORMALIZE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp", "tiff"];

const TARGET_EXTENSION: &str = "jpg";

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeAction {
    /// Re-encoded; holds the output path
    Converted(PathBuf),
    /// Already within limits
    Unchanged,
    /// Not a candidate, or could not be decoded
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub converted: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl NormalizeReport {
    fn record(&mut self, action: &NormalizeAction) {
        match action {
            NormalizeAction::Converted(_) => self.converted += 1,
            NormalizeAction::Unchanged => self.unchanged += 1,
            NormalizeAction::Skipped => self.skipped += 1,
        }
    }

    fn merge(&mut self, other: NormalizeReport) {
        self.converted += other.converted;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
    }
}

pub struct Normalizer {
    max_dimension: u32,
    quality: u8,
}

impl Normalizer {
    pub fn new(config: &OptimizeConfig) -> Self {
        Self {
            max_dimension: config.max_dimension,
            quality: config.quality,
        }
    }

    fn is_candidate(path: &Path) -> bool {
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(true, |n| n.starts_with('.'));
        if hidden {
            return false;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| NORMALIZE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Normalize one file in place.
    ///
    /// The output is `<stem>.jpg`; the original is removed if that differs.
    pub fn normalize_file(&self, path: &Path) -> Result<NormalizeAction> {
        if !Self::is_candidate(path) {
            return Ok(NormalizeAction::Skipped);
        }

        let img = match image::open(path) {
            Ok(img) => img,
            Err(e) => {
                warn!("Cannot decode {:?}: {}", path, e);
                return Ok(NormalizeAction::Skipped);
            }
        };

        let (width, height) = img.dimensions();
        let oversized = width > self.max_dimension || height > self.max_dimension;
        let has_alpha = img.color().has_alpha();
        let is_jpg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(TARGET_EXTENSION));

        if !oversized && !has_alpha && is_jpg {
            return Ok(NormalizeAction::Unchanged);
        }

        let img = if oversized {
            img.resize(self.max_dimension, self.max_dimension, FilterType::Lanczos3)
        } else {
            img
        };
        let rgb = img.to_rgb8();

        let output = if is_jpg {
            path.to_path_buf()
        } else {
            path.with_extension(TARGET_EXTENSION)
        };

        let mut writer = BufWriter::new(File::create(&output)?);
        JpegEncoder::new_with_quality(&mut writer, self.quality).encode_image(&rgb)?;
        writer.flush()?;

        if output != path {
            std::fs::remove_file(path)?;
            debug!("Removed original {:?}", path);
        }

        info!(
            "Normalized {:?} -> {:?} ({}x{})",
            path.file_name().unwrap_or_default(),
            output.file_name().unwrap_or_default(),
            rgb.width(),
            rgb.height()
        );
        Ok(NormalizeAction::Converted(output))
    }

    /// Normalize every candidate in a directory; a missing directory is empty
    pub fn normalize_dir(&self, dir: &Path) -> Result<NormalizeReport> {
        let mut report = NormalizeReport::default();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(report),
            Err(e) => return Err(e.into()),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && Self::is_candidate(p))
            .collect();
        paths.sort();

        for path in paths {
            // A sibling conversion may have removed it already
            if !path.exists() {
                continue;
            }
            let action = self.normalize_file(&path)?;
            report.record(&action);
        }

        Ok(report)
    }
}

/// Normalize every category flagged for it
pub fn normalize_categories(config: &AppConfig) -> Result<NormalizeReport> {
    let normalizer = Normalizer::new(&config.optimize);
    let mut report = NormalizeReport::default();

    for category in config.categories.iter().filter(|c| c.normalize) {
        let dir = config.category_dir(category);
        report.merge(normalizer.normalize_dir(&dir)?);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn normalizer() -> Normalizer {
        Normalizer::new(&OptimizeConfig {
            max_dimension: 100,
            quality: 85,
        })
    }

    #[test]
    fn png_with_alpha_becomes_jpg() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("badge.png");
        RgbaImage::from_pixel(20, 10, Rgba([255, 0, 0, 128])).save(&src).unwrap();

        let action = normalizer().normalize_file(&src).unwrap();
        let out = dir.path().join("badge.jpg");
        assert_eq!(action, NormalizeAction::Converted(out.clone()));
        assert!(!src.exists());

        let img = image::open(&out).unwrap();
        assert_eq!(img.dimensions(), (20, 10));
        assert!(!img.color().has_alpha());
    }

    #[test]
    fn oversized_jpg_is_downscaled_in_place() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("stage.jpg");
        RgbImage::from_pixel(300, 150, Rgb([10, 20, 30])).save(&src).unwrap();

        let action = normalizer().normalize_file(&src).unwrap();
        assert_eq!(action, NormalizeAction::Converted(src.clone()));
        assert_eq!(image::open(&src).unwrap().dimensions(), (100, 50));
    }

    #[test]
    fn compliant_jpg_is_untouched() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("small.jpg");
        RgbImage::from_pixel(50, 50, Rgb([1, 2, 3])).save(&src).unwrap();
        let before = std::fs::read(&src).unwrap();

        assert_eq!(normalizer().normalize_file(&src).unwrap(), NormalizeAction::Unchanged);
        assert_eq!(std::fs::read(&src).unwrap(), before);
    }

    #[test]
    fn non_candidates_and_corrupt_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let txt = dir.path().join("notes.txt");
        let svg = dir.path().join("logo.svg");
        let bad = dir.path().join("broken.png");
        std::fs::write(&txt, "hello").unwrap();
        std::fs::write(&svg, "<svg/>").unwrap();
        std::fs::write(&bad, "definitely not a png").unwrap();

        let n = normalizer();
        assert_eq!(n.normalize_file(&txt).unwrap(), NormalizeAction::Skipped);
        assert_eq!(n.normalize_file(&svg).unwrap(), NormalizeAction::Skipped);
        assert_eq!(n.normalize_file(&bad).unwrap(), NormalizeAction::Skipped);
        assert!(bad.exists());
    }

    #[test]
    fn directory_report_counts_actions() {
        let dir = TempDir::new().unwrap();
        RgbImage::from_pixel(50, 50, Rgb([0, 0, 0])).save(dir.path().join("ok.jpg")).unwrap();
        RgbImage::from_pixel(50, 50, Rgb([0, 0, 0])).save(dir.path().join("convert.png")).unwrap();
        std::fs::write(dir.path().join("broken.webp"), "junk").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "junk").unwrap();

        let report = normalizer().normalize_dir(dir.path()).unwrap();
        assert_eq!(
            report,
            NormalizeReport {
                converted: 1,
                unchanged: 1,
                skipped: 1
            }
        );
        assert!(dir.path().join("convert.jpg").exists());
    }

    #[test]
    fn only_flagged_categories_are_touched() {
        let root = TempDir::new().unwrap();
        let logo = root.path().join("logo");
        let conf = root.path().join("conference");
        std::fs::create_dir(&logo).unwrap();
        std::fs::create_dir(&conf).unwrap();
        RgbImage::from_pixel(10, 10, Rgb([0, 0, 0])).save(logo.join("acme.png")).unwrap();
        RgbImage::from_pixel(10, 10, Rgb([0, 0, 0])).save(conf.join("day.png")).unwrap();

        let config = AppConfig {
            assets_root: root.path().to_string_lossy().to_string(),
            ..AppConfig::default()
        };
        let report = normalize_categories(&config).unwrap();

        assert_eq!(report.converted, 1);
        assert!(logo.join("acme.png").exists());
        assert!(conf.join("day.jpg").exists());
        assert!(!conf.join("day.png").exists());
    }
}
