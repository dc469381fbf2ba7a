// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Category folder watcher that keeps the fallback data file current

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::manifest::write_fallback_file;
use crate::optimize::normalize_categories;
use crate::{scanner, Result};

/// Events emitted by the watcher
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// A file appeared or changed
    Changed(PathBuf),
    /// A file was deleted
    Removed(PathBuf),
    /// Watcher error
    Error(String),
}

/// Watches category folders and rewrites the fallback file on change
pub struct GalleryWatcher {
    watcher: RecommendedWatcher,
    watched_paths: Vec<PathBuf>,
    event_rx: Receiver<notify::Result<Event>>,
    config: AppConfig,
    normalize: bool,
    last_fingerprint: Option<String>,
}

impl GalleryWatcher {
    /// Create a watcher for the configured categories
    pub fn new(config: AppConfig) -> Result<Self> {
        let (tx, rx) = channel();

        let notify_config = Config::default()
            .with_poll_interval(Duration::from_secs(config.watcher.poll_interval_secs.max(1)));

        let watcher = RecommendedWatcher::new(tx, notify_config)?;
        let normalize = config.watcher.normalize;

        Ok(Self {
            watcher,
            watched_paths: Vec::new(),
            event_rx: rx,
            config,
            normalize,
            last_fingerprint: None,
        })
    }

    /// Disable photo normalization before each rescan
    pub fn without_normalize(mut self) -> Self {
        self.normalize = false;
        self
    }

    /// Start watching the asset root and every category folder that exists.
    ///
    /// Safe to call repeatedly; folders created later get picked up.
    pub fn ensure_watches(&mut self) -> Result<()> {
        let mut dirs = vec![PathBuf::from(&self.config.assets_root)];
        dirs.extend(self.config.categories.iter().map(|c| self.config.category_dir(c)));

        for dir in dirs {
            if self.watched_paths.contains(&dir) || !dir.is_dir() {
                continue;
            }
            self.watcher.watch(&dir, RecursiveMode::NonRecursive)?;
            info!("Watching: {:?}", dir);
            self.watched_paths.push(dir);
        }

        Ok(())
    }

    /// Get the next event (blocking with timeout)
    pub fn next_event(&self, timeout: Duration) -> Option<WatchEvent> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(Ok(event)) => Self::convert_event(event),
            Ok(Err(e)) => Some(WatchEvent::Error(e.to_string())),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => None,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                Some(WatchEvent::Error("Watcher disconnected".to_string()))
            }
        }
    }

    /// Convert notify event to our event type
    fn convert_event(event: Event) -> Option<WatchEvent> {
        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) => {
                event.paths.first().map(|p| WatchEvent::Changed(p.clone()))
            }
            EventKind::Remove(_) => {
                event.paths.first().map(|p| WatchEvent::Removed(p.clone()))
            }
            _ => None,
        }
    }

    /// Get currently watched paths
    pub fn watched_paths(&self) -> &[PathBuf] {
        &self.watched_paths
    }

    /// Rescan and rewrite the fallback file if the manifest changed.
    ///
    /// Returns whether the file was written.
    pub fn refresh(&mut self) -> Result<bool> {
        if self.normalize {
            let report = normalize_categories(&self.config)?;
            if report.converted > 0 {
                info!("Normalized {} photos", report.converted);
            }
        }

        let manifest = scanner::scan(&self.config)?;
        let fingerprint = manifest.fingerprint()?;

        if self.last_fingerprint.as_deref() == Some(fingerprint.as_str()) {
            debug!("Gallery unchanged");
            return Ok(false);
        }

        write_fallback_file(Path::new(&self.config.fallback.path), &manifest)?;
        self.last_fingerprint = Some(fingerprint);
        Ok(true)
    }

    /// Refresh once, then on every relevant change until shutdown.
    ///
    /// Changes are batched: a refresh runs once the poll interval has
    /// passed without further events.
    pub fn run(&mut self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let quiet_period = Duration::from_secs(self.config.watcher.poll_interval_secs);

        self.ensure_watches()?;
        self.refresh()?;

        let mut pending_since: Option<Instant> = None;

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.next_event(Duration::from_millis(100)) {
                Some(WatchEvent::Changed(path)) | Some(WatchEvent::Removed(path)) => {
                    if path.is_dir() || is_gallery_candidate(&path) {
                        debug!("Change detected: {:?}", path);
                        pending_since = Some(Instant::now());
                    }
                }
                Some(WatchEvent::Error(e)) => {
                    warn!("Watch error: {}", e);
                }
                None => {}
            }

            if pending_since.is_some_and(|t| t.elapsed() >= quiet_period) {
                pending_since = None;
                if let Err(e) = self.ensure_watches() {
                    warn!("Failed to extend watches: {}", e);
                }
                if let Err(e) = self.refresh() {
                    error!("Gallery refresh failed: {}", e);
                }
            }
        }

        info!("Gallery watcher stopped.");
        Ok(())
    }
}

/// Check if a changed path can affect the gallery
pub fn is_gallery_candidate(path: &Path) -> bool {
    let filename = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };

    // Skip hidden files
    if filename.starts_with('.') {
        return false;
    }

    // Skip temporary files
    let temp_extensions = [".tmp", ".part", ".crdownload", ".partial", ".download"];
    if temp_extensions.iter().any(|ext| filename.ends_with(ext)) {
        return false;
    }

    // Skip system files
    let skip_names = ["desktop.ini", "thumbs.db"];
    if skip_names.iter().any(|n| filename.eq_ignore_ascii_case(n)) {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::read_fallback_file;
    use tempfile::TempDir;

    fn config_at(root: &Path) -> AppConfig {
        let mut config = AppConfig {
            assets_root: root.join("assets").to_string_lossy().to_string(),
            ..AppConfig::default()
        };
        config.fallback.path = root.join("assets/js/gallery-data.js").to_string_lossy().to_string();
        config.watcher.poll_interval_secs = 1;
        config
    }

    #[test]
    fn candidate_filter() {
        assert!(is_gallery_candidate(Path::new("/a/logo/acme.png")));
        assert!(!is_gallery_candidate(Path::new("/a/logo/.DS_Store")));
        assert!(!is_gallery_candidate(Path::new("/a/logo/upload.jpg.part")));
        assert!(!is_gallery_candidate(Path::new("/a/logo/Thumbs.db")));
    }

    #[test]
    fn refresh_writes_only_on_change() {
        let root = TempDir::new().unwrap();
        let config = config_at(root.path());
        let logos = root.path().join("assets/logo");
        std::fs::create_dir_all(&logos).unwrap();
        std::fs::write(logos.join("acme.svg"), "<svg/>").unwrap();

        let mut watcher = GalleryWatcher::new(config.clone()).unwrap().without_normalize();
        assert!(watcher.refresh().unwrap());
        assert!(!watcher.refresh().unwrap());

        std::fs::write(logos.join("globex.svg"), "<svg/>").unwrap();
        assert!(watcher.refresh().unwrap());

        let manifest = read_fallback_file(Path::new(&config.fallback.path)).unwrap();
        assert_eq!(manifest.files("logos").unwrap(), ["acme.svg", "globex.svg"].map(String::from));
        assert!(manifest.files("hospital").unwrap().is_empty());
    }

    #[test]
    fn refresh_normalizes_photos_first() {
        let root = TempDir::new().unwrap();
        let config = config_at(root.path());
        let conf = root.path().join("assets/conference");
        std::fs::create_dir_all(&conf).unwrap();
        image::RgbImage::new(8, 8).save(conf.join("keynote.png")).unwrap();

        let mut watcher = GalleryWatcher::new(config.clone()).unwrap();
        assert!(watcher.refresh().unwrap());

        let manifest = read_fallback_file(Path::new(&config.fallback.path)).unwrap();
        assert_eq!(manifest.files("conference").unwrap(), ["keynote.jpg".to_string()]);
    }

    #[test]
    fn watches_only_existing_dirs_and_picks_up_new_ones() {
        let root = TempDir::new().unwrap();
        let config = config_at(root.path());
        std::fs::create_dir_all(root.path().join("assets/logo")).unwrap();

        let mut watcher = GalleryWatcher::new(config).unwrap();
        watcher.ensure_watches().unwrap();
        assert_eq!(watcher.watched_paths().len(), 2);

        std::fs::create_dir_all(root.path().join("assets/hospital")).unwrap();
        watcher.ensure_watches().unwrap();
        assert_eq!(watcher.watched_paths().len(), 3);
    }

    #[test]
    fn reports_new_files() {
        let root = TempDir::new().unwrap();
        let config = config_at(root.path());
        let logos = root.path().join("assets/logo");
        std::fs::create_dir_all(&logos).unwrap();

        let mut watcher = GalleryWatcher::new(config).unwrap();
        watcher.ensure_watches().unwrap();
        std::fs::write(logos.join("new.png"), b"x").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = false;
        while Instant::now() < deadline && !seen {
            let event = watcher.next_event(Duration::from_millis(200));
            if let Some(WatchEvent::Changed(path)) = event {
                seen = path.ends_with("new.png");
            }
        }
        assert!(seen);
    }

    #[test]
    fn run_stops_on_shutdown() {
        let root = TempDir::new().unwrap();
        let config = config_at(root.path());
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let mut watcher = GalleryWatcher::new(config.clone()).unwrap().without_normalize();
        watcher.run(rx).unwrap();
        assert!(Path::new(&config.fallback.path).exists());
    }
}
