// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Vitrine: self-discovering image galleries
//!
//! A directory scanner served over HTTP, a loader that falls back to a
//! pre-baked manifest, a card renderer and a lightbox controller.

pub mod config;
pub mod error;
pub mod lightbox;
pub mod loader;
pub mod manifest;
pub mod natsort;
pub mod optimize;
pub mod render;
pub mod scanner;
pub mod watcher;
pub mod web;

pub use config::AppConfig;
pub use error::{Result, VitrineError};
pub use manifest::GalleryManifest;
