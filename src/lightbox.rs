// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Lightbox controller: one full-size image overlay per page

use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::LightboxConfig;

/// Key that dismisses an open lightbox
pub const ESCAPE: &str = "Escape";

/// Where a click on the overlay landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The dimmed background itself
    Backdrop,
    /// The image or anything inside the overlay
    Content,
}

/// User interactions the lightbox reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightboxEvent {
    CardClick(String),
    CloseButton,
    OverlayClick(ClickTarget),
    KeyDown(String),
}

/// Overlay state. Owns what a browser page would keep in globals.
#[derive(Debug, Clone)]
pub struct LightboxController {
    attached: bool,
    open: bool,
    src: String,
    scroll_locked: bool,
    close_delay: Duration,
    clear_at: Option<Instant>,
}

impl LightboxController {
    /// Controller for a page that has the overlay, image and close button
    pub fn new(close_delay: Duration) -> Self {
        Self {
            attached: true,
            open: false,
            src: String::new(),
            scroll_locked: false,
            close_delay,
            clear_at: None,
        }
    }

    pub fn from_config(config: &LightboxConfig) -> Self {
        Self::new(Duration::from_millis(config.close_delay_ms))
    }

    /// Controller for a page without lightbox markup; ignores everything
    pub fn detached() -> Self {
        Self {
            attached: false,
            ..Self::new(Duration::ZERO)
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Image currently assigned to the overlay (empty once cleared)
    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn close_delay(&self) -> Duration {
        self.close_delay
    }

    /// Show `url`, replacing whatever is shown
    pub fn open(&mut self, url: &str) {
        if !self.attached {
            return;
        }
        debug!("Lightbox open: {}", url);
        self.src = url.to_string();
        self.open = true;
        self.scroll_locked = true;
        self.clear_at = None;
    }

    pub fn close(&mut self) {
        self.close_at(Instant::now());
    }

    /// Hide the overlay now; the image is cleared once the delay passes
    pub fn close_at(&mut self, now: Instant) {
        if !self.attached {
            return;
        }
        debug!("Lightbox close");
        self.open = false;
        self.scroll_locked = false;
        self.clear_at = Some(now + self.close_delay);
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Apply a pending image clear whose deadline has passed
    pub fn tick_at(&mut self, now: Instant) {
        if let Some(deadline) = self.clear_at {
            if now >= deadline {
                self.src.clear();
                self.clear_at = None;
            }
        }
    }

    pub fn handle(&mut self, event: LightboxEvent) {
        self.handle_at(event, Instant::now());
    }

    /// Route a user interaction. Returns whether state changed.
    pub fn handle_at(&mut self, event: LightboxEvent, now: Instant) -> bool {
        if !self.attached {
            return false;
        }
        match event {
            LightboxEvent::CardClick(url) => {
                self.open(&url);
                true
            }
            LightboxEvent::CloseButton => {
                self.close_at(now);
                true
            }
            LightboxEvent::OverlayClick(ClickTarget::Backdrop) => {
                self.close_at(now);
                true
            }
            LightboxEvent::OverlayClick(ClickTarget::Content) => false,
            LightboxEvent::KeyDown(key) if key == ESCAPE && self.open => {
                self.close_at(now);
                true
            }
            LightboxEvent::KeyDown(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn starts_closed_and_empty() {
        let lb = LightboxController::from_config(&LightboxConfig::default());
        assert_eq!(lb.close_delay(), DELAY);
        assert!(!lb.is_open());
        assert_eq!(lb.src(), "");
        assert!(!lb.scroll_locked());
    }

    #[test]
    fn escape_closes_then_clears_after_delay() {
        let t0 = Instant::now();
        let mut lb = LightboxController::new(DELAY);
        lb.open("assets/conference/a.jpg");
        assert!(lb.is_open());
        assert!(lb.scroll_locked());
        assert_eq!(lb.src(), "assets/conference/a.jpg");

        assert!(lb.handle_at(LightboxEvent::KeyDown(ESCAPE.to_string()), t0));
        assert!(!lb.is_open());
        assert!(!lb.scroll_locked());

        lb.tick_at(t0 + Duration::from_millis(100));
        assert_eq!(lb.src(), "assets/conference/a.jpg");

        lb.tick_at(t0 + DELAY);
        assert_eq!(lb.src(), "");
    }

    #[test]
    fn escape_ignored_while_closed() {
        let t0 = Instant::now();
        let mut lb = LightboxController::new(DELAY);
        assert!(!lb.handle_at(LightboxEvent::KeyDown(ESCAPE.to_string()), t0));
        assert!(!lb.handle_at(LightboxEvent::KeyDown("Enter".to_string()), t0));
    }

    #[test]
    fn only_backdrop_clicks_close() {
        let t0 = Instant::now();
        let mut lb = LightboxController::new(DELAY);
        lb.open("a.jpg");

        assert!(!lb.handle_at(LightboxEvent::OverlayClick(ClickTarget::Content), t0));
        assert!(lb.is_open());

        assert!(lb.handle_at(LightboxEvent::OverlayClick(ClickTarget::Backdrop), t0));
        assert!(!lb.is_open());
    }

    #[test]
    fn close_button_closes() {
        let t0 = Instant::now();
        let mut lb = LightboxController::new(DELAY);
        lb.handle_at(LightboxEvent::CardClick("a.jpg".to_string()), t0);
        lb.handle_at(LightboxEvent::CloseButton, t0);
        assert!(!lb.is_open());
    }

    #[test]
    fn opening_while_open_replaces_image() {
        let mut lb = LightboxController::new(DELAY);
        lb.open("a.jpg");
        lb.open("b.jpg");
        assert!(lb.is_open());
        assert_eq!(lb.src(), "b.jpg");
    }

    #[test]
    fn reopen_within_delay_keeps_new_image() {
        let t0 = Instant::now();
        let mut lb = LightboxController::new(DELAY);
        lb.open("a.jpg");
        lb.close_at(t0);
        lb.open("b.jpg");
        lb.tick_at(t0 + DELAY * 2);
        assert_eq!(lb.src(), "b.jpg");
        assert!(lb.is_open());
    }

    #[test]
    fn detached_ignores_events() {
        let mut lb = LightboxController::detached();
        assert!(!lb.is_attached());
        assert!(!lb.handle_at(LightboxEvent::CardClick("a.jpg".to_string()), Instant::now()));
        lb.open("a.jpg");
        assert!(!lb.is_open());
        assert_eq!(lb.src(), "");
    }
}
