// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Gallery rendering
//!
//! [`render_gallery`] only talks to a [`GallerySurface`], so any page model
//! can host the cards. [`GalleryPage`] is the in-memory surface used by the
//! server and the `load` command; it also emits the final HTML.

use indexmap::IndexMap;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use std::time::Duration;

use crate::config::CategoryConfig;
use crate::lightbox::LightboxController;
use crate::manifest::GalleryManifest;

/// Ids of the lightbox overlay, image and close button
pub const LIGHTBOX_ID: &str = "lightbox";
pub const LIGHTBOX_IMG_ID: &str = "lightbox-img";
pub const LIGHTBOX_CLOSE_ID: &str = "lightbox-close";

const DEFAULT_CLOSE_DELAY_MS: u64 = 300;

/// How an image sits inside its card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// White background, whole image visible with padding (logos)
    Contain,
    /// Gray background, image cropped to fill (photos)
    #[default]
    Cover,
}

impl DisplayMode {
    fn card_background(self) -> &'static str {
        match self {
            DisplayMode::Contain => "bg-white",
            DisplayMode::Cover => "bg-gray-200",
        }
    }

    fn image_fit(self) -> &'static str {
        match self {
            DisplayMode::Contain => "object-contain p-4",
            DisplayMode::Cover => "object-cover",
        }
    }
}

/// View model for one image card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryCard {
    pub category: String,
    pub filename: String,
    pub src: String,
    pub alt: String,
    pub display: DisplayMode,
    pub hidden: bool,
}

impl GalleryCard {
    pub fn new(category: &CategoryConfig, filename: &str) -> Self {
        Self {
            category: category.id.clone(),
            filename: filename.to_string(),
            src: format!("{}{}", category.url_base, filename),
            alt: category.alt.clone(),
            display: category.display,
            hidden: false,
        }
    }

    pub fn card_class(&self) -> String {
        format!(
            "gallery-card group relative overflow-hidden rounded-xl shadow-lg aspect-video {} cursor-pointer",
            self.display.card_background()
        )
    }

    pub fn image_class(&self) -> String {
        format!(
            "w-full h-full {} transition-transform duration-500 group-hover:scale-110 gallery-img",
            self.display.image_fit()
        )
    }

    pub fn to_markup(&self) -> Markup {
        html! {
            div class=(self.card_class())
                data-lightbox-src=(self.src)
                style=[self.hidden.then_some("display: none")] {
                img src=(self.src) alt=(self.alt) class=(self.image_class()) loading="lazy"
                    onerror="this.parentElement.style.display='none'";
                div class="absolute inset-0 bg-black bg-opacity-0 group-hover:bg-opacity-30 transition-all duration-300 flex items-center justify-center" {
                    (PreEscaped(ZOOM_ICON))
                }
            }
        }
    }
}

const ZOOM_ICON: &str = r#"<svg class="w-8 h-8 text-white opacity-0 group-hover:opacity-100 transform scale-75 group-hover:scale-100 transition-all duration-300" fill="none" stroke="currentColor" viewBox="0 0 24 24"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M21 21l-6-6m2-5a7 7 0 11-14 0 7 7 0 0114 0zM10 7v6m4-3H6"></path></svg>"#;

/// Where cards get placed; the page-model adapter
pub trait GallerySurface {
    /// Whether the page declares a container with this id
    fn has_container(&self, id: &str) -> bool;

    /// Drop every card in the container
    fn clear_container(&mut self, id: &str);

    /// Append a card to the container
    fn append_card(&mut self, id: &str, card: GalleryCard);
}

/// What a render pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// (category, cards rendered)
    pub rendered: Vec<(String, usize)>,
    /// Categories left untouched
    pub skipped: Vec<String>,
}

impl RenderSummary {
    pub fn card_count(&self) -> usize {
        self.rendered.iter().map(|(_, n)| n).sum()
    }
}

/// Render every configured category of a manifest onto a surface.
///
/// Categories with no files or no container are skipped; rendered
/// containers are cleared first so repeated calls never duplicate cards.
pub fn render_gallery<S: GallerySurface + ?Sized>(
    surface: &mut S,
    manifest: &GalleryManifest,
    categories: &[CategoryConfig],
) -> RenderSummary {
    let mut summary = RenderSummary::default();

    for category in categories {
        let files = match manifest.files(&category.id) {
            Some(files) if !files.is_empty() => files,
            _ => {
                debug!("No images for '{}', skipping", category.id);
                summary.skipped.push(category.id.clone());
                continue;
            }
        };

        if !surface.has_container(&category.container_id) {
            debug!("Container '{}' not on page, skipping '{}'", category.container_id, category.id);
            summary.skipped.push(category.id.clone());
            continue;
        }

        surface.clear_container(&category.container_id);
        for file in files {
            surface.append_card(&category.container_id, GalleryCard::new(category, file));
        }
        summary.rendered.push((category.id.clone(), files.len()));
    }

    summary
}

/// In-memory page: declared containers and their cards, plus the lightbox
#[derive(Debug, Clone)]
pub struct GalleryPage {
    containers: IndexMap<String, Vec<GalleryCard>>,
    has_lightbox: bool,
    close_delay_ms: u64,
}

impl GalleryPage {
    /// Page declaring the given containers, without a lightbox
    pub fn new<I, S>(container_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            containers: container_ids.into_iter().map(|id| (id.into(), Vec::new())).collect(),
            has_lightbox: false,
            close_delay_ms: DEFAULT_CLOSE_DELAY_MS,
        }
    }

    /// Page declaring one container per category plus the lightbox
    pub fn for_categories(categories: &[CategoryConfig]) -> Self {
        Self::new(categories.iter().map(|c| c.container_id.clone())).with_lightbox()
    }

    pub fn with_lightbox(mut self) -> Self {
        self.has_lightbox = true;
        self
    }

    /// Delay before the browser clears the lightbox image after closing
    pub fn with_close_delay(mut self, close_delay_ms: u64) -> Self {
        self.close_delay_ms = close_delay_ms;
        self
    }

    fn lightbox_script(&self) -> String {
        LIGHTBOX_JS.replace("__CLOSE_DELAY__", &self.close_delay_ms.to_string())
    }

    pub fn has_lightbox(&self) -> bool {
        self.has_lightbox
    }

    /// The page's lightbox controller; detached when the page has no overlay
    pub fn lightbox(&self) -> LightboxController {
        if self.has_lightbox {
            LightboxController::new(Duration::from_millis(self.close_delay_ms))
        } else {
            LightboxController::detached()
        }
    }

    /// Cards in a container (empty if absent)
    pub fn cards(&self, id: &str) -> &[GalleryCard] {
        self.containers.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cards still shown in a container
    pub fn visible_cards(&self, id: &str) -> impl Iterator<Item = &GalleryCard> {
        self.cards(id).iter().filter(|c| !c.hidden)
    }

    /// A card was clicked: the URL the lightbox should open
    pub fn card_clicked(&self, id: &str, index: usize) -> Option<&str> {
        self.cards(id)
            .get(index)
            .filter(|c| !c.hidden)
            .map(|c| c.src.as_str())
    }

    /// An image failed to load: hide its cards, leave siblings alone
    pub fn image_failed(&mut self, src: &str) -> usize {
        let mut hidden = 0;
        for card in self.containers.values_mut().flatten() {
            if card.src == src && !card.hidden {
                card.hidden = true;
                hidden += 1;
            }
        }
        if hidden > 0 {
            warn!("Image failed to load: {}", src);
        }
        hidden
    }

    /// Full HTML document with the gallery sections and lightbox
    pub fn to_html(&self, title: &str) -> String {
        let content = html! {
            @for (id, cards) in &self.containers {
                section class="gallery-section" {
                    div id=(id) class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-6" {
                        @for card in cards {
                            (card.to_markup())
                        }
                    }
                }
            }
            @if self.has_lightbox {
                style { (PreEscaped(LIGHTBOX_CSS)) }
                (lightbox_markup())
                script { (PreEscaped(self.lightbox_script())) }
            }
        };
        base_document(title, content).into_string()
    }
}

impl GallerySurface for GalleryPage {
    fn has_container(&self, id: &str) -> bool {
        self.containers.contains_key(id)
    }

    fn clear_container(&mut self, id: &str) {
        if let Some(cards) = self.containers.get_mut(id) {
            cards.clear();
        }
    }

    fn append_card(&mut self, id: &str, card: GalleryCard) {
        if let Some(cards) = self.containers.get_mut(id) {
            cards.push(card);
        }
    }
}

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                main class="container" { (content) }
            }
        }
    }
}

fn lightbox_markup() -> Markup {
    html! {
        div id=(LIGHTBOX_ID) class="lightbox" {
            button id=(LIGHTBOX_CLOSE_ID) class="lightbox-close" aria-label="Close" { "×" }
            img id=(LIGHTBOX_IMG_ID) src="" alt="";
        }
    }
}

const CSS: &str = r#"
.container { max-width: 1400px; margin: 0 auto; padding: 20px; }
.gallery-section { margin-bottom: 40px; }
"#;

const LIGHTBOX_CSS: &str = r#"
.lightbox { position: fixed; inset: 0; display: none; align-items: center; justify-content: center; background: rgba(0,0,0,0.9); z-index: 50; }
.lightbox.open { display: flex; }
.lightbox img { max-width: 90vw; max-height: 90vh; }
.lightbox-close { position: absolute; top: 20px; right: 30px; font-size: 2.5em; color: #fff; background: none; border: 0; cursor: pointer; }
"#;

// Browser-side twin of `LightboxController`: same states and close delay
const LIGHTBOX_JS: &str = r#"
(function () {
  var box = document.getElementById('lightbox');
  var img = document.getElementById('lightbox-img');
  var btn = document.getElementById('lightbox-close');
  if (!box || !img) return;
  var clearTimer = null;
  function open(src) {
    if (clearTimer !== null) { clearTimeout(clearTimer); clearTimer = null; }
    img.src = src;
    box.classList.add('open');
    document.body.style.overflow = 'hidden';
  }
  function close() {
    box.classList.remove('open');
    if (clearTimer !== null) clearTimeout(clearTimer);
    clearTimer = setTimeout(function () { img.src = ''; clearTimer = null; }, __CLOSE_DELAY__);
    document.body.style.overflow = '';
  }
  document.querySelectorAll('[data-lightbox-src]').forEach(function (card) {
    card.addEventListener('click', function () { open(card.getAttribute('data-lightbox-src')); });
  });
  if (btn) btn.addEventListener('click', close);
  box.addEventListener('click', function (e) { if (e.target === box) close(); });
  document.addEventListener('keydown', function (e) {
    if (e.key === 'Escape' && box.classList.contains('open')) close();
  });
})();
"#;
