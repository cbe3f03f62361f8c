//! Animation catalog and factory functions.
//!
//! The catalog is built once and passed by reference to whatever resolves
//! animation names, so tests can register their own entries.

use super::{
    BackgroundAnimation, BackgroundKind, CatalogError, CoverAnimation, CoverKind, FadeSlideText,
    GradientWaveBackground, ScrollingListText, StaticBlurBackground, StaticCover, TextAnimation,
    TextKind, VinylRecordCover, WaveBlurBackground,
};
use std::collections::HashMap;

/// Create a background animation with default parameters.
///
/// # Example
/// ```
/// use lyric_video::animations::{create_background, BackgroundKind};
///
/// let bg = create_background(BackgroundKind::GradientWave);
/// assert!(bg.is_generative());
/// ```
pub fn create_background(kind: BackgroundKind) -> Box<dyn BackgroundAnimation> {
    match kind {
        BackgroundKind::StaticBlur => Box::new(StaticBlurBackground::default()),
        BackgroundKind::GradientWave => Box::new(GradientWaveBackground::default()),
        BackgroundKind::WaveBlur => Box::new(WaveBlurBackground::default()),
    }
}

/// Create a text animation with default parameters.
pub fn create_text(kind: TextKind) -> Box<dyn TextAnimation> {
    match kind {
        TextKind::FadeSlide => Box::new(FadeSlideText::default()),
        TextKind::ScrollingList => Box::new(ScrollingListText::default()),
    }
}

/// Create a cover animation with default parameters.
pub fn create_cover(kind: CoverKind) -> Box<dyn CoverAnimation> {
    match kind {
        CoverKind::Static => Box::new(StaticCover::default()),
        CoverKind::VinylRecord => Box::new(VinylRecordCover::default()),
    }
}

/// Name-to-animation mappings for the three categories.
pub struct AnimationCatalog {
    backgrounds: HashMap<BackgroundKind, Box<dyn BackgroundAnimation>>,
    texts: HashMap<TextKind, Box<dyn TextAnimation>>,
    covers: HashMap<CoverKind, Box<dyn CoverAnimation>>,
}

impl Default for AnimationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for AnimationCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationCatalog")
            .field("backgrounds", &self.background_names())
            .field("texts", &self.text_names())
            .field("covers", &self.cover_names())
            .finish()
    }
}

impl AnimationCatalog {
    /// Catalog with nothing registered.
    pub fn empty() -> Self {
        Self {
            backgrounds: HashMap::new(),
            texts: HashMap::new(),
            covers: HashMap::new(),
        }
    }

    /// Catalog with every built-in animation at default parameters.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for kind in BackgroundKind::all() {
            catalog.register_background(create_background(*kind));
        }
        for kind in TextKind::all() {
            catalog.register_text(create_text(*kind));
        }
        for kind in CoverKind::all() {
            catalog.register_cover(create_cover(*kind));
        }
        catalog
    }

    /// Add or replace the entry for the animation's kind.
    pub fn register_background(&mut self, animation: Box<dyn BackgroundAnimation>) {
        self.backgrounds.insert(animation.kind(), animation);
    }

    pub fn register_text(&mut self, animation: Box<dyn TextAnimation>) {
        self.texts.insert(animation.kind(), animation);
    }

    pub fn register_cover(&mut self, animation: Box<dyn CoverAnimation>) {
        self.covers.insert(animation.kind(), animation);
    }

    pub fn background(&self, name: &str) -> Result<&dyn BackgroundAnimation, CatalogError> {
        BackgroundKind::from_str(name)
            .and_then(|kind| self.backgrounds.get(&kind))
            .map(|animation| &**animation)
            .ok_or_else(|| unknown("background", name, self.background_names()))
    }

    pub fn text(&self, name: &str) -> Result<&dyn TextAnimation, CatalogError> {
        TextKind::from_str(name)
            .and_then(|kind| self.texts.get(&kind))
            .map(|animation| &**animation)
            .ok_or_else(|| unknown("text", name, self.text_names()))
    }

    pub fn cover(&self, name: &str) -> Result<&dyn CoverAnimation, CatalogError> {
        CoverKind::from_str(name)
            .and_then(|kind| self.covers.get(&kind))
            .map(|animation| &**animation)
            .ok_or_else(|| unknown("cover", name, self.cover_names()))
    }

    pub fn background_names(&self) -> Vec<&'static str> {
        BackgroundKind::all()
            .iter()
            .filter(|kind| self.backgrounds.contains_key(*kind))
            .map(|kind| kind.name())
            .collect()
    }

    pub fn text_names(&self) -> Vec<&'static str> {
        TextKind::all()
            .iter()
            .filter(|kind| self.texts.contains_key(*kind))
            .map(|kind| kind.name())
            .collect()
    }

    pub fn cover_names(&self) -> Vec<&'static str> {
        CoverKind::all()
            .iter()
            .filter(|kind| self.covers.contains_key(*kind))
            .map(|kind| kind.name())
            .collect()
    }
}

fn unknown(category: &'static str, name: &str, available: Vec<&'static str>) -> CatalogError {
    CatalogError::Unknown {
        category,
        name: name.to_string(),
        available: available.join(", "),
    }
}
