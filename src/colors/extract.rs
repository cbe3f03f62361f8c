//! Text palette suggestion from cover art.
//!
//! The image is shrunk to a thumbnail, its pixels are clustered with seeded
//! k-means, and the cluster centers are paired by WCAG contrast ratio. The
//! brighter color of the best pair becomes the primary tier color.

use super::{RgbColor, TextPalette};
use palette::{Hsl, IntoColor, LinSrgb, Srgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

/// Lightness band a primary text color must fall inside.
const PRIMARY_LIGHTNESS: (f32, f32) = (0.25, 0.95);
/// Below this saturation a color reads as gray and is not used as primary.
const PRIMARY_MIN_SATURATION: f32 = 0.15;

/// Errors that can occur during palette extraction.
#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error("Failed to load image: {0}")]
    Image(#[from] image::ImageError),
}

/// Clustering settings.
#[derive(Debug, Clone)]
pub struct PaletteOptions {
    pub clusters: usize,
    pub seed: u64,
    /// Independent k-means runs; the one with the lowest inertia wins.
    pub restarts: usize,
    pub max_iterations: usize,
    /// Longest thumbnail edge in pixels.
    pub thumbnail_size: u32,
    /// Minimum contrast for a pair built around a legible primary.
    pub min_contrast: f64,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            clusters: 8,
            seed: 42,
            restarts: 10,
            max_iterations: 100,
            thumbnail_size: 150,
            min_contrast: 3.0,
        }
    }
}

/// Suggest primary, secondary and outline colors for an image.
///
/// The same image and seed always give the same palette.
pub fn extract_palette<P: AsRef<Path>>(path: P, options: &PaletteOptions) -> Result<TextPalette, PaletteError> {
    let image = image::open(path.as_ref())?;
    let thumb = image
        .thumbnail(options.thumbnail_size, options.thumbnail_size)
        .to_rgb8();
    let pixels: Vec<[f32; 3]> = thumb
        .pixels()
        .map(|p| [p.0[0] as f32, p.0[1] as f32, p.0[2] as f32])
        .collect();

    let centers: Vec<RgbColor> = kmeans(&pixels, options)
        .into_iter()
        .map(|c| RgbColor::new(channel(c[0]), channel(c[1]), channel(c[2])))
        .collect();

    let palette = choose_palette(&centers, options.min_contrast);
    log::debug!(
        "Palette from {} clusters: primary {}, secondary {}, outline {}",
        centers.len(),
        palette.primary,
        palette.secondary,
        palette.outline
    );
    Ok(palette)
}

/// WCAG 2 relative luminance in `[0, 1]`.
pub fn relative_luminance(color: RgbColor) -> f64 {
    let linear: LinSrgb = Srgb::new(color.r, color.g, color.b)
        .into_format::<f32>()
        .into_linear();
    0.2126 * linear.red as f64 + 0.7152 * linear.green as f64 + 0.0722 * linear.blue as f64
}

/// WCAG 2 contrast ratio, from 1 (identical) to 21 (black on white).
pub fn contrast_ratio(a: RgbColor, b: RgbColor) -> f64 {
    let (la, lb) = (relative_luminance(a), relative_luminance(b));
    (la.max(lb) + 0.05) / (la.min(lb) + 0.05)
}

fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn is_legible_primary(color: RgbColor) -> bool {
    let hsl: Hsl = Srgb::new(color.r, color.g, color.b)
        .into_format::<f32>()
        .into_color();
    hsl.saturation >= PRIMARY_MIN_SATURATION
        && hsl.lightness >= PRIMARY_LIGHTNESS.0
        && hsl.lightness <= PRIMARY_LIGHTNESS.1
}

/// Brighter color first.
fn order_by_luminance(a: RgbColor, b: RgbColor) -> (RgbColor, RgbColor) {
    if relative_luminance(a) >= relative_luminance(b) {
        (a, b)
    } else {
        (b, a)
    }
}

fn best_pair(colors: &[RgbColor], accept: impl Fn(RgbColor, RgbColor) -> bool) -> Option<(RgbColor, RgbColor)> {
    let mut best: Option<(f64, RgbColor, RgbColor)> = None;
    for (i, &a) in colors.iter().enumerate() {
        for &b in &colors[i + 1..] {
            let (bright, dark) = order_by_luminance(a, b);
            if !accept(bright, dark) {
                continue;
            }
            let contrast = contrast_ratio(bright, dark);
            if best.map_or(true, |(current, _, _)| contrast > current) {
                best = Some((contrast, bright, dark));
            }
        }
    }
    best.map(|(_, bright, dark)| (bright, dark))
}

fn choose_palette(colors: &[RgbColor], min_contrast: f64) -> TextPalette {
    let legible = best_pair(colors, |bright, dark| {
        is_legible_primary(bright) && contrast_ratio(bright, dark) >= min_contrast
    });
    let Some((primary, secondary)) = legible.or_else(|| best_pair(colors, |_, _| true)) else {
        return TextPalette::default();
    };

    let mut outline: Option<(f64, RgbColor)> = None;
    for &color in colors {
        if color == primary || color == secondary {
            continue;
        }
        let contrast = contrast_ratio(primary, color);
        if outline.map_or(true, |(current, _)| contrast > current) {
            outline = Some((contrast, color));
        }
    }
    let outline = match outline {
        Some((_, color)) => color,
        None if relative_luminance(primary) > 0.5 => RgbColor::BLACK,
        None => RgbColor::WHITE,
    };

    TextPalette {
        primary,
        secondary,
        outline,
    }
}

fn distance_sq(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

fn nearest(pixel: &[f32; 3], centers: &[[f32; 3]]) -> (usize, f32) {
    centers
        .iter()
        .enumerate()
        .map(|(i, c)| (i, distance_sq(pixel, c)))
        .fold((0, f32::INFINITY), |best, candidate| if candidate.1 < best.1 { candidate } else { best })
}

/// k-means++ seeding.
fn seed_centers(pixels: &[[f32; 3]], k: usize, rng: &mut StdRng) -> Vec<[f32; 3]> {
    let mut centers = vec![pixels[rng.random_range(0..pixels.len())]];
    while centers.len() < k {
        let weights: Vec<f64> = pixels.iter().map(|p| nearest(p, &centers).1 as f64).collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            // Fewer distinct colors than clusters.
            break;
        }
        let mut target = rng.random::<f64>() * total;
        let mut chosen = pixels.len() - 1;
        for (i, weight) in weights.iter().enumerate() {
            if target < *weight {
                chosen = i;
                break;
            }
            target -= weight;
        }
        centers.push(pixels[chosen]);
    }
    centers
}

fn kmeans(pixels: &[[f32; 3]], options: &PaletteOptions) -> Vec<[f32; 3]> {
    if pixels.is_empty() || options.clusters == 0 {
        return Vec::new();
    }
    let k = options.clusters.min(pixels.len());
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut best: Option<(f64, Vec<[f32; 3]>)> = None;

    for _ in 0..options.restarts.max(1) {
        let mut centers = seed_centers(pixels, k, &mut rng);
        let mut assignment = vec![usize::MAX; pixels.len()];

        for _ in 0..options.max_iterations {
            let mut changed = false;
            for (slot, pixel) in assignment.iter_mut().zip(pixels) {
                let (index, _) = nearest(pixel, &centers);
                if *slot != index {
                    *slot = index;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            let mut sums = vec![[0.0f64; 3]; centers.len()];
            let mut counts = vec![0usize; centers.len()];
            for (&index, pixel) in assignment.iter().zip(pixels) {
                for (sum, value) in sums[index].iter_mut().zip(pixel) {
                    *sum += *value as f64;
                }
                counts[index] += 1;
            }
            for ((center, sum), count) in centers.iter_mut().zip(&sums).zip(&counts) {
                // Empty clusters keep their previous center.
                if *count > 0 {
                    let n = *count as f64;
                    *center = [(sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32];
                }
            }
        }

        let inertia: f64 = pixels.iter().map(|p| nearest(p, &centers).1 as f64).sum();
        if best.as_ref().map_or(true, |(current, _)| inertia < *current) {
            best = Some((inertia, centers));
        }
    }

    best.map(|(_, centers)| centers).unwrap_or_default()
}
