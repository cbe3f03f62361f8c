//! Background animations.
//!
//! Image-sourced backgrounds filter the background input stream; the
//! generative gradient synthesizes every pixel and reads no input.

use super::{hold_still, BackgroundAnimation, BackgroundKind, FrameSpec};
use crate::expr::{cos, sample, sin, var, Channel, Expr, Var};

/// Blurred still of the background image.
#[derive(Debug, Clone)]
pub struct StaticBlurBackground {
    pub luma_radius: u32,
    pub chroma_radius: u32,
}

impl Default for StaticBlurBackground {
    fn default() -> Self {
        Self {
            luma_radius: 20,
            chroma_radius: 5,
        }
    }
}

impl BackgroundAnimation for StaticBlurBackground {
    fn kind(&self) -> BackgroundKind {
        BackgroundKind::StaticBlur
    }

    fn fragment(&self, frame: &FrameSpec, duration: f64) -> String {
        let (w, h) = (frame.width(), frame.height());
        format!(
            "{},boxblur={}:{},{}",
            cover_crop(w, h),
            self.luma_radius,
            self.chroma_radius,
            hold_still(w, h, frame, duration)
        )
    }
}

/// One color channel of the gradient: a horizontal sine plus a vertical cosine.
#[derive(Debug, Clone, Copy)]
pub struct WaveTerm {
    /// Spatial period divisor along X at full resolution.
    pub x_period: f64,
    pub x_speed: f64,
    pub y_period: f64,
    pub y_speed: f64,
}

impl WaveTerm {
    /// `128 + 64*sin(X/px + T*sx) + 64*cos(Y/py + T*sy)` with periods divided by `downscale`.
    pub fn expr(&self, downscale: f64) -> Expr {
        let time = || var(Var::PixelTime);
        128.0
            + 64.0 * sin(var(Var::X) / (self.x_period / downscale) + time() * self.x_speed)
            + 64.0 * cos(var(Var::Y) / (self.y_period / downscale) + time() * self.y_speed)
    }
}

/// Flowing color field rendered at reduced resolution and upscaled.
#[derive(Debug, Clone)]
pub struct GradientWaveBackground {
    /// Linear downscale factor for generation.
    pub downscale: u32,
    /// Red, green and blue terms, each phase-shifted from the others.
    pub channels: [WaveTerm; 3],
}

impl Default for GradientWaveBackground {
    fn default() -> Self {
        Self {
            downscale: 4,
            channels: [
                WaveTerm { x_period: 150.0, x_speed: 2.0, y_period: 150.0, y_speed: 2.5 },
                WaveTerm { x_period: 180.0, x_speed: 1.5, y_period: 120.0, y_speed: 2.0 },
                WaveTerm { x_period: 120.0, x_speed: 2.5, y_period: 180.0, y_speed: 1.5 },
            ],
        }
    }
}

impl BackgroundAnimation for GradientWaveBackground {
    fn kind(&self) -> BackgroundKind {
        BackgroundKind::GradientWave
    }

    fn is_generative(&self) -> bool {
        true
    }

    fn fragment(&self, frame: &FrameSpec, duration: f64) -> String {
        let k = self.downscale.max(1);
        let (low_w, low_h) = ((frame.width() / k).max(1), (frame.height() / k).max(1));
        let seconds = frame.frame_count(duration) as f64 / frame.fps() as f64;
        let [r, g, b] = self.channels.map(|term| term.expr(k as f64));

        format!(
            "nullsrc=s={low_w}x{low_h}:r={fps}:d={seconds},format=yuv420p,\
             geq=r='{r}':g='{g}':b='{b}',\
             scale=w={w}:h={h}:flags=spline",
            fps = frame.fps(),
            w = frame.width(),
            h = frame.height(),
        )
    }
}

/// Background image with a travelling vertical ripple, blurred.
#[derive(Debug, Clone)]
pub struct WaveBlurBackground {
    pub downscale: u32,
    /// Ripple height in full-resolution pixels.
    pub amplitude: f64,
    /// Horizontal wavelength divisor in full-resolution pixels.
    pub density: f64,
    /// Phase speed in radians per second.
    pub speed: f64,
    pub luma_radius: f64,
    pub chroma_radius: f64,
}

impl Default for WaveBlurBackground {
    fn default() -> Self {
        Self {
            downscale: 2,
            amplitude: 3.0,
            density: 50.0,
            speed: 2.0,
            luma_radius: 20.0,
            chroma_radius: 5.0,
        }
    }
}

impl WaveBlurBackground {
    /// geq lookup displacing each pixel vertically, with constants at reduced scale.
    pub fn displacement(&self) -> Expr {
        let k = self.downscale.max(1) as f64;
        let ripple = (self.amplitude / k)
            * sin(var(Var::X) / (self.density / k) + var(Var::PixelTime) * self.speed);
        sample(Channel::Plane, var(Var::X), var(Var::Y) + ripple)
    }
}

impl BackgroundAnimation for WaveBlurBackground {
    fn kind(&self) -> BackgroundKind {
        BackgroundKind::WaveBlur
    }

    fn fragment(&self, frame: &FrameSpec, duration: f64) -> String {
        let k = self.downscale.max(1);
        let (low_w, low_h) = ((frame.width() / k).max(1), (frame.height() / k).max(1));
        format!(
            "{},{},geq='{}',boxblur={}:{},scale={}:{}:flags=spline",
            cover_crop(low_w, low_h),
            hold_still(low_w, low_h, frame, duration),
            self.displacement(),
            self.luma_radius / k as f64,
            self.chroma_radius / k as f64,
            frame.width(),
            frame.height()
        )
    }
}

/// Scale to cover `w`x`h` keeping aspect ratio, then crop to exactly that box.
fn cover_crop(w: u32, h: u32) -> String {
    format!("scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}")
}
