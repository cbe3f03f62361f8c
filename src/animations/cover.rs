//! Cover-art animations.

use super::{hold_still, CoverAnimation, CoverKind, FrameSpec};
use crate::expr::{
    clip, gte, if_else, lt, lte, max, min, num, pow, sample, sin, sqrt, var, Channel, Expr, Var,
};

/// Square cover with a soft reflection strip underneath.
#[derive(Debug, Clone)]
pub struct StaticCover {
    /// Edge length of the scaled cover in pixels.
    pub size: u32,
    /// Reflection height as a fraction of `size`.
    pub reflection_ratio: f64,
}

impl Default for StaticCover {
    fn default() -> Self {
        Self {
            size: 600,
            reflection_ratio: 0.4,
        }
    }
}

impl CoverAnimation for StaticCover {
    fn kind(&self) -> CoverKind {
        CoverKind::Static
    }

    fn fragment(&self, frame: &FrameSpec, duration: f64) -> String {
        let size = self.size;
        let reflection = (size as f64 * self.reflection_ratio) as u32;
        let canvas_h = size + reflection;
        let fps = frame.fps();
        // One transparent frame; the final zoompan turns the composite into a stream.
        let frame_time = 1.0 / fps as f64;

        [
            format!("scale={size}:{size},setsar=1,split=2[cover_main][cover_refl_src]"),
            format!("color=c=black@0.0:s={size}x{canvas_h}:r={fps}:d={frame_time}[cover_canvas]"),
            format!(
                "[cover_refl_src]vflip,crop=w={size}:h={reflection}:x=0:y=0,format=yuva444p,\
                 geq=r='r(X,Y)':g='g(X,Y)':b='b(X,Y)':a='128*(1-Y/H)',boxblur=3:1[cover_refl]"
            ),
            "[cover_canvas][cover_main]overlay=x=0:y=0[cover_tmp]".to_string(),
            format!("[cover_tmp][cover_refl]overlay=x=0:y={size}[cover_with_refl]"),
            format!("[cover_with_refl]{}", hold_still(size, canvas_h, frame, duration)),
        ]
        .join(";")
    }
}

/// Radii of the disc regions as fractions of the disc radius.
#[derive(Debug, Clone, Copy)]
pub struct RecordRings {
    /// Outer edge of the pressing ring that darkens the area around the label.
    pub pressing_ring: f64,
    /// Outer edge of the smooth separator band before the grooves.
    pub separator: f64,
    pub lead_in_inner: f64,
    pub lead_in_outer: f64,
}

impl Default for RecordRings {
    fn default() -> Self {
        Self {
            pressing_ring: 0.66,
            separator: 0.68,
            lead_in_inner: 0.93,
            lead_in_outer: 0.99,
        }
    }
}

/// Spinning vinyl record with the cover as its center label.
#[derive(Debug, Clone)]
pub struct VinylRecordCover {
    /// Output diameter in pixels.
    pub record_size: u32,
    /// Label diameter in pixels.
    pub label_size: u32,
    /// Supersampling factor used while shading the disc.
    pub supersample: u32,
    pub seconds_per_turn: f64,
    pub rings: RecordRings,
}

impl Default for VinylRecordCover {
    fn default() -> Self {
        Self {
            record_size: 640,
            label_size: 400,
            supersample: 8,
            seconds_per_turn: 10.0,
            rings: RecordRings::default(),
        }
    }
}

impl VinylRecordCover {
    fn shaded_size(&self) -> f64 {
        (self.record_size * self.supersample.max(1)) as f64
    }

    fn distance_sq(&self) -> Expr {
        let center = self.shaded_size() / 2.0;
        pow(var(Var::X) - center, 2.0) + pow(var(Var::Y) - center, 2.0)
    }

    /// Per-channel color: label pixels pass through, the rest is shaded vinyl.
    pub fn shade(&self, channel: Channel) -> Expr {
        let ss = self.supersample.max(1) as f64;
        let size = self.shaded_size();
        let radius = size / 2.0;
        let label_radius = self.label_size as f64 / 2.0 * ss;
        let d2 = self.distance_sq();
        let dist = || sqrt(self.distance_sq());

        let highlight_d2 = pow(var(Var::X) - size * 0.3, 2.0) + pow(var(Var::Y) - size * 0.3, 2.0);
        let highlight = 60.0 * pow(max(0.0, 1.0 - sqrt(highlight_d2) / (size * 0.7)), 3.0);

        let groove = 15.0 + 10.0 * sin(dist() * (3.5 * ss));
        let in_lead_in = gte(dist(), radius * self.rings.lead_in_inner)
            * lte(dist(), radius * self.rings.lead_in_outer);
        let lead_in = if_else(
            in_lead_in,
            30.0 + 30.0 * sin(dist() * (45.0 * ss) - var(Var::Pi) / 2.0),
            0.0,
        );

        let pressing_ring = radius * self.rings.pressing_ring;
        let separator = radius * self.rings.separator;

        if_else(
            lt(d2.clone(), label_radius * label_radius),
            sample(channel, var(Var::X), var(Var::Y)),
            if_else(
                lt(d2.clone(), pressing_ring * pressing_ring),
                min(255.0, 8.0 + highlight.clone()),
                if_else(
                    lt(d2, separator * separator),
                    min(255.0, 24.0 + highlight.clone()),
                    min(255.0, groove + highlight + lead_in),
                ),
            ),
        )
    }

    /// Disc mask with an edge ramp `1.5 * supersample` pixels wide.
    pub fn alpha(&self) -> Expr {
        let ss = self.supersample.max(1) as f64;
        let radius = self.shaded_size() / 2.0;
        255.0 * clip((num(radius) - sqrt(self.distance_sq())) / (ss * 1.5), 0.0, 1.0)
    }

    /// Rotation speed in radians per second.
    pub fn angular_speed(&self) -> f64 {
        std::f64::consts::TAU / self.seconds_per_turn
    }
}

impl CoverAnimation for VinylRecordCover {
    fn kind(&self) -> CoverKind {
        CoverKind::VinylRecord
    }

    fn fragment(&self, frame: &FrameSpec, duration: f64) -> String {
        let record = self.record_size;
        let label = self.label_size;
        let shaded = self.shaded_size();

        [
            "split[vinyl_label_src][vinyl_canvas_src]".to_string(),
            format!("[vinyl_label_src]scale={label}:{label}:flags=lanczos,setsar=1[vinyl_label]"),
            format!(
                "[vinyl_canvas_src]scale={record}:{record},format=yuva444p,\
                 lutrgb=r=0:g=0:b=0:a=255[vinyl_black]"
            ),
            "[vinyl_black][vinyl_label]overlay=(main_w-overlay_w)/2:(main_h-overlay_h)/2[vinyl_pressed]"
                .to_string(),
            format!(
                "[vinyl_pressed]scale=w={shaded}:h={shaded},setsar=1,format=yuva444p,\
                 geq=r='{r}':g='{g}':b='{b}':a='{a}',\
                 scale=w={record}:h={record}:flags=lanczos,{hold},\
                 rotate=a=t*{speed}:c=none:ow={record}:oh={record}",
                r = self.shade(Channel::Red),
                g = self.shade(Channel::Green),
                b = self.shade(Channel::Blue),
                a = self.alpha(),
                hold = hold_still(record, record, frame, duration),
                speed = self.angular_speed(),
            ),
        ]
        .join(";")
    }
}
