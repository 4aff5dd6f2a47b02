use crate::colors::{Rgb, WHITE};

pub const TOOLTIP_FONT: &str = "20px Arial";
pub const TOOLTIP_HEIGHT: f64 = 40.0;
/// Horizontal room added around the measured label text.
pub const TOOLTIP_TEXT_MARGIN: f64 = 40.0;
pub const TOOLTIP_BORDER: f64 = 2.0;
pub const TOOLTIP_BACKGROUND: Rgb = (0x45, 0x45, 0x45);
pub const TOOLTIP_TEXT_ORIGIN: (f64, f64) = (20.0, 30.0);

pub const PULSE_SIZE: f64 = 75.0;
/// Ticks a pulse stays on screen; frames `0..=PULSE_LIFETIME` are drawn.
pub const PULSE_LIFETIME: u32 = 300;

/// Solid paint with alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub rgb: Rgb,
    pub alpha: f64,
}

impl Fill {
    pub const fn opaque(rgb: Rgb) -> Self {
        Self { rgb, alpha: 1.0 }
    }

    pub const fn translucent(rgb: Rgb, alpha: f64) -> Self {
        Self { rgb, alpha }
    }
}

/// One drawing instruction. Coordinates are canvas pixels, or sprite-local
/// pixels inside a [`Sprite`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear {
        width: f64,
        height: f64,
    },
    /// Stretch the static map image over the whole surface.
    Background {
        width: f64,
        height: f64,
    },
    /// Filled circle, optionally outlined with the default 1px black stroke.
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        fill: Fill,
        stroke: bool,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Fill,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        font: &'static str,
        fill: Fill,
    },
    /// Blit a sprite with its top-left corner at `(x, y)`, clipped to its size.
    Sprite {
        x: f64,
        y: f64,
        sprite: Sprite,
    },
}

/// Small off-screen bitmap, kept as a sized display list.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

/// Text width measurement, supplied by the drawing surface.
pub trait TextMeasure {
    fn text_width(&self, font: &str, text: &str) -> f64;
}

/// Name tag: dark box sized to the measured text, with a 2px colored border.
pub fn tooltip_sprite(text: &str, border: Rgb, measure: &dyn TextMeasure) -> Sprite {
    // Bitmap sizes are whole pixels.
    let width = (measure.text_width(TOOLTIP_FONT, text) + TOOLTIP_TEXT_MARGIN)
        .floor()
        .max(0.0);
    let height = TOOLTIP_HEIGHT;
    let pad = TOOLTIP_BORDER;
    let border = Fill::opaque(border);

    let edge = |x: f64, y: f64, w: f64, h: f64| DrawOp::Rect {
        x,
        y,
        width: w,
        height: h,
        fill: border,
    };

    Sprite {
        width,
        height,
        ops: vec![
            DrawOp::Rect {
                x: 0.0,
                y: 0.0,
                width,
                height,
                fill: Fill::opaque(TOOLTIP_BACKGROUND),
            },
            edge(0.0, 0.0, pad, height),
            edge(0.0, 0.0, width, pad),
            edge(width - pad, 0.0, pad, height),
            edge(0.0, height - pad, width, pad),
            DrawOp::Text {
                x: TOOLTIP_TEXT_ORIGIN.0,
                y: TOOLTIP_TEXT_ORIGIN.1,
                text: text.to_string(),
                font: TOOLTIP_FONT,
                fill: Fill::opaque(WHITE),
            },
        ],
    }
}

/// Ring for the given pulse frame: radius shrinks by 1px every 10 frames and
/// opacity fades linearly to zero. `None` once the pulse has expired.
pub fn pulse_sprite(frame: u32) -> Option<Sprite> {
    if frame > PULSE_LIFETIME {
        return None;
    }
    let frame = f64::from(frame);
    let center = PULSE_SIZE / 2.0;
    Some(Sprite {
        width: PULSE_SIZE,
        height: PULSE_SIZE,
        ops: vec![DrawOp::Circle {
            x: center,
            y: center,
            radius: center - frame / 10.0,
            fill: Fill::translucent(WHITE, 1.0 - frame / f64::from(PULSE_LIFETIME)),
            stroke: true,
        }],
    })
}
