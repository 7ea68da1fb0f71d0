//! Sprite decoding and half-block rendering for the detail overlay

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::Widget,
};
use serde::{Deserialize, Serialize};

/// Alpha below this is treated as transparent.
const ALPHA_CUTOFF: u8 = 16;

/// RGBA pixels cropped to the opaque bounding box.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 4]>,
}

impl SpriteData {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let pixel = self.pixels[(y * self.width + x) as usize];
        if pixel[3] < ALPHA_CUTOFF {
            None
        } else {
            Some(pixel)
        }
    }

    /// Cell size that fits `max_cols` x `max_rows` keeping aspect.
    /// Each cell covers one pixel column and two pixel rows.
    pub fn fit(&self, max_cols: u16, max_rows: u16) -> (u16, u16) {
        if self.width == 0 || self.height == 0 || max_cols == 0 || max_rows == 0 {
            return (0, 0);
        }
        let max_px_h = u32::from(max_rows) * 2;
        let scale_w = f64::from(max_cols) / f64::from(self.width);
        let scale_h = f64::from(max_px_h) / f64::from(self.height);
        let scale = scale_w.min(scale_h).min(1.0);
        let cols = ((f64::from(self.width) * scale).round() as u16).clamp(1, max_cols);
        let px_h = ((f64::from(self.height) * scale).round() as u32).max(1);
        let rows = (px_h.div_ceil(2) as u16).clamp(1, max_rows);
        (cols, rows)
    }
}

pub fn decode_sprite(bytes: &[u8]) -> Result<SpriteData, String> {
    let image = image::load_from_memory(bytes)
        .map_err(|err| err.to_string())?
        .to_rgba8();
    let (width, height) = image.dimensions();

    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0;
    let mut max_y = 0;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[3] >= ALPHA_CUTOFF {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if min_x > max_x || min_y > max_y {
        return Err("sprite has no visible pixels".to_string());
    }

    let crop_w = max_x - min_x + 1;
    let crop_h = max_y - min_y + 1;
    let mut pixels = Vec::with_capacity((crop_w * crop_h) as usize);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            pixels.push(image.get_pixel(x, y).0);
        }
    }
    Ok(SpriteData {
        width: crop_w,
        height: crop_h,
        pixels,
    })
}

/// Renders a sprite centered in its area using `▀` cells.
pub struct SpriteView<'a> {
    sprite: &'a SpriteData,
}

impl<'a> SpriteView<'a> {
    pub fn new(sprite: &'a SpriteData) -> Self {
        Self { sprite }
    }
}

impl Widget for SpriteView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (cols, rows) = self.sprite.fit(area.width, area.height);
        if cols == 0 || rows == 0 {
            return;
        }
        let x0 = area.x + (area.width - cols) / 2;
        let y0 = area.y + (area.height - rows) / 2;
        let px_rows = u32::from(rows) * 2;

        for row in 0..rows {
            for col in 0..cols {
                let sx = u32::from(col) * self.sprite.width / u32::from(cols);
                let top_y = u32::from(row) * 2 * self.sprite.height / px_rows;
                let bottom_y = (u32::from(row) * 2 + 1) * self.sprite.height / px_rows;
                let top = self.sprite.pixel(sx, top_y);
                let bottom = self.sprite.pixel(sx, bottom_y);
                let Some(cell) = buf.cell_mut((x0 + col, y0 + row)) else {
                    continue;
                };
                match (top, bottom) {
                    (None, None) => {}
                    (Some(top), None) => {
                        cell.set_symbol("▀").set_fg(rgb(top));
                    }
                    (None, Some(bottom)) => {
                        cell.set_symbol("▄").set_fg(rgb(bottom));
                    }
                    (Some(top), Some(bottom)) => {
                        cell.set_symbol("▀").set_fg(rgb(top)).set_bg(rgb(bottom));
                    }
                }
            }
        }
    }
}

fn rgb(pixel: [u8; 4]) -> Color {
    Color::Rgb(pixel[0], pixel[1], pixel[2])
}
