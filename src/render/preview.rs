//! PNG previews of a snapshot: terrain shading, obstruction overlays and
//! the selected footprint outline.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::core::Result;
use crate::mask::ObstructionMasks;
use crate::math::GridRect;
use crate::terrain::ElevationMap;

const WATER: [f32; 3] = [0.16, 0.36, 0.78];
const FOLIAGE: [f32; 3] = [0.13, 0.55, 0.18];
const OUTLINE: Rgb<u8> = Rgb([220, 30, 30]);

/// How strongly overlays tint the terrain
const OVERLAY_ALPHA: f32 = 0.6;

fn lerp(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Keyframed color over normalized height, 0 = lowest column, 1 = highest.
#[derive(Clone, Debug)]
pub struct HeightRamp {
    keys: Vec<(f32, [f32; 3])>,
}

impl Default for HeightRamp {
    fn default() -> Self {
        Self::new(vec![
            (0.0, [0.35, 0.30, 0.22]),
            (0.4, [0.55, 0.52, 0.40]),
            (0.8, [0.75, 0.74, 0.70]),
            (1.0, [0.97, 0.97, 0.97]),
        ])
    }
}

impl HeightRamp {
    /// Keys are sorted by position
    pub fn new(mut keys: Vec<(f32, [f32; 3])>) -> Self {
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { keys }
    }

    /// Plain black-to-white ramp
    pub fn grayscale() -> Self {
        Self::new(vec![(0.0, [0.0; 3]), (1.0, [1.0; 3])])
    }

    pub fn sample(&self, t: f32) -> [f32; 3] {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return [0.0; 3];
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for pair in self.keys.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                let f = if span > 0.0 { (t - t0) / span } else { 0.0 };
                return lerp(c0, c1, f);
            }
        }
        last.1
    }
}

/// Renders elevation grids into images.
#[derive(Clone, Debug)]
pub struct PreviewRenderer {
    ramp: HeightRamp,
    scale: u32,
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self { ramp: HeightRamp::default(), scale: 4 }
    }
}

impl PreviewRenderer {
    pub fn new(ramp: HeightRamp, scale: u32) -> Self {
        Self { ramp, scale: scale.max(1) }
    }

    /// Pixels per column edge
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Render `map`, tinting obstructed columns and outlining `footprint`.
    ///
    /// Water wins over foliage where both are set.
    pub fn render(
        &self,
        map: &ElevationMap,
        masks: Option<&ObstructionMasks>,
        footprint: Option<GridRect>,
    ) -> RgbImage {
        let (w, d) = map.dimensions();
        let lo = map.heights().iter().copied().min().unwrap_or(0);
        let hi = map.heights().iter().copied().max().unwrap_or(0);
        let range = (hi as i64 - lo as i64).max(1) as f32;

        let s = self.scale;
        let mut img = RgbImage::new(w as u32 * s, d as u32 * s);

        for z in 0..d {
            for x in 0..w {
                let mut color = self.ramp.sample((map.get(x, z) as i64 - lo as i64) as f32 / range);
                if let Some(masks) = masks {
                    if masks.water.get(x, z) {
                        color = lerp(color, WATER, OVERLAY_ALPHA);
                    } else if masks.foliage.get(x, z) {
                        color = lerp(color, FOLIAGE, OVERLAY_ALPHA);
                    }
                }
                let px = to_pixel(color);
                for dz in 0..s {
                    for dx in 0..s {
                        img.put_pixel(x as u32 * s + dx, z as u32 * s + dz, px);
                    }
                }
            }
        }

        if let Some(rect) = footprint.filter(|r| !r.is_empty()) {
            draw_outline(&mut img, rect, s);
        }
        img
    }

    /// Render and write a PNG
    pub fn save(
        &self,
        path: &Path,
        map: &ElevationMap,
        masks: Option<&ObstructionMasks>,
        footprint: Option<GridRect>,
    ) -> Result<()> {
        let img = self.render(map, masks, footprint);
        img.save(path)?;
        log::info!("Wrote {}x{} preview to {}", img.width(), img.height(), path.display());
        Ok(())
    }
}

fn to_pixel(c: [f32; 3]) -> Rgb<u8> {
    Rgb([
        (c[0].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[1].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[2].clamp(0.0, 1.0) * 255.0).round() as u8,
    ])
}

/// One-pixel border along the footprint's outer edge, clipped to the image.
fn draw_outline(img: &mut RgbImage, rect: GridRect, scale: u32) {
    let x0 = rect.x as u32 * scale;
    let z0 = rect.z as u32 * scale;
    let x1 = (rect.end_x() as u32 * scale).min(img.width()).saturating_sub(1);
    let z1 = (rect.end_z() as u32 * scale).min(img.height()).saturating_sub(1);
    if x0 > x1 || z0 > z1 {
        return;
    }
    for x in x0..=x1 {
        img.put_pixel(x, z0, OUTLINE);
        img.put_pixel(x, z1, OUTLINE);
    }
    for z in z0..=z1 {
        img.put_pixel(x0, z, OUTLINE);
        img.put_pixel(x1, z, OUTLINE);
    }
}
