//! Colour index → RGB.
//!
//! Indices follow a colour-wheel convention: `0..10` are fixed basics, and each
//! wheel base (yellow = 400, green = 416, ..., pink = 900) names a hue with
//! offsets `-10..=+10` running from light to dark shades of it.

use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

use crate::style::palette::ColorIndex;

const BASICS: [(u8, u8, u8); 10] = [
    (255, 255, 255),
    (0, 0, 0),
    (255, 0, 0),
    (0, 255, 0),
    (0, 0, 255),
    (255, 255, 0),
    (255, 0, 255),
    (0, 255, 255),
    (89, 212, 84),
    (89, 84, 217),
];

/// Wheel bases: (index, hue in degrees). Hue `None` is the grey ramp.
const WHEEL: [(ColorIndex, Option<f32>); 13] = [
    (400, Some(60.0)),
    (416, Some(120.0)),
    (432, Some(180.0)),
    (600, Some(240.0)),
    (616, Some(300.0)),
    (632, Some(0.0)),
    (800, Some(30.0)),
    (820, Some(90.0)),
    (840, Some(165.0)),
    (860, Some(210.0)),
    (880, Some(270.0)),
    (900, Some(330.0)),
    (920, None),
];

const MAX_OFFSET: i32 = 10;

/// RGB colour for a surface colour index. Unknown indices render black.
pub fn surface_rgb(index: ColorIndex) -> RGBColor {
    if let Some(&(r, g, b)) = BASICS.get(index as usize) {
        return RGBColor(r, g, b);
    }

    let nearest = WHEEL
        .iter()
        .map(|&(base, hue)| (index as i32 - base as i32, hue))
        .filter(|(offset, _)| offset.abs() <= MAX_OFFSET)
        .min_by_key(|(offset, _)| offset.abs());

    let Some((offset, hue)) = nearest else {
        return RGBColor(0, 0, 0);
    };

    // Negative offsets are lighter, positive darker.
    let lightness = (0.5 - 0.035 * offset as f32).clamp(0.12, 0.88);
    let saturation = if hue.is_some() { 0.85 } else { 0.0 };
    let hsl = Hsl::new(hue.unwrap_or(0.0), saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    RGBColor(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::palette::Palette;

    #[test]
    fn basics_are_exact() {
        assert_eq!(surface_rgb(1), RGBColor(0, 0, 0));
        assert_eq!(surface_rgb(2), RGBColor(255, 0, 0));
        assert_eq!(surface_rgb(4), RGBColor(0, 0, 255));
    }

    #[test]
    fn shades_darken_with_offset() {
        let light = surface_rgb(622);
        let dark = surface_rgb(642);
        let sum = |c: RGBColor| c.0 as u32 + c.1 as u32 + c.2 as u32;
        assert!(sum(light) > sum(dark));
        // Red base stays red-dominant.
        let base = surface_rgb(632);
        assert!(base.0 > base.1 && base.0 > base.2);
    }

    #[test]
    fn every_palette_entry_maps_to_a_shade() {
        let palette = Palette::standard();
        for i in 0..palette.full_len() {
            let c = surface_rgb(palette.identity(i, false).color);
            assert_ne!(c, RGBColor(0, 0, 0), "index {i}");
        }
    }
}
