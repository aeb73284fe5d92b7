//! Colour palettes and identity assignment.
//!
//! Colours are surface colour *indices*, not RGB. The tables below are
//! calibration data for the surface's index convention: the full palette is a
//! list of index bands, the compact palette a short list of strongly
//! contrasting basics. `color::surface_rgb` turns an index into RGB.

use std::ops::Range;

use crate::style::marker::Marker;

/// A surface colour index.
pub type ColorIndex = u16;

/// Index bands making up the full palette (half-open).
pub const FULL_BANDS: [Range<ColorIndex>; 7] = [
    394..405,
    406..421,
    422..437,
    590..605,
    606..621,
    622..637,
    791..911,
];

/// Compact palette for small ensembles; disjoint from `FULL_BANDS`.
pub const COMPACT_COLORS: [ColorIndex; 8] = [1, 2, 4, 3, 6, 7, 8, 9];

/// Caps strictly between 0 and this limit select the compact palette.
pub const COMPACT_CAP_LIMIT: usize = 19;

/// Whether a group processed with `cap` should use the compact palette.
///
/// Only an explicitly bounded, small ensemble qualifies; `cap == 0` is unbounded.
pub fn use_compact(cap: usize) -> bool {
    cap > 0 && cap < COMPACT_CAP_LIMIT
}

/// Colour and marker for one ensemble member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualIdentity {
    pub color: ColorIndex,
    pub marker: Marker,
}

/// Full and compact colour tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    full: Vec<ColorIndex>,
    compact: Vec<ColorIndex>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

impl Palette {
    /// Palette built from `FULL_BANDS` and `COMPACT_COLORS`.
    pub fn standard() -> Self {
        Self::from_tables(&FULL_BANDS, &COMPACT_COLORS)
    }

    /// Build a palette from other band/compact tables (e.g. another surface's
    /// index convention). Empty tables fall back to the standard ones.
    pub fn from_tables(bands: &[Range<ColorIndex>], compact: &[ColorIndex]) -> Self {
        let full: Vec<ColorIndex> = bands.iter().flat_map(|b| b.clone()).collect();
        if full.is_empty() || compact.is_empty() {
            return Self::standard();
        }
        Self {
            full,
            compact: compact.to_vec(),
        }
    }

    pub fn full_len(&self) -> usize {
        self.full.len()
    }

    pub fn compact_len(&self) -> usize {
        self.compact.len()
    }

    /// Identity of ensemble member `index`; a pure function of its arguments.
    ///
    /// The colour repeats with the palette length (8 compact, 206 full). The
    /// marker cycles independently through the 15 shapes, so the pair as a
    /// whole repeats every `lcm(palette length, 15)` members (120 compact).
    pub fn identity(&self, index: usize, compact: bool) -> VisualIdentity {
        let colors = if compact { &self.compact } else { &self.full };
        VisualIdentity {
            color: colors[index % colors.len()],
            marker: Marker::cycle(index),
        }
    }
}
