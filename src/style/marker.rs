//! Marker shapes, cycled by ensemble index.

/// The 15 marker styles handed out to ensemble members, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    FullCircle,
    FullSquare,
    FullTriangleUp,
    FullTriangleDown,
    OpenCircle,
    OpenSquare,
    OpenTriangleUp,
    OpenDiamond,
    OpenCross,
    FullStar,
    OpenStar,
    Asterisk,
    OpenTriangleDown,
    FullDiamond,
    FullCross,
}

pub const MARKERS: [Marker; 15] = [
    Marker::FullCircle,
    Marker::FullSquare,
    Marker::FullTriangleUp,
    Marker::FullTriangleDown,
    Marker::OpenCircle,
    Marker::OpenSquare,
    Marker::OpenTriangleUp,
    Marker::OpenDiamond,
    Marker::OpenCross,
    Marker::FullStar,
    Marker::OpenStar,
    Marker::Asterisk,
    Marker::OpenTriangleDown,
    Marker::FullDiamond,
    Marker::FullCross,
];

/// Primitive a surface can actually draw for a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Circle,
    Square,
    Triangle,
    Cross,
}

impl Marker {
    /// Marker at position `index` of the cycle.
    pub fn cycle(index: usize) -> Marker {
        MARKERS[index % MARKERS.len()]
    }

    /// Closest drawable glyph and whether it is filled.
    pub fn glyph(self) -> (Glyph, bool) {
        match self {
            Marker::FullCircle => (Glyph::Circle, true),
            Marker::OpenCircle => (Glyph::Circle, false),
            Marker::FullSquare | Marker::FullDiamond => (Glyph::Square, true),
            Marker::OpenSquare | Marker::OpenDiamond => (Glyph::Square, false),
            Marker::FullTriangleUp | Marker::FullTriangleDown => (Glyph::Triangle, true),
            Marker::OpenTriangleUp | Marker::OpenTriangleDown => (Glyph::Triangle, false),
            Marker::FullStar | Marker::FullCross => (Glyph::Cross, true),
            Marker::OpenStar | Marker::OpenCross | Marker::Asterisk => (Glyph::Cross, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_distinct_and_cycle_every_fifteen() {
        let unique: std::collections::HashSet<_> = MARKERS.iter().collect();
        assert_eq!(unique.len(), 15);
        for i in 0..40 {
            assert_eq!(Marker::cycle(i), Marker::cycle(i + 15));
        }
    }
}
