//! Cubie pieces: colored facelets attached to a position.
//!
//! A piece is a rigid block with one, two, or three colored facelets; each
//! facelet carries an outward normal telling which cube face it currently
//! shows on. Rotating a piece moves its position and its normals with the
//! same exact matrix, so a facelet's color and the piece's corner/edge/center
//! class never change over the life of the cube.

use crate::geometry::{Point3, RotMatrix};

/// The six sticker colors of a standard cube.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, strum::Display, strum::EnumIter)]
pub enum Color {
    White,
    Yellow,
    Red,
    Orange,
    Green,
    Blue,
}

impl Color {
    /// One-letter abbreviation used by the ASCII net renderer.
    pub const fn letter(self) -> char {
        match self {
            Color::White => 'W',
            Color::Yellow => 'Y',
            Color::Red => 'R',
            Color::Orange => 'O',
            Color::Green => 'G',
            Color::Blue => 'B',
        }
    }
}

/// A single colored sticker and the direction it currently faces.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Facelet {
    pub normal: Point3,
    pub color: Color,
}

/// Piece class, determined by facelet count and never changed by turns.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PieceKind {
    Center,
    Edge,
    Corner,
}

/// Upper bound on facelets per piece (a corner has three).
pub const MAX_FACELETS: usize = 3;

/// One cubie: a position in the {-1,0,1}^3 grid plus its facelets.
///
/// Uses a fixed-size array plus count rather than a Vec so pieces stay
/// `Copy` and cube snapshots are cheap to clone and compare.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    pos: Point3,
    facelets: [Facelet; MAX_FACELETS],
    facelet_count: u8,
}

impl Piece {
    /// Builds a piece, enforcing the structural invariants: the position is a
    /// valid slot for the facelet count, and every facelet normal is an axis
    /// unit vector pointing the same way as the position on that axis.
    pub fn new(pos: Point3, facelets: &[Facelet]) -> Self {
        assert!(
            (1..=MAX_FACELETS).contains(&facelets.len()),
            "a piece has 1 to 3 facelets"
        );
        assert!(
            pos.x.abs() <= 1 && pos.y.abs() <= 1 && pos.z.abs() <= 1 && pos != Point3::ZERO,
            "piece position {pos} is not a cubie slot"
        );
        let occupied_axes =
            (pos.x != 0) as usize + (pos.y != 0) as usize + (pos.z != 0) as usize;
        assert_eq!(
            occupied_axes,
            facelets.len(),
            "facelet count must match the slot class at {pos}"
        );
        let mut stored = [Facelet {
            normal: Point3::ZERO,
            color: Color::White,
        }; MAX_FACELETS];
        for (slot, &facelet) in stored.iter_mut().zip(facelets) {
            assert!(
                facelet.normal.is_axis_unit(),
                "facelet normal {} is not an axis unit vector",
                facelet.normal
            );
            assert!(
                facelet.normal.dot(pos) == 1,
                "facelet normal {} does not face outward at {pos}",
                facelet.normal
            );
            *slot = facelet;
        }
        Self {
            pos,
            facelets: stored,
            facelet_count: facelets.len() as u8,
        }
    }

    #[inline]
    pub fn pos(&self) -> Point3 {
        self.pos
    }

    /// The valid facelets of this piece.
    #[inline]
    pub fn facelets(&self) -> &[Facelet] {
        &self.facelets[..self.facelet_count as usize]
    }

    pub fn kind(&self) -> PieceKind {
        match self.facelet_count {
            1 => PieceKind::Center,
            2 => PieceKind::Edge,
            _ => PieceKind::Corner,
        }
    }

    /// True when this piece sits in the layer turned with `face_normal`,
    /// i.e. its position is on that face's side of the cube.
    #[inline]
    pub fn is_in_layer(&self, face_normal: Point3) -> bool {
        self.pos.dot(face_normal) > 0
    }

    /// Rotates position and every facelet normal in place.
    ///
    /// Cannot fail for a well-formed piece: signed permutation matrices map
    /// slots to slots and axis units to axis units.
    pub fn rotate(&mut self, matrix: &RotMatrix) {
        self.pos = matrix.apply(self.pos);
        for facelet in &mut self.facelets[..self.facelet_count as usize] {
            facelet.normal = matrix.apply(facelet.normal);
        }
    }

    /// The color shown in direction `normal`, if this piece has a facelet
    /// there.
    pub fn color_on(&self, normal: Point3) -> Option<Color> {
        self.facelets()
            .iter()
            .find(|facelet| facelet.normal == normal)
            .map(|facelet| facelet.color)
    }

    /// The facelet carrying `color`, if present.
    pub fn facelet_of(&self, color: Color) -> Option<Facelet> {
        self.facelets()
            .iter()
            .copied()
            .find(|facelet| facelet.color == color)
    }

    /// True when the piece's color set is exactly `colors` (order-free).
    pub fn has_colors(&self, colors: &[Color]) -> bool {
        self.facelet_count as usize == colors.len()
            && colors
                .iter()
                .all(|&color| self.facelets().iter().any(|f| f.color == color))
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} at {}", self.kind(), self.pos)?;
        for facelet in self.facelets() {
            write!(f, " {}@{}", facelet.color.letter(), facelet.normal)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ROT_Z_CW, QUARTER_TURNS};

    fn corner() -> Piece {
        Piece::new(
            Point3::new(1, 1, 1),
            &[
                Facelet {
                    normal: Point3::new(1, 0, 0),
                    color: Color::Yellow,
                },
                Facelet {
                    normal: Point3::new(0, 1, 0),
                    color: Color::Green,
                },
                Facelet {
                    normal: Point3::new(0, 0, 1),
                    color: Color::Orange,
                },
            ],
        )
    }

    #[test]
    fn test_kind_from_facelet_count() {
        assert_eq!(corner().kind(), PieceKind::Corner);
        let edge = Piece::new(
            Point3::new(1, 0, 1),
            &[
                Facelet {
                    normal: Point3::new(1, 0, 0),
                    color: Color::Yellow,
                },
                Facelet {
                    normal: Point3::new(0, 0, 1),
                    color: Color::Orange,
                },
            ],
        );
        assert_eq!(edge.kind(), PieceKind::Edge);
    }

    #[test]
    fn test_rotation_moves_position_and_normals_together() {
        let mut piece = corner();
        piece.rotate(&ROT_Z_CW);
        assert_eq!(piece.pos(), Point3::new(1, -1, 1));
        // the sticker that faced +x now faces -y, the +z sticker is unmoved
        assert_eq!(piece.color_on(Point3::new(0, -1, 0)), Some(Color::Yellow));
        assert_eq!(piece.color_on(Point3::new(0, 0, 1)), Some(Color::Orange));
        assert_eq!(piece.color_on(Point3::new(1, 0, 0)), Some(Color::Green));
    }

    #[test]
    fn test_rotation_preserves_colors_and_kind() {
        for m in QUARTER_TURNS {
            let mut piece = corner();
            piece.rotate(&m);
            assert_eq!(piece.kind(), PieceKind::Corner);
            assert!(piece.has_colors(&[Color::Yellow, Color::Green, Color::Orange]));
        }
    }

    #[test]
    fn test_color_on_absent_face_is_none() {
        let piece = corner();
        assert_eq!(piece.color_on(Point3::new(-1, 0, 0)), None);
        assert_eq!(piece.color_on(Point3::new(0, 0, -1)), None);
    }

    #[test]
    fn test_has_colors_rejects_subset_and_superset() {
        let piece = corner();
        assert!(!piece.has_colors(&[Color::Yellow, Color::Green]));
        assert!(!piece.has_colors(&[Color::Yellow, Color::Green, Color::Red]));
    }

    #[test]
    #[should_panic]
    fn test_inward_facelet_normal_is_rejected() {
        Piece::new(
            Point3::new(0, 0, 1),
            &[Facelet {
                normal: Point3::new(0, 0, -1),
                color: Color::Orange,
            }],
        );
    }
}
