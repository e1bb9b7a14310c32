//! Exact 3D rotation primitives.
//!
//! Every rotation a face turn needs is a 90-degree rotation about a
//! coordinate axis, so positions and facelet normals can be kept as signed
//! integers and rotated by matrices whose entries are all in {-1, 0, 1}.
//! Nothing here touches floating point; applying a rotation four times
//! returns the input bit for bit.

use std::ops::{Add, Mul, Neg};

/// A 3D point (or direction vector) with integer coordinates.
///
/// Cube positions and facelet normals only ever use coordinates in
/// {-1, 0, 1}, which the rotation matrices map onto itself exactly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Point3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point3 {
    pub const ZERO: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Dot product.
    #[inline]
    pub const fn dot(self, other: Self) -> i32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product (right-handed).
    #[inline]
    pub const fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// True when exactly one coordinate is nonzero and it is +/-1.
    pub const fn is_axis_unit(self) -> bool {
        let nonzero = (self.x != 0) as u8 + (self.y != 0) as u8 + (self.z != 0) as u8;
        nonzero == 1 && self.x.abs() <= 1 && self.y.abs() <= 1 && self.z.abs() <= 1
    }
}

impl Add for Point3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Neg for Point3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl std::fmt::Display for Point3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A 3x3 rotation matrix with entries in {-1, 0, 1}.
///
/// Each matrix used by the cube is a signed permutation matrix: orthogonal,
/// exactly one nonzero entry per row and per column. That makes rotations
/// lossless and freely composable without any normalization step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RotMatrix {
    rows: [[i32; 3]; 3],
}

impl RotMatrix {
    pub const IDENTITY: Self = Self::new([[1, 0, 0], [0, 1, 0], [0, 0, 1]]);

    /// Builds a matrix, checking the signed-permutation invariant.
    pub const fn new(rows: [[i32; 3]; 3]) -> Self {
        let mut r = 0;
        while r < 3 {
            let mut row_nonzero = 0;
            let mut col_nonzero = 0;
            let mut c = 0;
            while c < 3 {
                assert!(rows[r][c] >= -1 && rows[r][c] <= 1);
                row_nonzero += (rows[r][c] != 0) as u8;
                col_nonzero += (rows[c][r] != 0) as u8;
                c += 1;
            }
            assert!(row_nonzero == 1, "each row must have one nonzero entry");
            assert!(col_nonzero == 1, "each column must have one nonzero entry");
            r += 1;
        }
        Self { rows }
    }

    /// Exact matrix-vector multiplication.
    #[inline]
    pub const fn apply(&self, p: Point3) -> Point3 {
        Point3::new(
            self.rows[0][0] * p.x + self.rows[0][1] * p.y + self.rows[0][2] * p.z,
            self.rows[1][0] * p.x + self.rows[1][1] * p.y + self.rows[1][2] * p.z,
            self.rows[2][0] * p.x + self.rows[2][1] * p.y + self.rows[2][2] * p.z,
        )
    }

    /// Matrix product `self * other` (apply `other` first, then `self`).
    pub const fn compose(&self, other: &Self) -> Self {
        let mut rows = [[0i32; 3]; 3];
        let mut r = 0;
        while r < 3 {
            let mut c = 0;
            while c < 3 {
                rows[r][c] = self.rows[r][0] * other.rows[0][c]
                    + self.rows[r][1] * other.rows[1][c]
                    + self.rows[r][2] * other.rows[2][c];
                c += 1;
            }
            r += 1;
        }
        Self::new(rows)
    }
}

impl Mul<Point3> for RotMatrix {
    type Output = Point3;

    fn mul(self, p: Point3) -> Point3 {
        self.apply(p)
    }
}

impl Mul for RotMatrix {
    type Output = RotMatrix;

    fn mul(self, other: RotMatrix) -> RotMatrix {
        self.compose(&other)
    }
}

// The twelve quarter-turn rotations come in six matrices and their inverses.
// "CW" means clockwise as seen from the positive end of the axis looking
// toward the origin; the face-to-matrix mapping lives in `Move::matrix`.
pub const ROT_X_CW: RotMatrix = RotMatrix::new([[1, 0, 0], [0, 0, 1], [0, -1, 0]]);
pub const ROT_X_CC: RotMatrix = RotMatrix::new([[1, 0, 0], [0, 0, -1], [0, 1, 0]]);
pub const ROT_Y_CW: RotMatrix = RotMatrix::new([[0, 0, -1], [0, 1, 0], [1, 0, 0]]);
pub const ROT_Y_CC: RotMatrix = RotMatrix::new([[0, 0, 1], [0, 1, 0], [-1, 0, 0]]);
pub const ROT_Z_CW: RotMatrix = RotMatrix::new([[0, 1, 0], [-1, 0, 0], [0, 0, 1]]);
pub const ROT_Z_CC: RotMatrix = RotMatrix::new([[0, -1, 0], [1, 0, 0], [0, 0, 1]]);

/// All quarter-turn matrices, for exhaustive property tests.
pub const QUARTER_TURNS: [RotMatrix; 6] =
    [ROT_X_CW, ROT_X_CC, ROT_Y_CW, ROT_Y_CC, ROT_Z_CW, ROT_Z_CC];

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Point3> {
        let mut points = Vec::new();
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    points.push(Point3::new(x, y, z));
                }
            }
        }
        points
    }

    #[test]
    fn test_four_applications_are_identity() {
        for m in QUARTER_TURNS {
            for p in sample_points() {
                let rotated = m.apply(m.apply(m.apply(m.apply(p))));
                assert_eq!(rotated, p, "{m:?} applied four times moved {p}");
            }
        }
    }

    #[test]
    fn test_cw_cc_pairs_are_inverses() {
        let pairs = [
            (ROT_X_CW, ROT_X_CC),
            (ROT_Y_CW, ROT_Y_CC),
            (ROT_Z_CW, ROT_Z_CC),
        ];
        for (cw, cc) in pairs {
            assert_eq!(cw.compose(&cc), RotMatrix::IDENTITY);
            assert_eq!(cc.compose(&cw), RotMatrix::IDENTITY);
        }
    }

    #[test]
    fn test_compose_matches_sequential_apply() {
        for a in QUARTER_TURNS {
            for b in QUARTER_TURNS {
                let ab = a.compose(&b);
                for p in sample_points() {
                    assert_eq!(ab.apply(p), a.apply(b.apply(p)));
                }
            }
        }
    }

    #[test]
    fn test_rotations_preserve_coordinate_domain() {
        for m in QUARTER_TURNS {
            for p in sample_points() {
                let q = m.apply(p);
                assert!(q.x.abs() <= 1 && q.y.abs() <= 1 && q.z.abs() <= 1);
            }
        }
    }

    #[test]
    fn test_cross_product_handedness() {
        let x = Point3::new(1, 0, 0);
        let y = Point3::new(0, 1, 0);
        let z = Point3::new(0, 0, 1);
        assert_eq!(x.cross(y), z);
        assert_eq!(y.cross(z), x);
        assert_eq!(z.cross(x), y);
    }
}
