//! The cube: 26 pieces, face turns, move notation, and the query surface.
//!
//! The cube owns all pieces and mutates them in place; a face turn selects
//! the nine pieces of one layer and rotates each with the exact matrix for
//! that (face, direction) pair. Turns are the only state transitions, and
//! every turn is a permutation of the fixed slot set, so a structurally
//! valid cube can never become invalid.
//!
//! The cube is printed as the usual unfolded net:
//!
//! ```text
//!       U U U
//!       U U U
//!       U U U
//! L L L F F F R R R B B B
//! L L L F F F R R R B B B
//! L L L F F F R R R B B B
//!       D D D
//!       D D D
//!       D D D
//! ```

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rustc_hash::FxHashSet;
use strum::IntoEnumIterator;

use crate::geometry::{
    Point3, RotMatrix, ROT_X_CC, ROT_X_CW, ROT_Y_CC, ROT_Y_CW, ROT_Z_CC, ROT_Z_CW,
};
use crate::pieces::{Color, Facelet, Piece};

/// Errors for malformed moves and failed piece lookups.
///
/// Both are programmer-facing precondition violations, not conditions a
/// caller should retry: an `InvalidMove` is rejected before any mutation,
/// and a `PieceNotFound` means the cube state is corrupted (or the query
/// itself is wrong), since every color combination on a real cube names
/// exactly one piece.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CubeError {
    #[error("invalid move `{token}`")]
    InvalidMove { token: String },
    #[error("expected exactly one piece with colors [{colors}], found {found}")]
    PieceNotFound { colors: String, found: usize },
}

/// The six faces of the cube.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, strum::EnumIter)]
pub enum Face {
    Up,
    Down,
    Left,
    Right,
    Front,
    Back,
}

/// The four side faces in clockwise order as seen from above.
pub const SIDE_FACES: [Face; 4] = [Face::Front, Face::Right, Face::Back, Face::Left];

impl Face {
    /// Outward unit normal of this face.
    pub const fn normal(self) -> Point3 {
        match self {
            Face::Up => Point3::new(0, 0, 1),
            Face::Down => Point3::new(0, 0, -1),
            Face::Left => Point3::new(0, -1, 0),
            Face::Right => Point3::new(0, 1, 0),
            Face::Front => Point3::new(1, 0, 0),
            Face::Back => Point3::new(-1, 0, 0),
        }
    }

    /// Center color of this face in the solved scheme.
    pub const fn color(self) -> Color {
        match self {
            Face::Up => Color::Orange,
            Face::Down => Color::Red,
            Face::Left => Color::Blue,
            Face::Right => Color::Green,
            Face::Front => Color::Yellow,
            Face::Back => Color::White,
        }
    }

    pub const fn opposite(self) -> Face {
        match self {
            Face::Up => Face::Down,
            Face::Down => Face::Up,
            Face::Left => Face::Right,
            Face::Right => Face::Left,
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        }
    }

    /// Singmaster letter.
    pub const fn letter(self) -> char {
        match self {
            Face::Up => 'U',
            Face::Down => 'D',
            Face::Left => 'L',
            Face::Right => 'R',
            Face::Front => 'F',
            Face::Back => 'B',
        }
    }

    /// The face whose outward normal is `normal`, if any.
    pub fn from_normal(normal: Point3) -> Option<Face> {
        Face::iter().find(|face| face.normal() == normal)
    }

    /// The face owning `color` in the solved scheme.
    pub fn of_color(color: Color) -> Face {
        match color {
            Color::Orange => Face::Up,
            Color::Red => Face::Down,
            Color::Blue => Face::Left,
            Color::Green => Face::Right,
            Color::Yellow => Face::Front,
            Color::White => Face::Back,
        }
    }

    /// For a side face, the side face to its right as seen from outside
    /// (i.e. with `Up` above). Panics for `Up`/`Down`.
    pub fn right_side(self) -> Face {
        match self {
            Face::Front => Face::Right,
            Face::Right => Face::Back,
            Face::Back => Face::Left,
            Face::Left => Face::Front,
            _ => panic!("right_side is only defined for side faces"),
        }
    }

    /// Mirror of [`Face::right_side`]. Panics for `Up`/`Down`.
    pub fn left_side(self) -> Face {
        self.right_side().opposite()
    }
}

/// Turn sense as seen from outside the face being turned.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// A face turn: which face, which way, how many quarter turns (1..=3).
///
/// Moves are transient commands; the only way to build one is through
/// [`Move::new`] or the notation parser, so a `Move` handed to the cube is
/// always well-formed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Move {
    face: Face,
    direction: Direction,
    count: u8,
}

impl Move {
    /// Builds a move, rejecting quarter-turn counts outside 1..=3.
    pub fn new(face: Face, direction: Direction, count: u8) -> Result<Move, CubeError> {
        if !(1..=3).contains(&count) {
            return Err(CubeError::InvalidMove {
                token: format!("{}x{count}", face.letter()),
            });
        }
        Ok(Move {
            face,
            direction,
            count,
        })
    }

    /// A single clockwise quarter turn of `face`.
    pub fn clockwise(face: Face) -> Move {
        Move {
            face,
            direction: Direction::Clockwise,
            count: 1,
        }
    }

    pub fn face(self) -> Face {
        self.face
    }

    pub fn direction(self) -> Direction {
        self.direction
    }

    pub fn count(self) -> u8 {
        self.count
    }

    /// The move undoing this one.
    pub fn inverse(self) -> Move {
        Move {
            direction: self.direction.opposite(),
            ..self
        }
    }

    /// The exact rotation matrix for one quarter turn of this move.
    ///
    /// Clockwise means clockwise as viewed from outside the face being
    /// turned, i.e. standard Singmaster convention for all six faces.
    pub fn matrix(self) -> RotMatrix {
        match (self.face, self.direction) {
            (Face::Up, Direction::Clockwise) => ROT_Z_CW,
            (Face::Up, Direction::CounterClockwise) => ROT_Z_CC,
            (Face::Down, Direction::Clockwise) => ROT_Z_CC,
            (Face::Down, Direction::CounterClockwise) => ROT_Z_CW,
            (Face::Front, Direction::Clockwise) => ROT_X_CW,
            (Face::Front, Direction::CounterClockwise) => ROT_X_CC,
            (Face::Back, Direction::Clockwise) => ROT_X_CC,
            (Face::Back, Direction::CounterClockwise) => ROT_X_CW,
            (Face::Right, Direction::Clockwise) => ROT_Y_CW,
            (Face::Right, Direction::CounterClockwise) => ROT_Y_CC,
            (Face::Left, Direction::Clockwise) => ROT_Y_CC,
            (Face::Left, Direction::CounterClockwise) => ROT_Y_CW,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.face.letter())?;
        if self.count > 1 {
            write!(f, "{}", self.count)?;
        }
        if self.direction == Direction::CounterClockwise {
            write!(f, "'")?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = CubeError;

    /// Parses one token of Singmaster notation: a face letter, an optional
    /// quarter-turn count (`2` or `3`), and an optional `'` (or `i`) for
    /// counter-clockwise.
    fn from_str(token: &str) -> Result<Move, CubeError> {
        let invalid = || CubeError::InvalidMove {
            token: token.to_string(),
        };
        let mut chars = token.chars();
        let face = match chars.next().ok_or_else(invalid)? {
            'U' => Face::Up,
            'D' => Face::Down,
            'L' => Face::Left,
            'R' => Face::Right,
            'F' => Face::Front,
            'B' => Face::Back,
            _ => return Err(invalid()),
        };
        let mut count = 1u8;
        let mut direction = Direction::Clockwise;
        match chars.next() {
            None => {}
            Some(c @ '2'..='3') => {
                count = c as u8 - b'0';
                match chars.next() {
                    None => {}
                    Some('\'') | Some('i') => direction = Direction::CounterClockwise,
                    Some(_) => return Err(invalid()),
                }
            }
            Some('\'') | Some('i') => direction = Direction::CounterClockwise,
            Some(_) => return Err(invalid()),
        }
        if chars.next().is_some() {
            return Err(invalid());
        }
        Move::new(face, direction, count)
    }
}

/// Parses a whitespace-separated move sequence such as `"R U R' U'"`.
pub fn parse_moves(notation: &str) -> Result<Vec<Move>, CubeError> {
    notation.split_whitespace().map(Move::from_str).collect()
}

/// Formats a move sequence in the notation accepted by [`parse_moves`].
pub fn format_moves(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A 3x3x3 cube: 6 centers, 12 edges, and 8 corners.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Cube {
    pieces: Vec<Piece>,
}

impl Default for Cube {
    fn default() -> Self {
        Self::solved()
    }
}

impl Cube {
    /// Builds the cube in the solved configuration.
    pub fn solved() -> Cube {
        let sticker = |face: Face| Facelet {
            normal: face.normal(),
            color: face.color(),
        };
        let mut pieces = Vec::with_capacity(26);

        for face in Face::iter() {
            pieces.push(Piece::new(face.normal(), &[sticker(face)]));
        }
        // ring edges between adjacent side faces, then the top/bottom edges
        for side in SIDE_FACES {
            let next = side.right_side();
            pieces.push(Piece::new(
                side.normal() + next.normal(),
                &[sticker(side), sticker(next)],
            ));
            for cap in [Face::Up, Face::Down] {
                pieces.push(Piece::new(
                    side.normal() + cap.normal(),
                    &[sticker(side), sticker(cap)],
                ));
            }
        }
        for side in SIDE_FACES {
            let next = side.right_side();
            for cap in [Face::Up, Face::Down] {
                pieces.push(Piece::new(
                    side.normal() + next.normal() + cap.normal(),
                    &[sticker(side), sticker(next), sticker(cap)],
                ));
            }
        }
        debug_assert_eq!(pieces.len(), 26);
        Cube { pieces }
    }

    /// Applies one move: rotates the nine pieces of the face's layer by the
    /// move's matrix, `count` times. Atomic; never fails for a `Move` built
    /// through the public constructors.
    pub fn turn(&mut self, mv: Move) {
        let matrix = mv.matrix();
        let normal = mv.face().normal();
        for _ in 0..mv.count() {
            for piece in &mut self.pieces {
                if piece.is_in_layer(normal) {
                    piece.rotate(&matrix);
                }
            }
        }
        debug_assert!(self.positions_valid());
    }

    /// Applies a whole move sequence in order.
    pub fn apply_all(&mut self, moves: &[Move]) {
        for &mv in moves {
            self.turn(mv);
        }
    }

    /// Scrambles the cube with `turns` random quarter or half turns, never
    /// turning the same face twice in a row, and returns the sequence.
    pub fn scramble<R: Rng + ?Sized>(&mut self, rng: &mut R, turns: usize) -> Vec<Move> {
        const FACES: [Face; 6] = [
            Face::Up,
            Face::Down,
            Face::Left,
            Face::Right,
            Face::Front,
            Face::Back,
        ];
        let mut moves = Vec::with_capacity(turns);
        let mut previous: Option<Face> = None;
        while moves.len() < turns {
            let face = FACES[rng.random_range(0..FACES.len())];
            if previous == Some(face) {
                continue;
            }
            previous = Some(face);
            let direction = if rng.random_bool(0.5) {
                Direction::Clockwise
            } else {
                Direction::CounterClockwise
            };
            let count = rng.random_range(1..=2);
            let mv = Move::new(face, direction, count)
                .expect("scramble counts are always in range");
            self.turn(mv);
            moves.push(mv);
        }
        moves
    }

    /// True when every face shows a single uniform color.
    pub fn is_solved(&self) -> bool {
        Face::iter().all(|face| self.face_solved(face))
    }

    /// True when `face` shows a single uniform color across its nine
    /// facelets. Centers never move, so uniform means the center's color.
    pub fn face_solved(&self, face: Face) -> bool {
        let normal = face.normal();
        self.pieces
            .iter()
            .filter(|piece| piece.is_in_layer(normal))
            .all(|piece| piece.color_on(normal) == Some(face.color()))
    }

    /// Finds the unique piece carrying exactly `colors`.
    ///
    /// Zero or multiple matches mean the cube state (or the query) is
    /// corrupted and surface as [`CubeError::PieceNotFound`].
    pub fn find_piece(&self, colors: &[Color]) -> Result<&Piece, CubeError> {
        let mut matches = self.pieces.iter().filter(|piece| piece.has_colors(colors));
        match (matches.next(), matches.next()) {
            (Some(piece), None) => Ok(piece),
            (first, _) => Err(CubeError::PieceNotFound {
                colors: colors
                    .iter()
                    .map(Color::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                found: if first.is_some() { 2 } else { 0 },
            }),
        }
    }

    /// The piece currently occupying `pos`, if `pos` is a cubie slot.
    pub fn piece_at(&self, pos: Point3) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.pos() == pos)
    }

    /// Color query for external renderers: the color shown at slot `pos` in
    /// direction `normal`, or `None` when that slot has no facelet there.
    pub fn color_at(&self, pos: Point3, normal: Point3) -> Option<Color> {
        self.piece_at(pos)?.color_on(normal)
    }

    /// All pieces, for read-only inspection.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Checks the valid-slot invariant: the occupied positions are exactly
    /// the 26 cubie slots, with no duplicates.
    pub fn positions_valid(&self) -> bool {
        let mut seen: FxHashSet<Point3> = FxHashSet::default();
        for piece in &self.pieces {
            let p = piece.pos();
            let in_range =
                p.x.abs() <= 1 && p.y.abs() <= 1 && p.z.abs() <= 1 && p != Point3::ZERO;
            if !in_range || !seen.insert(p) {
                return false;
            }
        }
        seen.len() == 26
    }

    /// The 3x3 sticker grid of `face`, oriented as in the unfolded net.
    pub fn face_grid(&self, face: Face) -> [[Color; 3]; 3] {
        // (row, col) direction vectors per face, matching the net layout:
        // rows run down the printed grid, columns run right.
        let (row_dir, col_dir) = match face {
            Face::Up => (Point3::new(1, 0, 0), Point3::new(0, 1, 0)),
            Face::Down => (Point3::new(-1, 0, 0), Point3::new(0, 1, 0)),
            Face::Front => (Point3::new(0, 0, -1), Point3::new(0, 1, 0)),
            Face::Right => (Point3::new(0, 0, -1), Point3::new(-1, 0, 0)),
            Face::Back => (Point3::new(0, 0, -1), Point3::new(0, -1, 0)),
            Face::Left => (Point3::new(0, 0, -1), Point3::new(1, 0, 0)),
        };
        let normal = face.normal();
        std::array::from_fn(|r| {
            std::array::from_fn(|c| {
                let scale = |v: Point3, k: i32| Point3::new(v.x * k, v.y * k, v.z * k);
                let pos = normal + scale(row_dir, r as i32 - 1) + scale(col_dir, c as i32 - 1);
                self.color_at(pos, normal)
                    .expect("every cell of a face shows a facelet")
            })
        })
    }
}

impl fmt::Display for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let up = self.face_grid(Face::Up);
        let down = self.face_grid(Face::Down);
        let strip: Vec<[[Color; 3]; 3]> = [Face::Left, Face::Front, Face::Right, Face::Back]
            .into_iter()
            .map(|face| self.face_grid(face))
            .collect();

        let row_str = |row: &[Color; 3]| {
            row.iter()
                .map(|c| c.letter().to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        for row in &up {
            writeln!(f, "      {}", row_str(row))?;
        }
        for r in 0..3 {
            let line = strip
                .iter()
                .map(|grid| row_str(&grid[r]))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{line}")?;
        }
        for row in &down {
            writeln!(f, "      {}", row_str(row))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_moves() -> Vec<Move> {
        let mut moves = Vec::new();
        for face in Face::iter() {
            for direction in [Direction::Clockwise, Direction::CounterClockwise] {
                for count in 1..=3 {
                    moves.push(Move::new(face, direction, count).unwrap());
                }
            }
        }
        moves
    }

    #[test]
    fn test_solved_cube_is_solved() {
        let cube = Cube::solved();
        assert!(cube.is_solved());
        assert!(cube.positions_valid());
        assert_eq!(cube.pieces().len(), 26);
    }

    #[test]
    fn test_turn_then_inverse_restores_state() {
        for mv in all_moves() {
            let mut cube = Cube::solved();
            cube.apply_all(&parse_moves("R U F2 D' B L2").unwrap());
            let before = cube.clone();
            cube.turn(mv);
            cube.turn(mv.inverse());
            assert_eq!(cube, before, "turn/inverse failed for {mv}");
        }
    }

    #[test]
    fn test_four_clockwise_turns_are_identity() {
        for face in Face::iter() {
            let mut cube = Cube::solved();
            for _ in 0..4 {
                cube.turn(Move::clockwise(face));
            }
            assert_eq!(cube, Cube::solved(), "{face:?}x4 is not identity");
        }
    }

    #[test]
    fn test_up_turn_moves_exactly_the_up_layer() {
        let solved = Cube::solved();
        let mut cube = Cube::solved();
        cube.turn(Move::clockwise(Face::Up));

        let mut moved = 0;
        for (before, after) in solved.pieces().iter().zip(cube.pieces()) {
            if before.pos().z != 1 {
                assert_eq!(before, after, "piece outside the Up layer changed");
            } else if before != after {
                moved += 1;
            }
        }
        // the Up center rotates about its own normal, so its state is
        // unchanged; the other eight layer pieces all move
        assert_eq!(moved, 8);
        assert_eq!(
            solved.pieces().iter().filter(|p| p.pos().z != 1).count(),
            17
        );
    }

    #[test]
    fn test_sexy_move_has_order_six() {
        let commutator = parse_moves("R U R' U'").unwrap();
        let mut cube = Cube::solved();
        for repetition in 1..=6 {
            cube.apply_all(&commutator);
            if repetition < 6 {
                assert!(!cube.is_solved(), "solved early at repetition {repetition}");
            }
        }
        assert!(cube.is_solved());
    }

    #[test]
    fn test_slot_invariant_holds_under_any_sequence() {
        let mut cube = Cube::solved();
        let sequence = parse_moves("R U2 F' D L B2 R' D2 B U L' F2 R2 U' B' D' L2 F U2 R")
            .unwrap();
        for &mv in &sequence {
            cube.turn(mv);
            assert!(cube.positions_valid());
        }
    }

    #[test]
    fn test_notation_round_trip() {
        let notation = "R U2 R' U' F2 B L3' D";
        let moves = parse_moves(notation).unwrap();
        assert_eq!(format_moves(&moves), notation);
    }

    #[test]
    fn test_notation_accepts_i_suffix() {
        assert_eq!("Ri".parse::<Move>().unwrap(), "R'".parse::<Move>().unwrap());
    }

    #[test]
    fn test_notation_rejects_bad_tokens() {
        for token in ["X", "R4", "R''", "", "R2x", "r"] {
            assert!(
                token.parse::<Move>().is_err(),
                "token `{token}` should be rejected"
            );
        }
    }

    #[test]
    fn test_move_new_rejects_out_of_range_count() {
        assert!(Move::new(Face::Up, Direction::Clockwise, 0).is_err());
        assert!(Move::new(Face::Up, Direction::Clockwise, 4).is_err());
    }

    #[test]
    fn test_find_piece_locates_unique_edge_anywhere() {
        let mut cube = Cube::solved();
        let edge = cube.find_piece(&[Color::Red, Color::Green]).unwrap();
        assert_eq!(edge.pos(), Face::Right.normal() + Face::Down.normal());

        cube.apply_all(&parse_moves("R U R' U'").unwrap());
        let edge = cube.find_piece(&[Color::Red, Color::Green]).unwrap();
        assert!(edge.has_colors(&[Color::Red, Color::Green]));
    }

    #[test]
    fn test_find_piece_reports_zero_matches() {
        let cube = Cube::solved();
        // no edge joins opposite faces
        let err = cube.find_piece(&[Color::Red, Color::Orange]).unwrap_err();
        assert!(matches!(err, CubeError::PieceNotFound { found: 0, .. }));
    }

    #[test]
    fn test_color_at_query_surface() {
        let cube = Cube::solved();
        let pos = Face::Front.normal() + Face::Up.normal();
        assert_eq!(
            cube.color_at(pos, Face::Front.normal()),
            Some(Color::Yellow)
        );
        assert_eq!(cube.color_at(pos, Face::Up.normal()), Some(Color::Orange));
        assert_eq!(cube.color_at(pos, Face::Right.normal()), None);
    }

    #[test]
    fn test_solved_net_snapshot() {
        insta::assert_snapshot!(Cube::solved().to_string(), @r"
      O O O
      O O O
      O O O
B B B Y Y Y G G G W W W
B B B Y Y Y G G G W W W
B B B Y Y Y G G G W W W
      R R R
      R R R
      R R R
");
    }

    #[test]
    fn test_up_turn_net_snapshot() {
        let mut cube = Cube::solved();
        cube.turn(Move::clockwise(Face::Up));
        insta::assert_snapshot!(cube.to_string(), @r"
      O O O
      O O O
      O O O
Y Y Y G G G W W W B B B
B B B Y Y Y G G G W W W
B B B Y Y Y G G G W W W
      R R R
      R R R
      R R R
");
    }

    #[test]
    fn test_scramble_is_replayable() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(7);
        let mut cube = Cube::solved();
        let moves = cube.scramble(&mut rng, 25);
        assert_eq!(moves.len(), 25);
        assert!(cube.positions_valid());

        let mut replay = Cube::solved();
        replay.apply_all(&moves);
        assert_eq!(replay, cube);
    }
}
