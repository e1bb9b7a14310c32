//! Layer-by-layer solving engine.
//!
//! The solver works the way a person does: six phases, bottom to top, each
//! with a goal predicate and a small recognizer that maps the current state
//! to either an alignment turn or one of a dozen canned move sequences.
//! Every sequence is written in notation relative to an anchor side face
//! (`F` is the anchor, `R` its right neighbour, and so on), so one table
//! entry serves all four sides.
//!
//! Each phase strictly reduces its own distance to goal, so iteration counts
//! are small and fixed; exceeding a bound means an internal invariant was
//! violated and surfaces as [`SolveError::PhaseStalled`] rather than looping
//! forever. The returned move list replays from the same scrambled state to
//! the solved cube.

use log::{debug, info};

use crate::cube::{parse_moves, Cube, CubeError, Direction, Face, Move, SIDE_FACES};
use crate::geometry::{Point3, ROT_Z_CW};
use crate::pieces::Color;

/// The six solve phases, in execution order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::Display)]
pub enum Phase {
    #[strum(serialize = "bottom cross")]
    BottomCross,
    #[strum(serialize = "bottom corners")]
    BottomCorners,
    #[strum(serialize = "middle edges")]
    MiddleEdges,
    #[strum(serialize = "top cross")]
    TopCross,
    #[strum(serialize = "top edges")]
    TopEdges,
    #[strum(serialize = "top corners")]
    TopCorners,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    #[error(transparent)]
    Cube(#[from] CubeError),
    /// A phase exceeded its iteration bound. This is an internal invariant
    /// violation, not bad input; the rendered cube state is attached for
    /// diagnosis.
    #[error("solver stalled during the {phase} phase:\n{cube}")]
    PhaseStalled { phase: Phase, cube: String },
}

// Canned sequences, verified move by move in this crate's rotation
// convention. Letters are relative to an anchor side face; U and D are
// absolute. Each table entry names its precondition and net effect.

/// Top edge above its slot, bottom color facing the side: insert flipped.
const CROSS_FLIP_INSERT: &str = "U' R' F R";
/// Top edge above its slot, bottom color up: drop straight in.
const CROSS_DROP: &str = "F2";
/// Corner above its slot, bottom color on the anchor face: insert.
const CORNER_FROM_FRONT: &str = "U R U' R'";
/// Corner above its slot, bottom color on the right face: insert.
const CORNER_FROM_RIGHT: &str = "U' F' U F";
/// Corner above its slot, bottom color up: insert.
const CORNER_FROM_TOP: &str = "R U2 R' U2 F' U F";
/// Corner in the anchor's bottom-right slot: lift it to the top layer.
const CORNER_EJECT: &str = "R U R'";
/// Top edge above the anchor, up color belonging right: insert into the
/// front-right slot. Also ejects whatever occupied that slot to the top.
const EDGE_INSERT_RIGHT: &str = "U R U' R' U' F' U F";
/// Mirror of [`EDGE_INSERT_RIGHT`], up color belonging left.
const EDGE_INSERT_LEFT: &str = "U' L' U L U F U' F'";
/// Flips the orientation of the front and back top edges.
const TOP_CROSS_STEP: &str = "F R U R' U' F'";
/// Swaps the top edges of the anchor and its left neighbour, orientations
/// preserved.
const EDGE_SWAP: &str = "R U R' U R U2 R' U";
/// 3-cycles the three top corners away from the anchor's top-right corner.
const CORNER_CYCLE: &str = "U R U' L' U R' U' L";
/// Twists the corner in the anchor's top-right slot one step in place.
/// Lower layers are shuffled but restore once every corner is oriented,
/// because the total twist per cube is a multiple of three.
const CORNER_TWIST_PAIR: &str = "R' D' R D R' D' R D";

/// Solves the cube in place and returns the applied move sequence.
pub fn solve(cube: &mut Cube) -> Result<Vec<Move>, SolveError> {
    let mut session = Session {
        cube,
        moves: Vec::new(),
        phase: Phase::BottomCross,
    };
    session.bottom_cross()?;
    session.bottom_corners()?;
    session.middle_edges()?;
    session.top_cross()?;
    session.top_edges()?;
    session.top_corners()?;
    info!("solved in {} moves", session.moves.len());
    Ok(session.moves)
}

/// Maps a letter of relative notation onto the actual face for `anchor`.
fn relative_face(anchor: Face, face: Face) -> Face {
    match face {
        Face::Front => anchor,
        Face::Right => anchor.right_side(),
        Face::Back => anchor.opposite(),
        Face::Left => anchor.left_side(),
        vertical => vertical,
    }
}

/// Applies a relative sequence to `cube` and returns the absolute moves.
fn apply_relative(cube: &mut Cube, anchor: Face, notation: &str) -> Result<Vec<Move>, CubeError> {
    let mut applied = Vec::new();
    for mv in parse_moves(notation)? {
        let mv = Move::new(relative_face(anchor, mv.face()), mv.direction(), mv.count())?;
        cube.turn(mv);
        applied.push(mv);
    }
    Ok(applied)
}

/// Where a clockwise up turn carries the content of a top edge slot.
fn up_image(side: Face) -> Face {
    match side {
        Face::Front => Face::Left,
        Face::Left => Face::Back,
        Face::Back => Face::Right,
        Face::Right => Face::Front,
        vertical => vertical,
    }
}

/// True when the top edge on `side` shows that side's color to it.
fn edge_matched(cube: &Cube, side: Face) -> bool {
    let pos = side.normal() + Face::Up.normal();
    cube.color_at(pos, side.normal()) == Some(side.color())
}

fn matched_sides(cube: &Cube) -> usize {
    SIDE_FACES
        .into_iter()
        .filter(|side| edge_matched(cube, *side))
        .count()
}

/// The number of clockwise up turns (0..=3) maximizing matched top edges,
/// with the match count it achieves. Evaluated on a clone.
fn best_up_turns(cube: &Cube) -> (u8, usize) {
    let mut probe = cube.clone();
    let mut best = (0u8, matched_sides(cube));
    for turns in 1..4u8 {
        probe.turn(Move::clockwise(Face::Up));
        let matched = matched_sides(&probe);
        if matched > best.1 {
            best = (turns, matched);
        }
    }
    best
}

/// Whether the top corner in the slot right of `anchor` is in position,
/// regardless of its twist.
fn corner_positioned(cube: &Cube, anchor: Face) -> Result<bool, CubeError> {
    let next = anchor.right_side();
    let slot = anchor.normal() + next.normal() + Face::Up.normal();
    let piece = cube.find_piece(&[anchor.color(), next.color(), Color::Orange])?;
    Ok(piece.pos() == slot)
}

/// One solve in progress: the cube being mutated plus the recorded moves.
struct Session<'a> {
    cube: &'a mut Cube,
    moves: Vec<Move>,
    phase: Phase,
}

impl Session<'_> {
    fn run(&mut self, mv: Move) {
        self.cube.turn(mv);
        self.moves.push(mv);
    }

    fn run_relative(&mut self, anchor: Face, notation: &str) -> Result<(), SolveError> {
        let applied = apply_relative(self.cube, anchor, notation)?;
        self.moves.extend(applied);
        Ok(())
    }

    fn stalled(&self) -> SolveError {
        SolveError::PhaseStalled {
            phase: self.phase,
            cube: self.cube.to_string(),
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        debug!("phase: {phase} ({} moves so far)", self.moves.len());
    }

    /// Turns the up face until the piece at `from` reaches `to`. Both must
    /// lie in the top layer.
    fn align_up(&mut self, from: Point3, to: Point3) -> Result<(), SolveError> {
        let mut pos = from;
        for turns in 0..4u8 {
            if pos == to {
                if turns > 0 {
                    self.run(Move::new(Face::Up, Direction::Clockwise, turns)?);
                }
                return Ok(());
            }
            pos = ROT_Z_CW.apply(pos);
        }
        Err(self.stalled())
    }

    // Phase 1: the four bottom edges, red facing down.
    fn bottom_cross(&mut self) -> Result<(), SolveError> {
        self.enter(Phase::BottomCross);
        for side in SIDE_FACES {
            self.place_cross_edge(side)?;
        }
        Ok(())
    }

    fn place_cross_edge(&mut self, side: Face) -> Result<(), SolveError> {
        let down = Face::Down.normal();
        let up = Face::Up.normal();
        let slot = side.normal() + down;
        let above = side.normal() + up;
        // worst case: lift out of a layer, align, insert, observe solved
        for _ in 0..4 {
            let piece = *self.cube.find_piece(&[Color::Red, side.color()])?;
            let red = piece
                .facelet_of(Color::Red)
                .ok_or_else(|| self.stalled())?;
            if piece.pos() == slot && red.normal == down {
                return Ok(());
            }
            match piece.pos().z {
                // wrong or flipped in the bottom layer: double-turn the face
                // it touches to park it on top
                -1 => {
                    let touching =
                        Face::from_normal(Point3::new(piece.pos().x, piece.pos().y, 0))
                            .ok_or_else(|| self.stalled())?;
                    self.run_relative(touching, "F2")?;
                }
                // middle layer: conjugated side turn lifts it to the top
                // without losing edges already placed below
                0 => {
                    let hinge = Face::from_normal(Point3::new(piece.pos().x, 0, 0))
                        .ok_or_else(|| self.stalled())?;
                    let lifted = Move::clockwise(hinge).matrix().apply(piece.pos());
                    if lifted.z == 1 {
                        self.run_relative(hinge, "F U F'")?;
                    } else {
                        self.run_relative(hinge, "F' U F")?;
                    }
                }
                _ => {
                    if piece.pos() == above {
                        if red.normal == up {
                            self.run_relative(side, CROSS_DROP)?;
                        } else {
                            self.run_relative(side, CROSS_FLIP_INSERT)?;
                        }
                    } else {
                        self.align_up(piece.pos(), above)?;
                    }
                }
            }
        }
        Err(self.stalled())
    }

    // Phase 2: the four bottom corners, red facing down.
    fn bottom_corners(&mut self) -> Result<(), SolveError> {
        self.enter(Phase::BottomCorners);
        for side in SIDE_FACES {
            self.place_bottom_corner(side)?;
        }
        Ok(())
    }

    fn place_bottom_corner(&mut self, s1: Face) -> Result<(), SolveError> {
        let s2 = s1.right_side();
        let down = Face::Down.normal();
        let up = Face::Up.normal();
        let slot = s1.normal() + s2.normal() + down;
        let above = s1.normal() + s2.normal() + up;
        for _ in 0..4 {
            let piece = *self
                .cube
                .find_piece(&[Color::Red, s1.color(), s2.color()])?;
            let red = piece
                .facelet_of(Color::Red)
                .ok_or_else(|| self.stalled())?;
            if piece.pos() == slot && red.normal == down {
                return Ok(());
            }
            if piece.pos().z == -1 {
                // stuck in a bottom slot, wrong or twisted: lift it out
                let anchor = SIDE_FACES
                    .into_iter()
                    .find(|a| piece.pos() == a.normal() + a.right_side().normal() + down)
                    .ok_or_else(|| self.stalled())?;
                self.run_relative(anchor, CORNER_EJECT)?;
            } else if piece.pos() == above {
                // dispatch on where the red sticker faces
                if red.normal == s1.normal() {
                    self.run_relative(s1, CORNER_FROM_FRONT)?;
                } else if red.normal == s2.normal() {
                    self.run_relative(s1, CORNER_FROM_RIGHT)?;
                } else {
                    self.run_relative(s1, CORNER_FROM_TOP)?;
                }
            } else {
                self.align_up(piece.pos(), above)?;
            }
        }
        Err(self.stalled())
    }

    // Phase 3: the four middle-layer edges.
    fn middle_edges(&mut self) -> Result<(), SolveError> {
        self.enter(Phase::MiddleEdges);
        for side in SIDE_FACES {
            self.place_middle_edge(side)?;
        }
        Ok(())
    }

    fn place_middle_edge(&mut self, s1: Face) -> Result<(), SolveError> {
        let s2 = s1.right_side();
        let up = Face::Up.normal();
        let slot = s1.normal() + s2.normal();
        for _ in 0..4 {
            let piece = *self.cube.find_piece(&[s1.color(), s2.color()])?;
            if piece.pos() == slot && piece.color_on(s1.normal()) == Some(s1.color()) {
                return Ok(());
            }
            match piece.pos().z {
                // wrong or flipped in some middle slot: the insert sequence
                // doubles as an eject, sending the occupant to the top
                0 => {
                    let anchor = SIDE_FACES
                        .into_iter()
                        .find(|a| piece.pos() == a.normal() + a.right_side().normal())
                        .ok_or_else(|| self.stalled())?;
                    self.run_relative(anchor, EDGE_INSERT_RIGHT)?;
                }
                1 => {
                    let sideways = piece
                        .facelets()
                        .iter()
                        .find(|f| f.normal.z == 0)
                        .ok_or_else(|| self.stalled())?;
                    let facing = Face::of_color(sideways.color);
                    if piece.pos() != facing.normal() + up {
                        self.align_up(piece.pos(), facing.normal() + up)?;
                    } else {
                        let up_color = piece.color_on(up).ok_or_else(|| self.stalled())?;
                        if Face::of_color(up_color) == facing.right_side() {
                            self.run_relative(facing, EDGE_INSERT_RIGHT)?;
                        } else {
                            self.run_relative(facing, EDGE_INSERT_LEFT)?;
                        }
                    }
                }
                _ => return Err(self.stalled()),
            }
        }
        Err(self.stalled())
    }

    // Phase 4: orient the top edges so orange forms a cross on top.
    fn top_cross(&mut self) -> Result<(), SolveError> {
        self.enter(Phase::TopCross);
        let up = Face::Up.normal();
        // dot, L shape, line, cross: at most three steps plus alignments
        for _ in 0..5 {
            let oriented: Vec<Face> = SIDE_FACES
                .into_iter()
                .filter(|side| self.cube.color_at(side.normal() + up, up) == Some(Color::Orange))
                .collect();
            match oriented.len() {
                4 => return Ok(()),
                2 if oriented[0].opposite() == oriented[1] => {
                    // line: bring it onto the left-right axis, then one step
                    if oriented[0] == Face::Front || oriented[0] == Face::Back {
                        self.run(Move::clockwise(Face::Up));
                    }
                    self.run_relative(Face::Front, TOP_CROSS_STEP)?;
                }
                2 => {
                    // L shape: park the oriented pair at back-left
                    self.align_l_shape(oriented[0], oriented[1])?;
                    self.run_relative(Face::Front, TOP_CROSS_STEP)?;
                }
                0 => self.run_relative(Face::Front, TOP_CROSS_STEP)?,
                // one or three oriented edges would violate edge parity
                _ => return Err(self.stalled()),
            }
        }
        Err(self.stalled())
    }

    fn align_l_shape(&mut self, a: Face, b: Face) -> Result<(), SolveError> {
        let (mut a, mut b) = (a, b);
        for turns in 0..4u8 {
            if (a == Face::Back && b == Face::Left) || (a == Face::Left && b == Face::Back) {
                if turns > 0 {
                    self.run(Move::new(Face::Up, Direction::Clockwise, turns)?);
                }
                return Ok(());
            }
            a = up_image(a);
            b = up_image(b);
        }
        Err(self.stalled())
    }

    // Phase 5: permute the top edges onto their faces.
    fn top_edges(&mut self) -> Result<(), SolveError> {
        self.enter(Phase::TopEdges);
        for _ in 0..6 {
            let (turns, matched) = best_up_turns(self.cube);
            if turns > 0 {
                self.run(Move::new(Face::Up, Direction::Clockwise, turns)?);
            }
            // under the best alignment the match count is 4, 2, or 1
            match matched {
                4 => return Ok(()),
                2 => {
                    let adjacent = SIDE_FACES.into_iter().find(|x| {
                        !edge_matched(self.cube, *x) && !edge_matched(self.cube, x.left_side())
                    });
                    if let Some(x) = adjacent {
                        self.run_relative(x, EDGE_SWAP)?;
                    } else {
                        // two opposite edges swapped: three adjacent swaps
                        let x = SIDE_FACES
                            .into_iter()
                            .find(|x| !edge_matched(self.cube, *x))
                            .ok_or_else(|| self.stalled())?;
                        self.run_relative(x, EDGE_SWAP)?;
                        self.run_relative(x.left_side(), EDGE_SWAP)?;
                        self.run_relative(x, EDGE_SWAP)?;
                    }
                }
                1 => {
                    // three edges cycle: one of the adjacent unmatched pairs
                    // swaps into a strictly better position
                    let mut applied = false;
                    for x in SIDE_FACES {
                        if edge_matched(self.cube, x) || edge_matched(self.cube, x.left_side()) {
                            continue;
                        }
                        let mut probe = self.cube.clone();
                        apply_relative(&mut probe, x, EDGE_SWAP)?;
                        if best_up_turns(&probe).1 > 1 {
                            self.run_relative(x, EDGE_SWAP)?;
                            applied = true;
                            break;
                        }
                    }
                    if !applied {
                        return Err(self.stalled());
                    }
                }
                _ => return Err(self.stalled()),
            }
        }
        Err(self.stalled())
    }

    // Phase 6: position, then orient, the top corners.
    fn top_corners(&mut self) -> Result<(), SolveError> {
        self.enter(Phase::TopCorners);
        self.position_top_corners()?;
        self.orient_top_corners()?;
        // orientation twists leave the whole top rotated; realign
        for _ in 0..4 {
            if self.cube.is_solved() {
                return Ok(());
            }
            self.run(Move::clockwise(Face::Up));
        }
        Err(self.stalled())
    }

    fn position_top_corners(&mut self) -> Result<(), SolveError> {
        for _ in 0..4 {
            let mut positioned = Vec::new();
            for anchor in SIDE_FACES {
                if corner_positioned(self.cube, anchor)? {
                    positioned.push(anchor);
                }
            }
            // the corner permutation is even once the edges are solved, so
            // the fixed-point count is 4, 1, or 0
            match positioned.len() {
                4 => return Ok(()),
                // anchoring at the placed corner cycles the other three
                1 => self.run_relative(positioned[0], CORNER_CYCLE)?,
                // double transposition: any anchor leaves one corner placed
                0 => self.run_relative(Face::Front, CORNER_CYCLE)?,
                _ => return Err(self.stalled()),
            }
        }
        Err(self.stalled())
    }

    fn orient_top_corners(&mut self) -> Result<(), SolveError> {
        let up = Face::Up.normal();
        let twist_slot = Face::Front.normal() + Face::Right.normal() + up;
        let oriented = |cube: &Cube, pos: Point3| cube.color_at(pos, up) == Some(Color::Orange);
        let all_oriented = |cube: &Cube| {
            SIDE_FACES
                .into_iter()
                .all(|s| oriented(cube, s.normal() + s.right_side().normal() + up))
        };

        let mut corners = 0;
        while !all_oriented(self.cube) {
            corners += 1;
            if corners > 4 {
                return Err(self.stalled());
            }
            // rotate a twisted corner into the front-right slot
            let mut turns = 0;
            while oriented(self.cube, twist_slot) {
                turns += 1;
                if turns > 3 {
                    return Err(self.stalled());
                }
                self.run(Move::clockwise(Face::Up));
            }
            // each pair of twists advances the corner one orientation step
            let mut pairs = 0;
            while !oriented(self.cube, twist_slot) {
                pairs += 1;
                if pairs > 2 {
                    return Err(self.stalled());
                }
                self.run_relative(Face::Front, CORNER_TWIST_PAIR)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_solves(scramble: &str) {
        let mut cube = Cube::solved();
        cube.apply_all(&parse_moves(scramble).unwrap());
        let scrambled = cube.clone();

        let solution = solve(&mut cube).unwrap_or_else(|err| {
            panic!("solve failed on `{scramble}`: {err}");
        });
        assert!(cube.is_solved(), "cube not solved after `{scramble}`");

        let mut replay = scrambled;
        replay.apply_all(&solution);
        assert!(replay.is_solved(), "replay diverged for `{scramble}`");
    }

    #[test]
    fn test_solved_cube_needs_no_moves() {
        let mut cube = Cube::solved();
        let solution = solve(&mut cube).unwrap();
        assert!(solution.is_empty());
        assert!(cube.is_solved());
    }

    #[test]
    fn test_every_single_move_scramble() {
        for face in ['U', 'D', 'L', 'R', 'F', 'B'] {
            for suffix in ["", "'", "2"] {
                assert_solves(&format!("{face}{suffix}"));
            }
        }
    }

    #[test]
    fn test_fixed_twenty_move_scramble() {
        assert_solves("R U2 F' D B2 L U' R2 D' F L2 B U D2 R' F2 U2 L' B' D");
    }

    #[test]
    fn test_checkerboard_scramble() {
        assert_solves("U2 D2 F2 B2 L2 R2");
    }

    #[test]
    fn test_superflip_scramble() {
        assert_solves("U R2 F B R B2 R U2 L B2 R U' D' R2 F R' L B2 U2 F2");
    }

    #[test]
    fn test_seeded_random_scrambles() {
        for seed in 0..10u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut cube = Cube::solved();
            cube.scramble(&mut rng, 30);
            let scrambled = cube.clone();

            let solution = solve(&mut cube).unwrap_or_else(|err| {
                panic!("solve failed for seed {seed}: {err}");
            });
            assert!(cube.is_solved(), "cube not solved for seed {seed}");

            let mut replay = scrambled;
            replay.apply_all(&solution);
            assert!(replay.is_solved(), "replay diverged for seed {seed}");
        }
    }

    #[test]
    fn test_bottom_cross_phase_places_all_four_edges() {
        let mut cube = Cube::solved();
        cube.apply_all(&parse_moves("R U2 F' D B2 L U' R2 D' F").unwrap());
        let mut session = Session {
            cube: &mut cube,
            moves: Vec::new(),
            phase: Phase::BottomCross,
        };
        session.bottom_cross().unwrap();

        let down = Face::Down.normal();
        for side in SIDE_FACES {
            let edge = cube.find_piece(&[Color::Red, side.color()]).unwrap();
            assert_eq!(edge.pos(), side.normal() + down, "{side:?} edge misplaced");
            assert_eq!(edge.color_on(down), Some(Color::Red), "{side:?} edge flipped");
        }
    }

    #[test]
    fn test_first_two_layer_phases() {
        let mut cube = Cube::solved();
        cube.apply_all(&parse_moves("L2 B U D2 R' F2 U2 L' B' D R U2").unwrap());
        let mut session = Session {
            cube: &mut cube,
            moves: Vec::new(),
            phase: Phase::BottomCross,
        };
        session.bottom_cross().unwrap();
        session.bottom_corners().unwrap();
        session.middle_edges().unwrap();

        assert!(cube.face_solved(Face::Down));
        for side in SIDE_FACES {
            let grid = cube.face_grid(side);
            for row in &grid[1..] {
                for color in row {
                    assert_eq!(*color, side.color(), "{side:?} lower rows not solved");
                }
            }
        }
    }

    #[test]
    fn test_solution_length_is_bounded() {
        let mut cube = Cube::solved();
        cube.apply_all(&parse_moves("R U2 F' D B2 L U' R2 D' F L2 B U D2 R' F2 U2 L' B' D").unwrap());
        let solution = solve(&mut cube).unwrap();
        assert!(
            solution.len() < 300,
            "unexpectedly long solution: {} moves",
            solution.len()
        );
    }
}
