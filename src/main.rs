//! Rubik's Cube Solver
//!
//! Scrambles and solves a 3x3x3 cube, printing states as an unfolded ASCII
//! net and move sequences in Singmaster notation.

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use cubist::cube::{format_moves, parse_moves, Cube};
use cubist::solver::solve;

/// Scrambles and solves a 3x3x3 Rubik's cube.
#[derive(Parser)]
#[command(name = "cubist")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scramble a solved cube and print the scramble and resulting net.
    Scramble {
        /// Number of random turns to apply.
        #[arg(long, default_value_t = 25)]
        turns: usize,
        /// Seed for a reproducible scramble.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Solve a scrambled cube and print the solution.
    Solve {
        /// Scramble to apply first, e.g. "R U R' U'".
        #[arg(long)]
        scramble: Option<String>,
        /// Apply this many random turns instead of a fixed scramble.
        #[arg(long, conflicts_with = "scramble")]
        random: Option<usize>,
        /// Seed for the random scramble.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the net of a cube after applying a move sequence.
    Show {
        /// Moves to apply, e.g. "R U R' U'".
        #[arg(long)]
        scramble: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Scramble { turns, seed } => {
            let mut cube = Cube::solved();
            let moves = cube.scramble(&mut rng_from(seed), turns);
            println!("scramble: {}", format_moves(&moves));
            print!("{cube}");
        }
        Command::Solve {
            scramble,
            random,
            seed,
        } => {
            let mut cube = Cube::solved();
            match (scramble, random) {
                (Some(notation), _) => {
                    let moves = parse_moves(&notation)?;
                    cube.apply_all(&moves);
                    println!("scramble: {notation}");
                }
                (None, Some(turns)) => {
                    let moves = cube.scramble(&mut rng_from(seed), turns);
                    println!("scramble: {}", format_moves(&moves));
                }
                (None, None) => {
                    return Err("pass --scramble or --random to set up the cube".into());
                }
            }
            print!("{cube}");

            let scrambled = cube.clone();
            let solution = solve(&mut cube)?;
            println!("solution ({} moves): {}", solution.len(), format_moves(&solution));

            let mut replay = scrambled;
            replay.apply_all(&solution);
            if !replay.is_solved() {
                return Err("replaying the solution did not solve the cube".into());
            }
            print!("{cube}");
        }
        Command::Show { scramble } => {
            let mut cube = Cube::solved();
            cube.apply_all(&parse_moves(&scramble)?);
            print!("{cube}");
        }
    }
    Ok(())
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
