use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use ricochet::engine::{Bouncer, Engine};
use ricochet::generator::{Generator, GeneratorConfig};
use ricochet::{Direction, Error, Layout, Puzzle, Result, SolveResult, Solver, SolverConfig};
use tracing_subscriber::EnvFilter;

#[derive(clap::Args)]
struct Source {
    /// Path to a JSON layout file (defaults to the built-in demo board)
    #[arg(value_name = "LAYOUT")]
    layout: Option<PathBuf>,

    /// Use the built-in classic 16x16 layout
    #[arg(long, conflicts_with_all = ["layout", "random"])]
    classic: bool,

    /// Generate a random 16x16 puzzle from this seed
    #[arg(long, value_name = "SEED", conflicts_with = "layout")]
    random: Option<u64>,
}

impl Source {
    fn load(&self) -> Result<Puzzle> {
        if let Some(seed) = self.random {
            let config = GeneratorConfig {
                seed,
                ..GeneratorConfig::default()
            };
            return Generator::new(config).generate();
        }
        let layout = match &self.layout {
            Some(path) => Layout::from_file(path)?,
            None if self.classic => Layout::classic()?,
            None => Layout::demo()?,
        };
        layout.build()
    }
}

#[derive(Subcommand)]
enum Mode {
    /// Solve a puzzle and print the moves
    Solve {
        #[command(flatten)]
        source: Source,

        /// Directions to try at every step, in order (e.g. "nesw")
        #[arg(short = 'd', long, default_value = "nesw")]
        directions: String,

        /// Maximum number of cells to explore before giving up
        #[arg(short = 'n', long)]
        max_nodes: Option<usize>,

        /// Print the board after every move
        #[arg(short, long)]
        print_board: bool,
    },

    /// Play a puzzle interactively
    Play {
        #[command(flatten)]
        source: Source,
    },

    /// Let the target robot bounce cell by cell until it reaches a goal
    Bounce {
        #[command(flatten)]
        source: Source,

        /// Initial heading of the robot
        #[arg(long, default_value = "east", value_parser = parse_direction)]
        heading: Direction,

        /// Maximum number of steps to run
        #[arg(long, default_value = "1000")]
        max_steps: usize,
    },
}

#[derive(Parser)]
#[command(name = "ricochet")]
#[command(about = "A Ricochet Robots solver", long_about = None)]
struct Args {
    #[command(subcommand)]
    mode: Mode,
}

fn parse_direction(text: &str) -> std::result::Result<Direction, String> {
    text.parse().map_err(|e: Error| e.to_string())
}

fn parse_directions(text: &str) -> Result<Vec<Direction>> {
    text.chars()
        .filter(|ch| !ch.is_whitespace() && *ch != ',')
        .map(|ch| ch.to_string().parse())
        .collect()
}

fn print_solution(puzzle: &Puzzle, result: &SolveResult) -> Result<()> {
    println!("\nStarting position:\n{}", puzzle);
    let robot = puzzle.state.designated().name.clone();
    let mut puzzle = puzzle.clone();
    let commands = result.to_commands()?;
    let total = commands.len();
    for (count, command) in commands.iter().enumerate() {
        puzzle.state.move_robot(&robot, command.direction)?;
        println!("{} ({}/{}):\n{}", command, count + 1, total, puzzle);
    }
    Ok(())
}

fn solve(
    puzzle: &Puzzle,
    directions: &str,
    max_nodes: Option<usize>,
    print_board: bool,
) -> Result<()> {
    let mut config = SolverConfig::with_directions(&parse_directions(directions)?);
    config.max_nodes = max_nodes;
    let solver = Solver::new(config);

    let start = Instant::now();
    let result = solver.solve(&puzzle.state, &puzzle.goals);
    let elapsed_ms = start.elapsed().as_millis();

    println!(
        "solved: {}  moves: {:<3}  explored: {:<8}  elapsed: {} ms",
        if result.success { 'Y' } else { 'N' },
        result.moves(),
        result.explored,
        elapsed_ms
    );

    if print_board && result.success {
        return print_solution(puzzle, &result);
    }
    for command in result.to_commands()? {
        println!("{}", command);
    }
    Ok(())
}

fn bounce(puzzle: &Puzzle, heading: Direction, max_steps: usize) {
    let bouncer = Bouncer {
        position: puzzle.state.designated().position,
        heading,
    };
    let run = Engine::default().run_until_goal(puzzle.board(), bouncer, &puzzle.goals, max_steps);
    println!(
        "reached: {}  steps: {}  position: {}  heading: {}",
        if run.reached { 'Y' } else { 'N' },
        run.steps,
        run.bouncer.position,
        run.bouncer.heading
    );
}

const HELP: &str = "Commands: move <robot> <direction>, robots, target, reset, solve, help, quit";

fn play(mut puzzle: Puzzle) -> Result<()> {
    println!("Welcome to Ricochet Robots! Type 'help' for a list of commands.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!("\n{}", puzzle);
        if puzzle.is_solved() {
            println!(
                "Congratulations! You've solved the puzzle in {} moves.",
                puzzle.state.move_count()
            );
            return Ok(());
        }
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => return Ok(()),
            ["help"] => println!("{}", HELP),
            ["robots"] => {
                let target = &puzzle.state.designated().name;
                for robot in puzzle.state.robots() {
                    let marker = if &robot.name == target { '*' } else { ' ' };
                    println!("{}{}: {}", marker, robot.name, robot.position);
                }
            }
            ["target"] => {
                let goals: Vec<String> = puzzle.goals.iter().map(|g| g.to_string()).collect();
                println!(
                    "Target robot '{}' must reach {}.",
                    puzzle.state.designated().name,
                    goals.join(" or ")
                );
            }
            ["reset"] => puzzle.state.reset(),
            ["solve"] => {
                let result = Solver::default().solve(&puzzle.state, &puzzle.goals);
                if !result.success {
                    println!("No solution from here.");
                }
                for command in result.to_commands()? {
                    println!("{}", command);
                }
            }
            ["move", robot, direction] => {
                let direction: Direction = match direction.parse() {
                    Ok(direction) => direction,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                match puzzle.state.move_robot(robot, direction) {
                    Ok(true) => {}
                    Ok(false) => println!("That robot cannot move in that direction."),
                    Err(e) => println!("{}", e),
                }
            }
            ["move", ..] => println!("Usage: move <robot> <direction>"),
            _ => println!("Unknown command. Type 'help' for assistance."),
        }
    }
}

fn run(args: Args) -> Result<()> {
    match args.mode {
        Mode::Solve {
            source,
            directions,
            max_nodes,
            print_board,
        } => solve(&source.load()?, &directions, max_nodes, print_board),
        Mode::Play { source } => play(source.load()?),
        Mode::Bounce {
            source,
            heading,
            max_steps,
        } => {
            bounce(&source.load()?, heading, max_steps);
            Ok(())
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
