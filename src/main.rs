use anyhow::Result;
use clap::Parser;
use ponder::board::{Color, MoveRequest, Outcome, Position};
use ponder::search::alphabeta::{SearchParams, Searcher};
use ponder::search::eval;
use serde::Serialize;
use std::io::{self, Write};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play chess against the ponder engine", long_about = None)]
struct Args {
    /// Operation mode: 'h' to play against the engine, 'a' to analyze a
    /// single position
    #[arg(long, default_value = "h")]
    mode: String,

    /// Your color: 'w' for white, 'b' for black
    #[arg(long, default_value = "w")]
    color: String,

    /// Search depth
    #[arg(long, default_value_t = 4)]
    depth: u32,

    /// Time budget per engine move, in milliseconds
    #[arg(long, default_value_t = 2000)]
    movetime: u64,

    /// Starting FEN position
    #[arg(long)]
    fen: Option<String>,

    /// Emit the analysis result as JSON (analyze mode)
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct AnalysisReport {
    fen: String,
    best_move: Option<String>,
    score_cp: i32,
    depth: u32,
    nodes: u64,
    elapsed_ms: u128,
}

fn parse_color(color_str: &str) -> Result<Color> {
    match color_str.to_lowercase().as_str() {
        "w" | "white" => Ok(Color::White),
        "b" | "black" => Ok(Color::Black),
        _ => anyhow::bail!("Invalid color: use 'w' or 'b'"),
    }
}

fn get_human_move(pos: &mut Position) -> Result<()> {
    loop {
        print!("Enter your move (e.g., e2e4): ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        match input.parse::<MoveRequest>() {
            Ok(req) => match pos.apply(req) {
                Ok(_) => return Ok(()),
                Err(_) => println!("Illegal move!"),
            },
            Err(_) => println!("Invalid move format! Use format like 'e2e4'"),
        }
    }
}

fn analyze(pos: &mut Position, args: &Args) -> Result<()> {
    let mut searcher = Searcher::default();
    let params = SearchParams {
        depth: args.depth,
        movetime: Some(Duration::from_millis(args.movetime)),
        ..Default::default()
    };
    let t0 = Instant::now();
    let outcome = searcher.search(pos, params);
    let elapsed = t0.elapsed();

    if args.json {
        let report = AnalysisReport {
            fen: pos.to_fen(),
            best_move: outcome.best_move.map(|m| m.to_string()),
            score_cp: outcome.score_cp,
            depth: outcome.depth,
            nodes: outcome.nodes,
            elapsed_ms: elapsed.as_millis(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{pos}");
        println!("eval: {:+} cp (static)", eval::evaluate(pos));
        match outcome.best_move {
            Some(mv) => println!(
                "best: {} score {:+} cp depth {} nodes {} in {:.2}s",
                mv,
                outcome.score_cp,
                outcome.depth,
                outcome.nodes,
                elapsed.as_secs_f32()
            ),
            None => println!("no legal moves"),
        }
    }
    Ok(())
}

fn play(pos: &mut Position, args: &Args) -> Result<()> {
    let human_color = parse_color(&args.color)?;
    let mut searcher = Searcher::default();

    loop {
        if let Some(result) = pos.outcome() {
            match result {
                Outcome::Checkmate(winner) => println!("\nCheckmate! {winner} wins!"),
                Outcome::Stalemate => println!("\nGame is a stalemate!"),
            }
            break;
        }

        println!("\n{}'s turn", pos.side_to_move);
        println!("{pos}");

        if pos.side_to_move == human_color {
            get_human_move(pos)?;
        } else {
            println!("Thinking...");
            let t0 = Instant::now();
            let params = SearchParams {
                depth: args.depth,
                movetime: Some(Duration::from_millis(args.movetime)),
                ..Default::default()
            };
            let outcome = searcher.search(pos, params);
            let elapsed = t0.elapsed();
            match outcome.best_move {
                Some(mv) => {
                    let nps = outcome.nodes as f32 / elapsed.as_secs_f32().max(1e-6);
                    println!(
                        "Engine plays: {} ({:+} cp, depth {}, {} nodes, {:.0} n/s)",
                        mv, outcome.score_cp, outcome.depth, outcome.nodes, nps
                    );
                    pos.make(&mv);
                }
                None => {
                    println!("No legal moves available!");
                    break;
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut pos = match &args.fen {
        Some(fen) => Position::from_fen(fen)
            .map_err(|e| anyhow::anyhow!("Invalid FEN string: {e}"))?,
        None => Position::startpos(),
    };

    match args.mode.chars().next().unwrap_or('h') {
        'a' => analyze(&mut pos, &args),
        _ => play(&mut pos, &args),
    }
}
