use ponder::board::Position;
use ponder::perft::{perft, perft_divide};

#[derive(clap::Parser, Debug)]
#[command(name = "perft", about = "Perft driver for ponder")]
struct Args {
    /// Search depth
    #[arg(value_name = "DEPTH")]
    depth: u32,
    /// FEN string or "startpos"
    #[arg(value_name = "FEN", default_value = "startpos")]
    fen: String,
    /// Print per-root-move node counts
    #[arg(long, default_value_t = false)]
    divide: bool,
    /// Report elapsed time and NPS
    #[arg(long, default_value_t = false)]
    nps: bool,
}

fn main() -> anyhow::Result<()> {
    use clap::Parser;
    use std::time::Instant;

    env_logger::init();
    let args = Args::parse();

    let mut pos = if args.fen == "startpos" {
        Position::startpos()
    } else {
        Position::from_fen(&args.fen)?
    };

    let t0 = Instant::now();
    let nodes = if args.divide {
        let (rows, total) = perft_divide(&mut pos, args.depth);
        for (mv, n) in rows {
            println!("{mv}: {n}");
        }
        total
    } else {
        perft(&mut pos, args.depth)
    };
    let dt = t0.elapsed().as_secs_f64();

    if args.nps {
        let nps = if dt > 0.0 { nodes as f64 / dt } else { f64::INFINITY };
        println!("nodes: {nodes} elapsed: {dt:.3}s nps: {nps:.1}");
    } else {
        println!("nodes: {nodes}");
    }
    Ok(())
}
