use ponder::board::{MoveRequest, Outcome, Position};
use rand::seq::SliceRandom;
use std::io::{self, Write};

fn main() -> anyhow::Result<()> {
    println!("ponder (Random Play Mode)");
    println!("=========================");
    println!("Smoke-test opponent: the engine answers with random legal moves.");
    println!();
    println!("Enter moves in coordinate notation (e.g., e2e4)");
    println!("Type 'quit' to exit");
    println!();

    let mut pos = Position::startpos();
    let mut rng = rand::thread_rng();

    loop {
        println!("\n{pos}");

        if let Some(result) = pos.outcome() {
            match result {
                Outcome::Checkmate(winner) => println!("{winner} wins by checkmate!"),
                Outcome::Stalemate => println!("It's a stalemate!"),
            }
            break;
        }

        if pos.side_to_move == ponder::Color::White {
            print!("Your move: ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            let input = input.trim();

            if input == "quit" {
                println!("Thanks for playing!");
                break;
            }

            match input.parse::<MoveRequest>() {
                Ok(req) => {
                    if pos.apply(req).is_err() {
                        println!("Illegal move! Legal moves are:");
                        for (i, mv) in pos.legal_moves().iter().enumerate() {
                            print!("{mv} ");
                            if (i + 1) % 10 == 0 {
                                println!();
                            }
                        }
                        println!();
                    }
                }
                Err(_) => {
                    println!("Invalid move format! Use coordinate notation like 'e2e4'");
                }
            }
        } else {
            let legal = pos.legal_moves();
            let chosen = legal.choose(&mut rng).copied().expect("outcome checked above");
            println!("\nEngine plays: {chosen}");
            pos.make(&chosen);
        }
    }

    Ok(())
}
