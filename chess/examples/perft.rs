// Counts perft from the command line
//
// Usage: perft <depth> [fen]

use std::env;
use std::process;

use x88chess::{Generator, Position};

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let depth: u32 = match args.first().map(|s| s.parse()) {
        Some(Ok(depth)) => depth,
        _ => {
            eprintln!("usage: perft <depth> [fen]");
            process::exit(2);
        }
    };

    let generator = match args.get(1) {
        Some(fen) => Generator::from_fen(fen).map_err(|e| e.to_string()),
        None => Generator::new(&Position::initial()).map_err(|e| e.to_string()),
    };
    let mut generator = match generator {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Bad position: {}", e);
            process::exit(1);
        }
    };

    let mut total = 0;
    for (mv, count) in generator.divide(depth) {
        println!("{}: {}", mv, count);
        total += count;
    }
    if depth == 0 {
        total = 1;
    }
    println!();
    println!("Nodes: {}", total);
}
