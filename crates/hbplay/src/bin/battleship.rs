// hbplay/src/bin/battleship.rs
// Hot-seat game loop:
// - build config (JSON file, then flags), set up both players, exchange keys
// - each turn: show the attacker's boards, read a guess, run the blinded hit-check
// - stop on a winner, end of input, or a fatal protocol error

use anyhow::{Context, Result};
use clap::Parser;
use hbcrypto::save_json;
use hbgame::{Coord, Game, GameConfig, GameError, ShotOutcome, TurnReport};
use hbplay::{render_guess_board, render_own_board, GuessSource, LineGuesses, RandomGuesses};
use std::io;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Two-player Battleship over Paillier-encrypted boards")]
struct Opt {
    /// JSON game config; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for keys, placement and blinding (reproducible games)
    #[arg(long)]
    seed: Option<u64>,

    /// Paillier modulus size in bits
    #[arg(long)]
    key_bits: Option<u32>,

    /// Upper bound of the blinding factor range [1, max]
    #[arg(long)]
    blinding_max: Option<u64>,

    /// Give up placing a ship after this many random tries
    #[arg(long)]
    max_placement_attempts: Option<u32>,

    /// Let both players guess at random instead of reading stdin
    #[arg(long)]
    autoplay: bool,

    /// Do not wait for Enter between turns
    #[arg(long)]
    no_pause: bool,

    /// Write both players' public keys as JSON into this directory
    #[arg(long)]
    export_public_keys: Option<PathBuf>,
}

fn build_config(opt: &Opt) -> Result<GameConfig> {
    let mut config = match &opt.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => GameConfig::default(),
    };
    if let Some(seed) = opt.seed {
        config.seed = Some(seed);
    }
    if let Some(bits) = opt.key_bits {
        config.key_bits = bits;
    }
    if let Some(max) = opt.blinding_max {
        config.blinding.max = max;
    }
    if let Some(n) = opt.max_placement_attempts {
        config.max_placement_attempts = n;
    }
    config.validate()?;
    info!(key_bits = config.key_bits, seeded = config.seed.is_some(), "configuration ready");
    Ok(config)
}

fn print_banner() {
    println!("{}", "=".repeat(60));
    println!("   HOMOMORPHIC BATTLESHIP - Full Two-Player Game");
    println!("{}", "=".repeat(60));
    println!("\nRules:");
    println!("- Each player has a 10x10 board");
    println!("- Ships: Carrier(5), Battleship(4), Cruiser(3), Submarine(2), Destroyer(2)");
    println!("- Players take turns guessing coordinates");
    println!("- First to sink all opponent's ships wins!");
    println!("- Boards are encrypted - even the game can't see ship locations!\n");
}

fn section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

fn print_report(report: &TurnReport) {
    let (r, c) = (report.at.row, report.at.col);
    match &report.outcome {
        ShotOutcome::Hit => {
            println!("\n*** HIT! ***");
            println!("{}'s ship was hit at ({r}, {c})!", report.defender);
        }
        ShotOutcome::Sunk { ship } => {
            println!("\n*** HIT! ***");
            println!("*** You sunk {}'s {ship}! ***", report.defender);
        }
        ShotOutcome::Miss => println!("\nMiss. No ship at ({r}, {c})."),
    }
}

fn print_game_over(game: &Game, report: &TurnReport) {
    section("GAME OVER!");
    println!("\n{} WINS!", report.attacker);
    println!("All of {}'s ships have been sunk!", report.defender);
    println!("Total turns: {}", game.turns_taken());
    for p in game.players() {
        println!("\n{}'s Final Board:", p.name());
        print!("{}", render_own_board(p));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let opt = Opt::parse();
    let config = build_config(&opt)?;

    print_banner();
    section("SETUP PHASE");
    println!("\nGenerating encryption keys ({} bits)...", config.key_bits);
    let mut game = Game::new(&config).context("game setup failed")?;
    for p in game.players() {
        println!("\n[{}] All ships placed and encrypted!", p.name());
        print!("{}", render_own_board(p));
    }

    if let Some(dir) = &opt.export_public_keys {
        std::fs::create_dir_all(dir)?;
        for p in game.players() {
            let path = dir.join(format!("{}_pub.json", p.name().to_lowercase()));
            save_json(&path, p.public_key())
                .with_context(|| format!("failed to write {:?}", path))?;
            println!("Wrote {}'s public key to {:?}", p.name(), path);
        }
    }

    let mut guesses: Box<dyn GuessSource> = if opt.autoplay {
        Box::new(RandomGuesses::new(config.seed))
    } else {
        Box::new(LineGuesses::new(io::stdin().lock(), io::stdout()))
    };
    let pause = !(opt.autoplay || opt.no_pause);

    section("GAME START!");
    while !game.is_over() {
        section(&format!(
            "TURN {} - {}'s Turn",
            game.turns_taken() + 1,
            game.attacker().name()
        ));
        print!("{}", render_own_board(game.attacker()));
        print!("{}", render_guess_board(game.attacker()));

        let Some((row, col)) = guesses.next_guess(game.attacker())? else {
            println!("\n\nGame interrupted. Thanks for playing!");
            return Ok(());
        };

        let fired = Coord::checked(row, col)
            .and_then(|at| game.attacker().guess_board().ensure_unknown(at))
            .and_then(|()| {
                println!("\n[Network] Processing encrypted guess at ({row}, {col})...");
                println!("[Network] Computing with encrypted data (opponent's board stays hidden)...");
                game.take_turn(row, col)
            });
        let report = match fired {
            Ok(report) => report,
            Err(GameError::AlreadyGuessed(_)) => {
                guesses.rejected("You already guessed that position!")?;
                continue;
            }
            Err(e) if !e.is_fatal() => {
                guesses.rejected(&e.to_string())?;
                continue;
            }
            Err(e) => {
                error!(error = %e, turns = game.turns_taken(), "game aborted");
                return Err(e).context("game aborted");
            }
        };
        print_report(&report);

        if report.defender_lost {
            print_game_over(&game, &report);
        } else if pause && !guesses.pause()? {
            println!("\n\nGame interrupted. Thanks for playing!");
            return Ok(());
        }
    }
    Ok(())
}
