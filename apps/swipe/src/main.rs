use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use deck::{
    load_deck, Animator, CatalogClient, DeckConfig, DeckOrigin, InstantAnimator, Offset,
    StackController, SwipeOutcome, TimedAnimator,
};
use shared::domain::SwipeDirection;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    proxy_url: String,
    /// Search query for the deck; the bundled deck is used without one.
    #[arg(long)]
    query: Option<String>,
    #[arg(long, default_value_t = 2000)]
    watchdog_ms: u64,
    /// Skip animation timing.
    #[arg(long)]
    instant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Swipe(SwipeDirection),
    Drag(Offset),
    Undo,
    Reset,
    Status,
    Liked,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command");
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "drag" => {
                let dx = parse_axis(words.next(), "dx")?;
                let dy = parse_axis(words.next(), "dy")?;
                Command::Drag(Offset::new(dx, dy))
            }
            "undo" => Command::Undo,
            "reset" => Command::Reset,
            "status" => Command::Status,
            "liked" => Command::Liked,
            "quit" | "exit" => Command::Quit,
            other => Command::Swipe(other.parse()?),
        };

        if words.next().is_some() {
            bail!("too many arguments for '{verb}'");
        }
        Ok(command)
    }
}

fn parse_axis(word: Option<&str>, name: &str) -> Result<f64> {
    let word = word.with_context(|| format!("drag needs {name}"))?;
    word.parse()
        .with_context(|| format!("{name} must be a number, got '{word}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let client = CatalogClient::new(&args.proxy_url);
    let loaded = load_deck(&client, args.query.as_deref()).await;
    if loaded.origin == DeckOrigin::Seed {
        info!("using bundled deck");
    }

    let animator: Arc<dyn Animator> = if args.instant {
        Arc::new(InstantAnimator)
    } else {
        Arc::new(TimedAnimator)
    };
    let config = DeckConfig::default().with_watchdog_timeout(Duration::from_millis(args.watchdog_ms));
    let deck = StackController::with_config(loaded.cards, animator, config);

    println!("commands: like | nope | superlike | drag <dx> <dy> | undo | reset | status | liked | quit");
    print_active(&deck);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(error) => {
                println!("? {error:#}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        run(&deck, command).await?;
    }

    let tally = deck.tally();
    println!(
        "bye: {} liked, {} noped, {} superliked",
        tally.like, tally.nope, tally.superlike
    );
    Ok(())
}

async fn run(deck: &StackController, command: Command) -> Result<()> {
    match command {
        Command::Swipe(direction) => report(deck.swipe_active(direction).await),
        Command::Drag(offset) => {
            if !deck.drag_start() {
                println!("cannot drag right now");
                return Ok(());
            }
            if let Some(frame) = deck.drag_move(offset) {
                let badge = frame.preview.map_or("none", SwipeDirection::as_str);
                println!("dragging: rotation {:.1}°, badge {badge}", frame.rotation);
            }
            report(deck.drag_end(offset).await);
        }
        Command::Undo => match deck.undo() {
            Some(entry) => println!("undid {} on {}", entry.swipe, entry.card.name),
            None => println!("nothing to undo"),
        },
        Command::Reset => {
            deck.reset();
            println!("deck reset");
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&deck.snapshot())?);
            return Ok(());
        }
        Command::Liked => {
            let liked: Vec<String> = deck
                .history()
                .into_iter()
                .filter(|entry| entry.swipe != SwipeDirection::Nope)
                .map(|entry| format!("{} (${:.2}, {})", entry.card.name, entry.card.price, entry.swipe))
                .collect();
            if liked.is_empty() {
                println!("nothing liked yet");
            } else {
                println!("{}", liked.join("\n"));
            }
            return Ok(());
        }
        Command::Quit => {}
    }
    print_active(deck);
    Ok(())
}

fn report(outcome: SwipeOutcome) {
    match outcome {
        SwipeOutcome::Committed { card_id, direction } => println!("{direction} {card_id}"),
        SwipeOutcome::Returned => println!("card returned to center"),
        SwipeOutcome::Ignored(reason) => println!("ignored: {reason:?}"),
        SwipeOutcome::Failed { card_id, reason } => println!("swipe on {card_id} failed: {reason}"),
    }
}

fn print_active(deck: &StackController) {
    let tally = deck.tally();
    match deck.active_card() {
        Some(card) => println!(
            "[{} left | like {} nope {} super {}] {} - ${:.2}, {} ABV, rated {:.1}",
            deck.len(),
            tally.like,
            tally.nope,
            tally.superlike,
            card.name,
            card.price,
            card.abv,
            card.rating
        ),
        None => println!(
            "[deck empty | like {} nope {} super {}] undo or reset to continue",
            tally.like, tally.nope, tally.superlike
        ),
    }
}
