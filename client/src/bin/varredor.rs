use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use varredor_client::{GameSession, HistoryStore, HttpTransport};
use varredor_core::{BoardSnapshot, ClickInput, Coord, GameLevel, GateState};

#[derive(Parser, Debug)]
#[command(name = "varredor", about = "Minesweeper client for a remote game server")]
struct Args {
    /// Base URL of the game server
    #[arg(long, default_value = HttpTransport::DEFAULT_BASE_URL)]
    server: String,

    /// Preset level: easy, medium or hard
    #[arg(long, default_value = "easy")]
    level: String,

    /// Custom board rows (requires --cols and --mines)
    #[arg(long, requires = "cols", requires = "mines", conflicts_with = "level")]
    rows: Option<Coord>,

    /// Custom board columns
    #[arg(long, requires = "rows")]
    cols: Option<Coord>,

    /// Custom mine count
    #[arg(long, requires = "rows")]
    mines: Option<u32>,

    /// Where to keep the game history
    #[arg(long)]
    history: Option<PathBuf>,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity,
}

impl Args {
    fn level(&self) -> anyhow::Result<GameLevel> {
        if let (Some(rows), Some(cols), Some(mines)) = (self.rows, self.cols, self.mines) {
            return Ok(GameLevel::custom(rows, cols, mines));
        }
        match self.level.to_lowercase().as_str() {
            "easy" => Ok(GameLevel::easy()),
            "medium" => Ok(GameLevel::medium()),
            "hard" => Ok(GameLevel::hard()),
            other => anyhow::bail!("unknown level {other:?}, expected easy, medium or hard"),
        }
    }
}

fn render(board: &BoardSnapshot) -> String {
    let mut out = String::new();
    out.push_str("   ");
    for col in 0..board.cols {
        out.push_str(&format!("{:>3}", col));
    }
    out.push('\n');
    for row in 0..board.rows {
        out.push_str(&format!("{:>3}", row));
        for col in 0..board.cols {
            let glyph = match board.cell_at((row, col)) {
                Some(cell) if cell.flagged => 'F',
                Some(cell) if !cell.revealed => '.',
                Some(cell) if cell.mine => '*',
                Some(cell) if cell.adjacent_mines == 0 => ' ',
                Some(cell) => char::from(b'0' + cell.adjacent_mines),
                None => '?',
            };
            out.push_str(&format!("{glyph:>3}"));
        }
        out.push('\n');
    }
    out
}

fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn status_line(session: &GameSession) -> String {
    let state = match session.state() {
        GateState::NotStarted => "not started",
        GateState::InProgress => "in progress",
        GateState::Won => "you won!",
        GateState::Lost => "game over",
    };
    format!(
        "[{}] mines left: {}  time: {}  clicks: {}",
        state,
        session.mines_left(),
        format_time(session.elapsed_secs()),
        session.clicks()
    )
}

fn print_board(session: &GameSession) {
    if let Some(board) = session.board() {
        println!("{}", render(board));
    }
    println!("{}", status_line(session));
}

fn print_history(session: &GameSession) {
    if session.history().is_empty() {
        println!("no finished games yet");
        return;
    }
    for record in session.history().records() {
        println!(
            "{} {} {:?} in {} with {} clicks ({}, {} mines)",
            record.date.format("%Y-%m-%d %H:%M"),
            record.level,
            record.result,
            format_time(record.duration),
            record.clicks,
            record.size,
            record.mines,
        );
    }
}

fn parse_coords(mut parts: std::str::SplitWhitespace<'_>) -> Option<(Coord, Coord)> {
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    Some((row, col))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();

    let level = args.level()?;
    let transport = Arc::new(HttpTransport::new(&args.server));
    let mut session = GameSession::new(transport);
    if let Some(path) = &args.history {
        session = session.with_history_store(HistoryStore::new(path));
    }

    session
        .new_game(level.clone())
        .await
        .with_context(|| format!("could not start a game on {}", args.server))?;

    println!(
        "commands: r ROW COL (reveal), f ROW COL (flag), n (new game), h (history), c (clear history), q (quit)"
    );
    print_board(&session);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("r") => {
                let Some(coords) = parse_coords(parts) else {
                    println!("usage: r ROW COL");
                    continue;
                };
                if let Some(outcome) = session.click(coords, ClickInput::reveal()).await {
                    log::info!("game finished: {outcome:?}");
                }
                print_board(&session);
            }
            Some("f") => {
                let Some(coords) = parse_coords(parts) else {
                    println!("usage: f ROW COL");
                    continue;
                };
                session.click(coords, ClickInput::flag()).await;
                print_board(&session);
            }
            Some("n") => {
                // a failed restart keeps the current session; retry with n
                if let Err(err) = session.new_game(level.clone()).await {
                    println!("could not start a new game: {err}");
                    continue;
                }
                print_board(&session);
            }
            Some("h") => print_history(&session),
            Some("c") => {
                session.clear_history();
                println!("history cleared");
            }
            Some("q") => break,
            Some(other) => println!("unknown command {other:?}"),
            None => {}
        }
    }
    Ok(())
}
