//! Line-oriented command loop on stdin.

use anyhow::{anyhow, bail};
use tickerboard_core::Dashboard;
use tickerboard_market_data::Symbol;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

pub const HELP: &str = "\
commands:
  key [VALUE]        set the API key (empty selects the demo key)
  select SYMBOL      show the detail series for SYMBOL
  clear              clear the selection
  refresh [SYMBOL]   refresh one ticker, or the detail view without SYMBOL
  show               print the whole board
  json               print the board as JSON
  help               this text
  quit               exit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Key(String),
    Select(Symbol),
    Clear,
    Refresh(Option<Symbol>),
    Show,
    Json,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "key" => Command::Key(rest.to_string()),
            "select" => {
                if rest.is_empty() {
                    bail!("usage: select SYMBOL");
                }
                Command::Select(rest.parse()?)
            }
            "clear" => Command::Clear,
            "refresh" if rest.is_empty() => Command::Refresh(None),
            "refresh" => Command::Refresh(Some(rest.parse()?)),
            "show" => Command::Show,
            "json" => Command::Json,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(anyhow!("unknown command '{}' (try 'help')", other)),
        };
        Ok(Some(command))
    }
}

/// Read commands until `quit` or end of input.
pub async fn run(dashboard: &Dashboard) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(e) = execute(dashboard, command) {
                    println!("error: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => println!("error: {}", e),
        }
    }
    Ok(())
}

fn execute(dashboard: &Dashboard, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Key(raw) => {
            let credential = dashboard.set_credential(&raw);
            if credential.is_default() {
                println!("using the demo key");
            } else {
                println!("API key updated");
            }
        }
        Command::Select(symbol) => dashboard.select(symbol)?,
        Command::Clear => dashboard.clear_selection(),
        Command::Refresh(Some(symbol)) => dashboard.refresh(symbol)?,
        Command::Refresh(None) => dashboard.refresh_detail(),
        Command::Show => println!("{}", render::board(dashboard)),
        Command::Json => println!("{}", serde_json::to_string_pretty(&dashboard.snapshot())?),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}
