//! Interactive session: one connected wallet, many operations.

use color_eyre::Result;
use stakeapp_chain::StakeOperationController;
use stakeapp_core::{ClientState, OperationIntent, OperationKind};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Connect,
    Disconnect,
    Refresh,
    Status,
    Operation(OperationIntent),
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };
        let argument = words.next();
        if words.next().is_some() {
            return Err(format!("Too many arguments for '{}'", command));
        }

        let word = command.to_lowercase();
        let plain = match word.as_str() {
            "connect" => Some(ShellCommand::Connect),
            "disconnect" => Some(ShellCommand::Disconnect),
            "refresh" => Some(ShellCommand::Refresh),
            "status" => Some(ShellCommand::Status),
            "help" | "?" => Some(ShellCommand::Help),
            "quit" | "exit" => Some(ShellCommand::Quit),
            _ => None,
        };
        if plain.is_some() {
            return Ok(plain);
        }

        let kind = OperationKind::all()
            .iter()
            .copied()
            .find(|kind| command_word(*kind) == word)
            .ok_or_else(|| format!("Unknown command '{}'. Type 'help'.", command))?;

        let amount = argument.ok_or_else(|| format!("Usage: {} <amount>", command))?;
        Ok(Some(ShellCommand::Operation(OperationIntent::new(kind, amount))))
    }
}

/// Shell keyword for an operation.
fn command_word(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Approve => "approve",
        OperationKind::Stake => "stake",
        OperationKind::Unstake => "unstake",
        OperationKind::Mint => "mint",
        OperationKind::AddReward => "reward",
    }
}

fn help_text() -> String {
    let mut lines = vec![
        "Commands:".to_string(),
        format!("  {:<20} Connect the wallet and load balances", "connect"),
        format!("  {:<20} Forget the connected account", "disconnect"),
        format!("  {:<20} Re-read balances", "refresh"),
        format!("  {:<20} Show the account and balances", "status"),
    ];
    for kind in OperationKind::all() {
        let usage = format!("{} <amount>", command_word(*kind));
        lines.push(format!("  {:<20} {}", usage, kind.description()));
    }
    lines.push(format!("  {:<20} Leave the shell", "quit"));
    lines.join("\n")
}

/// Read commands from stdin until EOF or `quit`.
pub async fn run(controller: &StakeOperationController, state: &mut ClientState) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type 'help' for commands.");

    while let Some(line) = lines.next_line().await? {
        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        let outcome = match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                println!("{}", help_text());
                Ok(())
            }
            ShellCommand::Status => {
                println!("{}", render::format_state(state, controller.network()));
                Ok(())
            }
            ShellCommand::Connect => controller.connect(state).await.map(|_| {
                println!("{}", render::format_state(state, controller.network()));
            }),
            ShellCommand::Disconnect => {
                controller.disconnect(state);
                Ok(())
            }
            ShellCommand::Refresh => controller.refresh(state).await.map(|_| {
                println!("{}", render::format_state(state, controller.network()));
            }),
            ShellCommand::Operation(intent) => {
                controller.execute(state, &intent).await.map(|_| {
                    println!("{}", render::format_state(state, controller.network()));
                })
            }
        };

        // Failures are reported and the session continues.
        if let Err(e) = outcome {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}
