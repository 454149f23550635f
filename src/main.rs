//! Terminal chat against a ChatKit backend.
//!
//! Type a message and press enter. `/clear` starts a new conversation after
//! confirmation, `/quit` exits.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use chatkit_client::common::ApiConfig;
use chatkit_client::session::ChatSession;
use chatkit_client::start_chatkit;

/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Send(&'a str),
    Clear,
    Quit,
    Blank,
}

fn parse_command(line: &str) -> Command<'_> {
    match line.trim() {
        "" => Command::Blank,
        "/clear" => Command::Clear,
        "/quit" | "/exit" => Command::Quit,
        text => Command::Send(text),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn prompt(label: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}")?;
    stdout.flush()
}

fn main() -> ExitCode {
    start_chatkit::init_tracing();

    let config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };
    let title = config.workflow_name.clone();

    let mut session = match ChatSession::connect(config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("cannot start session: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    println!("{title}");
    println!("Ask me anything. /clear starts over, /quit exits.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if prompt("> ").is_err() {
            break;
        }
        let Some(Ok(line)) = lines.next() else {
            break;
        };

        match parse_command(&line) {
            Command::Blank => {}
            Command::Quit => break,
            Command::Clear => {
                if prompt("Clear all messages? [y/N] ").is_err() {
                    break;
                }
                match lines.next() {
                    Some(Ok(answer)) if is_yes(&answer) => {
                        session.clear();
                        println!("Conversation cleared.");
                    }
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
            Command::Send(text) => match rt.block_on(session.send(text)) {
                Ok(outcome) => println!("{}\n", outcome.display_text()),
                Err(e) => eprintln!("{e}"),
            },
        }
    }

    ExitCode::SUCCESS
}
