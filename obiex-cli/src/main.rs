//! Obiex interactive shell
//!
//! Plays the built-in levels from the terminal, one command per line.

mod levels;
mod shell;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::{Arc, Mutex};

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::shell::Shell;

/// Where to start, from the command line.
enum Start {
    Level(usize),
    Saved(String),
}

fn parse_args(args: &[String]) -> Result<Start, String> {
    let mut start = Start::Level(0);
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--level" => {
                let n = iter.next().ok_or("--level needs a number")?;
                let n = n.parse::<usize>().map_err(|_| format!("invalid level {n:?}"))?;
                start = Start::Level(n);
            }
            "--load" => {
                let data = iter.next().ok_or("--load needs a saved game")?;
                start = Start::Saved(data.clone());
            }
            other => return Err(format!("unknown argument {other:?}")),
        }
    }
    Ok(start)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let start = match parse_args(&args) {
        Ok(start) => start,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("usage: obiex [--level <n> | --load <saved>]");
            process::exit(2);
        }
    };

    let mut shell = match start {
        Start::Level(level) => {
            println!("Loading level {level}");
            Shell::new(level)
        }
        Start::Saved(data) => Shell::from_saved(&data),
    }
    .unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    // Latest save string, printed if the player hits Ctrl-C
    let last_save = Arc::new(Mutex::new(shell.save()));
    let s = last_save.clone();
    ctrlc::set_handler(move || {
        if let Ok(save) = s.lock() {
            println!("\n\nInterrupted. Resume with: load {save}");
        }
        process::exit(130);
    })
    .expect("Error setting Ctrl-C handler");

    println!("{}", shell.render());
    println!("Type `help` for commands.");
    print!("> ");
    io::stdout().flush().ok();

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        };

        let reply = shell.execute(&line);
        for out in &reply.lines {
            println!("{out}");
        }
        if reply.quit {
            break;
        }
        if let Ok(mut save) = last_save.lock() {
            *save = shell.save();
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    info!(
        level = shell.level(),
        moves = shell.session().moves().len(),
        "shell closed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("obiex").chain(list.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn test_parse_args() {
        assert!(matches!(parse_args(&args(&[])), Ok(Start::Level(0))));
        assert!(matches!(parse_args(&args(&["--level", "4"])), Ok(Start::Level(4))));
        assert!(matches!(
            parse_args(&args(&["--load", "MCwwLC0xLDAsMSww"])),
            Ok(Start::Saved(s)) if s == "MCwwLC0xLDAsMSww"
        ));
        assert!(parse_args(&args(&["--level"])).is_err());
        assert!(parse_args(&args(&["--level", "x"])).is_err());
        assert!(parse_args(&args(&["--verbose"])).is_err());
    }
}
