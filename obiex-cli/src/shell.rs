//! Command parsing and dispatch for the interactive shell.

use obiex_core::{codec, Direction, Encoding, Session, Status};
use tracing::info;

use crate::levels::{self, LEVELS};

/// A parsed input line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Command {
    /// Load a level by number.
    Level(usize),
    /// Load a base64 session string.
    Load(String),
    Move { index: usize, direction: Direction },
    Undo,
    Restart,
    Save,
    Help,
    Exit,
}

impl Command {
    /// Parse one line. `Ok(None)` means an unknown command.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let mut tokens = line.split_whitespace();
        let cmd = match tokens.next() {
            Some("load") => {
                let arg = tokens.next().ok_or("usage: load <level|encoded>")?;
                match codec::parse_index(arg) {
                    Some(level) => Command::Level(level),
                    None => Command::Load(arg.to_string()),
                }
            }
            Some("move") => {
                let (Some(index), Some(direction)) = (tokens.next(), tokens.next()) else {
                    return Err("usage: move <index> <U|D|L|R>".to_string());
                };
                let index = codec::parse_index(index)
                    .ok_or_else(|| format!("invalid move: invalid index {index:?}"))?;
                let direction = direction.parse::<Direction>().map_err(|e| e.to_string())?;
                Command::Move { index, direction }
            }
            Some("undo") => Command::Undo,
            Some("restart") => Command::Restart,
            Some("save") => Command::Save,
            Some("help") => Command::Help,
            Some("exit") => Command::Exit,
            _ => return Ok(None),
        };
        Ok(Some(cmd))
    }
}

const HELP: &str = "\
commands:
  load <level|encoded>   load a level number or a saved game
  move <index> <U|D|L|R> slide an obx
  undo                   take back the last move
  restart                start the level again
  save                   print a string that `load` accepts
  exit                   quit";

/// Output of one input line.
#[derive(Debug, Default)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

/// The game loop state: a session and the current level number.
pub struct Shell {
    session: Session,
    level: usize,
}

impl Shell {
    /// Start at `level`.
    pub fn new(level: usize) -> Result<Shell, String> {
        let mut session = Session::new();
        match levels::load_level(&mut session, level) {
            Some(Ok(())) => Ok(Shell { session, level }),
            Some(Err(e)) => Err(e.to_string()),
            None => Err(format!("no level {level}, there are {}", LEVELS.len())),
        }
    }

    /// Start from a saved base64 session string.
    pub fn from_saved(data: &str) -> Result<Shell, String> {
        let mut session = Session::new();
        session.load(data, Encoding::Base64).map_err(|e| e.to_string())?;
        Ok(Shell { session, level: 0 })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn save(&self) -> String {
        self.session.serialize(Encoding::Base64)
    }

    pub fn render(&self) -> String {
        self.session.state().render()
    }

    /// Run one input line and report what to print.
    pub fn execute(&mut self, line: &str) -> Reply {
        let mut reply = Reply::default();
        let cmd = match Command::parse(line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => {
                reply.lines.push("unknown command".to_string());
                self.after_command(&mut reply);
                return reply;
            }
            Err(e) => {
                reply.lines.push(format!("error: {e}"));
                return reply;
            }
        };

        if let Err(e) = self.run(cmd, &mut reply) {
            reply.lines.push(format!("error: {e}"));
            return reply;
        }
        if !reply.quit {
            self.after_command(&mut reply);
        }
        reply
    }

    fn run(&mut self, cmd: Command, reply: &mut Reply) -> Result<(), String> {
        match cmd {
            Command::Level(level) => self.load_level(level, reply)?,
            Command::Load(data) => {
                self.session.load(&data, Encoding::Base64).map_err(|e| e.to_string())?;
                info!(moves = self.session.moves().len(), "saved game loaded");
            }
            Command::Move { index, direction } => {
                self.session.move_obstacle(index, direction).map_err(|e| e.to_string())?;
            }
            Command::Undo => {
                self.session.undo().map_err(|e| e.to_string())?;
            }
            Command::Restart => self.session.reset(),
            Command::Save => reply.lines.push(self.save()),
            Command::Help => reply.lines.push(HELP.to_string()),
            Command::Exit => reply.quit = true,
        }
        Ok(())
    }

    fn load_level(&mut self, level: usize, reply: &mut Reply) -> Result<(), String> {
        match levels::load_level(&mut self.session, level) {
            Some(result) => result.map_err(|e| e.to_string())?,
            None => return Err(format!("no level {level}, there are {}", LEVELS.len())),
        }
        self.level = level;
        info!(level, "level loaded");
        reply.lines.push(format!("Loading level {level}"));
        Ok(())
    }

    /// Print the board, then handle a win (next level) or a loss (restart).
    fn after_command(&mut self, reply: &mut Reply) {
        reply.lines.push(self.render());
        match self.session.state().status() {
            Status::Won => {
                reply.lines.push("You win!".to_string());
                let next = self.level + 1;
                let next = if next < LEVELS.len() {
                    next
                } else {
                    reply.lines.push("All levels cleared! Back to the start.".to_string());
                    0
                };
                if let Err(e) = self.load_level(next, reply) {
                    reply.lines.push(format!("error: {e}"));
                }
                reply.lines.push(self.render());
            }
            Status::Lost => {
                reply.lines.push("You lose! :(".to_string());
                self.session.reset();
                reply.lines.push(self.render());
            }
            Status::Playing => {}
        }
    }
}
