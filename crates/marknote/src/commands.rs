use std::str::FromStr;

use core_types::ViewMode;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  new                    create a note and open it
  list                   show the sidebar
  open <n>               open the n-th note of `list`
  write <text>           replace the note body (\\n for newlines)
  append <text>          add a line to the note body
  rename <title>         rename the open note
  pin                    pin or unpin the open note
  delete                 delete the open note
  mode <write|read|both> switch the view mode
  split <percent>        move the divider (15-85)
  show                   print the editor and preview panes
  preview                print the rendered HTML
  help                   show this help
  quit                   save and exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    New,
    List,
    Open(usize),
    Write(String),
    Append(String),
    Rename(String),
    Pin,
    Delete,
    Mode(ViewMode),
    Split(f32),
    Show,
    Preview,
    Help,
    Quit,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),

    #[error("`{command}` expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("`{command}` cannot use `{value}`")]
    InvalidArgument { command: &'static str, value: String },
}

/// Turns the literal two-character sequence `\n` into a newline.
fn unescape(text: &str) -> String {
    text.replace("\\n", "\n")
}

fn required<'a>(
    command: &'static str,
    rest: &'a str,
    expected: &'static str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command, expected })
    } else {
        Ok(rest)
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name.to_ascii_lowercase().as_str() {
            "new" => Ok(Command::New),
            "list" | "ls" => Ok(Command::List),
            "open" => {
                let value = required("open", rest, "a note number")?;
                match value.parse::<usize>() {
                    Ok(index) if index > 0 => Ok(Command::Open(index)),
                    _ => Err(CommandError::InvalidArgument {
                        command: "open",
                        value: value.to_string(),
                    }),
                }
            }
            // An empty body is a valid edit.
            "write" => Ok(Command::Write(unescape(rest))),
            "append" => Ok(Command::Append(unescape(
                required("append", rest, "some text")?,
            ))),
            "rename" => Ok(Command::Rename(rest.to_string())),
            "pin" => Ok(Command::Pin),
            "delete" | "rm" => Ok(Command::Delete),
            "mode" => {
                let value = required("mode", rest, "write, read or both")?;
                ViewMode::parse(value)
                    .map(Command::Mode)
                    .ok_or_else(|| CommandError::InvalidArgument {
                        command: "mode",
                        value: value.to_string(),
                    })
            }
            "split" => {
                let value = required("split", rest, "a percentage")?;
                value
                    .trim_end_matches('%')
                    .parse::<f32>()
                    .ok()
                    .filter(|percent| percent.is_finite())
                    .map(Command::Split)
                    .ok_or_else(|| CommandError::InvalidArgument {
                        command: "split",
                        value: value.to_string(),
                    })
            }
            "show" => Ok(Command::Show),
            "preview" => Ok(Command::Preview),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(name.to_string())),
        }
    }
}
