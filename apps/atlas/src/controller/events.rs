//! Commands typed into the interactive loop.

use shared::{domain::Coordinate, error::CoordinateError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum InputCommand {
    /// A click on the map at the given point.
    Click(Coordinate),
    /// Text typed into the country-name input, then submitted. May be blank.
    Submit(String),
    Show,
    Help,
    Quit,
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}'; type 'help' for the list")]
    Unknown(String),
    #[error("usage: click <latitude> <longitude>")]
    ClickUsage,
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

pub const HELP_TEXT: &str = "\
commands:
  click <lat> <lon>   click the map at a point
  search <name>       look a country up by name
  show                print the current panels
  help                show this text
  quit                leave";

impl InputCommand {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "" => Ok(Self::Nothing),
            "click" => parse_click(rest),
            "search" | "submit" => Ok(Self::Submit(rest.to_string())),
            "show" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_click(args: &str) -> Result<InputCommand, CommandError> {
    let mut parts = args
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty());
    let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CommandError::ClickUsage);
    };
    let lat = parse_number(lat)?;
    let lon = parse_number(lon)?;
    Ok(InputCommand::Click(Coordinate::from_map_click(lat, lon)?))
}

fn parse_number(raw: &str) -> Result<f64, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}
