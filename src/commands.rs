use std::fmt::Write as _;

use common::clock::{MAX_TIME_ZONE_OFFSET, MIN_TIME_ZONE_OFFSET};
use thiserror::Error;

/// A line typed on the console
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Raw,
    Clock,
    Offset(i32),
    Daylight(bool),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Invalid offset: {0}")]
    InvalidOffset(String),
    #[error("Offset out of range (-12..=14): {0}")]
    OffsetOutOfRange(i32),
}

pub const HELP: &str = "Available commands:
\tRAW: Print raw GPS data
\tCLOCK: Print GPS date and time
\tOFFSET: Set the time zone offset (e.g., OFFSET+2)
\tDAYLIGHTON: Enable daylight saving
\tDAYLIGHTOFF: Disable daylight saving";

const OFFSET: &str = "OFFSET";

impl Command {
    /// Parse one console line. Keywords are matched without regard to case
    /// and surrounding whitespace is ignored.
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        let upper = line.to_ascii_uppercase();

        match upper.as_str() {
            "RAW" => return Ok(Command::Raw),
            "CLOCK" => return Ok(Command::Clock),
            "DAYLIGHTON" => return Ok(Command::Daylight(true)),
            "DAYLIGHTOFF" => return Ok(Command::Daylight(false)),
            _ => {}
        }

        if let Some(value) = upper.strip_prefix(OFFSET) {
            return parse_offset(value.trim()).map(Command::Offset);
        }

        Err(CommandError::Unknown(line.to_string()))
    }
}

fn parse_offset(value: &str) -> Result<i32, CommandError> {
    let offset: i32 = value
        .parse()
        .map_err(|_| CommandError::InvalidOffset(value.to_string()))?;

    if !(MIN_TIME_ZONE_OFFSET..=MAX_TIME_ZONE_OFFSET).contains(&offset) {
        return Err(CommandError::OffsetOutOfRange(offset));
    }

    Ok(offset)
}

/// Text printed back to the user after a rejected line
pub fn rejection(error: &CommandError) -> String {
    let mut text = error.to_string();
    if matches!(error, CommandError::Unknown(_)) {
        let _ = write!(text, "\n{HELP}");
    }
    text
}
