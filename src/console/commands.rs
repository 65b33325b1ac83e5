use std::path::PathBuf;

use crate::editor::params::ParamField;
use crate::editor::tools::{ToolGroup, ToolId};
use crate::editor::viewport::Point;

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// A file path or a `data:` URL.
    Open(String),
    Reference(String),
    Pattern(String),
    Section(ToolGroup),
    Tool(ToolId),
    Set { field: ParamField, value: String },
    Apply,
    Wheel(f32),
    ZoomIn,
    ZoomOut,
    DragStart(Point),
    DragMove(Point),
    DragEnd,
    ViewReset,
    Peek(bool),
    Dismiss,
    Reset,
    Save(Option<PathBuf>),
    Export,
    Status,
    Tools,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}'; type 'help' for the list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    InvalidValue(String),
}

pub const HELP_TEXT: &str = "\
open <path|data-url>        load the main photo
reference <path>            load the clothing reference for clothing-swap
pattern <path>              load the pattern image for clothing-pattern-add-image
section <hair|eyes|clothing|filters>
                            open or close a tool section
tool <id>                   select a tool in the open section
set <field> <value>         change a tool field (see 'tools')
apply                       run the selected tool
wheel <delta>               mouse-wheel zoom; negative zooms in
zoom in|out                 step the zoom
drag start|move <x> <y>     pan while zoomed in
drag end                    stop panning
view reset                  reset zoom and pan
peek on|off                 hold or release the compare button
dismiss                     close the error banner
reset                       discard edits and show the original
save [dir]                  write the edited image
export                      print the edited image as a data URL
status                      show the session
tools                       list sections, tools and fields
help                        this text
quit                        exit";

fn required<'a>(
    arg: Option<&'a str>,
    usage: &'static str,
) -> Result<&'a str, CommandError> {
    arg.map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(CommandError::Usage(usage))
}

fn parse_point(args: &[&str], usage: &'static str) -> Result<Point, CommandError> {
    let &[x, y] = args else {
        return Err(CommandError::Usage(usage));
    };
    let parse = |value: &str| {
        value
            .parse::<f32>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| CommandError::InvalidValue(format!("'{value}' is not a number")))
    };
    Ok(Point::new(parse(x)?, parse(y)?))
}

/// Parses one input line. Returns `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, Some(rest.trim())),
        None => (line, None),
    };
    let words: Vec<&str> = rest.map(|rest| rest.split_whitespace().collect()).unwrap_or_default();

    let command = match name.to_lowercase().as_str() {
        "open" => ConsoleCommand::Open(required(rest, "open <path>")?.to_string()),
        "reference" => {
            ConsoleCommand::Reference(required(rest, "reference <path>")?.to_string())
        }
        "pattern" => ConsoleCommand::Pattern(required(rest, "pattern <path>")?.to_string()),
        "section" => {
            let value = required(rest, "section <hair|eyes|clothing|filters>")?;
            ConsoleCommand::Section(value.parse().map_err(CommandError::InvalidValue)?)
        }
        "tool" => {
            let value = required(rest, "tool <id>")?;
            ConsoleCommand::Tool(value.parse().map_err(CommandError::InvalidValue)?)
        }
        "set" => {
            let rest = required(rest, "set <field> <value>")?;
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or(CommandError::Usage("set <field> <value>"))?;
            ConsoleCommand::Set {
                field: field.parse().map_err(CommandError::InvalidValue)?,
                value: value.trim().to_string(),
            }
        }
        "apply" => ConsoleCommand::Apply,
        "wheel" => {
            let value = required(rest, "wheel <delta>")?;
            let delta = value
                .parse::<f32>()
                .ok()
                .filter(|delta| delta.is_finite())
                .ok_or_else(|| CommandError::InvalidValue(format!("'{value}' is not a number")))?;
            ConsoleCommand::Wheel(delta)
        }
        "zoom" => match words.as_slice() {
            ["in"] => ConsoleCommand::ZoomIn,
            ["out"] => ConsoleCommand::ZoomOut,
            _ => return Err(CommandError::Usage("zoom in|out")),
        },
        "drag" => match words.as_slice() {
            ["start", point @ ..] => {
                ConsoleCommand::DragStart(parse_point(point, "drag start <x> <y>")?)
            }
            ["move", point @ ..] => {
                ConsoleCommand::DragMove(parse_point(point, "drag move <x> <y>")?)
            }
            ["end"] => ConsoleCommand::DragEnd,
            _ => return Err(CommandError::Usage("drag start|move <x> <y> | drag end")),
        },
        "view" => match words.as_slice() {
            ["reset"] => ConsoleCommand::ViewReset,
            _ => return Err(CommandError::Usage("view reset")),
        },
        "peek" => match words.as_slice() {
            ["on"] => ConsoleCommand::Peek(true),
            ["off"] => ConsoleCommand::Peek(false),
            _ => return Err(CommandError::Usage("peek on|off")),
        },
        "dismiss" => ConsoleCommand::Dismiss,
        "reset" => ConsoleCommand::Reset,
        "save" => ConsoleCommand::Save(rest.filter(|dir| !dir.is_empty()).map(PathBuf::from)),
        "export" => ConsoleCommand::Export,
        "status" => ConsoleCommand::Status,
        "tools" => ConsoleCommand::Tools,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}
