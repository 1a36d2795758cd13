//! The `TELEMETRY` console command.
//!
//! Operators interact with the recorder through a single command word with
//! one argument:
//!
//! - `TELEMETRY LIST` reports the three log names;
//! - `TELEMETRY ON` enables all three logs.
//!
//! Any other argument fails with a fixed help text and changes nothing.
//! Arguments are matched after trimming, ignoring ASCII case.

use aerolog_sink::{LogSet, SinkError};
use aerolog_types::LogKind;
use tracing::{info, warn};

/// The command word handled by [`dispatch`].
pub const COMMAND_WORD: &str = "TELEMETRY";

/// Help text returned for unrecognized arguments.
pub const HELP_TEXT: &str = "Available commands are: LIST, ON";

/// Something whose logs can be switched on by name.
///
/// [`LogSet`] is the production implementation; tests substitute recorders.
pub trait LoggerControl {
    /// Switch the named log on.
    fn enable_log(&mut self, kind: LogKind) -> Result<(), SinkError>;
}

impl LoggerControl for LogSet {
    fn enable_log(&mut self, kind: LogKind) -> Result<(), SinkError> {
        self.enable(kind)
    }
}

/// Result of executing a console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Whether the command was recognized and carried out.
    pub success: bool,
    /// Human-readable reply for the console.
    pub message: String,
}

impl CommandOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

fn log_names() -> String {
    LogKind::ALL
        .iter()
        .map(|kind| kind.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Execute the argument of a `TELEMETRY` command.
pub fn execute(control: &mut dyn LoggerControl, arg: &str) -> CommandOutcome {
    let arg = arg.trim();
    if arg.eq_ignore_ascii_case("LIST") {
        return CommandOutcome::ok(format!("Available data loggers: {}", log_names()));
    }

    if arg.eq_ignore_ascii_case("ON") {
        for kind in LogKind::ALL {
            if let Err(err) = control.enable_log(kind) {
                warn!(logger = kind.name(), error = %err, "Failed to enable logger");
                return CommandOutcome::failed(format!(
                    "Failed to enable {}: {err}",
                    kind.name()
                ));
            }
        }
        info!("Telemetry logging switched on");
        return CommandOutcome::ok(format!("Data loggers enabled: {}", log_names()));
    }

    CommandOutcome::failed(HELP_TEXT)
}

/// Execute a full console line such as `"TELEMETRY ON"`.
///
/// Returns `None` when the line is not a `TELEMETRY` command. A bare
/// `TELEMETRY` without an argument is treated as an unknown argument.
pub fn dispatch(control: &mut dyn LoggerControl, line: &str) -> Option<CommandOutcome> {
    let line = line.trim();
    let (word, arg) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    if !word.eq_ignore_ascii_case(COMMAND_WORD) {
        return None;
    }
    Some(execute(control, arg))
}
