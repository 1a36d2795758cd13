//! Operator console on standard input.
//!
//! Lines typed on stdin are queued and attached to the next frame, so they
//! run through the same command path as commands recorded in a trace.

use std::io::BufRead;

use aerolog_core::runner::{FrameSource, SourceError};
use aerolog_types::TrafficFrame;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Start a thread forwarding non-empty stdin lines into a channel.
///
/// Runs on a detached thread: a blocking stdin read cannot be cancelled
/// and must not hold up runtime shutdown.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("aerolog-console".to_owned())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        let line = line.trim().to_owned();
                        if line.is_empty() {
                            continue;
                        }
                        if tx.send(line).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Console read failed, console disabled");
                        return;
                    }
                }
            }
            debug!("Console input closed");
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Failed to start console thread");
    }
    rx
}

/// Wraps a [`FrameSource`], appending queued console lines to each frame's
/// commands.
pub struct ConsoleSource {
    inner: Box<dyn FrameSource>,
    commands: mpsc::UnboundedReceiver<String>,
}

impl ConsoleSource {
    /// Attach a command queue to a frame source.
    pub fn new(inner: Box<dyn FrameSource>, commands: mpsc::UnboundedReceiver<String>) -> Self {
        Self { inner, commands }
    }
}

impl FrameSource for ConsoleSource {
    fn next_frame(&mut self) -> Result<Option<TrafficFrame>, SourceError> {
        let Some(frame) = self.inner.next_frame()? else {
            return Ok(None);
        };
        let mut queued = Vec::new();
        while let Ok(line) = self.commands.try_recv() {
            queued.push(line);
        }
        if queued.is_empty() {
            return Ok(Some(frame));
        }
        let mut commands = frame.commands().to_vec();
        commands.extend(queued);
        Ok(Some(frame.with_commands(commands)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn queued_lines_follow_recorded_commands() {
        let frames = vec![
            TrafficFrame::empty(1.0).with_commands(vec!["TELEMETRY LIST".to_owned()]),
            TrafficFrame::empty(2.0),
        ];
        let (tx, rx) = mpsc::unbounded_channel();
        let mut source = ConsoleSource::new(Box::new(frames.into_iter()), rx);

        tx.send("TELEMETRY ON".to_owned()).unwrap();
        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.commands(), ["TELEMETRY LIST", "TELEMETRY ON"]);

        let second = source.next_frame().unwrap().unwrap();
        assert!(second.commands().is_empty());
        assert!(source.next_frame().unwrap().is_none());
    }
}
