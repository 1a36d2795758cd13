//! The [`LogSink`] trait and shared row formatting.
//!
//! A sink is one append-only named log. Rows are only written while the sink
//! is enabled; rows logged to a disabled sink are dropped, matching the
//! behavior of a logger that has not been switched on from the console.

use aerolog_types::{Field, LogKind};

use crate::error::SinkError;

/// One append-only named log.
pub trait LogSink: Send {
    /// Which of the three logs this sink holds.
    fn kind(&self) -> LogKind;

    /// Whether rows are currently being recorded.
    fn is_enabled(&self) -> bool;

    /// Switch recording on or off.
    ///
    /// Enabling an already enabled sink is a no-op.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), SinkError>;

    /// Append one row stamped with `sim_time`.
    ///
    /// Returns `Ok(false)` without writing when the sink is disabled.
    fn write_row(&mut self, sim_time: f64, fields: &[Field]) -> Result<bool, SinkError>;

    /// Push buffered rows to durable storage.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Render a row as `time, field, field, ...`.
///
/// The timestamp uses two decimals (simulation time in seconds); fields use
/// their own [`Display`](core::fmt::Display) formatting.
pub fn format_row(sim_time: f64, fields: &[Field]) -> String {
    let mut row = format!("{sim_time:.2}");
    for field in fields {
        row.push_str(", ");
        row.push_str(&field.to_string());
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_starts_with_timestamp() {
        let row = format_row(
            12.5,
            &[
                Field::Text("UAV1".to_owned()),
                Field::Text("UAV2".to_owned()),
                Field::Float(30.0),
            ],
        );
        assert_eq!(row, "12.50, UAV1, UAV2, 30.000");
    }

    #[test]
    fn empty_row_is_just_timestamp() {
        assert_eq!(format_row(0.0, &[]), "0.00");
    }
}
