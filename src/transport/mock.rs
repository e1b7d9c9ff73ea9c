//! Scripted in-memory transport for tests and offline development.

use std::collections::HashMap;

use anyhow::{bail, Result};

use super::ScpiTransport;

/// A [`ScpiTransport`] that replays scripted replies and records every
/// command it receives, so tests can assert the exact SCPI sequence.
#[derive(Debug, Default)]
pub struct MockTransport {
    connected: bool,
    replies: HashMap<String, String>,
    curves: HashMap<String, Vec<i8>>,
    selected_source: String,
    commands: Vec<String>,
}

impl MockTransport {
    /// A connected mock with no scripted replies.
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// A mock reporting `is_connected() == false`.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Script the reply for a query command.
    pub fn with_reply(mut self, command: &str, reply: &str) -> Self {
        self.replies.insert(command.to_string(), reply.to_string());
        self
    }

    /// Script the `curve?` payload returned while `source` (e.g. "CH1") is
    /// the selected data source.
    pub fn with_curve(mut self, source: &str, samples: Vec<i8>) -> Self {
        self.curves.insert(source.to_string(), samples);
        self
    }

    /// Script the standard single-acquisition reply set: record length,
    /// the five preamble scalars, and clean status registers.
    pub fn with_preamble(
        self,
        record: usize,
        x_increment: f64,
        x_zero: f64,
        y_multiplier: f64,
        y_zero: f64,
        y_offset: f64,
    ) -> Self {
        self.with_reply("wfmpre:nr_pt?", &record.to_string())
            .with_reply("wfmpre:xincr?", &x_increment.to_string())
            .with_reply("wfmpre:xzero?", &x_zero.to_string())
            .with_reply("wfmpre:ymult?", &y_multiplier.to_string())
            .with_reply("wfmpre:yzero?", &y_zero.to_string())
            .with_reply("wfmpre:yoff?", &y_offset.to_string())
            .with_reply("*esr?", "0")
            .with_reply("allev?", "No events to report")
    }

    /// Every command sent so far, writes and queries alike, in order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl ScpiTransport for MockTransport {
    fn write(&mut self, command: &str) -> Result<()> {
        self.commands.push(command.to_string());
        if let Some(source) = command.strip_prefix("data:source ") {
            self.selected_source = source.to_string();
        }
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String> {
        self.commands.push(command.to_string());
        match self.replies.get(command) {
            Some(reply) => Ok(reply.clone()),
            None => bail!("no scripted reply for '{command}'"),
        }
    }

    fn query_binary(&mut self, command: &str) -> Result<Vec<i8>> {
        self.commands.push(command.to_string());
        match self.curves.get(&self.selected_source) {
            Some(curve) => Ok(curve.clone()),
            None => bail!(
                "no scripted curve for source '{}' ('{command}')",
                self.selected_source
            ),
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_command_order() {
        let mut mock = MockTransport::new().with_reply("*idn?", "TEKTRONIX,TBS1052B");
        mock.write("header 0").unwrap();
        let idn = mock.query("*idn?").unwrap();
        assert_eq!(idn, "TEKTRONIX,TBS1052B");
        assert_eq!(mock.commands(), ["header 0", "*idn?"]);
    }

    #[test]
    fn test_curve_follows_selected_source() {
        let mut mock = MockTransport::new()
            .with_curve("CH1", vec![1, 2])
            .with_curve("CH2", vec![3, 4]);
        mock.write("data:source CH2").unwrap();
        assert_eq!(mock.query_binary("curve?").unwrap(), vec![3, 4]);
        mock.write("data:source CH1").unwrap();
        assert_eq!(mock.query_binary("curve?").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_unscripted_query_fails() {
        let mut mock = MockTransport::new();
        assert!(mock.query("wfmpre:nr_pt?").is_err());
    }
}
