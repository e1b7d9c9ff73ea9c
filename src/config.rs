//! Application settings.
//!
//! Settings are layered the usual way: built-in defaults, then an optional
//! TOML file, then environment variables prefixed with `SCOPE_DAQ`
//! (e.g. `SCOPE_DAQ__INSTRUMENT__TIMEOUT_MS=5000`).

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ScopeResult;
use crate::scope::ScopeSetup;

/// Transport-level settings for the VISA connection.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentSettings {
    /// VISA resource string of the scope.
    pub resource_string: String,
    /// Communication timeout in milliseconds.
    pub timeout_ms: u32,
}

/// Top-level settings for the scope workflows.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// VISA connection settings.
    pub instrument: InstrumentSettings,
    /// Known-state setup applied with `--setup`.
    pub setup: ScopeSetup,
}

impl Settings {
    /// Load settings from defaults, an optional file, and the environment.
    pub fn new(path: Option<&str>) -> ScopeResult<Self> {
        let mut builder = Config::builder()
            .set_default(
                "instrument.resource_string",
                "USB0::0x0699::0x03C7::C012345::INSTR",
            )?
            .set_default("instrument.timeout_ms", 10_000)?
            .set_default("setup.horizontal_scale", "5E-3")?
            .set_default("setup.ch1_scale", "50E-3")?
            .set_default("setup.ch2_scale", "2")?
            .set_default("setup.trigger", 2)?;

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        builder = builder.add_source(
            Environment::with_prefix("SCOPE_DAQ")
                .prefix_separator("__")
                .separator("__"),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Channel;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::new(None).unwrap();
        assert_eq!(settings.instrument.timeout_ms, 10_000);
        assert_eq!(settings.setup.trigger, Channel::Ch2);
        assert_eq!(settings.setup.horizontal_scale, "5E-3");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "[instrument]\nresource_string = \"TCPIP0::10.0.0.5::INSTR\"\ntimeout_ms = 2000\n\n\
             [setup]\ntrigger = 1\nch1_scale = \"2\"\n"
        )
        .unwrap();

        let settings = Settings::new(file.path().to_str()).unwrap();
        assert_eq!(settings.instrument.resource_string, "TCPIP0::10.0.0.5::INSTR");
        assert_eq!(settings.instrument.timeout_ms, 2000);
        assert_eq!(settings.setup.trigger, Channel::Ch1);
        assert_eq!(settings.setup.ch1_scale, "2");
        // Untouched keys keep their defaults.
        assert_eq!(settings.setup.ch2_scale, "2");
    }

    #[test]
    fn test_invalid_trigger_channel_rejected() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[setup]\ntrigger = 9\n").unwrap();
        assert!(Settings::new(file.path().to_str()).is_err());
    }
}
