//! Tektronix TBS1000-series oscilloscope driver.
//!
//! Single-shot, synchronous waveform acquisition plus the phase-alignment
//! helpers used by the lock-in measurement workflows. All I/O goes through
//! a [`ScpiTransport`], which the driver owns exclusively; the acquisition
//! sequence (stop, configure, arm, read) is not reentrant, and `&mut self`
//! enforces serialized access.
//!
//! ## Configuration
//!
//! With the `instrument_visa` feature, a driver is typically built from the
//! settings file:
//!
//! ```toml
//! [instrument]
//! resource_string = "USB0::0x0699::0x03C7::C012345::INSTR"
//! timeout_ms = 10000
//!
//! [setup]
//! horizontal_scale = "5E-3"
//! ch1_scale = "50E-3"
//! ch2_scale = "2"
//! trigger = 2
//! ```
//!
//! The SCPI command surface is fixed by the instrument firmware and must be
//! preserved byte-for-byte; tests assert the exact sequence emitted.

use log::{info, warn};

use crate::error::{ScopeError, ScopeResult};
use crate::phase::{self, AlignedPair};
use crate::transport::ScpiTransport;
use crate::waveform::{self, Acquisition, TimeUnit, Waveform};

/// An input channel of the scope. The TBS1000 has exactly two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "u8")]
pub enum Channel {
    /// Channel 1.
    Ch1,
    /// Channel 2.
    Ch2,
}

impl Channel {
    /// Channel number as the instrument counts them.
    pub fn number(self) -> u8 {
        match self {
            Channel::Ch1 => 1,
            Channel::Ch2 => 2,
        }
    }

    /// SCPI source name, e.g. `CH1`.
    pub fn source(self) -> String {
        format!("CH{}", self.number())
    }
}

impl TryFrom<u8> for Channel {
    type Error = ScopeError;

    /// Validate a channel number before any instrument I/O happens.
    fn try_from(value: u8) -> ScopeResult<Self> {
        match value {
            1 => Ok(Channel::Ch1),
            2 => Ok(Channel::Ch2),
            other => Err(ScopeError::InvalidChannel(other)),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source())
    }
}

/// Known-state setup applied before a measurement session.
///
/// Scale values are sent verbatim, so they are kept as the exponent-notation
/// strings the instrument expects.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ScopeSetup {
    /// Horizontal scale, time per division in seconds.
    pub horizontal_scale: String,
    /// CH1 vertical scale, volts per division.
    pub ch1_scale: String,
    /// CH2 vertical scale, volts per division.
    pub ch2_scale: String,
    /// Edge trigger source.
    pub trigger: Channel,
}

impl Default for ScopeSetup {
    fn default() -> Self {
        Self {
            horizontal_scale: "5E-3".to_string(),
            ch1_scale: "50E-3".to_string(),
            ch2_scale: "2".to_string(),
            trigger: Channel::Ch2,
        }
    }
}

/// The five scaling scalars read fresh per acquisition. Valid only for the
/// channel they were read with; never cached.
#[derive(Debug, Clone, Copy)]
struct Preamble {
    x_increment: f64,
    x_zero: f64,
    y_multiplier: f64,
    y_zero: f64,
    y_offset: f64,
}

/// Driver for a TBS1000-series scope over any [`ScpiTransport`].
pub struct Tbs1000<T> {
    transport: T,
}

impl<T: ScpiTransport> Tbs1000<T> {
    /// Wrap an already-open transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Release the underlying transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Whether the underlying transport is connected.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Query the instrument identification string; `None` when not
    /// connected.
    pub fn identify(&mut self) -> ScopeResult<Option<String>> {
        if !self.transport.is_connected() {
            return Ok(None);
        }
        Ok(Some(self.transport.query("*idn?")?))
    }

    /// Reset the scope to a known state and apply the given setup.
    ///
    /// Each write is followed by an `*opc?` completion query so the next
    /// command is not issued while the previous one is still executing.
    /// Returns `Ok(false)` without touching the instrument when it is not
    /// connected.
    pub fn configure(&mut self, setup: &ScopeSetup) -> ScopeResult<bool> {
        if !self.transport.is_connected() {
            info!("Tektronix TBS scope is not connected!");
            return Ok(false);
        }
        self.write_and_wait("*rst")?;
        self.write_and_wait("autoset EXECUTE")?;
        self.write_and_wait(&format!("HORIZONTAL:MAIN:SCALE {}", setup.horizontal_scale))?;
        self.write_and_wait("CH1:COUPLING AC")?;
        self.write_and_wait(&format!("CH1:SCALE {}", setup.ch1_scale))?;
        self.write_and_wait(&format!("CH2:SCALE {}", setup.ch2_scale))?;
        self.write_and_wait(&format!("TRIGGER:MAIN:EDGE:SOURCE {}", setup.trigger))?;
        info!("Scope configured: {setup:?}");
        Ok(true)
    }

    /// Measured period of the waveform on `channel`, in seconds.
    pub fn period(&mut self, channel: Channel) -> ScopeResult<f64> {
        self.immediate_measurement("PERiod", channel)
    }

    /// Measured frequency of the waveform on `channel`, in Hz.
    pub fn frequency(&mut self, channel: Channel) -> ScopeResult<f64> {
        self.immediate_measurement("FREQuency", channel)
    }

    /// Fetch one single-shot waveform from `channel`, scaled to physical
    /// units with the time axis in `unit`.
    ///
    /// Returns `Ok(None)` when the instrument is not connected. A
    /// zero-sample capture yields empty vectors, not an error.
    pub fn acquire(&mut self, channel: Channel, unit: TimeUnit) -> ScopeResult<Option<Acquisition>> {
        if !self.transport.is_connected() {
            return Ok(None);
        }
        self.configure_readout(channel)?;
        self.arm_single_sequence()?;
        Ok(Some(self.read_scaled(unit)?))
    }

    /// Fetch both channels from a single trigger event.
    ///
    /// The acquisition is armed once; each channel is then configured, read
    /// and status-checked back-to-back without re-arming, so both waveforms
    /// come from the same captured buffer. Results are in channel order.
    /// Returns `Ok(None)` when the instrument is not connected.
    pub fn acquire_both(&mut self, unit: TimeUnit) -> ScopeResult<Option<[Acquisition; 2]>> {
        if !self.transport.is_connected() {
            return Ok(None);
        }
        self.configure_readout(Channel::Ch1)?;
        self.arm_single_sequence()?;
        let first = self.read_scaled(unit)?;
        self.configure_readout(Channel::Ch2)?;
        let second = self.read_scaled(unit)?;
        Ok(Some([first, second]))
    }

    /// Shift `second` against `first` by `phase_deg` degrees using
    /// sample-domain shifting, measuring the period of `channel` (the
    /// channel the shifted waveform was captured from) to convert degrees
    /// into samples.
    ///
    /// Alignment accuracy is bounded by `360 / samples_per_period` degrees;
    /// see [`crate::phase`]. A zero sample shift passes the data through
    /// unmodified.
    pub fn phase_shift(
        &mut self,
        time: &[f64],
        first: &[f64],
        second: &[f64],
        total_time: f64,
        phase_deg: f64,
        channel: Channel,
    ) -> ScopeResult<AlignedPair> {
        let period = self.period(channel)?;
        Ok(phase::align_by_phase(
            time, first, second, total_time, period, phase_deg,
        ))
    }

    /// Build a noise-free analytic reference `cos(2*pi*f*t + phi)` over the
    /// time axis of `reference`, with `f` measured on `channel`.
    pub fn reference_waveform(
        &mut self,
        reference: &Waveform,
        channel: Channel,
        phase_deg: f64,
    ) -> ScopeResult<Waveform> {
        let frequency = self.frequency(channel)?;
        Ok(phase::synthetic_reference_waveform(
            reference, frequency, phase_deg,
        ))
    }

    fn write_and_wait(&mut self, command: &str) -> ScopeResult<()> {
        self.transport.write(command)?;
        self.transport.query("*opc?")?;
        Ok(())
    }

    fn immediate_measurement(&mut self, kind: &str, channel: Channel) -> ScopeResult<f64> {
        self.transport
            .write(&format!("MEASUrement:IMMed:TYPE {kind}"))?;
        self.transport
            .write(&format!("MEASUrement:IMMed:SOUrce {channel}"))?;
        let reply = self.transport.query("MEASUrement:IMMed:VALue?")?;
        reply.trim().parse().map_err(|_| ScopeError::Parse {
            field: "MEASUrement:IMMed:VALue?",
            reply,
        })
    }

    /// Configure binary single-byte readout of `channel` and return the
    /// record length.
    fn configure_readout(&mut self, channel: Channel) -> ScopeResult<usize> {
        self.transport.write("header 0")?;
        self.transport.write("data:encdg RIBINARY")?;
        self.transport.write(&format!("data:source {channel}"))?;
        self.transport.write("data:start 1")?;
        let reply = self.transport.query("wfmpre:nr_pt?")?;
        let record: usize = reply.trim().parse().map_err(|_| ScopeError::Parse {
            field: "wfmpre:nr_pt?",
            reply,
        })?;
        self.transport.write(&format!("data:stop {record}"))?;
        self.transport.write("wfmpre:byt_nr 1")?;
        Ok(record)
    }

    /// Stop, select single-sequence mode, run: exactly one acquisition
    /// cycle, no partial or streaming capture.
    fn arm_single_sequence(&mut self) -> ScopeResult<()> {
        self.transport.write("acquire:state 0")?;
        self.transport.write("acquire:stopafter SEQUENCE")?;
        self.transport.write("acquire:state 1")?;
        Ok(())
    }

    /// Read the raw curve and preamble for the currently selected source
    /// and scale both axes.
    fn read_scaled(&mut self, unit: TimeUnit) -> ScopeResult<Acquisition> {
        let raw = self.transport.query_binary("curve?")?;
        let preamble = self.read_preamble()?;
        self.check_events()?;

        let count = raw.len();
        let total_time = preamble.x_increment * count as f64;
        let time = waveform::time_axis(
            preamble.x_zero * unit.per_second(),
            preamble.x_increment * unit.per_second(),
            count,
        );
        let amplitude = waveform::scale_amplitudes(
            &raw,
            preamble.y_offset,
            preamble.y_multiplier,
            preamble.y_zero,
        );

        Ok(Acquisition {
            waveform: Waveform {
                time,
                amplitude,
                unit,
            },
            total_time,
        })
    }

    fn read_preamble(&mut self) -> ScopeResult<Preamble> {
        Ok(Preamble {
            x_increment: self.query_f64("wfmpre:xincr?")?,
            x_zero: self.query_f64("wfmpre:xzero?")?,
            y_multiplier: self.query_f64("wfmpre:ymult?")?,
            y_zero: self.query_f64("wfmpre:yzero?")?,
            y_offset: self.query_f64("wfmpre:yoff?")?,
        })
    }

    /// Check the event status register and the event queue. Non-zero
    /// status is advisory: it is logged and the acquisition still returns
    /// its data.
    fn check_events(&mut self) -> ScopeResult<()> {
        let reply = self.transport.query("*esr?")?;
        let esr: u8 = reply.trim().parse().map_err(|_| ScopeError::Parse {
            field: "*esr?",
            reply,
        })?;
        if esr != 0 {
            warn!("event status register: 0b{esr:08b}");
        }
        let events = self.transport.query("allev?")?;
        if !events.contains("No events") {
            warn!("all event messages: {}", events.trim());
        }
        Ok(())
    }

    fn query_f64(&mut self, field: &'static str) -> ScopeResult<f64> {
        let reply = self.transport.query(field)?;
        reply
            .trim()
            .parse()
            .map_err(|_| ScopeError::Parse { field, reply })
    }
}
