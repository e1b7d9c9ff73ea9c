//! Oscilloscope waveform acquisition and phase alignment for lock-in style
//! lab measurements.
//!
//! This crate wraps a SCPI transport (VISA on real hardware) to fetch
//! single-shot waveforms from a Tektronix TBS1000-series bench scope,
//! convert them to physical units, and align two waveforms (or a waveform
//! and a synthetic cosine reference) in phase.
//!
//! Everything is synchronous and blocking: one instrument, one caller, no
//! shared state beyond the transport handle the driver owns.

pub mod config;
pub mod error;
pub mod phase;
pub mod scope;
pub mod storage;
pub mod transport;
pub mod waveform;

pub use error::{ScopeError, ScopeResult};
pub use scope::{Channel, ScopeSetup, Tbs1000};
pub use waveform::{Acquisition, TimeUnit, Waveform};
