//! Oscilloscope drivers.
//!
//! One driver today: the Tektronix TBS1000-series bench scope used by the
//! lock-in measurement workflows. The driver is generic over
//! [`crate::transport::ScpiTransport`], so the same acquisition logic runs
//! against real hardware and the mock transport.

pub mod tbs1000;

pub use tbs1000::{Channel, ScopeSetup, Tbs1000};
