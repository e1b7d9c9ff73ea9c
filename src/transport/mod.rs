//! Instrument transport abstraction.
//!
//! The acquisition logic depends only on the [`ScpiTransport`] trait; the
//! concrete adapters live in submodules. The VISA adapter talks to real
//! hardware and is feature-gated, the mock adapter is always available for
//! tests and offline development.

pub mod mock;

#[cfg(feature = "instrument_visa")]
pub mod visa;

pub use mock::MockTransport;

#[cfg(feature = "instrument_visa")]
pub use visa::VisaTransport;

use anyhow::{anyhow, Result};

/// Blocking SCPI transport consumed by the scope driver.
///
/// Every call blocks until the instrument responds; the trait takes
/// `&mut self` so the type system serializes access to the underlying
/// session. Adapters report failures as `anyhow::Error`, which the driver
/// wraps into its own error type.
pub trait ScpiTransport {
    /// Send a command, no reply expected.
    fn write(&mut self, command: &str) -> Result<()>;

    /// Send a query and return the reply as trimmed text.
    fn query(&mut self, command: &str) -> Result<String>;

    /// Send a query whose reply is an IEEE 488.2 definite-length block of
    /// signed bytes.
    fn query_binary(&mut self, command: &str) -> Result<Vec<i8>>;

    /// Whether the underlying session is open.
    fn is_connected(&self) -> bool;
}

/// Parse an IEEE 488.2 definite-length block (`#<d><len><data>`) into
/// signed bytes.
///
/// Leading bytes before `#` are skipped; a trailing terminator after the
/// payload is ignored.
pub fn parse_ieee_block(reply: &[u8]) -> Result<Vec<i8>> {
    let start = reply
        .iter()
        .position(|&b| b == b'#')
        .ok_or_else(|| anyhow!("binary reply has no block header"))?;

    let digits = *reply
        .get(start + 1)
        .ok_or_else(|| anyhow!("binary block header truncated"))?;
    if !digits.is_ascii_digit() || digits == b'0' {
        return Err(anyhow!(
            "unsupported binary block header '#{}'",
            char::from(digits)
        ));
    }
    let digits = (digits - b'0') as usize;

    let len_field = reply
        .get(start + 2..start + 2 + digits)
        .ok_or_else(|| anyhow!("binary block length field truncated"))?;
    let length: usize = std::str::from_utf8(len_field)?
        .parse()
        .map_err(|_| anyhow!("binary block length field is not numeric"))?;

    let data_start = start + 2 + digits;
    let data = reply
        .get(data_start..data_start + length)
        .ok_or_else(|| anyhow!("binary block payload truncated"))?;

    Ok(data.iter().map(|&b| b as i8).collect())
}
