//! VISA transport for real hardware.
//!
//! Wraps a `visa-rs` session behind the [`ScpiTransport`] trait. All I/O is
//! blocking; the session enforces whatever timeout it was opened with.
//!
//! Resource strings follow the usual VISA forms:
//! - `USB0::0x0699::0x03C7::C012345::INSTR` (USB, the common case for a
//!   bench TBS1000)
//! - `TCPIP0::192.168.1.100::INSTR` (Ethernet/LXI)

use std::ffi::CString;
use std::io::{Read, Write};

use anyhow::{Context, Result};
use log::debug;
use visa_rs::enums::attribute::AttrTmoValue;
use visa_rs::prelude::*;

use super::{parse_ieee_block, ScpiTransport};

/// Blocking [`ScpiTransport`] over a VISA session.
pub struct VisaTransport {
    session: Instrument,
    resource_string: String,
}

impl VisaTransport {
    /// Open the VISA resource and clear the instrument's event status
    /// register (`*cls`), leaving it in a known state.
    pub fn open(resource_string: &str, timeout_ms: u32) -> Result<Self> {
        let rm = DefaultRM::new().context("Failed to create VISA resource manager")?;
        let c_string = CString::new(resource_string).context("Failed to create CString")?;
        let visa_string = visa_rs::VisaString::from(c_string);
        let session = rm
            .open(&visa_string, AccessMode::NO_LOCK, TIMEOUT_IMMEDIATE)
            .with_context(|| format!("Failed to open VISA resource: {resource_string}"))?;
        session
            .set_attr(
                AttrTmoValue::new_checked(timeout_ms)
                    .context("Invalid VISA timeout value")?
                    .into(),
            )
            .context("Failed to set VISA timeout")?;

        let mut transport = Self {
            session,
            resource_string: resource_string.to_string(),
        };
        transport.write("*cls")?;
        debug!("VISA resource '{resource_string}' opened with {timeout_ms}ms timeout");
        Ok(transport)
    }

    /// The resource string this transport was opened with.
    pub fn resource_string(&self) -> &str {
        &self.resource_string
    }

    fn read_until(&mut self, complete: impl Fn(&[u8]) -> bool) -> Result<Vec<u8>> {
        let mut reply = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = self
                .session
                .read(&mut buf)
                .with_context(|| format!("VISA read failed on '{}'", self.resource_string))?;
            reply.extend_from_slice(&buf[..n]);
            if n == 0 || complete(&reply) {
                break;
            }
        }
        Ok(reply)
    }
}

/// A curve payload may contain raw `\n` bytes, so completion is judged by
/// the block header's declared length, not by a terminator.
fn block_complete(reply: &[u8]) -> bool {
    let Some(start) = reply.iter().position(|&b| b == b'#') else {
        return false;
    };
    let Some(&digits) = reply.get(start + 1) else {
        return false;
    };
    if !digits.is_ascii_digit() || digits == b'0' {
        // Malformed header; stop reading and let the parser report it.
        return true;
    }
    let digits = (digits - b'0') as usize;
    let Some(len_field) = reply.get(start + 2..start + 2 + digits) else {
        return false;
    };
    match std::str::from_utf8(len_field).ok().and_then(|s| s.parse::<usize>().ok()) {
        Some(length) => reply.len() >= start + 2 + digits + length,
        None => true,
    }
}

impl ScpiTransport for VisaTransport {
    fn write(&mut self, command: &str) -> Result<()> {
        self.session
            .write_all(format!("{command}\n").as_bytes())
            .with_context(|| format!("VISA write failed for: {command}"))?;
        debug!("VISA command sent: {command}");
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String> {
        self.write(command)?;
        let reply = self.read_until(|r| r.ends_with(b"\n"))?;
        let reply = String::from_utf8_lossy(&reply).trim().to_string();
        debug!("VISA query '{command}' -> '{reply}'");
        Ok(reply)
    }

    fn query_binary(&mut self, command: &str) -> Result<Vec<i8>> {
        self.write(command)?;
        let reply = self.read_until(block_complete)?;
        parse_ieee_block(&reply)
            .with_context(|| format!("Failed to parse binary reply for: {command}"))
    }

    fn is_connected(&self) -> bool {
        // An open session is a connected session; drop closes it.
        true
    }
}
