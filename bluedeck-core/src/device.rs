/*!
 * Device Entries
 * Raw listing lines as emitted by the control tool
 */

use std::fmt;

use crate::error::EntryError;

/// One line of `devices` output, kept verbatim.
///
/// The expected shape is `<marker> <address> <name...>`, e.g.
/// `Device AA:BB:CC:DD:EE:FF Phone`. Nothing is validated on construction;
/// the address is only extracted when an action needs it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceEntry(String);

impl DeviceEntry {
    pub fn new(line: impl Into<String>) -> Self {
        Self(line.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Second whitespace-separated field of the line.
    pub fn address(&self) -> Result<&str, EntryError> {
        self.0
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| EntryError::MissingAddress(self.0.clone()))
    }

    /// Everything after the address, if the tool printed a name.
    pub fn name(&self) -> Option<&str> {
        let mut rest = self.0.trim_start();
        for _ in 0..2 {
            let end = rest.find(char::is_whitespace)?;
            rest = rest[end..].trim_start();
        }
        (!rest.is_empty()).then(|| rest.trim_end())
    }

    /// Human label used in notifications: `Phone (AA:BB:...)` or the address alone.
    pub fn label(&self) -> String {
        match (self.name(), self.address()) {
            (Some(name), Ok(address)) => format!("{} ({})", name, address),
            (None, Ok(address)) => address.to_string(),
            (_, Err(_)) => self.0.clone(),
        }
    }
}

impl fmt::Display for DeviceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split `devices` output into entries, dropping blank lines and keeping order.
pub fn parse_listing(stdout: &str) -> Vec<DeviceEntry> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(DeviceEntry::new)
        .collect()
}
