/*!
 * BLUEDECK Core
 * Bluetooth device directory backed by an external control tool
 * Onyx Digital Intelligence Development LLC
 */

pub mod bluetooth;
pub mod config;
pub mod device;
pub mod error;
pub mod runner;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bluetooth::{BluetoothManager, DEFAULT_TOOL};
pub use config::Config;
pub use device::{parse_listing, DeviceEntry};
pub use error::{BluetoothError, ConfigError, EntryError};
pub use runner::{SystemRunner, ToolOutput, ToolRunner};
