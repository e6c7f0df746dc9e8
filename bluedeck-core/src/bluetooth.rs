/*!
 * Bluetooth Device Management
 * Device listing and connection control via the bluetoothctl command
 */

use std::io;

use crate::device::{parse_listing, DeviceEntry};
use crate::error::BluetoothError;
use crate::runner::{SystemRunner, ToolOutput, ToolRunner};

pub const DEFAULT_TOOL: &str = "bluetoothctl";

/// Front for the four tool sub-commands the application needs.
///
/// Every call is a single invocation of the tool: a zero exit status is
/// success, anything else is terminal for that call. Nothing is cached and
/// nothing is retried.
#[derive(Debug, Clone)]
pub struct BluetoothManager<R = SystemRunner> {
    program: String,
    runner: R,
}

impl BluetoothManager {
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_runner(program, SystemRunner)
    }
}

impl Default for BluetoothManager {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL)
    }
}

impl<R: ToolRunner> BluetoothManager<R> {
    pub fn with_runner(program: impl Into<String>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Known devices, one entry per non-blank line of `<tool> devices`.
    pub async fn list_devices(&self) -> Result<Vec<DeviceEntry>, BluetoothError> {
        let output = self.invoke(&["devices"]).await?;
        let devices = parse_listing(&output.stdout);
        tracing::debug!("Listed {} devices", devices.len());
        Ok(devices)
    }

    pub async fn connect_device(&self, address: &str) -> Result<(), BluetoothError> {
        tracing::info!("Connecting to device: {}", address);
        self.invoke(&["connect", address]).await.map(|_| ())
    }

    pub async fn disconnect_device(&self, address: &str) -> Result<(), BluetoothError> {
        tracing::info!("Disconnecting device: {}", address);
        self.invoke(&["disconnect", address]).await.map(|_| ())
    }

    /// Callers are expected to list again afterwards; nothing is updated here.
    pub async fn remove_device(&self, address: &str) -> Result<(), BluetoothError> {
        tracing::info!("Removing device: {}", address);
        self.invoke(&["remove", address]).await.map(|_| ())
    }

    async fn invoke(&self, args: &[&str]) -> Result<ToolOutput, BluetoothError> {
        let command = format!("{} {}", self.program, args.join(" "));
        tracing::debug!("Running `{}`", command);

        let output = self
            .runner
            .run(&self.program, args)
            .await
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => BluetoothError::ToolNotFound {
                    program: self.program.clone(),
                },
                _ => BluetoothError::Io {
                    program: self.program.clone(),
                    source,
                },
            })?;

        if output.success {
            return Ok(output);
        }

        let diagnostic = diagnostic_text(&output);
        tracing::warn!("`{}` exited with {}: {}", command, output.status, diagnostic);
        Err(BluetoothError::ToolExecutionFailed {
            command,
            status: output.status,
            diagnostic,
        })
    }
}

// bluetoothctl prints most failures on stdout, so fall back to it.
fn diagnostic_text(output: &ToolOutput) -> String {
    [output.stderr.trim(), output.stdout.trim()]
        .into_iter()
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| output.status.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, ScriptedRunner};
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn manager(runner: &Arc<ScriptedRunner>) -> BluetoothManager<Arc<ScriptedRunner>> {
        BluetoothManager::with_runner(DEFAULT_TOOL, Arc::clone(runner))
    }

    #[tokio::test]
    async fn lists_devices_in_emitted_order() {
        let runner = Arc::new(ScriptedRunner::new().reply(
            "devices",
            Reply::ok("Device AA:BB:CC:DD:EE:FF Phone\nDevice 11:22:33:44:55:66 Laptop\n"),
        ));

        let devices = manager(&runner).list_devices().await.unwrap();

        assert_eq!(
            devices,
            vec![
                DeviceEntry::new("Device AA:BB:CC:DD:EE:FF Phone"),
                DeviceEntry::new("Device 11:22:33:44:55:66 Laptop"),
            ]
        );
        assert_eq!(runner.calls(), vec![vec!["bluetoothctl", "devices"]]);
    }

    #[tokio::test]
    async fn connect_passes_address_token() {
        let runner = Arc::new(ScriptedRunner::new());

        manager(&runner)
            .connect_device("11:22:33:44:55:66")
            .await
            .unwrap();

        assert_eq!(
            runner.calls(),
            vec![vec!["bluetoothctl", "connect", "11:22:33:44:55:66"]]
        );
    }

    #[tokio::test]
    async fn disconnect_and_remove_use_their_subcommands() {
        let runner = Arc::new(ScriptedRunner::new());
        let bluetooth = manager(&runner);

        bluetooth.disconnect_device("AA:BB").await.unwrap();
        bluetooth.remove_device("AA:BB").await.unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                vec!["bluetoothctl", "disconnect", "AA:BB"],
                vec!["bluetoothctl", "remove", "AA:BB"],
            ]
        );
    }

    #[traced_test]
    #[tokio::test]
    async fn nonzero_exit_carries_diagnostic() {
        let runner = Arc::new(
            ScriptedRunner::new().reply("connect", Reply::fail(1, "", "Failed to connect\n")),
        );

        let err = manager(&runner)
            .connect_device("AA:BB:CC:DD:EE:FF")
            .await
            .unwrap_err();

        match &err {
            BluetoothError::ToolExecutionFailed {
                command,
                diagnostic,
                ..
            } => {
                assert_eq!(command, "bluetoothctl connect AA:BB:CC:DD:EE:FF");
                assert_eq!(diagnostic, "Failed to connect");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Failed to connect"));
        assert!(logs_contain("exited with"));
    }

    #[tokio::test]
    async fn stderr_wins_over_stdout_for_diagnostic() {
        let runner = Arc::new(ScriptedRunner::new().reply(
            "remove",
            Reply::fail(1, "Attempting to remove", "Device not available"),
        ));

        let err = manager(&runner).remove_device("AA").await.unwrap_err();

        assert_eq!(err.diagnostic(), Some("Device not available"));
    }

    #[tokio::test]
    async fn silent_failure_reports_exit_status() {
        let runner = Arc::new(ScriptedRunner::new().reply("devices", Reply::fail(2, "", "")));

        let err = manager(&runner).list_devices().await.unwrap_err();

        assert_eq!(err.diagnostic(), Some("exit status: 2"));
    }

    #[tokio::test]
    async fn missing_tool_is_not_found_for_every_operation() {
        let runner = Arc::new(ScriptedRunner::missing());
        let bluetooth = manager(&runner);

        assert!(matches!(
            bluetooth.list_devices().await,
            Err(BluetoothError::ToolNotFound { .. })
        ));
        assert!(matches!(
            bluetooth.connect_device("AA").await,
            Err(BluetoothError::ToolNotFound { .. })
        ));
        assert!(matches!(
            bluetooth.disconnect_device("AA").await,
            Err(BluetoothError::ToolNotFound { .. })
        ));
        assert!(matches!(
            bluetooth.remove_device("AA").await,
            Err(BluetoothError::ToolNotFound { .. })
        ));
        // one attempted spawn per operation, nothing else
        assert_eq!(runner.calls().len(), 4);
    }

    #[tokio::test]
    async fn not_found_message_names_the_tool() {
        let bluetooth = BluetoothManager::new("bluedeck-definitely-not-installed");

        let err = bluetooth.list_devices().await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "bluedeck-definitely-not-installed command not found. Please ensure it is installed."
        );
    }
}
