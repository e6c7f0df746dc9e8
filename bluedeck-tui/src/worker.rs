/*!
 * BLUEDECK Tool Worker
 * Runs bluetoothctl jobs off the interface loop, one at a time
 */

use bluedeck_core::{BluetoothError, BluetoothManager, DeviceEntry, ToolRunner};
use tokio::sync::mpsc;

use crate::app::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListDevices,
    Device { action: Action, device: DeviceEntry },
}

#[derive(Debug)]
pub enum Response {
    DeviceList(Result<Vec<DeviceEntry>, BluetoothError>),
    Device {
        action: Action,
        device: DeviceEntry,
        result: Result<(), BluetoothError>,
        /// Listing taken right after a successful removal.
        refreshed: Option<Result<Vec<DeviceEntry>, BluetoothError>>,
    },
}

pub struct Worker {
    requests: mpsc::Sender<Request>,
    responses: mpsc::UnboundedReceiver<Response>,
}

impl Worker {
    /// Start the worker task. Requests are handled strictly in order and each
    /// one produces exactly one response.
    pub fn spawn<R>(bluetooth: BluetoothManager<R>) -> Self
    where
        R: ToolRunner + 'static,
    {
        let (request_tx, mut request_rx) = mpsc::channel::<Request>(1);
        let (response_tx, response_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let response = execute(&bluetooth, request).await;
                if response_tx.send(response).is_err() {
                    break;
                }
            }
            tracing::debug!("Worker stopped");
        });

        Self {
            requests: request_tx,
            responses: response_rx,
        }
    }

    pub async fn send(&self, request: Request) -> anyhow::Result<()> {
        self.requests
            .send(request)
            .await
            .map_err(|_| anyhow::anyhow!("tool worker has stopped"))
    }

    pub fn try_recv(&mut self) -> Option<Response> {
        self.responses.try_recv().ok()
    }

    #[cfg(test)]
    pub async fn recv(&mut self) -> Option<Response> {
        self.responses.recv().await
    }
}

pub async fn execute<R: ToolRunner>(bluetooth: &BluetoothManager<R>, request: Request) -> Response {
    let (action, device) = match request {
        Request::ListDevices => return Response::DeviceList(bluetooth.list_devices().await),
        Request::Device { action, device } => (action, device),
    };

    let result = match device.address() {
        Ok(address) => match action {
            Action::Connect => bluetooth.connect_device(address).await,
            Action::Disconnect => bluetooth.disconnect_device(address).await,
            Action::Remove => bluetooth.remove_device(address).await,
        },
        Err(e) => Err(e.into()),
    };

    let refreshed = match (&result, action) {
        (Ok(()), Action::Remove) => Some(bluetooth.list_devices().await),
        _ => None,
    };

    Response::Device {
        action,
        device,
        result,
        refreshed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluedeck_core::testing::{Reply, ScriptedRunner};
    use std::sync::Arc;

    fn bluetooth(runner: &Arc<ScriptedRunner>) -> BluetoothManager<Arc<ScriptedRunner>> {
        BluetoothManager::with_runner("bluetoothctl", Arc::clone(runner))
    }

    fn entry(line: &str) -> DeviceEntry {
        DeviceEntry::new(line)
    }

    #[tokio::test]
    async fn successful_remove_lists_again_once() {
        let runner = Arc::new(
            ScriptedRunner::new().reply("devices", Reply::ok("Device 11:22:33:44:55:66 Laptop\n")),
        );

        let response = execute(
            &bluetooth(&runner),
            Request::Device {
                action: Action::Remove,
                device: entry("Device AA:BB:CC:DD:EE:FF Phone"),
            },
        )
        .await;

        assert_eq!(
            runner.calls(),
            vec![
                vec!["bluetoothctl", "remove", "AA:BB:CC:DD:EE:FF"],
                vec!["bluetoothctl", "devices"],
            ]
        );
        match response {
            Response::Device {
                result: Ok(()),
                refreshed: Some(Ok(devices)),
                ..
            } => assert_eq!(devices, vec![entry("Device 11:22:33:44:55:66 Laptop")]),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_remove_does_not_list_again() {
        let runner = Arc::new(
            ScriptedRunner::new().reply("remove", Reply::fail(1, "", "Device not available")),
        );

        let response = execute(
            &bluetooth(&runner),
            Request::Device {
                action: Action::Remove,
                device: entry("Device AA:BB:CC:DD:EE:FF Phone"),
            },
        )
        .await;

        assert_eq!(runner.count("devices"), 0);
        assert!(matches!(
            response,
            Response::Device {
                result: Err(_),
                refreshed: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn connect_and_disconnect_never_list() {
        let runner = Arc::new(ScriptedRunner::new());
        let bluetooth = bluetooth(&runner);

        for action in [Action::Connect, Action::Disconnect] {
            let response = execute(
                &bluetooth,
                Request::Device {
                    action,
                    device: entry("Device AA:BB:CC:DD:EE:FF Phone"),
                },
            )
            .await;
            assert!(matches!(response, Response::Device { refreshed: None, .. }));
        }

        assert_eq!(runner.count("devices"), 0);
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn malformed_entry_never_reaches_the_tool() {
        let runner = Arc::new(ScriptedRunner::new());

        let response = execute(
            &bluetooth(&runner),
            Request::Device {
                action: Action::Connect,
                device: entry("Headphones"),
            },
        )
        .await;

        assert!(runner.calls().is_empty());
        assert!(matches!(
            response,
            Response::Device {
                result: Err(BluetoothError::Entry(_)),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn worker_answers_requests_in_order() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .reply("devices", Reply::ok("Device AA:BB:CC:DD:EE:FF Phone\n"))
                .reply("connect", Reply::fail(1, "Failed to connect", "")),
        );
        let mut worker = Worker::spawn(bluetooth(&runner));

        worker.send(Request::ListDevices).await.unwrap();
        let first = worker.recv().await.unwrap();
        worker
            .send(Request::Device {
                action: Action::Connect,
                device: entry("Device AA:BB:CC:DD:EE:FF Phone"),
            })
            .await
            .unwrap();
        let second = worker.recv().await.unwrap();

        assert!(matches!(first, Response::DeviceList(Ok(ref devices)) if devices.len() == 1));
        assert!(matches!(
            second,
            Response::Device {
                action: Action::Connect,
                result: Err(_),
                ..
            }
        ));
    }
}
