use bluedeck_core::{BluetoothError, DeviceEntry, EntryError};
use chrono::{DateTime, Local};
use crossterm::event::KeyCode;
use std::collections::VecDeque;
use thiserror::Error;

use crate::worker::{Request, Response};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Connect,
    Disconnect,
    Remove,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Connect => "Connect",
            Action::Disconnect => "Disconnect",
            Action::Remove => "Remove",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Action::Connect => "connect",
            Action::Disconnect => "disconnect",
            Action::Remove => "remove",
        }
    }

    fn success_message(self, device: &DeviceEntry) -> String {
        match self {
            Action::Connect => format!("Connected to device {}", device.label()),
            Action::Disconnect => format!("Disconnected from device {}", device.label()),
            Action::Remove => format!("Removed device {}", device.label()),
        }
    }

    fn failure_message(self, error: &BluetoothError) -> String {
        match self {
            Action::Connect => format!("Error connecting to device: {}", error),
            Action::Disconnect => format!("Error disconnecting from device: {}", error),
            Action::Remove => format!("Error removing device: {}", error),
        }
    }
}

/// Local checks that stop an action before any tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Please select a device to {}.", .0.verb())]
    NoSelection(Action),
    #[error("Cannot {} this device: {}", .0.verb(), .1)]
    Entry(Action, EntryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Validation,
    OperationError,
    OperationSuccess,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub raised_at: DateTime<Local>,
}

impl Notification {
    fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            raised_at: Local::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A request is with the worker; actions stay disabled until it answers.
    AwaitingTool(Option<Action>),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Dispatch(Request),
    Quit,
}

pub struct App {
    pub devices: Vec<DeviceEntry>,
    pub selected: Option<usize>,
    pub tool: String,
    notifications: VecDeque<Notification>,
    phase: Phase,
}

impl App {
    pub fn new(tool: &str) -> Self {
        Self {
            devices: Vec::new(),
            selected: None,
            tool: tool.to_string(),
            notifications: VecDeque::new(),
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Notification currently blocking input, oldest first.
    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.front()
    }

    pub fn acknowledge(&mut self) {
        self.notifications.pop_front();
    }

    pub fn selected_device(&self) -> Option<&DeviceEntry> {
        self.selected.and_then(|i| self.devices.get(i))
    }

    pub fn previous_device(&mut self) {
        if self.devices.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => self.devices.len() - 1,
            Some(i) => i - 1,
        });
    }

    pub fn next_device(&mut self) {
        if self.devices.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1) % self.devices.len(),
            None => 0,
        });
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Control {
        if self.notification().is_some() {
            if matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.acknowledge();
            }
            return Control::Continue;
        }

        match code {
            KeyCode::Char('q') => return Control::Quit,
            _ if self.is_busy() => {}
            KeyCode::Up | KeyCode::Char('k') => self.previous_device(),
            KeyCode::Down | KeyCode::Char('j') => self.next_device(),
            KeyCode::Esc => self.clear_selection(),
            KeyCode::Char('r') => return self.request_refresh().map_or(Control::Continue, Control::Dispatch),
            KeyCode::Char('c') => return self.dispatch(Action::Connect),
            KeyCode::Char('d') => return self.dispatch(Action::Disconnect),
            KeyCode::Char('x') | KeyCode::Delete => return self.dispatch(Action::Remove),
            _ => {}
        }
        Control::Continue
    }

    fn dispatch(&mut self, action: Action) -> Control {
        match self.request_action(action) {
            Ok(Some(request)) => Control::Dispatch(request),
            Ok(None) => Control::Continue,
            Err(e) => {
                self.notify(NotificationKind::Validation, e.to_string());
                Control::Continue
            }
        }
    }

    /// Listing request, unless another request is still in flight.
    pub fn request_refresh(&mut self) -> Option<Request> {
        if self.is_busy() {
            return None;
        }
        self.phase = Phase::AwaitingTool(None);
        Some(Request::ListDevices)
    }

    /// Validate the selection and build the request for `action`.
    /// `Ok(None)` means a request is already in flight.
    pub fn request_action(&mut self, action: Action) -> Result<Option<Request>, ActionError> {
        if self.is_busy() {
            return Ok(None);
        }
        let device = self
            .selected_device()
            .cloned()
            .ok_or(ActionError::NoSelection(action))?;
        device
            .address()
            .map_err(|e| ActionError::Entry(action, e))?;

        tracing::info!("Dispatching {} for {}", action.verb(), device);
        self.phase = Phase::AwaitingTool(Some(action));
        Ok(Some(Request::Device { action, device }))
    }

    pub fn apply(&mut self, response: Response) {
        self.phase = Phase::Idle;

        match response {
            Response::DeviceList(listing) => self.apply_listing(listing),
            Response::Device {
                action,
                device,
                result,
                refreshed,
            } => {
                match result {
                    Ok(()) => self.notify(
                        NotificationKind::OperationSuccess,
                        action.success_message(&device),
                    ),
                    Err(e) => self.notify(NotificationKind::OperationError, action.failure_message(&e)),
                }
                if let Some(listing) = refreshed {
                    self.apply_listing(listing);
                }
            }
        }
    }

    fn apply_listing(&mut self, listing: Result<Vec<DeviceEntry>, BluetoothError>) {
        match listing {
            Ok(devices) => self.replace_devices(devices),
            Err(e) => self.notify(
                NotificationKind::OperationError,
                format!("Error fetching Bluetooth devices: {}", e),
            ),
        }
    }

    /// Swap in a fresh listing. The selection follows the same entry text if
    /// it survived, otherwise it is cleared.
    pub fn replace_devices(&mut self, devices: Vec<DeviceEntry>) {
        let previous = self.selected_device().cloned();
        self.devices = devices;
        self.selected = previous.and_then(|entry| self.devices.iter().position(|d| *d == entry));
    }

    fn notify(&mut self, kind: NotificationKind, message: String) {
        match kind {
            NotificationKind::OperationError => tracing::warn!("{}", message),
            _ => tracing::info!("{}", message),
        }
        self.notifications.push_back(Notification::new(kind, message));
    }
}
