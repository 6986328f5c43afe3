//! NetworkManager observer driven by `nmcli monitor`

use std::process::Stdio;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::observer::{NetworkObserver, ObserverSignal, SignalSender};

/// Follows `nmcli monitor` and signals on wireless state lines
#[derive(Debug)]
pub struct NmcliObserver {
    program: String,
    interface: Option<String>,
    running: Mutex<Option<CancellationToken>>,
}

impl Default for NmcliObserver {
    fn default() -> Self {
        Self::with_program("nmcli")
    }
}

impl NmcliObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable in place of `nmcli`
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            interface: None,
            running: Mutex::new(None),
        }
    }

    /// Only react to device lines for this interface
    pub fn with_interface(mut self, interface: Option<String>) -> Self {
        self.interface = interface;
        self
    }
}

/// Whether a line of `nmcli monitor` output can mean the SSID changed.
///
/// Connectivity and primary connection lines always count. Device lines
/// (`<device>: <state>`) count for `interface` when one is given, otherwise
/// for devices named `wl*`.
pub fn is_wifi_state_line(line: &str, interface: Option<&str>) -> bool {
    let line = line.trim();
    if line.contains(" is now ") || line.contains("primary connection") {
        return true;
    }

    match line.split_once(": ") {
        Some((device, _)) if !device.contains(' ') => match interface {
            Some(interface) => device == interface,
            None => device.starts_with("wl"),
        },
        _ => false,
    }
}

#[async_trait]
impl NetworkObserver for NmcliObserver {
    async fn start(&self, signals: SignalSender) -> crate::Result<()> {
        let mut child = Command::new(&self.program)
            .arg("monitor")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                crate::SsidLoggerError::ObserverRegistration(format!(
                    "Could not start '{} monitor': {}",
                    self.program, e
                ))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            crate::SsidLoggerError::ObserverRegistration(format!(
                "'{} monitor' has no stdout",
                self.program
            ))
        })?;

        let cancel = CancellationToken::new();
        if let Ok(mut running) = self.running.lock() {
            if let Some(previous) = running.replace(cancel.clone()) {
                previous.cancel();
            }
        }

        let interface = self.interface.clone();
        tracing::debug!("Following '{} monitor'", self.program);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                tokio::select! {
                    line = lines.next_line() => match line {
                        Ok(Some(line)) => {
                            if !is_wifi_state_line(&line, interface.as_deref()) {
                                continue;
                            }
                            tracing::debug!("nmcli: {}", line.trim());
                            if signals.send(ObserverSignal::NetworkChanged).is_err() {
                                break;
                            }
                        }
                        Ok(None) => {
                            tracing::warn!("nmcli monitor exited, wifi changes go unnoticed");
                            break;
                        }
                        Err(e) => {
                            tracing::warn!("Reading nmcli monitor output failed: {}", e);
                            break;
                        }
                    },
                    _ = cancel.cancelled() => break,
                }
            }
            if let Err(e) = child.kill().await {
                tracing::debug!("Stopping nmcli monitor: {}", e);
            }
        });

        Ok(())
    }

    async fn stop(&self) {
        let token = self
            .running
            .lock()
            .ok()
            .and_then(|mut running| running.take());
        if let Some(token) = token {
            token.cancel();
        }
    }
}
