//! Reading the SSID of the currently associated wireless network

use async_trait::async_trait;
use tokio::process::Command;

/// Placeholder some platforms report when the SSID is hidden from the caller
const UNKNOWN_SSID: &str = "<unknown ssid>";

/// Source of the current SSID.
///
/// Returns `None` when not associated with a wireless network, when the name
/// cannot be resolved, or when the process lacks permission to read it.
/// Callers cannot tell these apart.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SsidSource: Send + Sync + std::fmt::Debug {
    async fn current_ssid(&self) -> Option<String>;
}

/// Reads the SSID using the platform's wireless tooling
#[derive(Debug, Clone, Default)]
pub struct SystemSsidSource {
    interface: Option<String>,
}

impl SystemSsidSource {
    pub fn new(interface: Option<String>) -> Self {
        Self { interface }
    }
}

#[async_trait]
impl SsidSource for SystemSsidSource {
    async fn current_ssid(&self) -> Option<String> {
        match read_ssid(self.interface.as_deref()).await {
            Ok(ssid) => ssid,
            Err(e) => {
                tracing::debug!("Could not read SSID: {}", e);
                None
            }
        }
    }
}

#[cfg(target_os = "linux")]
async fn read_ssid(interface: Option<&str>) -> std::io::Result<Option<String>> {
    let mut command = Command::new("iw");
    command.arg("dev");
    if let Some(interface) = interface {
        command.arg(interface).arg("info");
    }
    let output = command.output().await?;
    if !output.status.success() {
        tracing::debug!(
            "iw exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Ok(None);
    }
    Ok(parse_iw_output(&String::from_utf8_lossy(&output.stdout)))
}

#[cfg(target_os = "macos")]
async fn read_ssid(interface: Option<&str>) -> std::io::Result<Option<String>> {
    let output = Command::new("/usr/sbin/networksetup")
        .arg("-getairportnetwork")
        .arg(interface.unwrap_or("en0"))
        .output()
        .await?;
    if !output.status.success() {
        return Ok(None);
    }
    Ok(parse_networksetup_output(&String::from_utf8_lossy(
        &output.stdout,
    )))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
async fn read_ssid(_interface: Option<&str>) -> std::io::Result<Option<String>> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "SSID lookup is not supported on this platform",
    ))
}

/// Extract the first `ssid <name>` line from `iw dev` output
pub fn parse_iw_output(data: &str) -> Option<String> {
    data.lines()
        .filter_map(|line| line.trim().strip_prefix("ssid "))
        .find_map(normalize_ssid)
}

/// Extract the network name from `networksetup -getairportnetwork` output
pub fn parse_networksetup_output(data: &str) -> Option<String> {
    data.lines()
        .filter_map(|line| line.trim().strip_prefix("Current Wi-Fi Network:"))
        .find_map(normalize_ssid)
}

/// Strip quoting and map platform placeholders to `None`
pub fn normalize_ssid(raw: &str) -> Option<String> {
    let ssid = raw.trim().replace('"', "");
    if ssid.is_empty() || ssid == UNKNOWN_SSID {
        None
    } else {
        Some(ssid)
    }
}
