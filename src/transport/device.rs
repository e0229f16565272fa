//! # Device-Link Transport
//!
//! Writes to a serial-like device node, typically a Bluetooth printer bound
//! to `/dev/rfcommN`.
//!
//! ## Bluetooth Setup (Linux)
//!
//! ```bash
//! $ bluetoothctl
//! [bluetooth]# pair 00:11:62:XX:XX:XX
//! $ sudo rfcomm bind 0 00:11:62:XX:XX:XX
//! # This creates /dev/rfcomm0
//! ```
//!
//! A profile may name either the device node or the MAC address; a MAC is
//! resolved to its bound rfcomm node.
//!
//! ## TTY Configuration
//!
//! TTY nodes are switched to raw mode so binary data passes unmodified:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, etc. cleared
//! - **No software flow control**: IXON, IXOFF, IXANY cleared
//! - **No output processing**: OPOST cleared (no CR/LF translation)
//! - **8-bit characters**: CS8, no parity
//! - **Non-canonical, no echo**: ICANON, ECHO, ECHONL, ISIG, IEXTEN cleared
//!
//! ## Chunked Writes
//!
//! The payload is written `mtu` bytes at a time with a short pause between
//! writes so small printer buffers are not overrun.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::Transport;
use crate::error::{DocketError, Result};

/// Default rfcomm device path
pub const DEFAULT_DEVICE: &str = "/dev/rfcomm0";

pub struct DeviceLinkTransport {
    device: PathBuf,
    mtu: usize,
    write_delay: Duration,
}

impl DeviceLinkTransport {
    pub fn new(device: impl Into<PathBuf>, mtu: usize, write_delay: Duration) -> Self {
        Self {
            device: device.into(),
            mtu: mtu.max(1),
            write_delay,
        }
    }

    pub fn device(&self) -> &Path {
        &self.device
    }
}

#[async_trait]
impl Transport for DeviceLinkTransport {
    fn kind(&self) -> &'static str {
        "device-link"
    }

    async fn send(&self, payload: &[u8]) -> Result<()> {
        let path = &self.device;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .open(path)
            .await
            .map_err(|e| {
                DocketError::Transport(format!("Failed to open {}: {}", path.display(), e))
            })?;

        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            let fd = file.as_raw_fd();
            // SAFETY: fd is a valid open descriptor owned by `file`
            if unsafe { libc::isatty(fd) } == 1 {
                configure_tty_raw(fd)?;
            }
        }

        let chunks = payload.chunks(self.mtu);
        let count = chunks.len();
        for (i, chunk) in chunks.enumerate() {
            file.write_all(chunk)
                .await
                .map_err(|e| DocketError::Transport(format!("Write failed: {}", e)))?;

            if i + 1 < count && !self.write_delay.is_zero() {
                tokio::time::sleep(self.write_delay).await;
            }
        }

        file.flush()
            .await
            .map_err(|e| DocketError::Transport(format!("Flush failed: {}", e)))?;

        debug!(device = %path.display(), bytes = payload.len(), chunks = count, "Device write complete");
        Ok(())
    }
}

/// Configure a file descriptor for raw TTY mode.
///
/// IXON/IXOFF/IXANY must be off: 0x11 (XON) and 0x13 (XOFF) appear in
/// raster data.
#[cfg(unix)]
fn configure_tty_raw(fd: i32) -> Result<()> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    // SAFETY: tcgetattr fills the struct on success
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(DocketError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(DocketError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

// ============================================================================
// RFCOMM HELPERS
// ============================================================================

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return false;
    }
    parts
        .iter()
        .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Map a device identifier to a path: MAC addresses are looked up among
/// bound rfcomm nodes, anything else is taken as a path.
pub fn resolve_device(device: &str) -> Result<PathBuf> {
    if !is_valid_mac(device) {
        return Ok(PathBuf::from(device));
    }
    find_rfcomm_for_mac(device)?.map(PathBuf::from).ok_or_else(|| {
        DocketError::Config(format!(
            "No rfcomm device bound to {}. Run `sudo rfcomm bind 0 {}` first.",
            device, device
        ))
    })
}

/// Find the rfcomm node bound to a MAC address.
///
/// Checks `/proc/net/rfcomm` and falls back to `rfcomm -a`.
#[cfg(unix)]
pub fn find_rfcomm_for_mac(mac: &str) -> Result<Option<String>> {
    let mac_upper = mac.to_uppercase();

    // Lines look like "rfcomm0: XX:XX:XX:XX:XX:XX channel N ..."
    if let Ok(contents) = fs::read_to_string("/proc/net/rfcomm")
        && let Some(path) = device_in_listing(&contents, &mac_upper)
    {
        return Ok(Some(path));
    }

    let output = Command::new("rfcomm")
        .arg("-a")
        .output()
        .map_err(|e| DocketError::Transport(format!("Failed to run 'rfcomm -a': {}", e)))?;

    Ok(device_in_listing(&String::from_utf8_lossy(&output.stdout), &mac_upper))
}

#[cfg(not(unix))]
pub fn find_rfcomm_for_mac(_mac: &str) -> Result<Option<String>> {
    Ok(None)
}

fn device_in_listing(listing: &str, mac_upper: &str) -> Option<String> {
    listing
        .lines()
        .filter(|line| line.to_uppercase().contains(mac_upper))
        .filter_map(|line| line.split(':').next())
        .map(|name| format!("/dev/{}", name.trim()))
        .find(|path| Path::new(path).exists())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file() -> PathBuf {
        let path = std::env::temp_dir().join(format!("docket-link-{}.bin", uuid::Uuid::new_v4()));
        fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_valid_mac_addresses() {
        assert!(is_valid_mac("00:11:22:33:44:55"));
        assert!(is_valid_mac("aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn test_invalid_mac_addresses() {
        assert!(!is_valid_mac("00:11:22:33:44"));
        assert!(!is_valid_mac("00-11-22-33-44-55"));
        assert!(!is_valid_mac("GG:HH:II:JJ:KK:LL"));
        assert!(!is_valid_mac(""));
    }

    #[test]
    fn test_resolve_plain_path() {
        assert_eq!(resolve_device(DEFAULT_DEVICE).unwrap(), PathBuf::from("/dev/rfcomm0"));
    }

    #[test]
    fn test_listing_requires_existing_node() {
        let listing = "rfcomm0: 00:11:22:33:44:55 channel 1 clean\n";
        assert_eq!(device_in_listing(listing, "AA:BB:CC:DD:EE:FF"), None);
    }

    #[tokio::test]
    async fn test_chunked_write_delivers_everything() {
        let path = scratch_file();
        let payload: Vec<u8> = (0..1000).map(|i| (i % 251) as u8).collect();

        let link = DeviceLinkTransport::new(&path, 64, Duration::from_millis(1));
        link.send(&payload).await.unwrap();

        assert_eq!(fs::read(&path).unwrap(), payload);
        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_device_is_transport_error() {
        let link = DeviceLinkTransport::new("/nonexistent/docket/rfcomm9", 20, Duration::ZERO);
        let err = link.send(b"x").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_zero_mtu_is_clamped() {
        let link = DeviceLinkTransport::new(DEFAULT_DEVICE, 0, Duration::ZERO);
        assert_eq!(link.mtu, 1);
    }
}
