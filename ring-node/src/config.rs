//! Configuration loading for ring nodes.
//!
//! Configuration is loaded from a TOML file (default: `ring.toml`). Every
//! key is optional; missing keys fall back to the defaults below. The values
//! are read once at startup and never change while the ring runs.

use ring_core::{Ring, SilenceTimeout};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for a ring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Ring shape.
    #[serde(default)]
    pub ring: RingConfig,
    /// Hold and timeout durations.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Addresses and port bases.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Outbound queue limits.
    #[serde(default)]
    pub queue: QueueConfig,
}

/// Ring shape.
#[derive(Debug, Clone, Deserialize)]
pub struct RingConfig {
    /// Number of nodes N (default: 3).
    #[serde(default = "default_size")]
    pub size: u32,
    /// Node that seeds the ring with the first token (default: 0).
    #[serde(default)]
    pub initiator: u32,
}

/// Protocol timing.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// How long a node holds every token before forwarding, in ms (default: 2).
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
    /// Receive timeout in ms; also the regeneration threshold (default: 1000).
    #[serde(default = "default_recv_timeout_ms")]
    pub recv_timeout_ms: u64,
}

/// Network addressing.
///
/// Node `i` listens for tokens on `base_ring_port + i` and for service
/// commands on `base_admin_port + i`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Host every node binds and sends to (default: 127.0.0.1).
    #[serde(default = "default_host")]
    pub host: IpAddr,
    /// First ring port (default: 30000).
    #[serde(default = "default_base_ring_port")]
    pub base_ring_port: u16,
    /// First administrative port (default: 40000).
    #[serde(default = "default_base_admin_port")]
    pub base_admin_port: u16,
}

/// Outbound queue limits.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Maximum queued messages per node (default: 1024).
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
}

// Default value functions
fn default_size() -> u32 {
    3
}

fn default_hold_ms() -> u64 {
    2
}

fn default_recv_timeout_ms() -> u64 {
    1000
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_base_ring_port() -> u16 {
    30000
}

fn default_base_admin_port() -> u16 {
    40000
}

fn default_queue_capacity() -> usize {
    1024
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            initiator: 0,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            hold_ms: default_hold_ms(),
            recv_timeout_ms: default_recv_timeout_ms(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            base_ring_port: default_base_ring_port(),
            base_admin_port: default_base_admin_port(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<string>"),
            source: e,
        })
    }

    /// Check the configuration before any node starts.
    ///
    /// # Errors
    ///
    /// Returns the first problem found. These errors are fatal at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.ring.size;
        if size == 0 {
            return Err(ConfigError::EmptyRing);
        }
        if self.ring.initiator >= size {
            return Err(ConfigError::InitiatorOutOfRange {
                initiator: self.ring.initiator,
                size,
            });
        }
        if self.timing.recv_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let ring_ports = port_range("ring", self.network.base_ring_port, size)?;
        let admin_ports = port_range("admin", self.network.base_admin_port, size)?;
        if ring_ports.0 <= admin_ports.1 && admin_ports.0 <= ring_ports.1 {
            return Err(ConfigError::PortOverlap {
                ring_base: self.network.base_ring_port,
                admin_base: self.network.base_admin_port,
                size,
            });
        }

        Ok(())
    }

    /// The validated ring.
    pub fn ring(&self) -> Result<Ring, ConfigError> {
        Ring::new(self.ring.size).map_err(|_| ConfigError::EmptyRing)
    }

    /// Per-token hold duration `t`.
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.timing.hold_ms)
    }

    /// Receive timeout `T_recv`.
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.recv_timeout_ms)
    }

    /// Regeneration policy derived from the receive timeout.
    pub fn regeneration_policy(&self) -> SilenceTimeout {
        SilenceTimeout::new(self.recv_timeout())
    }
}

/// First and last port of a block of `size` consecutive ports.
fn port_range(channel: &'static str, base: u16, size: u32) -> Result<(u16, u16), ConfigError> {
    u32::from(base)
        .checked_add(size.saturating_sub(1))
        .and_then(|last| u16::try_from(last).ok())
        .map(|last| (base, last))
        .ok_or(ConfigError::PortOverflow {
            channel,
            base,
            size,
        })
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Ring size is zero.
    #[error("ring size must be greater than zero")]
    EmptyRing,
    /// Initiator is not a member of the ring.
    #[error("initiator {initiator} is outside a ring of {size} nodes")]
    InitiatorOutOfRange {
        /// Configured initiator.
        initiator: u32,
        /// Configured ring size.
        size: u32,
    },
    /// Receive timeout is zero.
    #[error("receive timeout must be greater than zero")]
    ZeroTimeout,
    /// A port block runs past 65535.
    #[error("{channel} ports {base}..{base}+{size} exceed 65535")]
    PortOverflow {
        /// Which channel ("ring" or "admin").
        channel: &'static str,
        /// Configured base port.
        base: u16,
        /// Configured ring size.
        size: u32,
    },
    /// Ring and admin port blocks overlap.
    #[error("ring ports (base {ring_base}) and admin ports (base {admin_base}) overlap for {size} nodes")]
    PortOverlap {
        /// Configured ring base port.
        ring_base: u16,
        /// Configured admin base port.
        admin_base: u16,
        /// Configured ring size.
        size: u32,
    },
}
