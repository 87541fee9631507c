//! Server Configuration
//!
//! Defaults suit local play; every field can be overridden from the
//! environment.

use std::net::SocketAddr;
use std::time::Duration;

/// Environment variable names.
pub const ENV_BIND_ADDR: &str = "PONG_BIND_ADDR";
pub const ENV_TICK_RATE: &str = "PONG_TICK_RATE";
pub const ENV_RNG_SEED: &str = "PONG_RNG_SEED";
pub const ENV_OUTBOUND_BUFFER: &str = "PONG_OUTBOUND_BUFFER";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("Invalid value for {name}: {value:?}")]
    Invalid {
        name: &'static str,
        value: String,
    },

    /// A value parsed but is out of range.
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Tick rate for game simulation (Hz).
    pub tick_rate: u32,
    /// Fixed session seed; derived per session when unset.
    pub rng_seed: Option<u64>,
    /// Frames buffered per connection before new ones are dropped.
    pub outbound_buffer: usize,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            tick_rate: crate::TICK_RATE,
            rng_seed: None,
            outbound_buffer: 64,
            version: crate::VERSION.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = parse_var(&lookup, ENV_BIND_ADDR)? {
            config.bind_addr = addr;
        }
        if let Some(rate) = parse_var::<u32, _>(&lookup, ENV_TICK_RATE)? {
            if rate == 0 {
                return Err(ConfigError::Zero { name: ENV_TICK_RATE });
            }
            config.tick_rate = rate;
        }
        if let Some(seed) = parse_var(&lookup, ENV_RNG_SEED)? {
            config.rng_seed = Some(seed);
        }
        if let Some(buffer) = parse_var::<usize, _>(&lookup, ENV_OUTBOUND_BUFFER)? {
            if buffer == 0 {
                return Err(ConfigError::Zero { name: ENV_OUTBOUND_BUFFER });
            }
            config.outbound_buffer = buffer;
        }

        Ok(config)
    }

    /// Duration of one simulation tick.
    pub fn tick_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.tick_rate.max(1) as u64)
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::Invalid { name, value: raw })
        }
    }
}
