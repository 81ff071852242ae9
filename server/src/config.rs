use std::path::PathBuf;
use whiteboard_system::MembershipPolicy;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub sketches_dir: PathBuf,
    /// Static client files, served under `/` when set.
    pub public_dir: Option<PathBuf>,
    pub membership: MembershipPolicy,
    /// Capacity of each connection's outbound channel. A receiver that lets
    /// it fill up is disconnected.
    pub outbound_buffer: usize,
    pub max_sketch_bytes: usize,
}

#[derive(Debug)]
pub struct ConfigError {
    pub key: &'static str,
    pub reason: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.key, self.reason)
    }
}

impl From<ConfigError> for std::io::Error {
    fn from(err: ConfigError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
    }
}

impl std::default::Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            sketches_dir: PathBuf::from("sketches"),
            public_dir: None,
            membership: MembershipPolicy::default(),
            outbound_buffer: 256,
            max_sketch_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = parse("PORT", &port)?;
        }
        if let Some(dir) = lookup("SKETCHES_DIR") {
            config.sketches_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("PUBLIC_DIR").filter(|dir| !dir.trim().is_empty()) {
            config.public_dir = Some(PathBuf::from(dir));
        }
        if let Some(membership) = lookup("ROOM_MEMBERSHIP") {
            config.membership = parse("ROOM_MEMBERSHIP", &membership)?;
        }
        if let Some(buffer) = lookup("OUTBOUND_BUFFER") {
            config.outbound_buffer = parse("OUTBOUND_BUFFER", &buffer)?;
            if config.outbound_buffer == 0 {
                return Err(ConfigError {
                    key: "OUTBOUND_BUFFER",
                    reason: "must be greater than zero".into(),
                });
            }
        }
        if let Some(max) = lookup("MAX_SKETCH_BYTES") {
            config.max_sketch_bytes = parse("MAX_SKETCH_BYTES", &max)?;
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|err| ConfigError {
        key,
        reason: format!("{:?}: {}", value, err),
    })
}
