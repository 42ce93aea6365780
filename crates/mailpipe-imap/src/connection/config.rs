//! Connection configuration.

/// Transport security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// Plaintext TCP (port 143). Only sensible for testing or tunnels.
    None,
    /// Implicit TLS from the first byte (port 993).
    #[default]
    Tls,
}

impl Security {
    /// Returns the conventional port for this security mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None => 143,
            Self::Tls => 993,
        }
    }
}

/// IMAP connection configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, security: Security) -> Self {
        Self {
            host: host.into(),
            port,
            security,
        }
    }

    /// Creates a configuration from a `host[:port]` address string; the
    /// port defaults from the security mode when absent.
    #[must_use]
    pub fn from_addr(addr: &str, security: Security) -> Self {
        match addr.rsplit_once(':') {
            Some((host, port)) => match port.parse() {
                Ok(port) => Self::new(host, port, security),
                Err(_) => Self::new(addr, security.default_port(), security),
            },
            None => Self::new(addr, security.default_port(), security),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ports() {
        assert_eq!(Security::None.default_port(), 143);
        assert_eq!(Security::Tls.default_port(), 993);
    }

    #[test]
    fn from_addr_with_port() {
        let config = Config::from_addr("imap.example.com:1143", Security::None);
        assert_eq!(config.host, "imap.example.com");
        assert_eq!(config.port, 1143);
    }

    #[test]
    fn from_addr_without_port() {
        let config = Config::from_addr("imap.example.com", Security::Tls);
        assert_eq!(config.host, "imap.example.com");
        assert_eq!(config.port, 993);
    }

    #[test]
    fn from_addr_with_bad_port_keeps_whole_host() {
        let config = Config::from_addr("odd:name", Security::Tls);
        assert_eq!(config.host, "odd:name");
        assert_eq!(config.port, 993);
    }
}
