//! Listening connectors
//!
//! The supervisor binds the sockets; accepting and serving requests belongs to
//! the host transport, which takes a clone of the listener.

use std::io;
use std::net::{SocketAddr, TcpListener};

/// Address a connector should bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorSpec {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl ConnectorSpec {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
        }
    }

    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// A bound listening socket
#[derive(Debug)]
pub struct Connector {
    spec: ConnectorSpec,
    listener: TcpListener,
}

impl Connector {
    pub fn bind(spec: ConnectorSpec) -> io::Result<Self> {
        let listener = TcpListener::bind(spec.address())?;
        Ok(Self { spec, listener })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &ConnectorSpec {
        &self.spec
    }

    /// Actual bound address (resolves port 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Listener handle for the host transport
    pub fn try_clone_listener(&self) -> io::Result<TcpListener> {
        self.listener.try_clone()
    }

    /// Close the socket.
    pub fn close(self) {
        drop(self.listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_ephemeral_port() {
        let connector = Connector::bind(ConnectorSpec::new("http", "127.0.0.1", 0)).unwrap();
        let addr = connector.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(connector.name(), "http");
        connector.close();
    }

    #[test]
    fn second_bind_on_same_port_fails() {
        let first = Connector::bind(ConnectorSpec::new("http", "127.0.0.1", 0)).unwrap();
        let port = first.local_addr().unwrap().port();
        assert!(Connector::bind(ConnectorSpec::new("http", "127.0.0.1", port)).is_err());
    }

    #[test]
    fn ipv6_address_is_bracketed() {
        assert_eq!(ConnectorSpec::new("http", "::1", 8080).address(), "[::1]:8080");
        assert_eq!(
            ConnectorSpec::new("http", "0.0.0.0", 8080).address(),
            "0.0.0.0:8080"
        );
    }
}
