//! SMTP server: accepts connections and runs each one on its own thread

use std::io::BufReader;
use std::net::{Shutdown, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, info_span, warn};

use crate::config::ServerConfig;
use crate::delivery::{DeliveryRouter, MxResolver};
use crate::smtp::connection::Connection;
use crate::smtp::error::SmtpError;

/// Main SMTP server, one thread per accepted connection
#[derive(Clone)]
pub struct SmtpServer {
    config: Arc<ServerConfig>,
    router: Arc<DeliveryRouter>,
}

impl SmtpServer {
    /// Create a new SMTP server that relays via `resolver`
    pub fn new(config: ServerConfig, resolver: Arc<dyn MxResolver>) -> Self {
        let router = DeliveryRouter::new(&config, resolver);
        Self {
            config: Arc::new(config),
            router: Arc::new(router),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind to `addr` and serve forever (blocking)
    pub fn start(&self, addr: impl ToSocketAddrs) -> Result<(), SmtpError> {
        let listener = TcpListener::bind(addr)?;
        self.start_with_listener(listener)
    }

    /// Serve connections from an existing listener (blocking)
    pub fn start_with_listener(&self, listener: TcpListener) -> Result<(), SmtpError> {
        info!("SMTP server listening on {}", listener.local_addr()?);

        // Only used to report how many connections are live
        let mut workers: Vec<JoinHandle<()>> = Vec::new();

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    workers.retain(|worker| !worker.is_finished());
                    match self.spawn_connection(stream) {
                        Ok(worker) => workers.push(worker),
                        Err(e) => error!("Error spawning connection thread: {e}"),
                    }
                    debug!(active = workers.len(), "connection threads");
                }
                Err(e) => {
                    error!("Error accepting connection: {e}");
                }
            }
        }

        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream) -> std::io::Result<JoinHandle<()>> {
        let config = Arc::clone(&self.config);
        let router = Arc::clone(&self.router);

        thread::Builder::new()
            .name("smtp-connection".to_owned())
            .spawn(move || {
                if let Err(e) = handle_client(stream, &config, &router) {
                    warn!("Error handling client: {e}");
                }
            })
    }
}

/// Run one client connection to completion and close it
pub fn handle_client(
    stream: TcpStream,
    config: &ServerConfig,
    router: &DeliveryRouter,
) -> Result<(), SmtpError> {
    let peer = stream.peer_addr()?;
    let span = info_span!("connection", %peer);
    let _enter = span.enter();
    info!("accepted connection");

    let reader = BufReader::new(stream.try_clone()?);
    let result = Connection::new(reader, &stream, config, router).run();

    let _ = stream.shutdown(Shutdown::Both);
    debug!("connection closed");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::DnsError;
    use std::io::{BufRead, Write};
    use std::time::Duration;

    fn no_mx(domain: &str) -> Result<String, DnsError> {
        Err(DnsError::NoMailExchanger(domain.to_string()))
    }

    fn start_test_server(config: ServerConfig) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = SmtpServer::new(config, Arc::new(no_mx));

        thread::spawn(move || server.start_with_listener(listener));

        addr
    }

    #[test]
    fn test_server_creation() {
        let server = SmtpServer::new(ServerConfig::new("test.local"), Arc::new(no_mx));
        assert_eq!(server.config().hostname, "test.local");
    }

    #[test]
    fn test_connections_are_served_concurrently() {
        let addr = start_test_server(ServerConfig::new("test.local"));

        // The first client stays connected while the second is served
        let idle = TcpStream::connect(&addr).unwrap();
        let mut idle_reader = std::io::BufReader::new(idle.try_clone().unwrap());
        let mut greeting = String::new();
        idle_reader.read_line(&mut greeting).unwrap();
        assert!(greeting.starts_with("220"));

        let mut stream = TcpStream::connect(&addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut reader = std::io::BufReader::new(stream.try_clone().unwrap());

        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "220 test.local service ready\r\n");

        stream.write_all(b"QUIT\r\n").unwrap();
        line.clear();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "221 test.local closing connection\r\n");

        // Server closes the socket after QUIT
        line.clear();
        assert_eq!(reader.read_line(&mut line).unwrap(), 0);
    }
}
