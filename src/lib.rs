/*!
# reqdump

A local HTTP debug server that accepts any request, prints its request
line, headers, and body to the console, and replies with a fixed plaintext
acknowledgment. It exists to let a developer inspect outbound HTTP traffic
from some other system during manual testing.

# Simple usage

The first step is to create a `Server` object, usually from a
`ServerConfig`. The constructor returns an `io::Result<Server>` which will
be an error if the server creation fails (for example if the listening
port is already occupied).

```no_run
let config = reqdump::ServerConfig::from_env();
let mut server = reqdump::Server::new(&config).unwrap();
```

Calling `server.recv()` blocks until the next request is available.
Connections are served one at a time: a connection is fully read,
processed, and answered before the next one is accepted, so the dumps for
two requests never interleave.

```no_run
# let mut server = reqdump::Server::new(&reqdump::ServerConfig::default()).unwrap();
let stdout = std::io::stdout();

for request in server.incoming_requests() {
    let mut out = stdout.lock();
    reqdump::log_and_acknowledge(request, &mut out).unwrap();
}
```

`log_and_acknowledge` prints the delimiter-bounded dump of the captured
request and answers it with `200 OK`, a `Content-Type: plain/text` header,
and the literal body `OK`. For custom replies, build a [`Response`] and
call [`Request::respond`] yourself.
*/

use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, ToSocketAddrs};

use crate::client::ClientConnection;
use crate::log::{debug, error};

pub use crate::common::{Header, HeaderField, HttpVersion, Method, StatusCode};
pub use crate::dump::{log_and_acknowledge, RequestDump, DELIMITER};
pub use crate::request::Request;
pub use crate::response::{acknowledgment, Response};

mod client;
mod common;
mod dump;
mod log;
mod request;
mod response;
mod util;

/// Environment variable holding the TCP port to bind.
pub const PORT_ENV_VAR: &str = "HTTP_PORT";

/// Port used when `HTTP_PORT` is unset or does not parse.
pub const DEFAULT_PORT: u16 = 8081;

/// Startup configuration, passed explicitly to `Server::new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// TCP port to bind on all interfaces.
    pub port: u16,
}

impl ServerConfig {
    /// Builds the configuration from the environment: reads `HTTP_PORT`,
    /// falling back to port 8081 when it is unset or does not parse as a
    /// port number.
    pub fn from_env() -> ServerConfig {
        let port = std::env::var(PORT_ENV_VAR)
            .ok()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        ServerConfig { port }
    }
}

impl Default for ServerConfig {
    fn default() -> ServerConfig {
        ServerConfig { port: DEFAULT_PORT }
    }
}

/// The request logger server: a listener plus an accept loop that yields
/// one captured [`Request`] at a time.
///
/// Scheduling is strictly serial. One connection is accepted, its requests
/// are drained (a keep-alive client may send several in a row), and only
/// then is the next connection accepted. There is no worker pool and no
/// shared state across requests.
pub struct Server {
    listener: TcpListener,

    listening_addr: SocketAddr,

    // connection currently being drained, if any
    current_connection: Option<ClientConnection>,
}

impl Server {
    /// Builds a new server bound to `0.0.0.0` on the configured port.
    ///
    /// A bind failure (for example, port already in use) is fatal and is
    /// returned to the caller; there is no retry.
    pub fn new(config: &ServerConfig) -> io::Result<Server> {
        Server::http((Ipv4Addr::UNSPECIFIED, config.port))
    }

    /// Builds a new server listening on the specified address.
    ///
    /// Binding to port 0 picks a random free port, which is useful for
    /// tests; the effective address is available from `server_addr`.
    pub fn http<A>(addr: A) -> io::Result<Server>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr)?;
        let listening_addr = listener.local_addr()?;

        Ok(Server {
            listener,
            listening_addr,
            current_connection: None,
        })
    }

    /// Returns the address the server is bound to.
    pub fn server_addr(&self) -> SocketAddr {
        self.listening_addr
    }

    /// Blocks until the next request is available and returns it.
    ///
    /// A connection whose request cannot be parsed is answered with an
    /// error status and dropped; the serve loop itself keeps going. Only
    /// accept-level failures are reported to the caller.
    pub fn recv(&mut self) -> io::Result<Request> {
        loop {
            if let Some(connection) = self.current_connection.as_mut() {
                match connection.next() {
                    Some(request) => return Ok(request),
                    None => self.current_connection = None,
                }
            }

            let (socket, addr) = self.listener.accept()?;
            debug!("new connection from {}", addr);

            match ClientConnection::new(socket) {
                Ok(connection) => self.current_connection = Some(connection),
                Err(err) => {
                    // the client vanished between accept and handshake
                    error!("dropping connection from {}: {}", addr, err);
                }
            }
        }
    }

    /// Returns an iterator that yields requests forever.
    ///
    /// The iterator ends only if accepting a connection fails, in which
    /// case the error is logged.
    pub fn incoming_requests(&mut self) -> IncomingRequests<'_> {
        IncomingRequests { server: self }
    }
}

/// Iterator over incoming requests, returned by `Server::incoming_requests`.
pub struct IncomingRequests<'a> {
    server: &'a mut Server,
}

impl<'a> Iterator for IncomingRequests<'a> {
    type Item = Request;

    fn next(&mut self) -> Option<Request> {
        match self.server.recv() {
            Ok(request) => Some(request),
            Err(err) => {
                error!("error while accepting a connection: {}", err);
                None
            }
        }
    }
}
