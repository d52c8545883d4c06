use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use reqdump::Server;

/// Creates a server on a random port and a client connected to it.
pub fn new_one_server_one_client() -> (Server, TcpStream) {
    let server = Server::http("0.0.0.0:0").unwrap();
    let port = server.server_addr().port();
    let client = TcpStream::connect(("127.0.0.1", port)).unwrap();
    (server, client)
}

/// Spawns a request-logging server on a random port.
///
/// The server runs the real handler: each request's dump is appended to
/// the returned buffer and answered with the canned `OK` acknowledgment.
pub fn spawn_logging_server() -> (SocketAddr, Arc<Mutex<Vec<u8>>>) {
    let mut server = Server::http("0.0.0.0:0").unwrap();
    let addr = server.server_addr();
    let sink = Arc::new(Mutex::new(Vec::new()));

    let task_sink = sink.clone();
    thread::spawn(move || {
        for request in server.incoming_requests() {
            let mut out = task_sink.lock().unwrap();

            // same policy as the binary: a client that hangs up before
            // its acknowledgment only loses its own response
            if let Err(err) = reqdump::log_and_acknowledge(request, &mut *out) {
                eprintln!("error while answering a request: {}", err);
            }
        }
    });

    (addr, sink)
}

/// Connects a new client to a spawned server.
pub fn connect(addr: SocketAddr) -> TcpStream {
    TcpStream::connect(("127.0.0.1", addr.port())).unwrap()
}
