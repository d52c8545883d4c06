use std::io::{self, Write};
use std::process;

use reqdump::{log_and_acknowledge, Server, ServerConfig};

fn run() -> io::Result<()> {
    // bind failures are fatal; everything after this point keeps running
    // until the process is interrupted
    let config = ServerConfig::from_env();
    let mut server = Server::new(&config)?;

    println!("Server has started at {}", server.server_addr());

    let stdout = io::stdout();

    for request in server.incoming_requests() {
        // one locked handle per request keeps each dump contiguous
        let mut out = stdout.lock();
        let result = log_and_acknowledge(request, &mut out).and_then(|_| out.flush());

        // a client that hangs up before its acknowledgment is written
        // only loses its own response; the serve loop keeps going
        if let Err(err) = result {
            log::error!("error while answering a request: {}", err);
        }
    }

    Ok(())
}

fn main() {
    // Info level keeps per-connection debug chatter out of the dump output
    simple_logger::init_with_level(log::Level::Info).ok();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
