use std::fmt;
use std::io::{self, Write};

use crate::request::Request;
use crate::response;

/// Delimiter line printed before and after each captured request.
pub const DELIMITER: &str = "================================";

/// A `Display`able diagnostic dump of one captured request.
///
/// The layout is fixed, so that tooling may parse the console output:
///
/// ```text
/// ================================
/// Request line: GET /health HTTP/1.1
/// Headers:
///
/// Host: localhost
/// Accept: */*
///
/// <decoded body text>
/// ================================
/// ```
///
/// The body is decoded as UTF-8; byte sequences that are not valid UTF-8
/// are replaced rather than aborting the request.
pub struct RequestDump<'a> {
    request: &'a Request,
}

impl<'a> RequestDump<'a> {
    pub(crate) fn new(request: &'a Request) -> RequestDump<'a> {
        RequestDump { request }
    }
}

impl<'a> fmt::Display for RequestDump<'a> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(formatter, "{}", DELIMITER)?;
        writeln!(formatter, "Request line: {}", self.request.request_line())?;
        writeln!(formatter, "Headers:")?;
        writeln!(formatter)?;

        for header in self.request.headers() {
            writeln!(formatter, "{}", header)?;
        }

        writeln!(formatter)?;
        writeln!(formatter, "{}", String::from_utf8_lossy(self.request.body()))?;
        writeln!(formatter, "{}", DELIMITER)
    }
}

/// Handles one captured request: writes its dump to `out` in a single
/// write, then answers with the fixed `200 OK` / `OK` acknowledgment.
///
/// Every method is treated uniformly; there is no routing and no
/// per-method behavior.
pub fn log_and_acknowledge<W>(request: Request, out: &mut W) -> io::Result<()>
where
    W: Write,
{
    write!(out, "{}", request.dump())?;
    out.flush()?;

    request.respond(response::acknowledgment())
}
