use std::io::{self, BufReader, BufWriter, Read};
use std::net::{SocketAddr, TcpStream};

use crate::common::{Header, HttpVersion, Method, StatusCode};
use crate::log::{debug, error};
use crate::request::{self, Request};
use crate::response::Response;
use crate::util::EqualReader;

/// A `ClientConnection` stores the socket to one client and yields the
/// `Request`s it sends, one at a time.
///
/// The connection is strictly sequential: a request's body is read in full
/// before the request is handed out, so the stream is always positioned at
/// the start of the next request when `next` is called again.
pub(crate) struct ClientConnection {
    // address of the client
    remote_addr: SocketAddr,

    // buffered read half of the socket
    reader: BufReader<TcpStream>,

    // write half, cloned into each request so it can send its response
    write_socket: TcpStream,

    // set to true when we know the previous request was the last one
    no_more_requests: bool,
}

/// Largest buffer allocated up front for a declared body length.
const PREALLOCATION_CAP: usize = 4096;

/// Error that can happen when reading a request.
enum ReadError {
    WrongRequestLine,
    WrongHeader(HttpVersion),
    ReadIoError(io::Error),
}

impl ClientConnection {
    /// Creates a new `ClientConnection` that takes ownership of the socket.
    pub(crate) fn new(socket: TcpStream) -> io::Result<ClientConnection> {
        let remote_addr = socket.peer_addr()?;
        let write_socket = socket.try_clone()?;

        Ok(ClientConnection {
            remote_addr,
            reader: BufReader::new(socket),
            write_socket,
            no_more_requests: false,
        })
    }

    /// Reads the next line from the stream.
    ///
    /// Reads until `CRLF` is reached. The next read will start at the first
    /// byte of the new line.
    fn read_next_line(&mut self) -> io::Result<String> {
        let mut buf = Vec::new();
        let mut prev_byte_was_cr = false;

        loop {
            let mut byte = [0u8];
            self.reader.read_exact(&mut byte)?;

            if byte[0] == b'\n' && prev_byte_was_cr {
                buf.pop(); // removes the `\r`
                return String::from_utf8(buf).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidData, "request line is not valid UTF-8")
                });
            }

            prev_byte_was_cr = byte[0] == b'\r';
            buf.push(byte[0]);
        }
    }

    /// Reads a request from the stream.
    /// Blocks until the request line, headers, and body have been read.
    fn read(&mut self) -> Result<Request, ReadError> {
        // the request line is kept verbatim for the dump
        let request_line = self.read_next_line().map_err(ReadError::ReadIoError)?;
        let (method, url, version) = parse_request_line(request_line.trim())?;

        // all headers, in arrival order, duplicates preserved
        let mut headers = Vec::new();
        loop {
            let line = self.read_next_line().map_err(ReadError::ReadIoError)?;

            if line.trim().is_empty() {
                break;
            }

            let header = line
                .trim()
                .parse()
                .map_err(|_| ReadError::WrongHeader(version))?;
            headers.push(header);
        }

        // a missing or unparseable Content-Length means an empty body
        let body_length = content_length(&headers);

        // the declared length is untrusted; the buffer grows as bytes
        // actually arrive, so only the preallocation is capped
        let mut body = Vec::with_capacity(body_length.min(PREALLOCATION_CAP));
        {
            let mut body_reader = EqualReader::new(&mut self.reader, body_length);
            body_reader
                .read_to_end(&mut body)
                .map_err(ReadError::ReadIoError)?;
        }

        let writer = self
            .write_socket
            .try_clone()
            .map_err(ReadError::ReadIoError)?;

        Ok(request::new_request(
            self.remote_addr,
            method,
            url,
            version,
            headers,
            request_line,
            body,
            Some(writer),
        ))
    }

    fn send_error_response(&mut self, status_code: StatusCode, version: HttpVersion) {
        let writer = BufWriter::new(&mut self.write_socket);
        Response::empty(status_code).raw_print(writer, version).ok();
    }
}

impl Iterator for ClientConnection {
    type Item = Request;

    /// Blocks until the next `Request` is available.
    /// Returns `None` when no new request will come from this client.
    fn next(&mut self) -> Option<Request> {
        // the client sent a `Connection: close` header in the previous
        // request or is using HTTP/1.0, meaning that no new request will come
        if self.no_more_requests {
            return None;
        }

        loop {
            let rq = match self.read() {
                Err(ReadError::WrongRequestLine) => {
                    self.send_error_response(StatusCode(400), HttpVersion(1, 1));
                    // we don't know where the next request would start,
                    // so we have to close
                    return None;
                }

                Err(ReadError::WrongHeader(version)) => {
                    self.send_error_response(StatusCode(400), version);
                    return None;
                }

                Err(ReadError::ReadIoError(ref err))
                    if err.kind() == io::ErrorKind::UnexpectedEof =>
                {
                    debug!("{} closed the connection", self.remote_addr);
                    return None;
                }

                Err(ReadError::ReadIoError(err)) => {
                    error!(
                        "error while reading a request from {}: {}",
                        self.remote_addr, err
                    );
                    return None;
                }

                Ok(rq) => rq,
            };

            // only HTTP/1.0 and 1.1 framing is understood
            if rq.http_version() > HttpVersion(1, 1) {
                // the 505 below is the whole answer; the rejected request
                // must not write its own cleanup response on drop
                let mut rq = rq;
                rq.disarm();
                drop(rq);

                self.send_error_response(StatusCode(505), HttpVersion(1, 1));
                continue;
            }

            // updating the status of the connection
            let connection_header = rq
                .headers()
                .iter()
                .find(|h| h.field.equiv("Connection"))
                .map(|h| h.value.as_str());

            match connection_header {
                Some(value) if value.eq_ignore_ascii_case("close") => {
                    self.no_more_requests = true;
                }

                Some(value)
                    if !value.eq_ignore_ascii_case("keep-alive")
                        && rq.http_version() == HttpVersion(1, 0) =>
                {
                    self.no_more_requests = true;
                }

                None if rq.http_version() == HttpVersion(1, 0) => {
                    self.no_more_requests = true;
                }

                _ => (),
            }

            return Some(rq);
        }
    }
}

/// Returns the declared body length of a request.
///
/// The first `Content-Length` header wins; a missing header or a value
/// that does not parse as an integer is treated as a zero-length body.
fn content_length(headers: &[Header]) -> usize {
    headers
        .iter()
        .find(|h| h.field.equiv("Content-Length"))
        .and_then(|h| h.value.as_str().trim().parse().ok())
        .unwrap_or(0)
}

/// Parses the request line of the request.
/// eg. `GET / HTTP/1.1`
fn parse_request_line(line: &str) -> Result<(Method, String, HttpVersion), ReadError> {
    let mut words = line.split_whitespace();

    let method = words.next();
    let url = words.next();
    let version = words.next();

    let (method, url, version) = match (method, url, version) {
        (Some(m), Some(u), Some(v)) => (m, u, v),
        _ => return Err(ReadError::WrongRequestLine),
    };

    let method = method.parse().map_err(|_| ReadError::WrongRequestLine)?;
    let version = parse_http_version(version)?;

    Ok((method, url.to_string(), version))
}

/// Parses an `HTTP/1.1` string.
fn parse_http_version(version: &str) -> Result<HttpVersion, ReadError> {
    let mut elems = version.splitn(2, '/');

    match (elems.next(), elems.next()) {
        (Some(proto), Some(digits)) if proto.eq_ignore_ascii_case("HTTP") => {
            let mut digits = digits.splitn(2, '.');
            let major = digits.next().and_then(|d| d.parse().ok());
            let minor = digits.next().and_then(|d| d.parse().ok());

            match (major, minor) {
                (Some(major), Some(minor)) => Ok(HttpVersion(major, minor)),
                _ => Err(ReadError::WrongRequestLine),
            }
        }
        _ => Err(ReadError::WrongRequestLine),
    }
}

#[cfg(test)]
mod test {
    use crate::common::HttpVersion;

    #[test]
    fn test_parse_request_line() {
        let (method, url, version) = match super::parse_request_line("GET /hello HTTP/1.1") {
            Err(_) => panic!(),
            Ok(v) => v,
        };

        assert!(method.equiv("get"));
        assert_eq!(url, "/hello");
        assert_eq!(version, HttpVersion(1, 1));

        assert!(super::parse_request_line("GET /hello").is_err());
        assert!(super::parse_request_line("qsd qsd qsd").is_err());
    }

    #[test]
    fn test_parse_http_version() {
        assert_eq!(
            super::parse_http_version("HTTP/1.0").ok(),
            Some(HttpVersion(1, 0))
        );
        assert!(super::parse_http_version("HTTP/one").is_err());
        assert!(super::parse_http_version("1.1").is_err());
    }

    #[test]
    fn test_content_length() {
        let headers: Vec<crate::common::Header> = vec![
            "Host: localhost".parse().unwrap(),
            "Content-Length: 7".parse().unwrap(),
        ];
        assert_eq!(super::content_length(&headers), 7);

        let headers: Vec<crate::common::Header> =
            vec!["Content-Length: banana".parse().unwrap()];
        assert_eq!(super::content_length(&headers), 0);

        assert_eq!(super::content_length(&[]), 0);
    }
}
