use std::fmt;
use std::io::{self, BufWriter, Read};
use std::net::{SocketAddr, TcpStream};

use crate::common::{Header, HttpVersion, Method, StatusCode};
use crate::dump::RequestDump;
use crate::response::Response;

/// Represents one HTTP request made by a client: the captured request.
///
/// A `Request` is produced by the server and lives only as long as it takes
/// to print its dump and send the acknowledgment; nothing is retained
/// across requests. The body has already been read in full (bounded by the
/// declared `Content-Length`) by the time the request is handed out.
///
/// # Automatic cleanup
///
/// If a `Request` is destroyed without `respond` being called, an empty
/// `500` response is automatically sent back to the client. If handling a
/// request fails, that request degrades to an internal server error while
/// the server itself keeps running.
pub struct Request {
    remote_addr: SocketAddr,

    method: Method,

    url: String,

    http_version: HttpVersion,

    headers: Vec<Header>,

    // the request line exactly as the client sent it, CRLF stripped
    request_line: String,

    body: Vec<u8>,

    // if this writer is empty, the request has been answered
    response_writer: Option<TcpStream>,
}

pub(crate) fn new_request(
    remote_addr: SocketAddr,
    method: Method,
    url: String,
    http_version: HttpVersion,
    headers: Vec<Header>,
    request_line: String,
    body: Vec<u8>,
    response_writer: Option<TcpStream>,
) -> Request {
    Request {
        remote_addr,
        method,
        url,
        http_version,
        headers,
        request_line,
        body,
        response_writer,
    }
}

impl Request {
    /// Returns the method requested by the client (eg. `GET`, `POST`, etc.).
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the resource requested by the client.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the HTTP version of the request.
    pub fn http_version(&self) -> HttpVersion {
        self.http_version
    }

    /// Returns the list of headers sent by the client, in arrival order and
    /// with duplicates preserved.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Returns the request line exactly as the client sent it.
    pub fn request_line(&self) -> &str {
        &self.request_line
    }

    /// Returns the request body. Its length is governed by the declared
    /// `Content-Length`; a missing or unparseable declaration means an
    /// empty body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the number of body bytes that were actually read.
    pub fn body_length(&self) -> usize {
        self.body.len()
    }

    /// Returns the address of the client that sent this request.
    pub fn remote_addr(&self) -> &SocketAddr {
        &self.remote_addr
    }

    /// Returns a `Display`able dump of this request: delimiter lines,
    /// request line, headers, and decoded body.
    pub fn dump(&self) -> RequestDump<'_> {
        RequestDump::new(self)
    }

    /// Withholds the automatic cleanup response: the request can be
    /// dropped without anything being written to the client. Used when
    /// the connection has already answered on its own (eg. a `505`).
    pub(crate) fn disarm(&mut self) {
        self.response_writer = None;
    }

    /// Sends a response to this request and consumes it.
    pub fn respond<R>(mut self, response: Response<R>) -> io::Result<()>
    where
        R: Read,
    {
        let writer = match self.response_writer.take() {
            Some(writer) => writer,
            None => return Ok(()),
        };

        let mut writer = BufWriter::new(writer);
        response.raw_print(&mut writer, self.http_version)
    }
}

impl Drop for Request {
    fn drop(&mut self) {
        if let Some(writer) = self.response_writer.take() {
            let mut writer = BufWriter::new(writer);
            let response = Response::empty(StatusCode(500));
            response.raw_print(&mut writer, self.http_version).ok();
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "Request({} {} from {})",
            self.method, self.url, self.remote_addr
        )
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::{new_request, Request};

    /// Builds a request with no backing socket, for formatting tests.
    pub(crate) fn fake_request(request_line: &str, headers: &[&str], body: &[u8]) -> Request {
        let mut words = request_line.split_whitespace();
        let method = words.next().unwrap().parse().unwrap();
        let url = words.next().unwrap().to_string();

        new_request(
            "127.0.0.1:50000".parse().unwrap(),
            method,
            url,
            crate::common::HttpVersion(1, 1),
            headers.iter().map(|h| h.parse().unwrap()).collect(),
            request_line.to_string(),
            body.to_vec(),
            None,
        )
    }

    #[test]
    fn test_accessors() {
        let request = fake_request(
            "POST /submit HTTP/1.1",
            &["Host: localhost", "Content-Length: 5"],
            b"hello",
        );

        assert!(request.method().equiv("post"));
        assert_eq!(request.url(), "/submit");
        assert_eq!(request.request_line(), "POST /submit HTTP/1.1");
        assert_eq!(request.body(), &b"hello"[..]);
        assert_eq!(request.body_length(), 5);
        assert_eq!(request.headers().len(), 2);
    }

    #[test]
    fn test_debug_format() {
        let request = fake_request("GET / HTTP/1.1", &[], b"");
        assert_eq!(
            format!("{:?}", request),
            "Request(GET / from 127.0.0.1:50000)"
        );
    }
}
