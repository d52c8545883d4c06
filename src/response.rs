use std::io::{self, Cursor, Empty, Read, Write};
use std::time::SystemTime;

use crate::common::{Header, HttpVersion, StatusCode};

/// Object representing an HTTP response whose purpose is to be given back
/// to a `Request`.
///
/// The `R` template parameter is the type of the reader the body is read
/// from.
pub struct Response<R>
where
    R: Read,
{
    reader: R,
    status_code: StatusCode,
    headers: Vec<Header>,
    data_length: Option<usize>,
}

impl<R> Response<R>
where
    R: Read,
{
    /// Creates a new `Response` object.
    ///
    /// The `data_length` parameter is the size of the body, if known in
    /// advance. It is turned into a `Content-Length` header.
    pub fn new(
        status_code: StatusCode,
        headers: Vec<Header>,
        data: R,
        data_length: Option<usize>,
    ) -> Response<R> {
        let mut response = Response {
            reader: data,
            status_code,
            headers: Vec::with_capacity(headers.len()),
            data_length,
        };

        for header in headers {
            response.add_header(header);
        }

        response
    }

    /// Adds a header to the list.
    /// Duplicate fields are kept; the dump side of this crate preserves
    /// arrival order, and the response side mirrors that.
    pub fn add_header(&mut self, header: Header) {
        self.headers.push(header);
    }

    /// Same as `add_header`, but returns `self` for chaining.
    pub fn with_header(mut self, header: Header) -> Response<R> {
        self.add_header(header);
        self
    }

    /// Returns the same response, but with a different status code.
    pub fn with_status_code<S>(mut self, code: S) -> Response<R>
    where
        S: Into<StatusCode>,
    {
        self.status_code = code.into();
        self
    }

    /// Returns the status code of this response.
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Returns the headers explicitly set on this response.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Writes the response to a writer.
    ///
    /// Consumes the response: the status line, the standard `Server` and
    /// `Date` headers, the explicit headers, a `Content-Length` header
    /// when the body size is known, and finally the body itself.
    pub fn raw_print<W>(mut self, mut writer: W, http_version: HttpVersion) -> io::Result<()>
    where
        W: Write,
    {
        write!(
            writer,
            "HTTP/{} {} {}\r\n",
            http_version,
            self.status_code,
            self.status_code.default_reason_phrase()
        )?;

        if !self.has_header("Server") {
            write!(writer, "Server: reqdump (Rust)\r\n")?;
        }

        if !self.has_header("Date") {
            write!(writer, "Date: {}\r\n", httpdate::fmt_http_date(SystemTime::now()))?;
        }

        for header in &self.headers {
            write!(writer, "{}: {}\r\n", header.field, header.value.as_str())?;
        }

        if let Some(len) = self.data_length {
            if !self.has_header("Content-Length") {
                write!(writer, "Content-Length: {}\r\n", len)?;
            }
        }

        write!(writer, "\r\n")?;

        io::copy(&mut self.reader, &mut writer)?;
        writer.flush()
    }

    fn has_header(&self, field: &'static str) -> bool {
        self.headers.iter().any(|h| h.field.equiv(field))
    }
}

impl Response<Cursor<Vec<u8>>> {
    /// Builds a `200 OK` response whose body is a chunk of bytes.
    pub fn from_data<D>(data: D) -> Response<Cursor<Vec<u8>>>
    where
        D: Into<Vec<u8>>,
    {
        let data = data.into();
        let data_length = data.len();

        Response::new(
            StatusCode(200),
            Vec::new(),
            Cursor::new(data),
            Some(data_length),
        )
    }

    /// Builds a `200 OK` response whose body is a string.
    pub fn from_string<S>(data: S) -> Response<Cursor<Vec<u8>>>
    where
        S: Into<String>,
    {
        Response::from_data(data.into().into_bytes())
    }
}

impl Response<Empty> {
    /// Builds an empty `Response` with the given status code.
    pub fn empty<S>(status_code: S) -> Response<Empty>
    where
        S: Into<StatusCode>,
    {
        Response::new(status_code.into(), Vec::new(), io::empty(), Some(0))
    }
}

/// The fixed acknowledgment sent back for every logged request: a
/// `200 OK` carrying the literal 2-byte body `OK`.
///
/// The `plain/text` content type is kept as-is; tooling on the other end
/// of this utility matches on that exact value.
pub fn acknowledgment() -> Response<Cursor<Vec<u8>>> {
    let content_type = Header::from_bytes(&b"Content-Type"[..], &b"plain/text"[..]).unwrap();
    Response::from_string("OK").with_header(content_type)
}

#[cfg(test)]
mod test {
    use super::{acknowledgment, Response};
    use crate::common::{HttpVersion, StatusCode};

    #[test]
    fn test_raw_print_status_line_and_body() {
        let mut output = Vec::new();
        Response::from_string("hello")
            .raw_print(&mut output, HttpVersion(1, 1))
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(output.contains("Content-Length: 5\r\n"));
        assert!(output.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_empty_response_has_zero_length() {
        let mut output = Vec::new();
        Response::empty(StatusCode(500))
            .raw_print(&mut output, HttpVersion(1, 1))
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(output.contains("Content-Length: 0\r\n"));
        assert!(output.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_acknowledgment_shape() {
        let response = acknowledgment();
        assert_eq!(response.status_code(), StatusCode(200));

        let mut output = Vec::new();
        response.raw_print(&mut output, HttpVersion(1, 1)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Content-Type: plain/text\r\n"));
        assert!(output.ends_with("\r\n\r\nOK"));
    }
}
