use std::io::{Read, Result as IoResult};

/// A `Read` adapter that reads exactly `size` bytes from a sub-reader.
///
/// Once the limit is reached it returns EOF. If the limit has not been
/// reached when the destructor runs, the remaining bytes are read and
/// thrown away so that the sub-reader is left at the start of the next
/// request.
pub struct EqualReader<R>
where
    R: Read,
{
    reader: R,
    size: usize,
}

impl<R> EqualReader<R>
where
    R: Read,
{
    pub fn new(reader: R, size: usize) -> EqualReader<R> {
        EqualReader { reader, size }
    }
}

impl<R> Read for EqualReader<R>
where
    R: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        if self.size == 0 {
            return Ok(0);
        }

        let buf = if buf.len() < self.size {
            buf
        } else {
            &mut buf[..self.size]
        };

        match self.reader.read(buf) {
            Ok(len) => {
                self.size -= len;
                Ok(len)
            }
            err @ Err(_) => err,
        }
    }
}

impl<R> Drop for EqualReader<R>
where
    R: Read,
{
    fn drop(&mut self) {
        // the remaining size may be an untrusted declaration, so drain in
        // fixed-size chunks rather than allocating it all at once
        let mut buf = [0; 4096];

        while self.size > 0 {
            let chunk = self.size.min(buf.len());

            match self.reader.read(&mut buf[..chunk]) {
                Ok(0) | Err(_) => break,
                Ok(other) => self.size -= other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EqualReader;
    use std::io::Read;

    #[test]
    fn test_limit() {
        use std::io::Cursor;

        let mut org_reader = Cursor::new("hello world".to_string().into_bytes());

        {
            let mut equal_reader = EqualReader::new(org_reader.by_ref(), 5);

            let mut string = String::new();
            equal_reader.read_to_string(&mut string).unwrap();
            assert_eq!(string, "hello");
        }

        let mut string = String::new();
        org_reader.read_to_string(&mut string).unwrap();
        assert_eq!(string, " world");
    }

    #[test]
    fn test_drop_drains_unread_bytes() {
        use std::io::Cursor;

        let mut org_reader = Cursor::new("hello world".to_string().into_bytes());

        {
            let mut equal_reader = EqualReader::new(org_reader.by_ref(), 5);

            let mut vec = [0];
            equal_reader.read(&mut vec).unwrap();
            assert_eq!(vec[0], b'h');
        }

        let mut string = String::new();
        org_reader.read_to_string(&mut string).unwrap();
        assert_eq!(string, " world");
    }

    #[test]
    fn test_drop_with_huge_declared_size() {
        use std::io::Cursor;

        let mut org_reader = Cursor::new("hello world".to_string().into_bytes());

        {
            let mut equal_reader = EqualReader::new(org_reader.by_ref(), usize::MAX);

            let mut vec = [0];
            equal_reader.read(&mut vec).unwrap();
        }

        // the drop drained to EOF without allocating the declared size
        let mut rest = Vec::new();
        org_reader.read_to_end(&mut rest).unwrap();
        assert!(rest.is_empty());
    }

    #[test]
    fn test_source_shorter_than_limit() {
        use std::io::Cursor;

        let mut org_reader = Cursor::new("hel".to_string().into_bytes());

        let mut equal_reader = EqualReader::new(org_reader.by_ref(), 5);

        let mut string = String::new();
        equal_reader.read_to_string(&mut string).unwrap();
        assert_eq!(string, "hel");
    }
}
