// Minimal request-head parsing for the HTTP forwarder.
//
// Only the first read of a connection is inspected. The request line must be the first line
// and `Host` must be the second line; anything else is treated as a missing Host. Headers that
// do not fit in that first read are not looked for.

use crate::error::ConnectionError;
use crate::utils::validation::split_host_port;

/// Size of the single read the forwarder performs before routing.
pub const REQUEST_HEAD_BUFFER_SIZE: usize = 1024;

pub const CONNECT_METHOD: &str = "CONNECT";

/// Port assumed when the Host header carries none.
pub const DEFAULT_HTTP_PORT: u16 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub host: String,
}

impl RequestHead {
    pub fn parse(buf: &[u8]) -> Result<Self, ConnectionError> {
        let line_end = buf
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| ConnectionError::MalformedRequest(format!("no complete request line in the first {} bytes", buf.len())))?;
        let request_line = String::from_utf8_lossy(&buf[..line_end]);
        let mut parts = request_line.split_whitespace();
        let (method, target) = match (parts.next(), parts.next()) {
            (Some(method), Some(target)) => (method.to_string(), target.to_string()),
            _ => return Err(ConnectionError::MalformedRequest(format!("bad request line '{}'", request_line.trim_end()))),
        };

        let rest = &buf[line_end + 1..];
        let second_line = match rest.iter().position(|b| *b == b'\n') {
            Some(end) => &rest[..end],
            None => rest,
        };
        let host = parse_host_header(&String::from_utf8_lossy(second_line)).ok_or(ConnectionError::MissingHost)?;

        Ok(Self { method, target, host })
    }

    pub fn is_connect(&self) -> bool {
        self.method.eq_ignore_ascii_case(CONNECT_METHOD)
    }

    /// Host header value without its port, for matching against exposed domains.
    pub fn hostname(&self) -> &str {
        split_host_port(&self.host).map(|(host, _)| host).unwrap_or(&self.host)
    }

    /// The part of the request-target that location patterns are matched against.
    pub fn route_target(&self) -> &str {
        if self.is_connect() {
            return &self.target;
        }
        match self.target.split_once("://") {
            Some((_, after_scheme)) => match after_scheme.find('/') {
                Some(index) => &after_scheme[index..],
                None => "/",
            },
            None => &self.target,
        }
    }

    /// Host as given when it already names a port, otherwise Host on port 80.
    pub fn default_backend(&self) -> String {
        if split_host_port(&self.host).is_some() { self.host.clone() } else { format!("{}:{}", self.host, DEFAULT_HTTP_PORT) }
    }
}

fn parse_host_header(line: &str) -> Option<String> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("host") {
        return None;
    }
    let value = value.trim();
    if value.is_empty() { None } else { Some(value.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin_form() {
        let head = RequestHead::parse(b"GET /api/x HTTP/1.1\r\nHost: a.test\r\nAccept: */*\r\n\r\n").unwrap();
        assert_eq!(head.method, "GET");
        assert_eq!(head.target, "/api/x");
        assert_eq!(head.host, "a.test");
        assert!(!head.is_connect());
        assert_eq!(head.route_target(), "/api/x");
        assert_eq!(head.default_backend(), "a.test:80");
    }

    #[test]
    fn test_parse_connect() {
        let head = RequestHead::parse(b"CONNECT a.test:443 HTTP/1.1\r\nHost: a.test:443\r\n\r\n").unwrap();
        assert!(head.is_connect());
        assert_eq!(head.route_target(), "a.test:443");
        assert_eq!(head.hostname(), "a.test");
        assert_eq!(head.default_backend(), "a.test:443");
    }

    #[test]
    fn test_absolute_form_target() {
        let head = RequestHead::parse(b"GET http://a.test:8080/api/x?y=1 HTTP/1.1\r\nhost: a.test:8080\r\n\r\n").unwrap();
        assert_eq!(head.route_target(), "/api/x?y=1");
        assert_eq!(head.default_backend(), "a.test:8080");

        let head = RequestHead::parse(b"GET http://a.test HTTP/1.1\r\nHost: a.test\r\n\r\n").unwrap();
        assert_eq!(head.route_target(), "/");
    }

    #[test]
    fn test_host_must_be_second_line() {
        let err = RequestHead::parse(b"GET / HTTP/1.1\r\nAccept: */*\r\nHost: a.test\r\n\r\n").unwrap_err();
        assert!(matches!(err, ConnectionError::MissingHost));
    }

    #[test]
    fn test_empty_host_is_missing() {
        let err = RequestHead::parse(b"GET / HTTP/1.1\r\nHost:   \r\n\r\n").unwrap_err();
        assert!(matches!(err, ConnectionError::MissingHost));
    }

    #[test]
    fn test_truncated_second_line_still_parses() {
        let head = RequestHead::parse(b"GET / HTTP/1.1\r\nHost: a.te").unwrap();
        assert_eq!(head.host, "a.te");
    }

    #[test]
    fn test_malformed_request_line() {
        assert!(matches!(RequestHead::parse(b"GET / HTTP/1.1").unwrap_err(), ConnectionError::MalformedRequest(_)));
        assert!(matches!(RequestHead::parse(b"GET\r\nHost: a.test\r\n").unwrap_err(), ConnectionError::MalformedRequest(_)));
        assert!(matches!(RequestHead::parse(b"\r\nHost: a.test\r\n").unwrap_err(), ConnectionError::MalformedRequest(_)));
    }

    #[test]
    fn test_ipv6_host() {
        let head = RequestHead::parse(b"GET / HTTP/1.1\r\nHost: [::1]\r\n\r\n").unwrap();
        assert_eq!(head.default_backend(), "[::1]:80");
        let head = RequestHead::parse(b"GET / HTTP/1.1\r\nHost: [::1]:8080\r\n\r\n").unwrap();
        assert_eq!(head.default_backend(), "[::1]:8080");
        assert_eq!(head.hostname(), "[::1]");
    }
}
