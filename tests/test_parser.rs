use rampart::http::parser::{parse_request, ParseError, MAX_REQUEST_BYTES};
use rampart::http::request::{Method, Version};

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, consumed) = parse_request(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/");
    assert_eq!(parsed.version, Version::Http11);
    assert_eq!(parsed.header("host"), Some("example.com"));
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_post_request_with_body() {
    let req = b"POST /upload HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
    let (parsed, consumed) = parse_request(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.path, "/upload");
    assert_eq!(parsed.body, b"hello".to_vec());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_header_keys_lowercased() {
    let req = b"GET / HTTP/1.1\r\nHoSt: example.com\r\nUser-Agent: test\r\n\r\n";
    let (parsed, _) = parse_request(req).unwrap();

    assert_eq!(parsed.headers.get("host").unwrap(), "example.com");
    assert_eq!(parsed.headers.get("user-agent").unwrap(), "test");
    assert!(!parsed.headers.contains_key("HoSt"));
}

#[test]
fn test_duplicate_header_last_wins() {
    let req = b"GET / HTTP/1.1\r\nHost: first\r\nHost: second\r\n\r\n";
    let (parsed, _) = parse_request(req).unwrap();

    assert_eq!(parsed.header("host"), Some("second"));
}

#[test]
fn test_unknown_method_parses_as_other() {
    let req = b"DELETE /thing HTTP/1.1\r\nHost: x\r\n\r\n";
    let (parsed, _) = parse_request(req).unwrap();

    assert_eq!(parsed.method, Method::Other("DELETE".to_string()));
}

#[test]
fn test_request_line_must_have_three_tokens() {
    assert!(matches!(
        parse_request(b"GET /\r\n\r\n"),
        Err(ParseError::InvalidRequestLine)
    ));
    assert!(matches!(
        parse_request(b"GET / HTTP/1.1 extra\r\n\r\n"),
        Err(ParseError::InvalidRequestLine)
    ));
}

#[test]
fn test_unknown_version_rejected() {
    assert!(matches!(
        parse_request(b"GET / HTTP/2.0\r\nHost: x\r\n\r\n"),
        Err(ParseError::InvalidVersion(_))
    ));
    assert!(matches!(
        parse_request(b"GET / HTTP/0.9\r\n\r\n"),
        Err(ParseError::InvalidVersion(_))
    ));
}

#[test]
fn test_http10_accepted() {
    let (parsed, _) = parse_request(b"GET / HTTP/1.0\r\nHost: x\r\n\r\n").unwrap();
    assert_eq!(parsed.version, Version::Http10);
}

#[test]
fn test_incomplete_until_blank_line() {
    assert!(matches!(
        parse_request(b"GET / HTTP/1.1\r\nHost: x\r\n"),
        Err(ParseError::Incomplete)
    ));
}

#[test]
fn test_incomplete_until_full_body() {
    let req = b"POST /upload HTTP/1.1\r\nHost: x\r\nContent-Length: 10\r\n\r\nabc";
    assert!(matches!(parse_request(req), Err(ParseError::Incomplete)));
}

#[test]
fn test_header_line_without_colon_is_malformed() {
    assert!(matches!(
        parse_request(b"GET / HTTP/1.1\r\nnocolon\r\n\r\n"),
        Err(ParseError::InvalidHeader)
    ));
}

#[test]
fn test_invalid_content_length_is_malformed() {
    assert!(matches!(
        parse_request(b"POST /upload HTTP/1.1\r\nContent-Length: nope\r\n\r\n"),
        Err(ParseError::InvalidContentLength)
    ));
}

#[test]
fn test_oversized_head_rejected() {
    let mut req = b"GET / HTTP/1.1\r\n".to_vec();
    req.extend_from_slice(format!("X-Pad: {}\r\n", "a".repeat(MAX_REQUEST_BYTES)).as_bytes());
    req.extend_from_slice(b"\r\n");

    assert!(matches!(parse_request(&req), Err(ParseError::TooLarge)));
}

#[test]
fn test_head_plus_body_capped_together() {
    // Head fits, but the declared body would push past the cap.
    let req = format!(
        "POST /upload HTTP/1.1\r\nHost: x\r\nContent-Length: {}\r\n\r\n",
        MAX_REQUEST_BYTES
    );
    assert!(matches!(
        parse_request(req.as_bytes()),
        Err(ParseError::TooLarge)
    ));
}

#[test]
fn test_get_body_not_consumed() {
    // Content-Length on a GET is ignored; the bytes stay in the buffer.
    let req = b"GET / HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\n\r\nhello";
    let (parsed, consumed) = parse_request(req).unwrap();

    assert!(parsed.body.is_empty());
    assert_eq!(consumed, req.len() - 5);
}

#[test]
fn test_consumed_leaves_next_request_in_buffer() {
    let req = b"GET /a HTTP/1.1\r\nHost: x\r\n\r\nGET /b HTTP/1.1\r\nHost: x\r\n\r\n";
    let (first, consumed) = parse_request(req).unwrap();
    assert_eq!(first.path, "/a");

    let (second, _) = parse_request(&req[consumed..]).unwrap();
    assert_eq!(second.path, "/b");
}
