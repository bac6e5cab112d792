//! Executor argument synthesis
//!
//! Turns a [`Request`] into the token list handed to `httpcli`. The tokens are
//! joined with spaces and run through a shell by the executor layer, so the
//! quote characters below are part of the token text.

use base64::Engine;

use crate::models::{upsert_header, AuthType, HeaderPairs, HttpMethod, Request};

/// Headers actually sent: non-blank rows, then auth on top
pub fn effective_headers(request: &Request) -> HeaderPairs {
    let mut headers = HeaderPairs::new();

    for header in &request.headers {
        if !header.key.is_empty() && !header.value.is_empty() {
            upsert_header(&mut headers, &header.key, header.value.as_str());
        }
    }

    match &request.auth {
        AuthType::Bearer { token } if !token.is_empty() => {
            upsert_header(&mut headers, "Authorization", format!("Bearer {}", token));
        }
        AuthType::Basic { username, password } if !username.is_empty() => {
            let credentials = format!("{}:{}", username, password);
            let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
            upsert_header(&mut headers, "Authorization", format!("Basic {}", encoded));
        }
        _ => {}
    }

    headers
}

/// `key1:value1,key2:value2`. Commas and colons inside values are not escaped.
pub fn serialize_headers(headers: &HeaderPairs) -> String {
    headers
        .iter()
        .map(|(k, v)| format!("{}:{}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the executor argument list for `request`
pub fn build_args(request: &Request, scan: bool) -> Vec<String> {
    let mut parts = vec![
        "-url".to_string(),
        format!("\"{}\"", request.url),
        "-X".to_string(),
        request.method.as_str().to_string(),
        "-v".to_string(),
    ];

    // Headers
    let header_str = serialize_headers(&effective_headers(request));
    if !header_str.is_empty() {
        parts.push("-H".to_string());
        parts.push(format!("\"{}\"", header_str));
    }

    // Body
    if !request.body.is_empty() && request.method != HttpMethod::GET {
        parts.push("-d".to_string());
        parts.push(format!("'{}'", request.body));
    }

    if scan {
        parts.push("-scan".to_string());
        parts.push("-scan-type".to_string());
        parts.push(request.scan_type.as_str().to_string());
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Header, ScanType};

    fn request(method: HttpMethod, url: &str) -> Request {
        Request {
            method,
            url: url.to_string(),
            ..Request::blank()
        }
    }

    #[test]
    fn test_simple_get() {
        let req = request(HttpMethod::GET, "https://api.example.com/users");
        assert_eq!(
            build_args(&req, false),
            vec!["-url", "\"https://api.example.com/users\"", "-X", "GET", "-v"]
        );
    }

    #[test]
    fn test_get_never_sends_body() {
        let mut req = request(HttpMethod::GET, "http://x");
        req.body = r#"{"a":1}"#.to_string();
        let args = build_args(&req, false);
        assert!(!args.contains(&"-d".to_string()));
    }

    #[test]
    fn test_post_with_headers_body_and_scan() {
        let mut req = request(HttpMethod::POST, "http://x/login");
        req.headers = vec![
            Header::new("Content-Type", "application/json"),
            Header::blank(),
            Header::new("X-Empty", ""),
            Header::new("Accept", "*/*"),
        ];
        req.body = r#"{"user":"a"}"#.to_string();
        req.scan_type = ScanType::Sql;

        let args = build_args(&req, true);
        assert_eq!(
            args,
            vec![
                "-url",
                "\"http://x/login\"",
                "-X",
                "POST",
                "-v",
                "-H",
                "\"Content-Type:application/json,Accept:*/*\"",
                "-d",
                r#"'{"user":"a"}'"#,
                "-scan",
                "-scan-type",
                "sql",
            ]
        );
    }

    #[test]
    fn test_auth_overrides_explicit_header() {
        let mut req = request(HttpMethod::GET, "http://x");
        req.headers = vec![
            Header::new("Authorization", "Token old"),
            Header::new("Accept", "json"),
        ];
        req.auth = AuthType::Bearer {
            token: "abc".into(),
        };

        let headers = effective_headers(&req);
        assert_eq!(
            headers,
            vec![
                ("Authorization".to_string(), "Bearer abc".to_string()),
                ("Accept".to_string(), "json".to_string()),
            ]
        );
    }

    #[test]
    fn test_basic_auth_encoding() {
        let mut req = request(HttpMethod::GET, "http://x");
        req.auth = AuthType::Basic {
            username: "user".into(),
            password: "pass".into(),
        };
        let headers = effective_headers(&req);
        assert_eq!(headers[0].1, "Basic dXNlcjpwYXNz");

        // Password defaults to empty
        req.auth = AuthType::Basic {
            username: "user".into(),
            password: String::new(),
        };
        assert_eq!(effective_headers(&req)[0].1, "Basic dXNlcjo=");
    }

    #[test]
    fn test_auth_without_credentials_is_skipped() {
        let mut req = request(HttpMethod::GET, "http://x");
        req.auth = AuthType::Bearer {
            token: String::new(),
        };
        assert!(effective_headers(&req).is_empty());

        req.auth = AuthType::Basic {
            username: String::new(),
            password: "secret".into(),
        };
        assert!(effective_headers(&req).is_empty());
    }

    #[test]
    fn test_duplicate_rows_keep_first_position() {
        let mut req = request(HttpMethod::GET, "http://x");
        req.headers = vec![
            Header::new("A", "1"),
            Header::new("B", "2"),
            Header::new("A", "3"),
        ];
        assert_eq!(serialize_headers(&effective_headers(&req)), "A:3,B:2");
    }

    #[test]
    fn test_empty_url_is_accepted() {
        let req = request(HttpMethod::DELETE, "");
        assert_eq!(build_args(&req, false)[1], "\"\"");
    }
}
