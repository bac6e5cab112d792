use serde::{Deserialize, Serialize};

/// Ordered key/value mapping. A repeated key overwrites the earlier value in place.
pub type HeaderPairs = Vec<(String, String)>;

/// Insert or overwrite `key` in an ordered header mapping
pub fn upsert_header(pairs: &mut HeaderPairs, key: &str, value: impl Into<String>) {
    let value = value.into();
    match pairs.iter_mut().find(|(k, _)| k == key) {
        Some(existing) => existing.1 = value,
        None => pairs.push((key.to_string(), value)),
    }
}

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
        }
    }

    /// Same order as the method picker
    pub fn next(&self) -> HttpMethod {
        match self {
            HttpMethod::GET => HttpMethod::POST,
            HttpMethod::POST => HttpMethod::PUT,
            HttpMethod::PUT => HttpMethod::DELETE,
            HttpMethod::DELETE => HttpMethod::PATCH,
            HttpMethod::PATCH => HttpMethod::GET,
        }
    }

    /// Case-insensitive lookup, `None` for methods the executor is not driven with
    pub fn parse(s: &str) -> Option<HttpMethod> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            _ => None,
        }
    }

    pub fn sends_body(&self) -> bool {
        !matches!(self, HttpMethod::GET)
    }
}

/// Vulnerability class handed to the executor in scan mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    #[default]
    All,
    Sql,
    Xss,
    Path,
    Ssrf,
    Idor,
}

impl ScanType {
    pub const ALL: [ScanType; 6] = [
        ScanType::All,
        ScanType::Sql,
        ScanType::Xss,
        ScanType::Path,
        ScanType::Ssrf,
        ScanType::Idor,
    ];

    /// Token passed after `-scan-type`
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::All => "all",
            ScanType::Sql => "sql",
            ScanType::Xss => "xss",
            ScanType::Path => "path",
            ScanType::Ssrf => "ssrf",
            ScanType::Idor => "idor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScanType::All => "All",
            ScanType::Sql => "SQL Injection",
            ScanType::Xss => "XSS",
            ScanType::Path => "Path Traversal",
            ScanType::Ssrf => "SSRF",
            ScanType::Idor => "IDOR",
        }
    }

    pub fn next(&self) -> ScanType {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> ScanType {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Authentication type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    None,
    Bearer {
        #[serde(default)]
        token: String,
    },
    Basic {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },
}

impl AuthType {
    pub fn label(&self) -> &'static str {
        match self {
            AuthType::None => "No Auth",
            AuthType::Bearer { .. } => "Bearer Token",
            AuthType::Basic { .. } => "Basic Auth",
        }
    }
}

/// HTTP Header row. Blank rows are editor placeholders.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Header {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn blank() -> Self {
        Header::default()
    }
}

/// A single HTTP request definition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub scan_type: ScanType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<i64>,
    #[serde(default)]
    pub auth: AuthType,
}

impl Default for Request {
    fn default() -> Self {
        use crate::constants::DEFAULT_URL;
        Request {
            url: String::from(DEFAULT_URL),
            ..Request::blank()
        }
    }
}

impl Request {
    /// The "New Request" shape: like the default but with no URL
    pub fn blank() -> Self {
        Request {
            id: None,
            name: None,
            method: HttpMethod::GET,
            url: String::new(),
            headers: vec![Header::blank()],
            body: String::new(),
            scan_type: ScanType::All,
            collection_id: None,
            auth: AuthType::None,
        }
    }

    /// Name shown in the sidebar: explicit name, else derived from the URL
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => display_name_for_url(&self.url),
        }
    }
}

/// Last path segment of `url`, falling back to the raw string
pub fn display_name_for_url(url: &str) -> String {
    if url.is_empty() {
        return String::from("Untitled Request");
    }

    let last_segment = |path: &str| {
        path.split('/')
            .filter(|s| !s.is_empty())
            .last()
            .map(str::to_string)
    };

    let segment = match url::Url::parse(url) {
        Ok(parsed) => last_segment(parsed.path()),
        Err(_) => last_segment(url),
    };
    segment.unwrap_or_else(|| url.to_string())
}

/// A named, ordered group of saved requests
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub requests: Vec<Request>,
}

impl Collection {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Collection {
            id,
            name: name.into(),
            requests: Vec::new(),
        }
    }
}

/// Response rendered for the last send. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    pub status: String,
    pub time: String,
    pub size: String,
    pub headers: HeaderPairs,
    pub request_headers: HeaderPairs,
    pub body: String,
    pub error: Option<String>,
    pub full_output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_json_shape() {
        let mut req = Request::default();
        req.auth = AuthType::Bearer {
            token: "abc".into(),
        };
        req.collection_id = Some(7);
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["method"], "GET");
        assert_eq!(json["scanType"], "all");
        assert_eq!(json["collectionId"], 7);
        assert_eq!(json["auth"]["type"], "bearer");
        assert_eq!(json["auth"]["token"], "abc");
        assert!(json.get("id").is_none());
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_request_loads_with_missing_fields() {
        let req: Request =
            serde_json::from_str(r#"{"method":"POST","url":"http://x","auth":{"type":"basic","username":"u"}}"#)
                .unwrap();
        assert_eq!(req.method, HttpMethod::POST);
        assert!(req.headers.is_empty());
        assert_eq!(req.scan_type, ScanType::All);
        assert_eq!(
            req.auth,
            AuthType::Basic {
                username: "u".into(),
                password: String::new()
            }
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name_for_url(""), "Untitled Request");
        assert_eq!(display_name_for_url("https://api.example.com/users/42"), "42");
        assert_eq!(display_name_for_url("https://api.example.com"), "https://api.example.com");
        assert_eq!(display_name_for_url("{{base}}/orders/"), "orders");

        let mut req = Request::default();
        req.name = Some("Login".into());
        assert_eq!(req.display_name(), "Login");
    }

    #[test]
    fn test_upsert_header_keeps_position() {
        let mut pairs = HeaderPairs::new();
        upsert_header(&mut pairs, "A", "1");
        upsert_header(&mut pairs, "B", "2");
        upsert_header(&mut pairs, "A", "3");
        assert_eq!(
            pairs,
            vec![("A".to_string(), "3".to_string()), ("B".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_scan_type_cycles() {
        assert_eq!(ScanType::Idor.next(), ScanType::All);
        assert_eq!(ScanType::All.prev(), ScanType::Idor);
    }
}
