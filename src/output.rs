//! Parsing of the executor's verbose output
//!
//! The output format is a loose contract, so parsing never fails: anything
//! unrecognized just leaves the defaults in place.

use crate::models::{upsert_header, HeaderPairs, Response};

const DEFAULT_STATUS: &str = "Done";
const DEFAULT_TIME: &str = "N/A";

/// The part of a [`Response`] recovered from verbose output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedOutput {
    pub status: String,
    pub time: String,
    pub headers: HeaderPairs,
    pub body: String,
}

impl Default for ParsedOutput {
    fn default() -> Self {
        ParsedOutput {
            status: DEFAULT_STATUS.to_string(),
            time: DEFAULT_TIME.to_string(),
            headers: HeaderPairs::new(),
            body: String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Scanning,
    Headers,
    Body,
}

/// Parse `Status:`/`Time:`/`Headers:`/`Body:` sections out of `output`
pub fn parse_verbose_output(output: &str) -> ParsedOutput {
    let mut parsed = ParsedOutput::default();
    let mut section = Section::Scanning;

    for line in output.split('\n') {
        if let Some(rest) = line.strip_prefix("Status:") {
            parsed.status = rest.trim().to_string();
        }
        if let Some(rest) = line.strip_prefix("Time:") {
            parsed.time = rest.trim().to_string();
        }

        match line.trim() {
            "Headers:" => {
                section = Section::Headers;
                continue;
            }
            "Body:" => {
                section = Section::Body;
                continue;
            }
            _ => {}
        }

        match section {
            Section::Headers => {
                if let Some((key, value)) = line.split_once(':') {
                    upsert_header(&mut parsed.headers, key.trim(), value.trim());
                }
            }
            Section::Body => {
                parsed.body.push_str(line);
                parsed.body.push('\n');
            }
            Section::Scanning => {}
        }
    }

    parsed.body.truncate(parsed.body.trim_end().len());
    parsed
}

/// Response for an executor run that exited cleanly
pub fn completed_response(stdout: &str, request_headers: HeaderPairs) -> Response {
    let parsed = parse_verbose_output(stdout);
    Response {
        size: format!("{} bytes", parsed.body.len()),
        status: parsed.status,
        time: parsed.time,
        headers: parsed.headers,
        request_headers,
        body: parsed.body,
        error: None,
        full_output: stdout.to_string(),
    }
}

/// Response for an executor run that could not run or exited abnormally
pub fn executor_failure_response(
    error: &str,
    stdout: &str,
    stderr: &str,
    request_headers: HeaderPairs,
) -> Response {
    let body = if stderr.is_empty() { error } else { stderr };
    let full_output = if !stdout.is_empty() { stdout } else { stderr };
    Response {
        status: String::from("Error"),
        time: String::from("0"),
        size: String::from("0"),
        headers: HeaderPairs::new(),
        request_headers,
        body: body.to_string(),
        error: Some(error.to_string()),
        full_output: full_output.to_string(),
    }
}

/// Response for a send that never reached the executor
pub fn dispatch_failure_response(message: &str) -> Response {
    Response {
        status: String::from("Failed"),
        time: String::from("0"),
        size: String::from("0"),
        headers: HeaderPairs::new(),
        request_headers: HeaderPairs::new(),
        body: message.to_string(),
        error: Some(message.to_string()),
        full_output: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_block() {
        let output = "Status: 200 OK\nTime: 120ms\nHeaders:\nContent-Type: application/json\nBody:\n{\"a\":1}\n";
        let parsed = parse_verbose_output(output);
        assert_eq!(parsed.status, "200 OK");
        assert_eq!(parsed.time, "120ms");
        assert_eq!(
            parsed.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
        assert_eq!(parsed.body, "{\"a\":1}");
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(parse_verbose_output(""), ParsedOutput::default());

        let parsed = parse_verbose_output("random text\nwith: colon\n");
        assert_eq!(parsed.status, "Done");
        assert_eq!(parsed.time, "N/A");
        assert!(parsed.headers.is_empty());
        assert!(parsed.body.is_empty());
    }

    #[test]
    fn test_header_value_keeps_later_colons() {
        let output = "Headers:\nLocation: http://x:8080/a\nno colon here\nX-A: 1\nX-A: 2\n";
        let parsed = parse_verbose_output(output);
        assert_eq!(
            parsed.headers,
            vec![
                ("Location".to_string(), "http://x:8080/a".to_string()),
                ("X-A".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_body_keeps_blank_lines_and_indent() {
        let output = "Body:\n  line one\n\nline three\n\n\n";
        let parsed = parse_verbose_output(output);
        assert_eq!(parsed.body, "  line one\n\nline three");
    }

    #[test]
    fn test_status_inside_body_still_sets_status() {
        let output = "Status: 200 OK\nBody:\nStatus: 404\n";
        let parsed = parse_verbose_output(output);
        assert_eq!(parsed.status, "404");
        assert_eq!(parsed.body, "Status: 404");
    }

    #[test]
    fn test_completed_response_size_is_utf8_bytes() {
        let resp = completed_response("Status: 200 OK\nBody:\nhé\n", HeaderPairs::new());
        assert_eq!(resp.size, "3 bytes");
        assert_eq!(resp.full_output, "Status: 200 OK\nBody:\nhé\n");
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_failure_responses() {
        let headers = vec![("Accept".to_string(), "json".to_string())];
        let resp = executor_failure_response("Command failed", "", "boom", headers.clone());
        assert_eq!(resp.status, "Error");
        assert_eq!(resp.body, "boom");
        assert_eq!(resp.full_output, "boom");
        assert_eq!(resp.request_headers, headers);

        let resp = executor_failure_response("Command failed", "", "", HeaderPairs::new());
        assert_eq!(resp.body, "Command failed");
        assert_eq!(resp.full_output, "");

        let resp = dispatch_failure_response("no shell");
        assert_eq!(resp.status, "Failed");
        assert_eq!(resp.error.as_deref(), Some("no shell"));
    }
}
