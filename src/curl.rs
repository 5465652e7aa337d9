use crate::models::{Auth, Call, CallBody, ContentType, Method, Row};
use anyhow::{anyhow, Result};

/// Parse a cURL command into a call
pub fn parse_curl(input: &str) -> Result<Call> {
    let mut call = Call::new(0, "Imported call");

    // Remove line continuations and normalize
    let normalized = input.replace("\\\r\n", " ").replace("\\\n", " ");

    let mut tokens = tokenize(&normalized);

    // Skip 'curl' command if present
    if tokens.first().map(|s| s.as_str()) == Some("curl") {
        tokens.remove(0);
    }

    let mut body: Option<String> = None;
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];

        match token.as_str() {
            "-X" | "--request" => {
                if i + 1 < tokens.len() {
                    call.method = parse_method(&tokens[i + 1])?;
                    i += 1;
                }
            }
            "-H" | "--header" => {
                if i + 1 < tokens.len() {
                    let (key, value) = parse_header(&tokens[i + 1])?;
                    apply_header(&mut call, key, value);
                    i += 1;
                }
            }
            "-d" | "--data" | "--data-raw" | "--data-binary" => {
                if i + 1 < tokens.len() {
                    body = Some(tokens[i + 1].clone());
                    // Data implies POST unless a method was given
                    if call.method == Method::GET {
                        call.method = Method::POST;
                    }
                    i += 1;
                }
            }
            "-u" | "--user" => {
                if i + 1 < tokens.len() {
                    let (username, password) = parse_basic_auth(&tokens[i + 1]);
                    call.auth = Auth::Basic { username, password };
                    i += 1;
                }
            }
            "--compressed" | "-k" | "--insecure" | "-L" | "--location" | "-s" | "--silent"
            | "-v" | "--verbose" => {
                // Ignored flags
            }
            _ => {
                if !token.starts_with('-') && call.url.is_empty() {
                    call.url = token.trim_matches(|c| c == '\'' || c == '"').to_string();
                }
            }
        }
        i += 1;
    }

    if call.url.is_empty() {
        return Err(anyhow!("No URL found in cURL command"));
    }

    // Query string becomes editable param rows
    if let Some((base, query)) = call.url.split_once('?') {
        let base = base.to_string();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            call.params.push(Row::new(key, value));
        }
        call.url = base;
    }

    if let Some(content) = body {
        let content_type = if content.trim_start().starts_with(['{', '[']) {
            ContentType::Json
        } else {
            ContentType::Text
        };
        call.body = Some(CallBody {
            content,
            content_type,
        });
    }

    Ok(call)
}

/// An Authorization bearer header becomes structured auth; everything
/// else becomes a header row, first occurrence wins.
fn apply_header(call: &mut Call, key: String, value: String) {
    if key.eq_ignore_ascii_case("authorization") {
        if let Some(token) = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
        {
            call.auth = Auth::Bearer(token.trim().to_string());
            return;
        }
    }
    if !call
        .headers
        .iter()
        .any(|h| h.key.eq_ignore_ascii_case(&key))
    {
        call.headers.push(Row::new(key, value));
    }
}

fn parse_method(s: &str) -> Result<Method> {
    match s.to_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        _ => Err(anyhow!("Unsupported HTTP method: {}", s)),
    }
}

fn parse_header(s: &str) -> Result<(String, String)> {
    match s.split_once(':') {
        Some((key, value)) => Ok((key.trim().to_string(), value.trim().to_string())),
        None => Err(anyhow!("Invalid header format: {}", s)),
    }
}

fn parse_basic_auth(s: &str) -> (String, String) {
    match s.split_once(':') {
        Some((user, pass)) => (user.to_string(), pass.to_string()),
        None => (s.to_string(), String::new()),
    }
}

/// Tokenize a curl command, respecting quotes
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            current.push(c);
            escape_next = false;
            continue;
        }

        match c {
            '\\' if !in_single_quote => {
                escape_next = true;
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
            }
            ' ' | '\t' | '\n' if !in_single_quote && !in_double_quote => {
                if !current.is_empty() {
                    tokens.push(current.clone());
                    current.clear();
                }
            }
            _ => {
                current.push(c);
            }
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Format a call as a cURL command
pub fn to_curl(call: &Call) -> String {
    let mut parts = vec!["curl".to_string()];

    if call.method != Method::GET {
        parts.push(format!("-X {}", call.method.as_str()));
    }

    let mut url = call.url.clone();
    let query: Vec<String> = call
        .params
        .iter()
        .filter(|r| r.enabled && !r.key.is_empty())
        .map(|r| format!("{}={}", r.key, r.value))
        .collect();
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.join("&"));
    }
    parts.push(format!("'{}'", url));

    for row in call.headers.iter().filter(|r| r.enabled && !r.key.is_empty()) {
        parts.push(format!("-H '{}: {}'", row.key, row.value));
    }

    match &call.auth {
        Auth::Bearer(token) => {
            parts.push(format!("-H 'Authorization: Bearer {}'", token));
        }
        Auth::Basic { username, password } => {
            parts.push(format!("-u '{}:{}'", username, password));
        }
        Auth::ApiKey { header, value } => {
            parts.push(format!("-H '{}: {}'", header, value));
        }
        Auth::None => {}
    }

    if let Some(body) = call.effective_body() {
        parts.push(format!("-d '{}'", body.content.replace('\'', "'\\''")));
    }

    parts.join(" \\\n  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let curl = "curl https://api.example.com/users";
        let call = parse_curl(curl).unwrap();
        assert_eq!(call.url, "https://api.example.com/users");
        assert_eq!(call.method, Method::GET);
    }

    #[test]
    fn test_parse_post_with_data() {
        let curl = r#"curl -X POST -H "Content-Type: application/json" -d '{"name":"test"}' https://api.example.com/users"#;
        let call = parse_curl(curl).unwrap();
        assert_eq!(call.method, Method::POST);
        let body = call.body.unwrap();
        assert_eq!(body.content, r#"{"name":"test"}"#);
        assert_eq!(body.content_type, ContentType::Json);
        assert_eq!(call.headers[0].key, "Content-Type");
    }

    #[test]
    fn data_without_a_method_implies_post() {
        let call = parse_curl("curl -d 'a=b' https://api.example.com/form").unwrap();
        assert_eq!(call.method, Method::POST);
        assert_eq!(call.body.unwrap().content_type, ContentType::Text);
    }

    #[test]
    fn query_string_splits_into_param_rows() {
        let call = parse_curl("curl 'https://api.example.com/items?page=2&limit=10'").unwrap();
        assert_eq!(call.url, "https://api.example.com/items");
        assert_eq!(call.params.len(), 2);
        assert_eq!(call.params[0].key, "page");
        assert_eq!(call.params[0].value, "2");
        assert_eq!(call.params[1].key, "limit");
    }

    #[test]
    fn bearer_header_becomes_structured_auth() {
        let call =
            parse_curl("curl -H 'Authorization: Bearer abc123' https://api.example.com").unwrap();
        assert_eq!(call.auth, Auth::Bearer(String::from("abc123")));
        assert!(call.headers.is_empty());
    }

    #[test]
    fn missing_url_is_an_error() {
        assert!(parse_curl("curl -X POST").is_err());
    }

    #[test]
    fn to_curl_includes_only_live_rows() {
        let mut call = Call::new(1, "demo");
        call.url = String::from("https://api.example.com/items");
        call.method = Method::PUT;
        call.params.push(Row::new("page", "2"));
        call.params.push(Row::new("debug", "1"));
        call.params[1].enabled = false;
        call.headers.push(Row::new("Accept", "application/json"));
        call.auth = Auth::ApiKey {
            header: String::from("X-Api-Key"),
            value: String::from("k-1"),
        };
        call.body = Some(CallBody {
            content: String::from(r#"{"on":true}"#),
            content_type: ContentType::Json,
        });

        let curl = to_curl(&call);
        assert!(curl.starts_with("curl \\\n  -X PUT"));
        assert!(curl.contains("'https://api.example.com/items?page=2'"));
        assert!(!curl.contains("debug"));
        assert!(curl.contains("-H 'Accept: application/json'"));
        assert!(curl.contains("-H 'X-Api-Key: k-1'"));
        assert!(curl.contains(r#"-d '{"on":true}'"#));
    }
}
