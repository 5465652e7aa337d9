//! HTTP transport - builds and executes calls, classifies failures

use base64::Engine;
use std::time::Instant;

use crate::constants::REQUEST_TIMEOUT_SECS;
use crate::error::TransportError;
use crate::messages::dispatch::{CallEvent, RequestSpec, Submission};
use crate::models::{Auth, CallResult, Method};

/// Build a reqwest request from a captured spec
fn build_request(client: &reqwest::Client, spec: &RequestSpec) -> reqwest::RequestBuilder {
    let mut req_builder = match spec.method {
        Method::GET => client.get(&spec.url),
        Method::POST => client.post(&spec.url),
        Method::PUT => client.put(&spec.url),
        Method::DELETE => client.delete(&spec.url),
    };

    if !spec.params.is_empty() {
        req_builder = req_builder.query(&spec.params);
    }

    for (key, value) in &spec.headers {
        req_builder = req_builder.header(key, value);
    }

    match &spec.auth {
        Auth::Bearer(token) => {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", token));
        }
        Auth::Basic { username, password } => {
            let credentials = format!("{}:{}", username, password);
            let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
            req_builder = req_builder.header("Authorization", format!("Basic {}", encoded));
        }
        Auth::ApiKey { header, value } => {
            req_builder = req_builder.header(header, value);
        }
        Auth::None => {}
    }

    if let Some(body) = &spec.body {
        // An explicit Content-Type row wins over the body's own type
        let has_content_type = spec
            .headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("content-type"));
        if !has_content_type {
            req_builder = req_builder.header("Content-Type", body.content_type.as_mime());
        }
        req_builder = req_builder.body(body.content.clone());
    }

    req_builder
}

fn classify_send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(REQUEST_TIMEOUT_SECS)
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else if e.is_builder() {
        TransportError::InvalidUrl(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

/// Execute one call and produce its terminal event
pub async fn execute_call(
    client: &reqwest::Client,
    submission: Submission,
    spec: RequestSpec,
) -> CallEvent {
    let start = Instant::now();
    let req_builder = build_request(client, &spec);

    match req_builder.send().await {
        Ok(resp) => {
            let status = resp.status().as_u16();
            let headers = resp
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        value.to_str().unwrap_or("").to_string(),
                    )
                })
                .collect();

            match resp.text().await {
                Ok(raw_body) => CallEvent::Ready {
                    submission,
                    result: CallResult {
                        status,
                        raw_body,
                        headers,
                        elapsed_ms: start.elapsed().as_millis() as u64,
                    },
                },
                Err(e) => CallEvent::Failed {
                    submission,
                    error: TransportError::Body(e.to_string()),
                },
            }
        }
        Err(e) => CallEvent::Failed {
            submission,
            error: classify_send_error(e),
        },
    }
}

/// Create an HTTP client with default configuration
pub fn create_client() -> reqwest::Client {
    use std::time::Duration;

    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
