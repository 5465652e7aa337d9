//! Dispatch messages - communication between the app and the dispatch actor

use crate::error::TransportError;
use crate::models::{Auth, Call, CallBody, CallId, CallResult, Method};

/// Identity of one accepted submission. The sequence number is unique
/// per submission, the call id names the call it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub seq: u64,
    pub call: CallId,
}

/// Everything the transport needs to run a call, copied out of the
/// call at submission time. Later edits to the call cannot reach an
/// in-flight request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub auth: Auth,
    pub body: Option<CallBody>,
}

impl RequestSpec {
    /// Captures the request-defining fields of a call. Disabled rows
    /// and rows without a key are left out here, not at send time.
    pub fn of(call: &Call) -> Self {
        RequestSpec {
            method: call.method.clone(),
            url: call.url.clone(),
            params: call
                .params
                .iter()
                .filter(|r| r.enabled && !r.key.is_empty())
                .map(|r| (r.key.clone(), r.value.clone()))
                .collect(),
            headers: call
                .headers
                .iter()
                .filter(|r| r.enabled && !r.key.is_empty())
                .map(|r| (r.key.clone(), r.value.clone()))
                .collect(),
            auth: call.auth.clone(),
            body: call.effective_body().cloned(),
        }
    }
}

/// Commands sent from App layer to the dispatch actor
#[derive(Debug, Clone)]
pub enum DispatchCommand {
    /// Run one call in the background
    Execute {
        submission: Submission,
        spec: RequestSpec,
    },
    /// Shutdown the dispatch actor
    Shutdown,
}

/// Lifecycle events sent from the dispatch actor back to the app.
/// For every accepted submission the app sees `Loading` first and then
/// exactly one of `Ready` or `Failed`.
#[derive(Debug, Clone)]
pub enum CallEvent {
    Loading {
        submission: Submission,
    },
    Ready {
        submission: Submission,
        result: CallResult,
    },
    Failed {
        submission: Submission,
        error: TransportError,
    },
}

impl CallEvent {
    pub fn submission(&self) -> Submission {
        match self {
            CallEvent::Loading { submission } => *submission,
            CallEvent::Ready { submission, .. } => *submission,
            CallEvent::Failed { submission, .. } => *submission,
        }
    }

    /// Check if this event ends its submission (no more messages expected)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CallEvent::Loading { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;

    #[test]
    fn request_spec_drops_disabled_and_keyless_rows() {
        let mut call = Call::new(1, "list");
        call.url = String::from("https://api.example.com/items");
        call.params.push(Row::new("page", "1"));
        call.params.push(Row::new("debug", "true"));
        call.params.push(Row::new("", "orphan value"));
        call.params[1].enabled = false;
        call.headers.push(Row::new("Accept", "application/json"));

        let spec = RequestSpec::of(&call);
        assert_eq!(
            spec.params,
            vec![(String::from("page"), String::from("1"))]
        );
        assert_eq!(spec.headers.len(), 1);
    }

    #[test]
    fn loading_is_the_only_non_terminal_event() {
        let submission = Submission { seq: 3, call: 9 };
        let loading = CallEvent::Loading { submission };
        let ready = CallEvent::Ready {
            submission,
            result: CallResult::default(),
        };
        let failed = CallEvent::Failed {
            submission,
            error: TransportError::Other(String::from("boom")),
        };

        assert!(!loading.is_terminal());
        assert!(ready.is_terminal());
        assert!(failed.is_terminal());
        assert_eq!(ready.submission(), submission);
    }
}
