use serde::{Deserialize, Serialize};

/// Runtime identity of a call. Assigned when the call enters the app,
/// never persisted.
pub type CallId = u64;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
        }
    }

    pub fn next(&self) -> Method {
        match self {
            Method::GET => Method::POST,
            Method::POST => Method::PUT,
            Method::PUT => Method::DELETE,
            Method::DELETE => Method::GET,
        }
    }
}

/// Authentication attached to a call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Auth {
    #[default]
    None,
    Bearer(String),
    Basic {
        username: String,
        password: String,
    },
    ApiKey {
        header: String,
        value: String,
    },
}

impl Auth {
    pub fn label(&self) -> &str {
        match self {
            Auth::None => "None",
            Auth::Bearer(_) => "Bearer",
            Auth::Basic { .. } => "Basic",
            Auth::ApiKey { .. } => "API Key",
        }
    }

    pub fn next(&self) -> Auth {
        match self {
            Auth::None => Auth::Bearer(String::new()),
            Auth::Bearer(_) => Auth::Basic {
                username: String::new(),
                password: String::new(),
            },
            Auth::Basic { .. } => Auth::ApiKey {
                header: String::from("X-Api-Key"),
                value: String::new(),
            },
            Auth::ApiKey { .. } => Auth::None,
        }
    }
}

/// One key/value line in the params or headers table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

impl Row {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Row {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }
}

/// Body content type
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum ContentType {
    #[default]
    Json,
    Text,
}

impl ContentType {
    pub fn as_mime(&self) -> &str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Text => "text/plain",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ContentType::Json => "JSON",
            ContentType::Text => "Text",
        }
    }

    pub fn next(&self) -> ContentType {
        match self {
            ContentType::Json => ContentType::Text,
            ContentType::Text => ContentType::Json,
        }
    }
}

/// Request body of a call
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct CallBody {
    pub content: String,
    pub content_type: ContentType,
}

/// Point-in-time copy of a call's request-defining fields, kept as the
/// baseline that [`Call::was_changed`] compares against.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CallSnapshot {
    url: String,
    method: Method,
    params: Vec<Row>,
    headers: Vec<Row>,
    auth: Auth,
    body: Option<CallBody>,
}

/// A single editable REST call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Call {
    #[serde(skip)]
    pub id: CallId,
    pub name: String,
    pub url: String,
    pub method: Method,
    #[serde(default)]
    pub params: Vec<Row>,
    #[serde(default)]
    pub headers: Vec<Row>,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub body: Option<CallBody>,
    #[serde(skip)]
    saved: Option<Box<CallSnapshot>>,
}

impl Call {
    pub fn new(id: CallId, name: impl Into<String>) -> Self {
        Call {
            id,
            name: name.into(),
            url: String::new(),
            method: Method::GET,
            params: Vec::new(),
            headers: Vec::new(),
            auth: Auth::None,
            body: None,
            saved: None,
        }
    }

    fn current(&self) -> CallSnapshot {
        CallSnapshot {
            url: self.url.clone(),
            method: self.method.clone(),
            params: self.params.clone(),
            headers: self.headers.clone(),
            auth: self.auth.clone(),
            body: self.effective_body().cloned(),
        }
    }

    /// Records the current field values as the saved baseline.
    pub fn snapshot(&mut self) {
        self.saved = Some(Box::new(self.current()));
    }

    /// True when any request-defining field differs from the saved
    /// baseline. Disabled rows participate in the comparison; a call
    /// that was never saved is compared against a blank one.
    pub fn was_changed(&self) -> bool {
        match &self.saved {
            Some(saved) => **saved != self.current(),
            None => self.current() != CallSnapshot::default(),
        }
    }

    /// Body with content, if any. An empty body left behind by the
    /// editor counts as no body at all.
    pub fn effective_body(&self) -> Option<&CallBody> {
        self.body.as_ref().filter(|b| !b.content.is_empty())
    }

    pub fn params_count(&self) -> usize {
        self.params.iter().filter(|r| r.enabled).count()
    }

    pub fn headers_count(&self) -> usize {
        self.headers.iter().filter(|r| r.enabled).count()
    }
}

/// A named group of calls
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub calls: Vec<Call>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Collection {
            name: name.into(),
            calls: Vec::new(),
        }
    }
}

/// Outcome of an executed call
#[derive(Clone, Debug, Default)]
pub struct CallResult {
    pub status: u16,
    pub raw_body: String,
    pub headers: Vec<(String, String)>,
    pub elapsed_ms: u64,
}

impl CallResult {
    pub fn body_bytes(&self) -> usize {
        self.raw_body.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved_call() -> Call {
        let mut call = Call::new(1, "users");
        call.url = String::from("https://api.example.com/users");
        call.params.push(Row::new("page", "2"));
        call.headers.push(Row::new("Accept", "application/json"));
        call.snapshot();
        call
    }

    #[test]
    fn method_cycles_through_all_four() {
        let mut method = Method::GET;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(method.as_str().to_string());
            method = method.next();
        }
        assert_eq!(seen, ["GET", "POST", "PUT", "DELETE"]);
        assert_eq!(method, Method::GET);
    }

    #[test]
    fn new_call_is_clean_until_edited() {
        let mut call = Call::new(7, "scratch");
        assert!(!call.was_changed());
        call.url.push_str("https://example.com");
        assert!(call.was_changed());
    }

    #[test]
    fn snapshot_settles_the_dirty_flag() {
        let mut call = saved_call();
        assert!(!call.was_changed());
        call.url.push_str("/active");
        assert!(call.was_changed());
        call.snapshot();
        assert!(!call.was_changed());
    }

    #[test]
    fn every_field_class_marks_dirty() {
        let mut call = saved_call();
        call.method = call.method.next();
        assert!(call.was_changed());

        let mut call = saved_call();
        call.headers[0].value = String::from("text/html");
        assert!(call.was_changed());

        let mut call = saved_call();
        call.auth = Auth::Bearer(String::from("tok"));
        assert!(call.was_changed());

        let mut call = saved_call();
        call.body = Some(CallBody {
            content: String::from("{}"),
            content_type: ContentType::Json,
        });
        assert!(call.was_changed());
    }

    #[test]
    fn editing_a_disabled_row_still_marks_dirty() {
        let mut call = saved_call();
        call.params[0].enabled = false;
        call.snapshot();

        call.params[0].value = String::from("3");
        assert!(call.was_changed());
    }

    #[test]
    fn toggling_a_row_marks_dirty() {
        let mut call = saved_call();
        call.params[0].enabled = false;
        assert!(call.was_changed());
    }

    #[test]
    fn counts_skip_disabled_rows() {
        let mut call = saved_call();
        call.params.push(Row::new("limit", "10"));
        call.params.push(Row::new("sort", "name"));
        call.params[1].enabled = false;
        assert_eq!(call.params_count(), 2);
        assert_eq!(call.headers_count(), 1);
    }

    #[test]
    fn empty_body_counts_as_no_body() {
        let mut call = saved_call();
        call.body = Some(CallBody::default());
        assert!(call.effective_body().is_none());
        assert!(!call.was_changed());

        call.body = Some(CallBody {
            content: String::from("hello"),
            content_type: ContentType::Text,
        });
        assert!(call.effective_body().is_some());
        assert!(call.was_changed());
    }
}
