#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

//! Pushtest is a client for the push notification test endpoint in Rust 2021 edition.

use std::borrow::Cow;

use log::debug;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Default origin of the push test endpoint.
pub const DEFAULT_BASE_URL: &str = "https://jeffharr.is";

/// Fixed path suffix appended to the base URL.
const ENDPOINT_PATH: &str = "/api/push/test";

/// Header carrying the push test API key.
const KEY_HEADER: &str = "X-Push-Test-Key";

/// Push test error.
#[derive(Error, Debug)]
pub enum PushTestError {
    /// Error from [`ureq`] crate.
    #[error("ureq error: {0}")]
    UReq(#[from] Box<ureq::Error>),
    /// Error from [`serde_json`] crate.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parameters of one test push. Serializes to the request body;
/// absent optional fields are omitted entirely, never sent as null.
#[derive(Default, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPush<'a> {
    item_id: Cow<'a, str>,
    /// Notification title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    /// Notification subtitle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<&'a str>,
    /// Notification body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<&'a str>,
    /// Target a single registered device instead of all of the owner's devices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<&'a str>,
    /// Owner whose devices receive the test push.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<&'a str>,
    /// Origin to send the request to, [`DEFAULT_BASE_URL`] when `None`.
    #[serde(skip)]
    pub base_url: Option<&'a str>,
}

/// Result envelope of one dispatched test push.
///
/// A non-success HTTP status is still an `Outcome`, with `ok` false;
/// only transport-level failures surface as [`PushTestError`].
#[derive(Debug, Serialize)]
pub struct Outcome {
    /// Whether the HTTP status was in the success range.
    pub ok: bool,
    /// HTTP status code returned by the endpoint.
    pub status: u16,
    /// Full endpoint URL the request was sent to.
    pub endpoint: String,
    /// Response body, parsed as JSON when possible, raw text otherwise.
    pub response: Value,
}

/// Shorthand function to send a test push for an item.
/// ```
/// use pushtest::send_test_push;
/// send_test_push("item", "key");
/// ```
pub async fn send_test_push<'a, S>(item_id: S, key: &str) -> Result<Outcome, PushTestError>
where
    S: Into<Cow<'a, str>>,
{
    TestPush::new(item_id).send(key).await
}

/// Upstream bodies are arbitrary, so a body that is not JSON is kept as text.
fn parse_response(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

impl<'a> TestPush<'a> {
    /// Creates a [`TestPush`] for an item.
    ///
    /// ```rust
    /// # use pushtest::TestPush;
    /// TestPush::new("0000-0000");
    /// ```
    pub fn new<T>(item_id: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        Self {
            item_id: item_id.into(),
            ..Default::default()
        }
    }

    /// Full endpoint URL, with trailing slashes of the base URL stripped.
    pub fn endpoint(&self) -> String {
        let base = self.base_url.unwrap_or(DEFAULT_BASE_URL);
        format!("{}{}", base.trim_end_matches('/'), ENDPOINT_PATH)
    }

    /// Send the test push, authenticated with `key`.
    pub async fn send(&self, key: &str) -> Result<Outcome, PushTestError> {
        let uri = self.endpoint();
        let body = serde_json::to_string(self).map_err(PushTestError::Serialize)?;
        debug!("POST {uri} with body {body}");

        let result = ureq::post(&uri)
            .set("Content-Type", "application/json")
            .set(KEY_HEADER, key)
            .send_string(&body);

        // ureq reports non-2xx statuses as Error::Status; those carry a
        // response we still want to surface, unlike transport failures.
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(e) => return Err(PushTestError::UReq(Box::new(e))),
        };

        let status = response.status();
        let text = response.into_string().map_err(PushTestError::Io)?;
        Ok(Outcome {
            ok: (200..300).contains(&status),
            status,
            endpoint: uri,
            response: parse_response(text),
        })
    }
}
