// SleepIQ HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, the `_k` session key
// query parameter, and status-to-error mapping. Endpoint groups live in
// sibling modules (auth, bed, foundation, account) as inherent methods.

use std::sync::{Arc, RwLock};

use reqwest::cookie::{CookieStore, Jar};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Account credentials used for (re-)login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }
}

/// Identity returned by a successful login. Replaced wholesale on re-login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub key: String,
}

/// Raw HTTP client for the SleepIQ REST API.
///
/// Every request after login carries the session cookie (from the jar)
/// and the session key as the `_k` query parameter. A request made
/// before login fails with [`Error::NotLoggedIn`], which callers treat
/// the same as an expired session.
pub struct SleepIqClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    session: RwLock<Option<Session>>,
    cookie_jar: Option<Arc<Jar>>,
}

impl SleepIqClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// A cookie jar is added if the config does not already carry one,
    /// since the vendor session is cookie based.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url: normalize_base(base_url),
            credentials,
            session: RwLock::new(None),
            cookie_jar,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: Credentials) -> Self {
        Self {
            http,
            base_url: normalize_base(base_url),
            credentials,
            session: RwLock::new(None),
            cookie_jar: None,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The current session, if logged in.
    pub fn session(&self) -> Option<Session> {
        self.session.read().expect("session lock poisoned").clone()
    }

    pub(crate) fn set_session(&self, session: Session) {
        debug!(user_id = %session.user_id, "storing session");
        *self.session.write().expect("session lock poisoned") = Some(session);
    }

    /// Drop the current session so the next request fails as not logged in.
    pub fn clear_session(&self) {
        *self.session.write().expect("session lock poisoned") = None;
    }

    /// The `Cookie` header value the jar would send, for diagnostics.
    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let cookies = jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join `path` onto the base URL and attach `_k` plus extra query pairs.
    pub(crate) fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, Error> {
        let key = self
            .session
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.key.clone())
            .ok_or(Error::NotLoggedIn)?;

        let mut url = self.base_url.join(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("_k", &key);
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Bed-scoped path: `bed/{bed_id}/{rest}`.
    pub(crate) fn bed_path(bed_id: &str, rest: &str) -> String {
        format!("bed/{bed_id}/{rest}")
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = self.url(path, query)?;
        debug!("GET {}", redact(&url));

        let resp = self.http.get(url).send().await?;
        parse_response(path, resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path, query)?;
        debug!("PUT {}", redact(&url));

        let resp = self.http.put(url).json(body).send().await?;
        parse_response(path, resp).await
    }

    /// PUT whose response body is ignored.
    pub(crate) async fn put_unit(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        let _: serde_json::Value = self.put(path, query, body).await?;
        Ok(())
    }
}

/// `Url::join` drops the last segment unless the base ends with `/`.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// URL without the session key, for logging.
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name != "_k")
        .map(|(n, v)| (n.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        shown.set_query(None);
    } else {
        shown.query_pairs_mut().clear().extend_pairs(kept);
    }
    shown.to_string()
}

/// Map the HTTP status and decode the JSON body.
///
/// Empty success bodies decode as JSON `null`, so write endpoints can be
/// read into `serde_json::Value`.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    path: &str,
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        let body = resp.text().await.unwrap_or_default();
        trace!(body = %body, "401 response");
        return Err(Error::Authentication {
            message: "session expired or invalid credentials".into(),
        });
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(Error::NotFound { path: path.into() });
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    let body = resp.text().await?;
    let text = if body.trim().is_empty() { "null" } else { body.as_str() };

    serde_json::from_str(text).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = normalize_base(Url::parse("http://localhost:1234/rest").unwrap());
        assert_eq!(url.as_str(), "http://localhost:1234/rest/");
        assert_eq!(
            url.join("bed/familyStatus").unwrap().as_str(),
            "http://localhost:1234/rest/bed/familyStatus"
        );
    }

    #[test]
    fn redact_hides_session_key() {
        let url = Url::parse("http://h/rest/bed/1/foundation/outlet?_k=secret&outletId=3").unwrap();
        assert_eq!(redact(&url), "http://h/rest/bed/1/foundation/outlet?outletId=3");

        let only_key = Url::parse("http://h/rest/bed?_k=secret").unwrap();
        assert_eq!(redact(&only_key), "http://h/rest/bed");
    }

    #[test]
    fn url_requires_session() {
        let client = SleepIqClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://h/rest/").unwrap(),
            Credentials::new("a@b.c", SecretString::from("pw")),
        );
        assert!(matches!(client.url("bed", &[]), Err(Error::NotLoggedIn)));

        client.set_session(Session {
            user_id: "u".into(),
            key: "k1".into(),
        });
        let url = client.url("bed", &[("outletId", "1")]).unwrap();
        assert_eq!(url.as_str(), "http://h/rest/bed?_k=k1&outletId=1");
    }
}
