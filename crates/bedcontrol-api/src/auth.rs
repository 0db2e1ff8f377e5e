// Session authentication
//
// `PUT /login` returns the user id and session key and sets the session
// cookie in the client's jar. Re-login replaces both.

use secrecy::ExposeSecret;
use serde_json::json;
use tracing::debug;

use crate::client::{Session, SleepIqClient, parse_response};
use crate::error::Error;
use crate::models::LoginResponse;

impl SleepIqClient {
    /// Log in with the stored credentials.
    ///
    /// On success the previous session (if any) is replaced. Rejected
    /// credentials surface as [`Error::Authentication`].
    pub async fn login(&self) -> Result<Session, Error> {
        let url = self.base_url().join("login")?;
        debug!(email = %self.credentials().email, "logging in at {}", url);

        let body = json!({
            "login": self.credentials().email,
            "password": self.credentials().password.expose_secret(),
        });

        let resp = self.http().put(url).json(&body).send().await?;
        let login: LoginResponse = parse_response("login", resp).await?;

        let session = Session {
            user_id: login.user_id,
            key: login.key,
        };
        self.set_session(session.clone());

        debug!("login successful");
        Ok(session)
    }
}
