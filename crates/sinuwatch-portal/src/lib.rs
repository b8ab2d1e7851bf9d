// # WebSinu Portal Grade Source
//
// This crate implements the `GradeSource` trait against the WebSinu student
// portal, a legacy ASP application with a non-standard multi-step login.
//
// ## Handshake
//
// 1. POST credentials to `default.asp`
// 2. Depending on the response:
//    - a script-driven auto-submit page means the portal wants a second hop:
//      replay its hidden form (including the `sid` token) to `roluri.asp`
//    - the landing page itself (recognized by its exact title) means the
//      direct path succeeded; the `sid` is scraped from the form on it
//    - anything else is a rejected login
// 3. Either way the session ends up holding the portal cookies, the `sid`
//    token, and the landing HTML that drives the records request
//
// ## Constraints
//
// - One authenticated round trip per `fetch_grades` call; cookies are
//   discarded when the session is dropped and never shared across accounts
// - No retry logic: a failed attempt is terminal for that account's run,
//   and the engine owns the failure policy
// - No persistence and no notification access; those are engine-owned

pub mod extract;
pub mod jscall;
pub mod pages;
pub mod wire;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use sinuwatch_core::record::GradeRecord;
use sinuwatch_core::traits::{Credentials, GradeSource};
use sinuwatch_core::{Error, Result};

use wire::{HandoffForm, LOGIN_PATH, LoginForm, ROLES_PATH, RecordsForm};

/// Production portal base URL
const DEFAULT_BASE_URL: &str = "https://websinu.utcluj.ro/note";

/// HTTP timeout for portal requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// An authenticated portal session for one account
///
/// Owns the cookie-bearing HTTP client, the `sid` token extracted during
/// the handshake, and the landing page HTML. Dropping the session discards
/// the cookies; sessions are never persisted or reused across runs.
pub struct AuthSession {
    client: reqwest::Client,
    sid: String,
    landing_html: String,
}

impl AuthSession {
    /// The portal-issued session token
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// The landing page the handshake ended on
    pub fn landing_html(&self) -> &str {
        &self.landing_html
    }
}

// The sid keeps the session authenticated; keep it out of debug output
impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("sid", &"<REDACTED>")
            .field("landing_html_len", &self.landing_html.len())
            .finish()
    }
}

/// WebSinu portal client
///
/// Stateless between calls: every `fetch_grades` performs a fresh login
/// handshake with its own cookie jar.
#[derive(Debug, Clone)]
pub struct PortalClient {
    base_url: String,
    timeout: Duration,
}

impl PortalClient {
    /// Create a client against the production portal
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a different portal deployment (or a test server)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Run the login handshake for one account
    ///
    /// Completes the script-driven two-hop redirect transparently when the
    /// portal requires it. A page-shape mismatch is a protocol error; a
    /// rejected login is an auth error carrying the HTTP status and a body
    /// excerpt, so "wrong password" is never confused with "site changed
    /// shape".
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthSession> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::network(format!("failed to build HTTP client: {e}")))?;

        debug!("posting credentials to login endpoint");
        let response = client
            .post(self.url(LOGIN_PATH))
            .form(&LoginForm::new(username, password))
            .send()
            .await
            .map_err(net_err)?;
        let status = response.status();
        let body = response.text().await.map_err(net_err)?;

        if pages::is_autosubmit_redirect(&body) {
            debug!("script-driven redirect detected, completing two-hop handshake");
            let fields = pages::parse_handoff_form(&body)?;

            let landing = client
                .post(self.url(ROLES_PATH))
                .form(&HandoffForm::new(&fields.self_submit, &fields.sid))
                .send()
                .await
                .map_err(net_err)?
                .error_for_status()
                .map_err(net_err)?
                .text()
                .await
                .map_err(net_err)?;

            if !pages::is_landing_page(&landing) {
                return Err(Error::protocol(
                    "two-hop landing title",
                    pages::excerpt(&landing),
                ));
            }

            info!("two-hop login handshake completed");
            Ok(AuthSession {
                client,
                sid: fields.sid,
                landing_html: landing,
            })
        } else if pages::is_landing_page(&body) {
            let sid = pages::extract_landing_sid(&body)?;
            info!("direct login succeeded");
            Ok(AuthSession {
                client,
                sid,
                landing_html: body,
            })
        } else {
            warn!(status = status.as_u16(), "login rejected by portal");
            Err(Error::auth(status.as_u16(), pages::excerpt(&body)))
        }
    }

    /// Request the page that renders the current-session grade table
    ///
    /// Discovers the faculty and specialization names from the grade-view
    /// anchor on the landing page, then issues the records POST. A single
    /// request is authoritative; there is no pagination.
    pub async fn fetch_records_page(&self, session: &AuthSession) -> Result<String> {
        let (faculty, specialization) = pages::find_grade_view_args(&session.landing_html)?;
        debug!(faculty, specialization, "requesting grade table");

        session
            .client
            .post(self.url(ROLES_PATH))
            .form(&RecordsForm::new(&session.sid, &faculty, &specialization))
            .send()
            .await
            .map_err(net_err)?
            .error_for_status()
            .map_err(net_err)?
            .text()
            .await
            .map_err(net_err)
    }
}

impl Default for PortalClient {
    fn default() -> Self {
        Self::new()
    }
}

fn net_err(e: reqwest::Error) -> Error {
    Error::network(e.to_string())
}

#[async_trait]
impl GradeSource for PortalClient {
    async fn fetch_grades(&self, credentials: &Credentials) -> Result<Vec<GradeRecord>> {
        let session = self
            .authenticate(&credentials.username, &credentials.password)
            .await?;
        let page = self.fetch_records_page(&session).await?;
        Ok(extract::extract_records(&page))
    }

    fn source_name(&self) -> &'static str {
        "websinu"
    }
}
