//! Classification and field extraction for portal pages
//!
//! Pure functions over response bodies. Keeping them synchronous and
//! string-in/string-out means no parsed DOM is ever held across an await
//! point, and the handshake logic stays independently testable.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use sinuwatch_core::{Error, Result};

use crate::jscall::{self, GRADE_VIEW_HREF_PREFIX};
use crate::wire::{AUTOSUBMIT_MARKER, EXPECTED_TITLE, ROLES_PATH};

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static HANDOFF_FORM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"form[name="frmData"][action="roluri.asp"]"#).unwrap());
static SID_INPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[name="sid"]"#).unwrap());
static SELF_SUBMIT_INPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[name="hidSelfSubmit"]"#).unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// How much of a response body to keep in error diagnostics
const EXCERPT_CHARS: usize = 500;

/// Hidden fields replayed on the second hop of the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffFields {
    /// Session token issued by the portal
    pub sid: String,
    /// Self-submit target, defaulted when the page omits it
    pub self_submit: String,
}

/// Truncated body excerpt for diagnostics
pub fn excerpt(body: &str) -> String {
    body.chars().take(EXCERPT_CHARS).collect()
}

/// The document's `<title>` text, trimmed
pub fn page_title(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    document
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
}

/// True when the title matches the authenticated landing page
pub fn is_landing_page(body: &str) -> bool {
    page_title(body).as_deref() == Some(EXPECTED_TITLE)
}

/// True when the response is the script-driven auto-submit page
///
/// Both markers must be present: the submit call and a reference to the
/// intermediate endpoint it targets.
pub fn is_autosubmit_redirect(body: &str) -> bool {
    body.contains(AUTOSUBMIT_MARKER) && body.contains(ROLES_PATH)
}

/// Extract the hidden fields of the auto-submit form
///
/// Fails with a protocol error when the form or its `sid` is missing; a
/// missing self-submit target falls back to the known endpoint.
pub fn parse_handoff_form(body: &str) -> Result<HandoffFields> {
    let document = Html::parse_document(body);

    let form = document
        .select(&HANDOFF_FORM)
        .next()
        .ok_or_else(|| Error::protocol("redirect handoff form", excerpt(body)))?;

    let sid = form
        .select(&SID_INPUT)
        .next()
        .and_then(|input| input.value().attr("value"))
        .unwrap_or_default()
        .to_string();
    if sid.is_empty() {
        return Err(Error::protocol("redirect handoff sid", excerpt(body)));
    }

    let self_submit = form
        .select(&SELF_SUBMIT_INPUT)
        .next()
        .and_then(|input| input.value().attr("value"))
        .filter(|v| !v.is_empty())
        .unwrap_or(ROLES_PATH)
        .to_string();

    Ok(HandoffFields { sid, self_submit })
}

/// Scrape the session token from a directly reached landing page
///
/// The landing page carries the same `frmData` form; its `sid` must be
/// present for any further request to stay authenticated.
pub fn extract_landing_sid(body: &str) -> Result<String> {
    let document = Html::parse_document(body);

    let form = document
        .select(&HANDOFF_FORM)
        .next()
        .ok_or_else(|| Error::protocol("direct landing form", excerpt(body)))?;

    form.select(&SID_INPUT)
        .next()
        .and_then(|input| input.value().attr("value"))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::protocol("direct landing sid", excerpt(body)))
}

/// Find the grade-view anchor and parse its two script-call arguments
pub fn find_grade_view_args(landing_html: &str) -> Result<(String, String)> {
    let document = Html::parse_document(landing_html);

    let href = document
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.starts_with(GRADE_VIEW_HREF_PREFIX))
        .ok_or_else(|| Error::extraction("grade view link not found on landing page"))?;

    jscall::parse_grade_view_call(href).ok_or_else(|| {
        Error::extraction(format!("unparsable grade view call: {href}"))
    })
}
