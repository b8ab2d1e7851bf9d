//! Parser for the embedded grade-view script call
//!
//! The landing page triggers the grade table through an anchor of the form
//!
//! ```text
//! javascript: NoteSesiuneaCurenta('<faculty>', '<specialization>')
//! ```
//!
//! Grammar: the literal `javascript:` scheme, optional whitespace, the fixed
//! function name, `(`, a single-quoted string, `,`, optional whitespace, a
//! single-quoted string, `)`, then anything (href decoration such as
//! `; return false` is ignored). The argument strings carry no escape
//! sequences; the portal never emits quotes inside the names. Both
//! arguments are whitespace-trimmed, matching what the records POST expects.

/// Function name the portal uses for the current-session grade view
pub const GRADE_VIEW_FUNCTION: &str = "NoteSesiuneaCurenta";

/// URL scheme prefix of the anchor href (note the space, as emitted)
pub const GRADE_VIEW_HREF_PREFIX: &str = "javascript: NoteSesiuneaCurenta";

/// Parse an href into the (faculty, specialization) argument pair
///
/// Returns `None` when the href does not match the grammar; the caller
/// turns that into an extraction failure with the raw href attached.
pub fn parse_grade_view_call(href: &str) -> Option<(String, String)> {
    let rest = href.strip_prefix("javascript:")?.trim_start();
    let rest = rest.strip_prefix(GRADE_VIEW_FUNCTION)?.trim_start();
    let rest = rest.strip_prefix('(')?;

    let (faculty, rest) = quoted_string(rest)?;
    let rest = rest.trim_start().strip_prefix(',')?;
    let (specialization, rest) = quoted_string(rest.trim_start())?;

    // Trailing decoration after the call ("; return false" and the like)
    // is tolerated, the call itself must still close properly
    rest.trim_start().strip_prefix(')')?;

    Some((
        faculty.trim().to_string(),
        specialization.trim().to_string(),
    ))
}

/// Consume one single-quoted string, returning (content, remainder)
fn quoted_string(input: &str) -> Option<(&str, &str)> {
    let rest = input.strip_prefix('\'')?;
    let end = rest.find('\'')?;
    Some((&rest[..end], &rest[end + 1..]))
}
