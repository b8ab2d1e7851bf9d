//! Wire contract with the portal
//!
//! The portal is a classic ASP application driven entirely by form POSTs
//! with hidden fields. Each endpoint gets an explicit parameter struct so
//! the field names and fixed values are pinned at compile time instead of
//! living in ad-hoc string maps.

use serde::Serialize;

/// Login endpoint path, relative to the portal base URL
pub const LOGIN_PATH: &str = "default.asp";

/// Role/grades endpoint path, target of both the handoff and records POSTs
pub const ROLES_PATH: &str = "roluri.asp";

/// Title every authenticated landing page must carry
pub const EXPECTED_TITLE: &str = "Note din sesiunea curenta";

/// Marker proving the response is the script-driven auto-submit page
pub const AUTOSUBMIT_MARKER: &str = "document.frmData.submit()";

/// Value of the `submit` button the portal expects on login
const LOGIN_SUBMIT_VALUE: &str = " Intra ";

/// Operation flag that makes the roles endpoint render the grade table
const SHOW_GRADES_OPERATION: &str = "N";

/// Credentials POST to `default.asp`
#[derive(Debug, Serialize)]
pub struct LoginForm<'a> {
    #[serde(rename = "hidSelfSubmit")]
    hid_self_submit: &'a str,
    username: &'a str,
    password: &'a str,
    submit: &'a str,
}

impl<'a> LoginForm<'a> {
    pub fn new(username: &'a str, password: &'a str) -> Self {
        Self {
            hid_self_submit: LOGIN_PATH,
            username,
            password,
            submit: LOGIN_SUBMIT_VALUE,
        }
    }
}

/// Second hop of the handshake: replay of the auto-submit form
///
/// The operation and name fields are present but empty; the portal rejects
/// the POST without them.
#[derive(Debug, Serialize)]
pub struct HandoffForm<'a> {
    #[serde(rename = "hidSelfSubmit")]
    hid_self_submit: &'a str,
    sid: &'a str,
    #[serde(rename = "hidOperation")]
    hid_operation: &'a str,
    #[serde(rename = "hidNume_Facultate")]
    hid_nume_facultate: &'a str,
    #[serde(rename = "hidNume_Specializare")]
    hid_nume_specializare: &'a str,
}

impl<'a> HandoffForm<'a> {
    pub fn new(hid_self_submit: &'a str, sid: &'a str) -> Self {
        Self {
            hid_self_submit,
            sid,
            hid_operation: "",
            hid_nume_facultate: "",
            hid_nume_specializare: "",
        }
    }
}

/// POST that renders the current-session grade table
#[derive(Debug, Serialize)]
pub struct RecordsForm<'a> {
    #[serde(rename = "hidSelfSubmit")]
    hid_self_submit: &'a str,
    sid: &'a str,
    #[serde(rename = "hidOperation")]
    hid_operation: &'a str,
    #[serde(rename = "hidNume_Facultate")]
    hid_nume_facultate: &'a str,
    #[serde(rename = "hidNume_Specializare")]
    hid_nume_specializare: &'a str,
}

impl<'a> RecordsForm<'a> {
    pub fn new(sid: &'a str, faculty: &'a str, specialization: &'a str) -> Self {
        Self {
            hid_self_submit: ROLES_PATH,
            sid,
            hid_operation: SHOW_GRADES_OPERATION,
            hid_nume_facultate: faculty,
            hid_nume_specializare: specialization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_form_encodes_the_exact_portal_fields() {
        let encoded = serde_urlencoded::to_string(LoginForm::new("student", "pa ss")).unwrap();
        assert_eq!(
            encoded,
            "hidSelfSubmit=default.asp&username=student&password=pa+ss&submit=+Intra+"
        );
    }

    #[test]
    fn handoff_form_sends_empty_operation_and_names() {
        let encoded = serde_urlencoded::to_string(HandoffForm::new("roluri.asp", "abc123")).unwrap();
        assert_eq!(
            encoded,
            "hidSelfSubmit=roluri.asp&sid=abc123&hidOperation=\
             &hidNume_Facultate=&hidNume_Specializare="
        );
    }

    #[test]
    fn records_form_carries_operation_flag_and_extracted_names() {
        let encoded = serde_urlencoded::to_string(RecordsForm::new(
            "abc123",
            "Automatica si Calculatoare",
            "Calculatoare",
        ))
        .unwrap();
        assert!(encoded.starts_with("hidSelfSubmit=roluri.asp&sid=abc123&hidOperation=N"));
        assert!(encoded.contains("hidNume_Facultate=Automatica+si+Calculatoare"));
        assert!(encoded.contains("hidNume_Specializare=Calculatoare"));
    }
}
