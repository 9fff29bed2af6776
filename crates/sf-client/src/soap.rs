//! Minimal SOAP helpers for the partner endpoint.
//!
//! Envelopes are small and fixed-shape, so they are built with `format!` and
//! read back by tag extraction rather than a full XML parser.

use crate::security::xml;

/// Partner API namespace.
pub const PARTNER_NS: &str = "urn:partner.soap.sforce.com";

/// A fault parsed out of a SOAP response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// Fault code with any namespace prefix removed (e.g. `INVALID_LOGIN`).
    pub code: String,
    /// Fault string.
    pub message: String,
}

impl std::fmt::Display for SoapFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Wrap a body element in a partner envelope, with a session header when a
/// session id is given.
pub fn envelope(session_id: Option<&str>, body: &str) -> String {
    let header = match session_id {
        Some(sid) => format!(
            "<soapenv:Header><urn:SessionHeader><urn:sessionId>{}</urn:sessionId></urn:SessionHeader></soapenv:Header>",
            xml::escape(sid)
        ),
        None => String::new(),
    };
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:urn="{ns}">{header}<soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>"#,
        ns = PARTNER_NS,
    )
}

/// Extract the text of the first element named `tag`, with or without a
/// namespace prefix.
pub fn extract_element(body: &str, tag: &str) -> Option<String> {
    let mut search_from = 0;
    while let Some(rel) = body[search_from..].find('<') {
        let open = search_from + rel;
        let rest = &body[open + 1..];
        let name_end = rest.find(|c: char| c == '>' || c.is_whitespace() || c == '/')?;
        let qualified = &rest[..name_end];
        let local = qualified.rsplit(':').next().unwrap_or(qualified);

        if local == tag && !qualified.starts_with('/') {
            let content_start = open + 1 + rest.find('>')? + 1;
            if rest[..rest.find('>')?].ends_with('/') {
                return Some(String::new());
            }
            let close = format!("</{}>", qualified);
            let content_end = body[content_start..].find(&close)? + content_start;
            return Some(xml::unescape(&body[content_start..content_end]));
        }
        search_from = open + 1;
    }
    None
}

/// Parse a SOAP fault, if the body carries one.
pub fn parse_fault(body: &str) -> Option<SoapFault> {
    if !body.contains("faultcode") {
        return None;
    }

    let raw_code = extract_element(body, "faultcode")?;
    let code = raw_code
        .rsplit(':')
        .next()
        .unwrap_or(raw_code.as_str())
        .trim()
        .to_string();
    let message = extract_element(body, "faultstring").unwrap_or_else(|| "Unknown error".to_string());

    Some(SoapFault { code, message })
}
