//! Input validation for values that end up inside SOQL text, URL paths or
//! SOAP envelopes.
//!
//! Object and field names come from configuration and are spliced into
//! query text, so they are checked against the Salesforce naming rules
//! before use. Record ids are checked before they go into a URL or an
//! `IN (...)` clause.
//!
//! ```rust
//! use sfx_client::security::{soql, url};
//!
//! assert!(soql::is_safe_sobject_name("Account"));
//! assert!(soql::is_safe_field_path("Owner.Name"));
//! assert!(url::is_valid_salesforce_id("001000000000001AAA"));
//! ```

/// Name checks for SOQL identifiers.
pub mod soql {
    /// Returns true if `name` is a plain Salesforce API name: it starts with
    /// a letter and contains only ASCII letters, digits and underscores.
    ///
    /// ```rust
    /// use sfx_client::security::soql;
    ///
    /// assert!(soql::is_safe_field_name("Custom_Field__c"));
    /// assert!(!soql::is_safe_field_name("Bad'; DROP--"));
    /// ```
    #[must_use]
    pub fn is_safe_field_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {}
            _ => return false,
        }
        chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    }

    /// Returns true for a dotted relationship path such as `Owner.Name`.
    #[must_use]
    pub fn is_safe_field_path(path: &str) -> bool {
        path.split('.').all(is_safe_field_name)
    }

    /// SObject names follow the field name rules.
    #[must_use]
    pub fn is_safe_sobject_name(name: &str) -> bool {
        is_safe_field_name(name)
    }

    /// Join field paths into a SELECT list, or `None` if any path is unsafe
    /// or the list is empty.
    ///
    /// ```rust
    /// use sfx_client::security::soql;
    ///
    /// assert_eq!(soql::build_select(&["Id", "Owner.Name"]), Some("Id, Owner.Name".to_string()));
    /// assert_eq!(soql::build_select(&["Id", "Bad'--"]), None);
    /// ```
    #[must_use]
    pub fn build_select<S: AsRef<str>>(fields: &[S]) -> Option<String> {
        if fields.is_empty() || !fields.iter().all(|f| is_safe_field_path(f.as_ref())) {
            return None;
        }
        Some(
            fields
                .iter()
                .map(|f| f.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// URL path helpers.
pub mod url {
    /// Percent-encode a value for a URL path segment or query parameter.
    #[must_use]
    pub fn encode_param(value: &str) -> String {
        urlencoding::encode(value).into_owned()
    }

    /// Returns true for a 15 or 18 character alphanumeric record id.
    #[must_use]
    pub fn is_valid_salesforce_id(id: &str) -> bool {
        let len = id.len();
        (len == 15 || len == 18) && id.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

/// XML entity handling for SOAP envelopes.
pub mod xml {
    /// Escape the five predefined XML entities.
    #[must_use]
    pub fn escape(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 16);
        for ch in value.chars() {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }

    /// Reverse [`escape`]. `&amp;` is replaced last so `&amp;lt;` stays `&lt;`.
    #[must_use]
    pub fn unescape(value: &str) -> String {
        value
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&")
    }
}
