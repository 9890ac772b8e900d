//! Resumption token codec.
//!
//! A resumption token is a pagination cursor bound to the filter context it
//! was issued under. Its payload is a compact JSON object with `page` and
//! `verb` always present and `from`, `until` and `set` only when they carry
//! a value, wrapped in standard base64. Nothing is stored server-side: the
//! client hands the string back verbatim on the next request.
//!
//! Validation compares every context field strictly, including presence, so
//! page N of one filtered list cannot be replayed against a different filter.

use std::num::NonZeroU64;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{OaiError, Result};

/// Decoded token payload.
pub type TokenFields = Map<String, Value>;

/// The request context a token is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenContext {
    pub verb: String,
    pub from: Option<String>,
    pub until: Option<String>,
    pub set: Option<u64>,
}

impl TokenContext {
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            ..Self::default()
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_until(mut self, until: impl Into<String>) -> Self {
        self.until = Some(until.into());
        self
    }

    pub fn with_set(mut self, set: u64) -> Self {
        self.set = Some(set);
        self
    }

    /// Drop falsy values: empty strings and a `set` of zero count as absent.
    fn normalized(&self) -> Self {
        Self {
            verb: self.verb.clone(),
            from: self.from.clone().filter(|v| !v.is_empty()),
            until: self.until.clone().filter(|v| !v.is_empty()),
            set: self.set.filter(|v| *v != 0),
        }
    }
}

/// Wire shape of the token payload. Field order is the encoded key order.
#[derive(Serialize)]
struct TokenPayload<'a> {
    page: u64,
    verb: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    until: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    set: Option<u64>,
}

/// A page cursor within a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumptionToken {
    pub page: NonZeroU64,
    pub context: TokenContext,
}

impl ResumptionToken {
    pub fn new(page: NonZeroU64, context: TokenContext) -> Self {
        Self { page, context }
    }

    /// Encode into the opaque token string.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroU64;
    /// use openarchive::token::{decode, ResumptionToken, TokenContext};
    ///
    /// let page = NonZeroU64::new(3).unwrap();
    /// let token = ResumptionToken::new(page, TokenContext::new("ListRecords"))
    ///     .encode()
    ///     .unwrap();
    /// let fields = decode(&token).unwrap();
    /// assert_eq!(fields.len(), 2);
    /// assert_eq!(fields["page"], 3);
    /// ```
    pub fn encode(&self) -> Result<String> {
        let context = self.context.normalized();
        let payload = TokenPayload {
            page: self.page.get(),
            verb: &context.verb,
            from: context.from.as_deref(),
            until: context.until.as_deref(),
            set: context.set,
        };

        let json = serde_json::to_vec(&payload)?;
        Ok(STANDARD.encode(json))
    }
}

/// Decode a token string into its field map.
pub fn decode(token: &str) -> Result<TokenFields> {
    let bytes = STANDARD
        .decode(token)
        .map_err(|e| OaiError::MalformedToken(e.to_string()))?;

    if bytes.is_empty() {
        return Err(OaiError::MalformedToken("empty payload".to_string()));
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(OaiError::MalformedToken(
            "payload is not a field mapping".to_string(),
        )),
        Err(e) => Err(OaiError::MalformedToken(e.to_string())),
    }
}

/// Decode `token`, check it against `expected`, and return its page.
pub fn validate_and_get_page(token: &str, expected: &TokenContext) -> Result<NonZeroU64> {
    let fields = decode(token)?;

    let page = fields
        .get("page")
        .and_then(Value::as_u64)
        .and_then(NonZeroU64::new)
        .ok_or_else(|| OaiError::InvalidToken("missing or non-positive page".to_string()))?;

    let expected = expected.normalized();
    let expected_verb = Value::from(expected.verb.as_str());
    let expected_from = expected.from.as_deref().map(Value::from);
    let expected_until = expected.until.as_deref().map(Value::from);
    let expected_set = expected.set.map(Value::from);

    let mismatched = [
        ("verb", Some(&expected_verb)),
        ("from", expected_from.as_ref()),
        ("until", expected_until.as_ref()),
        ("set", expected_set.as_ref()),
    ]
    .into_iter()
    .find(|(key, want)| fields.get(*key) != *want);

    if let Some((key, _)) = mismatched {
        return Err(OaiError::InvalidToken(format!(
            "'{key}' does not match the request"
        )));
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    fn full_context() -> TokenContext {
        TokenContext::new("ListRecords")
            .with_from("2022-01-01T01:00:00Z")
            .with_until("2022-01-01T02:00:00Z")
            .with_set(2)
    }

    #[test]
    fn test_encode_full_context_decodes_all_fields() {
        let token = ResumptionToken::new(page(3), full_context()).encode().unwrap();
        let fields = decode(&token).unwrap();

        let expected = serde_json::json!({
            "verb": "ListRecords",
            "page": 3,
            "from": "2022-01-01T01:00:00Z",
            "until": "2022-01-01T02:00:00Z",
            "set": 2,
        });
        assert_eq!(Value::Object(fields), expected);
    }

    #[test]
    fn test_encode_is_deterministic_and_ordered() {
        let token = ResumptionToken::new(page(1), TokenContext::new("ListRecords").with_set(4))
            .encode()
            .unwrap();
        let again = ResumptionToken::new(page(1), TokenContext::new("ListRecords").with_set(4))
            .encode()
            .unwrap();

        assert_eq!(token, again);
        assert_eq!(
            token,
            STANDARD.encode(r#"{"page":1,"verb":"ListRecords","set":4}"#)
        );
    }

    #[test]
    fn test_encode_omits_absent_and_falsy_fields() {
        let context = TokenContext {
            verb: "ListRecords".to_string(),
            from: Some(String::new()),
            until: None,
            set: Some(0),
        };
        let token = ResumptionToken::new(page(2), context).encode().unwrap();
        let fields = decode(&token).unwrap();

        let mut keys: Vec<_> = fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["page", "verb"]);
    }

    #[test]
    fn test_validate_returns_page_for_matching_context() {
        let token = ResumptionToken::new(page(3), full_context()).encode().unwrap();
        assert_eq!(
            validate_and_get_page(&token, &full_context()).unwrap().get(),
            3
        );
    }

    #[test]
    fn test_validate_rejects_each_mismatched_field() {
        let token = ResumptionToken::new(page(3), full_context()).encode().unwrap();

        let mismatches = [
            TokenContext {
                verb: "ListIdentifiers".into(),
                ..full_context()
            },
            TokenContext {
                from: Some("2022-01-01T00:00:00Z".into()),
                ..full_context()
            },
            TokenContext {
                until: Some("2022-01-02T02:00:00Z".into()),
                ..full_context()
            },
            TokenContext {
                set: Some(3),
                ..full_context()
            },
        ];

        for expected in mismatches {
            assert!(
                matches!(
                    validate_and_get_page(&token, &expected),
                    Err(OaiError::InvalidToken(_))
                ),
                "{expected:?} should not validate"
            );
        }
    }

    #[test]
    fn test_validate_compares_presence_strictly() {
        let unfiltered = ResumptionToken::new(page(5), TokenContext::new("ListRecords"))
            .encode()
            .unwrap();
        let filtered = TokenContext::new("ListRecords").with_from("2022-01-01");
        assert!(matches!(
            validate_and_get_page(&unfiltered, &filtered),
            Err(OaiError::InvalidToken(_))
        ));

        let token = ResumptionToken::new(page(5), filtered).encode().unwrap();
        assert!(matches!(
            validate_and_get_page(&token, &TokenContext::new("ListRecords")),
            Err(OaiError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_validate_normalizes_expected_context() {
        let token = ResumptionToken::new(page(2), TokenContext::new("ListRecords"))
            .encode()
            .unwrap();
        let expected = TokenContext::new("ListRecords").with_set(0).with_from("");
        assert_eq!(validate_and_get_page(&token, &expected).unwrap().get(), 2);
    }

    #[test]
    fn test_validate_requires_positive_page() {
        for payload in [
            r#"{"verb":"ListRecords"}"#,
            r#"{"page":0,"verb":"ListRecords"}"#,
            r#"{"page":"3","verb":"ListRecords"}"#,
            r#"{"page":-1,"verb":"ListRecords"}"#,
        ] {
            let token = STANDARD.encode(payload);
            assert!(
                matches!(
                    validate_and_get_page(&token, &TokenContext::new("ListRecords")),
                    Err(OaiError::InvalidToken(_))
                ),
                "{payload} should not validate"
            );
        }
    }

    #[test]
    fn test_decode_rejects_corrupted_tokens() {
        assert!(matches!(decode("not base64!"), Err(OaiError::MalformedToken(_))));
        assert!(matches!(decode(""), Err(OaiError::MalformedToken(_))));
        assert!(matches!(
            decode(&STANDARD.encode("{truncated")),
            Err(OaiError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_mapping_payloads() {
        for payload in ["[1,2,3]", "\"ListRecords\"", "42", "null"] {
            assert!(
                matches!(
                    decode(&STANDARD.encode(payload)),
                    Err(OaiError::MalformedToken(_))
                ),
                "{payload} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_propagates_malformed_token() {
        assert!(matches!(
            validate_and_get_page("%%%", &TokenContext::new("ListRecords")),
            Err(OaiError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_decode_requires_token_verbatim() {
        let token = ResumptionToken::new(page(2), full_context()).encode().unwrap();
        for padded in [format!(" {token}"), format!("{token}\n"), format!("\t{token} ")] {
            assert!(
                matches!(decode(&padded), Err(OaiError::MalformedToken(_))),
                "{padded:?} should be rejected"
            );
        }
        assert!(decode(&token).is_ok());
    }
}
