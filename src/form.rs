use axum::http::{header, HeaderMap};
use thiserror::Error;
use url::form_urlencoded;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const BODY_FIELD: &str = "Body";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("unsupported content type {0:?}")]
    ContentType(Option<String>),

    #[error("invalid semicolon separator")]
    Semicolon,

    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SmsForm {
    pub body: String,
}

impl SmsForm {
    // Body wins over the query string, like a regular HTML form post.
    pub fn parse(
        headers: &HeaderMap,
        query: Option<&str>,
        body: &[u8],
    ) -> Result<Self, FormError> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let is_form = content_type
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE));
        if !is_form {
            return Err(FormError::ContentType(content_type.map(str::to_string)));
        }

        check_pairs(body)?;
        if let Some(q) = query {
            check_pairs(q.as_bytes())?;
        }

        let body = field(body, BODY_FIELD)
            .or_else(|| query.and_then(|q| field(q.as_bytes(), BODY_FIELD)))
            .unwrap_or_default();
        Ok(Self { body })
    }
}

fn field(raw: &[u8], name: &str) -> Option<String> {
    form_urlencoded::parse(raw)
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

fn check_pairs(raw: &[u8]) -> Result<(), FormError> {
    for pair in raw.split(|b| *b == b'&') {
        if pair.contains(&b';') {
            return Err(FormError::Semicolon);
        }
        check_escapes(pair)?;
    }
    Ok(())
}

fn check_escapes(segment: &[u8]) -> Result<(), FormError> {
    let mut i = 0;
    while let Some(pos) = segment[i..].iter().position(|b| *b == b'%') {
        let at = i + pos;
        let valid = segment
            .get(at + 1..at + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            let end = (at + 3).min(segment.len());
            return Err(FormError::InvalidEscape(
                String::from_utf8_lossy(&segment[at..end]).into_owned(),
            ));
        }
        i = at + 3;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn form_headers(ct: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
        headers
    }

    fn parse_body(raw: &str) -> Result<SmsForm, FormError> {
        SmsForm::parse(&form_headers(FORM_CONTENT_TYPE), None, raw.as_bytes())
    }

    #[test]
    fn decodes_body_field() {
        let form = parse_body("From=%2B15550001111&Body=Request+The%20Wire").unwrap();
        assert_eq!(form.body, "Request The Wire");
    }

    #[test]
    fn missing_body_field_is_empty() {
        assert_eq!(parse_body("From=x").unwrap().body, "");
        assert_eq!(parse_body("").unwrap().body, "");
    }

    #[test]
    fn charset_parameter_is_accepted() {
        let headers = form_headers("application/x-www-form-urlencoded; charset=UTF-8");
        let form = SmsForm::parse(&headers, None, b"Body=hi").unwrap();
        assert_eq!(form.body, "hi");
    }

    #[test]
    fn body_wins_over_query() {
        let headers = form_headers(FORM_CONTENT_TYPE);
        let form =
            SmsForm::parse(&headers, Some("Body=from-query"), b"Body=from-body").unwrap();
        assert_eq!(form.body, "from-body");
        let form = SmsForm::parse(&headers, Some("Body=from-query"), b"From=x").unwrap();
        assert_eq!(form.body, "from-query");
    }

    #[test]
    fn broken_escapes_are_rejected() {
        assert_eq!(
            parse_body("Body=%ZZ"),
            Err(FormError::InvalidEscape("%ZZ".to_string()))
        );
        assert_eq!(
            parse_body("Body=Request%2"),
            Err(FormError::InvalidEscape("%2".to_string()))
        );
        assert_eq!(
            parse_body("Body=ok%"),
            Err(FormError::InvalidEscape("%".to_string()))
        );
        assert!(parse_body("Body=100%25").is_ok());
    }

    #[test]
    fn semicolons_are_rejected() {
        assert_eq!(parse_body("a;b=c"), Err(FormError::Semicolon));
        assert_eq!(parse_body("Body=x&a=1;2"), Err(FormError::Semicolon));
        assert!(parse_body("Body=x%3By").is_ok());
    }

    #[test]
    fn bad_query_is_rejected_too() {
        let headers = form_headers(FORM_CONTENT_TYPE);
        assert_eq!(
            SmsForm::parse(&headers, Some("x=%G1"), b"Body=hi"),
            Err(FormError::InvalidEscape("%G1".to_string()))
        );
    }

    #[test]
    fn non_form_content_type_is_rejected() {
        let err = SmsForm::parse(&form_headers("application/json"), None, b"{}").unwrap_err();
        assert_eq!(
            err,
            FormError::ContentType(Some("application/json".to_string()))
        );
        let err = SmsForm::parse(&HeaderMap::new(), None, b"Body=hi").unwrap_err();
        assert_eq!(err, FormError::ContentType(None));
    }
}
