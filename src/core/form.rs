use std::collections::HashMap;
use serde_json::Value;
use crate::core::errors::ApiError;
use crate::core::storage::Fields;

/// Parse an `application/x-www-form-urlencoded` body.
///
/// `+` decodes to a space. A key repeated in the body keeps its last value.
///
/// # Example
/// ```
/// use blog::core::form::parse_form;
///
/// let form = parse_form(b"login=john+doe&email=j%40x.com");
/// assert_eq!(form.get("login"), Some(&"john doe".to_string()));
/// assert_eq!(form.get("email"), Some(&"j@x.com".to_string()));
/// ```
pub fn parse_form(body: &[u8]) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let body = String::from_utf8_lossy(body);

    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode(key), decode(value));
    }

    params
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// Collect the named form fields into a storage field mapping.
///
/// Every name is required; the first missing one is reported.
pub fn required_fields(form: &HashMap<String, String>, names: &[&str]) -> Result<Fields, ApiError> {
    let mut fields = Fields::new();
    for name in names {
        let value = form
            .get(*name)
            .ok_or_else(|| ApiError::BadRequest(format!("{} is required", name)))?;
        fields.insert(name.to_string(), Value::String(value.clone()));
    }
    Ok(fields)
}
