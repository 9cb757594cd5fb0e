use actix_web::http::header;
use actix_web::HttpResponse;
use chrono::{Duration, NaiveDateTime, SubsecRound, Utc};
use serde_json::Value;
use crate::core::errors::StorageError;
use crate::models::models::timestamp;

/// Current UTC time, truncated to the microseconds the snapshot keeps.
pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

pub fn now_iso() -> String {
    timestamp::format(&now_utc())
}

/// Current time, nudged forward so it sorts strictly after `previous`.
///
/// A `previous` value that cannot be read as a timestamp imposes no bound.
pub fn now_after(previous: &str) -> String {
    let now = now_utc();
    match timestamp::parse(previous) {
        Some(prev) if now <= prev => timestamp::format(&(prev + Duration::microseconds(1))),
        _ => timestamp::format(&now),
    }
}

/// Coerce a caller-supplied `author_id` to an integer.
///
/// Accepts JSON integers, strings holding an integer, and finite floats,
/// which are truncated toward zero.
pub fn parse_author_id(value: Option<&Value>) -> Result<i64, StorageError> {
    match value {
        None | Some(Value::Null) => Err(StorageError::AuthorIdRequired),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(truncate_float))
            .ok_or_else(|| StorageError::InvalidAuthorId(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| StorageError::InvalidAuthorId(s.clone())),
        Some(other) => Err(StorageError::InvalidAuthorId(other.to_string())),
    }
}

fn truncate_float(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    let in_range = value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64;
    in_range.then(|| value.trunc() as i64)
}

pub fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// 303 so the browser follows a form POST with a GET.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn author_id_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_author_id(Some(&json!(4))).unwrap(), 4);
        assert_eq!(parse_author_id(Some(&json!("12"))).unwrap(), 12);
        assert_eq!(parse_author_id(Some(&json!(" 7 "))).unwrap(), 7);
    }

    #[test]
    fn author_id_truncates_floats() {
        assert_eq!(parse_author_id(Some(&json!(2.0))).unwrap(), 2);
        assert_eq!(parse_author_id(Some(&json!(1.5))).unwrap(), 1);
        assert_eq!(parse_author_id(Some(&json!(-1.5))).unwrap(), -1);
        assert!(matches!(
            parse_author_id(Some(&json!(1e300))),
            Err(StorageError::InvalidAuthorId(_))
        ));
    }

    #[test]
    fn author_id_rejects_missing_and_garbage() {
        assert!(matches!(parse_author_id(None), Err(StorageError::AuthorIdRequired)));
        assert!(matches!(
            parse_author_id(Some(&Value::Null)),
            Err(StorageError::AuthorIdRequired)
        ));
        assert!(matches!(
            parse_author_id(Some(&json!("abc"))),
            Err(StorageError::InvalidAuthorId(s)) if s == "abc"
        ));
        assert!(matches!(
            parse_author_id(Some(&json!("1.5"))),
            Err(StorageError::InvalidAuthorId(_))
        ));
        assert!(matches!(
            parse_author_id(Some(&json!(true))),
            Err(StorageError::InvalidAuthorId(_))
        ));
    }

    #[test]
    fn now_after_is_strictly_later() {
        let future = now_utc() + Duration::seconds(60);
        let bumped = timestamp::parse(&now_after(&timestamp::format(&future))).unwrap();
        assert_eq!(bumped, future + Duration::microseconds(1));

        let past = now_utc() - Duration::seconds(60);
        let later = timestamp::parse(&now_after(&timestamp::format(&past))).unwrap();
        assert!(later > past);

        // minute precision from an older snapshot still orders correctly
        assert!(timestamp::parse(&now_after("2024-05-01T09:30")).unwrap() > past);
        assert!(timestamp::parse(&now_after("not a time")).is_some());
    }
}
