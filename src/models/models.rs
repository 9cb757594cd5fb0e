use serde::{Serialize, Deserialize};

/// Timestamps are kept as the ISO-8601 text found in the snapshot; only
/// [`timestamp::parse`] interprets them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Common shape of the stored entities, so the storage can treat both
/// collections the same way.
pub trait Record {
    /// Name used in validation errors and logs.
    const ENTITY: &'static str;

    fn id(&self) -> i64;
    fn updated_at(&self) -> &str;
}

impl Record for User {
    const ENTITY: &'static str = "user";

    fn id(&self) -> i64 {
        self.id
    }

    fn updated_at(&self) -> &str {
        &self.updated_at
    }
}

impl Record for Post {
    const ENTITY: &'static str = "post";

    fn id(&self) -> i64 {
        self.id
    }

    fn updated_at(&self) -> &str {
        &self.updated_at
    }
}

/// Naive UTC timestamps, written as `2024-05-01T09:30:00.000123`.
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};

    pub const WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

    const NAIVE_FORMATS: [&str; 6] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y%m%dT%H%M%S%.f",
        "%Y%m%dT%H%M",
    ];

    pub fn format(value: &NaiveDateTime) -> String {
        value.format(WRITE_FORMAT).to_string()
    }

    /// Interpret a stored timestamp as naive UTC.
    ///
    /// Accepts extended and basic ISO-8601 forms at minute, second or
    /// fractional precision, date-only values, a trailing `Z`, and RFC 3339
    /// offsets (converted to UTC).
    pub fn parse(value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.naive_utc());
        }
        if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z") {
            return Some(dt.naive_utc());
        }
        let naive = value.strip_suffix('Z').unwrap_or(value);
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
            .or_else(|| {
                ["%Y-%m-%d", "%Y%m%d"]
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(naive, fmt).ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn sample_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(9, 30, 0, 123)
            .unwrap()
    }

    #[test]
    fn user_uses_camel_case_timestamps() {
        let user = User {
            id: 1,
            login: "a".to_string(),
            email: "a@x.com".to_string(),
            password: "secret".to_string(),
            created_at: "2024-05-01T09:30:00.000123".to_string(),
            updated_at: "2024-05-01T09:30".to_string(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["createdAt"], "2024-05-01T09:30:00.000123");
        assert_eq!(value["updatedAt"], "2024-05-01T09:30");
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn post_keeps_snake_case_author_id() {
        let post = Post {
            id: 3,
            title: "t".to_string(),
            content: "c".to_string(),
            author_id: 7,
            created_at: timestamp::format(&sample_time()),
            updated_at: timestamp::format(&sample_time()),
        };
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["author_id"], 7);
        assert!(value.get("authorId").is_none());
    }

    #[test]
    fn timestamp_parse_accepts_python_isoformat_variants() {
        assert_eq!(timestamp::parse("2024-05-01T09:30:00.000123"), Some(sample_time()));
        // isoformat() drops the fraction when it is zero
        let whole = timestamp::parse("2024-05-01T09:30:00").unwrap();
        assert_eq!(timestamp::format(&whole), "2024-05-01T09:30:00.000000");
        let shifted = timestamp::parse("2024-05-01T11:30:00.000123+02:00").unwrap();
        assert_eq!(shifted, sample_time());
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn timestamp_parse_accepts_other_iso_forms() {
        let minute = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(timestamp::parse("2024-05-01T09:30"), Some(minute));
        assert_eq!(timestamp::parse("2024-05-01T09:30Z"), Some(minute));
        assert_eq!(timestamp::parse("2024-05-01T11:30+02:00"), Some(minute));
        assert_eq!(timestamp::parse("20240501T093000"), Some(minute));
        assert_eq!(timestamp::parse("2024-05-01 09:30:00"), Some(minute));

        let midnight = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(timestamp::parse("2024-05-01"), Some(midnight));
        assert_eq!(timestamp::parse("20240501"), Some(midnight));
    }
}
