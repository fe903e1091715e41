use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const ISO_DATE: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Calendar date of "now" in UTC. All date-keyed state (plans, weight
/// history) uses this single clock source so a request can never straddle a
/// local-midnight boundary internally.
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn parse(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s, ISO_DATE)
}

pub fn format(date: Date) -> String {
    // The format description is static and infallible for any valid Date.
    date.format(ISO_DATE).expect("iso date format")
}

/// Serde adapter for `YYYY-MM-DD` date fields.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    #[test]
    fn roundtrips_iso_dates() {
        let d = date!(2024 - 01 - 01);
        assert_eq!(super::format(d), "2024-01-01");
        assert_eq!(super::parse("2024-01-01").unwrap(), d);
    }

    #[test]
    fn rejects_garbage() {
        assert!(super::parse("01/01/2024").is_err());
        assert!(super::parse("not-a-date").is_err());
    }
}
