//! Redshift date functions registered on the local SQLite warehouse so the
//! transform SQL runs unchanged on both.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, Error};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// `DATE_PART` with Redshift semantics: `week` is the ISO week and
/// `weekday` counts from Sunday = 0.
pub fn date_part(part: &str, ts: &NaiveDateTime) -> Option<i64> {
    let value = match part.trim().to_ascii_lowercase().as_str() {
        "year" | "years" | "y" | "yr" | "yrs" => ts.year() as i64,
        "quarter" | "quarters" | "qtr" | "qtrs" => (ts.month0() / 3 + 1) as i64,
        "month" | "months" | "mon" | "mons" => ts.month() as i64,
        "week" | "weeks" | "w" => ts.iso_week().week() as i64,
        "weekday" | "dayofweek" | "dow" | "dw" => ts.weekday().num_days_from_sunday() as i64,
        "dayofyear" | "doy" | "dy" | "yearday" => ts.ordinal() as i64,
        "day" | "days" | "d" => ts.day() as i64,
        "hour" | "hours" | "h" | "hr" | "hrs" => ts.hour() as i64,
        "minute" | "minutes" | "m" | "min" | "mins" => ts.minute() as i64,
        "second" | "seconds" | "s" | "sec" | "secs" => ts.second() as i64,
        _ => return None,
    };
    Some(value)
}

pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "date_part",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let part: String = ctx.get(0)?;
            let Some(value) = ctx.get::<Option<String>>(1)? else {
                return Ok(None);
            };

            let ts = parse_timestamp(&value).ok_or_else(|| {
                Error::UserFunctionError(format!("invalid timestamp '{}'", value).into())
            })?;
            let result = date_part(&part, &ts).ok_or_else(|| {
                Error::UserFunctionError(format!("unsupported date part '{}'", part).into())
            })?;

            Ok(Some(result))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_calendar_date() {
        // 2018-11-11 was a Sunday in ISO week 45
        let ts = parse_timestamp("2018-11-11 02:33:56.796").unwrap();
        assert_eq!(date_part("hour", &ts), Some(2));
        assert_eq!(date_part("day", &ts), Some(11));
        assert_eq!(date_part("week", &ts), Some(45));
        assert_eq!(date_part("month", &ts), Some(11));
        assert_eq!(date_part("year", &ts), Some(2018));
        assert_eq!(date_part("weekday", &ts), Some(0));
        assert_eq!(date_part("fortnight", &ts), None);
    }

    #[test]
    fn test_iso_week_at_year_boundary() {
        // Monday 2018-12-31 belongs to ISO week 1 of 2019
        let ts = parse_timestamp("2018-12-31").unwrap();
        assert_eq!(date_part("week", &ts), Some(1));
        assert_eq!(date_part("dow", &ts), Some(1));
    }

    #[test]
    fn test_sql_function() {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();

        let week: i64 = conn
            .query_row("SELECT DATE_PART('week', '2018-11-30 00:00:00')", [], |r| r.get(0))
            .unwrap();
        assert_eq!(week, 48);

        let null: Option<i64> = conn
            .query_row("SELECT date_part('hour', NULL)", [], |r| r.get(0))
            .unwrap();
        assert_eq!(null, None);

        assert!(conn
            .query_row("SELECT date_part('hour', 'yesterday')", [], |r| r.get::<_, i64>(0))
            .is_err());
    }
}
