use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};
use validator::ValidationError;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn parse_date(value: &str) -> crate::Result<Date> {
    Date::parse(value.trim(), DATE_FORMAT)
        .map_err(|_| crate::Error::User(format!("Invalid date '{value}', expected YYYY-MM-DD")))
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_default()
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Number of days from `start` to `end`, negative when `end` comes first.
pub fn days_between(start: Date, end: Date) -> i64 {
    (end - start).whole_days()
}

pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    match Date::parse(value.trim(), DATE_FORMAT) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("date").with_message("expected YYYY-MM-DD".into())),
    }
}
