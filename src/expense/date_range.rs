//! Date-range filtering for the expense list.

use serde::Deserialize;
use time::{
    Date, OffsetDateTime, Time,
    format_description::BorrowedFormatItem,
    macros::{format_description, time},
};

use crate::Error;

const QUERY_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
const END_OF_DAY: Time = time!(23:59:59.999_999_999);

/// The query string for listing expenses, e.g. `?startDate=2024-01-01&endDate=2024-01-31`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    /// The first day to include, formatted as `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// The last day to include, formatted as `YYYY-MM-DD`.
    pub end_date: Option<String>,
}

/// Inclusive bounds on the date of an expense.
///
/// `None` means the range is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Midnight UTC at the start of the first day.
    pub start: Option<OffsetDateTime>,
    /// The last nanosecond (UTC) of the final day.
    pub end: Option<OffsetDateTime>,
}

impl TryFrom<DateRangeQuery> for DateRange {
    type Error = Error;

    fn try_from(query: DateRangeQuery) -> Result<Self, Self::Error> {
        let start = parse_query_date(query.start_date.as_deref(), "startDate")?
            .map(|date| date.midnight().assume_utc());
        let end = parse_query_date(query.end_date.as_deref(), "endDate")?
            .map(|date| date.with_time(END_OF_DAY).assume_utc());

        Ok(Self { start, end })
    }
}

/// Empty values are treated the same as a missing parameter.
fn parse_query_date(raw_date: Option<&str>, field: &'static str) -> Result<Option<Date>, Error> {
    match raw_date {
        None | Some("") => Ok(None),
        Some(raw_date) => Date::parse(raw_date, QUERY_DATE_FORMAT)
            .map(Some)
            .map_err(|_| Error::InvalidDate(field)),
    }
}
