use crate::error::WaterSupplyError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt::Debug;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Anything that can stand in for a forecast issue date.
///
/// Only the calendar date matters, any time-of-day component is dropped.
pub trait AnyIssueDate: Debug {
    fn get_issue_date(self) -> Option<NaiveDate>;
}

impl AnyIssueDate for NaiveDate {
    fn get_issue_date(self) -> Option<NaiveDate> {
        Some(self)
    }
}

impl AnyIssueDate for NaiveDateTime {
    fn get_issue_date(self) -> Option<NaiveDate> {
        Some(self.date())
    }
}

impl<Tz: TimeZone> AnyIssueDate for DateTime<Tz>
where
    Tz::Offset: Debug,
{
    fn get_issue_date(self) -> Option<NaiveDate> {
        Some(self.naive_local().date())
    }
}

impl AnyIssueDate for &str {
    fn get_issue_date(self) -> Option<NaiveDate> {
        let text = self.trim();
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(date);
            }
        }
        if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
            return datetime.get_issue_date();
        }
        for format in DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
                return Some(datetime.date());
            }
        }
        None
    }
}

impl AnyIssueDate for String {
    fn get_issue_date(self) -> Option<NaiveDate> {
        self.as_str().get_issue_date()
    }
}

impl AnyIssueDate for &String {
    fn get_issue_date(self) -> Option<NaiveDate> {
        self.as_str().get_issue_date()
    }
}

/// Normalizes an issue date, failing with [`WaterSupplyError::InvalidIssueDate`].
pub(crate) fn resolve_issue_date(issue_date: impl AnyIssueDate) -> Result<NaiveDate, WaterSupplyError> {
    let described = format!("{issue_date:?}");
    issue_date
        .get_issue_date()
        .ok_or(WaterSupplyError::InvalidIssueDate(described))
}
