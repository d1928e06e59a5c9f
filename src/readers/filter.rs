use chrono::{Datelike, NaiveDate};
use polars::prelude::{col, lit, DataType, Expr, LazyFrame};

/// Issue-date cutoffs for source tables.
pub trait IssueDateFilterExt {
    /// Keeps rows whose `(year, month)` lies strictly before the issue date's month.
    fn filter_months_before(self, year_col: &str, month_col: &str, issue_date: NaiveDate) -> LazyFrame;

    /// Keeps rows whose `(year, month)` is at or before the issue date's month.
    fn filter_months_through(self, year_col: &str, month_col: &str, issue_date: NaiveDate) -> LazyFrame;

    /// Keeps rows dated strictly before the issue date.
    fn filter_dates_before(self, date_col: &str, issue_date: NaiveDate) -> LazyFrame;

    /// Keeps rows dated on or before the issue date.
    fn filter_dates_through(self, date_col: &str, issue_date: NaiveDate) -> LazyFrame;

    /// Keeps rows whose integer column equals one of `values`. No values keeps nothing.
    fn filter_one_of(self, column: &str, values: &[i32]) -> LazyFrame;
}

fn month_before(year_col: &str, month_col: &str, issue_date: NaiveDate) -> Expr {
    let (year, month) = (issue_date.year(), issue_date.month() as i32);
    col(year_col)
        .lt(lit(year))
        .or(col(year_col).eq(lit(year)).and(col(month_col).lt(lit(month))))
}

impl IssueDateFilterExt for LazyFrame {
    fn filter_months_before(self, year_col: &str, month_col: &str, issue_date: NaiveDate) -> LazyFrame {
        self.filter(month_before(year_col, month_col, issue_date))
    }

    fn filter_months_through(self, year_col: &str, month_col: &str, issue_date: NaiveDate) -> LazyFrame {
        let (year, month) = (issue_date.year(), issue_date.month() as i32);
        self.filter(
            month_before(year_col, month_col, issue_date)
                .or(col(year_col).eq(lit(year)).and(col(month_col).eq(lit(month)))),
        )
    }

    fn filter_dates_before(self, date_col: &str, issue_date: NaiveDate) -> LazyFrame {
        self.filter(col(date_col).cast(DataType::Date).lt(lit(issue_date)))
    }

    fn filter_dates_through(self, date_col: &str, issue_date: NaiveDate) -> LazyFrame {
        self.filter(col(date_col).cast(DataType::Date).lt_eq(lit(issue_date)))
    }

    fn filter_one_of(self, column: &str, values: &[i32]) -> LazyFrame {
        let predicate = values
            .iter()
            .map(|value| col(column).eq(lit(*value)))
            .reduce(|acc, next| acc.or(next))
            .unwrap_or_else(|| lit(false));
        self.filter(predicate)
    }
}
