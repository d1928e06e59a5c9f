pub mod data_source;
pub mod issue_date;
pub mod season;
pub mod year_month;
