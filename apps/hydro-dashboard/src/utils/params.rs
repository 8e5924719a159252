//! 查询参数解析

use axum::response::Response;
use chrono::NaiveDate;
use domain::{DateRange, Metric};

use super::response::bad_request_error;

pub fn parse_metric(raw: &str) -> Result<Metric, Response> {
    Metric::parse(raw).ok_or_else(|| bad_request_error(format!("unknown metric: {raw}")))
}

/// `YYYY-MM-DD` 起止日期，闭区间。
pub fn parse_date_range(start: &str, end: &str) -> Result<DateRange, Response> {
    let parse = |raw: &str| {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| bad_request_error(format!("invalid date: {raw}")))
    };
    DateRange::new(parse(start)?, parse(end)?).map_err(|err| bad_request_error(err.to_string()))
}
