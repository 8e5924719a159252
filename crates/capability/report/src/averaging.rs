//! 按小时/按天取平均。
//!
//! 按截断后的时间戳分桶，每列取桶内有值读数的算术平均；桶内某列全部缺失时该列为空。

use chrono::{DateTime, Timelike, Utc};
use domain::Averaging;
use std::collections::BTreeMap;

use crate::table::{ReportRow, ReportTable};

/// 桶的起始时间。
pub fn bucket_start(ts: DateTime<Utc>, averaging: Averaging) -> DateTime<Utc> {
    match averaging {
        Averaging::None => ts,
        Averaging::Hourly => ts
            .with_nanosecond(0)
            .and_then(|ts| ts.with_second(0))
            .and_then(|ts| ts.with_minute(0))
            .unwrap_or(ts),
        Averaging::Daily => ts
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or(ts),
    }
}

pub fn average(table: ReportTable, averaging: Averaging) -> ReportTable {
    if averaging == Averaging::None {
        return table;
    }
    let width = table.columns.len();
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<(f64, usize)>> = BTreeMap::new();
    for row in &table.rows {
        let sums = buckets
            .entry(bucket_start(row.timestamp, averaging))
            .or_insert_with(|| vec![(0.0, 0); width]);
        for (slot, value) in sums.iter_mut().zip(&row.values) {
            if let Some(value) = value {
                slot.0 += value;
                slot.1 += 1;
            }
        }
    }
    let rows = buckets
        .into_iter()
        .map(|(timestamp, sums)| ReportRow {
            timestamp,
            values: sums
                .into_iter()
                .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
                .collect(),
        })
        .collect();
    ReportTable {
        columns: table.columns,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use chrono::TimeZone;
    use domain::Metric;

    fn row(h: u32, m: u32, value: Option<f64>) -> ReportRow {
        ReportRow {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, h, m, 30).unwrap(),
            values: vec![value],
        }
    }

    fn table(rows: Vec<ReportRow>) -> ReportTable {
        ReportTable {
            columns: vec![Column::Metric(Metric::Pressure)],
            rows,
        }
    }

    #[test]
    fn hourly_buckets_average_present_values() {
        let averaged = average(
            table(vec![
                row(10, 5, Some(40.0)),
                row(10, 35, Some(50.0)),
                row(10, 50, None),
                row(11, 0, None),
            ]),
            Averaging::Hourly,
        );
        assert_eq!(averaged.rows.len(), 2);
        assert_eq!(
            averaged.rows[0].timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(averaged.rows[0].values, vec![Some(45.0)]);
        assert_eq!(averaged.rows[1].values, vec![None]);
    }

    #[test]
    fn daily_and_none() {
        let rows = vec![row(1, 0, Some(1.0)), row(23, 59, Some(3.0))];
        let daily = average(table(rows.clone()), Averaging::Daily);
        assert_eq!(daily.rows.len(), 1);
        assert_eq!(daily.rows[0].values, vec![Some(2.0)]);

        let untouched = average(table(rows.clone()), Averaging::None);
        assert_eq!(untouched.rows, rows);
    }
}
