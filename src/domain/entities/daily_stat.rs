//! Daily aggregate entity produced by the analytics rollup.

use chrono::NaiveDate;
use serde::Serialize;

/// Aggregated click totals for one link on one calendar day.
///
/// At most one row exists per `(link_id, day)`; re-running aggregation for
/// the same day overwrites the row with freshly computed totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStat {
    pub link_id: i64,
    pub day: NaiveDate,
    pub clicks: i64,
    pub unique_visitors: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_stat_equality() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let a = DailyStat {
            link_id: 1,
            day,
            clicks: 10,
            unique_visitors: 7,
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
