//! 时间工具函数 — 业务时区转换
//!
//! 所有日期→时间戳转换统一在 API handler 层完成，
//! storage 层只接收 `i64` Unix millis。

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 当前时间 (Unix millis)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析业务时区名称 (e.g. `Africa/Lagos`)
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.parse::<Tz>().ok()
}

/// Unix millis → 业务时区日期
pub fn local_date(millis: i64, tz: Tz) -> NaiveDate {
    tz.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.date_naive())
        .unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive())
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
///
/// DST gap fallback: 本地时间不存在时按 UTC 计算。
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期结束 → 次日 00:00:00 的 Unix millis (业务时区)
///
/// 调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2024-05-01").is_ok());
        assert!(parse_date("01/05/2024").is_err());
    }

    #[test]
    fn test_lagos_day_bounds() {
        // Africa/Lagos = UTC+1, 无夏令时
        let tz = chrono_tz::Africa::Lagos;
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let start = day_start_millis(date, tz);
        let end = day_end_millis(date, tz);
        assert_eq!(end - start, 86_400_000);
        // 2024-04-30T23:00:00Z
        assert_eq!(start, 1_714_518_000_000);
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let tz = chrono_tz::Africa::Lagos;
        // 2024-04-30T23:30:00Z = 2024-05-01 00:30 Lagos
        let millis = 1_714_519_800_000;
        assert_eq!(local_date(millis, tz), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Africa/Lagos"), Some(chrono_tz::Africa::Lagos));
        assert_eq!(parse_timezone("Mars/Olympus"), None);
    }
}
