//! 时间工具函数: 业务时区转换
//!
//! 所有日期→时间戳转换统一在 handler / service 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::{AppError, AppResult};

/// 当前时间 (Unix millis)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析 IANA 时区名称
pub fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.parse::<Tz>()
        .map_err(|_| format!("Unknown timezone: {name}"))
}

/// 业务时区的今天
pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// 日期 + 时间 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn date_time_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_time_to_millis(date, NaiveTime::MIN, tz)
}

/// 日期结束 → 次日 00:00:00 的 Unix millis (业务时区)
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// 一周起始日 (周日)
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// 月份第一天
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Unix millis → RFC 3339 (业务时区)
pub fn format_millis(millis: i64, tz: Tz) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&tz).to_rfc3339())
        .unwrap_or_default()
}

/// Unix millis → 业务日期
pub fn millis_to_date(millis: i64, tz: Tz) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.with_timezone(&tz).date_naive())
}

/// 请求体中的日期: Unix millis 或字符串 (`YYYY-MM-DD` / RFC 3339)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Millis(i64),
    Text(String),
}

impl DateInput {
    /// 转换为 Unix millis; 纯日期取业务时区当天零点
    pub fn to_millis(&self, tz: Tz) -> AppResult<i64> {
        match self {
            DateInput::Millis(ms) => Ok(*ms),
            DateInput::Text(text) => {
                if let Ok(date) = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
                    return Ok(day_start_millis(date, tz));
                }
                DateTime::parse_from_rfc3339(text.trim())
                    .map(|dt| dt.timestamp_millis())
                    .map_err(|_| AppError::validation(format!("Invalid date: {}", text)))
            }
        }
    }
}
