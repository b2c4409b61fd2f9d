// 该文件是 Jingchen （净尘） 项目的一部分。
// src/filter/range.rs - 日期范围
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::FilterError;

const DATE_FORMAT: &str = "%d-%m-%Y";
const DATETIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// 配置中给出的日期边界，只有日期或带时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
  Date(NaiveDate),
  DateTime(NaiveDateTime),
}

impl FromStr for DateBound {
  type Err = FilterError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
      return Ok(DateBound::DateTime(dt));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
      .map(DateBound::Date)
      .map_err(|e| {
        FilterError::InvalidDate(format!(
          "'{}' 不符合 DD-MM-YYYY 或 DD-MM-YYYY HH:MM:SS 格式: {}",
          s, e
        ))
      })
  }
}

impl DateBound {
  /// 作为下界：只有日期时取当天 00:00:00
  pub fn as_start(&self) -> DateTime<Utc> {
    match self {
      DateBound::Date(date) => date.and_time(NaiveTime::MIN).and_utc(),
      DateBound::DateTime(dt) => dt.and_utc(),
    }
  }

  /// 作为上界：只有日期时取当天最后一微秒
  pub fn as_end(&self) -> DateTime<Utc> {
    match self {
      DateBound::Date(date) => end_of_day(*date),
      DateBound::DateTime(dt) => dt.and_utc(),
    }
  }
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
  date.and_time(NaiveTime::MIN).and_utc() + Duration::days(1) - Duration::microseconds(1)
}

/// 闭区间 [start, end]，保证 start <= end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  start: DateTime<Utc>,
  end: DateTime<Utc>,
}

impl DateRange {
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, FilterError> {
    if start > end {
      return Err(FilterError::InvertedRange { start, end });
    }
    Ok(Self { start, end })
  }

  pub fn from_bounds(start: DateBound, end: DateBound) -> Result<Self, FilterError> {
    Self::new(start.as_start(), end.as_end())
  }

  /// 某年某月的完整范围
  pub fn calendar_month(year: i32, month: u32) -> Result<Self, FilterError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
      .ok_or(FilterError::InvalidMonth { year, month })?;
    let next_first = if month == 12 {
      NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
      NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(FilterError::InvalidMonth { year, month })?;

    let last = next_first - Duration::days(1);
    Self::from_bounds(DateBound::Date(first), DateBound::Date(last))
  }

  /// `today` 所在月份的上一个自然月
  pub fn previous_month(today: NaiveDate) -> Self {
    let first_this_month = today.with_day(1).unwrap_or(today);
    let last_prev = first_this_month - Duration::days(1);
    let first_prev = last_prev.with_day(1).unwrap_or(last_prev);
    Self {
      start: DateBound::Date(first_prev).as_start(),
      end: end_of_day(last_prev),
    }
  }

  pub fn start(&self) -> DateTime<Utc> {
    self.start
  }

  pub fn end(&self) -> DateTime<Utc> {
    self.end
  }

  pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
    self.start <= *instant && *instant <= self.end
  }
}

impl std::fmt::Display for DateRange {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{} ~ {}",
      self.start.format("%Y-%m-%dT%H:%M:%S%.6f"),
      self.end.format("%Y-%m-%dT%H:%M:%S%.6f")
    )
  }
}
