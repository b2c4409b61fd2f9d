// 该文件是 Jingchen （净尘） 项目的一部分。
// src/record.rs - 检测记录数据模型
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

use chrono::{DateTime, NaiveDateTime, Utc};

/// 解析以字符串形式保存的创建时间，依次尝试 `2025-06-01T08:00:00.123Z` 和 RFC 3339
pub fn parse_created_date(s: &str) -> Option<DateTime<Utc>> {
  NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
    .map(|dt| dt.and_utc())
    .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc)))
    .ok()
}

/// 坐标值。上游数据不保证是数值，保留原始形态，在绘制时再校验。
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinate {
  Number(f64),
  Text(String),
  /// 其他无法解释为坐标的值（布尔、空值、嵌套结构等），保存其文本形式用于报错
  Other(String),
}

impl Coordinate {
  /// 按整数解释坐标：浮点数向零截断，字符串必须是整数文本
  pub fn as_pixel(&self) -> Option<i32> {
    match self {
      Coordinate::Number(v) if v.is_finite() => Some(v.trunc() as i32),
      Coordinate::Number(_) => None,
      Coordinate::Text(s) => s.trim().parse::<i32>().ok(),
      Coordinate::Other(_) => None,
    }
  }
}

impl std::fmt::Display for Coordinate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Coordinate::Number(v) => write!(f, "{}", v),
      Coordinate::Text(s) => write!(f, "'{}'", s),
      Coordinate::Other(s) => write!(f, "{}", s),
    }
  }
}

impl From<i32> for Coordinate {
  fn from(v: i32) -> Self {
    Coordinate::Number(v as f64)
  }
}

impl From<f64> for Coordinate {
  fn from(v: f64) -> Self {
    Coordinate::Number(v)
  }
}

impl From<&str> for Coordinate {
  fn from(v: &str) -> Self {
    Coordinate::Text(v.to_string())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
  pub label: String,
  /// [x1, y1, x2, y2]，两个角点不保证按最小/最大排序
  pub location: Option<Vec<Coordinate>>,
}

impl Detection {
  pub fn new<C: Into<Coordinate>>(label: &str, location: impl IntoIterator<Item = C>) -> Self {
    Self {
      label: label.to_string(),
      location: Some(location.into_iter().map(Into::into).collect()),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
  pub id: Option<String>,
  pub user_id: String,
  pub is_hide: bool,
  pub status: bool,
  pub created_date: Option<DateTime<Utc>>,
  pub image_url: Option<String>,
  pub detections: Vec<Detection>,
}

impl DetectionRecord {
  /// 图像 URL 最后一段作为原始文件名
  pub fn image_file_name(&self) -> Option<&str> {
    self
      .image_url
      .as_deref()
      .and_then(|url| url.rsplit('/').next())
      .filter(|name| !name.is_empty())
  }
}
