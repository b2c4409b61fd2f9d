// 该文件是 Jingchen （净尘） 项目的一部分。
// src/filter.rs - 记录筛选条件
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

//! 与具体存储无关的筛选条件。
//!
//! [`Predicate`] 由若干 [`Clause`] 以“与”连接；存储适配器在边界处把它翻译成
//! 自己的查询语言，[`Predicate::matches`] 给出内存中的参考语义。

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::record::DetectionRecord;

mod labels;
mod range;

pub use self::labels::LabelSet;
pub use self::range::{DateBound, DateRange};

#[derive(Error, Debug)]
pub enum FilterError {
  #[error("日期格式错误: {0}")]
  InvalidDate(String),
  #[error("日期范围颠倒: 开始 {start} 晚于结束 {end}")]
  InvertedRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  },
  #[error("无效的年月: {year}-{month}")]
  InvalidMonth { year: i32, month: u32 },
  #[error("标签列表错误: {0}")]
  InvalidLabels(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
  /// 不限制 `is_hide`
  #[default]
  Any,
  /// `is_hide == false`
  Visible,
  /// `is_hide == true`
  Hidden,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
  OwnerEquals(String),
  Hidden(bool),
  StatusActive,
  CreatedWithin(DateRange),
  /// 检测列表中至少一项的标签在集合中
  AnyDetectionLabelIn(LabelSet),
  /// 检测列表存在且非空
  HasDetections,
}

impl Clause {
  fn matches(&self, record: &DetectionRecord) -> bool {
    match self {
      Clause::OwnerEquals(user_id) => record.user_id == *user_id,
      Clause::Hidden(hidden) => record.is_hide == *hidden,
      Clause::StatusActive => record.status,
      Clause::CreatedWithin(range) => record
        .created_date
        .as_ref()
        .is_some_and(|created| range.contains(created)),
      Clause::AnyDetectionLabelIn(labels) => record
        .detections
        .iter()
        .any(|det| labels.contains(&det.label)),
      Clause::HasDetections => !record.detections.is_empty(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
  clauses: Vec<Clause>,
}

impl Predicate {
  pub fn clauses(&self) -> &[Clause] {
    &self.clauses
  }

  pub fn matches(&self, record: &DetectionRecord) -> bool {
    self.clauses.iter().all(|clause| clause.matches(record))
  }
}

#[derive(Debug, Clone)]
pub struct FilterBuilder {
  user_id: String,
  range: Option<DateRange>,
  labels: LabelSet,
  require_status: bool,
  visibility: Visibility,
  require_detections: bool,
}

impl FilterBuilder {
  pub fn new(user_id: &str) -> Self {
    Self {
      user_id: user_id.to_string(),
      range: None,
      labels: LabelSet::default(),
      require_status: false,
      visibility: Visibility::Any,
      require_detections: false,
    }
  }

  pub fn created_within(mut self, range: DateRange) -> Self {
    self.range = Some(range);
    self
  }

  pub fn labels(mut self, labels: LabelSet) -> Self {
    self.labels = labels;
    self
  }

  pub fn require_status(mut self, require: bool) -> Self {
    self.require_status = require;
    self
  }

  pub fn visibility(mut self, visibility: Visibility) -> Self {
    self.visibility = visibility;
    self
  }

  pub fn require_detections(mut self, require: bool) -> Self {
    self.require_detections = require;
    self
  }

  pub fn build(self) -> Predicate {
    let mut clauses = vec![Clause::OwnerEquals(self.user_id)];

    match self.visibility {
      Visibility::Any => {}
      Visibility::Visible => clauses.push(Clause::Hidden(false)),
      Visibility::Hidden => clauses.push(Clause::Hidden(true)),
    }
    if self.require_status {
      clauses.push(Clause::StatusActive);
    }
    if let Some(range) = self.range {
      clauses.push(Clause::CreatedWithin(range));
    }
    if self.require_detections {
      clauses.push(Clause::HasDetections);
    }
    // 空集合表示不限制标签
    if !self.labels.is_empty() {
      clauses.push(Clause::AnyDetectionLabelIn(self.labels));
    }

    Predicate { clauses }
  }
}

/// 按用户、时间范围、标签构造筛选条件。
///
/// 不做任何校验，空用户 ID 或颠倒的范围应在解析配置时拒绝。
pub fn build_filter(
  user_id: &str,
  range: DateRange,
  labels: &LabelSet,
  require_status: bool,
  require_visible: bool,
) -> Predicate {
  FilterBuilder::new(user_id)
    .created_within(range)
    .labels(labels.clone())
    .require_status(require_status)
    .visibility(if require_visible {
      Visibility::Visible
    } else {
      Visibility::Any
    })
    .build()
}
