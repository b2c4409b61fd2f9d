// 该文件是 Jingchen （净尘） 项目的一部分。
// src/filter/labels.rs - 标签集合
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

use std::collections::BTreeSet;
use std::str::FromStr;

use serde_json::Value;

use super::FilterError;

/// 检测标签集合，成员判断为精确字符串相等
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
  labels: BTreeSet<String>,
}

impl LabelSet {
  pub fn contains(&self, label: &str) -> bool {
    self.labels.contains(label)
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.labels.iter().map(String::as_str)
  }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self {
      labels: iter.into_iter().map(Into::into).collect(),
    }
  }
}

/// 解析 JSON 字符串数组，例如 `["no_helmet","no_vest"]`。
/// 单引号会先替换为双引号，兼容 `['no_helmet']` 这种写法。
impl FromStr for LabelSet {
  type Err = FilterError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().replace('\'', "\"");
    let value: Value = serde_json::from_str(&normalized)
      .map_err(|e| FilterError::InvalidLabels(format!("无法解析 JSON: {}", e)))?;

    let Value::Array(items) = value else {
      return Err(FilterError::InvalidLabels(
        "必须是 JSON 字符串数组".to_string(),
      ));
    };

    items
      .into_iter()
      .map(|item| match item {
        Value::String(label) => Ok(label),
        other => Err(FilterError::InvalidLabels(format!(
          "数组元素必须是字符串, 实际为 {}",
          other
        ))),
      })
      .collect()
  }
}

impl std::fmt::Display for LabelSet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let labels: Vec<&str> = self.iter().collect();
    write!(f, "{}", labels.join(", "))
  }
}
