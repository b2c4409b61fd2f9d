// 该文件是 Jingchen （净尘） 项目的一部分。
// src/task/purge.rs - 按条件删除记录
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

use tracing::{info, warn};

use crate::{filter::Predicate, store::RecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PurgeReport {
  pub matched: u64,
  pub deleted: u64,
}

/// 标准输出上的结果摘要
impl std::fmt::Display for PurgeReport {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "Matching records for deletion: {}", self.matched)?;
    if self.matched == 0 {
      write!(f, "No records found in the specified date range. Nothing to delete.")
    } else {
      write!(f, "Total records deleted: {}", self.deleted)
    }
  }
}

/// 先计数再删除。匹配即删除，没有确认环节。
#[derive(Debug, Clone)]
pub struct PurgeTask {
  predicate: Predicate,
}

impl PurgeTask {
  pub fn new(predicate: Predicate) -> Self {
    Self { predicate }
  }

  pub fn run_task<S: RecordStore>(self, store: &S) -> anyhow::Result<PurgeReport> {
    info!("开始删除任务...");
    store.ping()?;

    let matched = store.count(&self.predicate)?;
    info!("匹配记录数: {}", matched);
    if matched == 0 {
      return Ok(PurgeReport::default());
    }

    let deleted = store.delete(&self.predicate)?;
    if deleted != matched {
      warn!("删除数 {} 与匹配数 {} 不一致", deleted, matched);
    }
    info!("删除完成: {} 条", deleted);

    Ok(PurgeReport { matched, deleted })
  }
}
