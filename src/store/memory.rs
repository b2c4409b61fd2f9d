// 该文件是 Jingchen （净尘） 项目的一部分。
// src/store/memory.rs - 内存记录存储
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

use std::cell::RefCell;

use tracing::debug;

use crate::{
  filter::Predicate,
  record::DetectionRecord,
  store::{RecordStore, StoreError},
};

/// 直接用 [`Predicate::matches`] 求值的存储，单线程使用
#[derive(Debug, Default)]
pub struct MemoryStore {
  records: RefCell<Vec<DetectionRecord>>,
}

impl MemoryStore {
  pub fn new(records: Vec<DetectionRecord>) -> Self {
    Self {
      records: RefCell::new(records),
    }
  }

  pub fn insert(&self, record: DetectionRecord) {
    self.records.borrow_mut().push(record);
  }

  pub fn len(&self) -> usize {
    self.records.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.borrow().is_empty()
  }
}

impl RecordStore for MemoryStore {
  fn ping(&self) -> Result<(), StoreError> {
    Ok(())
  }

  fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
    let count = self
      .records
      .borrow()
      .iter()
      .filter(|record| predicate.matches(record))
      .count();
    Ok(count as u64)
  }

  fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError> {
    let mut records = self.records.borrow_mut();
    let before = records.len();
    records.retain(|record| !predicate.matches(record));
    let deleted = before - records.len();
    debug!("内存存储删除 {} 条记录, 剩余 {} 条", deleted, records.len());
    Ok(deleted as u64)
  }

  fn find(&self, predicate: &Predicate) -> Result<Vec<DetectionRecord>, StoreError> {
    Ok(
      self
        .records
        .borrow()
        .iter()
        .filter(|record| predicate.matches(record))
        .cloned()
        .collect(),
    )
  }
}
