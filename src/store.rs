// 该文件是 Jingchen （净尘） 项目的一部分。
// src/store.rs - 检测记录存储
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

use thiserror::Error;

use crate::{filter::Predicate, record::DetectionRecord};

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("无法连接数据库: {0}")]
  Connection(String),
  #[error("数据库查询失败: {0}")]
  Query(String),
  #[error("数据库地址错误: {0}")]
  InvalidAddress(String),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

/// 记录存储。删除一旦匹配即立即执行，不可撤销。
pub trait RecordStore {
  fn ping(&self) -> Result<(), StoreError>;
  fn count(&self, predicate: &Predicate) -> Result<u64, StoreError>;
  fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError>;
  fn find(&self, predicate: &Predicate) -> Result<Vec<DetectionRecord>, StoreError>;
}

mod memory;
pub use self::memory::MemoryStore;

#[cfg(feature = "mongo_store")]
mod mongo;
#[cfg(feature = "mongo_store")]
pub use self::mongo::{MongoAddress, MongoStore, MongoStoreBuilder, predicate_to_document};
