// 该文件是 Jingchen （净尘） 项目的一部分。
// src/task/backup.rs - 检测图像标注备份
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

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
  filter::{LabelSet, Predicate},
  input::{ImageSource, InputError},
  output::{AnnotateError, Annotator, DirectoryBackupError, DirectoryBackupOutput},
  record::{Detection, DetectionRecord},
  store::RecordStore,
};

/// 单条记录的失败原因，均只跳过当前记录
#[derive(Error, Debug)]
pub enum BackupError {
  #[error("记录缺少图像 URL")]
  MissingImageUrl,
  #[error("无法从图像 URL 得到文件名: {0}")]
  InvalidImageUrl(String),
  #[error("下载失败: {0}")]
  Fetch(#[from] InputError),
  #[error("图像解码失败: {0}")]
  Decode(#[from] image::ImageError),
  #[error("{0}")]
  Annotate(#[from] AnnotateError),
  #[error("保存失败: {0}")]
  Save(#[from] DirectoryBackupError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackupReport {
  /// 查询返回的记录数
  pub found: usize,
  /// 含有目标标签的记录数
  pub matching: usize,
  pub saved: usize,
  pub skipped: usize,
}

pub struct BackupTask {
  predicate: Predicate,
  labels: LabelSet,
  annotator: Annotator,
  today: NaiveDate,
}

impl BackupTask {
  pub fn new(predicate: Predicate, labels: LabelSet, annotator: Annotator) -> Self {
    Self {
      predicate,
      labels,
      annotator,
      today: Local::now().date_naive(),
    }
  }

  /// 记录没有创建时间时使用的日期目录
  pub fn with_today(mut self, today: NaiveDate) -> Self {
    self.today = today;
    self
  }

  fn selected<'r>(&self, record: &'r DetectionRecord) -> Vec<&'r Detection> {
    record
      .detections
      .iter()
      .filter(|det| self.labels.contains(&det.label))
      .collect()
  }

  pub fn run_task<S: RecordStore, I: ImageSource>(
    self,
    store: &S,
    source: &I,
    output: &DirectoryBackupOutput,
  ) -> anyhow::Result<BackupReport> {
    info!("开始备份任务...");
    store.ping()?;

    let records = store.find(&self.predicate)?;
    let mut report = BackupReport {
      found: records.len(),
      ..Default::default()
    };
    if records.is_empty() {
      info!("没有找到记录");
      return Ok(report);
    }
    info!("找到记录: {}", report.found);

    report.matching = records
      .iter()
      .filter(|record| !self.selected(record).is_empty())
      .count();
    info!("含目标标签 ({}) 的记录: {}", self.labels, report.matching);

    for record in records.iter() {
      let selected = self.selected(record);
      if selected.is_empty() {
        continue;
      }

      match self.backup_record(record, &selected, source, output) {
        Ok(path) => {
          report.saved += 1;
          info!("[{}/{}] 已备份: {}", report.saved, report.matching, path.display());
        }
        Err(e) => {
          report.skipped += 1;
          warn!(
            "跳过记录 {} ({}): {}",
            record.id.as_deref().unwrap_or("-"),
            record.image_url.as_deref().unwrap_or("-"),
            e
          );
        }
      }
    }

    info!(
      "备份完成: 保存 {} 个文件, 跳过 {} 个",
      report.saved, report.skipped
    );
    Ok(report)
  }

  fn backup_record<I: ImageSource>(
    &self,
    record: &DetectionRecord,
    selected: &[&Detection],
    source: &I,
    output: &DirectoryBackupOutput,
  ) -> Result<PathBuf, BackupError> {
    let image_url = record
      .image_url
      .as_deref()
      .ok_or(BackupError::MissingImageUrl)?;
    let file_name = record
      .image_file_name()
      .ok_or_else(|| BackupError::InvalidImageUrl(image_url.to_string()))?;

    info!("下载图像: {}", image_url);
    let bytes = source.fetch(image_url)?;
    let mut image = image::load_from_memory(&bytes)?.to_rgb8();

    // 任一检测项无效时 render 不改动图像，整张图跳过
    self
      .annotator
      .render(&mut image, selected.iter().copied())?;

    // 同一张图只保存一次，放在第一个目标标签的目录下
    let label = selected
      .first()
      .map(|det| det.label.as_str())
      .unwrap_or("unknown");
    let date = record
      .created_date
      .map(|created| created.date_naive())
      .unwrap_or(self.today);

    Ok(output.save(&image, label, date, file_name)?)
  }
}
