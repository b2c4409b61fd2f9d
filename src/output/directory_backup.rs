// 该文件是 Jingchen （净尘） 项目的一部分。
// src/output/directory_backup.rs - 按标签与日期分目录保存图像
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

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use image::RgbImage;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DirectoryBackupError {
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 备份目录，布局为 `{root}/{label}/{YYYY-MM-DD}/{file_name}`
pub struct DirectoryBackupOutput {
  directory: PathBuf,
}

impl DirectoryBackupOutput {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
    }
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  pub fn destination(&self, label: &str, date: NaiveDate, file_name: &str) -> PathBuf {
    self
      .directory
      .join(label)
      .join(date.format("%Y-%m-%d").to_string())
      .join(file_name)
  }

  /// 按目标路径的扩展名编码保存，返回保存路径
  pub fn save(
    &self,
    image: &RgbImage,
    label: &str,
    date: NaiveDate,
    file_name: &str,
  ) -> Result<PathBuf, DirectoryBackupError> {
    let path = self.destination(label, date, file_name);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    image.save(&path)?;
    info!("已保存 {} 到 {}", file_name, path.display());

    Ok(path)
  }
}
