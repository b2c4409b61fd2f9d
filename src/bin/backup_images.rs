// 该文件是 Jingchen （净尘） 项目的一部分。
// src/bin/backup_images.rs - 导出带标注的检测图像
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

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::info;

use jingchen::{
  FromUrl,
  config::{BackupArgs, BackupConfig},
  input::InputWrapper,
  output::{Annotator, DirectoryBackupOutput},
  task::BackupTask,
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let today = Local::now().date_naive();
  let config = BackupConfig::from_args(BackupArgs::parse(), today)?;

  info!("用户: {}", config.user_id);
  info!("日期范围: {}", config.range);
  info!("标签: [{}]", config.labels);
  info!("图像来源: {}", config.image_source);
  info!("备份目录: {}", config.root_folder.display());

  let store = config.store.connect()?;
  let source = InputWrapper::from_url(&config.image_source)?;
  let output = DirectoryBackupOutput::new(&config.root_folder);
  let annotator = Annotator::from_font_file_or_embedded(config.font_path.as_deref());

  let report = BackupTask::new(config.predicate(), config.labels.clone(), annotator)
    .with_today(today)
    .run_task(&store, &source, &output)?;

  println!("Records found: {}", report.found);
  println!("Records with matching labels (USECASES_LIST): {}", report.matching);
  println!("Saved: {}, skipped: {}", report.saved, report.skipped);

  Ok(())
}
