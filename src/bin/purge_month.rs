// 该文件是 Jingchen （净尘） 项目的一部分。
// src/bin/purge_month.rs - 删除某用户某月的记录
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
use clap::Parser;
use tracing::info;

use jingchen::{
  config::{PurgeConfig, PurgeMonthArgs},
  task::PurgeTask,
};

fn main() -> Result<()> {
  // 标准输出只留给结果摘要
  tracing_subscriber::fmt().with_writer(std::io::stderr).init();

  let config = PurgeConfig::try_from(PurgeMonthArgs::parse())?;

  info!("用户: {}", config.user_id);
  info!("月份范围: {}", config.range);
  info!("可见性: {:?}", config.visibility);

  let store = config.store.connect()?;
  let report = PurgeTask::new(config.predicate()).run_task(&store)?;

  println!("{}", report);

  Ok(())
}
