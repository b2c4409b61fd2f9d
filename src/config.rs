// 该文件是 Jingchen （净尘） 项目的一部分。
// src/config.rs - 命令行与环境变量配置
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

//! 所有参数都可以由同名环境变量提供（例如 `USER_ID`、`START_DATE`）。
//! 解析结果在进程启动时转换为显式的配置结构，再交给各任务使用；
//! 任何缺失或格式错误的值都在访问数据库之前报错退出。

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, ValueEnum};
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::filter::{DateBound, DateRange, FilterBuilder, FilterError, LabelSet, Predicate, Visibility};

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("{0}")]
  Filter(#[from] FilterError),
  #[error("USER_ID 不能为空")]
  EmptyUserId,
  #[error("START_DATE 与 END_DATE 必须同时提供")]
  IncompleteRange,
  #[error("缺少日期范围: 请提供 START_DATE/END_DATE")]
  MissingRange,
  #[error("缺少图像来源: 请提供 AWS_BUCKET 或 IMAGE_SOURCE")]
  MissingImageSource,
  #[error("地址错误: {0}")]
  InvalidUrl(String),
}

/// MongoDB 连接参数
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
  #[arg(long, env = "MONGO_HOST")]
  pub mongo_host: String,
  #[arg(long, env = "MONGO_PORT")]
  pub mongo_port: u16,
  #[arg(long, env = "MONGO_DB_NAME")]
  pub mongo_db_name: String,
  #[arg(long, env = "MONGO_COLL_NAME")]
  pub mongo_coll_name: String,
  #[arg(long, env = "MONGO_USER")]
  pub mongo_user: Option<String>,
  #[arg(long, env = "MONGO_PASS", hide_env_values = true)]
  pub mongo_pass: Option<String>,
  #[arg(long, env = "MONGO_AUTH_DB_NAME")]
  pub mongo_auth_db_name: Option<String>,
}

#[cfg(feature = "mongo_store")]
impl StoreArgs {
  pub fn address(&self) -> crate::store::MongoAddress {
    crate::store::MongoAddress {
      host: self.mongo_host.clone(),
      port: self.mongo_port,
      username: self.mongo_user.clone(),
      password: self.mongo_pass.clone(),
      auth_source: self.mongo_auth_db_name.clone(),
    }
  }

  pub fn connect(&self) -> Result<crate::store::MongoStore, crate::store::StoreError> {
    use crate::FromUrl;

    let url = self.address().to_url()?;
    crate::store::MongoStoreBuilder::from_url(&url)?
      .collection(&self.mongo_db_name, &self.mongo_coll_name)
      .connect()
  }
}

/// 日期范围，格式 `DD-MM-YYYY` 或 `DD-MM-YYYY HH:MM:SS`（UTC）
///
/// 旧脚本使用的 `START_DATETIME`/`END_DATETIME` 仍然可用，同时提供时以
/// `START_DATE`/`END_DATE` 为准。
#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
  #[arg(long, env = "START_DATE", value_name = "DATE")]
  pub start: Option<DateBound>,
  #[arg(long, env = "END_DATE", value_name = "DATE")]
  pub end: Option<DateBound>,
  #[arg(long, env = "START_DATETIME", value_name = "DATE", hide = true)]
  pub start_datetime: Option<DateBound>,
  #[arg(long, env = "END_DATETIME", value_name = "DATE", hide = true)]
  pub end_datetime: Option<DateBound>,
}

impl RangeArgs {
  pub fn resolve(&self) -> Result<Option<DateRange>, ConfigError> {
    let start = self.start.or(self.start_datetime);
    let end = self.end.or(self.end_datetime);
    match (start, end) {
      (Some(start), Some(end)) => Ok(Some(DateRange::from_bounds(start, end)?)),
      (None, None) => Ok(None),
      _ => Err(ConfigError::IncompleteRange),
    }
  }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityArg {
  Any,
  Visible,
  Hidden,
}

impl From<VisibilityArg> for Visibility {
  fn from(arg: VisibilityArg) -> Self {
    match arg {
      VisibilityArg::Any => Visibility::Any,
      VisibilityArg::Visible => Visibility::Visible,
      VisibilityArg::Hidden => Visibility::Hidden,
    }
  }
}

fn checked_user_id(user_id: &str) -> Result<String, ConfigError> {
  let user_id = user_id.trim();
  if user_id.is_empty() {
    return Err(ConfigError::EmptyUserId);
  }
  Ok(user_id.to_string())
}

/// 按用户、日期范围、标签删除记录
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct PurgeArgs {
  #[command(flatten)]
  pub store: StoreArgs,
  /// 记录所属用户
  #[arg(long, env = "USER_ID")]
  pub user_id: String,
  #[command(flatten)]
  pub range: RangeArgs,
  /// 标签列表（JSON 字符串数组），空数组表示不限标签
  #[arg(long, env = "USECASES_LIST", value_name = "JSON")]
  pub usecases: LabelSet,
  /// 只删除 status 为 true 的记录
  #[arg(long, env = "REQUIRE_STATUS", default_value_t = true, action = ArgAction::Set)]
  pub require_status: bool,
  #[arg(long, env = "VISIBILITY", value_enum, default_value_t = VisibilityArg::Visible)]
  pub visibility: VisibilityArg,
}

/// 删除某用户某个自然月内的记录
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct PurgeMonthArgs {
  #[command(flatten)]
  pub store: StoreArgs,
  #[arg(long, env = "USER_ID")]
  pub user_id: String,
  #[arg(long, env = "TARGET_YEAR")]
  pub year: i32,
  #[arg(long, env = "TARGET_MONTH", value_parser = clap::value_parser!(u32).range(1..=12))]
  pub month: u32,
  /// 可选的标签列表（JSON 字符串数组）
  #[arg(long, env = "USECASES_LIST", value_name = "JSON")]
  pub usecases: Option<LabelSet>,
  #[arg(long, env = "VISIBILITY", value_enum, default_value_t = VisibilityArg::Any)]
  pub visibility: VisibilityArg,
}

/// 导出带标注的检测图像到本地目录
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct BackupArgs {
  #[command(flatten)]
  pub store: StoreArgs,
  #[arg(long, env = "USER_ID")]
  pub user_id: String,
  // 未提供时备份上一个自然月
  #[command(flatten)]
  pub range: RangeArgs,
  #[arg(long, env = "USECASES_LIST", value_name = "JSON")]
  pub usecases: LabelSet,
  /// 图像所在的 S3 存储桶
  #[arg(long, env = "AWS_BUCKET")]
  pub bucket: Option<String>,
  /// 覆盖图像来源，例如 `mirror:///data/results`
  #[arg(long, env = "IMAGE_SOURCE")]
  pub image_source: Option<Url>,
  /// 备份根目录
  #[arg(long, env = "ROOT_FOLDER", value_name = "DIR")]
  pub root_folder: PathBuf,
  /// 标签文字使用的 TrueType 字体，默认使用内嵌字体
  #[arg(long, env = "FONT_PATH", value_name = "FILE")]
  pub font_path: Option<PathBuf>,
}

/// 删除任务的最终配置
#[derive(Debug, Clone)]
pub struct PurgeConfig {
  pub store: StoreArgs,
  pub user_id: String,
  pub range: DateRange,
  pub labels: LabelSet,
  pub require_status: bool,
  pub visibility: Visibility,
}

impl PurgeConfig {
  pub fn predicate(&self) -> Predicate {
    FilterBuilder::new(&self.user_id)
      .created_within(self.range)
      .labels(self.labels.clone())
      .require_status(self.require_status)
      .visibility(self.visibility)
      .build()
  }
}

impl TryFrom<PurgeArgs> for PurgeConfig {
  type Error = ConfigError;

  fn try_from(args: PurgeArgs) -> Result<Self, Self::Error> {
    let user_id = checked_user_id(&args.user_id)?;
    let range = args.range.resolve()?.ok_or(ConfigError::MissingRange)?;
    if args.usecases.is_empty() {
      warn!("USECASES_LIST 为空, 将不按标签筛选");
    }

    Ok(PurgeConfig {
      store: args.store,
      user_id,
      range,
      labels: args.usecases,
      require_status: args.require_status,
      visibility: args.visibility.into(),
    })
  }
}

impl TryFrom<PurgeMonthArgs> for PurgeConfig {
  type Error = ConfigError;

  fn try_from(args: PurgeMonthArgs) -> Result<Self, Self::Error> {
    Ok(PurgeConfig {
      store: args.store,
      user_id: checked_user_id(&args.user_id)?,
      range: DateRange::calendar_month(args.year, args.month)?,
      labels: args.usecases.unwrap_or_default(),
      require_status: false,
      visibility: args.visibility.into(),
    })
  }
}

/// 备份任务的最终配置
#[derive(Debug, Clone)]
pub struct BackupConfig {
  pub store: StoreArgs,
  pub user_id: String,
  pub range: DateRange,
  pub labels: LabelSet,
  pub image_source: Url,
  pub root_folder: PathBuf,
  pub font_path: Option<PathBuf>,
}

impl BackupConfig {
  /// 标签在取回记录后筛选，这里只要求检测列表非空
  pub fn predicate(&self) -> Predicate {
    FilterBuilder::new(&self.user_id)
      .created_within(self.range)
      .require_status(true)
      .visibility(Visibility::Visible)
      .require_detections(true)
      .build()
  }

  pub fn from_args(args: BackupArgs, today: chrono::NaiveDate) -> Result<Self, ConfigError> {
    let user_id = checked_user_id(&args.user_id)?;
    let range = match args.range.resolve()? {
      Some(range) => range,
      None => {
        let range = DateRange::previous_month(today);
        warn!("未提供日期范围, 使用上一个自然月: {}", range);
        range
      }
    };

    let image_source = match (args.image_source, args.bucket) {
      (Some(url), _) => url,
      (None, Some(bucket)) => Url::parse(&format!("s3://{}", bucket))
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", bucket, e)))?,
      (None, None) => return Err(ConfigError::MissingImageSource),
    };

    Ok(BackupConfig {
      store: args.store,
      user_id,
      range,
      labels: args.usecases,
      image_source,
      root_folder: args.root_folder,
      font_path: args.font_path,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filter::Clause;
  use chrono::NaiveDate;

  const STORE_FLAGS: [&str; 8] = [
    "--mongo-host",
    "localhost",
    "--mongo-port",
    "27017",
    "--mongo-db-name",
    "auto-serving-results",
    "--mongo-coll-name",
    "results",
  ];

  fn argv<'a>(extra: &[&'a str]) -> Vec<&'a str> {
    let mut argv = vec!["tool"];
    argv.extend(STORE_FLAGS);
    argv.extend(extra);
    argv
  }

  #[test]
  fn purge_args_build_strict_predicate() {
    let args = PurgeArgs::try_parse_from(argv(&[
      "--user-id",
      "97",
      "--start",
      "01-06-2025",
      "--end",
      "01-06-2025",
      "--usecases",
      r#"["no_helmet"]"#,
    ]))
    .unwrap();
    let config = PurgeConfig::try_from(args).unwrap();
    let predicate = config.predicate();

    assert!(predicate.clauses().contains(&Clause::Hidden(false)));
    assert!(predicate.clauses().contains(&Clause::StatusActive));
    assert!(
      predicate
        .clauses()
        .iter()
        .any(|c| matches!(c, Clause::AnyDetectionLabelIn(_)))
    );
  }

  #[test]
  fn purge_args_reject_bad_dates_and_labels() {
    assert!(
      PurgeArgs::try_parse_from(argv(&[
        "--user-id",
        "97",
        "--start",
        "2025-06-01",
        "--end",
        "01-06-2025",
        "--usecases",
        "[]",
      ]))
      .is_err()
    );
    assert!(
      PurgeArgs::try_parse_from(argv(&[
        "--user-id",
        "97",
        "--start",
        "01-06-2025",
        "--end",
        "01-06-2025",
        "--usecases",
        "no_helmet",
      ]))
      .is_err()
    );
  }

  #[test]
  fn purge_config_requires_complete_ordered_range() {
    let only_start = PurgeArgs::try_parse_from(argv(&[
      "--user-id",
      "97",
      "--start",
      "01-06-2025",
      "--usecases",
      "[]",
    ]))
    .unwrap();
    assert!(matches!(
      PurgeConfig::try_from(only_start),
      Err(ConfigError::IncompleteRange)
    ));

    let inverted = PurgeArgs::try_parse_from(argv(&[
      "--user-id",
      "97",
      "--start",
      "02-06-2025",
      "--end",
      "01-06-2025",
      "--usecases",
      "[]",
    ]))
    .unwrap();
    assert!(matches!(
      PurgeConfig::try_from(inverted),
      Err(ConfigError::Filter(FilterError::InvertedRange { .. }))
    ));

    let blank_user = PurgeArgs::try_parse_from(argv(&[
      "--user-id",
      "  ",
      "--start",
      "01-06-2025",
      "--end",
      "01-06-2025",
      "--usecases",
      "[]",
    ]))
    .unwrap();
    assert!(matches!(
      PurgeConfig::try_from(blank_user),
      Err(ConfigError::EmptyUserId)
    ));
  }

  #[test]
  fn legacy_datetime_names_are_accepted() {
    let args = PurgeArgs::try_parse_from(argv(&[
      "--user-id",
      "97",
      "--start-datetime",
      "01-06-2025 08:00:00",
      "--end-datetime",
      "01-06-2025 18:30:00",
      "--usecases",
      "[]",
    ]))
    .unwrap();
    let config = PurgeConfig::try_from(args).unwrap();
    assert_eq!(
      config.range,
      DateRange::from_bounds(
        "01-06-2025 08:00:00".parse().unwrap(),
        "01-06-2025 18:30:00".parse().unwrap()
      )
      .unwrap()
    );

    let preferred = PurgeArgs::try_parse_from(argv(&[
      "--user-id",
      "97",
      "--start",
      "02-06-2025",
      "--start-datetime",
      "01-06-2025 08:00:00",
      "--end",
      "03-06-2025",
      "--usecases",
      "[]",
    ]))
    .unwrap();
    let config = PurgeConfig::try_from(preferred).unwrap();
    assert_eq!(
      config.range.start(),
      "02-06-2025".parse::<DateBound>().unwrap().as_start()
    );
  }

  #[test]
  fn month_args_select_calendar_month() {
    let args = PurgeMonthArgs::try_parse_from(argv(&[
      "--user-id",
      "97",
      "--year",
      "2025",
      "--month",
      "9",
      "--visibility",
      "hidden",
    ]))
    .unwrap();
    let config = PurgeConfig::try_from(args).unwrap();

    assert_eq!(config.range, DateRange::calendar_month(2025, 9).unwrap());
    let predicate = config.predicate();
    assert!(predicate.clauses().contains(&Clause::Hidden(true)));
    assert!(!predicate.clauses().contains(&Clause::StatusActive));

    assert!(
      PurgeMonthArgs::try_parse_from(argv(&["--user-id", "97", "--year", "2025", "--month", "13"]))
        .is_err()
    );
  }

  #[test]
  fn backup_defaults_to_previous_month_and_bucket() {
    let args = BackupArgs::try_parse_from(argv(&[
      "--user-id",
      "97",
      "--usecases",
      "['no_helmet']",
      "--bucket",
      "detections-bucket",
      "--root-folder",
      "/backup",
    ]))
    .unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
    let config = BackupConfig::from_args(args, today).unwrap();

    assert_eq!(config.range, DateRange::previous_month(today));
    assert_eq!(config.image_source.as_str(), "s3://detections-bucket");
    assert_eq!(config.font_path, None);
    assert!(config.predicate().clauses().contains(&Clause::HasDetections));
  }

  #[test]
  fn backup_requires_an_image_source() {
    let args = BackupArgs::try_parse_from(argv(&[
      "--user-id",
      "97",
      "--usecases",
      "['no_helmet']",
      "--root-folder",
      "/backup",
      "--start",
      "01-06-2025",
      "--end",
      "30-06-2025",
    ]))
    .unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
    assert!(matches!(
      BackupConfig::from_args(args, today),
      Err(ConfigError::MissingImageSource)
    ));
  }
}
