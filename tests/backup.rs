// 该文件是 Jingchen （净尘） 项目的一部分。
// tests/backup.rs - 图像备份任务测试
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

#![cfg(feature = "read_image_file")]

use std::path::Path;

use chrono::{NaiveDate, TimeZone, Utc};
use image::{Rgb, RgbImage};

use jingchen::{
  filter::{DateRange, FilterBuilder, LabelSet, Predicate, Visibility},
  input::ImageFileSource,
  output::{Annotator, DirectoryBackupOutput},
  record::{Coordinate, Detection, DetectionRecord},
  store::MemoryStore,
  task::{BackupReport, BackupTask},
};

const GRAY: Rgb<u8> = Rgb([40, 40, 40]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

fn write_frame(mirror: &Path, key: &str) {
  let path = mirror.join(key);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  RgbImage::from_pixel(128, 128, GRAY).save(path).unwrap();
}

fn record(name: &str, detections: Vec<Detection>) -> DetectionRecord {
  DetectionRecord {
    id: Some(name.to_string()),
    user_id: "97".to_string(),
    is_hide: false,
    status: true,
    created_date: Some(Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap()),
    image_url: Some(format!("https://bucket.s3.amazonaws.com/results/97/{}", name)),
    detections,
  }
}

fn predicate() -> Predicate {
  FilterBuilder::new("97")
    .created_within(DateRange::calendar_month(2025, 6).unwrap())
    .visibility(Visibility::Visible)
    .require_detections(true)
    .build()
}

fn labels() -> LabelSet {
  ["no_helmet", "no_vest"].into_iter().collect()
}

#[test]
fn saves_annotated_copy_per_label_and_day() {
  let mirror = tempfile::tempdir().unwrap();
  let root = tempfile::tempdir().unwrap();
  write_frame(mirror.path(), "results/97/a.png");

  let store = MemoryStore::new(vec![record(
    "a.png",
    vec![
      Detection::new("no_helmet", [10, 10, 50, 90]),
      Detection::new("person", [60, 60, 100, 100]),
    ],
  )]);
  let source = ImageFileSource::new(mirror.path());
  let output = DirectoryBackupOutput::new(root.path());

  let report = BackupTask::new(predicate(), labels(), Annotator::without_font())
    .run_task(&store, &source, &output)
    .unwrap();
  assert_eq!(
    report,
    BackupReport {
      found: 1,
      matching: 1,
      saved: 1,
      skipped: 0
    }
  );

  let saved = root.path().join("no_helmet/2025-06-01/a.png");
  let image = image::open(&saved).unwrap().to_rgb8();
  assert_eq!(*image.get_pixel(10, 11), RED);
  assert_eq!(*image.get_pixel(50, 90), RED);
  // 框上方的标签背景
  assert_eq!(*image.get_pixel(12, 5), BLACK);
  // 非目标标签不绘制
  assert_eq!(*image.get_pixel(100, 100), GRAY);

  // 来源图像保持不变
  let original = image::open(mirror.path().join("results/97/a.png"))
    .unwrap()
    .to_rgb8();
  assert_eq!(*original.get_pixel(10, 10), GRAY);
}

#[test]
fn broken_records_are_skipped_and_batch_continues() {
  let mirror = tempfile::tempdir().unwrap();
  let root = tempfile::tempdir().unwrap();
  write_frame(mirror.path(), "results/97/bad_box.png");
  write_frame(mirror.path(), "results/97/good.png");
  write_frame(mirror.path(), "results/97/far_away.png");

  let bad_box = record(
    "bad_box.png",
    vec![Detection {
      label: "no_vest".to_string(),
      location: Some(vec![Coordinate::from(1), Coordinate::from(2), Coordinate::from(3)]),
    }],
  );
  let far_away = record(
    "far_away.png",
    vec![Detection::new("no_helmet", [-3.0e9, 0.0, 3.0e9, 10.0])],
  );
  let not_mirrored = record("missing.png", vec![Detection::new("no_helmet", [1, 1, 5, 5])]);
  let mut no_url = record("no_url.png", vec![Detection::new("no_helmet", [1, 1, 5, 5])]);
  no_url.image_url = None;
  let unrelated = record("person.png", vec![Detection::new("person", [1, 1, 5, 5])]);
  let mut undated = record("good.png", vec![Detection::new("no_vest", [4, 4, 40, 40])]);
  undated.created_date = None;

  let store = MemoryStore::new(vec![bad_box, far_away, not_mirrored, no_url, unrelated, undated]);
  let source = ImageFileSource::new(mirror.path());
  let output = DirectoryBackupOutput::new(root.path());
  let today = NaiveDate::from_ymd_opt(2025, 7, 3).unwrap();

  // 没有创建时间的记录不会通过日期范围，改用不限日期的条件
  let predicate = FilterBuilder::new("97")
    .visibility(Visibility::Visible)
    .require_detections(true)
    .build();
  let report = BackupTask::new(predicate, labels(), Annotator::without_font())
    .with_today(today)
    .run_task(&store, &source, &output)
    .unwrap();

  assert_eq!(
    report,
    BackupReport {
      found: 6,
      matching: 5,
      saved: 1,
      skipped: 4
    }
  );
  assert!(root.path().join("no_vest/2025-07-03/good.png").exists());
  assert!(!root.path().join("no_vest/2025-06-01/bad_box.png").exists());
  assert!(!root.path().join("no_helmet/2025-06-01/far_away.png").exists());
}

#[test]
fn hidden_and_empty_records_are_not_found() {
  let mirror = tempfile::tempdir().unwrap();
  let root = tempfile::tempdir().unwrap();

  let mut hidden = record("hidden.png", vec![Detection::new("no_helmet", [1, 1, 5, 5])]);
  hidden.is_hide = true;
  let empty = record("empty.png", vec![]);

  let store = MemoryStore::new(vec![hidden, empty]);
  let report = BackupTask::new(predicate(), labels(), Annotator::without_font())
    .run_task(
      &store,
      &ImageFileSource::new(mirror.path()),
      &DirectoryBackupOutput::new(root.path()),
    )
    .unwrap();

  assert_eq!(report, BackupReport::default());
  assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}
