// 该文件是 Jingchen （净尘） 项目的一部分。
// tests/purge.rs - 删除任务测试
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

use chrono::{TimeZone, Utc};

use jingchen::{
  filter::{DateRange, FilterBuilder, LabelSet, Visibility, build_filter},
  record::{Detection, DetectionRecord},
  store::{MemoryStore, RecordStore},
  task::{PurgeReport, PurgeTask},
};

fn record(user_id: &str, day: u32, labels: &[&str]) -> DetectionRecord {
  DetectionRecord {
    id: Some(format!("{}-{}-{}", user_id, day, labels.join("+"))),
    user_id: user_id.to_string(),
    is_hide: false,
    status: true,
    created_date: Some(Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap()),
    image_url: Some(format!("https://bucket.s3.amazonaws.com/results/{}.jpg", day)),
    detections: labels
      .iter()
      .map(|label| Detection::new(label, [10, 10, 50, 90]))
      .collect(),
  }
}

fn june(start: &str, end: &str) -> DateRange {
  DateRange::from_bounds(start.parse().unwrap(), end.parse().unwrap()).unwrap()
}

#[test]
fn deletes_only_records_with_configured_label() {
  let store = MemoryStore::new(vec![
    record("97", 1, &["person"]),
    record("97", 1, &["person", "no_helmet"]),
    record("97", 1, &["no_vest"]),
  ]);
  let labels: LabelSet = ["no_helmet"].into_iter().collect();
  let predicate = build_filter("97", june("01-06-2025", "01-06-2025"), &labels, true, true);

  let first = PurgeTask::new(predicate.clone()).run_task(&store).unwrap();
  assert_eq!(
    first,
    PurgeReport {
      matched: 1,
      deleted: 1
    }
  );
  assert_eq!(store.len(), 2);

  // 没有新数据时第二次运行什么也找不到
  let second = PurgeTask::new(predicate).run_task(&store).unwrap();
  assert_eq!(second, PurgeReport::default());
  assert!(second.to_string().ends_with("Nothing to delete."));
  assert_eq!(store.len(), 2);
}

#[test]
fn new_data_between_runs_is_picked_up() {
  let store = MemoryStore::new(vec![record("97", 2, &["no_helmet"])]);
  let labels: LabelSet = ["no_helmet"].into_iter().collect();
  let predicate = build_filter("97", june("01-06-2025", "30-06-2025"), &labels, true, true);

  let first = PurgeTask::new(predicate.clone()).run_task(&store).unwrap();
  store.insert(record("97", 3, &["no_helmet"]));
  let second = PurgeTask::new(predicate).run_task(&store).unwrap();

  assert_eq!(first, second);
  assert!(store.is_empty());
}

#[test]
fn other_users_hidden_and_out_of_range_records_survive() {
  let mut hidden = record("97", 5, &["no_helmet"]);
  hidden.is_hide = true;
  let mut inactive = record("97", 5, &["no_helmet"]);
  inactive.status = false;

  let store = MemoryStore::new(vec![
    record("98", 5, &["no_helmet"]),
    record("97", 20, &["no_helmet"]),
    hidden,
    inactive,
    record("97", 5, &["no_helmet"]),
  ]);
  let labels: LabelSet = ["no_helmet"].into_iter().collect();
  let predicate = build_filter("97", june("01-06-2025", "10-06-2025"), &labels, true, true);

  let report = PurgeTask::new(predicate).run_task(&store).unwrap();
  assert_eq!(report.deleted, 1);
  assert_eq!(store.len(), 4);
}

#[test]
fn monthly_purge_of_hidden_records() {
  let mut hidden = record("97", 9, &[]);
  hidden.is_hide = true;
  let mut hidden_other_month = hidden.clone();
  hidden_other_month.created_date = Some(Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());

  let store = MemoryStore::new(vec![hidden, hidden_other_month, record("97", 9, &[])]);
  let predicate = FilterBuilder::new("97")
    .created_within(DateRange::calendar_month(2025, 6).unwrap())
    .visibility(Visibility::Hidden)
    .build();

  assert_eq!(store.count(&predicate).unwrap(), 1);
  let report = PurgeTask::new(predicate).run_task(&store).unwrap();
  assert_eq!(report.deleted, 1);
  assert_eq!(store.len(), 2);
}
