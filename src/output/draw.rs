// 该文件是 Jingchen （净尘） 项目的一部分。
// src/output/draw.rs - 检测结果标注绘制
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

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use thiserror::Error;
use tracing::warn;

use crate::record::{Coordinate, Detection};

// 渲染常量
const LABEL_FONT_SIZE: f32 = 18.0;
static EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/font.ttf"); // DejaVu Sans
// 没有字体时按字符数估算标签背景大小
const LABEL_TEXT_HEIGHT: i32 = 22;
const LABEL_CHAR_WIDTH: f32 = 10.0;
// 超出此范围的坐标视为无效
const COORDINATE_LIMIT: i64 = 1 << 24;
const BRACKET_THICKNESS: i32 = 2;
const ANNOTATION_COLOR: Rgb<u8> = Rgb([255, 0, 0]); // 红色
const CAPTION_BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
// 同色文字在水平方向错开 1 像素重复绘制，模拟加粗
const CAPTION_OFFSETS: [i32; 3] = [0, 1, 2];

#[derive(Error, Debug)]
pub enum AnnotateError {
  #[error("图像为空, 无法为标签 '{label}' 绘制标注")]
  MissingImage { label: String },
  #[error("标签 '{label}' 的标注无效: {reason}")]
  InvalidAnnotation { label: String, reason: String },
  #[error("字体加载失败: {0}")]
  FontError(String),
}

impl AnnotateError {
  pub fn label(&self) -> Option<&str> {
    match self {
      AnnotateError::MissingImage { label } | AnnotateError::InvalidAnnotation { label, .. } => {
        Some(label.as_str())
      }
      AnnotateError::FontError(_) => None,
    }
  }
}

/// 左上角加宽高形式的框
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxXywh {
  pub x: i32,
  pub y: i32,
  pub w: i32,
  pub h: i32,
}

/// 两个任意顺序的角点转为 (x, y, w, h)，与角点顺序无关
pub fn normalize_box(x1: i32, y1: i32, x2: i32, y2: i32) -> BoxXywh {
  BoxXywh {
    x: x1.min(x2),
    y: y1.min(y2),
    w: i32::try_from(x2.abs_diff(x1)).unwrap_or(i32::MAX),
    h: i32::try_from(y2.abs_diff(y1)).unwrap_or(i32::MAX),
  }
}

/// 校验检测项坐标：必须恰好四个数值
pub fn parse_location(label: &str, location: Option<&[Coordinate]>) -> Result<BoxXywh, AnnotateError> {
  let invalid = |reason: String| AnnotateError::InvalidAnnotation {
    label: label.to_string(),
    reason,
  };

  let location = location.ok_or_else(|| invalid("缺少坐标".to_string()))?;
  if location.len() != 4 {
    return Err(invalid(format!(
      "坐标数量必须为 4, 实际为 {}",
      location.len()
    )));
  }

  let mut pixels = [0i32; 4];
  for (pixel, coordinate) in pixels.iter_mut().zip(location) {
    *pixel = coordinate
      .as_pixel()
      .ok_or_else(|| invalid(format!("非数值坐标 {}", coordinate)))?;
  }

  // 宽高与角点在 i64 中计算，任何一项超出范围都不绘制
  let [x1, y1, x2, y2] = pixels.map(i64::from);
  let extents = [x1, y1, x2, y2, (x2 - x1).abs(), (y2 - y1).abs()];
  if extents.iter().any(|v| v.abs() > COORDINATE_LIMIT) {
    return Err(invalid(format!(
      "坐标超出范围: [{}, {}, {}, {}]",
      x1, y1, x2, y2
    )));
  }

  let [x1, y1, x2, y2] = pixels;
  Ok(normalize_box(x1, y1, x2, y2))
}

/// 四个角各两段，长度为宽、高的三分之一（截断取整），指向框内
pub fn corner_brackets(b: &BoxXywh) -> [((i32, i32), (i32, i32)); 8] {
  let BoxXywh { x, y, w, h } = *b;
  let ch = w / 3;
  let cv = h / 3;
  let right = x.saturating_add(w);
  let bottom = y.saturating_add(h);
  [
    ((x, y), (x.saturating_add(ch), y)),
    ((x, y), (x, y.saturating_add(cv))),
    ((right, y), (right.saturating_sub(ch), y)),
    ((right, y), (right, y.saturating_add(cv))),
    ((x, bottom), (x.saturating_add(ch), bottom)),
    ((x, bottom), (x, bottom.saturating_sub(cv))),
    ((right, bottom), (right.saturating_sub(ch), bottom)),
    ((right, bottom), (right, bottom.saturating_sub(cv))),
  ]
}

/// 标签背景与文字位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionLayout {
  /// 背景左上角与右下角（含）
  pub background: ((i32, i32), (i32, i32)),
  /// 三次绘制的文字左上角
  pub text_origins: [(i32, i32); 3],
}

/// 背景紧贴框的上边，高度为文字高度加基线以下部分
pub fn caption_layout(b: &BoxXywh, text_width: i32, text_height: i32, baseline: i32) -> CaptionLayout {
  let top = b.y.saturating_sub(text_height).saturating_sub(baseline);
  CaptionLayout {
    background: ((b.x, top), (b.x.saturating_add(text_width), b.y)),
    text_origins: CAPTION_OFFSETS.map(|dx| (b.x.saturating_add(dx), top)),
  }
}

pub struct Annotator {
  font: Option<FontArc>,
  scale: PxScale,
  color: Rgb<u8>,
}

impl Annotator {
  pub fn new(font: FontArc) -> Self {
    Self {
      font: Some(font),
      scale: PxScale::from(LABEL_FONT_SIZE),
      color: ANNOTATION_COLOR,
    }
  }

  /// 使用随程序内嵌的字体
  pub fn embedded() -> Result<Self, AnnotateError> {
    let font = FontArc::try_from_slice(EMBEDDED_FONT)
      .map_err(|e| AnnotateError::FontError(format!("内嵌字体: {}", e)))?;
    Ok(Self::new(font))
  }

  /// 不绘制标签文字，只按估算尺寸画出标签背景
  pub fn without_font() -> Self {
    Self {
      font: None,
      scale: PxScale::from(LABEL_FONT_SIZE),
      color: ANNOTATION_COLOR,
    }
  }

  pub fn from_font_file(path: &Path) -> Result<Self, AnnotateError> {
    let data = std::fs::read(path)
      .map_err(|e| AnnotateError::FontError(format!("{}: {}", path.display(), e)))?;
    let font = FontArc::try_from_vec(data)
      .map_err(|e| AnnotateError::FontError(format!("{}: {}", path.display(), e)))?;
    Ok(Self::new(font))
  }

  /// 优先使用 `path` 指定的字体，加载失败时退回内嵌字体
  pub fn from_font_file_or_embedded(path: Option<&Path>) -> Self {
    if let Some(path) = path {
      match Self::from_font_file(path) {
        Ok(annotator) => return annotator,
        Err(e) => warn!("{}, 改用内嵌字体", e),
      }
    }

    match Self::embedded() {
      Ok(annotator) => annotator,
      Err(e) => {
        warn!("{}, 标注将不包含标签文字", e);
        Self::without_font()
      }
    }
  }

  pub fn has_font(&self) -> bool {
    self.font.is_some()
  }

  /// 在图像上绘制全部检测项。
  ///
  /// 先校验所有坐标再落笔：任一检测项无效时返回错误，图像保持原样。
  pub fn render<'d>(
    &self,
    image: &mut RgbImage,
    detections: impl IntoIterator<Item = &'d Detection>,
  ) -> Result<(), AnnotateError> {
    let boxes = detections
      .into_iter()
      .map(|det| {
        parse_location(&det.label, det.location.as_deref()).map(|b| (det.label.as_str(), b))
      })
      .collect::<Result<Vec<_>, _>>()?;

    if image.width() == 0 || image.height() == 0 {
      let label = boxes.first().map(|(label, _)| *label).unwrap_or_default();
      return Err(AnnotateError::MissingImage {
        label: label.to_string(),
      });
    }

    for (label, b) in boxes.iter() {
      self.draw_brackets(image, b);
      self.draw_caption(image, b, label);
    }

    Ok(())
  }

  fn draw_brackets(&self, image: &mut RgbImage, b: &BoxXywh) {
    for ((x0, y0), (x1, y1)) in corner_brackets(b) {
      let horizontal = y0 == y1;
      for t in 0..BRACKET_THICKNESS {
        let (dx, dy) = if horizontal { (0, t) } else { (t, 0) };
        draw_line_segment_mut(
          image,
          (x0.saturating_add(dx) as f32, y0.saturating_add(dy) as f32),
          (x1.saturating_add(dx) as f32, y1.saturating_add(dy) as f32),
          self.color,
        );
      }
    }
  }

  /// 标签文字的宽、高与基线以下高度
  fn caption_metrics(&self, label: &str) -> (i32, i32, i32) {
    match &self.font {
      Some(font) => {
        let (text_width, text_height) = text_size(self.scale, font, label);
        let baseline = (-font.as_scaled(self.scale).descent()).ceil() as i32;
        (text_width as i32, text_height as i32, baseline)
      }
      None => {
        let text_width = (label.chars().count() as f32 * LABEL_CHAR_WIDTH).ceil() as i32;
        (text_width, LABEL_TEXT_HEIGHT, 0)
      }
    }
  }

  fn draw_caption(&self, image: &mut RgbImage, b: &BoxXywh, label: &str) {
    if label.is_empty() {
      return;
    }

    let (text_width, text_height, baseline) = self.caption_metrics(label);
    let layout = caption_layout(b, text_width, text_height, baseline);

    let ((bx0, by0), (bx1, by1)) = layout.background;
    let rect = Rect::at(bx0, by0).of_size(bx0.abs_diff(bx1) + 1, by0.abs_diff(by1) + 1);
    draw_filled_rect_mut(image, rect, CAPTION_BACKGROUND);

    if let Some(font) = &self.font {
      for (tx, ty) in layout.text_origins {
        draw_text_mut(image, self.color, tx, ty, self.scale, font, label);
      }
    }
  }
}
