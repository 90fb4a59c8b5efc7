// 该文件是 Huitu （绘图） 项目的一部分。
// src/draw.rs - 边框与标签绘制
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

use std::{convert::Infallible, path::Path, sync::OnceLock};

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
  point::Point,
  rect::Rect,
};
use thiserror::Error;
use tracing::debug;

use crate::palette::{Color, complement};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 14.0;
const DEFAULT_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// 未指定颜色时的边框颜色
pub const DEFAULT_BOX_COLOR: Color = Rgb([255, 0, 0]);

/// 像素坐标边框 [x1, y1, x2, y2]
pub type BBox = [i32; 4];

#[derive(Error, Debug)]
pub enum DrawError<E> {
  #[error("无效参数: {0}")]
  InvalidArgument(&'static str),
  #[error("索引越界: 索引 {index}, 长度 {len}")]
  IndexOutOfRange { index: usize, len: usize },
  #[error("绘图表面错误: {0}")]
  Surface(#[source] E),
}

/// 可绘制的图像表面
///
/// 所有操作原地修改底层帧。文本锚点为文本的左下角。
pub trait Surface {
  type Error;

  fn draw_filled_rect(
    &mut self,
    corner1: Point<i32>,
    corner2: Point<i32>,
    color: Color,
  ) -> Result<(), Self::Error>;

  fn draw_rect_outline(
    &mut self,
    corner1: Point<i32>,
    corner2: Point<i32>,
    color: Color,
  ) -> Result<(), Self::Error>;

  fn draw_text(
    &mut self,
    anchor: Point<i32>,
    text: &str,
    color: Color,
  ) -> Result<(), Self::Error>;

  /// 返回文本的 (宽, 高)
  fn measure_text(&self, text: &str) -> Result<(u32, u32), Self::Error>;
}

/// 标签的固定角
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAnchor {
  BottomLeft(Point<i32>),
  UpperRight(Point<i32>),
}

impl LabelAnchor {
  /// 两个角必须恰好给出一个
  pub fn from_corners<E>(
    bottom_left: Option<Point<i32>>,
    upper_right: Option<Point<i32>>,
  ) -> Result<Self, DrawError<E>> {
    match (bottom_left, upper_right) {
      (Some(p), None) => Ok(LabelAnchor::BottomLeft(p)),
      (None, Some(p)) => Ok(LabelAnchor::UpperRight(p)),
      (Some(_), Some(_)) => Err(DrawError::InvalidArgument(
        "bottom_left 与 upper_right 不能同时给出",
      )),
      (None, None) => Err(DrawError::InvalidArgument(
        "bottom_left 与 upper_right 必须给出其一",
      )),
    }
  }
}

/// 标签背景矩形的两个角
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPlacement {
  pub bottom_left: Point<i32>,
  pub upper_right: Point<i32>,
}

impl LabelPlacement {
  pub fn new(anchor: LabelAnchor, (width, height): (u32, u32)) -> Self {
    // 坐标在 i32 边界处饱和
    let (w, h) = (width as i32, height as i32);
    match anchor {
      LabelAnchor::BottomLeft(bottom_left) => LabelPlacement {
        bottom_left,
        upper_right: Point::new(bottom_left.x.saturating_add(w), bottom_left.y.saturating_sub(h)),
      },
      LabelAnchor::UpperRight(upper_right) => LabelPlacement {
        bottom_left: Point::new(upper_right.x.saturating_sub(w), upper_right.y.saturating_add(h)),
        upper_right,
      },
    }
  }
}

/// 绘制带背景的文本标签。
///
/// 背景使用 `color` 填充，文字使用其补色。
pub fn draw_text<S: Surface>(
  surface: &mut S,
  label: &str,
  color: Color,
  bottom_left: Option<Point<i32>>,
  upper_right: Option<Point<i32>>,
) -> Result<LabelPlacement, DrawError<S::Error>> {
  let anchor = LabelAnchor::from_corners::<S::Error>(bottom_left, upper_right)?;
  let extent = surface.measure_text(label).map_err(DrawError::Surface)?;
  let placement = LabelPlacement::new(anchor, extent);

  surface
    .draw_filled_rect(placement.bottom_left, placement.upper_right, color)
    .map_err(DrawError::Surface)?;
  surface
    .draw_text(placement.bottom_left, label, complement(color))
    .map_err(DrawError::Surface)?;

  Ok(placement)
}

/// 默认标签：不绘制标签
pub fn no_label(_: usize) -> String {
  String::new()
}

/// 默认颜色
pub fn default_color(_: usize) -> Color {
  DEFAULT_BOX_COLOR
}

/// 在表面上绘制一组边框。
///
/// `label_fn` 返回空串时只画边框，否则在边框左上角上方绘制标签。
pub fn draw_bbox<S, L, C>(
  surface: &mut S,
  bboxes: &[BBox],
  label_fn: L,
  color_fn: C,
) -> Result<(), DrawError<S::Error>>
where
  S: Surface,
  L: Fn(usize) -> String,
  C: Fn(usize) -> Color,
{
  debug!("绘制 {} 个边框", bboxes.len());
  for (i, &[x1, y1, x2, y2]) in bboxes.iter().enumerate() {
    let (p1, p2) = (Point::new(x1, y1), Point::new(x2, y2));
    let color = color_fn(i);
    surface
      .draw_rect_outline(p1, p2, color)
      .map_err(DrawError::Surface)?;

    let label = label_fn(i);
    if !label.is_empty() {
      draw_text(surface, &label, color, Some(p1), None)?;
    }
  }
  Ok(())
}

#[derive(Error, Debug)]
pub enum FontLoadError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("字体解析错误: {0}")]
  InvalidFont(#[from] ab_glyph::InvalidFont),
}

/// 内置字体，只解析一次
pub fn default_font() -> FontArc {
  static FONT: OnceLock<FontArc> = OnceLock::new();
  FONT
    .get_or_init(|| FontArc::try_from_slice(DEFAULT_FONT).expect("无法加载嵌入的字体文件"))
    .clone()
}

/// 从文件加载字体
pub fn load_font(path: impl AsRef<Path>) -> Result<FontArc, FontLoadError> {
  let data = std::fs::read(path)?;
  Ok(FontArc::try_from_vec(data)?)
}

/// 基于 `RgbImage` 的绘图表面
pub struct ImageSurface<'a> {
  image: &'a mut RgbImage,
  font: FontArc,
  scale: PxScale,
}

impl<'a> ImageSurface<'a> {
  pub fn new(image: &'a mut RgbImage, font: FontArc) -> Self {
    Self {
      image,
      font,
      scale: PxScale::from(LABEL_FONT_SIZE),
    }
  }

  pub fn with_scale(mut self, px: f32) -> Self {
    self.scale = PxScale::from(px);
    self
  }

  /// 两角之间（含端点）的矩形。
  ///
  /// 角点裁剪到图像外一像素以内，超出部分不可见；与图像不相交时返回 `None`。
  fn rect_between(&self, a: Point<i32>, b: Point<i32>) -> Option<Rect> {
    let (w, h) = (self.image.width() as i32, self.image.height() as i32);
    let (left, right) = (a.x.min(b.x).clamp(-1, w), a.x.max(b.x).clamp(-1, w));
    let (top, bottom) = (a.y.min(b.y).clamp(-1, h), a.y.max(b.y).clamp(-1, h));
    if right < 0 || bottom < 0 || left >= w || top >= h {
      return None;
    }
    Some(Rect::at(left, top).of_size((right - left + 1) as u32, (bottom - top + 1) as u32))
  }
}

impl Surface for ImageSurface<'_> {
  type Error = Infallible;

  fn draw_filled_rect(
    &mut self,
    corner1: Point<i32>,
    corner2: Point<i32>,
    color: Color,
  ) -> Result<(), Self::Error> {
    if let Some(rect) = self.rect_between(corner1, corner2) {
      draw_filled_rect_mut(self.image, rect, color);
    }
    Ok(())
  }

  fn draw_rect_outline(
    &mut self,
    corner1: Point<i32>,
    corner2: Point<i32>,
    color: Color,
  ) -> Result<(), Self::Error> {
    if let Some(rect) = self.rect_between(corner1, corner2) {
      draw_hollow_rect_mut(self.image, rect, color);
    }
    Ok(())
  }

  fn draw_text(
    &mut self,
    anchor: Point<i32>,
    text: &str,
    color: Color,
  ) -> Result<(), Self::Error> {
    // imageproc 以左上角定位文本
    let (width, height) = text_size(self.scale, &self.font, text);
    let (left, bottom) = (i64::from(anchor.x), i64::from(anchor.y));
    let top = bottom - i64::from(height);
    if left + i64::from(width) < 0
      || bottom < 0
      || left >= i64::from(self.image.width())
      || top >= i64::from(self.image.height())
    {
      return Ok(());
    }
    // 与图像相交时 left 与 top 都在 i32 范围内
    draw_text_mut(
      self.image,
      color,
      left as i32,
      top as i32,
      self.scale,
      &self.font,
      text,
    );
    Ok(())
  }

  fn measure_text(&self, text: &str) -> Result<(u32, u32), Self::Error> {
    Ok(text_size(self.scale, &self.font, text))
  }
}
