// 该文件是 Huitu （绘图） 项目的一部分。
// src/render.rs - 检测与跟踪结果可视化
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

use serde::Deserialize;

use crate::{
  draw::{BBox, DrawError, Surface, default_color, draw_bbox},
  palette::Palette,
};

/// 浮点坐标截断为整数（向零取整）
pub fn truncate_bbox(bbox: &[f32; 4]) -> BBox {
  bbox.map(|v| v as i32)
}

/// 一帧的检测结果，三个序列按下标对应
#[derive(Debug, Clone, Default)]
pub struct Detections {
  pub bboxes: Vec<[f32; 4]>,
  pub class_ids: Vec<usize>,
  pub scores: Vec<f32>,
}

/// 单个检测条目
#[derive(Debug, Clone, Deserialize)]
pub struct DetectItem {
  pub bbox: [f32; 4], // [x_min, y_min, x_max, y_max]
  pub class_id: usize,
  pub score: f32,
}

impl FromIterator<DetectItem> for Detections {
  fn from_iter<I: IntoIterator<Item = DetectItem>>(iter: I) -> Self {
    let mut detections = Detections::default();
    for DetectItem {
      bbox,
      class_id,
      score,
    } in iter
    {
      detections.bboxes.push(bbox);
      detections.class_ids.push(class_id);
      detections.scores.push(score);
    }
    detections
  }
}

impl Detections {
  pub fn len(&self) -> usize {
    self.bboxes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bboxes.is_empty()
  }
}

/// 绘制检测结果，标签为 "类别名 置信度"，颜色取自调色板。
///
/// 所有类别索引在绘制前校验，越界时不修改图像。
pub fn draw_detections<S: Surface>(
  surface: &mut S,
  detections: &Detections,
  classes: &[String],
  cmap: &Palette,
) -> Result<(), DrawError<S::Error>> {
  let Detections {
    bboxes,
    class_ids,
    scores,
  } = detections;
  if class_ids.len() != bboxes.len() || scores.len() != bboxes.len() {
    return Err(DrawError::InvalidArgument("检测结果的边框、类别与置信度数量不一致"));
  }

  let colors = class_ids
    .iter()
    .map(|&index| match (classes.get(index), cmap.get(index)) {
      (Some(_), Some(color)) => Ok(color),
      _ => Err(DrawError::IndexOutOfRange {
        index,
        len: classes.len().min(cmap.len()),
      }),
    })
    .collect::<Result<Vec<_>, DrawError<S::Error>>>()?;

  let bboxes: Vec<BBox> = bboxes.iter().map(truncate_bbox).collect();
  draw_bbox(
    surface,
    &bboxes,
    |i| format!("{} {:.2}", classes[class_ids[i]], scores[i]),
    |i| colors[i],
  )
}

/// 带身份编号的跟踪目标
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
  pub bbox: [f32; 4],
  pub id: i64,
}

impl From<[f32; 5]> for Track {
  /// 行格式 [x1, y1, x2, y2, id]
  fn from(row: [f32; 5]) -> Self {
    let [x1, y1, x2, y2, id] = row;
    Track {
      bbox: [x1, y1, x2, y2],
      id: id as i64,
    }
  }
}

/// 绘制跟踪结果，标签为身份编号，颜色固定
pub fn draw_trackers<S: Surface>(surface: &mut S, tracks: &[Track]) -> Result<(), DrawError<S::Error>> {
  let bboxes: Vec<BBox> = tracks.iter().map(|t| truncate_bbox(&t.bbox)).collect();
  draw_bbox(
    surface,
    &bboxes,
    |i| tracks[i].id.to_string(),
    default_color,
  )
}
