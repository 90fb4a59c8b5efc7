// 该文件是 Huitu （绘图） 项目的一部分。
// src/frame.rs - 视频帧与张量转换
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

use image::RgbImage;
use ndarray::{Array3, Array4, Axis};

const RGB_CHANNELS: usize = 3;

/// 视频帧：行 × 列 × 通道交织存储，通道顺序为 BGR
///
/// 借用 `RgbImage` 的存储与绘图能力，像素的三个分量按 BGR 解释。
pub type Frame = RgbImage;

/// 交换第 0 与第 2 通道（BGR 与 RGB 互转）
pub fn swap_channels(frame: &RgbImage) -> RgbImage {
  let mut swapped = frame.clone();
  for pixel in swapped.pixels_mut() {
    pixel.0.swap(0, 2);
  }
  swapped
}

/// 将解码得到的 RGB 图像转为 BGR 帧
pub fn from_rgb_image(image: RgbImage) -> Frame {
  let mut frame = image;
  for pixel in frame.pixels_mut() {
    pixel.0.swap(0, 2);
  }
  frame
}

/// 将 BGR 帧转为 RGB 图像
pub fn to_rgb_image(frame: &Frame) -> RgbImage {
  swap_channels(frame)
}

/// 将帧转为 (3, H, W) 的 RGB 浮点张量，数值归一化到 [0, 1]。
///
/// 不修改输入帧。
pub fn to_tensor(frame: &Frame) -> Array3<f32> {
  let (width, height) = frame.dimensions();
  Array3::from_shape_fn(
    (RGB_CHANNELS, height as usize, width as usize),
    |(c, h, w)| {
      let pixel = frame.get_pixel(w as u32, h as u32);
      pixel[RGB_CHANNELS - 1 - c] as f32 / 255.0
    },
  )
}

/// 带批次维度的 (1, 3, H, W) 张量
pub fn to_batch_tensor(frame: &Frame) -> Array4<f32> {
  to_tensor(frame).insert_axis(Axis(0))
}
