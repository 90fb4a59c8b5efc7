// 该文件是 Huitu （绘图） 项目的一部分。
// tests/annotate_image.rs - 在真实图像上绘制的集成测试
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

use huitu::{
  draw::{DEFAULT_BOX_COLOR, ImageSurface, Surface, default_font},
  frame::{Frame, to_tensor},
  palette::color_map,
  render::{Detections, Track, draw_detections, draw_trackers},
};
use image::Rgb;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

#[test]
fn detection_box_and_label_on_frame() {
  let mut frame = Frame::new(120, 120);
  let detections = Detections {
    bboxes: vec![[20.4, 40.6, 80.2, 90.9]],
    class_ids: vec![1],
    scores: vec![0.9],
  };
  let classes = vec!["person".to_string(), "car".to_string()];
  let cmap = color_map(classes.len());
  let color = cmap[1];

  let (label_w, label_h) = {
    let mut surface = ImageSurface::new(&mut frame, default_font());
    let extent = surface.measure_text("car 0.90").unwrap();
    draw_detections(&mut surface, &detections, &classes, &cmap).unwrap();
    extent
  };

  // 边框
  assert_eq!(*frame.get_pixel(20, 90), color);
  assert_eq!(*frame.get_pixel(80, 60), color);
  assert_eq!(*frame.get_pixel(50, 65), BLACK);

  // 标签背景位于边框左上角上方，且其中有文字像素
  let label_pixels: Vec<Rgb<u8>> = (20..20 + label_w)
    .flat_map(|x| (40 - label_h..=40).map(move |y| (x, y)))
    .map(|(x, y)| *frame.get_pixel(x, y))
    .collect();
  assert!(label_pixels.iter().any(|&p| p == color));
  assert!(label_pixels.iter().any(|&p| p != color));
  assert_eq!(*frame.get_pixel(19, 40 - label_h), BLACK);
}

#[test]
fn tracks_use_default_color() {
  let mut frame = Frame::new(64, 64);
  let tracks = [Track::from([30.9, 30.2, 60.7, 60.1, 3.0])];
  draw_trackers(&mut ImageSurface::new(&mut frame, default_font()), &tracks).unwrap();

  assert_eq!(*frame.get_pixel(30, 60), DEFAULT_BOX_COLOR);
  assert_eq!(*frame.get_pixel(60, 45), DEFAULT_BOX_COLOR);
  assert_eq!(*frame.get_pixel(61, 45), BLACK);
}

#[test]
fn annotated_frame_converts_to_tensor() {
  let mut frame = Frame::new(16, 8);
  let tracks = [Track::from([0.0, 0.0, 15.0, 7.0, 1.0])];
  draw_trackers(&mut ImageSurface::new(&mut frame, default_font()), &tracks).unwrap();

  let tensor = to_tensor(&frame);
  assert_eq!(tensor.shape(), &[3, 8, 16]);
  // 默认颜色 [255, 0, 0] 按 BGR 存储，转为 RGB 后位于第 2 通道
  assert_eq!(tensor[[2, 7, 0]], 1.0);
  assert_eq!(tensor[[0, 7, 0]], 0.0);
}

#[test]
fn diverged_track_is_clipped_to_frame() {
  let mut frame = Frame::new(32, 32);
  // 超出 i32 范围的坐标截断时饱和
  let tracks = [Track::from([-3.0e9, 4.0, 3.0e9, 20.0, 9.0])];
  draw_trackers(&mut ImageSurface::new(&mut frame, default_font()), &tracks).unwrap();

  assert_eq!(*frame.get_pixel(0, 20), DEFAULT_BOX_COLOR);
  assert_eq!(*frame.get_pixel(31, 20), DEFAULT_BOX_COLOR);
  assert_eq!(*frame.get_pixel(16, 12), BLACK);
}
