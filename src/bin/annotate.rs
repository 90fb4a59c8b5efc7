// 该文件是 Huitu （绘图） 项目的一部分。
// src/bin/annotate.rs - 在视频帧上绘制检测/跟踪结果
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

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use url::Url;

use huitu::{
  FromUrl,
  draw::{DrawError, ImageSurface, Surface, default_font, load_font},
  input::{InputWrapper, iterate_video},
  labels::load_classes,
  output::save_frame,
  palette::{Palette, color_map},
  render::{DetectItem, Detections, Track, draw_detections, draw_trackers},
  timer::DurationTimer,
};

/// Huitu 标注工具参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源，例如 image:///data/frames 或 gst://file/data/video.mp4
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出目录
  #[arg(long, value_name = "DIR")]
  pub output: PathBuf,
  /// 类别名称文件，每行一个
  #[arg(long, value_name = "FILE")]
  pub classes: Option<PathBuf>,
  /// 检测结果 JSON：[{"bbox":[x1,y1,x2,y2],"class_id":0,"score":0.9}]
  #[arg(long, value_name = "FILE", conflicts_with = "tracks")]
  pub detections: Option<PathBuf>,
  /// 跟踪结果 JSON：[[x1,y1,x2,y2,id]]
  #[arg(long, value_name = "FILE")]
  pub tracks: Option<PathBuf>,
  /// 标签字体文件
  #[arg(long, value_name = "FONT")]
  pub font: Option<PathBuf>,
  /// 最多处理的帧数，0 表示不限制
  #[arg(long, default_value_t = 0)]
  pub max_frames: usize,
}

enum Annotation {
  Detections {
    detections: Detections,
    classes: Vec<String>,
    cmap: Palette,
  },
  Tracks(Vec<Track>),
  Nothing,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("无法读取文件: {}", path.display()))?;
  serde_json::from_str(&content).with_context(|| format!("无法解析 JSON: {}", path.display()))
}

impl Annotation {
  fn from_args(args: &Args) -> Result<Self> {
    if let Some(path) = &args.detections {
      let detections: Detections = read_json::<Vec<DetectItem>>(path)?.into_iter().collect();
      let classes = match &args.classes {
        Some(path) => load_classes(path)?,
        None => {
          // 没有类别表时以类别编号作为名称
          let count = detections.class_ids.iter().max().map_or(0, |&id| id + 1);
          (0..count).map(|id| id.to_string()).collect()
        }
      };
      let cmap = color_map(classes.len());
      info!("加载了 {} 个检测结果", detections.len());
      return Ok(Annotation::Detections {
        detections,
        classes,
        cmap,
      });
    }

    if let Some(path) = &args.tracks {
      let tracks: Vec<Track> = read_json::<Vec<[f32; 5]>>(path)?
        .into_iter()
        .map(Track::from)
        .collect();
      info!("加载了 {} 个跟踪目标", tracks.len());
      return Ok(Annotation::Tracks(tracks));
    }

    warn!("未指定检测或跟踪结果，仅复制输入帧");
    Ok(Annotation::Nothing)
  }

  fn draw<S: Surface>(&self, surface: &mut S) -> Result<(), DrawError<S::Error>> {
    match self {
      Annotation::Detections {
        detections,
        classes,
        cmap,
      } => draw_detections(surface, detections, classes, cmap),
      Annotation::Tracks(tracks) => draw_trackers(surface, tracks),
      Annotation::Nothing => Ok(()),
    }
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出目录: {}", args.output.display());

  let annotation = Annotation::from_args(&args)?;
  let font = match args.font.as_deref() {
    Some(path) => load_font(path)?,
    None => default_font(),
  };
  let mut input = InputWrapper::from_url(&args.input)?;
  let mut timer = DurationTimer::new();

  for (index, frame) in iterate_video(&mut input).enumerate() {
    if args.max_frames > 0 && index >= args.max_frames {
      info!("达到指定帧数 {}, 退出", args.max_frames);
      break;
    }

    let mut frame = frame?;
    timer.time(|| {
      let mut surface = ImageSurface::new(&mut frame, font.clone());
      annotation.draw(&mut surface)
    })?;
    info!("第 {} 帧绘制完成，耗时: {:.2?}", index, timer.duration()?);

    save_frame(&frame, args.output.join(format!("frame_{:06}.png", index)))?;
  }

  info!("任务完成，退出");
  Ok(())
}
