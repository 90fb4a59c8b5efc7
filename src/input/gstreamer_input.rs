// 该文件是 Huitu （绘图） 项目的一部分。
// src/input/gstreamer_input.rs - GStreamer 视频输入
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

//! # GStreamer 视频输入模块
//!
//! 通过 appsink 拉取 BGR 帧，支持视频文件与 V4L2 摄像头：
//!
//! - `gst://file/path/to/video.mp4`
//! - `gst://camera/dev/video0?width=640&height=480&fps=30&format=YUY2`
//!
//! 需要安装 GStreamer 开发库，并启用 `gstreamer_input` 特性。

use std::collections::HashMap;

use gstreamer::{self as gst, prelude::*};
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::Frame, input::VideoCapture};

/// GStreamer 输入错误类型
#[derive(Error, Debug)]
pub enum GStreamerInputError {
  /// URI scheme 不匹配（期望 "gst://"）
  #[error("URI scheme mismatch")]
  SchemeMismatch,
  #[error("GStreamer error: {0}")]
  GStreamerError(#[from] gst::glib::Error),
  #[error("GStreamer boolean error: {0}")]
  GStreamerBoolError(#[from] gst::glib::BoolError),
  #[error("Failed to get appsink element")]
  AppSinkNotFound,
  #[error("Failed to convert element to appsink")]
  AppSinkConversionFailed,
  #[error("Unsupported video format: {0:?}")]
  UnsupportedFormat(gst_video::VideoFormat),
  #[error("Pipeline error: {0}")]
  PipelineError(String),
  #[error("Buffer size mismatch: expected {expected} bytes, got {actual} bytes")]
  BufferSizeMismatch { expected: usize, actual: usize },
  #[error("State change error: {0}")]
  StateChangeError(#[from] gst::StateChangeError),
}

const GSTREAMER_INPUT_SCHEME: &str = "gst";

enum GStreamerInputBuilderItem {
  FileSource(String),
  CameraSource {
    camera: String,
    format: String,
    width: u32,
    height: u32,
    fps: u32,
  },
  Scale {
    width: u32,
    height: u32,
  },
  TargetFormat {
    format: &'static str,
  },
}

impl GStreamerInputBuilderItem {
  fn to_pipeline(&self) -> String {
    match self {
      GStreamerInputBuilderItem::FileSource(path) => {
        format!("filesrc location={} ! decodebin", path)
      }
      GStreamerInputBuilderItem::CameraSource {
        camera,
        format,
        width,
        height,
        fps,
      } => format!(
        "v4l2src device={} ! video/x-raw,format={},width={},height={},framerate={}/1",
        camera, format, width, height, fps
      ),
      GStreamerInputBuilderItem::Scale { width, height } => {
        format!("videoscale ! video/x-raw,width={},height={}", width, height)
      }
      GStreamerInputBuilderItem::TargetFormat { format } => {
        format!("videoconvert ! video/x-raw,format={}", format)
      }
    }
  }
}

/// GStreamer 输入管道构建器
pub struct GStreamerInputPipelineBuilder {
  items: Vec<GStreamerInputBuilderItem>,
}

fn query_u32(query: &HashMap<String, String>, key: &str) -> Option<u32> {
  query.get(key).and_then(|v| v.parse::<u32>().ok())
}

impl GStreamerInputPipelineBuilder {
  pub fn file(path: &str) -> Self {
    GStreamerInputPipelineBuilder {
      items: vec![GStreamerInputBuilderItem::FileSource(path.to_string())],
    }
  }

  pub fn camera(camera: &str, width: u32, height: u32, fps: u32) -> Self {
    GStreamerInputPipelineBuilder {
      items: vec![GStreamerInputBuilderItem::CameraSource {
        camera: camera.to_string(),
        format: "YUY2".to_string(),
        width,
        height,
        fps,
      }],
    }
  }

  pub fn scale(mut self, width: u32, height: u32) -> Self {
    self
      .items
      .push(GStreamerInputBuilderItem::Scale { width, height });
    self
  }

  fn description(&self) -> String {
    let basic_pipeline = self
      .items
      .iter()
      .map(GStreamerInputBuilderItem::to_pipeline)
      .chain(std::iter::once(
        GStreamerInputBuilderItem::TargetFormat { format: "BGR" }.to_pipeline(),
      ))
      .collect::<Vec<String>>()
      .join(" ! ");
    format!("{} ! appsink max-buffers=2 name=sink", basic_pipeline)
  }

  pub fn build(self) -> Result<GStreamerInput, GStreamerInputError> {
    gst::init()?;

    let full_pipeline = self.description();
    info!("GStreamer pipeline description: {}", full_pipeline);

    let pipeline = gst::parse::launch(&full_pipeline)?
      .downcast::<gst::Pipeline>()
      .map_err(|_| GStreamerInputError::PipelineError("Failed to create pipeline".to_string()))?;

    let appsink = pipeline
      .by_name("sink")
      .ok_or(GStreamerInputError::AppSinkNotFound)?
      .downcast::<gst_app::AppSink>()
      .map_err(|_| GStreamerInputError::AppSinkConversionFailed)?;

    pipeline.set_state(gst::State::Playing)?;

    Ok(GStreamerInput {
      pipeline,
      appsink,
      finished: false,
    })
  }
}

impl FromUrlWithScheme for GStreamerInputPipelineBuilder {
  const SCHEME: &'static str = GSTREAMER_INPUT_SCHEME;
}

impl FromUrl for GStreamerInputPipelineBuilder {
  type Error = GStreamerInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(GStreamerInputError::SchemeMismatch);
    }

    let query: HashMap<String, String> = url
      .query_pairs()
      .map(|(k, v)| (String::from(k), String::from(v)))
      .collect();

    let mut builder = match url.host_str() {
      Some("camera") => {
        let mut builder = Self::camera(
          url.path(),
          query_u32(&query, "width").unwrap_or(640),
          query_u32(&query, "height").unwrap_or(480),
          query_u32(&query, "fps").unwrap_or(15),
        );
        if let Some(format) = query.get("format")
          && let Some(GStreamerInputBuilderItem::CameraSource { format: f, .. }) =
            builder.items.first_mut()
        {
          *f = format.clone();
        }
        builder
      }
      Some("file") => Self::file(url.path()),
      _ => return Err(GStreamerInputError::SchemeMismatch),
    };

    if let (Some(width), Some(height)) = (
      query_u32(&query, "scale_width"),
      query_u32(&query, "scale_height"),
    ) {
      builder = builder.scale(width, height);
    }

    Ok(builder)
  }
}

/// GStreamer 视频输入，产生 BGR 帧
pub struct GStreamerInput {
  pipeline: gst::Pipeline,
  appsink: gst_app::AppSink,
  finished: bool,
}

impl Drop for GStreamerInput {
  fn drop(&mut self) {
    if let Err(e) = self.pipeline.set_state(gst::State::Null) {
      warn!("Failed to stop GStreamer pipeline: {}", e);
    }
  }
}

impl VideoCapture for GStreamerInput {
  type Error = GStreamerInputError;

  fn is_opened(&self) -> bool {
    !self.finished
  }

  fn read(&mut self) -> Result<Option<Frame>, Self::Error> {
    match self.appsink.pull_sample() {
      Ok(sample) => convert_sample(&sample).map(Some),
      Err(_) if self.appsink.is_eos() => {
        debug!("GStreamer 管道已结束");
        self.finished = true;
        Ok(None)
      }
      Err(e) => {
        self.finished = true;
        Err(e.into())
      }
    }
  }
}

fn convert_sample(sample: &gst::Sample) -> Result<Frame, GStreamerInputError> {
  let buffer = sample
    .buffer()
    .ok_or_else(|| GStreamerInputError::PipelineError("No buffer in sample".to_string()))?;
  let caps = sample
    .caps()
    .ok_or_else(|| GStreamerInputError::PipelineError("No caps in sample".to_string()))?;

  let video_info = gst_video::VideoInfo::from_caps(caps)?;
  if video_info.format() != gst_video::VideoFormat::Bgr {
    return Err(GStreamerInputError::UnsupportedFormat(video_info.format()));
  }

  let width = video_info.width() as usize;
  let height = video_info.height() as usize;
  let stride = video_info.stride()[0] as usize;

  let map = buffer.map_readable()?;
  let data = map.as_slice();

  // 行尾可能有对齐填充
  let expected_size = stride * (height.saturating_sub(1)) + width * 3;
  if data.len() < expected_size {
    return Err(GStreamerInputError::BufferSizeMismatch {
      expected: expected_size,
      actual: data.len(),
    });
  }

  let mut pixels = Vec::with_capacity(width * height * 3);
  for row in 0..height {
    let start = row * stride;
    pixels.extend_from_slice(&data[start..start + width * 3]);
  }

  Frame::from_raw(width as u32, height as u32, pixels).ok_or(
    GStreamerInputError::BufferSizeMismatch {
      expected: width * height * 3,
      actual: 0,
    },
  )
}
