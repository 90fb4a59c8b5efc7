// 该文件是 Huitu （绘图） 项目的一部分。
// src/input.rs - 视频/图像输入
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

use std::iter::FusedIterator;

use thiserror::Error;
use tracing::{debug, error};

use crate::{FromUrl, FromUrlWithScheme, frame::Frame};

/// 视频源
pub trait VideoCapture {
  type Error;

  fn is_opened(&self) -> bool;

  /// 读取下一帧，`Ok(None)` 表示视频已结束
  fn read(&mut self) -> Result<Option<Frame>, Self::Error>;
}

/// 按需从视频源拉取帧的迭代器。
///
/// 视频源关闭、结束或出错后不再产生帧。出错时先产出该错误再结束。
pub struct FrameStream<'a, C: VideoCapture> {
  capture: &'a mut C,
  finished: bool,
}

impl<C: VideoCapture> Iterator for FrameStream<'_, C> {
  type Item = Result<Frame, C::Error>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.finished {
      return None;
    }
    if !self.capture.is_opened() {
      debug!("视频源已关闭");
      self.finished = true;
      return None;
    }

    match self.capture.read() {
      Ok(Some(frame)) => Some(Ok(frame)),
      Ok(None) => {
        debug!("视频源已结束");
        self.finished = true;
        None
      }
      Err(e) => {
        error!("读取视频帧失败");
        self.finished = true;
        Some(Err(e))
      }
    }
  }
}

impl<C: VideoCapture> FusedIterator for FrameStream<'_, C> {}

/// 逐帧遍历视频源
pub fn iterate_video<C: VideoCapture>(capture: &mut C) -> FrameStream<'_, C> {
  FrameStream {
    capture,
    finished: false,
  }
}

mod read_image_file;
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

#[cfg(feature = "gstreamer_input")]
mod gstreamer_input;
#[cfg(feature = "gstreamer_input")]
pub use self::gstreamer_input::{
  GStreamerInput, GStreamerInputError, GStreamerInputPipelineBuilder,
};

#[derive(Error, Debug)]
pub enum InputError {
  #[error("Image file input error: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[cfg(feature = "gstreamer_input")]
  #[error("GStreamer input error: {0}")]
  GStreamerInputError(#[from] GStreamerInputError),
  #[error("URI scheme mismatch: {0}")]
  SchemeMismatch(String),
}

/// 按 URL 方案选择的输入源
pub enum InputWrapper {
  ReadImageFile(ImageFileInput),
  #[cfg(feature = "gstreamer_input")]
  GStreamerInput(GStreamerInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "gstreamer_input")]
    {
      if url.scheme() == GStreamerInputPipelineBuilder::SCHEME {
        let input = GStreamerInputPipelineBuilder::from_url(url)?.build()?;
        return Ok(InputWrapper::GStreamerInput(input));
      }
    }
    if url.scheme() == ImageFileInput::SCHEME {
      let input = ImageFileInput::from_url(url)?;
      return Ok(InputWrapper::ReadImageFile(input));
    }
    Err(InputError::SchemeMismatch(url.scheme().to_string()))
  }
}

impl VideoCapture for InputWrapper {
  type Error = InputError;

  fn is_opened(&self) -> bool {
    match self {
      InputWrapper::ReadImageFile(input) => input.is_opened(),
      #[cfg(feature = "gstreamer_input")]
      InputWrapper::GStreamerInput(input) => input.is_opened(),
    }
  }

  fn read(&mut self) -> Result<Option<Frame>, Self::Error> {
    match self {
      InputWrapper::ReadImageFile(input) => input.read().map_err(InputError::from),
      #[cfg(feature = "gstreamer_input")]
      InputWrapper::GStreamerInput(input) => input.read().map_err(InputError::from),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// 预置若干帧的视频源，第 `fail_at` 次读取返回错误
  struct ScriptedCapture {
    opened: bool,
    remaining: usize,
    fail_at: Option<usize>,
    reads: usize,
  }

  impl ScriptedCapture {
    fn new(frames: usize) -> Self {
      Self {
        opened: true,
        remaining: frames,
        fail_at: None,
        reads: 0,
      }
    }
  }

  impl VideoCapture for ScriptedCapture {
    type Error = String;

    fn is_opened(&self) -> bool {
      self.opened
    }

    fn read(&mut self) -> Result<Option<Frame>, Self::Error> {
      self.reads += 1;
      if self.fail_at == Some(self.reads) {
        return Err("decode failed".to_string());
      }
      if self.remaining == 0 {
        return Ok(None);
      }
      self.remaining -= 1;
      Ok(Some(Frame::new(2, 2)))
    }
  }

  #[test]
  fn closed_source_yields_nothing() {
    let mut capture = ScriptedCapture::new(3);
    capture.opened = false;
    assert_eq!(iterate_video(&mut capture).count(), 0);
    assert_eq!(capture.reads, 0);
  }

  #[test]
  fn yields_until_end_of_stream() {
    let mut capture = ScriptedCapture::new(3);
    let frames: Vec<_> = iterate_video(&mut capture).collect();
    assert_eq!(frames.len(), 3);
    assert!(frames.iter().all(Result::is_ok));
  }

  #[test]
  fn pulls_lazily() {
    let mut capture = ScriptedCapture::new(100);
    let taken = iterate_video(&mut capture).take(2).count();
    assert_eq!(taken, 2);
    assert_eq!(capture.reads, 2);
  }

  #[test]
  fn exhausted_source_yields_nothing_again() {
    let mut capture = ScriptedCapture::new(1);
    assert_eq!(iterate_video(&mut capture).count(), 1);
    assert_eq!(iterate_video(&mut capture).count(), 0);
  }

  #[test]
  fn error_terminates_stream() {
    let mut capture = ScriptedCapture::new(5);
    capture.fail_at = Some(2);
    let mut stream = iterate_video(&mut capture);
    assert!(matches!(stream.next(), Some(Ok(_))));
    assert!(matches!(stream.next(), Some(Err(_))));
    assert!(stream.next().is_none());
    assert!(stream.next().is_none());
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    let url = url::Url::parse("ftp://host/video.mp4").unwrap();
    assert!(matches!(
      InputWrapper::from_url(&url),
      Err(InputError::SchemeMismatch(_))
    ));
  }
}
