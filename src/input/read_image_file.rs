// 该文件是 Huitu （绘图） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::{
  collections::VecDeque,
  path::{Path, PathBuf},
};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{Frame, from_rgb_image},
  input::VideoCapture,
};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("No image found in {0}")]
  NoImage(PathBuf),
}

const READ_IMAGE_FILE_SCHEME: &str = "image";
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

fn is_image_file(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    .unwrap_or(false)
}

/// 图像文件输入
///
/// 路径为文件时产生单帧；为目录时按文件名顺序逐张解码，当作图像序列视频。
pub struct ImageFileInput {
  paths: VecDeque<PathBuf>,
}

impl ImageFileInput {
  pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageFileInputError> {
    let path = path.as_ref();
    let paths: VecDeque<PathBuf> = if path.is_dir() {
      let mut entries = std::fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
      entries.retain(|p| is_image_file(p));
      entries.sort();
      entries.into()
    } else {
      VecDeque::from([path.to_path_buf()])
    };

    if paths.is_empty() {
      return Err(ImageFileInputError::NoImage(path.to_path_buf()));
    }
    info!("图像输入: {} ({} 张)", path.display(), paths.len());

    Ok(ImageFileInput { paths })
  }
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = READ_IMAGE_FILE_SCHEME;
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    Self::open(url.path())
  }
}

impl VideoCapture for ImageFileInput {
  type Error = ImageFileInputError;

  fn is_opened(&self) -> bool {
    !self.paths.is_empty()
  }

  fn read(&mut self) -> Result<Option<Frame>, Self::Error> {
    let Some(path) = self.paths.pop_front() else {
      return Ok(None);
    };
    debug!("读取图像: {}", path.display());
    let image = ImageReader::open(&path)?.decode()?.to_rgb8();
    Ok(Some(from_rgb_image(image)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::input::iterate_video;
  use image::{Rgb, RgbImage};

  fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("huitu-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
  }

  #[test]
  fn single_image_is_one_bgr_frame() {
    let dir = temp_dir("single");
    let path = dir.join("a.png");
    RgbImage::from_pixel(3, 2, Rgb([255, 0, 0])).save(&path).unwrap();

    let mut input = ImageFileInput::open(&path).unwrap();
    let frames: Vec<_> = iterate_video(&mut input).collect::<Result<_, _>>().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].dimensions(), (3, 2));
    assert_eq!(*frames[0].get_pixel(0, 0), Rgb([0, 0, 255]));
    assert!(!input.is_opened());
  }

  #[test]
  fn directory_is_read_in_name_order() {
    let dir = temp_dir("sequence");
    RgbImage::from_pixel(1, 1, Rgb([0, 0, 2])).save(dir.join("002.png")).unwrap();
    RgbImage::from_pixel(1, 1, Rgb([0, 0, 1])).save(dir.join("001.png")).unwrap();
    std::fs::write(dir.join("notes.txt"), "skip").unwrap();

    let mut input = ImageFileInput::open(&dir).unwrap();
    let order: Vec<u8> = iterate_video(&mut input)
      .map(|f| f.unwrap().get_pixel(0, 0)[0])
      .collect();
    assert_eq!(order, vec![1, 2]);
  }

  #[test]
  fn empty_directory_is_error() {
    let dir = temp_dir("empty");
    assert!(matches!(
      ImageFileInput::open(&dir),
      Err(ImageFileInputError::NoImage(_))
    ));
  }

  #[test]
  fn wrong_scheme_is_rejected() {
    let url = Url::parse("gst://file/video.mp4").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::SchemaMismatch)
    ));
  }
}
