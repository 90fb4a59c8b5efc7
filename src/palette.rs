// 该文件是 Huitu （绘图） 项目的一部分。
// src/palette.rs - 类别调色板
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

use std::ops::Index;

use image::Rgb;

/// 三通道 8 位颜色，通道顺序由绘图表面决定
pub type Color = Rgb<u8>;

/// 取颜色的补色（每个通道取 255 - c）
pub fn complement(color: Color) -> Color {
  Rgb(color.0.map(|c| 255 - c))
}

/// 按索引取色的调色板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
  colors: Box<[Color]>,
}

impl Palette {
  pub fn len(&self) -> usize {
    self.colors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.colors.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<Color> {
    self.colors.get(index).copied()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Color> {
    self.colors.iter()
  }
}

impl Index<usize> for Palette {
  type Output = Color;

  fn index(&self, index: usize) -> &Self::Output {
    &self.colors[index]
  }
}

/// 第 `index` 个调色板颜色。
///
/// 索引的低位按 (r, g, b) 轮流交织到三个通道，从最高位开始填充，
/// 每轮消耗 3 位，共 8 轮；更高的位被丢弃。
pub fn palette_color(index: usize) -> Color {
  let mut bits = index;
  let (mut r, mut g, mut b) = (0u8, 0u8, 0u8);
  for j in (0..8).rev() {
    r |= ((bits & 1) as u8) << j;
    g |= (((bits >> 1) & 1) as u8) << j;
    b |= (((bits >> 2) & 1) as u8) << j;
    bits >>= 3;
  }
  Rgb([r, g, b])
}

/// 生成长度为 `n` 的调色板
pub fn color_map(n: usize) -> Palette {
  Palette {
    colors: (0..n).map(palette_color).collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn empty_palette() {
    assert!(color_map(0).is_empty());
  }

  #[test]
  fn palette_is_deterministic() {
    let a = color_map(20);
    let b = color_map(20);
    assert_eq!(a.len(), 20);
    assert_eq!(a, b);
  }

  #[test]
  fn leading_entries() {
    let palette = color_map(8);
    assert_eq!(palette[0], Rgb([0, 0, 0]));
    assert_eq!(palette[1], Rgb([128, 0, 0]));
    assert_eq!(palette[2], Rgb([0, 128, 0]));
    assert_eq!(palette[3], Rgb([128, 128, 0]));
    assert_eq!(palette[4], Rgb([0, 0, 128]));
    assert_eq!(palette[7], Rgb([128, 128, 128]));
  }

  #[test]
  fn second_round_fills_next_bit() {
    // 8 = 0b001_000，第二轮的 r 位落在 bit 6
    assert_eq!(palette_color(8), Rgb([64, 0, 0]));
    assert_eq!(palette_color(9), Rgb([192, 0, 0]));
  }

  #[test]
  fn no_collisions_up_to_256() {
    let palette = color_map(256);
    let unique: HashSet<[u8; 3]> = palette.iter().map(|c| c.0).collect();
    assert_eq!(unique.len(), 256);
  }

  #[test]
  fn prefix_is_stable_across_sizes() {
    let small = color_map(10);
    let large = color_map(300);
    for i in 0..10 {
      assert_eq!(small[i], large[i]);
    }
  }

  #[test]
  fn bits_past_eight_rounds_are_dropped() {
    assert_eq!(palette_color(1 << 24), palette_color(0));
    assert_eq!(palette_color((1 << 24) + 5), palette_color(5));
  }

  #[test]
  fn complement_inverts_channels() {
    assert_eq!(complement(Rgb([0, 128, 255])), Rgb([255, 127, 0]));
  }
}
