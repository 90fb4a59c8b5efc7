// 该文件是 Huitu （绘图） 项目的一部分。
// src/timer.rs - 作用域计时器
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

use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimerError {
  #[error("计时尚未结束")]
  NotStopped,
}

/// 记录一个作用域耗时的计时器
///
/// ```
/// use huitu::timer::DurationTimer;
///
/// let mut timer = DurationTimer::new();
/// {
///   let _guard = timer.enter();
///   // 被计时的代码
/// }
/// assert!(timer.duration().is_ok());
/// ```
#[derive(Debug, Default)]
pub struct DurationTimer {
  start: Option<Instant>,
  end: Option<Instant>,
}

impl DurationTimer {
  pub fn new() -> Self {
    Self::default()
  }

  /// 开始计时，并清除上一次的结束时间。
  ///
  /// 返回的守卫在析构时记录结束时间，包括提前返回与 panic 展开。
  pub fn enter(&mut self) -> TimerGuard<'_> {
    self.start = Some(Instant::now());
    self.end = None;
    TimerGuard { timer: self }
  }

  /// 对闭包计时，返回闭包的结果
  pub fn time<R>(&mut self, f: impl FnOnce() -> R) -> R {
    let _guard = self.enter();
    f()
  }

  pub fn duration(&self) -> Result<Duration, TimerError> {
    match (self.start, self.end) {
      (Some(start), Some(end)) => Ok(end.duration_since(start)),
      _ => Err(TimerError::NotStopped),
    }
  }
}

pub struct TimerGuard<'a> {
  timer: &'a mut DurationTimer,
}

impl Drop for TimerGuard<'_> {
  fn drop(&mut self) {
    self.timer.end = Some(Instant::now());
  }
}
