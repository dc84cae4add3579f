//! 随机源抽象
//!
//! 模拟器只通过 [`RandomSource`] 取随机数：生产环境使用 `rand` 的任意 RNG，
//! 测试中使用固定种子的 `StdRng` 或 [`ScriptedRandom`]（`mock` feature）。

/// 模拟器所需的随机数接口
pub trait RandomSource {
    /// `[0, 1)` 区间的均匀分布浮点数
    fn unit(&mut self) -> f64;

    /// `[lo, hi]` 闭区间的均匀分布整数
    ///
    /// 调用方保证 `lo <= hi`。
    fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64;
}

impl<R: rand::Rng + ?Sized> RandomSource for R {
    fn unit(&mut self) -> f64 {
        self.r#gen::<f64>()
    }

    fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        self.gen_range(lo..=hi)
    }
}

/// 按脚本返回数值的随机源
///
/// - `unit()` 依次返回 `units` 中的值，用尽后返回 `0.5`
/// - `int_inclusive()` 依次返回 `ints` 中的值（夹紧到 `[lo, hi]`），用尽后返回 `lo`
///
/// 默认值 0.5 既不会触发离线（概率通常很小），也不会触发离线恢复（需要 > 0.7）。
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default, Clone)]
pub struct ScriptedRandom {
    units: std::collections::VecDeque<f64>,
    ints: std::collections::VecDeque<i64>,
}

#[cfg(any(test, feature = "mock"))]
impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = f64>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn with_ints(mut self, ints: impl IntoIterator<Item = i64>) -> Self {
        self.ints.extend(ints);
        self
    }
}

#[cfg(any(test, feature = "mock"))]
impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f64 {
        self.units.pop_front().unwrap_or(0.5)
    }

    fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        self.ints.pop_front().map_or(lo, |v| v.clamp(lo, hi))
    }
}
