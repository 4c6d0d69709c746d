// crates/pb_physics/src/allocation.rs

//! 分配系数引擎（固定节点法）
//!
//! 聚并或破碎产生的新粒子体积 `v` 一般不落在网格节点上，按 Kumar &
//! Ramkrishna 固定节点法分配给相邻两组，同时守恒数目与体积。
//!
//! # 数目分配 η
//!
//! 对 `x_lo <= v <= x_hi`：
//!
//! ```text
//! η_lo = (x_hi - v) / (x_hi - x_lo)
//! η_hi = (v - x_lo) / (x_hi - x_lo)
//! η_lo + η_hi = 1,   η_lo·x_lo + η_hi·x_hi = v
//! ```
//!
//! 网格之外全部分给边界组，`η_b = v / x_b`，保证体积守恒。
//!
//! # 体积分配 ηV
//!
//! `ηV_i = η_i · x_i / v`。网格内两系数之和为 1；网格下方为 `(1, 0)`
//! 落在第 0 组，上方为 `(0, 1)` 落在最后一组。
//!
//! 恰好位于节点时返回 `(1, 0)`，不做除法。

use pb_foundation::{PbError, PbResult};

use crate::field::ScalarField;

/// 一次括号查找的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// 下方组
    pub lo: usize,
    /// 上方组（网格之外或恰在节点上时等于 `lo`）
    pub hi: usize,
    /// 下方组数目分配系数
    pub eta_lo: f64,
    /// 上方组数目分配系数
    pub eta_hi: f64,
}

impl Bracket {
    /// 非零分配的 (组, η) 列表
    pub fn targets(&self) -> impl Iterator<Item = (usize, f64)> {
        let hi = if self.hi != self.lo && self.eta_hi != 0.0 {
            Some((self.hi, self.eta_hi))
        } else {
            None
        };
        std::iter::once((self.lo, self.eta_lo)).chain(hi)
    }
}

/// 分配系数引擎
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    x: Vec<f64>,
    boundaries: Vec<f64>,
    deltas: Vec<f64>,
}

impl AllocationEngine {
    /// 由组体积构建（必须为正且严格递增）
    pub fn new(x: &[f64]) -> PbResult<Self> {
        if x.is_empty() {
            return Err(PbError::invalid_input("分配系数引擎至少需要一个组"));
        }
        if let Some(i) = x.iter().position(|&v| !(v > 0.0) || !v.is_finite()) {
            return Err(PbError::invalid_input(format!("组 {} 的体积 {} 无效", i, x[i])));
        }
        if let Some(i) = x.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(PbError::invalid_input(format!(
                "组体积必须严格递增: x{}={:e}, x{}={:e}",
                i,
                x[i],
                i + 1,
                x[i + 1]
            )));
        }

        let n = x.len();
        let mut boundaries = Vec::with_capacity(n + 1);
        boundaries.push(x[0]);
        for i in 1..n {
            boundaries.push(0.5 * (x[i - 1] + x[i]));
        }
        boundaries.push(x[n - 1]);
        let deltas = boundaries.windows(2).map(|w| w[1] - w[0]).collect();

        Ok(Self {
            x: x.to_vec(),
            boundaries,
            deltas,
        })
    }

    /// 组数
    #[inline]
    pub fn n_groups(&self) -> usize {
        self.x.len()
    }

    /// 组体积
    #[inline]
    pub fn x(&self, i: usize) -> f64 {
        self.x[i]
    }

    /// 全部组体积
    pub fn volumes(&self) -> &[f64] {
        &self.x
    }

    /// 类边界 v_0..v_N
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// 类宽度 Δ_i = v_{i+1} - v_i
    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    /// 第 i 类宽度
    #[inline]
    pub fn delta(&self, i: usize) -> f64 {
        self.deltas[i]
    }

    /// 二元破碎组对 (i, j) 的碎片类宽度
    ///
    /// 第 i 类在 x_j/2 处截断：碎片体积取 [v_i, min(v_{i+1}, x_j/2)]，
    /// 大于 x_j/2 的一半由互补碎片计入，不重复计数。`x_j/2 <= v_i` 时为 0。
    pub fn pair_delta(&self, i: usize, j: usize) -> f64 {
        let half = 0.5 * self.x[j];
        let (lo, hi) = (self.boundaries[i], self.boundaries[i + 1]);
        if half <= lo {
            0.0
        } else if half < hi {
            half - lo
        } else {
            self.deltas[i]
        }
    }

    /// 二分查找 v 的括号组与数目分配系数
    ///
    /// 网格之外返回 `(v/x_b, 0)`：数目不守恒、体积守恒。此时体积分配系数
    /// [`Self::eta_v`] 才是 `(1, 0)`（下方）或 `(0, 1)`（上方）。
    pub fn bracket(&self, v: f64) -> Bracket {
        let n = self.x.len();
        let first = self.x[0];
        let last = self.x[n - 1];

        if v <= first {
            let eta = if v == first { 1.0 } else { v / first };
            return Bracket { lo: 0, hi: 0, eta_lo: eta, eta_hi: 0.0 };
        }
        if v >= last {
            let eta = if v == last { 1.0 } else { v / last };
            return Bracket { lo: n - 1, hi: n - 1, eta_lo: eta, eta_hi: 0.0 };
        }

        // x[hi-1] <= v < x[hi]
        let hi = self.x.partition_point(|&xi| xi <= v);
        let lo = hi - 1;
        let (x_lo, x_hi) = (self.x[lo], self.x[hi]);
        if v == x_lo {
            return Bracket { lo, hi: lo, eta_lo: 1.0, eta_hi: 0.0 };
        }
        let width = x_hi - x_lo;
        Bracket {
            lo,
            hi,
            eta_lo: (x_hi - v) / width,
            eta_hi: (v - x_lo) / width,
        }
    }

    /// 第 i 组对体积 v 的数目分配系数
    pub fn eta(&self, i: usize, v: f64) -> f64 {
        let b = self.bracket(v);
        if i == b.lo {
            b.eta_lo
        } else if i == b.hi {
            b.eta_hi
        } else {
            0.0
        }
    }

    /// 第 i 组对体积 v 的体积分配系数
    pub fn eta_v(&self, i: usize, v: f64) -> f64 {
        let eta = self.eta(i, v);
        if eta == 0.0 {
            0.0
        } else {
            eta * self.x[i] / v
        }
    }

    /// 逐单元数目分配系数
    pub fn eta_field(&self, i: usize, v: &ScalarField) -> ScalarField {
        ScalarField::from_fn(v.len(), |c| self.eta(i, v[c]))
    }

    /// 逐单元体积分配系数
    pub fn eta_v_field(&self, i: usize, v: &ScalarField) -> ScalarField {
        ScalarField::from_fn(v.len(), |c| self.eta_v(i, v[c]))
    }
}
