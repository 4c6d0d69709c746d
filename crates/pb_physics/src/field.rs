// crates/pb_physics/src/field.rs

//! 单元标量场
//!
//! 群体平衡中所有逐单元量（组分数、速率表、源项、质量传递率）都是
//! [`ScalarField`]。逐单元运算与单元之间互不依赖，批量运算通过 rayon 并行。

use pb_foundation::float::KahanSum;
use pb_foundation::{PbError, PbResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// 并行阈值：单元数低于该值时串行执行
const PARALLEL_THRESHOLD: usize = 1024;

/// 单元标量场
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScalarField {
    values: Vec<f64>,
}

impl ScalarField {
    /// 全零场
    pub fn zeros(n_cells: usize) -> Self {
        Self {
            values: vec![0.0; n_cells],
        }
    }

    /// 均匀场
    pub fn uniform(n_cells: usize, value: f64) -> Self {
        Self {
            values: vec![value; n_cells],
        }
    }

    /// 由数据构造
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// 单元数
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 只读切片
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// 可变切片
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// 取出数据
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    /// 迭代器
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }

    /// 全部置为同一值
    pub fn fill(&mut self, value: f64) {
        self.values.iter_mut().for_each(|v| *v = value);
    }

    /// 从另一场复制（大小必须一致）
    pub fn assign(&mut self, other: &ScalarField) -> PbResult<()> {
        PbError::check_size("ScalarField::assign", self.len(), other.len())?;
        self.values.copy_from_slice(&other.values);
        Ok(())
    }

    /// self += s * other
    pub fn add_scaled(&mut self, other: &[f64], s: f64) {
        debug_assert_eq!(self.len(), other.len());
        if self.len() >= PARALLEL_THRESHOLD {
            self.values
                .par_iter_mut()
                .zip(other.par_iter())
                .for_each(|(a, &b)| *a += s * b);
        } else {
            for (a, &b) in self.values.iter_mut().zip(other) {
                *a += s * b;
            }
        }
    }

    /// self += other
    pub fn add_assign(&mut self, other: &[f64]) {
        self.add_scaled(other, 1.0);
    }

    /// 逐单元乘积
    pub fn mul(&self, other: &ScalarField) -> ScalarField {
        debug_assert_eq!(self.len(), other.len());
        ScalarField::from_fn(self.len(), |c| self.values[c] * other.values[c])
    }

    /// self *= s
    pub fn scale(&mut self, s: f64) {
        self.values.iter_mut().for_each(|v| *v *= s);
    }

    /// 逐单元变换（并行）
    pub fn map_inplace<F>(&mut self, f: F)
    where
        F: Fn(usize, f64) -> f64 + Send + Sync,
    {
        if self.len() >= PARALLEL_THRESHOLD {
            self.values
                .par_iter_mut()
                .enumerate()
                .for_each(|(c, v)| *v = f(c, *v));
        } else {
            for (c, v) in self.values.iter_mut().enumerate() {
                *v = f(c, *v);
            }
        }
    }

    /// 由逐单元函数生成新场（并行）
    pub fn from_fn<F>(n_cells: usize, f: F) -> Self
    where
        F: Fn(usize) -> f64 + Send + Sync,
    {
        let values = if n_cells >= PARALLEL_THRESHOLD {
            (0..n_cells).into_par_iter().map(f).collect()
        } else {
            (0..n_cells).map(f).collect()
        };
        Self { values }
    }

    /// 最大值（空场返回 -inf）
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// 最小值（空场返回 +inf）
    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// 任一单元非零
    pub fn any_nonzero(&self) -> bool {
        self.values.iter().any(|&v| v != 0.0)
    }

    /// Kahan 求和
    pub fn sum(&self) -> f64 {
        KahanSum::sum_iter(self.values.iter().copied())
    }

    /// 体积加权平均
    pub fn weighted_average(&self, volumes: &ScalarField) -> f64 {
        let mut num = KahanSum::new();
        let mut den = KahanSum::new();
        for (&v, &w) in self.values.iter().zip(volumes.iter()) {
            num.add(v * w);
            den.add(w);
        }
        if den.value() > 0.0 {
            num.value() / den.value()
        } else {
            0.0
        }
    }
}

impl Index<usize> for ScalarField {
    type Output = f64;

    #[inline]
    fn index(&self, cell: usize) -> &f64 {
        &self.values[cell]
    }
}

impl IndexMut<usize> for ScalarField {
    #[inline]
    fn index_mut(&mut self, cell: usize) -> &mut f64 {
        &mut self.values[cell]
    }
}

impl From<Vec<f64>> for ScalarField {
    fn from(values: Vec<f64>) -> Self {
        Self::from_vec(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_basic_algebra() {
        let mut a = ScalarField::uniform(3, 1.0);
        a.add_scaled(&[1.0, 2.0, 3.0], 2.0);
        assert_eq!(a.as_slice(), &[3.0, 5.0, 7.0]);
        a.scale(0.5);
        assert_eq!(a[2], 3.5);
        assert_eq!(a.max(), 3.5);
        assert_eq!(a.min(), 1.5);
        let b = a.mul(&ScalarField::from_vec(vec![2.0, 0.0, 1.0]));
        assert_eq!(b.as_slice(), &[3.0, 0.0, 3.5]);
    }

    #[test]
    fn test_parallel_path_matches_serial() {
        let n = 4 * PARALLEL_THRESHOLD;
        let mut a = ScalarField::from_fn(n, |c| c as f64);
        let b = ScalarField::uniform(n, 1.0);
        a.add_assign(b.as_slice());
        assert_eq!(a[0], 1.0);
        assert_eq!(a[n - 1], n as f64);
        a.map_inplace(|c, v| v - c as f64);
        assert!(a.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_weighted_average() {
        let f = ScalarField::from_vec(vec![1.0, 3.0]);
        let w = ScalarField::from_vec(vec![1.0, 3.0]);
        assert_relative_eq!(f.weighted_average(&w), 2.5);
        assert_eq!(f.weighted_average(&ScalarField::zeros(2)), 0.0);
    }

    #[test]
    fn test_assign_size_mismatch() {
        let mut a = ScalarField::zeros(2);
        assert!(a.assign(&ScalarField::zeros(3)).is_err());
        assert!(!a.any_nonzero());
    }
}
