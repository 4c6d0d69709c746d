// crates/pb_physics/src/quadrature.rs

//! Gauss-Legendre 求积
//!
//! 节点由 Legendre 多项式的牛顿迭代求得，用于子粒径分布的 `nik`
//! 积分与 Luo-Svendsen 涡尺度积分。

use std::f64::consts::PI;

/// Gauss-Legendre 规则（[-1, 1] 上的节点与权重）
#[derive(Debug, Clone)]
pub struct GaussLegendre {
    points: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussLegendre {
    /// n 点规则（n >= 1）
    pub fn new(n: usize) -> Self {
        let n = n.max(1);
        let mut points = vec![0.0; n];
        let mut weights = vec![0.0; n];
        let m = (n + 1) / 2;

        for i in 0..m {
            // Chebyshev 初值
            let mut z = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
            let mut dp = 0.0;
            for _ in 0..100 {
                let (p, d) = legendre_with_derivative(n, z);
                dp = d;
                let dz = p / d;
                z -= dz;
                if dz.abs() < 1e-15 {
                    break;
                }
            }
            let (_, d) = legendre_with_derivative(n, z);
            if d != 0.0 {
                dp = d;
            }
            let w = 2.0 / ((1.0 - z * z) * dp * dp);
            points[i] = -z;
            points[n - 1 - i] = z;
            weights[i] = w;
            weights[n - 1 - i] = w;
        }

        Self { points, weights }
    }

    /// 点数
    pub fn order(&self) -> usize {
        self.points.len()
    }

    /// 节点
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// 权重
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// ∫_a^b f(x) dx
    pub fn integrate<F: Fn(f64) -> f64>(&self, a: f64, b: f64, f: F) -> f64 {
        if b <= a {
            return 0.0;
        }
        let half = 0.5 * (b - a);
        let mid = 0.5 * (b + a);
        half * self
            .points
            .iter()
            .zip(&self.weights)
            .map(|(&t, &w)| w * f(mid + half * t))
            .sum::<f64>()
    }
}

impl Default for GaussLegendre {
    fn default() -> Self {
        Self::new(16)
    }
}

/// P_n(z) 与 P_n'(z)
fn legendre_with_derivative(n: usize, z: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = z;
    if n == 0 {
        return (1.0, 0.0);
    }
    for k in 2..=n {
        let kf = k as f64;
        let p2 = ((2.0 * kf - 1.0) * z * p1 - (kf - 1.0) * p0) / kf;
        p0 = p1;
        p1 = p2;
    }
    let d = n as f64 * (z * p1 - p0) / (z * z - 1.0);
    (p1, d)
}
