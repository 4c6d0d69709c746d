// crates/pb_physics/src/shape/fractal.rs

//! 分形聚集体形状模型
//!
//! 每组携带面积体积比场 κ_i（初值为球形 6/d_sph）：
//!
//! ```text
//! a = κ x
//! d = 6/κ · (κ³ x / (36 π α_c))^(1/D_f)
//! ```
//!
//! 出生粒子携带其来源的 κ（聚并：(a_j + a_k)/(x_j + x_k)，破碎：继承
//! 母组），与组内已有粒子按体积混合；死亡不改变 κ。烧结使 κ 以特征时间
//! τ 向球形值松弛。κ 不低于球形值。

use pb_config::SinteringConfig;
use pb_foundation::float::SMALL;
use std::f64::consts::PI;
use std::ops::Range;

use super::ShapeModel;
use crate::field::ScalarField;
use crate::group::SizeGroup;

/// 分形聚集体
#[derive(Debug, Clone)]
pub struct FractalShape {
    groups: Range<usize>,
    kappa: Vec<ScalarField>,
    /// 旧时间层 κ
    kappa0: Vec<ScalarField>,
    df: f64,
    alpha_c: f64,
    sintering: SinteringConfig,
}

impl FractalShape {
    /// 为组区间 `groups` 创建分形模型
    pub fn new(
        groups: Range<usize>,
        all_groups: &[SizeGroup],
        n_cells: usize,
        df: f64,
        alpha_c: f64,
        sintering: SinteringConfig,
    ) -> Self {
        let kappa: Vec<ScalarField> = all_groups[groups.clone()]
            .iter()
            .map(|g| ScalarField::uniform(n_cells, kappa_sphere(g)))
            .collect();
        Self {
            groups,
            kappa0: kappa.clone(),
            kappa,
            df,
            alpha_c,
            sintering,
        }
    }

    /// 第 i 组（全局序号）的 κ 场
    pub fn kappa_field(&self, i: usize) -> &ScalarField {
        &self.kappa[i - self.groups.start]
    }

    fn clip(&mut self, all_groups: &[SizeGroup]) {
        for i in self.groups.clone() {
            let k_sph = kappa_sphere(&all_groups[i]);
            self.kappa[i - self.groups.start].map_inplace(|_, k| k.max(k_sph));
        }
    }
}

/// 球形面积体积比 6/d
#[inline]
fn kappa_sphere(group: &SizeGroup) -> f64 {
    6.0 / group.d_sph
}

impl ShapeModel for FractalShape {
    fn name(&self) -> &'static str {
        "fractal"
    }

    fn d(&self, group: &SizeGroup, cell: usize) -> f64 {
        let k = self.kappa_field(group.index)[cell];
        6.0 / k * (k.powi(3) * group.x / (36.0 * PI * self.alpha_c)).powf(1.0 / self.df)
    }

    fn a(&self, group: &SizeGroup, cell: usize) -> f64 {
        self.kappa_field(group.index)[cell] * group.x
    }

    fn kappa(&self, group: &SizeGroup, cell: usize) -> f64 {
        self.kappa_field(group.index)[cell]
    }

    fn tracks_area(&self) -> bool {
        true
    }

    fn store_old_time(&mut self) {
        self.kappa0.clone_from(&self.kappa);
    }

    fn update_area(
        &mut self,
        groups: &[SizeGroup],
        kappa_sources: &[ScalarField],
        alpha: &ScalarField,
        dt: f64,
    ) {
        for i in self.groups.clone() {
            let f = &groups[i].f;
            let src = &kappa_sources[i];
            let k0 = &self.kappa0[i - self.groups.start];
            self.kappa[i - self.groups.start] =
                ScalarField::from_fn(f.len(), |c| k0[c] + dt * src[c] / (alpha[c] * f[c]).max(SMALL));
        }
        self.clip(groups);
    }

    fn correct(&mut self, groups: &[SizeGroup], dt: f64) {
        if let SinteringConfig::Constant { tau } = self.sintering {
            let decay = (-dt / tau).exp();
            for i in self.groups.clone() {
                let k_sph = kappa_sphere(&groups[i]);
                self.kappa[i - self.groups.start]
                    .map_inplace(|_, k| k_sph + (k - k_sph) * decay);
            }
        }
        self.clip(groups);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn groups() -> Vec<SizeGroup> {
        vec![
            SizeGroup::new(0, "soot", 0, 1e-8, ScalarField::uniform(1, 0.5)),
            SizeGroup::new(1, "soot", 0, 2e-8, ScalarField::uniform(1, 0.5)),
        ]
    }

    #[test]
    fn test_initial_state_is_spherical() {
        let g = groups();
        let shape = FractalShape::new(0..2, &g, 1, 1.8, 1.0, SinteringConfig::None);
        for grp in &g {
            assert_relative_eq!(shape.d(grp, 0), grp.d_sph, max_relative = 1e-12);
            assert_relative_eq!(shape.a(grp, 0), PI * grp.d_sph * grp.d_sph, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_area_source_raises_kappa() {
        let g = groups();
        let mut shape = FractalShape::new(0..2, &g, 1, 1.8, 1.0, SinteringConfig::None);
        let k0 = shape.kappa(&g[1], 0);
        let sources = vec![ScalarField::zeros(1), ScalarField::uniform(1, 0.1 * k0)];
        shape.update_area(&g, &sources, &ScalarField::uniform(1, 0.2), 0.5);
        // Δκ = dt·src/(α f) = 0.5·0.1κ0/0.1
        assert_relative_eq!(shape.kappa(&g[1], 0), 1.5 * k0, max_relative = 1e-12);
        // 非球形聚集体的碰撞直径更大
        assert!(shape.d(&g[1], 0) > g[1].d_sph);
    }

    #[test]
    fn test_repeated_update_within_step_starts_from_old_time() {
        let g = groups();
        let mut shape = FractalShape::new(0..2, &g, 1, 1.8, 1.0, SinteringConfig::None);
        let k0 = shape.kappa(&g[1], 0);
        let sources = vec![ScalarField::zeros(1), ScalarField::uniform(1, 0.1 * k0)];
        let alpha = ScalarField::uniform(1, 0.2);

        for _ in 0..3 {
            shape.update_area(&g, &sources, &alpha, 0.5);
        }
        assert_relative_eq!(shape.kappa(&g[1], 0), 1.5 * k0, max_relative = 1e-12);

        // 下一时间步从 1.5κ0 继续
        shape.store_old_time();
        shape.update_area(&g, &sources, &alpha, 0.5);
        assert_relative_eq!(shape.kappa(&g[1], 0), 2.0 * k0, max_relative = 1e-12);
    }

    #[test]
    fn test_sintering_relaxes_and_clips() {
        let g = groups();
        let mut shape = FractalShape::new(
            0..2,
            &g,
            1,
            1.8,
            1.0,
            SinteringConfig::Constant { tau: 1.0 },
        );
        let k_sph = shape.kappa(&g[0], 0);
        let sources = vec![ScalarField::uniform(1, -10.0 * k_sph), ScalarField::zeros(1)];
        shape.update_area(&g, &sources, &ScalarField::uniform(1, 1.0), 1.0);
        assert_eq!(shape.kappa(&g[0], 0), k_sph);

        let sources = vec![ScalarField::uniform(1, k_sph), ScalarField::zeros(1)];
        shape.update_area(&g, &sources, &ScalarField::uniform(1, 1.0), 0.5);
        let before = shape.kappa(&g[0], 0) - k_sph;
        shape.correct(&g, 1.0);
        let after = shape.kappa(&g[0], 0) - k_sph;
        assert_relative_eq!(after, before * (-1.0f64).exp(), max_relative = 1e-12);
    }
}
