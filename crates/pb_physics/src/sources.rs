// crates/pb_physics/src/sources.rs

//! 源项累加与模型源
//!
//! 每次装配时按组累加显式源 `Su_i` 与隐式系数 `Sp_i`（单位均为
//! 体积分数/s，方程中乘以所属相密度），以及分形形状模型需要的面积源。
//! 组分数方程的源项为 `ρ (Su_i - Sp_i f_i)`。
//!
//! 模型源是外部注入到特定组的源项：
//!
//! | 类型名 | 作用 |
//! |--------|------|
//! | `uniformGrowth` | 某相以给定相对体积增长率 G [1/s] 均匀长大，按漂移算子离散 |
//! | `groupInjection` | 向某组注入体积速率 [1/s]，质量取自连续相 |

use pb_config::ModelEntry;
use pb_foundation::{PbError, PbResult};
use serde::Deserialize;

use crate::context::KernelContext;
use crate::expansion::add_drift;
use crate::field::ScalarField;
use crate::group::{SizeGroup, VelocityGroup};
use crate::system::MassTransferTable;

/// 模型源族名
pub const FAMILY: &str = "modelSource";

/// 逐组源项累加器
#[derive(Debug, Clone)]
pub struct SourceAccumulator {
    su: Vec<ScalarField>,
    sp: Vec<ScalarField>,
    kappa: Vec<ScalarField>,
}

impl SourceAccumulator {
    pub fn new(n_groups: usize, n_cells: usize) -> Self {
        Self {
            su: vec![ScalarField::zeros(n_cells); n_groups],
            sp: vec![ScalarField::zeros(n_cells); n_groups],
            kappa: vec![ScalarField::zeros(n_cells); n_groups],
        }
    }

    /// 全部清零
    pub fn reset(&mut self) {
        for field in self.su.iter_mut().chain(&mut self.sp).chain(&mut self.kappa) {
            field.fill(0.0);
        }
    }

    /// 组数
    pub fn n_groups(&self) -> usize {
        self.su.len()
    }

    /// 显式源
    pub fn su(&self, i: usize) -> &ScalarField {
        &self.su[i]
    }

    /// 隐式系数
    pub fn sp(&self, i: usize) -> &ScalarField {
        &self.sp[i]
    }

    /// 面积源 Σ Su_birth (κ_birth - κ_i)
    pub fn kappa_sources(&self) -> &[ScalarField] {
        &self.kappa
    }

    /// Su_i += s · values
    pub fn add_su(&mut self, i: usize, values: &[f64], s: f64) {
        self.su[i].add_scaled(values, s);
    }

    /// Sp_i += s · values
    pub fn add_sp(&mut self, i: usize, values: &[f64], s: f64) {
        self.sp[i].add_scaled(values, s);
    }

    /// 面积源累加
    pub fn add_kappa(&mut self, i: usize, values: &[f64], s: f64) {
        self.kappa[i].add_scaled(values, s);
    }

    /// 组 i 当前的净源 Su_i - Sp_i f_i
    pub fn net(&self, i: usize, f: &ScalarField) -> ScalarField {
        let (su, sp) = (&self.su[i], &self.sp[i]);
        ScalarField::from_fn(f.len(), |c| su[c] - sp[c] * f[c])
    }
}

/// 模型源接口
pub trait ModelSource: Send + Sync {
    /// 模型类型名
    fn name(&self) -> &'static str;

    /// 构造后检查引用的相/组是否存在
    fn validate(&self, groups: &[SizeGroup], velocity_groups: &[VelocityGroup]) -> PbResult<()>;

    /// 把源项累加到 `acc`，跨相质量记入 `table`
    fn add_sup(
        &self,
        ctx: &KernelContext,
        acc: &mut SourceAccumulator,
        table: &mut MassTransferTable,
    ) -> PbResult<()>;
}

/// 均匀增长
#[derive(Debug, Clone, Deserialize)]
pub struct UniformGrowth {
    /// 增长的分散相
    pub phase: String,
    /// 相对体积增长率 [1/s]（负值为收缩）
    pub rate: f64,
}

impl UniformGrowth {
    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry) -> PbResult<Self> {
        Ok(entry.parse_coeffs()?)
    }
}

impl ModelSource for UniformGrowth {
    fn name(&self) -> &'static str {
        "uniformGrowth"
    }

    fn validate(&self, _groups: &[SizeGroup], velocity_groups: &[VelocityGroup]) -> PbResult<()> {
        if velocity_groups.iter().any(|vg| vg.phase == self.phase) {
            Ok(())
        } else {
            Err(PbError::unknown_phase(
                &self.phase,
                velocity_groups.iter().map(|vg| vg.phase.clone()).collect(),
            ))
        }
    }

    fn add_sup(
        &self,
        ctx: &KernelContext,
        acc: &mut SourceAccumulator,
        table: &mut MassTransferTable,
    ) -> PbResult<()> {
        let n = ctx.n_cells();
        let groups = ctx.groups();
        let (start, end) = phase_range(groups, &self.phase);
        let Some(first) = groups.get(start) else {
            return Ok(());
        };
        let phase = ctx.dispersed(first.phase_index);
        add_drift(
            groups,
            start..end,
            &ScalarField::uniform(n, self.rate),
            &phase.alpha,
            &phase.rho,
            acc,
            table,
        );
        Ok(())
    }
}

/// 组注入
#[derive(Debug, Clone, Deserialize)]
pub struct GroupInjection {
    /// 目标组（全局序号）
    pub group: usize,
    /// 注入的体积分数速率 [1/s]
    pub rate: f64,
}

impl GroupInjection {
    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry) -> PbResult<Self> {
        Ok(entry.parse_coeffs()?)
    }
}

impl ModelSource for GroupInjection {
    fn name(&self) -> &'static str {
        "groupInjection"
    }

    fn validate(&self, groups: &[SizeGroup], _velocity_groups: &[VelocityGroup]) -> PbResult<()> {
        if self.group < groups.len() {
            Ok(())
        } else {
            Err(PbError::invalid_config(
                "groupInjection.group",
                self.group.to_string(),
                format!("只有 {} 个组", groups.len()),
            ))
        }
    }

    fn add_sup(
        &self,
        ctx: &KernelContext,
        acc: &mut SourceAccumulator,
        table: &mut MassTransferTable,
    ) -> PbResult<()> {
        let n = ctx.n_cells();
        let group = ctx.group(self.group);
        let rate = ScalarField::uniform(n, self.rate);
        acc.add_su(self.group, rate.as_slice(), 1.0);

        let rho_d = &ctx.phase_of(self.group).rho;
        let mass = ScalarField::from_fn(n, |c| self.rate * rho_d[c]);
        table.add(&group.phase, &ctx.continuous().name, mass.as_slice(), 1.0);
        Ok(())
    }
}

/// 某相拥有的组区间（组按相连续排列）
fn phase_range(groups: &[SizeGroup], phase: &str) -> (usize, usize) {
    let start = groups.iter().position(|g| g.phase == phase).unwrap_or(groups.len());
    let end = groups[start..]
        .iter()
        .position(|g| g.phase != phase)
        .map_or(groups.len(), |p| start + p);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coalescence::test_support::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accumulator_net_and_reset() {
        let mut acc = SourceAccumulator::new(2, 2);
        acc.add_su(1, &[1.0, 2.0], 0.5);
        acc.add_sp(1, &[2.0, 2.0], 1.0);
        let net = acc.net(1, &ScalarField::from_vec(vec![0.25, 1.0]));
        assert_eq!(net.as_slice(), &[0.0, -1.0]);
        acc.reset();
        assert!(!acc.su(1).any_nonzero());
        assert!(!acc.sp(1).any_nonzero());
    }

    #[test]
    fn test_group_injection_books_mass_from_continuous_phase() {
        let system = air_water(0.1);
        let (groups, shapes) = groups();
        let ctx = KernelContext::new(&system, &groups, &shapes, "water", &phases()).unwrap();
        let src = GroupInjection { group: 2, rate: 0.01 };
        src.validate(&groups, &[]).unwrap();
        assert!(GroupInjection { group: 9, rate: 0.01 }.validate(&groups, &[]).unwrap_err().is_config_error());

        let mut acc = SourceAccumulator::new(5, 3);
        let mut table = MassTransferTable::new(3);
        src.add_sup(&ctx, &mut acc, &mut table).unwrap();
        assert_eq!(acc.su(2)[0], 0.01);
        assert_relative_eq!(table.net_into("air")[1], 0.01 * 1.2);
        assert_relative_eq!(table.net_into("water")[1], -0.01 * 1.2);
    }

    #[test]
    fn test_uniform_growth_moves_volume_upwards() {
        let system = air_water(0.1);
        let (groups, shapes) = groups();
        let ctx = KernelContext::new(&system, &groups, &shapes, "water", &phases()).unwrap();
        let src = UniformGrowth::from_entry(
            &ModelEntry::new("uniformGrowth").with("phase", "air").with("rate", 0.5),
        )
        .unwrap();

        let mut acc = SourceAccumulator::new(5, 3);
        let mut table = MassTransferTable::new(3);
        src.add_sup(&ctx, &mut acc, &mut table).unwrap();

        // 相内净源为零
        let total: f64 = (0..5).map(|i| acc.net(i, &groups[i].f)[0]).sum();
        assert!(total.abs() < 1e-12);
        assert!(acc.net(0, &groups[0].f)[0] < 0.0);
        assert!(acc.net(4, &groups[4].f)[0] > 0.0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_phase_range() {
        let (groups, _) = groups();
        assert_eq!(phase_range(&groups, "air"), (0, 5));
        assert_eq!(phase_range(&groups, "oil"), (5, 5));
    }
}
