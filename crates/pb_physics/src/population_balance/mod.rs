// crates/pb_physics/src/population_balance/mod.rs

//! 群体平衡模型
//!
//! 外层多相流求解器每次外迭代调用一次 [`PopulationBalanceModel::solve`]，
//! 时间步末调用 [`PopulationBalanceModel::correct`]。
//!
//! # 速率表状态
//!
//! ```text
//! Idle ──(首次 solve / 计数达到 sourceUpdateInterval)──▶ Stale ──refresh──▶ Fresh
//! ```
//!
//! 刷新时清空核函数缓存，调用全部子模型的 `precompute`，对候选组对
//! 重新计算速率场并剔除在所有单元均为零的组对。刷新完成之前不会装配
//! 任何出生/死亡项。
//!
//! # 求解流程
//!
//! 1. `solveOnFinalIterOnly` 时只在最后一次外迭代求解
//! 2. 按需刷新速率表
//! 3. 至多 `nCorr` 次校正（残差低于 `tolerance` 提前结束）：
//!    装配聚并、破碎、二元破碎、膨胀与模型源项，写质量传递表，
//!    逐组交给 [`GroupFractionSolver`] 积分
//! 4. 用本次的面积源更新分形形状

mod assembly;

use glam::DVec3;
use pb_config::{PopulationBalanceConfig, SolverDict};
use pb_foundation::float::{safe_div, KahanSum};
use pb_foundation::{PbError, PbResult};
use std::path::{Path, PathBuf};

use crate::allocation::AllocationEngine;
use crate::binary_breakup::BinaryBreakupModel;
use crate::breakup::{nik_table, BreakupModel};
use crate::cache::KernelCache;
use crate::coalescence::CoalescenceModel;
use crate::context::KernelContext;
use crate::expansion::add_expansion;
use crate::field::ScalarField;
use crate::group::{build_groups, SizeGroup, VelocityGroup};
use crate::io::{read_group_fields, write_group_fields};
use crate::registry::ModelRegistry;
use crate::shape::{build_shape, ShapeModel};
use crate::sources::{ModelSource, SourceAccumulator};
use crate::system::{FluidSystem, MassTransferTable};
use crate::transport::{GroupEquation, GroupFractionSolver};

/// 组分数之和允许的偏差
const SUM_TOLERANCE: f64 = 1e-4;

/// 速率表状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateState {
    /// 尚未计算
    Idle,
    /// 需要刷新
    Stale,
    /// 已刷新
    Fresh,
}

/// 一次 solve 的统计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveStats {
    /// 本次是否刷新了速率表
    pub refreshed: bool,
    /// 执行的校正次数
    pub correctors: usize,
    /// 最后一次校正的最大残差
    pub residual: f64,
    /// 因 solveOnFinalIterOnly 跳过
    pub skipped: bool,
}

/// 某个破碎模型在第 k 组的速率
#[derive(Debug, Clone)]
struct BreakupRate {
    group: usize,
    rate: ScalarField,
}

/// 群体平衡模型
pub struct PopulationBalanceModel {
    name: String,
    continuous_phase: String,
    phase_names: Vec<String>,
    solver_dict: SolverDict,

    groups: Vec<SizeGroup>,
    velocity_groups: Vec<VelocityGroup>,
    shapes: Vec<Box<dyn ShapeModel>>,
    allocation: AllocationEngine,

    coalescence_models: Vec<Box<dyn CoalescenceModel>>,
    breakup_models: Vec<Box<dyn BreakupModel>>,
    binary_breakup_models: Vec<Box<dyn BinaryBreakupModel>>,
    model_sources: Vec<Box<dyn ModelSource>>,
    /// nik_tables[m][k][i]
    nik_tables: Vec<Vec<Vec<f64>>>,

    cache: KernelCache,
    coalescence_candidates: Vec<(usize, usize)>,
    binary_breakup_candidates: Vec<(usize, usize)>,
    coalescence_pairs: Vec<(usize, usize)>,
    coalescence_rates: Vec<ScalarField>,
    breakup_rates: Vec<Vec<BreakupRate>>,
    binary_breakup_pairs: Vec<(usize, usize)>,
    binary_breakup_rates: Vec<ScalarField>,
    rate_state: RateState,
    update_counter: usize,
    time_index: Option<usize>,

    sources: SourceAccumulator,
    dmdtfs: MassTransferTable,
    expansion_dmdtfs: MassTransferTable,
    model_source_dmdtfs: MassTransferTable,

    d32: Vec<ScalarField>,
    dsm: ScalarField,
    alphas: ScalarField,
    u: Vec<DVec3>,
}

impl PopulationBalanceModel {
    /// 用内置注册中心构建
    pub fn new(config: &PopulationBalanceConfig, fluid: &dyn FluidSystem) -> PbResult<Self> {
        Self::with_registry(config, fluid, &ModelRegistry::with_defaults())
    }

    /// 用指定注册中心构建
    pub fn with_registry(
        config: &PopulationBalanceConfig,
        fluid: &dyn FluidSystem,
        registry: &ModelRegistry,
    ) -> PbResult<Self> {
        config.validate()?;
        let n = fluid.n_cells();

        fluid.phase(&config.continuous_phase)?;
        let phase_names: Vec<String> = config.phases.iter().map(|p| p.name.clone()).collect();
        for name in &phase_names {
            fluid.phase(name)?;
        }

        let (groups, velocity_groups) = build_groups(config, n)?;
        let shapes: Vec<Box<dyn ShapeModel>> = config
            .phases
            .iter()
            .zip(&velocity_groups)
            .map(|(phase, vg)| build_shape(&phase.shape_model, vg, &groups, n))
            .collect();
        let x: Vec<f64> = groups.iter().map(|g| g.x).collect();
        let allocation = AllocationEngine::new(&x)?;

        let coalescence_models = config
            .coalescence_models
            .iter()
            .map(|e| registry.coalescence(e))
            .collect::<PbResult<Vec<_>>>()?;
        let breakup_models = config
            .breakup_models
            .iter()
            .map(|e| registry.breakup(e))
            .collect::<PbResult<Vec<_>>>()?;
        let binary_breakup_models = config
            .binary_breakup_models
            .iter()
            .map(|e| registry.binary_breakup(e))
            .collect::<PbResult<Vec<_>>>()?;
        let model_sources = config
            .model_sources
            .iter()
            .map(|e| registry.model_source(e))
            .collect::<PbResult<Vec<_>>>()?;
        for source in &model_sources {
            source.validate(&groups, &velocity_groups)?;
        }

        let nik_tables = breakup_models
            .iter()
            .map(|m| nik_table(m.daughter(), &allocation))
            .collect();

        let n_groups = groups.len();
        let coalescence_candidates = if n_groups > 1 && !coalescence_models.is_empty() {
            (0..n_groups).flat_map(|i| (0..=i).map(move |j| (i, j))).collect()
        } else {
            Vec::new()
        };
        // 碎片类宽度为 0 的组对（碎片大于母体一半）不参与
        let binary_breakup_candidates = if binary_breakup_models.is_empty() {
            Vec::new()
        } else {
            (0..n_groups)
                .flat_map(|j| (0..j).map(move |i| (i, j)))
                .filter(|&(i, j)| allocation.pair_delta(i, j) > 0.0)
                .collect()
        };

        log::info!(
            "群体平衡 '{}': {} 个组, {} 个分散相, 聚并 {:?}, 破碎 {:?}, 二元破碎 {:?}",
            config.name,
            n_groups,
            phase_names.len(),
            coalescence_models.iter().map(|m| m.name()).collect::<Vec<_>>(),
            breakup_models.iter().map(|m| m.name()).collect::<Vec<_>>(),
            binary_breakup_models.iter().map(|m| m.name()).collect::<Vec<_>>(),
        );

        let mut model = Self {
            name: config.name.clone(),
            continuous_phase: config.continuous_phase.clone(),
            solver_dict: config.solver_dict.clone(),
            d32: vec![ScalarField::zeros(n); phase_names.len()],
            phase_names,
            sources: SourceAccumulator::new(n_groups, n),
            groups,
            velocity_groups,
            shapes,
            allocation,
            coalescence_models,
            breakup_models,
            binary_breakup_models,
            model_sources,
            nik_tables,
            cache: KernelCache::new(),
            coalescence_candidates,
            binary_breakup_candidates,
            coalescence_pairs: Vec::new(),
            coalescence_rates: Vec::new(),
            breakup_rates: Vec::new(),
            binary_breakup_pairs: Vec::new(),
            binary_breakup_rates: Vec::new(),
            rate_state: RateState::Idle,
            update_counter: 0,
            time_index: None,
            dmdtfs: MassTransferTable::new(n),
            expansion_dmdtfs: MassTransferTable::new(n),
            model_source_dmdtfs: MassTransferTable::new(n),
            dsm: ScalarField::zeros(n),
            alphas: ScalarField::zeros(n),
            u: vec![DVec3::ZERO; n],
        };
        model.update_derived(fluid)?;
        Ok(model)
    }

    // ------------------------------------------------------------------
    // 访问器
    // ------------------------------------------------------------------

    /// 名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 连续相名称
    pub fn continuous_phase(&self) -> &str {
        &self.continuous_phase
    }

    /// 分散相名称（按相序号）
    pub fn phase_names(&self) -> &[String] {
        &self.phase_names
    }

    /// 全部组
    pub fn groups(&self) -> &[SizeGroup] {
        &self.groups
    }

    /// 第 i 组
    pub fn group(&self, i: usize) -> &SizeGroup {
        &self.groups[i]
    }

    /// 组数
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// 速度组
    pub fn velocity_groups(&self) -> &[VelocityGroup] {
        &self.velocity_groups
    }

    /// 分配系数引擎
    pub fn allocation(&self) -> &AllocationEngine {
        &self.allocation
    }

    /// 某分散相的 Sauter 平均直径
    pub fn d32(&self, phase: &str) -> PbResult<&ScalarField> {
        self.phase_names
            .iter()
            .position(|p| p == phase)
            .map(|i| &self.d32[i])
            .ok_or_else(|| PbError::unknown_phase(phase, self.phase_names.clone()))
    }

    /// 全部分散相的 Sauter 平均直径
    pub fn dsm(&self) -> &ScalarField {
        &self.dsm
    }

    /// 分散相总体积分数
    pub fn alphas(&self) -> &ScalarField {
        &self.alphas
    }

    /// 分散相体积分数加权平均速度
    pub fn u(&self) -> &[DVec3] {
        &self.u
    }

    /// 聚并/破碎质量传递
    pub fn dmdtfs(&self) -> &MassTransferTable {
        &self.dmdtfs
    }

    /// 膨胀质量传递
    pub fn expansion_dmdtfs(&self) -> &MassTransferTable {
        &self.expansion_dmdtfs
    }

    /// 模型源质量传递
    pub fn model_source_dmdtfs(&self) -> &MassTransferTable {
        &self.model_source_dmdtfs
    }

    /// 三张质量传递表中流入某相的净质量速率
    pub fn net_mass_transfer_into(&self, phase: &str) -> ScalarField {
        let mut net = self.dmdtfs.net_into(phase);
        net.add_assign(self.expansion_dmdtfs.net_into(phase).as_slice());
        net.add_assign(self.model_source_dmdtfs.net_into(phase).as_slice());
        net
    }

    /// 有效聚并组对 (i, j)，j <= i
    pub fn coalescence_pairs(&self) -> &[(usize, usize)] {
        &self.coalescence_pairs
    }

    /// 与 [`Self::coalescence_pairs`] 对应的速率场
    pub fn coalescence_rates(&self) -> &[ScalarField] {
        &self.coalescence_rates
    }

    /// 有效二元破碎组对 (i, j)，i < j
    pub fn binary_breakup_pairs(&self) -> &[(usize, usize)] {
        &self.binary_breakup_pairs
    }

    /// 与 [`Self::binary_breakup_pairs`] 对应的速率场
    pub fn binary_breakup_rates(&self) -> &[ScalarField] {
        &self.binary_breakup_rates
    }

    /// 第 m 个破碎模型有速率的母组
    pub fn breakup_groups(&self, m: usize) -> Vec<usize> {
        self.breakup_rates
            .get(m)
            .map(|rates| rates.iter().map(|r| r.group).collect())
            .unwrap_or_default()
    }

    /// 第 m 个破碎模型的 nik 表
    pub fn nik_table(&self, m: usize) -> Option<&[Vec<f64>]> {
        self.nik_tables.get(m).map(|t| t.as_slice())
    }

    /// 最近一次装配的源项
    pub fn sources(&self) -> &SourceAccumulator {
        &self.sources
    }

    /// 速率表状态
    pub fn rate_state(&self) -> RateState {
        self.rate_state
    }

    /// 某分散相的形状模型
    pub fn shape(&self, phase_index: usize) -> &dyn ShapeModel {
        self.shapes[phase_index].as_ref()
    }

    // ------------------------------------------------------------------
    // 速率表
    // ------------------------------------------------------------------

    /// 重新计算全部速率表
    pub fn refresh_rates(&mut self, fluid: &dyn FluidSystem) -> PbResult<()> {
        self.rate_state = RateState::Stale;
        self.cache.clear();
        let n = fluid.n_cells();

        let ctx = KernelContext::new(
            fluid,
            &self.groups,
            &self.shapes,
            &self.continuous_phase,
            &self.phase_names,
        )?;
        for m in &self.coalescence_models {
            m.precompute(&ctx, &mut self.cache)?;
        }
        for m in &self.breakup_models {
            m.precompute(&ctx, &mut self.cache)?;
        }
        for m in &self.binary_breakup_models {
            m.precompute(&ctx, &mut self.cache)?;
        }

        self.coalescence_pairs.clear();
        self.coalescence_rates.clear();
        for &(i, j) in &self.coalescence_candidates {
            let mut rate = ScalarField::zeros(n);
            for m in &self.coalescence_models {
                m.add_to_coalescence_rate(&mut rate, i, j, &ctx, &self.cache)?;
            }
            if rate.any_nonzero() {
                self.coalescence_pairs.push((i, j));
                self.coalescence_rates.push(rate);
            }
        }

        self.breakup_rates.clear();
        for m in &self.breakup_models {
            let mut rates = Vec::new();
            for k in 1..self.groups.len() {
                let mut rate = ScalarField::zeros(n);
                m.add_to_breakup_rate(&mut rate, k, &ctx, &self.cache)?;
                if rate.any_nonzero() {
                    rates.push(BreakupRate { group: k, rate });
                }
            }
            self.breakup_rates.push(rates);
        }

        self.binary_breakup_pairs.clear();
        self.binary_breakup_rates.clear();
        for &(i, j) in &self.binary_breakup_candidates {
            let mut rate = ScalarField::zeros(n);
            for m in &self.binary_breakup_models {
                m.add_to_binary_breakup_rate(&mut rate, i, j, &ctx, &self.cache)?;
            }
            if rate.any_nonzero() {
                self.binary_breakup_pairs.push((i, j));
                self.binary_breakup_rates.push(rate);
            }
        }

        log::debug!(
            "'{}' 刷新速率表: 聚并对 {}/{}, 破碎组 {}, 二元破碎对 {}/{}, 缓存条目 {}",
            self.name,
            self.coalescence_pairs.len(),
            self.coalescence_candidates.len(),
            self.breakup_rates.iter().map(Vec::len).sum::<usize>(),
            self.binary_breakup_pairs.len(),
            self.binary_breakup_candidates.len(),
            self.cache.len()
        );
        self.rate_state = RateState::Fresh;
        Ok(())
    }

    // ------------------------------------------------------------------
    // 源项装配
    // ------------------------------------------------------------------

    /// 用当前组分数与速率表装配全部源项
    pub fn assemble_sources(&mut self, fluid: &dyn FluidSystem) -> PbResult<()> {
        self.sources.reset();
        self.dmdtfs.reset();
        self.expansion_dmdtfs.reset();
        self.model_source_dmdtfs.reset();

        let ctx = KernelContext::new(
            fluid,
            &self.groups,
            &self.shapes,
            &self.continuous_phase,
            &self.phase_names,
        )?;

        for (&(i, j), rate) in self.coalescence_pairs.iter().zip(&self.coalescence_rates) {
            assembly::add_coalescence(
                &ctx,
                &self.allocation,
                i,
                j,
                rate,
                &mut self.sources,
                &mut self.dmdtfs,
            );
        }

        for (rates, nik) in self.breakup_rates.iter().zip(&self.nik_tables) {
            for BreakupRate { group, rate } in rates {
                assembly::add_breakup(&ctx, *group, rate, &nik[*group], &mut self.sources, &mut self.dmdtfs);
            }
        }

        for (&(i, j), rate) in self.binary_breakup_pairs.iter().zip(&self.binary_breakup_rates) {
            assembly::add_binary_breakup(
                &ctx,
                &self.allocation,
                i,
                j,
                rate,
                &mut self.sources,
                &mut self.dmdtfs,
            );
        }

        add_expansion(&ctx, &self.velocity_groups, &mut self.sources, &mut self.expansion_dmdtfs)?;

        for source in &self.model_sources {
            source.add_sup(&ctx, &mut self.sources, &mut self.model_source_dmdtfs)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 求解
    // ------------------------------------------------------------------

    /// 推进组分数方程一个外迭代
    pub fn solve(
        &mut self,
        fluid: &dyn FluidSystem,
        integrator: &dyn GroupFractionSolver,
    ) -> PbResult<SolveStats> {
        if self.solver_dict.solve_on_final_iter_only && !fluid.final_iteration() {
            return Ok(SolveStats {
                refreshed: false,
                correctors: 0,
                residual: 0.0,
                skipped: true,
            });
        }

        let time_index = fluid.time_index();
        if self.time_index != Some(time_index) {
            for g in &mut self.groups {
                g.f0 = g.f.clone();
            }
            for shape in &mut self.shapes {
                shape.store_old_time();
            }
            self.time_index = Some(time_index);
        }

        let interval = self.solver_dict.source_update_interval.max(1);
        let refreshed = self.rate_state == RateState::Idle || self.update_counter % interval == 0;
        self.update_counter += 1;
        if refreshed {
            self.rate_state = RateState::Stale;
            self.refresh_rates(fluid)?;
        }

        let dt = fluid.delta_t();
        let mut residual = f64::INFINITY;
        let mut correctors = 0;
        while correctors < self.solver_dict.n_corr.max(1) && residual > self.solver_dict.tolerance {
            self.assemble_sources(fluid)?;
            residual = 0.0;
            for i in 0..self.groups.len() {
                let phase = fluid.phase(&self.groups[i].phase)?;
                let group = &mut self.groups[i];
                let equation = GroupEquation {
                    group: i,
                    alpha: &phase.alpha,
                    alpha0: &phase.alpha0,
                    rho: &phase.rho,
                    rho0: &phase.rho0,
                    dmdt: fluid.dmdt(&phase.name),
                    su: self.sources.su(i),
                    sp: self.sources.sp(i),
                    f0: &group.f0,
                    delta_t: dt,
                };
                residual = residual.max(integrator.solve(&equation, &mut group.f)?);
            }
            correctors += 1;
        }

        for (vg, shape) in self.velocity_groups.iter().zip(self.shapes.iter_mut()) {
            if shape.tracks_area() {
                let alpha = &fluid.phase(&vg.phase)?.alpha;
                shape.update_area(&self.groups, self.sources.kappa_sources(), alpha, dt);
            }
        }

        if let (Some(first), Some(last)) = (self.groups.first(), self.groups.last()) {
            let volumes = fluid.cell_volumes();
            let mean = |g: &SizeGroup| -> PbResult<f64> {
                let alpha = &fluid.phase(&g.phase)?.alpha;
                let af = ScalarField::from_fn(g.f.len(), |c| alpha[c] * g.f[c]);
                Ok(af.weighted_average(volumes))
            };
            log::info!(
                "{}: {} 平均 = {:.6e}, {} 平均 = {:.6e}",
                self.name,
                first.field_name(),
                mean(first)?,
                last.field_name(),
                mean(last)?
            );
        }

        Ok(SolveStats {
            refreshed,
            correctors,
            residual,
            skipped: false,
        })
    }

    // ------------------------------------------------------------------
    // 校正与派生量
    // ------------------------------------------------------------------

    /// 时间步末校正：组分数归一、形状松弛、派生量
    pub fn correct(&mut self, fluid: &dyn FluidSystem) -> PbResult<()> {
        let n = fluid.n_cells();
        let mut warned = false;
        for vg in &self.velocity_groups {
            let mut sums = ScalarField::zeros(n);
            for g in &self.groups[vg.groups.clone()] {
                sums.add_assign(g.f.as_slice());
            }
            let off: Vec<usize> = (0..n)
                .filter(|&c| (sums[c] - 1.0).abs() > SUM_TOLERANCE)
                .collect();
            if off.is_empty() {
                continue;
            }
            if !warned {
                let worst = off.iter().map(|&c| (sums[c] - 1.0).abs()).fold(0.0, f64::max);
                log::warn!(
                    "{}: 相 '{}' 的组分数之和在 {} 个单元偏离 1（最大偏差 {:.3e}），已归一化",
                    self.name,
                    vg.phase,
                    off.len(),
                    worst
                );
                warned = true;
            }
            for g in &mut self.groups[vg.groups.clone()] {
                g.f.map_inplace(|c, f| {
                    let s = sums[c];
                    if (s - 1.0).abs() > SUM_TOLERANCE && s > 0.0 {
                        f / s
                    } else {
                        f
                    }
                });
            }
        }

        let dt = fluid.delta_t();
        for shape in &mut self.shapes {
            shape.correct(&self.groups, dt);
        }
        self.update_derived(fluid)
    }

    /// 重算 d32、alphas、dsm 与平均速度
    fn update_derived(&mut self, fluid: &dyn FluidSystem) -> PbResult<()> {
        let n = fluid.n_cells();
        let mut alphas = ScalarField::zeros(n);
        let mut num_all = ScalarField::zeros(n);
        let mut den_all = ScalarField::zeros(n);
        let mut momentum = vec![DVec3::ZERO; n];

        for vg in &self.velocity_groups {
            let phase = fluid.phase(&vg.phase)?;
            let shape = self.shapes[vg.phase_index].as_ref();
            let mut num = ScalarField::zeros(n);
            let mut den = ScalarField::zeros(n);
            for g in &self.groups[vg.groups.clone()] {
                num.add_assign(g.f.as_slice());
                let area = ScalarField::from_fn(n, |c| g.f[c] * shape.a(g, c) / g.x);
                den.add_assign(area.as_slice());
            }
            let fallback = self.groups[vg.groups.start].d_sph;
            self.d32[vg.phase_index] =
                ScalarField::from_fn(n, |c| safe_div(6.0 * num[c], den[c], fallback));

            num_all.add_assign(num.mul(&phase.alpha).as_slice());
            den_all.add_assign(den.mul(&phase.alpha).as_slice());
            alphas.add_assign(phase.alpha.as_slice());
            for (m, (a, u)) in momentum.iter_mut().zip(phase.alpha.iter().zip(&phase.u)) {
                *m += *a * *u;
            }
        }

        let fallback = self.groups.first().map_or(0.0, |g| g.d_sph);
        self.dsm = ScalarField::from_fn(n, |c| safe_div(6.0 * num_all[c], den_all[c], fallback));
        self.u = momentum
            .iter()
            .zip(alphas.iter())
            .map(|(m, &a)| if a > 0.0 { *m / a } else { DVec3::ZERO })
            .collect();
        self.alphas = alphas;
        Ok(())
    }

    /// 全部组 α f 的体积积分（用于守恒诊断）
    pub fn dispersed_volume(&self, fluid: &dyn FluidSystem) -> PbResult<f64> {
        let volumes = fluid.cell_volumes();
        let mut sum = KahanSum::new();
        for g in &self.groups {
            let alpha = &fluid.phase(&g.phase)?.alpha;
            for c in 0..g.f.len() {
                sum.add(alpha[c] * g.f[c] * volumes[c]);
            }
        }
        Ok(sum.value())
    }

    // ------------------------------------------------------------------
    // 持久化
    // ------------------------------------------------------------------

    /// 写出全部组分数场
    pub fn write_fields(&self, dir: &Path, time: f64) -> PbResult<Vec<PathBuf>> {
        write_group_fields(&self.groups, dir, time)
    }

    /// 读入全部组分数场，返回记录时间
    pub fn read_fields(&mut self, dir: &Path, fluid: &dyn FluidSystem) -> PbResult<f64> {
        let time = read_group_fields(&mut self.groups, dir)?;
        self.update_derived(fluid)?;
        Ok(time)
    }
}
