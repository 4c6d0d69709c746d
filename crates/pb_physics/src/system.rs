// crates/pb_physics/src/system.rs

//! 相系统接口
//!
//! 群体平衡只通过 [`FluidSystem`] 访问外部多相流求解器：相的体积分数、
//! 密度、粘度、速度，连续相湍流量，表面张力，重力与时间步长。
//! [`PhaseSystem`] 是内存中的具体实现，供命令行 0 维算例与测试使用。
//!
//! 相对之间的质量传递率保存在 [`MassTransferTable`] 中，以规范化（排序）
//! 的相对名称为键，按需创建条目。

use glam::DVec3;
use pb_config::CaseConfig;
use pb_foundation::{PbError, PbResult};
use std::collections::{BTreeMap, HashMap};

use crate::field::ScalarField;

// ============================================================================
// 相场
// ============================================================================

/// 单相逐单元场
#[derive(Debug, Clone)]
pub struct PhaseFields {
    /// 相名称
    pub name: String,
    /// 体积分数
    pub alpha: ScalarField,
    /// 上一时间层体积分数
    pub alpha0: ScalarField,
    /// 密度 [kg/m³]
    pub rho: ScalarField,
    /// 上一时间层密度 [kg/m³]
    pub rho0: ScalarField,
    /// 动力粘度 [Pa·s]
    pub mu: ScalarField,
    /// 速度 [m/s]
    pub u: Vec<DVec3>,
    /// 温度 [K]
    pub temperature: Option<ScalarField>,
    /// 残余体积分数
    pub residual_alpha: f64,
}

impl PhaseFields {
    /// 均匀初始化的相
    pub fn uniform(name: impl Into<String>, n_cells: usize, alpha: f64, rho: f64, mu: f64) -> Self {
        Self {
            name: name.into(),
            alpha: ScalarField::uniform(n_cells, alpha),
            alpha0: ScalarField::uniform(n_cells, alpha),
            rho: ScalarField::uniform(n_cells, rho),
            rho0: ScalarField::uniform(n_cells, rho),
            mu: ScalarField::uniform(n_cells, mu),
            u: vec![DVec3::ZERO; n_cells],
            temperature: None,
            residual_alpha: 1e-6,
        }
    }

    /// 设置均匀速度
    pub fn with_velocity(mut self, u: DVec3) -> Self {
        self.u.iter_mut().for_each(|v| *v = u);
        self
    }

    /// 设置均匀温度
    pub fn with_temperature(mut self, t: f64) -> Self {
        self.temperature = Some(ScalarField::uniform(self.alpha.len(), t));
        self
    }

    /// 运动粘度 ν = μ/ρ
    #[inline]
    pub fn nu(&self, cell: usize) -> f64 {
        self.mu[cell] / self.rho[cell]
    }
}

/// 湍流场
#[derive(Debug, Clone)]
pub struct TurbulenceFields {
    /// 湍流耗散率 ε [m²/s³]
    pub epsilon: ScalarField,
    /// 湍动能 k [m²/s²]
    pub k: ScalarField,
    /// 层流剪切率 [1/s]
    pub shear_rate: Option<ScalarField>,
}

impl TurbulenceFields {
    /// 均匀湍流场
    pub fn uniform(n_cells: usize, epsilon: f64, k: f64) -> Self {
        Self {
            epsilon: ScalarField::uniform(n_cells, epsilon),
            k: ScalarField::uniform(n_cells, k),
            shear_rate: None,
        }
    }
}

// ============================================================================
// FluidSystem 接口
// ============================================================================

/// 外部多相流求解器提供的服务
pub trait FluidSystem: Send + Sync {
    /// 单元数
    fn n_cells(&self) -> usize;

    /// 单元体积 [m³]
    fn cell_volumes(&self) -> &ScalarField;

    /// 按名称查找相
    fn phase(&self, name: &str) -> PbResult<&PhaseFields>;

    /// 全部相名称
    fn phase_names(&self) -> Vec<&str>;

    /// 某相的湍流场
    fn turbulence(&self, phase: &str) -> Option<&TurbulenceFields>;

    /// 相对表面张力 [N/m]
    fn sigma(&self, a: &str, b: &str) -> f64;

    /// 重力加速度
    fn gravity(&self) -> DVec3;

    /// 时间步长 [s]
    fn delta_t(&self) -> f64;

    /// 时间步序号（每推进一步加一）
    fn time_index(&self) -> usize;

    /// 是否为本时间步最后一次外迭代
    fn final_iteration(&self) -> bool;

    /// 某相的相变净质量源 [kg/m³/s]
    fn dmdt(&self, phase: &str) -> Option<&ScalarField>;
}

// ============================================================================
// 相对与质量传递表
// ============================================================================

/// 规范化的无序相对（名称排序）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhasePairKey {
    first: String,
    second: String,
}

impl PhasePairKey {
    /// 构造规范化相对
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                first: a.to_string(),
                second: b.to_string(),
            }
        } else {
            Self {
                first: b.to_string(),
                second: a.to_string(),
            }
        }
    }

    /// 第一相
    pub fn first(&self) -> &str {
        &self.first
    }

    /// 第二相
    pub fn second(&self) -> &str {
        &self.second
    }

    /// 是否包含某相
    pub fn contains(&self, phase: &str) -> bool {
        self.first == phase || self.second == phase
    }

    /// 流入 `into` 的符号：`into` 为第一相时为 +1
    pub fn sign_into(&self, into: &str) -> f64 {
        if self.first == into {
            1.0
        } else {
            -1.0
        }
    }
}

impl std::fmt::Display for PhasePairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// 相对质量传递表
///
/// 存储值为从第二相流入第一相的质量速率 [kg/m³/s]。
#[derive(Debug, Clone)]
pub struct MassTransferTable {
    n_cells: usize,
    entries: BTreeMap<PhasePairKey, ScalarField>,
}

impl MassTransferTable {
    /// 空表
    pub fn new(n_cells: usize) -> Self {
        Self {
            n_cells,
            entries: BTreeMap::new(),
        }
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按相对取值（不存在返回 None）
    pub fn get(&self, a: &str, b: &str) -> Option<&ScalarField> {
        self.entries.get(&PhasePairKey::new(a, b))
    }

    /// 将 `values * scale` 作为从 `from` 流入 `into` 的质量速率累加
    pub fn add(&mut self, into: &str, from: &str, values: &[f64], scale: f64) {
        if into == from {
            return;
        }
        let key = PhasePairKey::new(into, from);
        let sign = key.sign_into(into);
        let n = self.n_cells;
        self.entries
            .entry(key)
            .or_insert_with(|| ScalarField::zeros(n))
            .add_scaled(values, sign * scale);
    }

    /// 把所有已有条目清零（条目保留）
    pub fn reset(&mut self) {
        for field in self.entries.values_mut() {
            field.fill(0.0);
        }
    }

    /// 某相的净流入质量速率
    pub fn net_into(&self, phase: &str) -> ScalarField {
        let mut net = ScalarField::zeros(self.n_cells);
        for (key, field) in &self.entries {
            if key.contains(phase) {
                net.add_scaled(field.as_slice(), key.sign_into(phase));
            }
        }
        net
    }

    /// 遍历条目
    pub fn iter(&self) -> impl Iterator<Item = (&PhasePairKey, &ScalarField)> {
        self.entries.iter()
    }
}

// ============================================================================
// 内存相系统
// ============================================================================

/// 内存相系统
#[derive(Debug, Clone)]
pub struct PhaseSystem {
    n_cells: usize,
    cell_volumes: ScalarField,
    phases: Vec<PhaseFields>,
    turbulence: HashMap<String, TurbulenceFields>,
    sigma: HashMap<PhasePairKey, f64>,
    default_sigma: f64,
    gravity: DVec3,
    delta_t: f64,
    time: f64,
    time_index: usize,
    final_iteration: bool,
    dmdt: HashMap<String, ScalarField>,
    rho_rate: HashMap<String, f64>,
}

impl PhaseSystem {
    /// 创建空相系统
    pub fn new(n_cells: usize, cell_volume: f64) -> Self {
        Self {
            n_cells,
            cell_volumes: ScalarField::uniform(n_cells, cell_volume),
            phases: Vec::new(),
            turbulence: HashMap::new(),
            sigma: HashMap::new(),
            default_sigma: 0.07,
            gravity: DVec3::new(0.0, -9.81, 0.0),
            delta_t: 1e-3,
            time: 0.0,
            time_index: 0,
            final_iteration: true,
            dmdt: HashMap::new(),
            rho_rate: HashMap::new(),
        }
    }

    /// 由 0 维算例构建
    pub fn from_case(case: &CaseConfig) -> PbResult<Self> {
        let n = case.n_cells;
        let mut system = Self::new(n, case.cell_volume);
        system.gravity = DVec3::from_array(case.gravity);
        system.delta_t = case.delta_t;
        system.default_sigma = case.sigma;

        let dispersed_alpha = case.dispersed_alpha();
        let cont = &case.continuous_phase;
        system.add_phase(
            PhaseFields::uniform(&cont.name, n, 1.0 - dispersed_alpha, cont.rho, cont.mu)
                .with_velocity(DVec3::from_array(cont.velocity))
                .with_temperature(case.temperature),
        )?;

        for p in &case.dispersed_phases {
            let mut fields = PhaseFields::uniform(&p.name, n, p.alpha, p.rho, p.mu)
                .with_velocity(DVec3::from_array(p.velocity))
                .with_temperature(case.temperature);
            fields.residual_alpha = p.residual_alpha;
            system.add_phase(fields)?;
            if p.dmdt != 0.0 {
                system.set_dmdt(&p.name, ScalarField::uniform(n, p.dmdt));
            }
            if p.rho_rate != 0.0 {
                system.rho_rate.insert(p.name.clone(), p.rho_rate);
            }
        }

        let mut turb = TurbulenceFields::uniform(n, case.turbulence.epsilon, case.turbulence.k);
        turb.shear_rate = case.turbulence.shear_rate.map(|g| ScalarField::uniform(n, g));
        system.set_turbulence(&cont.name, turb);

        Ok(system)
    }

    /// 添加相
    pub fn add_phase(&mut self, phase: PhaseFields) -> PbResult<()> {
        PbError::check_size(&format!("alpha.{}", phase.name), self.n_cells, phase.alpha.len())?;
        if self.phases.iter().any(|p| p.name == phase.name) {
            return Err(PbError::invalid_input(format!("相 '{}' 重复", phase.name)));
        }
        self.phases.push(phase);
        Ok(())
    }

    /// 可变访问某相
    pub fn phase_mut(&mut self, name: &str) -> PbResult<&mut PhaseFields> {
        let known: Vec<String> = self.phases.iter().map(|p| p.name.clone()).collect();
        self.phases
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| PbError::unknown_phase(name, known))
    }

    /// 设置湍流场
    pub fn set_turbulence(&mut self, phase: &str, fields: TurbulenceFields) {
        self.turbulence.insert(phase.to_string(), fields);
    }

    /// 设置相对表面张力
    pub fn set_sigma(&mut self, a: &str, b: &str, sigma: f64) {
        self.sigma.insert(PhasePairKey::new(a, b), sigma);
    }

    /// 设置重力
    pub fn set_gravity(&mut self, g: DVec3) {
        self.gravity = g;
    }

    /// 设置时间步长
    pub fn set_delta_t(&mut self, dt: f64) {
        self.delta_t = dt;
    }

    /// 设置外迭代标志
    pub fn set_final_iteration(&mut self, final_iteration: bool) {
        self.final_iteration = final_iteration;
    }

    /// 设置相变质量源
    pub fn set_dmdt(&mut self, phase: &str, dmdt: ScalarField) {
        self.dmdt.insert(phase.to_string(), dmdt);
    }

    /// 当前时间
    pub fn time(&self) -> f64 {
        self.time
    }

    /// 推进到下一时间步：保存旧时间层并按给定速率更新密度
    pub fn advance_time(&mut self) {
        self.time += self.delta_t;
        self.time_index += 1;
        let dt = self.delta_t;
        for phase in &mut self.phases {
            phase.alpha0 = phase.alpha.clone();
            phase.rho0 = phase.rho.clone();
            if let Some(rate) = self.rho_rate.get(&phase.name) {
                phase.rho.map_inplace(|_, r| (r + rate * dt).max(f64::MIN_POSITIVE));
            }
        }
    }

    /// 由质量守恒更新分散相体积分数，连续相取补
    ///
    /// α = (α0 ρ0 + Δt (dmdt + Σ传质)) / ρ
    pub fn update_dispersed_alpha(
        &mut self,
        continuous: &str,
        dispersed: &[&str],
        mass_sources: &HashMap<String, ScalarField>,
    ) -> PbResult<()> {
        let dt = self.delta_t;
        let n = self.n_cells;
        let mut total = ScalarField::zeros(n);
        for name in dispersed {
            let dmdt = self.dmdt.get(*name).cloned();
            let source = mass_sources.get(*name).cloned();
            let phase = self.phase_mut(name)?;
            let alpha0 = phase.alpha0.clone();
            let rho0 = phase.rho0.clone();
            let rho = phase.rho.clone();
            phase.alpha.map_inplace(|c, _| {
                let mut m = alpha0[c] * rho0[c];
                if let Some(d) = &dmdt {
                    m += dt * d[c];
                }
                if let Some(s) = &source {
                    m += dt * s[c];
                }
                (m / rho[c]).max(0.0)
            });
            total.add_assign(phase.alpha.as_slice());
        }
        let cont = self.phase_mut(continuous)?;
        cont.alpha.map_inplace(|c, _| 1.0 - total[c]);
        Ok(())
    }
}

impl FluidSystem for PhaseSystem {
    fn n_cells(&self) -> usize {
        self.n_cells
    }

    fn cell_volumes(&self) -> &ScalarField {
        &self.cell_volumes
    }

    fn phase(&self, name: &str) -> PbResult<&PhaseFields> {
        self.phases.iter().find(|p| p.name == name).ok_or_else(|| {
            PbError::unknown_phase(name, self.phases.iter().map(|p| p.name.clone()).collect())
        })
    }

    fn phase_names(&self) -> Vec<&str> {
        self.phases.iter().map(|p| p.name.as_str()).collect()
    }

    fn turbulence(&self, phase: &str) -> Option<&TurbulenceFields> {
        self.turbulence.get(phase)
    }

    fn sigma(&self, a: &str, b: &str) -> f64 {
        self.sigma
            .get(&PhasePairKey::new(a, b))
            .copied()
            .unwrap_or(self.default_sigma)
    }

    fn gravity(&self) -> DVec3 {
        self.gravity
    }

    fn delta_t(&self) -> f64 {
        self.delta_t
    }

    fn time_index(&self) -> usize {
        self.time_index
    }

    fn final_iteration(&self) -> bool {
        self.final_iteration
    }

    fn dmdt(&self, phase: &str) -> Option<&ScalarField> {
        self.dmdt.get(phase)
    }
}
