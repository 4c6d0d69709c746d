// crates/pb_physics/src/context.rs

//! 核函数上下文
//!
//! 子模型计算速率时只读访问的状态：相系统、尺寸组、形状模型、连续相、
//! 连续相湍流场以及分散相总体积分数。每次速率表刷新与源项装配时新建。

use glam::DVec3;
use pb_foundation::{PbError, PbResult};

use crate::field::ScalarField;
use crate::group::SizeGroup;
use crate::shape::ShapeModel;
use crate::system::{FluidSystem, PhaseFields, TurbulenceFields};

/// 核函数上下文
pub struct KernelContext<'a> {
    fluid: &'a dyn FluidSystem,
    groups: &'a [SizeGroup],
    shapes: &'a [Box<dyn ShapeModel>],
    continuous: &'a PhaseFields,
    dispersed: Vec<&'a PhaseFields>,
    sigmas: Vec<f64>,
    alphas: ScalarField,
}

impl<'a> KernelContext<'a> {
    /// 创建上下文
    ///
    /// `phases` 为按相序号排列的分散相名称。
    pub fn new(
        fluid: &'a dyn FluidSystem,
        groups: &'a [SizeGroup],
        shapes: &'a [Box<dyn ShapeModel>],
        continuous_phase: &str,
        phases: &[String],
    ) -> PbResult<Self> {
        let continuous = fluid.phase(continuous_phase)?;
        let dispersed = phases
            .iter()
            .map(|name| fluid.phase(name))
            .collect::<PbResult<Vec<_>>>()?;
        let sigmas = phases
            .iter()
            .map(|name| fluid.sigma(name, continuous_phase))
            .collect();

        let n = fluid.n_cells();
        let mut alphas = ScalarField::zeros(n);
        for phase in &dispersed {
            alphas.add_assign(phase.alpha.as_slice());
        }

        Ok(Self {
            fluid,
            groups,
            shapes,
            continuous,
            dispersed,
            sigmas,
            alphas,
        })
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.fluid.n_cells()
    }

    /// 相系统
    pub fn fluid(&self) -> &'a dyn FluidSystem {
        self.fluid
    }

    /// 全部尺寸组
    pub fn groups(&self) -> &'a [SizeGroup] {
        self.groups
    }

    /// 组数
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// 第 i 组
    #[inline]
    pub fn group(&self, i: usize) -> &'a SizeGroup {
        &self.groups[i]
    }

    /// 第 i 组代表体积
    #[inline]
    pub fn x(&self, i: usize) -> f64 {
        self.groups[i].x
    }

    /// 第 i 组在单元 cell 的碰撞直径
    #[inline]
    pub fn d(&self, i: usize, cell: usize) -> f64 {
        let g = &self.groups[i];
        self.shapes[g.phase_index].d(g, cell)
    }

    /// 第 i 组在单元 cell 的粒子表面积
    #[inline]
    pub fn a(&self, i: usize, cell: usize) -> f64 {
        let g = &self.groups[i];
        self.shapes[g.phase_index].a(g, cell)
    }

    /// 第 i 组在单元 cell 的面积体积比
    #[inline]
    pub fn kappa(&self, i: usize, cell: usize) -> f64 {
        let g = &self.groups[i];
        self.shapes[g.phase_index].kappa(g, cell)
    }

    /// 形状模型（按相序号）
    pub fn shape(&self, phase_index: usize) -> &dyn ShapeModel {
        self.shapes[phase_index].as_ref()
    }

    /// 连续相
    pub fn continuous(&self) -> &'a PhaseFields {
        self.continuous
    }

    /// 第 i 组所属分散相
    #[inline]
    pub fn phase_of(&self, i: usize) -> &'a PhaseFields {
        self.dispersed[self.groups[i].phase_index]
    }

    /// 按相序号访问分散相
    pub fn dispersed(&self, phase_index: usize) -> &'a PhaseFields {
        self.dispersed[phase_index]
    }

    /// 第 i 组所属相与连续相之间的表面张力
    #[inline]
    pub fn sigma(&self, i: usize) -> f64 {
        self.sigmas[self.groups[i].phase_index]
    }

    /// 分散相总体积分数
    pub fn alphas(&self) -> &ScalarField {
        &self.alphas
    }

    /// 重力加速度
    pub fn gravity(&self) -> DVec3 {
        self.fluid.gravity()
    }

    /// 连续相湍流场（缺失时报错，供需要湍流量的核函数使用）
    pub fn turbulence(&self) -> PbResult<&'a TurbulenceFields> {
        self.fluid.turbulence(&self.continuous.name).ok_or_else(|| {
            PbError::not_found(format!("连续相 '{}' 的湍流场", self.continuous.name))
        })
    }

    /// 连续相温度场
    pub fn temperature(&self) -> PbResult<&'a ScalarField> {
        self.continuous.temperature.as_ref().ok_or_else(|| {
            PbError::not_found(format!("连续相 '{}' 的温度场", self.continuous.name))
        })
    }
}
