// crates/pb_physics/src/expansion.rs

//! 膨胀/漂移源项
//!
//! 分散相因密度变化或相变而整体胀缩时，粒子在固定网格上跨组移动。
//! 相对体积增长率
//!
//! ```text
//! G = dmdt/(α ρ) - (ρ - ρ0)/(ρ Δt)
//! ```
//!
//! 按迎风格式离散到相邻组：
//!
//! ```text
//! G > 0:  Sp_i     += G α x_{i+1}/(x_{i+1} - x_i)
//!         Su_{i+1} += G α f_i x_{i+1}/(x_{i+1} - x_i)      (i 不是最大组)
//! G < 0:  Sp_i     += |G| α x_{i-1}/(x_i - x_{i-1})
//!         Su_{i-1} += |G| α f_i x_{i-1}/(x_i - x_{i-1})    (i 不是最小组)
//! ```
//!
//! 每条通量的流出与流入相等，相内净源为零，体积变化由相连续方程承担。
//! 跨相的通量按源相密度记入质量传递表。

use pb_foundation::float::{neg_part, pos_part};
use pb_foundation::PbResult;
use std::ops::Range;

use crate::context::KernelContext;
use crate::field::ScalarField;
use crate::group::{SizeGroup, VelocityGroup};
use crate::sources::SourceAccumulator;
use crate::system::MassTransferTable;

/// 漂移算子：把增长率 `growth` 下组区间 `range` 的跨组通量累加到 `acc`
pub fn add_drift(
    groups: &[SizeGroup],
    range: Range<usize>,
    growth: &ScalarField,
    alpha: &ScalarField,
    rho: &ScalarField,
    acc: &mut SourceAccumulator,
    table: &mut MassTransferTable,
) {
    let n_groups = groups.len();
    let n = growth.len();

    for i in range {
        let gi = &groups[i];

        if i + 1 < n_groups {
            let up = &groups[i + 1];
            let ratio = up.x / (up.x - gi.x);
            let coef = ScalarField::from_fn(n, |c| pos_part(growth[c]) * alpha[c] * ratio);
            transfer(gi, up, &coef, rho, acc, table);
        }
        if i > 0 {
            let down = &groups[i - 1];
            let ratio = down.x / (gi.x - down.x);
            let coef = ScalarField::from_fn(n, |c| -neg_part(growth[c]) * alpha[c] * ratio);
            transfer(gi, down, &coef, rho, acc, table);
        }
    }
}

/// 以隐式系数 `coef` 把 `from` 组的体积移入 `to` 组
fn transfer(
    from: &SizeGroup,
    to: &SizeGroup,
    coef: &ScalarField,
    rho: &ScalarField,
    acc: &mut SourceAccumulator,
    table: &mut MassTransferTable,
) {
    if !coef.any_nonzero() {
        return;
    }
    let flux = ScalarField::from_fn(coef.len(), |c| coef[c] * from.f[c]);
    acc.add_sp(from.index, coef.as_slice(), 1.0);
    acc.add_su(to.index, flux.as_slice(), 1.0);
    if to.phase != from.phase {
        let mass = ScalarField::from_fn(flux.len(), |c| flux[c] * rho[c]);
        table.add(&to.phase, &from.phase, mass.as_slice(), 1.0);
    }
}

/// 分散相的相对体积增长率 G
pub fn growth_rate(ctx: &KernelContext, phase_index: usize) -> ScalarField {
    let phase = ctx.dispersed(phase_index);
    let fluid = ctx.fluid();
    let dt = fluid.delta_t();
    let dmdt = fluid.dmdt(&phase.name);
    let residual = phase.residual_alpha;

    ScalarField::from_fn(ctx.n_cells(), |c| {
        let rho = phase.rho[c];
        let mut g = -(rho - phase.rho0[c]) / (rho * dt);
        if let Some(d) = dmdt {
            g += d[c] / (phase.alpha[c].max(residual) * rho);
        }
        g
    })
}

/// 全部分散相的膨胀源项
pub fn add_expansion(
    ctx: &KernelContext,
    velocity_groups: &[VelocityGroup],
    acc: &mut SourceAccumulator,
    table: &mut MassTransferTable,
) -> PbResult<()> {
    for vg in velocity_groups {
        let growth = growth_rate(ctx, vg.phase_index);
        if !growth.any_nonzero() {
            continue;
        }
        let phase = ctx.dispersed(vg.phase_index);
        add_drift(
            ctx.groups(),
            vg.groups.clone(),
            &growth,
            &phase.alpha,
            &phase.rho,
            acc,
            table,
        );
    }
    Ok(())
}
