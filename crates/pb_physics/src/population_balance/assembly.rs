// crates/pb_physics/src/population_balance/assembly.rs

//! 出生/死亡源项装配
//!
//! 速率场在刷新时算好，这里只按固定节点法把事件分配到组上。
//! 源项单位为体积分数/s（已乘所属相 α），跨相出生按来源相密度
//! 记入质量传递表，分形形状模型另外累加面积源。

use crate::allocation::AllocationEngine;
use crate::context::KernelContext;
use crate::field::ScalarField;
use crate::sources::SourceAccumulator;
use crate::system::MassTransferTable;

/// 第 i 组数密度 n_i = α f_i / x_i
fn number_density(ctx: &KernelContext, i: usize) -> ScalarField {
    let g = ctx.group(i);
    let alpha = &ctx.phase_of(i).alpha;
    ScalarField::from_fn(ctx.n_cells(), |c| alpha[c] * g.f[c] / g.x)
}

/// 把出生体积 `birth` 记入第 g 组
///
/// `origins` 为 (来源组, 体积份额)；`kappa_birth` 为出生粒子的面积体积比。
fn add_birth<K>(
    ctx: &KernelContext,
    g: usize,
    birth: &ScalarField,
    origins: &[(usize, f64)],
    kappa_birth: K,
    acc: &mut SourceAccumulator,
    table: &mut MassTransferTable,
) where
    K: Fn(usize) -> f64 + Send + Sync,
{
    acc.add_su(g, birth.as_slice(), 1.0);

    let target = ctx.group(g);
    for &(p, share) in origins {
        let origin = ctx.group(p);
        if origin.phase != target.phase {
            let rho = &ctx.phase_of(p).rho;
            let mass = ScalarField::from_fn(birth.len(), |c| birth[c] * share * rho[c]);
            table.add(&target.phase, &origin.phase, mass.as_slice(), 1.0);
        }
    }

    if ctx.shape(target.phase_index).tracks_area() {
        let src = ScalarField::from_fn(birth.len(), |c| birth[c] * (kappa_birth(c) - ctx.kappa(g, c)));
        acc.add_kappa(g, src.as_slice(), 1.0);
    }
}

/// 聚并对 (i, j)，j <= i
pub(crate) fn add_coalescence(
    ctx: &KernelContext,
    engine: &AllocationEngine,
    i: usize,
    j: usize,
    rate: &ScalarField,
    acc: &mut SourceAccumulator,
    table: &mut MassTransferTable,
) {
    let (xi, xj) = (ctx.x(i), ctx.x(j));
    let v = xi + xj;
    let ni = number_density(ctx, i);
    let nj = number_density(ctx, j);
    let factor = if i == j { 0.5 } else { 1.0 };
    let events = ScalarField::from_fn(rate.len(), |c| factor * rate[c] * ni[c] * nj[c]);

    let kappa_birth = |c: usize| (ctx.a(i, c) + ctx.a(j, c)) / v;
    let origins = [(i, xi / v), (j, xj / v)];
    for (g, eta) in engine.bracket(v).targets() {
        let scale = ctx.x(g) * eta;
        let birth = ScalarField::from_fn(events.len(), |c| scale * events[c]);
        add_birth(ctx, g, &birth, &origins, kappa_birth, acc, table);
    }

    // 死亡：Sp_i f_i = rate n_i n_j x_i
    let alpha_i = &ctx.phase_of(i).alpha;
    let alpha_j = &ctx.phase_of(j).alpha;
    let sp_i = ScalarField::from_fn(rate.len(), |c| rate[c] * alpha_i[c] * nj[c]);
    acc.add_sp(i, sp_i.as_slice(), 1.0);
    if i != j {
        let sp_j = ScalarField::from_fn(rate.len(), |c| rate[c] * alpha_j[c] * ni[c]);
        acc.add_sp(j, sp_j.as_slice(), 1.0);
    }
}

/// 第 k 组总破碎，`nik[i]` 为落入第 i 组的子粒子数
pub(crate) fn add_breakup(
    ctx: &KernelContext,
    k: usize,
    rate: &ScalarField,
    nik: &[f64],
    acc: &mut SourceAccumulator,
    table: &mut MassTransferTable,
) {
    let xk = ctx.x(k);
    let alpha = &ctx.phase_of(k).alpha;
    let fk = &ctx.group(k).f;
    // 破碎母粒子的体积速率 g α f_k
    let broken = ScalarField::from_fn(rate.len(), |c| rate[c] * alpha[c] * fk[c]);

    let kappa_birth = |c: usize| ctx.kappa(k, c);
    for (i, &n) in nik.iter().enumerate().take(k + 1) {
        if n == 0.0 {
            continue;
        }
        let scale = ctx.x(i) * n / xk;
        let birth = ScalarField::from_fn(broken.len(), |c| scale * broken[c]);
        add_birth(ctx, i, &birth, &[(k, 1.0)], kappa_birth, acc, table);
    }

    let sp = ScalarField::from_fn(rate.len(), |c| rate[c] * alpha[c]);
    acc.add_sp(k, sp.as_slice(), 1.0);
}

/// 二元破碎对 (i, j)，i < j
pub(crate) fn add_binary_breakup(
    ctx: &KernelContext,
    engine: &AllocationEngine,
    i: usize,
    j: usize,
    rate: &ScalarField,
    acc: &mut SourceAccumulator,
    table: &mut MassTransferTable,
) {
    let delta = engine.pair_delta(i, j);
    let alpha = &ctx.phase_of(j).alpha;
    let fj = &ctx.group(j).f;
    let xj = ctx.x(j);
    // 母粒子破碎事件数 Ω Δ_ij n_j，每个事件同时产生 i 碎片与互补碎片
    let events = ScalarField::from_fn(rate.len(), |c| rate[c] * delta * alpha[c] * fj[c] / xj);

    let kappa_birth = |c: usize| ctx.kappa(j, c);
    let origins = [(j, 1.0)];

    let xi = ctx.x(i);
    let birth = ScalarField::from_fn(events.len(), |c| xi * events[c]);
    add_birth(ctx, i, &birth, &origins, kappa_birth, acc, table);

    let complement = xj - xi;
    for (g, eta) in engine.bracket(complement).targets() {
        let scale = ctx.x(g) * eta;
        let birth = ScalarField::from_fn(events.len(), |c| scale * events[c]);
        add_birth(ctx, g, &birth, &origins, kappa_birth, acc, table);
    }

    let sp = ScalarField::from_fn(rate.len(), |c| rate[c] * delta * alpha[c]);
    acc.add_sp(j, sp.as_slice(), 1.0);
}
