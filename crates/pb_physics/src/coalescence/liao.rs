// crates/pb_physics/src/coalescence/liao.rs

//! Liao et al. (2015) 多机理聚并模型
//!
//! 各碰撞机理给出碰撞频率 θ 与特征相对速度 u，捕获效率统一为
//! exp(-C_eff sqrt(We))，We = ρ_c d_eq u² / σ，d_eq = 2 d_i d_j / (d_i + d_j)：
//!
//! ```text
//! turbulence      θ = π/4 (d_i + d_j)² u_turb
//! buoyancy        θ = π/4 (d_i + d_j)² |u_t,i - u_t,j|
//! laminarShear    θ = 1/6 (d_i + d_j)³ G,            u = G (d_i + d_j)/2
//! wakeEntrainment θ = C_wake π/4 d_max² u_t,max,     u = u_t,max
//! ```
//!
//! 范德华机理适用于小颗粒：θ = 1/6 (d_i + d_j)³ G_v，
//! 捕获效率 min(0.73 N_F^(-0.242), 1)，N_F = 6π μ_c d_eq³ G_v / (8 A_H)。
//! 堆积修正把总速率乘以 P_max / max(P_max - α_s, SMALL)。
//!
//! 终端速度在 `precompute` 中按组缓存。

use pb_config::ModelEntry;
use pb_foundation::float::SMALL;
use pb_foundation::PbResult;
use serde::Deserialize;
use std::f64::consts::PI;

use super::{terminal_velocity, turbulent_velocity, CoalescenceModel, FAMILY};
use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

/// Liao 聚并
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Liao {
    /// 最大堆积分数
    #[serde(rename = "PMax")]
    pub p_max: f64,
    /// 捕获效率系数
    #[serde(rename = "CEff")]
    pub c_eff: f64,
    /// 尾涡夹带系数
    #[serde(rename = "CWake")]
    pub c_wake: f64,
    /// Hamaker 常数 [J]
    #[serde(rename = "AH")]
    pub a_h: f64,
    pub turbulence: bool,
    pub buoyancy: bool,
    pub laminar_shear: bool,
    pub wake_entrainment: bool,
    pub van_der_waals: bool,
    pub packing_correction: bool,
}

impl Default for Liao {
    fn default() -> Self {
        Self {
            p_max: 0.8,
            c_eff: 0.5,
            c_wake: 1.0,
            a_h: 3.7e-20,
            turbulence: true,
            buoyancy: true,
            laminar_shear: false,
            wake_entrainment: false,
            van_der_waals: false,
            packing_correction: false,
        }
    }
}

impl Liao {
    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry) -> PbResult<Self> {
        Ok(entry.parse_coeffs()?)
    }

    fn terminal_key(i: usize) -> String {
        KernelCache::key(FAMILY, "Liao", "uTerminal", Some(i))
    }

    fn uses_terminal_velocity(&self) -> bool {
        self.buoyancy || self.wake_entrainment
    }
}

impl CoalescenceModel for Liao {
    fn name(&self) -> &'static str {
        "Liao"
    }

    fn precompute(&self, ctx: &KernelContext, cache: &mut KernelCache) -> PbResult<()> {
        if !self.uses_terminal_velocity() {
            return Ok(());
        }
        let cont = ctx.continuous();
        let g = ctx.gravity().length();
        for i in 0..ctx.n_groups() {
            let sigma = ctx.sigma(i);
            let ut = ScalarField::from_fn(ctx.n_cells(), |c| {
                terminal_velocity(ctx.d(i, c), sigma, cont.rho[c], g)
            });
            cache.insert_field(Self::terminal_key(i), ut);
        }
        Ok(())
    }

    fn add_to_coalescence_rate(
        &self,
        rate: &mut ScalarField,
        i: usize,
        j: usize,
        ctx: &KernelContext,
        cache: &KernelCache,
    ) -> PbResult<()> {
        let turb = ctx.turbulence()?;
        let (ut_i, ut_j) = if self.uses_terminal_velocity() {
            (
                Some(cache.field(&Self::terminal_key(i))?),
                Some(cache.field(&Self::terminal_key(j))?),
            )
        } else {
            (None, None)
        };
        let shear = turb.shear_rate.as_ref();
        let cont = ctx.continuous();
        let alphas = ctx.alphas();
        let sigma = ctx.sigma(i);

        rate.map_inplace(|c, r| {
            let (di, dj) = (ctx.d(i, c), ctx.d(j, c));
            let dsum = di + dj;
            let d_eq = 2.0 * di * dj / dsum;
            let rho_c = cont.rho[c];
            let efficiency =
                |u: f64| (-self.c_eff * (rho_c * d_eq * u * u / sigma).sqrt()).exp();
            let shear_rate = shear.map_or(0.0, |s| s[c]);

            let mut total = 0.0;
            if self.turbulence {
                let u = turbulent_velocity(turb.epsilon[c], di, dj);
                total += PI / 4.0 * dsum * dsum * u * efficiency(u);
            }
            if let (true, Some(ut_i), Some(ut_j)) = (self.buoyancy, ut_i, ut_j) {
                let u = (ut_i[c] - ut_j[c]).abs();
                total += PI / 4.0 * dsum * dsum * u * efficiency(u);
            }
            if self.laminar_shear {
                let u = 0.5 * shear_rate * dsum;
                total += dsum.powi(3) * shear_rate / 6.0 * efficiency(u);
            }
            if let (true, Some(ut_i), Some(ut_j)) = (self.wake_entrainment, ut_i, ut_j) {
                let (d_max, u) = if di >= dj { (di, ut_i[c]) } else { (dj, ut_j[c]) };
                total += self.c_wake * PI / 4.0 * d_max * d_max * u * efficiency(u);
            }
            if self.van_der_waals {
                let g_v = if shear_rate > 0.0 {
                    shear_rate
                } else {
                    (turb.epsilon[c].max(0.0) * rho_c / cont.mu[c]).sqrt()
                };
                let n_f = 6.0 * PI * cont.mu[c] * d_eq.powi(3) * g_v / (8.0 * self.a_h);
                let capture = (0.73 * n_f.powf(-0.242)).min(1.0);
                total += dsum.powi(3) * g_v / 6.0 * capture;
            }
            if self.packing_correction {
                total *= self.p_max / (self.p_max - alphas[c]).max(SMALL);
            }
            r + total
        });
        Ok(())
    }
}
