// crates/pb_physics/src/transport.rs

//! 组分数方程的单元局部积分
//!
//! 0 维（充分混合）情形下第 i 组分数方程退化为逐单元的常微分方程：
//!
//! ```text
//! d(αρ f)/dt = dmdt · f + ρ (Su - Sp f)
//! ```
//!
//! 记 A = αρ，A0 = α0 ρ0：
//!
//! - **显式 Euler**: A f = A0 f0 + Δt (dmdt f0 + ρ (Su - Sp f0))
//! - **隐式 Euler**: f = (A0 f0 + Δt ρ Su) / (A - Δt dmdt + Δt ρ Sp)
//!
//! 外层流动求解器若自带输运方程组装，可实现 [`GroupFractionSolver`] 接管。

use pb_foundation::float::safe_div;
use pb_foundation::PbResult;
use serde::{Deserialize, Serialize};

use crate::field::ScalarField;

/// 时间积分方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntegrationMethod {
    /// 显式 Euler
    Explicit,
    /// 隐式 Euler（一阶，无条件有界）
    #[default]
    ImplicitEuler,
}

impl IntegrationMethod {
    /// 方法名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Explicit => "Explicit",
            Self::ImplicitEuler => "ImplicitEuler",
        }
    }

    /// 是否隐式
    pub fn is_implicit(&self) -> bool {
        !matches!(self, Self::Explicit)
    }
}

/// 一个组的分数方程
#[derive(Debug, Clone, Copy)]
pub struct GroupEquation<'a> {
    /// 全局组序号
    pub group: usize,
    pub alpha: &'a ScalarField,
    pub alpha0: &'a ScalarField,
    pub rho: &'a ScalarField,
    pub rho0: &'a ScalarField,
    /// 所属相的净相变质量源
    pub dmdt: Option<&'a ScalarField>,
    pub su: &'a ScalarField,
    pub sp: &'a ScalarField,
    /// 时间步开始时的组分数
    pub f0: &'a ScalarField,
    pub delta_t: f64,
}

/// 组分数求解器
pub trait GroupFractionSolver: Send + Sync {
    /// 求解并写入 `f`，返回初始残差（本次修正前后的相对变化）
    fn solve(&self, equation: &GroupEquation, f: &mut ScalarField) -> PbResult<f64>;
}

/// 单元局部积分器
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalImplicitSolver {
    pub method: IntegrationMethod,
}

impl LocalImplicitSolver {
    pub fn new(method: IntegrationMethod) -> Self {
        Self { method }
    }
}

impl GroupFractionSolver for LocalImplicitSolver {
    fn solve(&self, eq: &GroupEquation, f: &mut ScalarField) -> PbResult<f64> {
        pb_foundation::PbError::check_size("su", f.len(), eq.su.len())?;
        pb_foundation::PbError::check_size("f0", f.len(), eq.f0.len())?;

        let dt = eq.delta_t;
        let method = self.method;
        let updated = ScalarField::from_fn(f.len(), |c| {
            let a = eq.alpha[c] * eq.rho[c];
            let a0 = eq.alpha0[c] * eq.rho0[c] * eq.f0[c];
            let dmdt = eq.dmdt.map_or(0.0, |d| d[c]);
            let (rho, su, sp, f0) = (eq.rho[c], eq.su[c], eq.sp[c], eq.f0[c]);
            match method {
                IntegrationMethod::Explicit => safe_div(
                    a0 + dt * (dmdt * f0 + rho * (su - sp * f0)),
                    a,
                    f0,
                ),
                IntegrationMethod::ImplicitEuler => {
                    safe_div(a0 + dt * rho * su, a - dt * dmdt + dt * rho * sp, f0)
                }
            }
        });

        let mut change = 0.0;
        let mut scale = 0.0;
        for (new, old) in updated.iter().zip(f.iter()) {
            change += (new - old).abs();
            scale += new.abs();
        }
        f.assign(&updated)?;
        Ok(safe_div(change, scale, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Fixture {
        alpha: ScalarField,
        rho: ScalarField,
        su: ScalarField,
        sp: ScalarField,
        f0: ScalarField,
    }

    impl Fixture {
        fn new(su: f64, sp: f64) -> Self {
            Self {
                alpha: ScalarField::uniform(2, 0.1),
                rho: ScalarField::uniform(2, 2.0),
                su: ScalarField::uniform(2, su),
                sp: ScalarField::uniform(2, sp),
                f0: ScalarField::uniform(2, 0.5),
            }
        }

        fn equation(&self, dt: f64) -> GroupEquation<'_> {
            GroupEquation {
                group: 0,
                alpha: &self.alpha,
                alpha0: &self.alpha,
                rho: &self.rho,
                rho0: &self.rho,
                dmdt: None,
                su: &self.su,
                sp: &self.sp,
                f0: &self.f0,
                delta_t: dt,
            }
        }
    }

    #[test]
    fn test_explicit_step() {
        let fx = Fixture::new(0.01, 0.2);
        let mut f = fx.f0.clone();
        let res = LocalImplicitSolver::new(IntegrationMethod::Explicit)
            .solve(&fx.equation(0.5), &mut f)
            .unwrap();
        // f = f0 + dt (Su - Sp f0)/α
        assert_relative_eq!(f[0], 0.5 + 0.5 * (0.01 - 0.2 * 0.5) / 0.1, max_relative = 1e-12);
        assert!(res > 0.0);
    }

    #[test]
    fn test_implicit_stays_positive_for_stiff_death() {
        let fx = Fixture::new(0.0, 1e6);
        let mut f = fx.f0.clone();
        LocalImplicitSolver::default().solve(&fx.equation(1.0), &mut f).unwrap();
        assert!(f[1] > 0.0 && f[1] < 1e-5);
    }

    #[test]
    fn test_no_sources_is_fixed_point() {
        let fx = Fixture::new(0.0, 0.0);
        let mut f = fx.f0.clone();
        let res = LocalImplicitSolver::default().solve(&fx.equation(0.1), &mut f).unwrap();
        assert_eq!(f.as_slice(), fx.f0.as_slice());
        assert_eq!(res, 0.0);
    }

    #[test]
    fn test_method_names() {
        assert_eq!(IntegrationMethod::default().name(), "ImplicitEuler");
        assert!(!IntegrationMethod::Explicit.is_implicit());
    }
}
