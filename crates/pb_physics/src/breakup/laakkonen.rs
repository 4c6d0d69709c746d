// crates/pb_physics/src/breakup/laakkonen.rs

//! Laakkonen 等人 (2007) 破碎频率
//!
//! ```text
//! g = C1 ε^(1/3) erfc( sqrt( C2 σ / (ρ_c ε^(2/3) d^(5/3))
//!                          + C3 μ_c / (sqrt(ρ_c ρ_d) ε^(1/3) d^(4/3)) ) )
//! ```

use pb_config::ModelEntry;
use pb_foundation::PbResult;
use puruspe::erfc;
use serde::Deserialize;

use super::{BreakupModel, DaughterSizeDistribution};
use crate::cache::KernelCache;
use crate::context::KernelContext;
use crate::field::ScalarField;

/// Laakkonen 系数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LaakkonenCoeffs {
    #[serde(rename = "C1")]
    pub c1: f64,
    #[serde(rename = "C2")]
    pub c2: f64,
    #[serde(rename = "C3")]
    pub c3: f64,
}

impl Default for LaakkonenCoeffs {
    fn default() -> Self {
        Self {
            c1: 2.25,
            c2: 0.04,
            c3: 0.01,
        }
    }
}

/// Laakkonen 破碎
#[derive(Debug)]
pub struct Laakkonen {
    pub coeffs: LaakkonenCoeffs,
    daughter: Box<dyn DaughterSizeDistribution>,
}

impl Laakkonen {
    pub fn new(coeffs: LaakkonenCoeffs, daughter: Box<dyn DaughterSizeDistribution>) -> Self {
        Self { coeffs, daughter }
    }

    /// 由配置条目构建
    pub fn from_entry(entry: &ModelEntry, daughter: Box<dyn DaughterSizeDistribution>) -> PbResult<Self> {
        Ok(Self::new(entry.parse_coeffs()?, daughter))
    }
}

impl BreakupModel for Laakkonen {
    fn name(&self) -> &'static str {
        "Laakkonen"
    }

    fn add_to_breakup_rate(
        &self,
        rate: &mut ScalarField,
        i: usize,
        ctx: &KernelContext,
        _cache: &KernelCache,
    ) -> PbResult<()> {
        let turb = ctx.turbulence()?;
        let cont = ctx.continuous();
        let disp = ctx.phase_of(i);
        let sigma = ctx.sigma(i);
        let LaakkonenCoeffs { c1, c2, c3 } = self.coeffs;

        rate.map_inplace(|c, r| {
            let eps = turb.epsilon[c];
            if eps <= 0.0 {
                return r;
            }
            let d = ctx.d(i, c);
            let rho_c = cont.rho[c];
            let eps13 = eps.cbrt();
            let arg = c2 * sigma / (rho_c * eps13 * eps13 * d.powf(5.0 / 3.0))
                + c3 * cont.mu[c] / ((rho_c * disp.rho[c]).sqrt() * eps13 * d.powf(4.0 / 3.0));
            r + c1 * eps13 * erfc(arg.sqrt())
        });
        Ok(())
    }

    fn daughter(&self) -> &dyn DaughterSizeDistribution {
        self.daughter.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakup::LaakkonenDaughter;
    use crate::coalescence::test_support::*;

    fn eval(eps: f64, i: usize) -> f64 {
        let model = Laakkonen::new(LaakkonenCoeffs::default(), Box::new(LaakkonenDaughter::default()));
        let system = air_water(eps);
        let (groups, shapes) = groups();
        let ctx = KernelContext::new(&system, &groups, &shapes, "water", &phases()).unwrap();
        let mut rate = ScalarField::zeros(3);
        model.add_to_breakup_rate(&mut rate, i, &ctx, &KernelCache::new()).unwrap();
        rate[0]
    }

    #[test]
    fn test_larger_bubbles_break_faster() {
        assert!(eval(1.0, 4) > eval(1.0, 1));
        assert!(eval(1.0, 1) > 0.0);
    }

    #[test]
    fn test_no_breakup_without_dissipation() {
        assert_eq!(eval(0.0, 4), 0.0);
        assert!(eval(10.0, 2) > eval(0.1, 2));
    }

    #[test]
    fn test_coefficients_override() {
        let entry = ModelEntry::new("Laakkonen").with("C1", 3.0);
        let model = Laakkonen::from_entry(&entry, Box::new(LaakkonenDaughter::default())).unwrap();
        assert_eq!(model.coeffs.c1, 3.0);
        assert_eq!(model.coeffs.c2, 0.04);
        assert_eq!(model.daughter().name(), "Laakkonen");
    }
}
