// crates/pb_physics/src/shape/spherical.rs

use std::f64::consts::PI;

use super::ShapeModel;
use crate::group::SizeGroup;

/// 球形粒子
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalShape;

impl ShapeModel for SphericalShape {
    fn name(&self) -> &'static str {
        "spherical"
    }

    #[inline]
    fn d(&self, group: &SizeGroup, _cell: usize) -> f64 {
        group.d_sph
    }

    #[inline]
    fn a(&self, group: &SizeGroup, _cell: usize) -> f64 {
        PI * group.d_sph * group.d_sph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ScalarField;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_kappa_is_six_over_d() {
        let g = SizeGroup::new(0, "air", 0, 2e-3, ScalarField::uniform(1, 1.0));
        let shape = SphericalShape;
        assert_eq!(shape.d(&g, 0), 2e-3);
        assert_relative_eq!(shape.kappa(&g, 0), 6.0 / 2e-3, epsilon = 1e-9);
        assert!(!shape.tracks_area());
    }
}
