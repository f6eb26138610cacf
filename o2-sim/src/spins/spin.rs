use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest tolerated deviation of `|s|` from 1 after normalization.
pub const NORM_TOLERANCE: f64 = 1e-15;

/// Planar spin: a 2-component vector that is kept close to the unit circle.
///
/// Arithmetic operators treat it as a plain 2-vector; the unit-modulus
/// invariant is restored by [`Spin::normalize`] once per sweep.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Spin {
    pub sx: f64,
    pub sy: f64,
}

/// A spin whose modulus is still off by more than [`NORM_TOLERANCE`] after
/// normalization. Expected occasionally from accumulated round-off.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("renormalized spin has modulus {modulus:.17}, outside 1 ± 1e-15")]
pub struct RenormalizationDrift {
    pub modulus: f64,
}

impl RenormalizationDrift {
    pub fn deviation(&self) -> f64 {
        (self.modulus - 1.0).abs()
    }
}

impl Spin {
    pub const ZERO: Self = Self { sx: 0.0, sy: 0.0 };

    pub const fn new(sx: f64, sy: f64) -> Self {
        Self { sx, sy }
    }

    /// Unit spin at plane angle `theta` (radians).
    pub fn from_angle(theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self { sx: cos, sy: sin }
    }

    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.sx * other.sx + self.sy * other.sy
    }

    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.sx.hypot(self.sy)
    }

    pub fn angle(self) -> f64 {
        self.sy.atan2(self.sx)
    }

    /// Rotate by `theta` with the matrix `[[cos, sin], [-sin, cos]]`.
    #[inline]
    pub fn rotated(self, theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self {
            sx: cos * self.sx + sin * self.sy,
            sy: -sin * self.sx + cos * self.sy,
        }
    }

    /// Reflect across the line spanned by `axis`: `2 (s·a)/|a|² a − s`.
    ///
    /// The caller guarantees `axis` is not degenerate.
    #[inline]
    pub fn reflected(self, axis: Self) -> Self {
        let scale = 2.0 * self.dot(axis) / axis.norm_sq();
        axis * scale - self
    }

    /// Project onto the unit circle in place.
    ///
    /// Spins already within [`NORM_TOLERANCE`] of unit modulus are left
    /// untouched, which makes normalization exactly idempotent. A zero vector
    /// has no direction and is left as is, reported as drift.
    pub fn normalize(&mut self) -> Result<(), RenormalizationDrift> {
        let modulus = self.norm();
        if (modulus - 1.0).abs() < NORM_TOLERANCE {
            return Ok(());
        }
        if modulus == 0.0 || !modulus.is_finite() {
            return Err(RenormalizationDrift { modulus });
        }

        self.sx /= modulus;
        self.sy /= modulus;

        let modulus = self.norm();
        if (modulus - 1.0).abs() < NORM_TOLERANCE {
            Ok(())
        } else {
            Err(RenormalizationDrift { modulus })
        }
    }

    pub fn normalized(mut self) -> Self {
        let _ = self.normalize();
        self
    }
}

impl Add for Spin {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.sx + rhs.sx, self.sy + rhs.sy)
    }
}

impl AddAssign for Spin {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.sx += rhs.sx;
        self.sy += rhs.sy;
    }
}

impl Sub for Spin {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.sx - rhs.sx, self.sy - rhs.sy)
    }
}

impl Neg for Spin {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.sx, -self.sy)
    }
}

impl Mul<f64> for Spin {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.sx * rhs, self.sy * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_normalize_projects_to_unit_circle() {
        let inputs = [
            Spin::new(3.0, 4.0),
            Spin::new(12.0, 0.0),
            Spin::new(-1e-3, 7e-4),
            Spin::new(0.1, -123.456),
            Spin::new(1.0, 1.0),
        ];
        for v in inputs {
            let mut s = v;
            assert!(s.normalize().is_ok(), "{v:?}");
            assert!((s.norm() - 1.0).abs() < NORM_TOLERANCE, "{v:?} -> {s:?}");
            // Direction is preserved.
            assert_abs_diff_eq!(s.angle(), v.angle(), epsilon = 1e-14);
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = Spin::new(0.3, -2.9).normalized();
        let twice = once.normalized();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_zero_reports_drift() {
        let mut s = Spin::ZERO;
        let drift = s.normalize().unwrap_err();
        assert_eq!(drift.modulus, 0.0);
        assert_eq!(drift.deviation(), 1.0);
        assert_eq!(s, Spin::ZERO);
    }

    #[test]
    fn test_rotation_preserves_modulus() {
        let s = Spin::from_angle(0.7);
        for theta in [-1.5, -0.5, 0.0, 0.25, 1.9] {
            let r = s.rotated(theta);
            assert_abs_diff_eq!(r.norm(), 1.0, epsilon = 1e-15);
            assert_abs_diff_eq!(r.angle(), 0.7 - theta, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reflection_is_involution() {
        let s = Spin::from_angle(2.1);
        let axis = Spin::new(0.4, -3.3);
        let back = s.reflected(axis).reflected(axis);
        assert_abs_diff_eq!(back.sx, s.sx, epsilon = 1e-14);
        assert_abs_diff_eq!(back.sy, s.sy, epsilon = 1e-14);
    }
}
