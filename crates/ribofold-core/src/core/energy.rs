use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// A free energy in fixed-point representation.
///
/// Energies are stored as integral hundredths of a kcal/mol, the same base
/// scale as the thermodynamic parameter table. Callers supply floating-point
/// kcal/mol values; rounding to the nearest hundredth happens exactly once, at
/// the conversion boundary, so repeated additions never accumulate float
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Energy(i32);

impl Energy {
    pub const ZERO: Energy = Energy(0);

    /// Converts a floating-point energy in kcal/mol, rounding to the nearest
    /// hundredth.
    pub fn from_kcal(kcal: f64) -> Self {
        Energy((kcal * 100.0).round() as i32)
    }

    pub const fn from_raw(raw: i32) -> Self {
        Energy(raw)
    }

    /// The raw fixed-point value in hundredths of kcal/mol.
    pub const fn raw(self) -> i32 {
        self.0
    }

    pub fn to_kcal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// The Boltzmann weight `exp(-E / kT)` of this energy.
    ///
    /// `kt` is the thermal energy in cal/mol; the fixed-point value is scaled
    /// by 10 to reach cal/mol before the exponential.
    pub fn boltzmann(self, kt: f64) -> f64 {
        (-(self.0 as f64) * 10.0 / kt).exp()
    }
}

impl Add for Energy {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Energy(self.0 + rhs.0)
    }
}

impl AddAssign for Energy {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Energy {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Energy(self.0 - rhs.0)
    }
}

impl Neg for Energy {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Energy(-self.0)
    }
}

impl Sum for Energy {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Energy::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_kcal_rounds_to_nearest_hundredth() {
        assert_eq!(Energy::from_kcal(0.5).raw(), 50);
        assert_eq!(Energy::from_kcal(-1.234).raw(), -123);
        assert_eq!(Energy::from_kcal(0.005).raw(), 1);
        assert_eq!(Energy::from_kcal(0.004).raw(), 0);
    }

    #[test]
    fn to_kcal_inverts_exact_hundredths() {
        let e = Energy::from_kcal(2.37);
        assert_eq!(e.to_kcal(), 2.37);
    }

    #[test]
    fn zero_energy_has_unit_boltzmann_weight() {
        assert_eq!(Energy::ZERO.boltzmann(616.0), 1.0);
    }

    #[test]
    fn boltzmann_matches_exponential_of_cal_per_mol() {
        let e = Energy::from_raw(100); // 1 kcal/mol
        let kt: f64 = 616.32;
        let expected = (-1000.0 / kt).exp();
        assert!((e.boltzmann(kt) - expected).abs() < 1e-15);
    }

    #[test]
    fn negative_energy_weight_exceeds_one() {
        let e = Energy::from_kcal(-0.5);
        assert!(e.boltzmann(616.32) > 1.0);
    }

    #[test]
    fn arithmetic_operates_on_raw_values() {
        let a = Energy::from_raw(30);
        let b = Energy::from_raw(-50);
        assert_eq!((a + b).raw(), -20);
        assert_eq!((a - b).raw(), 80);
        assert_eq!((-a).raw(), -30);

        let mut c = a;
        c += b;
        assert_eq!(c.raw(), -20);

        let total: Energy = [a, b, Energy::from_raw(20)].into_iter().sum();
        assert_eq!(total.raw(), 0);
    }
}
