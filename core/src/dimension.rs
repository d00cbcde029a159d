use std::fmt;

use num_rational::Rational32;
use num_traits::{CheckedAdd, CheckedMul, CheckedSub, One, Signed, Zero};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseQuantity {
    Length,
    Mass,
    Time,
    Current,
    Temperature,
    Amount,
    Luminosity,
    Angle,
}

impl BaseQuantity {
    pub const ALL: [BaseQuantity; 8] = [
        BaseQuantity::Length,
        BaseQuantity::Mass,
        BaseQuantity::Time,
        BaseQuantity::Current,
        BaseQuantity::Temperature,
        BaseQuantity::Amount,
        BaseQuantity::Luminosity,
        BaseQuantity::Angle,
    ];

    /// Symbol of the SI base unit, as the registry resolves it.
    pub fn symbol(self) -> &'static str {
        match self {
            BaseQuantity::Length => "m",
            BaseQuantity::Mass => "kg",
            BaseQuantity::Time => "s",
            BaseQuantity::Current => "A",
            BaseQuantity::Temperature => "K",
            BaseQuantity::Amount => "mol",
            BaseQuantity::Luminosity => "cd",
            BaseQuantity::Angle => "rad",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BaseQuantity::Length => "length",
            BaseQuantity::Mass => "mass",
            BaseQuantity::Time => "time",
            BaseQuantity::Current => "current",
            BaseQuantity::Temperature => "temperature",
            BaseQuantity::Amount => "amount",
            BaseQuantity::Luminosity => "luminosity",
            BaseQuantity::Angle => "angle",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

// mass first, then length: "kg*m/s**2" reads like the usual SI spelling
const FORMAT_ORDER: [BaseQuantity; 8] = [
    BaseQuantity::Mass,
    BaseQuantity::Length,
    BaseQuantity::Time,
    BaseQuantity::Current,
    BaseQuantity::Temperature,
    BaseQuantity::Amount,
    BaseQuantity::Luminosity,
    BaseQuantity::Angle,
];

const ZERO: Rational32 = Rational32::new_raw(0, 1);

/// Exponent vector over the eight base quantities.
///
/// The all-zero vector is the dimensionless value; it is an ordinary value of
/// this type and never represented by absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicalDimension {
    exponents: [Rational32; 8],
}

impl PhysicalDimension {
    pub const DIMENSIONLESS: PhysicalDimension = PhysicalDimension {
        exponents: [ZERO; 8],
    };

    pub fn dimensionless() -> Self {
        Self::DIMENSIONLESS
    }

    pub fn of(base: BaseQuantity) -> Self {
        Self::DIMENSIONLESS.with(base, 1)
    }

    /// Builds a dimension from integer exponents, e.g. `[(Length, 1), (Time, -2)]`.
    pub fn from_exponents(parts: &[(BaseQuantity, i32)]) -> Self {
        parts
            .iter()
            .fold(Self::DIMENSIONLESS, |acc, (base, exp)| acc.with(*base, *exp))
    }

    fn with(mut self, base: BaseQuantity, exp: i32) -> Self {
        self.exponents[base.index()] += Rational32::from_integer(exp);
        self
    }

    pub fn exponent(&self, base: BaseQuantity) -> Rational32 {
        self.exponents[base.index()]
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents.iter().all(|exp| exp.is_zero())
    }

    /// Dimension of a product of two quantities.
    pub fn checked_mul(&self, other: &Self) -> Option<Self> {
        let mut out = Self::DIMENSIONLESS;
        for i in 0..out.exponents.len() {
            out.exponents[i] = self.exponents[i].checked_add(&other.exponents[i])?;
        }
        Some(out)
    }

    /// Dimension of a quotient; equal operands cancel to `DIMENSIONLESS`.
    pub fn checked_div(&self, other: &Self) -> Option<Self> {
        let mut out = Self::DIMENSIONLESS;
        for i in 0..out.exponents.len() {
            out.exponents[i] = self.exponents[i].checked_sub(&other.exponents[i])?;
        }
        Some(out)
    }

    /// Dimension of a quantity raised to a rational power.
    pub fn checked_pow(&self, power: Rational32) -> Option<Self> {
        let mut out = Self::DIMENSIONLESS;
        for i in 0..out.exponents.len() {
            out.exponents[i] = self.exponents[i].checked_mul(&power)?;
        }
        Some(out)
    }

    /// Base-unit expression for this dimension, e.g. `kg*m/s**2`.
    ///
    /// Empty for the dimensionless vector. The returned text resolves back to
    /// the same dimension with scale 1 through the unit registry.
    pub fn base_unit(&self) -> String {
        if self.is_dimensionless() {
            return String::new();
        }

        let mut numer = Vec::new();
        let mut denom = Vec::new();
        for base in FORMAT_ORDER {
            let exp = self.exponent(base);
            if exp.is_zero() {
                continue;
            }
            let target = if exp.is_positive() { &mut numer } else { &mut denom };
            target.push(format_factor(base.symbol(), exp));
        }

        let numer_str = if numer.is_empty() {
            "1".to_string()
        } else {
            numer.join("*")
        };
        if denom.is_empty() {
            numer_str
        } else if denom.len() == 1 {
            format!("{}/{}", numer_str, denom[0])
        } else {
            format!("{}/({})", numer_str, denom.join("*"))
        }
    }
}

impl Default for PhysicalDimension {
    fn default() -> Self {
        Self::DIMENSIONLESS
    }
}

/// Formats `symbol` raised to `|exp|`; widened so `i32::MIN` has a magnitude.
fn format_factor(symbol: &str, exp: Rational32) -> String {
    let numer = i64::from(*exp.numer()).abs();
    let denom = i64::from(*exp.denom());
    if numer == 1 && denom == 1 {
        symbol.to_string()
    } else if denom == 1 {
        format!("{}**{}", symbol, numer)
    } else {
        format!("{}**({}/{})", symbol, numer, denom)
    }
}

impl fmt::Display for PhysicalDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }
        let parts: Vec<String> = BaseQuantity::ALL
            .iter()
            .filter(|base| !self.exponent(**base).is_zero())
            .map(|base| {
                let exp = self.exponent(*base);
                if exp.is_one() {
                    format!("[{}]", base.name())
                } else {
                    format!("[{}]^{}", base.name(), exp)
                }
            })
            .collect();
        write!(f, "{}", parts.join("*"))
    }
}

impl Serialize for PhysicalDimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
