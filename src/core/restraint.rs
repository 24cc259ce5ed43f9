use serde::{Deserialize, Serialize};

use crate::core::types::AtomLabel;

/// Lower and upper limit of a restraint target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

/// How the two trailing fields of a distance restraint relate to its limits.
///
/// Restraint tables in the wild use both readings, so the raw values are kept
/// as written and a convention is applied only when a caller asks for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsConvention {
    /// `target - first` to `target + second`
    Delta,
    /// `first` to `second`
    Absolute,
}

/// A torsion restraint over four ordered atoms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DihedralRestraint {
    /// 1-based position of the restraint in its file
    pub id: usize,
    /// Line of the `assign` keyword
    pub line: usize,
    pub atoms: [AtomLabel; 4],
    pub energy_constant: f64,
    /// Target angle in degrees
    pub angle: f64,
    /// Half-width of the allowed window in degrees
    pub range: f64,
    pub exponent: i64,
}

impl DihedralRestraint {
    /// Allowed window `angle ± range`
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds {
            lower: self.angle - self.range,
            upper: self.angle + self.range,
        }
    }
}

/// A distance restraint between two atom sets.
///
/// Each side lists every atom its selection names; more than one atom on a
/// side makes the restraint ambiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRestraint {
    pub id: usize,
    pub line: usize,
    pub atoms: [Vec<AtomLabel>; 2],
    pub target_value: f64,
    /// First trailing field, as written
    pub first_bound: f64,
    /// Second trailing field, as written
    pub second_bound: f64,
}

impl DistanceRestraint {
    /// Every atom pair the restraint covers, first selection outermost
    #[must_use]
    pub fn atom_pairs(&self) -> Vec<(&AtomLabel, &AtomLabel)> {
        let [first, second] = &self.atoms;
        first
            .iter()
            .flat_map(|a| second.iter().map(move |b| (a, b)))
            .collect()
    }

    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.atoms.iter().any(|side| side.len() > 1)
    }

    #[must_use]
    pub fn bounds(&self, convention: BoundsConvention) -> Bounds {
        match convention {
            BoundsConvention::Delta => Bounds {
                lower: self.target_value - self.first_bound,
                upper: self.target_value + self.second_bound,
            },
            BoundsConvention::Absolute => Bounds {
                lower: self.first_bound,
                upper: self.second_bound,
            },
        }
    }
}
