//! Surface boundary conditions.

use crate::import_error::ImportError;
use std::fmt;

/// Boundary condition of an imported surface.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum BoundaryCondition {
    /// Particles cross the surface unaffected.
    #[default]
    Transmit,
    /// Particles leaving through the surface are killed.
    Vacuum,
    /// Particles are specularly reflected.
    Reflective,
}

/// Recognised boundary kinds that imported geometry cannot express.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UnsupportedBoundary {
    White,
    Periodic,
}

impl fmt::Display for UnsupportedBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedBoundary::White => write!(f, "White"),
            UnsupportedBoundary::Periodic => write!(f, "Periodic"),
        }
    }
}

impl BoundaryCondition {
    /// Resolve a `boundary` tag of surface `surface`. Matching ignores case;
    /// an empty tag is the transmissive default.
    pub fn from_tag(tag: &str, surface: i32) -> Result<Self, ImportError> {
        let value = tag.to_lowercase();
        match value.as_str() {
            "" | "transmit" | "transmission" => Ok(BoundaryCondition::Transmit),
            "vacuum" => Ok(BoundaryCondition::Vacuum),
            "reflective" | "reflect" | "reflecting" => Ok(BoundaryCondition::Reflective),
            "white" => Err(ImportError::UnsupportedBoundary(UnsupportedBoundary::White)),
            "periodic" => Err(ImportError::UnsupportedBoundary(
                UnsupportedBoundary::Periodic,
            )),
            _ => Err(ImportError::UnknownBoundary { value, surface }),
        }
    }

    pub fn is_transmit(self) -> bool {
        self == BoundaryCondition::Transmit
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryCondition::Transmit => write!(f, "transmit"),
            BoundaryCondition::Vacuum => write!(f, "vacuum"),
            BoundaryCondition::Reflective => write!(f, "reflective"),
        }
    }
}
