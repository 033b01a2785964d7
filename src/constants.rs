//! Physical constants and defaults used during import.

/// Boltzmann constant in eV/K.
pub const K_BOLTZMANN: f64 = 8.617_333_262e-5;

/// Temperature in kelvin assumed for materials that declare none.
pub const DEFAULT_TEMPERATURE: f64 = 293.6;
