//! Shared numeric constants for the cascade engine.

/// Hartree energy in eV; level energies are tabulated in atomic units.
pub const HARTREE_EV: f64 = 27.211_396_f64;

/// Relative tolerance for matching a requested selection key (e.g. incident
/// photon energy) against the key a dataset was tabulated for.
pub const SELECTION_KEY_RELATIVE_TOLERANCE: f64 = 1.0e-10;

/// Relative tolerance within which total occupation must be conserved by
/// propagation.
pub const CONSERVATION_RELATIVE_TOLERANCE: f64 = 1.0e-9;
