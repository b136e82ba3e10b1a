use std::fmt;

use crate::term::Symbol;

/// A recoverable degradation noticed during key generation or circuit
/// evaluation.
///
/// Warnings never abort the surrounding operation: the affected value falls
/// back to 0 and the warning is recorded so that callers (and tests) can
/// check whether a run stayed on the golden path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// A symbol was evaluated without a binding in the variable assignment.
    UnboundSymbol { symbol: Symbol },
    /// No auxiliary state was provisioned for this (layer, wire, term) triple.
    MissingAuxiliaryState { layer: usize, wire: usize, term: String },
    /// A decrypted key bit was not in {0, 1} and was reduced mod 2.
    NonBinaryKeyBit { wire: usize, value: u64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnboundSymbol { symbol } => {
                write!(f, "symbol {} is unbound; defaulting to 0", symbol)
            }
            Warning::MissingAuxiliaryState { layer, wire, term } => {
                write!(
                    f,
                    "no auxiliary state for layer {}, wire {}, term {}; defaulting k to 0",
                    layer, wire, term
                )
            }
            Warning::NonBinaryKeyBit { wire, value } => {
                write!(f, "decrypted key bit {} on wire {} reduced mod 2", value, wire)
            }
        }
    }
}

/// Collected [Warning]s of one key-generation or evaluation pass.
///
/// Every warning is also mirrored through `log::warn!` as it is pushed, so
/// degraded runs stay visible without a debugger attached.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// True when no warning has been recorded.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Move all warnings of `other` into `self`.
    pub fn absorb(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }
}

/// Unrecoverable errors of the AUX-QHE pipeline.
///
/// These are the fatal tier of the error taxonomy: anything listed here
/// terminates the whole key-generation or evaluation call. Recoverable
/// conditions go through [Diagnostics] instead.
#[derive(Debug, thiserror::Error)]
pub enum AuxQheError {
    #[error("circuit has {circuit} qubits but the evaluation key was generated for {key}")]
    WireCountMismatch { circuit: usize, key: usize },
    #[error("expected {expected} encrypted key bits, got {got}")]
    KeyCountMismatch { expected: usize, got: usize },
    #[error("qubit {wire} needs T-layer {layer} but only {max_t_depth} layers were provisioned")]
    TDepthExceeded {
        wire: usize,
        layer: usize,
        max_t_depth: usize,
    },
}
