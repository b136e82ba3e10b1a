use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::diagnostics::Diagnostics;
use crate::hashing::{self, HashBlock, HASH_ZERO_BLOCK};
use crate::term::{Symbol, Term, VariableAssignment};
use crate::term_set::{self, TermId, TermSet};

/// The recipe for preparing one auxiliary qubit: `Z^z · P^p · H|0⟩`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StatePrep {
    z_power: u8,
    p_power: u8,
}

impl StatePrep {
    pub fn new(z_power: u8, p_power: u8) -> Self {
        Self {
            z_power: z_power & 1,
            p_power: p_power & 1,
        }
    }

    pub fn z_power(&self) -> u8 {
        self.z_power
    }

    pub fn p_power(&self) -> u8 {
        self.p_power
    }
}

/// A pre-generated one-qubit auxiliary state for one (layer, wire, term)
/// triple.
///
/// `s` is the term's value under the initial key assignment; `k` is the
/// state's own secret mask bit, a pure function of the index triple and of
/// nothing else. Auxiliary states are created during key generation, never
/// mutated, and consumed (read) once per T-gadget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuxiliaryState {
    recipe: StatePrep,
    s: u8,
    k: u8,
}

impl AuxiliaryState {
    pub fn recipe(&self) -> &StatePrep {
        &self.recipe
    }

    pub fn s(&self) -> u8 {
        self.s
    }

    pub fn k(&self) -> u8 {
        self.k
    }
}

/// The key the client keeps: the initial QOTP bits and the per-state secret
/// mask bits.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AuxSecretKey {
    a: Vec<u8>,
    b: Vec<u8>,
    gadget_k: HashMap<(usize, usize, TermId), u8>,
}

impl AuxSecretKey {
    pub fn a(&self) -> &[u8] {
        &self.a
    }

    pub fn b(&self) -> &[u8] {
        &self.b
    }

    /// The secret k bit of the auxiliary state at (layer, wire, term).
    pub fn gadget_k(&self, layer: usize, wire: usize, term: TermId) -> Option<u8> {
        self.gadget_k.get(&(layer, wire, term)).copied()
    }

    pub fn gadget_k_count(&self) -> usize {
        self.gadget_k.len()
    }
}

/// The material the evaluator works with: term sets, the auxiliary-state
/// map, and the variable assignment seeded at key-generation time.
///
/// In this prototype the assignment carries the concrete key bits through
/// the evaluation (the same bookkeeping the reference protocol threads
/// through its gadget handling); hiding it behind a second encryption layer
/// is outside the scope of the scheme's core.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AuxEvalKey {
    num_qubits: usize,
    max_t_depth: usize,
    term_sets: Vec<TermSet>,
    aux_states: HashMap<(usize, usize, TermId), AuxiliaryState>,
    initial_assignment: VariableAssignment,
}

impl AuxEvalKey {
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn max_t_depth(&self) -> usize {
        self.max_t_depth
    }

    /// Term set of layer ℓ (1-based).
    pub fn term_set(&self, layer: usize) -> Option<&TermSet> {
        if layer == 0 {
            return None;
        }
        self.term_sets.get(layer - 1)
    }

    pub fn term_sets(&self) -> &[TermSet] {
        &self.term_sets
    }

    pub fn aux_state(&self, layer: usize, wire: usize, term: TermId) -> Option<&AuxiliaryState> {
        self.aux_states.get(&(layer, wire, term))
    }

    pub fn aux_state_count(&self) -> usize {
        self.aux_states.len()
    }

    pub fn initial_assignment(&self) -> &VariableAssignment {
        &self.initial_assignment
    }
}

/// Everything `aux_keygen` produces.
#[derive(Clone, Debug)]
pub struct AuxKeyGen {
    pub secret_key: AuxSecretKey,
    pub eval_key: AuxEvalKey,
    pub prep_time: Duration,
    pub layer_sizes: Vec<usize>,
    pub total_aux_states: usize,
}

fn validate_init(init: &[u8], num_qubits: usize, which: &str) {
    if init.len() != num_qubits {
        panic!(
            "[Invalid argument] {} init must have {} bits, got {}.",
            which,
            num_qubits,
            init.len()
        );
    }
    if init.iter().any(|bit| *bit > 1) {
        panic!("[Invalid argument] {} init must consist of bits.", which);
    }
}

/// Digest of the full key-generation configuration, in the same spirit as a
/// parameter id: two runs share a signature iff they share
/// (num_qubits, max_t_depth, a_init, b_init).
fn config_signature(num_qubits: usize, max_t_depth: usize, a: &[u8], b: &[u8]) -> HashBlock {
    let mut input = Vec::with_capacity(2 + a.len() + b.len());
    input.push(num_qubits as u64);
    input.push(max_t_depth as u64);
    input.extend(a.iter().map(|bit| *bit as u64));
    input.extend(b.iter().map(|bit| *bit as u64));
    let mut signature = HASH_ZERO_BLOCK;
    hashing::hash(&input, &mut signature);
    signature
}

/// The secret mask bit of the auxiliary state at (layer, wire, term).
///
/// Deliberately a pure function of the index triple — independent of the
/// qubit count and of the key assignment — so the same state keeps the same
/// mask across different key draws (needed for cross-run comparability).
pub fn derive_aux_k(layer: usize, wire: usize, canonical_term: &str) -> u8 {
    hashing::derive_bit(format!("aux_{}_{}_{}", layer, wire, canonical_term).as_bytes())
}

/// Generates the full auxiliary key material for a circuit of `num_qubits`
/// qubits and up to `max_t_depth` T-gates per qubit.
///
/// When `a_init`/`b_init` are absent, `num_qubits` uniform bits are drawn
/// for each. Key generation is all-or-nothing: it either returns a complete
/// [AuxKeyGen] or panics on a malformed configuration. For fixed inputs the
/// output is bit-identical across runs.
///
/// The auxiliary-state count grows combinatorially with `max_t_depth`
/// (`T-depth ≥ 4` reaches tens of millions of states for a handful of
/// qubits); use [crate::build_term_sets] and [crate::total_aux_states] to
/// pre-check feasibility.
pub fn aux_keygen(
    num_qubits: usize,
    max_t_depth: usize,
    a_init: Option<Vec<u8>>,
    b_init: Option<Vec<u8>>,
) -> AuxKeyGen {
    if num_qubits == 0 {
        panic!("[Invalid argument] Qubit count must be positive.");
    }
    let start = Instant::now();

    let mut rng = ChaCha20Rng::from_entropy();
    let mut sample_bits = |init: Option<Vec<u8>>, which: &str| -> Vec<u8> {
        match init {
            Some(bits) => {
                validate_init(&bits, num_qubits, which);
                bits
            }
            None => (0..num_qubits).map(|_| rng.gen_range(0..=1u8)).collect(),
        }
    };
    let a = sample_bits(a_init, "a");
    let b = sample_bits(b_init, "b");

    let term_sets = term_set::build_term_sets(num_qubits, max_t_depth);
    let layer_sizes = term_set::layer_sizes(&term_sets);
    let total = term_set::total_aux_states(num_qubits, &term_sets);

    // Seed the assignment with the base key bits, then pre-derive every
    // auxiliary key variable the term sets introduce, keyed by the config
    // signature so identical configurations reproduce identical bits.
    let signature = config_signature(num_qubits, max_t_depth, &a, &b);
    let mut assignment = VariableAssignment::new();
    for (i, (a_bit, b_bit)) in a.iter().zip(b.iter()).enumerate() {
        assignment.bind(Symbol::A(i), *a_bit);
        assignment.bind(Symbol::B(i), *b_bit);
    }
    for set in &term_sets {
        for (_, term) in set.iter() {
            if let Term::Var(symbol @ Symbol::AuxKey { .. }) = term {
                if !assignment.contains(symbol) {
                    assignment.bind(*symbol, hashing::derive_bit_keyed(&signature, &symbol.to_string()));
                }
            }
        }
    }

    let mut aux_states = HashMap::with_capacity(total);
    let mut gadget_k = HashMap::with_capacity(total);
    let mut diagnostics = Diagnostics::new();
    for (layer_index, set) in term_sets.iter().enumerate() {
        let layer = layer_index + 1;
        log::debug!("layer {}: {} terms, {} states", layer, set.len(), num_qubits * set.len());
        for wire in 0..num_qubits {
            for (id, term) in set.iter() {
                let s = term.evaluate(&assignment, &mut diagnostics);
                let k = derive_aux_k(layer, wire, &term.canonical());
                aux_states.insert(
                    (layer, wire, id),
                    AuxiliaryState {
                        recipe: StatePrep::new(k, s),
                        s,
                        k,
                    },
                );
                gadget_k.insert((layer, wire, id), k);
            }
        }
    }
    // Every term-set symbol is bound above, so a warning here means the
    // construction itself is inconsistent.
    debug_assert!(diagnostics.is_clean());

    AuxKeyGen {
        secret_key: AuxSecretKey { a, b, gadget_k },
        eval_key: AuxEvalKey {
            num_qubits,
            max_t_depth,
            term_sets,
            aux_states,
            initial_assignment: assignment,
        },
        prep_time: start.elapsed(),
        layer_sizes,
        total_aux_states: total,
    }
}
