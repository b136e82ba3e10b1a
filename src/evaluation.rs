use std::collections::HashSet;

use crate::bfv::{BfvEncoder, BfvEncryptor, Ciphertext};
use crate::circuit::{Gate, QuantumCircuit};
use crate::diagnostics::{AuxQheError, Diagnostics, Warning};
use crate::keygen::{AuxEvalKey, StatePrep};
use crate::term::{KeyPolynomial, Symbol, Term, VariableAssignment};

/// One evaluation pass over one encrypted circuit.
///
/// The session owns every piece of mutable evaluation state: the per-qubit
/// key polynomials `f_a`/`f_b`, the variable assignment, the per-qubit
/// T-layer counters (each qubit counts its *own* T-gates), the gate-position
/// guard and the collected diagnostics. Nothing here is shared — evaluating
/// two circuits concurrently requires two sessions (and the evaluation key
/// is only read).
///
/// ## T-gadget measurement modeling
///
/// The gadget "measurement outcome" `c` is set equal to the consumed
/// auxiliary state's `k` bit instead of being sampled from an actual
/// mid-circuit measurement. This is a deliberate modeling simplification
/// carried over from the reference protocol — the `f_b` update formula
/// below is only correct together with it. A hardware-faithful
/// implementation would sample `c` and revisit the update rules.
pub struct EvaluationSession<'k> {
    eval_key: &'k AuxEvalKey,
    f_a: Vec<KeyPolynomial>,
    f_b: Vec<KeyPolynomial>,
    assignment: VariableAssignment,
    qubit_t_layers: Vec<usize>,
    applied: HashSet<usize>,
    consumed: Vec<(usize, usize, StatePrep)>,
    diagnostics: Diagnostics,
    output: QuantumCircuit,
}

impl<'k> EvaluationSession<'k> {
    /// Starts a session for a `num_qubits`-wide encrypted circuit.
    ///
    /// The polynomials start as the trivial monomials `a{i}`/`b{i}` and the
    /// assignment is seeded from the evaluation key.
    pub fn new(eval_key: &'k AuxEvalKey, num_qubits: usize) -> Result<Self, AuxQheError> {
        if num_qubits != eval_key.num_qubits() {
            return Err(AuxQheError::WireCountMismatch {
                circuit: num_qubits,
                key: eval_key.num_qubits(),
            });
        }
        Ok(Self {
            eval_key,
            f_a: (0..num_qubits).map(|i| KeyPolynomial::monomial(Symbol::A(i))).collect(),
            f_b: (0..num_qubits).map(|i| KeyPolynomial::monomial(Symbol::B(i))).collect(),
            assignment: eval_key.initial_assignment().clone(),
            qubit_t_layers: vec![0; num_qubits],
            applied: HashSet::new(),
            consumed: Vec::new(),
            diagnostics: Diagnostics::new(),
            output: QuantumCircuit::new(num_qubits),
        })
    }

    pub fn f_a(&self, wire: usize) -> &KeyPolynomial {
        &self.f_a[wire]
    }

    pub fn f_b(&self, wire: usize) -> &KeyPolynomial {
        &self.f_b[wire]
    }

    pub fn assignment(&self) -> &VariableAssignment {
        &self.assignment
    }

    pub fn t_layer(&self, wire: usize) -> usize {
        self.qubit_t_layers[wire]
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn output(&self) -> &QuantumCircuit {
        &self.output
    }

    /// Recipes of the auxiliary states consumed so far, as
    /// (wire, layer, recipe) in consumption order.
    pub fn consumed_states(&self) -> &[(usize, usize, StatePrep)] {
        &self.consumed
    }

    /// Processes one gate identified by its position in the input gate list.
    ///
    /// A position that was already recorded is skipped entirely — the guard
    /// makes re-processing a no-op rather than corrupting the polynomial
    /// state.
    pub fn process_gate(&mut self, position: usize, gate: &Gate) -> Result<(), AuxQheError> {
        if !self.applied.insert(position) {
            return Ok(());
        }
        match *gate {
            Gate::H(q) => {
                self.output.add_gate(Gate::H(q));
                std::mem::swap(&mut self.f_a[q], &mut self.f_b[q]);
            }
            Gate::X(q) => {
                self.output.add_gate(Gate::X(q));
            }
            Gate::Z(q) => {
                self.output.add_gate(Gate::Z(q));
            }
            Gate::P(q) => {
                self.output.add_gate(Gate::P(q));
                let f_a = self.f_a[q].clone();
                self.f_b[q].xor_polynomial(&f_a);
            }
            Gate::Cnot(control, target) => {
                self.output.add_gate(Gate::Cnot(control, target));
                let f_b_target = self.f_b[target].clone();
                self.f_b[control].xor_polynomial(&f_b_target);
                let f_a_control = self.f_a[control].clone();
                self.f_a[target].xor_polynomial(&f_a_control);
            }
            Gate::T(q) => self.apply_t_gadget(q)?,
        }
        Ok(())
    }

    /// The T-gadget: consume an auxiliary state, emit the physical T gate,
    /// bind the gadget outcome and mask, and extend both polynomials.
    fn apply_t_gadget(&mut self, wire: usize) -> Result<(), AuxQheError> {
        let layer = self.qubit_t_layers[wire] + 1;
        if layer > self.eval_key.max_t_depth() {
            return Err(AuxQheError::TDepthExceeded {
                wire,
                layer,
                max_t_depth: self.eval_key.max_t_depth(),
            });
        }

        let f_a_before = self.f_a[wire].clone();
        let f_b_before = self.f_b[wire].clone();

        let (aux_k, recipe) = match f_a_before.single_addend() {
            Some(term) => self.lookup_aux_state(layer, wire, term),
            None => {
                let k = self.combine_addend_masks(layer, wire, f_a_before.addends());
                // No single pre-generated state matches a multi-term
                // polynomial; synthesize the recipe for the combined mask.
                (k, StatePrep::new(k, 0))
            }
        };
        self.consumed.push((wire, layer, recipe));

        self.output.add_gate(Gate::T(wire));

        // Modeling simplification: the gadget measurement outcome is the
        // state's mask bit (see the type-level doc).
        let c = aux_k;
        let c_symbol = Symbol::GadgetC { wire, layer };
        let k_symbol = Symbol::GadgetK { wire, layer };
        self.assignment.bind(c_symbol, c);
        self.assignment.bind(k_symbol, aux_k);

        // f_a gains the outcome symbol unconditionally, even for c = 0: the
        // polynomial shape records every gadget that was applied.
        self.f_a[wire].xor_term(Term::var(c_symbol));

        // f_b := f_a ⊕ f_b ⊕ k ⊕ (c · f_a), with the prior addends
        // re-inserted flat and the cross term present only when c = 1.
        let mut addends = f_a_before.addends().to_vec();
        addends.extend(f_b_before.addends().iter().cloned());
        addends.push(Term::var(k_symbol));
        if c == 1 {
            addends.extend(f_a_before.addends().iter().cloned());
        }
        self.f_b[wire] = KeyPolynomial::from_addends(addends);

        self.qubit_t_layers[wire] = layer;
        Ok(())
    }

    /// Direct lookup of the auxiliary state for a single-term `f_a`.
    /// A miss degrades to mask 0 with a warning; it never aborts.
    fn lookup_aux_state(&mut self, layer: usize, wire: usize, term: &Term) -> (u8, StatePrep) {
        let state = self
            .eval_key
            .term_set(layer)
            .and_then(|set| set.id_of_term(term))
            .and_then(|id| self.eval_key.aux_state(layer, wire, id));
        match state {
            Some(state) => (state.k(), *state.recipe()),
            None => {
                self.diagnostics.push(Warning::MissingAuxiliaryState {
                    layer,
                    wire,
                    term: term.canonical(),
                });
                (0, StatePrep::new(0, 0))
            }
        }
    }

    /// Combined mask for a multi-term `f_a`: XOR of each addend's
    /// contribution. Base variables contribute the layer-1 state mask of
    /// this wire; gadget and auxiliary key variables contribute their bound
    /// value; composite terms fall back to a lookup at the current layer.
    fn combine_addend_masks(&mut self, layer: usize, wire: usize, addends: &[Term]) -> u8 {
        let mut mask = 0u8;
        for addend in addends {
            let contribution = match addend {
                Term::Var(symbol @ (Symbol::A(_) | Symbol::B(_))) => {
                    let state = self
                        .eval_key
                        .term_set(1)
                        .and_then(|set| set.id_of(&symbol.to_string()))
                        .and_then(|id| self.eval_key.aux_state(1, wire, id));
                    match state {
                        Some(state) => state.k(),
                        None => {
                            self.diagnostics.push(Warning::MissingAuxiliaryState {
                                layer: 1,
                                wire,
                                term: symbol.to_string(),
                            });
                            0
                        }
                    }
                }
                Term::Var(symbol) => match self.assignment.get(symbol) {
                    Some(bit) => bit,
                    None => {
                        self.diagnostics.push(Warning::UnboundSymbol { symbol: *symbol });
                        0
                    }
                },
                composite => {
                    let state = self
                        .eval_key
                        .term_set(layer)
                        .and_then(|set| set.id_of_term(composite))
                        .and_then(|id| self.eval_key.aux_state(layer, wire, id));
                    match state {
                        Some(state) => state.k(),
                        None => {
                            self.diagnostics.push(Warning::MissingAuxiliaryState {
                                layer,
                                wire,
                                term: composite.canonical(),
                            });
                            0
                        }
                    }
                }
            };
            mask ^= contribution;
        }
        mask
    }

    /// Evaluates the final polynomials and encrypts the resulting bits.
    ///
    /// Degradations (unbound symbols) stay per-qubit: the affected
    /// contribution defaults to 0 and the batch always completes.
    pub fn finish(
        mut self,
        encoder: &BfvEncoder,
        encryptor: &BfvEncryptor,
    ) -> AuxEvalOutput {
        let mut final_enc_a = Vec::with_capacity(self.f_a.len());
        let mut final_enc_b = Vec::with_capacity(self.f_b.len());
        for (f_a, f_b) in self.f_a.iter().zip(self.f_b.iter()) {
            let a_bit = f_a.evaluate(&self.assignment, &mut self.diagnostics);
            let b_bit = f_b.evaluate(&self.assignment, &mut self.diagnostics);
            final_enc_a.push(encryptor.encrypt(&encoder.encode_bit(a_bit)));
            final_enc_b.push(encryptor.encrypt(&encoder.encode_bit(b_bit)));
        }
        AuxEvalOutput {
            circuit: self.output,
            final_enc_a,
            final_enc_b,
            diagnostics: self.diagnostics,
        }
    }
}

/// Result of [aux_eval]: the physically executed circuit, the encrypted
/// final decoding keys, and everything the run warned about.
pub struct AuxEvalOutput {
    pub circuit: QuantumCircuit,
    pub final_enc_a: Vec<Ciphertext>,
    pub final_enc_b: Vec<Ciphertext>,
    pub diagnostics: Diagnostics,
}

/// Walks an encrypted circuit gate by gate, tracking the key polynomials
/// through every gate and consuming one auxiliary state per T-gate, then
/// evaluates the final polynomials under encryption.
///
/// Gates are processed in the circuit's greedy parallel layers; gates within
/// a layer touch disjoint qubits, so the emitted order is equivalent to the
/// input order. The input `enc_a`/`enc_b` vectors are validated against the
/// circuit width; the *final* keys are produced fresh from the polynomial
/// evaluation.
///
/// Returns an error only for configuration-level problems (wire or key
/// count mismatch, exhausted T-depth); per-term lookup misses degrade into
/// [Diagnostics] warnings instead.
pub fn aux_eval(
    encrypted_circuit: &QuantumCircuit,
    enc_a: &[Ciphertext],
    enc_b: &[Ciphertext],
    eval_key: &AuxEvalKey,
    encoder: &BfvEncoder,
    encryptor: &BfvEncryptor,
) -> Result<AuxEvalOutput, AuxQheError> {
    let num_qubits = encrypted_circuit.num_qubits();
    if enc_a.len() != num_qubits || enc_b.len() != num_qubits {
        return Err(AuxQheError::KeyCountMismatch {
            expected: num_qubits,
            got: enc_a.len().min(enc_b.len()),
        });
    }

    let mut session = EvaluationSession::new(eval_key, num_qubits)?;
    let gates = encrypted_circuit.gates();
    for layer in encrypted_circuit.parallel_layers() {
        for position in layer {
            session.process_gate(position, &gates[position])?;
        }
    }
    Ok(session.finish(encoder, encryptor))
}
