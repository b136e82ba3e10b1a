//! AUX-QHE: auxiliary-based quantum homomorphic encryption, prototype core.
//!
//! Combines a classical homomorphic bit oracle (a mock BFV stand-in, see
//! [BfvContext]) with a quantum one-time pad and T-gadgets so that a
//! circuit containing non-Clifford T gates can be evaluated on padded qubits
//! without the evaluator learning the pad. The heart of the crate is the
//! key-polynomial tracking machinery: as gates are processed, each qubit's
//! decryption keys evolve into XOR-polynomials over a growing vocabulary of
//! binary variables, and every T-gate consumes one pre-generated auxiliary
//! state chosen by the current polynomial.
//!
//! Pipeline:
//!
//! 1. [aux_keygen] — build the layered term sets and the auxiliary-state
//!    population for a (qubits, T-depth) configuration.
//! 2. [qotp_encrypt] — pad the circuit with `X^a Z^b` and encrypt the key
//!    bits through the oracle.
//! 3. [aux_eval] — walk the padded circuit, evolving the key polynomials
//!    and consuming auxiliary states at T-gates, then evaluate and
//!    re-encrypt the final keys.
//! 4. [qotp_decrypt] — decrypt the final key bits and strip the evolved pad.
//!
//! ```rust
//! use auxqhe::*;
//!
//! let context = BfvContext::new(BfvParams::new().set_poly_degree(16).set_plain_modulus(257));
//! let oracle_keys = BfvKeyGenerator::new(context.clone());
//! let encoder = BfvEncoder::new(context.clone());
//! let encryptor = BfvEncryptor::new(context.clone(), oracle_keys.secret_key().clone());
//! let decryptor = BfvDecryptor::new(context.clone(), oracle_keys.secret_key().clone());
//!
//! let keys = aux_keygen(2, 1, Some(vec![1, 0]), Some(vec![0, 1]));
//! let mut circuit = QuantumCircuit::new(2);
//! circuit.h(0).cnot(0, 1).t(1);
//!
//! let (encrypted, _, enc_a, enc_b) = qotp_encrypt(
//!     &circuit, keys.secret_key.a(), keys.secret_key.b(), 0, 2, &encoder, &encryptor,
//! ).unwrap();
//! let evaluated = aux_eval(&encrypted, &enc_a, &enc_b, &keys.eval_key, &encoder, &encryptor)
//!     .unwrap();
//! let mut diagnostics = Diagnostics::new();
//! let decrypted = qotp_decrypt(
//!     &evaluated.circuit, &evaluated.final_enc_a, &evaluated.final_enc_b,
//!     &encoder, &decryptor, &mut diagnostics,
//! );
//! assert!(evaluated.diagnostics.is_clean());
//! assert!(!decrypted.is_empty());
//! ```
//!
//! The whole crate is single-threaded per evaluation: one
//! [EvaluationSession] owns all mutable state of one pass, and key material
//! is read-only after generation. Auxiliary-state counts explode
//! combinatorially with T-depth (4 and up means tens of millions of
//! states); check [total_aux_states] before committing to a configuration.

mod bfv;
pub use bfv::{
    BfvContext, BfvDecryptor, BfvEncoder, BfvEncryptor, BfvEvaluator, BfvKeyGenerator, BfvParams,
    BfvSecretKey, Ciphertext, Plaintext,
};

mod circuit;
pub use circuit::{Gate, QuantumCircuit};

mod diagnostics;
pub use diagnostics::{AuxQheError, Diagnostics, Warning};

mod evaluation;
pub use evaluation::{aux_eval, AuxEvalOutput, EvaluationSession};

mod hashing;

mod keygen;
pub use keygen::{
    aux_keygen, derive_aux_k, AuxEvalKey, AuxKeyGen, AuxSecretKey, AuxiliaryState, StatePrep,
};

mod qotp;
pub use qotp::{qotp_decrypt, qotp_encrypt};

mod simulator;
pub use simulator::Statevector;

mod term;
pub use term::{KeyPolynomial, Symbol, Term, VariableAssignment};

mod term_set;
pub use term_set::{build_term_sets, layer_sizes, total_aux_states, TermId, TermSet};
