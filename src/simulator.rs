use num_complex::Complex64;

use crate::circuit::{Gate, QuantumCircuit};

const FRAC_1_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// A dense statevector over `2^num_qubits` amplitudes.
///
/// Qubit `q` corresponds to bit `q` of the basis-state index. This is a
/// plain reference simulator for round-trip checks and the demo binary; it
/// makes no attempt at being fast beyond avoiding allocations per gate.
#[derive(Clone, Debug)]
pub struct Statevector {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl Statevector {
    /// The all-zeros computational basis state `|0...0⟩`.
    pub fn zero_state(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            num_qubits,
            amplitudes,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    fn apply_single(&mut self, q: usize, m00: Complex64, m01: Complex64, m10: Complex64, m11: Complex64) {
        let mask = 1usize << q;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let a = self.amplitudes[i];
                let b = self.amplitudes[i | mask];
                self.amplitudes[i] = m00 * a + m01 * b;
                self.amplitudes[i | mask] = m10 * a + m11 * b;
            }
        }
    }

    pub fn apply_gate(&mut self, gate: &Gate) {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        match gate {
            Gate::H(q) => {
                let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
                self.apply_single(*q, h, h, h, -h);
            }
            Gate::X(q) => self.apply_single(*q, zero, one, one, zero),
            Gate::Z(q) => self.apply_single(*q, one, zero, zero, -one),
            Gate::P(q) => self.apply_single(*q, one, zero, zero, Complex64::new(0.0, 1.0)),
            Gate::T(q) => self.apply_single(
                *q,
                one,
                zero,
                zero,
                Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4),
            ),
            Gate::Cnot(c, t) => {
                let control = 1usize << c;
                let target = 1usize << t;
                for i in 0..self.amplitudes.len() {
                    if i & control != 0 && i & target == 0 {
                        self.amplitudes.swap(i, i | target);
                    }
                }
            }
        }
    }

    pub fn apply_circuit(&mut self, circuit: &QuantumCircuit) {
        if circuit.num_qubits() != self.num_qubits {
            panic!("[Invalid argument] Circuit width does not match the statevector.");
        }
        for gate in circuit.gates() {
            self.apply_gate(gate);
        }
    }

    /// Run `circuit` on `|0...0⟩` and return the resulting state.
    pub fn run(circuit: &QuantumCircuit) -> Self {
        let mut state = Self::zero_state(circuit.num_qubits());
        state.apply_circuit(circuit);
        state
    }

    /// `|⟨self|other⟩|²` — 1.0 iff the states agree up to a global phase.
    pub fn fidelity(&self, other: &Statevector) -> f64 {
        assert_eq!(self.num_qubits, other.num_qubits);
        let inner: Complex64 = self
            .amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum();
        inner.norm_sqr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-10, "{} != {}", a, b);
    }

    #[test]
    fn test_double_hadamard_is_identity() {
        let mut circuit = QuantumCircuit::new(1);
        circuit.h(0).h(0);
        let state = Statevector::run(&circuit);
        assert_close(state.fidelity(&Statevector::zero_state(1)), 1.0);
    }

    #[test]
    fn test_bell_state() {
        let mut circuit = QuantumCircuit::new(2);
        circuit.h(0).cnot(0, 1);
        let state = Statevector::run(&circuit);
        let amplitudes = state.amplitudes();
        assert_close(amplitudes[0b00].re, FRAC_1_SQRT_2);
        assert_close(amplitudes[0b11].re, FRAC_1_SQRT_2);
        assert_close(amplitudes[0b01].norm_sqr(), 0.0);
        assert_close(amplitudes[0b10].norm_sqr(), 0.0);
    }

    #[test]
    fn test_fidelity_ignores_global_phase() {
        let mut plain = QuantumCircuit::new(1);
        plain.h(0);
        // Z X Z X = -I, a pure global phase.
        let mut phased = QuantumCircuit::new(1);
        phased.h(0).z(0).x(0).z(0).x(0);
        let a = Statevector::run(&plain);
        let b = Statevector::run(&phased);
        assert_close(a.fidelity(&b), 1.0);
    }

    #[test]
    fn test_two_t_gates_make_a_phase() {
        // T² = P on |+⟩.
        let mut with_t = QuantumCircuit::new(1);
        with_t.h(0).t(0).t(0);
        let mut with_p = QuantumCircuit::new(1);
        with_p.h(0).p(0);
        let a = Statevector::run(&with_t);
        let b = Statevector::run(&with_p);
        assert_close(a.fidelity(&b), 1.0);
    }
}
