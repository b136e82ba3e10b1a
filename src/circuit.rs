use std::fmt;

/// A gate of the supported Clifford+T set.
///
/// `P` is the phase gate (diag(1, i)); `Cnot(control, target)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Gate {
    H(usize),
    X(usize),
    Z(usize),
    P(usize),
    T(usize),
    Cnot(usize, usize),
}

impl Gate {
    /// The qubits the gate touches, target-last for two-qubit gates.
    pub fn qubits(&self) -> (usize, Option<usize>) {
        match self {
            Gate::H(q) | Gate::X(q) | Gate::Z(q) | Gate::P(q) | Gate::T(q) => (*q, None),
            Gate::Cnot(c, t) => (*c, Some(*t)),
        }
    }

    pub fn is_single_qubit(&self) -> bool {
        !matches!(self, Gate::Cnot(_, _))
    }

    /// The same gate acting `offset` wires higher.
    pub fn shifted(&self, offset: usize) -> Gate {
        match self {
            Gate::H(q) => Gate::H(q + offset),
            Gate::X(q) => Gate::X(q + offset),
            Gate::Z(q) => Gate::Z(q + offset),
            Gate::P(q) => Gate::P(q + offset),
            Gate::T(q) => Gate::T(q + offset),
            Gate::Cnot(c, t) => Gate::Cnot(c + offset, t + offset),
        }
    }

    fn max_qubit(&self) -> usize {
        match self.qubits() {
            (q, None) => q,
            (c, Some(t)) => c.max(t),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::H(q) => write!(f, "H({})", q),
            Gate::X(q) => write!(f, "X({})", q),
            Gate::Z(q) => write!(f, "Z({})", q),
            Gate::P(q) => write!(f, "P({})", q),
            Gate::T(q) => write!(f, "T({})", q),
            Gate::Cnot(c, t) => write!(f, "CX({},{})", c, t),
        }
    }
}

/// An ordered gate list over a fixed-width qubit register.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuantumCircuit {
    num_qubits: usize,
    gates: Vec<Gate>,
}

impl QuantumCircuit {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Append a gate. Panics if the gate addresses a wire outside the
    /// register.
    pub fn add_gate(&mut self, gate: Gate) -> &mut Self {
        if gate.max_qubit() >= self.num_qubits {
            panic!(
                "[Invalid argument] Gate {} addresses a qubit outside the {}-wide register.",
                gate, self.num_qubits
            );
        }
        if let Gate::Cnot(c, t) = gate {
            if c == t {
                panic!("[Invalid argument] CNOT control and target must differ.");
            }
        }
        self.gates.push(gate);
        self
    }

    pub fn h(&mut self, q: usize) -> &mut Self {
        self.add_gate(Gate::H(q))
    }

    pub fn x(&mut self, q: usize) -> &mut Self {
        self.add_gate(Gate::X(q))
    }

    pub fn z(&mut self, q: usize) -> &mut Self {
        self.add_gate(Gate::Z(q))
    }

    pub fn p(&mut self, q: usize) -> &mut Self {
        self.add_gate(Gate::P(q))
    }

    pub fn t(&mut self, q: usize) -> &mut Self {
        self.add_gate(Gate::T(q))
    }

    pub fn cnot(&mut self, control: usize, target: usize) -> &mut Self {
        self.add_gate(Gate::Cnot(control, target))
    }

    /// The same circuit embedded into a `new_num_qubits`-wide register with
    /// every gate shifted up by `offset`.
    pub fn shifted(&self, offset: usize, new_num_qubits: usize) -> QuantumCircuit {
        if offset + self.num_qubits > new_num_qubits {
            panic!("[Invalid argument] Shifted circuit does not fit the target register.");
        }
        let mut shifted = QuantumCircuit::new(new_num_qubits);
        for gate in &self.gates {
            shifted.add_gate(gate.shifted(offset));
        }
        shifted
    }

    /// Groups gate positions into parallel layers, greedily: each gate goes
    /// into the earliest layer in which none of its qubits is already busy.
    /// Returned layers hold indices into [Self::gates], preserving the
    /// original order within a layer.
    pub fn parallel_layers(&self) -> Vec<Vec<usize>> {
        let mut layers: Vec<Vec<usize>> = Vec::new();
        let mut next_free = vec![0usize; self.num_qubits];
        for (position, gate) in self.gates.iter().enumerate() {
            let layer = match gate.qubits() {
                (q, None) => next_free[q],
                (c, Some(t)) => next_free[c].max(next_free[t]),
            };
            if layer == layers.len() {
                layers.push(Vec::new());
            }
            layers[layer].push(position);
            match gate.qubits() {
                (q, None) => next_free[q] = layer + 1,
                (c, Some(t)) => {
                    next_free[c] = layer + 1;
                    next_free[t] = layer + 1;
                }
            }
        }
        layers
    }

    /// Per-qubit T-gate counts; the maximum is the T-depth the key
    /// generation has to provision for this circuit.
    pub fn t_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.num_qubits];
        for gate in &self.gates {
            if let Gate::T(q) = gate {
                counts[*q] += 1;
            }
        }
        counts
    }

    /// The largest per-qubit T count of the circuit.
    pub fn required_t_depth(&self) -> usize {
        self.t_counts().into_iter().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_shift() {
        let mut circuit = QuantumCircuit::new(2);
        circuit.h(0).cnot(0, 1).t(1);
        assert_eq!(circuit.gates(), &[Gate::H(0), Gate::Cnot(0, 1), Gate::T(1)]);

        let shifted = circuit.shifted(2, 4);
        assert_eq!(shifted.num_qubits(), 4);
        assert_eq!(shifted.gates(), &[Gate::H(2), Gate::Cnot(2, 3), Gate::T(3)]);
    }

    #[test]
    #[should_panic(expected = "[Invalid argument]")]
    fn test_out_of_range_gate_panics() {
        let mut circuit = QuantumCircuit::new(1);
        circuit.x(1);
    }

    #[test]
    fn test_parallel_layers_group_disjoint_gates() {
        let mut circuit = QuantumCircuit::new(3);
        circuit.h(0).h(1).cnot(0, 1).t(2).z(0);
        let layers = circuit.parallel_layers();
        // H(0), H(1) and T(2) are disjoint; CX(0,1) must wait for both
        // Hadamards; Z(0) must wait for the CNOT.
        assert_eq!(layers, vec![vec![0, 1, 3], vec![2], vec![4]]);
    }

    #[test]
    fn test_sequential_gates_stay_ordered() {
        let mut circuit = QuantumCircuit::new(1);
        circuit.h(0).h(0);
        assert_eq!(circuit.parallel_layers(), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_t_depth_is_per_qubit() {
        let mut circuit = QuantumCircuit::new(2);
        circuit.t(0).t(0).t(1);
        assert_eq!(circuit.t_counts(), vec![2, 1]);
        assert_eq!(circuit.required_t_depth(), 2);
    }
}
