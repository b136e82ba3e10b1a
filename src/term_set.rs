use std::collections::HashMap;

use itertools::Itertools;

use crate::term::{Symbol, Term};

/// Positional handle of a [Term] within one layer's [TermSet].
///
/// The id is both the position in the ordered sequence and the key the
/// auxiliary-state map uses, so positional indexing (logging, size tables)
/// and by-content lookup (the evaluator resolving a polynomial addend) can
/// never disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct TermId(usize);

impl TermId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The ordered set of terms that can appear in any key polynomial at one
/// T-depth layer.
///
/// Built once per (num_qubits, max_t_depth) configuration at key-generation
/// time and read-only afterwards.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TermSet {
    terms: Vec<Term>,
    index: HashMap<String, TermId>,
}

impl TermSet {
    fn from_terms(terms: Vec<Term>) -> Self {
        let mut index = HashMap::with_capacity(terms.len());
        for (position, term) in terms.iter().enumerate() {
            // From layer 3 on, a cross product can reproduce an inherited
            // term's canonical form; the first occurrence wins so lookups
            // resolve to the inherited position.
            index.entry(term.canonical()).or_insert(TermId(position));
        }
        Self { terms, index }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, id: TermId) -> &Term {
        &self.terms[id.0]
    }

    /// Resolve a term by its canonical text form.
    pub fn id_of(&self, canonical: &str) -> Option<TermId> {
        self.index.get(canonical).copied()
    }

    /// Resolve a term structurally (via its canonical form).
    pub fn id_of_term(&self, term: &Term) -> Option<TermId> {
        self.id_of(&term.canonical())
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, &Term)> {
        self.terms
            .iter()
            .enumerate()
            .map(|(position, term)| (TermId(position), term))
    }
}

/// Builds the term sets `T[1..=max_t_depth]` for a circuit of `num_qubits`
/// qubits (layer ℓ is stored at index ℓ−1).
///
/// `T[1]` is the interleaved base alphabet `a0, b0, a1, b1, ...`. Each later
/// layer inherits the previous one in order, then appends every unordered
/// pairwise cross product `(t_i)*(t_j)` for `i < j` in row-major order, then
/// one fresh auxiliary variable `k_{wire}_{index}_L{ℓ−1}` per
/// (wire, previous-term) pair, wire-outer. Pure and deterministic; the size
/// recurrence is `|T[ℓ]| = |T[ℓ−1]| + C(|T[ℓ−1]|, 2) + n·|T[ℓ−1]|`, which
/// grows combinatorially — callers should check [total_aux_states] before
/// committing to a depth.
pub fn build_term_sets(num_qubits: usize, max_t_depth: usize) -> Vec<TermSet> {
    let mut sets: Vec<TermSet> = Vec::with_capacity(max_t_depth);
    if max_t_depth == 0 {
        return sets;
    }

    let mut base = Vec::with_capacity(2 * num_qubits);
    for i in 0..num_qubits {
        base.push(Term::var(Symbol::A(i)));
        base.push(Term::var(Symbol::B(i)));
    }
    sets.push(TermSet::from_terms(base));

    for layer in 2..=max_t_depth {
        let previous = sets.last().unwrap();
        let mut terms = previous.terms.clone();
        terms.extend(
            previous
                .terms
                .iter()
                .tuple_combinations()
                .map(|(t1, t2)| Term::cross(t1, t2)),
        );
        for wire in 0..num_qubits {
            for index in 0..previous.len() {
                terms.push(Term::var(Symbol::AuxKey {
                    wire,
                    index,
                    layer: layer - 1,
                }));
            }
        }
        sets.push(TermSet::from_terms(terms));
    }
    sets
}

/// Per-layer sizes `|T[ℓ]|`, in layer order.
pub fn layer_sizes(sets: &[TermSet]) -> Vec<usize> {
    sets.iter().map(|set| set.len()).collect()
}

/// Total number of auxiliary states a key generation will produce:
/// `Σ_ℓ num_qubits · |T[ℓ]|`.
pub fn total_aux_states(num_qubits: usize, sets: &[TermSet]) -> usize {
    sets.iter().map(|set| num_qubits * set.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_one_is_interleaved() {
        let sets = build_term_sets(3, 1);
        assert_eq!(sets.len(), 1);
        let canonical: Vec<String> = sets[0].terms().iter().map(Term::canonical).collect();
        assert_eq!(canonical, ["a0", "b0", "a1", "b1", "a2", "b2"]);
    }

    #[test]
    fn test_growth_law() {
        for num_qubits in 1..=3 {
            let sets = build_term_sets(num_qubits, 3);
            for layer in 1..sets.len() {
                let m = sets[layer - 1].len();
                let expected = m + m * (m - 1) / 2 + num_qubits * m;
                assert_eq!(
                    sets[layer].len(),
                    expected,
                    "n = {}, layer = {}",
                    num_qubits,
                    layer + 1
                );
            }
        }
    }

    #[test]
    fn test_layer_two_ordering() {
        let sets = build_term_sets(1, 2);
        let canonical: Vec<String> = sets[1].terms().iter().map(Term::canonical).collect();
        // Inherited terms first, then the single cross product, then one
        // fresh auxiliary variable per (wire, previous-term) pair.
        assert_eq!(
            canonical,
            ["a0", "b0", "(a0)*(b0)", "k_0_0_L1", "k_0_1_L1"]
        );
    }

    #[test]
    fn test_cross_products_are_row_major() {
        let sets = build_term_sets(2, 2);
        // T[1] = a0 b0 a1 b1; products must appear as (i, j) with i < j in
        // row-major order.
        let products: Vec<String> = sets[1]
            .terms()
            .iter()
            .filter(|term| matches!(term, Term::Product(_)))
            .map(Term::canonical)
            .collect();
        assert_eq!(
            products,
            [
                "(a0)*(b0)",
                "(a0)*(a1)",
                "(a0)*(b1)",
                "(b0)*(a1)",
                "(b0)*(b1)",
                "(a1)*(b1)",
            ]
        );
    }

    #[test]
    fn test_positional_and_string_lookup_agree() {
        let sets = build_term_sets(2, 2);
        for set in &sets {
            for (id, term) in set.iter() {
                assert_eq!(set.id_of(&term.canonical()), Some(id));
                assert_eq!(set.get(id), term);
            }
        }
    }

    #[test]
    fn test_total_aux_states_formula() {
        let num_qubits = 2;
        let sets = build_term_sets(num_qubits, 3);
        let expected: usize = layer_sizes(&sets).iter().map(|size| num_qubits * size).sum();
        assert_eq!(total_aux_states(num_qubits, &sets), expected);
    }

    #[test]
    fn test_zero_depth_is_empty() {
        assert!(build_term_sets(4, 0).is_empty());
    }
}
