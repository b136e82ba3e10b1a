use std::collections::HashMap;
use std::fmt;

use crate::diagnostics::{Diagnostics, Warning};

/// A named binary variable of the key-polynomial vocabulary.
///
/// The canonical text form (via [fmt::Display]) is what auxiliary-state
/// derivation hashes and what term-set lookups key on, so it must stay
/// stable across versions:
///
/// - `A(i)` → `a{i}`, `B(i)` → `b{i}` — the initial QOTP key bits.
/// - `AuxKey { wire, index, layer }` → `k_{wire}_{index}_L{layer}` — a fresh
///   auxiliary key variable introduced when building term sets past layer 1.
/// - `GadgetC { wire, layer }` → `c{wire}_{layer}` — a T-gadget measurement
///   outcome bound during circuit evaluation.
/// - `GadgetK { wire, layer }` → `k{wire}_{layer}` — the consumed auxiliary
///   state's secret mask bit, bound alongside the measurement outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Symbol {
    A(usize),
    B(usize),
    AuxKey { wire: usize, index: usize, layer: usize },
    GadgetC { wire: usize, layer: usize },
    GadgetK { wire: usize, layer: usize },
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::A(i) => write!(f, "a{}", i),
            Symbol::B(i) => write!(f, "b{}", i),
            Symbol::AuxKey { wire, index, layer } => write!(f, "k_{}_{}_L{}", wire, index, layer),
            Symbol::GadgetC { wire, layer } => write!(f, "c{}_{}", wire, layer),
            Symbol::GadgetK { wire, layer } => write!(f, "k{}_{}", wire, layer),
        }
    }
}

/// A monomial or XOR-expression over [Symbol]s.
///
/// This is a closed grammar: `Sum` folds its children with XOR, `Product`
/// with AND. There is no string parsing anywhere, so the "malformed term"
/// failure class simply does not exist; the only recoverable degradation is
/// an unbound variable, which evaluates to 0 with a [Warning].
///
/// Terms are immutable once constructed and compare structurally, which
/// coincides with comparison of their canonical text forms.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Term {
    Var(Symbol),
    Product(Vec<Term>),
    Sum(Vec<Term>),
}

impl Term {
    pub fn var(symbol: Symbol) -> Self {
        Term::Var(symbol)
    }

    /// Pairwise cross product `(t1)*(t2)` of two terms.
    pub fn cross(t1: &Term, t2: &Term) -> Self {
        Term::Product(vec![t1.clone(), t2.clone()])
    }

    /// The canonical text form: products as `(f1)*(f2)`, sums joined with
    /// ` + `, variables as their symbol name.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Evaluates the term to a bit under `assignment`.
    ///
    /// Unbound variables contribute 0 and push [Warning::UnboundSymbol];
    /// evaluation itself never fails. Pure apart from the diagnostics
    /// collection.
    pub fn evaluate(&self, assignment: &VariableAssignment, diagnostics: &mut Diagnostics) -> u8 {
        match self {
            Term::Var(symbol) => match assignment.get(symbol) {
                Some(bit) => bit,
                None => {
                    diagnostics.push(Warning::UnboundSymbol { symbol: *symbol });
                    0
                }
            },
            Term::Product(factors) => factors
                .iter()
                .fold(1, |acc, factor| acc & factor.evaluate(assignment, diagnostics)),
            Term::Sum(addends) => addends
                .iter()
                .fold(0, |acc, addend| acc ^ addend.evaluate(assignment, diagnostics)),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(symbol) => write!(f, "{}", symbol),
            Term::Product(factors) => {
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    write!(f, "({})", factor)?;
                }
                Ok(())
            }
            Term::Sum(addends) => {
                for (i, addend) in addends.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{}", addend)?;
                }
                Ok(())
            }
        }
    }
}

/// The session-local binding of symbols to concrete bits.
///
/// One assignment is owned by exactly one key-generation or evaluation pass;
/// it is never shared across concurrent evaluations. Key generation seeds it
/// with the base `a`/`b` bits and the pre-derived auxiliary key variables,
/// and every T-gadget extends it with fresh `c`/`k` bindings.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct VariableAssignment {
    values: HashMap<Symbol, u8>,
}

impl VariableAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `symbol` to a bit value. Overwrites any previous binding.
    pub fn bind(&mut self, symbol: Symbol, value: u8) {
        debug_assert!(value <= 1, "assignment values are bits");
        self.values.insert(symbol, value & 1);
    }

    pub fn get(&self, symbol: &Symbol) -> Option<u8> {
        self.values.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.values.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One qubit's key polynomial: an ordered XOR-sum of [Term] addends.
///
/// Appending never simplifies, deduplicates or reorders — the polynomial
/// shape is kept exactly as the gate rewrites produced it, so the final
/// expression can be inspected layer by layer. Folding another polynomial in
/// re-inserts its individual addends rather than nesting a sub-sum.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KeyPolynomial {
    addends: Vec<Term>,
}

impl KeyPolynomial {
    /// The trivial polynomial consisting of a single variable.
    pub fn monomial(symbol: Symbol) -> Self {
        Self {
            addends: vec![Term::Var(symbol)],
        }
    }

    pub fn addends(&self) -> &[Term] {
        &self.addends
    }

    /// The sole addend, if the polynomial is a single term.
    pub fn single_addend(&self) -> Option<&Term> {
        if self.addends.len() == 1 {
            Some(&self.addends[0])
        } else {
            None
        }
    }

    /// XOR a single term onto the polynomial (appended, never collapsed).
    pub fn xor_term(&mut self, term: Term) {
        self.addends.push(term);
    }

    /// XOR every addend of `other` onto the polynomial, flat.
    pub fn xor_polynomial(&mut self, other: &KeyPolynomial) {
        self.addends.extend(other.addends.iter().cloned());
    }

    /// Rebuild from an explicit addend list.
    pub fn from_addends(addends: Vec<Term>) -> Self {
        Self { addends }
    }

    pub fn evaluate(&self, assignment: &VariableAssignment, diagnostics: &mut Diagnostics) -> u8 {
        self.addends
            .iter()
            .fold(0, |acc, addend| acc ^ addend.evaluate(assignment, diagnostics))
    }

    /// Canonical text form, addends joined with ` + `.
    pub fn canonical(&self) -> String {
        Term::Sum(self.addends.clone()).canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(pairs: &[(Symbol, u8)]) -> VariableAssignment {
        let mut values = VariableAssignment::new();
        for (symbol, bit) in pairs {
            values.bind(*symbol, *bit);
        }
        values
    }

    #[test]
    fn test_symbol_display() {
        assert_eq!(Symbol::A(0).to_string(), "a0");
        assert_eq!(Symbol::B(3).to_string(), "b3");
        assert_eq!(
            Symbol::AuxKey { wire: 1, index: 4, layer: 2 }.to_string(),
            "k_1_4_L2"
        );
        assert_eq!(Symbol::GadgetC { wire: 0, layer: 1 }.to_string(), "c0_1");
        assert_eq!(Symbol::GadgetK { wire: 0, layer: 1 }.to_string(), "k0_1");
    }

    #[test]
    fn test_product_display() {
        let product = Term::cross(&Term::var(Symbol::A(0)), &Term::var(Symbol::B(0)));
        assert_eq!(product.canonical(), "(a0)*(b0)");
        let nested = Term::cross(&product, &Term::var(Symbol::A(1)));
        assert_eq!(nested.canonical(), "((a0)*(b0))*(a1)");
    }

    #[test]
    fn test_product_evaluation() {
        let product = Term::cross(&Term::var(Symbol::A(0)), &Term::var(Symbol::B(0)));
        let mut diagnostics = Diagnostics::new();
        let values = assignment(&[(Symbol::A(0), 1), (Symbol::B(0), 1)]);
        assert_eq!(product.evaluate(&values, &mut diagnostics), 1);
        let values = assignment(&[(Symbol::A(0), 1), (Symbol::B(0), 0)]);
        assert_eq!(product.evaluate(&values, &mut diagnostics), 0);
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn test_sum_is_xor() {
        let sum = Term::Sum(vec![Term::var(Symbol::A(0)), Term::var(Symbol::B(0))]);
        let mut diagnostics = Diagnostics::new();
        let values = assignment(&[(Symbol::A(0), 1), (Symbol::B(0), 1)]);
        assert_eq!(sum.evaluate(&values, &mut diagnostics), 0);
        let values = assignment(&[(Symbol::A(0), 1), (Symbol::B(0), 0)]);
        assert_eq!(sum.evaluate(&values, &mut diagnostics), 1);
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn test_unbound_symbol_defaults_to_zero() {
        let term = Term::var(Symbol::GadgetK { wire: 2, layer: 5 });
        let mut diagnostics = Diagnostics::new();
        assert_eq!(term.evaluate(&VariableAssignment::new(), &mut diagnostics), 0);
        assert_eq!(
            diagnostics.warnings(),
            &[Warning::UnboundSymbol {
                symbol: Symbol::GadgetK { wire: 2, layer: 5 }
            }]
        );
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let sum = Term::Sum(vec![
            Term::var(Symbol::A(0)),
            Term::cross(&Term::var(Symbol::A(1)), &Term::var(Symbol::B(1))),
        ]);
        let values = assignment(&[(Symbol::A(0), 0), (Symbol::A(1), 1), (Symbol::B(1), 1)]);
        let mut diagnostics = Diagnostics::new();
        let first = sum.evaluate(&values, &mut diagnostics);
        let second = sum.evaluate(&values, &mut diagnostics);
        assert_eq!(first, second);
        assert_eq!(first, 1);
    }

    #[test]
    fn test_key_polynomial_keeps_shape() {
        let mut polynomial = KeyPolynomial::monomial(Symbol::A(0));
        polynomial.xor_term(Term::var(Symbol::GadgetC { wire: 0, layer: 1 }));
        // A duplicate addend is appended, not cancelled.
        polynomial.xor_term(Term::var(Symbol::GadgetC { wire: 0, layer: 1 }));
        assert_eq!(polynomial.addends().len(), 3);
        assert_eq!(polynomial.canonical(), "a0 + c0_1 + c0_1");

        let values = assignment(&[(Symbol::A(0), 1), (Symbol::GadgetC { wire: 0, layer: 1 }, 1)]);
        let mut diagnostics = Diagnostics::new();
        // The duplicated addend still cancels arithmetically.
        assert_eq!(polynomial.evaluate(&values, &mut diagnostics), 1);
    }

    #[test]
    fn test_xor_polynomial_is_flat() {
        let mut f_b = KeyPolynomial::monomial(Symbol::B(0));
        let f_a = KeyPolynomial::from_addends(vec![
            Term::var(Symbol::A(0)),
            Term::var(Symbol::GadgetC { wire: 0, layer: 1 }),
        ]);
        f_b.xor_polynomial(&f_a);
        assert_eq!(f_b.canonical(), "b0 + a0 + c0_1");
        assert!(f_b.addends().iter().all(|t| matches!(t, Term::Var(_))));
    }
}
