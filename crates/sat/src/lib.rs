//! Satisfiability of formulas in conjunctive normal form.
//!
//! Variables are numbered `1..=n`. A literal `v` is satisfied if variable `v`
//! is true, a literal `-v` if it is false. [solve_brute_force] counts through
//! all `2^n` assignments in binary and stops at the first one satisfying every
//! clause. [solve_smart] searches the same space with unit propagation,
//! pure literal elimination and branching.

use rand::Rng;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, instrument};

mod smart;

pub use smart::solve_smart;

/// Upper bound on the number of variables [solve_brute_force] accepts.
pub const MAX_BRUTE_FORCE_VARS: u32 = 40;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum FormulaError {
    #[error("clause {clause} contains the literal 0")]
    ZeroLiteral { clause: usize },
    #[error("literal {literal} out of range (number of variables {num_vars})")]
    LiteralOutOfRange { literal: i32, num_vars: u32 },
    #[error("cannot enumerate {num_vars} variables (at most {max})")]
    TooManyVariables { num_vars: u32, max: u32 },
    #[error("cannot draw literals without variables")]
    NoVariables,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Formula {
    num_vars: u32,
    clauses: Vec<Vec<i32>>,
}

impl Formula {
    pub fn new(num_vars: u32, clauses: Vec<Vec<i32>>) -> Result<Self, FormulaError> {
        for (i, clause) in clauses.iter().enumerate() {
            for &literal in clause {
                if literal == 0 {
                    return Err(FormulaError::ZeroLiteral { clause: i });
                }
                if literal.unsigned_abs() > num_vars {
                    return Err(FormulaError::LiteralOutOfRange { literal, num_vars });
                }
            }
        }
        Ok(Self { num_vars, clauses })
    }

    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> &[Vec<i32>] {
        &self.clauses
    }
}

/// Truth values of variables `1..=n`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    pub fn all_false(num_vars: u32) -> Self {
        Self { values: vec![false; num_vars as usize] }
    }

    pub fn from_values(values: Vec<bool>) -> Self {
        Self { values }
    }

    pub fn num_vars(&self) -> u32 {
        self.values.len() as u32
    }

    /// Value of variable `var`. Variables beyond the assignment are false.
    pub fn value(&self, var: u32) -> bool {
        var.checked_sub(1).and_then(|i| self.values.get(i as usize)).copied().unwrap_or(false)
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    fn satisfies(&self, literal: i32) -> bool {
        self.value(literal.unsigned_abs()) == (literal > 0)
    }

    /// Advances to the next assignment, variable 1 being the lowest bit.
    /// Returns `false` after the last one wrapped around to all false.
    fn increment(&mut self) -> bool {
        for value in &mut self.values {
            if *value {
                *value = false;
            } else {
                *value = true;
                return true;
            }
        }
        false
    }
}

/// Returns whether every clause has a literal satisfied by `assignment`.
pub fn evaluate(formula: &Formula, assignment: &Assignment) -> bool {
    formula.clauses.iter().all(|clause| clause.iter().any(|&literal| assignment.satisfies(literal)))
}

#[instrument(skip_all, fields(n = formula.num_vars, m = formula.clauses.len()))]
pub fn solve_brute_force(formula: &Formula) -> Result<Option<Assignment>, FormulaError> {
    if formula.num_vars > MAX_BRUTE_FORCE_VARS {
        return Err(FormulaError::TooManyVariables { num_vars: formula.num_vars, max: MAX_BRUTE_FORCE_VARS });
    }

    let mut assignment = Assignment::all_false(formula.num_vars);
    let mut tried = 1_u64;
    loop {
        if evaluate(formula, &assignment) {
            debug!(tried, "satisfiable");
            return Ok(Some(assignment));
        }
        if !assignment.increment() {
            debug!(tried, "unsatisfiable");
            return Ok(None);
        }
        tried += 1;
    }
}

/// Draws `num_clauses` clauses of `lits_per_clause` literals each. Variables
/// and signs are uniform, so a clause may repeat a variable.
pub fn random_formula<R: Rng>(
    num_vars: u32,
    num_clauses: usize,
    lits_per_clause: usize,
    rng: &mut R,
) -> Result<Formula, FormulaError> {
    if num_vars == 0 && num_clauses > 0 && lits_per_clause > 0 {
        return Err(FormulaError::NoVariables);
    }
    let clauses = (0..num_clauses)
        .map(|_| {
            (0..lits_per_clause)
                .map(|_| {
                    let var = rng.gen_range(1..=num_vars) as i32;
                    if rng.gen_bool(0.5) {
                        -var
                    } else {
                        var
                    }
                })
                .collect()
        })
        .collect();
    Ok(Formula { num_vars, clauses })
}

/// Writes `formula` in DIMACS CNF.
pub fn write_dimacs<W: Write>(out: &mut W, formula: &Formula) -> std::io::Result<()> {
    writeln!(out, "p cnf {} {}", formula.num_vars, formula.clauses.len())?;
    for clause in &formula.clauses {
        for literal in clause {
            write!(out, "{literal} ")?;
        }
        writeln!(out, "0")?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn new_rejects_bad_literals() {
        assert_eq!(Formula::new(2, vec![vec![1], vec![1, 0]]), Err(FormulaError::ZeroLiteral { clause: 1 }));
        assert_eq!(Formula::new(2, vec![vec![3]]), Err(FormulaError::LiteralOutOfRange { literal: 3, num_vars: 2 }));
        assert_eq!(Formula::new(2, vec![vec![-3]]), Err(FormulaError::LiteralOutOfRange { literal: -3, num_vars: 2 }));
        assert!(Formula::new(0, vec![]).is_ok());
    }

    #[test]
    fn evaluate_clauses() {
        let formula = Formula::new(2, vec![vec![1, -2], vec![2]]).unwrap();
        assert!(!evaluate(&formula, &Assignment::from_values(vec![false, false])));
        assert!(!evaluate(&formula, &Assignment::from_values(vec![false, true])));
        assert!(evaluate(&formula, &Assignment::from_values(vec![true, true])));

        let empty_clause = Formula::new(1, vec![vec![]]).unwrap();
        assert!(!evaluate(&empty_clause, &Assignment::all_false(1)));
    }

    #[test]
    fn first_satisfying_assignment_in_counting_order() {
        let formula = Formula::new(3, vec![vec![1, 2], vec![-1], vec![-2, 3]]).unwrap();
        let assignment = solve_brute_force(&formula).unwrap().unwrap();
        assert_eq!(assignment.values(), [false, true, true]);
        assert!(assignment.value(3));
        assert!(!assignment.value(0));
        assert!(!assignment.value(4));
    }

    #[test]
    fn unsatisfiable() {
        let formula = Formula::new(2, vec![vec![1], vec![-1, 2], vec![-2]]).unwrap();
        assert_eq!(solve_brute_force(&formula), Ok(None));
    }

    #[test]
    fn no_variables() {
        assert!(solve_brute_force(&Formula::new(0, vec![]).unwrap()).unwrap().is_some());
        assert_eq!(solve_brute_force(&Formula::new(0, vec![vec![]]).unwrap()), Ok(None));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(random_formula(0, 2, 2, &mut rng), Err(FormulaError::NoVariables));
    }

    #[test]
    fn too_many_variables() {
        let formula = Formula::new(MAX_BRUTE_FORCE_VARS + 1, vec![]).unwrap();
        assert_eq!(
            solve_brute_force(&formula),
            Err(FormulaError::TooManyVariables { num_vars: MAX_BRUTE_FORCE_VARS + 1, max: MAX_BRUTE_FORCE_VARS })
        );
    }

    #[test]
    fn random_formulas() {
        let formula = random_formula(6, 12, 3, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(formula.num_clauses(), 12);
        assert!(formula.clauses().iter().all(|clause| clause.len() == 3));
        assert_eq!(Formula::new(6, formula.clauses().to_vec()).as_ref(), Ok(&formula));
        assert_eq!(random_formula(6, 12, 3, &mut StdRng::seed_from_u64(3)).unwrap(), formula);

        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            let formula = random_formula(5, 10, 2, &mut rng).unwrap();
            if let Some(assignment) = solve_brute_force(&formula).unwrap() {
                assert!(evaluate(&formula, &assignment));
            }
        }
    }

    #[test]
    fn dimacs() {
        let formula = Formula::new(3, vec![vec![1, -2], vec![3]]).unwrap();
        let mut out = Vec::new();
        write_dimacs(&mut out, &formula).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "p cnf 3 2\n1 -2 0\n3 0\n");
    }
}
