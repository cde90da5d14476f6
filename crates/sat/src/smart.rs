use tracing::{debug, instrument, trace};

use crate::{Assignment, Formula};

/// Partial assignment, `values[v - 1]` for variable `v`.
type Partial = Vec<Option<bool>>;

enum Simplified {
    Conflict,
    Satisfied,
    Branch { var: usize },
}

fn literal_value(values: &Partial, literal: i32) -> Option<bool> {
    values[literal.unsigned_abs() as usize - 1].map(|value| value == (literal > 0))
}

fn assign(values: &mut Partial, literal: i32) {
    values[literal.unsigned_abs() as usize - 1] = Some(literal > 0);
}

/// Applies unit propagation and pure literal elimination until neither
/// assigns a variable.
fn simplify(formula: &Formula, values: &mut Partial, propagated: &mut u64) -> Simplified {
    loop {
        let mut changed = false;
        let mut branch = None;
        for clause in &formula.clauses {
            if clause.iter().any(|&literal| literal_value(values, literal) == Some(true)) {
                continue;
            }
            let mut free = clause.iter().copied().filter(|&literal| literal_value(values, literal).is_none());
            match (free.next(), free.next()) {
                (None, _) => return Simplified::Conflict,
                (Some(unit), None) => {
                    trace!(unit, "unit clause");
                    assign(values, unit);
                    *propagated += 1;
                    changed = true;
                }
                (Some(literal), Some(_)) => {
                    branch.get_or_insert(literal.unsigned_abs() as usize - 1);
                }
            }
        }
        if changed {
            continue;
        }
        let Some(var) = branch else {
            return Simplified::Satisfied;
        };

        // polarity[v] = (occurs positive, occurs negative) among open clauses
        let mut polarity = vec![(false, false); values.len()];
        for clause in &formula.clauses {
            if clause.iter().any(|&literal| literal_value(values, literal) == Some(true)) {
                continue;
            }
            for &literal in clause {
                if values[literal.unsigned_abs() as usize - 1].is_none() {
                    let entry = &mut polarity[literal.unsigned_abs() as usize - 1];
                    if literal > 0 {
                        entry.0 = true;
                    } else {
                        entry.1 = true;
                    }
                }
            }
        }
        for (v, &(positive, negative)) in polarity.iter().enumerate() {
            if positive != negative {
                trace!(var = v + 1, positive, "pure literal");
                values[v] = Some(positive);
                *propagated += 1;
                changed = true;
            }
        }
        if !changed {
            return Simplified::Branch { var };
        }
    }
}

/// Decides satisfiability by backtracking search.
///
/// Before every decision, unit clauses are assigned and pure literals are
/// set to the value satisfying all their occurrences. The search then
/// branches on a variable of the first open clause, trying `true` first.
/// Variables left unassigned in a satisfying assignment are false.
#[instrument(skip_all, fields(n = formula.num_vars, m = formula.clauses.len()))]
pub fn solve_smart(formula: &Formula) -> Option<Assignment> {
    let mut stack: Vec<Partial> = vec![vec![None; formula.num_vars as usize]];
    let mut decisions = 0_u64;
    let mut propagated = 0_u64;

    while let Some(mut values) = stack.pop() {
        match simplify(formula, &mut values, &mut propagated) {
            Simplified::Conflict => continue,
            Simplified::Satisfied => {
                debug!(decisions, propagated, "satisfiable");
                return Some(Assignment::from_values(values.into_iter().map(|v| v.unwrap_or(false)).collect()));
            }
            Simplified::Branch { var } => {
                decisions += 1;
                let mut negative = values.clone();
                negative[var] = Some(false);
                values[var] = Some(true);
                stack.push(negative);
                stack.push(values);
            }
        }
    }
    debug!(decisions, propagated, "unsatisfiable");
    None
}
