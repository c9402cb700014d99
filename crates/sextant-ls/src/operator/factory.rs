// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Catalogue construction of the standard neighborhoods.

use crate::eval::IndexEvaluator3;
use crate::operator::active::{
    ExtendedSwapActiveOperator, MakeActiveOperator, MakeInactiveOperator, SwapActiveOperator,
};
use crate::operator::compound::CompoundOperator;
use crate::operator::cross::Cross;
use crate::operator::exchange::Exchange;
use crate::operator::lin_kernighan::LinKernighan;
use crate::operator::lns::{PathLns, SimpleLns};
use crate::operator::relocate::Relocate;
use crate::operator::scalar::ChangeValue;
use crate::operator::tsp::{HamiltonianSolver, TspLns, TspOpt};
use crate::operator::tsp::{DEFAULT_TSP_LNS_SIZE, DEFAULT_TSP_OPT_SIZE};
use crate::operator::two_opt::TwoOpt;
use crate::operator::LocalSearchOperator;
use sextant_model::domain::VarDomains;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;

/// The standard neighborhoods that need no cost evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardOperator {
    TwoOpt,
    OrOpt,
    Relocate,
    Exchange,
    Cross,
    MakeActive,
    MakeInactive,
    SwapActive,
    ExtendedSwapActive,
    PathLns,
    UnactiveLns,
    Increment,
    Decrement,
    SimpleLns,
}

/// The evaluator-driven neighborhoods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorOperator {
    LinKernighan,
    TspOpt,
    TspLns,
}

/// The or-opt composition: relocates of chain lengths 1, 2 and 3,
/// restricted to a single path.
pub fn or_opt<T>(
    next_vars: &[VarIndex],
    path_vars: Option<&[VarIndex]>,
) -> CompoundOperator<T>
where
    T: SolverNumeric + 'static,
{
    let mut operators: Vec<Box<dyn LocalSearchOperator<T>>> = Vec::new();
    for chain_length in 1..4 {
        operators.push(Box::new(Relocate::with_chain_length(
            next_vars.to_vec(),
            path_vars.map(|vars| vars.to_vec()),
            chain_length,
            true,
        )));
    }
    CompoundOperator::concatenate(operators)
}

/// Builds one of the standard neighborhoods over the given variables.
///
/// # Panics
///
/// Panics when secondary variables are passed to an operator that does
/// not support them.
pub fn make_operator<T>(
    next_vars: &[VarIndex],
    path_vars: Option<&[VarIndex]>,
    op: StandardOperator,
) -> Box<dyn LocalSearchOperator<T>>
where
    T: SolverNumeric + 'static,
{
    let nexts = next_vars.to_vec();
    let paths = path_vars.map(|vars| vars.to_vec());
    match op {
        StandardOperator::TwoOpt => Box::new(TwoOpt::new(nexts, paths)),
        StandardOperator::OrOpt => Box::new(or_opt(next_vars, path_vars)),
        StandardOperator::Relocate => Box::new(Relocate::new(nexts, paths)),
        StandardOperator::Exchange => Box::new(Exchange::new(nexts, paths)),
        StandardOperator::Cross => Box::new(Cross::new(nexts, paths)),
        StandardOperator::MakeActive => Box::new(MakeActiveOperator::new(nexts, paths)),
        StandardOperator::MakeInactive => Box::new(MakeInactiveOperator::new(nexts, paths)),
        StandardOperator::SwapActive => Box::new(SwapActiveOperator::new(nexts, paths)),
        StandardOperator::ExtendedSwapActive => {
            Box::new(ExtendedSwapActiveOperator::new(nexts, paths))
        }
        StandardOperator::PathLns => Box::new(PathLns::new(nexts, paths, 2, 3, false)),
        StandardOperator::UnactiveLns => Box::new(PathLns::new(nexts, paths, 1, 6, true)),
        StandardOperator::Increment => {
            assert!(
                paths.is_none(),
                "operator Increment does not support secondary variables"
            );
            Box::new(ChangeValue::increment(nexts))
        }
        StandardOperator::Decrement => {
            assert!(
                paths.is_none(),
                "operator Decrement does not support secondary variables"
            );
            Box::new(ChangeValue::decrement(nexts))
        }
        StandardOperator::SimpleLns => {
            assert!(
                paths.is_none(),
                "operator SimpleLns does not support secondary variables"
            );
            Box::new(SimpleLns::new(nexts, 1))
        }
    }
}

/// Builds one of the evaluator-driven neighborhoods.
///
/// The Lin-Kernighan entry concatenates a plain LK with a 3-opt-seeded
/// LK; the TSP entries use the default window and meta-node sizes and
/// hand instances to `hamiltonian_solver`.
pub fn make_evaluator_operator<T, E, D, H>(
    next_vars: &[VarIndex],
    path_vars: Option<&[VarIndex]>,
    evaluator: E,
    domains: D,
    hamiltonian_solver: H,
    op: EvaluatorOperator,
) -> Box<dyn LocalSearchOperator<T>>
where
    T: SolverNumeric + 'static,
    E: IndexEvaluator3<T> + Clone + 'static,
    D: VarDomains<T> + Clone + 'static,
    H: HamiltonianSolver<T> + 'static,
{
    let nexts = next_vars.to_vec();
    let paths = path_vars.map(|vars| vars.to_vec());
    match op {
        EvaluatorOperator::LinKernighan => {
            let operators: Vec<Box<dyn LocalSearchOperator<T>>> = vec![
                Box::new(LinKernighan::new(
                    nexts.clone(),
                    paths.clone(),
                    evaluator.clone(),
                    domains.clone(),
                    false,
                )),
                Box::new(LinKernighan::new(nexts, paths, evaluator, domains, true)),
            ];
            Box::new(CompoundOperator::concatenate(operators))
        }
        EvaluatorOperator::TspOpt => Box::new(TspOpt::new(
            nexts,
            paths,
            evaluator,
            hamiltonian_solver,
            DEFAULT_TSP_OPT_SIZE,
        )),
        EvaluatorOperator::TspLns => Box::new(TspLns::new(
            nexts,
            paths,
            evaluator,
            hamiltonian_solver,
            DEFAULT_TSP_LNS_SIZE,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::path::test_support::{path_assignment, read_path};
    use sextant_model::assignment::Assignment;

    #[test]
    fn test_or_opt_produces_single_path_relocations() {
        let reference = path_assignment(5, &[&[0, 1, 2, 3, 4]]);
        let mut op = or_opt::<i64>(
            &(0..5).map(VarIndex::new).collect::<Vec<_>>(),
            None,
        );
        op.start(&reference);
        let mut paths = Vec::new();
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        loop {
            delta.clear();
            deltadelta.clear();
            if !op.make_next_neighbor(&mut delta, &mut deltadelta) {
                break;
            }
            let mut candidate = reference.clone();
            candidate.copy_from(&delta);
            paths.push(read_path(&candidate, 0, 5));
            assert!(paths.len() < 256, "or-opt failed to terminate");
        }
        // Chain-length-1 moves and a chain-length-2 move; the
        // chain-length-3 relocate has no room on a five-node path.
        assert!(paths.contains(&vec![0, 2, 3, 1, 4]));
        assert!(paths.contains(&vec![0, 1, 3, 2, 4]));
        assert!(paths.contains(&vec![0, 3, 1, 2, 4]));
    }

    #[test]
    fn test_standard_catalogue_builds_and_runs() {
        let reference = path_assignment(5, &[&[0, 1, 2, 3]]);
        let vars: Vec<VarIndex> = (0..5).map(VarIndex::new).collect();
        for op_kind in [
            StandardOperator::TwoOpt,
            StandardOperator::OrOpt,
            StandardOperator::Relocate,
            StandardOperator::Exchange,
            StandardOperator::Cross,
            StandardOperator::MakeActive,
            StandardOperator::MakeInactive,
            StandardOperator::SwapActive,
            StandardOperator::ExtendedSwapActive,
            StandardOperator::PathLns,
            StandardOperator::UnactiveLns,
        ] {
            let mut op = make_operator::<i64>(&vars, None, op_kind);
            op.start(&reference);
            let mut delta = Assignment::new();
            let mut deltadelta = Assignment::new();
            let mut count = 0;
            loop {
                delta.clear();
                deltadelta.clear();
                if !op.make_next_neighbor(&mut delta, &mut deltadelta) {
                    break;
                }
                count += 1;
                if count > 512 {
                    break;
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "does not support secondary variables")]
    fn test_increment_rejects_secondary_variables() {
        let vars: Vec<VarIndex> = (0..2).map(VarIndex::new).collect();
        let _ = make_operator::<i64>(&vars, Some(&vars), StandardOperator::Increment);
    }
}
