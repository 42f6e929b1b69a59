//! Rewrite-rule validity.
//!
//! An equation can be used as a left-to-right rewrite rule only if matching
//! its left-hand side binds every variable the condition and the right-hand
//! side need. Invalid equations are reported and skipped; they never abort
//! construction of a rewriter.

use std::collections::HashMap;

use tracing::warn;

use crate::error::{
    InconsistentVariableSnafu, UnboundRhsVariableSnafu, UndeclaredVariableSnafu, VariableHeadSnafu, VariableLhsSnafu,
};
use crate::{DataEquation, DataExpr, Result};

/// Check that `equation` is a usable rewrite rule.
pub fn check_equation(equation: &DataEquation) -> Result<()> {
    let declared = equation.variables();
    let render = || equation.to_string();

    if let Some(cond) = equation.condition() {
        for variable in cond.variables() {
            if !declared.contains(&variable) {
                return UndeclaredVariableSnafu { variable, equation: render() }.fail();
            }
        }
    }

    let lhs_vars = equation.lhs().variables();
    let mut sorts = HashMap::new();
    for variable in &lhs_vars {
        if !declared.contains(variable) {
            return UndeclaredVariableSnafu { variable: variable.clone(), equation: render() }.fail();
        }
        if let Some(first) = sorts.insert(variable.name(), variable.sort())
            && first != variable.sort()
        {
            return InconsistentVariableSnafu {
                name: variable.name().to_string(),
                first: first.clone(),
                second: variable.sort().clone(),
                equation: render(),
            }
            .fail();
        }
    }

    for variable in equation.rhs().variables() {
        if !lhs_vars.contains(&variable) {
            return UnboundRhsVariableSnafu { variable, equation: render() }.fail();
        }
    }

    if equation.lhs().is_variable() {
        return VariableLhsSnafu { equation: render() }.fail();
    }
    check_pattern(equation.lhs(), &render)?;

    equation.check_sorts()
}

fn check_pattern(pattern: &DataExpr, render: &dyn Fn() -> String) -> Result<()> {
    let DataExpr::Application { .. } = pattern else {
        return Ok(());
    };
    let (head, args) = pattern.spine();
    if let DataExpr::Variable(variable) = head {
        return VariableHeadSnafu { variable: variable.clone(), equation: render() }.fail();
    }
    for arg in args {
        check_pattern(arg, render)?;
    }
    Ok(())
}

/// Equations that pass [`check_equation`], in declaration order.
///
/// Every rejected equation is reported with a `warn!` event.
pub fn valid_equations(equations: &[DataEquation]) -> Vec<&DataEquation> {
    equations
        .iter()
        .filter(|eq| match check_equation(eq) {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "equation is not a valid rewrite rule, skipping");
                false
            }
        })
        .collect()
}
