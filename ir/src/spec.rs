//! Equations and data specifications.

use std::collections::HashMap;
use std::fmt;

use crate::error::{IllSortedEquationSnafu, TargetSortAmbiguitySnafu};
use crate::{DataExpr, FunctionSymbol, Result, Sort, Variable};

/// Conditional equation `condition -> lhs = rhs` over declared variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataEquation {
    variables: Vec<Variable>,
    condition: Option<DataExpr>,
    lhs: DataExpr,
    rhs: DataExpr,
}

impl DataEquation {
    pub fn new(variables: Vec<Variable>, lhs: DataExpr, rhs: DataExpr) -> Self {
        Self { variables, condition: None, lhs, rhs }
    }

    pub fn with_condition(variables: Vec<Variable>, condition: DataExpr, lhs: DataExpr, rhs: DataExpr) -> Self {
        Self { variables, condition: Some(condition), lhs, rhs }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// `None` means the equation applies unconditionally.
    pub fn condition(&self) -> Option<&DataExpr> {
        self.condition.as_ref()
    }

    pub fn lhs(&self) -> &DataExpr {
        &self.lhs
    }

    pub fn rhs(&self) -> &DataExpr {
        &self.rhs
    }

    /// Check that both sides agree on their sort and the condition is boolean.
    pub fn check_sorts(&self) -> Result<()> {
        let ill = |reason: String| IllSortedEquationSnafu { reason, equation: self.to_string() }.build();
        let lhs = self.lhs.sort().map_err(|e| ill(e.to_string()))?;
        let rhs = self.rhs.sort().map_err(|e| ill(e.to_string()))?;
        if lhs != rhs {
            return Err(ill(format!("left-hand side has sort {lhs}, right-hand side has sort {rhs}")));
        }
        if let Some(cond) = &self.condition {
            let sort = cond.sort().map_err(|e| ill(e.to_string()))?;
            if sort != Sort::bool() {
                return Err(ill(format!("condition has sort {sort}, expected {}", Sort::bool())));
            }
        }
        Ok(())
    }
}

impl fmt::Display for DataEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cond) = &self.condition {
            write!(f, "{cond} -> ")?;
        }
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// Sorts, constructors, mappings and the equations defining the mappings.
#[derive(Debug, Clone, Default)]
pub struct DataSpecification {
    sorts: Vec<Sort>,
    constructors: Vec<FunctionSymbol>,
    mappings: Vec<FunctionSymbol>,
    equations: Vec<DataEquation>,
}

impl DataSpecification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sort(&mut self, sort: Sort) -> &mut Self {
        if !self.sorts.contains(&sort) {
            self.sorts.push(sort);
        }
        self
    }

    pub fn add_constructor(&mut self, symbol: FunctionSymbol) -> &mut Self {
        if !self.constructors.contains(&symbol) {
            self.constructors.push(symbol);
        }
        self
    }

    pub fn add_mapping(&mut self, symbol: FunctionSymbol) -> &mut Self {
        if !self.mappings.contains(&symbol) {
            self.mappings.push(symbol);
        }
        self
    }

    pub fn add_equation(&mut self, equation: DataEquation) -> &mut Self {
        self.equations.push(equation);
        self
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn constructors(&self) -> &[FunctionSymbol] {
        &self.constructors
    }

    pub fn mappings(&self) -> &[FunctionSymbol] {
        &self.mappings
    }

    /// Equations in declaration order; earlier equations take priority.
    pub fn equations(&self) -> &[DataEquation] {
        &self.equations
    }

    /// Constructors followed by mappings.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSymbol> {
        self.constructors.iter().chain(self.mappings.iter())
    }

    /// Reject overloads whose result sort is not determined by the argument sorts.
    ///
    /// Two declared symbols sharing a name and argument sorts but differing in
    /// result sort leave the target sort of an application ambiguous.
    pub fn check_sorts(&self) -> Result<()> {
        let mut seen: HashMap<(&str, Vec<&Sort>), &Sort> = HashMap::new();
        for symbol in self.functions() {
            let domain = symbol.sort().argument_sorts();
            let target = symbol.sort().target();
            match seen.get(&(symbol.name(), domain.clone())) {
                Some(&first) if first != target => {
                    let domain = domain.iter().map(ToString::to_string).collect::<Vec<_>>().join(" # ");
                    return TargetSortAmbiguitySnafu {
                        name: symbol.name().to_string(),
                        domain,
                        first: first.clone(),
                        second: target.clone(),
                    }
                    .fail();
                }
                Some(_) => {}
                None => {
                    seen.insert((symbol.name(), domain), target);
                }
            }
        }
        Ok(())
    }
}
