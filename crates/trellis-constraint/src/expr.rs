//! Linear expressions and constraint specifications.
//!
//! Expressions are sums of `coefficient * variable` terms plus a constant,
//! built with ordinary arithmetic operators. A [`ConstraintSpec`] relates two
//! expressions with an operator and a strength; it is created once per
//! registration and never mutated afterwards (replacement goes through
//! remove + submit).

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use smallvec::{smallvec, SmallVec};
use trellis_core::Strength;

use crate::variable::Variable;

/// One `coefficient * variable` term of a linear expression.
#[derive(Debug, Clone)]
pub struct Term {
    pub coefficient: f64,
    pub variable: Variable,
}

impl Term {
    pub fn new(coefficient: f64, variable: Variable) -> Self {
        Self {
            coefficient,
            variable,
        }
    }
}

/// A linear expression: `Σ(coefficient * variable) + constant`.
#[derive(Debug, Clone, Default)]
pub struct Expr {
    terms: SmallVec<[Term; 4]>,
    constant: f64,
}

impl Expr {
    /// A constant expression.
    pub fn constant(value: f64) -> Self {
        Self {
            terms: SmallVec::new(),
            constant: value,
        }
    }

    /// An expression made of a single variable.
    pub fn variable(variable: Variable) -> Self {
        Self {
            terms: smallvec![Term::new(1.0, variable)],
            constant: 0.0,
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn constant_part(&self) -> f64 {
        self.constant
    }

    fn add_assign_expr(&mut self, other: Expr, multiplier: f64) {
        self.constant += other.constant * multiplier;
        for term in other.terms {
            self.terms
                .push(Term::new(term.coefficient * multiplier, term.variable));
        }
    }

    fn scaled(mut self, scalar: f64) -> Self {
        self.constant *= scalar;
        for term in &mut self.terms {
            term.coefficient *= scalar;
        }
        self
    }
}

impl From<Variable> for Expr {
    fn from(variable: Variable) -> Self {
        Expr::variable(variable)
    }
}

impl From<&Variable> for Expr {
    fn from(variable: &Variable) -> Self {
        Expr::variable(variable.clone())
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::constant(value)
    }
}

impl From<Term> for Expr {
    fn from(term: Term) -> Self {
        Self {
            terms: smallvec![term],
            constant: 0.0,
        }
    }
}

impl<R: Into<Expr>> Add<R> for Expr {
    type Output = Expr;

    fn add(mut self, rhs: R) -> Expr {
        self.add_assign_expr(rhs.into(), 1.0);
        self
    }
}

impl<R: Into<Expr>> Sub<R> for Expr {
    type Output = Expr;

    fn sub(mut self, rhs: R) -> Expr {
        self.add_assign_expr(rhs.into(), -1.0);
        self
    }
}

impl Mul<f64> for Expr {
    type Output = Expr;

    fn mul(self, scalar: f64) -> Expr {
        self.scaled(scalar)
    }
}

impl Mul<Expr> for f64 {
    type Output = Expr;

    fn mul(self, expr: Expr) -> Expr {
        expr.scaled(self)
    }
}

impl Div<f64> for Expr {
    type Output = Expr;

    fn div(self, scalar: f64) -> Expr {
        self.scaled(1.0 / scalar)
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.scaled(-1.0)
    }
}

impl<R: Into<Expr>> Add<R> for Variable {
    type Output = Expr;

    fn add(self, rhs: R) -> Expr {
        Expr::variable(self) + rhs
    }
}

impl<R: Into<Expr>> Sub<R> for Variable {
    type Output = Expr;

    fn sub(self, rhs: R) -> Expr {
        Expr::variable(self) - rhs
    }
}

impl Mul<f64> for Variable {
    type Output = Expr;

    fn mul(self, scalar: f64) -> Expr {
        Expr::from(Term::new(scalar, self))
    }
}

impl Mul<Variable> for f64 {
    type Output = Expr;

    fn mul(self, variable: Variable) -> Expr {
        Expr::from(Term::new(self, variable))
    }
}

impl Div<f64> for Variable {
    type Output = Expr;

    fn div(self, scalar: f64) -> Expr {
        Expr::from(Term::new(1.0 / scalar, self))
    }
}

impl Neg for Variable {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::from(Term::new(-1.0, self))
    }
}

impl Add<Variable> for f64 {
    type Output = Expr;

    fn add(self, variable: Variable) -> Expr {
        Expr::constant(self) + variable
    }
}

impl Sub<Variable> for f64 {
    type Output = Expr;

    fn sub(self, variable: Variable) -> Expr {
        Expr::constant(self) - variable
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        for term in &self.terms {
            if wrote {
                write!(f, " + ")?;
            }
            if (term.coefficient - 1.0).abs() < f64::EPSILON {
                write!(f, "{}", term.variable)?;
            } else {
                write!(f, "{}*{}", term.coefficient, term.variable)?;
            }
            wrote = true;
        }
        if self.constant != 0.0 || !wrote {
            if wrote {
                write!(f, " + ")?;
            }
            write!(f, "{}", self.constant)?;
        }
        Ok(())
    }
}

/// Relational operator of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Relation::Eq => "==",
            Relation::Le => "<=",
            Relation::Ge => ">=",
        };
        f.write_str(symbol)
    }
}

/// A constraint ready for submission: `lhs (op) rhs` at a strength.
#[derive(Debug, Clone)]
pub struct ConstraintSpec {
    pub lhs: Expr,
    pub relation: Relation,
    pub rhs: Expr,
    pub strength: Strength,
}

impl ConstraintSpec {
    pub fn new(lhs: Expr, relation: Relation, rhs: Expr, strength: Strength) -> Self {
        Self {
            lhs,
            relation,
            rhs,
            strength,
        }
    }

    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }

    pub fn required(self) -> Self {
        self.with_strength(Strength::Required)
    }

    pub fn strong(self) -> Self {
        self.with_strength(Strength::Strong)
    }

    pub fn medium(self) -> Self {
        self.with_strength(Strength::Medium)
    }

    pub fn weak(self) -> Self {
        self.with_strength(Strength::Weak)
    }

    /// Iterate over every variable the constraint references.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.lhs
            .terms()
            .iter()
            .chain(self.rhs.terms())
            .map(|term| &term.variable)
    }
}

impl fmt::Display for ConstraintSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} [{}]",
            self.lhs, self.relation, self.rhs, self.strength
        )
    }
}

/// `lhs == rhs`, required by default.
pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> ConstraintSpec {
    ConstraintSpec::new(lhs.into(), Relation::Eq, rhs.into(), Strength::Required)
}

/// `lhs <= rhs`, required by default.
pub fn le(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> ConstraintSpec {
    ConstraintSpec::new(lhs.into(), Relation::Le, rhs.into(), Strength::Required)
}

/// `lhs >= rhs`, required by default.
pub fn ge(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> ConstraintSpec {
    ConstraintSpec::new(lhs.into(), Relation::Ge, rhs.into(), Strength::Required)
}

/// `expr == 0`.
pub fn eq0(expr: impl Into<Expr>) -> ConstraintSpec {
    eq(expr, 0.0)
}

/// `expr <= 0`.
pub fn le0(expr: impl Into<Expr>) -> ConstraintSpec {
    le(expr, 0.0)
}

/// `expr >= 0`.
pub fn ge0(expr: impl Into<Expr>) -> ConstraintSpec {
    ge(expr, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::{VarRole, VariableSpace};

    fn vars() -> (Variable, Variable) {
        let mut space = VariableSpace::new();
        let a = space.create_variable("a", VarRole::Hint).unwrap();
        let b = space.create_variable("b", VarRole::Hint).unwrap();
        (a, b)
    }

    #[test]
    fn test_expr_from_variable() {
        let (a, _) = vars();
        let expr = Expr::from(a);
        assert_eq!(expr.terms().len(), 1);
        assert_eq!(expr.constant_part(), 0.0);
    }

    #[test]
    fn test_expr_arithmetic() {
        let (a, b) = vars();
        let expr = a * 2.0 + b - 3.0;
        assert_eq!(expr.terms().len(), 2);
        assert_eq!(expr.terms()[0].coefficient, 2.0);
        assert_eq!(expr.terms()[1].coefficient, 1.0);
        assert_eq!(expr.constant_part(), -3.0);
    }

    #[test]
    fn test_expr_negation_and_scaling() {
        let (a, b) = vars();
        let expr = -(a + b) / 2.0;
        assert_eq!(expr.terms()[0].coefficient, -0.5);
        assert_eq!(expr.terms()[1].coefficient, -0.5);
    }

    #[test]
    fn test_constraint_strength_selectors() {
        let (a, b) = vars();
        let spec = eq(a, b).medium();
        assert_eq!(spec.strength, Strength::Medium);
        assert_eq!(spec.relation, Relation::Eq);
    }

    #[test]
    fn test_shortcut_constructors() {
        let (a, _) = vars();
        let spec = ge0(a);
        assert_eq!(spec.relation, Relation::Ge);
        assert_eq!(spec.rhs.constant_part(), 0.0);
        assert!(spec.rhs.terms().is_empty());
    }

    #[test]
    fn test_display() {
        let (a, b) = vars();
        let spec = eq(a + 20.0, b * 2.0).weak();
        assert_eq!(format!("{}", spec), "a + 20 == 2*b [weak]");
    }
}
