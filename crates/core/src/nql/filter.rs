//! Typed filter tree for Ghost's NQL query language
//!
//! Replaces stringly-built filter fragments with a structured tree: a
//! [`Filter`] is either a property/predicate leaf or an AND/OR combinator
//! over child filters. Each [`Predicate`] variant carries exactly the value
//! shape its operator accepts, so most operator/value mismatches are
//! unrepresentable; the residual invariants (non-empty `In` lists, non-empty
//! combinators, well-formed property names) are enforced at encode time.

use chrono::TimeDelta;

/// A scalar value appearing on the right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// String literal; quoted on the wire unless it is a safe bare word.
    Str(String),
    /// Integer literal, rendered as decimal.
    Int(i64),
    /// Float literal, rendered as decimal.
    Float(f64),
    /// Boolean literal, rendered as bare `true`/`false`.
    Bool(bool),
    /// Relative date, rendered as NQL `now` arithmetic (`now-3d`).
    Relative(RelativeDate),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<RelativeDate> for Value {
    fn from(v: RelativeDate) -> Self {
        Self::Relative(v)
    }
}

/// A date expressed relative to the remote server's `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeDate {
    /// Signed offset: negative means in the past.
    pub amount: i64,
    /// Calendar unit of the offset.
    pub unit: DateUnit,
}

impl RelativeDate {
    /// `now - days` (the common "recently published" shape).
    #[must_use]
    pub fn days_ago(days: i64) -> Self {
        Self { amount: -days, unit: DateUnit::Days }
    }

    /// `now - hours`.
    #[must_use]
    pub fn hours_ago(hours: i64) -> Self {
        Self { amount: -hours, unit: DateUnit::Hours }
    }

    /// Approximate equivalent as a [`TimeDelta`], for callers reasoning
    /// about the window locally.
    #[must_use]
    pub fn as_delta(&self) -> TimeDelta {
        match self.unit {
            DateUnit::Minutes => TimeDelta::minutes(self.amount),
            DateUnit::Hours => TimeDelta::hours(self.amount),
            DateUnit::Days => TimeDelta::days(self.amount),
            DateUnit::Weeks => TimeDelta::weeks(self.amount),
        }
    }

    pub(crate) fn suffix(&self) -> char {
        match self.unit {
            DateUnit::Minutes => 'm',
            DateUnit::Hours => 'h',
            DateUnit::Days => 'd',
            DateUnit::Weeks => 'w',
        }
    }
}

/// Calendar units accepted by NQL `now` arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

/// A predicate applied to a single property.
///
/// Operators that take no value (`Null`, `NotNull`) and the list-valued `In`
/// are separate variants, so the operator/value compatibility invariant is
/// carried by the type itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Equality (`prop:value`).
    Eq(Value),
    /// Negated equality (`prop:-value`).
    Ne(Value),
    /// Greater than (`prop:>value`).
    Gt(Value),
    /// Greater than or equal (`prop:>=value`).
    Gte(Value),
    /// Less than (`prop:<value`).
    Lt(Value),
    /// Less than or equal (`prop:<=value`).
    Lte(Value),
    /// Substring match (`prop:~value`).
    Contains(String),
    /// Prefix match (`prop:~^value`).
    StartsWith(String),
    /// Suffix match (`prop:~$value`).
    EndsWith(String),
    /// Set membership (`prop:[v1,v2]`); the list must be non-empty.
    In(Vec<Value>),
    /// Null check (`prop:null`).
    Null,
    /// Negated null check (`prop:-null`).
    NotNull,
}

/// A filter expression tree.
///
/// Construction never fails; invariants are checked by
/// [`Filter::encode`](crate::nql::Filter::encode), which is the single point
/// a tree crosses onto the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// A single property predicate.
    Leaf {
        /// Property path, dot-separated for relations (`authors.slug`).
        property: String,
        /// The predicate applied to it.
        predicate: Predicate,
    },
    /// All operands must hold; joined with `+` on the wire.
    And(Vec<Filter>),
    /// Any operand must hold; joined with `,` on the wire.
    Or(Vec<Filter>),
}

impl Filter {
    fn leaf(property: impl Into<String>, predicate: Predicate) -> Self {
        Self::Leaf { property: property.into(), predicate }
    }

    /// `property:value`
    pub fn eq(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(property, Predicate::Eq(value.into()))
    }

    /// `property:-value`
    pub fn ne(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(property, Predicate::Ne(value.into()))
    }

    /// `property:>value`
    pub fn gt(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(property, Predicate::Gt(value.into()))
    }

    /// `property:>=value`
    pub fn gte(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(property, Predicate::Gte(value.into()))
    }

    /// `property:<value`
    pub fn lt(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(property, Predicate::Lt(value.into()))
    }

    /// `property:<=value`
    pub fn lte(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(property, Predicate::Lte(value.into()))
    }

    /// `property:~value`
    pub fn contains(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::leaf(property, Predicate::Contains(value.into()))
    }

    /// `property:~^value`
    pub fn starts_with(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::leaf(property, Predicate::StartsWith(value.into()))
    }

    /// `property:~$value`
    pub fn ends_with(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::leaf(property, Predicate::EndsWith(value.into()))
    }

    /// `property:[v1,v2,...]`
    pub fn one_of(property: impl Into<String>, values: Vec<Value>) -> Self {
        Self::leaf(property, Predicate::In(values))
    }

    /// `property:null`
    pub fn is_null(property: impl Into<String>) -> Self {
        Self::leaf(property, Predicate::Null)
    }

    /// `property:-null`
    pub fn is_not_null(property: impl Into<String>) -> Self {
        Self::leaf(property, Predicate::NotNull)
    }

    /// Conjunction of operands, wire-joined with `+`.
    #[must_use]
    pub fn and(operands: Vec<Filter>) -> Self {
        Self::And(operands)
    }

    /// Disjunction of operands, wire-joined with `,`.
    #[must_use]
    pub fn or(operands: Vec<Filter>) -> Self {
        Self::Or(operands)
    }
}
