//! Value references: the operands of condition nodes.
//!
//! A [`ValueRef`] is either a literal or an expression evaluated against a
//! [`ScriptingContext`]. Each reference reports which context objects it
//! reads, so nodes know whether it can be evaluated once per call or must
//! be evaluated per candidate.
//!
//! # Example
//!
//! ```text
//! LocalCandidate.Population      Variable { LocalCandidate, Meter(Population) }
//! (Source.Industry * 2)          Operation { Times, [Variable, Constant] }
//! Statistic Count condition = …  Statistic { Count, None, condition }
//! ```

use std::fmt;

use astrolabe_foundation::{Error, ErrorKind, ObjectId, Result, Value};
use astrolabe_universe::ObjectProperty;

use crate::checksum::{CheckSum, Checksummer};
use crate::condition::Condition;
use crate::context::ScriptingContext;
use crate::invariance::{Invariance, Invariant};

// =============================================================================
// Reference, operator and statistic kinds
// =============================================================================

/// Which context object a variable reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    /// The object the enclosing effect or script belongs to.
    Source,
    /// The object the enclosing effect acts on.
    Target,
    /// The object currently being tested.
    LocalCandidate,
    /// The candidate of the outermost condition.
    RootCandidate,
}

impl ReferenceType {
    /// Name used in dumps.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::Target => "Target",
            Self::LocalCandidate => "LocalCandidate",
            Self::RootCandidate => "RootCandidate",
        }
    }

    /// The referenced object id in a context.
    #[must_use]
    pub fn resolve(self, ctx: &ScriptingContext<'_>) -> Option<ObjectId> {
        match self {
            Self::Source => ctx.source(),
            Self::Target => ctx.target(),
            Self::LocalCandidate => ctx.local_candidate(),
            Self::RootCandidate => ctx.root_candidate(),
        }
    }

    /// Flags of an expression that reads only this reference.
    #[must_use]
    pub const fn invariance(self) -> Invariance {
        let all = Invariance::ALL;
        match self {
            Self::Source => Invariance {
                source: false,
                ..all
            },
            Self::Target => Invariance {
                target: false,
                ..all
            },
            Self::LocalCandidate => Invariance {
                local_candidate: false,
                ..all
            },
            Self::RootCandidate => Invariance {
                root_candidate: false,
                ..all
            },
        }
    }
}

/// Arithmetic and string operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpType {
    /// Sum, or concatenation for strings.
    Plus,
    /// First operand minus the rest.
    Minus,
    /// Product.
    Times,
    /// First operand divided by the rest.
    Divide,
    /// Negation of a single operand.
    Negate,
    /// Smallest operand.
    Minimum,
    /// Largest operand.
    Maximum,
    /// Absolute value of a single operand.
    Abs,
}

impl OpType {
    /// Name used in dumps and checksums.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plus => "Plus",
            Self::Minus => "Minus",
            Self::Times => "Times",
            Self::Divide => "Divide",
            Self::Negate => "Negate",
            Self::Minimum => "Min",
            Self::Maximum => "Max",
            Self::Abs => "Abs",
        }
    }

    const fn infix(self) -> Option<&'static str> {
        match self {
            Self::Plus => Some(" + "),
            Self::Minus => Some(" - "),
            Self::Times => Some(" * "),
            Self::Divide => Some(" / "),
            _ => None,
        }
    }
}

/// Aggregations over the objects matched by a sampling condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatisticType {
    /// Number of matched objects.
    Count,
    /// Sum of a property over matched objects.
    Sum,
    /// Smallest property value, 0 when nothing matches.
    Min,
    /// Largest property value, 0 when nothing matches.
    Max,
    /// Mean property value, 0 when nothing matches.
    Mean,
    /// 1 if anything matches, else 0.
    If,
}

impl StatisticType {
    /// Name used in dumps and checksums.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Count => "Count",
            Self::Sum => "Sum",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Mean => "Mean",
            Self::If => "If",
        }
    }
}

/// Comparisons used by `ValueTest`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonType {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
}

impl ComparisonType {
    /// Applies the comparison.
    #[must_use]
    pub fn compare<T: PartialOrd>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Self::Equal => lhs == rhs,
            Self::NotEqual => lhs != rhs,
            Self::Less => lhs < rhs,
            Self::LessOrEqual => lhs <= rhs,
            Self::Greater => lhs > rhs,
            Self::GreaterOrEqual => lhs >= rhs,
        }
    }

    /// Operator symbol used in dumps.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }
}

impl CheckSum for ComparisonType {
    fn check_sum(&self) -> u32 {
        self.symbol().check_sum()
    }
}

// =============================================================================
// Value kinds
// =============================================================================

/// The scalar types a [`ValueRef`] can produce.
pub trait ValueKind: Clone + fmt::Debug + PartialEq + CheckSum + Sized {
    /// Type name used in mismatch errors.
    const TYPE_NAME: &'static str;

    /// Converts a property value, if the types agree.
    fn from_value(value: &Value) -> Option<Self>;

    /// Converts a turn or bout number.
    fn from_int(n: i32) -> Self;

    /// Converts the result of a statistic.
    fn from_statistic(n: f64) -> Self;

    /// Applies an operator to evaluated operands.
    ///
    /// # Errors
    /// Returns an error for operators the type does not support, missing
    /// operands, and division by zero.
    fn operate(op: OpType, operands: Vec<Self>) -> Result<Self>;

    /// Literal text used in dumps.
    fn render(&self) -> String;
}

fn first_operand<T>(op: OpType, operands: Vec<T>) -> Result<(T, std::vec::IntoIter<T>)> {
    let mut iter = operands.into_iter();
    let first = iter.next().ok_or_else(|| {
        Error::new(ErrorKind::Internal(format!(
            "{} requires at least one operand",
            op.name()
        )))
    })?;
    Ok((first, iter))
}

impl ValueKind for i32 {
    const TYPE_NAME: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }

    fn from_int(n: i32) -> Self {
        n
    }

    fn from_statistic(n: f64) -> Self {
        // Float to int casts saturate.
        #[allow(clippy::cast_possible_truncation)]
        let rounded = n.round() as i32;
        rounded
    }

    fn operate(op: OpType, operands: Vec<Self>) -> Result<Self> {
        let (first, mut rest) = first_operand(op, operands)?;
        match op {
            OpType::Plus => Ok(rest.fold(first, i32::saturating_add)),
            OpType::Times => Ok(rest.fold(first, i32::saturating_mul)),
            OpType::Minus => Ok(rest.fold(first, i32::saturating_sub)),
            OpType::Divide => rest.try_fold(first, |acc, divisor| {
                if divisor == 0 {
                    Err(Error::new(ErrorKind::DivisionByZero))
                } else {
                    Ok(acc.saturating_div(divisor))
                }
            }),
            OpType::Negate => Ok(first.saturating_neg()),
            OpType::Abs => Ok(first.saturating_abs()),
            OpType::Minimum => Ok(rest.fold(first, i32::min)),
            OpType::Maximum => Ok(rest.fold(first, i32::max)),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl ValueKind for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_number()
    }

    fn from_int(n: i32) -> Self {
        f64::from(n)
    }

    fn from_statistic(n: f64) -> Self {
        n
    }

    fn operate(op: OpType, operands: Vec<Self>) -> Result<Self> {
        let (first, mut rest) = first_operand(op, operands)?;
        match op {
            OpType::Plus => Ok(rest.fold(first, |a, b| a + b)),
            OpType::Times => Ok(rest.fold(first, |a, b| a * b)),
            OpType::Minus => Ok(rest.fold(first, |a, b| a - b)),
            OpType::Divide => rest.try_fold(first, |acc, divisor| {
                if divisor == 0.0 {
                    Err(Error::new(ErrorKind::DivisionByZero))
                } else {
                    Ok(acc / divisor)
                }
            }),
            OpType::Negate => Ok(-first),
            OpType::Abs => Ok(first.abs()),
            OpType::Minimum => Ok(rest.fold(first, f64::min)),
            OpType::Maximum => Ok(rest.fold(first, f64::max)),
        }
    }

    fn render(&self) -> String {
        format!("{self}")
    }
}

impl ValueKind for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }

    fn from_int(n: i32) -> Self {
        n.to_string()
    }

    fn from_statistic(n: f64) -> Self {
        format!("{n}")
    }

    fn operate(op: OpType, operands: Vec<Self>) -> Result<Self> {
        let (first, rest) = first_operand(op, operands)?;
        match op {
            OpType::Plus => Ok(rest.fold(first, |mut acc, s| {
                acc.push_str(&s);
                acc
            })),
            OpType::Minimum => Ok(rest.fold(first, std::cmp::min)),
            OpType::Maximum => Ok(rest.fold(first, std::cmp::max)),
            _ => Err(Error::type_mismatch("number", "string")),
        }
    }

    fn render(&self) -> String {
        format!("\"{self}\"")
    }
}

// =============================================================================
// ValueRef
// =============================================================================

/// A literal or computed operand producing a `T`.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueRef<T: ValueKind> {
    /// A literal.
    Constant(T),
    /// A property of a context object.
    Variable {
        /// Which context object to read.
        reference: ReferenceType,
        /// Which property to read.
        property: ObjectProperty,
    },
    /// The context's current turn.
    CurrentTurn,
    /// The context's current combat bout.
    CombatBout,
    /// An operator applied to sub-expressions.
    Operation {
        /// The operator.
        op: OpType,
        /// Its operands, in order.
        operands: Vec<ValueRef<T>>,
    },
    /// An aggregate over the objects a sampling condition matches.
    Statistic {
        /// The aggregation.
        statistic: StatisticType,
        /// Property aggregated; unused by `Count` and `If`.
        property: Option<ObjectProperty>,
        /// Sampling condition, evaluated over its default candidates.
        condition: Box<Condition>,
    },
}

impl<T: ValueKind> ValueRef<T> {
    /// A literal.
    #[must_use]
    pub fn constant(value: impl Into<T>) -> Self {
        Self::Constant(value.into())
    }

    /// A property of a context object.
    #[must_use]
    pub const fn variable(reference: ReferenceType, property: ObjectProperty) -> Self {
        Self::Variable {
            reference,
            property,
        }
    }

    /// A property of the local candidate.
    #[must_use]
    pub const fn local(property: ObjectProperty) -> Self {
        Self::variable(ReferenceType::LocalCandidate, property)
    }

    /// A property of the root candidate.
    #[must_use]
    pub const fn root(property: ObjectProperty) -> Self {
        Self::variable(ReferenceType::RootCandidate, property)
    }

    /// A property of the source object.
    #[must_use]
    pub const fn source(property: ObjectProperty) -> Self {
        Self::variable(ReferenceType::Source, property)
    }

    /// A property of the target object.
    #[must_use]
    pub const fn target(property: ObjectProperty) -> Self {
        Self::variable(ReferenceType::Target, property)
    }

    /// An operator applied to operands.
    #[must_use]
    pub fn operation(op: OpType, operands: Vec<ValueRef<T>>) -> Self {
        Self::Operation { op, operands }
    }

    /// An aggregate over a sampling condition.
    #[must_use]
    pub fn statistic(
        statistic: StatisticType,
        property: Option<ObjectProperty>,
        condition: Condition,
    ) -> Self {
        Self::Statistic {
            statistic,
            property,
            condition: Box::new(condition),
        }
    }

    /// The literal value, if this is a constant.
    #[must_use]
    pub fn constant_value(&self) -> Option<&T> {
        match self {
            Self::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Evaluates the reference.
    ///
    /// # Errors
    /// Returns an error when a referenced object is absent, a property has
    /// the wrong type, or an operator fails.
    pub fn eval(&self, ctx: &ScriptingContext<'_>) -> Result<T> {
        match self {
            Self::Constant(value) => Ok(value.clone()),
            Self::Variable {
                reference,
                property,
            } => {
                let id = reference
                    .resolve(ctx)
                    .ok_or_else(|| Error::missing_candidate(reference.name()))?;
                let object = ctx.object(id).ok_or_else(|| Error::object_not_found(id))?;
                let value = object.property(*property, ctx.current_turn());
                T::from_value(&value)
                    .ok_or_else(|| Error::type_mismatch(T::TYPE_NAME, value.type_name()))
            }
            Self::CurrentTurn => Ok(T::from_int(ctx.current_turn())),
            Self::CombatBout => Ok(T::from_int(ctx.combat_bout())),
            Self::Operation { op, operands } => {
                let values = operands
                    .iter()
                    .map(|operand| operand.eval(ctx))
                    .collect::<Result<Vec<_>>>()?;
                T::operate(*op, values)
            }
            Self::Statistic {
                statistic,
                property,
                condition,
            } => Ok(T::from_statistic(Self::statistic_value(
                ctx, *statistic, *property, condition,
            )?)),
        }
    }

    fn statistic_value(
        ctx: &ScriptingContext<'_>,
        statistic: StatisticType,
        property: Option<ObjectProperty>,
        condition: &Condition,
    ) -> Result<f64> {
        let matched = condition.matching(ctx);
        let count = f64::from(u32::try_from(matched.len()).unwrap_or(u32::MAX));
        match statistic {
            StatisticType::Count => return Ok(count),
            StatisticType::If => return Ok(if matched.is_empty() { 0.0 } else { 1.0 }),
            _ => {}
        }

        let property = property.ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!(
                "statistic {} requires a property",
                statistic.name()
            )))
        })?;
        let values = matched
            .iter()
            .filter_map(|&id| ctx.object(id))
            .map(|object| {
                let value = object.property(property, ctx.current_turn());
                value
                    .as_number()
                    .ok_or_else(|| Error::type_mismatch("number", value.type_name()))
            })
            .collect::<Result<Vec<f64>>>()?;

        if values.is_empty() {
            return Ok(0.0);
        }
        Ok(match statistic {
            StatisticType::Sum => values.iter().sum(),
            StatisticType::Mean => values.iter().sum::<f64>() / count,
            StatisticType::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            StatisticType::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            StatisticType::Count | StatisticType::If => count,
        })
    }

    /// Canonical single-line text.
    #[must_use]
    pub fn dump(&self) -> String {
        match self {
            Self::Constant(value) => value.render(),
            Self::Variable {
                reference,
                property,
            } => format!("{}.{}", reference.name(), property.name()),
            Self::CurrentTurn => "CurrentTurn".to_owned(),
            Self::CombatBout => "CombatBout".to_owned(),
            Self::Operation { op, operands } => {
                let parts: Vec<String> = operands.iter().map(ValueRef::dump).collect();
                match op.infix() {
                    Some(symbol) => format!("({})", parts.join(symbol)),
                    None if *op == OpType::Negate => format!("-({})", parts.join(", ")),
                    None => format!("{}({})", op.name(), parts.join(", ")),
                }
            }
            Self::Statistic {
                statistic,
                property,
                condition,
            } => {
                let value = property.map_or_else(String::new, |p| format!(" value = {}", p.name()));
                format!(
                    "Statistic {}{value} condition = {}",
                    statistic.name(),
                    condition.dump(0).trim_end()
                )
            }
        }
    }
}

impl<T: ValueKind> Invariant for ValueRef<T> {
    fn invariance(&self) -> Invariance {
        match self {
            Self::Constant(_) | Self::CurrentTurn | Self::CombatBout => Invariance::ALL,
            Self::Variable { reference, .. } => reference.invariance(),
            Self::Operation { operands, .. } => operands.invariance(),
            Self::Statistic { condition, .. } => condition.invariance().nested(),
        }
    }
}

impl<T: ValueKind> CheckSum for ValueRef<T> {
    fn check_sum(&self) -> u32 {
        match self {
            Self::Constant(value) => Checksummer::tagged("Constant").add(value).finish(),
            Self::Variable {
                reference,
                property,
            } => Checksummer::tagged("Variable")
                .add(reference.name())
                .add(property)
                .finish(),
            Self::CurrentTurn => Checksummer::tagged("CurrentTurn").finish(),
            Self::CombatBout => Checksummer::tagged("CombatBout").finish(),
            Self::Operation { op, operands } => Checksummer::tagged("Operation")
                .add(op.name())
                .add(operands)
                .finish(),
            Self::Statistic {
                statistic,
                property,
                condition,
            } => Checksummer::tagged("Statistic")
                .add(statistic.name())
                .add(property)
                .add(condition.as_ref())
                .finish(),
        }
    }
}

impl<T: ValueKind> fmt::Display for ValueRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

impl From<i32> for ValueRef<i32> {
    fn from(value: i32) -> Self {
        Self::Constant(value)
    }
}

impl From<f64> for ValueRef<f64> {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<&str> for ValueRef<String> {
    fn from(value: &str) -> Self {
        Self::Constant(value.to_owned())
    }
}

impl From<String> for ValueRef<String> {
    fn from(value: String) -> Self {
        Self::Constant(value)
    }
}
