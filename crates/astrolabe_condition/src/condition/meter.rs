//! Meter ranges and free-standing value comparisons.

use astrolabe_foundation::{MeterType, Result};

use super::Condition;
use super::node::{Describe, Evaluate, Matcher, bind_opt, in_range, opt_text};
use crate::checksum::Checksummer;
use crate::context::ScriptingContext;
use crate::invariance::{Invariance, Invariant};
use crate::text::{DumpLine, StringTable};
use crate::value_ref::{ComparisonType, ValueRef};

// =============================================================================
// MeterValue
// =============================================================================

/// Matches objects whose meter lies in `[low, high]`.
///
/// Objects without the meter never match.
#[derive(Clone, Debug, PartialEq)]
pub struct MeterValue {
    pub(crate) meter: MeterType,
    pub(crate) low: Option<ValueRef<f64>>,
    pub(crate) high: Option<ValueRef<f64>>,
}

impl Condition {
    /// Objects whose `meter` is in `[low, high]`; missing bounds are open.
    #[must_use]
    pub fn meter_value(
        meter: MeterType,
        low: Option<ValueRef<f64>>,
        high: Option<ValueRef<f64>>,
    ) -> Self {
        MeterValue { meter, low, high }.into()
    }
}

impl Evaluate for MeterValue {
    fn invariance(&self) -> Invariance {
        self.low.invariance().and(self.high.invariance())
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let low = bind_opt(self.low.as_ref(), ctx)?;
        let high = bind_opt(self.high.as_ref(), ctx)?;
        let meter = self.meter;
        Ok(Box::new(move |obj| {
            obj.meter(meter)
                .is_some_and(|value| in_range(&value, low.as_ref(), high.as_ref()))
        }))
    }
}

impl Describe for MeterValue {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let args = [
            self.meter.to_string(),
            opt_text(self.low.as_ref(), strings),
            opt_text(self.high.as_ref(), strings),
        ];
        strings.text("DESC_METER_VALUE", negated, &args)
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "MeterValue")
            .field("meter", self.meter)
            .opt_field("low", self.low.as_ref())
            .opt_field("high", self.high.as_ref())
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("MeterValue")
            .add(&self.meter)
            .add(&self.low)
            .add(&self.high)
            .finish()
    }
}

// =============================================================================
// ValueTest
// =============================================================================

/// A chained comparison `value1 op1 value2 [op2 value3]`.
///
/// The result does not depend on which object is tested, only on the
/// context the values are evaluated in.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueTest {
    pub(crate) value1: ValueRef<f64>,
    pub(crate) compare1: ComparisonType,
    pub(crate) value2: ValueRef<f64>,
    pub(crate) compare2: Option<ComparisonType>,
    pub(crate) value3: Option<ValueRef<f64>>,
}

impl Condition {
    /// `value1 compare value2`.
    #[must_use]
    pub fn value_test(
        value1: impl Into<ValueRef<f64>>,
        compare: ComparisonType,
        value2: impl Into<ValueRef<f64>>,
    ) -> Self {
        ValueTest {
            value1: value1.into(),
            compare1: compare,
            value2: value2.into(),
            compare2: None,
            value3: None,
        }
        .into()
    }

    /// `value1 compare1 value2 compare2 value3`.
    #[must_use]
    pub fn value_test_chained(
        value1: impl Into<ValueRef<f64>>,
        compare1: ComparisonType,
        value2: impl Into<ValueRef<f64>>,
        compare2: ComparisonType,
        value3: impl Into<ValueRef<f64>>,
    ) -> Self {
        ValueTest {
            value1: value1.into(),
            compare1,
            value2: value2.into(),
            compare2: Some(compare2),
            value3: Some(value3.into()),
        }
        .into()
    }
}

impl ValueTest {
    fn test(&self, ctx: &ScriptingContext<'_>) -> Result<bool> {
        let value1 = self.value1.eval(ctx)?;
        let value2 = self.value2.eval(ctx)?;
        if !self.compare1.compare(&value1, &value2) {
            return Ok(false);
        }
        match (self.compare2, &self.value3) {
            (Some(compare2), Some(value3)) => Ok(compare2.compare(&value2, &value3.eval(ctx)?)),
            _ => Ok(true),
        }
    }

    fn expression(&self) -> String {
        let text = format!(
            "{} {} {}",
            self.value1.dump(),
            self.compare1.symbol(),
            self.value2.dump()
        );
        match (self.compare2, &self.value3) {
            (Some(compare2), Some(value3)) => {
                format!("{text} {} {}", compare2.symbol(), value3.dump())
            }
            _ => text,
        }
    }
}

impl Evaluate for ValueTest {
    fn invariance(&self) -> Invariance {
        self.value1
            .invariance()
            .and(self.value2.invariance())
            .and(self.value3.invariance())
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let pass = self.test(ctx)?;
        Ok(Box::new(move |_| pass))
    }

    fn context_test(&self, ctx: &ScriptingContext<'_>) -> Option<Result<bool>> {
        Some(self.test(ctx))
    }
}

impl Describe for ValueTest {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_VALUE_TEST", negated, &[self.expression()])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, &format!("({})", self.expression())).finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("ValueTest")
            .add(&self.value1)
            .add(&self.compare1)
            .add(&self.value2)
            .add(&self.compare2)
            .add(&self.value3)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::seeded_rng;
    use astrolabe_foundation::{ObjectId, PlanetType};
    use astrolabe_universe::{ObjectProperty, Universe, UniverseObject};

    fn planets() -> (Universe, Vec<ObjectId>) {
        let mut universe = Universe::new();
        let mut ids = Vec::new();
        for population in [1.0, 3.0, 5.0] {
            let planet = UniverseObject::planet(format!("P{population}"), PlanetType::Terran)
                .with_meter(MeterType::Population, population);
            let (u, id) = universe.spawn(planet);
            universe = u;
            ids.push(id);
        }
        let (u, barren) = universe.spawn(UniverseObject::planet("Empty", PlanetType::Barren));
        ids.push(barren);
        (u, ids)
    }

    #[test]
    fn meter_bounds_are_inclusive() {
        let (u, ids) = planets();
        let rng = seeded_rng(0);
        let ctx = ScriptingContext::new(&u, &rng);
        let condition = Condition::meter_value(MeterType::Population, Some(3.0.into()), Some(5.0.into()));
        let (matches, non_matches) = condition.partition(&ctx, &ids);
        assert_eq!(matches, vec![ids[1], ids[2]]);
        assert_eq!(non_matches, vec![ids[0], ids[3]]);
    }

    #[test]
    fn meter_bound_from_source() {
        let (u, ids) = planets();
        let rng = seeded_rng(0);
        let ctx = ScriptingContext::new(&u, &rng).with_source(ids[1]);
        let above_source = Condition::meter_value(
            MeterType::Population,
            Some(ValueRef::source(ObjectProperty::Meter(MeterType::Population))),
            None,
        );
        assert_eq!(above_source.partition(&ctx, &ids).0, vec![ids[1], ids[2]]);
    }

    #[test]
    fn meter_relative_to_candidate() {
        let (u, ids) = planets();
        let rng = seeded_rng(0);
        let ctx = ScriptingContext::new(&u, &rng);
        let own_population = ValueRef::local(ObjectProperty::Meter(MeterType::Population));
        let condition = Condition::meter_value(MeterType::Population, Some(own_population), None);
        assert!(!condition.local_candidate_invariant());
        assert_eq!(condition.partition(&ctx, &ids).0, ids[..3].to_vec());
    }

    #[test]
    fn value_tests() {
        let (u, ids) = planets();
        let rng = seeded_rng(0);
        let ctx = ScriptingContext::new(&u, &rng).with_turn(10);

        let late = Condition::value_test(ValueRef::<f64>::CurrentTurn, ComparisonType::GreaterOrEqual, 10.0);
        assert_eq!(late.partition(&ctx, &ids).0, ids);

        let window = Condition::value_test_chained(
            5.0,
            ComparisonType::Less,
            ValueRef::<f64>::CurrentTurn,
            ComparisonType::Less,
            10.0,
        );
        assert!(window.partition(&ctx, &ids).0.is_empty());
    }

    #[test]
    fn value_test_per_candidate() {
        let (u, ids) = planets();
        let rng = seeded_rng(0);
        let ctx = ScriptingContext::new(&u, &rng);
        let crowded = Condition::value_test(
            ValueRef::<f64>::local(ObjectProperty::Meter(MeterType::Population)),
            ComparisonType::Greater,
            2.0,
        );
        assert_eq!(crowded.partition(&ctx, &ids).0, vec![ids[1], ids[2]]);
    }

    #[test]
    fn dumps() {
        let condition = Condition::meter_value(MeterType::Industry, None, Some(2.5.into()));
        assert_eq!(condition.dump(0), "MeterValue meter = Industry high = 2.5\n");
        let test = Condition::value_test(ValueRef::<f64>::CurrentTurn, ComparisonType::Less, 3.0);
        assert_eq!(test.dump(1), "    (CurrentTurn < 3)\n");
    }
}
