//! Tests that consult the empire, visibility and supply bookkeeping.
//!
//! Empire ids arrive as `ValueRef<i32>` operands. A named empire the registry
//! does not know is an error at bind time, so every candidate fails.

use astrolabe_foundation::{
    Affiliation, DiplomaticStatus, EmpireId, Error, ObjectType, Result, Visibility,
};
use astrolabe_universe::EmpireRegistry;

use super::Condition;
use super::node::{Describe, Evaluate, Matcher, bind_opt, in_range, opt_text, system_of};
use crate::checksum::Checksummer;
use crate::context::ScriptingContext;
use crate::invariance::{Invariance, Invariant};
use crate::partition::ObjectSet;
use crate::text::{DumpLine, StringTable};
use crate::value_ref::ValueRef;

fn bind_empire(empire: &ValueRef<i32>, ctx: &ScriptingContext<'_>) -> Result<EmpireId> {
    empire.eval(ctx).map(EmpireId::new)
}

fn bind_known_empire(empire: &ValueRef<i32>, ctx: &ScriptingContext<'_>) -> Result<EmpireId> {
    let id = bind_empire(empire, ctx)?;
    if ctx.empires().exists(id) {
        Ok(id)
    } else {
        Err(Error::unknown_empire(id))
    }
}

// =============================================================================
// EmpireAffiliation
// =============================================================================

/// Matches objects by their owner's relation to an empire.
///
/// `AnyEmpire` and `Unowned` ignore the empire operand; every other
/// affiliation needs it.
#[derive(Clone, Debug, PartialEq)]
pub struct EmpireAffiliation {
    pub(crate) empire: Option<ValueRef<i32>>,
    pub(crate) affiliation: Affiliation,
}

impl Condition {
    /// Objects whose owner relates to `empire` as `affiliation`.
    #[must_use]
    pub fn empire_affiliation(empire: Option<ValueRef<i32>>, affiliation: Affiliation) -> Self {
        EmpireAffiliation {
            empire,
            affiliation,
        }
        .into()
    }

    /// Objects owned by `empire`.
    #[must_use]
    pub fn owned_by(empire: impl Into<ValueRef<i32>>) -> Self {
        Self::empire_affiliation(Some(empire.into()), Affiliation::TheEmpire)
    }
}

impl Evaluate for EmpireAffiliation {
    fn invariance(&self) -> Invariance {
        self.empire.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let status = match self.affiliation {
            Affiliation::AnyEmpire => return Ok(Box::new(|obj| obj.owner.is_some())),
            Affiliation::Unowned => return Ok(Box::new(|obj| obj.owner.is_none())),
            Affiliation::TheEmpire => None,
            Affiliation::EnemyOf => Some(DiplomaticStatus::War),
            Affiliation::PeaceWith => Some(DiplomaticStatus::Peace),
            Affiliation::AllyOf => Some(DiplomaticStatus::Allied),
        };
        let empire = self
            .empire
            .as_ref()
            .ok_or_else(|| Error::missing_candidate("empire"))?;
        let Some(status) = status else {
            let id = bind_empire(empire, ctx)?;
            return Ok(Box::new(move |obj| obj.owner == Some(id)));
        };
        let id = bind_known_empire(empire, ctx)?;
        let empires = ctx.empires();
        Ok(Box::new(move |obj| {
            obj.owner
                .is_some_and(|owner| owner != id && empires.diplomatic_status(id, owner) == status)
        }))
    }
}

impl Describe for EmpireAffiliation {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let args = [
            self.affiliation.to_string(),
            opt_text(self.empire.as_ref(), strings),
        ];
        strings.text("DESC_EMPIRE_AFFILIATION", negated, &args)
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "OwnedBy")
            .opt_field("empire", self.empire.as_ref())
            .field("affiliation", self.affiliation)
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("EmpireAffiliation")
            .add(&self.empire)
            .add(&self.affiliation)
            .finish()
    }
}

// =============================================================================
// Capital
// =============================================================================

/// Matches an empire's capital, or every empire's capital when no empire is
/// given.
#[derive(Clone, Debug, PartialEq)]
pub struct Capital {
    pub(crate) empire: Option<ValueRef<i32>>,
}

impl Condition {
    /// The capital of `empire`, or of any empire.
    #[must_use]
    pub fn capital(empire: Option<ValueRef<i32>>) -> Self {
        Capital { empire }.into()
    }
}

impl Evaluate for Capital {
    fn invariance(&self) -> Invariance {
        self.empire.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let empires = ctx.empires();
        match &self.empire {
            Some(empire) => {
                let capital = empires.capital(bind_known_empire(empire, ctx)?);
                Ok(Box::new(move |obj| capital == Some(obj.id)))
            }
            None => Ok(Box::new(move |obj| {
                obj.owner
                    .and_then(|owner| empires.capital(owner))
                    .is_some_and(|capital| capital == obj.id)
            })),
        }
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        ctx.universe().objects_of_type(ObjectType::Planet)
    }
}

impl Describe for Capital {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_CAPITAL", negated, &[opt_text(self.empire.as_ref(), strings)])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Capital")
            .opt_field("empire", self.empire.as_ref())
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Capital").add(&self.empire).finish()
    }
}

// =============================================================================
// ProducedByEmpire
// =============================================================================

/// Matches ships and buildings produced by an empire.
#[derive(Clone, Debug, PartialEq)]
pub struct ProducedByEmpire {
    pub(crate) empire: ValueRef<i32>,
}

impl Condition {
    /// Objects produced by `empire`.
    #[must_use]
    pub fn produced_by_empire(empire: impl Into<ValueRef<i32>>) -> Self {
        ProducedByEmpire {
            empire: empire.into(),
        }
        .into()
    }
}

impl Evaluate for ProducedByEmpire {
    fn invariance(&self) -> Invariance {
        self.empire.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let empire = bind_empire(&self.empire, ctx)?;
        Ok(Box::new(move |obj| obj.produced_by_empire == Some(empire)))
    }
}

impl Describe for ProducedByEmpire {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_PRODUCED_BY_EMPIRE", negated, &[self.empire.dump()])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "ProducedByEmpire")
            .field("empire", &self.empire)
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("ProducedByEmpire")
            .add(&self.empire)
            .finish()
    }
}

// =============================================================================
// OwnerHasTech / EmpireHasAdoptedPolicy
// =============================================================================

macro_rules! empire_knows_node {
    (
        $(#[$meta:meta])*
        $name:ident, $ctor:ident, $lookup:ident, $key:literal, $dump:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            pub(crate) name: ValueRef<String>,
            pub(crate) empire: Option<ValueRef<i32>>,
        }

        impl Condition {
            $(#[$meta])*
            #[must_use]
            pub fn $ctor(name: impl Into<ValueRef<String>>, empire: Option<ValueRef<i32>>) -> Self {
                $name {
                    name: name.into(),
                    empire,
                }
                .into()
            }
        }

        impl $name {
            fn empire_test(&self, ctx: &ScriptingContext<'_>, empire: &ValueRef<i32>) -> Result<bool> {
                let id = bind_known_empire(empire, ctx)?;
                let name = self.name.eval(ctx)?;
                Ok(ctx.empires().$lookup(id, &name))
            }
        }

        impl Evaluate for $name {
            fn invariance(&self) -> Invariance {
                self.name.invariance().and(self.empire.invariance())
            }

            fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
                if let Some(empire) = &self.empire {
                    let pass = self.empire_test(ctx, empire)?;
                    return Ok(Box::new(move |_| pass));
                }
                let name = self.name.eval(ctx)?;
                let empires: &dyn EmpireRegistry = ctx.empires();
                Ok(Box::new(move |obj| {
                    obj.owner.is_some_and(|owner| empires.$lookup(owner, &name))
                }))
            }

            fn context_test(&self, ctx: &ScriptingContext<'_>) -> Option<Result<bool>> {
                self.empire
                    .as_ref()
                    .map(|empire| self.empire_test(ctx, empire))
            }
        }

        impl Describe for $name {
            fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
                let args = [self.name.dump(), opt_text(self.empire.as_ref(), strings)];
                strings.text($key, negated, &args)
            }

            fn dump(&self, level: usize) -> String {
                DumpLine::new(level, $dump)
                    .field("name", &self.name)
                    .opt_field("empire", self.empire.as_ref())
                    .finish()
            }

            fn checksum(&self) -> u32 {
                Checksummer::tagged(stringify!($name))
                    .add(&self.name)
                    .add(&self.empire)
                    .finish()
            }
        }
    };
}

empire_knows_node!(
    /// Matches objects whose owner has researched a tech.
    ///
    /// With an explicit empire, tests that empire for every candidate.
    OwnerHasTech,
    owner_has_tech,
    has_tech,
    "DESC_OWNER_HAS_TECH",
    "OwnerHasTech"
);
empire_knows_node!(
    /// Matches objects whose owner has adopted a policy.
    ///
    /// With an explicit empire, tests that empire for every candidate.
    EmpireHasAdoptedPolicy,
    empire_has_adopted_policy,
    has_adopted_policy,
    "DESC_EMPIRE_HAS_ADOPTED_POLICY",
    "EmpireHasAdoptedPolicy"
);

// =============================================================================
// VisibleToEmpire / ExploredByEmpire / FleetSupplyableByEmpire
// =============================================================================

/// Matches objects an empire sees at least at a given level.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleToEmpire {
    pub(crate) empire: ValueRef<i32>,
    pub(crate) visibility: Visibility,
}

impl Condition {
    /// Objects `empire` sees at `Partial` visibility or better.
    #[must_use]
    pub fn visible_to_empire(empire: impl Into<ValueRef<i32>>) -> Self {
        Self::visible_to_empire_at(empire, Visibility::Partial)
    }

    /// Objects `empire` sees at `visibility` or better.
    #[must_use]
    pub fn visible_to_empire_at(empire: impl Into<ValueRef<i32>>, visibility: Visibility) -> Self {
        VisibleToEmpire {
            empire: empire.into(),
            visibility,
        }
        .into()
    }
}

impl Evaluate for VisibleToEmpire {
    fn invariance(&self) -> Invariance {
        self.empire.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let empire = bind_empire(&self.empire, ctx)?;
        let universe = ctx.universe();
        let threshold = self.visibility;
        Ok(Box::new(move |obj| universe.visibility(empire, obj.id) >= threshold))
    }
}

impl Describe for VisibleToEmpire {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_VISIBLE_TO_EMPIRE", negated, &[self.empire.dump()])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "VisibleToEmpire")
            .field("empire", &self.empire)
            .field("visibility", self.visibility)
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("VisibleToEmpire")
            .add(&self.empire)
            .add(&self.visibility)
            .finish()
    }
}

/// Matches systems an empire has explored.
#[derive(Clone, Debug, PartialEq)]
pub struct ExploredByEmpire {
    pub(crate) empire: ValueRef<i32>,
}

impl Condition {
    /// Systems explored by `empire`.
    #[must_use]
    pub fn explored_by_empire(empire: impl Into<ValueRef<i32>>) -> Self {
        ExploredByEmpire {
            empire: empire.into(),
        }
        .into()
    }
}

impl Evaluate for ExploredByEmpire {
    fn invariance(&self) -> Invariance {
        self.empire.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let empire = bind_known_empire(&self.empire, ctx)?;
        let empires = ctx.empires();
        Ok(Box::new(move |obj| {
            obj.object_type == ObjectType::System && empires.has_explored(empire, obj.id)
        }))
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        ctx.universe().objects_of_type(ObjectType::System)
    }
}

impl Describe for ExploredByEmpire {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_EXPLORED_BY_EMPIRE", negated, &[self.empire.dump()])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "ExploredByEmpire")
            .field("empire", &self.empire)
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("ExploredByEmpire")
            .add(&self.empire)
            .finish()
    }
}

/// Matches objects in a system an empire can supply fleets in.
#[derive(Clone, Debug, PartialEq)]
pub struct FleetSupplyableByEmpire {
    pub(crate) empire: ValueRef<i32>,
}

impl Condition {
    /// Objects inside `empire`'s fleet supply range.
    #[must_use]
    pub fn fleet_supplyable_by_empire(empire: impl Into<ValueRef<i32>>) -> Self {
        FleetSupplyableByEmpire {
            empire: empire.into(),
        }
        .into()
    }
}

impl Evaluate for FleetSupplyableByEmpire {
    fn invariance(&self) -> Invariance {
        self.empire.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let empire = bind_empire(&self.empire, ctx)?;
        let systems = ctx
            .supply()
            .fleet_supplyable_systems(empire)
            .ok_or_else(|| Error::unknown_empire(empire))?;
        Ok(Box::new(move |obj| {
            system_of(obj).is_some_and(|system| systems.contains(&system))
        }))
    }
}

impl Describe for FleetSupplyableByEmpire {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_FLEET_SUPPLYABLE", negated, &[self.empire.dump()])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "FleetSupplyableByEmpire")
            .field("empire", &self.empire)
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("FleetSupplyableByEmpire")
            .add(&self.empire)
            .finish()
    }
}

// =============================================================================
// EmpireMeterValue / EmpireStockpileValue
// =============================================================================

macro_rules! empire_quantity_node {
    (
        $(#[$meta:meta])*
        $name:ident, $ctor:ident, $field:ident, $lookup:ident, $key:literal, $dump:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            pub(crate) empire: Option<ValueRef<i32>>,
            pub(crate) $field: String,
            pub(crate) low: Option<ValueRef<f64>>,
            pub(crate) high: Option<ValueRef<f64>>,
        }

        impl Condition {
            $(#[$meta])*
            #[must_use]
            pub fn $ctor(
                empire: Option<ValueRef<i32>>,
                $field: impl Into<String>,
                low: Option<ValueRef<f64>>,
                high: Option<ValueRef<f64>>,
            ) -> Self {
                $name {
                    empire,
                    $field: $field.into(),
                    low,
                    high,
                }
                .into()
            }
        }

        impl $name {
            fn in_bounds(
                &self,
                ctx: &ScriptingContext<'_>,
                empire: EmpireId,
                low: Option<f64>,
                high: Option<f64>,
            ) -> bool {
                ctx.empires()
                    .$lookup(empire, &self.$field)
                    .is_some_and(|value| in_range(&value, low.as_ref(), high.as_ref()))
            }

            fn empire_test(&self, ctx: &ScriptingContext<'_>, empire: &ValueRef<i32>) -> Result<bool> {
                let id = bind_known_empire(empire, ctx)?;
                let low = bind_opt(self.low.as_ref(), ctx)?;
                let high = bind_opt(self.high.as_ref(), ctx)?;
                Ok(self.in_bounds(ctx, id, low, high))
            }
        }

        impl Evaluate for $name {
            fn invariance(&self) -> Invariance {
                self.empire
                    .invariance()
                    .and(self.low.invariance())
                    .and(self.high.invariance())
            }

            fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
                if let Some(empire) = &self.empire {
                    let pass = self.empire_test(ctx, empire)?;
                    return Ok(Box::new(move |_| pass));
                }
                let low = bind_opt(self.low.as_ref(), ctx)?;
                let high = bind_opt(self.high.as_ref(), ctx)?;
                let ctx = *ctx;
                Ok(Box::new(move |obj| {
                    obj.owner
                        .is_some_and(|owner| self.in_bounds(&ctx, owner, low, high))
                }))
            }

            fn context_test(&self, ctx: &ScriptingContext<'_>) -> Option<Result<bool>> {
                self.empire
                    .as_ref()
                    .map(|empire| self.empire_test(ctx, empire))
            }
        }

        impl Describe for $name {
            fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
                let args = [
                    opt_text(self.empire.as_ref(), strings),
                    self.$field.clone(),
                    opt_text(self.low.as_ref(), strings),
                    opt_text(self.high.as_ref(), strings),
                ];
                strings.text($key, negated, &args)
            }

            fn dump(&self, level: usize) -> String {
                DumpLine::new(level, $dump)
                    .opt_field("empire", self.empire.as_ref())
                    .field(stringify!($field), format!("\"{}\"", self.$field))
                    .opt_field("low", self.low.as_ref())
                    .opt_field("high", self.high.as_ref())
                    .finish()
            }

            fn checksum(&self) -> u32 {
                Checksummer::tagged(stringify!($name))
                    .add(&self.empire)
                    .add(&self.$field)
                    .add(&self.low)
                    .add(&self.high)
                    .finish()
            }
        }
    };
}

empire_quantity_node!(
    /// Matches when an empire meter lies in `[low, high]`.
    ///
    /// With an explicit empire the test is the same for every candidate;
    /// otherwise each candidate's owner is tested.
    EmpireMeterValue,
    empire_meter_value,
    meter,
    meter,
    "DESC_EMPIRE_METER_VALUE",
    "EmpireMeter"
);
empire_quantity_node!(
    /// Matches when an empire's stockpile of a resource lies in `[low, high]`.
    ///
    /// With an explicit empire the test is the same for every candidate;
    /// otherwise each candidate's owner is tested.
    EmpireStockpileValue,
    empire_stockpile_value,
    resource,
    stockpile,
    "DESC_EMPIRE_STOCKPILE",
    "EmpireStockpile"
);
