//! Descriptions and dumps.
//!
//! Conditions render two ways: a human sentence looked up through a
//! [`StringTable`], and a canonical structural dump in a FOCS-like syntax
//! with four spaces per indent level.

use std::fmt::Write;

/// Localized sentence templates.
///
/// Templates use `%1%`, `%2%`, ... placeholders for arguments.
pub trait StringTable {
    /// The template for a key, if known.
    fn lookup(&self, key: &str) -> Option<&str>;

    /// Fills the template for `key` (or `key_NOT` when negated).
    ///
    /// Unknown keys render as the key followed by the arguments, so a
    /// missing translation is visible but never fatal.
    fn text(&self, key: &str, negated: bool, args: &[String]) -> String {
        let full_key = if negated {
            format!("{key}_NOT")
        } else {
            key.to_owned()
        };
        match self.lookup(&full_key) {
            Some(template) => fill(template, args),
            None if args.is_empty() => full_key,
            None => format!("{full_key} {}", args.join(" ")),
        }
    }
}

/// Substitutes `%n%` placeholders.
#[must_use]
pub fn fill(template: &str, args: &[String]) -> String {
    let mut out = template.to_owned();
    for (index, arg) in args.iter().enumerate() {
        out = out.replace(&format!("%{}%", index + 1), arg);
    }
    out
}

/// Leading whitespace for a dump line.
#[must_use]
pub fn indent(level: usize) -> String {
    " ".repeat(level * 4)
}

/// Builder for a single dump line: `Name field = value field = value`.
pub(crate) struct DumpLine {
    text: String,
    level: usize,
}

impl DumpLine {
    pub(crate) fn new(level: usize, name: &str) -> Self {
        Self {
            text: format!("{}{name}", indent(level)),
            level,
        }
    }

    pub(crate) fn field(mut self, name: &str, value: impl std::fmt::Display) -> Self {
        let _ = write!(self.text, " {name} = {value}");
        self
    }

    pub(crate) fn opt_field<T: std::fmt::Display>(self, name: &str, value: Option<&T>) -> Self {
        match value {
            Some(value) => self.field(name, value),
            None => self,
        }
    }

    /// Adds `name = [a b c]`, or nothing when empty.
    pub(crate) fn list<T: std::fmt::Display>(mut self, name: &str, values: &[T]) -> Self {
        match values {
            [] => {}
            [single] => {
                let _ = write!(self.text, " {name} = {single}");
            }
            many => {
                let items: Vec<String> = many.iter().map(ToString::to_string).collect();
                let _ = write!(self.text, " {name} = [{}]", items.join(" "));
            }
        }
        self
    }

    pub(crate) fn finish(mut self) -> String {
        self.text.push('\n');
        self.text
    }

    /// Ends the line with `name =` and the nested condition dump below it.
    pub(crate) fn nested(mut self, name: &str, condition: &crate::Condition) -> String {
        let _ = writeln!(self.text, " {name} =");
        self.text.push_str(&condition.dump(self.level + 1));
        self.text
    }
}

/// Joins values into readable text: `a`, `a or b`, `a, b or c`.
#[must_use]
pub fn join_alternatives(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [single] => single.clone(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}

/// The default English string table.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnglishStrings;

impl StringTable for EnglishStrings {
    fn lookup(&self, key: &str) -> Option<&str> {
        Some(match key {
            "DESC_AND" => "all of: %1%",
            "DESC_AND_NOT" => "not all of: %1%",
            "DESC_OR" => "any of: %1%",
            "DESC_OR_NOT" => "none of: %1%",
            "DESC_ORDERED_ALTERNATIVES" => "the first of these to match anything: %1%",
            "DESC_ORDERED_ALTERNATIVES_NOT" => {
                "not the first of these to match anything: %1%"
            }
            "DESC_ALL" => "all objects",
            "DESC_ALL_NOT" => "no objects",
            "DESC_NONE" => "no objects",
            "DESC_NONE_NOT" => "all objects",
            "DESC_NOOP" => "any object (no-op)",
            "DESC_NOOP_NOT" => "any object (no-op)",
            "DESC_SOURCE" => "the source object",
            "DESC_SOURCE_NOT" => "not the source object",
            "DESC_ROOT_CANDIDATE" => "the root candidate",
            "DESC_ROOT_CANDIDATE_NOT" => "not the root candidate",
            "DESC_TARGET" => "the target object",
            "DESC_TARGET_NOT" => "not the target object",
            "DESC_OBJECT_ID" => "the object with id %1%",
            "DESC_OBJECT_ID_NOT" => "not the object with id %1%",
            "DESC_TYPE" => "objects of type %1%",
            "DESC_TYPE_NOT" => "objects not of type %1%",
            "DESC_TURN" => "the current turn is between %1% and %2%",
            "DESC_TURN_NOT" => "the current turn is not between %1% and %2%",
            "DESC_CREATED_ON_TURN" => "created between turns %1% and %2%",
            "DESC_CREATED_ON_TURN_NOT" => "not created between turns %1% and %2%",
            "DESC_CHANCE" => "chosen with probability %1%",
            "DESC_CHANCE_NOT" => "not chosen with probability %1%",
            "DESC_EMPIRE_AFFILIATION" => "objects affiliated as %1% with empire %2%",
            "DESC_EMPIRE_AFFILIATION_NOT" => {
                "objects not affiliated as %1% with empire %2%"
            }
            "DESC_HOMEWORLD" => "the homeworld of %1%",
            "DESC_HOMEWORLD_NOT" => "not the homeworld of %1%",
            "DESC_CAPITAL" => "the capital of %1%",
            "DESC_CAPITAL_NOT" => "not the capital of %1%",
            "DESC_MONSTER" => "monsters",
            "DESC_MONSTER_NOT" => "non-monsters",
            "DESC_ARMED" => "armed objects",
            "DESC_ARMED_NOT" => "unarmed objects",
            "DESC_BUILDING" => "buildings of type %1%",
            "DESC_BUILDING_NOT" => "not buildings of type %1%",
            "DESC_HAS_SPECIAL" => "objects with special %1%",
            "DESC_HAS_SPECIAL_NOT" => "objects without special %1%",
            "DESC_HAS_TAG" => "objects tagged %1%",
            "DESC_HAS_TAG_NOT" => "objects not tagged %1%",
            "DESC_SPECIES" => "objects of species %1%",
            "DESC_SPECIES_NOT" => "objects not of species %1%",
            "DESC_FOCUS" => "planets with focus %1%",
            "DESC_FOCUS_NOT" => "planets without focus %1%",
            "DESC_PLANET_TYPE" => "planets of type %1%",
            "DESC_PLANET_TYPE_NOT" => "planets not of type %1%",
            "DESC_STAR_TYPE" => "objects at %1% stars",
            "DESC_STAR_TYPE_NOT" => "objects not at %1% stars",
            "DESC_STATIONARY" => "stationary objects",
            "DESC_STATIONARY_NOT" => "moving objects",
            "DESC_CAN_COLONIZE" => "objects whose species can colonize",
            "DESC_CAN_COLONIZE_NOT" => "objects whose species cannot colonize",
            "DESC_PRODUCED_BY_EMPIRE" => "objects produced by empire %1%",
            "DESC_PRODUCED_BY_EMPIRE_NOT" => "objects not produced by empire %1%",
            "DESC_OWNER_HAS_TECH" => "objects whose owner has researched %1%",
            "DESC_OWNER_HAS_TECH_NOT" => "objects whose owner has not researched %1%",
            "DESC_EMPIRE_HAS_ADOPTED_POLICY" => "empire %2% has adopted policy %1%",
            "DESC_EMPIRE_HAS_ADOPTED_POLICY_NOT" => "empire %2% has not adopted policy %1%",
            "DESC_VISIBLE_TO_EMPIRE" => "objects visible to empire %1%",
            "DESC_VISIBLE_TO_EMPIRE_NOT" => "objects not visible to empire %1%",
            "DESC_EXPLORED_BY_EMPIRE" => "systems explored by empire %1%",
            "DESC_EXPLORED_BY_EMPIRE_NOT" => "systems not explored by empire %1%",
            "DESC_FLEET_SUPPLYABLE" => "objects in fleet supply range of empire %1%",
            "DESC_FLEET_SUPPLYABLE_NOT" => "objects outside fleet supply range of empire %1%",
            "DESC_METER_VALUE" => "objects with %1% between %2% and %3%",
            "DESC_METER_VALUE_NOT" => "objects without %1% between %2% and %3%",
            "DESC_EMPIRE_METER_VALUE" => "empire %1% meter %2% is between %3% and %4%",
            "DESC_EMPIRE_METER_VALUE_NOT" => "empire %1% meter %2% is not between %3% and %4%",
            "DESC_EMPIRE_STOCKPILE" => "empire %1% has between %3% and %4% %2% stockpiled",
            "DESC_EMPIRE_STOCKPILE_NOT" => {
                "empire %1% does not have between %3% and %4% %2% stockpiled"
            }
            "DESC_VALUE_TEST" => "%1% holds",
            "DESC_VALUE_TEST_NOT" => "%1% does not hold",
            "DESC_CONTAINS" => "objects containing %1%",
            "DESC_CONTAINS_NOT" => "objects not containing %1%",
            "DESC_CONTAINED_BY" => "objects contained by %1%",
            "DESC_CONTAINED_BY_NOT" => "objects not contained by %1%",
            "DESC_IN_SYSTEM" => "objects in or being system %1%",
            "DESC_IN_SYSTEM_NOT" => "objects not in system %1%",
            "DESC_ON_PLANET" => "objects on planet %1%",
            "DESC_ON_PLANET_NOT" => "objects not on planet %1%",
            "DESC_WITHIN_DISTANCE" => "objects within %1% of %2%",
            "DESC_WITHIN_DISTANCE_NOT" => "objects further than %1% from %2%",
            "DESC_WITHIN_STARLANE_JUMPS" => "objects within %1% starlane jumps of %2%",
            "DESC_WITHIN_STARLANE_JUMPS_NOT" => {
                "objects more than %1% starlane jumps from %2%"
            }
            "DESC_HAS_STARLANE_TO" => "systems with a starlane to %1%",
            "DESC_HAS_STARLANE_TO_NOT" => "systems without a starlane to %1%",
            "DESC_NUMBER" => "between %1% and %2% objects are %3%",
            "DESC_NUMBER_NOT" => "not between %1% and %2% objects are %3%",
            "DESC_SORTED_NUMBER_OF" => "%1% objects chosen by %2% from %3%",
            "DESC_SORTED_NUMBER_OF_NOT" => "objects not among %1% chosen by %2% from %3%",
            "DESC_SUPPLY_CONNECTED" => "objects supply-connected for empire %1% to %2%",
            "DESC_SUPPLY_CONNECTED_NOT" => {
                "objects not supply-connected for empire %1% to %2%"
            }
            "DESC_LANE_CROSSES" => "systems where a lane to %1% would cross a lane",
            "DESC_LANE_CROSSES_NOT" => "systems where no lane to %1% would cross a lane",
            "DESC_LANE_ANGULARLY_CLOSE" => {
                "systems where a lane to %1% would be close in angle to a lane"
            }
            "DESC_LANE_ANGULARLY_CLOSE_NOT" => {
                "systems where no lane to %1% would be close in angle to a lane"
            }
            "DESC_LANE_CLOSE_TO_OBJECT" => {
                "systems where a lane to %1% would pass within %2% of %3%"
            }
            "DESC_LANE_CLOSE_TO_OBJECT_NOT" => {
                "systems where no lane to %1% would pass within %2% of %3%"
            }
            "DESC_CAN_ADD_STARLANE" => "systems that can gain a lane to %1%",
            "DESC_CAN_ADD_STARLANE_NOT" => "systems that cannot gain a lane to %1%",
            "DESC_LOCATION" => "a valid location for %1% %2%",
            "DESC_LOCATION_NOT" => "not a valid location for %1% %2%",
            "DESC_COMBAT_TARGET" => "a valid combat target for %1% %2%",
            "DESC_COMBAT_TARGET_NOT" => "not a valid combat target for %1% %2%",
            "DESC_ANY" => "any",
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_replaces_placeholders() {
        let text = fill("%1% then %2% then %1%", &["a".to_owned(), "b".to_owned()]);
        assert_eq!(text, "a then b then a");
    }

    #[test]
    fn negated_keys() {
        let strings = EnglishStrings;
        assert_eq!(strings.text("DESC_MONSTER", false, &[]), "monsters");
        assert_eq!(strings.text("DESC_MONSTER", true, &[]), "non-monsters");
    }

    #[test]
    fn unknown_keys_fall_back() {
        let strings = EnglishStrings;
        assert_eq!(strings.text("DESC_MISSING", false, &[]), "DESC_MISSING");
        assert_eq!(
            strings.text("DESC_MISSING", true, &["x".to_owned()]),
            "DESC_MISSING_NOT x"
        );
    }

    #[test]
    fn dump_lines() {
        let line = DumpLine::new(1, "MeterValue")
            .field("meter", "Industry")
            .opt_field("low", Some(&3))
            .opt_field::<i32>("high", None)
            .finish();
        assert_eq!(line, "    MeterValue meter = Industry low = 3\n");

        let list = DumpLine::new(0, "Species")
            .list("name", &["\"A\"", "\"B\""])
            .finish();
        assert_eq!(list, "Species name = [\"A\" \"B\"]\n");
    }

    #[test]
    fn alternatives() {
        let items: Vec<String> = ["a", "b", "c"].iter().map(|s| (*s).to_owned()).collect();
        assert_eq!(join_alternatives(&items), "a, b or c");
        assert_eq!(join_alternatives(&items[..1]), "a");
    }
}
