//! Domain enumerations shared by the universe and the condition engine.
//!
//! Every enumeration renders with the same name the dump format uses, so
//! `format!("{}", ObjectType::Planet)` yields `Planet`.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Canonical name used in dumps and descriptions.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Looks up a variant by its canonical name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.name() == name)
            }

            /// Position in declaration order, stable across builds.
            #[must_use]
            pub fn ordinal(self) -> u32 {
                // Variant counts are tiny; the cast cannot truncate.
                #[allow(clippy::cast_possible_truncation)]
                let ordinal = self as u32;
                ordinal
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_enum! {
    /// Concrete kind of a universe object.
    pub enum ObjectType {
        /// A structure on a planet.
        Building => "Building",
        /// A single vessel.
        Ship => "Ship",
        /// A group of ships moving together.
        Fleet => "Fleet",
        /// A planet orbiting a system.
        Planet => "Planet",
        /// A star system, the node of the starlane graph.
        System => "System",
        /// A moving area effect such as an ion storm.
        Field => "Field",
        /// A short-lived combat object.
        Fighter => "Fighter",
    }
}

named_enum! {
    /// Named numeric gauges attached to objects.
    pub enum MeterType {
        /// Current population.
        Population => "Population",
        /// Population the planet is growing toward.
        TargetPopulation => "TargetPopulation",
        /// Industry output.
        Industry => "Industry",
        /// Research output.
        Research => "Research",
        /// Influence output.
        Influence => "Influence",
        /// Happiness (stability) of the population.
        Happiness => "Happiness",
        /// Supply projection range.
        Supply => "Supply",
        /// Stealth strength.
        Stealth => "Stealth",
        /// Detection strength.
        Detection => "Detection",
        /// Hull structure.
        Structure => "Structure",
        /// Maximum hull structure.
        MaxStructure => "MaxStructure",
        /// Remaining fuel.
        Fuel => "Fuel",
        /// Maximum fuel.
        MaxFuel => "MaxFuel",
        /// Shield strength.
        Shield => "Shield",
        /// Planetary defense.
        Defense => "Defense",
        /// Garrison troops.
        Troops => "Troops",
        /// Movement speed.
        Speed => "Speed",
        /// Infrastructure level.
        Construction => "Construction",
    }
}

named_enum! {
    /// Planet classification.
    pub enum PlanetType {
        /// Swamp world.
        Swamp => "Swamp",
        /// Toxic world.
        Toxic => "Toxic",
        /// Inferno world.
        Inferno => "Inferno",
        /// Radiated world.
        Radiated => "Radiated",
        /// Barren world.
        Barren => "Barren",
        /// Tundra world.
        Tundra => "Tundra",
        /// Desert world.
        Desert => "Desert",
        /// Terran world.
        Terran => "Terran",
        /// Ocean world.
        Ocean => "Ocean",
        /// Asteroid belt.
        Asteroids => "Asteroids",
        /// Gas giant.
        GasGiant => "GasGiant",
    }
}

named_enum! {
    /// Star colour of a system.
    pub enum StarType {
        /// Blue star.
        Blue => "Blue",
        /// White star.
        White => "White",
        /// Yellow star.
        Yellow => "Yellow",
        /// Orange star.
        Orange => "Orange",
        /// Red star.
        Red => "Red",
        /// Neutron star.
        Neutron => "Neutron",
        /// Black hole.
        BlackHole => "BlackHole",
        /// Deep space, no star.
        NoStar => "NoStar",
    }
}

named_enum! {
    /// How much of an object an empire can see, weakest first.
    pub enum Visibility {
        /// Not visible at all.
        Invalid => "Invalid",
        /// Existence known, nothing else.
        Basic => "Basic",
        /// Ownership and location visible.
        Partial => "Partial",
        /// Everything visible.
        Full => "Full",
    }
}

named_enum! {
    /// Diplomatic relation between two empires.
    pub enum DiplomaticStatus {
        /// At war.
        War => "War",
        /// At peace.
        Peace => "Peace",
        /// Allied.
        Allied => "Allied",
    }
}

named_enum! {
    /// Relation between an object's owner and a reference empire.
    pub enum Affiliation {
        /// Owned by the reference empire itself.
        TheEmpire => "TheEmpire",
        /// Owned by an empire at war with the reference empire.
        EnemyOf => "EnemyOf",
        /// Owned by an empire at peace with the reference empire.
        PeaceWith => "PeaceWith",
        /// Owned by an empire allied to the reference empire.
        AllyOf => "AllyOf",
        /// Owned by any empire.
        AnyEmpire => "AnyEmpire",
        /// Not owned by any empire.
        Unowned => "Unowned",
    }
}

named_enum! {
    /// Kind of content a dynamic condition looks up by name.
    pub enum ContentType {
        /// Building types.
        Building => "Building",
        /// Species definitions.
        Species => "Species",
        /// Ship hulls.
        ShipHull => "Hull",
        /// Ship parts.
        ShipPart => "Part",
        /// Specials.
        Special => "Special",
        /// Planetary foci.
        Focus => "Focus",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for &t in ObjectType::ALL {
            assert_eq!(ObjectType::from_name(t.name()), Some(t));
        }
        for &m in MeterType::ALL {
            assert_eq!(MeterType::from_name(m.name()), Some(m));
        }
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(format!("{}", PlanetType::GasGiant), "GasGiant");
        assert_eq!(format!("{}", ContentType::ShipHull), "Hull");
    }

    #[test]
    fn ordinals_follow_declaration_order() {
        assert_eq!(ObjectType::Building.ordinal(), 0);
        assert_eq!(ObjectType::Fighter.ordinal(), 6);
        assert_eq!(StarType::NoStar.ordinal(), 7);
    }

    #[test]
    fn visibility_is_ordered_weakest_first() {
        assert!(Visibility::Invalid < Visibility::Basic);
        assert!(Visibility::Partial < Visibility::Full);
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(MeterType::from_name("Mana"), None);
    }
}
