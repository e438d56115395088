use serde::{Deserialize, Serialize};

/// One creature as stored in the static data file.
/// Any `power` key in the source is ignored: power is always derived here.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Creature {
    pub id: u32,
    pub name: String,

    /// Category tags, display order preserved
    #[serde(rename = "type")]
    pub types: Vec<String>,

    // ========================================================================
    // BASE STATS
    // ========================================================================
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl Creature {
    /// Sum of the six base stats
    pub fn power(&self) -> u64 {
        self.stats().iter().map(|&s| u64::from(s)).sum()
    }

    /// Stats in display order: HP, Atk, Def, SpA, SpD, Spe
    pub fn stats(&self) -> [u32; 6] {
        [
            self.hp,
            self.attack,
            self.defense,
            self.special_attack,
            self.special_defense,
            self.speed,
        ]
    }

    /// Types joined for display ("Grass,Poison")
    pub fn type_label(&self) -> String {
        self.types.join(",")
    }
}

/// A creature plus its computed power score
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DerivedCreature {
    #[serde(flatten)]
    pub creature: Creature,
    pub power: u64,
}

impl From<Creature> for DerivedCreature {
    fn from(creature: Creature) -> Self {
        let power = creature.power();
        Self { creature, power }
    }
}

impl From<&Creature> for DerivedCreature {
    fn from(creature: &Creature) -> Self {
        creature.clone().into()
    }
}

/// Attach power to every record, keeping order
pub fn derive_all(creatures: &[Creature]) -> Vec<DerivedCreature> {
    creatures.iter().map(DerivedCreature::from).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a creature with all stats set to `stat`
    pub(crate) fn flat_creature(id: u32, name: &str, stat: u32) -> Creature {
        Creature {
            id,
            name: name.to_string(),
            types: vec!["Normal".to_string()],
            hp: stat,
            attack: stat,
            defense: stat,
            special_attack: stat,
            special_defense: stat,
            speed: stat,
        }
    }

    pub(crate) fn bulbasaur() -> Creature {
        Creature {
            id: 1,
            name: "Bulbasaur".to_string(),
            types: vec!["Grass".to_string(), "Poison".to_string()],
            hp: 45,
            attack: 49,
            defense: 49,
            special_attack: 65,
            special_defense: 65,
            speed: 45,
        }
    }

    #[test]
    fn test_power_is_sum_of_stats() {
        let bulba = bulbasaur();
        assert_eq!(bulba.power(), 318);

        let derived = DerivedCreature::from(&bulba);
        assert_eq!(derived.power, 45 + 49 + 49 + 65 + 65 + 45);
        assert_eq!(derived.creature, bulba);
    }

    #[test]
    fn test_power_does_not_overflow() {
        let big = flat_creature(7, "Huge", u32::MAX);
        assert_eq!(big.power(), 6 * u64::from(u32::MAX));
    }

    #[test]
    fn test_derive_all_keeps_order() {
        let creatures = vec![
            flat_creature(3, "Gamma", 10),
            flat_creature(1, "Alpha", 20),
            flat_creature(2, "Beta", 5),
        ];

        let derived = derive_all(&creatures);
        let ids: Vec<u32> = derived.iter().map(|d| d.creature.id).collect();
        let powers: Vec<u64> = derived.iter().map(|d| d.power).collect();

        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(powers, vec![60, 120, 30]);
    }

    #[test]
    fn test_type_label_preserves_order() {
        let mut bulba = bulbasaur();
        assert_eq!(bulba.type_label(), "Grass,Poison");

        bulba.types.reverse();
        assert_eq!(bulba.type_label(), "Poison,Grass");

        bulba.types.clear();
        assert_eq!(bulba.type_label(), "");
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "id": 1, "name": "Bulbasaur", "type": ["Grass", "Poison"],
            "hp": 45, "attack": 49, "defense": 49,
            "special_attack": 65, "special_defense": 65, "speed": 45,
            "power": 9999
        }"#;

        let creature: Creature = serde_json::from_str(json).unwrap();
        assert_eq!(creature, bulbasaur());

        // Source power is ignored, the derived one is serialized flat
        let derived = serde_json::to_value(DerivedCreature::from(creature)).unwrap();
        assert_eq!(derived["power"], 318);
        assert_eq!(derived["type"][1], "Poison");
        assert_eq!(derived["name"], "Bulbasaur");
    }
}
