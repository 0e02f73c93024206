use crate::battle::rules::BattleRules;
use crate::content::{HazardKind, SideConditionKind, TerrainKind, WeatherKind};
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Persistent status: survives switching, one at a time.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Burn,
    Paralysis,
    Poison,
    BadlyPoisoned,
    Sleep,
    Freeze,
}

impl Status {
    /// Showdown protocol id.
    pub fn id(self) -> &'static str {
        match self {
            Status::Burn => "brn",
            Status::Paralysis => "par",
            Status::Poison => "psn",
            Status::BadlyPoisoned => "tox",
            Status::Sleep => "slp",
            Status::Freeze => "frz",
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
    Accuracy,
    Evasion,
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stat::Hp => "hp",
            Stat::Attack => "atk",
            Stat::Defense => "def",
            Stat::SpecialAttack => "spa",
            Stat::SpecialDefense => "spd",
            Stat::Speed => "spe",
            Stat::Accuracy => "accuracy",
            Stat::Evasion => "evasion",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
}

impl Stats {
    pub fn get(&self, stat: Stat) -> u16 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.atk,
            Stat::Defense => self.def,
            Stat::SpecialAttack => self.spa,
            Stat::SpecialDefense => self.spd,
            Stat::Speed => self.spe,
            Stat::Accuracy | Stat::Evasion => 0,
        }
    }

    /// Scales every stat except HP (boss stat multiplier).
    pub fn scaled(&self, multiplier: f32) -> Stats {
        let scale =
            |value: u16| ((value as f32) * multiplier).floor().clamp(1.0, u16::MAX as f32) as u16;
        Stats {
            hp: self.hp,
            atk: scale(self.atk),
            def: scale(self.def),
            spa: scale(self.spa),
            spd: scale(self.spd),
            spe: scale(self.spe),
        }
    }
}

/// Which slots a move may legally hit.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveTarget {
    User,
    #[default]
    SingleEnemy,
    AllEnemies,
    AllAdjacent,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DamageKind {
    #[default]
    Standard,
    /// Always deals `amount` (Dragon Rage, Sonic Boom).
    Fixed { amount: u16 },
    /// Deals the user's level (Seismic Toss, Night Shade).
    Level,
    /// Percentage of the target's max HP.
    PercentMaxHp { percent: u8 },
    /// Twice the damage of `category` the user took this turn.
    Counter { category: MoveCategory },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecondaryKind {
    Status { status: Status },
    Boost { stat: Stat, stages: i8 },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct SecondaryEffect {
    /// Percent chance, 100 for guaranteed effects.
    pub chance: u8,
    pub effect: SecondaryKind,
    #[serde(default)]
    pub on_user: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldEffect {
    Weather { weather: WeatherKind, turns: u8 },
    Terrain { terrain: TerrainKind, turns: u8 },
    Hazard { hazard: HazardKind },
    SideCondition { condition: SideConditionKind, turns: u8 },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveFlags {
    pub protect: bool,
    pub two_turn: bool,
    pub semi_invulnerable: bool,
    pub pursuit: bool,
    pub bypasses_protect: bool,
    pub bypasses_screens: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveData {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: Type,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: u16,
    /// `None` never misses.
    #[serde(default)]
    pub accuracy: Option<u8>,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub target: MoveTarget,
    #[serde(default)]
    pub crit_stage: u8,
    #[serde(default)]
    pub damage: DamageKind,
    #[serde(default)]
    pub fixed_random: bool,
    #[serde(default)]
    pub secondary: Option<SecondaryEffect>,
    #[serde(default)]
    pub heal_percent: Option<u8>,
    #[serde(default)]
    pub field_effect: Option<FieldEffect>,
    #[serde(default)]
    pub flags: MoveFlags,
}

impl MoveData {
    pub fn new(
        name: impl Into<String>,
        move_type: Type,
        category: MoveCategory,
        power: u16,
    ) -> Self {
        Self {
            name: name.into(),
            move_type,
            category,
            power,
            accuracy: None,
            priority: 0,
            target: if matches!(category, MoveCategory::Status) {
                MoveTarget::User
            } else {
                MoveTarget::SingleEnemy
            },
            crit_stage: 0,
            damage: DamageKind::Standard,
            fixed_random: false,
            secondary: None,
            heal_percent: None,
            field_effect: None,
            flags: MoveFlags::default(),
        }
    }

    pub fn with_accuracy(mut self, accuracy: u8) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn with_priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_target(mut self, target: MoveTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_damage(mut self, damage: DamageKind) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_secondary(mut self, secondary: SecondaryEffect) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn with_heal(mut self, percent: u8) -> Self {
        self.heal_percent = Some(percent);
        self
    }

    pub fn with_field_effect(mut self, effect: FieldEffect) -> Self {
        self.field_effect = Some(effect);
        self
    }

    pub fn with_flags(mut self, flags: MoveFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_damaging(&self) -> bool {
        !matches!(self.category, MoveCategory::Status)
    }
}

fn default_level() -> u8 {
    50
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creature {
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub types: Vec<Type>,
    pub stats: Stats,
    /// Zero in team files; [`Creature::restored`] fills it from `stats.hp`.
    #[serde(default)]
    pub current_hp: u16,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(skip)]
    pub sleep_turns: u8,
    #[serde(default)]
    pub moves: Vec<MoveData>,
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub ability: Option<String>,
}

impl Creature {
    pub fn new(
        name: impl Into<String>,
        level: u8,
        types: Vec<Type>,
        stats: Stats,
        moves: Vec<MoveData>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            types,
            current_hp: stats.hp,
            stats,
            status: None,
            sleep_turns: 0,
            moves,
            item: None,
            ability: None,
        }
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.ability = Some(ability.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Full HP, no status.
    pub fn restored(mut self) -> Self {
        self.current_hp = self.stats.hp;
        self.status = None;
        self.sleep_turns = 0;
        self
    }

    pub fn max_hp(&self) -> u16 {
        self.stats.hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    pub fn has_type(&self, ty: Type) -> bool {
        self.types.contains(&ty)
    }

    pub fn has_ability(&self, ability: &str) -> bool {
        self.ability
            .as_deref()
            .is_some_and(|own| normalize_id(own) == normalize_id(ability))
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.item
            .as_deref()
            .is_some_and(|own| normalize_id(own) == normalize_id(item))
    }

    /// Flying types and Levitate users are airborne.
    pub fn is_grounded(&self) -> bool {
        !self.has_type(Type::Flying) && !self.has_ability("Levitate")
    }

    /// Returns the HP actually lost.
    pub fn take_damage(&mut self, damage: u16) -> u16 {
        let dealt = damage.min(self.current_hp);
        self.current_hp -= dealt;
        dealt
    }

    /// Returns the HP actually restored; never exceeds max HP.
    pub fn heal(&mut self, amount: u16) -> u16 {
        let healed = amount.min(self.stats.hp.saturating_sub(self.current_hp));
        self.current_hp += healed;
        healed
    }
}

pub fn normalize_id(name: &str) -> String {
    name.to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamsFile {
    pub team_a: Vec<Creature>,
    pub team_b: Vec<Creature>,
    #[serde(default)]
    pub rules: Option<BattleRules>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Stats {
        Stats {
            hp: 100,
            atk: 80,
            def: 80,
            spa: 80,
            spd: 80,
            spe: 80,
        }
    }

    #[test]
    fn heal_clamps_to_max_hp() {
        let mut mon = Creature::new("Healer", 50, vec![Type::Normal], stats(), vec![]);
        mon.current_hp = 95;
        assert_eq!(mon.heal(20), 5);
        assert_eq!(mon.current_hp, 100);
    }

    #[test]
    fn damage_never_underflows() {
        let mut mon = Creature::new("Glass", 50, vec![Type::Normal], stats(), vec![]);
        assert_eq!(mon.take_damage(250), 100);
        assert!(mon.is_fainted());
    }

    #[test]
    fn levitate_and_flying_are_airborne() {
        let flyer = Creature::new("Bird", 50, vec![Type::Normal, Type::Flying], stats(), vec![]);
        let floater =
            Creature::new("Ghost", 50, vec![Type::Ghost], stats(), vec![]).with_ability("Levitate");
        let walker = Creature::new("Walker", 50, vec![Type::Ground], stats(), vec![]);
        assert!(!flyer.is_grounded());
        assert!(!floater.is_grounded());
        assert!(walker.is_grounded());
    }

    #[test]
    fn item_lookup_ignores_case_and_spacing() {
        let mon = Creature::new("Holder", 50, vec![Type::Normal], stats(), vec![])
            .with_item("Black Sludge");
        assert!(mon.has_item("blacksludge"));
        assert!(!mon.has_item("leftovers"));
    }

    #[test]
    fn team_file_creatures_restore_full_hp() {
        let raw = r#"{
            "name": "Sparky",
            "types": ["electric"],
            "stats": {"hp": 120, "atk": 60, "def": 50, "spa": 90, "spd": 60, "spe": 110},
            "moves": [
                {"name": "Thunderbolt", "type": "electric", "category": "special", "power": 90}
            ]
        }"#;
        let parsed: Creature = serde_json::from_str(raw).expect("creature");
        assert_eq!(parsed.level, 50);
        assert_eq!(parsed.current_hp, 0);
        let ready = parsed.restored();
        assert_eq!(ready.current_hp, 120);
        assert_eq!(ready.moves[0].target, MoveTarget::SingleEnemy);
    }
}
