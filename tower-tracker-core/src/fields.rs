//! Field name normalization and the registry of known battle report fields.
use serde::{Deserialize, Serialize};

use crate::run::DataType;

/// Legacy column names and their internal replacements.
const LEGACY_FIELDS: [(&str, &str); 7] = [
    ("date", "_date"),
    ("time", "_time"),
    ("notes", "_notes"),
    ("runType", "_runType"),
    ("rank", "_rank"),
    ("placement", "_rank"),
    ("note", "_notes"),
];

fn normalize_word(word: &str) -> String {
    let has_lower = word.chars().any(char::is_lowercase);
    if !has_lower && word.chars().count() > 1 {
        let lower = word.to_lowercase();
        let mut chars = lower.chars();
        return chars
            .next()
            .map(|c| c.to_uppercase().chain(chars).collect())
            .unwrap_or_default();
    }
    word.to_string()
}

/// Convert an arbitrary column header into a camelCase field name.
///
/// `Coins earned`, `coins_earned` and `COINS EARNED` all become `coinsEarned`;
/// names that are already camelCase pass through.
#[must_use]
pub fn to_camel_case(header: &str) -> String {
    let words: Vec<String> = header
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(normalize_word)
        .collect();

    let mut out = String::with_capacity(header.len());
    for (idx, word) in words.iter().enumerate() {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        if idx == 0 {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.push_str(chars.as_str());
    }
    out
}

/// `coinsEarned` → `coins_earned`.
#[must_use]
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Internal field name for a source header, including legacy migrations.
#[must_use]
pub fn normalize_field_name(header: &str) -> String {
    let trimmed = header.trim();
    if trimmed.starts_with('_') {
        return trimmed.to_string();
    }
    let camel = to_camel_case(trimmed);
    LEGACY_FIELDS
        .iter()
        .find(|(legacy, _)| *legacy == camel)
        .map_or(camel, |(_, internal)| (*internal).to_string())
}

/// Group of fields that together explain a total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceGroup {
    CoinSources,
    DamageSources,
}

impl SourceGroup {
    /// Field holding the total that the group's members add up to.
    #[must_use]
    pub const fn total_key(self) -> &'static str {
        match self {
            SourceGroup::CoinSources => "coinsEarned",
            SourceGroup::DamageSources => "damageDealt",
        }
    }
}

/// Semantics of a known battle report field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownField {
    pub key: &'static str,
    pub display_name: &'static str,
    pub data_type: DataType,
    pub aliases: &'static [&'static str],
    pub color: Option<&'static str>,
    pub group: Option<SourceGroup>,
}

impl KnownField {
    const fn new(key: &'static str, display_name: &'static str, data_type: DataType) -> Self {
        Self {
            key,
            display_name,
            data_type,
            aliases: &[],
            color: None,
            group: None,
        }
    }

    const fn number(key: &'static str, display_name: &'static str) -> Self {
        Self::new(key, display_name, DataType::Number)
    }

    const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    const fn source(mut self, group: SourceGroup, color: &'static str) -> Self {
        self.group = Some(group);
        self.color = Some(color);
        self
    }
}

const DMG: SourceGroup = SourceGroup::DamageSources;
const COIN: SourceGroup = SourceGroup::CoinSources;

const STANDARD_FIELDS: &[KnownField] = &[
    KnownField::new("battleDate", "Battle Date", DataType::Date),
    KnownField::new("gameTime", "Game Time", DataType::Duration),
    KnownField::new("realTime", "Real Time", DataType::Duration).aliases(&["duration", "runTime"]),
    KnownField::number("tier", "Tier"),
    KnownField::number("wave", "Wave"),
    KnownField::new("killedBy", "Killed By", DataType::String).aliases(&["killer"]),
    KnownField::number("coinsEarned", "Coins earned").aliases(&["coins"]),
    KnownField::number("coinsPerHour", "Coins per hour"),
    KnownField::number("cashEarned", "Cash earned"),
    KnownField::number("interestEarned", "Interest earned"),
    KnownField::number("gemBlocksTapped", "Gem Blocks Tapped"),
    KnownField::number("cellsEarned", "Cells Earned").aliases(&["cells"]),
    KnownField::number("rerollShardsEarned", "Reroll Shards Earned").aliases(&["rerollShards"]),
    // Combat
    KnownField::number("damageDealt", "Damage dealt"),
    KnownField::number("damageTaken", "Damage Taken"),
    KnownField::number("damageTakenWall", "Damage Taken Wall"),
    KnownField::number("damageTakenWhileBerserked", "Damage Taken While Berserked"),
    KnownField::number("damageGainFromBerserk", "Damage Gain From Berserk"),
    KnownField::number("deathDefy", "Death Defy"),
    KnownField::number("lifesteal", "Lifesteal"),
    KnownField::number("projectilesDamage", "Projectiles Damage").source(DMG, "#ef4444"),
    KnownField::number("projectilesCount", "Projectiles Count"),
    KnownField::number("thornDamage", "Thorn damage").source(DMG, "#22c55e"),
    KnownField::number("orbDamage", "Orb Damage").source(DMG, "#a855f7"),
    KnownField::number("enemiesHitByOrbs", "Enemies Hit by Orbs"),
    KnownField::number("landMineDamage", "Land Mine Damage").source(DMG, "#f97316"),
    KnownField::number("landMinesSpawned", "Land Mines Spawned"),
    KnownField::number("rendArmorDamage", "Rend Armor Damage").source(DMG, "#64748b"),
    KnownField::number("deathRayDamage", "Death Ray Damage").source(DMG, "#dc2626"),
    KnownField::number("smartMissileDamage", "Smart Missile Damage").source(DMG, "#0ea5e9"),
    KnownField::number("innerLandMineDamage", "Inner Land Mine Damage").source(DMG, "#fb923c"),
    KnownField::number("chainLightningDamage", "Chain Lightning Damage").source(DMG, "#eab308"),
    KnownField::number("deathWaveDamage", "Death Wave Damage").source(DMG, "#be123c"),
    KnownField::number("swampDamage", "Swamp Damage").source(DMG, "#15803d"),
    KnownField::number("blackHoleDamage", "Black Hole Damage").source(DMG, "#1e1b4b"),
    KnownField::number("electronsDamage", "Electrons Damage").source(DMG, "#38bdf8"),
    KnownField::number("flameBotDamage", "Flame bot damage").source(DMG, "#f43f5e"),
    // Utility
    KnownField::number("wavesSkipped", "Waves Skipped"),
    KnownField::number("recoveryPackages", "Recovery Packages"),
    KnownField::number("freeAttackUpgrade", "Free Attack Upgrade"),
    KnownField::number("freeDefenseUpgrade", "Free Defense Upgrade"),
    KnownField::number("freeUtilityUpgrade", "Free Utility Upgrade"),
    KnownField::number("hpFromDeathWave", "HP From Death Wave"),
    KnownField::number("coinsFromDeathWave", "Coins From Death Wave").source(COIN, "#be123c"),
    KnownField::number("cashFromGoldenTower", "Cash From Golden Tower"),
    KnownField::number("coinsFromGoldenTower", "Coins From Golden Tower").source(COIN, "#facc15"),
    KnownField::number("coinsFromBlackHole", "Coins From Black Hole").source(COIN, "#1e1b4b"),
    KnownField::number("coinsFromSpotlight", "Coins From Spotlight").source(COIN, "#fde68a"),
    KnownField::number("coinsFromOrbs", "Coins From Orbs").source(COIN, "#a855f7"),
    KnownField::number("coinsFromCoinUpgrade", "Coins from Coin Upgrade").source(COIN, "#84cc16"),
    KnownField::number("coinsFromCoinBonuses", "Coins from Coin Bonuses").source(COIN, "#10b981"),
    KnownField::number("goldenBotCoinsEarned", "Golden bot coins earned").source(COIN, "#d97706"),
    KnownField::number("thunderBotStuns", "Thunder bot stuns"),
    // Enemies
    KnownField::number("totalEnemies", "Total Enemies"),
    KnownField::number("basic", "Basic"),
    KnownField::number("fast", "Fast"),
    KnownField::number("tank", "Tank"),
    KnownField::number("ranged", "Ranged"),
    KnownField::number("boss", "Boss"),
    KnownField::number("protector", "Protector"),
    KnownField::number("totalElites", "Total Elites"),
    KnownField::number("vampires", "Vampires"),
    KnownField::number("rays", "Rays"),
    KnownField::number("scatters", "Scatters"),
    KnownField::number("saboteur", "Saboteur"),
    KnownField::number("commander", "Commander"),
    KnownField::number("overcharge", "Overcharge"),
    // Internal
    KnownField::new("_date", "Date", DataType::Date),
    KnownField::new("_time", "Time", DataType::String),
    KnownField::new("_notes", "Notes", DataType::String),
    KnownField::new("_runType", "Run Type", DataType::String),
    KnownField::new("_rank", "Rank", DataType::String),
];

/// Lookup table of known field semantics
#[derive(Debug, Clone, Copy)]
pub struct FieldRegistry {
    fields: &'static [KnownField],
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FieldRegistry {
    /// Registry covering the in-game battle report.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            fields: STANDARD_FIELDS,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'static KnownField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Resolve an alias to its registered key; unknown keys are returned as-is.
    #[must_use]
    pub fn canonical_key(&self, key: &str) -> String {
        self.fields
            .iter()
            .find(|f| f.key == key || f.aliases.contains(&key))
            .map_or_else(|| key.to_string(), |f| f.key.to_string())
    }

    /// Human label for a field, falling back to the key itself.
    #[must_use]
    pub fn display_name<'a>(&self, key: &'a str) -> &'a str {
        self.get(key).map_or(key, |f| f.display_name)
    }

    /// Known field whose display name matches a pasted label, ignoring case.
    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<&'static KnownField> {
        let wanted = label.trim();
        self.fields
            .iter()
            .find(|f| f.display_name.eq_ignore_ascii_case(wanted))
    }

    /// Display names sorted longest first, for prefix matching pasted lines.
    #[must_use]
    pub fn labels_longest_first(&self) -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = self
            .fields
            .iter()
            .filter(|f| !f.key.starts_with('_'))
            .map(|f| f.display_name)
            .collect();
        labels.sort_by_key(|l| std::cmp::Reverse(l.len()));
        labels
    }

    pub fn group_members(&self, group: SourceGroup) -> impl Iterator<Item = &'static KnownField> {
        self.fields.iter().filter(move |f| f.group == Some(group))
    }

    /// Data type for a field name.
    ///
    /// Registered fields use their declared type. Internal `_` fields are
    /// strings except `_date`. Unknown names are numbers.
    #[must_use]
    pub fn infer_data_type(&self, key: &str) -> DataType {
        if let Some(known) = self.get(key) {
            return known.data_type;
        }
        if key.starts_with('_') {
            return DataType::String;
        }
        DataType::Number
    }
}
