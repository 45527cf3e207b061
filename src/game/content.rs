use crate::error::GameResult;
use serde::{Deserialize, Serialize};

/// Yaku identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YakuId {
    Riichi,
    DoubleRiichi,
    Ippatsu,
    MenzenTsumo,
    Pinfu,
    Tanyao,
    Iipeikou,
    YakuhaiWhite,
    YakuhaiGreen,
    YakuhaiRed,
    SeatWind,
    RoundWind,
    RinshanKaihou,
    HaiteiRaoyue,
    HouteiRaoyui,
    Chankan,
    Ittsu,
    Chanta,
    SanshokuDoujun,
    SanshokuDoukou,
    Chiitoitsu,
    Toitoi,
    Sanankou,
    Sankantsu,
    Honitsu,
    Junchan,
    Ryanpeikou,
    Shousangen,
    Honroutou,
    Chinitsu,
    Daisangen,
    Suuankou,
    Tsuuiisou,
    Chinroutou,
    Ryuuiisou,
    ChuurenPoutou,
    KokushiMusou,
    Tenhou,
    Chiihou,
    Suukantsu,
    /// Fallback for lookups the table cannot answer
    Unknown,
}

/// One row of the yaku table
///
/// Han of `-1` marks a yakuman; `open_han == 0` means the yaku needs a
/// closed hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YakuRecord {
    pub id: YakuId,
    /// Display name; also the key `by_name` looks up
    pub name: String,
    pub closed_han: i8,
    /// Han when the hand has open calls
    pub open_han: i8,
    /// Yaku removed from a result that also contains this one
    #[serde(default)]
    pub invalidates: Vec<YakuId>,
    #[serde(default)]
    pub description: String,
}

impl YakuRecord {
    pub fn is_yakuman(&self) -> bool {
        self.closed_han < 0
    }

    /// Han for the given hand state; yakuman count as 0 here
    pub fn han(&self, closed: bool) -> u32 {
        let han = if closed { self.closed_han } else { self.open_han };
        han.max(0) as u32
    }

    fn unknown() -> Self {
        Self {
            id: YakuId::Unknown,
            name: "Unknown".to_string(),
            closed_han: 0,
            open_han: 0,
            invalidates: Vec::new(),
            description: String::new(),
        }
    }
}

fn record(
    id: YakuId,
    name: &str,
    closed_han: i8,
    open_han: i8,
    invalidates: &[YakuId],
    description: &str,
) -> YakuRecord {
    YakuRecord {
        id,
        name: name.to_string(),
        closed_han,
        open_han,
        invalidates: invalidates.to_vec(),
        description: description.to_string(),
    }
}

/// Yaku name/score/suppression table
///
/// Lookups that miss return a zero-han "Unknown" record rather than failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YakuTable {
    records: Vec<YakuRecord>,
    unknown: YakuRecord,
}

impl YakuTable {
    pub fn new(records: Vec<YakuRecord>) -> Self {
        Self { records, unknown: YakuRecord::unknown() }
    }

    /// Built-in table
    pub fn standard() -> Self {
        Self::new(vec![
            record(YakuId::Riichi, "Riichi", 1, 0, &[], "Declared ready with a closed hand"),
            record(YakuId::DoubleRiichi, "Double Riichi", 2, 0, &[YakuId::Riichi], "Riichi declared on the first uninterrupted discard"),
            record(YakuId::Ippatsu, "Ippatsu", 1, 0, &[], "Win within one go-around of riichi with no call in between"),
            record(YakuId::MenzenTsumo, "Fully Concealed Hand", 1, 0, &[], "Self-drawn win with a closed hand"),
            record(YakuId::Pinfu, "Pinfu", 1, 0, &[], "Closed hand of runs and a valueless pair on a two-sided wait"),
            record(YakuId::Tanyao, "All Simples", 1, 1, &[], "No terminals or honours"),
            record(YakuId::Iipeikou, "Pure Double Run", 1, 0, &[], "Two identical runs in a closed hand"),
            record(YakuId::YakuhaiWhite, "White Dragon", 1, 1, &[], "Triplet or quad of white dragons"),
            record(YakuId::YakuhaiGreen, "Green Dragon", 1, 1, &[], "Triplet or quad of green dragons"),
            record(YakuId::YakuhaiRed, "Red Dragon", 1, 1, &[], "Triplet or quad of red dragons"),
            record(YakuId::SeatWind, "Seat Wind", 1, 1, &[], "Triplet or quad of the seat wind"),
            record(YakuId::RoundWind, "Round Wind", 1, 1, &[], "Triplet or quad of the round wind"),
            record(YakuId::RinshanKaihou, "After a Kan", 1, 1, &[], "Win on a kan replacement tile"),
            record(YakuId::HaiteiRaoyue, "Last Tile Draw", 1, 1, &[], "Self-drawn win on the last live tile"),
            record(YakuId::HouteiRaoyui, "Last Discard", 1, 1, &[], "Win on the discard of the last live tile"),
            record(YakuId::Chankan, "Robbing a Kan", 1, 1, &[], "Win on a tile added to a promoted quad"),
            record(YakuId::Ittsu, "Pure Straight", 2, 1, &[], "Runs 123 456 789 in one suit"),
            record(YakuId::Chanta, "Outside Hand", 2, 1, &[], "Every group holds a terminal or honour, with at least one run"),
            record(YakuId::SanshokuDoujun, "Mixed Triple Run", 2, 1, &[], "The same run in all three numbered suits"),
            record(YakuId::SanshokuDoukou, "Triple Triplets", 2, 2, &[], "The same triplet in all three numbered suits"),
            record(YakuId::Chiitoitsu, "Seven Pairs", 2, 0, &[], "Seven distinct pairs"),
            record(YakuId::Toitoi, "All Triplets", 2, 2, &[], "Four triplets or quads"),
            record(YakuId::Sanankou, "Three Concealed Triplets", 2, 2, &[], "Three concealed triplets or quads"),
            record(YakuId::Sankantsu, "Three Quads", 2, 2, &[], "Three quads"),
            record(YakuId::Honitsu, "Half Flush", 3, 2, &[], "One numbered suit plus honours"),
            record(YakuId::Junchan, "Terminals in All Groups", 3, 2, &[YakuId::Chanta], "Every group holds a terminal, with at least one run and no honours"),
            record(YakuId::Ryanpeikou, "Twice Pure Double Run", 3, 0, &[YakuId::Iipeikou, YakuId::Chiitoitsu], "Two pairs of identical runs in a closed hand"),
            record(YakuId::Shousangen, "Little Three Dragons", 2, 2, &[], "Two dragon triplets and a dragon pair"),
            record(YakuId::Honroutou, "All Terminals and Honours", 2, 2, &[YakuId::Chanta], "Only terminals and honours"),
            record(YakuId::Chinitsu, "Full Flush", 6, 5, &[YakuId::Honitsu], "One numbered suit only"),
            record(YakuId::Daisangen, "Big Three Dragons", -1, -1, &[], "Triplets of all three dragons"),
            record(YakuId::Suuankou, "Four Concealed Triplets", -1, 0, &[], "Four concealed triplets or quads"),
            record(YakuId::Tsuuiisou, "All Honours", -1, -1, &[], "Only honour tiles"),
            record(YakuId::Chinroutou, "All Terminals", -1, -1, &[], "Only terminal tiles"),
            record(YakuId::Ryuuiisou, "All Green", -1, -1, &[], "Only green tiles"),
            record(YakuId::ChuurenPoutou, "Nine Gates", -1, 0, &[], "1112345678999 in one suit plus any tile of that suit"),
            record(YakuId::KokushiMusou, "Thirteen Orphans", -1, 0, &[], "One of each terminal and honour plus a duplicate"),
            record(YakuId::Tenhou, "Blessing of Heaven", -1, 0, &[], "Dealer wins on the first draw"),
            record(YakuId::Chiihou, "Blessing of Earth", -1, 0, &[], "Non-dealer wins on the first uninterrupted draw"),
            record(YakuId::Suukantsu, "Four Quads", -1, -1, &[], "Four quads declared"),
        ])
    }

    /// Load a table from a JSON array of records
    pub fn from_json(json: &str) -> GameResult<Self> {
        let records: Vec<YakuRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    pub fn to_json(&self) -> GameResult<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    pub fn get(&self, id: YakuId) -> &YakuRecord {
        self.records.iter().find(|r| r.id == id).unwrap_or(&self.unknown)
    }

    /// Unknown names fall back to the `Unknown` record
    pub fn by_name(&self, name: &str) -> &YakuRecord {
        self.records.iter().find(|r| r.name == name).unwrap_or(&self.unknown)
    }

    pub fn records(&self) -> &[YakuRecord] {
        &self.records
    }

    pub fn is_yakuman(&self, id: YakuId) -> bool {
        self.get(id).is_yakuman()
    }
}

impl Default for YakuTable {
    fn default() -> Self {
        Self::standard()
    }
}
