use serde::{Deserialize, Serialize};
use std::fmt;

/// Tile suit
///
/// The discriminant is the suit identifier used in the tile identity value
/// (`suit * 10 + rank`).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    /// Characters (1-9)
    Man = 1,
    /// Circles (1-9)
    Pin = 2,
    /// Bamboo (1-9)
    Sou = 3,
    /// Dragons: 1 white, 2 green, 3 red
    Dragon = 4,
    /// Winds: 1 East, 2 South, 3 West, 4 North
    Wind = 5,
}

impl Suit {
    /// All suits in identity order
    pub fn all() -> [Suit; 5] {
        [Suit::Man, Suit::Pin, Suit::Sou, Suit::Dragon, Suit::Wind]
    }

    /// Numbered suits only
    pub fn numbered() -> [Suit; 3] {
        [Suit::Man, Suit::Pin, Suit::Sou]
    }

    pub fn is_honour(self) -> bool {
        matches!(self, Suit::Dragon | Suit::Wind)
    }

    /// Highest rank in this suit
    pub fn max_rank(self) -> u8 {
        match self {
            Suit::Man | Suit::Pin | Suit::Sou => 9,
            Suit::Dragon => 3,
            Suit::Wind => 4,
        }
    }

    pub fn from_id(id: u8) -> Option<Suit> {
        Suit::all().into_iter().find(|s| *s as u8 == id)
    }

    fn letter(self) -> char {
        match self {
            Suit::Man => 'm',
            Suit::Pin => 'p',
            Suit::Sou => 's',
            Suit::Dragon => 'd',
            Suit::Wind => 'w',
        }
    }
}

/// One physical tile, as a pure value
///
/// Field order makes the derived ordering equal to the identity value
/// ordering, which is the canonical sort for hands. Serialized as the
/// identity value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tile {
    suit: Suit,
    rank: u8,
}

impl Tile {
    pub const WHITE: Tile = Tile { suit: Suit::Dragon, rank: 1 };
    pub const GREEN: Tile = Tile { suit: Suit::Dragon, rank: 2 };
    pub const RED: Tile = Tile { suit: Suit::Dragon, rank: 3 };
    pub const EAST: Tile = Tile { suit: Suit::Wind, rank: 1 };
    pub const SOUTH: Tile = Tile { suit: Suit::Wind, rank: 2 };
    pub const WEST: Tile = Tile { suit: Suit::Wind, rank: 3 };
    pub const NORTH: Tile = Tile { suit: Suit::Wind, rank: 4 };

    /// Create a tile, rejecting ranks outside the suit
    pub fn new(suit: Suit, rank: u8) -> Option<Self> {
        if rank == 0 || rank > suit.max_rank() {
            return None;
        }
        Some(Self { suit, rank })
    }

    pub fn man(rank: u8) -> Option<Self> {
        Self::new(Suit::Man, rank)
    }

    pub fn pin(rank: u8) -> Option<Self> {
        Self::new(Suit::Pin, rank)
    }

    pub fn sou(rank: u8) -> Option<Self> {
        Self::new(Suit::Sou, rank)
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Identity value: `suit * 10 + rank` (e.g. 15 = 5m, 41 = white dragon)
    pub fn id(&self) -> u8 {
        self.suit as u8 * 10 + self.rank
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::new(Suit::from_id(id / 10)?, id % 10)
    }

    pub fn is_honour(&self) -> bool {
        self.suit.is_honour()
    }

    /// 1 or 9 of a numbered suit
    pub fn is_terminal(&self) -> bool {
        !self.is_honour() && (self.rank == 1 || self.rank == 9)
    }

    pub fn is_terminal_or_honour(&self) -> bool {
        self.is_honour() || self.is_terminal()
    }

    pub fn is_dragon(&self) -> bool {
        self.suit == Suit::Dragon
    }

    /// Tiles allowed in an all-green hand
    pub fn is_green(&self) -> bool {
        match self.suit {
            Suit::Sou => matches!(self.rank, 2 | 3 | 4 | 6 | 8),
            Suit::Dragon => self.rank == 2,
            _ => false,
        }
    }

    /// Tile `offset` ranks higher in the same suit, if it exists
    pub fn offset(&self, offset: u8) -> Option<Tile> {
        Tile::new(self.suit, self.rank.checked_add(offset)?)
    }

    /// The tile a dora indicator points at (wraps within the suit)
    pub fn dora_successor(&self) -> Tile {
        let rank = if self.rank >= self.suit.max_rank() { 1 } else { self.rank + 1 };
        Tile { suit: self.suit, rank }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        const NUMBERED: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];
        match (self.suit, self.rank) {
            (Suit::Dragon, 1) => "White Dragon",
            (Suit::Dragon, 2) => "Green Dragon",
            (Suit::Dragon, 3) => "Red Dragon",
            (Suit::Wind, 1) => "East",
            (Suit::Wind, 2) => "South",
            (Suit::Wind, 3) => "West",
            (Suit::Wind, 4) => "North",
            (_, r) => NUMBERED.get(r as usize - 1).copied().unwrap_or("Unknown"),
        }
    }
}

impl TryFrom<u8> for Tile {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Tile::from_id(id).ok_or_else(|| format!("unknown tile identity {id}"))
    }
}

impl From<Tile> for u8 {
    fn from(tile: Tile) -> u8 {
        tile.id()
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suit {
            Suit::Dragon => {
                let s = ["Wh", "Gr", "Rd"][self.rank as usize - 1];
                f.write_str(s)
            }
            Suit::Wind => {
                let s = ["E", "S", "W", "N"][self.rank as usize - 1];
                f.write_str(s)
            }
            suit => write!(f, "{}{}", self.rank, suit.letter()),
        }
    }
}

/// Name lookup by identity value, degrading to "Unknown"
pub fn tile_name(id: u8) -> &'static str {
    Tile::from_id(id).map(|t| t.name()).unwrap_or("Unknown")
}

/// Seat or round wind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wind {
    East,
    South,
    West,
    North,
}

impl Wind {
    pub fn all() -> [Wind; 4] {
        [Wind::East, Wind::South, Wind::West, Wind::North]
    }

    pub fn to_tile(self) -> Tile {
        match self {
            Wind::East => Tile::EAST,
            Wind::South => Tile::SOUTH,
            Wind::West => Tile::WEST,
            Wind::North => Tile::NORTH,
        }
    }

    pub fn next(self) -> Wind {
        Wind::all()[(self as usize + 1) % 4]
    }

    /// Seat wind of `seat` when `dealer` sits East
    pub fn for_seat(seat: u8, dealer: u8) -> Wind {
        Wind::all()[((seat + 4 - dealer) % 4) as usize]
    }
}

/// Tile-identity catalogue: which suits are in play and how many copies
///
/// Decomposition and tenpai queries take it as their suit configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCatalogue {
    pub suits: Vec<Suit>,
    pub copies: u8,
}

impl TileCatalogue {
    /// Standard riichi set: 34 identities, 4 copies each
    pub fn standard() -> Self {
        Self { suits: Suit::all().to_vec(), copies: 4 }
    }

    /// Every tile identity, in canonical order
    pub fn kinds(&self) -> Vec<Tile> {
        let mut kinds = Vec::with_capacity(34);
        for &suit in &self.suits {
            for rank in 1..=suit.max_rank() {
                kinds.push(Tile { suit, rank });
            }
        }
        kinds
    }

    pub fn total_tiles(&self) -> usize {
        self.kinds().len() * self.copies as usize
    }

    pub fn is_honour_suit(&self, suit: Suit) -> bool {
        suit.is_honour()
    }

    /// The thirteen terminal/honour identities
    pub fn orphans(&self) -> Vec<Tile> {
        self.kinds().into_iter().filter(|t| t.is_terminal_or_honour()).collect()
    }
}

impl Default for TileCatalogue {
    fn default() -> Self {
        Self::standard()
    }
}

/// Build a tile list from notation such as `"123m 456p 789s EE"`; honours
/// are written `E S W N` and `Wh Gr Rd`.
///
/// Returns `None` on any unrecognised token. Mostly for tests and tools.
pub fn parse_tiles(text: &str) -> Option<Vec<Tile>> {
    let mut tiles = Vec::new();
    for token in text.split_whitespace() {
        let mut rest = token;
        while !rest.is_empty() {
            let (tile, len) = parse_honour(rest).or_else(|| parse_numbered(rest))?;
            tiles.extend(tile);
            rest = &rest[len..];
        }
    }
    Some(tiles)
}

fn parse_honour(s: &str) -> Option<(Vec<Tile>, usize)> {
    const HONOURS: [(&str, Tile); 7] = [
        ("Wh", Tile::WHITE),
        ("Gr", Tile::GREEN),
        ("Rd", Tile::RED),
        ("E", Tile::EAST),
        ("S", Tile::SOUTH),
        ("W", Tile::WEST),
        ("N", Tile::NORTH),
    ];
    HONOURS
        .iter()
        .find(|(p, _)| s.starts_with(p))
        .map(|(p, t)| (vec![*t], p.len()))
}

fn parse_numbered(s: &str) -> Option<(Vec<Tile>, usize)> {
    let digits = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let suit = match s.as_bytes().get(digits)? {
        b'm' => Suit::Man,
        b'p' => Suit::Pin,
        b's' => Suit::Sou,
        _ => return None,
    };
    let tiles = s[..digits]
        .bytes()
        .map(|b| Tile::new(suit, b - b'0'))
        .collect::<Option<Vec<_>>>()?;
    Some((tiles, digits + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_creation() {
        let tile = Tile::new(Suit::Man, 1).unwrap();
        assert_eq!(tile.suit(), Suit::Man);
        assert_eq!(tile.rank(), 1);

        assert!(Tile::new(Suit::Pin, 0).is_none());
        assert!(Tile::new(Suit::Sou, 10).is_none());
        assert!(Tile::new(Suit::Dragon, 4).is_none());
        assert!(Tile::new(Suit::Wind, 4).is_some());
    }

    #[test]
    fn test_identity_value() {
        assert_eq!(Tile::man(5).unwrap().id(), 15);
        assert_eq!(Tile::WHITE.id(), 41);
        assert_eq!(Tile::NORTH.id(), 54);
        assert_eq!(Tile::from_id(33), Tile::sou(3));
        assert_eq!(Tile::from_id(44), None);
        assert_eq!(Tile::from_id(60), None);
    }

    #[test]
    fn test_ordering_matches_identity() {
        let mut tiles = vec![Tile::EAST, Tile::sou(1).unwrap(), Tile::RED, Tile::man(9).unwrap()];
        tiles.sort();
        let ids: Vec<u8> = tiles.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![19, 31, 43, 51]);
    }

    #[test]
    fn test_classification() {
        assert!(Tile::man(1).unwrap().is_terminal());
        assert!(!Tile::man(5).unwrap().is_terminal());
        assert!(Tile::EAST.is_honour());
        assert!(!Tile::EAST.is_terminal());
        assert!(Tile::GREEN.is_green());
        assert!(Tile::sou(6).unwrap().is_green());
        assert!(!Tile::sou(5).unwrap().is_green());
    }

    #[test]
    fn test_dora_successor_wraps() {
        assert_eq!(Tile::man(9).unwrap().dora_successor(), Tile::man(1).unwrap());
        assert_eq!(Tile::pin(4).unwrap().dora_successor(), Tile::pin(5).unwrap());
        assert_eq!(Tile::RED.dora_successor(), Tile::WHITE);
        assert_eq!(Tile::NORTH.dora_successor(), Tile::EAST);
    }

    #[test]
    fn test_names_degrade_to_unknown() {
        assert_eq!(tile_name(51), "East");
        assert_eq!(tile_name(17), "7");
        assert_eq!(tile_name(99), "Unknown");
    }

    #[test]
    fn test_wind_for_seat() {
        assert_eq!(Wind::for_seat(2, 2), Wind::East);
        assert_eq!(Wind::for_seat(3, 2), Wind::South);
        assert_eq!(Wind::for_seat(1, 2), Wind::North);
        assert_eq!(Wind::North.next(), Wind::East);
    }

    #[test]
    fn test_catalogue() {
        let cat = TileCatalogue::standard();
        assert_eq!(cat.kinds().len(), 34);
        assert_eq!(cat.total_tiles(), 136);
        assert_eq!(cat.orphans().len(), 13);
    }

    #[test]
    fn test_parse_tiles() {
        let tiles = parse_tiles("123m 9p EE Rd").unwrap();
        assert_eq!(tiles.len(), 7);
        assert_eq!(tiles[3], Tile::pin(9).unwrap());
        assert_eq!(tiles[4], Tile::EAST);
        assert_eq!(tiles[6], Tile::RED);
        assert!(parse_tiles("0m").is_none());
        assert!(parse_tiles("12x").is_none());
    }

    #[test]
    fn test_serde_as_identity() {
        let json = serde_json::to_string(&vec![Tile::EAST, Tile::man(2).unwrap()]).unwrap();
        assert_eq!(json, "[51,12]");
        let back: Vec<Tile> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[0], Tile::EAST);
        assert!(serde_json::from_str::<Tile>("44").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Tile::man(3).unwrap().to_string(), "3m");
        assert_eq!(Tile::WHITE.to_string(), "Wh");
        assert_eq!(Tile::SOUTH.to_string(), "S");
    }
}
