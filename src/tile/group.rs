use super::tile::Tile;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

/// How a quad was formed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuadKind {
    /// Called from a discard with a concealed triplet
    Open,
    /// Four concealed tiles; does not open the hand
    Closed,
    /// A called triplet promoted with the fourth tile
    Promoted,
}

/// Group kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    Pair,
    Run,
    Triplet,
    Quad(QuadKind),
}

/// A pair, run, triplet or quad
///
/// The tile list is never stored: it is always derived from `kind` and
/// `anchor` (the lowest tile of a run, the repeated tile otherwise).
/// Groups are never mutated after creation; a promotion builds a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    kind: GroupKind,
    anchor: Tile,
    /// Discarder position relative to the claimer: 0 left, 1 across, 2 right
    called_side: Option<u8>,
}

impl Group {
    pub fn pair(tile: Tile) -> Self {
        Self { kind: GroupKind::Pair, anchor: tile, called_side: None }
    }

    /// Concealed run starting at `anchor`; `None` for honours or anchors above 7
    pub fn run(anchor: Tile) -> Option<Self> {
        if anchor.is_honour() || anchor.offset(2).is_none() {
            return None;
        }
        Some(Self { kind: GroupKind::Run, anchor, called_side: None })
    }

    pub fn triplet(tile: Tile) -> Self {
        Self { kind: GroupKind::Triplet, anchor: tile, called_side: None }
    }

    pub fn closed_quad(tile: Tile) -> Self {
        Self { kind: GroupKind::Quad(QuadKind::Closed), anchor: tile, called_side: None }
    }

    /// Called group (chi, pon or open kan) claimed from `side`
    pub fn called(kind: GroupKind, anchor: Tile, side: u8) -> Option<Self> {
        if side > 2 {
            return None;
        }
        let base = match kind {
            GroupKind::Run => Self::run(anchor)?,
            GroupKind::Triplet | GroupKind::Quad(QuadKind::Open) => {
                Self { kind, anchor, called_side: None }
            }
            GroupKind::Pair | GroupKind::Quad(_) => return None,
        };
        Some(Self { called_side: Some(side), ..base })
    }

    /// New quad replacing this called triplet, keeping its side
    pub fn promoted(&self) -> Option<Self> {
        match (self.kind, self.called_side) {
            (GroupKind::Triplet, Some(side)) => Some(Self {
                kind: GroupKind::Quad(QuadKind::Promoted),
                anchor: self.anchor,
                called_side: Some(side),
            }),
            _ => None,
        }
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn anchor(&self) -> Tile {
        self.anchor
    }

    pub fn called_side(&self) -> Option<u8> {
        self.called_side
    }

    /// Derived tile list
    pub fn tiles(&self) -> SmallVec<[Tile; 4]> {
        let t = self.anchor;
        match self.kind {
            GroupKind::Pair => smallvec![t, t],
            GroupKind::Triplet => smallvec![t, t, t],
            GroupKind::Quad(_) => smallvec![t, t, t, t],
            GroupKind::Run => {
                let mut tiles = SmallVec::new();
                tiles.push(t);
                tiles.extend(t.offset(1));
                tiles.extend(t.offset(2));
                tiles
            }
        }
    }

    pub fn contains(&self, tile: Tile) -> bool {
        match self.kind {
            GroupKind::Run => {
                tile.suit() == self.anchor.suit()
                    && tile.rank() >= self.anchor.rank()
                    && tile.rank() <= self.anchor.rank() + 2
            }
            _ => tile == self.anchor,
        }
    }

    pub fn is_pair(&self) -> bool {
        self.kind == GroupKind::Pair
    }

    pub fn is_run(&self) -> bool {
        self.kind == GroupKind::Run
    }

    pub fn is_quad(&self) -> bool {
        matches!(self.kind, GroupKind::Quad(_))
    }

    /// Triplet or quad
    pub fn is_set(&self) -> bool {
        matches!(self.kind, GroupKind::Triplet | GroupKind::Quad(_))
    }

    /// Not claimed from a discard (closed quads included)
    pub fn is_concealed(&self) -> bool {
        self.called_side.is_none()
    }

    /// Whether holding this group opens the hand
    pub fn opens_hand(&self) -> bool {
        !self.is_concealed()
    }

    pub fn has_terminal_or_honour(&self) -> bool {
        self.tiles().iter().any(|t| t.is_terminal_or_honour())
    }

    pub fn has_terminal(&self) -> bool {
        self.tiles().iter().any(|t| t.is_terminal())
    }
}
