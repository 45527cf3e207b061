use super::constants::IPPATSU_WINDOW;
use super::content::{YakuId, YakuTable};
use super::fu::{winning_group, FuContext};
use crate::tile::{Decomposition, Group, SpecialShape, Suit, Tile, Wind};

/// Riichi declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RiichiKind {
    Single,
    /// Declared on the first uninterrupted discard
    Double,
}

/// Situation of a win
///
/// `fu` is filled in by the evaluator after the fu pass; pinfu is
/// recognised from it.
#[derive(Debug, Clone)]
pub struct YakuContext {
    /// Prevailing wind of the round
    pub round_wind: Wind,
    pub seat_wind: Wind,
    /// Tile that completed the hand
    pub winning_tile: Tile,
    /// Tsumo rather than ron
    pub self_drawn: bool,
    /// No open calls; closed quads keep a hand closed
    pub closed: bool,
    pub dealer: bool,
    /// Riichi declared by the winner, if any
    pub riichi: Option<RiichiKind>,
    /// Turns since riichi, plus a large penalty once anyone called
    pub riichi_turns: u32,
    /// Fu of the reading being judged
    pub fu: u32,
    /// No discard or call has happened yet for this seat
    pub first_draw: bool,
    /// Winning tile is a kan replacement
    pub after_kan: bool,
    /// Winning tile is the last live tile (or its discard)
    pub last_tile: bool,
    /// Winning tile was added to a promoted quad
    pub robbed_kan: bool,
    /// Group the winning tile completed; the cheapest wait when `None`
    pub winning_group: Option<usize>,
}

impl YakuContext {
    pub fn new(round_wind: Wind, seat_wind: Wind, winning_tile: Tile, self_drawn: bool) -> Self {
        Self {
            round_wind,
            seat_wind,
            winning_tile,
            self_drawn,
            closed: true,
            dealer: seat_wind == Wind::East,
            riichi: None,
            riichi_turns: 0,
            fu: 0,
            first_draw: false,
            after_kan: false,
            last_tile: false,
            robbed_kan: false,
            winning_group: None,
        }
    }

    pub fn fu_context(&self) -> FuContext {
        FuContext {
            seat_wind: self.seat_wind,
            round_wind: self.round_wind,
            winning_tile: self.winning_tile,
            self_drawn: self.self_drawn,
            closed: self.closed,
        }
    }
}

/// Read-only view of a decomposed hand for the predicates
struct HandView<'a> {
    groups: &'a [Group],
    special: Option<SpecialShape>,
    tiles: Vec<Tile>,
    winning: Option<usize>,
}

impl<'a> HandView<'a> {
    fn new(decomposition: &'a Decomposition, ctx: &YakuContext) -> Option<Self> {
        if !decomposition.is_complete() {
            return None;
        }
        let groups = decomposition.groups();
        Some(Self {
            groups,
            special: decomposition.special(),
            tiles: decomposition.tiles(),
            winning: ctx
                .winning_group
                .or_else(|| winning_group(groups, ctx.winning_tile).map(|(i, _)| i)),
        })
    }

    fn is_grouped(&self) -> bool {
        !self.groups.is_empty()
    }

    fn sets(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|g| g.is_set())
    }

    fn runs(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|g| g.is_run())
    }

    fn has_set_of(&self, tile: Tile) -> bool {
        self.sets().any(|g| g.anchor() == tile)
    }

    fn has_run_at(&self, suit: Suit, rank: u8) -> bool {
        self.runs().any(|g| g.anchor().suit() == suit && g.anchor().rank() == rank)
    }

    fn quads(&self) -> usize {
        self.groups.iter().filter(|g| g.is_quad()).count()
    }

    /// Concealed triplets/quads; a triplet finished on a discard does not count
    fn concealed_sets(&self, ctx: &YakuContext) -> usize {
        self.groups
            .iter()
            .enumerate()
            .filter(|(i, g)| {
                g.is_set() && g.is_concealed() && (ctx.self_drawn || self.winning != Some(*i))
            })
            .count()
    }

    /// Number of identical-run pairs
    fn peikou(&self) -> usize {
        let mut anchors: Vec<Tile> = self.runs().map(|g| g.anchor()).collect();
        anchors.sort();
        let mut count = 0;
        let mut i = 0;
        while i + 1 < anchors.len() {
            if anchors[i] == anchors[i + 1] {
                count += 1;
                i += 2;
            } else {
                i += 1;
            }
        }
        count
    }

    fn numbered_suits(&self) -> Vec<Suit> {
        let mut suits: Vec<Suit> =
            self.tiles.iter().map(|t| t.suit()).filter(|s| !s.is_honour()).collect();
        suits.sort();
        suits.dedup();
        suits
    }

    fn has_honour(&self) -> bool {
        self.tiles.iter().any(|t| t.is_honour())
    }

    fn dragon_sets(&self) -> usize {
        self.sets().filter(|g| g.anchor().is_dragon()).count()
    }
}

type Predicate = fn(&HandView, &YakuContext) -> bool;

const YAKUMAN: &[(YakuId, Predicate)] = &[
    (YakuId::KokushiMusou, |v, _| v.special == Some(SpecialShape::ThirteenOrphans)),
    (YakuId::Daisangen, |v, _| v.dragon_sets() == 3),
    (YakuId::Suuankou, |v, ctx| v.concealed_sets(ctx) == 4),
    (YakuId::Tsuuiisou, |v, _| v.tiles.iter().all(|t| t.is_honour())),
    (YakuId::Chinroutou, |v, _| v.tiles.iter().all(|t| t.is_terminal())),
    (YakuId::Ryuuiisou, |v, _| v.tiles.iter().all(|t| t.is_green())),
    (YakuId::ChuurenPoutou, is_nine_gates),
    (YakuId::Tenhou, |_, ctx| ctx.first_draw && ctx.self_drawn && ctx.dealer),
    (YakuId::Chiihou, |_, ctx| ctx.first_draw && ctx.self_drawn && !ctx.dealer),
    (YakuId::Suukantsu, |v, _| v.quads() == 4),
];

const REGULAR: &[(YakuId, Predicate)] = &[
    (YakuId::Riichi, |_, ctx| ctx.riichi.is_some()),
    (YakuId::DoubleRiichi, |_, ctx| ctx.riichi == Some(RiichiKind::Double)),
    (YakuId::Ippatsu, |_, ctx| ctx.riichi.is_some() && ctx.riichi_turns <= IPPATSU_WINDOW),
    (YakuId::MenzenTsumo, |_, ctx| ctx.closed && ctx.self_drawn),
    (YakuId::Pinfu, |v, ctx| {
        ctx.closed && v.is_grouped() && ctx.fu == if ctx.self_drawn { 20 } else { 30 }
    }),
    (YakuId::Tanyao, |v, _| v.tiles.iter().all(|t| !t.is_terminal_or_honour())),
    (YakuId::Iipeikou, |v, ctx| ctx.closed && v.peikou() >= 1),
    (YakuId::YakuhaiWhite, |v, _| v.has_set_of(Tile::WHITE)),
    (YakuId::YakuhaiGreen, |v, _| v.has_set_of(Tile::GREEN)),
    (YakuId::YakuhaiRed, |v, _| v.has_set_of(Tile::RED)),
    (YakuId::SeatWind, |v, ctx| v.has_set_of(ctx.seat_wind.to_tile())),
    (YakuId::RoundWind, |v, ctx| v.has_set_of(ctx.round_wind.to_tile())),
    (YakuId::RinshanKaihou, |_, ctx| ctx.after_kan && ctx.self_drawn),
    (YakuId::HaiteiRaoyue, |_, ctx| ctx.last_tile && ctx.self_drawn && !ctx.after_kan),
    (YakuId::HouteiRaoyui, |_, ctx| ctx.last_tile && !ctx.self_drawn),
    (YakuId::Chankan, |_, ctx| ctx.robbed_kan),
    (YakuId::Ittsu, |v, _| {
        Suit::numbered().into_iter().any(|s| [1, 4, 7].iter().all(|&r| v.has_run_at(s, r)))
    }),
    (YakuId::Chanta, |v, _| {
        v.is_grouped()
            && v.groups.iter().all(|g| g.has_terminal_or_honour())
            && v.runs().next().is_some()
            && v.has_honour()
    }),
    (YakuId::SanshokuDoujun, |v, _| {
        (1..=7).any(|r| Suit::numbered().into_iter().all(|s| v.has_run_at(s, r)))
    }),
    (YakuId::SanshokuDoukou, |v, _| {
        (1..=9).any(|r| {
            Suit::numbered()
                .into_iter()
                .all(|s| Tile::new(s, r).is_some_and(|t| v.has_set_of(t)))
        })
    }),
    (YakuId::Chiitoitsu, |v, _| v.special == Some(SpecialShape::SevenPairs)),
    (YakuId::Toitoi, |v, _| v.sets().count() == 4),
    (YakuId::Sanankou, |v, ctx| v.concealed_sets(ctx) == 3),
    (YakuId::Sankantsu, |v, _| v.quads() == 3),
    (YakuId::Honitsu, |v, _| v.numbered_suits().len() == 1 && v.has_honour()),
    (YakuId::Junchan, |v, _| {
        v.is_grouped()
            && v.groups.iter().all(|g| g.has_terminal())
            && v.runs().next().is_some()
    }),
    (YakuId::Ryanpeikou, |v, ctx| ctx.closed && v.peikou() == 2),
    (YakuId::Shousangen, |v, _| {
        v.dragon_sets() == 2 && v.groups.iter().any(|g| g.is_pair() && g.anchor().is_dragon())
    }),
    (YakuId::Honroutou, |v, _| {
        v.tiles.iter().all(|t| t.is_terminal_or_honour()) && v.has_honour()
    }),
    (YakuId::Chinitsu, |v, _| v.numbered_suits().len() == 1 && !v.has_honour()),
];

fn is_nine_gates(view: &HandView, ctx: &YakuContext) -> bool {
    if !ctx.closed || view.groups.iter().any(|g| g.opens_hand() || g.is_quad()) {
        return false;
    }
    let suits = view.numbered_suits();
    if suits.len() != 1 || view.has_honour() || view.tiles.len() != 14 {
        return false;
    }
    let mut counts = [0u8; 10];
    for t in &view.tiles {
        counts[t.rank() as usize] += 1;
    }
    counts[1] >= 3 && counts[9] >= 3 && (2..=8).all(|r| counts[r] >= 1)
}

/// Yaku evaluator
pub struct YakuEvaluator;

impl YakuEvaluator {
    /// Yaku present in a decomposition
    ///
    /// Any yakuman replaces the regular list. The regular list is run
    /// through `suppress`. An invalid decomposition yields nothing.
    pub fn evaluate(decomposition: &Decomposition, ctx: &YakuContext, table: &YakuTable) -> Vec<YakuId> {
        let Some(view) = HandView::new(decomposition, ctx) else {
            return Vec::new();
        };
        let found = |list: &[(YakuId, Predicate)]| -> Vec<YakuId> {
            list.iter()
                .filter(|(id, pred)| {
                    // closed-only yaku vanish on open hands
                    (ctx.closed || table.get(*id).open_han != 0) && pred(&view, ctx)
                })
                .map(|(id, _)| *id)
                .collect()
        };

        let yakuman = found(YAKUMAN);
        if !yakuman.is_empty() {
            return yakuman;
        }
        Self::suppress(&found(REGULAR), table)
    }

    /// Drop every yaku invalidated by another in the list; idempotent
    pub fn suppress(yaku: &[YakuId], table: &YakuTable) -> Vec<YakuId> {
        yaku.iter()
            .copied()
            .filter(|id| !yaku.iter().any(|other| table.get(*other).invalidates.contains(id)))
            .collect()
    }

    /// Whether the list holds at least one yaku worth han for this hand
    pub fn has_yaku(yaku: &[YakuId], table: &YakuTable, closed: bool) -> bool {
        yaku.iter().any(|id| {
            let record = table.get(*id);
            record.is_yakuman() || record.han(closed) > 0
        })
    }
}
