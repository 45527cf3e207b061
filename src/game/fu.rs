use crate::tile::{Decomposition, Group, GroupKind, QuadKind, Tile, Wind};

/// Wait shape the winning tile completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitKind {
    /// Two-sided run wait
    Ryanmen,
    /// Pair turned into a triplet
    Shanpon,
    /// Middle of a run
    Kanchan,
    /// 12 waiting on 3, or 89 waiting on 7
    Penchan,
    /// Single tile onto the pair
    Tanki,
}

impl WaitKind {
    pub fn fu(self) -> u32 {
        match self {
            WaitKind::Ryanmen | WaitKind::Shanpon => 0,
            WaitKind::Kanchan | WaitKind::Penchan | WaitKind::Tanki => 2,
        }
    }
}

/// Every concealed group the winning tile could have completed, with
/// its wait, cheapest wait first
pub fn winning_groups(groups: &[Group], tile: Tile) -> Vec<(usize, WaitKind)> {
    let mut candidates: Vec<(usize, WaitKind)> = groups
        .iter()
        .enumerate()
        .filter(|(_, g)| g.is_concealed() && !g.is_quad() && g.contains(tile))
        .filter_map(|(i, g)| {
            let wait = match g.kind() {
                GroupKind::Run => {
                    let anchor = g.anchor().rank();
                    match tile.rank() - anchor {
                        0 if anchor == 7 => WaitKind::Penchan,
                        2 if anchor == 1 => WaitKind::Penchan,
                        1 => WaitKind::Kanchan,
                        _ => WaitKind::Ryanmen,
                    }
                }
                GroupKind::Triplet => WaitKind::Shanpon,
                GroupKind::Pair => WaitKind::Tanki,
                GroupKind::Quad(_) => return None,
            };
            Some((i, wait))
        })
        .collect();
    candidates.sort_by_key(|(_, wait)| match wait {
        WaitKind::Ryanmen => 0,
        WaitKind::Shanpon => 1,
        WaitKind::Kanchan | WaitKind::Penchan => 2,
        WaitKind::Tanki => 3,
    });
    candidates
}

/// The cheapest reading among `winning_groups`
pub fn winning_group(groups: &[Group], tile: Tile) -> Option<(usize, WaitKind)> {
    winning_groups(groups, tile).into_iter().next()
}

/// Situation inputs for fu
#[derive(Debug, Clone, Copy)]
pub struct FuContext {
    pub seat_wind: Wind,
    pub round_wind: Wind,
    pub winning_tile: Tile,
    pub self_drawn: bool,
    /// Closed ron earns the 10 fu menzen bonus
    pub closed: bool,
}

/// Fu calculator
pub struct FuCalculator;

impl FuCalculator {
    /// Fu for a complete decomposition, rounded up to the next 10
    ///
    /// Special shapes are a flat 25. Returns 0 for an invalid decomposition.
    /// When the winning tile fits several groups the highest fu is returned;
    /// `readings` gives each one separately.
    pub fn compute(decomposition: &Decomposition, ctx: &FuContext) -> u32 {
        Self::readings(decomposition, ctx)
            .into_iter()
            .map(|(_, fu)| fu)
            .max()
            .unwrap_or(0)
    }

    /// Fu for each group the winning tile may have completed
    ///
    /// Special shapes and hands where the tile fits no concealed group give
    /// a single reading with no group.
    pub fn readings(decomposition: &Decomposition, ctx: &FuContext) -> Vec<(Option<usize>, u32)> {
        let groups = match decomposition {
            Decomposition::Invalid => return vec![(None, 0)],
            Decomposition::Special(..) => return vec![(None, 25)],
            Decomposition::Groups(groups) => groups,
        };
        let candidates = winning_groups(groups, ctx.winning_tile);
        if candidates.is_empty() {
            return vec![(None, Self::grouped(groups, ctx, None))];
        }
        candidates
            .into_iter()
            .map(|winning| (Some(winning.0), Self::grouped(groups, ctx, Some(winning))))
            .collect()
    }

    fn grouped(groups: &[Group], ctx: &FuContext, winning: Option<(usize, WaitKind)>) -> u32 {
        let mut fu = 20;
        if ctx.closed && !ctx.self_drawn {
            fu += 10;
        }

        for (i, group) in groups.iter().enumerate() {
            let honour_or_terminal = group.anchor().is_terminal_or_honour();
            fu += match group.kind() {
                GroupKind::Pair => Self::pair_fu(group.anchor(), ctx),
                GroupKind::Run => 0,
                GroupKind::Triplet => {
                    // a triplet finished on a discard counts as open
                    let ron_completed = !ctx.self_drawn && winning.map(|(w, _)| w) == Some(i);
                    let concealed = group.is_concealed() && !ron_completed;
                    2 * scale(honour_or_terminal) * scale(concealed)
                }
                GroupKind::Quad(QuadKind::Closed) => 16 * scale(honour_or_terminal),
                GroupKind::Quad(_) => 8 * scale(honour_or_terminal),
            };
        }

        if let Some((_, wait)) = winning {
            fu += wait.fu();
        }
        if ctx.self_drawn && fu != 20 {
            fu += 2;
        }
        if !ctx.closed && fu == 20 {
            fu += 2;
        }
        fu.div_ceil(10) * 10
    }

    fn pair_fu(tile: Tile, ctx: &FuContext) -> u32 {
        let mut fu = 0;
        if tile == ctx.seat_wind.to_tile() {
            fu += 2;
        }
        if tile == ctx.round_wind.to_tile() {
            fu += 2;
        }
        if tile.is_dragon() {
            fu += 2;
        }
        fu
    }
}

fn scale(double: bool) -> u32 {
    if double {
        2
    } else {
        1
    }
}
