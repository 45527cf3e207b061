use super::group::Group;
use super::hand::COMPLETE_SIZE;
use super::tile::{Suit, Tile, TileCatalogue};
use std::collections::HashMap;

/// Whole-hand shapes that bypass grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialShape {
    /// Seven distinct pairs
    SevenPairs,
    /// One of each terminal/honour plus a duplicate
    ThirteenOrphans,
}

/// Decomposition result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decomposition {
    /// Not a complete hand
    Invalid,
    /// Special shape with its sorted tiles
    Special(SpecialShape, Vec<Tile>),
    /// One pair plus runs/triplets/quads, called groups last
    Groups(Vec<Group>),
}

impl Decomposition {
    pub fn is_complete(&self) -> bool {
        !matches!(self, Decomposition::Invalid)
    }

    pub fn groups(&self) -> &[Group] {
        match self {
            Decomposition::Groups(groups) => groups,
            _ => &[],
        }
    }

    pub fn special(&self) -> Option<SpecialShape> {
        match self {
            Decomposition::Special(shape, _) => Some(*shape),
            _ => None,
        }
    }

    /// Every tile of the hand, quads counted as four
    pub fn tiles(&self) -> Vec<Tile> {
        match self {
            Decomposition::Invalid => Vec::new(),
            Decomposition::Special(_, tiles) => tiles.clone(),
            Decomposition::Groups(groups) => groups.iter().flat_map(|g| g.tiles()).collect(),
        }
    }

    pub fn pair(&self) -> Option<Tile> {
        self.groups().iter().find(|g| g.is_pair()).map(|g| g.anchor())
    }
}

/// Concealed-part result as cached
#[derive(Debug, Clone)]
enum Shape {
    Invalid,
    Special(SpecialShape),
    Groups(Vec<Group>),
}

/// Hand decomposer
///
/// Partitions concealed tiles by suit. Honour stacks must be exactly 2 or 3;
/// a numbered suit with `len % 3 == 2` carries the pair, `len % 3 == 0` must
/// group completely, anything else is invalid, and at most one suit may
/// carry the pair. The per-suit search takes the lowest tile and tries a run
/// first unless it has 3+ copies, backtracking into the other choice when
/// the remainder fails.
///
/// Results for the concealed part are cached (cleared when full).
pub struct Decomposer {
    catalogue: TileCatalogue,
    cache: HashMap<Vec<u8>, Shape>,
    max_cache_size: usize,
}

impl Decomposer {
    pub fn new(catalogue: &TileCatalogue) -> Self {
        Self::with_cache_size(catalogue, 4096)
    }

    pub fn with_cache_size(catalogue: &TileCatalogue, max_cache_size: usize) -> Self {
        Self { catalogue: catalogue.clone(), cache: HashMap::new(), max_cache_size }
    }

    pub fn catalogue(&self) -> &TileCatalogue {
        &self.catalogue
    }

    /// Decompose concealed tiles plus called groups
    ///
    /// Special shapes are checked first; they need 14 concealed tiles and no
    /// called groups.
    pub fn decompose(&mut self, concealed: &[Tile], called: &[Group]) -> Decomposition {
        if concealed.len() + 3 * called.len() != COMPLETE_SIZE {
            return Decomposition::Invalid;
        }
        let mut sorted = concealed.to_vec();
        sorted.sort();
        let key: Vec<u8> = sorted.iter().map(|t| t.id()).collect();

        let shape = match self.cache.get(&key) {
            Some(shape) => shape.clone(),
            None => {
                let shape = self.concealed_shape(&sorted, called.is_empty());
                if self.cache.len() >= self.max_cache_size {
                    self.cache.clear();
                }
                self.cache.insert(key, shape.clone());
                shape
            }
        };

        match shape {
            Shape::Invalid => Decomposition::Invalid,
            Shape::Special(s) => Decomposition::Special(s, sorted),
            Shape::Groups(mut groups) => {
                groups.extend_from_slice(called);
                Decomposition::Groups(groups)
            }
        }
    }

    /// General grouping only, ignoring special shapes
    pub fn decompose_general(&self, concealed: &[Tile], called: &[Group]) -> Decomposition {
        if concealed.len() + 3 * called.len() != COMPLETE_SIZE {
            return Decomposition::Invalid;
        }
        let mut sorted = concealed.to_vec();
        sorted.sort();
        match self.group_concealed(&sorted) {
            Some(mut groups) => {
                groups.extend_from_slice(called);
                Decomposition::Groups(groups)
            }
            None => Decomposition::Invalid,
        }
    }

    fn concealed_shape(&self, sorted: &[Tile], no_calls: bool) -> Shape {
        if no_calls && sorted.len() == COMPLETE_SIZE {
            if is_thirteen_orphans(sorted, &self.catalogue) {
                return Shape::Special(SpecialShape::ThirteenOrphans);
            }
            if is_seven_pairs(sorted) {
                return Shape::Special(SpecialShape::SevenPairs);
            }
        }
        match self.group_concealed(sorted) {
            Some(groups) => Shape::Groups(groups),
            None => Shape::Invalid,
        }
    }

    fn group_concealed(&self, sorted: &[Tile]) -> Option<Vec<Group>> {
        if sorted.iter().any(|t| !self.catalogue.suits.contains(&t.suit())) {
            return None;
        }
        let mut groups = Vec::with_capacity(5);
        let mut pair_carriers = 0;

        for &suit in &self.catalogue.suits {
            let mut counts = [0u8; 10];
            let mut len = 0usize;
            for t in sorted.iter().filter(|t| t.suit() == suit) {
                counts[t.rank() as usize] += 1;
                len += 1;
            }
            if len == 0 {
                continue;
            }

            if self.catalogue.is_honour_suit(suit) {
                for rank in 1..=suit.max_rank() {
                    let tile = Tile::new(suit, rank)?;
                    match counts[rank as usize] {
                        0 => {}
                        2 => {
                            pair_carriers += 1;
                            groups.push(Group::pair(tile));
                        }
                        3 => groups.push(Group::triplet(tile)),
                        _ => return None,
                    }
                }
                continue;
            }

            match len % 3 {
                0 => {
                    if !arrange(&mut counts, suit, &mut groups) {
                        return None;
                    }
                }
                2 => {
                    pair_carriers += 1;
                    if pair_carriers > 1 || !arrange_with_pair(&mut counts, suit, &mut groups) {
                        return None;
                    }
                }
                _ => return None,
            }
        }

        (pair_carriers == 1).then_some(groups)
    }
}

/// Try each pair candidate in rank order; first success wins
fn arrange_with_pair(counts: &mut [u8; 10], suit: Suit, out: &mut Vec<Group>) -> bool {
    for rank in 1..=9usize {
        if counts[rank] < 2 {
            continue;
        }
        let Some(tile) = Tile::new(suit, rank as u8) else { continue };
        counts[rank] -= 2;
        let mark = out.len();
        out.push(Group::pair(tile));
        if arrange(counts, suit, out) {
            return true;
        }
        out.truncate(mark);
        counts[rank] += 2;
    }
    false
}

/// Group every tile of one numbered suit into runs and triplets
fn arrange(counts: &mut [u8; 10], suit: Suit, out: &mut Vec<Group>) -> bool {
    let Some(rank) = (1..=9usize).find(|&r| counts[r] > 0) else {
        return true;
    };
    let Some(tile) = Tile::new(suit, rank as u8) else {
        return false;
    };

    let triplet_first = counts[rank] >= 3;
    for take_triplet in [triplet_first, !triplet_first] {
        if take_triplet {
            if counts[rank] < 3 {
                continue;
            }
            counts[rank] -= 3;
            out.push(Group::triplet(tile));
            if arrange(counts, suit, out) {
                return true;
            }
            out.pop();
            counts[rank] += 3;
        } else {
            if rank > 7 || counts[rank + 1] == 0 || counts[rank + 2] == 0 {
                continue;
            }
            let Some(run) = Group::run(tile) else { continue };
            for r in rank..rank + 3 {
                counts[r] -= 1;
            }
            out.push(run);
            if arrange(counts, suit, out) {
                return true;
            }
            out.pop();
            for r in rank..rank + 3 {
                counts[r] += 1;
            }
        }
    }
    false
}

/// Seven distinct pairs (input sorted)
pub fn is_seven_pairs(sorted: &[Tile]) -> bool {
    if sorted.len() != 14 {
        return false;
    }
    sorted.chunks(2).all(|c| c[0] == c[1])
        && sorted.chunks(2).zip(sorted.chunks(2).skip(1)).all(|(a, b)| a[0] != b[0])
}

/// All thirteen orphans present plus one duplicate, nothing else (input sorted)
pub fn is_thirteen_orphans(sorted: &[Tile], catalogue: &TileCatalogue) -> bool {
    if sorted.len() != 14 || !sorted.iter().all(|t| t.is_terminal_or_honour()) {
        return false;
    }
    let mut distinct = sorted.to_vec();
    distinct.dedup();
    distinct == catalogue.orphans()
}

/// One-shot decomposition without a cache
pub fn decompose(concealed: &[Tile], called: &[Group], catalogue: &TileCatalogue) -> Decomposition {
    Decomposer::with_cache_size(catalogue, 0).decompose(concealed, called)
}
