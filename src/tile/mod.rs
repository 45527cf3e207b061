//! Tile model: tiles, groups, the wall, hands and hand decomposition

pub mod decompose;
pub mod group;
pub mod hand;
#[allow(clippy::module_inception)]
pub mod tile;
pub mod wall;

pub use decompose::{decompose, Decomposer, Decomposition, SpecialShape};
pub use group::{Group, GroupKind, QuadKind};
pub use hand::{Hand, COMPLETE_SIZE};
pub use tile::{parse_tiles, tile_name, Suit, Tile, TileCatalogue, Wind};
pub use wall::Wall;
