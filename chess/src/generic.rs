use crate::square::{delta, Square};

use x88chess_base::{geometry, types};

/// Side to move known at compile time
///
/// Color-dependent code is written once over this trait and instantiated for both sides.
pub trait Color {
    const COLOR: types::Color;
    /// Direction in which the pawns move
    const PAWN_FORWARD: i8;
    /// Directions in which the pawns capture
    const PAWN_CAPTURES: [i8; 2];
    /// Square where the king starts and castles from
    const KING_HOME: Square;

    #[inline]
    fn promote_rank() -> types::Rank {
        geometry::promote_rank(Self::COLOR)
    }

    #[inline]
    fn double_move_src_rank() -> types::Rank {
        geometry::double_move_src_rank(Self::COLOR)
    }
}

pub struct White;
pub struct Black;

impl Color for White {
    const COLOR: types::Color = types::Color::White;
    const PAWN_FORWARD: i8 = delta::N;
    const PAWN_CAPTURES: [i8; 2] = [delta::NE, delta::NW];
    const KING_HOME: Square = Square::E1;
}

impl Color for Black {
    const COLOR: types::Color = types::Color::Black;
    const PAWN_FORWARD: i8 = delta::S;
    const PAWN_CAPTURES: [i8; 2] = [delta::SE, delta::SW];
    const KING_HOME: Square = Square::E8;
}
