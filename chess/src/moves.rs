//! Packed move representation

use crate::cell::Cell;
use crate::square::Square;

use x88chess_base::{GenericMove, PromotePiece};

use std::fmt;

/// Move kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Normal move, capturing or not
    Normal = 0,
    /// Pawn moves two squares forward
    PawnDouble = 1,
    /// Pawn reaches the last rank, capturing or not
    Promote = 2,
    /// Enpassant capture
    Enpassant = 3,
    /// Castling, encoded as the king move
    Castling = 4,
}

impl MoveKind {
    const fn from_raw(val: u32) -> MoveKind {
        match val {
            0 => MoveKind::Normal,
            1 => MoveKind::PawnDouble,
            2 => MoveKind::Promote,
            3 => MoveKind::Enpassant,
            4 => MoveKind::Castling,
            _ => panic!("invalid move kind"),
        }
    }
}

const fn promote_to_raw(p: Option<PromotePiece>) -> u32 {
    match p {
        None => 0,
        Some(PromotePiece::Knight) => 1,
        Some(PromotePiece::Bishop) => 2,
        Some(PromotePiece::Rook) => 3,
        Some(PromotePiece::Queen) => 4,
    }
}

const fn promote_from_raw(val: u32) -> Option<PromotePiece> {
    match val {
        1 => Some(PromotePiece::Knight),
        2 => Some(PromotePiece::Bishop),
        3 => Some(PromotePiece::Rook),
        4 => Some(PromotePiece::Queen),
        _ => None,
    }
}

/// Chess move packed into 32 bits
///
/// Layout, from the lowest bits:
///
/// | field       | shift | width |
/// |-------------|-------|-------|
/// | kind        | 0     | 3     |
/// | source      | 3     | 7     |
/// | destination | 10    | 7     |
/// | source cell | 17    | 5     |
/// | target cell | 22    | 5     |
/// | promote     | 27    | 3     |
///
/// The target cell is the captured piece, or [`Cell::EMPTY`] for non-capturing moves. For
/// enpassant, it is the captured pawn, even though the destination square is empty.
///
/// Moves are created by the move generator for a specific position. A move only makes sense for the
/// position it was generated in.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move(u32);

impl Move {
    const KIND_SHIFT: u32 = 0;
    const KIND_MASK: u32 = 0x7;
    const SRC_SHIFT: u32 = 3;
    const DST_SHIFT: u32 = 10;
    const SQUARE_MASK: u32 = 0x7f;
    const SRC_CELL_SHIFT: u32 = 17;
    const DST_CELL_SHIFT: u32 = 22;
    const CELL_MASK: u32 = 0x1f;
    const PROMOTE_SHIFT: u32 = 27;
    const PROMOTE_MASK: u32 = 0x7;

    /// Packs the move
    ///
    /// `promote` must be `Some` exactly when `kind` is [`MoveKind::Promote`].
    #[inline]
    pub fn new(
        kind: MoveKind,
        src: Square,
        dst: Square,
        src_cell: Cell,
        dst_cell: Cell,
        promote: Option<PromotePiece>,
    ) -> Move {
        debug_assert!(src_cell.is_occupied());
        debug_assert_eq!(promote.is_some(), kind == MoveKind::Promote);
        Move(
            ((kind as u32 & Self::KIND_MASK) << Self::KIND_SHIFT)
                | ((src.raw() as u32 & Self::SQUARE_MASK) << Self::SRC_SHIFT)
                | ((dst.raw() as u32 & Self::SQUARE_MASK) << Self::DST_SHIFT)
                | ((src_cell.raw() as u32 & Self::CELL_MASK) << Self::SRC_CELL_SHIFT)
                | ((dst_cell.raw() as u32 & Self::CELL_MASK) << Self::DST_CELL_SHIFT)
                | ((promote_to_raw(promote) & Self::PROMOTE_MASK) << Self::PROMOTE_SHIFT),
        )
    }

    #[inline]
    pub const fn kind(&self) -> MoveKind {
        MoveKind::from_raw((self.0 >> Self::KIND_SHIFT) & Self::KIND_MASK)
    }

    #[inline]
    pub const fn src(&self) -> Square {
        Square::from_raw(((self.0 >> Self::SRC_SHIFT) & Self::SQUARE_MASK) as u8)
    }

    #[inline]
    pub const fn dst(&self) -> Square {
        Square::from_raw(((self.0 >> Self::DST_SHIFT) & Self::SQUARE_MASK) as u8)
    }

    /// Returns the piece which makes the move
    #[inline]
    pub const fn src_cell(&self) -> Cell {
        Cell::from_raw(((self.0 >> Self::SRC_CELL_SHIFT) & Self::CELL_MASK) as u8)
    }

    /// Returns the captured piece, or [`Cell::EMPTY`] if the move is not a capture
    #[inline]
    pub const fn dst_cell(&self) -> Cell {
        Cell::from_raw(((self.0 >> Self::DST_CELL_SHIFT) & Self::CELL_MASK) as u8)
    }

    #[inline]
    pub const fn promote(&self) -> Option<PromotePiece> {
        promote_from_raw((self.0 >> Self::PROMOTE_SHIFT) & Self::PROMOTE_MASK)
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.dst_cell().is_occupied()
    }

    #[inline]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Unpacks the move from [`Move::raw()`] without validation
    #[inline]
    pub const fn from_raw(val: u32) -> Move {
        Move(val)
    }

    /// Converts the move into the generic model
    #[inline]
    pub fn to_generic(&self) -> GenericMove {
        let promote = match self.kind() {
            MoveKind::Promote => self.promote(),
            _ => None,
        };
        GenericMove::new(self.src().coord(), self.dst().coord(), promote)
    }
}

impl From<Move> for GenericMove {
    #[inline]
    fn from(mv: Move) -> GenericMove {
        mv.to_generic()
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("Move")
            .field("kind", &self.kind())
            .field("src", &self.src())
            .field("dst", &self.dst())
            .field("src_cell", &self.src_cell())
            .field("dst_cell", &self.dst_cell())
            .field("promote", &self.promote())
            .finish()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.to_generic())
    }
}
