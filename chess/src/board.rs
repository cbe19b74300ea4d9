//! Board and related things

use crate::attack;
use crate::bitboard::Bitboard;
use crate::cell::Cell;
use crate::moves::{Move, MoveKind};
use crate::square::{delta, Square};

use x88chess_base::position::FenParseError;
use x88chess_base::{geometry, CastlingSide, Chessman, Color, Coord, File, Position};

use std::fmt;
use std::str::FromStr;

use arrayvec::ArrayVec;
use thiserror::Error;

/// Maximum number of moves which can be made on a single [`Board`] without undoing them
pub const MAX_GAME_MOVES: usize = 4096;

/// Squares on the 1st and the 8th rank
const BACK_RANKS: Bitboard = Bitboard::from_raw(0xff00_0000_0000_00ff);

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the 1st or on the 8th rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Coord),
    /// Enpassant square is not located right behind a pawn that could have just made a double move
    #[error("invalid enpassant position {0}")]
    InvalidEnpassant(Coord),
    /// Castling right is present, but the king or the rook is not on its standard square
    #[error("castling right {1:?} of {0:?} doesn't match king and rook placement")]
    InvalidCastling(Color, CastlingSide),
    /// Opponent's king is under attack
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
}

/// Error creating [`Board`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FromFenError {
    /// Position cannot be parsed
    #[error("cannot parse fen: {0}")]
    Fen(#[from] FenParseError),
    /// Position was parsed, but it's invalid
    #[error("invalid position: {0}")]
    Valid(#[from] ValidateError),
}

/// State which cannot be recovered from the move itself when undoing it
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Undo {
    castling: [[Option<File>; 2]; 2],
    ep: Option<Square>,
    half_move_clock: u16,
}

/// Mutable chess position in 0x88 layout
///
/// Besides the cell array, the board keeps a bitboard for each color and chessman, so all the
/// pieces of one kind can be enumerated without scanning the board. Both are always kept in sync.
///
/// Moves are applied in place with [`Board::make_move()`] and reverted with [`Board::undo_move()`].
/// The calls must be strictly nested: a move can only be undone after all the moves made after it
/// are undone.
///
/// # Example
///
/// ```
/// # use x88chess::{movegen, Board, GenericMove};
/// # use std::str::FromStr;
/// #
/// let mut b = Board::initial();
/// let mv = movegen::find_legal(&mut b, &GenericMove::from_str("e2e4").unwrap()).unwrap();
/// b.make_move(mv);
/// assert_eq!(b.to_string(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
/// b.undo_move(mv);
/// assert_eq!(b, Board::initial());
/// ```
#[derive(Clone)]
pub struct Board {
    cells: [Cell; 128],
    pieces: [[Bitboard; Chessman::COUNT]; 2],
    castling: [[Option<File>; 2]; 2],
    ep: Option<Square>,
    side: Color,
    half_move_clock: u16,
    half_move_number: u32,
    stack: Box<ArrayVec<Undo, MAX_GAME_MOVES>>,
}

impl Board {
    fn empty() -> Board {
        Board {
            cells: [Cell::EMPTY; 128],
            pieces: [[Bitboard::EMPTY; Chessman::COUNT]; 2],
            castling: [[None; 2]; 2],
            ep: None,
            side: Color::White,
            half_move_clock: 0,
            half_move_number: 2,
            stack: Box::default(),
        }
    }

    fn from_position_unchecked(pos: &Position) -> Board {
        let mut res = Board::empty();
        for coord in Coord::iter() {
            let cell = Cell::from_piece(pos.get(coord));
            if cell.is_occupied() {
                res.put(Square::from_coord(coord), cell);
            }
        }
        res.castling = pos.castling;
        res.ep = pos.ep_square.map(Square::from_coord);
        res.side = pos.side;
        res.half_move_clock = pos.half_move_clock;
        res.half_move_number = u32::from(pos.full_move_number) * 2;
        if pos.side == Color::Black {
            res.half_move_number += 1;
        }
        res
    }

    /// Builds the board from a position, validating it
    pub fn new(pos: &Position) -> Result<Board, ValidateError> {
        let res = Board::from_position_unchecked(pos);
        res.validate()?;
        Ok(res)
    }

    /// Returns a board with the initial position
    pub fn initial() -> Board {
        Board::from_position_unchecked(&Position::initial())
    }

    /// Parses a board from FEN
    pub fn from_fen(fen: &str) -> Result<Board, FromFenError> {
        Board::from_str(fen)
    }

    fn validate(&self) -> Result<(), ValidateError> {
        // Check NoKing, TooManyKings
        for color in Color::iter() {
            match self.pieces(color, Chessman::King).popcount() {
                0 => return Err(ValidateError::NoKing(color)),
                1 => {}
                _ => return Err(ValidateError::TooManyKings(color)),
            }
        }

        // Check InvalidPawn
        for color in Color::iter() {
            if let Some(sq) = (self.pieces(color, Chessman::Pawn) & BACK_RANKS).first() {
                return Err(ValidateError::InvalidPawn(sq.coord()));
            }
        }

        // Check InvalidCastling
        for color in Color::iter() {
            let rank = geometry::castling_rank(color);
            for side in CastlingSide::iter() {
                let file = match self.castling(color, side) {
                    Some(file) => file,
                    None => continue,
                };
                if file != side.rook_file()
                    || self.cell(Square::from_parts(File::E, rank))
                        != Cell::from_parts(color, Chessman::King)
                    || self.cell(Square::from_parts(file, rank))
                        != Cell::from_parts(color, Chessman::Rook)
                {
                    return Err(ValidateError::InvalidCastling(color, side));
                }
            }
        }

        // Check InvalidEnpassant
        if let Some(ep) = self.ep {
            let pawn = ep.offset(-pawn_forward(self.side));
            let valid = ep.rank() == geometry::enpassant_dst_rank(self.side)
                && self.cell(ep).is_empty()
                && pawn.map(|p| self.cell(p))
                    == Some(Cell::from_parts(self.side.inv(), Chessman::Pawn));
            if !valid {
                return Err(ValidateError::InvalidEnpassant(ep.coord()));
            }
        }

        // Check OpponentKingAttacked
        if attack::is_attacked(self, self.king(self.side.inv()), self.side) {
            return Err(ValidateError::OpponentKingAttacked);
        }

        Ok(())
    }

    /// Converts the board back into the generic model
    pub fn to_position(&self) -> Position {
        let mut res = Position::empty();
        for sq in Square::iter() {
            res.put(sq.coord(), self.cell(sq).piece());
        }
        res.castling = self.castling;
        res.ep_square = self.ep.map(|sq| sq.coord());
        res.side = self.side;
        res.half_move_clock = self.half_move_clock;
        res.full_move_number = self.full_move_number();
        res
    }

    /// Converts the board into a FEN string
    pub fn as_fen(&self) -> String {
        self.to_string()
    }

    /// Returns the contents of the square `sq`
    #[inline]
    pub fn cell(&self, sq: Square) -> Cell {
        self.cells[sq.index()]
    }

    /// Returns the bitboard with all the pieces of color `c` and chessman `m`
    #[inline]
    pub fn pieces(&self, c: Color, m: Chessman) -> Bitboard {
        self.pieces[c.index()][m.index()]
    }

    /// Returns the position of the king of color `c`
    #[inline]
    pub fn king(&self, c: Color) -> Square {
        let kings = self.pieces(c, Chessman::King);
        debug_assert_eq!(kings.popcount(), 1);
        Square::from_bit(kings.as_raw().trailing_zeros())
    }

    /// Returns side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    /// Returns the enpassant target square, if enpassant is possible
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.ep
    }

    /// Returns the file of the castling rook, or `None` if the castling right is lost
    #[inline]
    pub fn castling(&self, c: Color, s: CastlingSide) -> Option<File> {
        self.castling[c.index()][s.index()]
    }

    /// Returns the number of half-moves since the last capture or pawn move
    #[inline]
    pub fn half_move_clock(&self) -> u16 {
        self.half_move_clock
    }

    #[inline]
    pub fn full_move_number(&self) -> u16 {
        u16::try_from(self.half_move_number / 2).unwrap_or(u16::MAX)
    }

    /// Returns the number of moves which were made and not undone yet
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    fn put(&mut self, sq: Square, cell: Cell) {
        debug_assert!(self.cell(sq).is_empty());
        if let Some((c, m)) = cell.parts() {
            self.pieces[c.index()][m.index()].set(sq);
            self.cells[sq.index()] = cell;
        }
    }

    #[inline]
    fn remove(&mut self, sq: Square) -> Cell {
        let cell = self.cell(sq);
        if let Some((c, m)) = cell.parts() {
            self.pieces[c.index()][m.index()].unset(sq);
        }
        self.cells[sq.index()] = Cell::EMPTY;
        cell
    }

    #[inline]
    fn relocate(&mut self, src: Square, dst: Square) {
        let cell = self.remove(src);
        self.put(dst, cell);
    }

    /// Drops castling rights which depend on the piece standing on `sq`
    ///
    /// Called both for the source square of a move and for the square of a captured piece.
    fn clear_castling_at(&mut self, sq: Square) {
        for color in Color::iter() {
            let rank = geometry::castling_rank(color);
            if sq.rank() != rank {
                continue;
            }
            let rights = &mut self.castling[color.index()];
            if sq.file() == File::E {
                *rights = [None; 2];
                continue;
            }
            for right in rights.iter_mut() {
                if *right == Some(sq.file()) {
                    *right = None;
                }
            }
        }
    }

    /// Applies the move `mv` to the board
    ///
    /// The move must be generated for the current position, otherwise the board gets corrupted.
    ///
    /// # Panics
    ///
    /// Panics if the piece on the source square doesn't match the move, or if more than
    /// [`MAX_GAME_MOVES`] moves are made without undoing them.
    pub fn make_move(&mut self, mv: Move) {
        let (src, dst) = (mv.src(), mv.dst());
        assert_eq!(self.cell(src), mv.src_cell(), "move {} doesn't match the board", mv);
        assert!(
            !self.stack.is_full(),
            "cannot make more than {} moves",
            MAX_GAME_MOVES
        );
        self.stack.push(Undo {
            castling: self.castling,
            ep: self.ep,
            half_move_clock: self.half_move_clock,
        });

        match mv.kind() {
            MoveKind::Normal => {
                if self.cell(dst).is_occupied() {
                    debug_assert_eq!(self.cell(dst), mv.dst_cell());
                    self.remove(dst);
                    self.clear_castling_at(dst);
                }
                self.relocate(src, dst);
                self.clear_castling_at(src);
            }
            MoveKind::PawnDouble => {
                self.relocate(src, dst);
            }
            MoveKind::Promote => {
                if self.cell(dst).is_occupied() {
                    debug_assert_eq!(self.cell(dst), mv.dst_cell());
                    self.remove(dst);
                    self.clear_castling_at(dst);
                }
                self.remove(src);
                let promote = match mv.promote() {
                    Some(p) => Chessman::from(p),
                    None => panic!("promotion {:?} without a promoted piece", mv),
                };
                self.put(dst, Cell::from_parts(self.side, promote));
            }
            MoveKind::Enpassant => {
                let captured = self.remove(ep_capture_square(src, dst));
                debug_assert_eq!(captured, mv.dst_cell());
                self.relocate(src, dst);
            }
            MoveKind::Castling => {
                let (rook_src, rook_dst) = castling_rook(dst);
                self.relocate(src, dst);
                self.relocate(rook_src, rook_dst);
                self.castling[self.side.index()] = [None; 2];
            }
        }

        self.ep = match mv.kind() {
            MoveKind::PawnDouble => dst.offset(-pawn_forward(self.side)),
            _ => None,
        };
        if mv.src_cell().chessman() == Some(Chessman::Pawn) || mv.is_capture() {
            self.half_move_clock = 0;
        } else {
            self.half_move_clock = self.half_move_clock.saturating_add(1);
        }
        self.half_move_number += 1;
        self.side = self.side.inv();

        #[cfg(feature = "selftest")]
        assert!(self.is_consistent(), "board is broken after making {:?}", mv);
    }

    /// Reverts the move `mv`, which must be the last move made on this board
    ///
    /// # Panics
    ///
    /// Panics if there are no moves to undo.
    pub fn undo_move(&mut self, mv: Move) {
        let undo = match self.stack.pop() {
            Some(undo) => undo,
            None => panic!("no move to undo"),
        };
        let (src, dst) = (mv.src(), mv.dst());

        self.side = self.side.inv();
        self.half_move_number -= 1;
        self.castling = undo.castling;
        self.ep = undo.ep;
        self.half_move_clock = undo.half_move_clock;

        match mv.kind() {
            MoveKind::Normal => {
                self.relocate(dst, src);
                if mv.is_capture() {
                    self.put(dst, mv.dst_cell());
                }
            }
            MoveKind::PawnDouble => {
                self.relocate(dst, src);
            }
            MoveKind::Promote => {
                self.remove(dst);
                self.put(src, mv.src_cell());
                if mv.is_capture() {
                    self.put(dst, mv.dst_cell());
                }
            }
            MoveKind::Enpassant => {
                self.relocate(dst, src);
                self.put(ep_capture_square(src, dst), mv.dst_cell());
            }
            MoveKind::Castling => {
                let (rook_src, rook_dst) = castling_rook(dst);
                self.relocate(rook_dst, rook_src);
                self.relocate(dst, src);
            }
        }

        #[cfg(feature = "selftest")]
        assert!(self.is_consistent(), "board is broken after undoing {:?}", mv);
    }

    /// Verifies that the cell array and the bitboards describe the same position, and that each
    /// side has exactly one king
    pub fn is_consistent(&self) -> bool {
        let mut occupied = Bitboard::EMPTY;
        for sq in Square::iter() {
            match self.cell(sq).parts() {
                Some((c, m)) if self.pieces(c, m).has(sq) => occupied |= Bitboard::from_square(sq),
                Some(_) => return false,
                None => {}
            }
        }
        // Each occupied square is in its own bitboard, so no bitboard may have extra squares
        let mut seen = Bitboard::EMPTY;
        for color in Color::iter() {
            for chessman in Chessman::iter() {
                let bb = self.pieces(color, chessman);
                if (seen & bb).is_nonempty() {
                    return false;
                }
                seen |= bb;
            }
        }
        if seen != occupied {
            return false;
        }
        if (0_u8..128)
            .filter(|&v| !Square::is_valid(v))
            .any(|v| self.cells[v as usize].is_occupied())
        {
            return false;
        }
        Color::iter().all(|c| self.pieces(c, Chessman::King).popcount() == 1)
    }
}

#[inline]
fn pawn_forward(c: Color) -> i8 {
    match c {
        Color::White => delta::N,
        Color::Black => delta::S,
    }
}

/// Square of the pawn captured by enpassant
#[inline]
fn ep_capture_square(src: Square, dst: Square) -> Square {
    Square::from_parts(dst.file(), src.rank())
}

/// Returns the source and destination of the rook when the king castles to `king_dst`
#[inline]
fn castling_rook(king_dst: Square) -> (Square, Square) {
    let rank = king_dst.rank();
    match king_dst.file() {
        File::G => (Square::from_parts(File::H, rank), Square::from_parts(File::F, rank)),
        File::C => (Square::from_parts(File::A, rank), Square::from_parts(File::D, rank)),
        file => panic!("bad castling destination file {}", file),
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        self.cells == other.cells
            && self.pieces == other.pieces
            && self.castling == other.castling
            && self.ep == other.ep
            && self.side == other.side
            && self.half_move_clock == other.half_move_clock
            && self.half_move_number == other.half_move_number
    }
}

impl Eq for Board {}

impl TryFrom<&Position> for Board {
    type Error = ValidateError;

    fn try_from(pos: &Position) -> Result<Board, ValidateError> {
        Board::new(pos)
    }
}

impl TryFrom<Position> for Board {
    type Error = ValidateError;

    fn try_from(pos: Position) -> Result<Board, ValidateError> {
        Board::new(&pos)
    }
}

impl FromStr for Board {
    type Err = FromFenError;

    fn from_str(s: &str) -> Result<Board, Self::Err> {
        Ok(Board::new(&Position::from_str(s)?)?)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("Board")
            .field("fen", &self.to_string())
            .field("depth", &self.depth())
            .finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.to_position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x88chess_base::PromotePiece;

    const INI_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn sq(s: &str) -> Square {
        Square::from_coord(Coord::from_str(s).unwrap())
    }

    fn make(b: &mut Board, kind: MoveKind, src: &str, dst: &str) -> Move {
        make_promote(b, kind, src, dst, None)
    }

    fn make_promote(
        b: &mut Board,
        kind: MoveKind,
        src: &str,
        dst: &str,
        promote: Option<PromotePiece>,
    ) -> Move {
        let (src, dst) = (sq(src), sq(dst));
        let dst_cell = match kind {
            MoveKind::Enpassant => b.cell(ep_capture_square(src, dst)),
            _ => b.cell(dst),
        };
        let mv = Move::new(kind, src, dst, b.cell(src), dst_cell, promote);
        b.make_move(mv);
        assert!(b.is_consistent());
        mv
    }

    #[test]
    fn test_initial() {
        assert_eq!(Board::initial().to_string(), INI_FEN);
        assert_eq!(Board::from_fen(INI_FEN).unwrap(), Board::initial());
        assert_eq!(Board::initial().to_position(), Position::initial());
        assert!(Board::initial().is_consistent());
    }

    #[test]
    fn test_midgame() {
        const FEN: &str = "1rq1r1k1/1p3ppp/pB3n2/3ppP2/Pbb1P3/1PN2B2/2P2QPP/R1R4K w - - 1 21";

        let b = Board::from_fen(FEN).unwrap();
        assert_eq!(b.as_fen(), FEN);
        assert_eq!(
            b.cell(sq("b4")),
            Cell::from_parts(Color::Black, Chessman::Bishop)
        );
        assert_eq!(b.cell(sq("f2")), Cell::from_parts(Color::White, Chessman::Queen));
        assert_eq!(b.king(Color::White), Square::H1);
        assert_eq!(b.king(Color::Black), sq("g8"));
        assert_eq!(b.pieces(Color::Black, Chessman::Bishop).popcount(), 2);
        assert_eq!(b.side(), Color::White);
        assert_eq!(b.en_passant(), None);
        assert_eq!(b.half_move_clock(), 1);
        assert_eq!(b.full_move_number(), 21);
    }

    #[test]
    fn test_round_trip() {
        for fen in [
            INI_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "5k2/8/8/8/3Pp3/8/8/3K4 b - d3 0 1",
            "4k3/8/8/8/8/8/8/4K2R b K - 99 120",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            let b = Board::new(&pos).unwrap();
            assert!(b.is_consistent());
            assert_eq!(b.to_position(), pos);
            assert_eq!(b.as_fen(), fen);
        }
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            Board::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FromFenError::Valid(ValidateError::NoKing(Color::Black)))
        );
        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FromFenError::Valid(ValidateError::NoKing(Color::White)))
        );
        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/K3K3 w - - 0 1"),
            Err(FromFenError::Valid(ValidateError::TooManyKings(Color::White)))
        );
        assert_eq!(
            Board::from_fen("4k2P/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FromFenError::Valid(ValidateError::InvalidPawn(
                Coord::from_str("h8").unwrap()
            )))
        );
        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3 w K - 0 1"),
            Err(FromFenError::Valid(ValidateError::InvalidCastling(
                Color::White,
                CastlingSide::King
            )))
        );
        assert_eq!(
            Board::from_fen("r3k2r/8/8/8/8/8/8/R2K3R w Q - 0 1"),
            Err(FromFenError::Valid(ValidateError::InvalidCastling(
                Color::White,
                CastlingSide::Queen
            )))
        );
        assert_eq!(
            Board::from_fen("4k3/8/8/8/3P4/8/8/4K3 b - e3 0 1"),
            Err(FromFenError::Valid(ValidateError::InvalidEnpassant(
                Coord::from_str("e3").unwrap()
            )))
        );
        assert!(Board::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1").is_ok());
        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/4R1K1 w - - 0 1"),
            Err(FromFenError::Valid(ValidateError::OpponentKingAttacked))
        );
        assert!(matches!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K2R x - - 0 1"),
            Err(FromFenError::Fen(_))
        ));
    }

    #[test]
    fn test_simple() {
        let mut b = Board::initial();
        let b_copy = b.clone();

        let m1 = make(&mut b, MoveKind::PawnDouble, "e2", "e4");
        assert_eq!(
            b.as_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        let m2 = make(&mut b, MoveKind::Normal, "g8", "f6");
        assert_eq!(
            b.as_fen(),
            "rnbqkb1r/pppppppp/5n2/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 1 2"
        );
        let m3 = make(&mut b, MoveKind::Normal, "e4", "e5");
        let m4 = make(&mut b, MoveKind::Normal, "f6", "e4");
        let m5 = make(&mut b, MoveKind::Normal, "f1", "d3");
        let m6 = make(&mut b, MoveKind::Normal, "e4", "f2");
        assert_eq!(
            b.as_fen(),
            "rnbqkb1r/pppppppp/8/4P3/8/3B4/PPPP1nPP/RNBQK1NR w KQkq - 0 4"
        );
        assert_eq!(b.depth(), 6);

        for mv in [m6, m5, m4, m3, m2, m1] {
            b.undo_move(mv);
            assert!(b.is_consistent());
        }
        assert_eq!(b, b_copy);
        assert_eq!(b.depth(), 0);
    }

    #[test]
    fn test_enpassant() {
        let mut b = Board::from_fen("5k2/8/8/8/3Pp3/8/8/3K4 b - d3 0 1").unwrap();
        let b_copy = b.clone();

        let mv = make(&mut b, MoveKind::Enpassant, "e4", "d3");
        assert!(mv.is_capture());
        assert_eq!(b.cell(sq("d4")), Cell::EMPTY);
        assert_eq!(b.cell(sq("e4")), Cell::EMPTY);
        assert_eq!(b.cell(sq("d3")), Cell::from_parts(Color::Black, Chessman::Pawn));
        assert_eq!(b.en_passant(), None);
        assert_eq!(b.pieces(Color::White, Chessman::Pawn), Bitboard::EMPTY);
        assert_eq!(b.as_fen(), "5k2/8/8/8/8/3p4/8/3K4 w - - 0 2");

        b.undo_move(mv);
        assert_eq!(b.cell(sq("d4")), Cell::from_parts(Color::White, Chessman::Pawn));
        assert_eq!(b.en_passant(), Some(sq("d3")));
        assert_eq!(b, b_copy);
    }

    #[test]
    fn test_castling() {
        let mut b = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let b_copy = b.clone();

        let m1 = make(&mut b, MoveKind::Castling, "e1", "g1");
        assert_eq!(b.castling(Color::White, CastlingSide::King), None);
        assert_eq!(b.castling(Color::White, CastlingSide::Queen), None);
        assert_eq!(b.castling(Color::Black, CastlingSide::King), Some(File::H));
        assert_eq!(b.castling(Color::Black, CastlingSide::Queen), Some(File::A));
        assert_eq!(b.as_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");

        let m2 = make(&mut b, MoveKind::Castling, "e8", "c8");
        assert_eq!(b.as_fen(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2");

        b.undo_move(m2);
        b.undo_move(m1);
        assert_eq!(b.castling(Color::White, CastlingSide::King), Some(File::H));
        assert_eq!(b.castling(Color::White, CastlingSide::Queen), Some(File::A));
        assert_eq!(b, b_copy);
    }

    #[test]
    fn test_castling_rights() {
        let mut b = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        // Rook captures rook, both sides lose the right on that wing
        let m1 = make(&mut b, MoveKind::Normal, "h1", "h8");
        assert_eq!(b.as_fen(), "r3k2R/8/8/8/8/8/8/R3K3 b Qq - 0 1");

        // King move clears both rights
        let m2 = make(&mut b, MoveKind::Normal, "e8", "d7");
        assert_eq!(b.as_fen(), "r6R/3k4/8/8/8/8/8/R3K3 w Q - 1 2");

        // Rook move clears only its own side
        let m3 = make(&mut b, MoveKind::Normal, "a1", "a2");
        assert_eq!(b.as_fen(), "r6R/3k4/8/8/8/8/R7/4K3 b - - 2 2");

        for mv in [m3, m2, m1] {
            b.undo_move(mv);
        }
        assert_eq!(b.as_fen(), "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    }

    #[test]
    fn test_promote() {
        let mut b = Board::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 5 30").unwrap();
        let b_copy = b.clone();

        let m1 = make_promote(
            &mut b,
            MoveKind::Promote,
            "a7",
            "b8",
            Some(PromotePiece::Knight),
        );
        assert_eq!(b.as_fen(), "1N2k3/8/8/8/8/8/8/4K3 b - - 0 30");
        assert_eq!(b.pieces(Color::White, Chessman::Pawn), Bitboard::EMPTY);
        assert_eq!(b.pieces(Color::Black, Chessman::Rook), Bitboard::EMPTY);
        b.undo_move(m1);
        assert_eq!(b, b_copy);

        let m2 = make_promote(
            &mut b,
            MoveKind::Promote,
            "a7",
            "a8",
            Some(PromotePiece::Queen),
        );
        assert_eq!(b.as_fen(), "Qr2k3/8/8/8/8/8/8/4K3 b - - 0 30");
        b.undo_move(m2);
        assert_eq!(b, b_copy);
    }

    #[test]
    fn test_clocks() {
        let mut b = Board::from_fen("4k3/8/8/8/8/8/4P3/4K1N1 w - - 7 12").unwrap();
        make(&mut b, MoveKind::Normal, "g1", "f3");
        assert_eq!((b.half_move_clock(), b.full_move_number()), (8, 12));
        make(&mut b, MoveKind::Normal, "e8", "d8");
        assert_eq!((b.half_move_clock(), b.full_move_number()), (9, 13));
        make(&mut b, MoveKind::Normal, "e2", "e3");
        assert_eq!((b.half_move_clock(), b.full_move_number()), (0, 13));
    }

    #[test]
    fn test_consistent() {
        let b = Board::initial();
        assert!(b.is_consistent());

        // Cell without its bit
        let mut broken = b.clone();
        let e2 = sq("e2");
        broken.pieces[Color::White.index()][Chessman::Pawn.index()].unset(e2);
        assert!(!broken.is_consistent());

        // Bit without its cell
        let mut broken = b.clone();
        broken.pieces[Color::Black.index()][Chessman::Knight.index()].set(sq("e4"));
        assert!(!broken.is_consistent());

        // One square in two bitboards
        let mut broken = b;
        broken.pieces[Color::Black.index()][Chessman::Queen.index()].set(e2);
        assert!(!broken.is_consistent());
    }

    #[test]
    #[should_panic]
    fn test_undo_empty() {
        let mut b = Board::initial();
        let mv = Move::new(
            MoveKind::Normal,
            sq("g1"),
            sq("f3"),
            Cell::from_parts(Color::White, Chessman::Knight),
            Cell::EMPTY,
            None,
        );
        b.undo_move(mv);
    }

    #[test]
    #[should_panic]
    fn test_mismatched_move() {
        let mut b = Board::initial();
        let mv = Move::new(
            MoveKind::Normal,
            sq("e4"),
            sq("e5"),
            Cell::from_parts(Color::White, Chessman::Pawn),
            Cell::EMPTY,
            None,
        );
        b.make_move(mv);
    }

    #[test]
    #[should_panic(expected = "without a promoted piece")]
    fn test_promote_without_piece() {
        let mut b = Board::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mv = Move::new(
            MoveKind::Promote,
            sq("a7"),
            sq("a8"),
            Cell::from_parts(Color::White, Chessman::Pawn),
            Cell::EMPTY,
            Some(PromotePiece::Queen),
        );
        let mv = Move::from_raw(mv.raw() & !(0x7 << 27));
        assert_eq!(mv.promote(), None);
        b.make_move(mv);
    }
}
