//! Legal move generation and perft

use crate::attack::{self, Attacks};
use crate::board::{Board, FromFenError, ValidateError};
use crate::cell::Cell;
use crate::generic;
use crate::moves::{Move, MoveKind};
use crate::square::{delta, Square};

use x88chess_base::{CastlingSide, Chessman, Color, File, GenericMove, Position, PromotePiece};

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;
use log::{debug, trace};

/// Capacity of [`MoveList`]
pub const MAX_MOVES: usize = 256;

const PROMOTE_ORDER: [PromotePiece; 4] = [
    PromotePiece::Queen,
    PromotePiece::Rook,
    PromotePiece::Bishop,
    PromotePiece::Knight,
];

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, MAX_MOVES>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, MAX_MOVES>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

struct MoveGen<'a, C> {
    board: &'a Board,
    moves: &'a mut MoveList,
    _c: PhantomData<C>,
}

impl<'a, C: generic::Color> MoveGen<'a, C> {
    fn new(board: &'a Board, moves: &'a mut MoveList) -> Self {
        MoveGen {
            board,
            moves,
            _c: PhantomData,
        }
    }

    #[inline]
    fn add(&mut self, kind: MoveKind, src: Square, dst: Square, dst_cell: Cell) {
        let src_cell = self.board.cell(src);
        self.moves.push(Move::new(kind, src, dst, src_cell, dst_cell, None));
    }

    /// Enemy pieces except the king can be captured
    #[inline]
    fn is_capturable(&self, cell: Cell) -> bool {
        match cell.parts() {
            Some((c, m)) => c != C::COLOR && m != Chessman::King,
            None => false,
        }
    }

    #[inline]
    fn is_own(&self, sq: Square, m: Chessman) -> bool {
        self.board.cell(sq) == Cell::from_parts(C::COLOR, m)
    }

    #[inline]
    fn is_slider(&self, sq: Square) -> bool {
        self.board.cell(sq).chessman().map_or(false, |m| m.is_sliding())
    }

    fn add_promotions(&mut self, src: Square, dst: Square, dst_cell: Cell) {
        let src_cell = self.board.cell(src);
        for p in PROMOTE_ORDER {
            self.moves.push(Move::new(
                MoveKind::Promote,
                src,
                dst,
                src_cell,
                dst_cell,
                Some(p),
            ));
        }
    }

    /// Adds a single-step pawn move or capture, expanding it into promotions on the last rank
    #[inline]
    fn add_pawn_move(&mut self, src: Square, dst: Square, dst_cell: Cell) {
        if dst.rank() == C::promote_rank() {
            self.add_promotions(src, dst, dst_cell);
        } else {
            self.add(MoveKind::Normal, src, dst, dst_cell);
        }
    }

    #[inline]
    fn add_enpassant(&mut self, src: Square, dst: Square) {
        let captured = Cell::from_parts(C::COLOR.inv(), Chessman::Pawn);
        self.add(MoveKind::Enpassant, src, dst, captured);
    }

    fn add_pawn_captures(&mut self) {
        let ep = self.board.en_passant();
        for src in self.board.pieces(C::COLOR, Chessman::Pawn) {
            for d in C::PAWN_CAPTURES {
                let dst = match src.offset(d) {
                    Some(dst) => dst,
                    None => continue,
                };
                let cell = self.board.cell(dst);
                if self.is_capturable(cell) {
                    self.add_pawn_move(src, dst, cell);
                } else if ep == Some(dst) {
                    self.add_enpassant(src, dst);
                }
            }
        }
    }

    fn add_pawn_pushes(&mut self) {
        for src in self.board.pieces(C::COLOR, Chessman::Pawn) {
            let dst = match src.offset(C::PAWN_FORWARD) {
                Some(dst) => dst,
                None => continue,
            };
            if self.board.cell(dst).is_occupied() {
                continue;
            }
            self.add_pawn_move(src, dst, Cell::EMPTY);
            if src.rank() != C::double_move_src_rank() {
                continue;
            }
            if let Some(dst2) = dst.offset(C::PAWN_FORWARD) {
                if self.board.cell(dst2).is_empty() {
                    self.add(MoveKind::PawnDouble, src, dst2, Cell::EMPTY);
                }
            }
        }
    }

    fn add_moves(&mut self, src: Square, deltas: &[i8], sliding: bool) {
        for &d in deltas {
            let mut dst = src;
            while let Some(next) = dst.offset(d) {
                dst = next;
                let cell = self.board.cell(dst);
                if cell.is_occupied() {
                    if self.is_capturable(cell) {
                        self.add(MoveKind::Normal, src, dst, cell);
                    }
                    break;
                }
                self.add(MoveKind::Normal, src, dst, Cell::EMPTY);
                if !sliding {
                    break;
                }
            }
        }
    }

    fn add_castling(&mut self) {
        let src = C::KING_HOME;
        if !self.is_own(src, Chessman::King) {
            return;
        }
        let board = self.board;
        let rank = src.rank();
        let by = C::COLOR.inv();
        let is_empty = |f: File| board.cell(Square::from_parts(f, rank)).is_empty();

        if board.castling(C::COLOR, CastlingSide::King).is_some()
            && is_empty(File::F)
            && is_empty(File::G)
            && !attack::is_attacked(board, Square::from_parts(File::F, rank), by)
        {
            self.add(
                MoveKind::Castling,
                src,
                Square::from_parts(File::G, rank),
                Cell::EMPTY,
            );
        }

        if board.castling(C::COLOR, CastlingSide::Queen).is_some()
            && is_empty(File::B)
            && is_empty(File::C)
            && is_empty(File::D)
            && !attack::is_attacked(board, Square::from_parts(File::D, rank), by)
        {
            self.add(
                MoveKind::Castling,
                src,
                Square::from_parts(File::C, rank),
                Cell::EMPTY,
            );
        }
    }

    /// Generates all pseudo-legal moves
    ///
    /// Castling is only valid if the king is not in check.
    fn gen_all(&mut self) {
        self.add_pawn_captures();
        self.add_pawn_pushes();
        for (m, deltas, sliding) in [
            (Chessman::Knight, &delta::KNIGHT[..], false),
            (Chessman::Bishop, &delta::BISHOP[..], true),
            (Chessman::Rook, &delta::ROOK[..], true),
            (Chessman::Queen, &delta::QUEEN[..], true),
            (Chessman::King, &delta::KING[..], false),
        ] {
            for src in self.board.pieces(C::COLOR, m) {
                self.add_moves(src, deltas, sliding);
            }
        }
        self.add_castling();
    }

    /// Adds pawn captures onto `dst`, including enpassant if the pawn on `dst` has just made a
    /// double move
    fn add_pawn_captures_to(&mut self, dst: Square, king: Square) {
        let cell = self.board.cell(dst);
        for d in C::PAWN_CAPTURES {
            if let Some(src) = dst.offset(-d) {
                if self.is_own(src, Chessman::Pawn) && !attack::is_pinned(self.board, src, king) {
                    self.add_pawn_move(src, dst, cell);
                }
            }
        }

        let ep = match self.board.en_passant() {
            Some(ep) if dst.offset(C::PAWN_FORWARD) == Some(ep) => ep,
            _ => return,
        };
        for d in C::PAWN_CAPTURES {
            if let Some(src) = ep.offset(-d) {
                if self.is_own(src, Chessman::Pawn) && !attack::is_pinned(self.board, src, king) {
                    self.add_enpassant(src, ep);
                }
            }
        }
    }

    /// Adds pawn pushes onto the empty square `dst`
    fn add_pawn_pushes_to(&mut self, dst: Square, king: Square) {
        let src = match dst.offset(-C::PAWN_FORWARD) {
            Some(src) => src,
            None => return,
        };
        if self.is_own(src, Chessman::Pawn) {
            if !attack::is_pinned(self.board, src, king) {
                self.add_pawn_move(src, dst, Cell::EMPTY);
            }
            return;
        }
        if self.board.cell(src).is_occupied() {
            return;
        }
        if let Some(src2) = src.offset(-C::PAWN_FORWARD) {
            if src2.rank() == C::double_move_src_rank()
                && self.is_own(src2, Chessman::Pawn)
                && !attack::is_pinned(self.board, src2, king)
            {
                self.add(MoveKind::PawnDouble, src2, dst, Cell::EMPTY);
            }
        }
    }

    /// Adds moves of non-pinned knights, bishops, rooks and queens onto `dst`
    fn add_piece_moves_to(&mut self, dst: Square, king: Square) {
        let cell = self.board.cell(dst);
        for m in [
            Chessman::Knight,
            Chessman::Bishop,
            Chessman::Rook,
            Chessman::Queen,
        ] {
            for src in self.board.pieces(C::COLOR, m) {
                if attack::can_attack(self.board, src, dst)
                    && !attack::is_pinned(self.board, src, king)
                {
                    self.add(MoveKind::Normal, src, dst, cell);
                }
            }
        }
    }

    /// Generates moves which get the king out of check
    ///
    /// The result is legal, except for enpassant captures, which still need to be verified.
    fn gen_evasion(&mut self, checkers: &Attacks) {
        let king = self.board.king(C::COLOR);
        let by = C::COLOR.inv();

        for d in delta::KING {
            // Stepping away along the line of a sliding checker keeps the king in check
            if checkers
                .iter()
                .any(|a| a.delta == d && self.is_slider(a.square))
            {
                continue;
            }
            let dst = match king.offset(d) {
                Some(dst) => dst,
                None => continue,
            };
            let cell = self.board.cell(dst);
            if (cell.is_empty() || self.is_capturable(cell))
                && !attack::is_attacked(self.board, dst, by)
            {
                self.add(MoveKind::Normal, king, dst, cell);
            }
        }

        if checkers.len() != 1 {
            return;
        }
        let checker = checkers[0];

        self.add_pawn_captures_to(checker.square, king);
        self.add_piece_moves_to(checker.square, king);

        if !self.is_slider(checker.square) {
            return;
        }
        let mut sq = checker.square;
        while let Some(next) = sq.offset(checker.delta) {
            if next == king {
                break;
            }
            sq = next;
            self.add_pawn_pushes_to(sq, king);
            self.add_piece_moves_to(sq, king);
        }
    }
}

/// Returns `true` if the pseudo-legal move `mv` doesn't leave the king in check
///
/// The side to move must not be in check, unless `mv` is an enpassant capture.
pub fn is_legal(b: &mut Board, mv: Move) -> bool {
    let side = b.side();
    let king = b.king(side);
    if mv.kind() == MoveKind::Enpassant {
        b.make_move(mv);
        let ok = !attack::is_attacked(b, king, side.inv());
        b.undo_move(mv);
        return ok;
    }
    if mv.src() == king {
        return !attack::is_attacked(b, mv.dst(), side.inv());
    }
    !attack::is_pinned(b, mv.src(), king)
        || attack::delta(king, mv.src()) == attack::delta(king, mv.dst())
}

fn do_gen_legal<C: generic::Color>(b: &mut Board, moves: &mut MoveList) {
    let king = b.king(C::COLOR);
    let checkers = attack::collect_attacks(b, king, C::COLOR.inv());
    if checkers.is_empty() {
        MoveGen::<C>::new(b, moves).gen_all();
        moves.retain(|mv| is_legal(b, *mv));
    } else {
        MoveGen::<C>::new(b, moves).gen_evasion(&checkers);
        moves.retain(|mv| mv.kind() != MoveKind::Enpassant || is_legal(b, *mv));
    }
}

/// Generates all the legal moves into `moves`, clearing it first
///
/// The board is temporarily modified during generation, but is restored on return.
pub fn gen_legal_into(b: &mut Board, moves: &mut MoveList) {
    moves.clear();
    match b.side() {
        Color::White => do_gen_legal::<generic::White>(b, moves),
        Color::Black => do_gen_legal::<generic::Black>(b, moves),
    }
}

/// Generates all the legal moves
pub fn gen_legal(b: &mut Board) -> MoveList {
    let mut res = MoveList::new();
    gen_legal_into(b, &mut res);
    res
}

/// Finds a legal move matching `mv`
pub fn find_legal(b: &mut Board, mv: &GenericMove) -> Option<Move> {
    gen_legal(b).iter().copied().find(|m| m.to_generic() == *mv)
}

/// Returns `true` if the side to move is in check
pub fn is_check(b: &Board) -> bool {
    attack::is_attacked(b, b.king(b.side()), b.side().inv())
}

/// Counts the leaf nodes of the legal move tree of depth `depth`
pub fn perft(b: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = gen_legal(b);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut total = 0;
    for &mv in &moves {
        b.make_move(mv);
        total += perft(b, depth - 1);
        b.undo_move(mv);
    }
    total
}

/// Runs [`perft()`] of depth `depth - 1` after each legal move
///
/// Returns an empty list if `depth` is zero.
pub fn divide(b: &mut Board, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    let moves = gen_legal(b);
    let mut res = Vec::with_capacity(moves.len());
    for &mv in &moves {
        b.make_move(mv);
        res.push((mv, perft(b, depth - 1)));
        b.undo_move(mv);
    }
    res
}

/// Move generator working with the generic position and move model
///
/// # Example
///
/// ```
/// # use x88chess::{Generator, Position};
/// #
/// let mut g = Generator::new(&Position::initial()).unwrap();
/// assert_eq!(g.legal_moves().len(), 20);
/// assert_eq!(g.perft(3), 8902);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generator {
    board: Board,
}

impl Generator {
    pub fn new(pos: &Position) -> Result<Generator, ValidateError> {
        let board = Board::new(pos)?;
        debug!("created generator for position {}", board);
        Ok(Generator { board })
    }

    pub fn from_fen(fen: &str) -> Result<Generator, FromFenError> {
        let board = Board::from_fen(fen)?;
        debug!("created generator for position {}", board);
        Ok(Generator { board })
    }

    pub fn from_board(board: Board) -> Generator {
        Generator { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    /// Returns all the legal moves in the position
    pub fn legal_moves(&mut self) -> Vec<GenericMove> {
        gen_legal(&mut self.board)
            .iter()
            .map(Move::to_generic)
            .collect()
    }

    pub fn perft(&mut self, depth: u32) -> u64 {
        debug!("perft of depth {} started", depth);
        let total = perft(&mut self.board, depth);
        debug!("perft of depth {} finished: {} nodes", depth, total);
        total
    }

    /// Returns perft of depth `depth - 1` for each legal move
    pub fn divide(&mut self, depth: u32) -> Vec<(GenericMove, u64)> {
        debug!("divide of depth {} started", depth);
        let res: Vec<(GenericMove, u64)> = divide(&mut self.board, depth)
            .into_iter()
            .map(|(mv, count)| {
                trace!("{}: {}", mv, count);
                (mv.to_generic(), count)
            })
            .collect();
        debug!(
            "divide of depth {} finished: {} nodes",
            depth,
            res.iter().map(|(_, count)| count).sum::<u64>()
        );
        res
    }
}
