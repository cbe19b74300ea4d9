//! Chess position in the generic model and its FEN representation

use crate::geometry;
use crate::types::{self, CastlingSide, Chessman, Color, Coord, File, Piece, Rank};

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing the first part of FEN (i.e. the positions of pieces on the board)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CellsParseError {
    /// Rank is too large
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    /// Rank is too small
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    /// Too many ranks
    #[error("too many ranks")]
    Overflow,
    /// Not enough ranks
    #[error("not enough ranks")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error parsing the castling part of FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CastlingParseError {
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
    /// The same castling right is given twice
    #[error("duplicate castling right {0:?}")]
    Duplicate(char),
    /// Rook file is given, but there is no king on the back rank to compare it with
    #[error("no king on the back rank for {0:?}")]
    NoKing(char),
    /// Rook file coincides with the king file
    #[error("rook file {0:?} is the king file")]
    RookOnKingFile(char),
    /// Empty castling part
    #[error("unexpected empty string")]
    EmptyString,
}

/// Error parsing [`Position`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FenParseError {
    /// FEN contains non-ASCII characters
    #[error("non-ASCII data in FEN")]
    NonAscii,
    /// FEN doesn't have board part
    #[error("board not specified")]
    NoBoard,
    /// Error parsing board from FEN
    #[error("bad board: {0}")]
    Board(#[from] CellsParseError),
    /// FEN doesn't have move side part
    #[error("no move side")]
    NoMoveSide,
    /// Error parsing move side from FEN
    #[error("bad move side: {0}")]
    MoveSide(#[from] types::ColorParseError),
    /// FEN doesn't have castling rights part
    #[error("no castling rights")]
    NoCastling,
    /// Error parsing castling rights from FEN
    #[error("bad castling rights: {0}")]
    Castling(#[from] CastlingParseError),
    /// FEN doesn't have enpassant part
    #[error("no enpassant")]
    NoEnpassant,
    /// Error parsing enpassant from FEN
    #[error("bad enpassant: {0}")]
    Enpassant(#[from] types::CoordParseError),
    /// Enpassant rank doesn't match the side to move
    #[error("invalid enpassant rank {0}")]
    InvalidEnpassantRank(Rank),
    /// Error parsing half-move clock
    #[error("bad half-move clock: {0}")]
    HalfMoveClock(ParseIntError),
    /// Error parsing full move number
    #[error("bad full move number: {0}")]
    FullMoveNumber(ParseIntError),
    /// Full move number is zero
    #[error("full move number must be positive")]
    ZeroFullMoveNumber,
    /// FEN contains extra data
    #[error("extra data in FEN")]
    ExtraData,
}

/// Chess position in the generic model
///
/// The position is not validated: it may contain any placement of pieces. The engine checks the
/// things it relies upon when it builds its own board from a position.
///
/// # Example
///
/// ```
/// # use x88chess_base::{Position, Piece, Color, Chessman, Coord, File, Rank};
/// #
/// let mut pos = Position::empty();
/// pos.put(
///     Coord::from_parts(File::B, Rank::R2),
///     Some(Piece::new(Color::White, Chessman::King)),
/// );
/// pos.put(
///     Coord::from_parts(File::D, Rank::R5),
///     Some(Piece::new(Color::Black, Chessman::King)),
/// );
/// pos.half_move_clock = 10;
/// pos.full_move_number = 42;
/// assert_eq!(pos.as_fen(), "8/8/8/3k4/8/8/1K6/8 w - - 10 42");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Position {
    /// Contents of the board, indexed by [`Coord::index()`]
    pub cells: [Option<Piece>; 64],
    /// Side to move
    pub side: Color,
    /// Castling rights, indexed by color and side
    ///
    /// Each right holds the file of the castling rook, or `None` if the right is lost.
    pub castling: [[Option<File>; 2]; 2],
    /// En passant target square, i.e. the square a capturing pawn would move to
    pub ep_square: Option<Coord>,
    /// Number of half-moves since the last pawn move or capture
    pub half_move_clock: u16,
    /// Move number, starting from 1 and incremented after each move by Black
    pub full_move_number: u16,
}

impl Position {
    /// Returns a position without pieces, with White to move
    pub const fn empty() -> Position {
        Position {
            cells: [None; 64],
            side: Color::White,
            castling: [[None; 2]; 2],
            ep_square: None,
            half_move_clock: 0,
            full_move_number: 1,
        }
    }

    /// Returns the initial position
    pub fn initial() -> Position {
        let mut res = Position::empty();
        for file in File::iter() {
            res.put2(file, Rank::R2, Some(Piece::new(Color::White, Chessman::Pawn)));
            res.put2(file, Rank::R7, Some(Piece::new(Color::Black, Chessman::Pawn)));
        }
        const BACK: [Chessman; 8] = [
            Chessman::Rook,
            Chessman::Knight,
            Chessman::Bishop,
            Chessman::Queen,
            Chessman::King,
            Chessman::Bishop,
            Chessman::Knight,
            Chessman::Rook,
        ];
        for color in Color::iter() {
            let rank = geometry::castling_rank(color);
            for (file, chessman) in File::iter().zip(BACK) {
                res.put2(file, rank, Some(Piece::new(color, chessman)));
            }
            for side in CastlingSide::iter() {
                res.set_castling(color, side, Some(side.rook_file()));
            }
        }
        res
    }

    /// Parses a position from FEN
    ///
    /// Does the same as [`Position::from_str`].
    #[inline]
    pub fn from_fen(fen: &str) -> Result<Position, FenParseError> {
        Position::from_str(fen)
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn get(&self, c: Coord) -> Option<Piece> {
        self.cells[c.index()]
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Option<Piece> {
        self.get(Coord::from_parts(file, rank))
    }

    /// Puts `piece` to the square with coordinate `c`
    #[inline]
    pub fn put(&mut self, c: Coord, piece: Option<Piece>) {
        self.cells[c.index()] = piece;
    }

    /// Puts `piece` to the square with file `file` and rank `rank`
    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, piece: Option<Piece>) {
        self.put(Coord::from_parts(file, rank), piece);
    }

    /// Returns the rook file for the castling right of `color` on `side`
    #[inline]
    pub fn castling(&self, color: Color, side: CastlingSide) -> Option<File> {
        self.castling[color.index()][side.index()]
    }

    #[inline]
    pub fn set_castling(&mut self, color: Color, side: CastlingSide, file: Option<File>) {
        self.castling[color.index()][side.index()] = file;
    }

    /// Returns the file of the king of `color` on its back rank, if any
    pub fn back_rank_king_file(&self, color: Color) -> Option<File> {
        let rank = geometry::castling_rank(color);
        File::iter().find(|&file| self.get2(file, rank) == Some(Piece::new(color, Chessman::King)))
    }

    /// Converts the position into a FEN string
    ///
    /// Does the same as `Position::to_string()`.
    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }
}

impl Default for Position {
    #[inline]
    fn default() -> Position {
        Position::empty()
    }
}

fn parse_cells(s: &str) -> Result<[Option<Piece>; 64], CellsParseError> {
    type Error = CellsParseError;

    // FEN lists ranks from the 8th down to the 1st
    let mut rank = 7_usize;
    let mut file = 0_usize;
    let mut cells = [None; 64];
    for b in s.bytes() {
        match b {
            b'1'..=b'8' => {
                let add = (b - b'0') as usize;
                if file + add > 8 {
                    return Err(Error::RankOverflow(Rank::from_index(rank)));
                }
                file += add;
            }
            b'/' => {
                if file < 8 {
                    return Err(Error::RankUnderflow(Rank::from_index(rank)));
                }
                if rank == 0 {
                    return Err(Error::Overflow);
                }
                rank -= 1;
                file = 0;
            }
            _ => {
                if file >= 8 {
                    return Err(Error::RankOverflow(Rank::from_index(rank)));
                }
                let piece = Piece::from_char(b as char).ok_or(Error::UnexpectedChar(b as char))?;
                cells[rank * 8 + file] = Some(piece);
                file += 1;
            }
        };
    }

    if file < 8 {
        return Err(Error::RankUnderflow(Rank::from_index(rank)));
    }
    if rank > 0 {
        return Err(Error::Underflow);
    }

    Ok(cells)
}

fn parse_castling(
    s: &str,
    cells: &[Option<Piece>; 64],
) -> Result<[[Option<File>; 2]; 2], CastlingParseError> {
    type Error = CastlingParseError;

    let mut res = [[None; 2]; 2];
    if s == "-" {
        return Ok(res);
    }
    if s.is_empty() {
        return Err(Error::EmptyString);
    }
    for ch in s.chars() {
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let (side, file) = match ch.to_ascii_lowercase() {
            'k' => (CastlingSide::King, File::H),
            'q' => (CastlingSide::Queen, File::A),
            lower => {
                let file = File::from_char(lower).ok_or(Error::UnexpectedChar(ch))?;
                let rank = geometry::castling_rank(color);
                let king = Some(Piece::new(color, Chessman::King));
                let king_file = File::iter()
                    .find(|&f| cells[Coord::from_parts(f, rank).index()] == king)
                    .ok_or(Error::NoKing(ch))?;
                let side = match file.cmp(&king_file) {
                    std::cmp::Ordering::Less => CastlingSide::Queen,
                    std::cmp::Ordering::Greater => CastlingSide::King,
                    std::cmp::Ordering::Equal => return Err(Error::RookOnKingFile(ch)),
                };
                (side, file)
            }
        };
        let slot = &mut res[color.index()][side.index()];
        if slot.is_some() {
            return Err(Error::Duplicate(ch));
        }
        *slot = Some(file);
    }
    Ok(res)
}

fn parse_ep_square(s: &str, side: Color) -> Result<Option<Coord>, FenParseError> {
    if s == "-" {
        return Ok(None);
    }
    let res = Coord::from_str(s)?;
    if res.rank() != geometry::enpassant_dst_rank(side) {
        return Err(FenParseError::InvalidEnpassantRank(res.rank()));
    }
    Ok(Some(res))
}

impl FromStr for Position {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Position, Self::Err> {
        type Error = FenParseError;

        if !s.is_ascii() {
            return Err(Error::NonAscii);
        }
        let mut iter = s.split_ascii_whitespace().fuse();

        let cells = parse_cells(iter.next().ok_or(Error::NoBoard)?)?;
        let side = Color::from_str(iter.next().ok_or(Error::NoMoveSide)?)?;
        let castling = parse_castling(iter.next().ok_or(Error::NoCastling)?, &cells)?;
        let ep_square = parse_ep_square(iter.next().ok_or(Error::NoEnpassant)?, side)?;
        let half_move_clock = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::HalfMoveClock)?,
            None => 0,
        };
        let full_move_number = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::FullMoveNumber)?,
            None => 1,
        };
        if full_move_number == 0 {
            return Err(Error::ZeroFullMoveNumber);
        }

        if iter.next().is_some() {
            return Err(Error::ExtraData);
        }

        Ok(Position {
            cells,
            side,
            castling,
            ep_square,
            half_move_clock,
            full_move_number,
        })
    }
}

fn format_cells(
    cells: &[Option<Piece>; 64],
    f: &mut fmt::Formatter<'_>,
) -> Result<(), fmt::Error> {
    for rank in Rank::iter().rev() {
        if rank != Rank::R8 {
            write!(f, "/")?;
        }
        let mut empty = 0;
        for file in File::iter() {
            let piece = match cells[Coord::from_parts(file, rank).index()] {
                Some(piece) => piece,
                None => {
                    empty += 1;
                    continue;
                }
            };
            if empty != 0 {
                write!(f, "{}", empty)?;
                empty = 0;
            }
            write!(f, "{}", piece)?;
        }
        if empty != 0 {
            write!(f, "{}", empty)?;
        }
    }
    Ok(())
}

fn format_castling(
    castling: &[[Option<File>; 2]; 2],
    f: &mut fmt::Formatter<'_>,
) -> Result<(), fmt::Error> {
    let mut any = false;
    for color in Color::iter() {
        for side in [CastlingSide::King, CastlingSide::Queen] {
            let file = match castling[color.index()][side.index()] {
                Some(file) => file,
                None => continue,
            };
            any = true;
            let ch = if file == side.rook_file() {
                match side {
                    CastlingSide::King => 'k',
                    CastlingSide::Queen => 'q',
                }
            } else {
                file.as_char()
            };
            match color {
                Color::White => write!(f, "{}", ch.to_ascii_uppercase())?,
                Color::Black => write!(f, "{}", ch)?,
            }
        }
    }
    if !any {
        write!(f, "-")?;
    }
    Ok(())
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        format_cells(&self.cells, f)?;
        write!(f, " {} ", self.side)?;
        format_castling(&self.castling, f)?;
        match self.ep_square {
            Some(p) => write!(f, " {}", p)?,
            None => write!(f, " -")?,
        };
        write!(f, " {} {}", self.half_move_clock, self.full_move_number)?;
        Ok(())
    }
}
