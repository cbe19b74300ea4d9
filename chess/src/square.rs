//! Squares in 0x88 layout

use x88chess_base::{Coord, File, Rank};

use std::fmt;

/// Single-step direction deltas in 0x88 layout
pub mod delta {
    pub const N: i8 = 16;
    pub const S: i8 = -16;
    pub const E: i8 = 1;
    pub const W: i8 = -1;
    pub const NE: i8 = N + E;
    pub const NW: i8 = N + W;
    pub const SE: i8 = S + E;
    pub const SW: i8 = S + W;

    pub const KNIGHT: [i8; 8] = [
        N + N + E,
        N + N + W,
        N + E + E,
        N + W + W,
        S + S + E,
        S + S + W,
        S + E + E,
        S + W + W,
    ];
    pub const BISHOP: [i8; 4] = [NE, NW, SE, SW];
    pub const ROOK: [i8; 4] = [N, E, S, W];
    pub const QUEEN: [i8; 8] = [N, E, S, W, NE, NW, SE, SW];
    pub const KING: [i8; 8] = QUEEN;
}

/// Square in 0x88 layout
///
/// The value is `rank * 16 + file`, so the upper half of every row is off the board. A value is a
/// valid square iff `value & 0x88 == 0`, which makes stepping off the board detectable with a
/// single mask test after adding a direction delta.
///
/// For bitboard storage, every square also has a dense bit index from 0 to 63.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

macro_rules! squares {
    ($($name:ident = $val:expr),* $(,)?) => {
        $(pub const $name: Square = Square($val);)*
    };
}

impl Square {
    squares! {
        A1 = 0x00, B1 = 0x01, C1 = 0x02, D1 = 0x03, E1 = 0x04, F1 = 0x05, G1 = 0x06, H1 = 0x07,
        A8 = 0x70, B8 = 0x71, C8 = 0x72, D8 = 0x73, E8 = 0x74, F8 = 0x75, G8 = 0x76, H8 = 0x77,
    }

    /// Returns `true` if `val` denotes a square on the board
    #[inline]
    pub const fn is_valid(val: u8) -> bool {
        val & 0x88 == 0
    }

    #[inline]
    pub const fn from_raw(val: u8) -> Square {
        assert!(Self::is_valid(val), "square is off the board");
        Square(val)
    }

    #[inline]
    pub const fn from_parts(file: File, rank: Rank) -> Square {
        Square(((rank as u8) << 4) | file as u8)
    }

    /// Converts the dense bit index back to the square
    #[inline]
    pub const fn from_bit(bit: u32) -> Square {
        debug_assert!(bit < 64);
        let bit = bit as u8;
        Square(((bit & !7) << 1) | (bit & 7))
    }

    #[inline]
    pub const fn raw(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns the dense bit index of the square, from 0 to 63
    #[inline]
    pub const fn bit(&self) -> u32 {
        (((self.0 & !7) >> 1) | (self.0 & 7)) as u32
    }

    #[inline]
    pub const fn file(&self) -> File {
        File::from_index((self.0 & 15) as usize)
    }

    #[inline]
    pub const fn rank(&self) -> Rank {
        Rank::from_index((self.0 >> 4) as usize)
    }

    /// Returns the square `delta` away from this one, or `None` if it is off the board
    #[inline]
    pub const fn offset(self, delta: i8) -> Option<Square> {
        let val = self.0 as i16 + delta as i16;
        if val < 0 || val > 127 || !Self::is_valid(val as u8) {
            return None;
        }
        Some(Square(val as u8))
    }

    #[inline]
    pub const fn from_coord(c: Coord) -> Square {
        Square::from_parts(c.file(), c.rank())
    }

    #[inline]
    pub const fn coord(&self) -> Coord {
        Coord::from_parts(self.file(), self.rank())
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0_u32..64_u32).map(Square::from_bit)
    }
}

impl From<Coord> for Square {
    #[inline]
    fn from(c: Coord) -> Square {
        Square::from_coord(c)
    }
}

impl From<Square> for Coord {
    #[inline]
    fn from(s: Square) -> Coord {
        s.coord()
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if Self::is_valid(self.0) && self.0 < 128 {
            return write!(f, "Square({})", self.coord());
        }
        write!(f, "Square(?{:#x})", self.0)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.coord())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        for rank in Rank::iter() {
            for file in File::iter() {
                let sq = Square::from_parts(file, rank);
                assert!(Square::is_valid(sq.raw()));
                assert_eq!(sq.file(), file);
                assert_eq!(sq.rank(), rank);
                assert_eq!(Square::from_coord(sq.coord()), sq);
                assert_eq!(sq.coord(), Coord::from_parts(file, rank));
            }
        }
        assert_eq!(Square::from_parts(File::E, Rank::R1), Square::E1);
        assert_eq!(Square::from_parts(File::H, Rank::R8), Square::H8);
        assert_eq!(Square::E1.to_string(), "e1");
    }

    #[test]
    fn test_bit() {
        let mut bits: Vec<u32> = Square::iter().map(|s| s.bit()).collect();
        bits.sort_unstable();
        assert_eq!(bits, (0..64).collect::<Vec<_>>());
        for sq in Square::iter() {
            assert_eq!(Square::from_bit(sq.bit()), sq);
            assert_eq!(sq.bit() as usize, sq.coord().index());
        }
        assert_eq!(Square::A1.bit(), 0);
        assert_eq!(Square::H1.bit(), 7);
        assert_eq!(Square::A8.bit(), 56);
        assert_eq!(Square::H8.bit(), 63);
    }

    #[test]
    fn test_offset() {
        assert_eq!(Square::E1.offset(delta::N), Some(Square::from_parts(File::E, Rank::R2)));
        assert_eq!(Square::H1.offset(delta::E), None);
        assert_eq!(Square::A1.offset(delta::W), None);
        assert_eq!(Square::A1.offset(delta::S), None);
        assert_eq!(Square::H8.offset(delta::N), None);
        assert_eq!(Square::H8.offset(delta::NE), None);
        assert_eq!(Square::A8.offset(delta::SW), None);
        assert_eq!(Square::G1.offset(delta::KNIGHT[6]), None);
        assert_eq!(
            Square::G1.offset(delta::KNIGHT[0]),
            Some(Square::from_parts(File::H, Rank::R3))
        );
        let invalid = (0_u8..128).filter(|&v| !Square::is_valid(v)).count();
        assert_eq!(invalid, 64);
    }
}
