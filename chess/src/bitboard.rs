use crate::square::Square;

use derive_more::{BitAnd, BitOr, BitOrAssign};
use std::fmt;

/// Set of squares, stored as 64 bits indexed by [`Square::bit()`]
///
/// The board keeps one bitboard per color and chessman, so iterating over all the knights of one
/// side doesn't require scanning the whole board.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash, BitAnd, BitOr, BitOrAssign)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    pub const fn from_raw(val: u64) -> Bitboard {
        Bitboard(val)
    }

    pub const fn from_square(sq: Square) -> Bitboard {
        Bitboard(1_u64 << sq.bit())
    }

    pub const fn with(self, sq: Square) -> Bitboard {
        Bitboard(self.0 | (1_u64 << sq.bit()))
    }

    pub const fn without(self, sq: Square) -> Bitboard {
        Bitboard(self.0 & !(1_u64 << sq.bit()))
    }

    pub fn set(&mut self, sq: Square) {
        *self = self.with(sq);
    }

    pub fn unset(&mut self, sq: Square) {
        *self = self.without(sq);
    }

    pub const fn has(&self, sq: Square) -> bool {
        ((self.0 >> sq.bit()) & 1) != 0
    }

    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    pub const fn popcount(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }

    /// Returns the square with the lowest bit index, if any
    pub const fn first(&self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        Some(Square::from_bit(self.0.trailing_zeros()))
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Bitboard({})", self)
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        // Rank 8 first, file a on the left
        for rank in (0..8).rev() {
            if rank != 7 {
                write!(f, "/")?;
            }
            for file in 0..8 {
                let bit = (self.0 >> (rank * 8 + file)) & 1;
                write!(f, "{}", bit)?;
            }
        }
        Ok(())
    }
}

pub struct Iter(u64);

impl Iterator for Iter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros();
        self.0 &= self.0.wrapping_sub(1_u64);
        Some(Square::from_bit(bit))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Iter {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = Iter;

    #[inline]
    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x88chess_base::{File, Rank};

    #[test]
    fn test_iter() {
        let bb = Bitboard::EMPTY
            .with(Square::from_parts(File::A, Rank::R4))
            .with(Square::from_parts(File::E, Rank::R2))
            .with(Square::from_parts(File::F, Rank::R3));
        assert_eq!(
            bb.into_iter().collect::<Vec<_>>(),
            vec![
                Square::from_parts(File::E, Rank::R2),
                Square::from_parts(File::F, Rank::R3),
                Square::from_parts(File::A, Rank::R4),
            ],
        );
        assert_eq!(bb.into_iter().len(), 3);
        assert_eq!(bb.first(), Some(Square::from_parts(File::E, Rank::R2)));
        assert_eq!(Bitboard::EMPTY.first(), None);
    }

    #[test]
    fn test_bitops() {
        let sa = Square::from_parts(File::A, Rank::R4);
        let sb = Square::from_parts(File::E, Rank::R2);
        let sc = Square::from_parts(File::F, Rank::R3);

        let bb1 = Bitboard::EMPTY.with(sa).with(sb);
        let bb2 = Bitboard::EMPTY.with(sb).with(sc);
        assert_eq!(bb1 & bb2, Bitboard::EMPTY.with(sb));
        assert_eq!(bb1 | bb2, Bitboard::EMPTY.with(sa).with(sb).with(sc));
        assert!((bb1 & Bitboard::from_square(sc)).is_empty());
        assert!((bb2 & Bitboard::from_square(sc)).is_nonempty());

        let mut bb = bb1;
        bb.unset(sa);
        assert!(!bb.has(sa));
        assert!(bb.has(sb));
        bb.set(sc);
        assert_eq!(bb, bb2);
    }

    #[test]
    fn test_format() {
        let bb = Bitboard::EMPTY
            .with(Square::from_parts(File::A, Rank::R4))
            .with(Square::from_parts(File::E, Rank::R2))
            .with(Square::from_parts(File::F, Rank::R3))
            .with(Square::H8);
        assert_eq!(
            bb.to_string(),
            "00000001/00000000/00000000/00000000/10000000/00000100/00001000/00000000"
        );
    }
}
