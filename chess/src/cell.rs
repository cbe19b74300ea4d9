use x88chess_base::{Chessman, Color, Piece};

use std::fmt;

/// Contents of a single square, packed into one byte
///
/// The lower three bits hold the chessman plus one, and the fourth bit holds the color. Zero means
/// an empty square, so every occupied cell fits into five bits.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);

    const COLOR_SHIFT: u8 = 3;
    const CHESSMAN_MASK: u8 = 7;

    #[inline]
    pub const fn from_parts(c: Color, m: Chessman) -> Cell {
        Cell(((c as u8) << Self::COLOR_SHIFT) | (m as u8 + 1))
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_occupied(&self) -> bool {
        self.0 != 0
    }

    /// Returns `true` if `val` is a raw value of some cell
    #[inline]
    pub const fn is_valid(val: u8) -> bool {
        val == 0 || (val >> Self::COLOR_SHIFT <= 1 && matches!(val & Self::CHESSMAN_MASK, 1..=6))
    }

    #[inline]
    pub const fn from_raw(val: u8) -> Cell {
        assert!(Self::is_valid(val), "invalid raw cell");
        Cell(val)
    }

    #[inline]
    pub const fn raw(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn color(&self) -> Option<Color> {
        match self.0 {
            0 => None,
            v if v >> Self::COLOR_SHIFT == 0 => Some(Color::White),
            _ => Some(Color::Black),
        }
    }

    #[inline]
    pub const fn chessman(&self) -> Option<Chessman> {
        match self.0 & Self::CHESSMAN_MASK {
            0 => None,
            v => Some(Chessman::from_index((v - 1) as usize)),
        }
    }

    /// Returns color and chessman together, or `None` for an empty cell
    #[inline]
    pub const fn parts(&self) -> Option<(Color, Chessman)> {
        match (self.color(), self.chessman()) {
            (Some(c), Some(m)) => Some((c, m)),
            _ => None,
        }
    }

    #[inline]
    pub fn from_piece(p: Option<Piece>) -> Cell {
        match p {
            Some(p) => Cell::from_parts(p.color, p.chessman),
            None => Cell::EMPTY,
        }
    }

    #[inline]
    pub fn piece(&self) -> Option<Piece> {
        self.parts().map(|(c, m)| Piece::new(c, m))
    }

    pub fn as_char(&self) -> char {
        self.piece().map_or('.', |p| p.as_char())
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if Self::is_valid(self.0) {
            return write!(f, "Cell({})", self.as_char());
        }
        write!(f, "Cell(?{:?})", self.0)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}
