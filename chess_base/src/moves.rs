//! Moves in the generic model, written in coordinate notation

use crate::types::{Coord, CoordParseError, PromotePiece};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing [`GenericMove`] from string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MoveParseError {
    /// Bad string length
    #[error("bad string length")]
    BadLength,
    /// Bad source square
    #[error("bad source: {0}")]
    BadSrc(CoordParseError),
    /// Bad destination square
    #[error("bad destination: {0}")]
    BadDst(CoordParseError),
    /// Bad promote character
    #[error("bad promote char {0:?}")]
    BadPromote(char),
}

/// Move in the generic model
///
/// The move is not tied to any position, it only names the squares and the promotion. Castling
/// is written as the king move, e.g. `e1g1`.
///
/// # Example
///
/// ```
/// # use x88chess_base::{GenericMove, Coord, File, Rank, PromotePiece};
/// # use std::str::FromStr;
/// #
/// let mv = GenericMove::from_str("e7e8q").unwrap();
/// assert_eq!(mv.src, Coord::from_parts(File::E, Rank::R7));
/// assert_eq!(mv.dst, Coord::from_parts(File::E, Rank::R8));
/// assert_eq!(mv.promote, Some(PromotePiece::Queen));
/// assert_eq!(mv.to_string(), "e7e8q");
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct GenericMove {
    /// Source square
    pub src: Coord,
    /// Destination square
    pub dst: Coord,
    /// Piece to promote, if any
    pub promote: Option<PromotePiece>,
}

impl GenericMove {
    #[inline]
    pub const fn new(src: Coord, dst: Coord, promote: Option<PromotePiece>) -> GenericMove {
        GenericMove { src, dst, promote }
    }
}

impl fmt::Display for GenericMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)?;
        if let Some(p) = self.promote {
            write!(f, "{}", p.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for GenericMove {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<GenericMove, Self::Err> {
        if !s.is_ascii() || !matches!(s.len(), 4 | 5) {
            return Err(MoveParseError::BadLength);
        }
        let src = Coord::from_str(&s[0..2]).map_err(MoveParseError::BadSrc)?;
        let dst = Coord::from_str(&s[2..4]).map_err(MoveParseError::BadDst)?;
        let promote = match s.as_bytes().get(4) {
            Some(&b) => Some(
                PromotePiece::from_char(b as char).ok_or(MoveParseError::BadPromote(b as char))?,
            ),
            None => None,
        };
        Ok(GenericMove { src, dst, promote })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{File, Rank};

    #[test]
    fn test_simple() {
        let mv = GenericMove::from_str("e2e4").unwrap();
        assert_eq!(
            mv,
            GenericMove::new(
                Coord::from_parts(File::E, Rank::R2),
                Coord::from_parts(File::E, Rank::R4),
                None
            )
        );
        assert_eq!(mv.to_string(), "e2e4");
    }

    #[test]
    fn test_promote() {
        for (s, p) in [
            ("a2a1n", PromotePiece::Knight),
            ("a2a1b", PromotePiece::Bishop),
            ("a2a1r", PromotePiece::Rook),
            ("a2a1q", PromotePiece::Queen),
        ] {
            let mv = GenericMove::from_str(s).unwrap();
            assert_eq!(mv.promote, Some(p));
            assert_eq!(mv.to_string(), s);
        }
    }

    #[test]
    fn test_errors() {
        assert_eq!(GenericMove::from_str("e2e"), Err(MoveParseError::BadLength));
        assert_eq!(GenericMove::from_str("e2e4qq"), Err(MoveParseError::BadLength));
        assert_eq!(
            GenericMove::from_str("x2e4"),
            Err(MoveParseError::BadSrc(CoordParseError::UnexpectedFileChar('x')))
        );
        assert_eq!(
            GenericMove::from_str("e2e9"),
            Err(MoveParseError::BadDst(CoordParseError::UnexpectedRankChar('9')))
        );
        assert_eq!(GenericMove::from_str("e7e8k"), Err(MoveParseError::BadPromote('k')));
    }
}
