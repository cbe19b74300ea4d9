//! Attack detection based on precomputed 0x88 vector tables

use crate::board::Board;
use crate::cell::Cell;
use crate::generic::{self, Color as _};
use crate::square::{delta, Square};

use x88chess_base::{Chessman, Color};

use arrayvec::ArrayVec;
use std::ops::Deref;

/// Maximum number of pieces attacking one square
///
/// At most one piece can be seen from each of eight ray directions, plus at most eight knights.
pub const MAX_ATTACKERS: usize = 16;

/// Geometric relation between two squares
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Vector {
    /// Squares are not on one line and not a knight jump apart
    None,
    /// Diagonal at distance of two or more
    Diag,
    /// Adjacent on a diagonal, target is above the source
    DiagUp,
    /// Adjacent on a diagonal, target is below the source
    DiagDown,
    /// Rank or file at distance of two or more
    Line,
    /// Adjacent on a rank or file
    LineOne,
    /// Knight jump
    Knight,
}

const TABLE_SIZE: usize = 256;

struct Tables {
    vectors: [Vector; TABLE_SIZE],
    deltas: [i8; TABLE_SIZE],
}

const fn table_index(target: Square, source: Square) -> usize {
    (target.raw() as i16 - source.raw() as i16 + 127) as usize
}

const fn gen_tables() -> Tables {
    let mut vectors = [Vector::None; TABLE_SIZE];
    let mut deltas = [0_i8; TABLE_SIZE];

    let mut i = 0;
    while i < delta::QUEEN.len() {
        let dir = delta::QUEEN[i];
        let diag = dir != delta::N && dir != delta::S && dir != delta::E && dir != delta::W;
        let mut dist = 1;
        while dist <= 7 {
            let idx = (dir as i16 * dist + 127) as usize;
            vectors[idx] = match (diag, dist) {
                (true, 1) if dir > 0 => Vector::DiagUp,
                (true, 1) => Vector::DiagDown,
                (true, _) => Vector::Diag,
                (false, 1) => Vector::LineOne,
                (false, _) => Vector::Line,
            };
            deltas[idx] = dir;
            dist += 1;
        }
        i += 1;
    }

    let mut i = 0;
    while i < delta::KNIGHT.len() {
        let idx = (delta::KNIGHT[i] as i16 + 127) as usize;
        vectors[idx] = Vector::Knight;
        deltas[idx] = delta::KNIGHT[i];
        i += 1;
    }

    Tables { vectors, deltas }
}

static TABLES: Tables = gen_tables();

/// Returns how `target` can be reached from `source`
#[inline]
pub fn vector(target: Square, source: Square) -> Vector {
    TABLES.vectors[table_index(target, source)]
}

/// Returns the single step from `source` towards `target`, or zero if they are not on one line
///
/// For a knight jump, the whole jump is returned.
#[inline]
pub fn delta(target: Square, source: Square) -> i8 {
    TABLES.deltas[table_index(target, source)]
}

/// Piece attacking some square
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Attack {
    /// Square of the attacking piece
    pub square: Square,
    /// Step from the attacker towards the attacked square
    pub delta: i8,
}

/// All the attacks on a single square
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attacks(ArrayVec<Attack, MAX_ATTACKERS>);

impl Attacks {
    #[inline]
    pub fn new() -> Attacks {
        Attacks(ArrayVec::new())
    }
}

impl Deref for Attacks {
    type Target = [Attack];

    #[inline]
    fn deref(&self) -> &[Attack] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Attacks {
    type Item = &'a Attack;
    type IntoIter = std::slice::Iter<'a, Attack>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[inline]
fn pawn_captures(c: Color) -> [i8; 2] {
    match c {
        Color::White => generic::White::PAWN_CAPTURES,
        Color::Black => generic::Black::PAWN_CAPTURES,
    }
}

/// Returns `true` if all the squares strictly between `src` and `dst` are empty
///
/// The squares must lie on one line.
fn is_ray_clear(b: &Board, src: Square, dst: Square) -> bool {
    let d = delta(dst, src);
    debug_assert_ne!(d, 0);
    let mut sq = src;
    loop {
        sq = match sq.offset(d) {
            Some(sq) => sq,
            None => return false,
        };
        if sq == dst {
            return true;
        }
        if b.cell(sq).is_occupied() {
            return false;
        }
    }
}

/// Returns `true` if a slider of kind `m` moves along lines of type `v`, ignoring distance and
/// blockers
#[inline]
pub fn can_slider_pseudo_attack(m: Chessman, v: Vector) -> bool {
    match m {
        Chessman::Bishop => matches!(v, Vector::Diag | Vector::DiagUp | Vector::DiagDown),
        Chessman::Rook => matches!(v, Vector::Line | Vector::LineOne),
        Chessman::Queen => matches!(
            v,
            Vector::Diag | Vector::DiagUp | Vector::DiagDown | Vector::Line | Vector::LineOne
        ),
        _ => false,
    }
}

/// Returns `true` if a slider of kind `m` on `src` attacks `target`
#[inline]
pub fn can_slider_attack(b: &Board, m: Chessman, src: Square, target: Square) -> bool {
    match vector(target, src) {
        Vector::DiagUp | Vector::DiagDown => matches!(m, Chessman::Bishop | Chessman::Queen),
        Vector::LineOne => matches!(m, Chessman::Rook | Chessman::Queen),
        Vector::Diag => {
            matches!(m, Chessman::Bishop | Chessman::Queen) && is_ray_clear(b, src, target)
        }
        Vector::Line => {
            matches!(m, Chessman::Rook | Chessman::Queen) && is_ray_clear(b, src, target)
        }
        Vector::None | Vector::Knight => false,
    }
}

/// Returns `true` if the piece on `src` attacks `target`
///
/// Empty `src` attacks nothing.
pub fn can_attack(b: &Board, src: Square, target: Square) -> bool {
    let (color, chessman) = match b.cell(src).parts() {
        Some(parts) => parts,
        None => return false,
    };
    let v = vector(target, src);
    match chessman {
        Chessman::Pawn => match color {
            Color::White => v == Vector::DiagUp,
            Color::Black => v == Vector::DiagDown,
        },
        Chessman::Knight => v == Vector::Knight,
        Chessman::King => matches!(v, Vector::DiagUp | Vector::DiagDown | Vector::LineOne),
        m => can_slider_attack(b, m, src, target),
    }
}

/// Calls `f` for every piece of color `by` attacking `target`, until `f` returns `true`
///
/// Pieces are visited in order: pawns, knights, bishops, rooks, queens, king. Returns `true` if
/// the scan was stopped by `f`.
fn scan_attackers(
    b: &Board,
    target: Square,
    by: Color,
    mut f: impl FnMut(Attack) -> bool,
) -> bool {
    let pawn = Cell::from_parts(by, Chessman::Pawn);
    for d in pawn_captures(by) {
        if let Some(src) = target.offset(-d) {
            if b.cell(src) == pawn && f(Attack { square: src, delta: d }) {
                return true;
            }
        }
    }

    for src in b.pieces(by, Chessman::Knight) {
        if vector(target, src) == Vector::Knight
            && f(Attack {
                square: src,
                delta: delta(target, src),
            })
        {
            return true;
        }
    }

    for m in [Chessman::Bishop, Chessman::Rook, Chessman::Queen] {
        for src in b.pieces(by, m) {
            if can_slider_attack(b, m, src, target)
                && f(Attack {
                    square: src,
                    delta: delta(target, src),
                })
            {
                return true;
            }
        }
    }

    let king = b.king(by);
    if matches!(
        vector(target, king),
        Vector::DiagUp | Vector::DiagDown | Vector::LineOne
    ) && f(Attack {
        square: king,
        delta: delta(target, king),
    }) {
        return true;
    }

    false
}

/// Returns `true` if any piece of color `by` attacks `target`
pub fn is_attacked(b: &Board, target: Square, by: Color) -> bool {
    scan_attackers(b, target, by, |_| true)
}

/// Returns all the pieces of color `by` attacking `target`
pub fn collect_attacks(b: &Board, target: Square, by: Color) -> Attacks {
    let mut res = Attacks::new();
    scan_attackers(b, target, by, |a| {
        res.0.push(a);
        false
    });
    res
}

/// Returns `true` if the piece on `sq` cannot leave the line between the king on `king` and an
/// enemy slider without exposing the king
///
/// The piece on `sq` must have the same color as the king.
pub fn is_pinned(b: &Board, sq: Square, king: Square) -> bool {
    if matches!(vector(sq, king), Vector::None | Vector::Knight) {
        return false;
    }
    if !is_ray_clear(b, king, sq) {
        return false;
    }
    let enemy = match b.cell(king).color() {
        Some(c) => c.inv(),
        None => return false,
    };

    let d = delta(sq, king);
    let mut cur = sq;
    loop {
        cur = match cur.offset(d) {
            Some(cur) => cur,
            None => return false,
        };
        if let Some((c, m)) = b.cell(cur).parts() {
            return c == enemy && can_slider_pseudo_attack(m, vector(sq, cur));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use x88chess_base::Coord;

    fn sq(s: &str) -> Square {
        Square::from_coord(Coord::from_str(s).unwrap())
    }

    #[test]
    fn test_vectors() {
        assert_eq!(vector(sq("f5"), sq("e4")), Vector::DiagUp);
        assert_eq!(vector(sq("d5"), sq("e4")), Vector::DiagUp);
        assert_eq!(vector(sq("d3"), sq("e4")), Vector::DiagDown);
        assert_eq!(vector(sq("h7"), sq("e4")), Vector::Diag);
        assert_eq!(vector(sq("a8"), sq("e4")), Vector::Diag);
        assert_eq!(vector(sq("e5"), sq("e4")), Vector::LineOne);
        assert_eq!(vector(sq("d4"), sq("e4")), Vector::LineOne);
        assert_eq!(vector(sq("e8"), sq("e4")), Vector::Line);
        assert_eq!(vector(sq("a4"), sq("e4")), Vector::Line);
        assert_eq!(vector(sq("f6"), sq("e4")), Vector::Knight);
        assert_eq!(vector(sq("c3"), sq("e4")), Vector::Knight);
        assert_eq!(vector(sq("e4"), sq("e4")), Vector::None);
        assert_eq!(vector(sq("f7"), sq("e4")), Vector::None);
        assert_eq!(vector(Square::H8, Square::A1), Vector::Diag);
        assert_eq!(vector(Square::A8, Square::H1), Vector::Diag);
        assert_eq!(vector(Square::H1, Square::A1), Vector::Line);

        assert_eq!(delta(sq("h7"), sq("e4")), delta::NE);
        assert_eq!(delta(sq("e4"), sq("h7")), delta::SW);
        assert_eq!(delta(sq("a4"), sq("e4")), delta::W);
        assert_eq!(delta(Square::A8, Square::A1), delta::N);
        assert_eq!(delta(sq("f6"), sq("e4")), delta::N + delta::N + delta::E);
        assert_eq!(delta(sq("f7"), sq("e4")), 0);
    }

    #[test]
    fn test_tables_symmetric() {
        for a in Square::iter() {
            for b in Square::iter() {
                let (v1, v2) = (vector(a, b), vector(b, a));
                match v1 {
                    Vector::DiagUp => assert_eq!(v2, Vector::DiagDown),
                    Vector::DiagDown => assert_eq!(v2, Vector::DiagUp),
                    v => assert_eq!(v2, v),
                }
                assert_eq!(delta(a, b), -delta(b, a));
                if v1 != Vector::None && v1 != Vector::Knight {
                    assert_eq!(
                        a.file() == b.file() || a.rank() == b.rank(),
                        matches!(v1, Vector::Line | Vector::LineOne)
                    );
                }
            }
        }
    }

    #[test]
    fn test_is_attacked() {
        let b = Board::from_fen("4k3/8/8/3p4/8/2N5/8/R3K3 w - - 0 1").unwrap();
        // Rook on a1
        assert!(is_attacked(&b, sq("a8"), Color::White));
        assert!(is_attacked(&b, sq("d1"), Color::White));
        // Knight on c3
        assert!(is_attacked(&b, sq("d5"), Color::White));
        assert!(is_attacked(&b, sq("b5"), Color::White));
        assert!(!is_attacked(&b, sq("c5"), Color::White));
        // Black pawn on d5 attacks downwards
        assert!(is_attacked(&b, sq("c4"), Color::Black));
        assert!(is_attacked(&b, sq("e4"), Color::Black));
        assert!(!is_attacked(&b, sq("c6"), Color::Black));
        assert!(!is_attacked(&b, sq("d4"), Color::Black));
        // Kings
        assert!(is_attacked(&b, sq("f1"), Color::White));
        assert!(is_attacked(&b, sq("d7"), Color::Black));
        assert!(!is_attacked(&b, sq("e6"), Color::Black));
    }

    #[test]
    fn test_blocked() {
        let b = Board::from_fen("4k3/8/8/8/1b6/2P5/8/4K2Q b - - 0 1").unwrap();
        // Bishop on b4 is blocked by the pawn on c3
        assert!(!is_attacked(&b, Square::E1, Color::Black));
        assert!(is_attacked(&b, sq("c3"), Color::Black));
        // Queen on h1 sees the whole rank and the long diagonal
        assert!(is_attacked(&b, sq("f1"), Color::White));
        assert!(is_attacked(&b, sq("a8"), Color::White));
        assert!(is_attacked(&b, sq("h8"), Color::White));
        // King on e1 shields the rest of the rank
        assert!(!can_attack(&b, sq("h1"), sq("d1")));
        assert!(can_attack(&b, sq("h1"), sq("e4")));
    }

    #[test]
    fn test_can_attack() {
        let b = Board::from_fen("4k3/8/8/3p4/8/2N5/4P3/R3K3 w - - 0 1").unwrap();
        assert!(can_attack(&b, sq("e2"), sq("d3")));
        assert!(can_attack(&b, sq("e2"), sq("f3")));
        assert!(!can_attack(&b, sq("e2"), sq("e3")));
        assert!(!can_attack(&b, sq("e2"), sq("d1")));
        assert!(can_attack(&b, sq("d5"), sq("e4")));
        assert!(!can_attack(&b, sq("d5"), sq("e6")));
        assert!(can_attack(&b, sq("c3"), sq("e4")));
        assert!(can_attack(&b, sq("a1"), sq("d1")));
        assert!(can_attack(&b, sq("a1"), sq("e1")));
        assert!(!can_attack(&b, sq("a1"), sq("f1")));
        assert!(can_attack(&b, Square::E1, sq("f2")));
        assert!(!can_attack(&b, Square::E1, sq("e3")));
        assert!(!can_attack(&b, sq("h5"), sq("h6")));
    }

    #[test]
    fn test_attacks() {
        // Double check by knight and rook
        let b = Board::from_fen("4r1k1/8/8/8/8/3n4/8/4K3 w - - 0 1").unwrap();
        let a = collect_attacks(&b, Square::E1, Color::Black);
        assert_eq!(a.len(), 2);
        assert_eq!(
            a[0],
            Attack {
                square: sq("d3"),
                delta: delta::S + delta::S + delta::E,
            }
        );
        assert_eq!(
            a[1],
            Attack {
                square: Square::E8,
                delta: delta::S,
            }
        );
        assert!(collect_attacks(&b, sq("a5"), Color::Black).is_empty());
        assert!(is_attacked(&b, Square::E1, Color::Black));
    }

    #[test]
    fn test_is_pinned() {
        let b = Board::from_fen("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(is_pinned(&b, sq("e2"), Square::E1));

        let b = Board::from_fen("4k3/4b3/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(!is_pinned(&b, sq("e2"), Square::E1));

        let b = Board::from_fen("4k3/4r3/8/4P3/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(!is_pinned(&b, sq("e2"), Square::E1));
        assert!(!is_pinned(&b, sq("e5"), Square::E1));

        let b = Board::from_fen("4k3/8/8/b7/8/8/3P4/4K3 w - - 0 1").unwrap();
        assert!(is_pinned(&b, sq("d2"), Square::E1));

        let b = Board::from_fen("4k3/8/8/q7/8/8/3P4/4K3 w - - 0 1").unwrap();
        assert!(is_pinned(&b, sq("d2"), Square::E1));

        let b = Board::from_fen("4k3/8/8/r7/8/8/3P4/4K3 w - - 0 1").unwrap();
        assert!(!is_pinned(&b, sq("d2"), Square::E1));

        // Piece right next to the pinning slider
        let b = Board::from_fen("4k3/8/8/8/8/8/8/2rNK3 w - - 0 1").unwrap();
        assert!(is_pinned(&b, sq("d1"), Square::E1));
    }
}
