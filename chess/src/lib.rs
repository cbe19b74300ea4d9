//! # x88chess
//!
//! Legal move generator over a 0x88 board, with in-place make/undo and perft.
//!
//! The simplest way to use it is via [`Generator`], which accepts a [`Position`] and returns moves
//! as [`GenericMove`]:
//!
//! ```
//! use x88chess::Generator;
//!
//! let mut g = Generator::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
//! let moves = g.legal_moves();
//! assert!(moves.iter().any(|m| m.to_string() == "e1g1"));
//! assert_eq!(g.perft(2), 568);
//! ```
//!
//! For lower-level access, use [`Board`] together with functions from [`movegen`].

pub mod attack;
pub mod bitboard;
pub mod board;
pub mod cell;
pub mod movegen;
pub mod moves;
pub mod square;

mod generic;

pub use bitboard::Bitboard;
pub use board::{Board, FromFenError, ValidateError};
pub use cell::Cell;
pub use movegen::{Generator, MoveList};
pub use moves::{Move, MoveKind};
pub use square::Square;

pub use x88chess_base::moves::MoveParseError;
pub use x88chess_base::position::{CastlingParseError, CellsParseError, FenParseError};
pub use x88chess_base::types::{ColorParseError, CoordParseError};
pub use x88chess_base::{
    CastlingSide, Chessman, Color, Coord, File, GenericMove, Piece, Position, PromotePiece, Rank,
};
