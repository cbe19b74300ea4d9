//! # Base types for x88chess
//!
//! This is an auxiliary crate for `x88chess`, which contains the generic position and move model
//! used at its public boundary: coordinates, pieces, positions with FEN support, and moves in
//! coordinate notation.
//!
//! Normally you don't want to use this crate directly. Everything here is re-exported from
//! `x88chess`.

pub mod geometry;
pub mod moves;
pub mod position;
pub mod types;

pub use moves::GenericMove;
pub use position::Position;
pub use types::{CastlingSide, Chessman, Color, Coord, File, Piece, PromotePiece, Rank};
