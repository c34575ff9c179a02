//! Chess position library: bitboard state, legal move generation, Zobrist
//! hashing, FEN I/O, and the draw/terminal predicates an engine needs.
//!
//! The [`Position`] type is the entry point:
//!
//! ```
//! use chesscore::Position;
//!
//! let mut pos = Position::starting();
//! pos.make_move_str("e2e4").unwrap();
//! assert_eq!(pos.legal_moves().len(), 20);
//! pos.undo_move().unwrap();
//! assert_eq!(pos.to_fen(), chesscore::STARTING_FEN);
//! ```

pub mod attacks;
pub mod bitboard;
pub mod movegen;
pub mod position;
pub mod san;
pub mod types;
pub mod zobrist;

pub use bitboard::Bitboard;
pub use movegen::{legal_captures, legal_moves, legal_noncaptures};
pub use position::{Position, STARTING_FEN, Undo};
pub use san::move_to_san;
pub use types::{CastlingRights, ChessError, Color, Move, MoveKind, PieceType, Square};
