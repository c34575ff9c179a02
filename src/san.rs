//! SAN-lite move formatting.
//!
//! Emits "O-O"/"O-O-O" for castling, a piece letter for non-pawns, the
//! departure file for pawn captures, "x" on captures, the destination, and a
//! lowercase promotion suffix. Deliberately omits disambiguation and
//! check/checkmate markers, so the output is not a compliant SAN producer —
//! it is ambiguous for some positions. Use `Move`'s `Display` for the
//! unambiguous long-algebraic form.

use crate::types::{Color, Move, MoveKind, PieceType};

/// Format a move in SAN-lite.
pub fn move_to_san(mv: Move) -> String {
    match mv.kind {
        MoveKind::KingsideCastle => return "O-O".to_string(),
        MoveKind::QueensideCastle => return "O-O-O".to_string(),
        _ => {}
    }

    let mut san = String::with_capacity(8);

    if mv.piece != PieceType::Pawn {
        san.push(mv.piece.to_char(Color::White));
    }

    if mv.is_capture() {
        if mv.piece == PieceType::Pawn {
            san.push((b'a' + mv.from.file()) as char);
        }
        san.push('x');
    }

    san.push_str(&mv.to.to_algebraic());

    if let Some(promo) = mv.promotion {
        san.push(promo.to_char(Color::Black));
    }

    san
}
