//! Legal move generation.
//!
//! The generator is staged rather than make-and-filter:
//!   1. Compute the enemy attack set with the friendly king removed from the
//!      occupancy, so the king cannot step along a checking ray.
//!   2. Compute checkers. Under double check only king moves exist; under
//!      single check non-king moves must capture the checker or block on the
//!      ray between checker and king.
//!   3. Compute pinned pieces; each is restricted to the line through itself
//!      and its king.
//!   4. En passant gets a dedicated occupancy-surgery legality test: it is
//!      the one move that can expose the king along a rank by removing two
//!      pawns at once.
//!
//! Captures and non-captures are generated as disjoint sets whose union is
//! exactly the legal move set.

use crate::attacks::{self, AttackTables};
use crate::bitboard::Bitboard;
use crate::position::Position;
use crate::types::{Color, Move, MoveKind, PieceType, Square};

// =========================================================================
// Public API
// =========================================================================

/// Generate all legal moves for the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(48);
    generate(pos, &mut moves, true, true);
    moves
}

/// Generate only the capturing legal moves (including en passant and
/// promotion-captures).
pub fn legal_captures(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(16);
    generate(pos, &mut moves, true, false);
    moves
}

/// Generate only the non-capturing legal moves (pushes, quiet promotions,
/// castling).
pub fn legal_noncaptures(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(40);
    generate(pos, &mut moves, false, true);
    moves
}

// =========================================================================
// Core generator
// =========================================================================

fn generate(pos: &Position, moves: &mut Vec<Move>, captures: bool, quiets: bool) {
    let t = attacks::tables();
    let us = pos.turn();
    let them = !us;
    let occ = pos.occupied();
    let ours = pos.occupancy(us);
    let theirs = pos.occupancy(them);
    let ksq = pos.king_square(us);

    let danger = pos.squares_attacked(them);
    let checkers = pos.checkers();

    // ---- King moves ----
    let king_targets = t.king_attacks(ksq) & !ours & !danger;
    if captures {
        for to in king_targets & theirs {
            moves.push(Move::capture(ksq, to, PieceType::King, victim(pos, to)));
        }
    }
    if quiets {
        for to in king_targets & !occ {
            moves.push(Move::quiet(ksq, to, PieceType::King));
        }
    }

    // Double check: only the king may move.
    if checkers.pop_count() >= 2 {
        return;
    }

    // Single check: non-king moves must capture the checker or block the
    // ray. With no check every target is allowed.
    let allowed = match checkers.lsb() {
        Some(checker_sq) => t.between(ksq, checker_sq) | checkers,
        None => Bitboard::ALL,
    };

    let capture_mask = if captures {
        theirs & allowed
    } else {
        Bitboard::EMPTY
    };
    let quiet_mask = if quiets { !occ & allowed } else { Bitboard::EMPTY };

    let pinned = pos.pinned(us);

    // ---- Knights (a pinned knight can never move) ----
    for from in pos.pieces(us, PieceType::Knight) & !pinned {
        let atk = t.knight_attacks(from);
        for to in atk & capture_mask {
            moves.push(Move::capture(from, to, PieceType::Knight, victim(pos, to)));
        }
        for to in atk & quiet_mask {
            moves.push(Move::quiet(from, to, PieceType::Knight));
        }
    }

    // ---- Sliders ----
    for piece in [PieceType::Bishop, PieceType::Rook, PieceType::Queen] {
        for from in pos.pieces(us, piece) {
            let mut atk = match piece {
                PieceType::Bishop => t.bishop_attacks(from, occ),
                PieceType::Rook => t.rook_attacks(from, occ),
                _ => t.queen_attacks(from, occ),
            };
            if pinned.is_set(from) {
                atk &= t.line(ksq, from);
            }
            for to in atk & capture_mask {
                moves.push(Move::capture(from, to, piece, victim(pos, to)));
            }
            for to in atk & quiet_mask {
                moves.push(Move::quiet(from, to, piece));
            }
        }
    }

    // ---- Pawns ----
    generate_pawn_moves(
        pos, t, us, ksq, pinned, capture_mask, quiet_mask, captures, quiets, moves,
    );

    // ---- Castling (never under check) ----
    if quiets && checkers.is_empty() {
        generate_castling(pos, us, ksq, occ, danger, moves);
    }
}

/// The piece type on an (occupied) capture target square.
fn victim(pos: &Position, to: Square) -> PieceType {
    pos.piece_on(to)
        .map(|(_, pt)| pt)
        .expect("capture target must be occupied")
}

// =========================================================================
// Pawn moves
// =========================================================================

#[allow(clippy::too_many_arguments)]
fn generate_pawn_moves(
    pos: &Position,
    t: &AttackTables,
    us: Color,
    ksq: Square,
    pinned: Bitboard,
    capture_mask: Bitboard,
    quiet_mask: Bitboard,
    captures: bool,
    quiets: bool,
    moves: &mut Vec<Move>,
) {
    let empty = pos.empty_squares();
    let (start_rank, promo_rank) = match us {
        Color::White => (1u8, 6u8),
        Color::Black => (6u8, 1u8),
    };

    for from in pos.pieces(us, PieceType::Pawn) {
        let pin_ray = if pinned.is_set(from) {
            t.line(ksq, from)
        } else {
            Bitboard::ALL
        };

        // --- Pushes (quiet, including quiet promotions) ---
        if quiets {
            let single = from.forward(us);
            if empty.is_set(single) {
                if quiet_mask.is_set(single) && pin_ray.is_set(single) {
                    if from.rank() == promo_rank {
                        for promo in PieceType::PROMOTIONS {
                            moves.push(Move::promotion(from, single, promo));
                        }
                    } else {
                        moves.push(Move::quiet(from, single, PieceType::Pawn));
                    }
                }
                // Double push needs the skipped square empty as well.
                if from.rank() == start_rank {
                    let double = single.forward(us);
                    if empty.is_set(double)
                        && quiet_mask.is_set(double)
                        && pin_ray.is_set(double)
                    {
                        moves.push(Move::double_push(from, double));
                    }
                }
            }
        }

        // --- Captures (including promotion-captures and en passant) ---
        if captures {
            for to in t.pawn_attacks(us, from) & capture_mask & pin_ray {
                let captured = victim(pos, to);
                if from.rank() == promo_rank {
                    for promo in PieceType::PROMOTIONS {
                        moves.push(Move::promotion_capture(from, to, promo, captured));
                    }
                } else {
                    moves.push(Move::capture(from, to, PieceType::Pawn, captured));
                }
            }

            if let Some(ep) = pos.ep()
                && t.pawn_attacks(us, from).is_set(ep)
                && en_passant_legal(pos, t, from, ep, us)
            {
                moves.push(Move::en_passant(from, ep));
            }
        }
    }
}

/// En-passant legality: remove the capturer and the captured pawn, place the
/// capturer behind the captured pawn, and verify the king is not attacked.
/// Covers discovered checks along the shared rank (two pawns leaving it at
/// once) as well as ordinary pins and check evasion.
fn en_passant_legal(pos: &Position, t: &AttackTables, from: Square, to: Square, us: Color) -> bool {
    let them = !us;
    let captured_sq = to.backward(us);
    let from_bb = Bitboard::from_square(from);
    let captured_bb = Bitboard::from_square(captured_sq);
    let to_bb = Bitboard::from_square(to);

    let occ = (pos.occupied() & !from_bb & !captured_bb) | to_bb;
    let ksq = pos.king_square(us);
    let queens = pos.pieces(them, PieceType::Queen);

    if (t.rook_attacks(ksq, occ) & (pos.pieces(them, PieceType::Rook) | queens)).is_not_empty() {
        return false;
    }
    if (t.bishop_attacks(ksq, occ) & (pos.pieces(them, PieceType::Bishop) | queens)).is_not_empty()
    {
        return false;
    }
    if (t.pawn_attacks(us, ksq) & pos.pieces(them, PieceType::Pawn) & !captured_bb).is_not_empty() {
        return false;
    }
    if (t.knight_attacks(ksq) & pos.pieces(them, PieceType::Knight)).is_not_empty() {
        return false;
    }
    if (t.king_attacks(ksq) & pos.pieces(them, PieceType::King)).is_not_empty() {
        return false;
    }
    true
}

// =========================================================================
// Castling
// =========================================================================

/// Castling: flag set, squares between king and rook empty, and none of the
/// king's path squares attacked. The rook's transit need not be safe.
fn generate_castling(
    pos: &Position,
    us: Color,
    ksq: Square,
    occ: Bitboard,
    danger: Bitboard,
    moves: &mut Vec<Move>,
) {
    if pos.can_castle(us, MoveKind::KingsideCastle) {
        let (f, g) = match us {
            Color::White => (Square::F1, Square::G1),
            Color::Black => (Square::F8, Square::G8),
        };
        if !occ.is_set(f)
            && !occ.is_set(g)
            && !danger.is_set(f)
            && !danger.is_set(g)
        {
            moves.push(Move::castle(ksq, g, MoveKind::KingsideCastle));
        }
    }

    if pos.can_castle(us, MoveKind::QueensideCastle) {
        let (b, c, d) = match us {
            Color::White => (Square::B1, Square::C1, Square::D1),
            Color::Black => (Square::B8, Square::C8, Square::D8),
        };
        if !occ.is_set(b)
            && !occ.is_set(c)
            && !occ.is_set(d)
            && !danger.is_set(c)
            && !danger.is_set(d)
        {
            moves.push(Move::castle(ksq, c, MoveKind::QueensideCastle));
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn count_legal(fen: &str) -> usize {
        legal_moves(&pos(fen)).len()
    }

    // -------------------------------------------------------------------
    // Known positions
    // -------------------------------------------------------------------

    #[test]
    fn starting_position_has_20_moves() {
        assert_eq!(
            count_legal("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            20
        );
    }

    #[test]
    fn starting_position_after_e4() {
        assert_eq!(
            count_legal("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"),
            20
        );
    }

    #[test]
    fn kiwipete_48_moves() {
        assert_eq!(
            count_legal("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"),
            48
        );
    }

    #[test]
    fn position_3_14_moves() {
        assert_eq!(count_legal("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"), 14);
    }

    #[test]
    fn position_4_6_moves() {
        assert_eq!(
            count_legal("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1"),
            6
        );
    }

    #[test]
    fn position_5_44_moves() {
        assert_eq!(
            count_legal("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8"),
            44
        );
    }

    // -------------------------------------------------------------------
    // Partition: captures ⊎ non-captures = legal
    // -------------------------------------------------------------------

    #[test]
    fn captures_and_noncaptures_partition_legal_moves() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "4k3/8/8/8/4r3/8/8/4K3 w - - 0 1",
        ] {
            let p = pos(fen);
            let all: HashSet<Move> = legal_moves(&p).into_iter().collect();
            let caps: HashSet<Move> = legal_captures(&p).into_iter().collect();
            let quiets: HashSet<Move> = legal_noncaptures(&p).into_iter().collect();

            assert!(caps.is_disjoint(&quiets), "overlap in {fen}");
            assert_eq!(
                caps.union(&quiets).count(),
                all.len(),
                "union mismatch in {fen}"
            );
            assert!(caps.iter().all(|m| m.is_capture()));
            assert!(quiets.iter().all(|m| !m.is_capture()));
            assert!(caps.is_subset(&all) && quiets.is_subset(&all));
        }
    }

    // -------------------------------------------------------------------
    // No self-check property
    // -------------------------------------------------------------------

    #[test]
    fn no_move_leaves_own_king_in_check() {
        for fen in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            "4k3/8/8/8/4r3/8/8/4K3 w - - 0 1",
        ] {
            let mut p = pos(fen);
            let us = p.turn();
            for mv in p.legal_moves() {
                p.make_move(mv);
                assert!(
                    !p.square_attacked(p.king_square(us), p.turn()),
                    "{mv} leaves the mover in check in {fen}"
                );
                p.undo_move().unwrap();
            }
        }
    }

    // -------------------------------------------------------------------
    // Pawn moves
    // -------------------------------------------------------------------

    #[test]
    fn pawn_single_and_double_push() {
        let p = pos("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        let pawn_moves: Vec<_> = legal_moves(&p)
            .into_iter()
            .filter(|m| m.from == sq("e2"))
            .collect();
        assert_eq!(pawn_moves.len(), 2);
        assert!(pawn_moves.iter().any(|m| m.kind == MoveKind::DoublePush));
    }

    #[test]
    fn pawn_blocked() {
        let p = pos("4k3/8/8/8/8/4p3/4P3/4K3 w - - 0 1");
        assert!(!legal_moves(&p).iter().any(|m| m.from == sq("e2")));
    }

    #[test]
    fn pawn_double_push_blocked_on_target_square() {
        // e3 is free but e4 is occupied: single push only.
        let p = pos("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1");
        let pawn_moves: Vec<_> = legal_moves(&p)
            .into_iter()
            .filter(|m| m.from == sq("e2"))
            .collect();
        assert_eq!(pawn_moves.len(), 1);
        assert_eq!(pawn_moves[0].to, sq("e3"));
    }

    #[test]
    fn pawn_promotion_fans_out() {
        let p = pos("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let promos: Vec<_> = legal_moves(&p)
            .into_iter()
            .filter(|m| m.from == sq("e7"))
            .collect();
        assert_eq!(promos.len(), 4);
        assert!(promos.iter().all(|m| m.kind == MoveKind::Promotion));
        let kinds: HashSet<_> = promos.iter().map(|m| m.promotion.unwrap()).collect();
        assert_eq!(kinds.len(), 4);
    }

    #[test]
    fn promotion_capture_preserves_captureness() {
        let p = pos("rn2k3/1P6/8/8/8/8/8/4K3 w - - 0 1");
        let caps: Vec<_> = legal_captures(&p)
            .into_iter()
            .filter(|m| m.from == sq("b7"))
            .collect();
        // b7xa8 only — b8 is blocked for capture? No: b8 holds a knight, a8 a rook.
        // Pushing b7b8 is blocked, capturing b7xa8 works. 4 promotion pieces.
        assert_eq!(caps.len(), 4);
        assert!(caps.iter().all(|m| m.kind == MoveKind::PromotionCapture));
        assert!(caps.iter().all(|m| m.captured == Some(PieceType::Rook)));
    }

    // -------------------------------------------------------------------
    // En passant
    // -------------------------------------------------------------------

    #[test]
    fn en_passant_generated() {
        let p = pos("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        let ep: Vec<_> = legal_moves(&p)
            .into_iter()
            .filter(|m| m.kind == MoveKind::EnPassant)
            .collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].to, sq("f6"));
        assert_eq!(ep[0].captured, Some(PieceType::Pawn));
    }

    #[test]
    fn en_passant_rank_pin_is_illegal() {
        // Taking en passant would remove both pawns from rank 5 and expose
        // the white king to the rook on h5.
        let mut p = pos("8/2p5/8/KP5r/8/8/8/7k b - - 0 1");
        p.make_move_str("c7c5").unwrap();
        assert_eq!(p.ep(), Some(sq("c6")));
        assert!(
            !legal_moves(&p).iter().any(|m| m.kind == MoveKind::EnPassant),
            "bxc6 ep would expose the king along rank 5"
        );
    }

    #[test]
    fn en_passant_resolves_pawn_check() {
        // Black's d5 double push checks the king on e4; exd6 captures the
        // checker en passant.
        let mut p = pos("7k/3p4/8/4P3/4K3/8/8/8 b - - 0 1");
        p.make_move_str("d7d5").unwrap();
        assert!(p.in_check());
        let ep: Vec<_> = legal_moves(&p)
            .into_iter()
            .filter(|m| m.kind == MoveKind::EnPassant)
            .collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].to, sq("d6"));
    }

    // -------------------------------------------------------------------
    // Castling
    // -------------------------------------------------------------------

    #[test]
    fn castling_both_sides() {
        let p = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let castles: Vec<_> = legal_moves(&p)
            .into_iter()
            .filter(|m| m.is_castle())
            .collect();
        assert_eq!(castles.len(), 2);
    }

    #[test]
    fn castling_blocked_by_pieces() {
        let p = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/RN2K1NR w KQkq - 0 1");
        assert!(!legal_moves(&p).iter().any(|m| m.is_castle()));
    }

    #[test]
    fn castling_through_check_forbidden() {
        // Rook on f8 attacks f1: kingside transit is unsafe, queenside fine.
        let p = pos("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let castles: Vec<_> = legal_moves(&p)
            .into_iter()
            .filter(|m| m.is_castle())
            .collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].to, sq("c1"));
        assert_eq!(castles[0].kind, MoveKind::QueensideCastle);
    }

    #[test]
    fn queenside_b_file_attack_does_not_block_castling() {
        // b1 is rook transit, not king transit: an attack on b1 is fine.
        let p = pos("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(
            legal_moves(&p)
                .iter()
                .any(|m| m.kind == MoveKind::QueensideCastle)
        );
    }

    #[test]
    fn no_castling_while_in_check() {
        let p = pos("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1");
        assert!(p.in_check());
        assert!(!legal_moves(&p).iter().any(|m| m.is_castle()));
    }

    // -------------------------------------------------------------------
    // Check handling
    // -------------------------------------------------------------------

    #[test]
    fn double_check_only_king_moves() {
        let p = pos("4k3/8/8/8/4r3/3n4/8/4K3 w - - 0 1");
        assert_eq!(p.checkers().pop_count(), 2);
        let moves = legal_moves(&p);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.piece == PieceType::King));
    }

    #[test]
    fn single_check_capture_block_or_move() {
        // Rook e4 checks the king on e1: the rook on a4 may capture it and
        // the bishop on g5 may block on e3; everything else is a king move.
        let p = pos("4k3/8/8/6B1/R3r3/8/8/4K3 w - - 0 1");
        let moves = legal_moves(&p);
        for mv in &moves {
            // Every non-king move must land on the checker or the ray.
            if mv.piece != PieceType::King {
                assert!(
                    mv.to == sq("e4") || mv.to == sq("e2") || mv.to == sq("e3"),
                    "unexpected evasion {mv}"
                );
            }
        }
        assert!(moves.iter().any(|m| m.from == sq("a4") && m.to == sq("e4")));
        assert!(moves.iter().any(|m| m.from == sq("g5") && m.to == sq("e3")));
    }

    #[test]
    fn pinned_piece_stays_on_its_ray() {
        // Rook e4 is pinned by the rook on e8; it may slide on the e-file
        // but never leave it.
        let p = pos("4r1k1/8/8/8/4R3/8/8/4K3 w - - 0 1");
        let rook_moves: Vec<_> = legal_moves(&p)
            .into_iter()
            .filter(|m| m.from == sq("e4"))
            .collect();
        assert!(!rook_moves.is_empty());
        assert!(rook_moves.iter().all(|m| m.to.file() == 4));
        // Capturing the pinner is allowed.
        assert!(rook_moves.iter().any(|m| m.to == sq("e8")));
    }

    #[test]
    fn pinned_knight_cannot_move() {
        let p = pos("4r1k1/8/8/8/8/4N3/8/4K3 w - - 0 1");
        assert!(!legal_moves(&p).iter().any(|m| m.from == sq("e3")));
    }

    #[test]
    fn pinned_pawn_may_capture_its_pinner() {
        // Bishop b4 pins the d2 pawn along b4-c3-d2-e1: the pawn is frozen
        // (pushing leaves the diagonal, and there is nothing to capture).
        let p = pos("4k3/8/8/8/1b6/8/3P4/4K3 w - - 0 1");
        let pawn_moves: Vec<_> = legal_moves(&p)
            .into_iter()
            .filter(|m| m.from == sq("d2"))
            .collect();
        assert!(pawn_moves.is_empty());

        // With the bishop on c3 itself, dxc3 captures the pinner while
        // staying on the pin ray; pushing is still illegal.
        let p = pos("4k3/8/8/8/8/2b5/3P4/4K3 w - - 0 1");
        let pawn_moves: Vec<_> = legal_moves(&p)
            .into_iter()
            .filter(|m| m.from == sq("d2"))
            .collect();
        assert_eq!(pawn_moves.len(), 1);
        assert_eq!(pawn_moves[0].to, sq("c3"));
    }

    // -------------------------------------------------------------------
    // Move fields
    // -------------------------------------------------------------------

    #[test]
    fn capture_moves_carry_their_victims() {
        let p = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        for mv in legal_captures(&p) {
            match mv.kind {
                MoveKind::EnPassant => assert_eq!(mv.captured, Some(PieceType::Pawn)),
                _ => {
                    let (color, pt) = p.piece_on(mv.to).expect("capture target occupied");
                    assert_eq!(color, !p.turn());
                    assert_eq!(mv.captured, Some(pt));
                }
            }
        }
    }

    #[test]
    fn is_legal_accepts_generated_and_rejects_foreign() {
        let p = Position::starting();
        for mv in p.legal_moves() {
            assert!(p.is_legal(&mv));
        }
        let bogus = Move::quiet(sq("e2"), sq("e5"), PieceType::Pawn);
        assert!(!p.is_legal(&bogus));
    }

    #[test]
    fn parse_move_round_trip() {
        let p = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        for mv in p.legal_moves() {
            assert_eq!(p.parse_move(&mv.to_string()).unwrap(), mv);
        }
        assert!(p.parse_move("e9e4").is_err());
        assert!(p.parse_move("a1a1").is_err());
    }
}
