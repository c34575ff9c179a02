//! Bitboard-based chess position with incremental Zobrist hashing.
//!
//! `Position` stores piece placement as 2 colour bitboards and 6 piece-kind
//! bitboards, side to move, castling rights, en-passant square, move
//! counters, the running hash, and the undo history stack. All mutation goes
//! through `make_move`/`undo_move` (and the null-move pair), which keep the
//! hash and history in lockstep with the board.

use crate::attacks;
use crate::bitboard::{Bitboard, RANK_1, RANK_8};
use crate::movegen;
use crate::types::{CastlingRights, ChessError, Color, Move, MoveKind, PieceType, Square};
use crate::zobrist;

/// The standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ---------------------------------------------------------------------------
// Undo — saved state for reversing a move
// ---------------------------------------------------------------------------

/// State saved before a move so it can be reversed exactly. `mv` is `None`
/// for null moves.
#[derive(Clone, Debug)]
pub struct Undo {
    pub hash: u64,
    pub mv: Option<Move>,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub castling: CastlingRights,
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete chess position.
///
/// Board layout follows LERF (Little-Endian Rank-File) mapping:
/// a1 = 0, b1 = 1, … h8 = 63.
#[derive(Clone, Debug)]
pub struct Position {
    /// Per-colour occupancy.
    colours: [Bitboard; 2],
    /// Per-piece-kind occupancy (both colours).
    pieces: [Bitboard; PieceType::COUNT],
    side_to_move: Color,
    castling: CastlingRights,
    /// En-passant target square (the square *behind* the double-pushed pawn).
    en_passant: Option<Square>,
    /// Half-moves since the last pawn move or capture (50-move rule).
    halfmove_clock: u16,
    /// Full-move number (starts at 1, incremented after Black moves).
    fullmove_number: u16,
    /// Incremental Zobrist hash.
    hash: u64,
    /// Undo records, one per successful make (real or null).
    history: Vec<Undo>,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Position {
    /// An empty board with no pieces and no rights.
    pub fn empty() -> Self {
        Position {
            colours: [Bitboard::EMPTY; 2],
            pieces: [Bitboard::EMPTY; PieceType::COUNT],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            history: Vec::new(),
        }
    }

    /// The standard starting position.
    pub fn starting() -> Self {
        Self::from_fen(STARTING_FEN).expect("starting FEN is always valid")
    }

    /// Reset to the empty state, dropping all history.
    pub fn clear(&mut self) {
        *self = Position::empty();
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    #[inline]
    fn put_piece(&mut self, sq: Square, color: Color, piece: PieceType) {
        let bb = Bitboard::from_square(sq);
        self.colours[color.index()] |= bb;
        self.pieces[piece.index()] |= bb;
    }

    #[inline]
    fn remove_piece(&mut self, sq: Square, color: Color, piece: PieceType) {
        let bb = Bitboard::from_square(sq);
        self.colours[color.index()] &= !bb;
        self.pieces[piece.index()] &= !bb;
    }

    #[inline]
    fn put_piece_hash(&mut self, sq: Square, color: Color, piece: PieceType) {
        self.put_piece(sq, color, piece);
        self.hash ^= zobrist::keys().piece_key(piece, color, sq);
    }

    #[inline]
    fn remove_piece_hash(&mut self, sq: Square, color: Color, piece: PieceType) {
        self.remove_piece(sq, color, piece);
        self.hash ^= zobrist::keys().piece_key(piece, color, sq);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Whose turn it is.
    #[inline]
    pub fn turn(&self) -> Color {
        self.side_to_move
    }

    /// The en-passant target square, if any.
    #[inline]
    pub fn ep(&self) -> Option<Square> {
        self.en_passant
    }

    /// Half-moves since the last pawn move or capture.
    #[inline]
    pub fn halfmoves(&self) -> u16 {
        self.halfmove_clock
    }

    /// The FEN full-move counter.
    #[inline]
    pub fn fullmoves(&self) -> u16 {
        self.fullmove_number
    }

    /// The incremental Zobrist hash.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// The undo history, oldest record first.
    #[inline]
    pub fn history(&self) -> &[Undo] {
        &self.history
    }

    /// Occupancy of one side.
    #[inline]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.colours[color.index()]
    }

    /// Occupancy of one piece kind, both colours.
    #[inline]
    pub fn piece_occupancy(&self, piece: PieceType) -> Bitboard {
        self.pieces[piece.index()]
    }

    /// Pieces of a given colour and kind.
    #[inline]
    pub fn pieces(&self, color: Color, piece: PieceType) -> Bitboard {
        self.colours[color.index()] & self.pieces[piece.index()]
    }

    /// All occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colours[0] | self.colours[1]
    }

    /// All empty squares.
    #[inline]
    pub fn empty_squares(&self) -> Bitboard {
        !self.occupied()
    }

    /// What piece (if any) is on a given square?
    pub fn piece_on(&self, sq: Square) -> Option<(Color, PieceType)> {
        let bb = Bitboard::from_square(sq);
        let color = if (self.colours[Color::White.index()] & bb).is_not_empty() {
            Color::White
        } else if (self.colours[Color::Black.index()] & bb).is_not_empty() {
            Color::Black
        } else {
            return None;
        };
        for &pt in &PieceType::ALL {
            if (self.pieces[pt.index()] & bb).is_not_empty() {
                return Some((color, pt));
            }
        }
        None
    }

    /// The king square for the given colour.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces(color, PieceType::King)
            .lsb()
            .expect("king must exist")
    }

    /// Is the given castling still available by flag? The flags are kept
    /// consistent with king/rook placement by `set_fen` and `make_move`.
    pub fn can_castle(&self, color: Color, kind: MoveKind) -> bool {
        match kind {
            MoveKind::KingsideCastle => self.castling.has(CastlingRights::kingside_flag(color)),
            MoveKind::QueensideCastle => self.castling.has(CastlingRights::queenside_flag(color)),
            _ => false,
        }
    }

    /// The raw castling-rights bitfield.
    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    // -----------------------------------------------------------------------
    // Attack detection
    // -----------------------------------------------------------------------

    /// All pieces of colour `by` attacking `sq`.
    pub fn attackers(&self, sq: Square, by: Color) -> Bitboard {
        let t = attacks::tables();
        let occ = self.occupied();
        let queens = self.pieces(by, PieceType::Queen);
        (t.pawn_attacks(!by, sq) & self.pieces(by, PieceType::Pawn))
            | (t.knight_attacks(sq) & self.pieces(by, PieceType::Knight))
            | (t.king_attacks(sq) & self.pieces(by, PieceType::King))
            | (t.rook_attacks(sq, occ) & (self.pieces(by, PieceType::Rook) | queens))
            | (t.bishop_attacks(sq, occ) & (self.pieces(by, PieceType::Bishop) | queens))
    }

    /// Is `sq` attacked by any piece of colour `by`?
    #[inline]
    pub fn square_attacked(&self, sq: Square, by: Color) -> bool {
        self.attackers(sq, by).is_not_empty()
    }

    /// Every square attacked by `by`. Slider rays are computed with the
    /// opposing king removed from the occupancy, so squares "behind" a
    /// checked king still count as attacked and the king cannot retreat
    /// along the checking ray.
    pub fn squares_attacked(&self, by: Color) -> Bitboard {
        let t = attacks::tables();
        let occ = self.occupied() ^ self.pieces(!by, PieceType::King);
        let queens = self.pieces(by, PieceType::Queen);

        let pawns = self.pieces(by, PieceType::Pawn);
        let mut mask = match by {
            Color::White => pawns.north_east() | pawns.north_west(),
            Color::Black => pawns.south_east() | pawns.south_west(),
        };

        for from in self.pieces(by, PieceType::Knight) {
            mask |= t.knight_attacks(from);
        }
        mask |= t.king_attacks(self.king_square(by));
        for from in self.pieces(by, PieceType::Bishop) | queens {
            mask |= t.bishop_attacks(from, occ);
        }
        for from in self.pieces(by, PieceType::Rook) | queens {
            mask |= t.rook_attacks(from, occ);
        }
        mask
    }

    /// Opponent pieces currently attacking the side-to-move's king.
    #[inline]
    pub fn checkers(&self) -> Bitboard {
        self.attackers(self.king_square(self.turn()), !self.turn())
    }

    /// Is the side to move in check?
    #[inline]
    pub fn in_check(&self) -> bool {
        self.square_attacked(self.king_square(self.turn()), !self.turn())
    }

    /// Squares the king of `side` could step to: its attack set minus
    /// friendly pieces and enemy-controlled squares.
    pub fn king_allowed(&self, side: Color) -> Bitboard {
        attacks::tables().king_attacks(self.king_square(side))
            & !self.occupancy(side)
            & !self.squares_attacked(!side)
    }

    /// Friendly pieces of `side` pinned against their own king.
    pub fn pinned(&self, side: Color) -> Bitboard {
        self.pinned_to(side, self.king_square(side))
    }

    /// Pieces of `side` that are the sole blocker between `sq` and an
    /// enemy slider aligned with it.
    pub fn pinned_to(&self, side: Color, sq: Square) -> Bitboard {
        let t = attacks::tables();
        let them = !side;
        let occ = self.occupied();
        let queens = self.pieces(them, PieceType::Queen);
        let snipers = (t.rook_attacks(sq, Bitboard::EMPTY)
            & (self.pieces(them, PieceType::Rook) | queens))
            | (t.bishop_attacks(sq, Bitboard::EMPTY)
                & (self.pieces(them, PieceType::Bishop) | queens));

        let mut pinned = Bitboard::EMPTY;
        for sniper in snipers {
            let blockers = t.between(sq, sniper) & occ;
            if blockers.pop_count() == 1 && (blockers & self.occupancy(side)).is_not_empty() {
                pinned |= blockers;
            }
        }
        pinned
    }

    /// Pawns of `side` with no enemy pawn ahead of them on their own or an
    /// adjacent file.
    pub fn passed_pawns(&self, side: Color) -> Bitboard {
        let mut mask = self.pieces(!side, PieceType::Pawn);
        match side {
            Color::White => {
                mask |= mask.south().east();
                mask |= mask.south().west();
                mask |= mask.south();
                mask |= mask.south();
                mask |= mask.south();
                mask |= mask.south();
                mask |= mask.south();
            }
            Color::Black => {
                mask |= mask.north().east();
                mask |= mask.north().west();
                mask |= mask.north();
                mask |= mask.north();
                mask |= mask.north();
                mask |= mask.north();
                mask |= mask.north();
            }
        }
        self.pieces(side, PieceType::Pawn) & !mask
    }

    // -----------------------------------------------------------------------
    // Move generation (delegates to movegen)
    // -----------------------------------------------------------------------

    /// All legal moves for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(self)
    }

    /// The capturing subset of `legal_moves`.
    pub fn legal_captures(&self) -> Vec<Move> {
        movegen::legal_captures(self)
    }

    /// The non-capturing subset of `legal_moves`.
    pub fn legal_noncaptures(&self) -> Vec<Move> {
        movegen::legal_noncaptures(self)
    }

    /// Number of legal moves.
    pub fn count_moves(&self) -> usize {
        self.legal_moves().len()
    }

    /// Re-verify a candidate move against the generated legal set.
    pub fn is_legal(&self, mv: &Move) -> bool {
        self.legal_moves().contains(mv)
    }

    /// Find the legal move with the given long-algebraic text ("e2e4",
    /// "e7e8q").
    pub fn parse_move(&self, s: &str) -> Result<Move, ChessError> {
        self.legal_moves()
            .into_iter()
            .find(|m| m.to_string() == s)
            .ok_or_else(|| {
                tracing::debug!(text = s, "no legal move matches");
                ChessError::IllegalMoveString(s.to_string())
            })
    }

    // -----------------------------------------------------------------------
    // Make / undo
    // -----------------------------------------------------------------------

    /// Apply a move. The move is trusted to be legal (obtain it from
    /// `legal_moves` or `parse_move`); use `make_move_str` for validated
    /// text input.
    pub fn make_move(&mut self, mv: Move) {
        let zk = zobrist::keys();
        let us = self.side_to_move;
        let them = !us;

        self.history.push(Undo {
            hash: self.hash,
            mv: Some(mv),
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            castling: self.castling,
        });

        // Retire the current en-passant target.
        if let Some(ep) = self.en_passant {
            self.hash ^= zk.ep_key(ep);
        }
        self.en_passant = None;

        // Captures. The en-passant victim sits behind the destination.
        match mv.kind {
            MoveKind::EnPassant => {
                self.remove_piece_hash(mv.to.backward(us), them, PieceType::Pawn);
            }
            MoveKind::Capture | MoveKind::PromotionCapture => {
                debug_assert!(mv.captured.is_some(), "capture move without a victim");
                if let Some(captured) = mv.captured {
                    self.remove_piece_hash(mv.to, them, captured);
                }
            }
            _ => {}
        }

        // Move the piece; promotions land as the promoted piece.
        self.remove_piece_hash(mv.from, us, mv.piece);
        let landing = mv.promotion.unwrap_or(mv.piece);
        self.put_piece_hash(mv.to, us, landing);

        // Castling also moves the rook.
        if mv.is_castle() {
            let (rook_from, rook_to) = castling_rook_squares(mv.to);
            self.remove_piece_hash(rook_from, us, PieceType::Rook);
            self.put_piece_hash(rook_to, us, PieceType::Rook);
        }

        // Castling rights: a move touching a king or rook origin square
        // clears the corresponding flags. XOR only the keys that changed.
        let old_rights = self.castling.0;
        self.castling.0 &= CASTLING_MASK[mv.from.0 as usize];
        self.castling.0 &= CASTLING_MASK[mv.to.0 as usize];
        self.hash ^= zk.castling_keys(old_rights ^ self.castling.0);

        // A double push opens an en-passant window.
        if mv.kind == MoveKind::DoublePush {
            let ep_sq = mv.from.forward(us);
            self.en_passant = Some(ep_sq);
            self.hash ^= zk.ep_key(ep_sq);
        }

        // Clocks.
        if mv.piece == PieceType::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        // Switch side.
        self.side_to_move = them;
        self.hash ^= zk.side_to_move;
    }

    /// Parse and apply a long-algebraic move string, validating it against
    /// the legal move list.
    pub fn make_move_str(&mut self, s: &str) -> Result<Move, ChessError> {
        let mv = self.parse_move(s)?;
        self.make_move(mv);
        Ok(mv)
    }

    /// Reverse the most recent `make_move`, restoring every field
    /// (including the hash) bit-exactly.
    pub fn undo_move(&mut self) -> Result<Move, ChessError> {
        let undo = self.history.pop().ok_or(ChessError::NothingToUndo)?;
        let mv = undo.mv.expect("undo_move called on a null-move record");

        let them = self.side_to_move;
        let us = !them; // the side that made the move
        self.side_to_move = us;

        // Take the piece back; promotions revert to a pawn.
        let landing = mv.promotion.unwrap_or(mv.piece);
        self.remove_piece(mv.to, us, landing);
        self.put_piece(mv.from, us, mv.piece);

        match mv.kind {
            MoveKind::EnPassant => {
                self.put_piece(mv.to.backward(us), them, PieceType::Pawn);
            }
            MoveKind::Capture | MoveKind::PromotionCapture => {
                if let Some(captured) = mv.captured {
                    self.put_piece(mv.to, them, captured);
                }
            }
            MoveKind::KingsideCastle | MoveKind::QueensideCastle => {
                let (rook_from, rook_to) = castling_rook_squares(mv.to);
                self.remove_piece(rook_to, us, PieceType::Rook);
                self.put_piece(rook_from, us, PieceType::Rook);
            }
            _ => {}
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.hash = undo.hash;
        if us == Color::Black {
            self.fullmove_number -= 1;
        }

        Ok(mv)
    }

    /// Pass the move: flip the side, drop the en-passant window, reset the
    /// halfmove clock. No pieces move.
    pub fn make_null(&mut self) {
        let zk = zobrist::keys();
        self.history.push(Undo {
            hash: self.hash,
            mv: None,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            castling: self.castling,
        });

        if let Some(ep) = self.en_passant {
            self.hash ^= zk.ep_key(ep);
        }
        self.hash ^= zk.side_to_move;

        self.side_to_move = !self.side_to_move;
        self.en_passant = None;
        self.halfmove_clock = 0;
    }

    /// Reverse the most recent `make_null`.
    pub fn undo_null(&mut self) -> Result<(), ChessError> {
        let undo = self.history.pop().ok_or(ChessError::NothingToUndo)?;
        debug_assert!(undo.mv.is_none(), "undo_null called on a real-move record");

        self.hash = undo.hash;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.side_to_move = !self.side_to_move;
        Ok(())
    }

    /// The hash the position would have after `mv`, without making it.
    pub fn predict_hash(&self, mv: Move) -> u64 {
        let zk = zobrist::keys();
        let us = self.side_to_move;
        let them = !us;
        let mut hash = self.hash;

        if let Some(ep) = self.en_passant {
            hash ^= zk.ep_key(ep);
        }

        match mv.kind {
            MoveKind::EnPassant => {
                hash ^= zk.piece_key(PieceType::Pawn, them, mv.to.backward(us));
            }
            MoveKind::Capture | MoveKind::PromotionCapture => {
                if let Some(captured) = mv.captured {
                    hash ^= zk.piece_key(captured, them, mv.to);
                }
            }
            _ => {}
        }

        hash ^= zk.piece_key(mv.piece, us, mv.from);
        hash ^= zk.piece_key(mv.promotion.unwrap_or(mv.piece), us, mv.to);

        if mv.is_castle() {
            let (rook_from, rook_to) = castling_rook_squares(mv.to);
            hash ^= zk.piece_key(PieceType::Rook, us, rook_from);
            hash ^= zk.piece_key(PieceType::Rook, us, rook_to);
        }

        let new_rights =
            self.castling.0 & CASTLING_MASK[mv.from.0 as usize] & CASTLING_MASK[mv.to.0 as usize];
        hash ^= zk.castling_keys(self.castling.0 ^ new_rights);

        if mv.kind == MoveKind::DoublePush {
            hash ^= zk.ep_key(mv.from.forward(us));
        }

        hash ^ zk.side_to_move
    }

    // -----------------------------------------------------------------------
    // Draw and terminal predicates
    // -----------------------------------------------------------------------

    /// Fifty-move rule: 100 half-moves without a pawn move or capture.
    #[inline]
    pub fn fiftymoves(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Threefold repetition: the current hash occurs twice more among the
    /// prior same-side positions within the halfmove clock's reach.
    pub fn threefold(&self) -> bool {
        if self.halfmove_clock < 8 {
            return false;
        }

        let mut repeats = 0;
        let n = self.history.len();
        let mut i = 2usize;
        while i <= n && i <= self.halfmove_clock as usize {
            if self.history[n - i].hash == self.hash {
                repeats += 1;
                if repeats >= 2 {
                    return true;
                }
            }
            i += 2;
        }
        false
    }

    /// Drawn by repetition or the fifty-move rule. Checkmate trumps both.
    pub fn is_draw(&self) -> bool {
        (self.threefold() || self.fiftymoves()) && !self.is_checkmate()
    }

    pub fn is_checkmate(&self) -> bool {
        self.in_check() && self.legal_moves().is_empty()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.in_check() && self.legal_moves().is_empty()
    }

    pub fn is_terminal(&self) -> bool {
        self.legal_moves().is_empty() || self.is_draw()
    }

    // -----------------------------------------------------------------------
    // Perft
    // -----------------------------------------------------------------------

    /// Count leaf nodes of the legal-move tree at `depth`.
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0u64;
        for mv in moves {
            self.make_move(mv);
            nodes += self.perft(depth - 1);
            self.undo_move().expect("perft unwinds its own moves");
        }
        nodes
    }

    // -----------------------------------------------------------------------
    // Hash recomputation and invariant checking
    // -----------------------------------------------------------------------

    /// Compute the Zobrist hash from scratch. Must always agree with the
    /// incrementally maintained `hash()`.
    pub fn calculate_hash(&self) -> u64 {
        let zk = zobrist::keys();
        let mut hash = 0u64;

        if self.side_to_move == Color::Black {
            hash ^= zk.side_to_move;
        }
        for color in [Color::White, Color::Black] {
            for &pt in &PieceType::ALL {
                for sq in self.pieces(color, pt) {
                    hash ^= zk.piece_key(pt, color, sq);
                }
            }
        }
        hash ^= zk.castling_keys(self.castling.0);
        if let Some(ep) = self.en_passant {
            hash ^= zk.ep_key(ep);
        }
        hash
    }

    /// Diagnostic check of the structural invariants. Reports the first
    /// violation; performs no recovery.
    pub fn validate(&self) -> Result<(), ChessError> {
        let fail = |msg: String| Err(ChessError::InvariantViolation(msg));

        // No square is two-coloured.
        if (self.colours[0] & self.colours[1]).is_not_empty() {
            return fail("colour bitboards overlap".into());
        }

        // Piece-kind decomposition covers occupancy exactly.
        let mut union = Bitboard::EMPTY;
        let mut total = 0u32;
        for bb in self.pieces {
            union |= bb;
            total += bb.pop_count();
        }
        if union != self.occupied() || total != self.occupied().pop_count() {
            return fail("piece bitboards do not partition the occupancy".into());
        }

        // Exactly one king per side.
        for color in [Color::White, Color::Black] {
            let kings = self.pieces(color, PieceType::King).pop_count();
            if kings != 1 {
                return fail(format!("{color} has {kings} kings"));
            }
        }

        // No pawn on the first or last rank.
        if (self.pieces[PieceType::Pawn.index()] & (RANK_1 | RANK_8)).is_not_empty() {
            return fail("pawn on rank 1 or 8".into());
        }

        // En passant: correct rank and a freshly double-pushed enemy pawn.
        if let Some(ep) = self.en_passant {
            let expected_rank = match self.side_to_move {
                Color::White => 5, // target on rank 6
                Color::Black => 2, // target on rank 3
            };
            if ep.rank() != expected_rank {
                return fail(format!("en-passant square {ep} on wrong rank"));
            }
            let pawn_sq = ep.backward(self.side_to_move);
            if !self.pieces(!self.side_to_move, PieceType::Pawn).is_set(pawn_sq) {
                return fail(format!("no enemy pawn behind en-passant square {ep}"));
            }
        }

        // Castling flags require king and rook on their origin squares.
        for (flag, color, king_sq, rook_sq) in [
            (CastlingRights::WHITE_KINGSIDE, Color::White, Square::E1, Square::H1),
            (CastlingRights::WHITE_QUEENSIDE, Color::White, Square::E1, Square::A1),
            (CastlingRights::BLACK_KINGSIDE, Color::Black, Square::E8, Square::H8),
            (CastlingRights::BLACK_QUEENSIDE, Color::Black, Square::E8, Square::A8),
        ] {
            if self.castling.has(flag)
                && !(self.pieces(color, PieceType::King).is_set(king_sq)
                    && self.pieces(color, PieceType::Rook).is_set(rook_sq))
            {
                return fail(format!("castling flag set without king/rook at home for {color}"));
            }
        }

        // The side not to move must not be in check.
        let them = !self.side_to_move;
        if self.square_attacked(self.king_square(them), self.side_to_move) {
            return fail(format!("{them} is in check but it is not their turn"));
        }

        // Incremental hash matches a from-scratch recomputation.
        if self.hash != self.calculate_hash() {
            return fail("incremental hash diverged from recomputation".into());
        }

        Ok(())
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Castling helpers
// ---------------------------------------------------------------------------

/// For a king destination square (after castling), return (rook_from, rook_to).
fn castling_rook_squares(king_to: Square) -> (Square, Square) {
    match king_to {
        // White kingside: king e1→g1, rook h1→f1.
        Square::G1 => (Square::H1, Square::F1),
        // White queenside: king e1→c1, rook a1→d1.
        Square::C1 => (Square::A1, Square::D1),
        // Black kingside: king e8→g8, rook h8→f8.
        Square::G8 => (Square::H8, Square::F8),
        // Black queenside: king e8→c8, rook a8→d8.
        Square::C8 => (Square::A8, Square::D8),
        _ => panic!("invalid castling king destination: {king_to}"),
    }
}

/// Mask table indexed by square. When a move touches a square, AND the
/// castling rights with this mask: a rook leaving (or being captured on) its
/// origin square drops that flag, the king's home square drops both of its
/// side's flags.
#[rustfmt::skip]
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    mask[0]  = 0b1111 & !CastlingRights::WHITE_QUEENSIDE;
    mask[4]  = 0b1111 & !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
    mask[7]  = 0b1111 & !CastlingRights::WHITE_KINGSIDE;
    mask[56] = 0b1111 & !CastlingRights::BLACK_QUEENSIDE;
    mask[60] = 0b1111 & !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
    mask[63] = 0b1111 & !CastlingRights::BLACK_KINGSIDE;
    mask
};

// ---------------------------------------------------------------------------
// FEN parsing & generation
// ---------------------------------------------------------------------------

impl Position {
    /// Parse a FEN string into a `Position`.
    ///
    /// Validates all six fields, requires exactly one king per side, and
    /// repairs castling flags whose king or rook is not on its origin
    /// square. History starts empty and the hash is computed from scratch.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(ChessError::InvalidFen(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }

        let mut pos = Position::empty();

        // ----- Field 1: Piece placement -----
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8; // FEN starts from rank 8
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidFen(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as u8;
                } else if let Some((color, piece)) = PieceType::from_char(ch) {
                    pos.put_piece(Square::from_file_rank(file, rank), color, piece);
                    file += 1;
                } else {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {} has {} squares instead of 8",
                    rank + 1,
                    file
                )));
            }
        }

        for color in [Color::White, Color::Black] {
            let kings = pos.pieces(color, PieceType::King).pop_count();
            if kings != 1 {
                return Err(ChessError::InvalidFen(format!(
                    "{color} has {kings} kings (expected 1)"
                )));
            }
        }

        // ----- Field 2: Side to move -----
        pos.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        // ----- Field 3: Castling availability -----
        pos.castling = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
        })?;

        // Repair flags that do not match the actual king/rook placement.
        for (flag, color, king_sq, rook_sq) in [
            (CastlingRights::WHITE_KINGSIDE, Color::White, Square::E1, Square::H1),
            (CastlingRights::WHITE_QUEENSIDE, Color::White, Square::E1, Square::A1),
            (CastlingRights::BLACK_KINGSIDE, Color::Black, Square::E8, Square::H8),
            (CastlingRights::BLACK_QUEENSIDE, Color::Black, Square::E8, Square::A8),
        ] {
            if pos.castling.has(flag)
                && !(pos.pieces(color, PieceType::King).is_set(king_sq)
                    && pos.pieces(color, PieceType::Rook).is_set(rook_sq))
            {
                tracing::debug!(%color, "cleared castling right without king/rook at home");
                pos.castling.remove(flag);
            }
        }

        // ----- Field 4: En passant target square -----
        if fields[3] != "-" {
            let ep_sq = Square::from_algebraic(fields[3]).ok_or_else(|| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            let rank = ep_sq.rank();
            if rank != 2 && rank != 5 {
                return Err(ChessError::InvalidFen(format!(
                    "en passant square {} is not on rank 3 or 6",
                    fields[3]
                )));
            }
            pos.en_passant = Some(ep_sq);
        }

        // ----- Field 5: Halfmove clock -----
        pos.halfmove_clock = fields[4].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid halfmove clock: '{}'", fields[4]))
        })?;

        // ----- Field 6: Fullmove number -----
        pos.fullmove_number = fields[5].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid fullmove number: '{}'", fields[5]))
        })?;
        if pos.fullmove_number == 0 {
            return Err(ChessError::InvalidFen(
                "fullmove number must be >= 1".to_string(),
            ));
        }

        pos.hash = pos.calculate_hash();
        Ok(pos)
    }

    /// Replace this position with the one described by `fen`, clearing all
    /// history. On a parse failure the position is left in the cleared
    /// (empty) state.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), ChessError> {
        match Self::from_fen(fen) {
            Ok(pos) => {
                *self = pos;
                Ok(())
            }
            Err(e) => {
                tracing::debug!(error = %e, "rejected FEN, position cleared");
                self.clear();
                Err(e)
            }
        }
    }

    /// Export the position as a FEN string. Inverse of `from_fen` on valid
    /// positions.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_on(sq) {
                    Some((color, piece)) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.to_char(color));
                    }
                    None => {
                        empty_count += 1;
                    }
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        fen.push_str(&self.castling.to_fen());

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }
}

// ---------------------------------------------------------------------------
// Display — human-readable debug grid
// ---------------------------------------------------------------------------

impl std::fmt::Display for Position {
    /// Rank-8-first grid of piece letters with `-` for empty squares,
    /// followed by castling, en-passant, and turn lines.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_on(sq) {
                    Some((color, piece)) => write!(f, "{}", piece.to_char(color))?,
                    None => write!(f, "-")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "Castling: {}", self.castling.to_fen())?;
        match self.en_passant {
            Some(sq) => writeln!(f, "EP: {sq}")?,
            None => writeln!(f, "EP: -")?,
        }
        write!(
            f,
            "Turn: {}",
            match self.side_to_move {
                Color::White => 'w',
                Color::Black => 'b',
            }
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
