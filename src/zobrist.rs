//! Zobrist hashing for incremental position identification.
//!
//! Each feature of a position (piece on square, side to move, individual
//! castling right, en-passant file) gets a random 64-bit key. The position
//! hash is the XOR of all applicable keys, so toggling a feature is a single
//! XOR on make/undo.

use crate::types::{Color, PieceType, Square};

/// One key per castling flag: WK, WQ, BK, BQ.
const CASTLING_KEYS: usize = 4;
/// One key per en-passant file (a..h).
const EP_KEYS: usize = 8;

// ---------------------------------------------------------------------------
// ZobristKeys — immutable singleton
// ---------------------------------------------------------------------------

/// Pre-computed Zobrist random keys (generated once via `OnceLock`).
pub struct ZobristKeys {
    /// piece\[color\]\[piece_type\]\[square\].
    piece: [[[u64; 64]; 6]; 2],
    /// XOR this when it is Black's turn to move.
    pub side_to_move: u64,
    /// castling\[flag_index\] — WK=0, WQ=1, BK=2, BQ=3.
    castling: [u64; CASTLING_KEYS],
    /// en_passant\[file\].
    en_passant: [u64; EP_KEYS],
}

static ZOBRIST: std::sync::OnceLock<ZobristKeys> = std::sync::OnceLock::new();

/// Get a reference to the global Zobrist keys.
pub fn keys() -> &'static ZobristKeys {
    ZOBRIST.get_or_init(ZobristKeys::init)
}

impl ZobristKeys {
    /// Generate all keys using a deterministic PRNG with a fixed seed, so
    /// hashes are reproducible across runs and persistable by callers.
    fn init() -> Self {
        let mut rng = Xorshift64::new(0x3243_F6A8_885A_308D); // π digits

        let mut piece = [[[0u64; 64]; 6]; 2];
        for color in &mut piece {
            for pt in color {
                for sq in pt {
                    *sq = rng.next_u64();
                }
            }
        }

        let side_to_move = rng.next_u64();

        let mut castling = [0u64; CASTLING_KEYS];
        for key in &mut castling {
            *key = rng.next_u64();
        }

        let mut en_passant = [0u64; EP_KEYS];
        for key in &mut en_passant {
            *key = rng.next_u64();
        }

        ZobristKeys {
            piece,
            side_to_move,
            castling,
            en_passant,
        }
    }

    /// Key for a specific piece on a specific square.
    #[inline]
    pub fn piece_key(&self, piece: PieceType, color: Color, sq: Square) -> u64 {
        self.piece[color.index()][piece.index()][sq.0 as usize]
    }

    /// Key for the en-passant target square (keyed by its file).
    #[inline]
    pub fn ep_key(&self, sq: Square) -> u64 {
        self.en_passant[sq.file() as usize]
    }

    /// Key for one castling flag: WK=0, WQ=1, BK=2, BQ=3.
    #[inline]
    pub fn castling_key(&self, flag_index: usize) -> u64 {
        self.castling[flag_index]
    }

    /// XOR of the keys for every set flag in a castling-rights bitfield.
    #[inline]
    pub fn castling_keys(&self, rights: u8) -> u64 {
        let mut hash = 0u64;
        for (i, key) in self.castling.iter().enumerate() {
            if rights & (1 << i) != 0 {
                hash ^= key;
            }
        }
        hash
    }
}

// ---------------------------------------------------------------------------
// Deterministic PRNG (xorshift64)
// ---------------------------------------------------------------------------

struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        // xorshift from zero state is stuck at zero.
        Xorshift64 {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_initialised() {
        let k = keys();
        assert_ne!(k.side_to_move, 0);
    }

    #[test]
    fn keys_are_deterministic() {
        let k1 = keys();
        let k2 = keys();
        assert!(std::ptr::eq(k1, k2));
        assert_eq!(
            k1.piece_key(PieceType::King, Color::White, Square(4)),
            k2.piece_key(PieceType::King, Color::White, Square(4)),
        );
    }

    #[test]
    fn piece_keys_unique() {
        let k = keys();
        let a = k.piece_key(PieceType::Pawn, Color::White, Square(0));
        let b = k.piece_key(PieceType::Pawn, Color::White, Square(1));
        let c = k.piece_key(PieceType::Pawn, Color::Black, Square(0));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn castling_keys_unique() {
        let k = keys();
        let mut set = std::collections::HashSet::new();
        for i in 0..4 {
            assert!(set.insert(k.castling_key(i)), "duplicate castling key {i}");
        }
    }

    #[test]
    fn castling_keys_bitfield_xor() {
        let k = keys();
        assert_eq!(k.castling_keys(0), 0);
        assert_eq!(
            k.castling_keys(0b0101),
            k.castling_key(0) ^ k.castling_key(2)
        );
        assert_eq!(
            k.castling_keys(0b1111),
            k.castling_key(0) ^ k.castling_key(1) ^ k.castling_key(2) ^ k.castling_key(3)
        );
    }

    #[test]
    fn ep_keys_by_file() {
        let k = keys();
        // Same file, different rank → same key.
        assert_eq!(k.ep_key(Square(16)), k.ep_key(Square(40))); // a3 vs a6
        let mut set = std::collections::HashSet::new();
        for f in 0..8u8 {
            assert!(set.insert(k.ep_key(Square(16 + f))), "duplicate EP key {f}");
        }
    }

    #[test]
    fn xorshift_never_zero() {
        let mut rng = Xorshift64::new(42);
        for _ in 0..10_000 {
            assert_ne!(rng.next_u64(), 0);
        }
    }
}
