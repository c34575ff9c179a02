//! Pre-computed attack tables for move generation.
//!
//! All tables are initialised once (via `OnceLock`) and live for the lifetime
//! of the process. Sliding-piece attacks use plain magic bitboards; the
//! `between`/`line` tables give the squares strictly between two aligned
//! squares and the full line through them, which drive pin and check-block
//! geometry.

use crate::bitboard::Bitboard;
use crate::types::{Color, Square};
use std::sync::OnceLock;

// =========================================================================
// Public API
// =========================================================================

/// Get a reference to the global attack tables.
pub fn tables() -> &'static AttackTables {
    static TABLES: OnceLock<AttackTables> = OnceLock::new();
    TABLES.get_or_init(AttackTables::init)
}

/// Pre-computed attack/move tables for every piece type, plus ray geometry.
pub struct AttackTables {
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    /// `pawn[color][square]` — squares a pawn on `square` attacks.
    pawn: [[Bitboard; 64]; 2],
    rook_magics: [MagicEntry; 64],
    bishop_magics: [MagicEntry; 64],
    rook_table: Vec<Bitboard>,
    bishop_table: Vec<Bitboard>,
    /// Squares strictly between two aligned squares; empty if not aligned.
    between: Vec<Bitboard>,
    /// The full rank/file/diagonal through two aligned squares (inclusive);
    /// empty if not aligned.
    line: Vec<Bitboard>,
}

/// A single magic-bitboard entry for one square.
struct MagicEntry {
    mask: Bitboard,
    magic: u64,
    shift: u8,
    /// Offset into the shared attack table.
    offset: usize,
}

impl AttackTables {
    /// Knight attacks from a square.
    #[inline]
    pub fn knight_attacks(&self, sq: Square) -> Bitboard {
        self.knight[sq.0 as usize]
    }

    /// King attacks from a square.
    #[inline]
    pub fn king_attacks(&self, sq: Square) -> Bitboard {
        self.king[sq.0 as usize]
    }

    /// Squares a pawn of `color` on `sq` attacks.
    #[inline]
    pub fn pawn_attacks(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn[color.index()][sq.0 as usize]
    }

    /// Rook attacks from `sq` given the current occupancy.
    #[inline]
    pub fn rook_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let entry = &self.rook_magics[sq.0 as usize];
        self.rook_table[entry.offset + magic_index(entry, occupied)]
    }

    /// Bishop attacks from `sq` given the current occupancy.
    #[inline]
    pub fn bishop_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let entry = &self.bishop_magics[sq.0 as usize];
        self.bishop_table[entry.offset + magic_index(entry, occupied)]
    }

    /// Queen attacks = rook | bishop.
    #[inline]
    pub fn queen_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.rook_attacks(sq, occupied) | self.bishop_attacks(sq, occupied)
    }

    /// Squares strictly between `a` and `b` if they share a rank, file, or
    /// diagonal; empty otherwise.
    #[inline]
    pub fn between(&self, a: Square, b: Square) -> Bitboard {
        self.between[a.0 as usize * 64 + b.0 as usize]
    }

    /// The full line through `a` and `b` (including both) if aligned;
    /// empty otherwise.
    #[inline]
    pub fn line(&self, a: Square, b: Square) -> Bitboard {
        self.line[a.0 as usize * 64 + b.0 as usize]
    }
}

// =========================================================================
// Magic index computation
// =========================================================================

#[inline]
fn magic_index(entry: &MagicEntry, occupied: Bitboard) -> usize {
    let blockers = occupied & entry.mask;
    let hash = blockers.0.wrapping_mul(entry.magic);
    (hash >> entry.shift) as usize
}

// =========================================================================
// Initialisation
// =========================================================================

impl AttackTables {
    fn init() -> Self {
        let knight = init_leaper(&KNIGHT_OFFSETS);
        let king = init_leaper(&KING_OFFSETS);
        let pawn = init_pawn_attacks();
        let (rook_magics, rook_table) = find_magics(rook_mask, &ROOK_DELTAS, 0xABCD_1234_5678_EF01);
        let (bishop_magics, bishop_table) =
            find_magics(bishop_mask, &BISHOP_DELTAS, 0x1234_ABCD_EF01_5678);
        let (between, line) = init_rays();

        AttackTables {
            knight,
            king,
            pawn,
            rook_magics,
            bishop_magics,
            rook_table,
            bishop_table,
            between,
            line,
        }
    }
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

fn init_leaper(offsets: &[(i8, i8); 8]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    for sq in 0..64u8 {
        let file = (sq & 7) as i8;
        let rank = (sq >> 3) as i8;
        let mut bb = 0u64;
        for &(dr, df) in offsets {
            let r = rank + dr;
            let f = file + df;
            if (0..8).contains(&r) && (0..8).contains(&f) {
                bb |= 1u64 << (r * 8 + f);
            }
        }
        table[sq as usize] = Bitboard(bb);
    }
    table
}

fn init_pawn_attacks() -> [[Bitboard; 64]; 2] {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    for sq in 0..64u8 {
        let bb = Bitboard(1u64 << sq);
        table[Color::White.index()][sq as usize] = bb.north_east() | bb.north_west();
        table[Color::Black.index()][sq as usize] = bb.south_east() | bb.south_west();
    }
    table
}

// =========================================================================
// Ray geometry: between / line tables
// =========================================================================

fn init_rays() -> (Vec<Bitboard>, Vec<Bitboard>) {
    let mut between = vec![Bitboard::EMPTY; 64 * 64];
    let mut line = vec![Bitboard::EMPTY; 64 * 64];

    for a in 0..64u8 {
        let rook_a = sliding_attacks(a, 0, &ROOK_DELTAS);
        let bishop_a = sliding_attacks(a, 0, &BISHOP_DELTAS);
        for b in 0..64u8 {
            if a == b {
                continue;
            }
            let a_bb = 1u64 << a;
            let b_bb = 1u64 << b;
            let idx = a as usize * 64 + b as usize;

            if rook_a & b_bb != 0 {
                between[idx] = Bitboard(
                    sliding_attacks(a, b_bb, &ROOK_DELTAS) & sliding_attacks(b, a_bb, &ROOK_DELTAS),
                );
                line[idx] =
                    Bitboard((rook_a & sliding_attacks(b, 0, &ROOK_DELTAS)) | a_bb | b_bb);
            } else if bishop_a & b_bb != 0 {
                between[idx] = Bitboard(
                    sliding_attacks(a, b_bb, &BISHOP_DELTAS)
                        & sliding_attacks(b, a_bb, &BISHOP_DELTAS),
                );
                line[idx] =
                    Bitboard((bishop_a & sliding_attacks(b, 0, &BISHOP_DELTAS)) | a_bb | b_bb);
            }
        }
    }

    (between, line)
}

// =========================================================================
// Magic bitboards — shared helpers
// =========================================================================

/// Enumerate all subsets of `mask` using the carry-rippler trick.
fn enumerate_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::new();
    let mut subset = 0u64;
    loop {
        subsets.push(subset);
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    subsets
}

/// Sliding attacks along rays from `sq`, with `blockers` as obstacles.
fn sliding_attacks(sq: u8, blockers: u64, deltas: &[(i8, i8)]) -> u64 {
    let file = (sq & 7) as i8;
    let rank = (sq >> 3) as i8;
    let mut attacks = 0u64;
    for &(dr, df) in deltas {
        let mut r = rank + dr;
        let mut f = file + df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if blockers & bit != 0 {
                break; // blocked
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// Relevant blocker mask for a rook on `sq` (excludes edge squares on the ray).
fn rook_mask(sq: u8) -> u64 {
    let file = (sq & 7) as i8;
    let rank = (sq >> 3) as i8;
    let mut mask = 0u64;
    for f in 1..7i8 {
        if f != file {
            mask |= 1u64 << (rank * 8 + f);
        }
    }
    for r in 1..7i8 {
        if r != rank {
            mask |= 1u64 << (r * 8 + file);
        }
    }
    mask
}

/// Relevant blocker mask for a bishop on `sq` (excludes board edges).
fn bishop_mask(sq: u8) -> u64 {
    let file = (sq & 7) as i8;
    let rank = (sq >> 3) as i8;
    let mut mask = 0u64;
    for &(dr, df) in &BISHOP_DELTAS {
        let mut r = rank + dr;
        let mut f = file + df;
        while (1..7).contains(&r) && (1..7).contains(&f) {
            mask |= 1u64 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }
    mask
}

const ROOK_DELTAS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_DELTAS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

// =========================================================================
// Magic table initialization — runtime magic finder
// =========================================================================

/// xorshift64 PRNG for the magic number search.
fn xorshift64(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

/// Sparse random number (few bits set) — much more likely to be a valid
/// magic. Standard technique: AND three random values together.
fn sparse_random(state: &mut u64) -> u64 {
    xorshift64(state) & xorshift64(state) & xorshift64(state)
}

/// Find magic numbers at runtime for all 64 squares.
///
/// Trial-and-error with sparse random candidates until a collision-free
/// mapping appears. Typically under 100 candidates per square; total init
/// is well under 100ms.
fn find_magics(
    mask_fn: fn(u8) -> u64,
    deltas: &[(i8, i8)],
    seed: u64,
) -> ([MagicEntry; 64], Vec<Bitboard>) {
    let mut rng = seed;
    let mut all_tables: Vec<Bitboard> = Vec::new();
    let mut entries: [MagicEntry; 64] = std::array::from_fn(|_| MagicEntry {
        mask: Bitboard::EMPTY,
        magic: 0,
        shift: 0,
        offset: 0,
    });

    for sq in 0..64u8 {
        let mask = mask_fn(sq);
        let bits = mask.count_ones() as u8;
        let shift = 64 - bits;
        let table_size = 1usize << bits;

        // Pre-compute all blocker subsets and their attack sets.
        let subsets = enumerate_subsets(mask);
        let attacks: Vec<u64> = subsets
            .iter()
            .map(|&b| sliding_attacks(sq, b, deltas))
            .collect();

        // Search for a magic that maps every subset to a unique index
        // (mapping to the same attack set is a constructive collision).
        let magic = 'search: loop {
            let candidate = sparse_random(&mut rng);

            // Quick reject: want a dense upper byte of candidate * mask.
            if (candidate.wrapping_mul(mask) & 0xFF00_0000_0000_0000).count_ones() < 6 {
                continue;
            }

            let mut table = vec![u64::MAX; table_size]; // sentinel
            let mut ok = true;

            for (i, &blockers) in subsets.iter().enumerate() {
                let idx = (blockers.wrapping_mul(candidate) >> shift) as usize;
                if table[idx] == u64::MAX {
                    table[idx] = attacks[i];
                } else if table[idx] != attacks[i] {
                    ok = false;
                    break;
                }
            }

            if ok {
                break 'search candidate;
            }
        };

        let offset = all_tables.len();
        entries[sq as usize] = MagicEntry {
            mask: Bitboard(mask),
            magic,
            shift,
            offset,
        };

        // Build the final table for this square.
        let mut table = vec![Bitboard::EMPTY; table_size];
        for (i, &blockers) in subsets.iter().enumerate() {
            let idx = (blockers.wrapping_mul(magic) >> shift) as usize;
            table[idx] = Bitboard(attacks[i]);
        }
        all_tables.extend_from_slice(&table);
    }

    (entries, all_tables)
}

// =========================================================================
// Tests
// =========================================================================
