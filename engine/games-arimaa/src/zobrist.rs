//! Zobrist keys for incremental position signatures.

use once_cell::sync::Lazy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::piece::{Piece, Player, Square, NUM_SQUARES};

/// Fixed so that signatures are reproducible across runs.
const KEY_SEED: u64 = 0x4172_696d_6161_0001;

static KEYS: Lazy<[[[u64; NUM_SQUARES]; 7]; 2]> = Lazy::new(|| {
    let mut rng = ChaCha20Rng::seed_from_u64(KEY_SEED);
    let mut keys = [[[0u64; NUM_SQUARES]; 7]; 2];
    for player in keys.iter_mut() {
        // index 0 (occupancy) keeps zero keys
        for piece in player.iter_mut().skip(1) {
            for key in piece.iter_mut() {
                *key = rng.gen();
            }
        }
    }
    keys
});

/// Key for `piece` of `player` standing on `sq`.
#[inline]
pub fn key(player: Player, piece: Piece, sq: Square) -> u64 {
    KEYS[player.index()][piece.index()][sq as usize]
}
