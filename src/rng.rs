// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Charge Arena Simulation Suite - Seeded RNG Streams

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Large odd constant spreading agent ids across the seed space.
const AGENT_STREAM_PRIME: u64 = 0x9E37_79B9_7F4A_7C15;

/// Derive an independent stream for one agent so that update order never
/// changes what an agent draws.
pub fn derive_agent_rng(base_seed: u64, agent_id: u32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(
        base_seed.wrapping_add((agent_id as u64 + 1).wrapping_mul(AGENT_STREAM_PRIME)),
    )
}
