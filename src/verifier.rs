use serde::Serialize;
use utoipa::ToSchema;

use crate::rng::{GameRng, hash_seed};

const BATCH_SIZE: u64 = 100;

/// Result of independently replaying a completed game's draw stream.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResult {
    pub verified: bool,
    pub total_events: u64,
}

/// Replays exactly `expected_events` HMAC draws from `(server_seed,
/// client_seed, start_nonce)` in bounded batches, confirming every draw
/// lands in `[0, 1)` and that the revealed seed matches the hash published
/// at game creation. A caller holding only the published hash, the
/// revealed seed, and the event count can run this with no access to the
/// original game state.
pub fn verify(
    server_seed: &str,
    client_seed: &str,
    start_nonce: u64,
    expected_events: u64,
    published_hash: &str,
) -> VerifyResult {
    if hash_seed(server_seed) != published_hash {
        return VerifyResult {
            verified: false,
            total_events: 0,
        };
    }

    let mut rng = GameRng::new(server_seed, client_seed, start_nonce);
    let mut replayed = 0u64;

    while replayed < expected_events {
        let batch = BATCH_SIZE.min(expected_events - replayed);
        for _ in 0..batch {
            let draw = rng.random();
            if !(0.0..1.0).contains(&draw) {
                return VerifyResult {
                    verified: false,
                    total_events: replayed,
                };
            }
            replayed += 1;
        }
    }

    VerifyResult {
        verified: true,
        total_events: replayed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_matching_replay() {
        let server_seed = "the-server-seed";
        let hash = hash_seed(server_seed);
        let result = verify(server_seed, "client-seed", 0, 250, &hash);
        assert!(result.verified);
        assert_eq!(result.total_events, 250);
    }

    #[test]
    fn rejects_seed_hash_mismatch() {
        let result = verify("the-server-seed", "client-seed", 0, 250, "not-a-real-hash");
        assert!(!result.verified);
    }

    #[test]
    fn handles_batches_that_do_not_divide_evenly() {
        let server_seed = "seed";
        let hash = hash_seed(server_seed);
        let result = verify(server_seed, "client", 0, 233, &hash);
        assert!(result.verified);
        assert_eq!(result.total_events, 233);
    }
}
