//! Lobby statistics and the seedable simulator that fakes them
//!
//! Every piece of synthetic lobby data (counters, opponents, invite codes)
//! comes from one [`LobbySimulator`] so tests can pin the sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::lobby::constants::simulation;
use crate::lobby::session::Opponent;

/// Where a snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    Live,
    Simulated,
}

/// Point-in-time read of aggregate lobby counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbySnapshot {
    pub online_count: u32,
    pub waiting_count: u32,
    pub active_matches: u32,
    pub source: SnapshotSource,
}

impl LobbySnapshot {
    pub fn live(online_count: u32, waiting_count: u32, active_matches: u32) -> Self {
        Self {
            online_count,
            waiting_count,
            active_matches,
            source: SnapshotSource::Live,
        }
    }
}

/// Random source for all synthesized lobby data
pub struct LobbySimulator<R: Rng = StdRng> {
    rng: R,
}

impl LobbySimulator<StdRng> {
    /// Simulator seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic simulator
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> LobbySimulator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Synthesize a lobby snapshot within the simulation ranges
    pub fn snapshot(&mut self) -> LobbySnapshot {
        LobbySnapshot {
            online_count: self.rng.gen_range(simulation::ONLINE_RANGE),
            waiting_count: self.rng.gen_range(simulation::WAITING_RANGE),
            active_matches: self.rng.gen_range(simulation::ACTIVE_MATCHES_RANGE),
            source: SnapshotSource::Simulated,
        }
    }

    /// Generate a matched opponent, e.g. `Gunslinger_417`
    pub fn opponent(&mut self) -> Opponent {
        let suffix = self.rng.gen_range(simulation::OPPONENT_SUFFIX_RANGE);
        Opponent {
            name: format!("{}{}", simulation::OPPONENT_PREFIX, suffix),
            rank: self.rng.gen_range(simulation::OPPONENT_RANK_RANGE),
        }
    }

    /// Uppercase base-36 string of `len` characters
    pub fn code(&mut self, len: usize) -> String {
        const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        (0..len)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }

    /// Whether an invited friend has turned up
    pub fn friend_joins(&mut self) -> bool {
        self.rng.gen_bool(simulation::FRIEND_JOIN_PROBABILITY)
    }
}
