/// Matchmaking phase timings
pub mod timing {
    use std::time::Duration;

    /// Seconds spent in Searching before a match is found
    pub const SEARCH_SECONDS: u32 = 15;
    /// Seconds of countdown after the player is ready
    pub const COUNTDOWN_SECONDS: u32 = 10;
    /// Period of the matchmaking tick
    pub const TICK_PERIOD: Duration = Duration::from_secs(1);
    /// Seconds after an invite before checking whether the friend showed up
    pub const FRIEND_CHECK_SECONDS: u32 = 5;
    /// Seconds between the friend joining and the match being shown
    pub const FRIEND_JOIN_DELAY_SECONDS: u32 = 1;
}

/// Lobby statistics feed cadence
pub mod feed {
    use std::time::Duration;

    /// Live statistics are requested at this interval
    pub const LIVE_POLL_INTERVAL: Duration = Duration::from_secs(5);
    /// Simulated statistics are regenerated at this interval
    pub const SIMULATED_POLL_INTERVAL: Duration = Duration::from_secs(3);
    /// How long to wait for the external service to greet us
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
}

/// Ranges for synthesized lobby data (half-open)
pub mod simulation {
    use std::ops::Range;

    pub const ONLINE_RANGE: Range<u32> = 5..25;
    pub const WAITING_RANGE: Range<u32> = 0..6;
    pub const ACTIVE_MATCHES_RANGE: Range<u32> = 2..7;
    /// Three-digit opponent suffix
    pub const OPPONENT_SUFFIX_RANGE: Range<u32> = 100..1000;
    pub const OPPONENT_RANK_RANGE: Range<u32> = 1..51;
    pub const OPPONENT_PREFIX: &str = "Gunslinger_";
    /// Chance that an invited friend turns up at the check
    pub const FRIEND_JOIN_PROBABILITY: f64 = 0.3;
}

/// Paths and defaults used by invites and launches
pub mod game {
    /// URL path the external game is served under
    pub const GAME_PATH: &str = "/cowboy-game/";
    pub const DEFAULT_ROOM_NAME: &str = "Private Room";
    pub const ROOM_CODE_LEN: usize = 6;
    pub const GAME_ID_LEN: usize = 8;
    /// Players in an invite game, host included
    pub const PARTY_SIZE: u32 = 2;
}
