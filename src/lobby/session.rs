use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// Matchmaking phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing in progress
    Idle,
    /// Looking for an opponent
    Searching,
    /// Invite sent, waiting for the friend to join
    WaitingForFriend,
    /// Opponent found, waiting for the player to ready up
    MatchFound,
    /// Counting down to launch
    Countdown,
    /// Game launched (terminal until a new search)
    Launched,
    /// Momentary pass-through on the way back to Idle
    Cancelled,
}

impl Phase {
    /// Whether a running search/countdown can be cancelled from here
    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            Phase::Searching | Phase::WaitingForFriend | Phase::MatchFound | Phase::Countdown
        )
    }

    /// Whether a new search or invite may be started from here
    pub fn can_start_search(self) -> bool {
        matches!(self, Phase::Idle | Phase::Cancelled | Phase::Launched)
    }

    /// Whether the game may be launched from here
    ///
    /// Launching while waiting for a friend plays against the AI instead.
    pub fn can_launch(self) -> bool {
        matches!(
            self,
            Phase::WaitingForFriend | Phase::MatchFound | Phase::Countdown
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "Idle",
            Phase::Searching => "Searching",
            Phase::WaitingForFriend => "WaitingForFriend",
            Phase::MatchFound => "MatchFound",
            Phase::Countdown => "Countdown",
            Phase::Launched => "Launched",
            Phase::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

/// The matched opponent shown on the VS card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opponent {
    pub name: String,
    pub rank: u32,
}

/// An invite game the host is waiting in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendInvite {
    pub game_id: String,
    /// Players present, host included
    pub players: u32,
}

/// State of the single matchmaking session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchmakingSession {
    pub id: Uuid,
    pub phase: Phase,
    pub opponent: Option<Opponent>,
    pub invite: Option<FriendInvite>,
    pub remaining_seconds: u32,
    pub created_at: Instant,
}

impl MatchmakingSession {
    /// A fresh idle session
    pub fn idle() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Idle,
            opponent: None,
            invite: None,
            remaining_seconds: 0,
            created_at: Instant::now(),
        }
    }

    /// A new session that starts in Searching
    pub fn searching(seconds: u32) -> Self {
        Self {
            phase: Phase::Searching,
            remaining_seconds: seconds,
            ..Self::idle()
        }
    }

    /// A new session hosting invite game `game_id`, alone so far
    pub fn waiting_for_friend(game_id: String, seconds: u32) -> Self {
        Self {
            phase: Phase::WaitingForFriend,
            invite: Some(FriendInvite {
                game_id,
                players: 1,
            }),
            remaining_seconds: seconds,
            ..Self::idle()
        }
    }

    pub fn opponent_name(&self) -> Option<&str> {
        self.opponent.as_ref().map(|o| o.name.as_str())
    }

    /// Players in the invite game; 0 outside one
    pub fn players(&self) -> u32 {
        self.invite.as_ref().map_or(0, |i| i.players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_session() {
        let session = MatchmakingSession::idle();
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.remaining_seconds, 0);
        assert!(session.opponent_name().is_none());
        assert_eq!(session.players(), 0);
    }

    #[test]
    fn test_searching_session_has_new_id() {
        let a = MatchmakingSession::searching(15);
        let b = MatchmakingSession::searching(15);

        assert_eq!(a.phase, Phase::Searching);
        assert_eq!(a.remaining_seconds, 15);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_waiting_for_friend_session() {
        let session = MatchmakingSession::waiting_for_friend("Q1W2E3R4".to_string(), 5);

        assert_eq!(session.phase, Phase::WaitingForFriend);
        assert_eq!(session.remaining_seconds, 5);
        assert_eq!(session.players(), 1);
        assert_eq!(session.invite.unwrap().game_id, "Q1W2E3R4");
    }

    #[test]
    fn test_phase_predicates() {
        assert!(Phase::Searching.is_cancellable());
        assert!(Phase::WaitingForFriend.is_cancellable());
        assert!(Phase::Countdown.is_cancellable());
        assert!(!Phase::Idle.is_cancellable());
        assert!(!Phase::Launched.is_cancellable());

        assert!(Phase::MatchFound.can_launch());
        assert!(Phase::WaitingForFriend.can_launch());
        assert!(!Phase::Searching.can_launch());

        assert!(Phase::Cancelled.can_start_search());
        assert!(!Phase::Countdown.can_start_search());
        assert!(!Phase::WaitingForFriend.can_start_search());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::MatchFound.to_string(), "MatchFound");
        assert_eq!(Phase::WaitingForFriend.to_string(), "WaitingForFriend");
    }
}
