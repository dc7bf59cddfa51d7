//! Matchmaking state machine
//!
//! The controller owns the one [`MatchmakingSession`] and the tick timer's
//! handle. It never sleeps: whoever drives it (the lobby service, or a test)
//! calls [`LobbyController::tick`] once per period while
//! [`LobbyController::ticker`] reports a running timer.

use rand::rngs::StdRng;
use rand::Rng;
use std::fmt;
use tracing::{debug, info};

use crate::lobby::constants::{game, timing};
use crate::lobby::invite;
use crate::lobby::session::{MatchmakingSession, Phase};
use crate::lobby::snapshot::{LobbySimulator, LobbySnapshot};
use crate::net::transport::TransportStatus;

/// Operations that drive the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    StartSearch,
    InviteFriend,
    Cancel,
    Ready,
    Launch,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::StartSearch => "start_search",
            Operation::InviteFriend => "invite_friend",
            Operation::Cancel => "cancel",
            Operation::Ready => "ready",
            Operation::Launch => "launch",
        };
        f.write_str(name)
    }
}

/// Handle for the repeating tick timer
///
/// Each start gets a new generation so a driver can tell a restarted timer
/// from the one it is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ticker {
    Stopped,
    Running { generation: u64 },
}

impl Ticker {
    pub fn is_running(&self) -> bool {
        matches!(self, Ticker::Running { .. })
    }
}

/// Display updates pushed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyEvent {
    /// The session entered a new phase
    PhaseChanged(MatchmakingSession),
    /// One second elapsed in the current phase
    Tick(MatchmakingSession),
    /// The invited friend joined the waiting game
    FriendJoined(MatchmakingSession),
    /// The game should be opened at `url`
    Launched {
        session: MatchmakingSession,
        url: String,
    },
    /// Fresh lobby counters
    Snapshot(LobbySnapshot),
    /// Live transport state changed
    Transport(TransportStatus),
}

/// Lobby errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    #[error("cannot {operation} while {phase}")]
    InvalidTransition { phase: Phase, operation: Operation },
}

/// Owner of the matchmaking session and its timer
pub struct LobbyController<R: Rng = StdRng> {
    session: MatchmakingSession,
    ticker: Ticker,
    generation: u64,
    simulator: LobbySimulator<R>,
}

impl<R: Rng> LobbyController<R> {
    pub fn new(simulator: LobbySimulator<R>) -> Self {
        Self {
            session: MatchmakingSession::idle(),
            ticker: Ticker::Stopped,
            generation: 0,
            simulator,
        }
    }

    pub fn session(&self) -> &MatchmakingSession {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn ticker(&self) -> Ticker {
        self.ticker
    }

    pub fn simulator_mut(&mut self) -> &mut LobbySimulator<R> {
        &mut self.simulator
    }

    /// Begin looking for an opponent
    pub fn start_search(&mut self) -> Result<Vec<LobbyEvent>, LobbyError> {
        self.check(Operation::StartSearch, self.phase().can_start_search())?;

        self.session = MatchmakingSession::searching(timing::SEARCH_SECONDS);
        self.start_ticker();
        info!("Matchmaking search {} started", self.session.id);

        Ok(vec![LobbyEvent::PhaseChanged(self.session.clone())])
    }

    /// Host an invite game and wait for a friend to join it
    pub fn invite_friend(&mut self) -> Result<Vec<LobbyEvent>, LobbyError> {
        self.check(Operation::InviteFriend, self.phase().can_start_search())?;

        let game_id = invite::game_id(&mut self.simulator);
        self.session = MatchmakingSession::waiting_for_friend(game_id, timing::FRIEND_CHECK_SECONDS);
        self.start_ticker();
        info!("Waiting for a friend in game {}", self.invite_game_id());

        Ok(vec![LobbyEvent::PhaseChanged(self.session.clone())])
    }

    /// Game id of the current invite, if any
    pub fn invite_game_id(&self) -> &str {
        self.session
            .invite
            .as_ref()
            .map_or("", |invite| invite.game_id.as_str())
    }

    /// Advance the running timer by one period
    ///
    /// A no-op (no events) whenever the timer is stopped.
    pub fn tick(&mut self) -> Vec<LobbyEvent> {
        if !self.ticker.is_running() {
            return Vec::new();
        }

        let phase = self.phase();
        if !matches!(
            phase,
            Phase::Searching | Phase::WaitingForFriend | Phase::Countdown
        ) {
            self.stop_ticker();
            return Vec::new();
        }

        self.session.remaining_seconds = self.session.remaining_seconds.saturating_sub(1);
        debug!("{} tick: {}s remaining", phase, self.session.remaining_seconds);

        let mut events = vec![LobbyEvent::Tick(self.session.clone())];
        if self.session.remaining_seconds > 0 {
            return events;
        }

        match phase {
            Phase::WaitingForFriend if self.session.players() < game::PARTY_SIZE => {
                events.extend(self.check_for_friend());
            }
            Phase::Searching | Phase::WaitingForFriend => {
                events.push(self.enter_match_found());
            }
            _ => events.extend(self.enter_launched()),
        }

        events
    }

    /// Abandon the search or match and return to Idle
    pub fn cancel(&mut self) -> Result<Vec<LobbyEvent>, LobbyError> {
        self.check(Operation::Cancel, self.phase().is_cancellable())?;

        self.stop_ticker();
        self.session.phase = Phase::Cancelled;
        let cancelled = self.session.clone();
        info!("Matchmaking session {} cancelled", cancelled.id);

        self.session = MatchmakingSession::idle();

        Ok(vec![
            LobbyEvent::PhaseChanged(cancelled),
            LobbyEvent::PhaseChanged(self.session.clone()),
        ])
    }

    /// Accept the found match and start the countdown
    pub fn ready(&mut self) -> Result<Vec<LobbyEvent>, LobbyError> {
        self.check(Operation::Ready, self.phase() == Phase::MatchFound)?;

        self.session.phase = Phase::Countdown;
        self.session.remaining_seconds = timing::COUNTDOWN_SECONDS;
        self.start_ticker();

        Ok(vec![LobbyEvent::PhaseChanged(self.session.clone())])
    }

    /// Launch right away, skipping whatever countdown is left
    pub fn launch(&mut self) -> Result<Vec<LobbyEvent>, LobbyError> {
        self.check(Operation::Launch, self.phase().can_launch())?;
        Ok(self.enter_launched())
    }

    /// The one check for the invited friend; a no-show leaves the host waiting
    fn check_for_friend(&mut self) -> Vec<LobbyEvent> {
        if !self.simulator.friend_joins() {
            self.stop_ticker();
            info!("Nobody joined game {} yet", self.invite_game_id());
            return Vec::new();
        }

        if let Some(invite) = self.session.invite.as_mut() {
            invite.players = game::PARTY_SIZE;
        }
        self.session.remaining_seconds = timing::FRIEND_JOIN_DELAY_SECONDS;
        info!("Friend joined game {}", self.invite_game_id());

        vec![LobbyEvent::FriendJoined(self.session.clone())]
    }

    fn enter_match_found(&mut self) -> LobbyEvent {
        self.stop_ticker();
        let opponent = self.simulator.opponent();
        info!("Match found against {} (rank {})", opponent.name, opponent.rank);
        self.session.opponent = Some(opponent);
        self.session.phase = Phase::MatchFound;
        self.session.remaining_seconds = timing::COUNTDOWN_SECONDS;
        LobbyEvent::PhaseChanged(self.session.clone())
    }

    fn enter_launched(&mut self) -> Vec<LobbyEvent> {
        self.stop_ticker();
        self.session.phase = Phase::Launched;
        self.session.remaining_seconds = 0;
        info!(
            "Launching match against {}",
            self.session.opponent_name().unwrap_or("unknown")
        );

        vec![
            LobbyEvent::PhaseChanged(self.session.clone()),
            LobbyEvent::Launched {
                session: self.session.clone(),
                url: game::GAME_PATH.to_string(),
            },
        ]
    }

    fn check(&self, operation: Operation, allowed: bool) -> Result<(), LobbyError> {
        if allowed {
            Ok(())
        } else {
            Err(LobbyError::InvalidTransition {
                phase: self.phase(),
                operation,
            })
        }
    }

    fn start_ticker(&mut self) {
        // A new generation invalidates whatever timer was running before
        self.generation += 1;
        self.ticker = Ticker::Running {
            generation: self.generation,
        };
    }

    fn stop_ticker(&mut self) {
        self.ticker = Ticker::Stopped;
    }
}
