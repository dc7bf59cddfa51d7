//! Private rooms and invite links for the external game

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::Rng;

use crate::lobby::constants::game;
use crate::lobby::snapshot::LobbySimulator;

/// What `encodeURIComponent` escapes: everything but alphanumerics and `-_.!~*'()`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Six-character room code, e.g. `K3Z9QA`
pub fn room_code<R: Rng>(simulator: &mut LobbySimulator<R>) -> String {
    simulator.code(game::ROOM_CODE_LEN)
}

/// Eight-character game id used in invite links
pub fn game_id<R: Rng>(simulator: &mut LobbySimulator<R>) -> String {
    simulator.code(game::GAME_ID_LEN)
}

/// Launch URL for a private room
pub fn private_room_url(code: &str, name: &str) -> String {
    let name = name.trim();
    let name = if name.is_empty() {
        game::DEFAULT_ROOM_NAME
    } else {
        name
    };
    format!(
        "{}?room={}&name={}",
        game::GAME_PATH,
        percent_encode(code),
        percent_encode(name)
    )
}

/// Shareable invite link for `game_id` under `origin` (no trailing slash needed)
pub fn invite_url(origin: &str, game_id: &str) -> String {
    format!(
        "{}{}?invite={}",
        origin.trim_end_matches('/'),
        game::GAME_PATH,
        percent_encode(game_id)
    )
}

fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}
