//! Short URL-safe random identifiers: 5 chars for games (human-shareable),
//! 21 chars for everything else.

use rand::Rng;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const GAME_ID_LEN: usize = 5;
pub const ENTITY_ID_LEN: usize = 21;

fn nano_id(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

pub fn game_id() -> String {
    nano_id(GAME_ID_LEN)
}

pub fn entity_id() -> String {
    nano_id(ENTITY_ID_LEN)
}

/// Random lowercase letter used to seed `last_word` on a fresh game.
pub fn seed_letter() -> String {
    let mut rng = rand::rng();
    let letter = b'a' + rng.random_range(0..26u8);
    (letter as char).to_string()
}
