//! Registered players

/// One registered player
///
/// Created when an input slot joins during registration and dropped by
/// the session reset. The character link is an index into the session's
/// fixed character array.
#[derive(Debug, Clone)]
pub struct Player {
    /// Input slot the player registered from
    pub slot: usize,
    /// Index of the character this player controls
    pub character: usize,
    /// Remaining health
    pub health: i32,
}

impl Player {
    pub fn new(slot: usize, character: usize, health: i32) -> Self {
        Self {
            slot,
            character,
            health,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}
