pub mod content;
pub mod decks;
pub mod leaderboard;
pub mod players;
pub mod runs;
