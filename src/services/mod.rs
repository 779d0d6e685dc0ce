pub mod content;
pub mod decks;
pub mod ingest;
pub mod leaderboard;
pub mod players;
