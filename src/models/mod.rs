pub mod profile;
pub mod photo;
pub mod comment;
pub mod friendship;
pub mod quest;
pub mod top_species;
pub mod leaderboard;
