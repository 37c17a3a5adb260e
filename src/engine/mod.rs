//! Decision logic kept free of I/O so it can be tested without a database:
//! leaderboard ranking, quest lifecycle and voting rules, and the
//! top-photo/dex-visibility invariant.

pub mod collection;
pub mod quest;
pub mod ranking;
