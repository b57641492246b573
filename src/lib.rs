pub mod api;
pub mod args;
pub mod db;
pub mod error;
pub mod leaderboard;
pub mod logging;
pub mod stats;
pub mod teams;
