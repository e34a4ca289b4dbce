//! Cube Arena - round-robin tournaments between weight matrices for the
//! 4x4x4 tic-tac-toe engine.
//!
//! Every pair of matrices plays a fixed number of rounds with both move
//! orders. Each game is driven one move at a time through the external engine
//! executable, and the results are aggregated into per-pair and
//! tournament-wide statistics.
//!
//! # Modules
//!
//! - [`engine_client`] - One-shot engine process client and the [`engine_client::MoveEngine`] seam
//! - [`game_runner`] - Drives a single game to completion and decides the winner
//! - [`weight_matrix`] - Labeled weight vectors that compete
//! - [`tournament_config`] - Roster loading and validation
//! - [`matchup`] - Per-pair statistics
//! - [`report`] - Tournament-wide rankings and metrics
//! - [`manager`] - The round-robin orchestrator
//! - [`progress`] - Progress snapshots for a running tournament
//! - [`config`] - `arena.toml` settings
//! - [`json_output`], [`csv_output`], [`text_output`], [`export`] - Report writers

pub mod config;
pub mod csv_output;
pub mod engine_client;
pub mod export;
pub mod game_runner;
pub mod json_output;
pub mod manager;
pub mod matchup;
pub mod progress;
pub mod report;
pub mod text_output;
pub mod tournament_config;
pub mod weight_matrix;

#[cfg(test)]
mod testing;
