//! Turn-based dungeon crawl on a 10x10 grid.
//!
//! [`engine::Session`] resolves one [`engine::Command`] at a time against a
//! set of levels loaded from text files; the binary wraps it in a
//! `bracket-terminal` front end or a headless script runner.

pub mod ai;
pub mod config;
pub mod data;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod hall_of_fame;
pub mod level;
pub mod map;
pub mod render;
pub mod rng;
pub mod scripted_input;
pub mod storage;
