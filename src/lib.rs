//! scrimbot - Discord scrim recruitment bot using Twilight
//!
//! Core: a single-session recruitment state machine ([`session`]) and a pure
//! greedy team balancer ([`balance`]) over a ten-level skill ladder
//! ([`tier`]). Around it: a Twilight Discord adapter ([`discord`]), prefix
//! command parsing ([`commands`]), Prometheus metrics, and health endpoints.

pub mod balance;
pub mod commands;
pub mod config;
pub mod discord;
pub mod error;
pub mod health;
pub mod maps;
pub mod metrics;
pub mod session;
pub mod tier;
