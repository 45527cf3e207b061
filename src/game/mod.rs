//! Rules: scoring content, call handlers, settlement and the turn/call
//! state machine

pub mod action;
pub mod action_callback;
pub mod chi;
pub mod config;
pub mod constants;
pub mod content;
pub mod fu;
pub mod game_engine;
pub mod kan;
pub mod persistence;
pub mod player;
pub mod pon;
pub mod ready;
pub mod scoring;
pub mod settlement;
pub mod state;
pub mod yaku;
