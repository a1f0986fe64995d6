//! Leaderboard client for Mosweeper.
//!
//! Validates and submits won games to a remote score endpoint, fetches daily and all-time
//! rankings, and keeps a leaderboard panel fresh while it is on screen.

pub use client::*;
pub use config::*;
pub use endpoint::*;
pub use error::*;
pub use pages::*;
pub use ranking::*;
pub use refresh::*;
pub use session::*;
pub use validate::*;
pub use view::*;

mod client;
mod config;
mod endpoint;
mod error;
mod pages;
mod ranking;
mod refresh;
mod session;
mod validate;
mod view;
