//! # rf-outcome — Deterministic Reel Outcome Engine
//!
//! Turns strips, a window structure and a paytable into a fully recorded
//! game round. Every random choice goes through one [`DecisionGenerator`],
//! so a round can be replayed from its trace.
//!
//! ## Features
//!
//! - **Cell masks**: fixed-length boolean vectors as the common currency
//! - **Symbol windows**: per-symbol masks over cell populations
//! - **Decisions**: labelled, weighted, recorded draws over a seeded source
//! - **Strip replacements**: layered substitutions compiled into strips
//! - **Prize evaluation**: lines, ways, scatters, multipliers and cascades
//! - **Respins**: lock-and-hold state machine with frames and progressives
//! - **Cycles**: base game, free games and respins walked by [`play_round`]
//!
//! ## Architecture
//!
//! ```text
//! GameConfig (JSON / YAML)
//!     │ resolve()
//!     v
//! Paytable ──> ConfiguredGame (GameLogic)
//!                   │
//!                   v
//! play_round ──> strips ──> SymbolWindowResult ──> evaluate_* ──> CellPrizeResult
//!     │                          │
//!     │                          └── respin state machine
//!     └── rf-cycle (Cycles, CyclesModifier, Inputs)
//! ```

pub mod cascade;
pub mod config;
pub mod decision;
pub mod error;
pub mod evaluate;
pub mod game;
pub mod mask;
pub mod metrics;
pub mod multiplier;
pub mod pattern;
pub mod paytable;
pub mod prize;
pub mod replacement;
pub mod respin;
pub mod strip;
pub mod symbols;
pub mod window;

pub use cascade::*;
pub use config::*;
pub use decision::*;
pub use error::*;
pub use evaluate::*;
pub use game::*;
pub use mask::*;
pub use metrics::*;
pub use multiplier::*;
pub use pattern::*;
pub use paytable::*;
pub use prize::*;
pub use replacement::*;
pub use respin::*;
pub use strip::*;
pub use symbols::*;
pub use window::*;
