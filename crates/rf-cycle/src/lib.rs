//! # rf-cycle — Game cycle state machine
//!
//! Models the ordered queue of game cycles (base game, free games, respins)
//! that one game round walks through, and the pieces that move a round from
//! one cycle to the next.
//!
//! ## Architecture
//!
//! ```text
//! Cycles (ordered queue of CycleState)
//!     │
//!     ├── CyclesModifier (Trigger / Retrigger / RespinReset)
//!     ├── StageConnection (InitialStage, ExitName) → FinalStage
//!     └── Inputs (Variable × Lifespan), carried between cycles
//! ```
//!
//! Nothing in this crate draws random numbers or evaluates prizes. It is the
//! bookkeeping layer the outcome engine drives.

pub mod cycle;
pub mod error;
pub mod modifier;
pub mod orchestrate;
pub mod stage;
pub mod variable;

pub use cycle::*;
pub use error::*;
pub use modifier::*;
pub use orchestrate::*;
pub use stage::*;
pub use variable::*;
