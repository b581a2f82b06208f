//! Game orchestration — stages, prize triggers and the round driver
//!
//! ## Architecture
//!
//! ```text
//! play_round
//!     │
//!     ├── GameLogic::execute_stage        (one cycle of one stage)
//!     ├── GameLogic::modify_result_post_cycle
//!     ├── Cycles::complete_current
//!     ├── GameLogic::process_triggers     (exits → cycle modifiers)
//!     └── GameLogic::create_inputs_for_cycle
//! ```
//!
//! [`ConfiguredGame`] is the data-driven [`GameLogic`] built from a
//! [`Paytable`](crate::paytable::Paytable).

mod configured;
mod logic;
mod round;
mod trigger;

pub use configured::*;
pub use logic::*;
pub use round::*;
pub use trigger::*;
