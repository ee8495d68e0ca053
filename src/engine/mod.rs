//! The deterministic play-by-play simulation engine. `simulate` is the
//! single entry point; the rest of the module tree is its supporting
//! state machine, split the way `mock/simulation/` splits state, clock,
//! drives, and play resolution into separate files.

pub mod clock;
pub mod drives;
pub mod events;
pub mod narrative;
pub mod simulate;
pub mod state;

pub use events::GameEvent;
pub use simulate::{simulate, BoxScore, GameConfig, SimulationResult};
pub use state::{GameState, Quarter};
