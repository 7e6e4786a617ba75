//! App layer - central state management and command processing
//!
//! The App actor receives UI events and network responses,
//! updates state, and emits network commands and render state.

pub mod actor;
pub mod commands;
pub mod forms;
pub mod guard;
pub mod state;

pub use actor::AppActor;
pub use guard::AuthState;
pub use state::AppState;
