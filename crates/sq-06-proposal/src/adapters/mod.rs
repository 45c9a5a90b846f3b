//! Adapters implementing the outbound ports.

pub mod state_machine;

pub use state_machine::EstimatingStateMachine;
