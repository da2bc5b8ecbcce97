//! Feed-forward controllers decoded from genotypes.
//!
//! [`FeedForwardNetwork`] turns a flat parameter vector plus a layer-width
//! topology into a pure input-to-output decision function. [`Agent`] couples
//! one genotype to one decoded network for the duration of a generation and
//! tracks whether the agent is still alive.

pub mod agent;
pub mod network;

pub use self::{
    agent::Agent,
    network::{FeedForwardNetwork, ParameterCountError, parameter_count},
};
