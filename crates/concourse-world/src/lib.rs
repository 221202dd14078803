//! Concourse World -- the airport entities a scenario places on a grid.
//!
//! Scenario documents are read through `concourse-data`, every entity's
//! configuration is parsed by a `concourse-config` registry via its entity
//! ID, and the resulting [`Entity`] values are placed in a [`World`].
//!
//! # Key Types
//!
//! - [`World`] -- Bounded grid of entities keyed by [`EntityId`].
//! - [`Entity`] -- Door, wall, gate, or passenger spawner.
//! - [`ScenarioData`] -- Outer structure of a scenario document.
//! - [`WorldError`] -- Loading, parsing, and placement failures.

pub mod entity;
pub mod error;
pub mod scenario;
pub mod world;

pub use entity::{
    Door, Entity, Gate, PassengerSpawner, Position, Wall, airport_registry,
    register_airport_types,
};
pub use error::WorldError;
pub use scenario::{EntitySpec, ScenarioData, load_scenario, load_world};
pub use world::{EntityId, World};
