//! Contract model for the vaults.fyi documentation conformance harness.
//!
//! Holds the documented facts about the Python SDK, the documented local
//! workflow model, and the outcome types every checker reports with.
//! Nothing in this crate spawns processes.

pub mod api;
pub mod catalog;
pub mod error;
pub mod networks;
pub mod paths;
pub mod types;
pub mod workflow;

pub use api::ApiConfig;
pub use error::{ProtocolError, Result};
pub use networks::{
    resolve_supported_networks, validate_network, NetworkList, NetworkLookup, NetworkSource,
    NoLookup,
};
pub use types::{
    CallShape, ContractFact, Expectation, FactKind, OutcomeStatus, SuiteResult, TestOutcome,
};
pub use workflow::{
    EnvPart, LayoutEntry, Postcondition, Program, Scenario, StepAction, WorkflowStep,
};
