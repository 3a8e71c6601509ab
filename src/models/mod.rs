//! Data models for the cost-estimation backend's wire shapes.
//!
//! This module contains the structures exchanged with the REST API:
//!
//! - `Country`, `MachineType`, `Make`, `ModelSize`: reference data
//! - `ItemMaster`: the part being costed
//! - `ProcessFlow`: per-item operation sequence
//! - `MachineRate`: per-machine hourly rate rows with derived figures
//! - `CostAggregate`, `FinalCost`, `AdditionalCosts`: cost rollups

pub mod cost;
pub mod country;
pub mod item_master;
pub mod machine;
pub mod process_flow;

pub use cost::{AdditionalCosts, CostAggregate, FinalCost, NewCostAggregate};
pub use country::{Country, NewCountry};
pub use item_master::{ItemMaster, ItemMasterRef};
pub use machine::{
    MachineRate, MachineRateEdit, MachineType, Make, ModelSize, NewMachineRate, NewMachineType,
    NewMake, NewModelSize,
};
pub use process_flow::{NewProcessFlow, ProcessFlow};
