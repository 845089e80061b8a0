// SPDX-License-Identifier: MIT

//! Agent development kit: the domain-independent building blocks

pub mod agent;
pub mod error;
pub mod model;
pub mod run;
pub mod scorer;
pub mod tool;
pub mod workflow;
