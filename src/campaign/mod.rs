// SPDX-License-Identifier: MIT

//! Marketing campaign domain: tools, agents, scorers and the promotion workflow

pub mod app;
pub mod backend;
pub mod config;
pub mod definitions;
pub mod factory;
pub mod registry;
pub mod scorers;
pub mod server;
pub mod tools;
pub mod workflow;
