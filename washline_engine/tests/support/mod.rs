#![allow(dead_code)]
//! Shared scaffolding for the integration tests. Each test binary pulls in what it needs.

pub mod prepare_env;
pub mod publishers;
pub mod seed;
