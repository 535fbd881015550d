//! Society Sim - chunk-streamed agent society simulation

pub mod command;
pub mod core;
pub mod decision;
pub mod entity;
pub mod llm;
pub mod simulation;
pub mod spatial;
pub mod world;
