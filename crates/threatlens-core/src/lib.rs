//! ThreatLens Core Types and Definitions
//!
//! This crate provides the foundational types shared by the ThreatLens
//! parser and analysis pipeline. It includes:
//!
//! - **Entities**: Declared actors, systems and containers ([`entity::Entity`])
//! - **Edges**: Data-flow relationships with security attributes ([`edge::Edge`])
//! - **Threat labels**: Classifier outputs and ground truth ([`threat::ThreatLabel`])
//! - **Diagram**: The entity table and edge list of one run ([`diagram::Diagram`])
//! - **Features**: The fixed classifier schema and the normalizer ([`features`] module)

pub mod diagram;
pub mod edge;
pub mod entity;
pub mod features;
pub mod threat;
