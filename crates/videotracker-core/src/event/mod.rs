//! Telemetry actions and their attribute bags
//!
//! This module contains the values that flow out of a tracker:
//! - Action vocabulary and event types ([`action`])
//! - Attribute values, bags, and action filters ([`attributes`])
//! - Pre-send observers and downstream sinks ([`sink`])

pub mod action;
pub mod attributes;
pub mod sink;
