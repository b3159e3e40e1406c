//! Inbound adapters. Only HTTP for now.

pub mod rest;
