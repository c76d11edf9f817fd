//! Board support shared by the STM32F4 Discovery peripheral demos
//!
//! The protocol state machines and register arithmetic live in
//! `peripheral-core`; this crate owns the silicon.

#![no_std]

pub mod hardware;
