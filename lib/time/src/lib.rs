#![cfg_attr(not(test), no_std)]

pub mod timespec;

pub use timespec::TimeSpec;
