#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod file;
pub mod inode;
pub mod inoid;
pub mod stat;
