#![cfg_attr(not(test), no_std)]

pub mod inode;
pub mod irq;
pub mod time;
pub mod vfs;
