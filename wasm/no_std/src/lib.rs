#![no_std]

pub use blsplit;
