#![no_std]

pub mod ipcc;
mod pwr;
pub mod tl_mbox;
pub mod transport;
mod unsafe_linked_list;
