mod common;
mod memory;
mod permissions;
