//! Data module: primary matrix and per-axis tables
#![warn(missing_docs)]

pub mod frame;
pub mod matrix;
pub mod storage;

pub use frame::{Column, Frame};
pub use matrix::Matrix;
pub use storage::{Storage, VecStorage};
