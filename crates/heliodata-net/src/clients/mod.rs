//! Built-in archive clients.

pub mod ace;
pub mod bbso;
pub mod eve;
pub mod fermi_gbm;
pub mod goes;
pub mod kanzelhohe;
pub mod lyra;
pub mod norh;
