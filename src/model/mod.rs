pub mod session;
pub mod status;
pub mod tree;
