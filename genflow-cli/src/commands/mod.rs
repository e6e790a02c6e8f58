pub mod describe;
pub mod flow;
