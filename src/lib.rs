pub mod cli;
pub mod commands;
pub mod hmm;
pub mod utils;
