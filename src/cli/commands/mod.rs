pub mod backport;
mod command_result;
pub mod helper;
pub mod init;
pub mod merge;
pub mod normalize;
pub mod update;
pub mod validate;

pub use command_result::*;
