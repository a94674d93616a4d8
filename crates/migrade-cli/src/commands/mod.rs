pub mod init;
pub mod parse;
pub mod plan;

pub use init::cmd_init;
pub use parse::cmd_parse;
pub use plan::cmd_plan;
