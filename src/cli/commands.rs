//! # Commands Module / 命令模块
//!
//! One module per subcommand.
//!
//! 每个子命令对应一个模块。

pub mod init;
pub mod run;
