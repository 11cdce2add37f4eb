// expecta/src/commands/mod.rs

pub mod docs;
pub mod init;
pub mod report;
pub mod run;
pub mod validate;
