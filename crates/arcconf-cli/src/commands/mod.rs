pub mod apply;
pub mod context;
pub mod diff;
pub mod history;
pub mod init;
pub mod schema;
pub mod show;
