pub mod config;
pub mod counter;
pub mod mailbox;
pub mod pose;
pub mod receiver;
pub mod session;
