pub mod chat;
pub mod join;
