//! Macro implementations

pub mod dao;
pub mod record;

pub use dao::expand_dao;
pub use record::derive_record;
