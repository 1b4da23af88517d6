pub mod investment;
pub mod quote;
pub mod settings;
pub mod statistics;
pub mod sync;
