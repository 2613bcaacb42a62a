pub mod history;
pub mod journal;
pub mod profile;
pub mod project;
pub mod stamp;
pub mod store;
pub mod task;
pub mod unset;
