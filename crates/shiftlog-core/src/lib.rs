pub mod backup;
pub mod goal;
pub mod progress;
pub mod record;
pub mod stats;
pub mod store;
pub mod time;
