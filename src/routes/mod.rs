pub mod evaluate;
pub mod health;
pub mod sessions;
