pub mod pool;
pub mod sessions;

pub use pool::create_pool;
