pub mod postgres;
pub mod redis;

pub use self::postgres::create_pool;
pub use self::redis::create_redis_manager;
