use std::sync::Arc;

use registry::Tables;
use tracing::info;

use crate::{
    allocator::{RedisCounterStore, SerialAllocator},
    config::Config,
    database::init_redis,
    members::{MemberStore, RedisMemberStore},
};

pub struct AppState {
    pub config: Config,
    pub tables: Tables,
    pub allocator: SerialAllocator,
    pub members: Arc<dyn MemberStore>,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let tables = match &config.tables_path {
            Some(path) => Tables::from_json_file(path).expect("Tables misconfigured!"),
            None => Tables::builtin(),
        };
        info!(
            "Loaded {} categories, {} regions",
            tables.category_count(),
            tables.region_count()
        );

        let connection = init_redis(&config.redis_url).await;

        let allocator = SerialAllocator::new(Arc::new(RedisCounterStore::new(connection.clone())));
        let members: Arc<dyn MemberStore> = Arc::new(RedisMemberStore::new(connection));

        Arc::new(Self {
            config,
            tables,
            allocator,
            members,
        })
    }
}
