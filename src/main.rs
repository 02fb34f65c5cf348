use clap::Parser;
use tracing::info;

use crate::{
    config::StartArgs, hierarchy::db::HierarchyDb, state::Catalog, topic::db::TopicDb,
};

pub mod config;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod router;
pub mod state;
pub mod topic;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let StartArgs {
        address: host,
        port,
        log_level: level,
    } = StartArgs::parse();

    tracing_subscriber::fmt().with_max_level(level).init();

    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let db_pool = db::create_pool(&db_url).await;

    db::migrate(&db_pool).await;

    let addr = format!("{host}:{port}");

    let hierarchy = HierarchyDb::new(db_pool.clone());
    let topics = TopicDb::new(db_pool);

    let state = Catalog::new(hierarchy, topics);

    info!("Now listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("error while starting TCP listener");

    let router = router::router(state);

    axum::serve(listener, router)
        .await
        .expect("error while starting server");
}
