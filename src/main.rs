use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;

use medialib::config::AppConfig;
use medialib::db::{get_conn, init_pool, run_migrations};
use medialib::file_store::FileStore;
use medialib::middleware::session_middleware::SessionMiddleware;
use medialib::services::{media_service, session_service, user_service};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let pool = init_pool(&config.database_url, config.db_pool_size)?;
    let store = FileStore::open(&config.media_dir)
        .with_context(|| format!("cannot open media directory {}", config.media_dir.display()))?;

    {
        let mut conn = get_conn(&pool)?;
        run_migrations(&mut conn)?;
        user_service::ensure_admin(
            &mut conn,
            &config.admin_username,
            &config.admin_password,
            config.bcrypt_cost,
        )?;
        let purged = session_service::purge_expired(&mut conn)?;
        if purged > 0 {
            log::info!("purged {} expired session(s)", purged);
        }
        let report = media_service::reconcile(&mut conn, &store)?;
        log::info!(
            "media store reconciled: {} orphan file(s) quarantined, {} row(s) missing files",
            report.orphan_files_quarantined.len(),
            report.rows_missing_files.len()
        );
    }

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server on {}:{}", bind.0, bind.1);

    let pool_data = web::Data::new(pool);
    let store_data = web::Data::new(store);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(store_data.clone())
            .app_data(config_data.clone())
            .wrap(SessionMiddleware)
            .wrap(Logger::default())
            .configure(medialib::configure_app)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
