use actix_cors::Cors;
use actix_web::http::header;
use actix_web::web::{Data, scope};
use actix_web::{App, HttpServer};
use bts_monitoring::auth::AuthMiddleware;
use bts_monitoring::db::init_db;
use bts_monitoring::migration::{Migrator, MigratorTrait};
use bts_monitoring::telemetry::{get_subscriber, init_subscriber};
use bts_monitoring::api;
use dotenv::dotenv;
use tracing_log::log::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber(
        "bts_monitoring".into(),
        "info,sqlx=warn".into(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    dotenv().ok();

    let db = init_db().await?;
    info!("running database migrations...");
    Migrator::up(&db, None).await?;
    info!("migrations complete");

    let db_data = Data::new(db);

    info!("server starting: http://127.0.0.1:8080");
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .service(api::health_check)
            .service(api::login)
            .service(api::logout)
            .service(
                scope("/api")
                    .wrap(AuthMiddleware)
                    .service(api::get_profile)
                    .service(api::list_users)
                    .service(api::create_user)
                    .service(api::list_teams)
                    .service(api::list_regions)
                    .service(api::list_sites)
                    .service(api::create_site)
                    .service(api::get_site)
                    .service(api::update_site)
                    .service(api::delete_site)
                    .service(api::list_alarms)
                    .service(api::create_alarm)
                    .service(api::acknowledge_alarm)
                    .service(api::resolve_alarm)
                    .service(api::get_alarm)
                    .service(api::update_alarm)
                    .service(api::delete_alarm)
                    // stats before {id} so "stats" never parses as an id
                    .service(api::ticket_stats)
                    .service(api::list_tickets)
                    .service(api::create_ticket)
                    .service(api::add_ticket_comment)
                    .service(api::assign_ticket)
                    .service(api::add_ticket_attachment)
                    .service(api::get_ticket)
                    .service(api::update_ticket)
                    .service(api::delete_ticket)
                    .service(api::dashboard_stats),
            )
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await?;

    Ok(())
}
