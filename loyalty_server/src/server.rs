use std::time::Duration;

use accrual_client::AccrualApi;
use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use loyalty_engine::{AccountApi, AuthApi, OrderFlowApi, SqliteDatabase};

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    reconcile_worker::start_reconcile_worker,
    routes::{health, login, my_balance, my_orders, my_withdrawals, register, submit_order, withdraw},
};

/// Brings the whole gateway up: database (with migrations), the reconciliation worker, and the HTTP server. When
/// the server exits, the worker is shut down through its handshake before this function returns.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let accrual = AccrualApi::new(config.accrual.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let worker = start_reconcile_worker(db.clone(), accrual, config.reconcile.clone());

    let srv = create_server_instance(config, db)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));

    info!("🚀️ Server loop has exited. Shutting down the reconciliation worker");
    worker.stop().await;
    result
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let auth_api = AuthApi::new(db.clone());
        let token_issuer = TokenIssuer::new(&config.auth);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("lpg::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(token_issuer))
            .service(health)
            .service(
                web::scope("/api/user")
                    .route("/register", web::post().to(register::<SqliteDatabase>))
                    .route("/login", web::post().to(login::<SqliteDatabase>))
                    .service(
                        web::resource("/orders")
                            .route(web::post().to(submit_order::<SqliteDatabase>))
                            .route(web::get().to(my_orders::<SqliteDatabase>)),
                    )
                    .route("/balance", web::get().to(my_balance::<SqliteDatabase>))
                    .route("/balance/withdraw", web::post().to(withdraw::<SqliteDatabase>))
                    .route("/withdrawals", web::get().to(my_withdrawals::<SqliteDatabase>)),
            )
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
