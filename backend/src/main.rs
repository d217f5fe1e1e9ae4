use actix_web::{web, App, HttpServer};
use dsc_report::config::AppConfig;
use dsc_report::docx::{PageRasterizer, PdfiumRasterizer};
use dsc_report::job_controller::{start_job_updater, JobsState};
use dsc_report::services;
use env_logger::Env;
use log::info;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = AppConfig::from_env();
    let url = config.url();

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new();

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        start_job_updater(updater_state, rx).await;
    });

    if !config.template_path.exists() {
        log::warn!(
            "Default template {} not found; requests must name a template",
            config.template_path.display()
        );
    }
    let rasterizer: Arc<dyn PageRasterizer> = Arc::new(PdfiumRasterizer);
    let rasterizer = web::Data::from(rasterizer);
    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    info!("Server running at {}", url);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(config.clone())
            .app_data(rasterizer.clone())
            .service(services::samples::configure_routes())
            .service(services::reports::configure_routes())
    })
        .bind(bind)?
        .run()
        .await
}
