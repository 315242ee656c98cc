mod analysis;
mod app;
mod capture;
mod commands;
mod config;
mod lifecycle;
mod logging;
mod setup;
mod ui;
mod visual;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = app::run().await {
        tracing::error!("Fatal error: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
