use std::net::SocketAddr;

use clap::Parser;
use sortsheet_web::build_router;
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
#[command(
    name = "sortsheet-web",
    version,
    about = "Serve an upload page that sorts workbooks by column E."
)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8501")]
    bind: SocketAddr,

    /// Maximum upload size in megabytes.
    #[arg(long, default_value_t = 50)]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let app = build_router(args.max_upload_mb.saturating_mul(1024 * 1024));
    let listener = TcpListener::bind(args.bind).await?;
    log::info!(
        "Listening on http://{} (max upload {} MB)",
        listener.local_addr()?,
        args.max_upload_mb
    );
    axum::serve(listener, app).await?;

    Ok(())
}
