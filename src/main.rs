use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use lectern::application::services::SessionController;
use lectern::infrastructure::llm::ChatClientFactory;
use lectern::infrastructure::observability::{TracingConfig, init_tracing};
use lectern::infrastructure::rendering::PdfiumRenderer;
use lectern::presentation::{AppState, Environment, ScaffoldConfig, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load configuration")?;

    let mut tracing_config = TracingConfig::default().with_level(&settings.logging.level);
    tracing_config.environment = environment.as_str().to_string();
    tracing_config.json_format |= settings.logging.enable_json;
    init_tracing(&tracing_config);

    let scaffold_config = ScaffoldConfig::from_env();
    let chat_client = ChatClientFactory::create(&settings.llm, &scaffold_config)
        .context("Failed to create chat client")?;

    let renderer = Arc::new(match settings.viewer.pdfium_library_dir.as_deref() {
        Some(dir) => PdfiumRenderer::with_library_dir(dir),
        None => PdfiumRenderer::new(),
    });

    let session = SessionController::new(
        renderer,
        chat_client,
        settings.viewer.max_extracted_pages,
    );

    let state = AppState {
        session,
        viewer: settings.viewer.clone(),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!(%addr, provider = ?settings.llm.provider, "Listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
