// --- Calendario de aulas - Archivo principal ---

use calendario::config::AppConfig;
use calendario::run_server;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuración inválida: {}", e);
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt().with_max_level(config.log_level).init();

    info!("=== Calendario de aulas (API) ===");
    if config.api_tokens.is_empty() {
        warn!("CALENDARIO_API_TOKENS vacío: la API queda abierta (usuario 'anonymous')");
    }
    info!("Iniciando servidor en http://{}", config.bind);

    let res = run_server(config).await;
    if let Err(e) = &res {
        error!(error = %e, "el servidor terminó con error");
    }
    res
}
