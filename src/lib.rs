// Biblioteca raíz del crate `calendario`.
// Importación de agendas de aulas desde planilla y API JSON de calendario.
pub mod config;
pub mod error;
pub mod models;
pub mod excel;
pub mod db;
pub mod import;
pub mod api_json;
pub mod server;

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
