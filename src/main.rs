//! # miniweb - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor HTTP/1.0: inicializa el logging, carga y
//! valida la configuración, abre el puerto y engancha SIGINT/SIGTERM al
//! apagado ordenado antes de entrar al bucle de accept.

use log::{error, info};
use miniweb::config::Config;
use miniweb::server::Server;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::process::exit;
use std::thread;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=================================");
    println!("  miniweb HTTP/1.0");
    println!("=================================\n");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Error cargando la configuración: {}", e);
            exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuración inválida: {}", e);
        exit(1);
    }

    info!("Raíz de documentos: {}", config.document_root.display());
    info!("Documento por defecto: {}", config.default_document);

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            error!("No se pudo abrir el puerto: {}", e);
            exit(1);
        }
    };

    // SIGINT/SIGTERM detienen el accept; las conexiones en vuelo terminan solas
    let handle = server.shutdown_handle();
    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(signals) => signals,
        Err(e) => {
            error!("No se pudieron registrar las señales: {}", e);
            exit(1);
        }
    };
    thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            info!("Señal recibida: {}", signal);
            handle.shutdown();
        }
    });

    if let Err(e) = server.run() {
        error!("Error fatal: {}", e);
        exit(1);
    }
}
