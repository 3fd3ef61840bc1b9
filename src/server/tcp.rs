//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Implementación del servidor TCP que maneja múltiples conexiones
//! simultáneas usando threads: el bucle de accept es mono-hilo y cada
//! conexión aceptada se atiende en su propio worker, que vive exactamente
//! un request. Los workers no comparten estado mutable; solo la
//! configuración de solo lectura viaja en un `Arc`.
//!
//! Los workers son threads sueltos (sin join): detener el servidor corta
//! el accept de conexiones nuevas y deja terminar las que están en vuelo.
//! Para producción haría falta acotar la concurrencia con un pool de
//! workers; ese límite queda fuera de este diseño.

use crate::config::Config;
use crate::handlers;
use crate::http::{ParseError, Request, Response};
use log::{debug, info, warn};
use std::io::{self, BufReader};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Servidor HTTP/1.0 concurrente
pub struct Server {
    config: Arc<Config>,
    listener: TcpListener,
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
}

/// Permite detener el bucle de accept desde otro thread
///
/// Apagar no cancela los workers en vuelo: solo impide conexiones nuevas.
#[derive(Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Detiene el bucle de accept
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        // Conexión de cortesía para desbloquear el accept pendiente
        let _ = TcpStream::connect(self.addr);
    }
}

impl Server {
    /// Abre el puerto de escucha con la configuración dada
    pub fn bind(config: Config) -> io::Result<Server> {
        let listener = TcpListener::bind(config.address())?;
        let mut local_addr = listener.local_addr()?;
        if local_addr.ip().is_unspecified() {
            // Dirección alcanzable para la conexión de cortesía del shutdown
            local_addr.set_ip(IpAddr::V4(Ipv4Addr::LOCALHOST));
        }

        Ok(Server {
            config: Arc::new(config),
            listener,
            local_addr,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Dirección real de escucha (útil con puerto 0 en tests)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Obtiene un handle para detener el servidor desde otro thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            running: Arc::clone(&self.running),
            addr: self.local_addr,
        }
    }

    /// Bucle principal: acepta conexiones y lanza un worker por cada una
    ///
    /// Bloquea hasta que un [`ShutdownHandle`] detenga el accept.
    pub fn run(&self) -> io::Result<()> {
        info!("Servidor escuchando en {}", self.local_addr);

        for stream in self.listener.incoming() {
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            match stream {
                Ok(stream) => {
                    let config = Arc::clone(&self.config);
                    let peer = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "desconocido".to_string());
                    debug!("Nueva conexión desde {}", peer);

                    thread::spawn(move || {
                        if let Err(e) = handle_connection(stream, &config) {
                            warn!("Error atendiendo a {}: {}", peer, e);
                        }
                    });
                }
                Err(e) => {
                    warn!("Error al aceptar conexión: {}", e);
                }
            }
        }

        info!("Servidor detenido");
        Ok(())
    }
}

/// Atiende una conexión completa: un request, una respuesta, cierre
///
/// El timeout de recepción acota a los clientes lentos tanto durante el
/// parseo como durante el relay del cuerpo de un POST. Los fallos de
/// parseo se clasifican aquí: recurso inexistente → 404, todo lo demás →
/// 400. La conexión se cierra al salir, pase lo que pase.
fn handle_connection(stream: TcpStream, config: &Config) -> io::Result<()> {
    stream.set_read_timeout(Some(Duration::from_secs(config.timeout_secs)))?;

    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    match Request::parse(&mut reader, &config.document_root, &config.default_document) {
        Ok(request) => {
            debug!("{} {}", request.method().as_str(), request.raw_url());
            handlers::handle(&request, &mut reader, &mut writer)
        }
        Err(e @ ParseError::FileNotFound(_)) => {
            debug!("{}", e);
            Response::not_found().send(&mut writer)
        }
        Err(e) => {
            debug!("Petición rechazada: {}", e);
            Response::bad_request().send(&mut writer)
        }
    }
}
