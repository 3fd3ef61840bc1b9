//! # Handler de Archivos Estáticos
//! src/handlers/static_files.rs
//!
//! Abre el archivo resuelto y lo transmite completo al cliente. No hay
//! contenido parcial ni peticiones condicionales: un archivo, una
//! respuesta, una conexión.

use crate::http::{Request, Response};
use log::debug;
use std::fs::File;
use std::io::{self, Write};

/// Sirve el archivo de `request.path()` por el writer
///
/// Si el archivo no puede abrirse se responde el 404 enlatado: cubre la
/// carrera entre el stat del parseo y el open de aquí (el archivo pudo
/// borrarse en medio) y se trata como un not-found ordinario.
pub fn serve<W: Write>(request: &Request, writer: &mut W) -> io::Result<()> {
    let mut file = match File::open(request.path()) {
        Ok(file) => file,
        Err(e) => {
            debug!("No se pudo abrir {}: {}", request.path().display(), e);
            return Response::not_found().send(writer);
        }
    };

    let length = match file.metadata() {
        Ok(meta) => meta.len(),
        Err(_) => return Response::server_error().send(writer),
    };

    let response = Response::ok().with_header("Content-Length", &length.to_string());
    response.send_head(writer)?;
    io::copy(&mut file, writer)?;
    writer.flush()
}
