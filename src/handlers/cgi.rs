//! # Orquestador de Procesos CGI
//! src/handlers/cgi.rs
//!
//! Ejecuta el recurso resuelto como un proceso hijo con stdin/stdout
//! redirigidos por pipes y le inyecta los metadatos del protocolo como
//! variables de entorno:
//!
//! - `REQUEST_METHOD` siempre
//! - `QUERY_STRING` en GET
//! - `CONTENT_LENGTH` en POST (el cuerpo llega por el stdin del hijo)
//!
//! El relay es secuencial: primero el cuerpo del POST hacia el hijo, luego
//! la salida del hijo hacia el cliente. La línea de estado `200 OK` se
//! emite antes de inspeccionar la salida del script, así que un script no
//! puede cambiar el código de estado; es una restricción de diseño fija,
//! no un bug a corregir. La salida del script se reenvía tal cual una vez
//! visto el delimitador de cabeceras (`\r\n\r\n` o `\n\n`); si el script
//! termina sin emitirlo, se sintetiza un bloque mínimo para que el cliente
//! reciba siempre una respuesta estructuralmente válida.

use crate::http::{Method, Request, Response};
use log::{debug, warn};
use std::io::{self, BufRead, Read, Write};
use std::process::{Command, Stdio};

/// Cabeceras mínimas cuando el script no emite las suyas
const DEFAULT_CGI_HEADERS: &[u8] = b"Content-Type: text/html\r\n\r\n";

/// Ejecuta `request.path()` como CGI y retransmite su salida al cliente
///
/// El reader es el stream del cliente posicionado al inicio del cuerpo;
/// para un POST se copian exactamente `Content-Length` bytes hacia el
/// hijo, ni uno más. Los fallos previos al spawn (Content-Length ausente,
/// proceso imposible de crear) producen una respuesta limpia; después de
/// la línea de estado solo queda truncar.
pub fn execute<R: BufRead, W: Write>(
    request: &Request,
    reader: &mut R,
    writer: &mut W,
) -> io::Result<()> {
    // Precondición POST: Content-Length numérico y positivo, verificado
    // antes de crear pipe o proceso alguno.
    let content_length = match request.method() {
        Method::POST => match request.content_length() {
            Some(n) if n > 0 => Some(n),
            _ => {
                debug!("POST sin Content-Length válido para {}", request.path().display());
                return Response::bad_request().send(writer);
            }
        },
        Method::GET => None,
    };

    let mut command = Command::new(request.path());
    command
        .env("REQUEST_METHOD", request.method().as_str())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped());

    match content_length {
        Some(n) => {
            command.env("CONTENT_LENGTH", n.to_string());
        }
        None => {
            command.env("QUERY_STRING", request.query_string());
        }
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!("No se pudo ejecutar {}: {}", request.path().display(), e);
            return Response::server_error().send(writer);
        }
    };

    // Relay del cuerpo: byte a byte del cliente al stdin del hijo. Cerrar
    // el stdin (drop) le hace ver EOF aunque no haya habido cuerpo. Un
    // hijo que muere sin leer su stdin rompe el pipe; su salida parcial
    // se retransmite igual.
    if let Some(mut stdin) = child.stdin.take() {
        if let Some(n) = content_length {
            let mut body = Read::take(&mut *reader, n);
            if let Err(e) = io::copy(&mut body, &mut stdin) {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(e);
                }
            }
        }
    }

    // La línea de estado sale antes de leer nada del hijo.
    writer.write_all(b"HTTP/1.0 200 OK\r\n")?;

    if let Some(stdout) = child.stdout.take() {
        relay_output(stdout, writer)?;
    }

    // Cosechar el hijo evita zombies; su código de salida no se usa.
    child.wait()?;
    Ok(())
}

/// Retransmite la salida del hijo separando cabeceras de cuerpo
///
/// Acumula hasta ver el delimitador de fin de cabeceras y a partir de ahí
/// reenvía todo tal cual. Sin delimitador, la salida completa se trata
/// como cuerpo precedido por cabeceras sintetizadas.
fn relay_output<R: Read, W: Write>(mut output: R, writer: &mut W) -> io::Result<()> {
    let mut buffered = Vec::new();
    let mut chunk = [0u8; 512];

    loop {
        let n = output.read(&mut chunk)?;
        if n == 0 {
            // El script terminó sin delimitador
            writer.write_all(DEFAULT_CGI_HEADERS)?;
            writer.write_all(&buffered)?;
            return writer.flush();
        }

        buffered.extend_from_slice(&chunk[..n]);
        if find_header_end(&buffered).is_some() {
            writer.write_all(&buffered)?;
            io::copy(&mut output, writer)?;
            return writer.flush();
        }
    }
}

/// Busca el fin del bloque de cabeceras: `\r\n\r\n` o `\n\n`
///
/// Retorna el índice del primer byte posterior al delimitador.
fn find_header_end(buf: &[u8]) -> Option<usize> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4);
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|i| i + 2);
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
