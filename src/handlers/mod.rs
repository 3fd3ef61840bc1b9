//! # Handlers de Peticiones
//! src/handlers/mod.rs
//!
//! Este módulo decide cómo se atiende un request ya parseado:
//!
//! ```text
//! Request → dispatch → Task::Static → static_files::serve
//!                    → Task::Cgi    → cgi::execute
//! ```
//!
//! La selección es una función pura del flag `is_cgi` del request; los
//! handlers reciben el request resuelto y el socket, y nunca vuelven a
//! parsear ni a resolver la ruta: `request.path()` es la autoridad.

pub mod cgi;
pub mod static_files;

use crate::http::Request;
use std::io::{self, BufRead, Write};

/// Las dos formas de atender un request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Transmitir el archivo tal cual
    Static,

    /// Ejecutar el recurso como proceso CGI
    Cgi,
}

/// Selecciona la tarea para un request parseado
///
/// # Ejemplo
/// ```no_run
/// use std::io::Cursor;
/// use std::path::Path;
/// use miniweb::handlers::{dispatch, Task};
/// use miniweb::http::Request;
///
/// let mut reader = Cursor::new(b"GET /index.html HTTP/1.0\r\n\r\n".to_vec());
/// let request = Request::parse(&mut reader, Path::new("httpdocs"), "index.html").unwrap();
/// assert_eq!(dispatch(&request), Task::Static);
/// ```
pub fn dispatch(request: &Request) -> Task {
    if request.is_cgi() {
        Task::Cgi
    } else {
        Task::Static
    }
}

/// Atiende el request por el writer, leyendo el cuerpo del reader si hace falta
///
/// El reader es el mismo stream del que se parseó el request: para un POST
/// contiene el cuerpo sin consumir.
pub fn handle<R: BufRead, W: Write>(
    request: &Request,
    reader: &mut R,
    writer: &mut W,
) -> io::Result<()> {
    match dispatch(request) {
        Task::Static => static_files::serve(request, writer),
        Task::Cgi => cgi::execute(request, reader, writer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn parse(raw: &str, root: &std::path::Path) -> Request {
        let mut reader = Cursor::new(raw.as_bytes().to_vec());
        Request::parse(&mut reader, root, "index.html").unwrap()
    }

    #[test]
    fn test_dispatch_plain_get_is_static() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("a.html"), "x").unwrap();
        let request = parse("GET /a.html HTTP/1.0\r\n\r\n", root.path());
        assert_eq!(dispatch(&request), Task::Static);
    }

    #[test]
    fn test_dispatch_query_is_cgi() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("a.html"), "x").unwrap();
        let request = parse("GET /a.html?x=1 HTTP/1.0\r\n\r\n", root.path());
        assert_eq!(dispatch(&request), Task::Cgi);
    }

    #[test]
    fn test_dispatch_executable_is_cgi() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("tool");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();

        let request = parse("GET /tool HTTP/1.0\r\n\r\n", root.path());
        assert_eq!(dispatch(&request), Task::Cgi);
    }
}
