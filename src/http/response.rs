//! # Construcción de Respuestas HTTP
//!
//! Este módulo proporciona una API para construir respuestas HTTP/1.0
//! de forma programática y enviarlas por el socket.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Server: miniweb/0.1.0\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hola!
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use miniweb::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_body("<h1>hola</h1>");
//!
//! let bytes = response.to_bytes();
//! // Ahora puedes enviar `bytes` por el socket
//! ```

use super::StatusCode;
use std::collections::HashMap;
use std::io::{self, Write};

/// Identificación del software que viaja en el header `Server`
pub const SERVER_SOFTWARE: &str = concat!("miniweb/", env!("CARGO_PKG_VERSION"));

const NOT_FOUND_BODY: &str = "<html><head><title>Not Found</title></head>\r\n\
     <body><p>The server could not fulfill your request because\r\n\
     the resource specified is unavailable or nonexistent.</p></body></html>\r\n";

const BAD_REQUEST_BODY: &str = "<html><head><title>Bad Request</title></head>\r\n\
     <body><p>Your browser sent a bad request,\r\n\
     such as a POST without a Content-Length.</p></body></html>\r\n";

const SERVER_ERROR_BODY: &str = "<html><head><title>Internal Server Error</title></head>\r\n\
     <body><p>Error prohibited CGI execution.</p></body></html>\r\n";

/// Representa una respuesta HTTP/1.0 completa
///
/// Toda respuesta nace con los headers estándar `Server` y
/// `Content-Type: text/html`; ambos pueden sobrescribirse.
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers HTTP (Content-Type, Content-Length, etc.)
    /// Usamos HashMap para evitar duplicados
    headers: HashMap<String, String>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta con el código de estado especificado
    ///
    /// # Ejemplo
    /// ```
    /// use miniweb::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok);
    /// assert_eq!(response.status(), StatusCode::Ok);
    /// ```
    pub fn new(status: StatusCode) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Server".to_string(), SERVER_SOFTWARE.to_string());
        headers.insert("Content-Type".to_string(), "text/html".to_string());
        Self {
            status,
            headers,
            body: Vec::new(),
        }
    }

    /// Agrega un header a la respuesta
    ///
    /// Si el header ya existe, se sobrescribe.
    ///
    /// # Ejemplo
    /// ```
    /// use miniweb::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_header("Content-Type", "text/plain");
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo de la respuesta desde un string
    ///
    /// Automáticamente calcula y agrega el header `Content-Length`.
    ///
    /// # Ejemplo
    /// ```
    /// use miniweb::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_body("Hello World");
    /// ```
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self.headers
            .insert("Content-Length".to_string(), self.body.len().to_string());
        self
    }

    /// Establece el cuerpo de la respuesta desde bytes
    ///
    /// Útil para contenido binario.
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self.headers
            .insert("Content-Length".to_string(), self.body.len().to_string());
        self
    }

    /// Respuesta 200 sin cuerpo, lista para encabezar un archivo
    pub fn ok() -> Self {
        Self::new(StatusCode::Ok)
    }

    /// Respuesta 404 enlatada con un cuerpo HTML fijo
    ///
    /// # Ejemplo
    /// ```
    /// use miniweb::http::{Response, StatusCode};
    ///
    /// let response = Response::not_found();
    /// assert_eq!(response.status(), StatusCode::NotFound);
    /// ```
    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound).with_body(NOT_FOUND_BODY)
    }

    /// Respuesta 400 enlatada con un cuerpo HTML fijo
    pub fn bad_request() -> Self {
        Self::new(StatusCode::BadRequest).with_body(BAD_REQUEST_BODY)
    }

    /// Respuesta 500 enlatada con un cuerpo HTML fijo
    pub fn server_error() -> Self {
        Self::new(StatusCode::InternalServerError).with_body(SERVER_ERROR_BODY)
    }

    /// Serializa la línea de estado, los headers y la línea en blanco
    ///
    /// Es el prefijo de `to_bytes`; se usa solo cuando el cuerpo va a
    /// transmitirse por separado (p. ej. un archivo con `io::copy`).
    pub fn head_bytes(&self) -> Vec<u8> {
        let mut result = Vec::new();

        // 1. Status line
        // Formato: HTTP/1.0 200 OK\r\n
        let status_line = format!("HTTP/1.0 {}\r\n", self.status);
        result.extend_from_slice(status_line.as_bytes());

        // 2. Headers
        // Formato: Header-Name: Value\r\n
        for (name, value) in &self.headers {
            let header_line = format!("{}: {}\r\n", name, value);
            result.extend_from_slice(header_line.as_bytes());
        }

        // 3. Línea vacía que separa headers del body
        result.extend_from_slice(b"\r\n");

        result
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// # Ejemplo
    /// ```
    /// use miniweb::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_body("Test");
    ///
    /// let bytes = response.to_bytes();
    /// // bytes contiene: "HTTP/1.0 200 OK\r\n...\r\n\r\nTest"
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = self.head_bytes();
        result.extend_from_slice(&self.body);
        result
    }

    /// Envía la respuesta completa por el writer y hace flush
    pub fn send<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())?;
        writer.flush()
    }

    /// Envía solo la línea de estado y los headers
    ///
    /// El llamador queda responsable de escribir el cuerpo a continuación.
    pub fn send_head<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.head_bytes())
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_response_standard_headers() {
        let response = Response::new(StatusCode::Ok);
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.headers().get("Server"), Some(&SERVER_SOFTWARE.to_string()));
        assert_eq!(response.headers().get("Content-Type"), Some(&"text/html".to_string()));
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_with_header_overrides() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_header("X-Custom", "value");

        assert_eq!(response.headers().get("Content-Type"), Some(&"text/plain".to_string()));
        assert_eq!(response.headers().get("X-Custom"), Some(&"value".to_string()));
    }

    #[test]
    fn test_with_body() {
        let response = Response::new(StatusCode::Ok).with_body("Hello World");

        assert_eq!(response.body(), b"Hello World");
        assert_eq!(response.headers().get("Content-Length"), Some(&"11".to_string()));
    }

    #[test]
    fn test_with_body_bytes() {
        let binary_data = vec![0x00, 0x01, 0x02, 0xFF];
        let response = Response::new(StatusCode::Ok).with_body_bytes(binary_data.clone());

        assert_eq!(response.body(), &binary_data[..]);
        assert_eq!(response.headers().get("Content-Length"), Some(&"4".to_string()));
    }

    #[test]
    fn test_to_bytes() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body("Test");

        let bytes = response.to_bytes();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 4\r\n"));
        assert!(text.ends_with("\r\n\r\nTest"));
    }

    #[test]
    fn test_head_bytes_excludes_body() {
        let response = Response::new(StatusCode::Ok).with_body("cuerpo");
        let head = String::from_utf8(response.head_bytes()).unwrap();

        assert!(head.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(head.ends_with("\r\n\r\n"));
        assert!(!head.contains("cuerpo"));
    }

    #[test]
    fn test_send_writes_everything() {
        let response = Response::new(StatusCode::Ok).with_body("abc");
        let mut sink = Vec::new();
        response.send(&mut sink).unwrap();
        assert_eq!(sink, response.to_bytes());
    }

    // ==================== Respuestas enlatadas ====================

    #[test]
    fn test_not_found_canned() {
        let response = Response::not_found();
        assert_eq!(response.status(), StatusCode::NotFound);
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("unavailable or nonexistent"));
    }

    #[test]
    fn test_bad_request_canned() {
        let response = Response::bad_request();
        assert_eq!(response.status(), StatusCode::BadRequest);
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("Content-Length"));
    }

    #[test]
    fn test_server_error_canned() {
        let response = Response::server_error();
        assert_eq!(response.status(), StatusCode::InternalServerError);
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("CGI"));
    }

    #[test]
    fn test_canned_bodies_declare_length() {
        for response in [Response::not_found(), Response::bad_request(), Response::server_error()] {
            let declared: usize = response
                .headers()
                .get("Content-Length")
                .and_then(|v| v.parse().ok())
                .unwrap();
            assert_eq!(declared, response.body().len());
        }
    }
}
