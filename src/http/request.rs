//! # Parsing de Requests HTTP/1.0
//!
//! Este módulo implementa un parser HTTP/1.0 desde cero, leyendo
//! directamente del socket línea por línea (sin framing de librerías).
//!
//! ## Formato de un Request HTTP/1.0
//!
//! ```text
//! GET /pagina.html?x=1 HTTP/1.0\r\n
//! Host: localhost:6379\r\n
//! User-Agent: curl/7.68.0\r\n
//! \r\n
//! ```
//!
//! ## Responsabilidades
//!
//! 1. **Request line**: método + target (el token de versión se descarta)
//! 2. **Decodificación**: `%XX` y `+`→espacio sobre el target completo
//! 3. **Resolución**: raíz de documentos + documento por defecto + chequeo
//!    del bit de ejecución para decidir estático vs CGI
//! 4. **Headers**: `Nombre: Valor` hasta la línea en blanco, nombres en
//!    minúsculas
//!
//! El parse es atómico: o produce un [`Request`] completo o un
//! [`ParseError`]; nunca se expone un request a medio llenar. El cuerpo de
//! un POST queda sin consumir en el reader, listo para el relay hacia el
//! proceso CGI.

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, Read};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Métodos HTTP soportados
///
/// Cualquier otro método es un fallo duro de parseo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un recurso (CGI solo si hay query o bit de ejecución)
    GET,

    /// POST - Enviar datos a un recurso (siempre CGI)
    POST,
}

impl Method {
    /// Parsea un método HTTP desde un string
    ///
    /// La comparación es insensible a mayúsculas: `get` y `GET` son el
    /// mismo método.
    fn from_token(s: &str) -> Result<Self, ParseError> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
        }
    }
}

/// Errores que pueden ocurrir durante el parsing
///
/// La variante distingue el recurso inexistente del resto: el supervisor
/// de conexiones responde 404 a [`ParseError::FileNotFound`] y 400 a todo
/// lo demás, sin volver a consultar el filesystem.
#[derive(Debug)]
pub enum ParseError {
    /// Cero bytes antes de EOF
    EmptyRequest,

    /// Primera línea sin método o sin target
    InvalidRequestLine,

    /// Método HTTP distinto de GET/POST
    UnsupportedMethod(String),

    /// El target decodificado contiene `..`
    PathTraversal(String),

    /// El recurso resuelto no existe en la raíz de documentos
    FileNotFound(String),

    /// Error de E/S leyendo del socket (incluye el timeout de recepción)
    Io(io::Error),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
            ParseError::UnsupportedMethod(m) => write!(f, "Unsupported HTTP method: {}", m),
            ParseError::PathTraversal(url) => write!(f, "Path traversal rejected: {}", url),
            ParseError::FileNotFound(path) => write!(f, "File not found: {}", path),
            ParseError::Io(e) => write!(f, "I/O error while reading request: {}", e),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}

/// Representa un request HTTP/1.0 parseado y resuelto contra el filesystem
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP (GET, POST)
    method: Method,

    /// Target tal como lo envió el cliente
    raw_url: String,

    /// Target decodificado, sin query string
    url: String,

    /// Query string (solo GET; vacío en el resto de casos)
    query_string: String,

    /// Ruta resuelta: raíz de documentos + url decodificada
    path: PathBuf,

    /// Headers con el nombre en minúsculas (la última aparición gana)
    headers: HashMap<String, String>,

    /// true si la petición debe atenderse ejecutando el recurso
    is_cgi: bool,
}

impl Request {
    /// Parsea un request HTTP/1.0 leyendo del reader y lo resuelve contra
    /// la raíz de documentos
    ///
    /// El reader queda posicionado justo después de la línea en blanco que
    /// cierra los headers; el cuerpo de un POST no se consume aquí.
    ///
    /// # Ejemplo
    ///
    /// ```no_run
    /// use std::io::Cursor;
    /// use std::path::Path;
    /// use miniweb::http::Request;
    ///
    /// let mut reader = Cursor::new(b"GET /index.html HTTP/1.0\r\n\r\n".to_vec());
    /// let request = Request::parse(&mut reader, Path::new("httpdocs"), "index.html")?;
    /// assert_eq!(request.url(), "/index.html");
    /// # Ok::<(), miniweb::http::ParseError>(())
    /// ```
    pub fn parse<R: BufRead>(
        reader: &mut R,
        document_root: &Path,
        default_document: &str,
    ) -> Result<Request, ParseError> {
        // 1. Request line
        let line = match read_line(reader)? {
            Some(line) => line,
            None => return Err(ParseError::EmptyRequest),
        };

        let mut tokens = line.split_whitespace();
        let method_token = tokens.next().ok_or(ParseError::InvalidRequestLine)?;
        let target = tokens.next().ok_or(ParseError::InvalidRequestLine)?;
        // El token de versión (HTTP/1.0), si viene, se descarta.

        let method = Method::from_token(method_token)?;
        let raw_url = target.to_string();

        // 2. Decodificar el target completo antes de cualquier otro examen;
        //    el chequeo de traversal sobre el valor decodificado cierra el
        //    bypass con `%2e%2e`.
        let decoded = url_decode(target);
        if decoded.contains("..") {
            return Err(ParseError::PathTraversal(decoded));
        }

        // 3. Query string: solo GET separa en el primer '?'. En POST el
        //    target queda intacto y el CGI es incondicional.
        let mut is_cgi = method == Method::POST;
        let mut url = decoded;
        let mut query_string = String::new();
        if method == Method::GET {
            if let Some(pos) = url.find('?') {
                query_string = url[pos + 1..].to_string();
                url.truncate(pos);
                is_cgi = true;
            }
        }

        // 4. Ruta en disco: raíz + url sin la barra inicial; documento por
        //    defecto para la raíz y para targets con barra final.
        let mut path = document_root.join(url.trim_start_matches('/'));
        if url.is_empty() || url.ends_with('/') {
            path.push(default_document);
        }

        // 5. Resolución contra el filesystem. Si no existe, se drenan los
        //    headers pendientes antes de fallar para dejar el stream en un
        //    punto consistente.
        let mut metadata = match fs::metadata(&path) {
            Ok(meta) => meta,
            Err(_) => {
                drain_headers(reader)?;
                return Err(ParseError::FileNotFound(path.display().to_string()));
            }
        };

        if metadata.is_dir() {
            path.push(default_document);
            metadata = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(_) => {
                    drain_headers(reader)?;
                    return Err(ParseError::FileNotFound(path.display().to_string()));
                }
            };
        }

        // Cualquier bit de ejecución convierte el recurso en CGI.
        if metadata.permissions().mode() & 0o111 != 0 {
            is_cgi = true;
        }

        // 6. Headers hasta la línea en blanco
        let headers = parse_headers(reader)?;

        Ok(Request {
            method,
            raw_url,
            url,
            query_string,
            path,
            headers,
            is_cgi,
        })
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el target tal como lo envió el cliente
    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    /// Obtiene el target decodificado, sin query string
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Obtiene la query string (vacía si no hubo `?`)
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Obtiene la ruta resuelta en disco
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico (búsqueda insensible a mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    /// Obtiene el `Content-Length` declarado, si es numérico
    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length").and_then(|v| v.trim().parse().ok())
    }

    /// true si la petición debe atenderse ejecutando el recurso
    pub fn is_cgi(&self) -> bool {
        self.is_cgi
    }
}

/// Lee una línea del reader, sin incluir el terminador
///
/// Termina en `\n`, en `\r\n`, o en un `\r` al que no sigue un `\n`; esa
/// última tolerancia es deliberada y no debe endurecerse a CRLF estricto.
/// Retorna `None` si el stream llega a EOF sin haber entregado ni un byte.
fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        if reader.read(&mut byte)? == 0 {
            if line.is_empty() {
                return Ok(None);
            }
            break;
        }
        match byte[0] {
            b'\n' => break,
            b'\r' => {
                // Consumir el '\n' solo si realmente viene a continuación
                if reader.fill_buf()?.first() == Some(&b'\n') {
                    reader.consume(1);
                }
                break;
            }
            other => line.push(other),
        }
    }

    Ok(Some(String::from_utf8_lossy(&line).into_owned()))
}

/// Lee headers `Nombre: Valor` hasta la línea en blanco
///
/// Los nombres se guardan en minúsculas y a los valores se les recorta el
/// espacio inicial. Las líneas sin `:` se ignoran en silencio.
fn parse_headers<R: BufRead>(reader: &mut R) -> Result<HashMap<String, String>, ParseError> {
    let mut headers = HashMap::new();

    loop {
        let line = match read_line(reader)? {
            Some(line) => line,
            None => break,
        };
        if line.is_empty() {
            break;
        }
        if let Some(colon) = line.find(':') {
            let name = line[..colon].trim().to_ascii_lowercase();
            let value = line[colon + 1..].trim_start().to_string();
            headers.insert(name, value);
        }
    }

    Ok(headers)
}

/// Consume líneas hasta la línea en blanco que cierra los headers
///
/// Se usa en los fallos de resolución para no dejar bytes de headers a
/// medio leer en el stream.
fn drain_headers<R: BufRead>(reader: &mut R) -> io::Result<()> {
    while let Some(line) = read_line(reader)? {
        if line.is_empty() {
            break;
        }
    }
    Ok(())
}

/// Decodifica un target de URL: `%XX` hexadecimal y `+` como espacio
///
/// Las secuencias `%` inválidas quedan tal cual, no son un error.
///
/// # Ejemplo
/// ```
/// use miniweb::http::request::url_decode;
///
/// assert_eq!(url_decode("/con%20espacio"), "/con espacio");
/// assert_eq!(url_decode("a+b"), "a b");
/// assert_eq!(url_decode("%zz"), "%zz");
/// ```
pub fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(high), Some(low)) => {
                        decoded.push(high * 16 + low);
                        i += 3;
                    }
                    _ => {
                        decoded.push(b'%');
                        i += 1;
                    }
                }
            }
            other => {
                decoded.push(other);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
