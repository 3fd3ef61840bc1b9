//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor HTTP con soporte para
//! argumentos CLI, variables de entorno y un archivo de ajustes opcional
//! en formato clave/valor (TOML).
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./miniweb --port 6379 --document-root httpdocs --default-document index.html
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! MINIWEB_PORT=8080 MINIWEB_DOCUMENT_ROOT=/srv/www ./miniweb
//! ```
//!
//! ### Archivo de ajustes
//! ```toml
//! port = 6379
//! document_root = "httpdocs"
//! default_document = "index.html"
//! ```
//!
//! La configuración se construye una sola vez en el arranque y a partir de
//! ahí es de solo lectura: se pasa por referencia a quien la necesite, sin
//! estado global.

use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuración del servidor HTTP/1.0
#[derive(Debug, Clone, Parser)]
#[command(name = "miniweb")]
#[command(about = "Servidor HTTP/1.0 concurrente con archivos estáticos y CGI")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "6379", env = "MINIWEB_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "MINIWEB_HOST")]
    pub host: String,

    /// Directorio raíz del que se sirven archivos y scripts CGI
    #[arg(long = "document-root", default_value = "httpdocs", env = "MINIWEB_DOCUMENT_ROOT")]
    pub document_root: PathBuf,

    /// Documento servido para la raíz y para directorios
    #[arg(long = "default-document", default_value = "index.html", env = "MINIWEB_DEFAULT_DOCUMENT")]
    pub default_document: String,

    /// Timeout de recepción por conexión, en segundos
    #[arg(long = "timeout", default_value = "5", env = "MINIWEB_TIMEOUT")]
    pub timeout_secs: u64,

    /// Archivo de ajustes opcional; sus claves pisan los valores del CLI
    #[arg(short = 'c', long = "config", env = "MINIWEB_CONFIG")]
    pub settings_file: Option<PathBuf>,
}

impl Config {
    /// Construye la configuración final: CLI + entorno + archivo de ajustes
    ///
    /// Las claves presentes en el archivo tienen la última palabra; las
    /// ausentes conservan lo que vino del CLI, del entorno o del default.
    pub fn load() -> Result<Self, SettingsError> {
        let mut config = Config::parse();
        if let Some(path) = config.settings_file.clone() {
            let settings = Settings::load(&path)?;
            config.apply_settings(&settings);
        }
        Ok(config)
    }

    /// Vuelca un almacén de ajustes sobre esta configuración
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.port = settings.get_int("port", i64::from(self.port)) as u16;
        self.host = settings.get_string("host", &self.host);
        self.document_root = PathBuf::from(
            settings.get_string("document_root", &self.document_root.to_string_lossy()),
        );
        self.default_document =
            settings.get_string("default_document", &self.default_document);
        self.timeout_secs = settings.get_int("timeout_secs", self.timeout_secs as i64) as u64;
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```
    /// use miniweb::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:6379");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.default_document.is_empty() {
            return Err("Default document must not be empty".to_string());
        }
        if self.default_document.contains('/') {
            return Err("Default document must be a bare file name".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("Receive timeout must be > 0".to_string());
        }
        if !self.document_root.is_dir() {
            return Err(format!(
                "Document root {} is not a directory",
                self.document_root.display()
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 6379,
            host: "0.0.0.0".to_string(),
            document_root: PathBuf::from("httpdocs"),
            default_document: "index.html".to_string(),
            timeout_secs: 5,
            settings_file: None,
        }
    }
}

/// Error al cargar el archivo de ajustes
#[derive(Debug)]
pub enum SettingsError {
    /// No se pudo leer el archivo
    Io(std::io::Error),

    /// El contenido no es TOML válido
    Parse(toml::de::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "cannot read settings file: {}", e),
            SettingsError::Parse(e) => write!(f, "cannot parse settings file: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Almacén clave/valor leído del archivo de ajustes
///
/// Expone lecturas con default: una clave ausente o de tipo inesperado
/// devuelve el valor por defecto en lugar de fallar.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    table: toml::Table,
}

impl Settings {
    /// Carga un archivo de ajustes TOML
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(SettingsError::Io)?;
        toml::from_str(&contents).map_err(SettingsError::Parse)
    }

    /// Verifica si la clave existe
    pub fn has_key(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    /// Obtiene un string, o el default si la clave falta o no es string
    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.table.get(key).and_then(|v| v.as_str()) {
            Some(value) => value.to_string(),
            None => default.to_string(),
        }
    }

    /// Obtiene un entero, o el default si la clave falta o no es entero
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.table.get(key).and_then(|v| v.as_integer()).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn settings_from(toml_text: &str) -> Settings {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_text.as_bytes()).unwrap();
        Settings::load(file.path()).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 6379);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.document_root, PathBuf::from("httpdocs"));
        assert_eq!(config.default_document, "index.html");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_address() {
        let config = Config::default();
        assert_eq!(config.address(), "0.0.0.0:6379");
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    // ==================== Validación ====================

    #[test]
    fn test_validate_success() {
        let root = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.document_root = root.path().to_path_buf();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_default_document() {
        let mut config = Config::default();
        config.default_document = String::new();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Default document"));
    }

    #[test]
    fn test_validate_default_document_with_slash() {
        let mut config = Config::default();
        config.default_document = "sub/index.html".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let root = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.document_root = root.path().to_path_buf();
        config.timeout_secs = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("timeout"));
    }

    #[test]
    fn test_validate_missing_document_root() {
        let mut config = Config::default();
        config.document_root = PathBuf::from("/no/existe/en/absoluto");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Document root"));
    }

    // ==================== Almacén de ajustes ====================

    #[test]
    fn test_settings_get_string() {
        let settings = settings_from("document_root = \"/srv/www\"\n");
        assert_eq!(settings.get_string("document_root", "httpdocs"), "/srv/www");
        assert_eq!(settings.get_string("ausente", "httpdocs"), "httpdocs");
    }

    #[test]
    fn test_settings_get_int() {
        let settings = settings_from("port = 8080\n");
        assert_eq!(settings.get_int("port", 6379), 8080);
        assert_eq!(settings.get_int("ausente", 6379), 6379);
    }

    #[test]
    fn test_settings_wrong_type_falls_back() {
        let settings = settings_from("port = \"no-numerico\"\n");
        assert_eq!(settings.get_int("port", 6379), 6379);
    }

    #[test]
    fn test_settings_has_key() {
        let settings = settings_from("port = 1\n");
        assert!(settings.has_key("port"));
        assert!(!settings.has_key("host"));
    }

    #[test]
    fn test_settings_invalid_toml_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"esto no es { toml").unwrap();
        assert!(matches!(Settings::load(file.path()), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_settings_missing_file_is_error() {
        let result = Settings::load(Path::new("/no/existe.toml"));
        assert!(matches!(result, Err(SettingsError::Io(_))));
    }

    // ==================== Aplicación sobre la Config ====================

    #[test]
    fn test_apply_settings_overrides_present_keys() {
        let settings = settings_from("port = 9000\ndefault_document = \"test.html\"\n");
        let mut config = Config::default();
        config.apply_settings(&settings);

        assert_eq!(config.port, 9000);
        assert_eq!(config.default_document, "test.html");
        // Las claves ausentes conservan su valor
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_apply_settings_document_root() {
        let settings = settings_from("document_root = \"/srv/www\"\n");
        let mut config = Config::default();
        config.apply_settings(&settings);
        assert_eq!(config.document_root, PathBuf::from("/srv/www"));
    }
}
