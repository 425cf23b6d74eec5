use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds. Generous because `/create_video/`
    /// waits on remote rendering (default: `600`).
    pub request_timeout_secs: u64,
    /// Largest accepted request body in bytes (default: 50 MB).
    pub max_upload_bytes: usize,
    /// Directory holding `index.html` and static assets (default: `frontend`).
    pub frontend_dir: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                  |
    /// |------------------------|------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                |
    /// | `PORT`                 | `8000`                                   |
    /// | `CORS_ORIGINS`         | `http://localhost:3000,http://localhost:8000,http://127.0.0.1:8000,http://127.0.0.1:3000` |
    /// | `REQUEST_TIMEOUT_SECS` | `600`                                    |
    /// | `MAX_UPLOAD_BYTES`     | `52428800`                               |
    /// | `FRONTEND_DIR`         | `frontend`                               |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| {
                "http://localhost:3000,http://localhost:8000,\
                 http://127.0.0.1:8000,http://127.0.0.1:3000"
                    .into()
            })
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "52428800".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let frontend_dir = std::env::var("FRONTEND_DIR")
            .unwrap_or_else(|_| "frontend".into())
            .into();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            frontend_dir,
        }
    }
}
