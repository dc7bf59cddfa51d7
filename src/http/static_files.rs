//! Static file resolution for the arcade hub
//!
//! Maps request paths onto the site root, with `/cowboy-game` pointing at
//! the game's public directory.

use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

use crate::http::response::Response;

/// URL prefix under which the game is served
pub const GAME_PREFIX: &str = "/cowboy-game";
/// Directory (relative to the root) holding the game's files
pub const GAME_DIR: &str = "cowboy-shootout/public";
const INDEX: &str = "index.html";

/// Content type for a file path, by extension
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") => "image/jpg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Files served from a root directory
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request target to a file under the root
    ///
    /// Returns `None` for targets that would escape the root.
    pub fn resolve(&self, target: &str) -> Option<PathBuf> {
        let path = target.split(['?', '#']).next().unwrap_or("");
        let path = decode_path(path)?;

        let relative = match path.strip_prefix(GAME_PREFIX) {
            Some(rest) if rest.is_empty() || rest == "/" => format!("{}/{}", GAME_DIR, INDEX),
            Some(rest) if rest.starts_with('/') => format!("{}{}", GAME_DIR, rest),
            _ if path == "/" || path.is_empty() => INDEX.to_string(),
            _ => path.clone(),
        };

        let mut relative = relative.trim_start_matches('/').to_string();
        if relative.ends_with('/') {
            relative.push_str(INDEX);
        }

        let relative = Path::new(&relative);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return None;
        }

        Some(self.root.join(relative))
    }

    /// Build the response for a request target
    pub async fn serve(&self, target: &str) -> Response {
        let Some(path) = self.resolve(target) else {
            return Response::not_found(target);
        };

        match tokio::fs::read(&path).await {
            Ok(body) => Response::file(content_type(&path), body),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Response::not_found(target),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                Response::server_error(&e)
            }
        }
    }
}

/// Decode `%XX` escapes; `None` for non-UTF-8 or NUL-bearing paths
fn decode_path(input: &str) -> Option<String> {
    let decoded = percent_decode_str(input).decode_utf8().ok()?;
    if decoded.contains('\0') {
        return None;
    }
    Some(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_site() -> PathBuf {
        let root = std::env::temp_dir().join(format!("yeti-site-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(root.join(GAME_DIR)).unwrap();
        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::write(root.join("index.html"), "<h1>Yeti Games</h1>").unwrap();
        std::fs::write(root.join("styles.css"), "body {}").unwrap();
        std::fs::write(root.join(GAME_DIR).join("index.html"), "<h1>Cowboy</h1>").unwrap();
        std::fs::write(root.join(GAME_DIR).join("game.js"), "let x;").unwrap();
        root
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type(Path::new("a/index.html")), "text/html");
        assert_eq!(content_type(Path::new("logo.PNG")), "image/png");
        assert_eq!(content_type(Path::new("icon.svg")), "image/svg+xml");
        assert_eq!(content_type(Path::new("photo.jpg")), "image/jpg");
        assert_eq!(content_type(Path::new("archive.tar")), "application/octet-stream");
        assert_eq!(content_type(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn test_resolve_root_and_files() {
        let files = StaticFiles::new("/srv");

        assert_eq!(files.resolve("/"), Some(PathBuf::from("/srv/index.html")));
        assert_eq!(files.resolve("/styles.css"), Some(PathBuf::from("/srv/styles.css")));
        assert_eq!(files.resolve("/?ref=home"), Some(PathBuf::from("/srv/index.html")));
        assert_eq!(files.resolve("/docs/"), Some(PathBuf::from("/srv/docs/index.html")));
    }

    #[test]
    fn test_resolve_game_prefix() {
        let files = StaticFiles::new("/srv");

        assert_eq!(
            files.resolve("/cowboy-game"),
            Some(PathBuf::from("/srv/cowboy-shootout/public/index.html"))
        );
        assert_eq!(
            files.resolve("/cowboy-game/?room=ABC123&name=x"),
            Some(PathBuf::from("/srv/cowboy-shootout/public/index.html"))
        );
        assert_eq!(
            files.resolve("/cowboy-game/js/game.js"),
            Some(PathBuf::from("/srv/cowboy-shootout/public/js/game.js"))
        );
        // Only a whole path segment counts as the prefix
        assert_eq!(
            files.resolve("/cowboy-games.html"),
            Some(PathBuf::from("/srv/cowboy-games.html"))
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let files = StaticFiles::new("/srv");

        assert!(files.resolve("/../etc/passwd").is_none());
        assert!(files.resolve("/cowboy-game/../../secret").is_none());
        assert!(files.resolve("/%2e%2e/etc/passwd").is_none());
        assert!(files.resolve("/cowboy-game/%2E%2E/%2E%2E/secret").is_none());
        assert!(files.resolve("/nul%00.html").is_none());
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/my%20page.html").as_deref(), Some("/my page.html"));
        assert_eq!(decode_path("/plain").as_deref(), Some("/plain"));
        assert_eq!(decode_path("/caf%C3%A9.html").as_deref(), Some("/café.html"));
        // Stray percent signs are kept literally
        assert_eq!(decode_path("/bad%zz").as_deref(), Some("/bad%zz"));
        assert!(decode_path("/%FF.html").is_none());
    }

    #[tokio::test]
    async fn test_serve_existing_files() {
        let root = temp_site();
        let files = StaticFiles::new(&root);

        let index = files.serve("/").await;
        assert_eq!(index.status, 200);
        assert_eq!(index.content_type, "text/html");
        assert_eq!(index.body, b"<h1>Yeti Games</h1>");

        let game = files.serve("/cowboy-game/").await;
        assert_eq!(game.body, b"<h1>Cowboy</h1>");

        let script = files.serve("/cowboy-game/game.js").await;
        assert_eq!(script.content_type, "text/javascript");

        std::fs::remove_dir_all(root).ok();
    }

    #[tokio::test]
    async fn test_serve_missing_file_is_404_page() {
        let root = temp_site();
        let files = StaticFiles::new(&root);

        let response = files.serve("/nope.html").await;
        assert_eq!(response.status, 404);
        assert_eq!(response.content_type, "text/html");
        let body = String::from_utf8(response.body).unwrap();
        assert!(body.contains("/nope.html"));
        assert!(body.contains("href=\"/\""));

        std::fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_serve_directory_is_500() {
        let root = temp_site();
        let files = StaticFiles::new(&root);

        let response = tokio_test::block_on(files.serve("/assets"));
        assert_eq!(response.status, 500);
        assert!(String::from_utf8(response.body).unwrap().starts_with("Server Error:"));

        std::fs::remove_dir_all(root).ok();
    }
}
