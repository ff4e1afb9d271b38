//! Serve the web client from the static directory. Used for every path that
//! is not a dataset endpoint; directory requests get their `index.html`.

use std::path::Path;

use tower_http::services::ServeDir;

pub fn static_service(dir: &Path) -> ServeDir {
    ServeDir::new(dir)
}
