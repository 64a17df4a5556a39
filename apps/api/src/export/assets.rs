use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use image::{GenericImageView, ImageFormat};
use tracing::debug;

use crate::errors::AppError;

/// The public assets directory: serves the client and holds the images
/// referenced by company details.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    base_url: String,
}

/// An image re-encoded as PNG, ready to embed in a Word document.
#[derive(Debug, Clone)]
pub struct PngImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// True for a path such as `/images/logo.png` that names a file inside the
/// public directory. URLs, drive prefixes and `..` segments are not.
pub fn is_public_path(path: &str) -> bool {
    let relative = path.trim_start_matches('/');
    if relative.is_empty()
        || path.starts_with("//")
        || path.contains(':')
        || path.contains('\\')
    {
        return false;
    }
    Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        AssetStore {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Maps a stored path such as `/images/logo.png` to a file under the
    /// root. Anything that could escape the root is rejected.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, AppError> {
        if !is_public_path(path) {
            return Err(AppError::Export(format!("invalid asset path: {path}")));
        }
        Ok(self.root.join(path.trim_start_matches('/')))
    }

    pub async fn load_png(&self, path: &str) -> Result<PngImage, AppError> {
        let file = self.resolve(path)?;
        let raw = tokio::fs::read(&file)
            .await
            .map_err(|e| AppError::Export(format!("failed to read {}: {e}", file.display())))?;
        debug!("Loaded asset {} ({} bytes)", file.display(), raw.len());

        let label = path.to_string();
        tokio::task::spawn_blocking(move || to_png(&raw).map_err(|e| format!("{label}: {e}")))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("image task failed: {e}")))?
            .map_err(AppError::Export)
    }
}

fn to_png(raw: &[u8]) -> Result<PngImage, image::ImageError> {
    let decoded = image::load_from_memory(raw)?;
    let (width, height) = decoded.dimensions();
    let mut bytes = Vec::new();
    decoded.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(PngImage {
        bytes,
        width,
        height,
    })
}

#[cfg(test)]
pub(crate) fn write_test_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([20, 60, 120, 255]));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rejects_traversal() {
        let assets = AssetStore::new("/srv/public", "http://localhost:3001");
        assert!(assets.resolve("/images/../../etc/passwd").is_err());
        assert!(assets.resolve("/").is_err());
        assert!(assets.resolve("https://cdn.example.com/logo.png").is_err());
        assert_eq!(
            assets.resolve("/images/logo.png").unwrap(),
            PathBuf::from("/srv/public/images/logo.png")
        );
    }

    #[tokio::test]
    async fn test_load_png_reencodes_image() {
        let dir = tempfile::tempdir().unwrap();
        write_test_png(&dir.path().join("images/logo.png"), 4, 2);
        let assets = AssetStore::new(dir.path(), "http://localhost:3001");

        let png = assets.load_png("/images/logo.png").await.unwrap();
        assert_eq!((png.width, png.height), (4, 2));
        assert!(png.bytes.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn test_load_png_missing_file_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetStore::new(dir.path(), "http://localhost:3001");
        let err = assets.load_png("/images/none.png").await.unwrap_err();
        assert!(matches!(err, AppError::Export(_)));
    }

    #[tokio::test]
    async fn test_load_png_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/seal.png"), b"not an image").unwrap();
        let assets = AssetStore::new(dir.path(), "http://localhost:3001");
        assert!(assets.load_png("/images/seal.png").await.is_err());
    }
}
