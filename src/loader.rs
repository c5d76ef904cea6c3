use std::path::PathBuf;

use image::RgbImage;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Url,
};

use crate::detection::{FaceDetectionError, FaceDetectionResult};

/// Resolves an image URI into decoded pixels.
pub trait ImageLoader: Send + Sync {
    fn load(&self, uri: &str) -> FaceDetectionResult<RgbImage>;
}

/// Loads `file://` URIs, plain paths and `http(s)://` URLs.
#[derive(Debug, Default, Clone)]
pub struct UriImageLoader {}

impl UriImageLoader {
    pub fn new() -> UriImageLoader {
        UriImageLoader {}
    }
}

enum ImageSource {
    File(PathBuf),
    Remote(Url),
}

/// Strings without a scheme are plain paths. `file://` URIs are
/// percent-decoded and may name `localhost` as their host.
fn resolve(uri: &str) -> Result<ImageSource, String> {
    if uri.is_empty() {
        return Err("empty uri".to_string());
    }
    if !uri.contains("://") {
        return Ok(ImageSource::File(PathBuf::from(uri)));
    }

    let url = Url::parse(uri).map_err(|err| format!("invalid uri: {}", err))?;
    match url.scheme() {
        "file" => url
            .to_file_path()
            .map(ImageSource::File)
            .map_err(|_| "not a local file uri".to_string()),
        "http" | "https" => Ok(ImageSource::Remote(url)),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

fn download_image(url: Url) -> Result<Vec<u8>, String> {
    fn get_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("image/*"));
        headers
    }

    let client = reqwest::blocking::Client::new();
    let response = client
        .get(url)
        .headers(get_headers())
        .send()
        .map_err(|err| format!("failed to download image: {}", err))?;
    if !response.status().is_success() {
        return Err(format!("failed to download image: {}", response.status()));
    }

    response
        .bytes()
        .map(|bytes| bytes.to_vec())
        .map_err(|err| format!("failed to read image body: {}", err))
}

impl ImageLoader for UriImageLoader {
    fn load(&self, uri: &str) -> FaceDetectionResult<RgbImage> {
        let load_error = |reason: String| FaceDetectionError::LoadError {
            uri: uri.to_string(),
            reason,
        };

        let image = match resolve(uri).map_err(load_error)? {
            ImageSource::File(path) => {
                image::open(path).map_err(|err| load_error(err.to_string()))?
            }
            ImageSource::Remote(url) => {
                let bytes = download_image(url).map_err(load_error)?;
                image::load_from_memory(&bytes).map_err(|err| load_error(err.to_string()))?
            }
        };

        Ok(image.into_rgb8())
    }
}
