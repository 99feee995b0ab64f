// ============================================================
// Layer 5 — Visual Feature Extractor
// ============================================================
// Runs images through a pretrained convolutional encoder (ONNX
// Runtime) to produce one fixed-length embedding vector per image.
//
// Preprocessing contract — identical for the batch extraction pass
// and the single-image inference pass, or downstream predictions
// would be inconsistent:
//   1. Resize to 299×299 (the encoder's input resolution)
//   2. Convert to RGB
//   3. Scale each channel value by 1/127.5 and subtract 1.0 ([-1, 1])
//   4. Lay out as NCHW
//
// The encoder output is the 2048-element global-average-pooled
// feature vector.

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array4;
use ort::session::Session;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::domain::features::FeatureMap;

/// Encoder input resolution
pub const IMAGE_SIZE: u32 = 299;

/// Length of the embedding vector the encoder produces
pub const FEATURE_DIM: usize = 2048;

/// Default pretrained encoder, fetched on first use
const EXTRACTOR_MODEL_URL: &str =
    "https://huggingface.co/onnx-community/xception/resolve/main/onnx/model.onnx";

// ─── ModelManager ─────────────────────────────────────────────────────────────
/// Caches the pretrained encoder in the per-user cache directory so it
/// is downloaded once, not per run.
pub struct ModelManager {
    cache_dir: PathBuf,
}

impl ModelManager {
    pub fn new() -> Self {
        let cache_dir = directories::ProjectDirs::from("dev", "image-captioner", "image-captioner")
            .map(|dirs| dirs.cache_dir().join("models"))
            .unwrap_or_else(|| PathBuf::from("/tmp/image-captioner/models"));

        Self { cache_dir }
    }

    fn extractor_model_path(&self) -> PathBuf {
        self.cache_dir.join("extractor.onnx")
    }

    /// Return the cached encoder path, downloading it first if absent.
    pub fn ensure_model(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.cache_dir)?;

        let path = self.extractor_model_path();
        if !path.exists() {
            download_model(EXTRACTOR_MODEL_URL, &path)?;
        }
        Ok(path)
    }
}

impl Default for ModelManager {
    fn default() -> Self {
        Self::new()
    }
}

fn download_model(url: &str, dest: &Path) -> Result<()> {
    tracing::info!("Downloading pretrained encoder to '{}'", dest.display());

    let mut response = reqwest::blocking::get(url)
        .context("Failed to start encoder download")?
        .error_for_status()
        .context("Encoder download rejected")?;

    let total_size = response.content_length().unwrap_or(0);
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut file = fs::File::create(dest)
        .with_context(|| format!("Cannot create '{}'", dest.display()))?;

    let mut buf = [0u8; 8192];
    loop {
        let n = response.read(&mut buf).context("Error downloading chunk")?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        pb.inc(n as u64);
    }

    pb.finish_with_message("Download complete");
    Ok(())
}

// ─── FeatureExtractor ─────────────────────────────────────────────────────────
pub struct FeatureExtractor {
    session: Session,
}

impl FeatureExtractor {
    /// Load the encoder from the given path, or from the cache
    /// (downloading on first use) when no path is given.
    pub fn new(model_path: Option<&Path>) -> Result<Self> {
        let path = match model_path {
            Some(p) => p.to_path_buf(),
            None    => ModelManager::new().ensure_model()?,
        };

        let session = Session::builder()?
            .with_intra_threads(4)?
            .commit_from_file(&path)
            .with_context(|| format!("Failed to load encoder model '{}'", path.display()))?;

        tracing::info!("Encoder model loaded from '{}'", path.display());
        Ok(Self { session })
    }

    /// Embed a single image into its feature vector.
    pub fn extract(&mut self, image_path: &Path) -> Result<Vec<f32>> {
        let array = preprocess_image(image_path)?;

        let input   = ort::value::Tensor::from_array(array)?;
        let outputs = self.session.run(ort::inputs![input])?;

        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Encoder output is not an f32 tensor")?;

        if data.len() != FEATURE_DIM {
            bail!(
                "Encoder produced {} values for '{}', expected {}",
                data.len(),
                image_path.display(),
                FEATURE_DIM
            );
        }
        Ok(data.to_vec())
    }

    /// Embed every image file in a directory.
    ///
    /// A file that fails to open or run is logged and excluded; the
    /// batch continues.
    pub fn extract_dir(&mut self, dir: &Path) -> Result<FeatureMap> {
        let mut entries: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Cannot read image directory '{}'", dir.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        entries.sort();

        let pb = ProgressBar::new(entries.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} images ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut features = FeatureMap::new();

        for path in &entries {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();

            match self.extract(path) {
                Ok(vector) => {
                    features.insert(name, vector);
                }
                // Log a warning but continue — don't fail the batch on one bad file
                Err(e) => {
                    tracing::warn!("Skipping '{}': {}", path.display(), e);
                }
            }
            pb.inc(1);
        }

        pb.finish();
        tracing::info!("Extracted features for {} of {} files", features.len(), entries.len());
        Ok(features)
    }
}

/// Decode, resize, and normalise one image into the NCHW input tensor.
fn preprocess_image(path: &Path) -> Result<Array4<f32>> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open image '{}'", path.display()))?;
    let img = img.resize_exact(IMAGE_SIZE, IMAGE_SIZE, image::imageops::FilterType::Lanczos3);
    let rgb = img.to_rgb8();

    let mut data = Vec::with_capacity(3 * IMAGE_SIZE as usize * IMAGE_SIZE as usize);

    // Convert to CHW order, centering pixel values into [-1, 1]
    for c in 0..3 {
        for y in 0..IMAGE_SIZE {
            for x in 0..IMAGE_SIZE {
                let pixel = rgb.get_pixel(x, y);
                data.push(pixel[c] as f32 / 127.5 - 1.0);
            }
        }
    }

    let array = Array4::from_shape_vec(
        (1, 3, IMAGE_SIZE as usize, IMAGE_SIZE as usize),
        data,
    )?;

    Ok(array)
}
