// ============================================================
// Layer 4 — Caption File Loader
// ============================================================
// Parses the Flickr8k-style caption token file, where each line is
//
//   <image_id>#<caption_index><TAB><caption_text>
//
// e.g.  1000268201_693b08cb0e.jpg#0	A child in a pink dress ...
//
// Every image appears on several consecutive lines, once per
// reference caption; the #<index> suffix is stripped so all of an
// image's captions group under one key.
//
// Also handles the two derived text files:
//   - the train split file (one image filename per line)
//   - the cleaned-description artifact (<image_id><TAB><caption>)
//
// Reference: Rust Book §9 (Error Handling), §12 (I/O)

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::domain::captions::{CaptionSet, END_TOKEN, START_TOKEN};
use crate::domain::traits::CaptionSource;

/// Loads the raw caption token file.
/// Implements the CaptionSource trait from Layer 3.
pub struct TokenFileLoader {
    path: String,
}

impl TokenFileLoader {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl CaptionSource for TokenFileLoader {
    fn load(&self) -> Result<CaptionSet> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read caption file '{}'", self.path))?;

        let mut set = CaptionSet::new();

        for (line_no, line) in text.lines().enumerate() {
            // The source file ends with a trailing blank line
            if line.trim().is_empty() {
                continue;
            }
            let (image_id, caption) = parse_token_line(line)
                .with_context(|| format!("'{}' line {}", self.path, line_no + 1))?;
            set.push(image_id, caption);
        }

        tracing::info!(
            "Loaded {} captions for {} images from '{}'",
            set.caption_count(),
            set.image_count(),
            self.path
        );
        Ok(set)
    }
}

/// Split one token-file line into (image_id, caption_text).
///
/// The line must contain exactly one tab, and the id before the tab must
/// carry a `#<index>` suffix. Anything else is a fatal parse error for
/// the record.
fn parse_token_line(line: &str) -> Result<(&str, &str)> {
    let Some((tag, caption)) = line.split_once('\t') else {
        bail!("expected <image_id>#<index><TAB><caption>, found no tab");
    };
    if caption.contains('\t') {
        bail!("expected exactly one tab separator");
    }
    let Some((image_id, _index)) = tag.rsplit_once('#') else {
        bail!("image id '{tag}' has no #<index> suffix");
    };
    Ok((image_id, caption))
}

/// Load a train/test split file: one image filename per line.
pub fn load_image_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read split file '{}'", path.display()))?;

    let photos: Vec<String> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.trim().to_string())
        .collect();

    tracing::info!("Loaded {} image names from '{}'", photos.len(), path.display());
    Ok(photos)
}

/// Persist the cleaned caption mapping, one `<image_id><TAB><caption>`
/// line per caption.
pub fn save_descriptions(set: &CaptionSet, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    let mut lines = Vec::with_capacity(set.caption_count());
    for (image_id, captions) in set.iter() {
        for caption in captions {
            lines.push(format!("{image_id}\t{caption}"));
        }
    }

    fs::write(path, lines.join("\n"))
        .with_context(|| format!("Cannot write descriptions to '{}'", path.display()))?;

    tracing::debug!("Saved {} cleaned captions to '{}'", lines.len(), path.display());
    Ok(())
}

/// Reload the cleaned-description artifact, restricted to the images in
/// `photos`, wrapping every caption in the start/end sentinels the decoder
/// is trained to produce.
pub fn load_clean_descriptions(
    path:   impl AsRef<Path>,
    photos: &[String],
) -> Result<CaptionSet> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read descriptions from '{}'", path.display()))?;

    let mut set = CaptionSet::new();

    for line in text.lines() {
        let Some((image_id, caption)) = line.split_once('\t') else {
            continue;
        };
        if photos.iter().any(|p| p == image_id) {
            set.push(image_id, format!("{START_TOKEN} {caption} {END_TOKEN}"));
        }
    }

    tracing::info!(
        "Loaded {} training captions for {} images",
        set.caption_count(),
        set.image_count()
    );
    Ok(set)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_line() {
        let (id, caption) = parse_token_line("dog.jpg#0\ta dog runs").unwrap();
        assert_eq!(id, "dog.jpg");
        assert_eq!(caption, "a dog runs");
    }

    #[test]
    fn test_index_suffix_is_stripped() {
        // Captions 0..4 of the same image all map to the same key
        let (id0, _) = parse_token_line("dog.jpg#0\tfirst").unwrap();
        let (id4, _) = parse_token_line("dog.jpg#4\tfifth").unwrap();
        assert_eq!(id0, id4);
    }

    #[test]
    fn test_missing_tab_is_an_error() {
        assert!(parse_token_line("dog.jpg#0 a dog runs").is_err());
    }

    #[test]
    fn test_second_tab_is_an_error() {
        assert!(parse_token_line("dog.jpg#0\ta dog\truns").is_err());
    }

    #[test]
    fn test_missing_index_suffix_is_an_error() {
        assert!(parse_token_line("dog.jpg\ta dog runs").is_err());
    }
}
