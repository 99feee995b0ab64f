// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Persists the frozen word↔index mapping.
//
// The tokenizer is built once from the training captions and
// reused verbatim at inference — it is never rebuilt per run,
// because the model's output indices only mean anything against
// the vocabulary it was trained with.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::data::tokenizer::CaptionTokenizer;
use crate::domain::captions::CaptionSet;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Load the existing tokenizer or fit a new one on the training
    /// captions and persist it.
    pub fn load_or_build(&self, captions: &CaptionSet) -> Result<CaptionTokenizer> {
        let path = self.tokenizer_path();
        if path.exists() {
            tracing::info!("Loading existing tokenizer from disk");
            self.load()
        } else {
            let tokenizer = CaptionTokenizer::fit(captions);
            tracing::info!("Built new tokenizer (vocab_size={})", tokenizer.vocab_size());
            self.save(&tokenizer)?;
            Ok(tokenizer)
        }
    }

    /// Load a previously saved tokenizer.
    pub fn load(&self) -> Result<CaptionTokenizer> {
        let path = self.tokenizer_path();
        let json = fs::read_to_string(&path)
            .with_context(|| format!(
                "Cannot load tokenizer from '{}'. Have you run 'train' first?",
                path.display()
            ))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, tokenizer: &CaptionTokenizer) -> Result<()> {
        fs::create_dir_all(&self.dir).ok();

        let path = self.tokenizer_path();
        fs::write(&path, serde_json::to_string_pretty(tokenizer)?)
            .with_context(|| format!("Cannot write tokenizer to '{}'", path.display()))?;

        tracing::debug!("Saved tokenizer to '{}'", path.display());
        Ok(())
    }

    fn tokenizer_path(&self) -> PathBuf {
        self.dir.join("tokenizer.json")
    }
}
