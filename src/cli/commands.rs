// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `caption`
// and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the captioning model on a captioned-image dataset
    Train(TrainArgs),

    /// Generate a caption for one image using a trained checkpoint
    Caption(CaptionArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Caption token file: <image_id>#<index><TAB><caption> per line
    #[arg(long, default_value = "data/Flickr8k.token.txt")]
    pub captions_file: String,

    /// Train split file: one image filename per line
    #[arg(long, default_value = "data/Flickr_8k.trainImages.txt")]
    pub train_split: String,

    /// Directory containing the dataset's image files
    #[arg(long, default_value = "data/images")]
    pub images_dir: String,

    /// Directory for checkpoints, tokenizer, and feature artifacts
    #[arg(long, default_value = "models")]
    pub model_dir: String,

    /// Path to a local ONNX encoder model
    /// (downloaded into the cache directory when omitted)
    #[arg(long)]
    pub extractor_model: Option<String>,

    /// Number of full passes through the training images
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Width of the word embedding vectors
    #[arg(long, default_value_t = 256)]
    pub d_embed: usize,

    /// Hidden width of the LSTM and the merge layers
    #[arg(long, default_value_t = 256)]
    pub d_hidden: usize,

    /// Dropout probability on both the image and caption branches
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Length of the encoder's embedding vectors
    #[arg(long, default_value_t = 2048)]
    pub feature_dim: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            captions_file:   a.captions_file,
            train_split:     a.train_split,
            images_dir:      a.images_dir,
            model_dir:       a.model_dir,
            extractor_model: a.extractor_model,
            epochs:          a.epochs,
            lr:              a.lr,
            d_embed:         a.d_embed,
            d_hidden:        a.d_hidden,
            dropout:         a.dropout,
            feature_dim:     a.feature_dim,
            // Filled in from the training data before training starts
            vocab_size:      0,
            max_caption_len: 0,
        }
    }
}

/// All arguments for the `caption` command
#[derive(Args, Debug)]
pub struct CaptionArgs {
    /// Path to the image to caption
    #[arg(long)]
    pub image: String,

    /// Directory where artifacts were saved during training
    #[arg(long, default_value = "models")]
    pub model_dir: String,

    /// Path to a local ONNX encoder model
    /// (must match the one used during training)
    #[arg(long)]
    pub extractor_model: Option<String>,
}
