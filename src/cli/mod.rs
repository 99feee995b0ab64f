// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// The entry point for all user interaction. Uses the `clap`
// crate to parse command line arguments; all business logic is
// delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`   — preprocesses the dataset and trains the model
//   2. `caption` — loads a checkpoint and captions one image
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{CaptionArgs, Commands, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "image-captioner",
    version = "0.1.0",
    about = "Train a CNN+LSTM captioning model on a photo dataset, then caption new images."
)]
pub struct Cli {
    /// The subcommand to run (train or caption)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => Self::run_train(args),
            Commands::Caption(args) => Self::run_caption(args),
        }
    }

    /// Handles the `train` subcommand.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on captions in: {}", args.captions_file);

        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Checkpoint saved.");
        Ok(())
    }

    /// Handles the `caption` subcommand.
    /// Embeds the image, decodes a caption, and prints it.
    fn run_caption(args: CaptionArgs) -> Result<()> {
        use crate::application::caption_use_case::CaptionUseCase;
        use std::path::Path;

        let use_case = CaptionUseCase::new(
            args.model_dir.clone(),
            args.extractor_model.clone(),
        )?;

        let caption = use_case.caption(Path::new(&args.image))?;
        println!("\n{}", args.image);
        println!("Caption: {}", caption);
        Ok(())
    }
}
