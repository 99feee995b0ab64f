// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full training loop over the lazy Example Generator using Adam.
//
// One "step" consumes every example derived from one image, so an
// epoch is exactly one pass over the training images. The generator
// cycles indefinitely; the epoch boundary is the step counter, not
// generator exhaustion. No shuffling — examples arrive in mapping
// iteration order, matching the generator contract.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::CaptionBatcher, generator::ExampleGenerator, tokenizer::CaptionTokenizer};
use crate::domain::captions::CaptionSet;
use crate::domain::features::FeatureMap;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{CaptionModel, CaptionModelConfig};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

pub fn run_training(
    cfg:          &TrainConfig,
    captions:     &CaptionSet,
    features:     &FeatureMap,
    tokenizer:    &CaptionTokenizer,
    ckpt_manager: CheckpointManager,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, captions, features, tokenizer, ckpt_manager, device)
}

fn train_loop(
    cfg:          &TrainConfig,
    captions:     &CaptionSet,
    features:     &FeatureMap,
    tokenizer:    &CaptionTokenizer,
    ckpt_manager: CheckpointManager,
    device:       burn::backend::wgpu::WgpuDevice,
) -> Result<()> {

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = CaptionModelConfig::new(
        cfg.vocab_size, cfg.max_caption_len, cfg.feature_dim,
        cfg.d_embed, cfg.d_hidden, cfg.dropout,
    );
    let mut model: CaptionModel<MyBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: vocab_size={}, max_caption_len={}, d_hidden={}",
        cfg.vocab_size, cfg.max_caption_len, cfg.d_hidden,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    let batcher = CaptionBatcher::<MyBackend>::new(device.clone());
    let metrics = MetricsLogger::new(&cfg.model_dir)?;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        // A fresh generator starts each epoch at image 0; the example
        // order is identical across epochs
        let mut generator = ExampleGenerator::new(captions, features, tokenizer, cfg.max_caption_len);
        let steps = generator.images_per_epoch();

        let mut loss_sum      = 0.0f64;
        let mut batches       = 0usize;
        let mut examples_seen = 0usize;

        for _step in 0..steps {
            let Some(items) = generator.next() else { break };
            // An image whose captions all encode to ≤ 1 token produces
            // an empty batch — nothing to learn from
            if items.is_empty() {
                continue;
            }

            let batch = batcher.batch(&items);
            let (loss, _logits) = model.forward_loss(batch.features, batch.prefixes, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            loss_sum      += loss_val;
            batches       += 1;
            examples_seen += items.len();

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };

        println!(
            "Epoch {:>3}/{} | loss={:.4} | images={} | examples={}",
            epoch, cfg.epochs, avg_loss, steps, examples_seen,
        );

        metrics.log(&EpochMetrics::new(epoch, avg_loss, examples_seen))?;
        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete!");
    Ok(())
}
