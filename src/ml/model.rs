use burn::{
    nn::{
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig,
    },
    prelude::*,
    tensor::activation::relu,
    tensor::backend::AutodiffBackend,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct CaptionModelConfig {
    pub vocab_size:      usize,
    pub max_caption_len: usize,
    pub feature_dim:     usize,
    pub d_embed:         usize,
    pub d_hidden:        usize,
    pub dropout:         f64,
}

impl CaptionModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CaptionModel<B> {
        let image_dropout = DropoutConfig::new(self.dropout).init();
        let image_proj    = LinearConfig::new(self.feature_dim, self.d_hidden).init(device);
        let embedding     = EmbeddingConfig::new(self.vocab_size, self.d_embed).init(device);
        let seq_dropout   = DropoutConfig::new(self.dropout).init();
        let lstm          = LstmConfig::new(self.d_embed, self.d_hidden, true).init(device);
        let merge_proj    = LinearConfig::new(self.d_hidden, self.d_hidden).init(device);
        let word_head     = LinearConfig::new(self.d_hidden, self.vocab_size).init(device);
        CaptionModel {
            image_dropout, image_proj,
            embedding, seq_dropout, lstm,
            merge_proj, word_head,
            max_caption_len: self.max_caption_len,
        }
    }
}

/// The fusion network: a dense image branch and a recurrent caption
/// branch merged by elementwise addition.
///
///   features [B, F] → dropout → linear → relu                ┐
///                                                            ├─ add → linear → relu → linear → logits [B, V]
///   prefix [B, L] → embedding → dropout → LSTM → last hidden ┘
#[derive(Module, Debug)]
pub struct CaptionModel<B: Backend> {
    pub image_dropout:   Dropout,
    pub image_proj:      Linear<B>,
    pub embedding:       Embedding<B>,
    pub seq_dropout:     Dropout,
    pub lstm:            Lstm<B>,
    pub merge_proj:      Linear<B>,
    pub word_head:       Linear<B>,
    pub max_caption_len: usize,
}

impl<B: Backend> CaptionModel<B> {
    /// features: [batch, feature_dim], prefixes: [batch, max_caption_len]
    /// → next-word logits: [batch, vocab_size]
    pub fn forward(
        &self,
        features: Tensor<B, 2>,
        prefixes: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        // Image branch: compress the embedding to the hidden width
        let image = relu(self.image_proj.forward(self.image_dropout.forward(features)));

        // Caption branch: embed the prefix and run it through the LSTM,
        // keeping only the hidden state of the final time step
        let embedded = self.seq_dropout.forward(self.embedding.forward(prefixes));
        let (hidden_seq, _state) = self.lstm.forward(embedded, None);

        let [batch_size, seq_len, d_hidden] = hidden_seq.dims();
        let last_hidden = hidden_seq
            .slice([0..batch_size, seq_len - 1..seq_len, 0..d_hidden])
            .reshape([batch_size, d_hidden]);

        // Merge both branches and project to the vocabulary
        let merged = relu(self.merge_proj.forward(image + last_hidden));
        self.word_head.forward(merged)
    }

    /// Cross-entropy against the true next-word index.
    /// Equivalent to categorical cross-entropy against the one-hot target.
    pub fn forward_loss(
        &self,
        features: Tensor<B, 2>,
        prefixes: Tensor<B, 2, Int>,
        targets:  Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>)
    where
        B: AutodiffBackend,
    {
        let logits = self.forward(features, prefixes);
        let ce = burn::nn::loss::CrossEntropyLossConfig::new()
            .init(&logits.device());
        let loss = ce.forward(logits.clone(), targets);
        (loss, logits)
    }
}
