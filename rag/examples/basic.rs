//! Basic retrieval flow: chunk a text, index it with a toy embedder, expand the best hits.

use stitch_core::EmbeddingModel;
use stitch_rag::{FlatIndex, RagConfig, RagStore, Retriever, Seam};
use tracing_subscriber::EnvFilter;

/// Bag-of-words embedder hashing each lowercase word into one of 64 buckets.
#[derive(Clone)]
struct DemoEmbedder;

impl EmbeddingModel for DemoEmbedder {
    fn dim(&self) -> usize {
        64
    }

    async fn embed(&self, text: &str) -> stitch_core::Result<Vec<f32>> {
        let mut vector = vec![0.0; self.dim()];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(usize::from(b)));
            vector[bucket % self.dim()] += 1.0;
        }
        Ok(vector)
    }
}

const MANUAL: &str = "\
The kettle must be filled with fresh water before every use. Never fill it past the MAX line. \
To descale the kettle, mix one part vinegar with two parts water and bring it to the boil. \
Leave the solution overnight, then rinse the kettle three times with clean water. \
The warranty covers manufacturing defects for two years from the date of purchase. \
It does not cover damage caused by limescale, so descale the kettle regularly. \
To claim under the warranty, return the kettle with the original receipt.";

#[tokio::main]
async fn main() -> stitch_rag::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = RagConfig::builder()
        .chunking(120, 30)
        .num_neighbors(1)
        .similarity_threshold(0.1)
        .build();
    let store = RagStore::with_index(DemoEmbedder, FlatIndex::new(64), config.clone())?;

    let chunks = store.ingest_text(MANUAL).await?;
    println!("Indexed {chunks} chunks");

    let retriever = Retriever::from_config(store, &config)?;
    let retrieval = retriever.retrieve("how do I descale the kettle?", 2).await?;

    println!("Top windows:");
    for (rank, scored) in retrieval.windows.iter().enumerate() {
        let window = &scored.window;
        println!(
            "{rank}: chunk {} (score = {:.3}) covering {:?}, chars {:?}",
            window.hit_index, scored.score, window.covered_indices, window.source_range
        );
        for seam in &window.seams {
            if let Seam::Gap { missing_chars } = seam {
                println!("   gap of {missing_chars} characters");
            }
        }
        println!("   {}", window.text);
    }
    if retrieval.skipped.total() > 0 {
        println!("Skipped {} hits", retrieval.skipped.total());
    }

    Ok(())
}
