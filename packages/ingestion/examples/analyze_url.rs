//! Analyze a URL from the command line.
//!
//! ```sh
//! OPENROUTER_API_KEY=sk-or-... cargo run --example analyze_url -- https://example.com/article
//! ```

use ingestion::{AnalyzeRequest, EmbeddingParts, IngestionConfig, Pipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ingestion=debug,openrouter_client=debug".into()),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .ok_or("usage: analyze_url <url>")?;

    let config = IngestionConfig::from_env()?;
    let pipeline = Pipeline::from_config(&config);

    let envelope = pipeline.analyze(&AnalyzeRequest::for_url(&url)).await?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);

    let outcome = pipeline
        .embed(&EmbeddingParts {
            title: &envelope.title,
            summary: envelope.summary.as_deref(),
            tags: &envelope.tags,
            content: envelope.extracted_text.as_deref(),
        })
        .await?;

    match outcome {
        ingestion::EmbeddingOutcome::Embedded(vector) => {
            println!("embedding: {} dimensions", vector.len());
        }
        ingestion::EmbeddingOutcome::NoContent => println!("embedding: nothing to embed"),
    }

    Ok(())
}
