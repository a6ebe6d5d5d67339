use rs_predict_core::model::prediction_model::{Language, ModelConfig, PredictionModel};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows stage and query timings
    env_logger::init();

    // Language packs are read from "./data/language-pack/<language>/"
    // (paragraphs.txt for next-word prediction, words.txt for completion)
    let config = ModelConfig::new("./data").with_language(Language::default());
    let mut model = PredictionModel::new(config);

    // Queries fail until the model is initialized
    match model.predict_next("the") {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Before initialize: {}", e),
    }

    // Load both corpora and build the mappings
    // Passing Some(language) would switch language first
    model.initialize(None)?;
    println!("Language: {}, initialized: {}", model.language(), model.is_initialized());

    // Next-word prediction, plain and with relative frequencies
    for context in ["the", "of", "unknown-context"] {
        println!("After '{}': {:?}", context, model.predict_next(context)?);
        for result in model.predict_next_with_confidence(context)?.iter().take(3) {
            println!("  {} ({:.0}%, seen {} times)", result.word, result.confidence * 100.0, result.frequency);
        }
    }

    // Completion, lexicographic and re-ranked by confidence
    for prefix in ["th", "pre", "xyz"] {
        println!("Completing '{}': {:?}", prefix, model.complete(prefix)?);
        for result in model.complete_with_confidence(prefix)?.iter().take(3) {
            println!("  {} ({:.0}%, {:.0}% typed)", result.word, result.confidence * 100.0, result.prefix_match * 100.0);
        }
    }

    // Informational only
    let metrics = model.metrics();
    println!(
        "Initialized in {:.2}ms: {} unique words, {} completion prefixes",
        metrics.initialization_ms, metrics.stats.unique_words, metrics.stats.completion_prefixes
    );

    // Reset drops everything, the model can be initialized again
    model.reset();
    println!("After reset, initialized: {}", model.is_initialized());

    Ok(())
}
