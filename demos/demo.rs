//! Walkthrough of the seqscore library.

use seqscore::{builtin_registry, Scorer, ScorerConfig, ScorerConfigBuilder};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn main() -> anyhow::Result<()> {
    println!("=== seqscore Demo ===\n");

    // Demo 1: Registered metrics
    demo_registry()?;

    // Demo 2: Parallel scoring with tags
    demo_tagged_corpus()?;

    // Demo 3: TER worked example
    demo_ter()?;

    println!("\n=== Demo Complete ===");
    Ok(())
}

fn demo_registry() -> anyhow::Result<()> {
    println!("1. Registered Metrics");
    println!("---------------------");

    let registry = builtin_registry()?;
    for (id, name) in registry.list_ids_and_names() {
        println!("  {:<8} {}", id, name);
    }
    println!();
    Ok(())
}

fn demo_tagged_corpus() -> anyhow::Result<()> {
    println!("2. Multi-worker Scoring with Tags");
    println!("---------------------------------");

    let hypothesis = strings(&[
        "the cat sat on the mat",
        "a dog ran in the park",
        "birds sing in the morning",
        "it rained all day long",
    ]);
    let references = vec![strings(&[
        "the cat sat on a mat",
        "the dog ran in the park",
        "birds sing every morning",
        "it rained all day",
    ])];
    let tags = vec![
        strings(&["animals"]),
        strings(&["animals"]),
        strings(&["animals", "nature"]),
        strings(&["nature"]),
    ];

    let config = ScorerConfigBuilder::new()
        .sent_level(true)
        .n_workers(2)
        .extra_arg("tokenizer", "13a")
        .build()?;

    let registry = builtin_registry()?;
    for id in ["bleu", "chrf", "wer", "cider"] {
        let score = registry
            .scorer(id, config.clone())?
            .score(&hypothesis, &references, Some(&tags))?;
        println!("  {} ({})", registry.name(id)?, id);
        println!("    corpus: {:?}", score.corpus_score());
        println!("    sentences: {:?}", score.sent_scores());
        println!("    groups: {:?}", score.group_scores());
    }
    println!();
    Ok(())
}

fn demo_ter() -> anyhow::Result<()> {
    println!("3. Translation Edit Rate");
    println!("------------------------");

    let hypothesis =
        strings(&["THIS WEEK THE SAUDIS denied information published in the new york times"]);
    let references = vec![strings(&[
        "SAUDI ARABIA denied THIS WEEK information published in the AMERICAN new york times",
    ])];

    let config = ScorerConfig {
        corpus_level: false,
        sent_level: true,
        ..ScorerConfig::default()
    };
    let score = builtin_registry()?
        .scorer("ter", config)?
        .score(&hypothesis, &references, None)?;

    println!("  Hypothesis: {}", hypothesis[0]);
    println!("  Reference:  {}", references[0][0]);
    println!("  TER: {:?}", score.sent_scores());
    println!("\n  {}", score.to_json()?);
    Ok(())
}
