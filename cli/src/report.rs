//! Plain-text rendering of demo output.

use std::fmt::Write;

use stackrag_core::Answer;
use stackrag_core::QueryOutcome;
use stackrag_core::SearchMode;
use stackrag_core::protocol::ModelInfo;
use stackrag_memory::Document;

const RULE_WIDTH: usize = 60;
const PREVIEW_CHARS: usize = 80;

pub fn banner(title: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("{rule}\n{title}\n{rule}")
}

pub fn query_header(n: usize, query: &str) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    format!("{rule}\nQuery {n}: {query}\n{rule}")
}

pub fn models(models: &[ModelInfo]) -> String {
    let mut out = String::from("✓ Available models:\n");
    for m in models {
        let _ = writeln!(out, "  - {} ({})", m.id, m.model_type().unwrap_or("unknown"));
    }
    out
}

pub fn documents(documents: &[Document]) -> String {
    let mut out = String::from("Documents in knowledge base:\n");
    for (i, doc) in documents.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, doc.preview(PREVIEW_CHARS));
    }
    out
}

pub fn outcome(outcome: &QueryOutcome) -> String {
    let mut out = String::new();
    if outcome.hits.is_empty() {
        out.push_str("\n✗ No results found\n");
        return out;
    }
    out.push_str("\nMost relevant documents:\n");
    for (j, hit) in outcome.hits.iter().enumerate() {
        let _ = writeln!(out, "  {}. {} (similarity: {:.3})", j + 1, hit.source, hit.score);
    }
    match &outcome.answer {
        Answer::Generated(text) => {
            let _ = writeln!(out, "\nAnswer: {text}");
        }
        Answer::Failed(reason) => {
            let _ = writeln!(out, "\n✗ Failed to generate answer: {reason}");
        }
        Answer::Skipped => {}
    }
    out
}

pub fn summary(mode: SearchMode) -> String {
    let search_steps: &[&str] = match mode {
        SearchMode::VectorStore => &[
            "Creating a vector store using the vector_io API",
            "Inserting vectors into the vector store for persistent storage",
            "Semantic search using server-side vector similarity",
        ],
        SearchMode::Local => &["Semantic search using in-process cosine similarity"],
    };
    let head = [
        "Model discovery (inference and embedding models)",
        "Generating embeddings for documents",
    ];
    let tail = ["Context-aware question answering with chat completions"];
    let steps = head.iter().chain(search_steps).chain(&tail);

    let mut out = String::from("\nThis demo showed:\n");
    for (i, step) in steps.enumerate() {
        let _ = writeln!(out, "  {}. {step}", i + 1);
    }
    out.push_str("\nTo run your own queries, set `queries` in config.toml.\n");
    out
}
