use async_trait::async_trait;
use pretty_assertions::assert_eq;
use report_retrieval::{
    analyze_metrics, AnswerSynthesizer, Generator, RetrievalConfig, RetrievalEngine,
    RetrievalError, Role, StructuredAnswer,
};
use report_vector_store::{
    CancellationToken, Embedder, HashEmbedder, Result as StoreResult, VectorStoreError,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Replays canned replies in order and records every prompt it receives
#[derive(Default)]
struct ScriptedGenerator {
    replies: Mutex<VecDeque<report_retrieval::Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn with_replies(replies: Vec<report_retrieval::Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::default(),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn complete(&self, prompt: &str) -> report_retrieval::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RetrievalError::generation("script exhausted")))
    }
}

/// Hash embeddings that start failing once tripped
struct TrippableEmbedder {
    inner: HashEmbedder,
    tripped: AtomicBool,
}

#[async_trait]
impl Embedder for TrippableEmbedder {
    fn name(&self) -> &str {
        "trippable"
    }

    async fn embed(&self, texts: &[String]) -> StoreResult<Vec<Vec<f32>>> {
        if self.tripped.load(Ordering::SeqCst) {
            return Err(VectorStoreError::embedding("backend unavailable"));
        }
        self.inner.embed(texts).await
    }
}

const REPORT: &str = "Revenue grew twelve percent to ten million dollars while \
operating margin held steady at twenty five percent.";

const WELL_FORMED: &str = "1. Key Findings:
- Revenue grew 12%

2. Detailed Analysis:
Retail drove the increase.

3. Summary:
Strong year.";

fn numbered_words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

fn engine_with(generator: Arc<dyn Generator>) -> RetrievalEngine {
    RetrievalEngine::new(
        RetrievalConfig::default(),
        Arc::new(HashEmbedder::new(64)),
        generator,
    )
    .unwrap()
}

#[tokio::test]
async fn answer_requires_ingest() {
    let generator = ScriptedGenerator::with_replies(vec![Ok(WELL_FORMED.to_string())]);
    let engine = engine_with(generator.clone());

    let err = engine.answer("How did revenue develop?").await.unwrap_err();
    assert!(matches!(err, RetrievalError::NotIngested));
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn answer_parses_sections_and_sends_context() {
    let generator = ScriptedGenerator::with_replies(vec![Ok(WELL_FORMED.to_string())]);
    let mut engine = engine_with(generator.clone());
    engine.ingest(REPORT).await.unwrap();
    assert_eq!(engine.chunk_count().await, 1);

    let answer = engine.answer("How did revenue develop?").await.unwrap();
    assert_eq!(
        answer,
        StructuredAnswer {
            key_findings: "- Revenue grew 12%".to_string(),
            detailed_analysis: "Retail drove the increase.".to_string(),
            summary: "Strong year.".to_string(),
        }
    );

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(&format!("Context:\n{REPORT}\n")));
    assert!(prompts[0].contains("Question:\nHow did revenue develop?"));
}

#[tokio::test]
async fn malformed_reply_keeps_raw_text() {
    let reply = "Revenue went up. That is all I can say.";
    let generator = ScriptedGenerator::with_replies(vec![Ok(reply.to_string())]);
    let mut engine = engine_with(generator);
    engine.ingest(REPORT).await.unwrap();

    match engine.answer("How did revenue develop?").await {
        Err(RetrievalError::MalformedResponse { raw, .. }) => assert_eq!(raw, reply),
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn section_analysis_asks_each_field_in_order() {
    let generator = ScriptedGenerator::with_replies(vec![
        Ok(WELL_FORMED.to_string()),
        Ok(WELL_FORMED.to_string()),
        Ok(WELL_FORMED.to_string()),
    ]);
    let mut engine = engine_with(generator.clone());
    engine.ingest(REPORT).await.unwrap();

    let sections: [(&str, &[&str]); 2] = [
        ("Fiscal Year Highlights", &["revenue_growth", "net_income"]),
        ("Risk Management", &["key_risks"]),
    ];
    let results = engine.analyze_sections(&sections).await.unwrap();

    let layout: Vec<(&str, Vec<&str>)> = results
        .iter()
        .map(|s| {
            (
                s.section.as_str(),
                s.fields.iter().map(|f| f.field.as_str()).collect(),
            )
        })
        .collect();
    assert_eq!(
        layout,
        vec![
            ("Fiscal Year Highlights", vec!["Revenue Growth", "Net Income"]),
            ("Risk Management", vec!["Key Risks"]),
        ]
    );
    assert_eq!(results[1].fields[0].answer.summary, "Strong year.");

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0]
        .contains("What are the Revenue Growth in the Fiscal Year Highlights section?"));
    assert!(prompts[1].contains("What are the Net Income in the Fiscal Year Highlights section?"));
    assert!(prompts[2].contains("What are the Key Risks in the Risk Management section?"));
}

#[tokio::test]
async fn section_analysis_stops_at_first_failure() {
    let generator = ScriptedGenerator::with_replies(vec![
        Ok(WELL_FORMED.to_string()),
        Ok("no markers here".to_string()),
        Ok(WELL_FORMED.to_string()),
    ]);
    let mut engine = engine_with(generator.clone());
    engine.ingest(REPORT).await.unwrap();

    let sections: [(&str, &[&str]); 1] =
        [("Outlook", &["guidance", "capital_allocation", "dividends"])];
    let err = engine.analyze_sections(&sections).await.unwrap_err();

    assert!(matches!(err, RetrievalError::MalformedResponse { .. }));
    assert_eq!(generator.prompts().len(), 2);
}

#[tokio::test]
async fn generation_failure_propagates() {
    let generator =
        ScriptedGenerator::with_replies(vec![Err(RetrievalError::generation("rate limited"))]);
    let mut engine = engine_with(generator);
    engine.ingest(REPORT).await.unwrap();

    let err = engine.answer("How did revenue develop?").await.unwrap_err();
    assert!(matches!(err, RetrievalError::GenerationError(_)));
}

#[tokio::test]
async fn reingest_replaces_previous_document() {
    let mut engine = engine_with(ScriptedGenerator::with_replies(vec![]));
    engine.ingest(&numbered_words(1200)).await.unwrap();
    assert_eq!(engine.chunk_count().await, 3);

    engine.ingest(REPORT).await.unwrap();
    assert_eq!(engine.chunk_count().await, 1);

    let hits = engine.retrieve(REPORT, 5).await.unwrap();
    assert_eq!(hits, vec![REPORT.to_string()]);
}

#[tokio::test]
async fn retrieve_ranks_exact_chunk_first() {
    let mut engine = engine_with(ScriptedGenerator::with_replies(vec![]));
    let document = numbered_words(1200);
    engine.ingest(&document).await.unwrap();

    let words: Vec<&str> = document.split_whitespace().collect();
    let middle = words[450..950].join(" ");

    let hits = engine.retrieve_default(&middle).await.unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0], middle);
}

#[tokio::test]
async fn failed_ingest_keeps_prior_document() {
    let embedder = Arc::new(TrippableEmbedder {
        inner: HashEmbedder::new(32),
        tripped: AtomicBool::new(false),
    });
    let mut engine = RetrievalEngine::new(
        RetrievalConfig::default(),
        embedder.clone(),
        ScriptedGenerator::with_replies(vec![]),
    )
    .unwrap();
    engine.ingest(REPORT).await.unwrap();

    embedder.tripped.store(true, Ordering::SeqCst);
    let err = engine.ingest(&numbered_words(1200)).await.unwrap_err();
    assert!(matches!(
        err,
        RetrievalError::VectorStoreError(VectorStoreError::EmbeddingError(_))
    ));

    embedder.tripped.store(false, Ordering::SeqCst);
    assert_eq!(engine.chunk_count().await, 1);
    assert_eq!(
        engine.retrieve_default(REPORT).await.unwrap(),
        vec![REPORT.to_string()]
    );
}

#[tokio::test]
async fn cancelled_ingest_keeps_prior_document() {
    let mut engine = engine_with(ScriptedGenerator::with_replies(vec![]));
    engine.ingest(REPORT).await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = engine
        .ingest_with_cancel(&numbered_words(1200), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RetrievalError::VectorStoreError(VectorStoreError::Cancelled)
    ));
    assert_eq!(engine.chunk_count().await, 1);
}

#[tokio::test]
async fn saved_index_reopens_in_new_session() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_with(ScriptedGenerator::with_replies(vec![]));
    engine.ingest(&numbered_words(1200)).await.unwrap();
    engine.save_index(dir.path()).await.unwrap();

    let mut reopened = engine_with(ScriptedGenerator::with_replies(vec![]));
    reopened.load_index(dir.path()).await.unwrap();
    assert!(reopened.is_ingested());
    assert_eq!(reopened.chunk_count().await, 3);

    let query = numbered_words(500);
    assert_eq!(
        reopened.retrieve(&query, 1).await.unwrap(),
        engine.retrieve(&query, 1).await.unwrap()
    );
}

#[tokio::test]
async fn save_before_ingest_fails() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(ScriptedGenerator::with_replies(vec![]));
    assert!(matches!(
        engine.save_index(dir.path()).await,
        Err(RetrievalError::NotIngested)
    ));
}

#[tokio::test]
async fn synthesizer_threads_transcript_through_prompts() {
    let generator = ScriptedGenerator::with_replies(vec![
        Ok("Revenue was USD 10M.".to_string()),
        Err(RetrievalError::generation("timeout")),
        Ok("Margin was 25%.".to_string()),
    ]);
    let mut chat = AnswerSynthesizer::new(generator.clone());
    let context = json!({ "revenue": "USD 10M", "margin": 0.25 });

    let first = chat.ask(&context, "What was revenue?").await.unwrap();
    assert_eq!(first, "Revenue was USD 10M.");
    assert_eq!(chat.transcript().len(), 2);

    assert!(chat.ask(&context, "And margin?").await.is_err());
    assert_eq!(chat.transcript().len(), 2);

    let third = chat.ask(&context, "And margin?").await.unwrap();
    assert_eq!(third, "Margin was 25%.");

    let roles: Vec<Role> = chat.transcript().iter().map(|turn| turn.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );

    let prompts = generator.prompts();
    assert!(prompts[0].contains("\nrevenue:\nUSD 10M\n"));
    assert!(prompts[0].contains("\nmargin:\n0.25\n"));
    assert!(prompts[2].contains("User: What was revenue?\nAssistant: Revenue was USD 10M.\n"));

    chat.clear();
    assert!(chat.transcript().is_empty());
}

#[tokio::test]
async fn metrics_review_sends_rendered_metrics() {
    let generator = ScriptedGenerator::with_replies(vec![Ok("Trends look stable.".to_string())]);
    let metrics = json!({ "pe_ratio": 14.5 });

    let review = analyze_metrics(generator.as_ref(), &metrics, "valuation")
        .await
        .unwrap();

    assert_eq!(review, "Trends look stable.");
    let prompts = generator.prompts();
    assert!(prompts[0].starts_with("Analyze these valuation financial metrics:\n"));
    assert!(prompts[0].contains("\"pe_ratio\": 14.5"));
}
