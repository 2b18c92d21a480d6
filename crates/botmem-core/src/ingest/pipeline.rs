//! `IngestPipeline` turns conversation text into store writes.
//!
//! One backend call, one strict parse, then writes in a fixed order:
//! blocks, facts, triplets, summary. The first failed write aborts the run;
//! writes already made are kept.

use botmem_types::error::{IngestError, StoreKind};
use botmem_types::extraction::{ExtractionResult, IngestStage};
use botmem_types::llm::{CompletionRequest, Message};

use crate::llm::box_provider::BoxLlmProvider;
use crate::memory::box_embedder::BoxEmbedder;
use crate::memory::store::{
    ArchivalRepository, BlockRepository, GraphRepository, SummaryRepository,
};
use crate::memory::vector::serialize_embedding;

use super::prompt::{EXTRACTION_SYSTEM_PROMPT, parse_extraction};

/// Output budget for one extraction call.
pub const EXTRACTION_MAX_TOKENS: u32 = 4096;

/// Level assigned to the summary produced by an extraction run.
pub const INGEST_SUMMARY_LEVEL: u32 = 0;

/// Ask the backend for an extraction of `text` and parse the reply.
#[tracing::instrument(
    name = "ingest_extract",
    skip(provider, text),
    fields(backend = %provider.name(), model = %provider.model(), text_len = text.len())
)]
pub async fn extract(provider: &BoxLlmProvider, text: &str) -> Result<ExtractionResult, IngestError> {
    let request = CompletionRequest {
        model: String::new(), // Provider uses its configured model
        messages: vec![Message::user(text)],
        system: Some(EXTRACTION_SYSTEM_PROMPT.to_string()),
        max_tokens: EXTRACTION_MAX_TOKENS,
        temperature: Some(0.0),
        json_output: true,
    };

    let response = provider
        .complete(&request)
        .await
        .map_err(|source| IngestError::Backend {
            backend: provider.name().to_string(),
            source,
        })?;
    tracing::debug!(stage = %IngestStage::BackendInvoked, bytes = response.content.len());

    let result = parse_extraction(&response.content)?;
    tracing::debug!(
        stage = %IngestStage::ResultParsed,
        block_updates = result.block_updates.len(),
        facts = result.facts.len(),
        triplets = result.triplets.len(),
        has_summary = !result.summary.is_empty(),
    );
    Ok(result)
}

/// Extraction pipeline bound to a backend, an optional embedder and the four stores.
///
/// The backend is chosen by the caller from explicit configuration; the
/// pipeline itself never consults the environment.
pub struct IngestPipeline<B, A, G, S> {
    provider: BoxLlmProvider,
    embedder: Option<BoxEmbedder>,
    blocks: B,
    archival: A,
    graph: G,
    summaries: S,
}

impl<B, A, G, S> IngestPipeline<B, A, G, S>
where
    B: BlockRepository,
    A: ArchivalRepository,
    G: GraphRepository,
    S: SummaryRepository,
{
    pub fn new(
        provider: BoxLlmProvider,
        embedder: Option<BoxEmbedder>,
        blocks: B,
        archival: A,
        graph: G,
        summaries: S,
    ) -> Self {
        Self {
            provider,
            embedder,
            blocks,
            archival,
            graph,
            summaries,
        }
    }

    pub fn provider(&self) -> &BoxLlmProvider {
        &self.provider
    }

    /// Run one extraction and apply it. Returns the full result on success.
    #[tracing::instrument(name = "ingest", skip(self, text), fields(backend = %self.provider.name()))]
    pub async fn run(&self, text: &str) -> Result<ExtractionResult, IngestError> {
        tracing::debug!(stage = %IngestStage::BackendSelected);

        let outcome = async {
            let result = extract(&self.provider, text).await?;
            self.apply(&result).await?;
            Ok::<_, IngestError>(result)
        }
        .await;

        match &outcome {
            Ok(_) => tracing::info!(stage = %IngestStage::Done, "extraction applied"),
            Err(e) => tracing::warn!(stage = %IngestStage::Failed, error = %e, "extraction failed"),
        }
        outcome
    }

    /// Write a parsed result to the stores in order.
    pub async fn apply(&self, result: &ExtractionResult) -> Result<(), IngestError> {
        for update in &result.block_updates {
            self.blocks
                .set(&update.label, &update.content)
                .await
                .map_err(|source| IngestError::Store {
                    store: StoreKind::Block,
                    source,
                })?;
        }

        for fact in &result.facts {
            let embedding = self.embed_fact(&fact.content).await;
            self.archival
                .add(&fact.content, &fact.tags, embedding.as_deref())
                .await
                .map_err(|source| IngestError::Store {
                    store: StoreKind::Archival,
                    source,
                })?;
        }

        for triplet in &result.triplets {
            self.graph
                .add_relation(&triplet.subject, &triplet.predicate, &triplet.object, "")
                .await
                .map_err(|source| IngestError::Store {
                    store: StoreKind::Graph,
                    source,
                })?;
        }

        if !result.summary.is_empty() {
            self.summaries
                .add(INGEST_SUMMARY_LEVEL, &result.summary, "")
                .await
                .map_err(|source| IngestError::Store {
                    store: StoreKind::Summary,
                    source,
                })?;
        }

        tracing::debug!(stage = %IngestStage::StoresUpdated);
        Ok(())
    }

    /// Best-effort embedding. Failures are logged and the fact is stored without a vector.
    async fn embed_fact(&self, content: &str) -> Option<Vec<u8>> {
        let embedder = self.embedder.as_ref()?;
        match embedder.embed_one(content).await {
            Ok(vector) => Some(serialize_embedding(&vector)),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    model = embedder.model_name(),
                    "embedding failed; storing fact without vector"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use botmem_types::llm::{CompletionResponse, LlmError, Usage};

    use crate::llm::provider::LlmProvider;

    /// Returns a fixed reply and records the last request it saw.
    struct ScriptedProvider {
        reply: Result<String, u16>,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                last_request: Mutex::new(None),
            }
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.reply {
                Ok(text) => Ok(CompletionResponse {
                    content: text.clone(),
                    model: "scripted-model".to_string(),
                    usage: Usage::default(),
                }),
                Err(status) => Err(LlmError::Status {
                    status: *status,
                    body: "{\"error\":\"overloaded\"}".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_extract_parses_fenced_reply() {
        let provider = ScriptedProvider::ok("```json\n{\"summary\": \"ok\"}\n```");
        let result = extract(&BoxLlmProvider::new(provider), "I'm Stuart").await.unwrap();
        assert_eq!(result.summary, "ok");
    }

    #[tokio::test]
    async fn test_extract_request_shape() {
        let provider = std::sync::Arc::new(ScriptedProvider::ok("{}"));

        struct Shared(std::sync::Arc<ScriptedProvider>);
        impl LlmProvider for Shared {
            fn name(&self) -> &str {
                self.0.name()
            }
            fn model(&self) -> &str {
                self.0.model()
            }
            async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
                self.0.complete(request).await
            }
        }

        let boxed = BoxLlmProvider::new(Shared(provider.clone()));
        extract(&boxed, "hello there").await.unwrap();

        let request = provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.system.as_deref(), Some(EXTRACTION_SYSTEM_PROMPT));
        assert_eq!(request.user_text(), "hello there");
        assert_eq!(request.max_tokens, EXTRACTION_MAX_TOKENS);
        assert!(request.json_output);
    }

    #[tokio::test]
    async fn test_extract_backend_error_names_backend() {
        let provider = ScriptedProvider {
            reply: Err(529),
            last_request: Mutex::new(None),
        };
        let err = extract(&BoxLlmProvider::new(provider), "x").await.unwrap_err();
        match err {
            IngestError::Backend { backend, source } => {
                assert_eq!(backend, "scripted");
                assert!(source.to_string().contains("529"));
            }
            other => panic!("expected Backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_extract_non_json_is_schema_error() {
        let provider = ScriptedProvider::ok("Here are the facts I found: none.");
        let err = extract(&BoxLlmProvider::new(provider), "x").await.unwrap_err();
        assert!(matches!(err, IngestError::Schema { .. }));
    }
}
