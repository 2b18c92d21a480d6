//! Read-only aggregation of blocks, summaries and relations.

use std::collections::HashSet;

use botmem_types::error::{ContextError, StoreKind};
use botmem_types::memory::{CORE_BLOCK_TYPE, ContextPayload};

use crate::memory::store::{BlockRepository, GraphRepository, SummaryRepository};

/// Number of level-0 summaries included in the payload.
pub const RECENT_SUMMARY_COUNT: i64 = 5;

/// Builds a [`ContextPayload`] from the block, summary and graph stores.
///
/// Holds no state between calls; every `build` reads the stores afresh.
pub struct ContextAssembler<B, S, G> {
    blocks: B,
    summaries: S,
    graph: G,
}

impl<B, S, G> ContextAssembler<B, S, G>
where
    B: BlockRepository,
    S: SummaryRepository,
    G: GraphRepository,
{
    pub fn new(blocks: B, summaries: S, graph: G) -> Self {
        Self {
            blocks,
            summaries,
            graph,
        }
    }

    /// Assemble the payload. Any failed read aborts with the store's name.
    #[tracing::instrument(skip(self))]
    pub async fn build(&self) -> Result<ContextPayload, ContextError> {
        let core_blocks = self
            .blocks
            .list(CORE_BLOCK_TYPE)
            .await
            .map_err(|source| ContextError {
                store: StoreKind::Block,
                source,
            })?;

        let recent_summaries = self
            .summaries
            .list(0, RECENT_SUMMARY_COUNT)
            .await
            .map_err(|source| ContextError {
                store: StoreKind::Summary,
                source,
            })?;

        let graph_err = |source| ContextError {
            store: StoreKind::Graph,
            source,
        };
        let entities = self.graph.list_entities("").await.map_err(graph_err)?;

        let mut seen = HashSet::new();
        let mut relations = Vec::new();
        for entity in &entities {
            for relation in self.graph.query_entity(&entity.name).await.map_err(graph_err)? {
                if seen.insert(relation.id) {
                    relations.push(relation);
                }
            }
        }

        tracing::debug!(
            core_blocks = core_blocks.len(),
            summaries = recent_summaries.len(),
            relations = relations.len(),
            "context assembled"
        );

        Ok(ContextPayload {
            core_blocks,
            recent_summaries,
            relations,
        })
    }
}
