// crates/blockdrag-core/src/runtime/fixtures.rs
// ============================================================================
// Module: Fixture Builder
// Description: Creates and removes the documents a run operates on.
// Purpose: Hold fixture state in an explicit context passed between phases.
// Dependencies: crate::{core, interfaces}, serde_json, tracing
// ============================================================================

//! ## Overview
//! A [`FixturePlan`] lists the blocks of the parent document, which of them
//! receive seeds, and which are tracked by the expected-order oracle. The
//! builder creates the user, the seeds, and the parent, and returns a
//! [`FixtureContext`] owning every created id. Teardown deletes all of them
//! and is attempted even when the run failed; a partially created fixture is
//! torn down before the creation error is returned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;
use tracing::info;
use tracing::warn;

use crate::core::AppleBlock;
use crate::core::AppleConditionalFields;
use crate::core::Block;
use crate::core::Collection;
use crate::core::Credentials;
use crate::core::DocId;
use crate::core::Fruit;
use crate::core::PearBlock;
use crate::core::Seed;
use crate::core::SeedRef;
use crate::core::User;
use crate::interfaces::DocumentStore;
use crate::interfaces::StoreError;
use crate::runtime::error::HarnessError;

// ============================================================================
// SECTION: Plan
// ============================================================================

/// Default number of seeds created per seeded block.
pub const DEFAULT_SEEDS_PER_BLOCK: usize = 2;

/// One block of the parent document.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockPlan {
    /// Block data; seed references are filled in by the builder.
    pub block: Block,
    /// Name prefix of the seeds created for this block; `None` creates none.
    pub seed_prefix: Option<String>,
    /// Whether the expected-order tracker follows this block.
    pub tracked: bool,
}

/// Documents to create before a run.
#[derive(Debug, Clone, PartialEq)]
pub struct FixturePlan {
    /// Admin user to create, if any.
    pub user: Option<Credentials>,
    /// Blocks of the parent document in initial order.
    pub blocks: Vec<BlockPlan>,
    /// Seeds created per seeded block.
    pub seeds_per_block: usize,
}

impl FixturePlan {
    /// Plan reproducing the reorder race.
    ///
    /// Two apples (conditional group on and off), one pear, and an untracked
    /// trailing pear that enlarges the drop area below the third row.
    #[must_use]
    pub fn reproduction(user: Option<Credentials>) -> Self {
        let apple_a = Block::Apple(AppleBlock {
            block_name: Some("Apple A With Conditional fields".to_string()),
            apple_kind: Some("Apple With Conditional fields".to_string()),
            show_conditional_apple: Some(true),
            conditional_fields: Some(AppleConditionalFields {
                conditional_field_apple: Some("Conditiional field apple A".to_string()),
            }),
            ..AppleBlock::default()
        });
        let apple_b = Block::Apple(AppleBlock {
            block_name: Some("Apple B - without conditional field".to_string()),
            apple_kind: Some("Apple without conditional fields".to_string()),
            show_conditional_apple: Some(false),
            ..AppleBlock::default()
        });
        let pear_c = Block::Pear(PearBlock {
            block_name: Some("Pear C".to_string()),
            pear_type: Some("Pear C".to_string()),
            ..PearBlock::default()
        });
        let filler = Block::Pear(PearBlock {
            block_name: Some("Dummy last block to make dragging easier".to_string()),
            pear_type: Some("Dummy pear".to_string()),
            ..PearBlock::default()
        });
        Self {
            user,
            blocks: vec![
                BlockPlan {
                    block: apple_a,
                    seed_prefix: Some("Seeds for Apple A".to_string()),
                    tracked: true,
                },
                BlockPlan {
                    block: apple_b,
                    seed_prefix: Some("Seeds for Apple B".to_string()),
                    tracked: true,
                },
                BlockPlan {
                    block: pear_c,
                    seed_prefix: Some("Seeds for Pear C".to_string()),
                    tracked: true,
                },
                BlockPlan {
                    block: filler,
                    seed_prefix: None,
                    tracked: false,
                },
            ],
            seeds_per_block: DEFAULT_SEEDS_PER_BLOCK,
        }
    }

    /// Returns the number of tracked blocks.
    #[must_use]
    pub fn tracked_len(&self) -> usize {
        self.blocks.iter().filter(|plan| plan.tracked).count()
    }
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Everything a run created, owned until teardown.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FixtureContext {
    /// Created admin user.
    pub user: Option<User>,
    /// Created parent document as returned by the store.
    pub fruit: Option<Fruit>,
    /// Created seeds in creation order.
    pub seeds: Vec<Seed>,
    /// Tracked blocks in initial display order, seeds populated.
    pub tracked: Vec<Block>,
    /// Documents the store created but whose reply did not decode.
    pub undecoded: Vec<(Collection, DocId)>,
}

impl FixtureContext {
    /// Returns the parent document identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Fixture`] when no parent was created.
    pub fn fruit_id(&self) -> Result<&DocId, HarnessError> {
        self.fruit
            .as_ref()
            .map(|fruit| &fruit.id)
            .ok_or_else(|| HarnessError::Fixture("parent document was not created".to_string()))
    }

    /// Deletes every created document.
    ///
    /// Every deletion is attempted; the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError`] raised by a deletion.
    pub async fn teardown<S>(&self, store: &S) -> Result<(), StoreError>
    where
        S: DocumentStore + ?Sized,
    {
        let mut first_error = None;
        if let Some(user) = &self.user {
            record(&mut first_error, store.delete(Collection::Users, &user.id).await);
        }
        if let Some(fruit) = &self.fruit {
            record(&mut first_error, store.delete(Collection::Fruits, &fruit.id).await);
        }
        if !self.seeds.is_empty() {
            let ids: Vec<DocId> = self.seeds.iter().map(|seed| seed.id.clone()).collect();
            record(&mut first_error, store.delete_where_id_in(Collection::Seeds, &ids).await);
        }
        for (collection, id) in &self.undecoded {
            record(&mut first_error, store.delete(*collection, id).await);
        }
        match first_error {
            Some(err) => Err(err),
            None => {
                info!(seeds = self.seeds.len(), "fixtures torn down");
                Ok(())
            }
        }
    }
}

/// Keeps the first teardown error and logs the rest.
fn record(first_error: &mut Option<StoreError>, result: Result<(), StoreError>) {
    if let Err(err) = result {
        warn!(error = %err, "fixture teardown step failed");
        if first_error.is_none() {
            *first_error = Some(err);
        }
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Creates fixtures through a document store.
pub struct FixtureBuilder<'a, S: ?Sized> {
    /// Backing store.
    store: &'a S,
}

impl<'a, S> FixtureBuilder<'a, S>
where
    S: DocumentStore + ?Sized,
{
    /// Creates a builder over `store`.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
        }
    }

    /// Creates every document in `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when creation fails or the stored parent does
    /// not match the plan. Documents created before the failure are deleted.
    pub async fn create(&self, plan: &FixturePlan) -> Result<FixtureContext, HarnessError> {
        let mut context = FixtureContext::default();
        match self.populate(plan, &mut context).await {
            Ok(()) => {
                info!(
                    seeds = context.seeds.len(),
                    tracked = context.tracked.len(),
                    "fixtures created"
                );
                Ok(context)
            }
            Err(err) => match context.teardown(self.store).await {
                Ok(()) => Err(err),
                Err(teardown) => Err(HarnessError::TeardownAfterFailure {
                    primary: Box::new(err),
                    teardown,
                }),
            },
        }
    }

    /// Fills `context` step by step so partial progress can be torn down.
    async fn populate(
        &self,
        plan: &FixturePlan,
        context: &mut FixtureContext,
    ) -> Result<(), HarnessError> {
        if let Some(credentials) = &plan.user {
            let data = json!({
                "email": credentials.email,
                "password": credentials.password,
            });
            context.user = Some(self.create_typed(context, Collection::Users, data).await?);
        }

        let mut blocks = Vec::with_capacity(plan.blocks.len());
        for block_plan in &plan.blocks {
            let mut block = block_plan.block.clone();
            let mut refs = Vec::new();
            if let Some(prefix) = &block_plan.seed_prefix {
                for n in 1 ..= plan.seeds_per_block {
                    let data = json!({ "name": format!("{prefix} - {n}") });
                    let seed: Seed = self.create_typed(context, Collection::Seeds, data).await?;
                    context.seeds.push(seed.clone());
                    refs.push(SeedRef::Populated(seed));
                }
            }
            block.set_seeds(refs);
            blocks.push(block);
        }

        let fruit: Fruit =
            self.create_typed(context, Collection::Fruits, json!({ "blocks": blocks })).await?;
        context.fruit = Some(fruit.clone());

        if fruit.blocks.len() != plan.blocks.len() {
            return Err(HarnessError::Fixture(format!(
                "stored parent has {} blocks, planned {}",
                fruit.blocks.len(),
                plan.blocks.len()
            )));
        }
        let lookup: BTreeMap<DocId, Seed> =
            context.seeds.iter().map(|seed| (seed.id.clone(), seed.clone())).collect();
        for (mut block, block_plan) in fruit.blocks.into_iter().zip(&plan.blocks) {
            if block.variant() != block_plan.block.variant() {
                return Err(HarnessError::Fixture(format!(
                    "stored block \"{}\" has variant {}, planned {}",
                    block.name().unwrap_or_default(),
                    block.variant().as_str(),
                    block_plan.block.variant().as_str()
                )));
            }
            if block_plan.tracked {
                block.resolve_seeds(&lookup).map_err(HarnessError::UnknownSeed)?;
                context.tracked.push(block);
            }
        }
        Ok(())
    }

    /// Creates a document and decodes the stored record.
    ///
    /// A record that does not decode is remembered by id in `context` so
    /// teardown still deletes it.
    async fn create_typed<T: DeserializeOwned>(
        &self,
        context: &mut FixtureContext,
        collection: Collection,
        data: Value,
    ) -> Result<T, HarnessError> {
        let stored = self.store.create(collection, data).await?;
        let id = stored.get("id").cloned();
        serde_json::from_value(stored).map_err(|err| {
            match id.and_then(|id| serde_json::from_value::<DocId>(id).ok()) {
                Some(id) => context.undecoded.push((collection, id)),
                None => warn!(%collection, "undecodable record carries no id; it cannot be removed"),
            }
            HarnessError::Store(StoreError::InvalidResponse(format!(
                "{collection} document did not decode: {err}"
            )))
        })
    }
}
