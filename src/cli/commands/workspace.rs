//! Shared snapshot loading for command handlers.

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::core::types::FacadeId;
use crate::engine::{DexSession, SessionSettings};
use crate::events::{EventBus, NavigationHistory};
use crate::facade::FacadeGraph;
use crate::model::{LoadedModel, ModelSnapshot};
use crate::versioning::ChainVersioning;

/// A snapshot loaded into an editing session, with its key table.
pub struct Workspace {
    keys: LoadedModel,
    pub session: DexSession,
}

impl Workspace {
    /// Load `path` and build a session configured from `ctx`.
    pub fn open(ctx: &Context, path: &Path) -> Result<Self> {
        let snapshot = ModelSnapshot::read(path)
            .with_context(|| format!("Failed to read snapshot '{}'", path.display()))?;
        let mut keys = snapshot
            .into_model()
            .with_context(|| format!("Failed to load snapshot '{}'", path.display()))?;
        let model = std::mem::take(&mut keys.model);

        let versioning = ChainVersioning::new(ctx.user.clone());
        let graph = FacadeGraph::new(model, Box::new(versioning))
            .context("Failed to index type references")?;

        let mut bus = EventBus::new(NavigationHistory::new(ctx.config.history_limit()));
        for group in ctx
            .config
            .locked_view_groups()
            .context("Invalid view group in config")?
        {
            bus.lock(group);
        }

        let session = DexSession::new(graph)
            .with_bus(bus)
            .with_settings(SessionSettings {
                minor_version_additions: ctx.config.minor_version_additions(),
            });
        tracing::debug!(path = %path.display(), "snapshot loaded");
        Ok(Self { keys, session })
    }

    /// Facade for a snapshot key.
    pub fn facade(&mut self, key: &str) -> Result<FacadeId> {
        let node = self
            .keys
            .node(key)
            .with_context(|| format!("No object with key '{key}'"))?;
        self.session
            .graph_mut()
            .facade_for(node)
            .with_context(|| format!("'{key}' cannot be edited"))
    }

    /// Snapshot key of a facade, if it came from the snapshot.
    pub fn key_of(&self, facade: FacadeId) -> Option<&str> {
        let node = self.session.graph().node_of(facade).ok()?;
        self.keys.key_of(node)
    }

    /// `Name [Label]` for display.
    pub fn describe(&self, facade: FacadeId) -> Result<String> {
        let graph = self.session.graph();
        Ok(format!(
            "{} [{}]",
            graph.name(facade)?,
            graph.kind(facade)?.label()
        ))
    }
}
