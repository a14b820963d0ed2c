use std::path::PathBuf;
use std::sync::Arc;

use action_primitives::{Action, ActionResult};
use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use soulbrowser_core_types::{Journal, JournalEntry, MemoryJournal, SoulError, TracingJournal};
use soulbrowser_scheduler::fixture::{FixtureDocument, FixtureFrame};
use soulbrowser_scheduler::{ActionDispatcher, ActionRequest, Dispatcher, InMemoryFrameRegistry};
use tracing::info;

use crate::cli::context::CliContext;
use crate::config::ActorConfig;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Fixture document describing the frame (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub fixture: PathBuf,

    /// Action as JSON, e.g. '{"type":"click","target":{"node_handle":42}}'
    #[arg(short, long)]
    pub action: String,

    /// Include the journal entries recorded during the action
    #[arg(long)]
    pub journal: bool,
}

#[derive(Debug, Serialize)]
pub struct RunOutcome {
    pub result: ActionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<Vec<JournalEntry>>,
}

/// Registers `document` as the only frame and invokes `action` against it.
pub async fn run_fixture_action(
    document: FixtureDocument,
    action: Action,
    config: &ActorConfig,
    journal: Arc<dyn Journal>,
) -> Result<ActionResult, SoulError> {
    let frame = FixtureFrame::from_document(document);
    let registry = Arc::new(InMemoryFrameRegistry::new());
    let frame_id = registry.register(frame.binding());
    let dispatcher = ActionDispatcher::new(registry, config.dispatcher_config());
    dispatcher
        .invoke(ActionRequest::new(frame_id, action, journal))
        .await
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let document = FixtureDocument::from_path(&args.fixture)
        .with_context(|| format!("Failed to load fixture {}", args.fixture.display()))?;
    let action: Action =
        serde_json::from_str(&args.action).context("Failed to parse action JSON")?;
    info!(action = action.name(), frame = %document.frame, "Running fixture action");

    let memory = MemoryJournal::new();
    let journal: Arc<dyn Journal> = if args.journal {
        memory.clone()
    } else {
        Arc::new(TracingJournal)
    };
    let result = run_fixture_action(document, action, ctx.config(), journal).await?;

    let outcome = RunOutcome {
        result,
        journal: args.journal.then(|| memory.entries()),
    };
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.result.is_ok() {
        bail!("action failed: {}", outcome.result.code);
    }
    Ok(())
}
