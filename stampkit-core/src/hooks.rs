//! Prioritized pre-build hooks.

use crate::ports::BuildSettings;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A step that runs before the build proceeds.
///
/// Hooks run in ascending [`callback_order`](PreBuildHook::callback_order).
/// Returning `Err` aborts the build; hooks that must never block the build
/// report problems through [`HookStatus::Warned`] instead.
pub trait PreBuildHook {
    fn name(&self) -> &str;

    fn callback_order(&self) -> i32;

    fn on_preprocess_build(&self, settings: &mut dyn BuildSettings) -> anyhow::Result<HookReport>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStatus {
    /// Nothing to do.
    Skipped,
    /// The hook changed the build settings.
    Applied,
    /// The hook hit a problem and left the settings alone.
    Warned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookReport {
    pub hook: String,
    pub callback_order: i32,
    pub status: HookStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HookReport {
    pub fn new(hook: &dyn PreBuildHook, status: HookStatus) -> Self {
        Self {
            hook: hook.name().to_string(),
            callback_order: hook.callback_order(),
            status,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// What a pipeline run did to the build's version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub version_before: String,
    pub version_after: String,
    pub hooks: Vec<HookReport>,
}

impl BuildReport {
    pub fn changed(&self) -> bool {
        self.version_before != self.version_after
    }

    pub fn warnings(&self) -> impl Iterator<Item = &HookReport> {
        self.hooks.iter().filter(|h| h.status == HookStatus::Warned)
    }
}

/// Ordered collection of pre-build hooks.
#[derive(Default)]
pub struct HookPipeline<'a> {
    hooks: Vec<Box<dyn PreBuildHook + 'a>>,
}

impl<'a> HookPipeline<'a> {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn register(&mut self, hook: impl PreBuildHook + 'a) -> &mut Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Run every hook against `settings`, lowest `callback_order` first.
    ///
    /// Hooks sharing an order run in registration order.
    pub fn run(&self, settings: &mut dyn BuildSettings) -> anyhow::Result<BuildReport> {
        let version_before = settings.version().context("read build version")?;

        let mut ordered: Vec<&(dyn PreBuildHook + 'a)> = self.hooks.iter().map(|h| h.as_ref()).collect();
        ordered.sort_by_key(|h| h.callback_order());

        let mut hooks = Vec::with_capacity(ordered.len());
        for hook in ordered {
            debug!(
                hook = hook.name(),
                callback_order = hook.callback_order(),
                "running pre-build hook"
            );
            let report = hook
                .on_preprocess_build(settings)
                .with_context(|| format!("pre-build hook {}", hook.name()))?;
            hooks.push(report);
        }

        let version_after = settings.version().context("read build version")?;
        info!(
            before = version_before.as_str(),
            after = version_after.as_str(),
            hooks = hooks.len(),
            "pre-build hooks finished"
        );

        Ok(BuildReport {
            version_before,
            version_after,
            hooks,
        })
    }
}
