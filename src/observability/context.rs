//! Thread-local stage and file tracking for crash reports.
//!
//! Each rayon worker keeps its own context; the file counters are global
//! atomics shared by all workers.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static FILES_PROCESSED: AtomicUsize = AtomicUsize::new(0);
static FILES_TOTAL: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static CURRENT_CONTEXT: RefCell<StageContext> = const { RefCell::new(StageContext::new()) };
}

#[derive(Debug, Clone, Default)]
pub struct StageContext {
    pub stage: Option<Stage>,
    pub current_file: Option<PathBuf>,
}

impl StageContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: None,
            current_file: None,
        }
    }
}

/// Pipeline stages, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collection,
    FileDiscovery,
    Parsing,
    ProjectMetrics,
    Labeling,
    DatasetBuilding,
    FeatureEngineering,
    Training,
    Evaluation,
    Prediction,
    Reporting,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Collection => "collection",
            Self::FileDiscovery => "file_discovery",
            Self::Parsing => "parsing",
            Self::ProjectMetrics => "project_metrics",
            Self::Labeling => "labeling",
            Self::DatasetBuilding => "dataset_building",
            Self::FeatureEngineering => "feature_engineering",
            Self::Training => "training",
            Self::Evaluation => "evaluation",
            Self::Prediction => "prediction",
            Self::Reporting => "reporting",
        };
        write!(f, "{name}")
    }
}

/// Restores the previous context when dropped
pub struct ContextGuard {
    previous: StageContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

#[must_use]
pub fn set_stage(stage: Stage) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().stage = Some(stage);
        ContextGuard { previous }
    })
}

#[must_use]
pub fn set_current_file(path: impl Into<PathBuf>) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().current_file = Some(path.into());
        ContextGuard { previous }
    })
}

pub fn set_progress(processed: usize, total: usize) {
    FILES_PROCESSED.store(processed, Ordering::Relaxed);
    FILES_TOTAL.store(total, Ordering::Relaxed);
}

pub fn increment_processed() {
    FILES_PROCESSED.fetch_add(1, Ordering::Relaxed);
}

#[must_use]
pub fn get_current_context() -> StageContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// (processed, total)
#[must_use]
pub fn get_progress() -> (usize, usize) {
    (
        FILES_PROCESSED.load(Ordering::Relaxed),
        FILES_TOTAL.load(Ordering::Relaxed),
    )
}

pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = StageContext::new();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards_nest_and_restore() {
        reset_context();
        {
            let _stage = set_stage(Stage::Parsing);
            {
                let _file = set_current_file("src/a.py");
                let ctx = get_current_context();
                assert_eq!(ctx.stage, Some(Stage::Parsing));
                assert_eq!(ctx.current_file, Some(PathBuf::from("src/a.py")));
            }
            let ctx = get_current_context();
            assert_eq!(ctx.stage, Some(Stage::Parsing));
            assert!(ctx.current_file.is_none());
        }
        assert!(get_current_context().stage.is_none());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::FeatureEngineering.to_string(), "feature_engineering");
    }
}
