//! Document workflow: extract → simplify → translate, with export of the
//! latest outputs.
//!
//! The state is a tagged union so a later stage can never exist without the
//! stages it was derived from, and entering a stage discards everything
//! downstream of it. At most one stage is pending at a time; each request is
//! identified by a [`Ticket`] so results arriving after a reset are dropped.

use std::fmt;

use shared::domain::{Language, SimplificationLevel};
use thiserror::Error;
use tracing::debug;

use crate::{annotation::AnnotatedText, export::ExportTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Extract,
    Simplify,
    Translate,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Simplify => "simplify",
            Self::Translate => "translate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simplification {
    pub plain: String,
    pub annotated: AnnotatedText,
    pub level: SimplificationLevel,
}

impl Simplification {
    pub fn word_count(&self) -> usize {
        self.plain.split_whitespace().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Extracted {
        source: String,
        extracted: String,
    },
    Simplified {
        source: String,
        extracted: String,
        simplification: Simplification,
    },
    Translated {
        source: String,
        extracted: String,
        simplification: Simplification,
        language: Language,
        translated: String,
    },
}

impl WorkflowState {
    fn into_extracted(self) -> Option<(String, String)> {
        match self {
            Self::Idle => None,
            Self::Extracted { source, extracted }
            | Self::Simplified {
                source, extracted, ..
            }
            | Self::Translated {
                source, extracted, ..
            } => Some((source, extracted)),
        }
    }

    fn into_simplified(self) -> Option<(String, String, Simplification)> {
        match self {
            Self::Idle | Self::Extracted { .. } => None,
            Self::Simplified {
                source,
                extracted,
                simplification,
            }
            | Self::Translated {
                source,
                extracted,
                simplification,
                ..
            } => Some((source, extracted, simplification)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    stage: Stage,
    generation: u64,
}

impl Ticket {
    pub fn stage(&self) -> Stage {
        self.stage
    }
}

#[derive(Debug, Clone)]
pub struct SimplifyJob {
    pub ticket: Ticket,
    pub text: String,
    pub level: SimplificationLevel,
}

#[derive(Debug, Clone)]
pub struct TranslateJob {
    pub ticket: Ticket,
    pub text: String,
    pub language: Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("{0} is already in progress")]
    Busy(Stage),
    #[error("{stage} is not available: {reason}")]
    NotReady { stage: Stage, reason: &'static str },
    #[error("{0} result arrived after the workflow moved on")]
    Stale(Stage),
}

#[derive(Debug, Clone, Default)]
pub struct Workflow {
    state: WorkflowState,
    level: SimplificationLevel,
    language: Option<Language>,
    pending: Option<Stage>,
    generation: u64,
    compare_view: bool,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn level(&self) -> SimplificationLevel {
        self.level
    }

    pub fn set_level(&mut self, level: SimplificationLevel) {
        self.level = level;
    }

    pub fn language(&self) -> Option<Language> {
        self.language
    }

    pub fn set_language(&mut self, language: Option<Language>) {
        self.language = language;
    }

    pub fn pending(&self) -> Option<Stage> {
        self.pending
    }

    pub fn compare_view(&self) -> bool {
        self.compare_view
    }

    pub fn toggle_compare_view(&mut self) -> bool {
        self.compare_view = !self.compare_view;
        self.compare_view
    }

    pub fn source_name(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Idle => None,
            WorkflowState::Extracted { source, .. }
            | WorkflowState::Simplified { source, .. }
            | WorkflowState::Translated { source, .. } => Some(source),
        }
    }

    pub fn extracted_text(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Idle => None,
            WorkflowState::Extracted { extracted, .. }
            | WorkflowState::Simplified { extracted, .. }
            | WorkflowState::Translated { extracted, .. } => Some(extracted),
        }
    }

    pub fn simplification(&self) -> Option<&Simplification> {
        match &self.state {
            WorkflowState::Simplified { simplification, .. }
            | WorkflowState::Translated { simplification, .. } => Some(simplification),
            _ => None,
        }
    }

    pub fn simplified_text(&self) -> Option<&str> {
        self.simplification().map(|s| s.plain.as_str())
    }

    pub fn translated_text(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Translated { translated, .. } => Some(translated),
            _ => None,
        }
    }

    pub fn translation_language(&self) -> Option<Language> {
        match &self.state {
            WorkflowState::Translated { language, .. } => Some(*language),
            _ => None,
        }
    }

    pub fn can_simplify(&self) -> bool {
        self.pending.is_none() && non_empty(self.extracted_text())
    }

    pub fn can_translate(&self) -> bool {
        self.pending.is_none() && self.language.is_some() && non_empty(self.simplified_text())
    }

    /// Text available for export, if the target stage produced any.
    pub fn export_content(&self, target: ExportTarget) -> Option<&str> {
        let content = match target {
            ExportTarget::Simplified => self.simplified_text(),
            ExportTarget::Translated => self.translated_text(),
        };
        content.filter(|text| !text.is_empty())
    }

    pub fn begin_extract(&mut self) -> Result<Ticket, WorkflowError> {
        self.ensure_idle()?;
        Ok(self.issue(Stage::Extract))
    }

    pub fn begin_simplify(&mut self) -> Result<SimplifyJob, WorkflowError> {
        self.ensure_idle()?;
        let text = self
            .extracted_text()
            .filter(|text| !text.is_empty())
            .ok_or(WorkflowError::NotReady {
                stage: Stage::Simplify,
                reason: "no extracted text",
            })?
            .to_string();
        let level = self.level;
        Ok(SimplifyJob {
            ticket: self.issue(Stage::Simplify),
            text,
            level,
        })
    }

    pub fn begin_translate(&mut self) -> Result<TranslateJob, WorkflowError> {
        self.ensure_idle()?;
        let language = self.language.ok_or(WorkflowError::NotReady {
            stage: Stage::Translate,
            reason: "no target language selected",
        })?;
        let text = self
            .simplified_text()
            .filter(|text| !text.is_empty())
            .ok_or(WorkflowError::NotReady {
                stage: Stage::Translate,
                reason: "no simplified text",
            })?
            .to_string();
        Ok(TranslateJob {
            ticket: self.issue(Stage::Translate),
            text,
            language,
        })
    }

    /// A new extraction replaces the document and drops every later output.
    pub fn finish_extract(
        &mut self,
        ticket: Ticket,
        source: impl Into<String>,
        extracted: String,
    ) -> Result<(), WorkflowError> {
        self.settle(ticket, Stage::Extract)?;
        self.state = WorkflowState::Extracted {
            source: source.into(),
            extracted,
        };
        Ok(())
    }

    pub fn finish_simplify(
        &mut self,
        ticket: Ticket,
        simplification: Simplification,
    ) -> Result<(), WorkflowError> {
        self.settle(ticket, Stage::Simplify)?;
        let (source, extracted) =
            std::mem::take(&mut self.state)
                .into_extracted()
                .ok_or(WorkflowError::NotReady {
                    stage: Stage::Simplify,
                    reason: "no extracted text",
                })?;
        self.state = WorkflowState::Simplified {
            source,
            extracted,
            simplification,
        };
        Ok(())
    }

    pub fn finish_translate(
        &mut self,
        ticket: Ticket,
        language: Language,
        translated: String,
    ) -> Result<(), WorkflowError> {
        self.settle(ticket, Stage::Translate)?;
        let (source, extracted, simplification) = std::mem::take(&mut self.state)
            .into_simplified()
            .ok_or(WorkflowError::NotReady {
                stage: Stage::Translate,
                reason: "no simplified text",
            })?;
        self.state = WorkflowState::Translated {
            source,
            extracted,
            simplification,
            language,
            translated,
        };
        Ok(())
    }

    /// Releases the pending marker after a failed request; data is untouched.
    pub fn fail(&mut self, ticket: Ticket) {
        if self.is_current(ticket) {
            self.pending = None;
        }
    }

    /// Returns to a fresh workflow. Outstanding tickets become stale.
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }

    fn ensure_idle(&self) -> Result<(), WorkflowError> {
        match self.pending {
            Some(stage) => Err(WorkflowError::Busy(stage)),
            None => Ok(()),
        }
    }

    fn issue(&mut self, stage: Stage) -> Ticket {
        self.pending = Some(stage);
        Ticket {
            stage,
            generation: self.generation,
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation && self.pending == Some(ticket.stage)
    }

    fn settle(&mut self, ticket: Ticket, stage: Stage) -> Result<(), WorkflowError> {
        if ticket.stage != stage || !self.is_current(ticket) {
            debug!(stage = %stage, "dropping stale workflow result");
            return Err(WorkflowError::Stale(stage));
        }
        self.pending = None;
        Ok(())
    }
}

fn non_empty(text: Option<&str>) -> bool {
    text.is_some_and(|t| !t.is_empty())
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
