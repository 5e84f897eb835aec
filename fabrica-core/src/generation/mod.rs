//! Content generation pipeline
//!
//! Generation runs in three explicit steps:
//!
//! 1. [`GenerationPlan::prepare`] validates the request against the state
//!    and lists the artisans whose saved content would be overwritten.
//! 2. [`Generator::run`] issues one request per artisan, then one per
//!    target language, strictly in sequence. A failed request becomes a
//!    placeholder entry and the run continues.
//! 3. [`commit`] merges the outcome into the chapter.

pub mod gemini;
pub mod provider;

pub use gemini::{GeminiClient, GeminiConfig};
pub use provider::TextGenerator;

use crate::error::{FabricaError, GenerationError, Result, ValidationError};
use crate::state::AppState;
use crate::types::{
    Artisan, ArtisanId, ChapterId, ContentItem, GroupId, Producer, Translation,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Separator between the instructions and the text they apply to
pub const SOURCE_SEPARATOR: &str = "\n\n--- TEXTO A TRANSFORMAR ---\n\n";

/// Target languages offered for translation
pub const DEFAULT_LANGUAGES: [&str; 5] = ["Inglés", "Francés", "Alemán", "Portugués", "Italiano"];

/// Full request text for an artisan prompt
pub fn transformation_prompt(prompt: &str, base_text: &str) -> String {
    format!("{prompt}{SOURCE_SEPARATOR}{base_text}")
}

pub fn translation_instruction(language: &str) -> String {
    format!(
        "Traduce el siguiente texto al {language}. Mantén el significado y el tono originales. Devuelve únicamente el texto traducido."
    )
}

/// Artisan ids stored in a group preset
pub fn group_selection(state: &AppState, group_id: GroupId) -> Result<Vec<ArtisanId>> {
    state
        .group(group_id)
        .map(|g| g.artisan_ids.clone())
        .ok_or_else(|| FabricaError::NotFound(format!("group {group_id}")))
}

/// What the user asked to generate
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub chapter_id: Option<ChapterId>,
    pub base_text: String,
    pub artisan_ids: Vec<ArtisanId>,
    pub languages: Vec<String>,
}

/// A validated generation request, ready to run
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub chapter_id: ChapterId,
    pub base_text: String,
    pub api_key: String,
    /// Regular artisans, in catalog order
    pub artisans: Vec<Artisan>,
    /// Empty unless the multicultural artisan was selected
    pub languages: Vec<String>,
    /// Selected artisans that already have saved content in the chapter
    pub overwrite_conflicts: Vec<Artisan>,
}

impl GenerationPlan {
    pub fn prepare(
        state: &AppState,
        request: GenerationRequest,
        api_key: Option<&str>,
    ) -> Result<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ValidationError::missing("an API key"))?;

        if request.base_text.trim().is_empty() {
            return Err(ValidationError::missing("base text").into());
        }

        let chapter_id = request
            .chapter_id
            .ok_or_else(|| ValidationError::missing("an active chapter"))?;

        if request.artisan_ids.is_empty() {
            return Err(ValidationError::missing("at least one artisan").into());
        }
        let chapter = state.require_chapter(chapter_id)?;

        let selected: HashSet<ArtisanId> = request.artisan_ids.iter().copied().collect();
        for id in &selected {
            if state.artisan(*id).is_none() {
                return Err(FabricaError::NotFound(format!("artisan {id}")));
            }
        }

        let mut languages = Vec::new();
        if selected.contains(&ArtisanId::Multicultural) {
            for language in &request.languages {
                let language = language.trim();
                if !language.is_empty() && !languages.iter().any(|l| l == language) {
                    languages.push(language.to_string());
                }
            }
            if languages.is_empty() {
                return Err(ValidationError::rule(
                    "the multicultural artisan needs at least one target language",
                )
                .into());
            }
        }

        let artisans: Vec<Artisan> = state
            .artisans()
            .iter()
            .filter(|a| !a.id.is_multicultural() && selected.contains(&a.id))
            .cloned()
            .collect();

        let overwrite_conflicts = artisans
            .iter()
            .filter(|a| chapter.content_by(a.id.into()).is_some())
            .cloned()
            .collect();

        Ok(Self {
            chapter_id,
            base_text: request.base_text,
            api_key: api_key.to_string(),
            artisans,
            languages,
            overwrite_conflicts,
        })
    }

    /// Whether the user must confirm before existing content is replaced
    pub fn requires_confirmation(&self) -> bool {
        !self.overwrite_conflicts.is_empty()
    }

    pub fn request_count(&self) -> usize {
        self.artisans.len() + self.languages.len()
    }
}

/// Results collected by a run, not yet part of the chapter
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub chapter_id: ChapterId,
    pub base_text: String,
    pub contents: Vec<ContentItem>,
    pub translations: Vec<Translation>,
    pub failures: usize,
}

impl GenerationOutcome {
    fn new(plan: &GenerationPlan) -> Self {
        Self {
            chapter_id: plan.chapter_id,
            base_text: plan.base_text.clone(),
            contents: Vec::with_capacity(plan.artisans.len()),
            translations: Vec::with_capacity(plan.languages.len()),
            failures: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty() && self.translations.is_empty()
    }
}

/// Progress notifications emitted while a run is in flight
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    Started { total: usize },
    Content { completed: usize, total: usize, item: ContentItem, failed: bool },
    Translation { completed: usize, total: usize, item: Translation, failed: bool },
    Finished { failures: usize },
}

/// Runs generation plans against a backend, one at a time
pub struct Generator {
    backend: Arc<dyn TextGenerator>,
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Generator {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self {
            backend,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Issue every request in the plan, in order.
    ///
    /// Fails only when another run is in progress; request failures are
    /// recorded as placeholder entries in the outcome.
    pub async fn run(
        &self,
        plan: &GenerationPlan,
        mut observer: impl FnMut(GenerationEvent),
    ) -> std::result::Result<GenerationOutcome, GenerationError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(GenerationError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let total = plan.request_count();
        let mut outcome = GenerationOutcome::new(plan);
        let mut completed = 0;
        observer(GenerationEvent::Started { total });

        for artisan in &plan.artisans {
            tracing::info!(artisan = %artisan.name, backend = self.backend.name(), "generating");
            let prompt = transformation_prompt(&artisan.prompt, &plan.base_text);
            let (item, failed) = match self.backend.generate(&prompt).await {
                Ok(text) => (ContentItem::generated(artisan, text), false),
                Err(e) => {
                    tracing::warn!(artisan = %artisan.name, "generation failed: {}", e);
                    (ContentItem::failed(artisan, &e.to_string()), true)
                }
            };
            completed += 1;
            outcome.failures += usize::from(failed);
            outcome.contents.push(item.clone());
            observer(GenerationEvent::Content {
                completed,
                total,
                item,
                failed,
            });
        }

        for language in &plan.languages {
            tracing::info!(language = %language, backend = self.backend.name(), "translating");
            let prompt = transformation_prompt(&translation_instruction(language), &plan.base_text);
            let (item, failed) = match self.backend.generate(&prompt).await {
                Ok(text) => (Translation::generated(language.as_str(), text), false),
                Err(e) => {
                    tracing::warn!(language = %language, "translation failed: {}", e);
                    (Translation::failed(language.as_str(), &e.to_string()), true)
                }
            };
            completed += 1;
            outcome.failures += usize::from(failed);
            outcome.translations.push(item.clone());
            observer(GenerationEvent::Translation {
                completed,
                total,
                item,
                failed,
            });
        }

        observer(GenerationEvent::Finished {
            failures: outcome.failures,
        });
        Ok(outcome)
    }
}

/// Merge an outcome into its chapter.
///
/// The base entry is replaced by the text the run used, new artisan outputs
/// come next, then earlier outputs of artisans that were not part of this
/// run. Translations are upserted by language.
pub fn commit(state: &mut AppState, outcome: GenerationOutcome) -> Result<()> {
    if outcome.is_empty() {
        return Err(ValidationError::rule("there is no generated content to save").into());
    }
    let GenerationOutcome {
        chapter_id,
        base_text,
        contents,
        translations,
        ..
    } = outcome;

    state.update_chapter(chapter_id, |chapter| {
        let regenerated: HashSet<Producer> = contents.iter().map(|c| c.producer).collect();
        let kept: Vec<ContentItem> = chapter
            .contents
            .drain(..)
            .filter(|c| !c.producer.is_base() && !regenerated.contains(&c.producer))
            .collect();

        chapter.contents = std::iter::once(ContentItem::base(base_text))
            .chain(contents)
            .chain(kept)
            .collect();

        for translation in translations {
            match chapter
                .translations
                .iter_mut()
                .find(|t| t.language == translation.language)
            {
                Some(existing) => *existing = translation,
                None => chapter.translations.push(translation),
            }
        }
        Ok(())
    })?;
    tracing::info!(chapter = %chapter_id, "generated content saved");
    Ok(())
}
