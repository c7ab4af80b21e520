//! Session - owns one [`Run`] and drives it against the collaborators.
//!
//! Every command takes the run-wide busy flag first and holds it until the
//! whole chain of collaborator calls is done:
//!
//! - **create card**: card text, then the image, then the association ratings
//! - **navigate / jump**: the move, then the re-derivation if the move landed
//!   on the pending target
//! - **submit theory**: the conclusion narrative
//!
//! A command issued while another is in flight is rejected with
//! [`SessionError::Busy`]. The run itself sits behind a mutex that is only
//! held between `.await` points, never across one.

mod busy;
mod command;

pub use command::*;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use case_rules::{
    mystery_identifier, AssociationRecord, CardKind, Direction, GameConfig, RuleViolation, Run,
    RunSnapshot,
};

use crate::association::{AssociationEngine, Candidate, RandomSource, SeededRandom};
use crate::collaborator::{GenerationRequest, ImageGenerator, TextGenerator};
use crate::error::{GenerationError, SessionError, Stage};
use crate::imagery::ImageryConfig;
use crate::parse::{parse_false_theory, ParseOutcome};
use crate::prompts;
use busy::BusyGuard;

/// One player's game, from the first Mystery card to the Conclusion and beyond resets.
pub struct Session {
    run: Mutex<Run>,
    busy: AtomicBool,
    text: Arc<dyn TextGenerator>,
    images: Option<Arc<dyn ImageGenerator>>,
    imagery: ImageryConfig,
    engine: AssociationEngine,
    random: Mutex<Box<dyn RandomSource>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("run", &self.lock_run().id())
            .field("busy", &self.is_busy())
            .field("images", &self.images.is_some())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session with an empty run.
    pub fn new(config: GameConfig, text: Arc<dyn TextGenerator>) -> Self {
        Self {
            engine: AssociationEngine::from_config(&config),
            run: Mutex::new(Run::new(config)),
            busy: AtomicBool::new(false),
            text,
            images: None,
            imagery: ImageryConfig::default(),
            random: Mutex::new(Box::new(SeededRandom::from_os())),
        }
    }

    /// Attach an image generator. Without one, cards carry no image.
    pub fn with_images(mut self, images: Arc<dyn ImageGenerator>) -> Self {
        self.images = Some(images);
        self
    }

    /// Set the image prompt configuration.
    pub fn with_imagery(mut self, imagery: ImageryConfig) -> Self {
        self.imagery = imagery;
        self
    }

    /// Replace the random source used to sample association candidates.
    pub fn with_random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Mutex::new(Box::new(random));
        self
    }

    fn lock_run(&self) -> MutexGuard<'_, Run> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire(&self) -> Result<BusyGuard<'_>, SessionError> {
        BusyGuard::acquire(&self.busy).ok_or(SessionError::Busy)
    }

    /// Whether a command is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Read-only view for the presentation layer.
    pub fn snapshot(&self) -> RunSnapshot {
        self.lock_run().snapshot()
    }

    /// Inspect the run.
    pub fn inspect<R>(&self, f: impl FnOnce(&Run) -> R) -> R {
        f(&self.lock_run())
    }

    /// Dispatch a command from the presentation layer.
    pub async fn apply(&self, command: Command) -> Result<Outcome, SessionError> {
        match command {
            Command::CreateCard(kind) => self.create_card(kind).await.map(Outcome::CardCreated),
            Command::Navigate(direction) => self.navigate(direction).await.map(Outcome::Navigated),
            Command::JumpTo(index) => self.jump_to(index).await.map(Outcome::Navigated),
            Command::SubmitTheory(theory) => {
                self.submit_theory(theory).await.map(Outcome::Concluded)
            }
            Command::ResetRun => self.reset_run().map(|()| Outcome::Reset),
        }
    }

    /// Replace the run with a fresh one. Earlier mysteries stay remembered.
    pub fn reset_run(&self) -> Result<(), SessionError> {
        let _busy = self.acquire()?;
        let mut run = self.lock_run();
        let old = run.id();
        run.reset();
        info!(old_run = %old, new_run = %run.id(), "Run reset");
        Ok(())
    }

    async fn complete(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let reply = self.text.generate(request).await?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(GenerationError::EmptyReply);
        }
        Ok(reply.to_string())
    }

    async fn complete_stage(
        &self,
        stage: Stage,
        request: GenerationRequest,
    ) -> Result<String, SessionError> {
        self.complete(request).await.map_err(|source| {
            warn!("{} generation failed: {}", stage, source);
            SessionError::Generation { stage, source }
        })
    }

    /// Generate and append a card of `kind`.
    ///
    /// Nothing is committed unless the text generation succeeds. A Mystery
    /// requested over an open run replaces it only once the new opening
    /// exists. Image and association failures never fail the command.
    pub async fn create_card(&self, kind: CardKind) -> Result<CardCreated, SessionError> {
        let _busy = self.acquire()?;

        let request = {
            let run = self.lock_run();
            run.check_draw(kind)?;
            match kind {
                CardKind::Mystery => prompts::opening(run.previous_mysteries()),
                CardKind::Reveal => prompts::theories(&run),
                _ => prompts::card(&run, kind),
            }
        };

        let created = match kind {
            CardKind::Mystery => self.open_mystery(request).await?,
            CardKind::Reveal => self.draw_reveal(request).await?,
            _ => self.draw_investigation(kind, request).await?,
        };
        Ok(created)
    }

    async fn open_mystery(&self, request: GenerationRequest) -> Result<CardCreated, SessionError> {
        let text = self.complete_stage(Stage::Mystery, request).await?;

        let index = {
            let mut run = self.lock_run();
            if !run.is_empty() {
                info!(run = %run.id(), "New mystery replaces the open run");
            }
            let index = run.commit_card(CardKind::Mystery, text.as_str())?;
            run.remember_mystery(mystery_identifier(&text));
            info!(run = %run.id(), "Mystery opened");
            index
        };

        self.illustrate(index).await;
        Ok(CardCreated {
            index,
            kind: CardKind::Mystery,
            association: None,
        })
    }

    async fn draw_investigation(
        &self,
        kind: CardKind,
        request: GenerationRequest,
    ) -> Result<CardCreated, SessionError> {
        let text = self.complete_stage(Stage::Card(kind), request).await?;

        let index = {
            let mut run = self.lock_run();
            let index = run.commit_card(kind, text)?;
            info!(run = %run.id(), index, %kind, "Card added");
            index
        };

        self.illustrate(index).await;
        let association = self.associate(index).await;
        Ok(CardCreated {
            index,
            kind,
            association,
        })
    }

    async fn draw_reveal(&self, request: GenerationRequest) -> Result<CardCreated, SessionError> {
        let theories = self
            .complete_stage(Stage::Theories, request.clone())
            .await?;
        let reply = self
            .complete_stage(
                Stage::FalseTheory,
                prompts::false_theory(&request, &theories),
            )
            .await?;

        let false_theory = match parse_false_theory(&reply) {
            ParseOutcome::Parsed(number) => number,
            ParseOutcome::Unparsable => {
                warn!("No theory number in false-theory reply {:?}", reply);
                return Err(SessionError::UnparsableFalseTheory { reply });
            }
        };

        let index = {
            let mut run = self.lock_run();
            let index = run.commit_reveal(theories, false_theory)?;
            info!(run = %run.id(), index, "Reveal drawn");
            debug!("Theory #{} is the false one", false_theory);
            index
        };

        Ok(CardCreated {
            index,
            kind: CardKind::Reveal,
            association: None,
        })
    }

    /// Best effort: summarise the card, build the image prompt, attach the image.
    async fn illustrate(&self, index: usize) {
        let Some(images) = self.images.as_ref() else {
            return;
        };
        let Some(card_text) =
            self.inspect(|run| run.card(index).map(|card| card.current_text().to_string()))
        else {
            return;
        };

        let summary = match self.complete(prompts::scene_summary(&card_text)).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Scene summary for card {} failed: {}", index, e);
                return;
            }
        };

        match images.render(&self.imagery.scene_prompt(&summary)).await {
            Ok(image) => self.lock_run().attach_image(index, image),
            Err(e) => warn!("Image for card {} failed: {}", index, e),
        }
    }

    /// Look for a strong connection between the new card and an earlier one.
    async fn associate(&self, new_index: usize) -> Option<AssociationRecord> {
        let (new_text, candidates) = {
            let run = self.lock_run();
            if !run.can_associate() {
                debug!(
                    pending = run.pending().is_some(),
                    count = run.association_count(),
                    "Association skipped"
                );
                return None;
            }

            let pool = run.candidate_pool(new_index);
            if pool.is_empty() {
                return None;
            }

            let picks = {
                let mut random = self.random.lock().unwrap_or_else(PoisonError::into_inner);
                self.engine.sample(&pool, random.as_mut())
            };
            let candidates: Vec<Candidate> = picks
                .into_iter()
                .filter_map(|index| {
                    run.card(index).map(|card| Candidate {
                        index,
                        text: card.current_text().to_string(),
                    })
                })
                .collect();
            let new_text = run.card(new_index)?.current_text().to_string();
            (new_text, candidates)
        };

        let found = self
            .engine
            .find_connection(self.text.as_ref(), new_index, &new_text, &candidates)
            .await?;

        let mut run = self.lock_run();
        match run.record_association(found.clone()) {
            Ok(()) => {
                info!(
                    run = %run.id(),
                    source = found.source_index,
                    target = found.target_index,
                    "Strong connection found"
                );
                Some(found)
            }
            Err(e) => {
                warn!("Association {:?} not recorded: {}", found, e);
                None
            }
        }
    }

    /// Move one card forward or back.
    ///
    /// Landing exactly on the pending target re-derives it once and clears the signal.
    pub async fn navigate(&self, direction: Direction) -> Result<Navigation, SessionError> {
        let _busy = self.acquire()?;
        let (position, arrival) = {
            let mut run = self.lock_run();
            let position = run.step(direction)?;
            (position, run.take_arrival())
        };
        Ok(self.arrive(position, arrival).await)
    }

    /// Jump to a card from the history list. Arrival is detected the same way.
    pub async fn jump_to(&self, index: usize) -> Result<Navigation, SessionError> {
        let _busy = self.acquire()?;
        let (position, arrival) = {
            let mut run = self.lock_run();
            let position = run.jump_to(index)?;
            (position, run.take_arrival())
        };
        Ok(self.arrive(position, arrival).await)
    }

    async fn arrive(&self, position: usize, arrival: Option<AssociationRecord>) -> Navigation {
        let regeneration = match arrival {
            Some(record) => Some(self.regenerate(record).await),
            None => None,
        };
        Navigation {
            position,
            regeneration,
        }
    }

    /// Re-derive the target of `record` from its original text and the source card.
    ///
    /// On failure the original text is restored and the card stays unmodified.
    async fn regenerate(&self, record: AssociationRecord) -> Regeneration {
        let request = self.inspect(|run| {
            let target = run.card(record.target_index)?;
            let source = run.card(record.source_index)?;
            Some(prompts::regeneration(target, source, &record.reason))
        });

        let rewritten = match request {
            Some(request) => match self.complete(request).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(
                        "Re-deriving card {} failed, keeping the original: {}",
                        record.target_index, e
                    );
                    None
                }
            },
            None => None,
        };

        let succeeded = rewritten.is_some();
        let mut run = self.lock_run();
        run.apply_regeneration(record.target_index, rewritten);
        info!(
            run = %run.id(),
            target = record.target_index,
            source = record.source_index,
            succeeded,
            "Insight processed"
        );

        Regeneration {
            target_index: record.target_index,
            source_index: record.source_index,
            rewritten: succeeded,
        }
    }

    /// Judge a theory guess and append the Conclusion card.
    pub async fn submit_theory(&self, theory: u8) -> Result<Verdict, SessionError> {
        let _busy = self.acquire()?;

        let (is_correct, correct, request) = {
            let run = self.lock_run();
            let is_correct = run.judge(theory)?;
            let correct = run
                .correct_false_theory()
                .ok_or(RuleViolation::NotInReveal)?;
            (
                is_correct,
                correct,
                prompts::conclusion(&run, theory, correct),
            )
        };

        let text = self.complete_stage(Stage::Conclusion, request).await?;

        let mut run = self.lock_run();
        let conclusion_index = run.conclude(text)?;
        info!(run = %run.id(), theory, is_correct, "Case closed");

        Ok(Verdict {
            chosen: theory,
            correct_false_theory: correct,
            is_correct,
            conclusion_index,
        })
    }
}
