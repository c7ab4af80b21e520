//! Scripted collaborators shared by the session tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use case_narrative::{
    GenerationError, GenerationRequest, ImageGenerator, Purpose, RandomSource, Session,
    TextGenerator,
};
use case_rules::{CardKind, GameConfig};

pub const MYSTERY_TEXT: &str =
    "The cook was found locked in the pantry. Who turned the key from the outside?";
pub const THEORIES_TEXT: &str = "Theory #1: The butler lied.\nTheory #2: The key was copied.\nTheory #3: The cook locked herself in.\nTheory #4: The gardener saw a lantern.\nTheory #5: The maid heard a scream.\nWhich theory is false?";

/// Text generator that answers by purpose and records every request.
///
/// Card content is numbered so each card's text is unique. Ratings come
/// from a queue and default to `NO_CONNECTION` once it is empty.
pub struct ScriptedText {
    ratings: Mutex<VecDeque<String>>,
    false_theory: Mutex<String>,
    regeneration: Mutex<String>,
    failing: Mutex<Vec<Purpose>>,
    requests: Mutex<Vec<GenerationRequest>>,
    counter: AtomicUsize,
}

impl Default for ScriptedText {
    fn default() -> Self {
        Self {
            ratings: Mutex::new(VecDeque::new()),
            false_theory: Mutex::new("Theory 3 is the false one.".to_string()),
            regeneration: Mutex::new(
                "New insight: the glove was planted to point at the butler.".to_string(),
            ),
            failing: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            counter: AtomicUsize::new(0),
        }
    }
}

impl ScriptedText {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the reply to the next rating request.
    pub fn queue_rating(&self, reply: &str) {
        self.ratings.lock().unwrap().push_back(reply.to_string());
    }

    pub fn set_false_theory_reply(&self, reply: &str) {
        *self.false_theory.lock().unwrap() = reply.to_string();
    }

    pub fn set_regeneration_reply(&self, reply: &str) {
        *self.regeneration.lock().unwrap() = reply.to_string();
    }

    /// Make every request with `purpose` fail until [`ScriptedText::recover`].
    pub fn fail(&self, purpose: Purpose) {
        self.failing.lock().unwrap().push(purpose);
    }

    pub fn recover(&self, purpose: Purpose) {
        self.failing.lock().unwrap().retain(|p| *p != purpose);
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, purpose: Purpose) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.purpose == purpose)
            .count()
    }

    fn reply(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());

        if self.failing.lock().unwrap().contains(&request.purpose) {
            return Err(GenerationError::Backend("service unavailable".to_string()));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let reply = match request.purpose {
            Purpose::Opening => MYSTERY_TEXT.to_string(),
            Purpose::CardContent(kind) => format!("{kind} detail number {n}."),
            Purpose::Rating => self
                .ratings
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "NO_CONNECTION".to_string()),
            Purpose::Regeneration => self.regeneration.lock().unwrap().clone(),
            Purpose::Theories => THEORIES_TEXT.to_string(),
            Purpose::FalseTheory => self.false_theory.lock().unwrap().clone(),
            Purpose::Conclusion => "The butler copied the key.".to_string(),
            Purpose::SceneSummary => "A knife on a dusty pantry shelf.".to_string(),
        };
        Ok(reply)
    }
}

#[async_trait]
impl TextGenerator for ScriptedText {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.reply(&request)
    }
}

/// Wraps [`ScriptedText`] and holds the first request of `purpose` until released.
pub struct GatedText {
    pub inner: Arc<ScriptedText>,
    purpose: Purpose,
    /// Notified once the gated request has started.
    pub entered: Notify,
    /// Notify to let the gated request finish.
    pub release: Notify,
    gated: AtomicUsize,
}

impl GatedText {
    pub fn new(purpose: Purpose) -> Arc<Self> {
        Arc::new(Self {
            inner: ScriptedText::new(),
            purpose,
            entered: Notify::new(),
            release: Notify::new(),
            gated: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TextGenerator for GatedText {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        if request.purpose == self.purpose && self.gated.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.generate(request).await
    }
}

/// Image generator that records prompts and returns `image://{n}`.
#[derive(Default)]
pub struct FakeImages {
    pub prompts: Mutex<Vec<String>>,
    pub broken: bool,
}

impl FakeImages {
    pub fn working() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            broken: true,
            ..Self::default()
        })
    }
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn render(&self, scene: &str) -> Result<String, GenerationError> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(scene.to_string());
        if self.broken {
            return Err(GenerationError::Backend("content policy".to_string()));
        }
        Ok(format!("image://{}", prompts.len()))
    }
}

/// Always picks the first remaining item, so candidates are rated in run order.
pub struct InOrder;

impl RandomSource for InOrder {
    fn below(&mut self, _upper: usize) -> usize {
        0
    }
}

/// Session over `text` with default rules and in-order sampling.
pub fn session(text: Arc<dyn TextGenerator>) -> Session {
    session_with(GameConfig::default(), text)
}

pub fn session_with(config: GameConfig, text: Arc<dyn TextGenerator>) -> Session {
    Session::new(config, text).with_random_source(InOrder)
}

/// Create each kind in turn, failing the test on any error.
pub async fn draw_all(session: &Session, kinds: &[CardKind]) {
    for kind in kinds {
        session
            .create_card(*kind)
            .await
            .unwrap_or_else(|e| panic!("creating {kind} failed: {e}"));
    }
}
