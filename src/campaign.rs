//! Campaign configuration: the typed model behind every funnel.
//!
//! DESIGN
//! ======
//! The editor stores campaigns as loosely shaped JSON. This module is the
//! boundary where that JSON becomes a `Campaign`: the declared type is parsed
//! into `DeclaredType`, `gameConfig[type]` becomes one validated `GameConfig`
//! variant, and design values fall back to documented defaults. Code past this
//! boundary never inspects raw JSON again.
//!
//! ERROR HANDLING
//! ==============
//! An unrecognized declared type is not an error: it is carried as
//! `DeclaredType::Unknown` and the dispatcher renders a textual fallback.
//! Missing design values take defaults. Only structurally invalid game
//! configuration (bad probabilities, empty wheels, out-of-range answers) is
//! rejected, and only when a campaign is saved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use layout::device::{self, Device, PlaceableElement};
use layout::geom::{Rect, Size};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("campaign not found: {0}")]
    NotFound(Uuid),
    #[error("invalid campaign config: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid {kind} game config: {reason}")]
    InvalidGame { kind: &'static str, reason: String },
    #[error("campaign defines {0} screens; at most 4 are allowed")]
    TooManyScreens(usize),
    #[error("element '{element}' overlaps the game area on {device:?}")]
    GameAreaOverlap { element: String, device: Device },
}

impl crate::error::ErrorCode for CampaignError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_CAMPAIGN_NOT_FOUND",
            Self::Malformed(_) => "E_CAMPAIGN_MALFORMED",
            Self::InvalidGame { .. } => "E_GAME_CONFIG",
            Self::TooManyScreens(_) => "E_TOO_MANY_SCREENS",
            Self::GameAreaOverlap { .. } => "E_LAYOUT_OVERLAP",
        }
    }

    fn status(&self) -> axum::http::StatusCode {
        match self {
            Self::NotFound(_) => axum::http::StatusCode::NOT_FOUND,
            _ => axum::http::StatusCode::BAD_REQUEST,
        }
    }
}

// =============================================================================
// KINDS
// =============================================================================

/// The eight campaign types the editor can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignKind {
    Wheel,
    Quiz,
    Scratch,
    Jackpot,
    Dice,
    Memory,
    Puzzle,
    Form,
}

impl CampaignKind {
    pub const ALL: [Self; 8] =
        [Self::Wheel, Self::Quiz, Self::Scratch, Self::Jackpot, Self::Dice, Self::Memory, Self::Puzzle, Self::Form];

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wheel => "wheel",
            Self::Quiz => "quiz",
            Self::Scratch => "scratch",
            Self::Jackpot => "jackpot",
            Self::Dice => "dice",
            Self::Memory => "memory",
            Self::Puzzle => "puzzle",
            Self::Form => "form",
        }
    }

    /// Games whose outcome is pure chance and which sit behind the lead-capture gate.
    #[must_use]
    pub fn is_chance_game(self) -> bool {
        matches!(self, Self::Wheel | Self::Scratch | Self::Jackpot | Self::Dice)
    }
}

/// The `type` field as written by the editor. Unknown strings are kept, not rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeclaredType {
    Known(CampaignKind),
    Unknown(String),
}

impl DeclaredType {
    #[must_use]
    pub fn kind(&self) -> Option<CampaignKind> {
        match self {
            Self::Known(kind) => Some(*kind),
            Self::Unknown(_) => None,
        }
    }
}

impl From<String> for DeclaredType {
    fn from(raw: String) -> Self {
        match CampaignKind::parse(raw.trim()) {
            Some(kind) => Self::Known(kind),
            None => Self::Unknown(raw),
        }
    }
}

impl From<DeclaredType> for String {
    fn from(declared: DeclaredType) -> Self {
        match declared {
            DeclaredType::Known(kind) => kind.as_str().to_string(),
            DeclaredType::Unknown(raw) => raw,
        }
    }
}

/// Which funnel sequence a campaign runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunnelKind {
    /// Game shown behind a lead-capture overlay.
    Unlocked,
    /// Linear start → form → game → result.
    Standard,
}

// =============================================================================
// DESIGN
// =============================================================================

/// Per-device presentation knobs. `Design::mobile_config` overlays these off desktop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Presentation {
    pub font_size: f64,
    pub game_scale: f64,
    pub button_placement: String,
}

impl Default for Presentation {
    fn default() -> Self {
        Self { font_size: 16.0, game_scale: 1.0, button_placement: "bottom".into() }
    }
}

/// Visual configuration. Every field has a default so partial designs render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Design {
    pub primary_color: String,
    pub secondary_color: String,
    pub text_color: String,
    pub background_color: String,
    pub font_family: String,
    pub background_image: Option<String>,
    pub mobile_background_image: Option<String>,
    pub presentation: Presentation,
    pub mobile_config: Option<Presentation>,
    pub container: Size,
    pub game_area: Option<Rect>,
    pub elements: Vec<PlaceableElement>,
}

impl Default for Design {
    fn default() -> Self {
        Self {
            primary_color: "#841b60".into(),
            secondary_color: "#ffffff".into(),
            text_color: "#1f1f1f".into(),
            background_color: "#f5f5f5".into(),
            font_family: "Inter, sans-serif".into(),
            background_image: None,
            mobile_background_image: None,
            presentation: Presentation::default(),
            mobile_config: None,
            container: Size::new(400.0, 600.0),
            game_area: None,
            elements: Vec::new(),
        }
    }
}

// =============================================================================
// SCREENS + FORM
// =============================================================================

/// Index into `screens[]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenSlot {
    Start = 0,
    Form = 1,
    Game = 2,
    Result = 3,
}

/// Copy and call-to-action text for one funnel screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Screen {
    pub title: Option<String>,
    pub description: Option<String>,
    pub button_text: Option<String>,
    pub win_message: Option<String>,
    pub lose_message: Option<String>,
    pub cta_link: Option<String>,
    pub cta_text: Option<String>,
    pub replay_button_text: Option<String>,
}

/// One lead-capture field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

fn default_field_type() -> String {
    "text".into()
}

impl FormField {
    fn new(id: &str, label: &str, field_type: &str, required: bool) -> Self {
        Self { id: id.into(), label: label.into(), field_type: field_type.into(), required, options: Vec::new() }
    }
}

/// Fields used when the editor saved none.
#[must_use]
pub fn default_form_fields() -> Vec<FormField> {
    vec![
        FormField::new("prenom", "First name", "text", true),
        FormField::new("nom", "Last name", "text", true),
        FormField::new("email", "Email", "email", true),
    ]
}

// =============================================================================
// GAME CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelSegment {
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub winning: bool,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelConfig {
    pub segments: Vec<WheelSegment>,
}

impl Default for WheelConfig {
    fn default() -> Self {
        let segment = |label: &str, winning| WheelSegment { label: label.into(), color: None, weight: 1.0, winning };
        Self {
            segments: vec![
                segment("Prize", true),
                segment("Try again", false),
                segment("Prize", true),
                segment("Try again", false),
            ],
        }
    }
}

/// Scratch cards, jackpots and dice: a win probability plus display symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChanceConfig {
    pub win_probability: f64,
    pub symbols: Vec<String>,
}

impl Default for ChanceConfig {
    fn default() -> Self {
        Self { win_probability: 0.1, symbols: vec!["cherry".into(), "lemon".into(), "star".into(), "seven".into()] }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub text: String,
    pub answers: Vec<String>,
    pub correct: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizConfig {
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryConfig {
    pub pairs: u32,
    pub time_limit_secs: Option<u32>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { pairs: 6, time_limit_secs: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PuzzleConfig {
    pub grid_size: u8,
    pub image: Option<String>,
    pub time_limit_secs: Option<u32>,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self { grid_size: 3, image: None, time_limit_secs: None }
    }
}

/// Validated per-kind game configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GameConfig {
    Wheel(WheelConfig),
    Quiz(QuizConfig),
    Scratch(ChanceConfig),
    Jackpot(ChanceConfig),
    Dice(ChanceConfig),
    Memory(MemoryConfig),
    Puzzle(PuzzleConfig),
    Form,
}

impl GameConfig {
    /// Parse and validate `gameConfig[kind]`. A missing entry yields defaults.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` when the entry has the wrong shape and
    /// `InvalidGame` when its values are out of range.
    pub fn from_raw(kind: CampaignKind, raw: Option<&Value>) -> Result<Self, CampaignError> {
        fn parse<T: serde::de::DeserializeOwned + Default>(raw: Option<&Value>) -> Result<T, CampaignError> {
            match raw {
                None | Some(Value::Null) => Ok(T::default()),
                Some(value) => Ok(T::deserialize(value)?),
            }
        }

        let config = match kind {
            CampaignKind::Wheel => Self::Wheel(parse(raw)?),
            CampaignKind::Quiz => Self::Quiz(parse(raw)?),
            CampaignKind::Scratch => Self::Scratch(parse(raw)?),
            CampaignKind::Jackpot => Self::Jackpot(parse(raw)?),
            CampaignKind::Dice => Self::Dice(parse(raw)?),
            CampaignKind::Memory => Self::Memory(parse(raw)?),
            CampaignKind::Puzzle => Self::Puzzle(parse(raw)?),
            CampaignKind::Form => Self::Form,
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn kind(&self) -> CampaignKind {
        match self {
            Self::Wheel(_) => CampaignKind::Wheel,
            Self::Quiz(_) => CampaignKind::Quiz,
            Self::Scratch(_) => CampaignKind::Scratch,
            Self::Jackpot(_) => CampaignKind::Jackpot,
            Self::Dice(_) => CampaignKind::Dice,
            Self::Memory(_) => CampaignKind::Memory,
            Self::Puzzle(_) => CampaignKind::Puzzle,
            Self::Form => CampaignKind::Form,
        }
    }

    fn validate(&self) -> Result<(), CampaignError> {
        let invalid = |reason: String| CampaignError::InvalidGame { kind: self.kind().as_str(), reason };
        match self {
            Self::Wheel(wheel) => {
                if wheel.segments.is_empty() {
                    return Err(invalid("wheel needs at least one segment".into()));
                }
                if let Some(bad) = wheel.segments.iter().find(|s| !s.weight.is_finite() || s.weight < 0.0) {
                    return Err(invalid(format!("segment '{}' has weight {}", bad.label, bad.weight)));
                }
            }
            Self::Scratch(chance) | Self::Jackpot(chance) | Self::Dice(chance) => {
                if !(0.0..=1.0).contains(&chance.win_probability) {
                    return Err(invalid(format!("win probability {} outside [0, 1]", chance.win_probability)));
                }
            }
            Self::Quiz(quiz) => {
                for (i, q) in quiz.questions.iter().enumerate() {
                    if q.correct >= q.answers.len() {
                        return Err(invalid(format!("question {i} marks answer {} correct but has {}", q.correct, q.answers.len())));
                    }
                }
            }
            Self::Memory(memory) => {
                if memory.pairs == 0 {
                    return Err(invalid("memory game needs at least one pair".into()));
                }
            }
            Self::Puzzle(puzzle) => {
                if !(2..=8).contains(&puzzle.grid_size) {
                    return Err(invalid(format!("grid size {} outside 2..=8", puzzle.grid_size)));
                }
            }
            Self::Form => {}
        }
        Ok(())
    }
}

// =============================================================================
// CAMPAIGN
// =============================================================================

/// Campaign configuration exactly as the editor sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignConfig {
    #[serde(rename = "type")]
    pub declared_type: DeclaredType,
    #[serde(default)]
    pub funnel: Option<FunnelKind>,
    #[serde(default)]
    pub design: Design,
    #[serde(default)]
    pub game_config: Map<String, Value>,
    #[serde(default)]
    pub screens: Vec<Screen>,
    #[serde(default)]
    pub form_fields: Vec<FormField>,
}

/// A validated campaign.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: DeclaredType,
    pub funnel: Option<FunnelKind>,
    pub design: Design,
    /// `None` only when the declared type is unknown.
    pub game: Option<GameConfig>,
    pub screens: Vec<Screen>,
    pub form_fields: Vec<FormField>,
}

impl Campaign {
    /// Validate a raw editor config into a campaign.
    ///
    /// # Errors
    ///
    /// Returns a `CampaignError` if the JSON shape or game values are invalid.
    pub fn from_value(id: Uuid, name: impl Into<String>, raw: &Value) -> Result<Self, CampaignError> {
        let config = CampaignConfig::deserialize(raw)?;
        Self::from_config(id, name, config)
    }

    /// # Errors
    ///
    /// Returns a `CampaignError` if the game config or screen list is invalid.
    pub fn from_config(id: Uuid, name: impl Into<String>, config: CampaignConfig) -> Result<Self, CampaignError> {
        if config.screens.len() > 4 {
            return Err(CampaignError::TooManyScreens(config.screens.len()));
        }
        let game = match config.declared_type.kind() {
            Some(kind) => Some(GameConfig::from_raw(kind, config.game_config.get(kind.as_str()))?),
            None => None,
        };
        check_game_area(&config.design)?;
        let form_fields = if config.form_fields.is_empty() { default_form_fields() } else { config.form_fields };

        Ok(Self {
            id,
            name: name.into(),
            declared_type: config.declared_type,
            funnel: config.funnel,
            design: config.design,
            game,
            screens: config.screens,
            form_fields,
        })
    }

    #[must_use]
    pub fn screen(&self, slot: ScreenSlot) -> Option<&Screen> {
        self.screens.get(slot as usize)
    }
}

/// Every element, on every device, must stay clear of the game area.
fn check_game_area(design: &Design) -> Result<(), CampaignError> {
    let Some(game_area) = design.game_area else {
        return Ok(());
    };
    for element in &design.elements {
        if let Some(device) = device::game_area_conflict(element, design.container, &game_area) {
            return Err(CampaignError::GameAreaOverlap { element: element.id.clone(), device });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "campaign_test.rs"]
mod tests;
