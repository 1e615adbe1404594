//! Self-model: Machine Spirit's internal picture of itself.
//!
//! Bundles identity, capabilities, runtime status, behaviour, goals, sensory
//! state and voice, plus an append-only narrative log. No I/O happens here;
//! callers decide how to persist or expose the snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SpiritError};
use crate::mode::Mode;

/// Free-form key/value metadata attached to messages and narrative events.
pub type Metadata = serde_json::Map<String, Value>;

/// Number of narrative events included in a full snapshot.
pub const NARRATIVE_EXPORT_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Epistemic self-assessment for a single response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpistemicSnapshot {
    pub confidence: Confidence,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl EpistemicSnapshot {
    pub fn new(confidence: Confidence) -> Self {
        Self {
            confidence,
            sources: Vec::new(),
            notes: String::new(),
        }
    }
}

/// Core identity. Rarely changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub name: String,
    pub version: String,
    pub build_codename: String,
    pub description: String,
}

impl Default for IdentityProfile {
    fn default() -> Self {
        Self {
            name: "Machine Spirit".to_string(),
            version: "0.0.1".to_string(),
            build_codename: "awakening".to_string(),
            description: "Local autonomous AI being with multimodal perception, creativity and self-improvement."
                .to_string(),
        }
    }
}

/// What Machine Spirit believes it can do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    pub modes: Vec<String>,
    pub tools: Vec<String>,
    pub limitations: Vec<String>,
}

impl Default for CapabilityProfile {
    fn default() -> Self {
        Self {
            modes: Mode::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            tools: Vec::new(),
            limitations: vec![
                "Reasoning core not fully wired yet.".to_string(),
                "Perception modules are stubs.".to_string(),
            ],
        }
    }
}

/// High-level runtime status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeStatus {
    pub host_os: Option<String>,
    pub cpu_load: Option<f64>,
    pub memory_usage: Option<f64>,
    pub network_ok: Option<bool>,
    pub last_activity_ts: DateTime<Utc>,
    pub current_mode: Mode,
    /// Soft heuristic: 0 until the first activity, then at least 1.
    pub active_sessions: u32,
}

impl Default for RuntimeStatus {
    fn default() -> Self {
        Self {
            host_os: None,
            cpu_load: None,
            memory_usage: None,
            network_ok: None,
            last_activity_ts: Utc::now(),
            current_mode: Mode::Default,
            active_sessions: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Brief,
    #[default]
    Balanced,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumorLevel {
    None,
    #[default]
    Light,
    Playful,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    Casual,
    #[default]
    Professional,
    Ceremonial,
}

/// How Machine Spirit tends to communicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BehavioralProfile {
    pub verbosity: Verbosity,
    pub humor_level: HumorLevel,
    pub formality: Formality,
}

/// Short-term and long-term goals. Neither list holds duplicates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GoalState {
    pub session_goals: Vec<String>,
    pub long_term_goals: Vec<String>,
}

/// Aggregated state from perception modules.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensoryState {
    pub audio_scene: Option<String>,
    pub last_sounds: Vec<String>,
    pub vision_scene: Option<String>,
    pub detected_objects: Vec<String>,
    pub detected_faces: u32,
}

/// Per-field change for a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Leave the current value untouched.
    Keep,
    /// Reset the field to its empty value.
    Clear,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn apply(self, target: &mut T)
    where
        T: Default,
    {
        match self {
            Patch::Keep => {}
            Patch::Clear => *target = T::default(),
            Patch::Set(v) => *target = v,
        }
    }

    pub fn apply_optional(self, target: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *target = None,
            Patch::Set(v) => *target = Some(v),
        }
    }
}

/// `None` means "not supplied", never "clear".
impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Keep,
        }
    }
}

/// Partial update for [`SensoryState`]. Fields default to [`Patch::Keep`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensoryUpdate {
    pub audio_scene: Patch<String>,
    pub last_sounds: Patch<Vec<String>>,
    pub vision_scene: Patch<String>,
    pub detected_objects: Patch<Vec<String>>,
    pub detected_faces: Patch<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub name: String,
    pub style: String,
    pub pitch: String,
    pub pace: String,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            name: "Machine Spirit Default".to_string(),
            style: "calm_technical".to_string(),
            pitch: "medium_low".to_string(),
            pace: "slightly_fast".to_string(),
        }
    }
}

/// One entry in the narrative ("inner story") log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub description: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfStats {
    pub message_count: u64,
}

/// Full serializable view of the self-model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfSnapshot {
    pub identity: IdentityProfile,
    pub capabilities: CapabilityProfile,
    pub runtime: RuntimeStatus,
    pub behavior: BehavioralProfile,
    pub goals: GoalState,
    pub sensory: SensoryState,
    pub voice: VoiceProfile,
    pub last_epistemic: Option<EpistemicSnapshot>,
    pub narrative: Vec<NarrativeEvent>,
    pub stats: SelfStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentitySummary {
    pub name: String,
    pub version: String,
    pub build_codename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSummary {
    pub current_mode: Mode,
    pub last_activity_ts: DateTime<Utc>,
}

/// Reduced view attached to every chat response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightweightSnapshot {
    pub identity: IdentitySummary,
    pub runtime: RuntimeSummary,
    pub behavior: BehavioralProfile,
    pub last_epistemic: Option<EpistemicSnapshot>,
}

/// Central self-representation of Machine Spirit.
#[derive(Debug, Clone)]
pub struct SelfModel {
    pub identity: IdentityProfile,
    pub capabilities: CapabilityProfile,
    pub runtime: RuntimeStatus,
    pub behavior: BehavioralProfile,
    pub goals: GoalState,
    pub sensory: SensoryState,
    pub voice: VoiceProfile,
    narrative: Vec<NarrativeEvent>,
    last_epistemic: Option<EpistemicSnapshot>,
    message_count: u64,
}

impl Default for SelfModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SelfModel {
    pub fn new() -> Self {
        Self::with_profiles(IdentityProfile::default(), CapabilityProfile::default())
    }

    pub fn with_profiles(identity: IdentityProfile, capabilities: CapabilityProfile) -> Self {
        Self {
            identity,
            capabilities,
            runtime: RuntimeStatus::default(),
            behavior: BehavioralProfile::default(),
            goals: GoalState::default(),
            sensory: SensoryState::default(),
            voice: VoiceProfile::default(),
            narrative: Vec::new(),
            last_epistemic: None,
            message_count: 0,
        }
    }

    /// Record that a message arrived.
    ///
    /// `user_id` and `session_id` are reserved for per-user stats and are
    /// only logged for now.
    pub fn track_activity(&mut self, user_id: &str, session_id: &str) {
        self.runtime.last_activity_ts = Utc::now();
        self.message_count += 1;
        self.runtime.active_sessions = self.runtime.active_sessions.max(1);
        debug!(user_id, session_id, message_count = self.message_count, "activity tracked");
    }

    pub fn set_current_mode(&mut self, mode: Mode) {
        self.runtime.current_mode = mode;
    }

    /// Store the latest epistemic snapshot.
    ///
    /// A low-confidence answer while verbosity is `brief` bumps verbosity to
    /// `balanced`. Nothing ever moves it back.
    pub fn update_epistemic_state(&mut self, snapshot: EpistemicSnapshot) {
        if snapshot.confidence == Confidence::Low && self.behavior.verbosity == Verbosity::Brief {
            debug!("low confidence, raising verbosity to balanced");
            self.behavior.verbosity = Verbosity::Balanced;
        }
        self.last_epistemic = Some(snapshot);
    }

    pub fn update_sensory_state(&mut self, update: SensoryUpdate) {
        update.audio_scene.apply_optional(&mut self.sensory.audio_scene);
        update.last_sounds.apply(&mut self.sensory.last_sounds);
        update.vision_scene.apply_optional(&mut self.sensory.vision_scene);
        update.detected_objects.apply(&mut self.sensory.detected_objects);
        update.detected_faces.apply(&mut self.sensory.detected_faces);
    }

    pub fn add_session_goal(&mut self, goal: impl Into<String>) {
        push_unique(&mut self.goals.session_goals, goal.into());
    }

    pub fn add_long_term_goal(&mut self, goal: impl Into<String>) {
        push_unique(&mut self.goals.long_term_goals, goal.into());
    }

    pub fn clear_session_goals(&mut self) {
        self.goals.session_goals.clear();
    }

    /// Append a timestamped event to the narrative log.
    pub fn log_event(
        &mut self,
        event_type: impl Into<String>,
        description: impl Into<String>,
        metadata: Option<Metadata>,
    ) {
        let event = NarrativeEvent {
            timestamp: Utc::now(),
            event_type: event_type.into(),
            description: description.into(),
            metadata: metadata.unwrap_or_default(),
        };
        debug!(event_type = %event.event_type, "narrative event");
        self.narrative.push(event);
    }

    /// Parse a mode name from outside and check it is one we claim to support.
    pub fn validate_mode(&self, raw: &str) -> Result<Mode> {
        let mode: Mode = raw.parse().map_err(|e| {
            warn!(mode = raw, "rejected unknown mode");
            e
        })?;
        if !self.capabilities.modes.iter().any(|m| m == raw) {
            warn!(mode = raw, "mode not in capability list");
            return Err(SpiritError::InvalidMode(raw.to_string()));
        }
        Ok(mode)
    }

    pub fn last_epistemic(&self) -> Option<&EpistemicSnapshot> {
        self.last_epistemic.as_ref()
    }

    pub fn narrative(&self) -> &[NarrativeEvent] {
        &self.narrative
    }

    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Full snapshot. The narrative is cut to the most recent
    /// [`NARRATIVE_EXPORT_LIMIT`] events.
    pub fn snapshot(&self) -> SelfSnapshot {
        let start = self.narrative.len().saturating_sub(NARRATIVE_EXPORT_LIMIT);
        SelfSnapshot {
            identity: self.identity.clone(),
            capabilities: self.capabilities.clone(),
            runtime: self.runtime.clone(),
            behavior: self.behavior,
            goals: self.goals.clone(),
            sensory: self.sensory.clone(),
            voice: self.voice.clone(),
            last_epistemic: self.last_epistemic.clone(),
            narrative: self.narrative[start..].to_vec(),
            stats: SelfStats {
                message_count: self.message_count,
            },
        }
    }

    pub fn lightweight_snapshot(&self) -> LightweightSnapshot {
        LightweightSnapshot {
            identity: IdentitySummary {
                name: self.identity.name.clone(),
                version: self.identity.version.clone(),
                build_codename: self.identity.build_codename.clone(),
            },
            runtime: RuntimeSummary {
                current_mode: self.runtime.current_mode,
                last_activity_ts: self.runtime.last_activity_ts,
            },
            behavior: self.behavior,
            last_epistemic: self.last_epistemic.clone(),
        }
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}
