//! Per-frame observation types fed into the tracking analyzer.
//!
//! Observations come from two independent perception sources (face and
//! pose). The engine does not care whether they were produced by a model,
//! a synthetic generator, or a hardware sensor.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label reported when no emotion or posture has been established yet.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Label of an optional state, `"unknown"` when absent.
pub fn label_or_unknown<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| UNKNOWN_LABEL.to_string(), |v| v.to_string())
}

/// Emotion labels a face source can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
    Neutral,
}

impl Emotion {
    /// All emotions in declaration order.
    pub const ALL: [Emotion; 7] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Disgusted,
        Emotion::Surprised,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fearful => "fearful",
            Emotion::Disgusted => "disgusted",
            Emotion::Surprised => "surprised",
            Emotion::Neutral => "neutral",
        }
    }

    /// Emotions that, combined with looking away, suggest being caught off-guard.
    pub fn is_startled(&self) -> bool {
        matches!(self, Emotion::Surprised | Emotion::Fearful)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown emotion label: {s}"))
    }
}

/// Accepts the same labels as [`Emotion::from_str`], case-insensitively.
impl<'de> Deserialize<'de> for Emotion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

/// Posture categories derived from pose observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    Good,
    Slouching,
    TooClose,
    TooFar,
}

impl Posture {
    pub const ALL: [Posture; 4] = [
        Posture::Good,
        Posture::Slouching,
        Posture::TooClose,
        Posture::TooFar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Posture::Good => "good",
            Posture::Slouching => "slouching",
            Posture::TooClose => "too_close",
            Posture::TooFar => "too_far",
        }
    }
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Posture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Posture::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown posture label: {s}"))
    }
}

impl<'de> Deserialize<'de> for Posture {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

/// Per-emotion probabilities for one frame (approximately summing to 1).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionScores {
    pub happy: f64,
    pub sad: f64,
    pub angry: f64,
    pub fearful: f64,
    pub disgusted: f64,
    pub surprised: f64,
    pub neutral: f64,
}

impl EmotionScores {
    /// A distribution with all mass on one emotion.
    pub fn certain(emotion: Emotion) -> Self {
        let mut scores = Self::default();
        *scores.get_mut(emotion) = 1.0;
        scores
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Happy => self.happy,
            Emotion::Sad => self.sad,
            Emotion::Angry => self.angry,
            Emotion::Fearful => self.fearful,
            Emotion::Disgusted => self.disgusted,
            Emotion::Surprised => self.surprised,
            Emotion::Neutral => self.neutral,
        }
    }

    fn get_mut(&mut self, emotion: Emotion) -> &mut f64 {
        match emotion {
            Emotion::Happy => &mut self.happy,
            Emotion::Sad => &mut self.sad,
            Emotion::Angry => &mut self.angry,
            Emotion::Fearful => &mut self.fearful,
            Emotion::Disgusted => &mut self.disgusted,
            Emotion::Surprised => &mut self.surprised,
            Emotion::Neutral => &mut self.neutral,
        }
    }

    /// Highest-scoring emotion. Ties go to the emotion declared first.
    pub fn dominant(&self) -> Emotion {
        let mut best = Emotion::ALL[0];
        for emotion in Emotion::ALL.iter().copied().skip(1) {
            if self.get(emotion) > self.get(best) {
                best = emotion;
            }
        }
        best
    }

    /// Sum of all scores.
    pub fn total(&self) -> f64 {
        Emotion::ALL.iter().map(|&e| self.get(e)).sum()
    }

    /// Rescale so the scores sum to 1. An all-zero distribution becomes neutral.
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total <= 0.0 || !total.is_finite() {
            return Self::certain(Emotion::Neutral);
        }
        let mut out = *self;
        for emotion in Emotion::ALL {
            *out.get_mut(emotion) /= total;
        }
        out
    }

    fn clamped(&self) -> Option<Self> {
        let mut out = *self;
        for emotion in Emotion::ALL {
            *out.get_mut(emotion) = clamp_unit(self.get(emotion))?;
        }
        Some(out)
    }
}

/// Head motion measurements from the face source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadMovement {
    /// 1.0 = perfectly still, 0.0 = constant motion
    pub stability: f64,
    pub excessive_movement: bool,
}

/// One frame of face-related measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceObservation {
    pub looking_away: bool,
    pub abnormal_position: bool,
    pub emotion_scores: EmotionScores,
    pub dominant_emotion: Emotion,
    /// Instantaneous attention estimate in [0, 1]
    pub attention: f64,
    pub head_movement: HeadMovement,
}

impl FaceObservation {
    /// Build an observation whose dominant emotion is taken from the scores.
    pub fn from_scores(
        attention: f64,
        emotion_scores: EmotionScores,
        head_movement: HeadMovement,
    ) -> Self {
        Self {
            looking_away: false,
            abnormal_position: false,
            dominant_emotion: emotion_scores.dominant(),
            emotion_scores,
            attention,
            head_movement,
        }
    }

    /// Parse a loosely-typed payload. Anything that does not fit is absent.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        match serde_json::from_value::<Self>(value.clone()) {
            Ok(face) => Some(face),
            Err(e) => {
                tracing::warn!("Dropping malformed face observation: {e}");
                None
            }
        }
    }

    /// Clamp all unit-interval fields. Returns `None` if any is not finite.
    pub fn sanitized(&self) -> Option<Self> {
        let attention = clamp_unit(self.attention)?;
        let stability = clamp_unit(self.head_movement.stability)?;
        let emotion_scores = self.emotion_scores.clamped()?;
        Some(Self {
            attention,
            emotion_scores,
            head_movement: HeadMovement {
                stability,
                excessive_movement: self.head_movement.excessive_movement,
            },
            ..self.clone()
        })
    }
}

/// Posture flags from the pose source.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureFlags {
    pub slouching: bool,
    pub too_close: bool,
    pub too_far: bool,
}

/// Body movement measurements from the pose source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementInfo {
    pub excessive_movement: bool,
    pub stability_score: f64,
}

/// Where the participant sits in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FramePosition {
    pub centered: bool,
    pub visible_shoulders: bool,
}

/// One frame of posture and body movement measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseObservation {
    pub posture: PostureFlags,
    pub movement: MovementInfo,
    pub position: FramePosition,
}

impl PoseObservation {
    /// A centered, still participant with the given posture flags.
    pub fn with_posture(posture: PostureFlags) -> Self {
        Self {
            posture,
            movement: MovementInfo {
                excessive_movement: false,
                stability_score: 1.0,
            },
            position: FramePosition {
                centered: true,
                visible_shoulders: true,
            },
        }
    }

    /// Collapse the posture flags into one category.
    ///
    /// Precedence: slouching, too close, too far, otherwise good.
    pub fn posture_category(&self) -> Posture {
        if self.posture.slouching {
            Posture::Slouching
        } else if self.posture.too_close {
            Posture::TooClose
        } else if self.posture.too_far {
            Posture::TooFar
        } else {
            Posture::Good
        }
    }

    /// Parse a loosely-typed payload. Anything that does not fit is absent.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        match serde_json::from_value::<Self>(value.clone()) {
            Ok(pose) => Some(pose),
            Err(e) => {
                tracing::warn!("Dropping malformed pose observation: {e}");
                None
            }
        }
    }

    /// Clamp the stability score. Returns `None` if it is not finite.
    pub fn sanitized(&self) -> Option<Self> {
        let stability_score = clamp_unit(self.movement.stability_score)?;
        Some(Self {
            movement: MovementInfo {
                stability_score,
                ..self.movement
            },
            ..self.clone()
        })
    }
}

/// Clamp to [0, 1]; non-finite values are rejected.
fn clamp_unit(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value.clamp(0.0, 1.0))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn face_json() -> serde_json::Value {
        json!({
            "lookingAway": false,
            "abnormalPosition": false,
            "emotionScores": {
                "happy": 0.7, "sad": 0.05, "angry": 0.05, "fearful": 0.05,
                "disgusted": 0.05, "surprised": 0.05, "neutral": 0.05
            },
            "dominantEmotion": "happy",
            "attention": 0.8,
            "headMovement": { "stability": 0.9, "excessiveMovement": false }
        })
    }

    #[test]
    fn test_emotion_parsing() {
        assert_eq!("Happy".parse::<Emotion>().unwrap(), Emotion::Happy);
        assert_eq!(" fearful ".parse::<Emotion>().unwrap(), Emotion::Fearful);
        assert!("nervous".parse::<Emotion>().is_err());
    }

    #[test]
    fn test_wire_labels_match_parsing() {
        let mut value = face_json();
        value["dominantEmotion"] = json!("Happy");
        let face = FaceObservation::from_value(&value).unwrap();
        assert_eq!(face.dominant_emotion, Emotion::Happy);

        let emotion: Emotion = serde_json::from_str("\"Fearful\"").unwrap();
        assert_eq!(emotion, Emotion::Fearful);
        let posture: Posture = serde_json::from_str("\"TOO_CLOSE\"").unwrap();
        assert_eq!(posture, Posture::TooClose);
        assert!(serde_json::from_str::<Emotion>("\"nervous\"").is_err());
        assert_eq!(serde_json::to_string(&Posture::TooFar).unwrap(), "\"too_far\"");
    }

    #[test]
    fn test_posture_precedence() {
        let pose = PoseObservation::with_posture(PostureFlags {
            slouching: true,
            too_close: true,
            too_far: false,
        });
        assert_eq!(pose.posture_category(), Posture::Slouching);

        let pose = PoseObservation::with_posture(PostureFlags {
            slouching: false,
            too_close: true,
            too_far: true,
        });
        assert_eq!(pose.posture_category(), Posture::TooClose);

        let pose = PoseObservation::with_posture(PostureFlags::default());
        assert_eq!(pose.posture_category(), Posture::Good);
    }

    #[test]
    fn test_dominant_and_normalize() {
        let scores = EmotionScores {
            neutral: 2.0,
            happy: 1.0,
            ..Default::default()
        };
        assert_eq!(scores.dominant(), Emotion::Neutral);

        let normalized = scores.normalized();
        assert!((normalized.total() - 1.0).abs() < 1e-9);
        assert!((normalized.neutral - 2.0 / 3.0).abs() < 1e-9);

        let empty = EmotionScores::default().normalized();
        assert_eq!(empty.dominant(), Emotion::Neutral);
    }

    #[test]
    fn test_face_from_value() {
        let face = FaceObservation::from_value(&face_json()).unwrap();
        assert_eq!(face.dominant_emotion, Emotion::Happy);
        assert!((face.attention - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_face_is_absent() {
        let mut value = face_json();
        value.as_object_mut().unwrap().remove("headMovement");
        assert!(FaceObservation::from_value(&value).is_none());

        let mut value = face_json();
        value["dominantEmotion"] = json!("nervous");
        assert!(FaceObservation::from_value(&value).is_none());

        assert!(FaceObservation::from_value(&serde_json::Value::Null).is_none());
    }

    #[test]
    fn test_pose_from_value() {
        let value = json!({
            "posture": { "slouching": false, "tooClose": true, "tooFar": false },
            "movement": { "excessiveMovement": false, "stabilityScore": 0.7 },
            "position": { "centered": true, "visibleShoulders": true }
        });
        let pose = PoseObservation::from_value(&value).unwrap();
        assert_eq!(pose.posture_category(), Posture::TooClose);

        assert!(PoseObservation::from_value(&json!({ "posture": {} })).is_none());
    }

    #[test]
    fn test_sanitize_clamps_and_rejects() {
        let mut face = FaceObservation::from_value(&face_json()).unwrap();
        face.attention = 1.7;
        face.head_movement.stability = -0.2;
        let clean = face.sanitized().unwrap();
        assert_eq!(clean.attention, 1.0);
        assert_eq!(clean.head_movement.stability, 0.0);

        face.attention = f64::NAN;
        assert!(face.sanitized().is_none());

        let mut pose = PoseObservation::with_posture(PostureFlags::default());
        pose.movement.stability_score = 3.0;
        assert_eq!(pose.sanitized().unwrap().movement.stability_score, 1.0);
        pose.movement.stability_score = f64::INFINITY;
        assert!(pose.sanitized().is_none());
    }
}
