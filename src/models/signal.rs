use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded user action against a movie.
///
/// Signals are append-only with one row per `(user, movie, action)`;
/// re-sending the same signal refreshes the timestamp instead of
/// duplicating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub user_id: String,
    pub movie_id: i64,
    pub action: SignalAction,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Like,
    Dismiss,
    Watchlist,
}

impl SignalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::Like => "like",
            SignalAction::Dismiss => "dismiss",
            SignalAction::Watchlist => "watchlist",
        }
    }

    /// Whether the action counts toward taste derivation. Dismissals are
    /// recorded but carry no positive preference weight.
    pub fn is_positive(&self) -> bool {
        matches!(self, SignalAction::Like | SignalAction::Watchlist)
    }
}

impl std::str::FromStr for SignalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(SignalAction::Like),
            "dismiss" => Ok(SignalAction::Dismiss),
            "watchlist" => Ok(SignalAction::Watchlist),
            other => Err(format!("unknown signal action: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_action_serialization() {
        assert_eq!(
            serde_json::to_string(&SignalAction::Like).unwrap(),
            r#""like""#
        );
        assert_eq!(
            serde_json::to_string(&SignalAction::Watchlist).unwrap(),
            r#""watchlist""#
        );
    }

    #[test]
    fn test_action_round_trip() {
        for action in [
            SignalAction::Like,
            SignalAction::Dismiss,
            SignalAction::Watchlist,
        ] {
            assert_eq!(SignalAction::from_str(action.as_str()).unwrap(), action);
        }
    }

    #[test]
    fn test_action_from_str_unknown() {
        assert!(SignalAction::from_str("superlike").is_err());
    }

    #[test]
    fn test_positive_actions() {
        assert!(SignalAction::Like.is_positive());
        assert!(SignalAction::Watchlist.is_positive());
        assert!(!SignalAction::Dismiss.is_positive());
    }

    #[test]
    fn test_signal_serializes_camel_case() {
        let signal = Signal {
            user_id: "user-1".to_string(),
            movie_id: 603,
            action: SignalAction::Like,
            recorded_at: Utc::now(),
        };

        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["movieId"], 603);
        assert_eq!(json["action"], "like");
    }
}
