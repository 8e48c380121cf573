//! # Operator Console
//!
//! Text front end for the panel: each stdin line is one operator action.
//!
//! ```text
//! target 1500     fill the target-RPM field (bare `target` clears it)
//! duration 30     fill the duration field in seconds (bare `duration` clears it)
//! go              send SET (if a target is set), START, and arm the timed stop
//! stop            send STOP now
//! status          show readouts and history size
//! quit            leave the panel
//! ```

use thiserror::Error;

/// One operator action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    SetTarget(String),
    SetDuration(String),
    Go,
    Stop,
    Status,
    Quit,
}

/// Input that does not name a known action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action '{0}' (expected: target, duration, go, stop, status, quit)")]
pub struct UnknownAction(pub String);

/// Parse one console line
///
/// Blank lines yield `Ok(None)`. Keywords are case-insensitive; field values
/// are kept as typed.
pub fn parse_action(line: &str) -> Result<Option<UserAction>, UnknownAction> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    let action = match keyword.to_ascii_lowercase().as_str() {
        "target" => UserAction::SetTarget(rest.to_string()),
        "duration" => UserAction::SetDuration(rest.to_string()),
        "go" if rest.is_empty() => UserAction::Go,
        "stop" if rest.is_empty() => UserAction::Stop,
        "status" if rest.is_empty() => UserAction::Status,
        "quit" | "exit" if rest.is_empty() => UserAction::Quit,
        _ => return Err(UnknownAction(line.to_string())),
    };

    Ok(Some(action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_actions() {
        assert_eq!(
            parse_action("target 1500"),
            Ok(Some(UserAction::SetTarget("1500".to_string())))
        );
        assert_eq!(
            parse_action("duration   30 \n"),
            Ok(Some(UserAction::SetDuration("30".to_string())))
        );
    }

    #[test]
    fn test_bare_field_keyword_clears() {
        assert_eq!(
            parse_action("target"),
            Ok(Some(UserAction::SetTarget(String::new())))
        );
        assert_eq!(
            parse_action("duration"),
            Ok(Some(UserAction::SetDuration(String::new())))
        );
    }

    #[test]
    fn test_parse_buttons() {
        assert_eq!(parse_action("go"), Ok(Some(UserAction::Go)));
        assert_eq!(parse_action("STOP"), Ok(Some(UserAction::Stop)));
        assert_eq!(parse_action("status"), Ok(Some(UserAction::Status)));
        assert_eq!(parse_action("quit"), Ok(Some(UserAction::Quit)));
        assert_eq!(parse_action("exit"), Ok(Some(UserAction::Quit)));
    }

    #[test]
    fn test_blank_line_is_no_action() {
        assert_eq!(parse_action(""), Ok(None));
        assert_eq!(parse_action("   \r\n"), Ok(None));
    }

    #[test]
    fn test_unknown_action() {
        assert_eq!(
            parse_action("spin faster"),
            Err(UnknownAction("spin faster".to_string()))
        );
        assert!(parse_action("go now").is_err());
    }

    #[test]
    fn test_target_value_kept_as_typed() {
        // The target is forwarded verbatim, so non-numeric text is not rejected here
        assert_eq!(
            parse_action("target max"),
            Ok(Some(UserAction::SetTarget("max".to_string())))
        );
    }
}
