//! Validation for manually created notifications.

use super::error::NotificationError;
use super::types::{NewNotification, NotificationInput, NotificationKind, Recipient};

/// Longest accepted title.
pub const MAX_TITLE_LEN: usize = 200;

/// Validates a manual notification.
///
/// Exactly one of `user_id` and `broadcast` must be given.
pub fn validate_notification(input: &NotificationInput) -> Result<NewNotification, NotificationError> {
    let recipient = match (input.user_id, input.broadcast) {
        (Some(id), false) => Recipient::User(id),
        (None, true) => Recipient::Broadcast,
        _ => return Err(NotificationError::AmbiguousTarget),
    };

    let title = input
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| NotificationError::MissingFields(vec!["title"]))?;
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(NotificationError::TitleTooLong);
    }

    let kind = match input.kind.as_deref() {
        Some(raw) => NotificationKind::parse(raw)
            .ok_or_else(|| NotificationError::InvalidKind(raw.to_string()))?,
        None => NotificationKind::Manual,
    };

    Ok(NewNotification {
        recipient,
        kind,
        title: title.to_string(),
        payload: input.payload.clone().unwrap_or(serde_json::Value::Null),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_user_notification() {
        let user = Uuid::new_v4();
        let n = validate_notification(&NotificationInput {
            user_id: Some(user),
            title: Some("Month-end close tomorrow".into()),
            ..NotificationInput::default()
        })
        .unwrap();
        assert_eq!(n.recipient, Recipient::User(user));
        assert_eq!(n.kind, NotificationKind::Manual);
    }

    #[test]
    fn test_target_must_be_unambiguous() {
        let both = NotificationInput {
            user_id: Some(Uuid::new_v4()),
            broadcast: true,
            title: Some("x".into()),
            ..NotificationInput::default()
        };
        assert!(matches!(
            validate_notification(&both),
            Err(NotificationError::AmbiguousTarget)
        ));

        let neither = NotificationInput {
            title: Some("x".into()),
            ..NotificationInput::default()
        };
        assert!(matches!(
            validate_notification(&neither),
            Err(NotificationError::AmbiguousTarget)
        ));
    }

    #[test]
    fn test_kind_and_title_rules() {
        let bad_kind = NotificationInput {
            broadcast: true,
            kind: Some("party".into()),
            title: Some("x".into()),
            ..NotificationInput::default()
        };
        assert!(matches!(
            validate_notification(&bad_kind),
            Err(NotificationError::InvalidKind(_))
        ));

        let no_title = NotificationInput {
            broadcast: true,
            ..NotificationInput::default()
        };
        assert!(matches!(
            validate_notification(&no_title),
            Err(NotificationError::MissingFields(_))
        ));
    }
}
