use redis::ConnectionLike;
use uuid::Uuid;

use crate::{model::notification::Notification, settings::Config};

/// Oldest notifications beyond this are dropped on insert.
pub const MAX_NOTIFICATIONS: usize = 50;

fn notification_key(user_id: &Uuid) -> String {
    format!("notification:{user_id}")
}

/// Notifications of a user, newest first.
pub fn get_notifications<C: ConnectionLike>(
    redis_conn: &mut C,
    user_id: &Uuid,
) -> anyhow::Result<Vec<Notification>> {
    let res: Vec<String> = redis::cmd("LRANGE")
        .arg(notification_key(user_id))
        .arg(0)
        .arg(-1)
        .query(redis_conn)?;
    let mut notifications = Vec::with_capacity(res.len());
    for item in res.iter() {
        notifications.push(serde_json::from_str(item)?);
    }
    Ok(notifications)
}

/// Push, trim and refresh the expiry in one MULTI so concurrent senders
/// never overwrite each other.
pub fn add_notification<C: ConnectionLike>(
    redis_conn: &mut C,
    config: &Config,
    user_id: &Uuid,
    notification: Notification,
) -> anyhow::Result<()> {
    let key = notification_key(user_id);
    let payload = serde_json::to_string(&notification)?;
    redis::pipe()
        .atomic()
        .lpush(&key, payload)
        .ignore()
        .ltrim(&key, 0, MAX_NOTIFICATIONS as isize - 1)
        .ignore()
        .expire(&key, config.notification_ttl as i64)
        .ignore()
        .query::<()>(redis_conn)?;
    Ok(())
}

/// Best effort delivery. A redis failure is logged and never fails the
/// caller's request.
pub fn notify<C: ConnectionLike>(
    redis_conn: &mut C,
    config: &Config,
    user_id: &Uuid,
    notification: Notification,
) {
    let notification_type = notification.notification_type;
    if let Err(err) = add_notification(redis_conn, config, user_id, notification) {
        tracing::warn!(
            "unable to add {} notification for user {}: {}",
            notification_type.as_str(),
            user_id,
            err
        );
    }
}

/// Rewritten `(index, payload)` pairs for the entries to flag as read:
/// the one with `notification_id`, or every unread entry when `None`.
/// Entries that fail to parse are left untouched.
fn read_updates(raw: &[String], notification_id: Option<&Uuid>) -> Vec<(isize, String)> {
    raw.iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let mut notification: Notification = serde_json::from_str(item).ok()?;
            let wanted = match notification_id {
                Some(id) => notification.id == *id,
                None => !notification.read,
            };
            if !wanted {
                return None;
            }
            notification.read = true;
            let payload = serde_json::to_string(&notification).ok()?;
            Some((idx as isize, payload))
        })
        .collect()
}

/// LSET the updates under WATCH. A concurrent push aborts the EXEC and
/// the read is retried against the new list.
fn apply_read<C: ConnectionLike>(
    redis_conn: &mut C,
    user_id: &Uuid,
    notification_id: Option<&Uuid>,
) -> anyhow::Result<bool> {
    let key = notification_key(user_id);
    let changed = redis::transaction(redis_conn, &[&key], |con, pipe| {
        let raw: Vec<String> = redis::cmd("LRANGE").arg(&key).arg(0).arg(-1).query(con)?;
        let updates = read_updates(&raw, notification_id);
        if updates.is_empty() {
            return Ok(Some(false));
        }
        for (idx, payload) in updates {
            pipe.lset(&key, idx, payload).ignore();
        }
        pipe.query::<Option<()>>(con).map(|res| res.map(|_| true))
    })?;
    Ok(changed)
}

/// Returns false when no notification has the given id.
pub fn mark_notification_read<C: ConnectionLike>(
    redis_conn: &mut C,
    user_id: &Uuid,
    notification_id: &Uuid,
) -> anyhow::Result<bool> {
    apply_read(redis_conn, user_id, Some(notification_id))
}

pub fn mark_all_notifications_read<C: ConnectionLike>(
    redis_conn: &mut C,
    user_id: &Uuid,
) -> anyhow::Result<()> {
    apply_read(redis_conn, user_id, None)?;
    Ok(())
}

pub fn clear_notifications<C: ConnectionLike>(
    redis_conn: &mut C,
    user_id: &Uuid,
) -> anyhow::Result<()> {
    redis::cmd("DEL")
        .arg(notification_key(user_id))
        .exec(redis_conn)?;
    Ok(())
}

pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|x| !x.read).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::notification::NotificationType, settings::get_config};

    #[test]
    fn test_read_updates() {
        let first = Notification::new(NotificationType::Match, "a", "b", None);
        let mut second = Notification::new(NotificationType::Message, "c", "d", None);
        second.read = true;
        let raw = vec![
            serde_json::to_string(&first).unwrap(),
            "not json".to_string(),
            serde_json::to_string(&second).unwrap(),
        ];

        // by id, even when already read
        let updates = read_updates(&raw, Some(&second.id));
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, 2);

        // all unread
        let updates = read_updates(&raw, None);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, 0);
        let updated: Notification = serde_json::from_str(&updates[0].1).unwrap();
        assert_eq!(updated.id, first.id);
        assert!(updated.read);

        assert!(read_updates(&raw, Some(&Uuid::now_v7())).is_empty());
    }

    #[test]
    fn test_unread_count() {
        let mut first = Notification::new(NotificationType::Match, "a", "b", None);
        let second = Notification::new(NotificationType::Message, "c", "d", Some("/chat"));
        first.read = true;
        assert_eq!(unread_count(&[first, second]), 1);
    }

    #[test]
    fn test_notification_json_shape() {
        let notification =
            Notification::new(NotificationType::Connection, "t", "m", Some("/matches"));
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["type"], "connection");
        assert_eq!(value["read"], false);
        assert_eq!(value["link"], "/matches");
    }

    #[test]
    fn test_add_notification_from_two_connections() -> anyhow::Result<()> {
        // Given
        let config = get_config()?;
        let client = redis::Client::open(config.redis_url.clone())?;
        let user_id = Uuid::now_v7();

        // When two senders push without reading in between
        std::thread::scope(|scope| {
            for sender in ["alice", "bob"] {
                let client = client.clone();
                let config = &config;
                let user_id = &user_id;
                scope.spawn(move || {
                    let mut redis_conn = client.get_connection().unwrap();
                    for idx in 0..10 {
                        add_notification(
                            &mut redis_conn,
                            config,
                            user_id,
                            Notification::new(
                                NotificationType::Message,
                                &format!("{sender} {idx}"),
                                "hello",
                                None,
                            ),
                        )
                        .unwrap();
                    }
                });
            }
        });

        // Expect every entry survives
        let mut redis_conn = client.get_connection()?;
        let notifications = get_notifications(&mut redis_conn, &user_id)?;
        assert_eq!(notifications.len(), 20);
        assert_eq!(
            notifications
                .iter()
                .filter(|x| x.title.starts_with("alice"))
                .count(),
            10
        );
        let ttl: i64 = redis::cmd("TTL")
            .arg(notification_key(&user_id))
            .query(&mut redis_conn)?;
        assert!(ttl > 0);
        clear_notifications(&mut redis_conn, &user_id)?;
        Ok(())
    }

    #[test]
    fn test_add_notification_caps_list() -> anyhow::Result<()> {
        // Given
        let config = get_config()?;
        let client = redis::Client::open(config.redis_url.clone())?;
        let mut redis_conn = client.get_connection()?;
        let user_id = Uuid::now_v7();

        // When
        for idx in 0..(MAX_NOTIFICATIONS + 5) {
            add_notification(
                &mut redis_conn,
                &config,
                &user_id,
                Notification::new(NotificationType::System, &format!("title {idx}"), "m", None),
            )?;
        }

        // Expect newest first, oldest dropped
        let notifications = get_notifications(&mut redis_conn, &user_id)?;
        assert_eq!(notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(
            notifications[0].title,
            format!("title {}", MAX_NOTIFICATIONS + 4)
        );
        assert_eq!(
            notifications[MAX_NOTIFICATIONS - 1].title,
            "title 5".to_string()
        );
        clear_notifications(&mut redis_conn, &user_id)?;
        Ok(())
    }

    #[test]
    fn test_mark_read_keeps_later_entries() -> anyhow::Result<()> {
        // Given
        let config = get_config()?;
        let client = redis::Client::open(config.redis_url.clone())?;
        let mut redis_conn = client.get_connection()?;
        let user_id = Uuid::now_v7();
        let first = Notification::new(NotificationType::Connection, "first", "m", None);
        add_notification(&mut redis_conn, &config, &user_id, first.clone())?;

        // When read, then a new one arrives
        assert!(mark_notification_read(&mut redis_conn, &user_id, &first.id)?);
        let second = Notification::new(NotificationType::Message, "second", "m", None);
        add_notification(&mut redis_conn, &config, &user_id, second.clone())?;

        // Expect
        let notifications = get_notifications(&mut redis_conn, &user_id)?;
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].id, second.id);
        assert!(!notifications[0].read);
        assert!(notifications[1].read);
        assert!(!mark_notification_read(
            &mut redis_conn,
            &user_id,
            &Uuid::now_v7()
        )?);

        // When all read
        mark_all_notifications_read(&mut redis_conn, &user_id)?;

        // Expect
        let notifications = get_notifications(&mut redis_conn, &user_id)?;
        assert_eq!(unread_count(&notifications), 0);
        clear_notifications(&mut redis_conn, &user_id)?;
        Ok(())
    }
}
