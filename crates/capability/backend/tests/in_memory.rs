use domain::Notification;
use hydro_backend::{Backend, BackendError, InMemoryBackend};

fn notification(id: i64, is_read: bool) -> Notification {
    Notification {
        id: Some(id),
        title: format!("alert {id}"),
        message: String::new(),
        data: None,
        user_id: None,
        is_read,
        priority: Some(2),
        timestamp: None,
        source: None,
    }
}

#[tokio::test]
async fn in_memory_filters_and_marks_notifications() {
    let backend = InMemoryBackend::new();
    backend.push_notification(notification(1, false));
    backend.push_notification(notification(2, true));
    backend.push_notification(notification(3, false));

    let unread = backend.list_notifications(false).await.expect("unread");
    assert_eq!(unread.len(), 2);
    let all = backend.list_notifications(true).await.expect("all");
    assert_eq!(all.len(), 3);

    backend.mark_notification_read(1).await.expect("read");
    backend.mark_notifications_read(&[3]).await.expect("bulk");
    let unread = backend.list_notifications(false).await.expect("unread");
    assert!(unread.is_empty());
    assert_eq!(backend.bulk_read_requests(), vec![vec![3]]);
    assert_eq!(backend.calls("list_notifications"), 3);
}

#[tokio::test]
async fn in_memory_failure_toggle() {
    let backend = InMemoryBackend::new();
    backend.set_failing(true);
    assert!(matches!(
        backend.list_loggers().await,
        Err(BackendError::Transport(_))
    ));
    assert_eq!(backend.calls("list_loggers"), 1);

    backend.set_failing(false);
    assert!(backend.list_loggers().await.expect("loggers").is_empty());
    assert!(backend.get_notification(5).await.expect("lookup").is_none());
}
