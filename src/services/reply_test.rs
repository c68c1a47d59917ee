use super::*;
use crate::catalog::Catalog;
use crate::config::ReplyTiming;
use crate::frame::Frame;
use crate::services::chat::Role;
use crate::state::test_helpers;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, timeout};

async fn recv_push(rx: &mut mpsc::Receiver<Frame>) -> Frame {
    timeout(Duration::from_secs(30), rx.recv())
        .await
        .expect("push receive timed out")
        .expect("push channel closed unexpectedly")
}

fn message_role(frame: &Frame) -> Option<&str> {
    frame.data.get("message")?.get("role")?.as_str()
}

#[tokio::test(start_paused = true)]
async fn full_sequence_two_records_one_mutation_one_toast() {
    let state = test_helpers::test_app_state();
    let id = test_helpers::seed_session(&state).await;
    let mut rx = test_helpers::attach_client(&state, id, Uuid::new_v4()).await;

    let start = Instant::now();
    session::submit_message(&state, id, "payments api", None)
        .await
        .unwrap();

    let echo = recv_push(&mut rx).await;
    assert_eq!(echo.syscall, "chat:message");
    assert_eq!(message_role(&echo), Some("user"));
    assert_eq!(test_helpers::message_count(&state, id).await, 2);

    let reply = recv_push(&mut rx).await;
    let reply_at = start.elapsed();
    assert_eq!(reply.syscall, "chat:message");
    assert_eq!(message_role(&reply), Some("assistant"));
    assert_eq!(reply.data["message"]["status"], "building");
    assert!(reply_at >= Duration::from_millis(1000) && reply_at < Duration::from_millis(1100));
    assert_eq!(test_helpers::message_count(&state, id).await, 3);

    let status = recv_push(&mut rx).await;
    let status_at = start.elapsed();
    assert_eq!(status.syscall, "chat:status");
    assert_eq!(status.data["message_id"], reply.data["message"]["id"]);
    assert_eq!(status.data["status"], "completed");
    assert!(status_at >= Duration::from_millis(4000) && status_at < Duration::from_millis(4100));

    let toast = recv_push(&mut rx).await;
    assert_eq!(toast.syscall, "notify:toast");
    assert_eq!(toast.data["title"], Toast::project_ready().title.as_str());

    assert!(timeout(Duration::from_secs(60), rx.recv()).await.is_err());
    assert_eq!(test_helpers::message_count(&state, id).await, 3);

    let snap = session::snapshot(&state, id).await.unwrap();
    let last = snap.messages.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.status, Some(MessageStatus::Completed));
    assert!(last.content.contains("payments api"));
}

#[tokio::test(start_paused = true)]
async fn pending_clears_when_reply_arrives_not_on_completion() {
    let state = test_helpers::test_app_state();
    let id = test_helpers::seed_session(&state).await;
    let mut rx = test_helpers::attach_client(&state, id, Uuid::new_v4()).await;

    session::submit_message(&state, id, "first", None).await.unwrap();
    let _echo = recv_push(&mut rx).await;
    let first_reply = recv_push(&mut rx).await;
    assert!(!session::snapshot(&state, id).await.unwrap().pending);

    // Second submit lands while the first reply is still `building`.
    session::submit_message(&state, id, "second", None).await.unwrap();
    let _echo = recv_push(&mut rx).await;

    let second_reply = recv_push(&mut rx).await;
    assert_eq!(message_role(&second_reply), Some("assistant"));
    assert_ne!(second_reply.data["message"]["id"], first_reply.data["message"]["id"]);

    let status = recv_push(&mut rx).await;
    assert_eq!(status.syscall, "chat:status");
    assert_eq!(status.data["message_id"], first_reply.data["message"]["id"]);
}

#[tokio::test(start_paused = true)]
async fn custom_timing_is_honored() {
    let timing = ReplyTiming { reply_delay: Duration::from_millis(10), complete_delay: Duration::from_millis(20) };
    let state = AppState::new(Catalog::demo(), timing);
    let id = test_helpers::seed_session(&state).await;
    let mut rx = test_helpers::attach_client(&state, id, Uuid::new_v4()).await;

    let start = Instant::now();
    session::submit_message(&state, id, "fast", None).await.unwrap();
    let _echo = recv_push(&mut rx).await;
    let _reply = recv_push(&mut rx).await;
    let _status = recv_push(&mut rx).await;

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(30) && elapsed < Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn deleted_session_stops_the_sequence() {
    let state = test_helpers::test_app_state();
    let id = test_helpers::seed_session(&state).await;
    session::delete_session(&state, id).await.unwrap();

    // Completes without panicking or resurrecting the session.
    run_reply(&state, id, "orphan").await;
    assert!(!state.sessions.read().await.contains_key(&id));
}

#[tokio::test(start_paused = true)]
async fn session_deleted_between_stages_skips_completion() {
    let state = test_helpers::test_app_state();
    let id = test_helpers::seed_session(&state).await;
    let mut rx = test_helpers::attach_client(&state, id, Uuid::new_v4()).await;

    let handle = spawn_reply(state.clone(), id, "short lived".into());
    let _reply = recv_push(&mut rx).await;
    session::delete_session(&state, id).await.unwrap();

    handle.await.unwrap();
    // Session map dropped the sender, so the channel is closed with nothing queued.
    assert!(rx.recv().await.is_none());
}
