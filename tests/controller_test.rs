//! 上传 / 编辑控制器的状态机测试（不触达真实网络）。

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::{Engine as _, engine::general_purpose};
use proptest::prelude::*;

use frame_editor::client::{
    ClientError, EditorController, EditorState, FrameTransport, FrameUpload, MemoryPreviewStore,
    PickedFile, ProcessOutcome,
};
use frame_editor::protocol::{EditParameter, EditParameters, FrameEnvelope};

/// 把上传字节加上序号后原样回传的桩网关。
#[derive(Default)]
struct EchoTransport {
    calls: AtomicUsize,
}

impl EchoTransport {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FrameTransport for EchoTransport {
    fn send_frame(
        &self,
        upload: FrameUpload,
        params: EditParameters,
    ) -> impl Future<Output = Result<FrameEnvelope, ClientError>> + Send {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let mut payload = upload.data.to_vec();
        payload.extend_from_slice(format!("|{}|{}", call, params.border_color).as_bytes());
        async move {
            Ok(FrameEnvelope {
                data: vec![general_purpose::STANDARD.encode(payload)],
            })
        }
    }
}

/// 总是返回非 200 的桩网关。
#[derive(Default)]
struct FailingTransport {
    calls: AtomicUsize,
}

impl FrameTransport for FailingTransport {
    fn send_frame(
        &self,
        _upload: FrameUpload,
        _params: EditParameters,
    ) -> impl Future<Output = Result<FrameEnvelope, ClientError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async { Err(ClientError::Network("Something went wrong: Internal Server Error".to_string())) }
    }
}

fn picked(name: &str) -> PickedFile {
    PickedFile::new(name, format!("bytes-of-{name}").into_bytes())
}

#[tokio::test]
async fn new_selection_after_result_clears_result() {
    let store = MemoryPreviewStore::new();
    let transport = EchoTransport::default();
    let mut controller = EditorController::new(store.clone());

    controller.select_file(picked("first.png"));
    controller.process(&transport).await.expect("process");
    let result_handle = controller.result().map(|r| r.preview).expect("result");
    assert_eq!(controller.state(), EditorState::ResultReady);

    controller.select_file(picked("second.png"));

    assert!(controller.result().is_none());
    assert_eq!(controller.state(), EditorState::SourceSelected);
    assert!(!store.is_live(result_handle));
    assert_eq!(store.live_count(), 1);
}

#[test]
fn new_selection_revokes_exactly_the_previous_source_handle() {
    let store = MemoryPreviewStore::new();
    let mut controller = EditorController::new(store.clone());

    controller.select_file(picked("a.png"));
    let first = controller.source().map(|s| s.preview).expect("first source");

    controller.select_file(picked("b.png"));
    let second = controller.source().map(|s| s.preview).expect("second source");

    assert_ne!(first, second);
    assert_eq!(store.revoked(), vec![first]);
    assert!(store.is_live(second));
    assert_eq!(store.double_revokes(), 0);
}

#[tokio::test]
async fn process_without_source_fails_without_network_call() {
    let transport = EchoTransport::default();
    let mut controller = EditorController::new(MemoryPreviewStore::new());

    let result = controller.process(&transport).await;

    assert_eq!(result, Err(ClientError::NoSourceSelected));
    assert_eq!(transport.calls(), 0);
    assert_eq!(controller.state(), EditorState::Idle);
    assert_eq!(controller.notice().map(|n| n.code), Some("E_NO_SOURCE"));
}

#[tokio::test]
async fn successful_process_yields_one_live_result_handle() {
    let store = MemoryPreviewStore::new();
    let transport = EchoTransport::default();
    let mut controller = EditorController::new(store.clone());
    controller.select_file(picked("photo.png"));

    let outcome = controller.process(&transport).await.expect("process");

    assert_eq!(outcome, ProcessOutcome::Applied);
    assert_eq!(controller.state(), EditorState::ResultReady);
    assert!(!controller.is_processing());
    let (source, result) = controller.live_previews();
    assert!(store.is_live(source.expect("source handle")));
    assert!(store.is_live(result.expect("result handle")));
    assert_eq!(store.live_count(), 2);

    let data = &controller.result().expect("result").data;
    assert!(data.starts_with(b"bytes-of-photo.png|0|#ffffff"));
}

#[tokio::test]
async fn failed_process_returns_to_source_selected() {
    let store = MemoryPreviewStore::new();
    let transport = FailingTransport::default();
    let mut controller = EditorController::new(store.clone());
    controller.select_file(picked("photo.png"));

    let result = controller.process(&transport).await;

    assert!(matches!(result, Err(ClientError::Network(ref msg)) if msg.contains("Internal Server Error")));
    assert_eq!(controller.state(), EditorState::SourceSelected);
    assert!(!controller.is_processing());
    assert!(controller.can_process());
    assert!(controller.result().is_none());
    assert_eq!(store.live_count(), 1);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

    assert_eq!(controller.notice().map(|n| n.code), Some("E_NETWORK"));
    controller.dismiss_notice();
    assert!(controller.notice().is_none());
}

#[tokio::test]
async fn sequential_processes_produce_independent_results() {
    let store = MemoryPreviewStore::new();
    let transport = EchoTransport::default();
    let mut controller = EditorController::new(store.clone());
    controller.select_file(picked("photo.png"));

    controller.process(&transport).await.expect("first process");
    let first = controller.result().map(|r| (r.preview, r.data.clone())).expect("first result");

    controller.update_parameter(EditParameter::BorderColor, "#000000");
    controller.process(&transport).await.expect("second process");
    let second = controller.result().map(|r| (r.preview, r.data.clone())).expect("second result");

    assert_ne!(first.0, second.0);
    assert_ne!(first.1, second.1);
    assert!(!store.is_live(first.0));
    assert!(store.is_live(second.0));
    assert_eq!(store.double_revokes(), 0);
}

#[test]
fn stale_response_after_reselection_is_discarded() {
    let store = MemoryPreviewStore::new();
    let mut controller = EditorController::new(store.clone());
    controller.select_file(picked("old.png"));

    let ticket = controller.begin_process().expect("ticket");
    assert_eq!(controller.state(), EditorState::Processing);

    controller.select_file(picked("new.png"));
    assert_eq!(controller.state(), EditorState::SourceSelected);

    let envelope = FrameEnvelope {
        data: vec![general_purpose::STANDARD.encode(b"late result")],
    };
    let outcome = controller.complete_process(ticket, Ok(envelope)).expect("discard is not an error");

    assert_eq!(outcome, ProcessOutcome::Discarded);
    assert!(controller.result().is_none());
    assert_eq!(store.live_count(), 1);
    assert_eq!(store.created().len(), 2);
}

#[test]
fn decoded_dimensions_are_recorded_idempotently() {
    let mut controller = EditorController::new(MemoryPreviewStore::new());
    controller.select_file(picked("a.png"));
    assert_eq!(controller.source().and_then(|s| s.width), None);

    controller.on_source_image_decoded(10, 20);
    controller.on_source_image_decoded(10, 20);

    let source = controller.source().expect("source");
    assert_eq!((source.width, source.height), (Some(10), Some(20)));
}

#[tokio::test]
async fn result_dimensions_follow_the_result_slot_only() {
    let transport = EchoTransport::default();
    let mut controller = EditorController::new(MemoryPreviewStore::new());

    controller.on_result_image_decoded(7, 7);
    assert!(controller.result().is_none());

    controller.select_file(picked("photo.png"));
    controller.process(&transport).await.expect("process");
    assert_eq!(controller.result().and_then(|r| r.width), None);

    controller.on_result_image_decoded(21, 14);
    controller.on_result_image_decoded(21, 14);
    let result = controller.result().expect("result");
    assert_eq!((result.width, result.height), (Some(21), Some(14)));
    assert_eq!(controller.source().and_then(|s| s.width), None);

    controller.select_file(picked("next.png"));
    controller.on_result_image_decoded(30, 20);

    assert!(controller.result().is_none());
    let source = controller.source().expect("source");
    assert_eq!((source.width, source.height), (None, None));
}

#[tokio::test]
async fn teardown_and_drop_release_every_handle_once() {
    let store = MemoryPreviewStore::new();
    let transport = EchoTransport::default();
    {
        let mut controller = EditorController::new(store.clone());
        controller.select_file(picked("photo.png"));
        controller.process(&transport).await.expect("process");
        assert_eq!(store.live_count(), 2);

        controller.teardown();
        assert_eq!(store.live_count(), 0);
        assert_eq!(controller.state(), EditorState::Idle);
    }

    assert_eq!(store.live_count(), 0);
    assert_eq!(store.double_revokes(), 0);
    assert_eq!(store.revoked().len(), store.created().len());
}

#[derive(Debug, Clone)]
enum Step {
    Select(u8),
    Process { succeed: bool },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        any::<u8>().prop_map(Step::Select),
        any::<bool>().prop_map(|succeed| Step::Process { succeed }),
    ]
}

proptest! {
    #[test]
    fn handles_never_leak_or_double_revoke(steps in proptest::collection::vec(step(), 1..40)) {
        let store = MemoryPreviewStore::new();
        let mut controller = EditorController::new(store.clone());

        for step in steps {
            match step {
                Step::Select(n) => {
                    let previous = controller.source().map(|s| s.preview);
                    controller.select_file(picked(&format!("{n}.png")));
                    let current = controller.source().map(|s| s.preview).expect("source after select");

                    prop_assert!(controller.result().is_none());
                    prop_assert!(store.is_live(current));
                    if let Some(previous) = previous {
                        prop_assert!(!store.is_live(previous));
                        prop_assert_ne!(previous, current);
                    }
                }
                Step::Process { succeed } => {
                    let Ok(ticket) = controller.begin_process() else {
                        prop_assert!(controller.source().is_none());
                        continue;
                    };
                    let response = if succeed {
                        Ok(FrameEnvelope { data: vec![general_purpose::STANDARD.encode(b"framed")] })
                    } else {
                        Err(ClientError::Network("Something went wrong: Bad Request".to_string()))
                    };
                    let _ = controller.complete_process(ticket, response);

                    prop_assert!(!controller.is_processing());
                    prop_assert_eq!(controller.result().is_some(), succeed);
                }
            }

            let (source, result) = controller.live_previews();
            let expected = usize::from(source.is_some()) + usize::from(result.is_some());
            prop_assert_eq!(store.live_count(), expected);
            prop_assert_eq!(store.double_revokes(), 0);
        }

        controller.teardown();
        prop_assert_eq!(store.live_count(), 0);
        prop_assert_eq!(store.double_revokes(), 0);
    }
}
