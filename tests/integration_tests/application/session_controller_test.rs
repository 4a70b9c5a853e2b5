use std::sync::Arc;

use lectern::application::services::{
    APOLOGY_MESSAGE, NO_DOCUMENT_CONTEXT, RenderOutcome, SendRejected, SendReport,
    SessionController, SessionError,
};
use lectern::domain::{
    CLEARED_MESSAGE, ExtractionStatus, MAX_ZOOM, MIN_ZOOM, MessageRole, WELCOME_MESSAGE,
};

use crate::helpers::{MockChatClient, MockRenderer, fake_pdf, page_text_for};

type TestController = SessionController<MockRenderer, MockChatClient>;

fn setup(client: MockChatClient) -> (Arc<MockRenderer>, Arc<MockChatClient>, TestController) {
    let renderer = Arc::new(MockRenderer::new());
    let client = Arc::new(client);
    let controller = SessionController::new(Arc::clone(&renderer), Arc::clone(&client), 50);
    (renderer, client, controller)
}

async fn load_and_extract(controller: &TestController, label: &str, pages: u32) {
    let loaded = controller
        .load_document(format!("{label}.pdf"), fake_pdf(label, pages))
        .await
        .unwrap();
    loaded.extraction.join().await;
}

fn page_markers(text: &str) -> usize {
    text.matches("--- Page ").count()
}

#[tokio::test]
async fn given_fresh_session_when_snapshotting_then_only_welcome_is_shown() {
    let (_, _, controller) = setup(MockChatClient::echo());

    let snapshot = controller.snapshot().await;

    assert!(snapshot.document.is_none());
    assert!(!snapshot.has_raster);
    assert_eq!(snapshot.extraction.status, ExtractionStatus::Idle);
    assert_eq!(snapshot.transcript.len(), 1);
    assert_eq!(snapshot.transcript.messages()[0].text, WELCOME_MESSAGE);
    assert_eq!(snapshot.transcript.messages()[0].role, MessageRole::Model);
}

#[tokio::test]
async fn given_pdf_when_loaded_then_first_page_renders_at_default_zoom() {
    let (_, _, controller) = setup(MockChatClient::echo());

    let loaded = controller
        .load_document("report.pdf".to_string(), fake_pdf("report", 4))
        .await
        .unwrap();

    assert_eq!(loaded.render, RenderOutcome::Applied);
    assert_eq!(loaded.session.current_page, 1);
    assert_eq!(loaded.session.page_count, 4);
    assert_eq!(loaded.session.zoom.value(), 1.0);
    assert_eq!(loaded.session.file_name(), "report.pdf");

    let raster = controller.current_raster().await.unwrap();
    assert_eq!(raster.page, 1);
    assert_eq!(raster.zoom.percent(), 100);
}

#[tokio::test]
async fn given_loaded_pdf_when_extraction_completes_then_greeting_names_file() {
    let (_, _, controller) = setup(MockChatClient::echo());

    load_and_extract(&controller, "report", 3).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.extraction.status, ExtractionStatus::Completed);
    assert_eq!(snapshot.transcript.len(), 1);
    let greeting = &snapshot.transcript.messages()[0].text;
    assert!(greeting.contains("\"report.pdf\""));
    assert!(!greeting.contains("Note:"));

    let corpus = controller.corpus().await;
    assert_eq!(page_markers(corpus.text()), 3);
    assert!(corpus.text().starts_with("--- Page 1 ---\nreport text on page 1\n\n"));
}

#[tokio::test]
async fn given_out_of_range_zoom_when_setting_then_value_is_clamped() {
    let (_, _, controller) = setup(MockChatClient::echo());
    load_and_extract(&controller, "doc", 2).await;

    let high = controller.set_zoom(10.0).await.unwrap();
    assert_eq!(high.zoom.value(), MAX_ZOOM);
    let stepped = controller.zoom_in().await.unwrap();
    assert_eq!(stepped.zoom.value(), MAX_ZOOM);

    let low = controller.set_zoom(0.1).await.unwrap();
    assert_eq!(low.zoom.value(), MIN_ZOOM);
    let stepped = controller.zoom_out().await.unwrap();
    assert_eq!(stepped.zoom.value(), MIN_ZOOM);
}

#[tokio::test]
async fn given_infinite_zoom_when_setting_then_it_clamps_to_bounds() {
    let (_, _, controller) = setup(MockChatClient::echo());
    load_and_extract(&controller, "doc", 2).await;

    let high = controller.set_zoom(f32::INFINITY).await.unwrap();
    assert_eq!(high.zoom.value(), MAX_ZOOM);
    assert_eq!(controller.current_raster().await.unwrap().zoom.value(), MAX_ZOOM);

    let low = controller.set_zoom(f32::NEG_INFINITY).await.unwrap();
    assert_eq!(low.zoom.value(), MIN_ZOOM);
}

#[tokio::test]
async fn given_zoom_step_when_zooming_in_then_raster_follows_new_scale() {
    let (_, _, controller) = setup(MockChatClient::echo());
    load_and_extract(&controller, "doc", 2).await;

    let session = controller.zoom_in().await.unwrap();

    assert_eq!(session.zoom.percent(), 110);
    assert_eq!(controller.current_raster().await.unwrap().zoom.percent(), 110);
}

#[tokio::test]
async fn given_out_of_range_page_when_setting_then_page_is_clamped() {
    let (_, _, controller) = setup(MockChatClient::echo());
    load_and_extract(&controller, "doc", 5).await;

    assert_eq!(controller.set_page(0).await.unwrap().current_page, 1);
    assert_eq!(controller.previous_page().await.unwrap().current_page, 1);
    assert_eq!(controller.set_page(99).await.unwrap().current_page, 5);
    assert_eq!(controller.next_page().await.unwrap().current_page, 5);
    assert_eq!(controller.set_page(-3).await.unwrap().current_page, 1);
}

#[tokio::test]
async fn given_page_change_when_navigating_then_raster_shows_new_page() {
    let (renderer, _, controller) = setup(MockChatClient::echo());
    load_and_extract(&controller, "doc", 5).await;
    let renders_after_load = renderer.render_calls();

    controller.next_page().await.unwrap();
    assert_eq!(controller.current_raster().await.unwrap().page, 2);

    controller.set_page(2).await.unwrap();
    assert_eq!(renderer.render_calls(), renders_after_load + 1);
}

#[tokio::test]
async fn given_no_document_when_navigating_then_nothing_happens() {
    let (renderer, _, controller) = setup(MockChatClient::echo());

    assert!(controller.next_page().await.is_none());
    assert!(controller.set_zoom(2.0).await.is_none());
    assert_eq!(controller.render_current_page().await, RenderOutcome::NoDocument);
    assert_eq!(renderer.render_calls(), 0);
}

#[tokio::test]
async fn given_render_failure_when_navigating_then_previous_raster_is_kept() {
    let (renderer, _, controller) = setup(MockChatClient::echo());
    load_and_extract(&controller, "doc", 3).await;
    renderer.fail_render_on(2);

    let session = controller.next_page().await.unwrap();

    assert_eq!(session.current_page, 2);
    assert_eq!(controller.current_raster().await.unwrap().page, 1);
}

#[tokio::test]
async fn given_failed_render_when_same_page_is_requested_again_then_render_is_retried() {
    let (renderer, _, controller) = setup(MockChatClient::echo());
    load_and_extract(&controller, "doc", 3).await;
    renderer.fail_render_on(2);
    controller.set_page(2).await.unwrap();
    assert_eq!(controller.current_raster().await.unwrap().page, 1);

    renderer.recover_render_on(2);
    let session = controller.set_page(2).await.unwrap();

    assert_eq!(session.current_page, 2);
    assert_eq!(controller.current_raster().await.unwrap().page, 2);
}

#[tokio::test]
async fn given_zero_page_document_when_loaded_then_corpus_is_empty_and_chat_uses_placeholder() {
    let (_, client, controller) = setup(MockChatClient::echo());

    let loaded = controller
        .load_document("empty.pdf".to_string(), fake_pdf("empty", 0))
        .await
        .unwrap();
    assert_eq!(loaded.session.current_page, 1);
    loaded.extraction.join().await;

    let snapshot = controller.snapshot().await;
    assert!(controller.corpus().await.is_empty());
    assert_eq!(snapshot.extraction.status, ExtractionStatus::Completed);
    assert_eq!(snapshot.transcript.messages()[0].text, WELCOME_MESSAGE);

    controller.send_message("anything here?").await.unwrap();
    assert_eq!(client.calls()[0].context, NO_DOCUMENT_CONTEXT);
}

#[tokio::test]
async fn given_75_page_document_when_extracted_then_only_first_50_pages_are_used() {
    let (renderer, _, controller) = setup(MockChatClient::echo());

    load_and_extract(&controller, "long", 75).await;

    let corpus = controller.corpus().await;
    assert_eq!(page_markers(corpus.text()), 50);
    assert!(corpus.text().contains("--- Page 50 ---"));
    assert!(!corpus.text().contains("--- Page 51 ---"));
    assert!(corpus.is_truncated());
    assert_eq!(renderer.text_calls(), 50);

    let snapshot = controller.snapshot().await;
    assert!(snapshot.extraction.is_truncated());
    assert!(snapshot.transcript.messages()[0]
        .text
        .contains("only the first 50 of 75 pages"));
}

#[tokio::test]
async fn given_configured_limit_above_50_when_extracting_then_50_is_still_the_bound() {
    let renderer = Arc::new(MockRenderer::new());
    let client = Arc::new(MockChatClient::echo());
    let controller = SessionController::new(Arc::clone(&renderer), client, 100);

    load_and_extract(&controller, "long", 75).await;

    let corpus = controller.corpus().await;
    assert_eq!(page_markers(corpus.text()), 50);
    assert!(corpus.is_truncated());
    assert_eq!(renderer.text_calls(), 50);
}

#[tokio::test]
async fn given_failing_page_when_extracting_then_partial_corpus_is_kept() {
    let (renderer, client, controller) = setup(MockChatClient::echo());
    renderer.fail_text_on(3);

    load_and_extract(&controller, "doc", 5).await;

    let snapshot = controller.snapshot().await;
    assert!(matches!(snapshot.extraction.status, ExtractionStatus::Failed { .. }));
    assert_eq!(snapshot.extraction.corpus.pages_extracted(), 2);

    controller.send_message("summarize").await.unwrap();
    let context = &client.calls()[0].context;
    assert!(context.contains(&page_text_for("doc", 2)));
    assert!(!context.contains("--- Page 3 ---"));
}

#[tokio::test]
async fn given_blank_message_when_sending_then_nothing_changes() {
    let (_, client, controller) = setup(MockChatClient::echo());

    let result = controller.send_message("   \n\t").await;

    assert_eq!(result, Err(SendRejected::Empty));
    assert!(client.calls().is_empty());
    assert_eq!(controller.snapshot().await.transcript.len(), 1);
    assert!(!controller.is_chat_loading().await);
}

#[tokio::test]
async fn given_failing_client_when_sending_then_user_message_and_one_apology_are_appended() {
    let (_, _, controller) = setup(MockChatClient::failing());

    let report = controller.send_message("hello").await.unwrap();

    assert_eq!(report, SendReport::Apologized);
    let snapshot = controller.snapshot().await;
    let messages = snapshot.transcript.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, MessageRole::User);
    assert_eq!(messages[1].text, "hello");
    assert_eq!(messages[2].role, MessageRole::Model);
    assert_eq!(messages[2].text, APOLOGY_MESSAGE);
    assert!(!snapshot.chat_loading);
}

#[tokio::test]
async fn given_prior_exchange_when_sending_then_history_excludes_new_message() {
    let (_, client, controller) = setup(MockChatClient::echo());

    controller.send_message("first").await.unwrap();
    controller.send_message("second").await.unwrap();

    let calls = client.calls();
    assert_eq!(calls[0].prior.len(), 1);
    assert_eq!(calls[1].prior.len(), 3);
    assert_eq!(calls[1].prior[1].text, "first");
    assert_eq!(calls[1].prior[2].text, "You said: first");
    assert_eq!(calls[1].message, "second");
}

#[tokio::test]
async fn given_loaded_document_when_clearing_chat_then_one_message_remains_and_view_is_kept() {
    let (_, _, controller) = setup(MockChatClient::echo());
    load_and_extract(&controller, "doc", 4).await;
    controller.set_page(3).await.unwrap();
    controller.send_message("question").await.unwrap();
    let corpus_before = controller.corpus().await;

    controller.clear_chat().await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.transcript.len(), 1);
    assert_eq!(snapshot.transcript.messages()[0].text, CLEARED_MESSAGE);
    assert_eq!(snapshot.document.unwrap().current_page, 3);
    assert_eq!(controller.corpus().await, corpus_before);
}

#[tokio::test]
async fn given_outstanding_send_when_sending_again_then_second_is_rejected() {
    let (_, client, controller) = setup(MockChatClient::echo());
    let gate = client.hold_next();

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.send_message("first").await })
    };
    gate.wait_entered().await;

    assert!(controller.is_chat_loading().await);
    assert_eq!(
        controller.send_message("second").await,
        Err(SendRejected::InFlight)
    );

    gate.open();
    assert_eq!(first.await.unwrap(), Ok(SendReport::Replied));

    let snapshot = controller.snapshot().await;
    assert!(!snapshot.chat_loading);
    assert_eq!(snapshot.transcript.len(), 3);
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn given_outstanding_send_when_chat_is_cleared_then_late_reply_is_discarded() {
    let (_, client, controller) = setup(MockChatClient::echo());
    let gate = client.hold_next();

    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.send_message("question").await })
    };
    gate.wait_entered().await;

    controller.clear_chat().await;
    assert!(!controller.is_chat_loading().await);

    gate.open();
    assert_eq!(pending.await.unwrap(), Ok(SendReport::Discarded));

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.transcript.len(), 1);
    assert_eq!(snapshot.transcript.messages()[0].text, CLEARED_MESSAGE);

    assert_eq!(controller.send_message("again").await, Ok(SendReport::Replied));
}

#[tokio::test]
async fn given_documents_a_then_b_then_a_when_loaded_then_state_never_mixes() {
    let (_, client, controller) = setup(MockChatClient::echo());

    load_and_extract(&controller, "alpha", 3).await;
    controller.set_page(3).await.unwrap();
    controller.set_zoom(2.0).await.unwrap();
    let first_generation = controller.snapshot().await.document.unwrap().generation;

    load_and_extract(&controller, "beta", 2).await;
    let snapshot = controller.snapshot().await;
    let session = snapshot.document.unwrap();
    assert_eq!(session.file_name(), "beta.pdf");
    assert_eq!(session.current_page, 1);
    assert_eq!(session.zoom.percent(), 100);
    let corpus = controller.corpus().await;
    assert!(corpus.text().contains(&page_text_for("beta", 1)));
    assert!(!corpus.text().contains("alpha"));
    assert!(snapshot.transcript.messages()[0].text.contains("beta.pdf"));

    controller.send_message("what is this?").await.unwrap();
    assert!(!client.calls()[0].context.contains("alpha"));

    load_and_extract(&controller, "alpha", 3).await;
    let snapshot = controller.snapshot().await;
    let session = snapshot.document.unwrap();
    assert!(session.generation > first_generation);
    assert_eq!(session.current_page, 1);
    assert_eq!(snapshot.transcript.len(), 1);
    let corpus = controller.corpus().await;
    assert!(!corpus.text().contains("beta"));
    assert_eq!(controller.current_raster().await.unwrap().png, b"alpha:1:100".to_vec());
}

#[tokio::test]
async fn given_same_file_when_uploaded_twice_then_second_upload_starts_fresh_session() {
    let (_, _, controller) = setup(MockChatClient::echo());

    load_and_extract(&controller, "same", 2).await;
    controller.next_page().await.unwrap();
    let first = controller.snapshot().await.document.unwrap();

    load_and_extract(&controller, "same", 2).await;
    let second = controller.snapshot().await.document.unwrap();

    assert!(second.generation > first.generation);
    assert_ne!(second.document.id, first.document.id);
    assert_eq!(second.current_page, 1);
}

#[tokio::test]
async fn given_invalid_upload_when_loading_then_previous_session_is_untouched() {
    let (_, _, controller) = setup(MockChatClient::echo());
    load_and_extract(&controller, "good", 3).await;
    controller.set_page(2).await.unwrap();
    let before = controller.snapshot().await;

    let result = controller
        .load_document("broken.pdf".to_string(), b"not a pdf".to_vec())
        .await;

    assert!(matches!(result, Err(SessionError::Load(_))));
    let after = controller.snapshot().await;
    assert_eq!(after.document, before.document);
    assert_eq!(after.transcript, before.transcript);
    assert_eq!(controller.current_raster().await.unwrap().page, 2);
}

#[tokio::test]
async fn given_slow_older_load_when_newer_load_commits_first_then_older_is_superseded() {
    let (renderer, _, controller) = setup(MockChatClient::echo());
    let gate = renderer.hold_load("older");

    let older = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .load_document("older.pdf".to_string(), fake_pdf("older", 2))
                .await
        })
    };
    gate.wait_entered().await;

    load_and_extract(&controller, "newer", 3).await;
    gate.open();

    let result = older.await.unwrap();
    assert!(matches!(result, Err(SessionError::Superseded { .. })));

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.document.unwrap().file_name(), "newer.pdf");
    assert!(!controller.corpus().await.text().contains("older"));
}

#[tokio::test]
async fn given_slow_extraction_when_newer_document_loads_then_stale_text_is_discarded() {
    let (renderer, _, controller) = setup(MockChatClient::echo());
    let gate = renderer.hold_text("first");

    let first = controller
        .load_document("first.pdf".to_string(), fake_pdf("first", 3))
        .await
        .unwrap();
    gate.wait_entered().await;

    load_and_extract(&controller, "second", 2).await;
    gate.open();
    first.extraction.join().await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.extraction.status, ExtractionStatus::Completed);
    assert!(!snapshot.extraction.corpus.text().contains("first"));
    assert_eq!(page_markers(snapshot.extraction.corpus.text()), 2);
    assert!(snapshot.transcript.messages()[0].text.contains("second.pdf"));
}

#[tokio::test]
async fn given_slow_render_when_newer_page_renders_first_then_stale_raster_is_dropped() {
    let (renderer, _, controller) = setup(MockChatClient::echo());
    load_and_extract(&controller, "doc", 5).await;
    let gate = renderer.hold_render("doc", 2);

    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.set_page(2).await })
    };
    gate.wait_entered().await;

    controller.set_page(3).await.unwrap();
    gate.open();
    slow.await.unwrap();

    assert_eq!(controller.current_raster().await.unwrap().page, 3);
    assert_eq!(controller.snapshot().await.document.unwrap().current_page, 3);
}

#[tokio::test]
async fn given_outstanding_send_when_new_document_loads_then_reply_is_discarded() {
    let (_, client, controller) = setup(MockChatClient::echo());
    let gate = client.hold_next();

    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.send_message("hello").await })
    };
    gate.wait_entered().await;

    load_and_extract(&controller, "fresh", 1).await;
    gate.open();

    assert_eq!(pending.await.unwrap(), Ok(SendReport::Discarded));
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.transcript.len(), 1);
    assert!(snapshot.transcript.messages()[0].text.contains("fresh.pdf"));
    assert!(!snapshot.chat_loading);
}

#[tokio::test]
async fn given_slow_render_of_old_document_when_new_document_commits_then_stale_raster_is_dropped() {
    let (renderer, _, controller) = setup(MockChatClient::echo());
    load_and_extract(&controller, "a", 3).await;
    let gate = renderer.hold_render("a", 2);

    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.set_page(2).await })
    };
    gate.wait_entered().await;

    load_and_extract(&controller, "b", 2).await;
    gate.open();
    slow.await.unwrap();

    let raster = controller.current_raster().await.unwrap();
    assert_eq!(raster.png, b"b:1:100".to_vec());
    assert_eq!(
        controller.snapshot().await.document.unwrap().file_name(),
        "b.pdf"
    );
}
