//! End-to-end flows through the store facade: read-through caching,
//! create/delete scenarios, and the hydrate → edit → save workflow.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use vantage_client::{ClientError, DashboardDraft, InMemoryTransport};
use vantage_model::{DashboardId, GridRect};
use vantage_session::EditSession;
use vantage_store::{DashboardStore, StoreError};
use vantage_test_utils::{
    fast_cache_config, sample_dashboard, sample_owner, sample_workspace_id, seeded_transport,
    text_widget,
};

fn store_over(transport: Arc<InMemoryTransport>) -> DashboardStore {
    DashboardStore::new(transport, fast_cache_config())
}

#[tokio::test(start_paused = true)]
async fn repeated_reads_hit_the_cache() {
    let workspace = sample_workspace_id();
    let board = sample_dashboard("Revenue", workspace);
    let id = board.id;
    let transport = seeded_transport(vec![board]);
    let store = store_over(Arc::clone(&transport));

    let first = store.dashboard(id).await;
    let second = store.dashboard(id).await;

    assert!(first.is_success() && second.is_success());
    assert_eq!(second.data.unwrap().name, "Revenue");
    assert_eq!(transport.requests(), 1, "second read must be a cache hit");
}

#[tokio::test(start_paused = true)]
async fn create_then_list_contains_exactly_one_entry() {
    let workspace = sample_workspace_id();
    let transport = seeded_transport(vec![]);
    let store = store_over(transport);

    let mut draft = DashboardDraft::new("Test Dashboard", sample_owner(workspace));
    draft.description = "demo".to_string();
    let created = store.create_dashboard(draft).await.unwrap();

    let page = store.dashboards(None).await;
    let page = page.data.unwrap();
    let matching: Vec<_> = page.items.iter().filter(|d| d.name == "Test Dashboard").collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id, created.id);
    assert_eq!(matching[0].description, "demo");

    let second = store
        .create_dashboard(DashboardDraft::new("Test Dashboard", sample_owner(workspace)))
        .await
        .unwrap();
    assert_ne!(second.id, created.id, "every create mints a fresh id");
}

#[tokio::test(start_paused = true)]
async fn delete_then_list_and_detail_agree_it_is_gone() {
    let workspace = sample_workspace_id();
    let board = sample_dashboard("Doomed", workspace);
    let id = board.id;
    let transport = seeded_transport(vec![board]);
    let store = store_over(transport);

    let _list_sub = store.subscribe_dashboards(None);
    let before = store.dashboards(None).await.data.unwrap();
    assert!(before.items.iter().any(|d| d.id == id));

    store.delete_dashboard(id).await.unwrap();
    sleep(Duration::from_millis(10)).await; // subscribed list refetch lands

    let after = store.dashboards(None).await;
    assert!(!after.is_stale, "refetched list must be fresh");
    assert!(!after.data.unwrap().items.iter().any(|d| d.id == id));

    let detail = store.dashboard(id).await;
    assert!(detail.is_error());
    assert!(matches!(detail.error, Some(ClientError::NotFound { .. })));
}

#[tokio::test(start_paused = true)]
async fn subscribed_list_refreshes_after_create() {
    let workspace = sample_workspace_id();
    let transport = seeded_transport(vec![sample_dashboard("First", workspace)]);
    let store = store_over(Arc::clone(&transport));

    let _sub = store.subscribe_dashboards(None);
    assert_eq!(store.dashboards(None).await.data.unwrap().total, 1);

    store
        .create_dashboard(DashboardDraft::new("Second", sample_owner(workspace)))
        .await
        .unwrap();
    sleep(Duration::from_millis(10)).await;

    let page = store.dashboards(None).await;
    assert!(!page.is_stale);
    assert_eq!(page.data.unwrap().total, 2);
    // list fetch, create, invalidation refetch; the final read was a hit
    assert_eq!(transport.requests(), 3);
}

#[tokio::test(start_paused = true)]
async fn edit_save_round_trip() {
    let workspace = sample_workspace_id();
    let board = sample_dashboard("Editable", workspace);
    let id = board.id;
    let widget_count = board.widgets.len();
    let transport = seeded_transport(vec![board]);
    let store = store_over(transport);

    let mut session = EditSession::new();
    store.begin_edit(&mut session, id).await.unwrap();
    assert!(session.is_editing());
    assert_eq!(session.widgets().len(), widget_count);

    // structural change: capture first, then add a widget and move it
    session.push_undo(session.capture());
    let mut widgets = session.widgets().to_vec();
    let note = text_widget("Note", "<b>quarterly</b> numbers");
    let note_id = note.id;
    widgets.push(note);
    session.set_widgets(widgets).unwrap();

    let mut layout = session.layout().clone();
    layout.insert(note_id, GridRect::new(4, 4, 3, 2));
    session.set_layout(layout).unwrap();
    assert!(session.is_dirty());

    let saved = store.save_edits(&mut session, id).await.unwrap();
    assert_eq!(saved.widgets.len(), widget_count + 1);
    let saved_note = saved.widgets.iter().find(|w| w.id == note_id).unwrap();
    assert_eq!(saved_note.frame, GridRect::new(4, 4, 3, 2), "layout merged into frames");

    assert!(!session.is_editing(), "successful save returns to viewing");
    assert_eq!(session.undo_depth(), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_save_keeps_the_session_for_retry() {
    let workspace = sample_workspace_id();
    let board = sample_dashboard("Fragile", workspace);
    let id = board.id;
    let transport = seeded_transport(vec![board]);
    let store = store_over(Arc::clone(&transport));

    let mut session = EditSession::new();
    store.begin_edit(&mut session, id).await.unwrap();
    session.push_undo(session.capture());
    let mut widgets = session.widgets().to_vec();
    widgets.push(text_widget("Note", "keep me"));
    session.set_widgets(widgets).unwrap();

    transport.fail_next(1, Some(500));
    let err = store.save_edits(&mut session, id).await.unwrap_err();
    assert!(matches!(err, StoreError::Client(ClientError::Transport { status: Some(500), .. })));

    // nothing was lost: working copy, dirty flag, and history survive
    assert!(session.is_editing());
    assert!(session.is_dirty());
    assert_eq!(session.undo_depth(), 1);
    assert!(session.widgets().iter().any(|w| w.title == "Note"));

    // the retry goes through
    let saved = store.save_edits(&mut session, id).await.unwrap();
    assert!(saved.widgets.iter().any(|w| w.title == "Note"));
    assert!(!session.is_editing());
}

#[tokio::test(start_paused = true)]
async fn begin_edit_requires_an_existing_dashboard() {
    let transport = seeded_transport(vec![]);
    let store = store_over(transport);

    let mut session = EditSession::new();
    let err = store.begin_edit(&mut session, DashboardId::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::Client(ClientError::NotFound { .. })));
    assert!(!session.is_editing());
}

#[tokio::test(start_paused = true)]
async fn begin_edit_twice_is_a_session_error() {
    let workspace = sample_workspace_id();
    let board = sample_dashboard("Once", workspace);
    let id = board.id;
    let transport = seeded_transport(vec![board]);
    let store = store_over(transport);

    let mut session = EditSession::new();
    store.begin_edit(&mut session, id).await.unwrap();
    let err = store.begin_edit(&mut session, id).await.unwrap_err();
    assert!(matches!(err, StoreError::Session(_)));
}

#[tokio::test(start_paused = true)]
async fn widgets_read_goes_through_its_own_key() {
    let workspace = sample_workspace_id();
    let board = sample_dashboard("Widgets", workspace);
    let id = board.id;
    let count = board.widgets.len();
    let transport = seeded_transport(vec![board]);
    let store = store_over(transport);

    let widgets = store.dashboard_widgets(id).await;
    assert_eq!(widgets.data.unwrap().len(), count);

    let missing = store.dashboard_widgets(DashboardId::new()).await;
    assert!(missing.is_error());
}
