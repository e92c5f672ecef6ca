//! End-to-end host flow through the facade: configure, lay out, drop
//! external items, hydrate off-thread, and persist a snapshot.

use std::thread;

use paneweave::prelude::*;
use paneweave::{DropOutcome, GestureId, HydrationOutcome, HydrationRequest, WorkspaceSnapshot};

fn hydrate_off_thread(inbox: &HydrationInbox, requests: Vec<HydrationRequest>) {
    let sender = inbox.sender();
    thread::spawn(move || {
        for request in requests {
            let body = format!("loaded {}", request.ticket.content_id);
            sender.complete(
                request.ticket,
                HydrationResult::Loaded(paneweave::ContentState {
                    buffer: Some(body),
                    ..Default::default()
                }),
            );
        }
    })
    .join()
    .unwrap();
}

#[test]
fn configured_workspace_round_trips_through_a_snapshot() -> Result<()> {
    let config = EngineConfig::from_toml_str(
        r#"
resize_floor = 10.0
default_browser_url = "https://example.org"
"#,
    )?;
    let mut ws = Workspace::new(config.clone());
    let inbox = HydrationInbox::new();

    let editor = ws.add_pane(ContentType::Editor, Some("/src/lib.rs".into()));
    let mut requests: Vec<HydrationRequest> = editor.hydration.into_iter().collect();

    // Drop a conversation onto the right edge of the editor.
    let mut dnd = DragCoordinator::from_config(ws.config());
    dnd.begin_external_drag(
        ExternalItem::new(ExternalKind::Conversation, "conv-77"),
        ListenerGuard::detached(GestureId::new(1)),
    );
    let layout = ws.layout(Rect::from_size(1000.0, 500.0)).unwrap();
    dnd.hover_at(&layout, Point::new(990.0, 250.0));
    let DropOutcome::Split { pane_id: chat, hydration } = dnd.drop_on(&mut ws) else {
        panic!("edge drop should split");
    };
    requests.extend(hydration);
    assert_eq!(requests.len(), 2);

    hydrate_off_thread(&inbox, requests);
    let drained = inbox.drain(&mut ws);
    assert_eq!(drained.len(), 2);
    assert!(drained.iter().all(|(_, outcome)| *outcome == HydrationOutcome::Applied));
    assert_eq!(
        ws.content(chat.as_str()).unwrap().payload.buffer.as_deref(),
        Some("loaded conv-77")
    );

    ws.resize(&[], &[99.0, 1.0])?;
    let json = ws.snapshot().to_json_string()?;
    let restored = Workspace::from_snapshot(WorkspaceSnapshot::from_json_str(&json)?, config)?;
    assert!(restored.hydration.is_empty());
    assert_eq!(restored.workspace.leaf_ids(), ws.leaf_ids());
    assert_eq!(restored.workspace.active_pane(), ws.active_pane());
    let Some(paneweave::LayoutNode::Split { sizes, .. }) = restored.workspace.root() else {
        panic!("restored tree lost its split");
    };
    assert!(sizes.iter().all(|size| *size >= 10.0 - 1e-9));
    Ok(())
}

#[test]
fn stale_results_never_resurrect_closed_panes() -> Result<()> {
    let mut ws = Workspace::default();
    let inbox = HydrationInbox::new();
    ws.add_pane(ContentType::Terminal, None);
    let doomed = ws.add_pane(ContentType::Chat, Some("conv-9".into()));
    ws.close_pane(doomed.pane_id.as_str())?;

    hydrate_off_thread(&inbox, doomed.hydration.into_iter().collect());
    let drained = inbox.drain(&mut ws);
    assert_eq!(drained.len(), 1);
    assert_eq!(drained[0].1, HydrationOutcome::Stale);
    assert!(ws.content(doomed.pane_id.as_str()).is_none());
    assert_eq!(ws.leaf_ids().len(), 1);
    Ok(())
}
