
use todo_sync::error::SyncError;
use todo_sync::provider::sync_progress::{feedback_channel, SyncEvent};
use todo_sync::{Importance, Item, ItemId, Provider, Timestamp};

use scenarii::{Call, MockBehaviour, MockRemote};


#[tokio::test]
async fn test_load_items_adopts_the_remote_list() {
    let folder = tempfile::tempdir().unwrap();
    let remote = MockRemote::with_items(vec![
        scenarii::item_created_at("Water plants", Importance::Regular, 1_000.0),
        scenarii::item_created_at("Pay rent", Importance::Important, 2_000.0),
    ]);
    let mut provider = scenarii::test_provider(folder.path(), &remote);

    let items = provider.load_items().await.unwrap();
    scenarii::print_items("after load", &items);

    assert_eq!(items, remote.items());
    assert_eq!(scenarii::items_on_disk(folder.path()), remote.items());
    assert_eq!(provider.is_dirty(), false);
    assert_eq!(remote.calls(), vec![Call::GetList]);
}

#[tokio::test]
async fn test_load_items_keeps_local_items_when_unreachable() {
    let folder = tempfile::tempdir().unwrap();
    let local_item = scenarii::item_created_at("Buy milk", Importance::Regular, 1_000.0);
    {
        let remote = MockRemote::new();
        let mut provider = scenarii::test_provider(folder.path(), &remote);
        provider.save_item(local_item.clone()).await.unwrap();
    }

    let remote = MockRemote::with_items(vec![scenarii::item_created_at("Pay rent", Importance::Important, 2_000.0)]);
    remote.set_behaviour(MockBehaviour::unreachable());
    let mut provider = scenarii::test_provider(folder.path(), &remote);

    let err = provider.load_items().await.unwrap_err();
    assert!(err.is_remote());
    assert_eq!(provider.items(), vec![local_item.clone()]);
    assert_eq!(scenarii::items_on_disk(folder.path()), vec![local_item]);
    assert!(provider.is_dirty());
}

#[tokio::test]
async fn test_load_items_reconciles_a_dirty_session() {
    let folder = tempfile::tempdir().unwrap();
    let local_item = scenarii::item_created_at("Buy milk", Importance::Regular, 1_000.0);
    {
        let remote = MockRemote::new();
        remote.set_behaviour(MockBehaviour::unreachable());
        let mut provider = scenarii::test_provider(folder.path(), &remote);
        assert!(provider.save_item(local_item.clone()).await.is_err());
    }

    let remote = MockRemote::with_items(vec![scenarii::item_created_at("Pay rent", Importance::Important, 2_000.0)]);
    let mut provider = scenarii::test_provider(folder.path(), &remote).with_dirty(true);

    let items = provider.load_items().await.unwrap();
    assert_eq!(remote.calls(), vec![Call::ReplaceList(1)]);
    assert_eq!(items.len(), 2);
    assert_eq!(items, remote.items());
    assert_eq!(provider.is_dirty(), false);
}

#[tokio::test]
async fn test_idempotent_delete() {
    let folder = tempfile::tempdir().unwrap();
    let remote = MockRemote::new();
    let mut provider = scenarii::test_provider(folder.path(), &remote);
    let item = Item::new("Buy milk".to_string(), Importance::Regular, None);
    provider.save_item(item.clone()).await.unwrap();
    remote.clear_calls();

    let unknown = ItemId::random();
    provider.delete_item(&unknown).await.unwrap();
    provider.toggle_is_done(&unknown).await.unwrap();
    assert_eq!(provider.items(), vec![item.clone()]);
    assert_eq!(provider.is_dirty(), false);
    assert!(remote.calls().is_empty());

    // This does not trigger a reconciliation either
    let mut provider = provider.with_dirty(true);
    provider.delete_item(&unknown).await.unwrap();
    assert!(provider.is_dirty());
    assert!(remote.calls().is_empty());

    let mut provider = provider.with_dirty(false);
    provider.delete_item(item.id()).await.unwrap();
    provider.delete_item(item.id()).await.unwrap();
    assert!(provider.items().is_empty());
    assert_eq!(remote.calls(), vec![Call::Delete(*item.id())]);
    assert!(remote.items().is_empty());
}

#[tokio::test]
async fn test_failed_push_keeps_the_local_change() {
    let folder = tempfile::tempdir().unwrap();
    let remote = MockRemote::new();
    remote.set_behaviour(MockBehaviour::unreachable());
    let mut provider = scenarii::test_provider(folder.path(), &remote);
    let (sender, receiver) = feedback_channel();
    provider.set_feedback_channel(sender);

    let item = Item::new("Buy milk".to_string(), Importance::Regular, None);
    let err = provider.save_item(item.clone()).await.unwrap_err();

    assert!(matches!(err, SyncError::Remote(_)));
    assert!(matches!(*receiver.borrow(), SyncEvent::Failed{ .. }));
    assert!(provider.is_dirty());
    assert_eq!(provider.n_errors(), 1);
    assert_eq!(remote.calls(), vec![Call::Create(*item.id())]);
    assert_eq!(provider.items(), vec![item.clone()]);
    assert_eq!(scenarii::items_on_disk(folder.path()), vec![item]);
    assert!(remote.items().is_empty());
}

#[tokio::test]
async fn test_failed_save_does_not_reach_the_remote() {
    let folder = tempfile::tempdir().unwrap();
    let not_a_folder = folder.path().join("a_file");
    std::fs::write(&not_a_folder, "").unwrap();
    let remote = MockRemote::new();
    let mut provider = scenarii::test_provider(&not_a_folder, &remote);

    let item = Item::new("Buy milk".to_string(), Importance::Regular, None);
    let err = provider.save_item(item.clone()).await.unwrap_err();

    assert!(matches!(err, SyncError::Cache(_)));
    assert!(provider.is_dirty());
    assert!(remote.calls().is_empty());
    assert_eq!(provider.items(), vec![item]);
}

#[tokio::test]
async fn test_reconciliation() {
    let folder = tempfile::tempdir().unwrap();
    let remote_item = scenarii::item_created_at("Pay rent", Importance::Important, 1_000.0);
    let local_item = scenarii::item_created_at("Buy milk", Importance::Regular, 2_000.0);
    let remote = MockRemote::with_items(vec![remote_item.clone()]);
    remote.set_behaviour(MockBehaviour::fail_now(1));
    let mut provider = scenarii::test_provider(folder.path(), &remote).with_dirty(true);
    provider.local().lock().unwrap().add_item(local_item.clone());

    // A failed reconciliation changes nothing
    assert!(provider.reconcile().await.is_err());
    assert!(provider.is_dirty());
    assert_eq!(provider.items(), vec![local_item.clone()]);
    assert_eq!(remote.items(), vec![remote_item.clone()]);

    provider.reconcile().await.unwrap();
    assert_eq!(provider.is_dirty(), false);
    assert_eq!(provider.items(), vec![remote_item, local_item]);
    assert_eq!(provider.items(), remote.items());
    assert_eq!(scenarii::items_on_disk(folder.path()), remote.items());
    assert_eq!(remote.calls(), vec![Call::ReplaceList(1), Call::ReplaceList(1)]);
}

#[tokio::test]
async fn test_dirty_provider_reconciles_instead_of_pushing() {
    let folder = tempfile::tempdir().unwrap();
    let remote = MockRemote::new();
    let mut provider = scenarii::test_provider(folder.path(), &remote).with_dirty(true);

    let item = Item::new("Buy milk".to_string(), Importance::Regular, None);
    provider.save_item(item.clone()).await.unwrap();
    assert_eq!(remote.calls(), vec![Call::ReplaceList(1)]);
    assert_eq!(provider.is_dirty(), false);

    // Back to single-item calls
    provider.toggle_is_done(item.id()).await.unwrap();
    assert_eq!(remote.calls(), vec![Call::ReplaceList(1), Call::Update(*item.id())]);
    assert!(remote.items()[0].is_done());
}

#[tokio::test]
async fn test_buy_milk_scenario() {
    let folder = tempfile::tempdir().unwrap();
    let server_item = scenarii::item_created_at("Water plants", Importance::Unimportant, 1_000.0);
    let remote = MockRemote::with_items(vec![server_item]);
    remote.set_behaviour(MockBehaviour::unreachable());
    let mut provider: Provider<MockRemote> = scenarii::test_provider(folder.path(), &remote);

    // Create A while the remote is unreachable
    let item_a = scenarii::item_created_at("Buy milk", Importance::Regular, 2_000.0);
    assert!(provider.save_item(item_a.clone()).await.is_err());
    assert_eq!(scenarii::items_on_disk(folder.path()), vec![item_a.clone()]);
    assert!(provider.is_dirty());

    // Create B while it is still unreachable: a reconciliation is attempted instead of a single creation
    remote.clear_calls();
    let item_b = scenarii::item_created_at("Call Mom", Importance::Important, 3_000.0);
    assert!(provider.save_item(item_b.clone()).await.is_err());
    assert_eq!(remote.calls(), vec![Call::ReplaceList(2)]);
    assert!(provider.is_dirty());
    assert_eq!(provider.items(), vec![item_a.clone(), item_b.clone()]);
    assert_eq!(scenarii::items_on_disk(folder.path()), vec![item_a.clone(), item_b]);

    // The remote is back. Toggling A reconciles everything
    remote.set_behaviour(MockBehaviour::new());
    remote.clear_calls();
    provider.toggle_is_done(item_a.id()).await.unwrap();
    scenarii::print_items("after reconciliation", &provider.items());

    assert_eq!(remote.calls(), vec![Call::ReplaceList(2)]);
    assert_eq!(provider.is_dirty(), false);
    assert_eq!(provider.items().len(), 3);
    assert_eq!(provider.items(), remote.items());
    assert_eq!(scenarii::items_on_disk(folder.path()), remote.items());
    assert!(provider.local().lock().unwrap().get_item(item_a.id()).unwrap().is_done());
}

#[tokio::test]
async fn test_reconciliation_replaces_the_local_items() {
    let folder = tempfile::tempdir().unwrap();
    let kept = scenarii::item_created_at("Buy milk", Importance::Regular, 1_000.0);
    let deleted_elsewhere = scenarii::item_created_at("Call Mom", Importance::Important, 2_000.0);
    let remote = MockRemote::with_items(vec![kept.clone(), deleted_elsewhere.clone()]);
    let mut provider = scenarii::test_provider(folder.path(), &remote);
    provider.load_items().await.unwrap();
    assert_eq!(provider.items().len(), 2);

    remote.delete_remotely(deleted_elsewhere.id());
    let mut provider = provider.with_dirty(true);
    provider.reconcile().await.unwrap();

    assert_eq!(remote.calls(), vec![Call::GetList, Call::ReplaceList(2)]);
    assert_eq!(provider.items(), vec![kept.clone()]);
    assert_eq!(scenarii::items_on_disk(folder.path()), vec![kept]);
    assert_eq!(provider.is_dirty(), false);
}

#[tokio::test]
async fn test_load_items_replaces_the_local_items() {
    let folder = tempfile::tempdir().unwrap();
    let local_only = scenarii::item_created_at("Buy milk", Importance::Regular, 1_000.0);
    {
        let remote = MockRemote::new();
        let mut provider = scenarii::test_provider(folder.path(), &remote);
        provider.save_item(local_only.clone()).await.unwrap();
    }

    let remote_item = scenarii::item_created_at("Pay rent", Importance::Important, 2_000.0);
    let remote = MockRemote::with_items(vec![remote_item.clone()]);
    let mut provider = scenarii::test_provider(folder.path(), &remote);

    assert_eq!(provider.load_items().await.unwrap(), vec![remote_item.clone()]);
    assert_eq!(provider.items(), vec![remote_item.clone()]);
    assert_eq!(scenarii::items_on_disk(folder.path()), vec![remote_item]);
}

#[tokio::test]
async fn test_outdated_reconciliation_is_not_adopted() {
    let folder = tempfile::tempdir().unwrap();
    let remote = MockRemote::new();
    let mut provider = scenarii::test_provider(folder.path(), &remote).with_dirty(true);
    let item_a = scenarii::item_created_at("Buy milk", Importance::Regular, 1_000.0);
    let item_b = scenarii::item_created_at("Call Mom", Importance::Important, 2_000.0);
    provider.local().lock().unwrap().add_item(item_a.clone());

    // B is added locally while the reconciliation of A is in flight
    let gate = remote.gate_next_reconciliation();
    let local = provider.local().clone();
    let (result, ()) = tokio::join!(
        provider.reconcile(),
        async {
            gate.entered.notified().await;
            local.lock().unwrap().add_item(item_b.clone());
            gate.release.notify_one();
        },
    );

    result.unwrap();
    assert!(provider.is_dirty());
    assert_eq!(provider.items(), vec![item_a.clone(), item_b.clone()]);
    assert_eq!(remote.items(), vec![item_a.clone()]);

    // The next change reconciles again
    provider.toggle_is_done(item_a.id()).await.unwrap();
    assert_eq!(remote.calls(), vec![Call::ReplaceList(1), Call::ReplaceList(2)]);
    assert_eq!(provider.is_dirty(), false);
    assert_eq!(provider.items(), remote.items());
    assert_eq!(provider.items().len(), 2);
}

#[tokio::test]
async fn test_invalid_items_are_rejected() {
    let folder = tempfile::tempdir().unwrap();
    let remote = MockRemote::new();
    let mut provider = scenarii::test_provider(folder.path(), &remote);
    let item = Item::new_with_parameters(ItemId::random(), "Buy milk".to_string(), Importance::Regular, None, false,
        Timestamp::from_seconds(2_000.0), Some(Timestamp::from_seconds(1_000.0)), None);

    let err = provider.save_item(item).await.unwrap_err();
    assert!(matches!(err, SyncError::Cache(ref cache_err) if cache_err.is_invalid_item()));
    assert!(provider.items().is_empty());
    assert_eq!(provider.is_dirty(), false);
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn test_colors_survive_a_round_trip() {
    let folder = tempfile::tempdir().unwrap();
    let remote = MockRemote::new();
    let mut provider = scenarii::test_provider(folder.path(), &remote);
    let item = Item::new_with_parameters(ItemId::random(), "Buy milk".to_string(), Importance::Regular, None, false,
        Timestamp::from_seconds(1_000.0), None, Some("#FF0000".to_string()));

    provider.save_item(item.clone()).await.unwrap();
    assert_eq!(scenarii::items_on_disk(folder.path()), vec![item]);
}
