//! PrivacyService tests: the visibility cascade, per-field independence,
//! and the hard private override.

use reelog_storage::{GroupRole, Store};

use super::common::{fixture, sharing_user, user, watch_params};

#[tokio::test]
async fn owner_always_sees_own_watch() {
    let fx = fixture().await;
    let alice = user(&fx.store, "alice", false).await;

    let mut params = watch_params(&alice, "Heat", 1);
    params.is_private = true;
    let watch_id = fx.store.create_watch(&params).await.unwrap();
    let watch = fx.store.get_watch(&watch_id).await.unwrap();

    assert!(fx.privacy.can_view_watch(&watch, &alice).await.unwrap());
    assert!(fx.privacy.can_view_rating(&watch, &alice).await.unwrap());
    assert!(fx.privacy.can_view_notes(&watch, &alice).await.unwrap());
}

#[tokio::test]
async fn visibility_requires_shared_group_and_toggle() {
    let fx = fixture().await;
    let alice = sharing_user(&fx.store, "alice", true, false, false).await;
    let bob = user(&fx.store, "bob", false).await;
    let stranger = user(&fx.store, "eve", false).await;

    let group = fx.groups.create(&alice, "film club", None).await.unwrap();
    fx.groups
        .add_member(&group.group.id, &alice, &bob, GroupRole::Member)
        .await
        .unwrap()
        .expect("added");

    let watch_id = fx
        .store
        .create_watch(&watch_params(&alice, "Heat", 1))
        .await
        .unwrap();
    let watch = fx.store.get_watch(&watch_id).await.unwrap();

    assert!(fx.privacy.can_view_watch(&watch, &bob).await.unwrap());
    // No shared group, no visibility.
    assert!(!fx.privacy.can_view_watch(&watch, &stranger).await.unwrap());
    assert!(fx.privacy.are_users_in_same_group(&alice, &bob).await.unwrap());
    assert!(!fx
        .privacy
        .are_users_in_same_group(&alice, &stranger)
        .await
        .unwrap());
}

#[tokio::test]
async fn share_watches_off_hides_everything() {
    let fx = fixture().await;
    // Ratings and notes toggles are on, but the watch toggle gates them.
    let alice = sharing_user(&fx.store, "alice", false, true, true).await;
    let bob = user(&fx.store, "bob", false).await;

    let group = fx.groups.create(&alice, "film club", None).await.unwrap();
    fx.groups
        .add_member(&group.group.id, &alice, &bob, GroupRole::Member)
        .await
        .unwrap()
        .expect("added");

    let watch_id = fx
        .store
        .create_watch(&watch_params(&alice, "Heat", 1))
        .await
        .unwrap();
    let watch = fx.store.get_watch(&watch_id).await.unwrap();

    assert!(!fx.privacy.can_view_watch(&watch, &bob).await.unwrap());
    assert!(!fx.privacy.can_view_rating(&watch, &bob).await.unwrap());
    assert!(!fx.privacy.can_view_notes(&watch, &bob).await.unwrap());
}

#[tokio::test]
async fn rating_and_notes_toggles_are_independent() {
    let fx = fixture().await;
    let alice = sharing_user(&fx.store, "alice", true, true, false).await;
    let bob = user(&fx.store, "bob", false).await;

    let group = fx.groups.create(&alice, "film club", None).await.unwrap();
    fx.groups
        .add_member(&group.group.id, &alice, &bob, GroupRole::Member)
        .await
        .unwrap()
        .expect("added");

    let watch_id = fx
        .store
        .create_watch(&watch_params(&alice, "Heat", 1))
        .await
        .unwrap();
    let watch = fx.store.get_watch(&watch_id).await.unwrap();

    assert!(fx.privacy.can_view_rating(&watch, &bob).await.unwrap());
    assert!(!fx.privacy.can_view_notes(&watch, &bob).await.unwrap());
}

#[tokio::test]
async fn private_flag_overrides_all_sharing() {
    let fx = fixture().await;
    let alice = sharing_user(&fx.store, "alice", true, true, true).await;
    let bob = user(&fx.store, "bob", false).await;

    let group = fx.groups.create(&alice, "film club", None).await.unwrap();
    fx.groups
        .add_member(&group.group.id, &alice, &bob, GroupRole::Member)
        .await
        .unwrap()
        .expect("added");

    let mut params = watch_params(&alice, "Heat", 1);
    params.is_private = true;
    let watch_id = fx.store.create_watch(&params).await.unwrap();
    let watch = fx.store.get_watch(&watch_id).await.unwrap();

    assert!(!fx.privacy.can_view_watch(&watch, &bob).await.unwrap());
    assert!(!fx.privacy.can_view_rating(&watch, &bob).await.unwrap());
    assert!(!fx.privacy.can_view_notes(&watch, &bob).await.unwrap());
}

#[tokio::test]
async fn filter_watches_nulls_withheld_fields() {
    let fx = fixture().await;
    let alice = sharing_user(&fx.store, "alice", true, false, true).await;
    let bob = user(&fx.store, "bob", false).await;

    let group = fx.groups.create(&alice, "film club", None).await.unwrap();
    fx.groups
        .add_member(&group.group.id, &alice, &bob, GroupRole::Member)
        .await
        .unwrap()
        .expect("added");

    let visible_id = fx
        .store
        .create_watch(&watch_params(&alice, "Heat", 1))
        .await
        .unwrap();
    let mut private = watch_params(&alice, "Ronin", 2);
    private.is_private = true;
    fx.store.create_watch(&private).await.unwrap();

    let watches = fx.store.list_watches_by_owner(&alice).await.unwrap();
    assert_eq!(watches.len(), 2);

    let filtered = fx.privacy.filter_watches(watches.clone(), &bob).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, visible_id);
    // Rating withheld, notes shared.
    assert_eq!(filtered[0].rating, None);
    assert_eq!(filtered[0].notes.as_deref(), Some("notes"));

    // The owner's own view is untouched.
    let own = fx.privacy.filter_watches(watches, &alice).await.unwrap();
    assert_eq!(own.len(), 2);
    assert!(own.iter().all(|w| w.rating.is_some()));
}
