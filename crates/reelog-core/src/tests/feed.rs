//! GroupFeedService tests: member gating, pagination after filtering,
//! combined-feed deduplication, and the stats view.

use reelog_storage::{GroupRole, Store};

use super::common::{fixture, shared_watch, sharing_user, user, watch_params};
use crate::error::Access;

#[tokio::test]
async fn feed_is_empty_for_outsiders_and_missing_groups() {
    let fx = fixture().await;
    let alice = sharing_user(&fx.store, "alice", true, true, true).await;
    let outsider = user(&fx.store, "eve", false).await;

    let group = fx.groups.create(&alice, "film club", None).await.unwrap();
    shared_watch(&fx.store, &alice, &group.group.id, "Heat", 1).await;

    let feed = fx
        .feed
        .group_feed(&group.group.id, &outsider, 0, 10)
        .await
        .unwrap();
    assert!(feed.is_empty());

    let missing = reelog_storage::GroupId(uuid::Uuid::new_v4());
    let feed = fx.feed.group_feed(&missing, &alice, 0, 10).await.unwrap();
    assert!(feed.is_empty());
}

#[tokio::test]
async fn feed_orders_and_paginates_after_filtering() {
    let fx = fixture().await;
    let alice = sharing_user(&fx.store, "alice", true, true, true).await;
    let bob = user(&fx.store, "bob", false).await;

    let group = fx.groups.create(&alice, "film club", None).await.unwrap();
    let group_id = group.group.id.clone();
    fx.groups
        .add_member(&group_id, &alice, &bob, GroupRole::Member)
        .await
        .unwrap()
        .expect("added");

    shared_watch(&fx.store, &alice, &group_id, "Heat", 3).await;
    shared_watch(&fx.store, &alice, &group_id, "Ronin", 2).await;
    // A private watch shared into the group is still invisible to others.
    let mut private = watch_params(&alice, "Alien", 1);
    private.is_private = true;
    let private_id = fx.store.create_watch(&private).await.unwrap();
    fx.store.share_watch_to_group(&private_id, &group_id).await.unwrap();

    let page = fx.feed.group_feed(&group_id, &bob, 0, 1).await.unwrap();
    assert_eq!(page.len(), 1);
    // The private watch does not occupy a slot in the page.
    assert_eq!(page[0].movie_title, "Ronin");

    let rest = fx.feed.group_feed(&group_id, &bob, 1, 10).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].movie_title, "Heat");

    // The owner sees all three.
    let own = fx.feed.group_feed(&group_id, &alice, 0, 10).await.unwrap();
    assert_eq!(own.len(), 3);
    assert_eq!(own[0].movie_title, "Alien");
}

#[tokio::test]
async fn combined_feed_deduplicates_across_groups() {
    let fx = fixture().await;
    // Premium so she can own both groups.
    let alice = user(&fx.store, "alice", true).await;
    fx.store
        .set_sharing_preferences(
            &alice,
            &reelog_storage::SharingPreferences {
                share_watches: true,
                share_ratings: true,
                share_notes: true,
            },
        )
        .await
        .unwrap();
    let bob = user(&fx.store, "bob", true).await;

    let first = fx.groups.create(&alice, "first", None).await.unwrap();
    let second = fx.groups.create(&alice, "second", None).await.unwrap();
    fx.groups
        .add_member(&first.group.id, &alice, &bob, GroupRole::Member)
        .await
        .unwrap()
        .expect("added");
    fx.groups
        .add_member(&second.group.id, &alice, &bob, GroupRole::Member)
        .await
        .unwrap()
        .expect("added");

    // Same watch shared into both groups.
    let watch_id = shared_watch(&fx.store, &alice, &first.group.id, "Heat", 2).await;
    fx.store
        .share_watch_to_group(&watch_id, &second.group.id)
        .await
        .unwrap();
    shared_watch(&fx.store, &alice, &second.group.id, "Ronin", 1).await;

    let feed = fx.feed.combined_feed(&bob).await.unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].movie_title, "Ronin");
    assert_eq!(feed[1].movie_title, "Heat");
}

#[tokio::test]
async fn combined_feed_empty_for_groupless_user() {
    let fx = fixture().await;
    let loner = user(&fx.store, "loner", false).await;
    assert!(fx.feed.combined_feed(&loner).await.unwrap().is_empty());
}

#[tokio::test]
async fn feed_with_stats_distinguishes_negatives() {
    let fx = fixture().await;
    let alice = user(&fx.store, "alice", false).await;
    let outsider = user(&fx.store, "eve", false).await;

    let group = fx.groups.create(&alice, "film club", None).await.unwrap();

    let missing = reelog_storage::GroupId(uuid::Uuid::new_v4());
    assert!(matches!(
        fx.feed.feed_with_stats(&missing, &alice).await.unwrap(),
        Access::NotFound
    ));
    assert!(matches!(
        fx.feed
            .feed_with_stats(&group.group.id, &outsider)
            .await
            .unwrap(),
        Access::NotMember
    ));
}

#[tokio::test]
async fn feed_with_stats_aggregates_visible_watches() {
    let fx = fixture().await;
    let alice = sharing_user(&fx.store, "alice", true, true, true).await;
    let bob = sharing_user(&fx.store, "bob", true, false, false).await;

    let group = fx.groups.create(&alice, "film club", None).await.unwrap();
    let group_id = group.group.id.clone();
    fx.groups
        .add_member(&group_id, &alice, &bob, GroupRole::Member)
        .await
        .unwrap()
        .expect("added");

    let mut heat = watch_params(&alice, "Heat", 3);
    heat.rating = Some(8);
    let heat_id = fx.store.create_watch(&heat).await.unwrap();
    fx.store.share_watch_to_group(&heat_id, &group_id).await.unwrap();

    let mut heat_again = watch_params(&alice, "Heat", 2);
    heat_again.movie_id = heat.movie_id.clone();
    heat_again.rating = Some(6);
    let again_id = fx.store.create_watch(&heat_again).await.unwrap();
    fx.store.share_watch_to_group(&again_id, &group_id).await.unwrap();

    // Bob shares watches but not ratings, so his rating is invisible to
    // Alice and stays out of her average.
    let mut ronin = watch_params(&bob, "Ronin", 1);
    ronin.rating = Some(2);
    let ronin_id = fx.store.create_watch(&ronin).await.unwrap();
    fx.store.share_watch_to_group(&ronin_id, &group_id).await.unwrap();

    let stats = fx
        .feed
        .feed_with_stats(&group_id, &alice)
        .await
        .unwrap()
        .granted()
        .expect("member view");

    assert_eq!(stats.group_name, "film club");
    assert_eq!(stats.total_watches, 3);
    assert_eq!(stats.unique_movies, 2);
    assert_eq!(stats.average_group_rating, Some(7.0));
    assert_eq!(stats.active_members, 2);
    assert_eq!(stats.top_movies[0].movie_title, "Heat");
    assert_eq!(stats.top_movies[0].watch_count, 2);
}

#[tokio::test]
async fn active_members_counts_watch_owners_not_membership() {
    let fx = fixture().await;
    let alice = sharing_user(&fx.store, "alice", true, true, true).await;
    let bob = user(&fx.store, "bob", false).await;
    let carol = user(&fx.store, "carol", false).await;

    let group = fx.groups.create(&alice, "film club", None).await.unwrap();
    let group_id = group.group.id.clone();
    fx.groups
        .add_member(&group_id, &alice, &bob, GroupRole::Member)
        .await
        .unwrap()
        .expect("added");
    fx.groups
        .add_member(&group_id, &alice, &carol, GroupRole::Member)
        .await
        .unwrap()
        .expect("added");

    // Three members, but only alice has shared any watches.
    shared_watch(&fx.store, &alice, &group_id, "Heat", 2).await;
    shared_watch(&fx.store, &alice, &group_id, "Ronin", 1).await;

    let stats = fx
        .feed
        .feed_with_stats(&group_id, &bob)
        .await
        .unwrap()
        .granted()
        .expect("member view");
    assert_eq!(stats.active_members, 1);
    assert_eq!(stats.total_watches, 2);
}
