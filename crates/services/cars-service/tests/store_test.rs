//! Repository behaviour against a real store: constraints, ordering and
//! cascades that a mock connection cannot reproduce.

mod support;

use sea_orm::{EntityTrait, PaginatorTrait};

use cars_service_lib::repository::entities::{post, PostEntity, PriceHistoryEntity};
use cars_service_lib::repository::{
    PostRepository, PostStore, PriceHistoryRepository, PriceHistoryStore, UserRepository,
    UserStore,
};
use common::AppError;
use domain::{NewPost, NewPriceHistory, NewUser, User};

use support::{sqlite_store, timestamp};

async fn create_user(users: &UserStore, login: &str) -> User {
    users
        .create(NewUser::new(login, "correct-horse").unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_duplicate_login_is_conflict() {
    let users = UserStore::new(sqlite_store().await);
    create_user(&users, "john").await;

    let err = users
        .create(NewUser::new("john", "another-secret").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(err.to_string(), "User with login 'john' already exists");
    assert_eq!(users.find_all_order_by_id().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_to_taken_login_is_conflict() {
    let users = UserStore::new(sqlite_store().await);
    create_user(&users, "john").await;
    let mut jane = create_user(&users, "jane").await;

    jane.change_login("john").unwrap();
    let err = users.update(&jane).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = users.find_by_id(jane.id).await.unwrap().unwrap();
    assert_eq!(stored.login, "jane");
}

#[tokio::test]
async fn test_update_and_find_by_login() {
    let users = UserStore::new(sqlite_store().await);
    let mut user = create_user(&users, "john").await;

    user.change_password("new-password").unwrap();
    users.update(&user).await.unwrap();

    let stored = users.find_by_login("john").await.unwrap().unwrap();
    assert!(stored.verify_password("new-password"));
    assert!(!stored.verify_password("correct-horse"));
    assert!(users.find_by_login("jo").await.unwrap().is_none());
}

#[tokio::test]
async fn test_like_login_treats_underscore_as_wildcard() {
    let users = UserStore::new(sqlite_store().await);
    create_user(&users, "abc").await;
    create_user(&users, "a_c").await;
    create_user(&users, "xyz").await;

    let logins: Vec<String> = users
        .find_by_like_login("a_c")
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.login)
        .collect();

    assert_eq!(logins, vec!["abc", "a_c"]);
}

#[tokio::test]
async fn test_posts_sorted_regardless_of_insertion_order() {
    let db = sqlite_store().await;
    let users = UserStore::new(db.clone());
    let posts = PostStore::new(db);
    let owner = create_user(&users, "seller").await;

    for id in [30, 10, 20] {
        posts
            .create(NewPost::new(id, format!("post {id}"), owner.id).unwrap())
            .await
            .unwrap();
    }

    let ids: Vec<i32> = posts
        .find_all_order_by_id()
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![10, 20, 30]);

    let owned: Vec<i32> = posts
        .find_by_user(owner.id)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(owned, vec![10, 20, 30]);
}

#[tokio::test]
async fn test_post_constraints() {
    let db = sqlite_store().await;
    let users = UserStore::new(db.clone());
    let posts = PostStore::new(db);
    let owner = create_user(&users, "seller").await;

    let unknown_owner = posts
        .create(NewPost::new(1, "orphan", owner.id + 100).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(unknown_owner, AppError::Integrity(_)));
    assert!(posts.find_by_id(1).await.unwrap().is_none());

    posts
        .create(NewPost::new(1, "first", owner.id).unwrap())
        .await
        .unwrap();
    let taken_id = posts
        .create(NewPost::new(1, "second", owner.id).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(taken_id, AppError::Conflict(_)));
    assert_eq!(taken_id.to_string(), "Post with id 1 already exists");
}

#[tokio::test]
async fn test_history_requires_existing_post() {
    let db = sqlite_store().await;
    let users = UserStore::new(db.clone());
    let posts = PostStore::new(db.clone());
    let histories = PriceHistoryStore::new(db);
    let owner = create_user(&users, "seller").await;

    let err = histories
        .create(99, NewPriceHistory::new(0, 100))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Integrity(_)));

    let post = posts
        .create(
            NewPost::new(5, "Passat", owner.id)
                .unwrap()
                .with_price(NewPriceHistory::new(0, 2000))
                .with_price(NewPriceHistory::new(2000, 1800)),
        )
        .await
        .unwrap();
    assert_eq!(post.latest_price(), Some(1800));

    let stored = histories.find_by_post(5).await.unwrap();
    let prices: Vec<i32> = stored.iter().map(|h| h.after).collect();
    assert_eq!(prices, vec![2000, 1800]);
}

#[tokio::test]
async fn test_delete_post_removes_history_and_participants() {
    let db = sqlite_store().await;
    let users = UserStore::new(db.clone());
    let posts = PostStore::new(db.clone());
    let histories = PriceHistoryStore::new(db.clone());
    let owner = create_user(&users, "seller").await;
    let buyer = create_user(&users, "buyer").await;

    for id in [1, 2] {
        posts
            .create(
                NewPost::new(id, "Corolla", owner.id)
                    .unwrap()
                    .with_price(NewPriceHistory::new(0, 900))
                    .with_price(NewPriceHistory::new(900, 850))
                    .with_price(NewPriceHistory::new(850, 800)),
            )
            .await
            .unwrap();
    }
    posts.add_participant(1, buyer.id).await.unwrap();
    posts.add_participant(2, buyer.id).await.unwrap();

    posts.delete(1).await.unwrap();

    assert!(posts.find_by_id(1).await.unwrap().is_none());
    assert!(histories.find_by_post(1).await.unwrap().is_empty());
    assert_eq!(PriceHistoryEntity::find().count(db.as_ref()).await.unwrap(), 3);
    assert_eq!(histories.find_by_post(2).await.unwrap().len(), 3);

    let joined: Vec<i32> = posts
        .find_by_participant(buyer.id)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(joined, vec![2]);

    assert!(matches!(posts.delete(1).await, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_participants() {
    let db = sqlite_store().await;
    let users = UserStore::new(db.clone());
    let posts = PostStore::new(db);
    let owner = create_user(&users, "seller").await;
    let buyer = create_user(&users, "buyer").await;
    posts
        .create(NewPost::new(1, "Civic", owner.id).unwrap())
        .await
        .unwrap();

    posts.add_participant(1, buyer.id).await.unwrap();
    let twice = posts.add_participant(1, buyer.id).await.unwrap_err();
    assert!(matches!(twice, AppError::Conflict(_)));

    let unknown = posts.add_participant(7, buyer.id).await.unwrap_err();
    assert!(matches!(unknown, AppError::Integrity(_)));

    posts.remove_participant(1, buyer.id).await.unwrap();
    assert!(posts.find_by_participant(buyer.id).await.unwrap().is_empty());
    assert!(matches!(
        posts.remove_participant(1, buyer.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_delete_user_owning_posts_is_rolled_back() {
    let db = sqlite_store().await;
    let users = UserStore::new(db.clone());
    let posts = PostStore::new(db);
    let seller = create_user(&users, "seller").await;
    let other = create_user(&users, "other").await;
    posts
        .create(NewPost::new(1, "Owned", seller.id).unwrap())
        .await
        .unwrap();
    posts
        .create(NewPost::new(2, "Joined", other.id).unwrap())
        .await
        .unwrap();
    posts.add_participant(2, seller.id).await.unwrap();

    let err = users.delete(seller.id).await.unwrap_err();
    assert!(matches!(err, AppError::Integrity(_)));

    assert!(users.find_by_id(seller.id).await.unwrap().is_some());
    let joined = posts.find_by_participant(seller.id).await.unwrap();
    assert_eq!(joined.len(), 1);
}

#[tokio::test]
async fn test_delete_user_without_posts() {
    let db = sqlite_store().await;
    let users = UserStore::new(db.clone());
    let posts = PostStore::new(db);
    let seller = create_user(&users, "seller").await;
    let buyer = create_user(&users, "buyer").await;
    posts
        .create(NewPost::new(1, "Astra", seller.id).unwrap())
        .await
        .unwrap();
    posts.add_participant(1, buyer.id).await.unwrap();

    users.delete(buyer.id).await.unwrap();

    assert!(users.find_by_id(buyer.id).await.unwrap().is_none());
    assert!(posts.find_by_participant(buyer.id).await.unwrap().is_empty());
    assert!(matches!(users.delete(buyer.id).await, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_listing_many_posts_loads_every_history() {
    let db = sqlite_store().await;
    let users = UserStore::new(db.clone());
    let posts = PostStore::new(db.clone());
    let histories = PriceHistoryStore::new(db.clone());
    let owner = create_user(&users, "dealer").await;

    let rows: Vec<post::ActiveModel> = (1..=2_500)
        .map(|id| post::ActiveModel {
            id: sea_orm::Set(id),
            description: sea_orm::Set(format!("stock car {id}")),
            created: sea_orm::Set(timestamp(i64::from(id))),
            auto_user_id: sea_orm::Set(owner.id),
        })
        .collect();
    for batch in rows.chunks(500) {
        PostEntity::insert_many(batch.to_vec())
            .exec_without_returning(db.as_ref())
            .await
            .unwrap();
    }
    for id in [1, 1_500, 2_500] {
        histories
            .create(id, NewPriceHistory::new(0, id * 10))
            .await
            .unwrap();
    }

    let all = posts.find_all_order_by_id().await.unwrap();

    assert_eq!(all.len(), 2_500);
    assert_eq!(all[0].latest_price(), Some(10));
    assert_eq!(all[1_499].latest_price(), Some(15_000));
    assert_eq!(all[2_499].latest_price(), Some(25_000));
    assert_eq!(all.iter().filter(|p| p.price_histories.is_empty()).count(), 2_497);
}
