use serde_json::{json, Value};
use std::time::Instant;
use blog::core::storage::{Fields, Storage};

const NUM_USERS: usize = 100;
const POSTS_PER_USER: usize = 2;

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

/// Every mutation rewrites the whole snapshot, so throughput drops as the
/// file grows. Run with `cargo test --test perf -- --ignored --nocapture`.
#[ignore]
#[test]
fn perf_test_users_with_posts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let mut storage = Storage::open(&path).unwrap();
    let start = Instant::now();

    println!("\n=== Performance Test ===");
    println!("Creating {} users with {} posts each...", NUM_USERS, POSTS_PER_USER);

    let user_creation_start = Instant::now();
    let mut user_ids = Vec::with_capacity(NUM_USERS);
    for i in 0..NUM_USERS {
        let user = storage
            .add_user(fields(json!({
                "login": format!("perf_user_{}", i),
                "email": format!("perf_user_{}@x.com", i),
                "password": "password123",
            })))
            .unwrap();
        user_ids.push(user.id);
    }
    let user_creation_time = user_creation_start.elapsed();
    println!(
        "User creation done: {} users in {:.2}s ({:.2} users/sec)",
        user_ids.len(),
        user_creation_time.as_secs_f64(),
        user_ids.len() as f64 / user_creation_time.as_secs_f64()
    );

    let post_creation_start = Instant::now();
    for (idx, user_id) in user_ids.iter().enumerate() {
        for post_num in 0..POSTS_PER_USER {
            storage
                .add_post(fields(json!({
                    "title": format!("Post {} from user {}", post_num + 1, idx),
                    "content": format!("Perf test at {}", chrono::Utc::now().to_rfc3339()),
                    "author_id": user_id,
                })))
                .unwrap();
        }
    }
    let post_creation_time = post_creation_start.elapsed();
    println!(
        "Post creation done: {} posts in {:.2}s ({:.2} posts/sec)",
        storage.list_posts().len(),
        post_creation_time.as_secs_f64(),
        storage.list_posts().len() as f64 / post_creation_time.as_secs_f64()
    );

    let reload_start = Instant::now();
    let reopened = Storage::open(&path).unwrap();
    println!(
        "Reload done: {} users, {} posts in {:.3}s",
        reopened.list_users().len(),
        reopened.list_posts().len(),
        reload_start.elapsed().as_secs_f64()
    );

    assert_eq!(reopened.list_users().len(), NUM_USERS);
    assert_eq!(reopened.list_posts().len(), NUM_USERS * POSTS_PER_USER);
    println!("Total: {:.2}s", start.elapsed().as_secs_f64());
}
