//! Storage layer tests for the CourseHub server.

use super::db::{CourseDatabase, DatabaseError};
use super::queries::CoursePatch;
use super::queries_chapters::ChapterPatch;

async fn test_db() -> CourseDatabase {
    CourseDatabase::open_in_memory().await.unwrap()
}

async fn db_with_course() -> CourseDatabase {
    let db = test_db().await;
    db.create_course("c1", "teacher_1", "Rust for beginners")
        .await
        .unwrap();
    db
}

// === Category tests ===

#[tokio::test]
async fn categories_are_listed_by_name() {
    let db = test_db().await;
    db.create_category("k2", "Music").await.unwrap();
    db.create_category("k1", "Computer Science").await.unwrap();

    let names: Vec<_> = db
        .list_categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Computer Science", "Music"]);
}

#[tokio::test]
async fn duplicate_category_name_conflicts() {
    let db = test_db().await;
    db.create_category("k1", "Music").await.unwrap();
    let err = db.create_category("k2", "Music").await.unwrap_err();
    assert!(err.is_conflict(), "got {err:?}");
}

// === Course tests ===

#[tokio::test]
async fn create_course_is_unpublished() {
    let db = test_db().await;
    let course = db
        .create_course("c1", "teacher_1", "Rust for beginners")
        .await
        .unwrap();

    assert_eq!(course.id, "c1");
    assert_eq!(course.user_id, "teacher_1");
    assert!(!course.is_published);
    assert!(course.description.is_none());
    assert!(course.price.is_none());
}

#[tokio::test]
async fn owned_course_lookup_checks_owner() {
    let db = db_with_course().await;
    assert!(db.get_owned_course("c1", "teacher_1").await.is_ok());
    assert!(matches!(
        db.get_owned_course("c1", "teacher_2").await,
        Err(DatabaseError::NotFound(_))
    ));
}

#[tokio::test]
async fn update_course_only_touches_given_fields() {
    let db = db_with_course().await;
    db.create_category("k1", "Computer Science").await.unwrap();

    let patch = CoursePatch {
        image_url: Some("https://files.example/cover.png"),
        price: Some(19.99),
        category_id: Some("k1"),
        ..CoursePatch::default()
    };
    let course = db.update_course("c1", &patch).await.unwrap();

    assert_eq!(course.title, "Rust for beginners");
    assert_eq!(course.image_url.as_deref(), Some("https://files.example/cover.png"));
    assert_eq!(course.price, Some(19.99));
    assert_eq!(course.category_id.as_deref(), Some("k1"));

    let patch = CoursePatch {
        title: Some("Rust in depth"),
        ..CoursePatch::default()
    };
    let course = db.update_course("c1", &patch).await.unwrap();
    assert_eq!(course.title, "Rust in depth");
    assert_eq!(course.price, Some(19.99));
}

#[tokio::test]
async fn update_missing_course_is_not_found() {
    let db = test_db().await;
    let patch = CoursePatch {
        title: Some("x"),
        ..CoursePatch::default()
    };
    assert!(matches!(
        db.update_course("missing", &patch).await,
        Err(DatabaseError::NotFound(_))
    ));
}

#[tokio::test]
async fn published_course_lookup() {
    let db = db_with_course().await;
    assert!(db.get_published_course("c1").await.unwrap().is_none());

    db.set_course_published("c1", true).await.unwrap();
    assert!(db.get_published_course("c1").await.unwrap().is_some());
}

#[tokio::test]
async fn teacher_courses_are_scoped_to_owner() {
    let db = db_with_course().await;
    db.create_course("c2", "teacher_2", "Piano").await.unwrap();

    let courses = db.list_teacher_courses("teacher_1").await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, "c1");
}

// === Chapter tests ===

#[tokio::test]
async fn first_chapter_gets_position_one() {
    let db = db_with_course().await;
    let chapter = db.create_chapter("ch1", "c1", "Intro").await.unwrap();

    assert_eq!(chapter.position, 1);
    assert!(!chapter.is_published);
    assert!(!chapter.is_free);
}

#[tokio::test]
async fn chapter_positions_follow_the_maximum() {
    let db = db_with_course().await;
    db.create_chapter("ch1", "c1", "Intro").await.unwrap();
    db.create_chapter("ch2", "c1", "Basics").await.unwrap();
    db.reorder_chapters("c1", &[("ch1", 1), ("ch2", 7)])
        .await
        .unwrap();

    let chapter = db.create_chapter("ch3", "c1", "Advanced").await.unwrap();
    assert_eq!(chapter.position, 8);
}

#[tokio::test]
async fn positions_are_per_course() {
    let db = db_with_course().await;
    db.create_course("c2", "teacher_1", "Other").await.unwrap();
    db.create_chapter("ch1", "c1", "Intro").await.unwrap();
    db.create_chapter("ch2", "c1", "Basics").await.unwrap();

    let chapter = db.create_chapter("ch3", "c2", "Intro").await.unwrap();
    assert_eq!(chapter.position, 1);
}

#[tokio::test]
async fn chapter_for_missing_course_fails() {
    let db = test_db().await;
    assert!(db.create_chapter("ch1", "missing", "Intro").await.is_err());
}

#[tokio::test]
async fn list_chapters_is_position_ordered() {
    let db = db_with_course().await;
    for (id, title) in [("a", "One"), ("b", "Two"), ("c", "Three")] {
        db.create_chapter(id, "c1", title).await.unwrap();
    }
    db.reorder_chapters("c1", &[("a", 3), ("b", 1), ("c", 2)])
        .await
        .unwrap();

    let chapters = db.list_chapters("c1").await.unwrap();
    let ids: Vec<_> = chapters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
    assert!(chapters.windows(2).all(|w| w[0].position < w[1].position));
}

#[tokio::test]
async fn reorder_with_foreign_chapter_rolls_back() {
    let db = db_with_course().await;
    db.create_course("c2", "teacher_1", "Other").await.unwrap();
    db.create_chapter("a", "c1", "One").await.unwrap();
    db.create_chapter("b", "c1", "Two").await.unwrap();
    db.create_chapter("x", "c2", "Elsewhere").await.unwrap();

    let err = db
        .reorder_chapters("c1", &[("a", 2), ("x", 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));

    let positions: Vec<_> = db
        .list_chapters("c1")
        .await
        .unwrap()
        .into_iter()
        .map(|c| (c.id, c.position))
        .collect();
    assert_eq!(positions, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
}

#[tokio::test]
async fn next_published_chapter_skips_drafts() {
    let db = db_with_course().await;
    for id in ["p1", "p2", "p3", "p4"] {
        db.create_chapter(id, "c1", id).await.unwrap();
    }
    for id in ["p1", "p2", "p4"] {
        db.set_chapter_published(id, true).await.unwrap();
    }

    let next = db.next_published_chapter("c1", 2).await.unwrap().unwrap();
    assert_eq!(next.id, "p4");
    assert!(db.next_published_chapter("c1", 4).await.unwrap().is_none());
    assert_eq!(db.count_published_chapters("c1").await.unwrap(), 3);
}

#[tokio::test]
async fn update_chapter_sets_free_flag() {
    let db = db_with_course().await;
    db.create_chapter("ch1", "c1", "Intro").await.unwrap();

    let patch = ChapterPatch {
        is_free: Some(true),
        video_url: Some("https://files.example/intro.mp4"),
        ..ChapterPatch::default()
    };
    let chapter = db.update_chapter("ch1", &patch).await.unwrap();
    assert!(chapter.is_free);
    assert_eq!(chapter.title, "Intro");
    assert_eq!(
        chapter.video_url.as_deref(),
        Some("https://files.example/intro.mp4")
    );
}

#[tokio::test]
async fn course_chapter_lookup_checks_course() {
    let db = db_with_course().await;
    db.create_course("c2", "teacher_1", "Other").await.unwrap();
    db.create_chapter("ch1", "c1", "Intro").await.unwrap();

    assert!(db.get_course_chapter("c1", "ch1").await.is_ok());
    assert!(db.get_course_chapter("c2", "ch1").await.is_err());
}

// === Attachment and video tests ===

#[tokio::test]
async fn attachments_are_listed_per_course() {
    let db = db_with_course().await;
    db.create_attachment("a1", "c1", "slides.pdf", "https://files.example/slides.pdf")
        .await
        .unwrap();

    let attachments = db.list_attachments("c1").await.unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].name, "slides.pdf");
}

#[tokio::test]
async fn mux_data_upsert_replaces_ids() {
    let db = db_with_course().await;
    db.create_chapter("ch1", "c1", "Intro").await.unwrap();

    db.upsert_mux_data("m1", "ch1", "asset-1", Some("play-1"))
        .await
        .unwrap();
    let data = db
        .upsert_mux_data("m2", "ch1", "asset-2", Some("play-2"))
        .await
        .unwrap();

    assert_eq!(data.id, "m1");
    assert_eq!(data.asset_id, "asset-2");
    assert_eq!(data.playback_id.as_deref(), Some("play-2"));
}

// === Purchase and progress tests ===

#[tokio::test]
async fn purchase_is_idempotent() {
    let db = db_with_course().await;
    let first = db.create_purchase("pu1", "student_1", "c1").await.unwrap();
    let second = db.create_purchase("pu2", "student_1", "c1").await.unwrap();

    assert_eq!(first.id, second.id);
    assert!(db.get_purchase("student_2", "c1").await.unwrap().is_none());
}

#[tokio::test]
async fn progress_upsert_flips_completion() {
    let db = db_with_course().await;
    db.create_chapter("ch1", "c1", "Intro").await.unwrap();

    let progress = db
        .upsert_progress("up1", "student_1", "ch1", true)
        .await
        .unwrap();
    assert!(progress.is_completed);

    let progress = db
        .upsert_progress("up2", "student_1", "ch1", false)
        .await
        .unwrap();
    assert_eq!(progress.id, "up1");
    assert!(!progress.is_completed);
}

#[tokio::test]
async fn completed_ids_only_count_published_chapters() {
    let db = db_with_course().await;
    db.create_chapter("ch1", "c1", "Intro").await.unwrap();
    db.create_chapter("ch2", "c1", "Draft").await.unwrap();
    db.set_chapter_published("ch1", true).await.unwrap();
    db.upsert_progress("up1", "student_1", "ch1", true)
        .await
        .unwrap();
    db.upsert_progress("up2", "student_1", "ch2", true)
        .await
        .unwrap();

    let ids = db.completed_chapter_ids("student_1", "c1").await.unwrap();
    assert_eq!(ids, vec!["ch1"]);
}
