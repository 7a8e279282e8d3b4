//! Chapter page state derived from a [`ChapterView`].

use serde::Serialize;

use super::{ChapterView, can_access};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Banner {
    None,
    Completed,
    Locked,
}

impl Banner {
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Completed => Some("You already completed this chapter"),
            Self::Locked => Some("You need to purchase this course to access this chapter"),
        }
    }
}

/// What the chapter page shows. Trusts the access decisions already taken
/// by [`super::get_chapter_view`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPage {
    pub course_id: String,
    pub chapter_id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_locked: bool,
    /// Mark the chapter completed when playback ends.
    pub complete_on_end: bool,
    pub banner: Banner,
    pub banner_label: Option<&'static str>,
    /// Withheld while locked.
    pub playback_id: Option<String>,
    pub next_chapter_id: Option<String>,
    pub attachments: Vec<crate::storage::Attachment>,
}

impl From<ChapterView> for ChapterPage {
    fn from(view: ChapterView) -> Self {
        let is_locked = !can_access(&view.chapter, view.purchase.as_ref());
        let is_completed = view.user_progress.as_ref().is_some_and(|p| p.is_completed);
        let complete_on_end = view.purchase.is_some() && !is_completed;

        let banner = if is_completed {
            Banner::Completed
        } else if is_locked {
            Banner::Locked
        } else {
            Banner::None
        };

        let playback_id = if is_locked {
            None
        } else {
            view.mux_data.and_then(|m| m.playback_id)
        };

        Self {
            course_id: view.course.id,
            chapter_id: view.chapter.id,
            title: view.chapter.title,
            description: view.chapter.description,
            is_locked,
            complete_on_end,
            banner,
            banner_label: banner.label(),
            playback_id,
            next_chapter_id: view.next_chapter.map(|c| c.id),
            attachments: view.attachments,
        }
    }
}
