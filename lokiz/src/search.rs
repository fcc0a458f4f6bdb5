//! In-memory search over the loaded catalogue.

use itertools::Itertools;

use crate::model::{User, Video};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchTab {
    #[default]
    Videos,
    Users,
    Hashtags,
}

impl SearchTab {
    pub fn next(self) -> Self {
        match self {
            SearchTab::Videos => SearchTab::Users,
            SearchTab::Users => SearchTab::Hashtags,
            SearchTab::Hashtags => SearchTab::Videos,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SearchTab::Videos => "Videos",
            SearchTab::Users => "Users",
            SearchTab::Hashtags => "Hashtags",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashtagHit {
    pub name: String,
    pub video_count: usize,
    pub total_views: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub videos: Vec<Video>,
    pub users: Vec<User>,
    pub hashtags: Vec<HashtagHit>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.videos.len() + self.users.len() + self.hashtags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn count(&self, tab: SearchTab) -> usize {
        match tab {
            SearchTab::Videos => self.videos.len(),
            SearchTab::Users => self.users.len(),
            SearchTab::Hashtags => self.hashtags.len(),
        }
    }
}

/// Case-insensitive substring search; blank queries match nothing.
///
/// Surrounding whitespace is kept in the needle, so `"epic "` only matches
/// where a space follows.
pub fn search(query: &str, videos: &[Video], users: &[User]) -> SearchResults {
    if query.trim().is_empty() {
        return SearchResults::default();
    }
    let needle = query.to_lowercase();
    let contains = |hay: &str| hay.to_lowercase().contains(&needle);

    let matched_videos = videos
        .iter()
        .filter(|v| contains(&v.caption) || v.hashtags.iter().any(|tag| contains(tag)))
        .cloned()
        .collect();

    let matched_users = users.iter().filter(|u| contains(&u.nickname) || contains(&u.username)).cloned().collect();

    let hashtags = videos
        .iter()
        .flat_map(|v| v.hashtags.iter())
        .unique()
        .filter(|tag| contains(tag))
        .map(|tag| {
            let tagged = videos.iter().filter(|v| v.has_hashtag(tag));
            let (video_count, total_views) = tagged.fold((0, 0), |(n, views), v| (n + 1, views + v.stats.views));
            HashtagHit { name: tag.to_string(), video_count, total_views }
        })
        .collect();

    SearchResults { videos: matched_videos, users: matched_users, hashtags }
}

/// Videos carrying `tag`, for the hashtag overlay.
pub fn videos_with_hashtag<'a>(tag: &str, videos: &'a [Video]) -> Vec<&'a Video> {
    let tag = tag.trim_start_matches('#');
    videos.iter().filter(|v| v.has_hashtag(tag)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;

    #[test]
    fn blank_query_matches_nothing() {
        let videos = mock::videos();
        let users = mock::users();
        for q in ["", "   ", "\t"] {
            let results = search(q, &videos, &users);
            assert!(results.videos.is_empty());
            assert!(results.users.is_empty());
            assert!(results.hashtags.is_empty());
        }
    }

    #[test]
    fn caption_substring_is_case_insensitive() {
        let videos = mock::videos();
        let results = search("EPIC", &videos, &mock::users());
        let ids: Vec<_> = results.videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["3"]);
    }

    #[test]
    fn whitespace_in_the_query_is_matched_literally() {
        let videos = mock::videos();
        let users = mock::users();
        let ids: Vec<_> = search("Epic ", &videos, &users).videos.iter().map(|v| v.id.clone()).collect();
        assert_eq!(ids, ["3"]);
        assert!(search(" epic", &videos, &users).videos.is_empty());
        assert_eq!(search("rainbow ", &videos, &users).users.len(), 1);
        assert!(search("fan ", &videos, &users).users.is_empty());
    }

    #[test]
    fn hashtag_hits_match_videos_too() {
        let videos = mock::videos();
        let results = search("glitch", &videos, &mock::users());
        assert_eq!(results.videos.len(), 1);
        assert_eq!(results.hashtags, vec![HashtagHit { name: "glitch".into(), video_count: 1, total_views: 123_000 }]);
    }

    #[test]
    fn hashtags_are_unique_across_repeated_videos() {
        let videos = mock::generate_videos(9, 0);
        let results = search("trend", &videos, &[]);
        assert_eq!(results.hashtags.len(), 1);
        assert_eq!(results.hashtags[0].video_count, 3);
        assert_eq!(results.hashtags[0].total_views, 3 * 456_000);
        assert_eq!(results.count(SearchTab::Videos), 3);
    }

    #[test]
    fn users_match_nickname_or_handle() {
        let users = mock::users();
        assert_eq!(search("rainbow", &[], &users).users.len(), 1);
        assert_eq!(search("user", &[], &users).users.len(), 3);
    }

    #[test]
    fn hashtag_overlay_accepts_leading_hash() {
        let videos = mock::videos();
        assert_eq!(videos_with_hashtag("#viral", &videos).len(), 1);
    }
}
