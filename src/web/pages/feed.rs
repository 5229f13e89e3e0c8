//! Feed pages: home, group, profile and the caller's following feed.

use maud::{html, Markup};

use crate::components::{BaseLayout, EmptyState, Pagination, PostCard};
use crate::db::{PostView, User};
use crate::feed::{GroupFeed, Page, ProfileFeed};

fn render_posts(page: &Page<PostView>, base_url: &str, show_group: bool, empty: &str) -> Markup {
    html! {
        @if page.is_empty() {
            (EmptyState::new(empty))
        } @else {
            div class="post-list" {
                @for post in &page.items {
                    @if show_group {
                        (PostCard::new(post))
                    } @else {
                        (PostCard::new(post).without_group())
                    }
                }
            }
            (Pagination::for_page(page, base_url))
        }
    }
}

/// `GET /`
#[must_use]
pub fn render_home_page(page: &Page<PostView>, user: Option<&User>) -> Markup {
    let content = html! {
        h1 { "Latest posts" }
        (render_posts(page, "/", true, "No posts yet."))
    };
    BaseLayout::new("Home", user).render(content)
}

/// `GET /group/{slug}/`
#[must_use]
pub fn render_group_page(feed: &GroupFeed, user: Option<&User>) -> Markup {
    let group = &feed.group;
    let base_url = format!("/group/{}/", group.slug);

    let content = html! {
        header class="group-header" {
            h1 { (group.title) }
            @if !group.description.is_empty() {
                p { (group.description) }
            }
        }
        (render_posts(&feed.page, &base_url, false, "No posts in this group yet."))
    };
    BaseLayout::new(&group.title, user).render(content)
}

/// `GET /profile/{username}/`
///
/// The follow button is shown only to signed-in visitors looking at someone
/// else's profile.
#[must_use]
pub fn render_profile_page(feed: &ProfileFeed, user: Option<&User>) -> Markup {
    let author = &feed.author;
    let name = author.display_name();
    let base_url = format!("/profile/{}/", author.username);
    let is_self = user.is_some_and(|u| u.id == author.id);

    let content = html! {
        header class="profile-header" {
            h1 { "All posts by " (name) }
            ul class="profile-stats" {
                li { "Posts: " strong { (feed.page.count) } }
                li { "Followers: " strong { (feed.follower_count) } }
                li { "Following: " strong { (feed.following_count) } }
            }
            @if user.is_some() && !is_self {
                @if feed.is_following {
                    form action=(format!("/profile/{}/unfollow/", author.username)) method="post" {
                        button type="submit" class="secondary" { "Unfollow" }
                    }
                } @else {
                    form action=(format!("/profile/{}/follow/", author.username)) method="post" {
                        button type="submit" { "Follow" }
                    }
                }
            }
        }
        (render_posts(&feed.page, &base_url, true, "No posts yet."))
    };
    BaseLayout::new(&name, user).render(content)
}

/// `GET /follow/`
#[must_use]
pub fn render_following_page(page: &Page<PostView>, user: &User) -> Markup {
    let content = html! {
        h1 { "Posts from authors you follow" }
        (render_posts(page, "/follow/", true, "Follow some authors to see their posts here."))
    };
    BaseLayout::new("Following", Some(user)).render(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Group;
    use crate::feed::Paginator;

    fn user(id: i64, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password_hash: String::new(),
            is_active: true,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn profile(is_following: bool) -> ProfileFeed {
        ProfileFeed {
            author: user(2, "darlene"),
            page: Paginator::new(0, 10).page(1, Vec::new()),
            follower_count: 3,
            following_count: 1,
            is_following,
        }
    }

    #[test]
    fn test_empty_home_page() {
        let page = Paginator::new(0, 10).page(1, Vec::new());
        let html = render_home_page(&page, None).into_string();
        assert!(html.contains("No posts yet."));
        assert!(!html.contains("pagination"));
    }

    #[test]
    fn test_group_page_header() {
        let feed = GroupFeed {
            group: Group {
                id: 1,
                title: "Robots".to_string(),
                slug: "robots".to_string(),
                description: "All about robots".to_string(),
            },
            page: Paginator::new(0, 10).page(1, Vec::new()),
        };
        let html = render_group_page(&feed, None).into_string();
        assert!(html.contains("<h1>Robots</h1>"));
        assert!(html.contains("All about robots"));
    }

    #[test]
    fn test_profile_follow_button_states() {
        let viewer = user(1, "elliot");

        let html = render_profile_page(&profile(false), Some(&viewer)).into_string();
        assert!(html.contains(r#"action="/profile/darlene/follow/""#));
        assert!(html.contains("Followers: <strong>3</strong>"));

        let html = render_profile_page(&profile(true), Some(&viewer)).into_string();
        assert!(html.contains(r#"action="/profile/darlene/unfollow/""#));

        let html = render_profile_page(&profile(false), None).into_string();
        assert!(!html.contains("/follow/\""));

        let own = user(2, "darlene");
        let html = render_profile_page(&profile(false), Some(&own)).into_string();
        assert!(!html.contains(r#"action="/profile/darlene/follow/""#));
    }
}
