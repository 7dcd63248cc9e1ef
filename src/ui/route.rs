//! Routes, navigation parameters and the side-menu page list.

use crate::model::UserId;

/// Top-level screens the core can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Home,
    Search,
    Favorites,
    Friends,
    Profile,
}

/// Parameters passed along with [`Navigator::push`](super::Navigator::push).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavParams {
    /// Open the target in lookup mode (viewing someone else's record).
    pub lookup: bool,
    /// User the target page is about.
    pub uid: Option<UserId>,
}

impl NavParams {
    /// Parameters for looking up another user's profile.
    pub fn lookup(uid: UserId) -> Self {
        Self {
            lookup: true,
            uid: Some(uid),
        }
    }
}

/// Entry of the side menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: &'static str,
    pub route: Route,
}

/// Side-menu entries in display order.
pub fn default_pages() -> Vec<Page> {
    vec![
        Page { title: "Home", route: Route::Home },
        Page { title: "Search", route: Route::Search },
        Page { title: "Favorites", route: Route::Favorites },
        Page { title: "Friends", route: Route::Friends },
        Page { title: "Profile", route: Route::Profile },
    ]
}
