use super::Post;

/// Everything a feed page shows
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    /// The logged-in viewer
    pub you: String,
    /// Whose posts are listed; `None` for the viewer's own feed
    pub owner: Option<String>,
    /// Users the viewer could follow
    pub others: Vec<String>,
    pub posts: Vec<Post>,
}
