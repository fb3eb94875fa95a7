pub mod comment;
pub mod like;
pub mod post;
pub mod user;

pub use comment::{Comment, CommentView};
pub use like::Like;
pub use post::{Post, PostView};
pub use user::{AuthorView, Role, User, UserView};
