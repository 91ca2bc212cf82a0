pub mod author;
pub mod book;
pub mod book_authors;
pub mod book_genres;
pub mod category;
pub mod genre;
pub mod publisher;
pub mod series;
pub mod series_authors;
pub mod topic;

pub use author::Author;
pub use book::{Book, NamedRef, ReadingStatus};
pub use category::Category;
pub use genre::Genre;
pub use publisher::Publisher;
pub use series::Series;
pub use topic::Topic;
