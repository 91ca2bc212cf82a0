//! Recommendation engine.
//!
//! Derives a genre-affinity profile from the books the user has
//! completed, then ranks unread books against it. Pure computation over
//! a point-in-time snapshot; the catalog is never mutated.

use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::domain::DomainError;
use crate::models::book::Book;
use crate::services::book_service;

pub const RECOMMENDATION_LIMIT: usize = 10;
pub const FAVORITE_GENRE_LIMIT: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct UserReadingStats {
    pub completed_books: usize,
    pub favorite_genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Recommendations {
    pub recommendations: Vec<Book>,
    pub user_reading_stats: UserReadingStats,
}

/// Rank unread books against the user's completed-book history.
pub async fn recommend(db: &DatabaseConnection) -> Result<Recommendations, DomainError> {
    let txn = db.begin().await?;
    let books = book_service::all_books_hydrated(&txn).await?;
    txn.commit().await?;

    let result = recommend_from(books);
    tracing::info!(
        "Recommending {} of the unread catalog (completed={}, favorites={:?})",
        result.recommendations.len(),
        result.user_reading_stats.completed_books,
        result.user_reading_stats.favorite_genres
    );
    Ok(result)
}

fn recommend_from(books: Vec<Book>) -> Recommendations {
    let mut completed = Vec::new();
    let mut candidates = Vec::new();
    for book in books {
        match book.reading_status.as_str() {
            "completed" => completed.push(book),
            "unread" => candidates.push(book),
            _ => {}
        }
    }

    let favorites = favorite_genres(&completed);
    rank_candidates(&mut candidates, &favorites);
    candidates.truncate(RECOMMENDATION_LIMIT);

    Recommendations {
        recommendations: candidates,
        user_reading_stats: UserReadingStats {
            completed_books: completed.len(),
            favorite_genres: favorites,
        },
    }
}

/// Top genre names across completed books, by attachment count.
/// Ties break toward the genre seen first; completed books arrive in
/// insertion order, genres in attachment order.
fn favorite_genres(completed: &[Book]) -> Vec<String> {
    let mut first_seen: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for book in completed {
        for genre in &book.genres {
            if !counts.contains_key(&genre.name) {
                first_seen.push(genre.name.clone());
            }
            *counts.entry(genre.name.clone()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(usize, String)> = first_seen.into_iter().enumerate().collect();
    ranked.sort_by(|(ai, an), (bi, bn)| counts[bn].cmp(&counts[an]).then(ai.cmp(bi)));
    ranked.truncate(FAVORITE_GENRE_LIMIT);
    ranked.into_iter().map(|(_, name)| name).collect()
}

/// Order candidates best-first. With an affinity profile the key is
/// (favorite-genre overlap, rating, publication year) compared
/// lexicographically, id ascending as the final tie-break. With no
/// profile (cold start) only rating and id apply.
fn rank_candidates(candidates: &mut [Book], favorites: &[String]) {
    if favorites.is_empty() {
        candidates.sort_by(|a, b| {
            b.rating
                .unwrap_or(0)
                .cmp(&a.rating.unwrap_or(0))
                .then_with(|| a.id.cmp(&b.id))
        });
        return;
    }

    let favorite_set: HashSet<&str> = favorites.iter().map(String::as_str).collect();
    let score = |book: &Book| {
        let overlap = book
            .genres
            .iter()
            .filter(|g| favorite_set.contains(g.name.as_str()))
            .count();
        (
            overlap,
            book.rating.unwrap_or(0),
            book.publication_year.unwrap_or(i32::MIN),
        )
    };

    candidates.sort_by(|a, b| score(b).cmp(&score(a)).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::NamedRef;

    fn book(id: i32, status: &str, rating: Option<i32>, year: Option<i32>, genres: &[&str]) -> Book {
        Book {
            id,
            title: format!("Book {}", id),
            isbn: None,
            publication_year: year,
            pages: None,
            language: None,
            description: None,
            reading_status: status.to_string(),
            current_page: 0,
            rating,
            notes: None,
            series_position: None,
            date_started: None,
            date_completed: None,
            publisher_id: 1,
            series_id: None,
            category_id: None,
            publisher: NamedRef {
                id: 1,
                name: "Test House".to_string(),
            },
            authors: Vec::new(),
            genres: genres
                .iter()
                .enumerate()
                .map(|(index, name)| NamedRef {
                    id: index as i32 + 1,
                    name: (*name).to_string(),
                })
                .collect(),
            series: None,
            category: None,
        }
    }

    #[test]
    fn favorite_genres_ranks_by_count_then_first_seen() {
        let completed = vec![
            book(1, "completed", None, None, &["Fantasy", "Classic"]),
            book(2, "completed", None, None, &["Fantasy", "SciFi"]),
            book(3, "completed", None, None, &["Horror", "Romance"]),
        ];
        // Fantasy: 2. Classic/SciFi/Horror/Romance: 1 each, Classic first.
        assert_eq!(favorite_genres(&completed), vec!["Fantasy", "Classic", "SciFi"]);
    }

    #[test]
    fn favorite_genres_empty_without_completed_books() {
        assert!(favorite_genres(&[]).is_empty());
    }

    #[test]
    fn genre_overlap_outranks_rating() {
        let result = recommend_from(vec![
            book(1, "completed", None, None, &["Fantasy"]),
            book(2, "completed", None, None, &["Fantasy"]),
            book(3, "completed", None, None, &["SciFi"]),
            book(10, "unread", Some(5), Some(2020), &["Biography"]),
            book(11, "unread", Some(2), Some(1960), &["Fantasy"]),
        ]);
        let ids: Vec<i32> = result.recommendations.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![11, 10]);
        assert_eq!(result.user_reading_stats.completed_books, 3);
        assert_eq!(
            result.user_reading_stats.favorite_genres,
            vec!["Fantasy", "SciFi"]
        );
    }

    #[test]
    fn rating_breaks_overlap_ties_then_year_then_id() {
        let result = recommend_from(vec![
            book(1, "completed", None, None, &["Fantasy"]),
            book(10, "unread", Some(3), Some(1990), &["Fantasy"]),
            book(11, "unread", Some(5), Some(1950), &["Fantasy"]),
            book(12, "unread", Some(3), Some(2005), &["Fantasy"]),
            book(13, "unread", Some(3), Some(2005), &["Fantasy"]),
        ]);
        let ids: Vec<i32> = result.recommendations.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![11, 12, 13, 10]);
    }

    #[test]
    fn cold_start_ranks_by_rating_then_id() {
        let result = recommend_from(vec![
            book(10, "unread", Some(2), Some(2024), &["Fantasy"]),
            book(11, "unread", Some(5), None, &[]),
            book(12, "unread", None, Some(1999), &["SciFi"]),
            book(13, "unread", Some(5), Some(1900), &[]),
        ]);
        assert!(result.user_reading_stats.favorite_genres.is_empty());
        assert_eq!(result.user_reading_stats.completed_books, 0);
        let ids: Vec<i32> = result.recommendations.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![11, 13, 10, 12]);
    }

    #[test]
    fn candidates_without_genres_stay_eligible() {
        let result = recommend_from(vec![
            book(1, "completed", None, None, &["Fantasy"]),
            book(10, "unread", Some(4), None, &[]),
        ]);
        let ids: Vec<i32> = result.recommendations.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![10]);
    }

    #[test]
    fn only_unread_books_are_candidates() {
        let result = recommend_from(vec![
            book(1, "completed", None, None, &["Fantasy"]),
            book(2, "reading", Some(5), None, &["Fantasy"]),
            book(3, "abandoned", Some(5), None, &["Fantasy"]),
            book(10, "unread", None, None, &["Fantasy"]),
        ]);
        let ids: Vec<i32> = result.recommendations.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![10]);
    }

    #[test]
    fn recommendations_cap_at_limit() {
        let mut books = vec![book(1, "completed", None, None, &["Fantasy"])];
        for id in 10..40 {
            books.push(book(id, "unread", None, None, &["Fantasy"]));
        }
        let result = recommend_from(books);
        assert_eq!(result.recommendations.len(), RECOMMENDATION_LIMIT);
        // Identical scores, so insertion order survives.
        assert_eq!(result.recommendations[0].id, 10);
    }
}
