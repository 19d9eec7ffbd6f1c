/*
 * Responsibility
 * - Movies の request/response DTO
 * - 必須項目の欠落・空文字は validate() で検出 (→ 422)
 * - id は encode 済みの公開 ID を返す (内部 ID を漏らさない)
 */
use serde::{Deserialize, Serialize};

// Fields are Option so a missing key becomes a 422 from validate(), not a body rejection.
#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title: Option<String>,
    pub release_date: Option<String>,
}

impl CreateMovieRequest {
    pub fn validate(&self) -> Result<(&str, &str), &'static str> {
        let title = match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title,
            _ => return Err("title is required"),
        };
        let release_date = match self.release_date.as_deref().map(str::trim) {
            Some(date) if !date.is_empty() => date,
            _ => return Err("release_date is required"),
        };

        Ok((title, release_date))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub release_date: Option<String>,
}

impl UpdateMovieRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.is_none() && self.release_date.is_none() {
            return Err("nothing to update: provide title and/or release_date");
        }
        if let Some(title) = &self.title
            && title.trim().is_empty()
        {
            return Err("title cannot be empty");
        }
        if let Some(date) = &self.release_date
            && date.trim().is_empty()
        {
            return Err("release_date cannot be empty");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub id: String, // encoded
    pub title: String,
    pub release_date: String,
}

#[derive(Debug, Serialize)]
pub struct MovieEnvelope {
    pub movie: MovieResponse,
}

#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<MovieResponse>,
}
