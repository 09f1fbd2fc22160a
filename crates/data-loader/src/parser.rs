//! Parser for the TMDB 5000 CSV files.
//!
//! - tmdb_5000_movies.csv: one row per movie, list-valued columns
//!   (genres, keywords, production_companies) hold JSON arrays of
//!   `{"id": .., "name": ..}` objects
//! - tmdb_5000_credits.csv: movie_id, title, cast, crew; cast and crew are
//!   JSON arrays as well
//!
//! Rows are read as raw strings first and converted field by field so that
//! every failure carries the file and line it came from.

use crate::error::{DataLoadError, Result};
use crate::types::{Movie, MovieId};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const MOVIES_FILE: &str = "tmdb_5000_movies.csv";
pub const CREDITS_FILE: &str = "tmdb_5000_credits.csv";

/// Cast and director for one movie, taken from the credits file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credits {
    /// Cast names in billing order
    pub cast: Vec<String>,
    pub director: Option<String>,
}

/// One row of the movies file, all columns as text.
///
/// Columns we don't use (budget, homepage, tagline, ...) are ignored by serde.
#[derive(Debug, Deserialize)]
struct RawMovieRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    release_date: String,
    #[serde(default)]
    runtime: String,
    #[serde(default)]
    vote_average: String,
    #[serde(default)]
    vote_count: String,
    #[serde(default)]
    popularity: String,
    #[serde(default)]
    genres: String,
    #[serde(default)]
    keywords: String,
    #[serde(default)]
    production_companies: String,
}

#[derive(Debug, Deserialize)]
struct RawCreditsRow {
    #[serde(default)]
    movie_id: String,
    #[serde(default)]
    cast: String,
    #[serde(default)]
    crew: String,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CastEntry {
    name: String,
    #[serde(default)]
    order: u32,
}

#[derive(Debug, Deserialize)]
struct CrewEntry {
    name: String,
    #[serde(default)]
    job: String,
}

/// Where a field came from, for error messages
#[derive(Debug, Clone, Copy)]
struct RowContext {
    file: &'static str,
    line: u64,
}

impl RowContext {
    fn error(&self, reason: impl Into<String>) -> DataLoadError {
        DataLoadError::ParseError {
            file: self.file.to_string(),
            line: self.line,
            reason: reason.into(),
        }
    }

    fn parse_id(&self, field: &str, raw: &str) -> Result<MovieId> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DataLoadError::ValidationError(format!(
                "{} line {}: missing {}",
                self.file, self.line, field
            )));
        }
        raw.parse()
            .map_err(|e| self.error(format!("Invalid {}: {}", field, e)))
    }

    /// Optional numeric column: blank means "absent"
    fn parse_optional<T: std::str::FromStr>(&self, field: &str, raw: &str) -> Result<Option<T>>
    where
        T::Err: std::fmt::Display,
    {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse()
            .map(Some)
            .map_err(|e| self.error(format!("Invalid {}: {}", field, e)))
    }

    fn parse_date(&self, raw: &str) -> Result<Option<NaiveDate>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| self.error(format!("Invalid release_date '{}': {}", raw, e)))
    }

    /// Decode a JSON array column. Blank cells are an empty list.
    fn parse_json_list<T: for<'de> Deserialize<'de>>(&self, field: &str, raw: &str) -> Result<Vec<T>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(raw).map_err(|e| self.error(format!("Malformed {} column: {}", field, e)))
    }

    fn parse_names(&self, field: &str, raw: &str) -> Result<Vec<String>> {
        let entries: Vec<NamedEntry> = self.parse_json_list(field, raw)?;
        Ok(entries
            .into_iter()
            .map(|e| e.name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect())
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(csv::ReaderBuilder::new().flexible(false).from_path(path)?)
}

/// Parse the movies file
///
/// Credits fields (`cast`, `director`) are left empty; they are joined in by
/// `DataIndex::load_from_files`.
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();
    let mut movies = Vec::new();

    for record in reader.records() {
        let record = record?;
        let ctx = RowContext {
            file: MOVIES_FILE,
            line: record.position().map(|p| p.line()).unwrap_or(0),
        };
        let row: RawMovieRow = record
            .deserialize(Some(&headers))
            .map_err(|e| ctx.error(e.to_string()))?;

        movies.push(movie_from_row(row, ctx)?);
    }

    Ok(movies)
}

fn movie_from_row(row: RawMovieRow, ctx: RowContext) -> Result<Movie> {
    let id = ctx.parse_id("id", &row.id)?;

    let title = row.title.trim();
    if title.is_empty() {
        return Err(DataLoadError::ValidationError(format!(
            "{} line {}: movie {} has no title",
            ctx.file, ctx.line, id
        )));
    }

    let overview = Some(row.overview.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let vote_average: f32 = ctx.parse_optional("vote_average", &row.vote_average)?.unwrap_or(0.0);
    if !(0.0..=10.0).contains(&vote_average) {
        return Err(DataLoadError::InvalidValue {
            field: "vote_average".to_string(),
            value: vote_average.to_string(),
        });
    }

    Ok(Movie {
        id,
        title: title.to_string(),
        overview,
        release_date: ctx.parse_date(&row.release_date)?,
        runtime: ctx.parse_optional("runtime", &row.runtime)?,
        vote_average,
        vote_count: ctx.parse_optional("vote_count", &row.vote_count)?.unwrap_or(0),
        popularity: ctx.parse_optional("popularity", &row.popularity)?.unwrap_or(0.0),
        genres: ctx.parse_names("genres", &row.genres)?,
        keywords: ctx.parse_names("keywords", &row.keywords)?,
        cast: Vec::new(),
        director: None,
        production_companies: ctx.parse_names("production_companies", &row.production_companies)?,
    })
}

/// Parse the credits file into a map keyed by movie id
pub fn parse_credits(path: &Path) -> Result<HashMap<MovieId, Credits>> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();
    let mut credits = HashMap::new();

    for record in reader.records() {
        let record = record?;
        let ctx = RowContext {
            file: CREDITS_FILE,
            line: record.position().map(|p| p.line()).unwrap_or(0),
        };
        let row: RawCreditsRow = record
            .deserialize(Some(&headers))
            .map_err(|e| ctx.error(e.to_string()))?;

        let movie_id = ctx.parse_id("movie_id", &row.movie_id)?;
        credits.insert(movie_id, credits_from_row(&row, ctx)?);
    }

    Ok(credits)
}

fn credits_from_row(row: &RawCreditsRow, ctx: RowContext) -> Result<Credits> {
    let mut cast: Vec<CastEntry> = ctx.parse_json_list("cast", &row.cast)?;
    // Stable sort keeps file order for equal billing positions
    cast.sort_by_key(|entry| entry.order);

    let crew: Vec<CrewEntry> = ctx.parse_json_list("crew", &row.crew)?;
    let director = crew
        .into_iter()
        .find(|member| member.job == "Director")
        .map(|member| member.name.trim().to_string())
        .filter(|name| !name.is_empty());

    Ok(Credits {
        cast: cast
            .into_iter()
            .map(|entry| entry.name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect(),
        director,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MOVIES_CSV: &str = "\
budget,genres,homepage,id,keywords,original_language,original_title,overview,popularity,production_companies,production_countries,release_date,revenue,runtime,spoken_languages,status,tagline,title,vote_average,vote_count
237000000,\"[{\"\"id\"\": 28, \"\"name\"\": \"\"Action\"\"}, {\"\"id\"\": 878, \"\"name\"\": \"\"Science Fiction\"\"}]\",http://www.avatarmovie.com/,19995,\"[{\"\"id\"\": 1463, \"\"name\"\": \"\"culture clash\"\"}]\",en,Avatar,\"In the 22nd century, a paraplegic Marine is dispatched to the moon Pandora.\",150.437577,\"[{\"\"name\"\": \"\"Ingenious Film Partners\"\", \"\"id\"\": 289}]\",[],2009-12-10,2787965087,162,[],Released,Enter the World of Pandora.,Avatar,7.2,11800
0,[],,4,[],en,Untitled,,0.5,[],[],,0,,[],Released,,Untitled,0,0
";

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_movies() {
        let file = write_temp(MOVIES_CSV);
        let movies = parse_movies(file.path()).unwrap();

        assert_eq!(movies.len(), 2);
        let avatar = &movies[0];
        assert_eq!(avatar.id, 19995);
        assert_eq!(avatar.title, "Avatar");
        assert_eq!(avatar.genres, vec!["Action", "Science Fiction"]);
        assert_eq!(avatar.keywords, vec!["culture clash"]);
        assert_eq!(avatar.production_companies, vec!["Ingenious Film Partners"]);
        assert_eq!(avatar.vote_count, 11800);
        assert_eq!(avatar.year(), Some(2009));
        assert_eq!(avatar.runtime, Some(162.0));
    }

    #[test]
    fn test_optional_fields_may_be_blank() {
        let file = write_temp(MOVIES_CSV);
        let movies = parse_movies(file.path()).unwrap();

        let untitled = &movies[1];
        assert!(untitled.overview.is_none());
        assert!(untitled.release_date.is_none());
        assert!(untitled.runtime.is_none());
        assert!(untitled.genres.is_empty());
    }

    #[test]
    fn test_missing_title_is_a_validation_error() {
        let csv = "id,title,vote_average\n7,,5.0\n";
        let file = write_temp(csv);
        let result = parse_movies(file.path());
        assert!(matches!(result, Err(DataLoadError::ValidationError(_))));
    }

    #[test]
    fn test_bad_id_reports_line() {
        let csv = "id,title\n1,Fine\nabc,Broken\n";
        let file = write_temp(csv);
        match parse_movies(file.path()) {
            Err(DataLoadError::ParseError { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_column() {
        let csv = "id,title,genres\n1,Fine,\"[{not json\"\n";
        let file = write_temp(csv);
        assert!(matches!(
            parse_movies(file.path()),
            Err(DataLoadError::ParseError { .. })
        ));
    }

    #[test]
    fn test_parse_credits_orders_cast_and_finds_director() {
        let csv = "\
movie_id,title,cast,crew
19995,Avatar,\"[{\"\"name\"\": \"\"Zoe Saldana\"\", \"\"order\"\": 1}, {\"\"name\"\": \"\"Sam Worthington\"\", \"\"order\"\": 0}]\",\"[{\"\"name\"\": \"\"Jon Landau\"\", \"\"job\"\": \"\"Producer\"\"}, {\"\"name\"\": \"\"James Cameron\"\", \"\"job\"\": \"\"Director\"\"}]\"
";
        let file = write_temp(csv);
        let credits = parse_credits(file.path()).unwrap();

        let avatar = &credits[&19995];
        assert_eq!(avatar.cast, vec!["Sam Worthington", "Zoe Saldana"]);
        assert_eq!(avatar.director.as_deref(), Some("James Cameron"));
    }

    #[test]
    fn test_missing_file() {
        let result = parse_movies(Path::new("definitely/not/here.csv"));
        assert!(matches!(result, Err(DataLoadError::FileNotFound { .. })));
    }
}
