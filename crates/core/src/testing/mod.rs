//! Testing utilities and a mock backend for integration tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use subhound_core::testing::{fixtures, MockBackend};
//!
//! let backend = MockBackend::new()
//!     .with_tier(TierKind::Fingerprint, vec![fixtures::subtitle("1", "en")]);
//!
//! let results = search(criteria, &backend).await?;
//! ```

mod mock_backend;

pub use mock_backend::{MockBackend, RecordedSubmission};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::search::RawCandidate;

    /// A well-formed subtitle record with neutral defaults.
    ///
    /// No hash, size or fps, an anonymous uploader and 100 downloads, so it
    /// scores zero unless the test sets something.
    pub fn subtitle(id: &str, language: &str) -> RawCandidate {
        RawCandidate {
            id_subtitle: Some(id.to_string()),
            id_subtitle_file: Some(format!("{}00", id)),
            iso639: Some(language.to_string()),
            language_name: Some(language.to_uppercase()),
            sub_downloads_cnt: Some("100".to_string()),
            movie_release_name: Some(String::new()),
            sub_file_name: Some(format!("{}.srt", id)),
            sub_format: Some("srt".to_string()),
            sub_encoding: Some("UTF-8".to_string()),
            user_rank: Some(String::new()),
            movie_hash: Some("0".to_string()),
            movie_byte_size: Some("0".to_string()),
            movie_fps: Some("0".to_string()),
            id_movie_imdb: Some("133093".to_string()),
            series_imdb_parent: Some("0".to_string()),
            series_season: Some("0".to_string()),
            series_episode: Some("0".to_string()),
            sub_download_link: Some(format!(
                "https://dl.example.org/{}/download/file/{}00.gz",
                language, id
            )),
            sub_add_date: Some("2012-05-20 13:45:00".to_string()),
        }
    }

    /// A subtitle for an exact file, matched by movie hash and byte size.
    pub fn hashed_subtitle(id: &str, language: &str, hash: &str, byte_size: u64) -> RawCandidate {
        RawCandidate {
            movie_hash: Some(hash.to_string()),
            movie_byte_size: Some(byte_size.to_string()),
            ..subtitle(id, language)
        }
    }

    /// A subtitle whose release and file names are `release`.
    pub fn release_subtitle(id: &str, language: &str, release: &str) -> RawCandidate {
        RawCandidate {
            movie_release_name: Some(release.to_string()),
            sub_file_name: Some(format!("{}.srt", release)),
            ..subtitle(id, language)
        }
    }

    /// A subtitle for one episode of a series.
    pub fn episode_subtitle(
        id: &str,
        language: &str,
        series_imdb: u32,
        season: u32,
        episode: u32,
    ) -> RawCandidate {
        RawCandidate {
            id_movie_imdb: Some((series_imdb + 1000 + episode).to_string()),
            series_imdb_parent: Some(series_imdb.to_string()),
            series_season: Some(season.to_string()),
            series_episode: Some(episode.to_string()),
            ..subtitle(id, language)
        }
    }

    /// Set the download count of a record.
    pub fn with_downloads(mut record: RawCandidate, downloads: u64) -> RawCandidate {
        record.sub_downloads_cnt = Some(downloads.to_string());
        record
    }

    /// Set the uploader rank of a record.
    pub fn with_rank(mut record: RawCandidate, rank: &str) -> RawCandidate {
        record.user_rank = Some(rank.to_string());
        record
    }
}
