use crate::error::UpstreamError;
use crate::jotform::{JotformClient, Submission};
use crate::movie::MovieRecord;
use crate::omdb::{Lookup, OmdbClient};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};

/// Сборка списка фильмов: анкеты из JotForm + данные из OMDb.
#[derive(Clone)]
pub struct Catalog {
    jotform: JotformClient,
    omdb: OmdbClient,
    picker: Arc<Picker>,
}

impl Catalog {
    pub fn new(jotform: JotformClient, omdb: OmdbClient, picker: Arc<Picker>) -> Self {
        Self { jotform, omdb, picker }
    }

    /// Все анкеты по порядку JotForm, каждая дополнена из OMDb.
    /// Если OMDb не ответил для одной анкеты, оставляем её как есть и идём дальше.
    pub async fn all(&self) -> Result<Vec<MovieRecord>, UpstreamError> {
        let submissions = self.jotform.fetch_submissions().await?;
        let mut movies = Vec::with_capacity(submissions.len());
        for s in &submissions {
            movies.push(self.build(s).await);
        }
        Ok(movies)
    }

    /// Случайная анкета, дополненная из OMDb. `None`, если анкет нет.
    /// Ошибка OMDb, как и в `all`, не мешает отдать данные из анкеты.
    pub async fn random(&self) -> Result<Option<MovieRecord>, UpstreamError> {
        let submissions = self.jotform.fetch_submissions().await?;
        let Some(s) = self.picker.pick(&submissions) else {
            return Ok(None);
        };
        Ok(Some(self.build(s).await))
    }

    async fn build(&self, s: &Submission) -> MovieRecord {
        let mut movie = s.to_movie();
        match self.omdb.enrich(&mut movie).await {
            Ok(found) => log_lookup(&movie.title, found),
            Err(err) => tracing::warn!(
                title = %movie.title,
                error = %err,
                "enrichment failed, keeping form data"
            ),
        }
        movie
    }
}

fn log_lookup(title: &str, found: Lookup) {
    if let Lookup::Miss { reason } = found {
        tracing::info!(%title, %reason, "no metadata for movie");
    }
}

/// Один генератор на весь процесс, засевается при старте.
pub struct Picker {
    rng: Mutex<StdRng>,
}

impl Picker {
    pub fn from_entropy() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    pub fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.rng.lock().unwrap_or_else(PoisonError::into_inner).gen_range(0..items.len());
        items.get(idx)
    }
}
