use crate::error::{get_json, UpstreamError};
use crate::movie::MovieRecord;
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "omdb";

/// OMDb отдаёт "N/A" вместо отсутствующего значения.
const NOT_AVAILABLE: &str = "N/A";

#[derive(Clone)]
pub struct OmdbClient {
    base_url: String,
    api_key: String,
    http: Client,
}

/// Результат поиска по названию.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Metadata),
    Miss { reason: String },
}

impl OmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, http: Client) -> Self {
        Self { base_url: base_url.into(), api_key: api_key.into(), http }
    }

    /// Поиск по точному названию (`t=`), без уточнений по году/типу.
    pub async fn lookup(&self, title: &str) -> Result<Lookup, UpstreamError> {
        let url = format!(
            "{}/?apikey={}&t={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(title)
        );
        let resp: LookupResp = get_json(&self.http, SERVICE, &url).await?;
        if resp.response.eq_ignore_ascii_case("false") {
            let reason = resp.error.unwrap_or_else(|| "no match".to_string());
            return Ok(Lookup::Miss { reason });
        }
        Ok(Lookup::Found(resp.metadata))
    }

    /// Второй проход: дописываем в фильм то, что знает OMDb.
    /// При промахе запись не трогаем, а промах возвращаем вызывающему.
    pub async fn enrich(&self, movie: &mut MovieRecord) -> Result<Lookup, UpstreamError> {
        if movie.title.trim().is_empty() {
            return Ok(Lookup::Miss { reason: "submission has no title".to_string() });
        }
        let found = self.lookup(&movie.title).await?;
        if let Lookup::Found(meta) = &found {
            meta.apply(movie);
        }
        Ok(found)
    }
}

/* ======= DTOs ======= */

#[derive(Deserialize, Debug)]
struct LookupResp {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(flatten)]
    metadata: Metadata,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Metadata {
    pub title: Option<String>,
    pub year: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub runtime: Option<String>,
    pub poster: Option<String>,
    pub plot: Option<String>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
}

impl Metadata {
    /// Переписываем только поля, для которых OMDb дал настоящее значение.
    pub fn apply(&self, movie: &mut MovieRecord) {
        let pairs = [
            (&self.title, &mut movie.title),
            (&self.year, &mut movie.year),
            (&self.director, &mut movie.director),
            (&self.actors, &mut movie.actors),
            (&self.runtime, &mut movie.runtime),
            (&self.poster, &mut movie.poster),
            (&self.plot, &mut movie.plot),
            (&self.imdb_rating, &mut movie.imdb_rating),
        ];
        for (src, dst) in pairs {
            if let Some(v) = src.as_deref().map(str::trim) {
                if !v.is_empty() && v != NOT_AVAILABLE {
                    *dst = v.to_string();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn stalker_json() -> serde_json::Value {
        json!({
            "Title": "Stalker",
            "Year": "1979",
            "Rated": "Not Rated",
            "Runtime": "162 min",
            "Director": "Andrei Tarkovsky",
            "Actors": "Alisa Freyndlikh, Aleksandr Kaydanovskiy, Anatoliy Solonitsyn",
            "Plot": "A guide leads two men through an area known as the Zone.",
            "Poster": "https://m.media-amazon.com/images/stalker.jpg",
            "Ratings": [{ "Source": "Internet Movie Database", "Value": "8.0/10" }],
            "imdbRating": "8.0",
            "Response": "True"
        })
    }

    fn base_record() -> MovieRecord {
        MovieRecord {
            title: "Stalker".into(),
            director: "Tarkovsky".into(),
            notes: "bring tea".into(),
            ..Default::default()
        }
    }

    async fn server_with(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("apikey", "k"))
            .and(query_param("t", "Stalker"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn enrich_merges_metadata_and_keeps_notes() {
        let server = server_with(stalker_json()).await;
        let client = OmdbClient::new(server.uri(), "k", Client::new());

        let mut m = base_record();
        let res = client.enrich(&mut m).await.unwrap();
        assert!(matches!(res, Lookup::Found(_)));
        assert_eq!(m.director, "Andrei Tarkovsky");
        assert_eq!(m.runtime, "162 min");
        assert_eq!(m.imdb_rating, "8.0");
        assert_eq!(m.poster, "https://m.media-amazon.com/images/stalker.jpg");
        assert_eq!(m.notes, "bring tea");
    }

    #[tokio::test]
    async fn enrich_is_idempotent() {
        let server = server_with(stalker_json()).await;
        let client = OmdbClient::new(server.uri(), "k", Client::new());

        let mut once = base_record();
        client.enrich(&mut once).await.unwrap();
        let mut twice = once.clone();
        client.enrich(&mut twice).await.unwrap();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn miss_leaves_record_untouched() {
        let server = server_with(json!({ "Response": "False", "Error": "Movie not found!" })).await;
        let client = OmdbClient::new(server.uri(), "k", Client::new());

        let mut m = base_record();
        let res = client.enrich(&mut m).await.unwrap();
        assert_eq!(res, Lookup::Miss { reason: "Movie not found!".into() });
        assert_eq!(m, base_record());
    }

    #[tokio::test]
    async fn empty_title_is_not_looked_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(stalker_json()))
            .expect(0)
            .mount(&server)
            .await;
        let client = OmdbClient::new(server.uri(), "k", Client::new());

        let mut m = MovieRecord::default();
        let res = client.enrich(&mut m).await.unwrap();
        assert!(matches!(res, Lookup::Miss { .. }));
        assert_eq!(m, MovieRecord::default());
    }

    #[test]
    fn placeholders_do_not_clear_fields() {
        let meta = Metadata {
            director: Some("N/A".into()),
            plot: Some(String::new()),
            runtime: Some("94 min".into()),
            ..Default::default()
        };
        let mut m = base_record();
        meta.apply(&mut m);
        assert_eq!(m.director, "Tarkovsky");
        assert_eq!(m.plot, "");
        assert_eq!(m.runtime, "94 min");
    }
}
