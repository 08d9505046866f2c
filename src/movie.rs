use serde::{Deserialize, Serialize};

/// Фильм, как его отдаём наружу: сначала заполняется из анкеты, потом из OMDb.
/// Пустая строка означает «нет данных».
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub title: String,
    pub year: String,
    pub director: String,
    pub actors: String,
    pub runtime: String,
    pub poster: String,
    pub plot: String,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: String,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_public_key_names() {
        let m = MovieRecord {
            title: "Alien".into(),
            imdb_rating: "8.5".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["title"], "Alien");
        assert_eq!(v["imdbRating"], "8.5");
        assert_eq!(v["notes"], "");
        assert_eq!(v.as_object().unwrap().len(), 9);
    }
}
