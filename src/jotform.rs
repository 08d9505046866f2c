use crate::error::{get_json, UpstreamError};
use crate::movie::MovieRecord;
use reqwest::Client;
use serde::{de::IgnoredAny, Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

const SERVICE: &str = "jotform";

#[derive(Clone)]
pub struct JotformClient {
    base_url: String,
    form_id: String,
    api_key: String,
    http: Client,
}

impl JotformClient {
    pub fn new(
        base_url: impl Into<String>,
        form_id: impl Into<String>,
        api_key: impl Into<String>,
        http: Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            form_id: form_id.into(),
            api_key: api_key.into(),
            http,
        }
    }

    /// Все анкеты формы. Порядок — какой вернул JotForm.
    /// Анкету, которую не удалось разобрать, пропускаем с предупреждением.
    pub async fn fetch_submissions(&self) -> Result<Vec<Submission>, UpstreamError> {
        let url = format!(
            "{}/form/{}/submissions?apiKey={}",
            self.base_url,
            urlencoding::encode(&self.form_id),
            urlencoding::encode(&self.api_key)
        );
        let data: SubmissionsResp = get_json(&self.http, SERVICE, &url).await?;
        let total = data.content.len();
        let submissions: Vec<Submission> = data
            .content
            .into_iter()
            .enumerate()
            .filter_map(|(idx, raw)| match serde_json::from_value(raw) {
                Ok(s) => Some(s),
                Err(err) => {
                    tracing::warn!(idx, error = %err, "skipping malformed submission");
                    None
                }
            })
            .collect();
        tracing::debug!(total, kept = submissions.len(), "fetched submissions");
        Ok(submissions)
    }
}

/* ======= DTOs ======= */

#[derive(Deserialize, Debug)]
struct SubmissionsResp {
    #[serde(default)]
    content: Vec<Value>,
}

/// Одна анкета: id поля -> {подпись, ответ}.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Submission {
    #[serde(default)]
    pub answers: HashMap<String, Answer>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Answer {
    #[serde(default, deserialize_with = "lenient_label")]
    pub text: Option<Label>,
    #[serde(default)]
    pub answer: Option<AnswerValue>,
}

/// Подписи полей, которые мы понимаем. Всё остальное — `Other`.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Title,
    Director,
    Year,
    Notes,
    #[serde(other)]
    Other,
}

/// Подпись не строкой (число, объект) считаем незнакомой, а не ошибкой.
fn lenient_label<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Label>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        v => Some(serde_json::from_value(v).unwrap_or(Label::Other)),
    })
}

/// Ответ бывает строкой, а бывает объектом/массивом (адрес, чекбоксы и т.п.).
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Other(IgnoredAny),
}

impl Submission {
    /// Первый проход: название, режиссёр, год, заметки. Нестроковые ответы пропускаем.
    pub fn to_movie(&self) -> MovieRecord {
        let mut movie = MovieRecord::default();
        for a in self.answers.values() {
            let Some(AnswerValue::Text(value)) = &a.answer else { continue };
            let slot = match a.text {
                Some(Label::Title) => &mut movie.title,
                Some(Label::Director) => &mut movie.director,
                Some(Label::Year) => &mut movie.year,
                Some(Label::Notes) => &mut movie.notes,
                Some(Label::Other) | None => continue,
            };
            *slot = value.clone();
        }
        movie
    }
}
