use crate::movie::MovieRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, ParseMode, UserId};
use unicode_segmentation::UnicodeSegmentation;

/* ====== Отправка в Telegram ====== */

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("telegram: request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("telegram: unexpected status {status} -> {body}")]
    Status { status: reqwest::StatusCode, body: String },
}

#[derive(Clone)]
pub struct TelegramNotifier {
    base_url: String,
    token: String,
    http: Client,
}

/// https://core.telegram.org/bots/api#sendmessage
#[derive(Serialize, Debug)]
struct SendMessage<'a> {
    chat_id: ChatId,
    text: &'a str,
    parse_mode: ParseMode,
}

impl TelegramNotifier {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, http: Client) -> Self {
        Self { base_url: base_url.into(), token: token.into(), http }
    }

    /// Одна попытка; всё, кроме 200, — ошибка со статусом и телом ответа.
    pub async fn send_movie(
        &self,
        chat_id: ChatId,
        movie: &MovieRecord,
    ) -> Result<(), NotifyError> {
        let text = render_movie(movie);
        let body = SendMessage { chat_id, text: &text, parse_mode: ParseMode::Html };
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);

        let resp = self.http.post(url).json(&body).send().await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await?;
            return Err(NotifyError::Status { status, body });
        }
        Ok(())
    }
}

/* ====== Входящий webhook ======
   https://core.telegram.org/bots/api#update
   Разбираем только то, что нужно, остальное игнорируем. */

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct Update {
    #[serde(default)]
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct IncomingMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub chat: Option<ChatRef>,
    #[serde(default)]
    pub from: Option<Sender>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct ChatRef {
    pub id: ChatId,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Sender {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
}

impl Update {
    pub fn text(&self) -> &str {
        self.message.as_ref().and_then(|m| m.text.as_deref()).unwrap_or("")
    }

    pub fn chat_id(&self) -> Option<ChatId> {
        self.message.as_ref().and_then(|m| m.chat).map(|c| c.id)
    }
}

static HELLO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)hello").expect("static regex"));

/// Просят фильм, если в сообщении есть «hello» в любом регистре.
pub fn wants_movie(text: &str) -> bool {
    HELLO.is_match(text)
}

/* ====== Шаблон сообщения ======
   Telegram режет по 4096 UTF-16 единицам видимого текста (после разбора HTML),
   поэтому всё меряем в UTF-16, а сюжет получает то, что осталось. */

const MESSAGE_LIMIT: usize = 4096;
const PLOT_LIMIT: usize = 1500;
const NOTES_LIMIT: usize = 800;
const SHORT_LIMIT: usize = 300;
const YEAR_LIMIT: usize = 16;
const POSTER_URL_LIMIT: usize = 2048;

/// Собирает HTML и считает длину видимого текста.
#[derive(Default)]
struct Html {
    out: String,
    visible: usize,
}

impl Html {
    fn tag(&mut self, markup: &str) -> &mut Self {
        self.out.push_str(markup);
        self
    }

    fn text(&mut self, s: &str) -> &mut Self {
        self.visible += utf16_len(s);
        self.out.push_str(&html_escape(s));
        self
    }
}

/// HTML для parse_mode=HTML. Пустые поля пропускаем.
pub fn render_movie(m: &MovieRecord) -> String {
    let title = if m.title.trim().is_empty() { "Untitled" } else { m.title.as_str() };

    let mut head = Html::default();
    head.tag("<b>").text(&clip(title, SHORT_LIMIT)).tag("</b>");
    if !m.year.trim().is_empty() {
        head.text(&format!(" ({})", clip(&m.year, YEAR_LIMIT)));
    }
    head.text("\n");

    let facts = [
        ("Director", &m.director),
        ("Cast", &m.actors),
        ("Runtime", &m.runtime),
        ("IMDb rating", &m.imdb_rating),
    ];
    for (label, value) in facts {
        if !value.trim().is_empty() {
            head.text("\n").tag("<b>").text(&format!("{label}:")).tag("</b>");
            head.text(" ").text(&clip(value, SHORT_LIMIT));
        }
    }

    let mut tail = Html::default();
    if !m.notes.trim().is_empty() {
        tail.text("\n\n").tag("<i>").text(&clip(&m.notes, NOTES_LIMIT)).tag("</i>");
    }
    if m.poster.starts_with("http") && m.poster.len() <= POSTER_URL_LIMIT {
        tail.text("\n\n").tag(&format!("<a href=\"{}\">", html_escape(&m.poster)));
        tail.text("Poster").tag("</a>");
    }

    let mut out = head.out;
    if !m.plot.trim().is_empty() {
        let sep = "\n\n";
        let room = MESSAGE_LIMIT.saturating_sub(head.visible + tail.visible + utf16_len(sep));
        let plot = clip(&m.plot, PLOT_LIMIT.min(room));
        if !plot.is_empty() {
            out.push_str(sep);
            out.push_str(&html_escape(&plot));
        }
    }
    out.push_str(&tail.out);
    out
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Обрезка по графемам, чтобы не разрезать эмодзи и составные символы.
/// `max` — в UTF-16 единицах, вместе с «…».
fn clip(s: &str, max: usize) -> String {
    if utf16_len(s) <= max {
        return s.to_string();
    }
    let budget = max.saturating_sub(1);
    let mut head = String::new();
    let mut used = 0;
    for g in s.graphemes(true) {
        let len = utf16_len(g);
        if used + len > budget {
            break;
        }
        used += len;
        head.push_str(g);
    }
    if max == 0 { head } else { head + "…" }
}
