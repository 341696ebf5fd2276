use ::scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use crate::config::PipelineConfig;
use crate::error::{Result, VlrError};
use crate::session::render::{TextRenderer, GAME_CLASS, GAME_ID_ATTR};
use crate::session::{PageElement, PageSession, SessionFactory};

/// A [`PageSession`] backed by plain HTTP fetches and static HTML parsing.
///
/// vlr.gg ships every map's stats in the initial markup and only toggles
/// visibility client-side, so switching map tabs is emulated by selecting
/// which `vm-stats-game` container renders.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> vlr_pipeline::Result<()> {
/// use vlr_pipeline::session::{HttpSession, PageSession};
///
/// let mut session = HttpSession::new();
/// session.open("https://www.vlr.gg/team/matches/2593/fnatic/").await?;
/// println!("{}", session.title()?);
/// # Ok(())
/// # }
/// ```
pub struct HttpSession {
    http: reqwest::Client,
    page: Option<LoadedPage>,
}

struct LoadedPage {
    source: String,
    active_game: Option<String>,
}

impl HttpSession {
    /// Create a new session with default client settings.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a session using the provided [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            http: client,
            page: None,
        }
    }

    fn page(&self) -> Result<&LoadedPage> {
        self.page.as_ref().ok_or(VlrError::NoPage)
    }

    fn document(&self) -> Result<(Html, Option<&str>)> {
        let page = self.page()?;
        Ok((Html::parse_document(&page.source), page.active_game.as_deref()))
    }
}

impl Default for HttpSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSession for HttpSession {
    #[instrument(skip(self))]
    async fn open(&mut self, url: &str) -> Result<()> {
        let source = fetch_page(&self.http, url).await?;
        self.page = Some(LoadedPage {
            source,
            active_game: None,
        });
        Ok(())
    }

    fn body_text(&self) -> Result<String> {
        let (document, active) = self.document()?;
        let body_selector = Selector::parse("body")?;
        let body = document
            .select(&body_selector)
            .next()
            .unwrap_or_else(|| document.root_element());
        Ok(TextRenderer::render(body, active))
    }

    fn page_source(&self) -> Result<String> {
        Ok(self.page()?.source.clone())
    }

    fn title(&self) -> Result<String> {
        let (document, _) = self.document()?;
        let title_selector = Selector::parse("title")?;
        Ok(document
            .select(&title_selector)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default())
    }

    fn elements(&self, selector: &str) -> Result<Vec<PageElement>> {
        let (document, active) = self.document()?;
        let selector = Selector::parse(selector)?;
        let link_selector = Selector::parse("a[href]")?;
        Ok(document
            .select(&selector)
            .map(|e| snapshot(e, active, &link_selector))
            .collect())
    }

    async fn activate(&mut self, element: &PageElement) -> Result<()> {
        let game_id = element
            .attr(GAME_ID_ATTR)
            .ok_or_else(|| VlrError::Interaction(format!("<{}> has no {GAME_ID_ATTR}", element.tag)))?
            .to_string();

        let (document, _) = self.document()?;
        let game_selector = Selector::parse(&format!("div.{GAME_CLASS}"))?;
        let exists = document
            .select(&game_selector)
            .any(|g| g.value().attr(GAME_ID_ATTR) == Some(game_id.as_str()));
        drop(document);
        if !exists {
            return Err(VlrError::ElementNotFound {
                context: "map stats container for activated tab",
            });
        }

        debug!(game_id, "switching map view");
        if let Some(page) = self.page.as_mut() {
            page.active_game = Some(game_id);
        }
        Ok(())
    }
}

fn snapshot(element: ElementRef<'_>, active: Option<&str>, link_selector: &Selector) -> PageElement {
    PageElement {
        tag: element.value().name().to_string(),
        text: TextRenderer::render(element, active),
        attributes: element
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        descendant_links: element
            .select(link_selector)
            .filter(|a| a.id() != element.id())
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect(),
    }
}

/// Fetch a URL and return the response body, failing on non-success statuses.
pub(crate) async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    debug!(url, "fetching page");

    let response = client.get(url).send().await.map_err(|e| VlrError::Http {
        url: url.to_owned(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(VlrError::UnexpectedStatus {
            url: url.to_owned(),
            status,
        });
    }

    response.text().await.map_err(|e| VlrError::ResponseBody {
        url: url.to_owned(),
        source: e,
    })
}

/// Hands out [`HttpSession`]s sharing one connection pool.
#[derive(Clone)]
pub struct HttpSessionFactory {
    http: reqwest::Client,
}

impl HttpSessionFactory {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| VlrError::Http {
                url: config.base_url.clone(),
                source: e,
            })?;
        Ok(Self { http })
    }
}

impl SessionFactory for HttpSessionFactory {
    type Session = HttpSession;

    fn create(&self) -> Result<HttpSession> {
        Ok(HttpSession::with_client(self.http.clone()))
    }
}
