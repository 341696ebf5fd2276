#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use vlr_pipeline::error::{Result, VlrError};
use vlr_pipeline::extract::maps::MAP_NAV_SELECTOR;
use vlr_pipeline::{PageElement, PageSession, SessionFactory, TeamEntry};

pub const BASE_URL: &str = "https://vlr.test";

/// One scripted page: what it renders and how its map tabs change the view.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub body: String,
    pub title: String,
    pub source: String,
    pub elements: HashMap<String, Vec<PageElement>>,
    /// Visible text per `data-game-id`, shown after that tab is activated.
    pub map_views: HashMap<String, String>,
}

impl FakePage {
    pub fn with_elements(mut self, selector: &str, elements: Vec<PageElement>) -> Self {
        self.elements.insert(selector.to_string(), elements);
        self
    }

    pub fn with_map(mut self, game_id: &str, label: &str, view: &str) -> Self {
        self.elements
            .entry(MAP_NAV_SELECTOR.to_string())
            .or_default()
            .push(map_tab(game_id, label, false));
        self.map_views.insert(game_id.to_string(), view.to_string());
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeSite {
    pub pages: HashMap<String, FakePage>,
    /// Pages whose load never completes.
    pub stalled: HashSet<String>,
    /// Every `open` and `activate` call, in order.
    pub log: Mutex<Vec<String>>,
}

impl FakeSite {
    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn stall(mut self, url: &str) -> Self {
        self.stalled.insert(url.to_string());
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

pub struct FakeSession {
    site: Arc<FakeSite>,
    current: Option<String>,
    active_game: Option<String>,
}

impl FakeSession {
    pub fn new(site: Arc<FakeSite>) -> Self {
        Self {
            site,
            current: None,
            active_game: None,
        }
    }

    fn page(&self) -> Result<&FakePage> {
        self.current
            .as_ref()
            .and_then(|url| self.site.pages.get(url))
            .ok_or(VlrError::NoPage)
    }
}

impl PageSession for FakeSession {
    async fn open(&mut self, url: &str) -> Result<()> {
        self.site.log.lock().unwrap().push(format!("open {url}"));
        if self.site.stalled.contains(url) {
            std::future::pending::<()>().await;
        }
        if !self.site.pages.contains_key(url) {
            return Err(VlrError::UnexpectedStatus {
                url: url.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            });
        }
        self.current = Some(url.to_string());
        self.active_game = None;
        Ok(())
    }

    fn body_text(&self) -> Result<String> {
        let page = self.page()?;
        Ok(match &self.active_game {
            Some(id) => page.map_views.get(id).cloned().unwrap_or_default(),
            None => page.body.clone(),
        })
    }

    fn page_source(&self) -> Result<String> {
        Ok(self.page()?.source.clone())
    }

    fn title(&self) -> Result<String> {
        Ok(self.page()?.title.clone())
    }

    fn elements(&self, selector: &str) -> Result<Vec<PageElement>> {
        Ok(self.page()?.elements.get(selector).cloned().unwrap_or_default())
    }

    async fn activate(&mut self, element: &PageElement) -> Result<()> {
        let id = element
            .attr("data-game-id")
            .ok_or_else(|| VlrError::Interaction("element is not a map tab".to_string()))?
            .to_string();
        self.site.log.lock().unwrap().push(format!("activate {id}"));
        self.active_game = Some(id);
        Ok(())
    }
}

pub struct FakeFactory {
    pub site: Arc<FakeSite>,
}

impl SessionFactory for FakeFactory {
    type Session = FakeSession;

    fn create(&self) -> Result<FakeSession> {
        Ok(FakeSession::new(Arc::clone(&self.site)))
    }
}

/// A factory that can never hand out a session.
pub struct BrokenFactory;

impl SessionFactory for BrokenFactory {
    type Session = FakeSession;

    fn create(&self) -> Result<FakeSession> {
        Err(VlrError::Interaction("browser unavailable".to_string()))
    }
}

pub fn element(tag: &str, text: &str, attributes: &[(&str, &str)]) -> PageElement {
    PageElement {
        tag: tag.to_string(),
        text: text.to_string(),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        descendant_links: vec![],
    }
}

/// A match-history row rendered as a link.
pub fn match_row(href: &str, text: &str) -> PageElement {
    element("a", text, &[("href", href)])
}

pub fn map_tab(game_id: &str, label: &str, all_maps: bool) -> PageElement {
    let class = if all_maps {
        "vm-stats-gamesnav-item js-map-switch mod-all"
    } else {
        "vm-stats-gamesnav-item js-map-switch"
    };
    element("div", label, &[("class", class), ("data-game-id", game_id)])
}

pub fn history_url(team: &TeamEntry) -> String {
    team.matches_url(BASE_URL)
}
