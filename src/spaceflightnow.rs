use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::FetchError;

pub const SITE_URL: &str = "https://spaceflightnow.com/launch-schedule/";

const SITE_LABEL: &str = "Launch site:";
const TIME_LABEL: &str = "Launch time:";

// Page markup, one entry:
//
// <div class="datename">
//    <div class="launchdate">{date}</div>
//    <div class="mission">{mission}</div>
// </div>
// <div class="missiondata">
//    <span class="strong">Launch time:</span> {time}<br>
//    <span class="strong">Launch site:</span> {site}
// </div>
// <div class="missdescrip">
//    <p>{description}</p>
//    <p>Updated {last updated}</p>
// </div>
lazy_static! {
    static ref LAUNCH_SELECTOR: Selector = Selector::parse("div[class*='datename']").unwrap();
    static ref SITE_FILTER: Regex = Regex::new(r"(?i)(canaveral|kennedy|patrick)").unwrap();
}

/// One scraped schedule entry. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Launch {
    pub date: String,
    pub mission: String,
    pub site: String,
    pub time: String,
    pub description: String,
    pub last_updated: String,
}

impl Launch {
    /// Builds a launch from a `datename` entry node and the blocks that follow it.
    pub fn from_entry(entry: ElementRef) -> Self {
        let mut launch = Launch {
            date: extract(child_with_class(entry, "launchdate")),
            mission: extract(child_with_class(entry, "mission")),
            description: extract(description_paragraph(entry, 1)),
            last_updated: extract(description_paragraph(entry, 2)),
            ..Default::default()
        };

        if let Some(data) = following_divs_with_class(entry, "missiondata").next() {
            launch.site = text_after_label(data, SITE_LABEL);
            launch.time = text_after_label(data, TIME_LABEL);
        }

        launch
    }

    /// Whether the launch departs from one of the tracked Florida sites.
    pub fn is_tracked_site(&self) -> bool {
        SITE_FILTER.is_match(&self.site)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "date": self.date,
            "mission": self.mission,
            "site": self.site,
            "time": self.time,
            "description": self.description,
            "last_updated": self.last_updated,
        })
    }
}

/// Visible text of the matched element with whitespace collapsed, or an empty
/// string when nothing matched.
pub fn extract(element: Option<ElementRef>) -> String {
    element
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

/// Collapses whitespace runs to a single space and trims the ends.
///
/// Unicode whitespace such as non-breaking spaces counts as whitespace too.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_class(element: ElementRef, fragment: &str) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|class| class.contains(fragment))
}

fn child_with_class<'a>(parent: ElementRef<'a>, fragment: &str) -> Option<ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| has_class(*child, fragment))
}

fn following_divs_with_class<'a>(
    entry: ElementRef<'a>,
    fragment: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    entry
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == "div" && has_class(*el, fragment))
}

/// The `n`th (1-based) `<p>` child of the first following description block
/// that has one.
fn description_paragraph(entry: ElementRef, n: usize) -> Option<ElementRef> {
    following_divs_with_class(entry, "missdescrip").find_map(|block| {
        block
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "p")
            .nth(n - 1)
    })
}

/// Text node immediately following the `<span>` labelled `label` inside `block`.
fn text_after_label(block: ElementRef, label: &str) -> String {
    let span = block
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "span")
        .find(|span| span.text().collect::<String>().contains(label));

    span.and_then(|span| {
        span.next_siblings()
            .find_map(|node| node.value().as_text().map(|text| normalize_whitespace(text)))
    })
    .unwrap_or_default()
}

/// Extracts every launch entry from the page and keeps those at tracked sites,
/// in document order.
pub fn parse_launches(body: &str) -> Vec<Launch> {
    let document = Html::parse_document(body);
    let entries: Vec<ElementRef> = document.select(&LAUNCH_SELECTOR).collect();
    log::info!("Found {} launches", entries.len());

    entries
        .into_iter()
        .map(Launch::from_entry)
        .filter(Launch::is_tracked_site)
        .collect()
}

fn build_user_agent() -> HeaderMap {
    let custom_user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(custom_user_agent));
    headers
}

pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    let client = Client::builder()
        .default_headers(build_user_agent())
        .timeout(timeout)
        .build()?;
    Ok(client)
}

pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    Ok(response.text().await?)
}

/// Fetches the schedule page and returns the launches at tracked sites.
pub async fn scrape_once(client: &Client, url: &str) -> Result<Vec<Launch>, FetchError> {
    let body = fetch_page(client, url).await?;
    Ok(parse_launches(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_entry(document: &Html) -> Launch {
        let entry = document.select(&LAUNCH_SELECTOR).next().unwrap();
        Launch::from_entry(entry)
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_whitespace("  Falcon   9\n  Block 5 "), "Falcon 9 Block 5");
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }

    #[test]
    fn missing_element_extracts_empty() {
        assert_eq!(extract(None), "");
    }

    #[test]
    fn builds_complete_entry() {
        let document = Html::parse_document(
            r#"<div>
            <div class="datename"><span class="launchdate">Jan. 5</span>
              <span class="mission">Falcon   9
                 • Starlink</span></div>
            <div class="missiondata">
              <span class="strong">Launch time:</span> 0130 GMT (8:30 p.m. EST)<br>
              <span class="strong">Launch site:</span>
                 SLC-40, Cape Canaveral Space Force Station, Florida
            </div>
            <div class="missdescrip"><p>A SpaceX <b>Falcon 9</b> rocket.</p>
              <p style="">Updated Jan. 3</p></div>
            </div>"#,
        );

        let launch = first_entry(&document);
        assert_eq!(launch.date, "Jan. 5");
        assert_eq!(launch.mission, "Falcon 9 • Starlink");
        assert_eq!(launch.time, "0130 GMT (8:30 p.m. EST)");
        assert_eq!(launch.site, "SLC-40, Cape Canaveral Space Force Station, Florida");
        assert_eq!(launch.description, "A SpaceX Falcon 9 rocket.");
        assert_eq!(launch.last_updated, "Updated Jan. 3");
        assert!(launch.is_tracked_site());
    }

    #[test]
    fn entry_without_mission_data_has_empty_site_and_time() {
        let document = Html::parse_document(
            r#"<div><div class="datename"><span class="launchdate">TBD</span></div>
            <div class="missdescrip"><p>No data yet.</p></div></div>"#,
        );

        let launch = first_entry(&document);
        assert_eq!(launch.date, "TBD");
        assert_eq!(launch.mission, "");
        assert_eq!(launch.site, "");
        assert_eq!(launch.time, "");
        assert_eq!(launch.description, "No data yet.");
        assert_eq!(launch.last_updated, "");
        assert!(!launch.is_tracked_site());
    }

    #[test]
    fn missing_labels_leave_fields_empty() {
        let document = Html::parse_document(
            r#"<div><div class="datename"></div>
            <div class="missiondata"><span>Launch window:</span> 1200-1400 GMT</div></div>"#,
        );

        let launch = first_entry(&document);
        assert_eq!(launch, Launch::default());
    }

    #[test]
    fn site_filter_is_case_insensitive() {
        let site = |site: &str| Launch {
            site: site.to_string(),
            ..Default::default()
        };

        assert!(site("KENNEDY Space Center").is_tracked_site());
        assert!(site("Patrick SFB").is_tracked_site());
        assert!(site("cape canaveral").is_tracked_site());
        assert!(!site("Vandenberg SFB").is_tracked_site());
        assert!(!site("").is_tracked_site());
    }

    #[test]
    fn parse_keeps_document_order() {
        let body = r#"<html><body>
            <div class="datename"><div class="mission">A</div></div>
            <div class="missiondata"><span>Launch site:</span> Kennedy</div>
            <div class="datename"><div class="mission">B</div></div>
            <div class="missiondata"><span>Launch site:</span> Vandenberg</div>
            <div class="datename"><div class="mission">C</div></div>
            <div class="missiondata"><span>Launch site:</span> Canaveral</div>
            </body></html>"#;

        let missions: Vec<String> = parse_launches(body)
            .into_iter()
            .map(|launch| launch.mission)
            .collect();
        assert_eq!(missions, vec!["A", "C"]);
    }

    #[test]
    fn page_without_entries_is_empty() {
        assert!(parse_launches("<html><body><p>maintenance</p></body></html>").is_empty());
        assert!(parse_launches("").is_empty());
    }
}
