use crate::app::ports::ContactSource;
use crate::error::{EtlError, Result};
use crate::infra::http_client::RetryingHttpClient;
use crate::types::RawRecord;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, info, instrument};

const MIN_CELLS: usize = 6;

/// Reads contacts from the first HTML table on a web page
pub struct HtmlTableSource {
    http: RetryingHttpClient,
    url: String,
}

impl HtmlTableSource {
    pub fn new(http: RetryingHttpClient, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ContactSource for HtmlTableSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn extract(&self) -> Result<Vec<RawRecord>> {
        info!("Fetching contacts from {}", self.url);
        let response = self.http.get(&self.url).await.map_err(|e| {
            EtlError::SourceUnavailable(format!("Failed to fetch {}: {}", self.url, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::SourceUnavailable(format!(
                "{} responded with status {}",
                self.url,
                status.as_u16()
            )));
        }

        let body = response.text().await.map_err(|e| {
            EtlError::SourceUnavailable(format!("Failed to read body from {}: {}", self.url, e))
        })?;
        parse_contact_table(&body)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::Parse(format!("invalid selector '{css}': {e:?}")))
}

/// Text content of a cell with every text node trimmed and concatenated
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}

/// Extracts contacts from the first `<table>` in `html`.
///
/// The first row is a header. Rows with fewer than six cells are ignored,
/// as are rows missing company, given name or email. A page without any
/// table yields an empty batch.
pub fn parse_contact_table(html: &str) -> Result<Vec<RawRecord>> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td, th")?;

    let Some(table) = document.select(&table_selector).next() else {
        error!("No table found on the page");
        return Ok(Vec::new());
    };

    let rows: Vec<ElementRef<'_>> = table.select(&row_selector).skip(1).collect();
    info!("Found {} rows in table", rows.len());

    let mut contacts = Vec::new();
    for (i, row) in rows.into_iter().enumerate() {
        let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
        if cells.len() < MIN_CELLS {
            debug!("Row {} has {} cells, skipping", i + 1, cells.len());
            continue;
        }

        let mut cells = cells.into_iter();
        let mut next = || cells.next().unwrap_or_default();
        let record = RawRecord {
            company: next(),
            given_name: next(),
            family_name: next(),
            title: next(),
            email: next(),
            first_contact: next(),
        };

        if record.has_required_fields() {
            contacts.push(record);
        } else {
            debug!("Row {} is missing company, given name or email, skipping", i + 1);
        }
    }

    info!("Extracted {} valid contacts", contacts.len());
    Ok(contacts)
}
