use log::debug;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::config::CrawlerConfig;
use crate::error::{AppError, Result};
use crate::model::Company;

/// Downloads the exchange directory and extracts the listed-company roster.
///
/// The source serves an HTML table in a legacy charset; rows after the header
/// carry the company name in the first cell and its code in the second.
pub struct DirectoryFetcher {
    client: Client,
    directory_url: String,
    charset: String,
}

impl DirectoryFetcher {
    pub fn new(client: Client, config: &CrawlerConfig) -> Self {
        Self {
            client,
            directory_url: config.directory_url.clone(),
            charset: config.directory_charset.clone(),
        }
    }

    /// Fetch the roster. Zero data rows is a hard failure: an empty listing
    /// means the upstream table format changed, not a quiet market day.
    /// Retrying is left to the caller.
    pub async fn fetch(&self) -> Result<Vec<Company>> {
        let response = self.client.get(&self.directory_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport {
                url: self.directory_url.clone(),
                status,
            });
        }

        let html = response.text_with_charset(&self.charset).await?;
        let companies = parse_directory(&html)?;
        debug!("directory listing yielded {} companies", companies.len());
        Ok(companies)
    }
}

fn parse_directory(html: &str) -> Result<Vec<Company>> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();

    let mut companies = Vec::new();
    for row in document.select(&row_selector).skip(1) {
        let mut cells = row.select(&cell_selector);
        let Some(name_cell) = cells.next() else {
            continue;
        };
        let Some(code_cell) = cells.next() else {
            continue;
        };

        let name = cell_text(&name_cell);
        let code = cell_text(&code_cell);
        if code.is_empty() || name.is_empty() {
            continue;
        }

        companies.push(Company::new(code, name));
    }

    if companies.is_empty() {
        return Err(AppError::EmptyDirectory);
    }

    Ok(companies)
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
