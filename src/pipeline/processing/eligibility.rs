use crate::config::FilterConfig;
use crate::types::{EligibleRecord, RawRecord};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Occurrences of each company name in a raw batch, keyed by exact company string
pub type CompanyTally<'a> = HashMap<&'a str, usize>;

/// Applies the business rules that decide which contacts are worth keeping.
///
/// A record qualifies when its company matches an industry keyword, its title
/// matches a seniority marker (both case-insensitive substring matches), and
/// its company occurs at least `min_contacts_per_company` times in the
/// unfiltered batch.
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    industry_keywords: Vec<String>,
    seniority_markers: Vec<String>,
    min_contacts_per_company: usize,
}

impl EligibilityFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            industry_keywords: lowercase_all(&config.industry_keywords),
            seniority_markers: lowercase_all(&config.seniority_markers),
            min_contacts_per_company: config.min_contacts_per_company,
        }
    }

    /// First pass: count every company over the whole batch.
    pub fn company_tally(records: &[RawRecord]) -> CompanyTally<'_> {
        let mut tally = CompanyTally::new();
        for record in records {
            *tally.entry(record.company.as_str()).or_insert(0) += 1;
        }
        tally
    }

    pub fn is_target_industry(&self, company: &str) -> bool {
        contains_any(company, &self.industry_keywords)
    }

    pub fn is_senior_title(&self, title: &str) -> bool {
        contains_any(title, &self.seniority_markers)
    }

    /// Second pass predicate. `tally` must come from the batch `record` belongs to.
    pub fn is_eligible(&self, record: &RawRecord, tally: &CompanyTally<'_>) -> bool {
        let company_count = tally.get(record.company.as_str()).copied().unwrap_or(0);
        self.is_target_industry(&record.company)
            && self.is_senior_title(&record.title)
            && company_count >= self.min_contacts_per_company
    }

    /// Keeps qualifying records in input order.
    #[instrument(skip_all, fields(total = records.len()))]
    pub fn filter(&self, records: &[RawRecord]) -> Vec<EligibleRecord> {
        let tally = Self::company_tally(records);
        let eligible: Vec<EligibleRecord> = records
            .iter()
            .filter(|record| {
                let keep = self.is_eligible(record, &tally);
                if !keep {
                    debug!(company = %record.company, title = %record.title, "Record not eligible");
                }
                keep
            })
            .cloned()
            .map(EligibleRecord::new)
            .collect();

        info!("Filtered {} contacts from {} total", eligible.len(), records.len());
        eligible
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}
