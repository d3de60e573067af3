use crate::app::ports::ContactStore;
use crate::error::Result;
use crate::metrics;
use crate::pipeline::processing::timestamps::parse_timestamp;
use crate::types::{ContactDetails, EligibleRecord, RunId, StoredContact};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

/// Writes eligible records to the store, skipping natural keys already present.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactPersister;

impl ContactPersister {
    pub fn new() -> Self {
        Self
    }

    /// Maps an eligible record to its stored form.
    ///
    /// An unparsable first-contact value falls back to `run_started_at`.
    pub fn to_stored_contact(
        record: &EligibleRecord,
        run_id: RunId,
        run_started_at: DateTime<Utc>,
    ) -> StoredContact {
        let record = record.record();
        let first_contact_at = parse_timestamp(&record.first_contact).unwrap_or_else(|| {
            warn!(
                "Unparsable first contact '{}' for {}, using run start time",
                record.first_contact, record.email
            );
            metrics::record_timestamp_fallback();
            run_started_at
        });

        StoredContact {
            company: record.company.clone(),
            contact: ContactDetails {
                given_name: record.given_name.clone(),
                family_name: record.family_name.clone(),
                title: record.title.clone(),
                email: record.email.clone(),
            },
            first_contact_at,
            inserted_at: Utc::now(),
            run_id,
        }
    }

    /// Returns how many natural keys this call newly introduced.
    #[instrument(skip(self, store, records), fields(run_id = %run_id, batch = records.len()))]
    pub async fn persist(
        &self,
        store: &dyn ContactStore,
        records: &[EligibleRecord],
        run_id: RunId,
        run_started_at: DateTime<Utc>,
    ) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut inserted = 0;
        for record in records {
            let contact = Self::to_stored_contact(record, run_id, run_started_at);
            if store.insert_if_absent(&contact).await? {
                debug!("Inserted contact {}", contact.natural_key());
                inserted += 1;
            } else {
                info!("Skipping duplicate contact: {}", contact.contact.email);
                metrics::record_duplicate_skipped();
            }
        }

        info!("Inserted {} new contacts", inserted);
        metrics::record_inserted(inserted);
        Ok(inserted)
    }
}
