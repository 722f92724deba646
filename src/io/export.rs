use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{HistoryFilter, WalletService};
use crate::domain::{TransferRecord, WalletAccount};

/// Full session snapshot for JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub msisdn: String,
    pub accounts: Vec<WalletAccount>,
    pub records: Vec<TransferRecord>,
}

/// Exporter for converting session data to CSV or JSON.
pub struct Exporter<'a> {
    service: &'a WalletService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a WalletService) -> Self {
        Self { service }
    }

    /// Export the transfer history to CSV, most recent first.
    pub fn export_history_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let records = self.service.history(&HistoryFilter::default());
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "sequence",
            "timestamp",
            "kind",
            "source",
            "destination",
            "amount",
            "counterparty",
            "reference",
        ])?;

        let mut count = 0;
        for record in &records {
            csv_writer.write_record([
                record.id.to_string(),
                record.sequence.to_string(),
                record.timestamp.to_rfc3339(),
                record.kind.to_string(),
                record.source.map(|a| a.to_string()).unwrap_or_default(),
                record
                    .destination
                    .map(|a| a.to_string())
                    .unwrap_or_default(),
                record.amount.to_string(),
                record.counterparty.clone().unwrap_or_default(),
                record.reference.clone().unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the four bucket balances to CSV.
    pub fn export_balances_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let entries = self.service.balances();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["account", "balance", "locked", "next_release"])?;

        let mut count = 0;
        for entry in &entries {
            csv_writer.write_record([
                entry.account.to_string(),
                entry.balance.to_string(),
                entry.locked.to_string(),
                entry
                    .next_release
                    .map(|d| d.to_rfc3339())
                    .unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full session as a pretty JSON snapshot.
    pub fn export_snapshot_json<W: Write>(&self, mut writer: W) -> Result<SessionSnapshot> {
        let snapshot = SessionSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            msisdn: self.service.msisdn().to_string(),
            accounts: self.service.accounts(),
            records: self
                .service
                .history(&HistoryFilter::default())
                .into_iter()
                .rev()
                .collect(),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
