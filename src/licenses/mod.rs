//! SPDX license list fetching and partitioning.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Parsed and partitioned SPDX license data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicensesData {
    /// License name -> SPDX identifier.
    pub licenses: BTreeMap<String, String>,
    /// All SPDX identifiers, in list order.
    pub license_ids: Vec<String>,
    pub osi_approved: Vec<String>,
    pub fsf_libre: Vec<String>,
    pub deprecated: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LicenseListFile {
    licenses: Vec<LicenseEntry>,
}

#[derive(Debug, Deserialize)]
struct LicenseEntry {
    name: String,
    #[serde(rename = "licenseId")]
    license_id: String,
    #[serde(rename = "isOsiApproved", default)]
    is_osi_approved: bool,
    #[serde(rename = "isFsfLibre", default)]
    is_fsf_libre: bool,
    #[serde(rename = "isDeprecatedLicenseId", default)]
    is_deprecated: bool,
}

/// Fetch the SPDX license list JSON and partition it.
pub async fn fetch_license_list(url: &str) -> Result<LicensesData> {
    let resp = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .context("SPDX license list request failed")?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("SPDX license list fetch failed ({}): {}", status, body);
    }

    let file: LicenseListFile = resp
        .json()
        .await
        .context("Failed to parse SPDX license list")?;
    debug!("Fetched {} SPDX licenses", file.licenses.len());

    Ok(partition_licenses(file.licenses))
}

fn partition_licenses(entries: Vec<LicenseEntry>) -> LicensesData {
    let mut data = LicensesData::default();

    for entry in entries {
        data.licenses.insert(entry.name, entry.license_id.clone());
        data.license_ids.push(entry.license_id.clone());

        if entry.is_osi_approved {
            data.osi_approved.push(entry.license_id.clone());
        }
        if entry.is_fsf_libre {
            data.fsf_libre.push(entry.license_id.clone());
        }
        if entry.is_deprecated {
            data.deprecated.push(entry.license_id);
        }
    }

    data
}
