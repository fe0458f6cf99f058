//! Asset service: registration, derived-status listings and the
//! device-type/brand catalogue.

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::{
    api::assets::AssetDetails,
    error::{AppError, AppResult},
    models::{
        asset::{AddBrand, Asset, AssetOverview, AssetQuery, CreateAsset, DeviceBrands},
        enums::{ActivityType, AssetStatus},
    },
    repository::{activity::ActivityEntry, assets::NewAsset, Repository},
    services::date_to_utc,
};

#[derive(Clone)]
pub struct AssetsService {
    repository: Repository,
}

impl AssetsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new asset. Oracle and serial numbers must be unused; the
    /// row starts in status `new` and the registration is audited in the
    /// same transaction.
    pub async fn create(&self, payload: CreateAsset) -> AppResult<Asset> {
        if self
            .repository
            .assets
            .oracle_exists(&payload.oracle_number)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "Oracle number {} already exists",
                payload.oracle_number
            )));
        }
        if let Some(serial) = payload.serial_number.as_deref().filter(|s| !s.is_empty()) {
            if self.repository.assets.serial_exists(serial).await? {
                return Err(AppError::Conflict(format!(
                    "Serial number {serial} already exists"
                )));
            }
        }

        let warranty_expiry = match payload.warranty_expiry.as_deref() {
            Some(input) => parse_warranty_expiry(input)?,
            None => None,
        };

        let new = NewAsset {
            oracle_number: payload.oracle_number.clone(),
            device_type: payload.device_type.clone(),
            brand_name: payload.brand_name.clone(),
            model_name: payload.model_name.clone(),
            serial_number: payload.serial_number.clone(),
            unit_price: payload.unit_price,
            purchase_date: payload.purchase_date.map(date_to_utc),
            warranty_expiry,
            vendor_name: payload.vendor_name.clone(),
            tender_no: payload.tender_no.clone(),
            notes: payload.notes.clone(),
        };

        let mut tx = self.repository.pool.begin().await?;
        let asset = self.repository.assets.create(&mut *tx, &new).await?;
        self.repository
            .activity
            .record(
                &mut *tx,
                ActivityType::AssetAdded,
                &ActivityEntry {
                    oracle_number: Some(asset.oracle_number.clone()),
                    asset_type: Some(asset.device_type.clone()),
                    brand_name: asset.brand_name.clone(),
                    asset_name: asset.model_name.clone(),
                    remarks: Some(format!("Asset {} registered", asset.oracle_number)),
                    ..ActivityEntry::default()
                },
            )
            .await?;
        tx.commit().await?;

        info!(
            oracle_number = %asset.oracle_number,
            device_type = %asset.device_type,
            "Asset registered"
        );
        Ok(asset)
    }

    /// List assets. SQL narrows on the indexed columns; the status filter
    /// and the view flags act on the *derived* status so an asset with an
    /// open repair never shows up as available.
    pub async fn list(&self, query: AssetQuery) -> AppResult<Vec<AssetOverview>> {
        let wanted = match query.status.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(AssetStatus::from_str(raw).map_err(AppError::Validation)?),
            None => None,
        };

        let rows = self.repository.assets.list(&query).await?;
        let assets = rows
            .into_iter()
            .map(AssetOverview::from)
            .filter(|asset| passes_filters(&query, wanted, asset))
            .collect();
        Ok(assets)
    }

    /// Everything known about one asset, gathered for the detail view.
    pub async fn detail(&self, oracle_number: &str) -> AppResult<AssetDetails> {
        let row = self
            .repository
            .assets
            .get_overview_row(oracle_number)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Asset with oracle number {oracle_number} not found"
                ))
            })?;

        let active_assignment = self.repository.assignments.get_active(oracle_number).await?;
        let (open_repair, completed) = self.repository.repairs.history_for(oracle_number).await?;
        let latest_return = self.repository.returns.latest_for(oracle_number).await?;
        let auction = self.repository.auctions.get_by_oracle(oracle_number).await?;

        Ok(AssetDetails {
            asset: AssetOverview::from(row),
            active_assignment,
            open_repairs: i64::from(open_repair.is_some()),
            completed_repairs: completed.len() as i64,
            latest_return,
            auction,
        })
    }

    /// Oracle numbers currently in an employee's custody
    pub async fn assigned_oracle_numbers(&self) -> AppResult<Vec<String>> {
        self.repository.assets.assigned_oracle_numbers().await
    }

    pub async fn oracle_exists(&self, oracle_number: &str) -> AppResult<bool> {
        self.repository.assets.oracle_exists(oracle_number).await
    }

    pub async fn serial_exists(&self, serial_number: &str) -> AppResult<bool> {
        self.repository.assets.serial_exists(serial_number).await
    }

    /// Seeded device types plus any discovered on registered assets
    pub async fn device_types(&self) -> AppResult<Vec<String>> {
        self.repository.assets.device_types().await
    }

    /// Brand catalogue for one device type: the curated list merged with
    /// brands actually seen on assets of that type.
    pub async fn brands_for(&self, device_type: &str) -> AppResult<DeviceBrands> {
        let mut brands = self
            .repository
            .assets
            .brands_for(device_type)
            .await?
            .unwrap_or_default();
        for discovered in self.repository.assets.asset_brands_for(device_type).await? {
            if !brands.iter().any(|b| b.eq_ignore_ascii_case(&discovered)) {
                brands.push(discovered);
            }
        }
        brands.sort();
        Ok(DeviceBrands {
            device_type: device_type.to_string(),
            brands,
        })
    }

    /// Add a brand to a device type's curated list
    pub async fn add_brand(&self, payload: AddBrand) -> AppResult<DeviceBrands> {
        let brands = self
            .repository
            .assets
            .add_brand(&payload.device_type, &payload.brand_name)
            .await?;
        info!(
            device_type = %payload.device_type,
            brand = %payload.brand_name,
            "Brand added"
        );
        Ok(DeviceBrands {
            device_type: payload.device_type,
            brands,
        })
    }

    /// Oracle numbers of one device type that the assign operation would
    /// accept right now.
    pub async fn available_for(&self, device_type: &str) -> AppResult<Vec<String>> {
        self.repository
            .assets
            .available_for_assignment(device_type)
            .await
    }
}

fn in_custody(asset: &AssetOverview) -> bool {
    asset
        .current_holder
        .as_deref()
        .map_or(false, |holder| !holder.is_empty())
}

/// Apply the derived-status filter and the boolean views to one row.
fn passes_filters(query: &AssetQuery, wanted: Option<AssetStatus>, asset: &AssetOverview) -> bool {
    if let Some(status) = wanted {
        if asset.status != status {
            return false;
        }
    }
    if query.new_only.unwrap_or(false)
        && (in_custody(asset) || !matches!(asset.status, AssetStatus::New | AssetStatus::Used))
    {
        return false;
    }
    if query.stock.unwrap_or(false)
        && (in_custody(asset)
            || matches!(
                asset.status,
                AssetStatus::Damaged | AssetStatus::Auctioned | AssetStatus::Buyback
            ))
    {
        return false;
    }
    if query.unassigned.unwrap_or(false) && in_custody(asset) {
        return false;
    }
    true
}

/// Parse the warranty expiry field: either a concrete date (`YYYY-MM-DD` or
/// RFC 3339) or a duration phrase such as "3 years" / "2.5 years" resolved
/// against the current date.
fn parse_warranty_expiry(input: &str) -> AppResult<Option<DateTime<Utc>>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    static YEARS: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*years?$").expect("invalid warranty pattern")
    });

    if let Some(caps) = YEARS.captures(input) {
        let years: f64 = caps[1]
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid warranty duration: {input}")))?;
        if !(0.0..=100.0).contains(&years) {
            return Err(AppError::Validation(format!(
                "Warranty duration out of range: {input}"
            )));
        }
        // 365.25 so multi-year warranties stay put across leap years
        let expiry = Utc::now().date_naive() + Duration::days((years * 365.25) as i64);
        return Ok(Some(date_to_utc(expiry)));
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(Some(date_to_utc(date)));
    }

    Err(AppError::Validation(format!(
        "Cannot parse warranty expiry '{input}': use YYYY-MM-DD or a duration like '3 years'"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overview(status: AssetStatus, holder: Option<&str>) -> AssetOverview {
        let now = Utc::now();
        AssetOverview {
            id: 1,
            oracle_number: "ORC-1".to_string(),
            device_type: "Laptop".to_string(),
            brand_name: Some("Dell".to_string()),
            model_name: None,
            serial_number: None,
            unit_price: None,
            purchase_date: None,
            warranty_expiry: None,
            vendor_name: None,
            tender_no: None,
            notes: None,
            status,
            under_repair: status == AssetStatus::UnderRepair,
            current_holder: holder.map(str::to_string),
            assigned_to: holder.map(str::to_string),
            assignment_date: None,
            expected_return_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn query(new_only: bool, stock: bool, unassigned: bool) -> AssetQuery {
        AssetQuery {
            new_only: Some(new_only),
            stock: Some(stock),
            unassigned: Some(unassigned),
            ..AssetQuery::default()
        }
    }

    #[test]
    fn new_only_excludes_custody_and_non_stock_statuses() {
        let q = query(true, false, false);
        assert!(passes_filters(&q, None, &overview(AssetStatus::New, None)));
        assert!(passes_filters(&q, None, &overview(AssetStatus::Used, None)));
        assert!(!passes_filters(
            &q,
            None,
            &overview(AssetStatus::New, Some("Alice"))
        ));
        assert!(!passes_filters(
            &q,
            None,
            &overview(AssetStatus::UnderRepair, None)
        ));
        assert!(!passes_filters(
            &q,
            None,
            &overview(AssetStatus::Damaged, None)
        ));
    }

    #[test]
    fn stock_view_keeps_unassigned_repairs() {
        let q = query(false, true, false);
        assert!(passes_filters(
            &q,
            None,
            &overview(AssetStatus::UnderRepair, None)
        ));
        assert!(!passes_filters(
            &q,
            None,
            &overview(AssetStatus::UnderRepair, Some("Bob"))
        ));
        assert!(!passes_filters(
            &q,
            None,
            &overview(AssetStatus::Auctioned, None)
        ));
        assert!(!passes_filters(
            &q,
            None,
            &overview(AssetStatus::Buyback, None)
        ));
    }

    #[test]
    fn unassigned_view_only_checks_custody() {
        let q = query(false, false, true);
        assert!(passes_filters(
            &q,
            None,
            &overview(AssetStatus::Damaged, None)
        ));
        assert!(!passes_filters(
            &q,
            None,
            &overview(AssetStatus::New, Some("Carol"))
        ));
    }

    #[test]
    fn status_filter_acts_on_derived_status() {
        let q = AssetQuery::default();
        assert!(passes_filters(
            &q,
            Some(AssetStatus::UnderRepair),
            &overview(AssetStatus::UnderRepair, None)
        ));
        assert!(!passes_filters(
            &q,
            Some(AssetStatus::New),
            &overview(AssetStatus::UnderRepair, None)
        ));
    }

    #[test]
    fn warranty_accepts_year_phrases() {
        let today = Utc::now().date_naive();

        let three = parse_warranty_expiry("3 years").unwrap().unwrap();
        assert_eq!(three.date_naive(), today + Duration::days(1095));

        let fractional = parse_warranty_expiry("2.5 Years").unwrap().unwrap();
        assert_eq!(fractional.date_naive(), today + Duration::days(913));

        let tight = parse_warranty_expiry("1year").unwrap().unwrap();
        assert_eq!(tight.date_naive(), today + Duration::days(365));
    }

    #[test]
    fn warranty_accepts_dates() {
        let date = parse_warranty_expiry("2027-06-30").unwrap().unwrap();
        assert_eq!(
            date.date_naive(),
            NaiveDate::from_ymd_opt(2027, 6, 30).unwrap()
        );

        let stamped = parse_warranty_expiry("2027-06-30T12:00:00Z").unwrap().unwrap();
        assert_eq!(
            stamped.date_naive(),
            NaiveDate::from_ymd_opt(2027, 6, 30).unwrap()
        );
    }

    #[test]
    fn warranty_rejects_garbage_but_allows_empty() {
        assert!(parse_warranty_expiry("").unwrap().is_none());
        assert!(parse_warranty_expiry("   ").unwrap().is_none());
        assert!(parse_warranty_expiry("soon").is_err());
        assert!(parse_warranty_expiry("500 years").is_err());
    }
}
