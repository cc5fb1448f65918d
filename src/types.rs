//! Search parameters for the `/IT-search` endpoint

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest page size accepted by the API
pub const MAX_PAGE_SIZE: u32 = 100;

/// Return the ATECO code formatted as expected by the API (digits only).
///
/// The API accepts the ATECO code without dots. Users often provide formats
/// such as "10.71" or "1071"; this helper strips non-digit characters and
/// rejects values that contain no digits at all.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if the code is empty or has no digits.
pub fn sanitize_ateco_code(code: &str) -> Result<String> {
    if code.is_empty() {
        return Err(Error::InvalidInput(
            "an ATECO code must be provided".to_string(),
        ));
    }

    let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(Error::InvalidInput(format!(
            "ATECO code '{code}' does not contain any digits"
        )));
    }

    Ok(digits)
}

/// Strongly typed search parameters for `/IT-search`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchParams {
    /// Italian province code (e.g. "VR" for Verona); uppercased when rendered
    pub province: String,

    /// ATECO code to filter by, digits only
    pub ateco_code: String,

    /// Enrichment dataset attached to each record (e.g. "Advanced",
    /// "Shareholders"); an empty string omits the parameter
    pub data_enrichment: String,

    /// Page size for pagination, up to [`MAX_PAGE_SIZE`]
    pub limit: u32,

    /// Optional activity status filter (e.g. "ATTIVA")
    pub activity_status: Option<String>,

    /// Ask the server for the matching count only, without returning records
    pub dry_run: bool,
}

impl SearchParams {
    /// Build parameters for a province and a raw ATECO code.
    ///
    /// The code is sanitized to digits; enrichment defaults to "Advanced"
    /// and the page size to [`MAX_PAGE_SIZE`].
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if the ATECO code has no digits.
    pub fn new(province: &str, ateco_code: &str) -> Result<Self> {
        Ok(Self {
            province: province.to_string(),
            ateco_code: sanitize_ateco_code(ateco_code)?,
            data_enrichment: "Advanced".to_string(),
            limit: MAX_PAGE_SIZE,
            activity_status: None,
            dry_run: false,
        })
    }

    /// Effective page size sent to the server (clamped to [`MAX_PAGE_SIZE`])
    pub fn page_size(&self) -> u32 {
        self.limit.min(MAX_PAGE_SIZE)
    }

    /// Render the query parameters for one paginated request
    pub fn query(&self, skip: u64) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("province", self.province.to_uppercase()),
            ("atecoCode", self.ateco_code.clone()),
            ("limit", self.page_size().to_string()),
            ("skip", skip.to_string()),
        ];

        if !self.data_enrichment.is_empty() {
            query.push(("dataEnrichment", self.data_enrichment.clone()));
        }
        if let Some(status) = self.activity_status.as_deref() {
            if !status.is_empty() {
                query.push(("activityStatus", status.to_string()));
            }
        }
        if self.dry_run {
            query.push(("dryRun", "1".to_string()));
        }

        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_separators() {
        assert_eq!(sanitize_ateco_code("10.71").unwrap(), "1071");
        assert_eq!(sanitize_ateco_code(" 6201 ").unwrap(), "6201");
        assert_eq!(sanitize_ateco_code("ATECO 10-71/b").unwrap(), "1071");
    }

    #[test]
    fn sanitize_rejects_input_without_digits() {
        assert!(matches!(
            sanitize_ateco_code(""),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            sanitize_ateco_code("abc"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn query_renders_required_parameters() {
        let params = SearchParams::new("vr", "10.71").unwrap();
        let query = params.query(40);

        assert!(query.contains(&("province", "VR".to_string())));
        assert!(query.contains(&("atecoCode", "1071".to_string())));
        assert!(query.contains(&("limit", "100".to_string())));
        assert!(query.contains(&("skip", "40".to_string())));
        assert!(query.contains(&("dataEnrichment", "Advanced".to_string())));
        assert!(!query.iter().any(|(key, _)| *key == "dryRun"));
        assert!(!query.iter().any(|(key, _)| *key == "activityStatus"));
    }

    #[test]
    fn query_clamps_limit_and_renders_optional_parameters() {
        let mut params = SearchParams::new("VR", "1071").unwrap();
        params.limit = 250;
        params.dry_run = true;
        params.activity_status = Some("ATTIVA".to_string());
        let query = params.query(0);

        assert!(query.contains(&("limit", "100".to_string())));
        assert!(query.contains(&("dryRun", "1".to_string())));
        assert!(query.contains(&("activityStatus", "ATTIVA".to_string())));
    }

    #[test]
    fn query_omits_empty_enrichment() {
        let mut params = SearchParams::new("VR", "1071").unwrap();
        params.data_enrichment.clear();
        let query = params.query(0);

        assert!(!query.iter().any(|(key, _)| *key == "dataEnrichment"));
    }
}
