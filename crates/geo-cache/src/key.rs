//! Plan fingerprints
//!
//! Provides [`CacheKey`], a namespaced, fixed-length digest of the
//! order-independent parts of an [`AnalysisPlan`].

use geo_plan::{AnalysisParameters, AnalysisPlan, AnalysisType, DataProduct, Location, TimeRange};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Number of hex characters kept from the digest
pub const DIGEST_LEN: usize = 16;

/// Key namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Analysis artifacts
    Analysis,
    /// Generated explanations of an analysis
    Explanation,
}

impl Namespace {
    /// Prefix text, without the trailing colon
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Namespace::Analysis => "analysis",
            Namespace::Explanation => "explanation",
        }
    }
}

/// Normalized view of a plan: only fields that identify a result
///
/// `outputs` is left out; every other field changes what gets computed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Fingerprint<'a> {
    analysis_type: AnalysisType,
    data_product: DataProduct,
    dataset_ids: Vec<&'a str>,
    time_range: &'a TimeRange,
    location: &'a Location,
    parameters: &'a AnalysisParameters,
}

impl<'a> Fingerprint<'a> {
    fn of(plan: &'a AnalysisPlan) -> Self {
        let mut dataset_ids: Vec<&str> = plan.dataset_ids().iter().map(String::as_str).collect();
        dataset_ids.sort_unstable();
        Self {
            analysis_type: plan.analysis_type(),
            data_product: plan.data_product(),
            dataset_ids,
            time_range: plan.time_range(),
            location: plan.location(),
            parameters: plan.parameters(),
        }
    }
}

/// Namespaced fingerprint: `<namespace>:<16 hex chars>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    namespace: Namespace,
    digest: String,
}

impl CacheKey {
    /// Fingerprint a plan
    ///
    /// Dataset ids are sorted first, so input order never affects the key.
    #[must_use]
    pub fn for_plan(namespace: Namespace, plan: &AnalysisPlan) -> Self {
        // Serializing plain data with derived impls cannot fail.
        let canonical = serde_json::to_vec(&Fingerprint::of(plan)).unwrap_or_default();
        let digest = Sha256::digest(&canonical);
        let mut hex = hex::encode(digest);
        hex.truncate(DIGEST_LEN);
        Self {
            namespace,
            digest: hex,
        }
    }

    /// Analysis-artifact key for a plan
    #[inline]
    #[must_use]
    pub fn analysis(plan: &AnalysisPlan) -> Self {
        Self::for_plan(Namespace::Analysis, plan)
    }

    /// Explanation key for a plan
    #[inline]
    #[must_use]
    pub fn explanation(plan: &AnalysisPlan) -> Self {
        Self::for_plan(Namespace::Explanation, plan)
    }

    /// Key namespace
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Truncated hex digest
    #[inline]
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace.as_str(), self.digest)
    }
}

impl FromStr for CacheKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, digest) = s
            .split_once(':')
            .ok_or_else(|| KeyError::Malformed(s.to_string()))?;

        let namespace = match prefix {
            "analysis" => Namespace::Analysis,
            "explanation" => Namespace::Explanation,
            other => return Err(KeyError::UnknownNamespace(other.to_string())),
        };

        if digest.len() != DIGEST_LEN || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(KeyError::Malformed(s.to_string()));
        }

        Ok(Self {
            namespace,
            digest: digest.to_ascii_lowercase(),
        })
    }
}

/// Key parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Not `<namespace>:<16 hex chars>`
    #[error("malformed cache key: '{0}'")]
    Malformed(String),

    /// Namespace other than analysis/explanation
    #[error("unknown cache key namespace: '{0}'")]
    UnknownNamespace(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_plan::PlanValidator;
    use proptest::prelude::*;
    use serde_json::json;

    fn raw_with(ids: &[&str], start: &str, location: serde_json::Value) -> serde_json::Value {
        json!({
            "analysisType": "timeseries",
            "dataProduct": "vegetation",
            "datasetIds": ids,
            "timeRange": { "start": start, "end": "2023-12-31" },
            "location": location,
            "outputs": ["timeseries"]
        })
    }

    fn plan_with(ids: &[&str], start: &str, location: serde_json::Value) -> AnalysisPlan {
        PlanValidator::validate(&raw_with(ids, start, location)).unwrap()
    }

    #[test]
    fn key_format_is_fixed_length() {
        let plan = plan_with(&["a"], "2023-01-01", json!("Lagos"));
        let key = CacheKey::analysis(&plan);
        let text = key.to_string();

        assert!(text.starts_with("analysis:"));
        assert_eq!(text.len(), "analysis:".len() + DIGEST_LEN);
        assert_eq!(key.digest().len(), DIGEST_LEN);
    }

    #[test]
    fn key_ignores_dataset_order() {
        let a = plan_with(&["x", "y", "z"], "2023-01-01", json!("Lagos"));
        let b = plan_with(&["z", "x", "y"], "2023-01-01", json!("Lagos"));
        assert_eq!(CacheKey::analysis(&a), CacheKey::analysis(&b));
    }

    #[test]
    fn key_differs_by_location_and_time() {
        let base = plan_with(&["x"], "2023-01-01", json!("Lagos"));
        let other_place = plan_with(&["x"], "2023-01-01", json!("Accra"));
        let other_time = plan_with(&["x"], "2023-02-01", json!("Lagos"));
        let bbox = plan_with(&["x"], "2023-01-01", json!([3.0, 6.0, 4.0, 7.0]));

        let key = CacheKey::analysis(&base);
        assert_ne!(key, CacheKey::analysis(&other_place));
        assert_ne!(key, CacheKey::analysis(&other_time));
        assert_ne!(key, CacheKey::analysis(&bbox));
    }

    #[test]
    fn key_differs_by_product_and_parameters() {
        let base = raw_with(&["x"], "2023-01-01", json!("Lagos"));
        let key = CacheKey::analysis(&PlanValidator::validate(&base).unwrap());

        let mut precipitation = base.clone();
        precipitation["dataProduct"] = json!("precipitation");
        let mut evi = base.clone();
        evi["parameters"] = json!({ "index": "evi" });
        let mut band = base.clone();
        band["parameters"] = json!({ "band": "B5" });
        let mut only_outputs = base.clone();
        only_outputs["outputs"] = json!(["map"]);

        for raw in [&precipitation, &evi, &band] {
            assert_ne!(key, CacheKey::analysis(&PlanValidator::validate(raw).unwrap()), "{raw}");
        }
        assert_eq!(key, CacheKey::analysis(&PlanValidator::validate(&only_outputs).unwrap()));
    }

    #[test]
    fn namespaces_do_not_collide() {
        let plan = plan_with(&["x"], "2023-01-01", json!("Lagos"));
        let analysis = CacheKey::analysis(&plan);
        let explanation = CacheKey::explanation(&plan);

        assert_ne!(analysis, explanation);
        assert_eq!(analysis.digest(), explanation.digest());
        assert!(explanation.to_string().starts_with("explanation:"));
    }

    #[test]
    fn key_parse_roundtrip() {
        let plan = plan_with(&["x"], "2023-01-01", json!("Lagos"));
        let key = CacheKey::analysis(&plan);
        let parsed: CacheKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);

        assert!(matches!(
            "summary:0123456789abcdef".parse::<CacheKey>(),
            Err(KeyError::UnknownNamespace(_))
        ));
        assert!(matches!(
            "analysis:xyz".parse::<CacheKey>(),
            Err(KeyError::Malformed(_))
        ));
        assert!("no-colon".parse::<CacheKey>().is_err());
    }

    proptest! {
        #[test]
        fn prop_key_invariant_under_dataset_permutation(
            ids in proptest::collection::btree_set("[A-Z]{1,3}/[a-z0-9_]{1,8}", 1..6)
                .prop_map(|s| s.into_iter().collect::<Vec<_>>())
                .prop_shuffle()
        ) {
            let mut sorted = ids.clone();
            sorted.sort();

            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let sorted_refs: Vec<&str> = sorted.iter().map(String::as_str).collect();

            let shuffled = plan_with(&refs, "2023-01-01", json!("Lagos"));
            let canonical = plan_with(&sorted_refs, "2023-01-01", json!("Lagos"));
            prop_assert_eq!(CacheKey::analysis(&shuffled), CacheKey::analysis(&canonical));
        }
    }
}
